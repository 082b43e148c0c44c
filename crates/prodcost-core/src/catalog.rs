//! Reference data: units, nomenclature, counterparties and conversion rates.
//!
//! Catalog rows are referenced from purchases and production records. A row
//! that is still referenced can never be deleted; the store rejects the
//! deletion with [`Error::IntegrityViolation`](crate::Error::IntegrityViolation).

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  validate::{self, NAME_MAX_CHARS, RATE_PLACES},
};

// ─── Unit of measure ─────────────────────────────────────────────────────────

/// A named measurement unit, e.g. `kg` or `pcs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOfMeasure {
  pub uom_id:      Uuid,
  pub name:        String,
  pub recorded_at: DateTime<Utc>,
}

impl fmt::Display for UnitOfMeasure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUnitOfMeasure {
  pub name: String,
}

impl NewUnitOfMeasure {
  pub fn validate(&self) -> Result<()> {
    validate::label("name", &self.name, NAME_MAX_CHARS)
  }
}

// ─── Nomenclature ────────────────────────────────────────────────────────────

/// A catalog entry for a material or finished good, denominated in a base
/// unit. The base unit is fixed once the entry exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nomenclature {
  pub nomenclature_id: Uuid,
  pub name:            String,
  pub base_uom_id:     Uuid,
  pub recorded_at:     DateTime<Utc>,
}

impl fmt::Display for Nomenclature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNomenclature {
  pub name:        String,
  pub base_uom_id: Uuid,
}

impl NewNomenclature {
  pub fn validate(&self) -> Result<()> {
    validate::label("name", &self.name, NAME_MAX_CHARS)
  }
}

// ─── Counterparty ────────────────────────────────────────────────────────────

/// An external trading partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
  pub counterparty_id: Uuid,
  pub name:            String,
  pub recorded_at:     DateTime<Utc>,
}

impl fmt::Display for Counterparty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCounterparty {
  pub name: String,
}

impl NewCounterparty {
  pub fn validate(&self) -> Result<()> {
    validate::label("name", &self.name, NAME_MAX_CHARS)
  }
}

// ─── Conversion rate ─────────────────────────────────────────────────────────

/// Per-material conversion: `1 base_uom == rate target_uom`.
///
/// Rates are recorded for reference only; cost calculation compares purchase
/// and consumption quantities as recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRate {
  pub rate_id:       Uuid,
  pub material_id:   Uuid,
  pub base_uom_id:   Uuid,
  pub target_uom_id: Uuid,
  pub rate:          Decimal,
  pub recorded_at:   DateTime<Utc>,
}

impl ConversionRate {
  /// Express `quantity` of the base unit in the target unit.
  pub fn to_target(&self, quantity: Decimal) -> Decimal { quantity * self.rate }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewConversionRate {
  pub material_id:   Uuid,
  pub base_uom_id:   Uuid,
  pub target_uom_id: Uuid,
  pub rate:          Decimal,
}

impl NewConversionRate {
  pub fn validate(&self) -> Result<()> {
    validate::positive("rate", self.rate, RATE_PLACES)
  }
}
