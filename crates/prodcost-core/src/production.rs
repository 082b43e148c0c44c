//! Production records.
//!
//! Ownership runs strictly downwards: a [`ProductionRun`] owns its
//! [`ProducedItem`]s and each produced item owns its [`ConsumedMaterial`]s.
//! Deleting a run removes everything beneath it. Child records carry the id
//! of their owner; nothing points back up except through store queries.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  validate::{self, AMOUNT_PLACES, DESCRIPTION_MAX_CHARS},
};

// ─── Production run ──────────────────────────────────────────────────────────

/// A dated batch production event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRun {
  pub run_id:      Uuid,
  pub prod_date:   NaiveDate,
  pub description: String,
  pub recorded_at: DateTime<Utc>,
}

impl fmt::Display for ProductionRun {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} - {}", self.description, self.prod_date)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProductionRun {
  pub prod_date:   NaiveDate,
  pub description: String,
}

impl NewProductionRun {
  pub fn validate(&self) -> Result<()> {
    validate::label("description", &self.description, DESCRIPTION_MAX_CHARS)
  }
}

// ─── Produced item ───────────────────────────────────────────────────────────

/// A quantity of an output nomenclature yielded by a production run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducedItem {
  pub item_id:         Uuid,
  pub run_id:          Uuid,
  pub nomenclature_id: Uuid,
  pub produced_uom_id: Uuid,
  pub quantity:        Decimal,
  pub recorded_at:     DateTime<Utc>,
}

/// Input to [`crate::store::ProductionStore::add_produced_item`]. The owning
/// run is supplied separately.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProducedItem {
  pub nomenclature_id: Uuid,
  pub produced_uom_id: Uuid,
  pub quantity:        Decimal,
}

impl NewProducedItem {
  pub fn validate(&self) -> Result<()> {
    validate::positive("quantity", self.quantity, AMOUNT_PLACES)
  }
}

// ─── Consumed material ───────────────────────────────────────────────────────

/// A quantity of an input nomenclature consumed to yield one produced item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedMaterial {
  pub consumed_id:     Uuid,
  pub item_id:         Uuid,
  pub material_id:     Uuid,
  pub consumed_uom_id: Uuid,
  pub quantity:        Decimal,
  pub recorded_at:     DateTime<Utc>,
}

/// Input to [`crate::store::ProductionStore::add_consumed_material`]. The
/// owning produced item is supplied separately.
#[derive(Debug, Clone, Deserialize)]
pub struct NewConsumedMaterial {
  pub material_id:     Uuid,
  pub consumed_uom_id: Uuid,
  pub quantity:        Decimal,
}

impl NewConsumedMaterial {
  pub fn validate(&self) -> Result<()> {
    validate::positive("quantity", self.quantity, AMOUNT_PLACES)
  }
}
