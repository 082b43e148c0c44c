//! Error types for `prodcost-core`.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
  UnitOfMeasure,
  Nomenclature,
  Counterparty,
  ConversionRate,
  Purchase,
  ProductionRun,
  ProducedItem,
  ConsumedMaterial,
}

impl std::fmt::Display for Entity {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let label = match self {
      Self::UnitOfMeasure => "unit of measure",
      Self::Nomenclature => "nomenclature",
      Self::Counterparty => "counterparty",
      Self::ConversionRate => "conversion rate",
      Self::Purchase => "purchase",
      Self::ProductionRun => "production run",
      Self::ProducedItem => "produced item",
      Self::ConsumedMaterial => "consumed material",
    };
    f.write_str(label)
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} not found: {1}")]
  NotFound(Entity, Uuid),

  /// No purchase of the material exists on or before the production date.
  #[error("no purchase history for material {material_id} on or before {cutoff}")]
  NoPurchaseHistory {
    material_id: Uuid,
    cutoff:      NaiveDate,
  },

  /// The purchases selected for averaging add up to a zero quantity.
  #[error("purchases of material {0} have a total quantity of zero")]
  ZeroPurchaseQuantity(Uuid),

  /// Deletion rejected because other rows still point at this one.
  #[error("{0} {1} is still referenced and cannot be deleted")]
  IntegrityViolation(Entity, Uuid),

  /// A new row points at a row that does not exist.
  #[error("unknown reference in new {0}")]
  UnknownReference(Entity),

  #[error("invalid {field}: {reason}")]
  Validation {
    field:  &'static str,
    reason: String,
  },
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound(..) | Self::NoPurchaseHistory { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
