//! Costed read models. Never stored; derived on every request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::production::{ConsumedMaterial, ProducedItem, ProductionRun};

/// A consumed material with the prices derived from purchase history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumedMaterialCost {
  pub consumed:               ConsumedMaterial,
  /// Weighted average price per purchased unit.
  pub average_purchase_price: Decimal,
  /// `average_purchase_price * consumed.quantity`.
  pub full_purchase_price:    Decimal,
}

/// A produced item with its cost price and the per-material breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducedItemCost {
  pub item:       ProducedItem,
  /// Sum of `full_purchase_price` over `consumed`; zero when nothing was
  /// consumed.
  pub cost_price: Decimal,
  pub consumed:   Vec<ConsumedMaterialCost>,
}

/// A production run with every produced item costed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionRunDetail {
  pub run:   ProductionRun,
  pub items: Vec<ProducedItemCost>,
}
