//! Purchases: dated acquisitions of a material from a counterparty.
//!
//! A purchase is a historical fact. Once recorded it is never updated or
//! deleted; the cost calculator relies on purchase history being stable.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  validate::{self, AMOUNT_PLACES},
};

/// A recorded purchase. `price_ex_vat` and `price_with_vat` are totals for
/// the whole `quantity`, not unit prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
  pub purchase_id:     Uuid,
  pub purch_date:      NaiveDate,
  pub counterparty_id: Uuid,
  pub material_id:     Uuid,
  pub purch_uom_id:    Uuid,
  pub quantity:        Decimal,
  pub price_ex_vat:    Decimal,
  pub price_with_vat:  Decimal,
  /// Server-assigned timestamp; orders purchases that share a date.
  pub recorded_at:     DateTime<Utc>,
}

/// Input to [`crate::store::ProductionStore::record_purchase`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewPurchase {
  pub purch_date:      NaiveDate,
  pub counterparty_id: Uuid,
  pub material_id:     Uuid,
  pub purch_uom_id:    Uuid,
  pub quantity:        Decimal,
  pub price_ex_vat:    Decimal,
  pub price_with_vat:  Decimal,
}

impl NewPurchase {
  pub fn validate(&self) -> Result<()> {
    validate::positive("quantity", self.quantity, AMOUNT_PLACES)?;
    validate::non_negative("price_ex_vat", self.price_ex_vat, AMOUNT_PLACES)?;
    validate::non_negative(
      "price_with_vat",
      self.price_with_vat,
      AMOUNT_PLACES,
    )?;
    Ok(())
  }
}

/// Parameters for [`crate::store::ProductionStore::search_purchases`].
///
/// Every bound is optional; `from` and `to` are inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseQuery {
  pub material_id:     Option<Uuid>,
  pub counterparty_id: Option<Uuid>,
  pub from:            Option<NaiveDate>,
  pub to:              Option<NaiveDate>,
}

impl PurchaseQuery {
  /// Purchases of `material_id` dated within `[from, to]`.
  pub fn material_between(
    material_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
  ) -> Self {
    Self {
      material_id: Some(material_id),
      counterparty_id: None,
      from: Some(from),
      to: Some(to),
    }
  }
}
