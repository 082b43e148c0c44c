//! Cost calculation for produced goods.
//!
//! The cost basis of a consumed material is the quantity-weighted average
//! purchase price of that material over the [`LOOKBACK_DAYS`] ending on the
//! production date, both ends inclusive. When nothing was bought inside that
//! window the latest purchase on or before the production date is used on
//! its own. A material with no purchase history at all cannot be costed and
//! fails the whole computation.
//!
//! Quantities are compared as recorded: a purchase made in one unit and a
//! consumption recorded in another are not converted.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
  Error, Result,
  error::Entity,
  production::{ConsumedMaterial, ProducedItem},
  purchase::{Purchase, PurchaseQuery},
  report::{ConsumedMaterialCost, ProducedItemCost, ProductionRunDetail},
  store::ProductionStore,
};

/// Length of the trailing purchase window, in days.
pub const LOOKBACK_DAYS: u64 = 30;

// ─── Window ──────────────────────────────────────────────────────────────────

/// The inclusive date range `[end - LOOKBACK_DAYS, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseWindow {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

impl PurchaseWindow {
  pub fn ending_on(end: NaiveDate) -> Self {
    let start = end
      .checked_sub_days(Days::new(LOOKBACK_DAYS))
      .unwrap_or(NaiveDate::MIN);
    Self { start, end }
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }
}

// ─── Averaging ───────────────────────────────────────────────────────────────

/// `Σ price_ex_vat / Σ quantity` over `purchases`.
pub fn weighted_average(
  material_id: Uuid,
  purchases: &[Purchase],
) -> Result<Decimal> {
  let total_price: Decimal = purchases.iter().map(|p| p.price_ex_vat).sum();
  let total_quantity: Decimal = purchases.iter().map(|p| p.quantity).sum();
  total_price
    .checked_div(total_quantity)
    .ok_or(Error::ZeroPurchaseQuantity(material_id))
}

// ─── Calculator ──────────────────────────────────────────────────────────────

/// Read-only cost derivations over a [`ProductionStore`].
///
/// Nothing is cached; every call re-reads purchase history.
pub struct CostCalculator<'a, S> {
  store: &'a S,
}

impl<'a, S: ProductionStore> CostCalculator<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Weighted average purchase price of the material consumed by `consumed`,
  /// as of the production date of its run.
  pub async fn average_purchase_price(
    &self,
    consumed: &ConsumedMaterial,
  ) -> Result<Decimal, S::Error> {
    let cutoff = self.production_date(consumed.item_id).await?;
    self.average_price_as_of(consumed.material_id, cutoff).await
  }

  /// `average_purchase_price(consumed) * consumed.quantity`.
  pub async fn full_purchase_price(
    &self,
    consumed: &ConsumedMaterial,
  ) -> Result<Decimal, S::Error> {
    Ok(self.average_purchase_price(consumed).await? * consumed.quantity)
  }

  /// Sum of the full purchase prices of everything consumed by `item`.
  pub async fn cost_price(&self, item: &ProducedItem) -> Result<Decimal, S::Error> {
    Ok(self.cost_breakdown(item).await?.cost_price)
  }

  /// `item` with its cost price and per-material prices.
  pub async fn cost_breakdown(
    &self,
    item: &ProducedItem,
  ) -> Result<ProducedItemCost, S::Error> {
    let cutoff = self.production_date(item.item_id).await?;
    self.cost_item(item.clone(), cutoff).await
  }

  /// Materialise a [`ProductionRunDetail`]. Returns `None` if the run does not
  /// exist.
  pub async fn production_run_detail(
    &self,
    run_id: Uuid,
  ) -> Result<Option<ProductionRunDetail>, S::Error> {
    let run = match self.store.get_production_run(run_id).await? {
      Some(run) => run,
      None => return Ok(None),
    };

    let mut items = Vec::new();
    for item in self.store.list_produced_items(run_id).await? {
      items.push(self.cost_item(item, run.prod_date).await?);
    }

    Ok(Some(ProductionRunDetail { run, items }))
  }

  /// Weighted average purchase price of `material_id` for a production dated
  /// `cutoff`.
  pub async fn average_price_as_of(
    &self,
    material_id: Uuid,
    cutoff: NaiveDate,
  ) -> Result<Decimal, S::Error> {
    let window = PurchaseWindow::ending_on(cutoff);
    let query =
      PurchaseQuery::material_between(material_id, window.start, window.end);
    let mut purchases = self.store.search_purchases(&query).await?;

    if purchases.is_empty() {
      let latest = self
        .store
        .latest_purchase(material_id, cutoff)
        .await?
        .ok_or(Error::NoPurchaseHistory { material_id, cutoff })?;
      tracing::debug!(
        %material_id,
        %cutoff,
        fallback_date = %latest.purch_date,
        "no purchases in window, using latest earlier purchase"
      );
      purchases.push(latest);
    }

    Ok(weighted_average(material_id, &purchases)?)
  }

  async fn production_date(&self, item_id: Uuid) -> Result<NaiveDate, S::Error> {
    Ok(
      self
        .store
        .production_date(item_id)
        .await?
        .ok_or(Error::NotFound(Entity::ProducedItem, item_id))?,
    )
  }

  async fn cost_item(
    &self,
    item: ProducedItem,
    cutoff: NaiveDate,
  ) -> Result<ProducedItemCost, S::Error> {
    let mut consumed = Vec::new();
    let mut cost_price = Decimal::ZERO;

    for material in self.store.list_consumed_materials(item.item_id).await? {
      let average_purchase_price =
        self.average_price_as_of(material.material_id, cutoff).await?;
      let full_purchase_price = average_purchase_price * material.quantity;
      cost_price += full_purchase_price;
      consumed.push(ConsumedMaterialCost {
        consumed: material,
        average_purchase_price,
        full_purchase_price,
      });
    }

    Ok(ProducedItemCost { item, cost_price, consumed })
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use chrono::Utc;

  use super::*;

  fn d(s: &str) -> Decimal { Decimal::from_str(s).unwrap() }

  fn date(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn purchase(on: NaiveDate, quantity: &str, price_ex_vat: &str) -> Purchase {
    Purchase {
      purchase_id: Uuid::new_v4(),
      purch_date: on,
      counterparty_id: Uuid::nil(),
      material_id: Uuid::nil(),
      purch_uom_id: Uuid::nil(),
      quantity: d(quantity),
      price_ex_vat: d(price_ex_vat),
      price_with_vat: d(price_ex_vat),
      recorded_at: Utc::now(),
    }
  }

  #[test]
  fn window_spans_thirty_days_inclusive() {
    let window = PurchaseWindow::ending_on(date(2024, 1, 31));
    assert_eq!(window.start, date(2024, 1, 1));
    assert!(window.contains(date(2024, 1, 1)));
    assert!(window.contains(date(2024, 1, 31)));
    assert!(!window.contains(date(2023, 12, 31)));
    assert!(!window.contains(date(2024, 2, 1)));
  }

  #[test]
  fn window_crosses_leap_day() {
    let window = PurchaseWindow::ending_on(date(2024, 3, 1));
    assert_eq!(window.start, date(2024, 1, 31));
  }

  #[test]
  fn weighted_average_divides_totals() {
    let purchases = [
      purchase(date(2024, 1, 1), "10", "100"),
      purchase(date(2024, 1, 15), "5", "60"),
    ];
    let avg = weighted_average(Uuid::nil(), &purchases).unwrap();
    assert_eq!(avg.round_dp(3), d("10.667"));
    assert_eq!((avg * d("3")).round_dp(3), d("32.000"));
  }

  #[test]
  fn weighted_average_of_single_purchase_is_its_unit_price() {
    let purchases = [purchase(date(2024, 1, 15), "5", "60")];
    assert_eq!(weighted_average(Uuid::nil(), &purchases).unwrap(), d("12"));
  }

  #[test]
  fn weighted_average_rejects_zero_quantity() {
    let err = weighted_average(Uuid::nil(), &[]).unwrap_err();
    assert!(matches!(err, Error::ZeroPurchaseQuantity(_)));
  }
}
