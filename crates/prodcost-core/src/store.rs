//! The `ProductionStore` trait and its error contract.
//!
//! The trait is implemented by storage backends (e.g.
//! `prodcost-store-sqlite`). Higher layers (`prodcost-api`, the cost
//! calculator) depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  catalog::{
    ConversionRate, Counterparty, NewConversionRate, NewCounterparty,
    NewNomenclature, NewUnitOfMeasure, Nomenclature, UnitOfMeasure,
  },
  production::{
    ConsumedMaterial, NewConsumedMaterial, NewProducedItem, NewProductionRun,
    ProducedItem, ProductionRun,
  },
  purchase::{NewPurchase, Purchase, PurchaseQuery},
};

// ─── Error contract ──────────────────────────────────────────────────────────

/// Backend errors must be able to carry a domain [`crate::Error`] and hand it
/// back, so callers can tell a missing row or a protected reference apart
/// from an I/O failure.
pub trait StoreError: std::error::Error + From<crate::Error> + Send + Sync + 'static {
  /// The domain error wrapped by this backend error, if any.
  fn core(&self) -> Option<&crate::Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a production ledger backend.
///
/// Every `add_*`/`record_*` method validates its input before writing.
/// Purchases are append-only. Deleting a catalog row that is still referenced
/// fails with [`crate::Error::IntegrityViolation`]; deleting a production run
/// or produced item removes everything it owns. `delete_*` methods return
/// `false` when the row does not exist.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ProductionStore: Send + Sync {
  type Error: StoreError;

  // ── Units of measure ──────────────────────────────────────────────────

  fn add_unit(
    &self,
    input: NewUnitOfMeasure,
  ) -> impl Future<Output = Result<UnitOfMeasure, Self::Error>> + Send + '_;

  fn get_unit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<UnitOfMeasure>, Self::Error>> + Send + '_;

  fn list_units(
    &self,
  ) -> impl Future<Output = Result<Vec<UnitOfMeasure>, Self::Error>> + Send + '_;

  fn delete_unit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Nomenclature ──────────────────────────────────────────────────────

  fn add_nomenclature(
    &self,
    input: NewNomenclature,
  ) -> impl Future<Output = Result<Nomenclature, Self::Error>> + Send + '_;

  fn get_nomenclature(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Nomenclature>, Self::Error>> + Send + '_;

  fn list_nomenclature(
    &self,
  ) -> impl Future<Output = Result<Vec<Nomenclature>, Self::Error>> + Send + '_;

  fn delete_nomenclature(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Counterparties ────────────────────────────────────────────────────

  fn add_counterparty(
    &self,
    input: NewCounterparty,
  ) -> impl Future<Output = Result<Counterparty, Self::Error>> + Send + '_;

  fn get_counterparty(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Counterparty>, Self::Error>> + Send + '_;

  fn list_counterparties(
    &self,
  ) -> impl Future<Output = Result<Vec<Counterparty>, Self::Error>> + Send + '_;

  fn delete_counterparty(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Conversion rates ──────────────────────────────────────────────────

  fn add_conversion_rate(
    &self,
    input: NewConversionRate,
  ) -> impl Future<Output = Result<ConversionRate, Self::Error>> + Send + '_;

  /// List conversion rates, optionally restricted to one material.
  fn list_conversion_rates(
    &self,
    material_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<ConversionRate>, Self::Error>> + Send + '_;

  // ── Purchases (append-only) ───────────────────────────────────────────

  /// Record a purchase. The `recorded_at` timestamp is set by the store.
  fn record_purchase(
    &self,
    input: NewPurchase,
  ) -> impl Future<Output = Result<Purchase, Self::Error>> + Send + '_;

  fn get_purchase(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Purchase>, Self::Error>> + Send + '_;

  /// Purchases matching every bound set in `query`, ordered by `purch_date`
  /// then `recorded_at`.
  fn search_purchases<'a>(
    &'a self,
    query: &'a PurchaseQuery,
  ) -> impl Future<Output = Result<Vec<Purchase>, Self::Error>> + Send + 'a;

  /// The most recent purchase of `material_id` dated on or before
  /// `on_or_before`. Among purchases sharing that date, the one recorded
  /// first wins.
  fn latest_purchase(
    &self,
    material_id: Uuid,
    on_or_before: NaiveDate,
  ) -> impl Future<Output = Result<Option<Purchase>, Self::Error>> + Send + '_;

  // ── Production runs ───────────────────────────────────────────────────

  fn add_production_run(
    &self,
    input: NewProductionRun,
  ) -> impl Future<Output = Result<ProductionRun, Self::Error>> + Send + '_;

  fn get_production_run(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ProductionRun>, Self::Error>> + Send + '_;

  /// All runs, newest production date first.
  fn list_production_runs(
    &self,
  ) -> impl Future<Output = Result<Vec<ProductionRun>, Self::Error>> + Send + '_;

  /// Delete a run together with its produced items and their consumption.
  fn delete_production_run(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Produced items ────────────────────────────────────────────────────

  fn add_produced_item(
    &self,
    run_id: Uuid,
    input: NewProducedItem,
  ) -> impl Future<Output = Result<ProducedItem, Self::Error>> + Send + '_;

  fn get_produced_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ProducedItem>, Self::Error>> + Send + '_;

  fn list_produced_items(
    &self,
    run_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ProducedItem>, Self::Error>> + Send + '_;

  /// Delete a produced item together with its consumed materials.
  fn delete_produced_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Consumed materials ────────────────────────────────────────────────

  fn add_consumed_material(
    &self,
    item_id: Uuid,
    input: NewConsumedMaterial,
  ) -> impl Future<Output = Result<ConsumedMaterial, Self::Error>> + Send + '_;

  fn get_consumed_material(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ConsumedMaterial>, Self::Error>> + Send + '_;

  fn list_consumed_materials(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ConsumedMaterial>, Self::Error>> + Send + '_;

  // ── Read-side joins ───────────────────────────────────────────────────

  /// The `prod_date` of the run owning produced item `item_id`, or `None` if
  /// the item does not exist.
  fn production_date(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Option<NaiveDate>, Self::Error>> + Send + '_;
}
