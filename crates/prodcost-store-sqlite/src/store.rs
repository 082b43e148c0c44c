//! [`SqliteStore`], the SQLite implementation of [`ProductionStore`].

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use prodcost_core::{
  catalog::{
    ConversionRate, Counterparty, NewConversionRate, NewCounterparty,
    NewNomenclature, NewUnitOfMeasure, Nomenclature, UnitOfMeasure,
  },
  error::Entity,
  production::{
    ConsumedMaterial, NewConsumedMaterial, NewProducedItem, NewProductionRun,
    ProducedItem, ProductionRun,
  },
  purchase::{NewPurchase, Purchase, PurchaseQuery},
  store::ProductionStore,
};

use crate::{
  encode::{
    decode_date, encode_date, encode_decimal, encode_dt, encode_uuid, now,
    RawConsumedMaterial, RawConversionRate, RawCounterparty, RawNomenclature,
    RawProducedItem, RawProductionRun, RawPurchase, RawUnit,
  },
  schema::SCHEMA,
  Error, Result,
};

type RowMapper<R> = fn(&rusqlite::Row<'_>) -> rusqlite::Result<R>;

/// Result of a `DELETE` that may trip a foreign-key restriction.
enum Deletion {
  Deleted,
  Missing,
  Referenced,
}

/// SQLite reports both `RESTRICT` and dangling-reference failures as
/// constraint violations.
fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A production ledger backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests and throwaway ledgers.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run an `INSERT`; a constraint failure means one of the referenced rows
  /// does not exist.
  async fn insert(
    &self,
    entity: Entity,
    sql: &'static str,
    values: Vec<String>,
  ) -> Result<()> {
    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(sql, rusqlite::params_from_iter(values.iter())) {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(prodcost_core::Error::UnknownReference(entity).into());
    }
    Ok(())
  }

  /// Run a single-row `DELETE` keyed by `id`.
  async fn delete(
    &self,
    entity: Entity,
    sql: &'static str,
    id: Uuid,
  ) -> Result<bool> {
    let key = encode_uuid(id);

    let outcome = self
      .conn
      .call(move |conn| match conn.execute(sql, rusqlite::params![key]) {
        Ok(0) => Ok(Deletion::Missing),
        Ok(_) => Ok(Deletion::Deleted),
        Err(e) if is_constraint_violation(&e) => Ok(Deletion::Referenced),
        Err(e) => Err(e.into()),
      })
      .await?;

    match outcome {
      Deletion::Deleted => Ok(true),
      Deletion::Missing => Ok(false),
      Deletion::Referenced => {
        tracing::warn!(%entity, %id, "deletion rejected, row is still referenced");
        Err(prodcost_core::Error::IntegrityViolation(entity, id).into())
      }
    }
  }

  async fn fetch_one<R>(
    &self,
    sql: String,
    params: Vec<String>,
    map: RowMapper<R>,
  ) -> Result<Option<R>>
  where
    R: Send + 'static,
  {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(&sql, rusqlite::params_from_iter(params.iter()), map)
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn fetch_all<R>(
    &self,
    sql: String,
    params: Vec<String>,
    map: RowMapper<R>,
  ) -> Result<Vec<R>>
  where
    R: Send + 'static,
  {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), map)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }
}

// ─── ProductionStore impl ────────────────────────────────────────────────────

impl ProductionStore for SqliteStore {
  type Error = Error;

  // ── Units of measure ──────────────────────────────────────────────────────

  async fn add_unit(&self, input: NewUnitOfMeasure) -> Result<UnitOfMeasure> {
    input.validate()?;
    let unit = UnitOfMeasure {
      uom_id:      Uuid::new_v4(),
      name:        input.name,
      recorded_at: now(),
    };

    self
      .insert(
        Entity::UnitOfMeasure,
        "INSERT INTO units (uom_id, name, recorded_at) VALUES (?1, ?2, ?3)",
        vec![
          encode_uuid(unit.uom_id),
          unit.name.clone(),
          encode_dt(unit.recorded_at),
        ],
      )
      .await?;

    Ok(unit)
  }

  async fn get_unit(&self, id: Uuid) -> Result<Option<UnitOfMeasure>> {
    let sql = format!("SELECT {} FROM units WHERE uom_id = ?1", RawUnit::COLUMNS);
    let raw = self
      .fetch_one(sql, vec![encode_uuid(id)], RawUnit::from_row)
      .await?;
    raw.map(RawUnit::into_unit).transpose()
  }

  async fn list_units(&self) -> Result<Vec<UnitOfMeasure>> {
    let sql = format!("SELECT {} FROM units ORDER BY name", RawUnit::COLUMNS);
    let raws = self.fetch_all(sql, vec![], RawUnit::from_row).await?;
    raws.into_iter().map(RawUnit::into_unit).collect()
  }

  async fn delete_unit(&self, id: Uuid) -> Result<bool> {
    self
      .delete(
        Entity::UnitOfMeasure,
        "DELETE FROM units WHERE uom_id = ?1",
        id,
      )
      .await
  }

  // ── Nomenclature ──────────────────────────────────────────────────────────

  async fn add_nomenclature(&self, input: NewNomenclature) -> Result<Nomenclature> {
    input.validate()?;
    let entry = Nomenclature {
      nomenclature_id: Uuid::new_v4(),
      name:            input.name,
      base_uom_id:     input.base_uom_id,
      recorded_at:     now(),
    };

    self
      .insert(
        Entity::Nomenclature,
        "INSERT INTO nomenclature (nomenclature_id, name, base_uom_id, recorded_at)
         VALUES (?1, ?2, ?3, ?4)",
        vec![
          encode_uuid(entry.nomenclature_id),
          entry.name.clone(),
          encode_uuid(entry.base_uom_id),
          encode_dt(entry.recorded_at),
        ],
      )
      .await?;

    Ok(entry)
  }

  async fn get_nomenclature(&self, id: Uuid) -> Result<Option<Nomenclature>> {
    let sql = format!(
      "SELECT {} FROM nomenclature WHERE nomenclature_id = ?1",
      RawNomenclature::COLUMNS
    );
    let raw = self
      .fetch_one(sql, vec![encode_uuid(id)], RawNomenclature::from_row)
      .await?;
    raw.map(RawNomenclature::into_nomenclature).transpose()
  }

  async fn list_nomenclature(&self) -> Result<Vec<Nomenclature>> {
    let sql = format!(
      "SELECT {} FROM nomenclature ORDER BY name",
      RawNomenclature::COLUMNS
    );
    let raws = self.fetch_all(sql, vec![], RawNomenclature::from_row).await?;
    raws
      .into_iter()
      .map(RawNomenclature::into_nomenclature)
      .collect()
  }

  async fn delete_nomenclature(&self, id: Uuid) -> Result<bool> {
    self
      .delete(
        Entity::Nomenclature,
        "DELETE FROM nomenclature WHERE nomenclature_id = ?1",
        id,
      )
      .await
  }

  // ── Counterparties ────────────────────────────────────────────────────────

  async fn add_counterparty(&self, input: NewCounterparty) -> Result<Counterparty> {
    input.validate()?;
    let party = Counterparty {
      counterparty_id: Uuid::new_v4(),
      name:            input.name,
      recorded_at:     now(),
    };

    self
      .insert(
        Entity::Counterparty,
        "INSERT INTO counterparties (counterparty_id, name, recorded_at)
         VALUES (?1, ?2, ?3)",
        vec![
          encode_uuid(party.counterparty_id),
          party.name.clone(),
          encode_dt(party.recorded_at),
        ],
      )
      .await?;

    Ok(party)
  }

  async fn get_counterparty(&self, id: Uuid) -> Result<Option<Counterparty>> {
    let sql = format!(
      "SELECT {} FROM counterparties WHERE counterparty_id = ?1",
      RawCounterparty::COLUMNS
    );
    let raw = self
      .fetch_one(sql, vec![encode_uuid(id)], RawCounterparty::from_row)
      .await?;
    raw.map(RawCounterparty::into_counterparty).transpose()
  }

  async fn list_counterparties(&self) -> Result<Vec<Counterparty>> {
    let sql = format!(
      "SELECT {} FROM counterparties ORDER BY name",
      RawCounterparty::COLUMNS
    );
    let raws = self.fetch_all(sql, vec![], RawCounterparty::from_row).await?;
    raws
      .into_iter()
      .map(RawCounterparty::into_counterparty)
      .collect()
  }

  async fn delete_counterparty(&self, id: Uuid) -> Result<bool> {
    self
      .delete(
        Entity::Counterparty,
        "DELETE FROM counterparties WHERE counterparty_id = ?1",
        id,
      )
      .await
  }

  // ── Conversion rates ──────────────────────────────────────────────────────

  async fn add_conversion_rate(
    &self,
    input: NewConversionRate,
  ) -> Result<ConversionRate> {
    input.validate()?;
    let rate = ConversionRate {
      rate_id:       Uuid::new_v4(),
      material_id:   input.material_id,
      base_uom_id:   input.base_uom_id,
      target_uom_id: input.target_uom_id,
      rate:          input.rate,
      recorded_at:   now(),
    };

    self
      .insert(
        Entity::ConversionRate,
        "INSERT INTO conversion_rates (
           rate_id, material_id, base_uom_id, target_uom_id, rate, recorded_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        vec![
          encode_uuid(rate.rate_id),
          encode_uuid(rate.material_id),
          encode_uuid(rate.base_uom_id),
          encode_uuid(rate.target_uom_id),
          encode_decimal(rate.rate),
          encode_dt(rate.recorded_at),
        ],
      )
      .await?;

    Ok(rate)
  }

  async fn list_conversion_rates(
    &self,
    material_id: Option<Uuid>,
  ) -> Result<Vec<ConversionRate>> {
    let (sql, params) = match material_id {
      Some(id) => (
        format!(
          "SELECT {} FROM conversion_rates WHERE material_id = ?1
           ORDER BY recorded_at, rate_id",
          RawConversionRate::COLUMNS
        ),
        vec![encode_uuid(id)],
      ),
      None => (
        format!(
          "SELECT {} FROM conversion_rates ORDER BY recorded_at, rate_id",
          RawConversionRate::COLUMNS
        ),
        vec![],
      ),
    };

    let raws = self.fetch_all(sql, params, RawConversionRate::from_row).await?;
    raws
      .into_iter()
      .map(RawConversionRate::into_conversion_rate)
      .collect()
  }

  // ── Purchases (append-only) ───────────────────────────────────────────────

  async fn record_purchase(&self, input: NewPurchase) -> Result<Purchase> {
    input.validate()?;
    let purchase = Purchase {
      purchase_id:     Uuid::new_v4(),
      purch_date:      input.purch_date,
      counterparty_id: input.counterparty_id,
      material_id:     input.material_id,
      purch_uom_id:    input.purch_uom_id,
      quantity:        input.quantity,
      price_ex_vat:    input.price_ex_vat,
      price_with_vat:  input.price_with_vat,
      recorded_at:     now(),
    };

    self
      .insert(
        Entity::Purchase,
        "INSERT INTO purchases (
           purchase_id, purch_date, counterparty_id, material_id, purch_uom_id,
           quantity, price_ex_vat, price_with_vat, recorded_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        vec![
          encode_uuid(purchase.purchase_id),
          encode_date(purchase.purch_date),
          encode_uuid(purchase.counterparty_id),
          encode_uuid(purchase.material_id),
          encode_uuid(purchase.purch_uom_id),
          encode_decimal(purchase.quantity),
          encode_decimal(purchase.price_ex_vat),
          encode_decimal(purchase.price_with_vat),
          encode_dt(purchase.recorded_at),
        ],
      )
      .await?;

    Ok(purchase)
  }

  async fn get_purchase(&self, id: Uuid) -> Result<Option<Purchase>> {
    let sql = format!(
      "SELECT {} FROM purchases WHERE purchase_id = ?1",
      RawPurchase::COLUMNS
    );
    let raw = self
      .fetch_one(sql, vec![encode_uuid(id)], RawPurchase::from_row)
      .await?;
    raw.map(RawPurchase::into_purchase).transpose()
  }

  async fn search_purchases(&self, query: &PurchaseQuery) -> Result<Vec<Purchase>> {
    // Build WHERE clause dynamically; parameters are numbered in push order.
    let mut conds: Vec<String> = vec![];
    let mut params: Vec<String> = vec![];

    if let Some(id) = query.material_id {
      params.push(encode_uuid(id));
      conds.push(format!("material_id = ?{}", params.len()));
    }
    if let Some(id) = query.counterparty_id {
      params.push(encode_uuid(id));
      conds.push(format!("counterparty_id = ?{}", params.len()));
    }
    if let Some(from) = query.from {
      params.push(encode_date(from));
      conds.push(format!("purch_date >= ?{}", params.len()));
    }
    if let Some(to) = query.to {
      params.push(encode_date(to));
      conds.push(format!("purch_date <= ?{}", params.len()));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    let sql = format!(
      "SELECT {} FROM purchases {where_clause}
       ORDER BY purch_date, recorded_at, purchase_id",
      RawPurchase::COLUMNS
    );

    let raws = self.fetch_all(sql, params, RawPurchase::from_row).await?;
    raws.into_iter().map(RawPurchase::into_purchase).collect()
  }

  async fn latest_purchase(
    &self,
    material_id:  Uuid,
    on_or_before: NaiveDate,
  ) -> Result<Option<Purchase>> {
    let sql = format!(
      "SELECT {} FROM purchases
       WHERE material_id = ?1 AND purch_date <= ?2
       ORDER BY purch_date DESC, recorded_at ASC, purchase_id ASC
       LIMIT 1",
      RawPurchase::COLUMNS
    );
    let raw = self
      .fetch_one(
        sql,
        vec![encode_uuid(material_id), encode_date(on_or_before)],
        RawPurchase::from_row,
      )
      .await?;
    raw.map(RawPurchase::into_purchase).transpose()
  }

  // ── Production runs ───────────────────────────────────────────────────────

  async fn add_production_run(&self, input: NewProductionRun) -> Result<ProductionRun> {
    input.validate()?;
    let run = ProductionRun {
      run_id:      Uuid::new_v4(),
      prod_date:   input.prod_date,
      description: input.description,
      recorded_at: now(),
    };

    self
      .insert(
        Entity::ProductionRun,
        "INSERT INTO production_runs (run_id, prod_date, description, recorded_at)
         VALUES (?1, ?2, ?3, ?4)",
        vec![
          encode_uuid(run.run_id),
          encode_date(run.prod_date),
          run.description.clone(),
          encode_dt(run.recorded_at),
        ],
      )
      .await?;

    Ok(run)
  }

  async fn get_production_run(&self, id: Uuid) -> Result<Option<ProductionRun>> {
    let sql = format!(
      "SELECT {} FROM production_runs WHERE run_id = ?1",
      RawProductionRun::COLUMNS
    );
    let raw = self
      .fetch_one(sql, vec![encode_uuid(id)], RawProductionRun::from_row)
      .await?;
    raw.map(RawProductionRun::into_run).transpose()
  }

  async fn list_production_runs(&self) -> Result<Vec<ProductionRun>> {
    let sql = format!(
      "SELECT {} FROM production_runs ORDER BY prod_date DESC, recorded_at DESC",
      RawProductionRun::COLUMNS
    );
    let raws = self.fetch_all(sql, vec![], RawProductionRun::from_row).await?;
    raws.into_iter().map(RawProductionRun::into_run).collect()
  }

  async fn delete_production_run(&self, id: Uuid) -> Result<bool> {
    self
      .delete(
        Entity::ProductionRun,
        "DELETE FROM production_runs WHERE run_id = ?1",
        id,
      )
      .await
  }

  // ── Produced items ────────────────────────────────────────────────────────

  async fn add_produced_item(
    &self,
    run_id: Uuid,
    input:  NewProducedItem,
  ) -> Result<ProducedItem> {
    input.validate()?;
    let item = ProducedItem {
      item_id: Uuid::new_v4(),
      run_id,
      nomenclature_id: input.nomenclature_id,
      produced_uom_id: input.produced_uom_id,
      quantity: input.quantity,
      recorded_at: now(),
    };

    self
      .insert(
        Entity::ProducedItem,
        "INSERT INTO produced_items (
           item_id, run_id, nomenclature_id, produced_uom_id, quantity, recorded_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        vec![
          encode_uuid(item.item_id),
          encode_uuid(item.run_id),
          encode_uuid(item.nomenclature_id),
          encode_uuid(item.produced_uom_id),
          encode_decimal(item.quantity),
          encode_dt(item.recorded_at),
        ],
      )
      .await?;

    Ok(item)
  }

  async fn get_produced_item(&self, id: Uuid) -> Result<Option<ProducedItem>> {
    let sql = format!(
      "SELECT {} FROM produced_items WHERE item_id = ?1",
      RawProducedItem::COLUMNS
    );
    let raw = self
      .fetch_one(sql, vec![encode_uuid(id)], RawProducedItem::from_row)
      .await?;
    raw.map(RawProducedItem::into_item).transpose()
  }

  async fn list_produced_items(&self, run_id: Uuid) -> Result<Vec<ProducedItem>> {
    let sql = format!(
      "SELECT {} FROM produced_items WHERE run_id = ?1
       ORDER BY recorded_at, item_id",
      RawProducedItem::COLUMNS
    );
    let raws = self
      .fetch_all(sql, vec![encode_uuid(run_id)], RawProducedItem::from_row)
      .await?;
    raws.into_iter().map(RawProducedItem::into_item).collect()
  }

  async fn delete_produced_item(&self, id: Uuid) -> Result<bool> {
    self
      .delete(
        Entity::ProducedItem,
        "DELETE FROM produced_items WHERE item_id = ?1",
        id,
      )
      .await
  }

  // ── Consumed materials ────────────────────────────────────────────────────

  async fn add_consumed_material(
    &self,
    item_id: Uuid,
    input:   NewConsumedMaterial,
  ) -> Result<ConsumedMaterial> {
    input.validate()?;
    let consumed = ConsumedMaterial {
      consumed_id: Uuid::new_v4(),
      item_id,
      material_id: input.material_id,
      consumed_uom_id: input.consumed_uom_id,
      quantity: input.quantity,
      recorded_at: now(),
    };

    self
      .insert(
        Entity::ConsumedMaterial,
        "INSERT INTO consumed_materials (
           consumed_id, item_id, material_id, consumed_uom_id, quantity, recorded_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        vec![
          encode_uuid(consumed.consumed_id),
          encode_uuid(consumed.item_id),
          encode_uuid(consumed.material_id),
          encode_uuid(consumed.consumed_uom_id),
          encode_decimal(consumed.quantity),
          encode_dt(consumed.recorded_at),
        ],
      )
      .await?;

    Ok(consumed)
  }

  async fn get_consumed_material(&self, id: Uuid) -> Result<Option<ConsumedMaterial>> {
    let sql = format!(
      "SELECT {} FROM consumed_materials WHERE consumed_id = ?1",
      RawConsumedMaterial::COLUMNS
    );
    let raw = self
      .fetch_one(sql, vec![encode_uuid(id)], RawConsumedMaterial::from_row)
      .await?;
    raw.map(RawConsumedMaterial::into_consumed).transpose()
  }

  async fn list_consumed_materials(
    &self,
    item_id: Uuid,
  ) -> Result<Vec<ConsumedMaterial>> {
    let sql = format!(
      "SELECT {} FROM consumed_materials WHERE item_id = ?1
       ORDER BY recorded_at, consumed_id",
      RawConsumedMaterial::COLUMNS
    );
    let raws = self
      .fetch_all(sql, vec![encode_uuid(item_id)], RawConsumedMaterial::from_row)
      .await?;
    raws
      .into_iter()
      .map(RawConsumedMaterial::into_consumed)
      .collect()
  }

  // ── Read-side joins ───────────────────────────────────────────────────────

  async fn production_date(&self, item_id: Uuid) -> Result<Option<NaiveDate>> {
    let raw: Option<String> = self
      .fetch_one(
        "SELECT r.prod_date
         FROM produced_items i
         JOIN production_runs r ON r.run_id = i.run_id
         WHERE i.item_id = ?1"
          .to_owned(),
        vec![encode_uuid(item_id)],
        |row| row.get(0),
      )
      .await?;
    raw.as_deref().map(decode_date).transpose()
  }
}
