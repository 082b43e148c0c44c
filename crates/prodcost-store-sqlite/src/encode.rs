//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed microsecond width so
//! they sort lexicographically. Business dates are stored as `YYYY-MM-DD`.
//! Decimals are stored as their canonical string form, never as REAL, so no
//! precision is lost. UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use prodcost_core::{
  catalog::{ConversionRate, Counterparty, Nomenclature, UnitOfMeasure},
  production::{ConsumedMaterial, ProducedItem, ProductionRun},
  purchase::Purchase,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Decimal ──────────────────────────────────────────────────────────────────

pub fn encode_decimal(d: Decimal) -> String { d.normalize().to_string() }

pub fn decode_decimal(s: &str) -> Result<Decimal> { Ok(Decimal::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `units` row.
pub struct RawUnit {
  pub uom_id:      String,
  pub name:        String,
  pub recorded_at: String,
}

impl RawUnit {
  pub const COLUMNS: &'static str = "uom_id, name, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      uom_id:      row.get(0)?,
      name:        row.get(1)?,
      recorded_at: row.get(2)?,
    })
  }

  pub fn into_unit(self) -> Result<UnitOfMeasure> {
    Ok(UnitOfMeasure {
      uom_id:      decode_uuid(&self.uom_id)?,
      name:        self.name,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `nomenclature` row.
pub struct RawNomenclature {
  pub nomenclature_id: String,
  pub name:            String,
  pub base_uom_id:     String,
  pub recorded_at:     String,
}

impl RawNomenclature {
  pub const COLUMNS: &'static str =
    "nomenclature_id, name, base_uom_id, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      nomenclature_id: row.get(0)?,
      name:            row.get(1)?,
      base_uom_id:     row.get(2)?,
      recorded_at:     row.get(3)?,
    })
  }

  pub fn into_nomenclature(self) -> Result<Nomenclature> {
    Ok(Nomenclature {
      nomenclature_id: decode_uuid(&self.nomenclature_id)?,
      name:            self.name,
      base_uom_id:     decode_uuid(&self.base_uom_id)?,
      recorded_at:     decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `counterparties` row.
pub struct RawCounterparty {
  pub counterparty_id: String,
  pub name:            String,
  pub recorded_at:     String,
}

impl RawCounterparty {
  pub const COLUMNS: &'static str = "counterparty_id, name, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      counterparty_id: row.get(0)?,
      name:            row.get(1)?,
      recorded_at:     row.get(2)?,
    })
  }

  pub fn into_counterparty(self) -> Result<Counterparty> {
    Ok(Counterparty {
      counterparty_id: decode_uuid(&self.counterparty_id)?,
      name:            self.name,
      recorded_at:     decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `conversion_rates` row.
pub struct RawConversionRate {
  pub rate_id:       String,
  pub material_id:   String,
  pub base_uom_id:   String,
  pub target_uom_id: String,
  pub rate:          String,
  pub recorded_at:   String,
}

impl RawConversionRate {
  pub const COLUMNS: &'static str =
    "rate_id, material_id, base_uom_id, target_uom_id, rate, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      rate_id:       row.get(0)?,
      material_id:   row.get(1)?,
      base_uom_id:   row.get(2)?,
      target_uom_id: row.get(3)?,
      rate:          row.get(4)?,
      recorded_at:   row.get(5)?,
    })
  }

  pub fn into_conversion_rate(self) -> Result<ConversionRate> {
    Ok(ConversionRate {
      rate_id:       decode_uuid(&self.rate_id)?,
      material_id:   decode_uuid(&self.material_id)?,
      base_uom_id:   decode_uuid(&self.base_uom_id)?,
      target_uom_id: decode_uuid(&self.target_uom_id)?,
      rate:          decode_decimal(&self.rate)?,
      recorded_at:   decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `purchases` row.
pub struct RawPurchase {
  pub purchase_id:     String,
  pub purch_date:      String,
  pub counterparty_id: String,
  pub material_id:     String,
  pub purch_uom_id:    String,
  pub quantity:        String,
  pub price_ex_vat:    String,
  pub price_with_vat:  String,
  pub recorded_at:     String,
}

impl RawPurchase {
  pub const COLUMNS: &'static str = "purchase_id, purch_date, counterparty_id, \
     material_id, purch_uom_id, quantity, price_ex_vat, price_with_vat, \
     recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      purchase_id:     row.get(0)?,
      purch_date:      row.get(1)?,
      counterparty_id: row.get(2)?,
      material_id:     row.get(3)?,
      purch_uom_id:    row.get(4)?,
      quantity:        row.get(5)?,
      price_ex_vat:    row.get(6)?,
      price_with_vat:  row.get(7)?,
      recorded_at:     row.get(8)?,
    })
  }

  pub fn into_purchase(self) -> Result<Purchase> {
    Ok(Purchase {
      purchase_id:     decode_uuid(&self.purchase_id)?,
      purch_date:      decode_date(&self.purch_date)?,
      counterparty_id: decode_uuid(&self.counterparty_id)?,
      material_id:     decode_uuid(&self.material_id)?,
      purch_uom_id:    decode_uuid(&self.purch_uom_id)?,
      quantity:        decode_decimal(&self.quantity)?,
      price_ex_vat:    decode_decimal(&self.price_ex_vat)?,
      price_with_vat:  decode_decimal(&self.price_with_vat)?,
      recorded_at:     decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `production_runs` row.
pub struct RawProductionRun {
  pub run_id:      String,
  pub prod_date:   String,
  pub description: String,
  pub recorded_at: String,
}

impl RawProductionRun {
  pub const COLUMNS: &'static str = "run_id, prod_date, description, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      run_id:      row.get(0)?,
      prod_date:   row.get(1)?,
      description: row.get(2)?,
      recorded_at: row.get(3)?,
    })
  }

  pub fn into_run(self) -> Result<ProductionRun> {
    Ok(ProductionRun {
      run_id:      decode_uuid(&self.run_id)?,
      prod_date:   decode_date(&self.prod_date)?,
      description: self.description,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `produced_items` row.
pub struct RawProducedItem {
  pub item_id:         String,
  pub run_id:          String,
  pub nomenclature_id: String,
  pub produced_uom_id: String,
  pub quantity:        String,
  pub recorded_at:     String,
}

impl RawProducedItem {
  pub const COLUMNS: &'static str =
    "item_id, run_id, nomenclature_id, produced_uom_id, quantity, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:         row.get(0)?,
      run_id:          row.get(1)?,
      nomenclature_id: row.get(2)?,
      produced_uom_id: row.get(3)?,
      quantity:        row.get(4)?,
      recorded_at:     row.get(5)?,
    })
  }

  pub fn into_item(self) -> Result<ProducedItem> {
    Ok(ProducedItem {
      item_id:         decode_uuid(&self.item_id)?,
      run_id:          decode_uuid(&self.run_id)?,
      nomenclature_id: decode_uuid(&self.nomenclature_id)?,
      produced_uom_id: decode_uuid(&self.produced_uom_id)?,
      quantity:        decode_decimal(&self.quantity)?,
      recorded_at:     decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `consumed_materials` row.
pub struct RawConsumedMaterial {
  pub consumed_id:     String,
  pub item_id:         String,
  pub material_id:     String,
  pub consumed_uom_id: String,
  pub quantity:        String,
  pub recorded_at:     String,
}

impl RawConsumedMaterial {
  pub const COLUMNS: &'static str =
    "consumed_id, item_id, material_id, consumed_uom_id, quantity, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      consumed_id:     row.get(0)?,
      item_id:         row.get(1)?,
      material_id:     row.get(2)?,
      consumed_uom_id: row.get(3)?,
      quantity:        row.get(4)?,
      recorded_at:     row.get(5)?,
    })
  }

  pub fn into_consumed(self) -> Result<ConsumedMaterial> {
    Ok(ConsumedMaterial {
      consumed_id:     decode_uuid(&self.consumed_id)?,
      item_id:         decode_uuid(&self.item_id)?,
      material_id:     decode_uuid(&self.material_id)?,
      consumed_uom_id: decode_uuid(&self.consumed_uom_id)?,
      quantity:        decode_decimal(&self.quantity)?,
      recorded_at:     decode_dt(&self.recorded_at)?,
    })
  }
}
