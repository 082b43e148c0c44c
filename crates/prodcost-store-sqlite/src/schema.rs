//! SQL schema for the production ledger SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.
//!
//! Catalog references use `ON DELETE RESTRICT`; ownership edges (run → item →
//! consumption) use `ON DELETE CASCADE`. Foreign keys are only enforced with
//! `PRAGMA foreign_keys = ON`, which must be set on every connection.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS units (
    uom_id       TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    recorded_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS nomenclature (
    nomenclature_id TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    base_uom_id     TEXT NOT NULL REFERENCES units(uom_id) ON DELETE RESTRICT,
    recorded_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS counterparties (
    counterparty_id TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    recorded_at     TEXT NOT NULL
);

-- 1 base_uom == rate target_uom, for one material.
CREATE TABLE IF NOT EXISTS conversion_rates (
    rate_id       TEXT PRIMARY KEY,
    material_id   TEXT NOT NULL REFERENCES nomenclature(nomenclature_id) ON DELETE RESTRICT,
    base_uom_id   TEXT NOT NULL REFERENCES units(uom_id) ON DELETE RESTRICT,
    target_uom_id TEXT NOT NULL REFERENCES units(uom_id) ON DELETE RESTRICT,
    rate          TEXT NOT NULL,   -- decimal, canonical text
    recorded_at   TEXT NOT NULL
);

-- Purchases are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS purchases (
    purchase_id     TEXT PRIMARY KEY,
    purch_date      TEXT NOT NULL,   -- YYYY-MM-DD
    counterparty_id TEXT NOT NULL REFERENCES counterparties(counterparty_id) ON DELETE RESTRICT,
    material_id     TEXT NOT NULL REFERENCES nomenclature(nomenclature_id) ON DELETE RESTRICT,
    purch_uom_id    TEXT NOT NULL REFERENCES units(uom_id) ON DELETE RESTRICT,
    quantity        TEXT NOT NULL,
    price_ex_vat    TEXT NOT NULL,
    price_with_vat  TEXT NOT NULL,
    recorded_at     TEXT NOT NULL    -- RFC 3339, fixed microsecond width
);

CREATE TABLE IF NOT EXISTS production_runs (
    run_id       TEXT PRIMARY KEY,
    prod_date    TEXT NOT NULL,      -- YYYY-MM-DD
    description  TEXT NOT NULL,
    recorded_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS produced_items (
    item_id         TEXT PRIMARY KEY,
    run_id          TEXT NOT NULL REFERENCES production_runs(run_id) ON DELETE CASCADE,
    nomenclature_id TEXT NOT NULL REFERENCES nomenclature(nomenclature_id) ON DELETE RESTRICT,
    produced_uom_id TEXT NOT NULL REFERENCES units(uom_id) ON DELETE RESTRICT,
    quantity        TEXT NOT NULL,
    recorded_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS consumed_materials (
    consumed_id     TEXT PRIMARY KEY,
    item_id         TEXT NOT NULL REFERENCES produced_items(item_id) ON DELETE CASCADE,
    material_id     TEXT NOT NULL REFERENCES nomenclature(nomenclature_id) ON DELETE RESTRICT,
    consumed_uom_id TEXT NOT NULL REFERENCES units(uom_id) ON DELETE RESTRICT,
    quantity        TEXT NOT NULL,
    recorded_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS purchases_material_date_idx ON purchases(material_id, purch_date);
CREATE INDEX IF NOT EXISTS produced_items_run_idx      ON produced_items(run_id);
CREATE INDEX IF NOT EXISTS consumed_materials_item_idx ON consumed_materials(item_id);

PRAGMA user_version = 1;
";
