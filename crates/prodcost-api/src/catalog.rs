//! Handlers for the reference-data endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/units` | Sorted by name |
//! | `POST`   | `/units` | Body: `{"name":"kg"}` |
//! | `GET`    | `/units/:id` | 404 if not found |
//! | `DELETE` | `/units/:id` | 409 while referenced |
//! | `GET`    | `/nomenclature` | Sorted by name |
//! | `POST`   | `/nomenclature` | Body: `{"name":"Flour","base_uom_id":"..."}` |
//! | `GET`    | `/nomenclature/:id` | 404 if not found |
//! | `DELETE` | `/nomenclature/:id` | 409 while referenced |
//! | `GET`    | `/counterparties` | Sorted by name |
//! | `POST`   | `/counterparties` | Body: `{"name":"..."}` |
//! | `GET`    | `/counterparties/:id` | 404 if not found |
//! | `DELETE` | `/counterparties/:id` | 409 while referenced |
//! | `GET`    | `/conversion-rates` | Optional `?material_id=` |
//! | `POST`   | `/conversion-rates` | Body: [`NewConversionRate`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use prodcost_core::{
  catalog::{
    ConversionRate, Counterparty, NewConversionRate, NewCounterparty,
    NewNomenclature, NewUnitOfMeasure, Nomenclature, UnitOfMeasure,
  },
  store::ProductionStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// Map a `delete_*` outcome to `204`, or `404` when the row was absent.
fn deleted(found: bool, what: &str, id: Uuid) -> Result<StatusCode, ApiError> {
  if found {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("{what} {id} not found")))
  }
}

// ─── Units ────────────────────────────────────────────────────────────────────

/// `GET /units`
pub async fn list_units<S: ProductionStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<UnitOfMeasure>>, ApiError> {
  let units = store.list_units().await.map_err(ApiError::store)?;
  Ok(Json(units))
}

/// `POST /units`: returns 201 + the stored unit.
pub async fn create_unit<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewUnitOfMeasure>,
) -> Result<impl IntoResponse, ApiError> {
  let unit = store.add_unit(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(unit)))
}

/// `GET /units/:id`
pub async fn get_unit<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<UnitOfMeasure>, ApiError> {
  let unit = store
    .get_unit(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("unit {id} not found")))?;
  Ok(Json(unit))
}

/// `DELETE /units/:id`
pub async fn delete_unit<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  let found = store.delete_unit(id).await.map_err(ApiError::store)?;
  deleted(found, "unit", id)
}

// ─── Nomenclature ─────────────────────────────────────────────────────────────

/// `GET /nomenclature`
pub async fn list_nomenclature<S: ProductionStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Nomenclature>>, ApiError> {
  let entries = store.list_nomenclature().await.map_err(ApiError::store)?;
  Ok(Json(entries))
}

/// `POST /nomenclature`: returns 201 + the stored entry.
pub async fn create_nomenclature<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewNomenclature>,
) -> Result<impl IntoResponse, ApiError> {
  let entry = store.add_nomenclature(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /nomenclature/:id`
pub async fn get_nomenclature<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Nomenclature>, ApiError> {
  let entry = store
    .get_nomenclature(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("nomenclature {id} not found")))?;
  Ok(Json(entry))
}

/// `DELETE /nomenclature/:id`
pub async fn delete_nomenclature<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  let found = store
    .delete_nomenclature(id)
    .await
    .map_err(ApiError::store)?;
  deleted(found, "nomenclature", id)
}

// ─── Counterparties ───────────────────────────────────────────────────────────

/// `GET /counterparties`
pub async fn list_counterparties<S: ProductionStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Counterparty>>, ApiError> {
  let parties = store.list_counterparties().await.map_err(ApiError::store)?;
  Ok(Json(parties))
}

/// `POST /counterparties`: returns 201 + the stored counterparty.
pub async fn create_counterparty<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewCounterparty>,
) -> Result<impl IntoResponse, ApiError> {
  let party = store.add_counterparty(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(party)))
}

/// `GET /counterparties/:id`
pub async fn get_counterparty<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Counterparty>, ApiError> {
  let party = store
    .get_counterparty(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("counterparty {id} not found")))?;
  Ok(Json(party))
}

/// `DELETE /counterparties/:id`
pub async fn delete_counterparty<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  let found = store
    .delete_counterparty(id)
    .await
    .map_err(ApiError::store)?;
  deleted(found, "counterparty", id)
}

// ─── Conversion rates ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RateParams {
  pub material_id: Option<Uuid>,
}

/// `GET /conversion-rates[?material_id=<id>]`
pub async fn list_conversion_rates<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<RateParams>,
) -> Result<Json<Vec<ConversionRate>>, ApiError> {
  let rates = store
    .list_conversion_rates(params.material_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rates))
}

/// `POST /conversion-rates`: returns 201 + the stored rate.
pub async fn create_conversion_rate<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewConversionRate>,
) -> Result<impl IntoResponse, ApiError> {
  let rate = store
    .add_conversion_rate(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(rate)))
}
