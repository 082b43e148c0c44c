//! Handlers for production runs, produced items and consumed materials,
//! including the derived cost endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/production-runs` | Newest production date first |
//! | `POST`   | `/production-runs` | Body: `{"prod_date":"2024-01-31","description":"..."}` |
//! | `GET`    | `/production-runs/:id` | Run with costed items; 404 if not found |
//! | `DELETE` | `/production-runs/:id` | Cascades to items and consumption |
//! | `GET`    | `/production-runs/:id/items` | Items of the run |
//! | `POST`   | `/production-runs/:id/items` | 404 if the run does not exist |
//! | `GET`    | `/produced-items/:id` | 404 if not found |
//! | `DELETE` | `/produced-items/:id` | Cascades to consumption |
//! | `GET`    | `/produced-items/:id/cost` | Cost price with per-material breakdown |
//! | `GET`    | `/produced-items/:id/consumed` | Materials consumed by the item |
//! | `POST`   | `/produced-items/:id/consumed` | 404 if the item does not exist |
//! | `GET`    | `/consumed-materials/:id/price` | Average and full purchase price |
//!
//! Cost endpoints answer `422` when a consumed material has never been bought.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use prodcost_core::{
  cost::CostCalculator,
  production::{
    ConsumedMaterial, NewConsumedMaterial, NewProducedItem, NewProductionRun,
    ProducedItem, ProductionRun,
  },
  report::{ConsumedMaterialCost, ProducedItemCost, ProductionRunDetail},
  store::ProductionStore,
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Runs ─────────────────────────────────────────────────────────────────────

/// `GET /production-runs`
pub async fn list_runs<S: ProductionStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<ProductionRun>>, ApiError> {
  let runs = store.list_production_runs().await.map_err(ApiError::store)?;
  Ok(Json(runs))
}

/// `POST /production-runs`: returns 201 + the stored run.
pub async fn create_run<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewProductionRun>,
) -> Result<impl IntoResponse, ApiError> {
  let run = store
    .add_production_run(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(run)))
}

/// `GET /production-runs/:id`
pub async fn get_run<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ProductionRunDetail>, ApiError> {
  let detail = CostCalculator::new(store.as_ref())
    .production_run_detail(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("production run {id} not found")))?;
  Ok(Json(detail))
}

/// `DELETE /production-runs/:id`
pub async fn delete_run<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  if store
    .delete_production_run(id)
    .await
    .map_err(ApiError::store)?
  {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("production run {id} not found")))
  }
}

// ─── Produced items ───────────────────────────────────────────────────────────

async fn require_run<S: ProductionStore>(
  store: &S,
  run_id: Uuid,
) -> Result<(), ApiError> {
  store
    .get_production_run(run_id)
    .await
    .map_err(ApiError::store)?
    .map(|_| ())
    .ok_or_else(|| ApiError::NotFound(format!("production run {run_id} not found")))
}

async fn require_item<S: ProductionStore>(
  store: &S,
  item_id: Uuid,
) -> Result<ProducedItem, ApiError> {
  store
    .get_produced_item(item_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("produced item {item_id} not found")))
}

/// `GET /production-runs/:id/items`
pub async fn list_items<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(run_id): Path<Uuid>,
) -> Result<Json<Vec<ProducedItem>>, ApiError> {
  require_run(store.as_ref(), run_id).await?;
  let items = store
    .list_produced_items(run_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(items))
}

/// `POST /production-runs/:id/items`: returns 201 + the stored item.
pub async fn create_item<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(run_id): Path<Uuid>,
  Json(body): Json<NewProducedItem>,
) -> Result<impl IntoResponse, ApiError> {
  require_run(store.as_ref(), run_id).await?;
  let item = store
    .add_produced_item(run_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /produced-items/:id`
pub async fn get_item<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ProducedItem>, ApiError> {
  Ok(Json(require_item(store.as_ref(), id).await?))
}

/// `DELETE /produced-items/:id`
pub async fn delete_item<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  if store
    .delete_produced_item(id)
    .await
    .map_err(ApiError::store)?
  {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("produced item {id} not found")))
  }
}

/// `GET /produced-items/:id/cost`
pub async fn item_cost<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ProducedItemCost>, ApiError> {
  let item = require_item(store.as_ref(), id).await?;
  let cost = CostCalculator::new(store.as_ref())
    .cost_breakdown(&item)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(cost))
}

// ─── Consumed materials ───────────────────────────────────────────────────────

/// `GET /produced-items/:id/consumed`
pub async fn list_consumed<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(item_id): Path<Uuid>,
) -> Result<Json<Vec<ConsumedMaterial>>, ApiError> {
  require_item(store.as_ref(), item_id).await?;
  let consumed = store
    .list_consumed_materials(item_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(consumed))
}

/// `POST /produced-items/:id/consumed`: returns 201 + the stored row.
pub async fn create_consumed<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(item_id): Path<Uuid>,
  Json(body): Json<NewConsumedMaterial>,
) -> Result<impl IntoResponse, ApiError> {
  require_item(store.as_ref(), item_id).await?;
  let consumed = store
    .add_consumed_material(item_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(consumed)))
}

/// `GET /consumed-materials/:id/price`
pub async fn consumed_price<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ConsumedMaterialCost>, ApiError> {
  let consumed = store
    .get_consumed_material(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("consumed material {id} not found")))?;

  let calculator = CostCalculator::new(store.as_ref());
  let average_purchase_price = calculator
    .average_purchase_price(&consumed)
    .await
    .map_err(ApiError::store)?;
  let full_purchase_price = average_purchase_price * consumed.quantity;

  Ok(Json(ConsumedMaterialCost {
    consumed,
    average_purchase_price,
    full_purchase_price,
  }))
}
