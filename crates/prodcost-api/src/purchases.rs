//! Handlers for `/purchases` endpoints.
//!
//! Purchases are append-only: there is no update or delete route.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/purchases` | Optional `material_id`, `counterparty_id`, `from`, `to` (inclusive) |
//! | `POST` | `/purchases` | Body: [`NewPurchase`]; returns 201 + stored purchase |
//! | `GET`  | `/purchases/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use prodcost_core::{
  purchase::{NewPurchase, Purchase, PurchaseQuery},
  store::ProductionStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /purchases[?material_id=...][&counterparty_id=...][&from=YYYY-MM-DD][&to=YYYY-MM-DD]`
pub async fn list<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<PurchaseQuery>,
) -> Result<Json<Vec<Purchase>>, ApiError> {
  let purchases = store
    .search_purchases(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(purchases))
}

/// `POST /purchases`
pub async fn create<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPurchase>,
) -> Result<impl IntoResponse, ApiError> {
  let purchase = store.record_purchase(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(purchase)))
}

/// `GET /purchases/:id`
pub async fn get_one<S: ProductionStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Purchase>, ApiError> {
  let purchase = store
    .get_purchase(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("purchase {id} not found")))?;
  Ok(Json(purchase))
}
