//! JSON REST API for the production ledger.
//!
//! Exposes an axum [`Router`] backed by any
//! [`prodcost_core::store::ProductionStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", prodcost_api::api_router(store.clone()))
//! ```

pub mod catalog;
pub mod error;
pub mod production;
pub mod purchases;

use std::sync::Arc;

use axum::{Router, routing::get};
use prodcost_core::store::ProductionStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ProductionStore + 'static,
{
  Router::new()
    // Catalog
    .route(
      "/units",
      get(catalog::list_units::<S>).post(catalog::create_unit::<S>),
    )
    .route(
      "/units/{id}",
      get(catalog::get_unit::<S>).delete(catalog::delete_unit::<S>),
    )
    .route(
      "/nomenclature",
      get(catalog::list_nomenclature::<S>).post(catalog::create_nomenclature::<S>),
    )
    .route(
      "/nomenclature/{id}",
      get(catalog::get_nomenclature::<S>).delete(catalog::delete_nomenclature::<S>),
    )
    .route(
      "/counterparties",
      get(catalog::list_counterparties::<S>).post(catalog::create_counterparty::<S>),
    )
    .route(
      "/counterparties/{id}",
      get(catalog::get_counterparty::<S>).delete(catalog::delete_counterparty::<S>),
    )
    .route(
      "/conversion-rates",
      get(catalog::list_conversion_rates::<S>)
        .post(catalog::create_conversion_rate::<S>),
    )
    // Purchases
    .route("/purchases", get(purchases::list::<S>).post(purchases::create::<S>))
    .route("/purchases/{id}", get(purchases::get_one::<S>))
    // Production
    .route(
      "/production-runs",
      get(production::list_runs::<S>).post(production::create_run::<S>),
    )
    .route(
      "/production-runs/{id}",
      get(production::get_run::<S>).delete(production::delete_run::<S>),
    )
    .route(
      "/production-runs/{id}/items",
      get(production::list_items::<S>).post(production::create_item::<S>),
    )
    .route(
      "/produced-items/{id}",
      get(production::get_item::<S>).delete(production::delete_item::<S>),
    )
    .route("/produced-items/{id}/cost", get(production::item_cost::<S>))
    .route(
      "/produced-items/{id}/consumed",
      get(production::list_consumed::<S>).post(production::create_consumed::<S>),
    )
    .route(
      "/consumed-materials/{id}/price",
      get(production::consumed_price::<S>),
    )
    .with_state(store)
}

// ─── Router tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{str::FromStr, sync::Arc};

  use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
  };
  use prodcost_store_sqlite::SqliteStore;
  use rust_decimal::Decimal;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::api_router;

  async fn make_router() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = router
      .clone()
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn create(router: &Router, uri: &str, body: Value) -> Value {
    let (status, value) = send(router, "POST", uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "POST {uri}: {value}");
    value
  }

  fn id(value: &Value, field: &str) -> String {
    value[field].as_str().unwrap().to_string()
  }

  fn dec(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap()
  }

  /// kg, a supplier, flour bought in kg, and bread.
  struct Seed {
    kg:       String,
    supplier: String,
    flour:    String,
    bread:    String,
  }

  async fn seed(router: &Router) -> Seed {
    let kg = id(&create(router, "/units", json!({ "name": "kg" })).await, "uom_id");
    let supplier = id(
      &create(router, "/counterparties", json!({ "name": "Mill & Co" })).await,
      "counterparty_id",
    );
    let flour = id(
      &create(router, "/nomenclature", json!({ "name": "Flour", "base_uom_id": kg }))
        .await,
      "nomenclature_id",
    );
    let bread = id(
      &create(router, "/nomenclature", json!({ "name": "Bread", "base_uom_id": kg }))
        .await,
      "nomenclature_id",
    );
    Seed { kg, supplier, flour, bread }
  }

  async fn buy(router: &Router, seed: &Seed, on: &str, quantity: &str, price: &str) {
    create(
      router,
      "/purchases",
      json!({
        "purch_date": on,
        "counterparty_id": seed.supplier,
        "material_id": seed.flour,
        "purch_uom_id": seed.kg,
        "quantity": quantity,
        "price_ex_vat": price,
        "price_with_vat": price,
      }),
    )
    .await;
  }

  /// A run on `on` producing one loaf that consumes `flour_kg` of flour.
  /// Returns `(run_id, item_id, consumed_id)`.
  async fn produce(
    router: &Router,
    seed: &Seed,
    on: &str,
    flour_kg: &str,
  ) -> (String, String, String) {
    let run = id(
      &create(
        router,
        "/production-runs",
        json!({ "prod_date": on, "description": "Morning bake" }),
      )
      .await,
      "run_id",
    );
    let item = id(
      &create(
        router,
        &format!("/production-runs/{run}/items"),
        json!({
          "nomenclature_id": seed.bread,
          "produced_uom_id": seed.kg,
          "quantity": "1",
        }),
      )
      .await,
      "item_id",
    );
    let consumed = id(
      &create(
        router,
        &format!("/produced-items/{item}/consumed"),
        json!({
          "material_id": seed.flour,
          "consumed_uom_id": seed.kg,
          "quantity": flour_kg,
        }),
      )
      .await,
      "consumed_id",
    );
    (run, item, consumed)
  }

  // ── Catalog ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_fetch_unit() {
    let router = make_router().await;
    let unit = create(&router, "/units", json!({ "name": "kg" })).await;
    assert_eq!(unit["name"], "kg");

    let (status, fetched) =
      send(&router, "GET", &format!("/units/{}", id(&unit, "uom_id")), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, unit);

    let (status, all) = send(&router, "GET", "/units", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn unknown_unit_is_404() {
    let router = make_router().await;
    let (status, body) =
      send(&router, "GET", &format!("/units/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn overlong_name_is_422() {
    let router = make_router().await;
    let (status, _) =
      send(&router, "POST", "/units", Some(json!({ "name": "x".repeat(51) }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn deleting_referenced_unit_is_409() {
    let router = make_router().await;
    let seed = seed(&router).await;

    let (status, body) =
      send(&router, "DELETE", &format!("/units/{}", seed.kg), None).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, _) = send(&router, "GET", &format!("/units/{}", seed.kg), None).await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn deleting_unused_counterparty_is_204() {
    let router = make_router().await;
    let party = create(&router, "/counterparties", json!({ "name": "Nobody" })).await;
    let uri = format!("/counterparties/{}", id(&party, "counterparty_id"));

    let (status, _) = send(&router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Purchases ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn purchase_with_unknown_material_is_422() {
    let router = make_router().await;
    let seed = seed(&router).await;
    let (status, _) = send(
      &router,
      "POST",
      "/purchases",
      Some(json!({
        "purch_date": "2024-01-01",
        "counterparty_id": seed.supplier,
        "material_id": Uuid::new_v4(),
        "purch_uom_id": seed.kg,
        "quantity": "1",
        "price_ex_vat": "1",
        "price_with_vat": "1",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn purchases_filter_by_date_range() {
    let router = make_router().await;
    let seed = seed(&router).await;
    buy(&router, &seed, "2024-01-01", "10", "100").await;
    buy(&router, &seed, "2024-02-01", "5", "60").await;

    let (status, found) = send(
      &router,
      "GET",
      &format!("/purchases?material_id={}&from=2024-01-15", seed.flour),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["purch_date"], "2024-02-01");
  }

  // ── Production and cost ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn items_on_unknown_run_are_404() {
    let router = make_router().await;
    let seed = seed(&router).await;
    let (status, _) = send(
      &router,
      "POST",
      &format!("/production-runs/{}/items", Uuid::new_v4()),
      Some(json!({
        "nomenclature_id": seed.bread,
        "produced_uom_id": seed.kg,
        "quantity": "1",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn run_detail_carries_costs() {
    let router = make_router().await;
    let seed = seed(&router).await;
    buy(&router, &seed, "2024-01-01", "10", "100").await;
    buy(&router, &seed, "2024-01-15", "5", "60").await;
    let (run, item, consumed) = produce(&router, &seed, "2024-01-31", "3").await;

    let (status, detail) =
      send(&router, "GET", &format!("/production-runs/{run}"), None).await;
    assert_eq!(status, StatusCode::OK, "{detail}");
    assert_eq!(detail["run"]["prod_date"], "2024-01-31");
    let items = detail["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(dec(&items[0]["cost_price"]).round_dp(3), Decimal::new(32_000, 3));

    let (status, cost) =
      send(&router, "GET", &format!("/produced-items/{item}/cost"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cost["cost_price"], items[0]["cost_price"]);

    let (status, price) =
      send(&router, "GET", &format!("/consumed-materials/{consumed}/price"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
      dec(&price["average_purchase_price"]).round_dp(3),
      Decimal::new(10_667, 3)
    );
    assert_eq!(price["full_purchase_price"], items[0]["cost_price"]);
  }

  #[tokio::test]
  async fn cost_without_purchase_history_is_422() {
    let router = make_router().await;
    let seed = seed(&router).await;
    let (run, item, consumed) = produce(&router, &seed, "2024-01-31", "3").await;

    for uri in [
      format!("/production-runs/{run}"),
      format!("/produced-items/{item}/cost"),
      format!("/consumed-materials/{consumed}/price"),
    ] {
      let (status, body) = send(&router, "GET", &uri, None).await;
      assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}: {body}");
    }
  }

  #[tokio::test]
  async fn deleting_run_removes_its_items() {
    let router = make_router().await;
    let seed = seed(&router).await;
    let (run, item, consumed) = produce(&router, &seed, "2024-01-31", "3").await;

    let (status, _) =
      send(&router, "DELETE", &format!("/production-runs/{run}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) =
      send(&router, "GET", &format!("/produced-items/{item}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
      &router,
      "GET",
      &format!("/consumed-materials/{consumed}/price"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
