//! HTTP server assembly for the production ledger.
//!
//! Wraps [`prodcost_api::api_router`] under `/api`, adds a health probe and
//! request tracing, and knows how to open the configured store.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, routing::get};
use prodcost_core::store::ProductionStore;
use prodcost_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PRODCOST_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// SQLite database file, or `:memory:` for a throwaway ledger.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("prodcost.db") }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Store ────────────────────────────────────────────────────────────────────

/// Open the SQLite store at `path`. The literal path `:memory:` opens an
/// in-memory database.
pub async fn open_store(path: &Path) -> prodcost_store_sqlite::Result<SqliteStore> {
  if path.as_os_str() == ":memory:" {
    SqliteStore::open_in_memory().await
  } else {
    SqliteStore::open(path).await
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

async fn health() -> &'static str { "ok" }

/// Build the full application router for `store`.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: ProductionStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", prodcost_api::api_router(store))
    .layer(
      TraceLayer::new_for_http()
        .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::json;
  use tower::ServiceExt as _;

  use super::*;

  async fn make_app() -> Router {
    let store = open_store(Path::new(":memory:")).await.unwrap();
    app(Arc::new(store))
  }

  #[tokio::test]
  async fn health_answers_ok() {
    let resp = make_app()
      .await
      .oneshot(Request::get("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    assert_eq!(&bytes[..], b"ok");
  }

  #[tokio::test]
  async fn api_is_nested_under_prefix() {
    let app = make_app().await;

    let req = Request::post("/api/units")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json!({ "name": "kg" }).to_string()))
      .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
      .oneshot(Request::get("/units").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn config_defaults_fill_missing_keys() {
    let cfg: ServerConfig = config::Config::builder()
      .set_override("port", 9000)
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.store_path, PathBuf::from("prodcost.db"));
    assert_eq!(cfg.address(), "127.0.0.1:9000");
  }
}
