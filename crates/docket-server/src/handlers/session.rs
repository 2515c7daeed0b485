//! Entry point, liveness, and the signed-in user's own record.

use axum::{
  Json,
  extract::State,
  http::HeaderMap,
};
use docket_core::{identity::User, store::RecordStore};
use serde_json::{Value, json};

use crate::{AppState, auth::{CurrentUser, verify_proxy}};

/// `GET /`, where unauthenticated requests are sent.
pub async fn index<S>(State(state): State<AppState<S>>, headers: HeaderMap) -> Json<Value>
where
  S: RecordStore + Clone + 'static,
{
  let authenticated = verify_proxy(&headers, &state.auth).is_some();
  Json(json!({
    "service": "docket",
    "version": env!("CARGO_PKG_VERSION"),
    "authenticated": authenticated,
  }))
}

/// `GET /health`
pub async fn health() -> &'static str { "ok" }

/// `GET /me`
pub async fn me(user: CurrentUser) -> Json<User> { Json(user.0) }
