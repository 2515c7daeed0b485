//! HTTP layer for Docket.
//!
//! Exposes an axum [`Router`] serving the JSON API over any [`RecordStore`].
//! Identity arrives from an authenticating proxy (see [`auth`]); every
//! lifecycle call passes the access gate first.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod seed;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use docket_core::{identity::Role, lifecycle::CaseLifecycle, store::RecordStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
use handlers::{cases, citizens, search, session};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `DOCKET_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  /// Where unauthenticated requests and blank searches are redirected.
  #[serde(default = "default_entry_point")]
  pub entry_point:       String,
  /// argon2 PHC hash of the secret the authenticating proxy presents. When
  /// unset no request is ever authenticated.
  #[serde(default)]
  pub proxy_secret_hash: String,
  /// Role given to users signing in for the first time.
  #[serde(default)]
  pub default_role:      Role,
}

fn default_entry_point() -> String { "/".to_string() }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RecordStore> {
  pub store:  Arc<S>,
  pub cases:  CaseLifecycle<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

impl<S: RecordStore> AppState<S> {
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    let auth = AuthConfig {
      proxy_secret_hash: config.proxy_secret_hash.clone(),
      default_role:      config.default_role,
    };
    Self {
      cases: CaseLifecycle::new(Arc::clone(&store)),
      store,
      config: Arc::new(config),
      auth: Arc::new(auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the portal.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RecordStore + Clone + 'static,
{
  Router::new()
    .route("/",                          get(session::index::<S>))
    .route("/health",                    get(session::health))
    .route("/me",                        get(session::me))
    // Search
    .route("/search/cases",              get(search::cases::<S>))
    .route("/search/citizens",           get(search::citizens::<S>))
    .route("/search/vehicles",           get(search::vehicles::<S>))
    .route("/citizens/{national_id}",    get(citizens::get_one::<S>))
    // Cases
    .route("/cases",                     post(cases::create::<S>))
    .route("/cases/{case_id}",           get(cases::get_one::<S>).delete(cases::destroy::<S>))
    .route("/cases/{case_id}/status",    post(cases::set_status::<S>))
    .route("/cases/{case_id}/archive",   post(cases::archive::<S>))
    .route("/cases/{case_id}/restore",   post(cases::restore::<S>))
    .route("/trash",                     get(cases::trash::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
