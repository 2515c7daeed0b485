//! Handlers for `GET /search/{cases,citizens,vehicles}?q=...`.
//!
//! A missing or blank `q` performs no search and redirects to the entry
//! point, as opposed to answering with an empty list.

use axum::{
  Json,
  extract::{Query, State},
  response::{IntoResponse, Redirect, Response},
};
use docket_core::{gate::Operation, records, store::RecordStore};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::CurrentUser, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  #[serde(default)]
  pub q: String,
}

fn respond<T: Serialize>(found: Option<Vec<T>>, entry_point: &str) -> Response {
  match found {
    Some(items) => Json(items).into_response(),
    None => Redirect::to(entry_point).into_response(),
  }
}

/// `GET /search/cases?q=...`
pub async fn cases<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Query(params): Query<SearchParams>,
) -> Result<Response, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  user.actor().authorize(Operation::Search)?;
  let found = state.cases.search(&params.q).await?;
  Ok(respond(found, &state.config.entry_point))
}

/// `GET /search/citizens?q=...`
pub async fn citizens<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Query(params): Query<SearchParams>,
) -> Result<Response, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  user.actor().authorize(Operation::Search)?;
  let found = records::search_citizens(state.store.as_ref(), &params.q).await?;
  Ok(respond(found, &state.config.entry_point))
}

/// `GET /search/vehicles?q=...`
pub async fn vehicles<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Query(params): Query<SearchParams>,
) -> Result<Response, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  user.actor().authorize(Operation::Search)?;
  let found = records::search_vehicles(state.store.as_ref(), &params.q).await?;
  Ok(respond(found, &state.config.entry_point))
}
