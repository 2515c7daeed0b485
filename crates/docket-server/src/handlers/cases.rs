//! Handlers for `/cases` and the recycle bin.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/cases` | Body: [`NewCase`]; returns 201 + case |
//! | `GET`    | `/cases/{case_id}` | Archived cases included |
//! | `POST`   | `/cases/{case_id}/status` | Body: `{"status":"CLOSED"}` |
//! | `POST`   | `/cases/{case_id}/archive` | 204 |
//! | `POST`   | `/cases/{case_id}/restore` | 204 |
//! | `DELETE` | `/cases/{case_id}` | Permanent; 204 |
//! | `GET`    | `/trash` | Archived cases, newest first |
//!
//! Handlers with a body take it as a `Result` so the gate is consulted
//! before a malformed body is reported.

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use docket_core::{
  case::{Case, CaseId, CaseStatus, NewCase},
  gate::Operation,
  store::RecordStore,
};
use serde::Deserialize;

use crate::{AppState, auth::CurrentUser, error::ApiError};

/// `POST /cases`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  body: Result<Json<NewCase>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  user.actor().authorize(Operation::Create)?;
  let Json(mut body) = body?;
  body.creator_id = user.0.external_id;
  let case = state.cases.create(body).await?;
  Ok((StatusCode::CREATED, Json(case)))
}

/// `GET /cases/{case_id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(case_id): Path<String>,
) -> Result<Json<Case>, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  user.actor().authorize(Operation::View)?;
  Ok(Json(state.cases.get(&CaseId::from(case_id)).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: CaseStatus,
}

/// `POST /cases/{case_id}/status`
pub async fn set_status<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(case_id): Path<String>,
  body: Result<Json<StatusBody>, JsonRejection>,
) -> Result<Json<Case>, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  user.actor().authorize(Operation::UpdateStatus)?;
  let Json(body) = body?;
  let case = state.cases.set_status(&CaseId::from(case_id), body.status).await?;
  Ok(Json(case))
}

/// `POST /cases/{case_id}/archive`
pub async fn archive<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(case_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  user.actor().authorize(Operation::Archive)?;
  state.cases.archive(&CaseId::from(case_id)).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /cases/{case_id}/restore`
pub async fn restore<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(case_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  user.actor().authorize(Operation::Restore)?;
  state.cases.restore(&CaseId::from(case_id)).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /cases/{case_id}`
pub async fn destroy<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(case_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  let actor = user.actor();
  actor.authorize(Operation::Destroy)?;
  let case_id = CaseId::from(case_id);
  state.cases.destroy(&case_id).await?;
  tracing::info!(%case_id, actor = %actor.external_id, "destroyed by request");
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /trash`
pub async fn trash<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<Vec<Case>>, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  user.actor().authorize(Operation::ListArchived)?;
  Ok(Json(state.cases.list_archived().await?))
}
