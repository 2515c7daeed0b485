//! `GET /citizens/{national_id}`: a citizen with vehicles and open cases.

use axum::{
  Json,
  extract::{Path, State},
};
use docket_core::{citizen::CitizenRecord, gate::Operation, records, store::RecordStore};

use crate::{AppState, auth::CurrentUser, error::ApiError};

pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(national_id): Path<String>,
) -> Result<Json<CitizenRecord>, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  user.actor().authorize(Operation::View)?;
  let record = records::citizen_record(state.store.as_ref(), &national_id).await?;
  Ok(Json(record))
}
