//! Error type and axum `IntoResponse` implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Redirect, Response},
};
use docket_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  /// No trusted identity on the request; answered with a redirect.
  #[error("authentication required")]
  Unauthenticated { entry_point: String },

  /// The request body was not the JSON the route expects.
  #[error("invalid request body: {0}")]
  Body(#[from] JsonRejection),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let core = match self {
      ApiError::Unauthenticated { entry_point } => {
        return Redirect::to(&entry_point).into_response();
      }
      ApiError::Body(rejection) => {
        let body = Json(json!({ "error": rejection.body_text() }));
        return (StatusCode::BAD_REQUEST, body).into_response();
      }
      ApiError::Core(e) => e,
    };

    let status = match &core {
      CoreError::Validation(_) => StatusCode::BAD_REQUEST,
      CoreError::CaseNotFound(_) | CoreError::CitizenNotFound(_) => StatusCode::NOT_FOUND,
      CoreError::DuplicateIdentifier(_) => StatusCode::CONFLICT,
      CoreError::Forbidden { .. } => StatusCode::FORBIDDEN,
      CoreError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    // Store failures were logged where they were wrapped; keep details out of
    // the response.
    let message = match &core {
      CoreError::StoreUnavailable(_) => "internal error".to_owned(),
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
