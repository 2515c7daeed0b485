//! Error type for `docket-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value outside its domain (e.g. an unknown role).
  #[error("invalid {column} value: {value:?}")]
  InvalidValue { column: &'static str, value: String },

  /// A record was refused before reaching the database.
  #[error("malformed record: {0}")]
  Malformed(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
