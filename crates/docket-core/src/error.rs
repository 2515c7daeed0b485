//! Error types for `docket-core`.

use thiserror::Error;

use crate::{case::CaseId, gate::Operation, identity::Role};

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was missing or blank.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("case not found: {0}")]
  CaseNotFound(CaseId),

  #[error("citizen not found: {0}")]
  CitizenNotFound(String),

  #[error("no free case identifier after {0} attempts")]
  DuplicateIdentifier(usize),

  #[error("role {role} may not {operation}")]
  Forbidden { role: Role, operation: Operation },

  #[error("record store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend failure. The error is logged here so callers can pass it
  /// through untouched.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    tracing::error!(error = %err, "record store failure");
    Self::StoreUnavailable(Box::new(err))
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::CaseNotFound(_) | Self::CitizenNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
