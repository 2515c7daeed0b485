//! The access gate: which roles may perform which operations.
//!
//! Destroying a case is irreversible, so it sits behind a different role set
//! than archive/restore. Unauthenticated callers never reach this module; the
//! router turns them away first.

use serde::Serialize;

use crate::{
  Error, Result,
  identity::{Actor, Role},
};

/// Every gated operation the portal exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
  /// Search cases, citizens or vehicles.
  Search,
  /// Read a single case or citizen record.
  View,
  Create,
  Archive,
  Restore,
  UpdateStatus,
  ListArchived,
  Destroy,
}

/// Decide whether `role` may perform `operation`.
pub fn permit(role: Role, operation: Operation) -> bool {
  use Operation::*;
  match operation {
    Search | View | Create | Archive | Restore | UpdateStatus => {
      matches!(role, Role::Officer | Role::Staff)
    }
    ListArchived => matches!(role, Role::Officer | Role::Staff | Role::Admin),
    Destroy => matches!(role, Role::Staff | Role::Admin),
  }
}

impl Actor {
  pub fn may(&self, operation: Operation) -> bool { permit(self.role, operation) }

  /// [`permit`] as a `Result`, for callers that propagate with `?`.
  pub fn authorize(&self, operation: Operation) -> Result<()> {
    if self.may(operation) {
      Ok(())
    } else {
      tracing::info!(
        actor = %self.external_id,
        role = %self.role,
        %operation,
        "operation denied"
      );
      Err(Error::Forbidden { role: self.role, operation })
    }
  }
}
