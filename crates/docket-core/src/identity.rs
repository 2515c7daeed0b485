//! Actors, roles and the local user records behind them.
//!
//! Authentication itself happens elsewhere (an OAuth provider in front of the
//! server). This module only turns the asserted [`Profile`] into a local
//! [`User`] and an [`Actor`] the access gate can judge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, store::RecordStore};

/// Staff roles known to the portal.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  /// Line officer; the default for first-time sign-ins.
  #[default]
  Officer,
  Staff,
  Admin,
  Judge,
}

/// What the identity provider asserts about the person signing in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
  /// Stable identifier issued by the provider.
  pub external_id: String,
  pub username:    String,
  pub avatar:      Option<String>,
}

/// The local record kept for every identity that has signed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub external_id:  String,
  pub username:     String,
  pub avatar:       Option<String>,
  pub role:         Role,
  pub created_at:   DateTime<Utc>,
  pub last_seen_at: DateTime<Utc>,
}

/// An authenticated identity attempting an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
  pub external_id: String,
  pub role:        Role,
}

impl From<&User> for Actor {
  fn from(user: &User) -> Self {
    Self { external_id: user.external_id.clone(), role: user.role }
  }
}

/// Record a sign-in: create the user with `default_role` the first time,
/// otherwise refresh the profile fields and keep the stored role.
pub async fn sign_in<S>(store: &S, profile: Profile, default_role: Role) -> Result<User>
where
  S: RecordStore,
{
  if profile.external_id.trim().is_empty() {
    return Err(Error::Validation("external id is required".into()));
  }

  let user = store
    .upsert_user(profile, default_role)
    .await
    .map_err(Error::store)?;
  tracing::debug!(external_id = %user.external_id, role = %user.role, "signed in");
  Ok(user)
}
