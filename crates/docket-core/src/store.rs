//! The `RecordStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `docket-store-sqlite`).
//! The lifecycle manager and the server depend on this abstraction, never on
//! a concrete backend, so swapping storage leaves the lifecycle untouched.

use std::future::Future;

use crate::{
  case::{Case, CaseId, CasePatch},
  citizen::{Citizen, Vehicle},
  identity::{Profile, Role, User},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Sort order for [`RecordStore::find_cases`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseOrder {
  #[default]
  CaseId,
  /// Most recently touched first; used by the recycle bin.
  UpdatedDesc,
}

/// Parameters for [`RecordStore::find_cases`]. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct CaseQuery {
  /// Case-insensitive substring of `case_id` or `internal_roll`. Matched
  /// literally; `%` and `_` carry no wildcard meaning.
  pub text:         Option<String>,
  pub deleted:      Option<bool>,
  pub defendant_id: Option<String>,
  pub order:        CaseOrder,
  pub limit:        Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Docket record store backend.
///
/// Inserts report key collisions as `Ok(false)` rather than as errors so the
/// caller can tell a taken identifier from a failing store. Updates and
/// deletes report a missing record the same way.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Citizens ──────────────────────────────────────────────────────────

  fn get_citizen(
    &self,
    national_id: String,
  ) -> impl Future<Output = Result<Option<Citizen>, Self::Error>> + Send + '_;

  /// Returns `false` if a citizen with the same national id already exists.
  fn insert_citizen(
    &self,
    citizen: Citizen,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Case-insensitive substring match on national id or full name.
  fn search_citizens(
    &self,
    text: String,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Citizen>, Self::Error>> + Send + '_;

  // ── Vehicles ──────────────────────────────────────────────────────────

  /// Returns `false` if the plate is already registered.
  fn insert_vehicle(
    &self,
    vehicle: Vehicle,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Case-insensitive substring match on the plate.
  fn search_vehicles(
    &self,
    text: String,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Vehicle>, Self::Error>> + Send + '_;

  fn vehicles_owned_by(
    &self,
    national_id: String,
  ) -> impl Future<Output = Result<Vec<Vehicle>, Self::Error>> + Send + '_;

  // ── Cases ─────────────────────────────────────────────────────────────

  /// Fetch a case whether or not it is archived.
  fn get_case(
    &self,
    case_id: CaseId,
  ) -> impl Future<Output = Result<Option<Case>, Self::Error>> + Send + '_;

  /// Returns `false` if `case_id` is taken, archived cases included.
  fn insert_case(
    &self,
    case: Case,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Apply `patch`. Returns `false` if no such case exists.
  fn update_case(
    &self,
    case_id: CaseId,
    patch: CasePatch,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Remove a case permanently. Returns `false` if no such case exists.
  fn delete_case(
    &self,
    case_id: CaseId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn find_cases(
    &self,
    query: CaseQuery,
  ) -> impl Future<Output = Result<Vec<Case>, Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Insert the user with `default_role`, or refresh username, avatar and
  /// `last_seen_at` of an existing one without touching its role.
  fn upsert_user(
    &self,
    profile: Profile,
    default_role: Role,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;
}
