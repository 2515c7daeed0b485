//! Case records, the only entity in the portal with a lifecycle.
//!
//! A case is created open and visible, may be archived (soft-deleted) and
//! restored any number of times, and is removed for good only by an explicit
//! destroy. Its identifier has the human-readable shape `YYYY-NNNNN`.

use std::fmt;

use chrono::{DateTime, SubsecRound as _, Utc};
use rand_core::{OsRng, RngCore as _};
use serde::{Deserialize, Serialize};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Smallest random suffix; keeps every suffix five digits wide.
pub const SUFFIX_MIN: u32 = 10_000;
/// Largest random suffix.
pub const SUFFIX_MAX: u32 = 99_999;

/// The public identifier of a case, e.g. `2024-53201`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(String);

impl CaseId {
  /// Compose an identifier from a calendar year and a numeric suffix.
  pub fn new(year: i32, suffix: u32) -> Self { Self(format!("{year:04}-{suffix:05}")) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Whether the identifier has the canonical `YYYY-NNNNN` shape.
  pub fn is_well_formed(&self) -> bool {
    let Some((year, suffix)) = self.0.split_once('-') else {
      return false;
    };
    year.len() == 4
      && suffix.len() == 5
      && year.bytes().all(|b| b.is_ascii_digit())
      && suffix.bytes().all(|b| b.is_ascii_digit())
  }
}

impl fmt::Display for CaseId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<String> for CaseId {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for CaseId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

/// Supplies the random part of new case identifiers.
pub trait SuffixSource: Send + Sync {
  /// A value in `SUFFIX_MIN..=SUFFIX_MAX`.
  fn next_suffix(&self) -> u32;
}

/// Draws suffixes from the operating system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

/// Number of distinct suffixes.
const SUFFIX_SPAN: u32 = SUFFIX_MAX - SUFFIX_MIN + 1;

/// Largest multiple of [`SUFFIX_SPAN`] that fits in a `u32`; draws at or
/// above it are rejected so every suffix is equally likely.
const SUFFIX_ZONE: u32 = u32::MAX - u32::MAX % SUFFIX_SPAN;

/// Map a raw draw onto a suffix, or `None` if it falls in the biased tail.
fn suffix_from_draw(draw: u32) -> Option<u32> {
  (draw < SUFFIX_ZONE).then(|| SUFFIX_MIN + draw % SUFFIX_SPAN)
}

impl SuffixSource for OsRandom {
  fn next_suffix(&self) -> u32 {
    loop {
      if let Some(suffix) = suffix_from_draw(OsRng.next_u32()) {
        return suffix;
      }
    }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Procedural state of a case. Independent of the soft-delete flag.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
  #[default]
  Open,
  Closed,
  Archived,
}

// ─── Case ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
  pub case_id:             CaseId,
  /// Free-form secondary reference; never validated.
  pub internal_roll:       Option<String>,
  pub description:         String,
  pub status:              CaseStatus,
  /// National id of the defendant citizen.
  pub defendant_id:        String,
  /// External identity of the actor who opened the case.
  pub assigned_officer_id: String,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
  /// Soft-delete flag; archived cases are hidden from search.
  pub deleted:             bool,
}

/// Input to [`crate::lifecycle::CaseLifecycle::create`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewCase {
  /// Missing fields decode as blank and are rejected by `create`.
  #[serde(default)]
  pub defendant_id:  String,
  #[serde(default)]
  pub internal_roll: Option<String>,
  #[serde(default)]
  pub description:   String,
  /// Set from the authenticated actor, never from the request body.
  #[serde(skip)]
  pub creator_id:    String,
}

/// A partial update applied by [`crate::store::RecordStore::update_case`].
/// `updated_at` is mandatory so no change can skip refreshing it.
#[derive(Debug, Clone)]
pub struct CasePatch {
  pub status:     Option<CaseStatus>,
  pub deleted:    Option<bool>,
  pub updated_at: DateTime<Utc>,
}

impl CasePatch {
  pub fn deleted(deleted: bool) -> Self {
    Self { status: None, deleted: Some(deleted), updated_at: now() }
  }

  pub fn status(status: CaseStatus) -> Self {
    Self { status: Some(status), deleted: None, updated_at: now() }
  }
}

/// Current time truncated to microseconds, the precision the stores keep.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }
