//! The case lifecycle manager.
//!
//! Owns every transition a case can make:
//!
//! ```text
//!            create
//!              │
//!              ▼
//!   ┌──── visible (deleted = false) ◀──┐
//!   │          │ archive       restore │
//!   │          ▼                       │
//!   │    archived (deleted = true) ────┘
//!   │          │
//!   └──────────┴──▶ destroy (record removed)
//! ```
//!
//! Authorization is not checked here; callers consult [`crate::gate`] first.

use std::sync::Arc;

use chrono::Datelike as _;

use crate::{
  Error, Result,
  case::{Case, CaseId, CasePatch, CaseStatus, NewCase, OsRandom, SuffixSource, now},
  citizen::Citizen,
  store::{CaseOrder, CaseQuery, RecordStore},
};

/// How many identifiers `create` tries before giving up.
pub const MAX_ID_ATTEMPTS: usize = 5;

/// Upper bound on rows returned by a search.
pub const SEARCH_LIMIT: usize = 20;

/// Case lifecycle operations over an injected [`RecordStore`].
///
/// Cloning is cheap; the store is reference-counted.
pub struct CaseLifecycle<S, G = OsRandom> {
  store: Arc<S>,
  ids:   G,
}

impl<S, G: Clone> Clone for CaseLifecycle<S, G> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store), ids: self.ids.clone() } }
}

impl<S: RecordStore> CaseLifecycle<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store, ids: OsRandom } }
}

impl<S: RecordStore, G: SuffixSource> CaseLifecycle<S, G> {
  /// Use a caller-supplied source for identifier suffixes.
  pub fn with_suffix_source(store: Arc<S>, ids: G) -> Self { Self { store, ids } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Open a new case, creating a placeholder defendant if needed.
  ///
  /// The placeholder insert and the case insert are separate writes; if the
  /// second one fails the placeholder stays behind.
  pub async fn create(&self, input: NewCase) -> Result<Case> {
    let description = input.description.trim();
    let defendant_id = input.defendant_id.trim();
    if description.is_empty() {
      return Err(Error::Validation("description is required".into()));
    }
    if defendant_id.is_empty() {
      return Err(Error::Validation("defendant id is required".into()));
    }

    self.ensure_citizen(defendant_id).await?;

    let created_at = now();
    let internal_roll = input
      .internal_roll
      .map(|r| r.trim().to_owned())
      .filter(|r| !r.is_empty());

    for attempt in 1..=MAX_ID_ATTEMPTS {
      let case = Case {
        case_id: CaseId::new(created_at.year(), self.ids.next_suffix()),
        internal_roll: internal_roll.clone(),
        description: description.to_owned(),
        status: CaseStatus::Open,
        defendant_id: defendant_id.to_owned(),
        assigned_officer_id: input.creator_id.clone(),
        created_at,
        updated_at: created_at,
        deleted: false,
      };

      if self.store.insert_case(case.clone()).await.map_err(Error::store)? {
        tracing::info!(
          case_id = %case.case_id,
          defendant = %case.defendant_id,
          officer = %case.assigned_officer_id,
          "case created"
        );
        return Ok(case);
      }
      tracing::warn!(case_id = %case.case_id, attempt, "case id collision");
    }

    Err(Error::DuplicateIdentifier(MAX_ID_ATTEMPTS))
  }

  /// Soft-delete a case. Archiving an archived case succeeds.
  pub async fn archive(&self, case_id: &CaseId) -> Result<()> {
    self.apply(case_id, CasePatch::deleted(true)).await?;
    tracing::info!(%case_id, "case archived");
    Ok(())
  }

  /// Bring an archived case back. Restoring a visible case succeeds.
  pub async fn restore(&self, case_id: &CaseId) -> Result<()> {
    self.apply(case_id, CasePatch::deleted(false)).await?;
    tracing::info!(%case_id, "case restored");
    Ok(())
  }

  /// Remove a case permanently. No tombstone is kept.
  pub async fn destroy(&self, case_id: &CaseId) -> Result<()> {
    let removed = self
      .store
      .delete_case(case_id.clone())
      .await
      .map_err(Error::store)?;
    if !removed {
      return Err(Error::CaseNotFound(case_id.clone()));
    }
    tracing::warn!(%case_id, "case destroyed");
    Ok(())
  }

  /// Change the procedural status and return the updated case.
  pub async fn set_status(&self, case_id: &CaseId, status: CaseStatus) -> Result<Case> {
    self.apply(case_id, CasePatch::status(status)).await?;
    tracing::info!(%case_id, %status, "case status changed");
    self.get(case_id).await
  }

  pub async fn get(&self, case_id: &CaseId) -> Result<Case> {
    self
      .store
      .get_case(case_id.clone())
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::CaseNotFound(case_id.clone()))
  }

  /// Visible cases whose id or internal roll contains `text`.
  ///
  /// A blank `text` means no search was performed and yields `None`, which
  /// is distinct from a search that matched nothing.
  pub async fn search(&self, text: &str) -> Result<Option<Vec<Case>>> {
    let text = text.trim();
    if text.is_empty() {
      return Ok(None);
    }

    let query = CaseQuery {
      text: Some(text.to_owned()),
      deleted: Some(false),
      limit: Some(SEARCH_LIMIT),
      ..CaseQuery::default()
    };
    let cases = self.store.find_cases(query).await.map_err(Error::store)?;
    Ok(Some(cases))
  }

  /// The recycle bin: archived cases, most recently touched first.
  pub async fn list_archived(&self) -> Result<Vec<Case>> {
    let query = CaseQuery {
      deleted: Some(true),
      order: CaseOrder::UpdatedDesc,
      ..CaseQuery::default()
    };
    self.store.find_cases(query).await.map_err(Error::store)
  }

  async fn apply(&self, case_id: &CaseId, patch: CasePatch) -> Result<()> {
    let found = self
      .store
      .update_case(case_id.clone(), patch)
      .await
      .map_err(Error::store)?;
    if found { Ok(()) } else { Err(Error::CaseNotFound(case_id.clone())) }
  }

  async fn ensure_citizen(&self, national_id: &str) -> Result<()> {
    let existing = self
      .store
      .get_citizen(national_id.to_owned())
      .await
      .map_err(Error::store)?;
    if existing.is_some() {
      return Ok(());
    }

    // A concurrent create may have inserted the same placeholder; either
    // way the citizen now exists.
    let inserted = self
      .store
      .insert_citizen(Citizen::placeholder(national_id))
      .await
      .map_err(Error::store)?;
    if inserted {
      tracing::info!(national_id, "placeholder citizen created");
    }
    Ok(())
  }
}
