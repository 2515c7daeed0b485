//! In-memory [`RecordStore`] used by this crate's unit tests.

use std::{
  collections::BTreeMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use chrono::Utc;

use crate::{
  case::{Case, CaseId, CasePatch, SuffixSource},
  citizen::{Citizen, Vehicle},
  identity::{Profile, Role, User},
  store::{CaseOrder, CaseQuery, RecordStore},
};

#[derive(Debug, thiserror::Error)]
#[error("injected store failure")]
pub struct InjectedFailure;

#[derive(Default)]
struct Tables {
  citizens: BTreeMap<String, Citizen>,
  vehicles: BTreeMap<String, Vehicle>,
  cases:    BTreeMap<CaseId, Case>,
  users:    BTreeMap<String, User>,
}

#[derive(Default)]
pub struct MemoryStore {
  tables:    Mutex<Tables>,
  fail_next: AtomicBool,
}

impl MemoryStore {
  /// Make the next store call fail.
  pub fn fail_next(&self) { self.fail_next.store(true, Ordering::SeqCst); }

  pub fn seed_citizen(&self, citizen: Citizen) {
    self.tables.lock().unwrap().citizens.insert(citizen.national_id.clone(), citizen);
  }

  pub fn citizen(&self, national_id: &str) -> Option<Citizen> {
    self.tables.lock().unwrap().citizens.get(national_id).cloned()
  }

  pub fn citizen_count(&self) -> usize { self.tables.lock().unwrap().citizens.len() }

  pub fn case_count(&self) -> usize { self.tables.lock().unwrap().cases.len() }

  fn check(&self) -> Result<(), InjectedFailure> {
    if self.fail_next.swap(false, Ordering::SeqCst) { Err(InjectedFailure) } else { Ok(()) }
  }
}

fn contains(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl RecordStore for MemoryStore {
  type Error = InjectedFailure;

  async fn get_citizen(&self, national_id: String) -> Result<Option<Citizen>, Self::Error> {
    self.check()?;
    Ok(self.citizen(&national_id))
  }

  async fn insert_citizen(&self, citizen: Citizen) -> Result<bool, Self::Error> {
    self.check()?;
    let mut t = self.tables.lock().unwrap();
    if t.citizens.contains_key(&citizen.national_id) {
      return Ok(false);
    }
    t.citizens.insert(citizen.national_id.clone(), citizen);
    Ok(true)
  }

  async fn search_citizens(&self, text: String, limit: usize) -> Result<Vec<Citizen>, Self::Error> {
    self.check()?;
    let t = self.tables.lock().unwrap();
    Ok(
      t.citizens
        .values()
        .filter(|c| contains(&c.national_id, &text) || contains(&c.full_name, &text))
        .take(limit)
        .cloned()
        .collect(),
    )
  }

  async fn insert_vehicle(&self, vehicle: Vehicle) -> Result<bool, Self::Error> {
    self.check()?;
    let mut t = self.tables.lock().unwrap();
    if t.vehicles.contains_key(&vehicle.plate) {
      return Ok(false);
    }
    t.vehicles.insert(vehicle.plate.clone(), vehicle);
    Ok(true)
  }

  async fn search_vehicles(&self, text: String, limit: usize) -> Result<Vec<Vehicle>, Self::Error> {
    self.check()?;
    let t = self.tables.lock().unwrap();
    Ok(t.vehicles.values().filter(|v| contains(&v.plate, &text)).take(limit).cloned().collect())
  }

  async fn vehicles_owned_by(&self, national_id: String) -> Result<Vec<Vehicle>, Self::Error> {
    self.check()?;
    let t = self.tables.lock().unwrap();
    Ok(
      t.vehicles
        .values()
        .filter(|v| v.owner_id.as_deref() == Some(national_id.as_str()))
        .cloned()
        .collect(),
    )
  }

  async fn get_case(&self, case_id: CaseId) -> Result<Option<Case>, Self::Error> {
    self.check()?;
    Ok(self.tables.lock().unwrap().cases.get(&case_id).cloned())
  }

  async fn insert_case(&self, case: Case) -> Result<bool, Self::Error> {
    self.check()?;
    let mut t = self.tables.lock().unwrap();
    if t.cases.contains_key(&case.case_id) {
      return Ok(false);
    }
    t.cases.insert(case.case_id.clone(), case);
    Ok(true)
  }

  async fn update_case(&self, case_id: CaseId, patch: CasePatch) -> Result<bool, Self::Error> {
    self.check()?;
    let mut t = self.tables.lock().unwrap();
    let Some(case) = t.cases.get_mut(&case_id) else {
      return Ok(false);
    };
    if let Some(status) = patch.status {
      case.status = status;
    }
    if let Some(deleted) = patch.deleted {
      case.deleted = deleted;
    }
    case.updated_at = patch.updated_at;
    Ok(true)
  }

  async fn delete_case(&self, case_id: CaseId) -> Result<bool, Self::Error> {
    self.check()?;
    Ok(self.tables.lock().unwrap().cases.remove(&case_id).is_some())
  }

  async fn find_cases(&self, query: CaseQuery) -> Result<Vec<Case>, Self::Error> {
    self.check()?;
    let t = self.tables.lock().unwrap();
    let mut cases: Vec<Case> = t
      .cases
      .values()
      .filter(|c| query.deleted.is_none_or(|d| c.deleted == d))
      .filter(|c| query.defendant_id.as_deref().is_none_or(|d| c.defendant_id == d))
      .filter(|c| {
        query.text.as_deref().is_none_or(|text| {
          contains(c.case_id.as_str(), text)
            || c.internal_roll.as_deref().is_some_and(|r| contains(r, text))
        })
      })
      .cloned()
      .collect();
    if query.order == CaseOrder::UpdatedDesc {
      cases.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    }
    cases.truncate(query.limit.unwrap_or(usize::MAX));
    Ok(cases)
  }

  async fn upsert_user(&self, profile: Profile, default_role: Role) -> Result<User, Self::Error> {
    self.check()?;
    let now = Utc::now();
    let mut t = self.tables.lock().unwrap();
    let user = t.users.entry(profile.external_id.clone()).or_insert_with(|| User {
      external_id:  profile.external_id.clone(),
      username:     profile.username.clone(),
      avatar:       None,
      role:         default_role,
      created_at:   now,
      last_seen_at: now,
    });
    user.username = profile.username;
    user.avatar = profile.avatar;
    user.last_seen_at = now;
    Ok(user.clone())
  }
}

/// Replays a fixed list of suffixes, then repeats the last one forever.
pub struct FixedSuffixes {
  values: Vec<u32>,
  next:   AtomicUsize,
}

impl FixedSuffixes {
  pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
    Self { values: values.into_iter().collect(), next: AtomicUsize::new(0) }
  }
}

impl SuffixSource for FixedSuffixes {
  fn next_suffix(&self) -> u32 {
    let i = self.next.fetch_add(1, Ordering::SeqCst);
    self.values[i.min(self.values.len() - 1)]
  }
}
