//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use docket_core::{
  Error as CoreError,
  case::{Case, CaseId, CasePatch, CaseStatus, NewCase, now},
  citizen::{Citizen, PLACEHOLDER_NAME, Vehicle},
  gate::Operation,
  identity::{Actor, Profile, Role},
  lifecycle::{CaseLifecycle, SEARCH_LIMIT},
  records,
  store::{CaseOrder, CaseQuery, RecordStore},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn citizen(id: &str, name: &str) -> Citizen {
  let mut c = Citizen::placeholder(id);
  c.full_name = name.into();
  c
}

fn case(id: &str, defendant: &str) -> Case {
  let at = now();
  Case {
    case_id:             CaseId::from(id),
    internal_roll:       None,
    description:         "Theft".into(),
    status:              CaseStatus::Open,
    defendant_id:        defendant.into(),
    assigned_officer_id: "officer-1".into(),
    created_at:          at,
    updated_at:          at,
    deleted:             false,
  }
}

fn new_case(defendant: &str, description: &str) -> NewCase {
  NewCase {
    defendant_id:  defendant.into(),
    internal_roll: None,
    description:   description.into(),
    creator_id:    "officer-1".into(),
  }
}

// ─── Citizens ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_citizen() {
  let s = store().await;
  let mut c = citizen("12.345.678-9", "Ana Pérez");
  c.background_records = vec!["2019: public disorder".into()];
  c.birth_date = Some("1990-04-02".into());

  assert!(s.insert_citizen(c.clone()).await.unwrap());
  let fetched = s.get_citizen("12.345.678-9".into()).await.unwrap().unwrap();
  assert_eq!(fetched, c);
}

#[tokio::test]
async fn duplicate_citizen_insert_reports_false() {
  let s = store().await;
  assert!(s.insert_citizen(citizen("1-9", "First")).await.unwrap());
  assert!(!s.insert_citizen(citizen("1-9", "Second")).await.unwrap());

  let kept = s.get_citizen("1-9".into()).await.unwrap().unwrap();
  assert_eq!(kept.full_name, "First");
}

#[tokio::test]
async fn get_citizen_missing_returns_none() {
  let s = store().await;
  assert!(s.get_citizen("0-0".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn citizen_search_is_case_insensitive() {
  let s = store().await;
  s.insert_citizen(citizen("1-9", "Jane Roe")).await.unwrap();
  s.insert_citizen(citizen("2-7", "John Doe")).await.unwrap();

  let hits = s.search_citizens("JANE".into(), 20).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].national_id, "1-9");

  let hits = s.search_citizens("2-".into(), 20).await.unwrap();
  assert_eq!(hits[0].full_name, "John Doe");
}

#[tokio::test]
async fn citizen_search_folds_non_ascii_case() {
  let s = store().await;
  s.insert_citizen(citizen("3-3", "JOSÉ MUÑOZ")).await.unwrap();
  s.insert_citizen(citizen("4-4", "Ángela Núñez")).await.unwrap();

  let hits = s.search_citizens("muñoz".into(), 20).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].national_id, "3-3");

  let hits = s.search_citizens("ÁNGELA NÚ".into(), 20).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].national_id, "4-4");
}

#[tokio::test]
async fn blank_citizen_is_refused() {
  let s = store().await;
  let err = s.insert_citizen(citizen("  ", "Nobody")).await.unwrap_err();
  assert!(matches!(err, Error::Malformed(_)));
}

// ─── Vehicles ────────────────────────────────────────────────────────────────

fn vehicle(plate: &str, owner: Option<&str>) -> Vehicle {
  Vehicle {
    plate:    plate.into(),
    model:    "Pickup".into(),
    color:    Some("red".into()),
    owner_id: owner.map(str::to_owned),
  }
}

#[tokio::test]
async fn vehicles_by_plate_and_owner() {
  let s = store().await;
  assert!(s.insert_vehicle(vehicle("AB-1234", Some("1-9"))).await.unwrap());
  assert!(s.insert_vehicle(vehicle("CD-5678", Some("1-9"))).await.unwrap());
  assert!(s.insert_vehicle(vehicle("EF-0000", None)).await.unwrap());
  assert!(!s.insert_vehicle(vehicle("AB-1234", None)).await.unwrap());

  let hits = s.search_vehicles("ab-".into(), 20).await.unwrap();
  assert_eq!(hits, vec![vehicle("AB-1234", Some("1-9"))]);

  let owned = s.vehicles_owned_by("1-9".into()).await.unwrap();
  let plates: Vec<_> = owned.iter().map(|v| v.plate.as_str()).collect();
  assert_eq!(plates, ["AB-1234", "CD-5678"]);
}

// ─── Cases ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_case_roundtrip() {
  let s = store().await;
  s.insert_citizen(citizen("1-9", "Jane Roe")).await.unwrap();
  let mut c = case("2024-12345", "1-9");
  c.internal_roll = Some("RIT-77".into());

  assert!(s.insert_case(c.clone()).await.unwrap());
  let fetched = s.get_case(c.case_id.clone()).await.unwrap().unwrap();
  assert_eq!(fetched, c);
}

#[tokio::test]
async fn duplicate_case_id_reports_false_even_when_archived() {
  let s = store().await;
  s.insert_citizen(citizen("1-9", "Jane Roe")).await.unwrap();
  let mut archived = case("2024-12345", "1-9");
  archived.deleted = true;
  assert!(s.insert_case(archived).await.unwrap());

  assert!(!s.insert_case(case("2024-12345", "1-9")).await.unwrap());
}

#[tokio::test]
async fn case_for_unknown_citizen_violates_foreign_key() {
  let s = store().await;
  let err = s.insert_case(case("2024-12345", "nobody")).await.unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn malformed_case_id_is_refused() {
  let s = store().await;
  s.insert_citizen(citizen("1-9", "Jane Roe")).await.unwrap();
  let err = s.insert_case(case("not-an-id", "1-9")).await.unwrap_err();
  assert!(matches!(err, Error::Malformed(_)));
}

#[tokio::test]
async fn update_patches_only_given_fields() {
  let s = store().await;
  s.insert_citizen(citizen("1-9", "Jane Roe")).await.unwrap();
  let c = case("2024-12345", "1-9");
  s.insert_case(c.clone()).await.unwrap();

  assert!(s.update_case(c.case_id.clone(), CasePatch::deleted(true)).await.unwrap());
  let after = s.get_case(c.case_id.clone()).await.unwrap().unwrap();
  assert!(after.deleted);
  assert_eq!(after.status, CaseStatus::Open);
  assert!(after.updated_at >= c.updated_at);

  assert!(s.update_case(c.case_id.clone(), CasePatch::status(CaseStatus::Closed)).await.unwrap());
  let after = s.get_case(c.case_id.clone()).await.unwrap().unwrap();
  assert!(after.deleted);
  assert_eq!(after.status, CaseStatus::Closed);
}

#[tokio::test]
async fn update_and_delete_missing_case_report_false() {
  let s = store().await;
  let ghost = CaseId::from("2024-00000");
  assert!(!s.update_case(ghost.clone(), CasePatch::deleted(true)).await.unwrap());
  assert!(!s.delete_case(ghost).await.unwrap());
}

#[tokio::test]
async fn find_cases_filters_and_orders() {
  let s = store().await;
  s.insert_citizen(citizen("1-9", "Jane Roe")).await.unwrap();
  s.insert_citizen(citizen("2-7", "John Doe")).await.unwrap();

  let mut a = case("2024-10001", "1-9");
  a.internal_roll = Some("50%_discount".into());
  let mut b = case("2024-10002", "2-7");
  b.deleted = true;
  b.updated_at = a.updated_at + chrono::Duration::seconds(5);
  let mut c = case("2024-10003", "1-9");
  c.deleted = true;
  c.updated_at = a.updated_at + chrono::Duration::seconds(10);
  for x in [&a, &b, &c] {
    s.insert_case(x.clone()).await.unwrap();
  }

  let visible = s
    .find_cases(CaseQuery { deleted: Some(false), ..CaseQuery::default() })
    .await
    .unwrap();
  assert_eq!(visible, vec![a.clone()]);

  let bin = s
    .find_cases(CaseQuery {
      deleted: Some(true),
      order: CaseOrder::UpdatedDesc,
      ..CaseQuery::default()
    })
    .await
    .unwrap();
  let ids: Vec<_> = bin.iter().map(|x| x.case_id.as_str()).collect();
  assert_eq!(ids, ["2024-10003", "2024-10002"]);

  let for_defendant = s
    .find_cases(CaseQuery { defendant_id: Some("1-9".into()), ..CaseQuery::default() })
    .await
    .unwrap();
  assert_eq!(for_defendant.len(), 2);

  let limited = s
    .find_cases(CaseQuery { limit: Some(1), ..CaseQuery::default() })
    .await
    .unwrap();
  assert_eq!(limited.len(), 1);
  assert_eq!(limited[0].case_id.as_str(), "2024-10001");
}

#[tokio::test]
async fn text_search_treats_wildcards_literally() {
  let s = store().await;
  s.insert_citizen(citizen("1-9", "Jane Roe")).await.unwrap();
  let mut a = case("2024-10001", "1-9");
  a.internal_roll = Some("50%_discount".into());
  let mut b = case("2024-10002", "1-9");
  b.internal_roll = Some("500 discount".into());
  s.insert_case(a).await.unwrap();
  s.insert_case(b).await.unwrap();

  let hits = s
    .find_cases(CaseQuery { text: Some("0%_D".into()), ..CaseQuery::default() })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].case_id.as_str(), "2024-10001");

  let by_id = s
    .find_cases(CaseQuery { text: Some("10002".into()), ..CaseQuery::default() })
    .await
    .unwrap();
  assert_eq!(by_id.len(), 1);
}

#[tokio::test]
async fn text_search_folds_non_ascii_case_in_roll_and_plate() {
  let s = store().await;
  s.insert_citizen(citizen("1-9", "Jane Roe")).await.unwrap();
  let mut a = case("2024-10001", "1-9");
  a.internal_roll = Some("ROL-ÑANDÚ-7".into());
  s.insert_case(a).await.unwrap();
  s.insert_case(case("2024-10002", "1-9")).await.unwrap();

  let hits = s
    .find_cases(CaseQuery { text: Some("ñandú".into()), ..CaseQuery::default() })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].case_id.as_str(), "2024-10001");

  s.insert_vehicle(vehicle("ÑU-1234", None)).await.unwrap();
  let hits = s.search_vehicles("ñu-".into(), 20).await.unwrap();
  assert_eq!(hits.len(), 1);
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_user_keeps_role_and_refreshes_profile() {
  let s = store().await;
  let first = s
    .upsert_user(
      Profile { external_id: "42".into(), username: "ana".into(), avatar: None },
      Role::Staff,
    )
    .await
    .unwrap();
  assert_eq!(first.role, Role::Staff);

  let second = s
    .upsert_user(
      Profile {
        external_id: "42".into(),
        username:    "ana2".into(),
        avatar:      Some("a.png".into()),
      },
      Role::Officer,
    )
    .await
    .unwrap();
  assert_eq!(second.role, Role::Staff);
  assert_eq!(second.username, "ana2");
  assert_eq!(second.avatar.as_deref(), Some("a.png"));
  assert_eq!(second.created_at, first.created_at);
  assert!(second.last_seen_at >= first.last_seen_at);
}

// ─── Lifecycle over SQLite ───────────────────────────────────────────────────

#[tokio::test]
async fn lifecycle_scenario_end_to_end() {
  let store = Arc::new(store().await);
  let m = CaseLifecycle::new(Arc::clone(&store));
  let officer = Actor { external_id: "o".into(), role: Role::Officer };
  let admin = Actor { external_id: "a".into(), role: Role::Admin };

  officer.authorize(Operation::Create).unwrap();
  let created = m.create(new_case("12.345.678-9", "Theft")).await.unwrap();
  assert_eq!(created.status, CaseStatus::Open);
  assert!(!created.deleted);
  assert!(created.case_id.is_well_formed());

  let defendant = store.get_citizen("12.345.678-9".into()).await.unwrap().unwrap();
  assert_eq!(defendant.full_name, PLACEHOLDER_NAME);
  assert!(defendant.background_records.is_empty());

  officer.authorize(Operation::Archive).unwrap();
  m.archive(&created.case_id).await.unwrap();
  m.archive(&created.case_id).await.unwrap();
  let bin = m.list_archived().await.unwrap();
  assert_eq!(bin.len(), 1);
  assert_eq!(bin[0].case_id, created.case_id);

  m.restore(&created.case_id).await.unwrap();
  assert!(m.list_archived().await.unwrap().is_empty());
  let hits = m.search(created.case_id.as_str()).await.unwrap().unwrap();
  assert_eq!(hits.len(), 1);
  assert!(hits[0].updated_at >= created.updated_at);

  assert!(officer.authorize(Operation::Destroy).is_err());
  admin.authorize(Operation::Destroy).unwrap();
  m.destroy(&created.case_id).await.unwrap();
  assert!(m.search(created.case_id.as_str()).await.unwrap().unwrap().is_empty());
  assert!(m.list_archived().await.unwrap().is_empty());
  assert!(matches!(
    m.destroy(&created.case_id).await,
    Err(CoreError::CaseNotFound(_))
  ));

  // The placeholder citizen outlives the case.
  assert!(store.get_citizen("12.345.678-9".into()).await.unwrap().is_some());
}

#[tokio::test]
async fn lifecycle_search_caps_results() {
  let store = Arc::new(store().await);
  let m = CaseLifecycle::new(Arc::clone(&store));
  for i in 0..(SEARCH_LIMIT + 5) {
    let mut input = new_case("1-9", "Bulk");
    input.internal_roll = Some(format!("roll-{i}"));
    m.create(input).await.unwrap();
  }

  let hits = m.search("ROLL").await.unwrap().unwrap();
  assert_eq!(hits.len(), SEARCH_LIMIT);
  assert!(m.search("").await.unwrap().is_none());
}

#[tokio::test]
async fn citizen_record_over_sqlite() {
  let store = Arc::new(store().await);
  store.insert_citizen(citizen("1-9", "Jane Roe")).await.unwrap();
  store.insert_vehicle(vehicle("AB-1234", Some("1-9"))).await.unwrap();
  let m = CaseLifecycle::new(Arc::clone(&store));
  m.create(new_case("1-9", "Theft")).await.unwrap();

  let record = records::citizen_record(store.as_ref(), "1-9").await.unwrap();
  assert_eq!(record.citizen.full_name, "Jane Roe");
  assert_eq!(record.vehicles.len(), 1);
  assert_eq!(record.cases.len(), 1);
}
