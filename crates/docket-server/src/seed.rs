//! Loading reference records (citizens and vehicles) from a JSON file.
//!
//! The portal never edits these records itself; a registry export is loaded
//! once with `server --seed <file>`. Records whose key already exists are
//! skipped, so loading the same file twice is harmless.

use std::path::Path;

use docket_core::{
  Error, Result,
  citizen::{Citizen, Vehicle},
  store::RecordStore,
};
use serde::Deserialize;

/// Top-level shape of a seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
  #[serde(default)]
  pub citizens: Vec<Citizen>,
  #[serde(default)]
  pub vehicles: Vec<Vehicle>,
}

impl SeedFile {
  pub fn read(path: &Path) -> anyhow::Result<Self> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
  }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
  pub citizens_added: usize,
  pub vehicles_added: usize,
  /// Records skipped because their key was already taken.
  pub skipped:        usize,
}

/// Insert every record of `seed`. Citizens go first so vehicle owners exist.
pub async fn load<S: RecordStore>(store: &S, seed: SeedFile) -> Result<SeedReport> {
  let mut report = SeedReport::default();

  for citizen in seed.citizens {
    if store.insert_citizen(citizen).await.map_err(Error::store)? {
      report.citizens_added += 1;
    } else {
      report.skipped += 1;
    }
  }
  for vehicle in seed.vehicles {
    if store.insert_vehicle(vehicle).await.map_err(Error::store)? {
      report.vehicles_added += 1;
    } else {
      report.skipped += 1;
    }
  }

  tracing::info!(
    citizens = report.citizens_added,
    vehicles = report.vehicles_added,
    skipped = report.skipped,
    "seed loaded"
  );
  Ok(report)
}

#[cfg(test)]
mod tests {
  use super::*;
  use docket_store_sqlite::SqliteStore;

  const SEED: &str = r#"{
    "citizens": [
      { "national_id": "12.345.678-9", "full_name": "Jane Roe", "birth_date": "1990-04-02",
        "background_records": ["2019 minor offence"] },
      { "national_id": "9.876.543-2", "full_name": "John Doe" }
    ],
    "vehicles": [
      { "plate": "AB-1234", "model": "Sedan", "color": "red", "owner_id": "12.345.678-9" }
    ]
  }"#;

  #[tokio::test]
  async fn loads_records_and_skips_existing_keys() {
    let store = SqliteStore::open_in_memory().await.unwrap();

    let seed: SeedFile = serde_json::from_str(SEED).unwrap();
    let report = load(&store, seed).await.unwrap();
    assert_eq!(report, SeedReport { citizens_added: 2, vehicles_added: 1, skipped: 0 });

    let jane = store.get_citizen("12.345.678-9".into()).await.unwrap().unwrap();
    assert_eq!(jane.background_records, vec!["2019 minor offence".to_string()]);
    let john = store.get_citizen("9.876.543-2".into()).await.unwrap().unwrap();
    assert!(john.background_records.is_empty());

    let again: SeedFile = serde_json::from_str(SEED).unwrap();
    let report = load(&store, again).await.unwrap();
    assert_eq!(report, SeedReport { citizens_added: 0, vehicles_added: 0, skipped: 3 });
  }

  #[test]
  fn empty_file_is_valid() {
    let seed: SeedFile = serde_json::from_str("{}").unwrap();
    assert!(seed.citizens.is_empty() && seed.vehicles.is_empty());
  }
}
