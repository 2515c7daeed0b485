//! Citizens and vehicles: the reference records that cases point at.
//!
//! These have no lifecycle of their own: the portal searches them and, when a
//! case names an unknown defendant, inserts a placeholder citizen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::case::{Case, now};

/// Display name given to citizens created on the fly for a new case.
pub const PLACEHOLDER_NAME: &str = "Unknown Citizen";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citizen {
  /// National identity number; the citizen's unique key.
  pub national_id:        String,
  pub full_name:          String,
  /// Free text, as entered by the registry.
  pub birth_date:         Option<String>,
  /// Prior records, one entry per line of the background sheet.
  #[serde(default)]
  pub background_records: Vec<String>,
  #[serde(default = "now")]
  pub created_at:         DateTime<Utc>,
}

impl Citizen {
  /// A minimal citizen that exists only so a case can reference it.
  pub fn placeholder(national_id: impl Into<String>) -> Self {
    Self {
      national_id:        national_id.into(),
      full_name:          PLACEHOLDER_NAME.to_owned(),
      birth_date:         None,
      background_records: Vec::new(),
      created_at:         now(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
  /// Licence plate; the vehicle's unique key.
  pub plate:    String,
  pub model:    String,
  pub color:    Option<String>,
  /// National id of the registered owner. Not required to exist.
  pub owner_id: Option<String>,
}

/// Everything the portal knows about one citizen.
#[derive(Debug, Clone, Serialize)]
pub struct CitizenRecord {
  pub citizen:  Citizen,
  pub vehicles: Vec<Vehicle>,
  /// Non-archived cases naming the citizen as defendant.
  pub cases:    Vec<Case>,
}
