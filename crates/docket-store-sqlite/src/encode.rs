//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so lexical and chronological order agree. Enums are stored by their
//! canonical names; string lists as compact JSON.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use docket_core::{
  case::{Case, CaseStatus},
  citizen::{Citizen, Vehicle},
  identity::{Role, User},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<CaseStatus> {
  CaseStatus::from_str(s)
    .map_err(|_| Error::InvalidValue { column: "status", value: s.to_owned() })
}

pub fn decode_role(s: &str) -> Result<Role> {
  Role::from_str(s).map_err(|_| Error::InvalidValue { column: "role", value: s.to_owned() })
}

pub fn decode_flag(v: i64) -> Result<bool> {
  match v {
    0 => Ok(false),
    1 => Ok(true),
    other => Err(Error::InvalidValue { column: "deleted", value: other.to_string() }),
  }
}

// ─── String lists ────────────────────────────────────────────────────────────

pub fn encode_list(items: &[String]) -> Result<String> { Ok(serde_json::to_string(items)?) }

pub fn decode_list(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

// ─── Text search ─────────────────────────────────────────────────────────────

/// SQL function lowercasing its argument with full Unicode case mapping.
/// SQLite's own `lower()` and `LIKE` only fold ASCII letters.
pub const LOWER_FN: &str = "unicode_lower";

/// Register [`LOWER_FN`] on `conn`. Must run on every new connection.
pub fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  use rusqlite::functions::FunctionFlags;

  conn.create_scalar_function(
    LOWER_FN,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
  )
}

/// `%text%`, lowercased, with `\`, `%` and `_` escaped, for use as
/// `unicode_lower(column) LIKE ? ESCAPE '\'`.
pub fn like_pattern(text: &str) -> String {
  let mut out = String::with_capacity(text.len() + 2);
  out.push('%');
  for c in text.to_lowercase().chars() {
    if matches!(c, '\\' | '%' | '_') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Write-side validation ───────────────────────────────────────────────────

pub fn validate_case(case: &Case) -> Result<()> {
  if !case.case_id.is_well_formed() {
    return Err(Error::Malformed(format!("case id {:?}", case.case_id.as_str())));
  }
  if case.description.trim().is_empty() {
    return Err(Error::Malformed("case without description".into()));
  }
  if case.defendant_id.trim().is_empty() {
    return Err(Error::Malformed("case without defendant".into()));
  }
  Ok(())
}

pub fn validate_citizen(citizen: &Citizen) -> Result<()> {
  if citizen.national_id.trim().is_empty() || citizen.full_name.trim().is_empty() {
    return Err(Error::Malformed("citizen without national id or name".into()));
  }
  Ok(())
}

pub fn validate_vehicle(vehicle: &Vehicle) -> Result<()> {
  if vehicle.plate.trim().is_empty() || vehicle.model.trim().is_empty() {
    return Err(Error::Malformed("vehicle without plate or model".into()));
  }
  Ok(())
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const CASE_COLUMNS: &str = "case_id, internal_roll, description, status, defendant_id, \
                                assigned_officer_id, created_at, updated_at, deleted";

/// Raw values read directly from a `cases` row.
pub struct RawCase {
  pub case_id:             String,
  pub internal_roll:       Option<String>,
  pub description:         String,
  pub status:              String,
  pub defendant_id:        String,
  pub assigned_officer_id: String,
  pub created_at:          String,
  pub updated_at:          String,
  pub deleted:             i64,
}

impl RawCase {
  /// Read a row selected with [`CASE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      case_id:             row.get(0)?,
      internal_roll:       row.get(1)?,
      description:         row.get(2)?,
      status:              row.get(3)?,
      defendant_id:        row.get(4)?,
      assigned_officer_id: row.get(5)?,
      created_at:          row.get(6)?,
      updated_at:          row.get(7)?,
      deleted:             row.get(8)?,
    })
  }

  pub fn into_case(self) -> Result<Case> {
    Ok(Case {
      case_id:             self.case_id.into(),
      internal_roll:       self.internal_roll,
      description:         self.description,
      status:              decode_status(&self.status)?,
      defendant_id:        self.defendant_id,
      assigned_officer_id: self.assigned_officer_id,
      created_at:          decode_dt(&self.created_at)?,
      updated_at:          decode_dt(&self.updated_at)?,
      deleted:             decode_flag(self.deleted)?,
    })
  }
}

pub const CITIZEN_COLUMNS: &str = "national_id, full_name, birth_date, background_records, created_at";

/// Raw values read directly from a `citizens` row.
pub struct RawCitizen {
  pub national_id:        String,
  pub full_name:          String,
  pub birth_date:         Option<String>,
  pub background_records: String,
  pub created_at:         String,
}

impl RawCitizen {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      national_id:        row.get(0)?,
      full_name:          row.get(1)?,
      birth_date:         row.get(2)?,
      background_records: row.get(3)?,
      created_at:         row.get(4)?,
    })
  }

  pub fn into_citizen(self) -> Result<Citizen> {
    Ok(Citizen {
      national_id:        self.national_id,
      full_name:          self.full_name,
      birth_date:         self.birth_date,
      background_records: decode_list(&self.background_records)?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

pub const VEHICLE_COLUMNS: &str = "plate, model, color, owner_id";

pub fn vehicle_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Vehicle> {
  Ok(Vehicle {
    plate:    row.get(0)?,
    model:    row.get(1)?,
    color:    row.get(2)?,
    owner_id: row.get(3)?,
  })
}

pub const USER_COLUMNS: &str = "external_id, username, avatar, role, created_at, last_seen_at";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub external_id:  String,
  pub username:     String,
  pub avatar:       Option<String>,
  pub role:         String,
  pub created_at:   String,
  pub last_seen_at: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      external_id:  row.get(0)?,
      username:     row.get(1)?,
      avatar:       row.get(2)?,
      role:         row.get(3)?,
      created_at:   row.get(4)?,
      last_seen_at: row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      external_id:  self.external_id,
      username:     self.username,
      avatar:       self.avatar,
      role:         decode_role(&self.role)?,
      created_at:   decode_dt(&self.created_at)?,
      last_seen_at: decode_dt(&self.last_seen_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("ab"), "%ab%");
    assert_eq!(like_pattern("MUÑOZ"), "%muñoz%");
    assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
  }

  #[test]
  fn timestamps_are_fixed_width() {
    let a = decode_dt("2024-01-01T00:00:00Z").unwrap();
    let b = decode_dt("2024-01-01T00:00:00.5Z").unwrap();
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn unknown_enum_values_are_rejected() {
    assert!(matches!(decode_status("PENDING"), Err(Error::InvalidValue { column: "status", .. })));
    assert!(matches!(decode_role("root"), Err(Error::InvalidValue { column: "role", .. })));
    assert!(decode_flag(2).is_err());
  }
}
