//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};

use docket_core::{
  case::{Case, CaseId, CasePatch},
  citizen::{Citizen, Vehicle},
  identity::{Profile, Role, User},
  store::{CaseOrder, CaseQuery, RecordStore},
};

use crate::{
  Result,
  encode::{
    CASE_COLUMNS, CITIZEN_COLUMNS, RawCase, RawCitizen, RawUser, USER_COLUMNS, VEHICLE_COLUMNS,
    encode_dt, encode_list, like_pattern, register_functions, validate_case, validate_citizen,
    validate_vehicle, vehicle_from_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Docket record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("schema initialised");
    Ok(())
  }

  /// Run a single-row lookup of `columns` from `table` keyed on `key_column`.
  async fn lookup<T, F>(
    &self,
    table: &'static str,
    columns: &'static str,
    key_column: &'static str,
    key: String,
    map: F,
  ) -> Result<Option<T>>
  where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
  {
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {columns} FROM {table} WHERE {key_column} = ?1");
        Ok(conn.query_row(&sql, rusqlite::params![key], map).optional()?)
      })
      .await?;
    Ok(raw)
  }

  /// Execute one write statement and report whether it touched a row.
  async fn execute(&self, sql: &'static str, args: Vec<Value>) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(args))?))
      .await?;
    Ok(changed > 0)
  }
}

fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

fn opt_text(s: Option<String>) -> Value { s.map_or(Value::Null, Value::Text) }

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  // ── Citizens ──────────────────────────────────────────────────────────────

  async fn get_citizen(&self, national_id: String) -> Result<Option<Citizen>> {
    self
      .lookup("citizens", CITIZEN_COLUMNS, "national_id", national_id, RawCitizen::from_row)
      .await?
      .map(RawCitizen::into_citizen)
      .transpose()
  }

  async fn insert_citizen(&self, citizen: Citizen) -> Result<bool> {
    validate_citizen(&citizen)?;
    let args = vec![
      text(citizen.national_id),
      text(citizen.full_name),
      opt_text(citizen.birth_date),
      text(encode_list(&citizen.background_records)?),
      text(encode_dt(citizen.created_at)),
    ];
    self
      .execute(
        "INSERT INTO citizens (national_id, full_name, birth_date, background_records, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (national_id) DO NOTHING",
        args,
      )
      .await
  }

  async fn search_citizens(&self, text: String, limit: usize) -> Result<Vec<Citizen>> {
    let pattern = like_pattern(&text);
    let limit = limit as i64;

    let raws: Vec<RawCitizen> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {CITIZEN_COLUMNS} FROM citizens
           WHERE unicode_lower(national_id) LIKE ?1 ESCAPE '\\'
              OR unicode_lower(full_name) LIKE ?1 ESCAPE '\\'
           ORDER BY full_name, national_id
           LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![pattern, limit], RawCitizen::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCitizen::into_citizen).collect()
  }

  // ── Vehicles ──────────────────────────────────────────────────────────────

  async fn insert_vehicle(&self, vehicle: Vehicle) -> Result<bool> {
    validate_vehicle(&vehicle)?;
    let args = vec![
      text(vehicle.plate),
      text(vehicle.model),
      opt_text(vehicle.color),
      opt_text(vehicle.owner_id),
    ];
    self
      .execute(
        "INSERT INTO vehicles (plate, model, color, owner_id) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (plate) DO NOTHING",
        args,
      )
      .await
  }

  async fn search_vehicles(&self, text: String, limit: usize) -> Result<Vec<Vehicle>> {
    let pattern = like_pattern(&text);
    let limit = limit as i64;

    let vehicles = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {VEHICLE_COLUMNS} FROM vehicles
           WHERE unicode_lower(plate) LIKE ?1 ESCAPE '\\'
           ORDER BY plate
           LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![pattern, limit], vehicle_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(vehicles)
  }

  async fn vehicles_owned_by(&self, national_id: String) -> Result<Vec<Vehicle>> {
    let vehicles = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE owner_id = ?1 ORDER BY plate");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![national_id], vehicle_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(vehicles)
  }

  // ── Cases ─────────────────────────────────────────────────────────────────

  async fn get_case(&self, case_id: CaseId) -> Result<Option<Case>> {
    self
      .lookup("cases", CASE_COLUMNS, "case_id", case_id.to_string(), RawCase::from_row)
      .await?
      .map(RawCase::into_case)
      .transpose()
  }

  async fn insert_case(&self, case: Case) -> Result<bool> {
    validate_case(&case)?;
    let args = vec![
      text(case.case_id.to_string()),
      opt_text(case.internal_roll),
      text(case.description),
      text(case.status.to_string()),
      text(case.defendant_id),
      text(case.assigned_officer_id),
      text(encode_dt(case.created_at)),
      text(encode_dt(case.updated_at)),
      Value::Integer(i64::from(case.deleted)),
    ];
    self
      .execute(
        "INSERT INTO cases (
           case_id, internal_roll, description, status, defendant_id,
           assigned_officer_id, created_at, updated_at, deleted
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT (case_id) DO NOTHING",
        args,
      )
      .await
  }

  async fn update_case(&self, case_id: CaseId, patch: CasePatch) -> Result<bool> {
    let args = vec![
      text(case_id.to_string()),
      opt_text(patch.status.map(|s| s.to_string())),
      patch.deleted.map_or(Value::Null, |d| Value::Integer(i64::from(d))),
      text(encode_dt(patch.updated_at)),
    ];
    self
      .execute(
        "UPDATE cases
         SET status     = COALESCE(?2, status),
             deleted    = COALESCE(?3, deleted),
             updated_at = ?4
         WHERE case_id = ?1",
        args,
      )
      .await
  }

  async fn delete_case(&self, case_id: CaseId) -> Result<bool> {
    self
      .execute("DELETE FROM cases WHERE case_id = ?1", vec![text(case_id.to_string())])
      .await
  }

  async fn find_cases(&self, query: CaseQuery) -> Result<Vec<Case>> {
    // Build WHERE clause dynamically; placeholders are numbered by position
    // in `args`.
    let mut conds: Vec<String> = Vec::new();
    let mut args: Vec<Value> = Vec::new();

    if let Some(t) = &query.text {
      args.push(text(like_pattern(t)));
      let n = args.len();
      conds.push(format!(
        "(unicode_lower(case_id) LIKE ?{n} ESCAPE '\\' \
         OR unicode_lower(internal_roll) LIKE ?{n} ESCAPE '\\')"
      ));
    }
    if let Some(deleted) = query.deleted {
      args.push(Value::Integer(i64::from(deleted)));
      conds.push(format!("deleted = ?{}", args.len()));
    }
    if let Some(defendant) = query.defendant_id {
      args.push(text(defendant));
      conds.push(format!("defendant_id = ?{}", args.len()));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };
    let order_clause = match query.order {
      CaseOrder::CaseId => "ORDER BY case_id",
      CaseOrder::UpdatedDesc => "ORDER BY updated_at DESC, case_id",
    };
    args.push(Value::Integer(query.limit.map_or(-1, |l| l as i64)));
    let sql = format!(
      "SELECT {CASE_COLUMNS} FROM cases {where_clause} {order_clause} LIMIT ?{}",
      args.len()
    );

    let raws: Vec<RawCase> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), RawCase::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCase::into_case).collect()
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn upsert_user(&self, profile: Profile, default_role: Role) -> Result<User> {
    let now = encode_dt(Utc::now());
    let role = default_role.to_string();

    let raw: RawUser = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "INSERT INTO users (external_id, username, avatar, role, created_at, last_seen_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)
           ON CONFLICT (external_id) DO UPDATE SET
             username     = excluded.username,
             avatar       = excluded.avatar,
             last_seen_at = excluded.last_seen_at
           RETURNING {USER_COLUMNS}"
        );
        Ok(conn.query_row(
          &sql,
          rusqlite::params![profile.external_id, profile.username, profile.avatar, role, now],
          RawUser::from_row,
        )?)
      })
      .await?;

    raw.into_user()
  }
}
