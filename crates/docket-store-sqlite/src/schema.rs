//! SQL schema for the Docket SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS citizens (
    national_id        TEXT PRIMARY KEY,
    full_name          TEXT NOT NULL,
    birth_date         TEXT,
    background_records TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    created_at         TEXT NOT NULL
);

-- owner_id is informational; vehicles may name owners we have no row for.
CREATE TABLE IF NOT EXISTS vehicles (
    plate    TEXT PRIMARY KEY,
    model    TEXT NOT NULL,
    color    TEXT,
    owner_id TEXT
);

-- case_id stays taken while a case is archived; only DELETE frees it.
CREATE TABLE IF NOT EXISTS cases (
    case_id             TEXT PRIMARY KEY,
    internal_roll       TEXT,
    description         TEXT NOT NULL CHECK (length(trim(description)) > 0),
    status              TEXT NOT NULL DEFAULT 'OPEN'
                        CHECK (status IN ('OPEN', 'CLOSED', 'ARCHIVED')),
    defendant_id        TEXT NOT NULL REFERENCES citizens(national_id),
    assigned_officer_id TEXT NOT NULL,
    created_at          TEXT NOT NULL,   -- RFC 3339 UTC, microseconds
    updated_at          TEXT NOT NULL,
    deleted             INTEGER NOT NULL DEFAULT 0 CHECK (deleted IN (0, 1))
);

CREATE TABLE IF NOT EXISTS users (
    external_id  TEXT PRIMARY KEY,
    username     TEXT NOT NULL,
    avatar       TEXT,
    role         TEXT NOT NULL,   -- 'officer' | 'staff' | 'admin' | 'judge'
    created_at   TEXT NOT NULL,
    last_seen_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS cases_bin_idx       ON cases(deleted, updated_at);
CREATE INDEX IF NOT EXISTS cases_defendant_idx ON cases(defendant_id);
CREATE INDEX IF NOT EXISTS vehicles_owner_idx  ON vehicles(owner_id);

PRAGMA user_version = 1;
";
