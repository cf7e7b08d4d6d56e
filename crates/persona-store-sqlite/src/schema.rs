//! SQL schema for the persona SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS persons (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    surname     TEXT    NOT NULL,
    name_folded    TEXT NOT NULL,  -- lowercase(name), for substring search
    surname_folded TEXT NOT NULL,  -- lowercase(surname)
    patronymic  TEXT,
    age         INTEGER CHECK (age IS NULL OR age >= 0),
    gender      TEXT    CHECK (gender IS NULL OR gender IN ('male', 'female')),
    nationality TEXT,              -- ISO 3166-1 alpha-2
    created_at  TEXT    NOT NULL,  -- RFC 3339 UTC; server-assigned, immutable
    updated_at  TEXT    NOT NULL   -- RFC 3339 UTC; bumped on every update
);

CREATE INDEX IF NOT EXISTS persons_name_idx    ON persons(name);
CREATE INDEX IF NOT EXISTS persons_surname_idx ON persons(surname);
CREATE INDEX IF NOT EXISTS persons_age_idx     ON persons(age);

PRAGMA user_version = 1;
";
