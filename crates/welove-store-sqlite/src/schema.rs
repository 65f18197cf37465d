//! SQL schema for the welove SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sources (
    source_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    link        TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL
);

-- Deleting a source takes its quotes with it.
CREATE TABLE IF NOT EXISTS quotes (
    quote_id    TEXT PRIMARY KEY,
    text        TEXT NOT NULL UNIQUE,
    source_id   TEXT REFERENCES sources(source_id) ON DELETE CASCADE,
    is_active   INTEGER NOT NULL DEFAULT 0,
    popularity  INTEGER NOT NULL DEFAULT 0 CHECK (popularity >= 0),
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    message_id   TEXT PRIMARY KEY,
    text         TEXT NOT NULL,
    is_displayed INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS profiles (
    user_id            TEXT PRIMARY KEY,
    username           TEXT NOT NULL UNIQUE,
    email              TEXT NOT NULL,
    first_name         TEXT,
    subscribed         INTEGER NOT NULL DEFAULT 0,
    favourite_quote_id TEXT REFERENCES quotes(quote_id) ON DELETE SET NULL,
    created_at         TEXT NOT NULL
);

-- At most one flagged row per collection.
CREATE UNIQUE INDEX IF NOT EXISTS quotes_single_active
    ON quotes(is_active) WHERE is_active = 1;
CREATE UNIQUE INDEX IF NOT EXISTS messages_single_displayed
    ON messages(is_displayed) WHERE is_displayed = 1;

CREATE INDEX IF NOT EXISTS quotes_source_idx      ON quotes(source_id);
CREATE INDEX IF NOT EXISTS profiles_subscribed_idx ON profiles(subscribed);

PRAGMA user_version = 1;
";
