//! SQL schema for the sip SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Minimal catalog: only what the engine needs to check existence.
CREATE TABLE IF NOT EXISTS items (
    item_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- One row per (user, item). rowid doubles as insertion order.
CREATE TABLE IF NOT EXISTS personal_ratings (
    user_id     TEXT NOT NULL,
    item_id     TEXT NOT NULL REFERENCES items(item_id),
    tier        TEXT NOT NULL,
    rating      REAL NOT NULL,
    comparisons INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    PRIMARY KEY (user_id, item_id),
    CHECK (tier IN ('loved', 'liked', 'disliked')),
    CHECK (rating BETWEEN 1.0 AND 10.0),
    CHECK (comparisons >= 0)
);

-- Preferences are strictly append-only.
CREATE TABLE IF NOT EXISTS preferences (
    preference_id     TEXT PRIMARY KEY,
    user_id           TEXT NOT NULL,
    preferred_item_id TEXT NOT NULL REFERENCES items(item_id),
    rejected_item_id  TEXT NOT NULL REFERENCES items(item_id),
    tier              TEXT NOT NULL,
    recorded_at       TEXT NOT NULL,
    CHECK (preferred_item_id != rejected_item_id),
    CHECK (tier IN ('loved', 'liked', 'disliked'))
);

CREATE TRIGGER IF NOT EXISTS preferences_no_update
BEFORE UPDATE ON preferences
BEGIN
    SELECT RAISE(ABORT, 'preferences are append-only');
END;

CREATE TRIGGER IF NOT EXISTS preferences_no_delete
BEFORE DELETE ON preferences
BEGIN
    SELECT RAISE(ABORT, 'preferences are append-only');
END;

-- Derived view; always overwritten by a full reduction over personal_ratings.
CREATE TABLE IF NOT EXISTS public_scores (
    item_id        TEXT PRIMARY KEY REFERENCES items(item_id),
    average_rating REAL NOT NULL,
    total_ratings  INTEGER NOT NULL,
    refreshed_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS ratings_user_tier_idx ON personal_ratings(user_id, tier);
CREATE INDEX IF NOT EXISTS ratings_item_idx      ON personal_ratings(item_id);
CREATE INDEX IF NOT EXISTS preferences_user_idx  ON preferences(user_id);

PRAGMA user_version = 1;
";
