//! SQL schema for the egonet SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS doctors (
    email         TEXT PRIMARY KEY,
    display_name  TEXT NOT NULL,
    password_hash TEXT NOT NULL,   -- argon2 PHC string, never plaintext
    created_at    TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS survey_templates (
    token       TEXT PRIMARY KEY,  -- author-chosen business key
    title       TEXT NOT NULL,
    instruction TEXT NOT NULL,
    age         TEXT NOT NULL,
    sex         TEXT NOT NULL,
    job         TEXT NOT NULL,
    dial        TEXT NOT NULL,
    circle      TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS template_authors (
    token        TEXT NOT NULL REFERENCES survey_templates(token),
    doctor_email TEXT NOT NULL REFERENCES doctors(email),
    UNIQUE (token, doctor_email)
);

CREATE TABLE IF NOT EXISTS patients (
    email      TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS template_patients (
    token         TEXT NOT NULL REFERENCES survey_templates(token),
    patient_email TEXT NOT NULL REFERENCES patients(email),
    UNIQUE (token, patient_email)
);

-- One row per participant attempt at one template. The UNIQUE pair is the
-- duplicate-submission guard: concurrent submissions race to this insert
-- and the loser surfaces as a constraint violation.
CREATE TABLE IF NOT EXISTS completions (
    completion_id INTEGER PRIMARY KEY,
    patient_email TEXT NOT NULL REFERENCES patients(email),
    token         TEXT NOT NULL REFERENCES survey_templates(token),
    recorded_at   TEXT NOT NULL,
    UNIQUE (patient_email, token)
);

-- Graph entities exist only through their membership relation to one
-- completion; entity and membership are inserted in the same transaction.
CREATE TABLE IF NOT EXISTS groups (
    group_id INTEGER PRIMARY KEY,
    name     TEXT NOT NULL,
    color    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS group_memberships (
    completion_id INTEGER NOT NULL REFERENCES completions(completion_id),
    group_id      INTEGER NOT NULL REFERENCES groups(group_id),
    UNIQUE (group_id)
);

CREATE TABLE IF NOT EXISTS nodes (
    node_id    INTEGER PRIMARY KEY,
    name       TEXT    NOT NULL,
    age        INTEGER NOT NULL,
    sex        INTEGER NOT NULL,
    job        TEXT    NOT NULL,
    dial       INTEGER NOT NULL,
    circle     INTEGER NOT NULL,
    position_x INTEGER NOT NULL,
    position_y INTEGER NOT NULL,
    local_id   INTEGER NOT NULL,   -- client-local id; never a join key
    group_name TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS node_memberships (
    completion_id INTEGER NOT NULL REFERENCES completions(completion_id),
    node_id       INTEGER NOT NULL REFERENCES nodes(node_id),
    UNIQUE (node_id)
);

CREATE TABLE IF NOT EXISTS links (
    link_id INTEGER PRIMARY KEY
);

-- Exactly two rows per link.
CREATE TABLE IF NOT EXISTS link_endpoints (
    link_id INTEGER NOT NULL REFERENCES links(link_id),
    node_id INTEGER NOT NULL REFERENCES nodes(node_id)
);

CREATE INDEX IF NOT EXISTS template_authors_email_idx
    ON template_authors(doctor_email);
CREATE INDEX IF NOT EXISTS group_memberships_completion_idx
    ON group_memberships(completion_id);
CREATE INDEX IF NOT EXISTS node_memberships_completion_idx
    ON node_memberships(completion_id);
CREATE INDEX IF NOT EXISTS link_endpoints_link_idx
    ON link_endpoints(link_id);

PRAGMA user_version = 1;
";
