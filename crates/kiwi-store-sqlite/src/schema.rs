//! SQL schema for the kiwi database.
//!
//! The database is rebuilt from scratch on every run: [`DROP`] removes the
//! tables children first, then [`SCHEMA`] recreates them.

/// Table names in creation order (parents before children).
pub const TABLES: [&str; 6] = [
  "schools",
  "persons",
  "hosting_organisations",
  "workshops",
  "school_contact",
  "school_workshop",
];

/// Connection-level settings; must run outside any transaction.
pub const PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

pub const DROP: &str = "
DROP TABLE IF EXISTS school_workshop;
DROP TABLE IF EXISTS school_contact;
DROP TABLE IF EXISTS workshops;
DROP TABLE IF EXISTS hosting_organisations;
DROP TABLE IF EXISTS persons;
DROP TABLE IF EXISTS schools;
";

pub const SCHEMA: &str = "
CREATE TABLE schools (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    school_type TEXT NOT NULL     -- free text, not an enum
);

CREATE TABLE persons (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    email_primary   TEXT,
    email_secondary TEXT
);

CREATE TABLE hosting_organisations (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

-- Not unique by name: every partner-workshop row is its own workshop.
CREATE TABLE workshops (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    name                    TEXT NOT NULL,
    hosting_organisation_id INTEGER NOT NULL REFERENCES hosting_organisations(id)
);

CREATE TABLE school_contact (
    school_id INTEGER NOT NULL REFERENCES schools(id),
    person_id INTEGER NOT NULL REFERENCES persons(id),
    PRIMARY KEY (school_id, person_id)
);

CREATE TABLE school_workshop (
    school_id   INTEGER NOT NULL REFERENCES schools(id),
    workshop_id INTEGER NOT NULL REFERENCES workshops(id),
    PRIMARY KEY (school_id, workshop_id)
);

CREATE INDEX idx_schools_type             ON schools(school_type);
CREATE INDEX idx_workshops_host           ON workshops(hosting_organisation_id);
CREATE INDEX idx_school_workshop_school   ON school_workshop(school_id);
CREATE INDEX idx_school_workshop_workshop ON school_workshop(workshop_id);
";
