//! [`SqliteStore`] and its write transaction, [`LoadTransaction`].

use std::path::Path;

use kiwi_core::{
  Catalog,
  model::{
    HostedWorkshop, HostingOrganisation, HostingOrganisationId, NewPerson,
    Person, PersonId, School, SchoolId, TableCounts, Workshop, WorkshopId,
  },
};
use rusqlite::{Connection, Transaction, params};

use crate::{
  Result,
  schema::{DROP, PRAGMAS, SCHEMA, TABLES},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A kiwi database in a single SQLite file.
///
/// The store assumes it is the only writer for as long as it is open.
pub struct SqliteStore {
  conn: Connection,
}

impl SqliteStore {
  /// Open (or create) the database at `path`. The schema is left untouched;
  /// call [`reset_schema`](Self::reset_schema) before loading.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::with_connection(Connection::open(path)?)
  }

  /// Open an in-memory database — useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    Self::with_connection(Connection::open_in_memory()?)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    conn.execute_batch(PRAGMAS)?;
    Ok(Self { conn })
  }

  /// Drop every kiwi table and recreate the schema, atomically.
  ///
  /// Safe to run on an empty database and to repeat.
  pub fn reset_schema(&mut self) -> Result<()> {
    let tx = self.conn.transaction()?;
    tx.execute_batch(DROP)?;
    tx.execute_batch(SCHEMA)?;
    tx.commit()?;
    tracing::debug!(tables = TABLES.len(), "schema recreated");
    Ok(())
  }

  /// Start the transaction that all load passes write through.
  ///
  /// Dropping it without [`LoadTransaction::commit`] rolls everything back.
  pub fn begin_load(&mut self) -> Result<LoadTransaction<'_>> {
    Ok(LoadTransaction { tx: self.conn.transaction()? })
  }

  /// Row count of every table.
  pub fn counts(&self) -> Result<TableCounts> {
    let [
      schools,
      persons,
      hosting_organisations,
      workshops,
      school_contacts,
      school_workshops,
    ] = TABLES;
    Ok(TableCounts {
      schools:               self.count(schools)?,
      persons:               self.count(persons)?,
      hosting_organisations: self.count(hosting_organisations)?,
      workshops:             self.count(workshops)?,
      school_contacts:       self.count(school_contacts)?,
      school_workshops:      self.count(school_workshops)?,
    })
  }

  fn count(&self, table: &str) -> Result<u64> {
    let n: i64 = self.conn.query_row(
      &format!("SELECT COUNT(*) FROM {table}"),
      [],
      |r| r.get(0),
    )?;
    Ok(n as u64)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// All schools, ordered by type then name.
  pub fn schools(&self) -> Result<Vec<School>> {
    let mut stmt = self.conn.prepare(
      "SELECT id, name, school_type FROM schools ORDER BY school_type, name, id",
    )?;
    let rows = stmt
      .query_map([], |r| {
        Ok(School {
          id:          SchoolId(r.get(0)?),
          name:        r.get(1)?,
          school_type: r.get(2)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  /// All persons, ordered by name.
  pub fn persons(&self) -> Result<Vec<Person>> {
    let mut stmt = self.conn.prepare(
      "SELECT id, name, email_primary, email_secondary
       FROM persons ORDER BY name, id",
    )?;
    let rows = stmt
      .query_map([], |r| {
        Ok(Person {
          id:              PersonId(r.get(0)?),
          name:            r.get(1)?,
          email_primary:   r.get(2)?,
          email_secondary: r.get(3)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  /// All hosting organisations, ordered by name.
  pub fn hosting_organisations(&self) -> Result<Vec<HostingOrganisation>> {
    let mut stmt = self
      .conn
      .prepare("SELECT id, name FROM hosting_organisations ORDER BY name")?;
    let rows = stmt
      .query_map([], |r| {
        Ok(HostingOrganisation {
          id:   HostingOrganisationId(r.get(0)?),
          name: r.get(1)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  /// Workshops joined with their host's name, ordered by host then
  /// workshop name.
  pub fn hosted_workshops(&self) -> Result<Vec<HostedWorkshop>> {
    let mut stmt = self.conn.prepare(
      "SELECT w.id, w.name, w.hosting_organisation_id, h.name
       FROM workshops w
       JOIN hosting_organisations h ON w.hosting_organisation_id = h.id
       ORDER BY h.name, w.name, w.id",
    )?;
    let rows = stmt
      .query_map([], |r| {
        Ok(HostedWorkshop {
          workshop:  Workshop {
            id:                      WorkshopId(r.get(0)?),
            name:                    r.get(1)?,
            hosting_organisation_id: HostingOrganisationId(r.get(2)?),
          },
          host_name: r.get(3)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  pub fn school_contacts(&self) -> Result<Vec<(SchoolId, PersonId)>> {
    let mut stmt = self.conn.prepare(
      "SELECT school_id, person_id FROM school_contact
       ORDER BY school_id, person_id",
    )?;
    let rows = stmt
      .query_map([], |r| Ok((SchoolId(r.get(0)?), PersonId(r.get(1)?))))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  pub fn school_workshops(&self) -> Result<Vec<(SchoolId, WorkshopId)>> {
    let mut stmt = self.conn.prepare(
      "SELECT school_id, workshop_id FROM school_workshop
       ORDER BY school_id, workshop_id",
    )?;
    let rows = stmt
      .query_map([], |r| Ok((SchoolId(r.get(0)?), WorkshopId(r.get(1)?))))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  /// Close the connection, surfacing any error from flushing it.
  pub fn close(self) -> Result<()> {
    self.conn.close().map_err(|(_, e)| e)?;
    Ok(())
  }
}

// ─── Load transaction ────────────────────────────────────────────────────────

/// The single write transaction covering all load passes.
pub struct LoadTransaction<'c> {
  tx: Transaction<'c>,
}

impl LoadTransaction<'_> {
  pub fn commit(self) -> Result<()> {
    self.tx.commit()?;
    Ok(())
  }
}

impl Catalog for LoadTransaction<'_> {
  type Error = crate::Error;

  fn insert_school(&mut self, name: &str, school_type: &str) -> Result<SchoolId> {
    self
      .tx
      .prepare_cached("INSERT INTO schools (name, school_type) VALUES (?1, ?2)")?
      .execute(params![name, school_type])?;
    Ok(SchoolId(self.tx.last_insert_rowid()))
  }

  fn insert_person(&mut self, person: &NewPerson) -> Result<PersonId> {
    self
      .tx
      .prepare_cached(
        "INSERT INTO persons (name, email_primary, email_secondary)
         VALUES (?1, ?2, ?3)",
      )?
      .execute(params![
        person.name,
        person.email_primary,
        person.email_secondary,
      ])?;
    Ok(PersonId(self.tx.last_insert_rowid()))
  }

  fn insert_hosting_organisation(
    &mut self,
    name: &str,
  ) -> Result<HostingOrganisationId> {
    self
      .tx
      .prepare_cached("INSERT INTO hosting_organisations (name) VALUES (?1)")?
      .execute(params![name])?;
    Ok(HostingOrganisationId(self.tx.last_insert_rowid()))
  }

  fn insert_workshop(
    &mut self,
    name: &str,
    host: HostingOrganisationId,
  ) -> Result<WorkshopId> {
    self
      .tx
      .prepare_cached(
        "INSERT INTO workshops (name, hosting_organisation_id) VALUES (?1, ?2)",
      )?
      .execute(params![name, host.0])?;
    Ok(WorkshopId(self.tx.last_insert_rowid()))
  }

  fn link_school_contact(
    &mut self,
    school: SchoolId,
    person: PersonId,
  ) -> Result<bool> {
    let added = self
      .tx
      .prepare_cached(
        "INSERT OR IGNORE INTO school_contact (school_id, person_id)
         VALUES (?1, ?2)",
      )?
      .execute(params![school.0, person.0])?;
    Ok(added > 0)
  }

  fn link_school_workshop(
    &mut self,
    school: SchoolId,
    workshop: WorkshopId,
  ) -> Result<bool> {
    let added = self
      .tx
      .prepare_cached(
        "INSERT OR IGNORE INTO school_workshop (school_id, workshop_id)
         VALUES (?1, ?2)",
      )?
      .execute(params![school.0, workshop.0])?;
    Ok(added > 0)
  }
}
