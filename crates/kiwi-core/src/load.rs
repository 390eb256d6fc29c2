//! The three load passes and the natural-key maps they share.
//!
//! Passes must run in order: schools first, then partner workshops, then the
//! explicit school-workshop links. Each later pass resolves names against the
//! maps filled by the earlier ones.

use std::{collections::HashMap, fmt};

use crate::{
  catalog::Catalog,
  model::{
    HostingOrganisationId, NewPerson, PersonId, PersonKey, SchoolId, SchoolKey,
    WorkshopId,
  },
  record::{PartnerWorkshopRecord, SchoolRecord, SchoolWorkshopRecord},
};

// ─── Report ──────────────────────────────────────────────────────────────────

/// An unresolved reference in `school_workshops.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
  SchoolNotFound { school: String, school_type: String },
  WorkshopNotFound { workshop: String },
}

impl fmt::Display for LoadWarning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LoadWarning::SchoolNotFound { school, school_type } => {
        write!(f, "school not found: {} ({school_type})", Quoted(school))
      }
      LoadWarning::WorkshopNotFound { workshop } => {
        write!(f, "workshop not found: {}", Quoted(workshop))
      }
    }
  }
}

/// A name in single quotes, or double quotes when it contains an apostrophe
/// and no double quote. Backslashes, the chosen quote and control characters
/// are escaped.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let quote = if self.0.contains('\'') && !self.0.contains('"') {
      '"'
    } else {
      '\''
    };
    write!(f, "{quote}")?;
    for c in self.0.chars() {
      match c {
        '\\' => write!(f, "\\\\")?,
        '\n' => write!(f, "\\n")?,
        '\r' => write!(f, "\\r")?,
        '\t' => write!(f, "\\t")?,
        c if c == quote => write!(f, "\\{c}")?,
        c if c.is_control() && u32::from(c) <= 0xff => {
          write!(f, "\\x{:02x}", u32::from(c))?
        }
        c if c.is_control() => write!(f, "\\u{:04x}", u32::from(c))?,
        c => write!(f, "{c}")?,
      }
    }
    write!(f, "{quote}")
  }
}

/// What the passes skipped along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
  pub schools_skipped:           usize,
  pub partner_workshops_skipped: usize,
  pub school_workshops_skipped:  usize,
  /// Inline school links in `partner_workshops.csv` that did not resolve.
  pub inline_links_unresolved:   usize,
  /// One entry per unresolved row of `school_workshops.csv`, in file order.
  pub warnings:                  Vec<LoadWarning>,
}

// ─── Loader ──────────────────────────────────────────────────────────────────

/// Resolves natural keys to surrogate ids while writing to a [`Catalog`].
///
/// Schools and workshops are never deduplicated: every usable row inserts a
/// new row, and the map entry for its key is overwritten, so later passes
/// resolve to the last row loaded under that key. Persons and hosting
/// organisations are created once per key.
pub struct Loader<'c, C: Catalog> {
  catalog:   &'c mut C,
  schools:   HashMap<SchoolKey, SchoolId>,
  persons:   HashMap<PersonKey, PersonId>,
  hosts:     HashMap<String, HostingOrganisationId>,
  workshops: HashMap<String, WorkshopId>,
  report:    LoadReport,
}

impl<'c, C: Catalog> Loader<'c, C> {
  pub fn new(catalog: &'c mut C) -> Self {
    Self {
      catalog,
      schools: HashMap::new(),
      persons: HashMap::new(),
      hosts: HashMap::new(),
      workshops: HashMap::new(),
      report: LoadReport::default(),
    }
  }

  /// Pass 1: `schools.csv` into schools, persons and school contacts.
  pub fn load_schools<I>(&mut self, rows: I) -> Result<(), C::Error>
  where
    I: IntoIterator<Item = SchoolRecord>,
  {
    for row in rows {
      if row.school.is_empty() || row.school_type.is_empty() {
        tracing::debug!(?row, "skipping school row without name or type");
        self.report.schools_skipped += 1;
        continue;
      }

      let school_id = self.catalog.insert_school(&row.school, &row.school_type)?;
      self
        .schools
        .insert(SchoolKey::new(row.school, row.school_type), school_id);

      if row.names.is_empty() && row.emails.is_empty() {
        continue;
      }

      let person = NewPerson::from_cells(&row.names, &row.emails);
      let person_id = match self.persons.get(&person.key()) {
        Some(id) => *id,
        None => {
          let id = self.catalog.insert_person(&person)?;
          self.persons.insert(person.key(), id);
          id
        }
      };
      self.catalog.link_school_contact(school_id, person_id)?;
    }
    Ok(())
  }

  /// Pass 2: `partner_workshops.csv` into hosting organisations and
  /// workshops, plus inline school links where the file carries them.
  ///
  /// An inline link whose school does not resolve is dropped without a
  /// warning.
  pub fn load_partner_workshops<I>(&mut self, rows: I) -> Result<(), C::Error>
  where
    I: IntoIterator<Item = PartnerWorkshopRecord>,
  {
    for row in rows {
      if row.organisation.is_empty() || row.workshop.is_empty() {
        tracing::debug!(?row, "skipping workshop row without host or name");
        self.report.partner_workshops_skipped += 1;
        continue;
      }

      let host_id = match self.hosts.get(&row.organisation) {
        Some(id) => *id,
        None => {
          let id = self.catalog.insert_hosting_organisation(&row.organisation)?;
          self.hosts.insert(row.organisation.clone(), id);
          id
        }
      };

      let workshop_id = self.catalog.insert_workshop(&row.workshop, host_id)?;
      self.workshops.insert(row.workshop.clone(), workshop_id);

      let Some(school) = row.school else { continue };
      if school.school.is_empty() || school.school_type.is_empty() {
        continue;
      }
      match self.school_id(&school.school, &school.school_type) {
        Some(school_id) => {
          self.catalog.link_school_workshop(school_id, workshop_id)?;
        }
        None => {
          tracing::debug!(
            school = %school.school,
            school_type = %school.school_type,
            "inline school link did not resolve"
          );
          self.report.inline_links_unresolved += 1;
        }
      }
    }
    Ok(())
  }

  /// Pass 3: `school_workshops.csv` into school-workshop links.
  ///
  /// Every unresolved school or workshop is recorded as a [`LoadWarning`].
  pub fn load_school_workshops<I>(&mut self, rows: I) -> Result<(), C::Error>
  where
    I: IntoIterator<Item = SchoolWorkshopRecord>,
  {
    for row in rows {
      if row.school.is_empty()
        || row.school_type.is_empty()
        || row.workshop.is_empty()
      {
        tracing::debug!(?row, "skipping link row with blank field");
        self.report.school_workshops_skipped += 1;
        continue;
      }

      let Some(school_id) = self.school_id(&row.school, &row.school_type)
      else {
        self.report.warnings.push(LoadWarning::SchoolNotFound {
          school:      row.school,
          school_type: row.school_type,
        });
        continue;
      };
      let Some(workshop_id) = self.workshop_id(&row.workshop) else {
        self
          .report
          .warnings
          .push(LoadWarning::WorkshopNotFound { workshop: row.workshop });
        continue;
      };

      self.catalog.link_school_workshop(school_id, workshop_id)?;
    }
    Ok(())
  }

  /// The id most recently loaded for this school name and type.
  pub fn school_id(&self, name: &str, school_type: &str) -> Option<SchoolId> {
    self.schools.get(&SchoolKey::new(name, school_type)).copied()
  }

  /// The id most recently loaded for this workshop name.
  pub fn workshop_id(&self, name: &str) -> Option<WorkshopId> {
    self.workshops.get(name).copied()
  }

  /// Release the catalog and return what was skipped.
  pub fn finish(self) -> LoadReport { self.report }
}
