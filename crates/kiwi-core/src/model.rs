//! Entities, surrogate ids and natural keys.

use std::fmt;

/// Name given to a contact person whose row carries an email but no name.
pub const UNKNOWN_PERSON_NAME: &str = "(Unbekannt)";

// ─── Surrogate ids ───────────────────────────────────────────────────────────

macro_rules! surrogate_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }
  };
}

surrogate_id!(
  /// Row id in `schools`.
  SchoolId
);
surrogate_id!(
  /// Row id in `persons`.
  PersonId
);
surrogate_id!(
  /// Row id in `hosting_organisations`.
  HostingOrganisationId
);
surrogate_id!(
  /// Row id in `workshops`.
  WorkshopId
);

// ─── Natural keys ────────────────────────────────────────────────────────────

/// A school is identified by its name together with its free-text type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchoolKey {
  pub name:        String,
  pub school_type: String,
}

impl SchoolKey {
  pub fn new(name: impl Into<String>, school_type: impl Into<String>) -> Self {
    Self { name: name.into(), school_type: school_type.into() }
  }
}

/// A person is identified by name and primary email; a missing primary email
/// keys as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonKey {
  pub name:          String,
  pub email_primary: String,
}

// ─── Entities ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct School {
  pub id:          SchoolId,
  pub name:        String,
  pub school_type: String,
}

/// A contact person before it has been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
  pub name:            String,
  pub email_primary:   Option<String>,
  pub email_secondary: Option<String>,
}

impl NewPerson {
  /// Build a contact from the raw `Name(s)` and `Email(s)` cells.
  ///
  /// A blank name falls back to [`UNKNOWN_PERSON_NAME`].
  pub fn from_cells(names: &str, emails: &str) -> Self {
    let names = names.trim();
    let (email_primary, email_secondary) = parse_emails(emails);
    Self {
      name: if names.is_empty() {
        UNKNOWN_PERSON_NAME.to_owned()
      } else {
        names.to_owned()
      },
      email_primary,
      email_secondary,
    }
  }

  pub fn key(&self) -> PersonKey {
    PersonKey {
      name:          self.name.clone(),
      email_primary: self.email_primary.clone().unwrap_or_default(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
  pub id:              PersonId,
  pub name:            String,
  pub email_primary:   Option<String>,
  pub email_secondary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostingOrganisation {
  pub id:   HostingOrganisationId,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workshop {
  pub id:                      WorkshopId,
  pub name:                    String,
  pub hosting_organisation_id: HostingOrganisationId,
}

/// A workshop joined with the name of the organisation hosting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedWorkshop {
  pub workshop:  Workshop,
  pub host_name: String,
}

// ─── Counts ──────────────────────────────────────────────────────────────────

/// Row count of every table, in schema order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
  pub schools:               u64,
  pub persons:               u64,
  pub hosting_organisations: u64,
  pub workshops:             u64,
  pub school_contacts:       u64,
  pub school_workshops:      u64,
}

impl fmt::Display for TableCounts {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "schools: {}, persons: {}, hosting_organisations: {}, workshops: {}",
      self.schools, self.persons, self.hosting_organisations, self.workshops
    )?;
    write!(
      f,
      "school_contact: {}, school_workshop: {}",
      self.school_contacts, self.school_workshops
    )
  }
}

// ─── Emails ──────────────────────────────────────────────────────────────────

/// Split `"a@x.at, b@y.at"` into `(primary, secondary)`.
///
/// Parts are trimmed and empty parts dropped. Anything past the second
/// address is ignored.
pub fn parse_emails(emails: &str) -> (Option<String>, Option<String>) {
  let mut parts = emails
    .split(',')
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .map(str::to_owned);
  let primary = parts.next();
  let secondary = parts.next();
  (primary, secondary)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn emails_split_into_primary_and_secondary() {
    let (p, s) = parse_emails("anna@x.at, a.berger@y.at");
    assert_eq!(p.as_deref(), Some("anna@x.at"));
    assert_eq!(s.as_deref(), Some("a.berger@y.at"));
  }

  #[test]
  fn emails_ignore_empty_parts_and_extras() {
    let (p, s) = parse_emails(" , one@x.at,,two@x.at, three@x.at ");
    assert_eq!(p.as_deref(), Some("one@x.at"));
    assert_eq!(s.as_deref(), Some("two@x.at"));
  }

  #[test]
  fn blank_emails_yield_nothing() {
    assert_eq!(parse_emails("   "), (None, None));
  }

  #[test]
  fn person_without_name_gets_placeholder() {
    let p = NewPerson::from_cells("  ", "x@y.at");
    assert_eq!(p.name, UNKNOWN_PERSON_NAME);
    assert_eq!(p.key().email_primary, "x@y.at");
  }

  #[test]
  fn person_without_email_keys_on_empty_string() {
    let p = NewPerson::from_cells("Anna Berger", "");
    assert_eq!(p.email_primary, None);
    assert_eq!(p.key(), PersonKey {
      name:          "Anna Berger".into(),
      email_primary: String::new(),
    });
  }

  #[test]
  fn counts_render_as_two_lines() {
    let counts = TableCounts {
      schools:               1,
      persons:               2,
      hosting_organisations: 3,
      workshops:             4,
      school_contacts:       5,
      school_workshops:      6,
    };
    assert_eq!(
      counts.to_string(),
      "schools: 1, persons: 2, hosting_organisations: 3, workshops: 4\n\
       school_contact: 5, school_workshop: 6"
    );
  }
}
