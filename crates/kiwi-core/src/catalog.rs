//! The [`Catalog`] trait: the write side of a kiwi database.
//!
//! Implemented by storage backends (e.g. `kiwi-store-sqlite`). The
//! [`Loader`](crate::Loader) only ever talks to this trait, so the natural-key
//! logic can be exercised without a database.

use crate::model::{
  HostingOrganisationId, NewPerson, PersonId, SchoolId, WorkshopId,
};

/// Append-only access to the six kiwi tables.
///
/// Inserts of entities always create a new row and return its surrogate id.
/// Link inserts are insert-or-ignore and report whether a row was added.
pub trait Catalog {
  type Error: std::error::Error + Send + Sync + 'static;

  fn insert_school(
    &mut self,
    name: &str,
    school_type: &str,
  ) -> Result<SchoolId, Self::Error>;

  fn insert_person(&mut self, person: &NewPerson)
  -> Result<PersonId, Self::Error>;

  fn insert_hosting_organisation(
    &mut self,
    name: &str,
  ) -> Result<HostingOrganisationId, Self::Error>;

  fn insert_workshop(
    &mut self,
    name: &str,
    host: HostingOrganisationId,
  ) -> Result<WorkshopId, Self::Error>;

  fn link_school_contact(
    &mut self,
    school: SchoolId,
    person: PersonId,
  ) -> Result<bool, Self::Error>;

  fn link_school_workshop(
    &mut self,
    school: SchoolId,
    workshop: WorkshopId,
  ) -> Result<bool, Self::Error>;
}
