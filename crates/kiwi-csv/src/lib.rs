//! CSV readers for the kiwi input files.
//!
//! Each reader inspects the header row once, checks the required columns and
//! yields [`kiwi_core::record`] values with every cell trimmed. Blank cells
//! are passed through; the loader decides which rows to skip.

mod parse;

pub mod error;

use std::{fs::File, io::BufReader, path::Path};

use kiwi_core::record::{SchoolRecord, SchoolWorkshopRecord};

pub use error::{Error, Result};
pub use parse::{
  PartnerWorkshops, partner_workshops, school_workshops, schools,
};

fn open(path: &Path) -> Result<BufReader<File>> {
  File::open(path)
    .map(BufReader::new)
    .map_err(|source| Error::Io { path: path.to_path_buf(), source })
}

fn label(path: &Path) -> String { path.display().to_string() }

/// Read `schools.csv` from disk.
pub fn read_schools(path: impl AsRef<Path>) -> Result<Vec<SchoolRecord>> {
  let path = path.as_ref();
  schools(&label(path), open(path)?)
}

/// Read `partner_workshops.csv` from disk.
pub fn read_partner_workshops(
  path: impl AsRef<Path>,
) -> Result<PartnerWorkshops> {
  let path = path.as_ref();
  partner_workshops(&label(path), open(path)?)
}

/// Read `school_workshops.csv` from disk.
pub fn read_school_workshops(
  path: impl AsRef<Path>,
) -> Result<Vec<SchoolWorkshopRecord>> {
  let path = path.as_ref();
  school_workshops(&label(path), open(path)?)
}
