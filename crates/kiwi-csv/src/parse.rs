//! Header inspection and row decoding for the three input files.

use std::{collections::HashMap, io::Read};

use csv::{ReaderBuilder, StringRecord};
use kiwi_core::record::{
  InlineSchool, PartnerLayout, PartnerWorkshopRecord, SchoolRecord,
  SchoolWorkshopRecord,
};

use crate::{Error, Result};

// ─── Column names ────────────────────────────────────────────────────────────

pub const SCHOOL: &str = "School";
pub const SCHOOL_TYPE: &str = "School_Type";
pub const NAMES: &str = "Name(s)";
pub const EMAILS: &str = "Email(s)";
pub const WORKSHOP: &str = "Workshop";
pub const COMPANY: &str = "Company";
pub const HOSTING_ORGANISATION: &str = "Hosting_Organisation";

// ─── Header ──────────────────────────────────────────────────────────────────

/// Column positions by trimmed header name. A repeated name maps to its last
/// position.
struct Header {
  file:    String,
  columns: HashMap<String, usize>,
}

impl Header {
  fn from_record(file: &str, record: &StringRecord) -> Self {
    let columns = record
      .iter()
      .enumerate()
      .map(|(i, name)| (name.trim_start_matches('\u{feff}').trim().to_owned(), i))
      .collect();
    Self { file: file.to_owned(), columns }
  }

  fn get(&self, name: &str) -> Option<usize> { self.columns.get(name).copied() }

  fn has(&self, name: &str) -> bool { self.columns.contains_key(name) }

  fn require(&self, column: &'static str) -> Result<usize> {
    self.get(column).ok_or_else(|| Error::MissingColumn {
      file: self.file.clone(),
      column,
    })
  }
}

/// Trimmed cell at `index`; absent columns and short rows read as empty.
fn cell(record: &StringRecord, index: Option<usize>) -> String {
  index
    .and_then(|i| record.get(i))
    .unwrap_or_default()
    .trim()
    .to_owned()
}

/// Open a CSV reader and decode its header row.
fn reader<R: Read>(file: &str, input: R) -> Result<(csv::Reader<R>, Header)> {
  let mut rdr = ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_reader(input);
  let header = Header::from_record(file, rdr.headers()?);
  Ok((rdr, header))
}

// ─── schools.csv ─────────────────────────────────────────────────────────────

/// Decode `schools.csv`. `School` and `School_Type` are required columns;
/// `Name(s)` and `Email(s)` are optional.
pub fn schools<R: Read>(file: &str, input: R) -> Result<Vec<SchoolRecord>> {
  let (mut rdr, header) = reader(file, input)?;
  let school = header.require(SCHOOL)?;
  let school_type = header.require(SCHOOL_TYPE)?;
  let names = header.get(NAMES);
  let emails = header.get(EMAILS);

  let mut rows = Vec::new();
  for record in rdr.records() {
    let record = record?;
    rows.push(SchoolRecord {
      school:      cell(&record, Some(school)),
      school_type: cell(&record, Some(school_type)),
      names:       cell(&record, names),
      emails:      cell(&record, emails),
    });
  }
  Ok(rows)
}

// ─── partner_workshops.csv ───────────────────────────────────────────────────

/// Decoded `partner_workshops.csv` with the layout its header selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerWorkshops {
  pub layout:     PartnerLayout,
  /// Both `School` and `School_Type` columns are present.
  pub has_school: bool,
  pub records:    Vec<PartnerWorkshopRecord>,
}

/// Pick the organisation column from the header. `Company` wins when both
/// are present.
fn detect_layout(header: &Header) -> Result<PartnerLayout> {
  if header.has(COMPANY) {
    Ok(PartnerLayout::Company)
  } else if header.has(HOSTING_ORGANISATION) {
    Ok(PartnerLayout::HostingOrganisation)
  } else {
    Err(Error::UnknownPartnerLayout { file: header.file.clone() })
  }
}

/// Decode `partner_workshops.csv`, detecting its layout once from the
/// header.
pub fn partner_workshops<R: Read>(
  file: &str,
  input: R,
) -> Result<PartnerWorkshops> {
  let (mut rdr, header) = reader(file, input)?;
  let layout = detect_layout(&header)?;
  let organisation = header.require(layout.organisation_column())?;
  let workshop = header.require(WORKSHOP)?;
  let school_columns = header.get(SCHOOL).zip(header.get(SCHOOL_TYPE));

  tracing::debug!(
    file,
    ?layout,
    has_school = school_columns.is_some(),
    "detected partner workshop layout"
  );

  let mut records = Vec::new();
  for record in rdr.records() {
    let record = record?;
    records.push(PartnerWorkshopRecord {
      organisation: cell(&record, Some(organisation)),
      workshop:     cell(&record, Some(workshop)),
      school:       school_columns.map(|(school, school_type)| InlineSchool {
        school:      cell(&record, Some(school)),
        school_type: cell(&record, Some(school_type)),
      }),
    });
  }

  Ok(PartnerWorkshops {
    layout,
    has_school: school_columns.is_some(),
    records,
  })
}

// ─── school_workshops.csv ────────────────────────────────────────────────────

/// Decode `school_workshops.csv`; all three columns are required.
pub fn school_workshops<R: Read>(
  file: &str,
  input: R,
) -> Result<Vec<SchoolWorkshopRecord>> {
  let (mut rdr, header) = reader(file, input)?;
  let school = header.require(SCHOOL)?;
  let school_type = header.require(SCHOOL_TYPE)?;
  let workshop = header.require(WORKSHOP)?;

  rdr
    .records()
    .map(|record| {
      let record = record?;
      Ok(SchoolWorkshopRecord {
        school:      cell(&record, Some(school)),
        school_type: cell(&record, Some(school_type)),
        workshop:    cell(&record, Some(workshop)),
      })
    })
    .collect()
}
