//! Input records as read from the three CSV files.
//!
//! Cells are already trimmed but may be empty; deciding whether a row is
//! usable is the loader's job.

/// One row of `schools.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchoolRecord {
  pub school:      String,
  pub school_type: String,
  /// `Name(s)`; empty when the column is absent.
  pub names:       String,
  /// `Email(s)`, comma-separated; empty when the column is absent.
  pub emails:      String,
}

/// Which column of `partner_workshops.csv` names the hosting organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerLayout {
  /// `Company,Workshop`
  Company,
  /// `Hosting_Organisation,Workshop[,School,School_Type]`
  HostingOrganisation,
}

impl PartnerLayout {
  pub fn organisation_column(self) -> &'static str {
    match self {
      PartnerLayout::Company => "Company",
      PartnerLayout::HostingOrganisation => "Hosting_Organisation",
    }
  }
}

/// School cells embedded in a partner-workshop row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineSchool {
  pub school:      String,
  pub school_type: String,
}

/// One row of `partner_workshops.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartnerWorkshopRecord {
  pub organisation: String,
  pub workshop:     String,
  /// Present only when the file has both `School` and `School_Type` columns.
  pub school:       Option<InlineSchool>,
}

/// One row of `school_workshops.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchoolWorkshopRecord {
  pub school:      String,
  pub school_type: String,
  pub workshop:    String,
}
