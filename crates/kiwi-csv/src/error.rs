//! Error types for the kiwi-csv readers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot read {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("{file}: missing required column {column:?}")]
  MissingColumn { file: String, column: &'static str },

  /// Neither `Company` nor `Hosting_Organisation` is present.
  #[error("{file}: no Company or Hosting_Organisation column")]
  UnknownPartnerLayout { file: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
