//! Full-refresh rebuild of the kiwi database from its three CSV exports.
//!
//! [`run`] reads the inputs, recreates the schema, loads schools, partner
//! workshops and school-workshop links in one transaction, reports row
//! counts, and publishes a copy of the database for the web app.

use std::{
  collections::HashMap,
  fs,
  io::Write,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use kiwi_core::{
  LoadReport, Loader,
  model::{SchoolId, TableCounts},
};
use kiwi_store_sqlite::SqliteStore;
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `kiwi.toml` and `KIWI_*`
/// environment variables. Every key is optional.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
  pub input_dir:              PathBuf,
  pub schools_file:           PathBuf,
  pub partner_workshops_file: PathBuf,
  pub school_workshops_file:  PathBuf,
  pub db_path:                PathBuf,
  pub public_db_path:         PathBuf,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      input_dir:              "files".into(),
      schools_file:           "schools.csv".into(),
      partner_workshops_file: "partner_workshops.csv".into(),
      school_workshops_file:  "school_workshops.csv".into(),
      db_path:                "kiwi.db".into(),
      public_db_path:         "public/kiwi.db".into(),
    }
  }
}

impl Settings {
  /// Layer defaults, the config file and the environment.
  ///
  /// Without an explicit `config_file`, `<root>/kiwi.toml` is read if it
  /// exists.
  pub fn load(root: &Path, config_file: Option<&Path>) -> anyhow::Result<Self> {
    let file = match config_file {
      Some(path) => config::File::from(path).required(true),
      None => config::File::from(root.join("kiwi.toml")).required(false),
    };
    config::Config::builder()
      .add_source(file)
      .add_source(config::Environment::with_prefix("KIWI"))
      .build()
      .context("failed to read config")?
      .try_deserialize()
      .context("failed to deserialise Settings")
  }

  /// Resolve every path against `root`; input files live under `input_dir`.
  pub fn resolve(&self, root: &Path) -> Paths {
    let input_dir = root.join(&self.input_dir);
    Paths {
      schools:           input_dir.join(&self.schools_file),
      partner_workshops: input_dir.join(&self.partner_workshops_file),
      school_workshops:  input_dir.join(&self.school_workshops_file),
      db:                root.join(&self.db_path),
      public_db:         root.join(&self.public_db_path),
    }
  }
}

/// Concrete file locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
  pub schools:           PathBuf,
  pub partner_workshops: PathBuf,
  pub school_workshops:  PathBuf,
  pub db:                PathBuf,
  pub public_db:         PathBuf,
}

// ─── Rebuild ──────────────────────────────────────────────────────────────────

/// Result of a successful rebuild.
#[derive(Debug, Clone)]
pub struct Rebuild {
  pub counts: TableCounts,
  pub report: LoadReport,
}

/// Recreate the database at `paths.db` from the three CSV files.
///
/// All inputs are read and checked before the database is touched. The
/// schema reset and the load are two separate transactions.
pub fn rebuild(paths: &Paths) -> anyhow::Result<Rebuild> {
  let schools = kiwi_csv::read_schools(&paths.schools)
    .context("failed to read schools")?;
  let partners = kiwi_csv::read_partner_workshops(&paths.partner_workshops)
    .context("failed to read partner workshops")?;
  let links = kiwi_csv::read_school_workshops(&paths.school_workshops)
    .context("failed to read school workshops")?;

  let mut store = SqliteStore::open(&paths.db)
    .with_context(|| format!("failed to open database at {:?}", paths.db))?;

  tracing::info!(db = %paths.db.display(), "resetting schema");
  store.reset_schema().context("failed to reset schema")?;

  let mut tx = store.begin_load().context("failed to begin load")?;
  let mut loader = Loader::new(&mut tx);

  tracing::info!(rows = schools.len(), "loading schools");
  loader.load_schools(schools).context("failed to load schools")?;

  tracing::info!(
    rows = partners.records.len(),
    layout = ?partners.layout,
    has_school = partners.has_school,
    "loading partner workshops"
  );
  loader
    .load_partner_workshops(partners.records)
    .context("failed to load partner workshops")?;

  tracing::info!(rows = links.len(), "loading school workshops");
  loader
    .load_school_workshops(links)
    .context("failed to load school workshops")?;

  let report = loader.finish();
  tx.commit().context("failed to commit load")?;
  tracing::info!(
    schools_skipped = report.schools_skipped,
    partner_workshops_skipped = report.partner_workshops_skipped,
    school_workshops_skipped = report.school_workshops_skipped,
    inline_links_unresolved = report.inline_links_unresolved,
    unresolved_links = report.warnings.len(),
    "load committed"
  );

  let counts = store.counts().context("failed to count rows")?;
  store.close().context("failed to close database")?;

  Ok(Rebuild { counts, report })
}

/// Copy the finished database to its public location, replacing any
/// previous copy.
pub fn publish(db: &Path, public_db: &Path) -> anyhow::Result<()> {
  if let Some(dir) = public_db.parent()
    && !dir.as_os_str().is_empty()
  {
    fs::create_dir_all(dir)
      .with_context(|| format!("failed to create {dir:?}"))?;
  }
  fs::copy(db, public_db)
    .with_context(|| format!("failed to copy {db:?} to {public_db:?}"))?;
  tracing::info!(from = %db.display(), to = %public_db.display(), "published");
  Ok(())
}

/// Rebuild, print the report to `out`, then publish.
pub fn run(paths: &Paths, out: &mut impl Write) -> anyhow::Result<Rebuild> {
  let rebuild = rebuild(paths)?;
  for warning in &rebuild.report.warnings {
    writeln!(out, "Warning: {warning}")?;
  }
  writeln!(out, "{}", rebuild.counts)?;

  publish(&paths.db, &paths.public_db)?;
  writeln!(
    out,
    "Copied {} -> {}",
    paths.db.display(),
    paths.public_db.display()
  )?;
  Ok(rebuild)
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// Print row counts, the schools of each type with their number of contacts,
/// and the workshops of each hosting organisation for an existing database.
pub fn stats(db: &Path, out: &mut impl Write) -> anyhow::Result<TableCounts> {
  if !db.exists() {
    anyhow::bail!("no database at {db:?}");
  }
  let store = SqliteStore::open(db)
    .with_context(|| format!("failed to open database at {db:?}"))?;
  let counts = store.counts().context("failed to count rows")?;
  writeln!(out, "{counts}")?;

  let mut contacts: HashMap<SchoolId, usize> = HashMap::new();
  for (school, _) in store.school_contacts().context("failed to list contacts")? {
    *contacts.entry(school).or_default() += 1;
  }

  writeln!(out, "schools by type:")?;
  let schools = store.schools().context("failed to list schools")?;
  let mut current_type: Option<&str> = None;
  for school in &schools {
    if current_type != Some(school.school_type.as_str()) {
      writeln!(out, "  {}", school.school_type)?;
      current_type = Some(&school.school_type);
    }
    let n = contacts.get(&school.id).copied().unwrap_or(0);
    let noun = if n == 1 { "contact" } else { "contacts" };
    writeln!(out, "    {}, {n} {noun}", school.name)?;
  }

  writeln!(out, "workshops by organisation:")?;
  let workshops = store
    .hosted_workshops()
    .context("failed to list workshops")?;
  let hosts = store
    .hosting_organisations()
    .context("failed to list hosting organisations")?;
  for host in &hosts {
    writeln!(out, "  {}", host.name)?;
    for hosted in workshops
      .iter()
      .filter(|w| w.workshop.hosting_organisation_id == host.id)
    {
      writeln!(out, "    {}", hosted.workshop.name)?;
    }
  }
  Ok(counts)
}

#[cfg(test)]
mod tests;
