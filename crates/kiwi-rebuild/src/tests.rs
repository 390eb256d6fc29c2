//! End-to-end runs against real files in a temporary directory.

use std::{fs, path::Path};

use kiwi_store_sqlite::SqliteStore;
use tempfile::TempDir;

use crate::{Paths, Settings, run, stats};

struct Fixture {
  _dir:  TempDir,
  paths: Paths,
}

impl Fixture {
  fn new(schools: &str, partners: &str, links: &str) -> Self {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = Settings::default().resolve(dir.path());
    fs::create_dir_all(dir.path().join("files")).unwrap();
    fs::write(&paths.schools, schools).unwrap();
    fs::write(&paths.partner_workshops, partners).unwrap();
    fs::write(&paths.school_workshops, links).unwrap();
    Self { _dir: dir, paths }
  }

  fn run(&self) -> (crate::Rebuild, String) {
    let mut out = Vec::new();
    let rebuild = run(&self.paths, &mut out).expect("run");
    (rebuild, String::from_utf8(out).unwrap())
  }

  fn store(&self) -> SqliteStore { SqliteStore::open(&self.paths.public_db).unwrap() }
}

const SCHOOLS: &str = "\u{feff}School,School_Type,Name(s),Email(s)\n\
                       Lindenschule,Gymnasium,Anna Berger,\"anna@x.at, a.berger@y.at\"\n";
const PARTNERS: &str = "Company,Workshop\nRoboCorp,Robotik-Workshop\n";
const LINKS: &str = "School,School_Type,Workshop\n\
                     Lindenschule,Gymnasium,Robotik-Workshop\n";

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn single_school_scenario() {
  let fx = Fixture::new(SCHOOLS, PARTNERS, LINKS);
  let (_, out) = fx.run();

  assert_eq!(
    out,
    format!(
      "schools: 1, persons: 1, hosting_organisations: 1, workshops: 1\n\
       school_contact: 1, school_workshop: 1\n\
       Copied {} -> {}\n",
      fx.paths.db.display(),
      fx.paths.public_db.display(),
    )
  );

  let store = fx.store();
  let persons = store.persons().unwrap();
  assert_eq!(persons[0].email_primary.as_deref(), Some("anna@x.at"));
  assert_eq!(persons[0].email_secondary.as_deref(), Some("a.berger@y.at"));
  assert_eq!(store.hosting_organisations().unwrap()[0].name, "RoboCorp");
  assert_eq!(store.hosted_workshops().unwrap()[0].workshop.name, "Robotik-Workshop");
}

#[test]
fn published_copy_matches_database() {
  let fx = Fixture::new(SCHOOLS, PARTNERS, LINKS);
  fx.run();
  assert_eq!(
    fs::read(&fx.paths.db).unwrap(),
    fs::read(&fx.paths.public_db).unwrap()
  );
}

#[test]
fn blank_school_type_skips_the_whole_row() {
  let schools = "School,School_Type,Name(s),Email(s)\n\
                 Lindenschule,,Anna Berger,anna@x.at\n\
                 Bergschule,Volksschule,,\n";
  let fx = Fixture::new(schools, PARTNERS, "School,School_Type,Workshop\n");
  let (rebuild, _) = fx.run();

  assert_eq!(rebuild.counts.schools, 1);
  assert_eq!(rebuild.counts.persons, 0);
  assert_eq!(rebuild.counts.school_contacts, 0);
  assert_eq!(rebuild.report.schools_skipped, 1);
}

#[test]
fn unresolved_links_warn_and_still_publish() {
  let links = "School,School_Type,Workshop\n\
               Lindenschule,Volksschule,Robotik-Workshop\n\
               Lindenschule,Gymnasium,Töpfern\n";
  let fx = Fixture::new(SCHOOLS, PARTNERS, links);
  let (rebuild, out) = fx.run();

  let mut lines = out.lines();
  assert_eq!(
    lines.next(),
    Some("Warning: school not found: 'Lindenschule' (Volksschule)")
  );
  assert_eq!(lines.next(), Some("Warning: workshop not found: 'Töpfern'"));
  assert_eq!(rebuild.counts.school_workshops, 0);
  assert!(fx.paths.public_db.exists());
}

#[test]
fn rerun_produces_the_same_counts() {
  let fx = Fixture::new(SCHOOLS, PARTNERS, LINKS);
  let (first, first_out) = fx.run();
  let (second, second_out) = fx.run();
  assert_eq!(first.counts, second.counts);
  assert_eq!(first_out, second_out);
}

#[test]
fn hosting_organisation_layout_links_inline_schools() {
  let partners = "School,School_Type,Workshop,Hosting_Organisation\n\
                  Lindenschule,Gymnasium,Robotik-Workshop,RoboCorp\n\
                  Unbekannt,Gymnasium,Lego,RoboCorp\n\
                  ,,Scratch,CodeLab\n";
  let fx = Fixture::new(SCHOOLS, partners, "School,School_Type,Workshop\n");
  let (rebuild, out) = fx.run();

  assert!(!out.contains("Warning"));
  assert_eq!(rebuild.counts.hosting_organisations, 2);
  assert_eq!(rebuild.counts.workshops, 3);
  assert_eq!(rebuild.counts.school_workshops, 1);
  assert_eq!(rebuild.report.inline_links_unresolved, 1);
}

#[test]
fn repeated_workshop_name_links_to_last_host() {
  let partners = "Company,Workshop\nRoboCorp,Robotik\nCodeLab,Robotik\n";
  let links = "School,School_Type,Workshop\nLindenschule,Gymnasium,Robotik\n";
  let fx = Fixture::new(SCHOOLS, partners, links);
  fx.run();

  let store = fx.store();
  let linked = store.school_workshops().unwrap();
  assert_eq!(linked.len(), 1);
  let workshops = store.hosted_workshops().unwrap();
  let target = workshops
    .iter()
    .find(|w| w.workshop.id == linked[0].1)
    .unwrap();
  assert_eq!(target.host_name, "CodeLab");
}

// ─── Failures ────────────────────────────────────────────────────────────────

#[test]
fn missing_input_fails_before_touching_the_database() {
  let fx = Fixture::new(SCHOOLS, PARTNERS, LINKS);
  fx.run();
  let before = fs::read(&fx.paths.db).unwrap();

  fs::remove_file(&fx.paths.school_workshops).unwrap();
  let mut out = Vec::new();
  let err = run(&fx.paths, &mut out).unwrap_err();
  assert!(format!("{err:#}").contains("school workshops"));
  assert_eq!(fs::read(&fx.paths.db).unwrap(), before);
}

#[test]
fn missing_required_column_is_fatal() {
  let fx = Fixture::new("School,Name(s)\nA,Anna\n", PARTNERS, LINKS);
  let mut out = Vec::new();
  let err = run(&fx.paths, &mut out).unwrap_err();
  assert!(format!("{err:#}").contains("School_Type"));
  assert!(!fx.paths.public_db.exists());
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[test]
fn default_settings_use_fixed_relative_paths() {
  let paths = Settings::default().resolve(Path::new("/srv/kiwi"));
  assert_eq!(paths.schools, Path::new("/srv/kiwi/files/schools.csv"));
  assert_eq!(
    paths.partner_workshops,
    Path::new("/srv/kiwi/files/partner_workshops.csv")
  );
  assert_eq!(
    paths.school_workshops,
    Path::new("/srv/kiwi/files/school_workshops.csv")
  );
  assert_eq!(paths.db, Path::new("/srv/kiwi/kiwi.db"));
  assert_eq!(paths.public_db, Path::new("/srv/kiwi/public/kiwi.db"));
}

#[test]
fn config_file_overrides_defaults() {
  let dir = tempfile::tempdir().unwrap();
  fs::write(
    dir.path().join("kiwi.toml"),
    "input_dir = \"exports\"\npublic_db_path = \"web/data/kiwi.db\"\n",
  )
  .unwrap();

  let settings = Settings::load(dir.path(), None).unwrap();
  assert_eq!(settings.input_dir, Path::new("exports"));
  assert_eq!(settings.public_db_path, Path::new("web/data/kiwi.db"));
  assert_eq!(settings.schools_file, Path::new("schools.csv"));
}

#[test]
fn environment_overrides_config_file() {
  let dir = tempfile::tempdir().unwrap();
  fs::write(dir.path().join("kiwi.toml"), "db_path = \"from-file.db\"\n")
    .unwrap();

  let from_file = Settings::load(dir.path(), None).unwrap();
  // SAFETY: no other test reads or writes KIWI_DB_PATH.
  unsafe { std::env::set_var("KIWI_DB_PATH", "from-env.db") };
  let from_env = Settings::load(dir.path(), None);
  unsafe { std::env::remove_var("KIWI_DB_PATH") };

  assert_eq!(from_env.unwrap().db_path, Path::new("from-env.db"));
  assert_eq!(from_file.db_path, Path::new("from-file.db"));
}

#[test]
fn explicit_config_file_must_exist() {
  let dir = tempfile::tempdir().unwrap();
  let missing = dir.path().join("nope.toml");
  assert!(Settings::load(dir.path(), Some(missing.as_path())).is_err());
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[test]
fn stats_lists_workshops_by_host() {
  let partners = "Company,Workshop\nRoboCorp,Robotik\nCodeLab,Scratch\nCodeLab,Python\n";
  let fx = Fixture::new(SCHOOLS, partners, "School,School_Type,Workshop\n");
  fx.run();

  let mut out = Vec::new();
  let counts = stats(&fx.paths.db, &mut out).unwrap();
  assert_eq!(counts.workshops, 3);
  let out = String::from_utf8(out).unwrap();
  assert!(out.ends_with(
    "workshops by organisation:\n  \
     CodeLab\n    Python\n    Scratch\n  \
     RoboCorp\n    Robotik\n"
  ));
}

#[test]
fn stats_lists_schools_by_type_with_contacts() {
  let schools = "School,School_Type,Name(s),Email(s)\n\
                 Lindenschule,Gymnasium,Anna Berger,anna@x.at\n\
                 Au,Volksschule,,\n\
                 Berg,Volksschule,Anna Berger,anna@x.at\n";
  let fx = Fixture::new(schools, PARTNERS, "School,School_Type,Workshop\n");
  fx.run();

  let mut out = Vec::new();
  stats(&fx.paths.db, &mut out).unwrap();
  let out = String::from_utf8(out).unwrap();
  assert!(out.contains(
    "schools by type:\n  \
     Gymnasium\n    Lindenschule, 1 contact\n  \
     Volksschule\n    Au, 0 contacts\n    Berg, 1 contact\n\
     workshops by organisation:\n"
  ));
}

#[test]
fn stats_without_database_fails() {
  let dir = tempfile::tempdir().unwrap();
  let mut out = Vec::new();
  assert!(stats(&dir.path().join("kiwi.db"), &mut out).is_err());
  assert!(!dir.path().join("kiwi.db").exists());
}
