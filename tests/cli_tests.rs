//! End-to-end tests of the command line against a temporary DF folder

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use modhearth::cli::{execute, Cli, CliError, VersionProvider};
use std::fs;
use tempfile::TempDir;

struct FixedVersion;

impl VersionProvider for FixedVersion {
    fn version(&self) -> String {
        "9.9.9".to_string()
    }
}

/// A DF folder with two packs and a discovery feed where `b` must follow `a`.
struct Fixture {
    _temp_dir: TempDir,
    df: Utf8PathBuf,
    feed: Utf8PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let df = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(df.join("dfhack-config")).unwrap();

        fs::write(
            df.join("dfhack-config").join("mod-manager.json"),
            r#"[
                {"default": true, "modlist": [{"id": "b", "version": 1}, {"id": "a", "version": 1}], "name": "Main"},
                {"default": false, "modlist": [], "name": "Empty"}
            ]"#,
        )
        .unwrap();

        let feed = df.join("mods.json");
        fs::write(
            &feed,
            r#"[
                {"id": "a", "name": "Alpha", "version": 1, "src_dir": "mods/a"},
                {"id": "b", "name": "Beta", "version": 1, "src_dir": "mods/b", "require_before_me": ["a"]},
                {"id": "c", "name": "Gamma", "version": "1", "src_dir": "mods/c"}
            ]"#,
        )
        .unwrap();

        Self {
            _temp_dir: temp_dir,
            df,
            feed,
        }
    }

    fn mod_manager(&self) -> Utf8PathBuf {
        self.df.join("dfhack-config").join("mod-manager.json")
    }

    fn run(&self, args: &[&str]) -> Result<String, CliError> {
        let mut argv = vec!["modhearth", "--df-folder", self.df.as_str()];
        argv.extend_from_slice(args);
        run(&argv)
    }
}

fn run(argv: &[&str]) -> Result<String, CliError> {
    let cli = Cli::try_parse_from(argv).unwrap();
    let mut out = Vec::new();
    execute(&cli, &FixedVersion, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

fn read(path: &Utf8Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_version_uses_provider() {
    assert_eq!(run(&["modhearth", "version"]).unwrap(), "ModHearth CLI 9.9.9\n");
}

#[test]
fn test_list_packs_marks_default() {
    let fixture = Fixture::new();
    let output = fixture.run(&["list-packs"]).unwrap();
    assert_eq!(output, "* Main [2]\n  Empty [0]\n");
}

#[test]
fn test_list_mods() {
    let fixture = Fixture::new();
    assert_eq!(fixture.run(&["list-mods", "--pack", "main"]).unwrap(), "b|1\na|1\n");
    assert_eq!(fixture.run(&["list-mods", "--pack", "Empty"]).unwrap(), "(empty)\n");
}

#[test]
fn test_unknown_pack_exit_code() {
    let fixture = Fixture::new();
    let err = fixture.run(&["list-mods", "--pack", "Nope"]).unwrap_err();
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn test_missing_mod_manager_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let folder = temp_dir.path().to_str().unwrap();
    let err = run(&["modhearth", "--df-folder", folder, "list-packs"]).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().starts_with("mod-manager.json not found"));

    let err = run(&["modhearth", "list-packs"]).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_set_default_saves() {
    let fixture = Fixture::new();
    let output = fixture.run(&["set-default", "--pack", "empty"]).unwrap();
    assert_eq!(output, "Default pack set to: Empty\n");
    assert_eq!(fixture.run(&["list-packs"]).unwrap(), "  Main [2]\n* Empty [0]\n");
}

#[test]
fn test_problems_reports_violation() {
    let fixture = Fixture::new();
    let output = fixture
        .run(&["problems", "--discovery", fixture.feed.as_str()])
        .unwrap();
    assert_eq!(output.lines().count(), 1);
    assert!(output.contains("'b'"));
    assert!(output.contains("'a'"));
}

#[test]
fn test_sort_write_fixes_pack() {
    let fixture = Fixture::new();
    let output = fixture
        .run(&["sort", "--discovery", fixture.feed.as_str(), "--write"])
        .unwrap();
    assert!(output.starts_with("a|1\nb|1\n"));
    assert!(output.ends_with("Saved pack: Main\n"));

    assert_eq!(fixture.run(&["list-mods", "--pack", "Main"]).unwrap(), "a|1\nb|1\n");
    let problems = fixture
        .run(&["problems", "--discovery", fixture.feed.as_str()])
        .unwrap();
    assert_eq!(problems, "No problems found.\n");
}

#[test]
fn test_sort_without_write_leaves_file() {
    let fixture = Fixture::new();
    let before = read(&fixture.mod_manager());
    fixture
        .run(&["sort", "--discovery", fixture.feed.as_str(), "--pack", "Main"])
        .unwrap();
    assert_eq!(read(&fixture.mod_manager()), before);
}

#[test]
fn test_export_then_import() {
    let fixture = Fixture::new();
    let exported = fixture.df.join("main.json");

    let output = fixture
        .run(&["export", "--pack", "Main", "--output", exported.as_str()])
        .unwrap();
    assert!(output.starts_with("Exported Main to "));

    let output = fixture.run(&["import", "--input", exported.as_str()]).unwrap();
    assert_eq!(output, "Replaced pack: Main\n");

    let renamed = read(&exported).replace("\"Main\"", "\"Copy\"");
    fs::write(&exported, renamed).unwrap();
    let output = fixture.run(&["import", "--input", exported.as_str()]).unwrap();
    assert_eq!(output, "Added pack: Copy\n");
    assert_eq!(fixture.run(&["list-mods", "--pack", "Copy"]).unwrap(), "b|1\na|1\n");
}

#[test]
fn test_broken_feed_is_load_error() {
    let fixture = Fixture::new();
    fs::write(&fixture.feed, "not json").unwrap();
    let err = fixture
        .run(&["problems", "--discovery", fixture.feed.as_str()])
        .unwrap_err();
    assert_eq!(err.exit_code(), 3);
}
