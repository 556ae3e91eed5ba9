#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write(root: &Path, file: &str, content: &str) {
    let path = root.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small mod with two countries and one color override.
fn test_mod() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "common/country_tags/00_countries.txt",
        "ENG = \"countries/England.txt\"\nFRA = \"countries/France.txt\"\n",
    );
    write(
        dir.path(),
        "common/countries/England.txt",
        "graphical_culture = western_european_gfx\ncolor = rgb { 200 0 0 }\n",
    );
    write(dir.path(), "common/countries/France.txt", "color = { 0 0 200 }\n");
    write(
        dir.path(),
        "common/countries/colors.txt",
        "FRA = {\n    color = hsv { 0 1 1 }\n    color_ui = rgb { 1 1 1 }\n}\n",
    );
    dir
}

fn atlas() -> Command {
    Command::cargo_bin("atlas").unwrap()
}

fn mod_arg(dir: &TempDir) -> [String; 2] {
    ["-m".to_string(), dir.path().to_str().unwrap().to_string()]
}

// ---------------------------------------------------------------------------
// countries
// ---------------------------------------------------------------------------

#[test]
fn countries_lists_resolved_colors() {
    let dir = test_mod();
    atlas()
        .arg("countries")
        .args(mod_arg(&dir))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("ENG")
                .and(predicate::str::contains("#C80000"))
                .and(predicate::str::contains("FRA"))
                .and(predicate::str::contains("#FF0000"))
                .and(predicate::str::contains("2 countries")),
        );
}

#[test]
fn countries_json() {
    let dir = test_mod();
    let output = atlas()
        .args(["countries", "--json"])
        .args(mod_arg(&dir))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["result"][0]["tag"], "ENG");
    assert_eq!(value["result"][0]["color"], 0xC8_00_00);
    assert_eq!(value["dependencies"][0], "common/country_tags/*");
}

#[test]
fn countries_game_dir_is_overlaid() {
    let game = test_mod();
    let modd = TempDir::new().unwrap();
    write(modd.path(), "common/countries/England.txt", "color = rgb { 0 200 0 }\n");

    atlas()
        .arg("countries")
        .args(mod_arg(&modd))
        .args(["-g", game.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("#00C800"));
}

#[test]
fn countries_without_tag_folder_fails() {
    let dir = TempDir::new().unwrap();
    atlas()
        .arg("countries")
        .args(mod_arg(&dir))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot list folder common/country_tags"));
}

#[test]
fn countries_config_file_changes_layout() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "tags/a.txt", "GER = \"germany.txt\"\n");
    write(dir.path(), "defs/germany.txt", "color = { 1 2 3 }\n");
    write(
        dir.path(),
        "atlas.toml",
        "country_tags_folder = \"tags\"\ncountry_file_root = \"defs\"\ncolors_file = \"colors.txt\"\n",
    );

    atlas()
        .arg("countries")
        .args(mod_arg(&dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("GER").and(predicate::str::contains("#010203")));
}

#[test]
fn countries_bad_config_fails() {
    let dir = test_mod();
    write(dir.path(), "atlas.toml", "colors_file = 3\n");
    atlas()
        .arg("countries")
        .args(mod_arg(&dir))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid loader configuration"));
}

// ---------------------------------------------------------------------------
// tags
// ---------------------------------------------------------------------------

#[test]
fn tags_lists_definition_files() {
    let dir = test_mod();
    atlas()
        .arg("tags")
        .args(mod_arg(&dir))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("common/countries/England.txt")
                .and(predicate::str::contains("2 tags")),
        );
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_passes_clean_mod() {
    let dir = test_mod();
    atlas()
        .arg("check")
        .args(mod_arg(&dir))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("All checks passed")
                .and(predicate::str::contains("2 countries, 4 dependencies, 0 warnings")),
        );
}

#[test]
fn check_reports_broken_country() {
    let dir = test_mod();
    write(dir.path(), "common/countries/France.txt", "color = { 0 0 200\n");

    atlas()
        .arg("check")
        .args(mod_arg(&dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("1 country"))
        .stderr(predicate::str::contains("failed to load country FRA"));
}

#[test]
fn check_strict_fails_on_warnings() {
    let dir = test_mod();
    fs::remove_file(dir.path().join("common/countries/France.txt")).unwrap();

    atlas()
        .args(["check", "--strict"])
        .args(mod_arg(&dir))
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 warning reported"));
}

// ---------------------------------------------------------------------------
// lint
// ---------------------------------------------------------------------------

#[test]
fn lint_accepts_valid_file() {
    let dir = test_mod();
    let file = dir.path().join("common/countries/colors.txt");
    atlas()
        .arg("lint")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 statement, no syntax errors"));
}

#[test]
fn lint_reports_syntax_errors() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "bad.txt", "ENG = {\n    color = rgb { 1 2 3 }\n");

    atlas()
        .arg("lint")
        .arg(dir.path().join("bad.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn lint_with_schema_warns_about_ignored_values() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "00_countries.txt",
        "ENG = \"countries/England.txt\"\nFRA = { }\nENG = \"countries/Britain.txt\"\n",
    );

    atlas()
        .arg("lint")
        .arg(dir.path().join("00_countries.txt"))
        .args(["--schema", "tags"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "3 statements, no syntax errors, 2 ignored values",
        ))
        .stderr(
            predicate::str::contains("value of `FRA` is ignored")
                .and(predicate::str::contains("expected string"))
                .and(predicate::str::contains("`ENG` is set more than once")),
        );
}

#[test]
fn lint_with_schema_clean_file() {
    let dir = test_mod();
    atlas()
        .arg("lint")
        .arg(dir.path().join("common/countries/colors.txt"))
        .args(["--schema", "colors"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 statement, no syntax errors\n"));
}

#[test]
fn lint_missing_file() {
    atlas()
        .args(["lint", "/nonexistent/file.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

// ---------------------------------------------------------------------------
// watch
// ---------------------------------------------------------------------------

#[test]
fn watch_reports_first_load_once() {
    let dir = test_mod();
    atlas()
        .args(["watch", "--interval-ms", "10", "--cycles", "3"])
        .args(mod_arg(&dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("loaded 2 countries").count(1));
}

#[test]
fn watch_progress_prints_stages() {
    let dir = test_mod();
    atlas()
        .args(["watch", "--interval-ms", "10", "--cycles", "2", "--progress"])
        .args(mod_arg(&dir))
        .assert()
        .success()
        .stderr(
            predicate::str::contains("loading 2 country definition(s)")
                .and(predicate::str::contains("reading common/countries/England.txt")),
        );
}

#[test]
fn watch_without_content_fails() {
    let dir = TempDir::new().unwrap();
    atlas()
        .args(["watch", "--interval-ms", "1", "--cycles", "2"])
        .args(mod_arg(&dir))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no load succeeded"));
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

#[test]
fn help_lists_commands() {
    atlas()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("countries")
                .and(predicate::str::contains("lint"))
                .and(predicate::str::contains("watch")),
        );
}
