//! E2E tests for the `lane` one-shot commands.
//!
//! Each test runs the binary as a subprocess against its own seeded demo
//! backend in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the lane binary, rooted in `dir`.
fn lane_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lane"));
    cmd.current_dir(dir);
    // Deterministic demo data for every test.
    cmd.args(["--seed", "2026", "--seed-count", "10"]);
    // Suppress tracing output that goes to stderr.
    cmd.env("LANE_LOG", "error");
    cmd
}

fn json_stdout(dir: &Path, args: &[&str]) -> Value {
    let output = lane_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("command should not crash");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn list_json_returns_seeded_rows() {
    let dir = TempDir::new().expect("tempdir");
    let rows = json_stdout(dir.path(), &["list"]);
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 10);
    // Wire field names on the JSON contract.
    assert!(rows[0].get("nombre").is_some());
    assert!(rows[0].get("estado").is_some());
}

#[test]
fn list_filters_compose() {
    let dir = TempDir::new().expect("tempdir");
    let all = json_stdout(dir.path(), &["list"]);
    let filtered = json_stdout(
        dir.path(),
        &["list", "--status", "contactado", "--classification", "pendiente"],
    );
    let filtered = filtered.as_array().expect("array");
    assert!(filtered.len() <= all.as_array().expect("array").len());
    for row in filtered {
        assert_eq!(row["estado"], "Contactado");
        assert!(row["clasificacion"].is_null());
    }
}

#[test]
fn board_excludes_lost_and_sums_to_non_lost_total() {
    let dir = TempDir::new().expect("tempdir");
    let board = json_stdout(dir.path(), &["board"]);
    let columns = board["columns"].as_array().expect("columns");
    assert_eq!(columns.len(), 3);

    let all = json_stdout(dir.path(), &["list"]);
    let lost = all
        .as_array()
        .expect("array")
        .iter()
        .filter(|row| row["estado"] == "Perdido")
        .count();
    let cards: usize = columns
        .iter()
        .map(|c| c["leads"].as_array().expect("leads").len())
        .sum();
    assert_eq!(cards, 10 - lost);
}

#[test]
fn stats_reports_pipeline_numbers() {
    let dir = TempDir::new().expect("tempdir");
    let stats = json_stdout(dir.path(), &["stats"]);
    assert_eq!(stats["total"], 10);
    assert!(stats["conversion_rate"].as_f64().is_some());
    assert!(stats["by_vehicle"].as_array().is_some());
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

#[test]
fn create_requires_catalog_vehicle() {
    let dir = TempDir::new().expect("tempdir");
    lane_cmd(dir.path())
        .args([
            "create",
            "--name",
            "Laura Vidal",
            "--phone",
            "5510203040",
            "--vehicle",
            "Rav4",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ld-"));

    lane_cmd(dir.path())
        .args([
            "create",
            "--name",
            "Laura Vidal",
            "--phone",
            "5510203040",
            "--vehicle",
            "DeLorean",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("catálogo"));
}

#[test]
fn move_changes_status_and_rejects_unknown_status() {
    let dir = TempDir::new().expect("tempdir");
    lane_cmd(dir.path())
        .args(["move", "ld-0001", "perdido"])
        .assert()
        .success();

    lane_cmd(dir.path())
        .args(["move", "ld-0001", "congelado"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("estado desconocido"));
}

#[test]
fn delete_unknown_lead_fails_cleanly() {
    let dir = TempDir::new().expect("tempdir");
    lane_cmd(dir.path())
        .args(["delete", "ld-9999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no existe"));
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_writes_bom_and_header() {
    let dir = TempDir::new().expect("tempdir");
    lane_cmd(dir.path())
        .args(["export", "--out", "salida.csv"])
        .assert()
        .success();

    let blob = std::fs::read(dir.path().join("salida.csv")).expect("file written");
    assert_eq!(&blob[..3], b"\xEF\xBB\xBF".as_slice(), "UTF-8 BOM");
    let text = String::from_utf8(blob).expect("utf-8");
    let header = text.trim_start_matches('\u{feff}').lines().next().expect("header");
    assert_eq!(header, "Fecha,Nombre,Teléfono,Vehículo,Clasificación,Estado");
    // One row per seeded lead.
    assert_eq!(text.lines().count(), 11);
}

#[test]
fn export_default_filename_uses_date_pattern() {
    let dir = TempDir::new().expect("tempdir");
    lane_cmd(dir.path()).args(["export"]).assert().success();

    let produced: Vec<String> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    assert!(
        produced
            .iter()
            .any(|name| name.starts_with("leads_") && name.ends_with(".csv")),
        "got {produced:?}"
    );
}

// ---------------------------------------------------------------------------
// Catalog and diagnostics
// ---------------------------------------------------------------------------

#[test]
fn vehicles_roundtrip() {
    let dir = TempDir::new().expect("tempdir");
    let vehicles = json_stdout(dir.path(), &["vehicles", "list"]);
    let names: Vec<&str> = vehicles
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|v| v["name"].as_str())
        .collect();
    assert_eq!(names, ["Geely", "Mustang", "Rav4"]);

    lane_cmd(dir.path())
        .args(["vehicles", "add", ""])
        .assert()
        .failure();
}

#[test]
fn sim_campaign_passes_the_oracle() {
    let dir = TempDir::new().expect("tempdir");
    let report = json_stdout(dir.path(), &["sim", "--rounds", "30"]);
    assert_eq!(report["passed"], true);
    assert!(report["applied_events"].as_u64().expect("events") > 0);
}
