#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn turnover(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("turnover").unwrap();
    cmd.current_dir(dir.path())
        .env("TURNOVER_ROOT", dir.path())
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_ANON_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn list_json(dir: &TempDir) -> Vec<serde_json::Value> {
    let out = turnover(dir)
        .args(["--offline", "list", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    serde_json::from_slice(&out.stdout).unwrap()
}

fn cache_file(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join(".turnover/cache/turnover_manual_v1.json")
}

// ---------------------------------------------------------------------------
// turnover list / summary
// ---------------------------------------------------------------------------

#[test]
fn first_run_lists_seed_roster() {
    let dir = TempDir::new().unwrap();
    let rows = list_json(&dir);
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0]["position"], 1);
    assert_eq!(rows[0]["name"], "Consultant 1");
    assert_eq!(rows[0]["mailbox"], "consultant1@entreprise1.com");
    assert_eq!(rows[0]["status"], "new");
    assert_eq!(rows[0]["label"], "Nouveau");
    assert_eq!(rows[0]["needs_attention"], true);
}

#[test]
fn list_table_shows_labels() {
    let dir = TempDir::new().unwrap();
    turnover(&dir)
        .args(["--offline", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Consultant 10"))
        .stdout(predicate::str::contains("Nouveau"))
        .stdout(predicate::str::contains("N/A"));
}

#[test]
fn summary_counts_seed_as_pending() {
    let dir = TempDir::new().unwrap();
    let out = turnover(&dir)
        .args(["--offline", "summary", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["pending"], 10);
    assert_eq!(summary["current"], 0);
    assert_eq!(summary["inactive"], 0);
}

// ---------------------------------------------------------------------------
// turnover add
// ---------------------------------------------------------------------------

#[test]
fn add_appends_and_persists() {
    let dir = TempDir::new().unwrap();
    turnover(&dir)
        .args([
            "--offline",
            "add",
            "  Ada Lovelace ",
            "--company",
            "ACME",
            "--mailbox",
            "Ada@Acme.io",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added consultant #11"));

    assert!(cache_file(&dir).exists());
    let rows = list_json(&dir);
    assert_eq!(rows.len(), 11);
    assert_eq!(rows[10]["name"], "Ada Lovelace");
    assert_eq!(rows[10]["company"], "ACME");
    assert_eq!(rows[10]["status"], "new");
}

#[test]
fn add_with_invalid_mailbox_fails_and_keeps_roster() {
    let dir = TempDir::new().unwrap();
    turnover(&dir)
        .args([
            "--offline",
            "add",
            "Ada",
            "--company",
            "ACME",
            "--mailbox",
            "not-an-address",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to add consultant"));

    assert!(!cache_file(&dir).exists());
    assert_eq!(list_json(&dir).len(), 10);
}

#[test]
fn add_requires_name_and_company() {
    let dir = TempDir::new().unwrap();
    turnover(&dir)
        .args(["--offline", "add", "   ", "--company", "ACME"])
        .assert()
        .failure();
    turnover(&dir)
        .args(["--offline", "add", "Ada", "--company", ""])
        .assert()
        .failure();
    assert_eq!(list_json(&dir).len(), 10);
}

// ---------------------------------------------------------------------------
// turnover act / edits
// ---------------------------------------------------------------------------

#[test]
fn act_marks_consultant_current() {
    let dir = TempDir::new().unwrap();
    turnover(&dir)
        .args(["--offline", "act", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("À jour"));

    let rows = list_json(&dir);
    assert_eq!(rows[2]["status"], "current");
    assert!(rows[2]["last_action"].is_i64());
    assert_eq!(rows[2]["needs_attention"], false);
    assert_eq!(rows[0]["status"], "new");
}

#[test]
fn act_on_inactive_consultant_is_refused() {
    let dir = TempDir::new().unwrap();
    turnover(&dir)
        .args(["--offline", "deactivate", "2"])
        .assert()
        .success();
    turnover(&dir)
        .args(["--offline", "act", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to update consultant #2"));

    let rows = list_json(&dir);
    assert_eq!(rows[1]["status"], "inactive");
    assert!(rows[1]["last_action"].is_null());
}

#[test]
fn rename_company_and_mailbox_edits() {
    let dir = TempDir::new().unwrap();
    turnover(&dir)
        .args(["--offline", "rename", "1", "Grace"])
        .assert()
        .success();
    turnover(&dir)
        .args(["--offline", "company", "1", "Navy"])
        .assert()
        .success();
    turnover(&dir)
        .args(["--offline", "mailbox", "1", "grace@navy.mil"])
        .assert()
        .success();
    turnover(&dir)
        .args(["--offline", "mailbox", "1", "broken@"])
        .assert()
        .failure();

    let rows = list_json(&dir);
    assert_eq!(rows[0]["name"], "Grace");
    assert_eq!(rows[0]["company"], "Navy");
    assert_eq!(rows[0]["mailbox"], "grace@navy.mil");
}

#[test]
fn out_of_range_position_fails() {
    let dir = TempDir::new().unwrap();
    turnover(&dir)
        .args(["--offline", "act", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positions start at 1"));
    turnover(&dir)
        .args(["--offline", "act", "99"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// turnover reset / sync / config
// ---------------------------------------------------------------------------

#[test]
fn reset_returns_to_seed() {
    let dir = TempDir::new().unwrap();
    turnover(&dir)
        .args(["--offline", "rename", "1", "Changed"])
        .assert()
        .success();
    assert!(cache_file(&dir).exists());

    turnover(&dir)
        .args(["--offline", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reset to 10"));

    assert!(!cache_file(&dir).exists());
    assert_eq!(list_json(&dir)[0]["name"], "Consultant 1");
}

#[test]
fn sync_without_remote_reports_offline() {
    let dir = TempDir::new().unwrap();
    let out = turnover(&dir).args(["sync", "--json"]).output().unwrap();
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["outcome"], "offline");
    assert_eq!(report["local_rows"], 10);
    assert_eq!(report["pushed"], false);
}

#[test]
fn config_init_then_show_masks_key() {
    let dir = TempDir::new().unwrap();
    turnover(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    let written = std::fs::read_to_string(dir.path().join(".turnover/config.yaml")).unwrap();
    assert!(written.contains("table: consultants"));

    turnover(&dir)
        .args(["config", "show"])
        .env("SUPABASE_URL", "https://example.supabase.co")
        .env("SUPABASE_ANON_KEY", "secret-anon-key")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.supabase.co"))
        .stdout(predicate::str::contains("secret-anon-key").not())
        .stdout(predicate::str::contains("push_debounce_ms: 400"))
        .stdout(predicate::str::contains("table: consultants"));
}

#[test]
fn invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".turnover")).unwrap();
    std::fs::write(
        dir.path().join(".turnover/config.yaml"),
        "sync:\n  sweep_interval_secs: 0\n",
    )
    .unwrap();
    turnover(&dir)
        .args(["--offline", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}
