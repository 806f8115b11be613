//! CLI surface smoke tests

use assert_cmd::Command;
use predicates::prelude::*;

fn hazcheck(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hazcheck").expect("binary");
    cmd.env("HAZCHECK_DB", dir.path().join("documents.sqlite"))
        .env("HAZCHECK_CONFIG", dir.path().join("settings.yml"))
        .env_remove("HAZCHECK_API_KEY");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().expect("tempdir");
    hazcheck(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("screenshot"))
        .stdout(predicate::str::contains("servers"));
}

#[test]
fn test_docs_list_empty_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    hazcheck(&dir)
        .args(["docs", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No documents"));
}

#[test]
fn test_docs_add_text_and_list() {
    let dir = tempfile::tempdir().expect("tempdir");
    let doc = dir.path().join("sop.txt");
    std::fs::write(&doc, "never ship aerosols by air").expect("write");

    hazcheck(&dir)
        .args(["docs", "add"])
        .arg(&doc)
        .args(["--weight", "70"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 'sop.txt'"));

    hazcheck(&dir)
        .args(["docs", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sop.txt"))
        .stdout(predicate::str::contains("70"));
}

#[test]
fn test_servers_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");

    hazcheck(&dir)
        .args(["servers", "add", "iata", "http://localhost:9000/sse", "--weight", "80"])
        .assert()
        .success();

    hazcheck(&dir)
        .args(["servers", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("iata"))
        .stdout(predicate::str::contains("enabled"));

    hazcheck(&dir)
        .args(["servers", "disable", "iata"])
        .assert()
        .success();

    hazcheck(&dir)
        .args(["servers", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("disabled"));
}

#[test]
fn test_validate_missing_shipment_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    hazcheck(&dir)
        .args(["validate", "/nonexistent/shipment.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_validate_without_api_key_fails_clearly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let shipment = dir.path().join("shipment.json");
    std::fs::write(
        &shipment,
        r#"{
            "carrier": "FedEx",
            "mode": "Ground",
            "service": "FedEx Ground",
            "un_number": "UN1263",
            "proper_shipping_name": "Paint",
            "hazard_class": "3",
            "quantity": 4.0,
            "quantity_unit": "L"
        }"#,
    )
    .expect("write");

    hazcheck(&dir)
        .arg("validate")
        .arg(&shipment)
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn test_verbose_flag_raises_log_level() {
    let dir = tempfile::tempdir().expect("tempdir");

    hazcheck(&dir)
        .args(["--verbose", "docs", "list"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("opening database at"));

    hazcheck(&dir)
        .args(["docs", "list"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("opening database at").not());
}

#[test]
fn test_config_set_rule_toggle_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");

    hazcheck(&dir)
        .args(["config", "set", "rule.sameday", "false"])
        .assert()
        .success();

    hazcheck(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rule.sameday: false"));
}

#[test]
fn test_config_set_and_show_redacts_key() {
    let dir = tempfile::tempdir().expect("tempdir");

    hazcheck(&dir)
        .args(["config", "set", "api-key", "secret-value"])
        .assert()
        .success();

    hazcheck(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(set)"))
        .stdout(predicate::str::contains("secret-value").not());
}
