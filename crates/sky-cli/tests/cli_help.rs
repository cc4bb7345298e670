use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn sky(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sky"));
    cmd.env("HOME", home);
    cmd
}

#[test]
fn help_lists_every_command() {
    let home_dir = tempdir().expect("tempdir");
    sky(home_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("configure")
                .and(predicate::str::contains("create-vault"))
                .and(predicate::str::contains("create-connection"))
                .and(predicate::str::contains("insert"))
                .and(predicate::str::contains("deidentify"))
                .and(predicate::str::contains("reidentify")),
        );
}

#[test]
fn create_vault_help_shows_service_account_toggle() {
    let home_dir = tempdir().expect("tempdir");
    sky(home_dir.path())
        .args(["create-vault", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--create-service-account")
                .and(predicate::str::contains("--schema"))
                .and(predicate::str::contains("--template")),
        );
}

#[test]
fn deidentify_help_shows_token_types() {
    let home_dir = tempdir().expect("tempdir");
    sky(home_dir.path())
        .args(["deidentify", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("vault_token")
                .and(predicate::str::contains("entity_only"))
                .and(predicate::str::contains("entity_unique_counter")),
        );
}

#[test]
fn template_and_schema_conflict() {
    let home_dir = tempdir().expect("tempdir");
    sky(home_dir.path())
        .args([
            "create-vault",
            "--template",
            "tmpl-1",
            "--schema",
            "schema.json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn http_api_url_requires_insecure_flag() {
    let home_dir = tempdir().expect("tempdir");
    sky(home_dir.path())
        .env_remove("SKYFLOW_WORKSPACE_ID")
        .args([
            "--api-url",
            "http://example.com",
            "--bearer-token",
            "token-1",
            "--account-id",
            "acct-1",
            "create-vault",
            "--name",
            "demo",
            "--workspace-id",
            "ws-1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "refusing to use http:// without --insecure",
        ));
}
