use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn docqa(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("docqa").unwrap();
    cmd.env("DOCQA_DATA_DIR", data_dir.path())
        .env_remove("DOCQA_LLM_API_KEY")
        .env_remove("DOCQA_SESSIONS_FILE")
        .env_remove("DOCQA_UPLOAD_DIR");
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("docqa").unwrap();
    cmd.arg("--help").assert().success().stdout(predicate::str::contains("Chat with your PDFs"));
}

#[test]
fn test_cli_serve_help() {
    let mut cmd = Command::cargo_bin("docqa").unwrap();
    cmd.arg("serve").arg("--help").assert().success().stdout(predicate::str::contains("port"));
}

#[test]
fn test_serve_without_api_key_fails() {
    let dir = TempDir::new().unwrap();
    docqa(&dir)
        .arg("serve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DOCQA_LLM_API_KEY"));
}

#[test]
fn test_sessions_on_fresh_data_dir_is_empty() {
    let dir = TempDir::new().unwrap();
    docqa(&dir).arg("sessions").assert().success().stdout(predicate::str::contains("[]"));
}

#[test]
fn test_sessions_reports_corrupted_file_without_moving_it() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("sessions.json");
    std::fs::write(&file, "{\"sessions\": ").unwrap();

    docqa(&dir)
        .arg("sessions")
        .assert()
        .failure()
        .stderr(predicate::str::contains("data corruption"));

    assert_eq!(std::fs::read_to_string(&file).unwrap(), "{\"sessions\": ");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_ingest_rejects_non_pdf() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.pdf");
    std::fs::write(&file, "plain text, not a PDF").unwrap();
    docqa(&dir).arg("ingest").arg(&file).assert().failure();
}
