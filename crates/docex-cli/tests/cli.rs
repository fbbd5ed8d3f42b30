use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE: &str = "Acme Supplies Ltd\n\
                       Invoice #: A-1001\n\
                       Date: 03/14/2024\n\
                       Widgets x2 ........ $20.00\n\
                       Subtotal: $20.00\n\
                       Total: $21.60\n";

/// A workspace with a config that points every model at a missing path.
fn workspace() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    let config_json = serde_json::json!({
        "models": {
            "model_dir": dir.path().join("models"),
            "llm_model": dir.path().join("missing.gguf"),
        }
    });
    fs::write(&config, config_json.to_string()).unwrap();
    (dir, config)
}

fn docex(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docex").unwrap();
    cmd.env_remove("MISTRAL_MODEL_PATH")
        .arg("--config")
        .arg(config);
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn process_invoice_text() {
    let (dir, config) = workspace();
    let input = write(&dir, "invoice.txt", INVOICE);

    docex(&config)
        .args(["process", "-t", "invoice"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""success":true"#))
        .stdout(predicate::str::contains(r#""invoice_number":"A-1001""#))
        .stdout(predicate::str::contains(r#""total_amount":21.6"#))
        .stdout(predicate::str::contains("entities").not());
}

#[test]
fn process_writes_output_file() {
    let (dir, config) = workspace();
    let input = write(&dir, "resume.txt", "Jane Doe\njane@example.com\nSkills: Python, SQL\n");
    let output = dir.path().join("out.json");

    docex(&config)
        .args(["process", "-t", "resume", "--pretty", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["document_type"], "resume");
    assert_eq!(report["extracted_data"]["email"], "jane@example.com");
    assert_eq!(report["extracted_data"]["skills"], serde_json::json!(["Python", "Sql"]));
}

#[test]
fn blank_document_is_rejected() {
    let (dir, config) = workspace();
    let input = write(&dir, "blank.txt", "   \n\n");

    docex(&config)
        .args(["process", "-t", "invoice"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not extract text from PDF"));
}

#[test]
fn other_without_prompt_reports_error() {
    let (dir, config) = workspace();
    let input = write(&dir, "contract.txt", "This agreement is between A and B.");

    docex(&config)
        .args(["process", "-t", "other"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""success":false"#))
        .stdout(predicate::str::contains("custom prompt is required"));
}

#[test]
fn other_with_missing_model_reports_error() {
    let (dir, config) = workspace();
    let input = write(&dir, "contract.txt", "This agreement is between A and B.");

    docex(&config)
        .args(["process", "-t", "other", "-p", "List the parties"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("model not found"));
}

#[test]
fn ask_without_qa_model() {
    let (dir, config) = workspace();
    let input = write(&dir, "invoice.txt", INVOICE);

    docex(&config)
        .arg("ask")
        .arg(&input)
        .arg("Who issued the invoice?")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"error":"QA model not available"}"#));
}

#[test]
fn unsupported_extension_fails() {
    let (dir, config) = workspace();
    let input = write(&dir, "scan.png", "not really an image");

    docex(&config)
        .args(["process"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn batch_writes_summary() {
    let (dir, config) = workspace();
    write(&dir, "a.txt", INVOICE);
    write(&dir, "b.txt", " ");
    let out = dir.path().join("out");
    let pattern = dir.path().join("*.txt");

    docex(&config)
        .args(["batch", "--summary", "--continue-on-error", "-o"])
        .arg(&out)
        .arg(pattern.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"));

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("file,document_type,success,processing_time_ms,error"));
    assert!(summary.contains("a.txt,invoice,true"));
    assert!(summary.contains("b.txt,invoice,false"));
    assert!(out.join("a.json").exists());
}

#[test]
fn config_get_and_set() {
    let (_dir, config) = workspace();

    docex(&config)
        .args(["config", "set", "extraction.chunk_size", "1500"])
        .assert()
        .success();

    docex(&config)
        .args(["config", "get", "extraction.chunk_size"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1500"));

    docex(&config)
        .args(["config", "get", "extraction.nope"])
        .assert()
        .failure();
}

#[test]
fn models_status_lists_capabilities() {
    let (_dir, config) = workspace();

    docex(&config)
        .args(["models", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("entity tagging"))
        .stdout(predicate::str::contains("instruction"))
        .stdout(predicate::str::contains("missing"));
}
