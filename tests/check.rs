//! End-to-end checks of `posm check` against a mock LM command.
//!
//! The mock answers the evaluation prompt with `POSM_MOCK_VERDICT` and the
//! branch prompts with fixed text, so each test pins which branch ran.

mod common;

use common::{stderr, stdout, Posm, ECO_BEAUTY, ENTERPRISE_AI};

#[test]
fn aligned_positioning_prints_detailed_analysis() {
    let posm = Posm::isolated();
    let output = posm.check(&ECO_BEAUTY, "The brand is coherent.\nOutput: YES", &[]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("### Detailed Analysis"), "{text}");
    assert!(text.contains("MOCK ANALYSIS"));
    assert!(!text.contains("MOCK POSITIONING"));
}

#[test]
fn misaligned_positioning_prints_five_alternatives() {
    let posm = Posm::isolated();
    let output = posm.check(&ENTERPRISE_AI, "Persona and audience conflict.\nOutput: NO", &["--json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["aligned"], false);
    assert_eq!(report["heading"], "Improvement Suggestions");
    let message = report["message"].as_str().unwrap();
    assert!(message.starts_with("MOCK POSITIONING"));
    assert_eq!(message.lines().filter(|line| line.contains("Core Value /")).count(), 5);
}

#[test]
fn incidental_yes_is_classified_as_aligned() {
    let posm = Posm::isolated();
    let output = posm.check(
        &ENTERPRISE_AI,
        "NO, this does NOT qualify, but some aspects nearly say YES",
        &["--json"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["aligned"], true);
    assert!(report["message"].as_str().unwrap().contains("MOCK ANALYSIS"));
}

#[test]
fn missing_inputs_are_rejected_before_calling_the_model() {
    let posm = Posm::isolated();
    let log_dir = tempfile::tempdir().unwrap();
    let output = posm
        .command()
        .args(["check", "--provider", "command", "--lm"])
        .arg(common::mock_lm_command())
        .args(["--core-value", "Affordable automation", "--persona", "  "])
        .arg("--log-dir")
        .arg(log_dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("missing required input(s)"), "{err}");
    assert!(err.contains("target_audience, persona, monetization"), "{err}");
    assert!(!log_dir.path().join("lm_log.jsonl").exists());
}

#[test]
fn provider_failure_aborts_with_its_message() {
    let posm = Posm::isolated();
    let output = posm
        .command()
        .args(["check", "--provider", "command", "--lm"])
        .arg(common::mock_lm_command())
        .args(["--core-value", ECO_BEAUTY.core_value])
        .args(["--target-audience", ECO_BEAUTY.target_audience])
        .args(["--persona", ECO_BEAUTY.persona])
        .args(["--monetization", ECO_BEAUTY.monetization])
        .env("POSM_MOCK_FAIL", "1")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
    let err = stderr(&output);
    assert!(err.contains("evaluate step"), "{err}");
    assert!(err.contains("mock provider unavailable"), "{err}");
}

#[test]
fn log_dir_records_both_invocations() {
    let posm = Posm::isolated();
    let log_dir = tempfile::tempdir().unwrap();
    let dir = log_dir.path().to_str().unwrap();

    let output = posm.check(&ECO_BEAUTY, "Output: YES", &["--log-dir", dir, "--verbose"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let log = std::fs::read_to_string(log_dir.path().join("lm_log.jsonl")).unwrap();
    let entries: Vec<serde_json::Value> = log
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["step"], "evaluate");
    assert_eq!(entries[0]["verdict"], "aligned");
    assert_eq!(entries[1]["step"], "analyze");
    assert_eq!(entries[1]["run"], 1);
    assert!(log_dir
        .path()
        .join("lm_log/run_001_analyze_response.txt")
        .is_file());
}

#[test]
fn input_file_supplies_positioning() {
    let posm = Posm::isolated();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("positioning.json");
    let body = serde_json::json!({
        "core_value": ECO_BEAUTY.core_value,
        "target_audience": ECO_BEAUTY.target_audience,
        "persona": ECO_BEAUTY.persona,
        "monetization": ECO_BEAUTY.monetization,
    });
    std::fs::write(&input, body.to_string()).unwrap();

    let output = posm
        .command()
        .args(["check", "--provider", "command", "--json", "--lm"])
        .arg(common::mock_lm_command())
        .arg("--input")
        .arg(&input)
        .env("POSM_MOCK_VERDICT", "Output: yes")
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["aligned"], true);
}
