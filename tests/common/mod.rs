//! Shared test infrastructure for integration tests.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Positioning inputs for one scenario.
pub struct Scenario {
    pub core_value: &'static str,
    pub target_audience: &'static str,
    pub persona: &'static str,
    pub monetization: &'static str,
}

/// Coherent eco-beauty brand.
pub const ECO_BEAUTY: Scenario = Scenario {
    core_value: "Eco-friendly, sustainable beauty products that promote natural beauty",
    target_audience: "Environmentally conscious women aged 25-40",
    persona: "A nature-loving wellness advocate who values sustainability",
    monetization: "Organic skincare line and eco-friendly beauty workshops",
};

/// Enterprise AI tooling pitched at small businesses new to technology.
pub const ENTERPRISE_AI: Scenario = Scenario {
    core_value: "Cutting-edge AI tools for enterprise-level business automation",
    target_audience: "Small local business owners just beginning to use technology",
    persona: "An authoritative, highly technical AI expert in complex systems",
    monetization: "Sophisticated AI platforms priced for large enterprises",
};

fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// LM command that runs the mock script through `sh`.
pub fn mock_lm_command() -> String {
    let script = manifest_dir().join("tests/mock-lm.sh");
    format!("sh '{}'", script.display())
}

/// A `posm` invocation isolated from the user's config and environment.
pub struct Posm {
    config_home: TempDir,
}

impl Posm {
    pub fn isolated() -> Self {
        Self {
            config_home: TempDir::new().expect("create config home"),
        }
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_posm"));
        command
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env_remove("POSM_LM_COMMAND")
            .env_remove("POSM_MOCK_VERDICT")
            .env_remove("POSM_MOCK_FAIL")
            .env("RUST_LOG", "warn");
        command
    }

    /// `posm check` for a scenario against the mock LM.
    pub fn check(&self, scenario: &Scenario, verdict: &str, extra: &[&str]) -> Output {
        self.command()
            .args(["check", "--provider", "command", "--lm"])
            .arg(mock_lm_command())
            .args(["--core-value", scenario.core_value])
            .args(["--target-audience", scenario.target_audience])
            .args(["--persona", scenario.persona])
            .args(["--monetization", scenario.monetization])
            .args(extra)
            .env("POSM_MOCK_VERDICT", verdict)
            .output()
            .expect("run posm check")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
