//! Rendering of a finished check for the terminal.
use crate::workflow::RunOutcome;
use anyhow::{Context, Result};
use serde::Serialize;

pub const ALIGNED_HEADING: &str = "Detailed Analysis";
pub const MISALIGNED_HEADING: &str = "Improvement Suggestions";

#[derive(Serialize)]
struct CheckReport<'a> {
    aligned: bool,
    heading: &'a str,
    message: &'a str,
}

pub fn heading(aligned: bool) -> &'static str {
    if aligned {
        ALIGNED_HEADING
    } else {
        MISALIGNED_HEADING
    }
}

/// Format the outcome as markdown (heading + message) or pretty JSON.
pub fn format_outcome(outcome: &RunOutcome, json: bool) -> Result<String> {
    let heading = heading(outcome.aligned);
    if json {
        let report = CheckReport {
            aligned: outcome.aligned,
            heading,
            message: &outcome.final_message,
        };
        return serde_json::to_string_pretty(&report).context("serialize check report");
    }
    Ok(format!(
        "### {heading}\n\n{}",
        outcome.final_message.trim_end()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(aligned: bool) -> RunOutcome {
        RunOutcome {
            final_message: "Body text\n".to_string(),
            aligned,
        }
    }

    #[test]
    fn markdown_heading_follows_verdict() {
        assert_eq!(
            format_outcome(&outcome(true), false).unwrap(),
            "### Detailed Analysis\n\nBody text"
        );
        assert_eq!(
            format_outcome(&outcome(false), false).unwrap(),
            "### Improvement Suggestions\n\nBody text"
        );
    }

    #[test]
    fn json_report_carries_verdict_and_message() {
        let text = format_outcome(&outcome(false), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["aligned"], false);
        assert_eq!(value["heading"], MISALIGNED_HEADING);
        assert_eq!(value["message"], "Body text\n");
    }
}
