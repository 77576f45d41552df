//! Prompt templates for the positioning workflow.
//!
//! Templates are plain markdown compiled into the binary. Slots use the
//! `{name}` form and are filled in a single pass, so a slot value that itself
//! looks like a placeholder is never expanded a second time.

use crate::workflow::PositioningInputs;
use anyhow::{anyhow, Result};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const EVALUATE_PROMPT_MD: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/evaluate.md"));
pub const ANALYSIS_PROMPT_MD: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/analysis.md"));
pub const POSITIONING_PROMPT_MD: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/positioning.md"));

pub const SLOT_CORE_VALUE: &str = "core_value";
pub const SLOT_TARGET_AUDIENCE: &str = "target_audience";
pub const SLOT_PERSONA: &str = "persona";
pub const SLOT_MONETIZATION: &str = "monetization";
pub const SLOT_ALIGNMENT: &str = "alignment";

/// The three prompts the workflow can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Template {
    /// Alignment judgment ending in a literal YES/NO.
    Evaluate,
    /// Explanation and refinement of an aligned positioning.
    Analysis,
    /// Conflicts plus five aligned alternatives for a misaligned positioning.
    Positioning,
}

impl Template {
    pub fn text(self) -> &'static str {
        match self {
            Self::Evaluate => EVALUATE_PROMPT_MD,
            Self::Analysis => ANALYSIS_PROMPT_MD,
            Self::Positioning => POSITIONING_PROMPT_MD,
        }
    }

    /// Literal alignment tag the branch templates carry.
    pub fn alignment_tag(self) -> Option<&'static str> {
        match self {
            Self::Evaluate => None,
            Self::Analysis => Some("YES"),
            Self::Positioning => Some("NO"),
        }
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Evaluate => write!(f, "evaluate"),
            Self::Analysis => write!(f, "analysis"),
            Self::Positioning => write!(f, "positioning"),
        }
    }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern"))
}

/// Slot names referenced by a template, in first-appearance order.
pub fn placeholders(text: &str) -> Vec<&str> {
    let mut names = Vec::new();
    for caps in placeholder_regex().captures_iter(text) {
        if let Some(name) = caps.get(1).map(|m| m.as_str()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Substitute every slot in `text`, failing if any slot is not supplied.
///
/// Extra entries in `slots` are ignored.
pub fn render(text: &str, slots: &BTreeMap<&str, &str>) -> Result<String> {
    let missing: Vec<&str> = placeholders(text)
        .into_iter()
        .filter(|name| !slots.contains_key(name))
        .collect();
    if !missing.is_empty() {
        return Err(anyhow!(
            "template slot(s) not supplied: {}",
            missing.join(", ")
        ));
    }
    let rendered = placeholder_regex().replace_all(text, |caps: &Captures| {
        slots.get(&caps[1]).copied().unwrap_or_default().to_string()
    });
    Ok(rendered.into_owned())
}

/// Render `template` for a set of positioning inputs.
///
/// Inputs are substituted verbatim; empty strings become empty slots.
pub fn render_template(template: Template, inputs: &PositioningInputs) -> Result<String> {
    let mut slots = BTreeMap::new();
    slots.insert(SLOT_CORE_VALUE, inputs.core_value.as_str());
    slots.insert(SLOT_TARGET_AUDIENCE, inputs.target_audience.as_str());
    slots.insert(SLOT_PERSONA, inputs.persona.as_str());
    slots.insert(SLOT_MONETIZATION, inputs.monetization.as_str());
    if let Some(tag) = template.alignment_tag() {
        slots.insert(SLOT_ALIGNMENT, tag);
    }
    render(template.text(), &slots).map_err(|err| anyhow!("render {template} prompt: {err}"))
}
