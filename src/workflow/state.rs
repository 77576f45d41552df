//! The value threaded through every workflow step.

use super::Verdict;
use serde::{Deserialize, Serialize};

/// The four positioning inputs, fixed for the lifetime of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PositioningInputs {
    pub core_value: String,
    pub target_audience: String,
    pub persona: String,
    pub monetization: String,
}

impl PositioningInputs {
    /// Names of inputs that are empty after trimming.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("core_value", &self.core_value),
            ("target_audience", &self.target_audience),
            ("persona", &self.persona),
            ("monetization", &self.monetization),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Workflow state for a single run.
///
/// Fields are private: inputs are read-only after construction, `aligned`
/// is only set through [`WorkflowState::with_verdict`], and messages are only
/// ever appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    inputs: PositioningInputs,
    messages: Vec<Message>,
    aligned: bool,
}

impl WorkflowState {
    pub fn new(inputs: PositioningInputs) -> Self {
        Self {
            inputs,
            messages: Vec::new(),
            aligned: false,
        }
    }

    pub fn inputs(&self) -> &PositioningInputs {
        &self.inputs
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn aligned(&self) -> bool {
        self.aligned
    }

    pub(super) fn with_verdict(mut self, verdict: Verdict) -> Self {
        self.aligned = verdict.is_aligned();
        self
    }

    pub(super) fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}
