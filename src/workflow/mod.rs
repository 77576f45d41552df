//! Positioning workflow: evaluate alignment, then analyze or reposition.
//!
//! The state machine is `Start -> Evaluate -> {Analyze | Position} -> End`.
//! There is exactly one decision point, taken once, immediately after
//! Evaluate. Both branches end the run after a single model call, so a
//! completed run always performs two model calls and leaves one message.
//!
//! Each run owns its [`WorkflowState`]; steps take the state by value and
//! return the next one. No step is retried. A model failure aborts the run
//! and is returned to the caller with the step name attached as context.

mod state;
mod steps;

pub use state::{Message, PositioningInputs, WorkflowState};

use crate::lm::ModelPort;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Alignment verdict produced by the Evaluate step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Aligned,
    Misaligned,
}

impl Verdict {
    /// Classify an evaluation response.
    ///
    /// A response is aligned iff "YES" appears anywhere in it, ignoring
    /// case. This is a substring test, not a parse of the conclusion line:
    /// "NO, although parts nearly say yes" classifies as aligned.
    pub fn from_response(response: &str) -> Self {
        if response.to_uppercase().contains("YES") {
            Self::Aligned
        } else {
            Self::Misaligned
        }
    }

    pub fn is_aligned(self) -> bool {
        matches!(self, Self::Aligned)
    }
}

/// Steps of the state machine that call the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Evaluate,
    Analyze,
    Position,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Evaluate => write!(f, "evaluate"),
            Self::Analyze => write!(f, "analyze"),
            Self::Position => write!(f, "position"),
        }
    }
}

/// How a single model invocation ended.
#[derive(Debug)]
pub enum StepOutcome<'a> {
    Completed {
        response: &'a str,
        /// Set for the Evaluate step only.
        verdict: Option<Verdict>,
    },
    Failed {
        error: &'a anyhow::Error,
    },
}

/// A finished model invocation, reported to a [`StepObserver`].
#[derive(Debug)]
pub struct StepEvent<'a> {
    pub step: Step,
    pub prompt: &'a str,
    pub duration: Duration,
    pub outcome: StepOutcome<'a>,
}

/// Receives one event per model invocation.
pub trait StepObserver {
    fn step_finished(&mut self, event: &StepEvent<'_>);
}

/// Drives one workflow run against a model port.
pub struct Workflow<'a> {
    model: &'a dyn ModelPort,
    observer: Option<&'a mut dyn StepObserver>,
}

impl<'a> Workflow<'a> {
    pub fn new(model: &'a dyn ModelPort) -> Self {
        Self {
            model,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: &'a mut dyn StepObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run the state machine to completion.
    pub fn run(&mut self, initial: WorkflowState) -> Result<WorkflowState> {
        let (state, verdict) = self.evaluate(initial)?;
        tracing::info!(?verdict, "evaluate complete");
        match verdict {
            Verdict::Aligned => self.analyze(state),
            Verdict::Misaligned => self.position(state),
        }
    }

    /// Invoke the model once for `step`, reporting the outcome.
    fn invoke(&mut self, step: Step, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let result = self.model.invoke(prompt);
        let duration = start.elapsed();
        if let Some(observer) = self.observer.as_deref_mut() {
            let outcome = match &result {
                Ok(response) => StepOutcome::Completed {
                    response,
                    verdict: (step == Step::Evaluate).then(|| Verdict::from_response(response)),
                },
                Err(error) => StepOutcome::Failed { error },
            };
            observer.step_finished(&StepEvent {
                step,
                prompt,
                duration,
                outcome,
            });
        }
        result.with_context(|| format!("{step} step: model invocation failed"))
    }
}

/// Final message and verdict of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub final_message: String,
    pub aligned: bool,
}

impl RunOutcome {
    fn from_state(state: WorkflowState) -> Result<Self> {
        let final_message = state
            .messages()
            .last()
            .map(|message| message.content.clone())
            .ok_or_else(|| anyhow!("workflow finished without a message"))?;
        Ok(Self {
            final_message,
            aligned: state.aligned(),
        })
    }
}

/// Run the positioning workflow for four inputs.
///
/// Inputs are not validated; empty strings are sent to the model as empty
/// slots.
pub fn run_workflow(
    core_value: &str,
    target_audience: &str,
    persona: &str,
    monetization: &str,
    model: &dyn ModelPort,
) -> Result<RunOutcome> {
    let inputs = PositioningInputs {
        core_value: core_value.to_string(),
        target_audience: target_audience.to_string(),
        persona: persona.to_string(),
        monetization: monetization.to_string(),
    };
    run_with_inputs(inputs, model, None)
}

/// Run the workflow for prepared inputs, optionally reporting each step.
pub fn run_with_inputs<'a>(
    inputs: PositioningInputs,
    model: &'a dyn ModelPort,
    observer: Option<&'a mut dyn StepObserver>,
) -> Result<RunOutcome> {
    let mut workflow = Workflow::new(model);
    if let Some(observer) = observer {
        workflow = workflow.with_observer(observer);
    }
    let final_state = workflow.run(WorkflowState::new(inputs))?;
    RunOutcome::from_state(final_state)
}
