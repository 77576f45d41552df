//! The three model-calling steps.
//!
//! Analyze and Position each guard on the verdict so that, if called on the
//! wrong branch, they return the state untouched without calling the model.

use super::{Message, Step, Verdict, Workflow, WorkflowState};
use crate::templates::{render_template, Template};
use anyhow::Result;

impl Workflow<'_> {
    /// Judge alignment. Sets `aligned`; the response text itself is dropped.
    pub fn evaluate(&mut self, state: WorkflowState) -> Result<(WorkflowState, Verdict)> {
        tracing::info!(step = %Step::Evaluate, "running step");
        let prompt = render_template(Template::Evaluate, state.inputs())?;
        let response = self.invoke(Step::Evaluate, &prompt)?;
        let verdict = Verdict::from_response(&response);
        tracing::debug!(response_bytes = response.len(), "evaluation response discarded");
        Ok((state.with_verdict(verdict), verdict))
    }

    /// Explain an aligned positioning and refine it.
    pub fn analyze(&mut self, state: WorkflowState) -> Result<WorkflowState> {
        if !state.aligned() {
            tracing::debug!("analyze skipped: positioning is misaligned");
            return Ok(state);
        }
        self.respond(Step::Analyze, Template::Analysis, state)
    }

    /// Name the conflicts in a misaligned positioning and suggest alternatives.
    pub fn position(&mut self, state: WorkflowState) -> Result<WorkflowState> {
        if state.aligned() {
            tracing::debug!("position skipped: positioning is aligned");
            return Ok(state);
        }
        self.respond(Step::Position, Template::Positioning, state)
    }

    fn respond(
        &mut self,
        step: Step,
        template: Template,
        state: WorkflowState,
    ) -> Result<WorkflowState> {
        tracing::info!(step = %step, "running step");
        let prompt = render_template(template, state.inputs())?;
        let response = self.invoke(step, &prompt)?;
        Ok(state.with_message(Message::assistant(response)))
    }
}
