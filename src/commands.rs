//! Command handlers wiring CLI inputs to the workflow.
use crate::cli::{CheckArgs, InputArgs, PromptArgs};
use crate::config::{self, PosmConfig, Provider};
use crate::http_model::HttpModel;
use crate::lm::{CommandModel, ModelPort};
use crate::output::format_outcome;
use crate::run_log::RunLog;
use crate::templates::render_template;
use crate::workflow::{run_with_inputs, run_workflow, PositioningInputs};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

pub fn run_check(args: &CheckArgs) -> Result<()> {
    let inputs = resolve_inputs(&args.inputs)?;
    let missing = inputs.missing_fields();
    if !missing.is_empty() {
        return Err(anyhow!("missing required input(s): {}", missing.join(", ")));
    }

    let config = config::resolve_config(args.config.as_deref())?;
    let model = build_model(args, &config)?;

    let outcome = match args.log_dir.as_deref() {
        Some(dir) => {
            let mut log = RunLog::open(dir, args.verbose)?;
            tracing::info!(run = log.run(), dir = %dir.display(), "logging model invocations");
            run_with_inputs(inputs, model.as_ref(), Some(&mut log))?
        }
        None => run_workflow(
            &inputs.core_value,
            &inputs.target_audience,
            &inputs.persona,
            &inputs.monetization,
            model.as_ref(),
        )?,
    };

    println!("{}", format_outcome(&outcome, args.json)?);
    Ok(())
}

pub fn run_prompt(args: &PromptArgs) -> Result<()> {
    let inputs = resolve_inputs(&args.inputs)?;
    println!("{}", render_template(args.template, &inputs)?);
    Ok(())
}

fn build_model(args: &CheckArgs, config: &PosmConfig) -> Result<Box<dyn ModelPort>> {
    let provider = args.provider.unwrap_or(config.provider);
    match provider {
        Provider::Command => {
            let command = config::resolve_lm_command(args.lm.as_deref(), config);
            tracing::debug!(%command, "using command model");
            Ok(Box::new(CommandModel::new(&command)?))
        }
        Provider::Http => {
            if args.lm.is_some() {
                return Err(anyhow!("--lm only applies to the command provider"));
            }
            tracing::debug!(model = %config.http.model, "using http model");
            Ok(Box::new(HttpModel::from_config(&config.http)?))
        }
    }
}

/// Merge the optional input file with flags; flags win.
fn resolve_inputs(args: &InputArgs) -> Result<PositioningInputs> {
    let mut inputs = match args.input.as_deref() {
        Some(path) => load_inputs(path)?,
        None => PositioningInputs::default(),
    };
    let overrides = [
        (&mut inputs.core_value, &args.core_value),
        (&mut inputs.target_audience, &args.target_audience),
        (&mut inputs.persona, &args.persona),
        (&mut inputs.monetization, &args.monetization),
    ];
    for (field, value) in overrides {
        if let Some(value) = value {
            field.clone_from(value);
        }
    }
    Ok(inputs)
}

fn load_inputs(path: &Path) -> Result<PositioningInputs> {
    let bytes = fs::read(path).with_context(|| format!("read input {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse input JSON {}", path.display()))
}
