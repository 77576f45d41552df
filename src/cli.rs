//! CLI argument parsing for the positioning check.
//!
//! The CLI only gathers inputs and picks a model port; all sequencing lives
//! in the workflow module.
use crate::config::Provider;
use crate::templates::Template;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "posm",
    version,
    about = "Check whether a business positioning is coherent",
    after_help = "Commands:\n  check    Evaluate alignment, then analyze or suggest alternatives\n  prompt   Print a rendered prompt without calling a model\n\nExamples:\n  posm check --core-value \"...\" --target-audience \"...\" --persona \"...\" --monetization \"...\"\n  posm check --input positioning.json --lm \"ollama run llama3\" --json\n  posm check --input positioning.json --provider http\n  posm prompt evaluate --input positioning.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

impl RootArgs {
    pub fn verbose(&self) -> bool {
        match &self.command {
            Command::Check(args) => args.verbose,
            Command::Prompt(_) => false,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Check(CheckArgs),
    Prompt(PromptArgs),
}

/// The four positioning inputs, from flags and/or a JSON file.
#[derive(Args, Debug, Default)]
pub struct InputArgs {
    /// JSON file with core_value, target_audience, persona, monetization
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Primary value or benefit the business offers
    #[arg(long, value_name = "TEXT")]
    pub core_value: Option<String>,

    /// Group of people the business serves
    #[arg(long, value_name = "TEXT")]
    pub target_audience: Option<String>,

    /// Public-facing brand identity and tone
    #[arg(long, value_name = "TEXT")]
    pub persona: Option<String>,

    /// How the business generates revenue
    #[arg(long, value_name = "TEXT")]
    pub monetization: Option<String>,
}

/// Check command inputs.
#[derive(Parser, Debug)]
#[command(about = "Evaluate positioning alignment and generate follow-up guidance")]
pub struct CheckArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// LM command; receives the prompt on stdin (overrides config and POSM_LM_COMMAND)
    #[arg(long, value_name = "CMD")]
    pub lm: Option<String>,

    /// Model provider (defaults to the config file's provider)
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Config file (defaults to the user config directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,

    /// Append a JSONL record per model invocation to DIR/lm_log.jsonl
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Debug logging; with --log-dir also store full prompts and responses
    #[arg(long)]
    pub verbose: bool,
}

/// Prompt command inputs.
#[derive(Parser, Debug)]
#[command(about = "Render a prompt template without calling a model")]
pub struct PromptArgs {
    /// Template to render
    #[arg(value_enum)]
    pub template: Template,

    #[command(flatten)]
    pub inputs: InputArgs,
}
