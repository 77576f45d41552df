//! Per-invocation log of workflow runs.
//!
//! Each model invocation appends one line to `<dir>/lm_log.jsonl`:
//!
//! ```jsonl
//! {"schema_version":1,"ts":1707900000000,"run":3,"step":"evaluate","duration_ms":4200,"outcome":"success","verdict":"aligned",...}
//! {"schema_version":1,"ts":1707900004300,"run":3,"step":"analyze","duration_ms":6100,"outcome":"success",...}
//! ```
//!
//! With full content enabled, prompts and responses are also stored as
//! `<dir>/lm_log/run_NNN_<step>_prompt.txt` and `..._response.txt`.

use crate::workflow::{Step, StepEvent, StepObserver, StepOutcome, Verdict};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Current schema version for lm_log.jsonl entries.
pub const RUN_LOG_SCHEMA_VERSION: u32 = 1;

const PROMPT_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LmOutcome {
    Success,
    Failed,
}

/// A single model invocation log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub schema_version: u32,

    /// Unix timestamp in milliseconds when the entry was written.
    pub ts: u64,

    /// Run number within this log directory (1-indexed).
    pub run: u32,

    pub step: Step,

    pub duration_ms: u64,

    pub outcome: LmOutcome,

    /// Verdict derived from the response (evaluate step only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub verdict: Option<Verdict>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,

    /// First ~500 characters of the prompt.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prompt_preview: Option<String>,
}

impl RunLogEntry {
    fn from_event(run: u32, event: &StepEvent<'_>) -> Self {
        let (outcome, verdict, error) = match &event.outcome {
            StepOutcome::Completed { verdict, .. } => (LmOutcome::Success, *verdict, None),
            StepOutcome::Failed { error } => (LmOutcome::Failed, None, Some(format!("{error:#}"))),
        };
        Self {
            schema_version: RUN_LOG_SCHEMA_VERSION,
            ts: now_epoch_ms(),
            run,
            step: event.step,
            duration_ms: event.duration.as_millis() as u64,
            outcome,
            verdict,
            error,
            prompt_preview: Some(prompt_preview(event.prompt)),
        }
    }
}

/// Observer that appends every invocation of one run to a log directory.
pub struct RunLog {
    dir: PathBuf,
    run: u32,
    store_content: bool,
}

impl RunLog {
    /// Open the log directory and claim the next run number.
    pub fn open(dir: &Path, store_content: bool) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("create log directory {}", dir.display()))?;
        let run = next_run_number(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            run,
            store_content,
        })
    }

    pub fn run(&self) -> u32 {
        self.run
    }

    fn record(&self, event: &StepEvent<'_>) -> Result<()> {
        append_entry(&self.dir, &RunLogEntry::from_event(self.run, event))?;
        if self.store_content {
            if let StepOutcome::Completed { response, .. } = event.outcome {
                store_content(&self.dir, self.run, event.step, event.prompt, response)?;
            }
        }
        Ok(())
    }
}

impl StepObserver for RunLog {
    fn step_finished(&mut self, event: &StepEvent<'_>) {
        // The log never changes the workflow's result.
        if let Err(err) = self.record(event) {
            let error = format!("{err:#}");
            tracing::warn!(%error, step = %event.step, "failed to write run log");
        }
    }
}

fn log_path(dir: &Path) -> PathBuf {
    dir.join("lm_log.jsonl")
}

/// Append an entry to `<dir>/lm_log.jsonl`.
pub fn append_entry(dir: &Path, entry: &RunLogEntry) -> Result<()> {
    let path = log_path(dir);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open lm_log for append: {}", path.display()))?;

    let line = serde_json::to_string(entry).context("serialize lm_log entry")?;
    writeln!(file, "{line}").context("write lm_log entry")?;
    Ok(())
}

/// Store full prompt/response content for one step of a run.
fn store_content(dir: &Path, run: u32, step: Step, prompt: &str, response: &str) -> Result<()> {
    let content_dir = dir.join("lm_log");
    fs::create_dir_all(&content_dir).context("create lm_log content directory")?;

    let prompt_path = content_dir.join(format!("run_{run:03}_{step}_prompt.txt"));
    let response_path = content_dir.join(format!("run_{run:03}_{step}_response.txt"));

    fs::write(&prompt_path, prompt)
        .with_context(|| format!("write prompt: {}", prompt_path.display()))?;
    fs::write(&response_path, response)
        .with_context(|| format!("write response: {}", response_path.display()))?;
    Ok(())
}

/// Load all entries, skipping lines that fail to parse.
pub fn load_entries(dir: &Path) -> Result<Vec<RunLogEntry>> {
    let path = log_path(dir);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(&path).with_context(|| format!("open lm_log: {}", path.display()))?;
    let mut entries = Vec::new();
    for (line_num, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("read line {} of lm_log", line_num + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RunLogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                tracing::warn!(line = line_num + 1, error = %err, "skip corrupt lm_log entry");
            }
        }
    }
    Ok(entries)
}

fn next_run_number(dir: &Path) -> Result<u32> {
    let entries = load_entries(dir)?;
    let max_run = entries.iter().map(|entry| entry.run).max().unwrap_or(0);
    Ok(max_run + 1)
}

fn prompt_preview(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let preview: String = chars.by_ref().take(PROMPT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{preview}...")
    } else {
        preview
    }
}

fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}
