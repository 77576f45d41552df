//! Model invocation port and the command-backed implementation.
//!
//! The workflow only knows how to hand a rendered prompt to something that
//! returns text. Provider selection, credentials and timeouts stay with the
//! port implementation the caller chooses.
//!
//! The command port delegates to a user-configured program: the prompt is
//! written to its stdin and its stdout is the response. This works with any
//! tool that accepts text input and produces text output (`llm`,
//! `ollama run <model>`, `claude -p`, custom scripts).

use anyhow::{anyhow, Context, Result};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Instant;

/// Send a fully rendered prompt to a language model and return its text.
pub trait ModelPort {
    fn invoke(&self, prompt: &str) -> Result<String>;
}

impl<F> ModelPort for F
where
    F: Fn(&str) -> Result<String>,
{
    fn invoke(&self, prompt: &str) -> Result<String> {
        self(prompt)
    }
}

/// Model port backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandModel {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandModel {
    /// Parse a command line (shell-words syntax) and resolve its program.
    pub fn new(command: &str) -> Result<Self> {
        let mut args =
            shell_words::split(command).with_context(|| format!("parse LM command: {command}"))?;
        if args.is_empty() {
            return Err(anyhow!("LM command is empty"));
        }
        let program_name = args.remove(0);
        let program = which::which(&program_name)
            .with_context(|| format!("LM command not found: {program_name}"))?;
        Ok(Self { program, args })
    }
}

impl ModelPort for CommandModel {
    fn invoke(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn LM command: {}", self.program.display()))?;

        let mut stdin = child.stdin.take().context("LM stdin was not captured")?;

        // stdout and stderr drain while the prompt is still being written.
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(prompt.as_bytes()));
            let output = child.wait_with_output();
            (output, writer.join())
        });
        let output = output.context("wait for LM command")?;
        let elapsed_ms = start.elapsed().as_millis();

        tracing::info!(
            elapsed_ms,
            prompt_bytes = prompt.len(),
            response_bytes = output.stdout.len(),
            "lm invoke complete"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "LM command failed with status {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        match written {
            Ok(Ok(())) => {}
            // The command answered without reading all of its input.
            Ok(Err(err)) if err.kind() == ErrorKind::BrokenPipe => {
                tracing::debug!("LM command closed stdin before the prompt was written");
            }
            Ok(Err(err)) => return Err(err).context("write prompt to LM stdin"),
            Err(_) => return Err(anyhow!("LM stdin writer panicked")),
        }

        let text = String::from_utf8(output.stdout).context("decode LM stdout as UTF-8")?;
        non_empty_response(text)
    }
}

/// Reject whitespace-only responses; an empty answer is an invocation failure.
pub fn non_empty_response(text: String) -> Result<String> {
    if text.trim().is_empty() {
        return Err(anyhow!("LM returned an empty response"));
    }
    Ok(text)
}
