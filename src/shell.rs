//! Command execution against a [`Session`].
//!
//! Two drivers share [`Shell::execute`]:
//!
//! - [`Shell::run_script`] applies a list of steps in order and stops at the
//!   first failure, reporting the step number and its text.
//! - [`Shell::run_interactive`] reads one command per line, reports errors
//!   and keeps going. The session survives every failed command.
//!
//! User-visible results are written to the `out` stream given to each call,
//! so tests can capture them.

use crate::command::{Command, CommandError, help_text, parse_line};
use crate::config::DefaultsConfig;
use crate::imaging::{ImageBackend, RustBackend};
use crate::output;
use crate::session::{Session, SessionError};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const PROMPT: &str = "imgconv> ";

#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to save download to {}: {source}", path.display())]
    Save { path: PathBuf, source: io::Error },
    #[error("Artifact numbers start at 1")]
    ZeroIndex,
    #[error("Step {number} `{text}` failed: {source}")]
    Step {
        number: usize,
        text: String,
        source: Box<ShellError>,
    },
}

/// Whether the driver should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<B: ImageBackend = RustBackend> {
    session: Session<B>,
    defaults: DefaultsConfig,
}

impl<B: ImageBackend> Shell<B> {
    pub fn new(session: Session<B>, defaults: DefaultsConfig) -> Self {
        Self { session, defaults }
    }

    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    pub fn into_session(self) -> Session<B> {
        self.session
    }

    /// Run one parsed command, writing its result to `out`.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Flow, ShellError> {
        let lines = match command {
            Command::Apply(transform) => {
                let artifact = self.session.apply(&transform)?;
                output::format_artifact(&artifact)
            }
            Command::Select(source) => {
                self.session.select(source);
                vec![format!("Transforms start from: {}", source.label())]
            }
            Command::Load(path) => {
                let summary = self.session.upload_file(&path)?;
                output::format_upload(&summary)
            }
            Command::Status => output::format_status(&self.session.summary()?),
            Command::History => output::format_history(self.session.artifacts()),
            Command::Download { dest, index } => {
                let download = match index {
                    Some(0) => return Err(ShellError::ZeroIndex),
                    Some(n) => self.session.download(n - 1)?,
                    None => self.session.download_latest()?,
                };
                let target = download_target(&dest, &download.file_name);
                fs::write(&target, &download.bytes).map_err(|source| ShellError::Save {
                    path: target.clone(),
                    source,
                })?;
                output::format_download(&download, &target)
            }
            Command::Help => help_text().lines().map(str::to_string).collect(),
            Command::Quit => return Ok(Flow::Quit),
        };
        output::write_lines(out, &lines)?;
        Ok(Flow::Continue)
    }

    /// Parse and run one line. Blank lines and comments do nothing.
    pub fn run_line(&mut self, line: &str, out: &mut impl Write) -> Result<Flow, ShellError> {
        match parse_line(line, &self.defaults)? {
            Some(command) => self.execute(command, out),
            None => Ok(Flow::Continue),
        }
    }

    /// Run `steps` in order. The first failing step aborts the run.
    pub fn run_script<S: AsRef<str>>(
        &mut self,
        steps: &[S],
        out: &mut impl Write,
    ) -> Result<(), ShellError> {
        for (i, step) in steps.iter().enumerate() {
            let text = step.as_ref();
            tracing::debug!(step = i + 1, text, "running step");
            match self.run_line(text, out) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => {
                    return Err(ShellError::Step {
                        number: i + 1,
                        text: text.trim().to_string(),
                        source: Box::new(e),
                    });
                }
            }
        }
        Ok(())
    }

    /// Prompt, read and execute until `quit` or end of input. Errors go to
    /// `err` and the loop continues.
    pub fn run_interactive(
        &mut self,
        input: impl BufRead,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> Result<(), ShellError> {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            match self.run_line(&line, out) {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e) => writeln!(err, "Error: {e}")?,
            }
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }
}

/// A directory destination receives the artifact under its own name.
fn download_target(dest: &Path, file_name: &str) -> PathBuf {
    if dest.is_dir() {
        dest.join(file_name)
    } else {
        dest.to_path_buf()
    }
}
