//! Process execution
//!
//! Dialog binaries are always spawned with a discrete argument vector, never
//! through a shell. [`ProcessRunner`] abstracts the spawn so adapters can be
//! driven by [`ScriptedRunner`] in tests.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;
use tracing::debug;

use crate::error::{DialogError, Result};

/// What a dialog process left behind
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOutput {
    /// Standard output with one trailing newline removed
    pub stdout: String,
    pub stderr: String,
    /// Exit code; `None` if the process died from a signal
    pub code: Option<i32>,
}

impl RunOutput {
    pub fn new(stdout: impl Into<String>, code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            code: Some(code),
        }
    }
}

pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args` and block until it exits.
    fn run(&self, program: &Path, args: &[String]) -> Result<RunOutput>;
}

/// Spawns real processes via [`std::process::Command`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String]) -> Result<RunOutput> {
        debug!("Running: {} {:?}", program.display(), args);

        // stdin stays attached so curses-based dialogs can read the keyboard
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_failure(program, e))?;

        let output = child
            .wait_with_output()
            .map_err(|e| spawn_failure(program, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = RunOutput {
            stdout: chomp(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            code: output.status.code(),
        };
        debug!("{} exited with {:?}", program.display(), result.code);
        Ok(result)
    }
}

fn spawn_failure(program: &Path, e: io::Error) -> DialogError {
    let reason = match e.kind() {
        io::ErrorKind::NotFound => "binary not found".to_string(),
        _ => e.to_string(),
    };
    DialogError::ExternalProcessFailure {
        program: program.display().to_string(),
        reason,
    }
}

/// Strip a single trailing `\n` or `\r\n`
pub fn chomp(s: &str) -> &str {
    s.strip_suffix("\r\n")
        .or_else(|| s.strip_suffix('\n'))
        .unwrap_or(s)
}

/// Replays canned outputs and records every call. For tests and dry runs.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    replies: Mutex<VecDeque<RunOutput>>,
    calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next reply
    pub fn reply(self, stdout: &str, code: i32) -> Self {
        self.push(RunOutput::new(stdout, code));
        self
    }

    pub fn push(&self, output: RunOutput) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(output);
    }

    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Arguments of the most recent call
    pub fn last_args(&self) -> Option<Vec<String>> {
        self.calls().pop().map(|(_, args)| args)
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, program: &Path, args: &[String]) -> Result<RunOutput> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((program.to_path_buf(), args.to_vec()));
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| DialogError::ExternalProcessFailure {
                program: program.display().to_string(),
                reason: "no scripted reply left".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chomp() {
        assert_eq!(chomp("hello\n"), "hello");
        assert_eq!(chomp("hello\r\n"), "hello");
        assert_eq!(chomp("0\n2\n\n"), "0\n2\n");
        assert_eq!(chomp("plain"), "plain");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_passes_arguments_verbatim() {
        let runner = SystemRunner;
        let args = vec!["a b".to_string(), "$(rm -rf /)".to_string(), "'q'".to_string()];
        let output = runner.run(Path::new("printf"), &[vec!["%s|%s|%s\n".to_string()], args].concat())
            .unwrap();
        assert_eq!(output.code, Some(0));
        assert_eq!(output.stdout, "a b|$(rm -rf /)|'q'");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_code() {
        let output = SystemRunner.run(Path::new("false"), &[]).unwrap();
        assert_eq!(output.code, Some(1));
    }

    #[test]
    fn test_missing_binary_is_process_failure() {
        let err = SystemRunner
            .run(Path::new("/nonexistent/dialog-shim-test-binary"), &[])
            .unwrap_err();
        assert!(matches!(err, DialogError::ExternalProcessFailure { .. }));
    }

    #[test]
    fn test_scripted_runner_records_calls() {
        let runner = ScriptedRunner::new().reply("ok", 0);
        let out = runner
            .run(Path::new("zenity"), &["--info".to_string()])
            .unwrap();
        assert_eq!(out.stdout, "ok");
        assert_eq!(runner.last_args().unwrap(), vec!["--info"]);
        assert!(runner.run(Path::new("zenity"), &[]).is_err());
    }
}
