//! Backend adapters
//!
//! One adapter per external tool. An adapter only *plans* an invocation:
//! the argument vector, how to read the exit status and what shape the
//! output has. Running the process and interpreting the output is shared
//! (see [`Invocation::interpret`]), so adapters stay declarative.

mod cocoa;
mod gtk;
mod kdialog;
mod textmode;

pub use cocoa::CocoaDialog;
pub use gtk::{Yad, Zenity};
pub use kdialog::KDialog;
pub use textmode::TextDialog;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;

use crate::command::CommandLine;
use crate::error::{DialogError, Result};
use crate::parse::{self, DateOrder};
use crate::progress::ProgressHandle;
use crate::request::{DialogKind, DialogRequest, DialogResult, Table};
use crate::runner::{ProcessRunner, RunOutput};

/// The supported external tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Kdialog,
    Yad,
    Zenity,
    Dialog,
    CocoaDialog,
}

impl BackendKind {
    pub const ALL: [BackendKind; 5] = [
        BackendKind::Kdialog,
        BackendKind::Yad,
        BackendKind::Zenity,
        BackendKind::Dialog,
        BackendKind::CocoaDialog,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Kdialog => "kdialog",
            BackendKind::Yad => "yad",
            BackendKind::Zenity => "zenity",
            BackendKind::Dialog => "dialog",
            BackendKind::CocoaDialog => "cocoadialog",
        }
    }

    /// Executable name looked up on the search path
    pub fn binary(&self) -> &'static str {
        match self {
            BackendKind::CocoaDialog => "cocoaDialog",
            other => other.name(),
        }
    }

    /// Text-mode tools draw on the terminal instead of a display
    pub fn needs_terminal(&self) -> bool {
        matches!(self, BackendKind::Dialog)
    }

    /// Build the adapter for this tool
    pub fn adapter(self, program: PathBuf) -> Box<dyn Backend> {
        match self {
            BackendKind::Kdialog => Box::new(KDialog::new(program)),
            BackendKind::Yad => Box::new(Yad::new(program)),
            BackendKind::Zenity => Box::new(Zenity::new(program)),
            BackendKind::Dialog => Box::new(TextDialog::new(program)),
            BackendKind::CocoaDialog => Box::new(CocoaDialog::new(program)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = DialogError;

    fn from_str(s: &str) -> Result<Self> {
        BackendKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DialogError::invalid("backend", format!("unknown backend '{s}'")))
    }
}

/// A dialog tool adapter
pub trait Backend: Send + Sync + fmt::Debug {
    fn kind(&self) -> BackendKind;

    /// Resolved path of the executable
    fn program(&self) -> &Path;

    /// Translate a request into this tool's command line
    fn plan(&self, request: &DialogRequest) -> Result<Invocation>;

    /// Open a live progress dialog. Only tools with a remote-controllable
    /// progress window implement this.
    fn start_progress(&self, _runner: &dyn ProcessRunner, _request: &DialogRequest) -> Result<Box<dyn ProgressHandle>> {
        Err(unsupported(self.kind(), DialogKind::Progress))
    }
}

pub(crate) fn unsupported(backend: BackendKind, kind: DialogKind) -> DialogError {
    DialogError::UnsupportedDialogKind {
        backend: backend.name(),
        kind,
    }
}

/// Exit statuses a tool uses, hard-coded per adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes {
    pub ok: &'static [i32],
    /// "No" on a question; treated as cancel for every other kind
    pub declined: &'static [i32],
    pub cancelled: &'static [i32],
}

/// How to tell accepted, declined and cancelled apart
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Decided by exit status
    Exit(ExitCodes),
    /// Exit status, plus an extra cancel button that prints its label and exits declined
    ExitWithExtra { codes: ExitCodes, label: &'static str },
    /// Exit status, and an empty answer also means cancelled
    NonEmpty(ExitCodes),
    /// The first output line is the pressed button's number; the rest is the answer
    Button { accept: &'static str, decline: Option<&'static str> },
}

/// What the answer looks like once the gate let it through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Closing the box is the whole answer
    Accepted,
    /// Yes/no; `decline_cancels` when the "no" button is a Cancel button
    Confirm { decline_cancels: bool },
    Text,
    List { separators: &'static [char] },
    /// Printed tags map back to entries (`tags[i]` belongs to entry `i`)
    Choice {
        tags: Vec<String>,
        separators: &'static [char],
        multi: bool,
    },
    /// One on/off flag per entry
    Flags,
    Date(DateOrder),
    Integer,
    Color,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Verdict {
    Accepted(String),
    Declined,
    Cancelled,
}

/// A parsed answer; `chosen` carries entry ids for selection kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub result: DialogResult,
    pub chosen: Option<Vec<String>>,
}

impl Answer {
    fn plain(result: DialogResult) -> Self {
        Self { result, chosen: None }
    }
}

/// A planned run of a dialog tool
#[derive(Debug)]
pub struct Invocation {
    pub args: Vec<String>,
    pub gate: Gate,
    pub outcome: Outcome,
    /// Temp file referenced by the arguments; removed when the invocation drops
    scratch: Option<NamedTempFile>,
}

impl Invocation {
    pub fn new(cmd: CommandLine, gate: Gate, outcome: Outcome) -> Self {
        Self {
            args: cmd.into_args(),
            gate,
            outcome,
            scratch: None,
        }
    }

    pub(crate) fn with_scratch(mut self, file: NamedTempFile) -> Self {
        self.scratch = Some(file);
        self
    }

    pub fn scratch_path(&self) -> Option<&Path> {
        self.scratch.as_ref().map(|f| f.path())
    }

    /// Turn a finished run into an answer for `request`
    pub fn interpret(&self, request: &DialogRequest, program: &Path, output: RunOutput) -> Result<Answer> {
        let kind = request.kind;
        let payload = match self.judge(program, output)? {
            Verdict::Accepted(payload) => payload,
            Verdict::Declined => {
                let result = match self.outcome {
                    Outcome::Confirm { decline_cancels: false } => DialogResult::Boolean(false),
                    _ => DialogResult::Cancelled,
                };
                return Ok(Answer::plain(result));
            }
            Verdict::Cancelled => return Ok(Answer::plain(DialogResult::Cancelled)),
        };

        let answer = match &self.outcome {
            Outcome::Accepted | Outcome::Confirm { .. } => Answer::plain(DialogResult::Boolean(true)),
            Outcome::Text => Answer::plain(DialogResult::Text(payload)),
            Outcome::List { separators } => {
                Answer::plain(DialogResult::List(parse::split_values(&payload, separators)))
            }
            Outcome::Choice { tags, separators, multi } => {
                let tokens = parse::split_values(&payload, separators);
                if !multi && tokens.len() > 1 {
                    return Err(DialogError::parse(kind, payload));
                }
                let ids: Vec<String> = request.entries.iter().map(|e| e.id.clone()).collect();
                let chosen = parse::map_tags(&tokens, tags, &ids, kind)?;
                choice_answer(request, chosen, *multi)
            }
            Outcome::Flags => {
                let ids: Vec<String> = request.entries.iter().map(|e| e.id.clone()).collect();
                let chosen = parse::map_flags(&payload, &ids, kind)?;
                choice_answer(request, chosen, true)
            }
            Outcome::Date(order) => Answer::plain(DialogResult::Date(parse::parse_date(&payload, *order)?)),
            Outcome::Integer => Answer::plain(DialogResult::Integer(parse::parse_integer(&payload, kind)?)),
            Outcome::Color => Answer::plain(DialogResult::Color(parse::parse_color(&payload)?)),
        };
        Ok(answer)
    }

    fn judge(&self, program: &Path, output: RunOutput) -> Result<Verdict> {
        let failure = |output: &RunOutput| DialogError::ExternalProcessFailure {
            program: program.display().to_string(),
            reason: match output.code {
                Some(code) if output.stderr.is_empty() => format!("unexpected exit status {code}"),
                Some(code) => format!("exit status {code}: {}", output.stderr),
                None => "terminated by signal".to_string(),
            },
        };
        let by_code = |codes: &ExitCodes, output: RunOutput| -> Result<Verdict> {
            let code = output.code.ok_or_else(|| failure(&output))?;
            if codes.ok.contains(&code) {
                Ok(Verdict::Accepted(output.stdout))
            } else if codes.declined.contains(&code) {
                Ok(Verdict::Declined)
            } else if codes.cancelled.contains(&code) {
                Ok(Verdict::Cancelled)
            } else {
                Err(failure(&output))
            }
        };

        match &self.gate {
            Gate::Exit(codes) => by_code(codes, output),
            Gate::ExitWithExtra { codes, label } => {
                let extra = output.stdout.trim() == *label;
                match by_code(codes, output)? {
                    Verdict::Declined if extra => Ok(Verdict::Cancelled),
                    verdict => Ok(verdict),
                }
            }
            Gate::NonEmpty(codes) => match by_code(codes, output)? {
                Verdict::Accepted(s) if s.trim().is_empty() => Ok(Verdict::Cancelled),
                verdict => Ok(verdict),
            },
            Gate::Button { accept, decline } => {
                if output.code != Some(0) && output.stdout.is_empty() {
                    return match output.code {
                        Some(_) => Ok(Verdict::Cancelled),
                        None => Err(failure(&output)),
                    };
                }
                let (button, rest) = output
                    .stdout
                    .split_once('\n')
                    .unwrap_or((output.stdout.as_str(), ""));
                let button = button.trim();
                if button == *accept {
                    Ok(Verdict::Accepted(rest.to_string()))
                } else if Some(button) == *decline {
                    Ok(Verdict::Declined)
                } else {
                    Ok(Verdict::Cancelled)
                }
            }
        }
    }
}

fn choice_answer(request: &DialogRequest, chosen: Vec<String>, multi: bool) -> Answer {
    let labels: Vec<String> = chosen
        .iter()
        .filter_map(|id| request.entries.iter().find(|e| e.id == *id))
        .map(|e| e.label.clone())
        .collect();
    let result = if multi {
        DialogResult::List(labels)
    } else {
        match labels.into_iter().next() {
            Some(label) => DialogResult::Text(label),
            None => DialogResult::Cancelled,
        }
    };
    Answer {
        result,
        chosen: Some(chosen),
    }
}

/// Write `text` to a temp file for tools that only display files
pub(crate) fn scratch_file(text: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().prefix("dialog-shim").tempfile()?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    Ok(file)
}

pub(crate) fn scratch_arg(file: &NamedTempFile) -> String {
    file.path().to_string_lossy().into_owned()
}

/// Start directory for file pickers: the `dir` option, or the home directory
pub(crate) fn start_dir(dir: Option<&str>) -> String {
    match dir {
        Some(d) => d.to_string(),
        None => dirs::home_dir()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string()),
    }
}

/// Tags are the positions as decimal strings
pub(crate) fn index_tags(request: &DialogRequest) -> Vec<String> {
    (0..request.entries.len()).map(|i| i.to_string()).collect()
}

/// Tags are the labels themselves; labels must then be unique
pub(crate) fn label_tags(request: &DialogRequest) -> Result<Vec<String>> {
    let mut tags: Vec<String> = Vec::with_capacity(request.entries.len());
    for entry in &request.entries {
        if tags.contains(&entry.label) {
            return Err(DialogError::invalid(
                "choices",
                format!("label '{}' appears twice; this dialog answers with labels", entry.label),
            ));
        }
        tags.push(entry.label.clone());
    }
    Ok(tags)
}

pub(crate) fn require_table(request: &DialogRequest) -> Result<&Table> {
    match &request.table {
        Some(table) if !table.rows.is_empty() => Ok(table),
        _ => Err(DialogError::invalid("rows", "nothing to choose from")),
    }
}

pub(crate) fn require_entries(request: &DialogRequest) -> Result<()> {
    if request.entries.is_empty() {
        return Err(DialogError::invalid("choices", "nothing to choose from"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choices::Choices;

    const CODES: ExitCodes = ExitCodes {
        ok: &[0],
        declined: &[1],
        cancelled: &[2],
    };

    fn invocation(gate: Gate, outcome: Outcome) -> Invocation {
        Invocation::new(CommandLine::new(), gate, outcome)
    }

    fn request(kind: DialogKind) -> DialogRequest {
        DialogRequest::new(kind).entries(Choices::new(["Sandwich", "Soup", "Salad"]).entries().to_vec())
    }

    fn interpret(inv: &Invocation, kind: DialogKind, stdout: &str, code: i32) -> Result<DialogResult> {
        inv.interpret(&request(kind), Path::new("tool"), RunOutput::new(stdout, code))
            .map(|a| a.result)
    }

    #[test]
    fn test_cancel_code_ignores_stdout() {
        for outcome in [Outcome::Text, Outcome::Integer, Outcome::Color, Outcome::Confirm { decline_cancels: false }] {
            let inv = invocation(Gate::Exit(CODES), outcome);
            assert_eq!(interpret(&inv, DialogKind::Input, "#ffffff", 2).unwrap(), DialogResult::Cancelled);
        }
    }

    #[test]
    fn test_confirm_declined_is_false() {
        let inv = invocation(Gate::Exit(CODES), Outcome::Confirm { decline_cancels: false });
        assert_eq!(interpret(&inv, DialogKind::Confirm, "", 0).unwrap(), DialogResult::Boolean(true));
        assert_eq!(interpret(&inv, DialogKind::Confirm, "", 1).unwrap(), DialogResult::Boolean(false));

        let inv = invocation(Gate::Exit(CODES), Outcome::Confirm { decline_cancels: true });
        assert_eq!(interpret(&inv, DialogKind::Confirm, "", 1).unwrap(), DialogResult::Cancelled);
    }

    #[test]
    fn test_unknown_exit_code_is_failure() {
        let inv = invocation(Gate::Exit(CODES), Outcome::Text);
        let err = interpret(&inv, DialogKind::Input, "", 139).unwrap_err();
        assert!(matches!(err, DialogError::ExternalProcessFailure { .. }));
    }

    #[test]
    fn test_choice_indices_in_output_order() {
        let inv = invocation(
            Gate::Exit(CODES),
            Outcome::Choice {
                tags: vec!["0".into(), "1".into(), "2".into()],
                separators: &['\n'],
                multi: true,
            },
        );
        let answer = inv
            .interpret(&request(DialogKind::MultiSelect), Path::new("tool"), RunOutput::new("0\n2\n", 0))
            .unwrap();
        assert_eq!(answer.result, DialogResult::List(vec!["Sandwich".into(), "Salad".into()]));
        assert_eq!(answer.chosen.unwrap(), vec!["choice_000", "choice_002"]);

        let reversed = interpret(&inv, DialogKind::MultiSelect, "2\n0", 0).unwrap();
        assert_eq!(reversed, DialogResult::List(vec!["Salad".into(), "Sandwich".into()]));
    }

    #[test]
    fn test_single_choice_needs_one_token() {
        let inv = invocation(
            Gate::Exit(CODES),
            Outcome::Choice {
                tags: vec!["0".into(), "1".into(), "2".into()],
                separators: &['\n'],
                multi: false,
            },
        );
        assert_eq!(interpret(&inv, DialogKind::SingleSelect, "1", 0).unwrap(), DialogResult::Text("Soup".into()));
        assert!(interpret(&inv, DialogKind::SingleSelect, "0\n1", 0).is_err());
    }

    #[test]
    fn test_extra_cancel_button() {
        let inv = invocation(
            Gate::ExitWithExtra {
                codes: CODES,
                label: "Cancel",
            },
            Outcome::Confirm { decline_cancels: false },
        );
        assert_eq!(interpret(&inv, DialogKind::Confirm, "Cancel", 1).unwrap(), DialogResult::Cancelled);
        assert_eq!(interpret(&inv, DialogKind::Confirm, "", 1).unwrap(), DialogResult::Boolean(false));
    }

    #[test]
    fn test_button_gate() {
        let inv = invocation(
            Gate::Button {
                accept: "1",
                decline: None,
            },
            Outcome::Text,
        );
        assert_eq!(interpret(&inv, DialogKind::Input, "1\nhello", 0).unwrap(), DialogResult::Text("hello".into()));
        assert_eq!(interpret(&inv, DialogKind::Input, "2\nhello", 0).unwrap(), DialogResult::Cancelled);
    }

    #[test]
    fn test_non_empty_gate() {
        let inv = invocation(Gate::NonEmpty(CODES), Outcome::Text);
        assert_eq!(interpret(&inv, DialogKind::FilePick, "", 0).unwrap(), DialogResult::Cancelled);
    }

    #[test]
    fn test_calendar_parse_failure_surfaces() {
        let inv = invocation(Gate::Exit(CODES), Outcome::Date(DateOrder::YearMonthDay));
        let err = interpret(&inv, DialogKind::Calendar, "not-a-date", 0).unwrap_err();
        assert!(matches!(err, DialogError::ParseFailure { .. }));
    }

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("CocoaDialog".parse::<BackendKind>().unwrap(), BackendKind::CocoaDialog);
        assert_eq!("yad".parse::<BackendKind>().unwrap(), BackendKind::Yad);
        assert!("xmessage".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_scratch_file_removed_on_drop() {
        let file = scratch_file("Hello, world!\nFine day, isn't it?").unwrap();
        let path = file.path().to_path_buf();
        let inv = Invocation::new(CommandLine::new(), Gate::Exit(CODES), Outcome::Accepted).with_scratch(file);
        assert_eq!(std::fs::read_to_string(inv.scratch_path().unwrap()).unwrap(), "Hello, world!\nFine day, isn't it?");
        drop(inv);
        assert!(!path.exists());
    }
}
