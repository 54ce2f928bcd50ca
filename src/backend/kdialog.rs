//! KDE `kdialog` adapter
//!
//! Exit status: 0 for OK/Yes/Continue, 1 for No (or Cancel on two-button
//! boxes), 2 for Cancel on three-button boxes. Multi-value answers come back
//! one per line (`--separate-output`).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::{
    index_tags, label_tags, require_entries, scratch_arg, scratch_file, start_dir, unsupported, Backend,
    BackendKind, ExitCodes, Gate, Invocation, Outcome,
};
use crate::command::{CommandLine, FlagStyle, FlagTable};
use crate::error::{DialogError, Result};
use crate::parse::DateOrder;
use crate::progress::{DbusConnector, KdeProgress, ProgressConnector, ProgressHandle};
use crate::request::{
    ButtonSet, Buttons, DialogKind, DialogRequest, FileAction, FilePick, FileTarget, MessageStyle, SliderRange,
};
use crate::runner::ProcessRunner;

const EXIT: ExitCodes = ExitCodes {
    ok: &[0],
    declined: &[1],
    cancelled: &[2],
};

const GENERAL: FlagTable = &[("title", "--title")];

const LINES: &[char] = &['\n'];

#[derive(Debug, Clone)]
pub struct KDialog {
    program: PathBuf,
    connector: Arc<dyn ProgressConnector>,
}

impl KDialog {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            connector: Arc::new(DbusConnector),
        }
    }

    /// Reach progress windows through `connector` instead of the session bus
    pub fn with_connector(mut self, connector: Arc<dyn ProgressConnector>) -> Self {
        self.connector = connector;
        self
    }

    fn base(&self, request: &DialogRequest) -> Result<CommandLine> {
        let mut cmd = CommandLine::new();
        cmd.options(&request.options, GENERAL, FlagStyle::Separate)?;
        Ok(cmd)
    }
}

impl Backend for KDialog {
    fn kind(&self) -> BackendKind {
        BackendKind::Kdialog
    }

    fn program(&self) -> &Path {
        &self.program
    }

    fn plan(&self, request: &DialogRequest) -> Result<Invocation> {
        let opts = &request.options;
        let text = opts.text()?;
        let mut cmd = self.base(request)?;
        let gate = Gate::Exit(EXIT);

        let invocation = match request.kind {
            DialogKind::Message => {
                let flag = match MessageStyle::from_options(opts)? {
                    MessageStyle::Info => "--msgbox",
                    MessageStyle::Warning => "--sorry",
                    MessageStyle::Error => "--error",
                };
                cmd.opt(flag, text)?;
                Invocation::new(cmd, gate, Outcome::Accepted)
            }
            DialogKind::Confirm => {
                let buttons = Buttons::from_options(opts)?.validate()?;
                let flag = match buttons {
                    ButtonSet::YesNo => "--yesno",
                    ButtonSet::YesNoCancel => "--yesnocancel",
                    ButtonSet::WarningYesNo => "--warningyesno",
                    ButtonSet::WarningYesNoCancel => "--warningyesnocancel",
                    ButtonSet::WarningContinueCancel => "--warningcontinuecancel",
                };
                cmd.opt(flag, text)?;
                let decline_cancels = buttons == ButtonSet::WarningContinueCancel;
                Invocation::new(cmd, gate, Outcome::Confirm { decline_cancels })
            }
            DialogKind::Input => {
                let content = opts.str("content")?;
                let multiline = opts.flag_or("multiline", false)?;
                if opts.flag_or("password", false)? {
                    cmd.opt("--password", text)?;
                } else {
                    cmd.flag(if multiline { "--textinputbox" } else { "--inputbox" }).value(text)?;
                    if let Some(content) = content {
                        cmd.value(content)?;
                    }
                }
                Invocation::new(cmd, gate, Outcome::Text)
            }
            DialogKind::SingleSelect | DialogKind::MultiSelect => {
                require_entries(request)?;
                let multi = request.kind == DialogKind::MultiSelect;
                if multi {
                    cmd.flag("--separate-output").flag("--checklist");
                } else {
                    cmd.flag("--radiolist");
                }
                // The prompt never comes back on stdout; only tags and labels are checked
                cmd.value(text)?.guard('\n');
                let tags = index_tags(request);
                for (tag, entry) in tags.iter().zip(&request.entries) {
                    cmd.value(tag)?
                        .value(&entry.label)?
                        .flag(if entry.selected { "on" } else { "off" });
                }
                Invocation::new(
                    cmd,
                    gate,
                    Outcome::Choice {
                        tags,
                        separators: LINES,
                        multi,
                    },
                )
            }
            DialogKind::Dropdown => {
                require_entries(request)?;
                let tags = label_tags(request)?;
                cmd.opt("--combobox", text)?.guard('\n');
                for tag in &tags {
                    cmd.value(tag)?;
                }
                if let Some(entry) = request.entries.iter().find(|e| e.selected) {
                    cmd.opt("--default", &entry.label)?;
                }
                Invocation::new(
                    cmd,
                    gate,
                    Outcome::Choice {
                        tags,
                        separators: LINES,
                        multi: false,
                    },
                )
            }
            DialogKind::FilePick => {
                let pick = FilePick::from_options(opts)?;
                cmd.flag("--separate-output");
                cmd.flag_if(pick.multiple, "--multiple");
                cmd.flag(match (pick.target, pick.action) {
                    (FileTarget::Directory, _) => "--getexistingdirectory",
                    (FileTarget::File, FileAction::Open) => "--getopenfilename",
                    (FileTarget::File, FileAction::Save) => "--getsavefilename",
                    (FileTarget::Url, FileAction::Open) => "--getopenurl",
                    (FileTarget::Url, FileAction::Save) => "--getsaveurl",
                });
                cmd.value(start_dir(pick.dir.as_deref()))?;
                if let (Some(filter), false) = (&pick.filter, pick.target == FileTarget::Directory) {
                    cmd.value(filter)?;
                }
                let outcome = if pick.multiple {
                    Outcome::List { separators: LINES }
                } else {
                    Outcome::Text
                };
                Invocation::new(cmd, gate, outcome)
            }
            DialogKind::Calendar => {
                cmd.opt("--calendar", text)?.opt("--dateformat", "yyyy MM dd")?;
                if let Some(date) = opts.date("initial_date")? {
                    cmd.opt("--default", date.format("%Y %m %d").to_string())?;
                }
                Invocation::new(cmd, gate, Outcome::Date(DateOrder::YearMonthDay))
            }
            DialogKind::Slider => {
                let range = SliderRange::from_options(opts)?;
                cmd.opt("--slider", text)?
                    .value(range.min.to_string())?
                    .value(range.max.to_string())?
                    .value(range.step.to_string())?;
                Invocation::new(cmd, gate, Outcome::Integer)
            }
            DialogKind::Color => {
                cmd.flag("--getcolor");
                if let Some(initial) = opts.str("initial_color")? {
                    cmd.opt("--default", initial)?;
                }
                Invocation::new(cmd, gate, Outcome::Color)
            }
            DialogKind::Notification => {
                let timeout = opts.int("timeout")?.unwrap_or(3);
                cmd.opt("--passivepopup", text)?.value(timeout.to_string())?;
                Invocation::new(cmd, gate, Outcome::Accepted)
            }
            DialogKind::TextBox => {
                let file = scratch_file(text)?;
                cmd.opt("--textbox", scratch_arg(&file))?;
                if let (Some(width), Some(height)) = (opts.int("width")?, opts.int("height")?) {
                    cmd.value(width.to_string())?.value(height.to_string())?;
                }
                Invocation::new(cmd, gate, Outcome::Accepted).with_scratch(file)
            }
            DialogKind::Progress => {
                let steps = opts.int("max")?.unwrap_or(100);
                cmd.opt("--progressbar", text)?.value(steps.to_string())?;
                Invocation::new(cmd, Gate::Exit(EXIT), Outcome::Text)
            }
            DialogKind::Icon => {
                cmd.opt("--geticon", opts.str("group")?.unwrap_or("Desktop"))?
                    .value(opts.str("context")?.unwrap_or("Applications"))?;
                // Closing the chooser without a pick still exits 0
                Invocation::new(cmd, Gate::NonEmpty(EXIT), Outcome::Text)
            }
            DialogKind::Grid => return Err(unsupported(self.kind(), request.kind)),
        };
        Ok(invocation)
    }

    fn start_progress(&self, runner: &dyn ProcessRunner, request: &DialogRequest) -> Result<Box<dyn ProgressHandle>> {
        if request.kind != DialogKind::Progress {
            return Err(unsupported(self.kind(), request.kind));
        }
        let invocation = self.plan(request)?;
        let output = runner.run(&self.program, &invocation.args)?;
        if output.code != Some(0) {
            return Err(DialogError::ExternalProcessFailure {
                program: self.program.display().to_string(),
                reason: format!("progress dialog exited with {:?}: {}", output.code, output.stderr),
            });
        }

        let (service, path) = parse_session(&output.stdout)?;
        debug!("kdialog progress session {} {}", service, path);

        let opts = &request.options;
        let bus = self.connector.connect(&service, &path)?;
        let progress = KdeProgress::start(
            bus,
            opts.text()?,
            opts.int("max")?.unwrap_or(100).clamp(0, u32::MAX.into()) as u32,
            opts.flag_or("cancellable", true)?,
        )?;
        info!("Opened kdialog progress dialog at {}", service);
        Ok(Box::new(progress))
    }
}

/// `kdialog --progressbar` prints `<bus name> <object path>`
pub(crate) fn parse_session(raw: &str) -> Result<(String, String)> {
    let mut parts = raw.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(service), Some(path), None) if path.starts_with('/') => Ok((service.to_string(), path.to_string())),
        _ => Err(DialogError::parse(DialogKind::Progress, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choices::Choices;
    use crate::request::{DialogOptions, DialogResult, OptionValue};
    use crate::runner::RunOutput;

    fn kdialog() -> KDialog {
        KDialog::new("/usr/bin/kdialog")
    }

    fn args(request: &DialogRequest) -> Vec<String> {
        kdialog().plan(request).unwrap().args
    }

    #[test]
    fn test_message_styles() {
        let request = DialogRequest::new(DialogKind::Message).text("Kittens are cute.");
        assert_eq!(args(&request), vec!["--msgbox", "Kittens are cute."]);

        let request = DialogRequest::new(DialogKind::Message)
            .text("oops")
            .option("style", "sorry")
            .option("title", "Careful");
        assert_eq!(args(&request), vec!["--title", "Careful", "--sorry", "oops"]);

        let request = DialogRequest::new(DialogKind::Message).text("x").option("style", "foo");
        assert!(matches!(kdialog().plan(&request), Err(DialogError::InvalidOption { .. })));
    }

    #[test]
    fn test_confirm_flags() {
        let request = DialogRequest::new(DialogKind::Confirm)
            .text("Are you quite sure?")
            .option("yesno", false)
            .option("cancel", true)
            .option("continue_btn", true)
            .option("warning", true);
        assert_eq!(args(&request), vec!["--warningcontinuecancel", "Are you quite sure?"]);

        let bad = DialogRequest::new(DialogKind::Confirm)
            .option("yesno", false)
            .option("cancel", false)
            .option("continue_btn", false)
            .option("warning", false);
        assert!(matches!(kdialog().plan(&bad), Err(DialogError::InvalidOption { .. })));
    }

    #[test]
    fn test_input_variants() {
        let request = DialogRequest::new(DialogKind::Input)
            .text("Name?")
            .option("content", "Bob");
        assert_eq!(args(&request), vec!["--inputbox", "Name?", "Bob"]);

        let request = DialogRequest::new(DialogKind::Input)
            .text("Secret")
            .option("password", true)
            .option("content", "ignored");
        assert_eq!(args(&request), vec!["--password", "Secret"]);

        let request = DialogRequest::new(DialogKind::Input).text("Story").option("multiline", true);
        assert_eq!(args(&request), vec!["--textinputbox", "Story"]);
    }

    #[test]
    fn test_checklist_uses_index_tags() {
        let mut choices = Choices::new(["Sandwich", "Soup", "Salad"]);
        choices.preselect("choice_002").unwrap();
        let request = DialogRequest::new(DialogKind::MultiSelect)
            .text("Lunch?")
            .entries(choices.entries().to_vec());
        assert_eq!(
            args(&request),
            vec![
                "--separate-output", "--checklist", "Lunch?", "0", "Sandwich", "off", "1", "Soup", "off", "2",
                "Salad", "on"
            ]
        );
    }

    #[test]
    fn test_label_with_newline_rejected() {
        let request = DialogRequest::new(DialogKind::SingleSelect).entries(Choices::new(["one\ntwo"]).entries().to_vec());
        assert!(matches!(kdialog().plan(&request), Err(DialogError::InvalidOption { .. })));
    }

    #[test]
    fn test_combobox_default() {
        let choices = Choices::new(["Red", "Blue"]).with_default("choice_001").unwrap();
        let request = DialogRequest::new(DialogKind::Dropdown)
            .text("Colour")
            .entries(choices.entries().to_vec());
        assert_eq!(args(&request), vec!["--combobox", "Colour", "Red", "Blue", "--default", "Blue"]);
    }

    #[test]
    fn test_file_picker_flags() {
        let request = DialogRequest::new(DialogKind::FilePick).options(
            DialogOptions::new()
                .with("action", "open")
                .with("multiple", true)
                .with("dir", "/tmp")
                .with("filter", "*.rs"),
        );
        assert_eq!(
            args(&request),
            vec!["--separate-output", "--multiple", "--getopenfilename", "/tmp", "*.rs"]
        );

        let request = DialogRequest::new(DialogKind::FilePick)
            .option("target", "directory")
            .option("dir", "/srv")
            .option("filter", "ignored");
        assert_eq!(args(&request), vec!["--separate-output", "--getexistingdirectory", "/srv"]);
    }

    #[test]
    fn test_calendar_and_slider() {
        let request = DialogRequest::new(DialogKind::Calendar)
            .text("When?")
            .option("initial_date", OptionValue::Date(2009, 1, 1));
        assert_eq!(
            args(&request),
            vec!["--calendar", "When?", "--dateformat", "yyyy MM dd", "--default", "2009 01 01"]
        );

        let request = DialogRequest::new(DialogKind::Slider)
            .text("Pick a number")
            .option("min", 1)
            .option("max", 25);
        assert_eq!(
            args(&request),
            vec!["--slider", "Pick a number", "1", "25", "1"]
        );
    }

    #[test]
    fn test_notification_default_timeout() {
        let request = DialogRequest::new(DialogKind::Notification).text("Hello, world.");
        assert_eq!(args(&request), vec!["--passivepopup", "Hello, world.", "3"]);
    }

    #[test]
    fn test_textbox_references_scratch_file() {
        let request = DialogRequest::new(DialogKind::TextBox).text("Something to read...");
        let invocation = kdialog().plan(&request).unwrap();
        let path = invocation.scratch_path().unwrap().to_string_lossy().into_owned();
        assert_eq!(invocation.args, vec!["--textbox".to_string(), path]);
    }

    #[test]
    fn test_parse_session() {
        let (service, path) = parse_session("org.kde.kdialog-12345 /ProgressDialog").unwrap();
        assert_eq!(service, "org.kde.kdialog-12345");
        assert_eq!(path, "/ProgressDialog");
        assert!(parse_session("garbage").is_err());
    }

    #[test]
    fn test_icon_picker() {
        let request = DialogRequest::new(DialogKind::Icon).option("context", "Actions");
        let invocation = kdialog().plan(&request).unwrap();
        assert_eq!(invocation.args, vec!["--geticon", "Desktop", "Actions"]);
        let answer = invocation
            .interpret(&request, kdialog().program(), RunOutput::new("document-save", 0))
            .unwrap();
        assert_eq!(answer.result, DialogResult::Text("document-save".into()));
        let answer = invocation
            .interpret(&request, kdialog().program(), RunOutput::new("", 0))
            .unwrap();
        assert_eq!(answer.result, DialogResult::Cancelled);
    }

    #[test]
    fn test_grid_unsupported() {
        let err = kdialog().plan(&DialogRequest::new(DialogKind::Grid)).unwrap_err();
        assert!(matches!(err, DialogError::UnsupportedDialogKind { backend: "kdialog", .. }));
    }

    #[test]
    fn test_multiline_prompt_allowed() {
        let prompt = "What would you like for lunch?\nPick any.";
        let request = DialogRequest::new(DialogKind::MultiSelect)
            .text(prompt)
            .entries(Choices::new(["Sandwich", "Soup"]).entries().to_vec());
        assert_eq!(args(&request)[2], prompt);

        let request = DialogRequest::new(DialogKind::Dropdown)
            .text(prompt)
            .entries(Choices::new(["Red", "Blue"]).entries().to_vec());
        assert_eq!(args(&request)[1], prompt);

        let request = DialogRequest::new(DialogKind::MultiSelect)
            .text(prompt)
            .entries(Choices::new(["Soup\nof the day"]).entries().to_vec());
        assert!(matches!(kdialog().plan(&request), Err(DialogError::InvalidOption { .. })));
    }
}
