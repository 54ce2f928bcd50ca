//! macOS `cocoaDialog` adapter
//!
//! The first argument is the run mode (`msgbox`, `inputbox`, ...). Most boxes
//! exit 0 whatever the user did and print the pressed button's number on the
//! first line, followed by the answer.

use std::path::{Path, PathBuf};

use super::{
    index_tags, require_entries, scratch_arg, scratch_file, start_dir, unsupported, Backend, BackendKind, ExitCodes,
    Gate, Invocation, Outcome,
};
use crate::command::{CommandLine, FlagStyle, FlagTable};
use crate::error::Result;
use crate::request::{
    ButtonSet, Buttons, DialogKind, DialogRequest, FileAction, FilePick, FileTarget, MessageStyle, SliderRange,
};

/// File panels and bubbles print no button line
const EXIT: ExitCodes = ExitCodes {
    ok: &[0],
    declined: &[],
    cancelled: &[1],
};

const GENERAL: FlagTable = &[
    ("title", "--title"),
    ("width", "--width"),
    ("height", "--height"),
    ("timeout", "--timeout"),
];

const LINES: &[char] = &['\n'];

const OK_CANCEL: Gate = Gate::Button {
    accept: "1",
    decline: None,
};

#[derive(Debug, Clone)]
pub struct CocoaDialog {
    program: PathBuf,
}

impl CocoaDialog {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

fn ok_cancel_buttons(cmd: &mut CommandLine) -> Result<()> {
    cmd.opt("--button1", "Ok")?.opt("--button2", "Cancel")?;
    Ok(())
}

impl Backend for CocoaDialog {
    fn kind(&self) -> BackendKind {
        BackendKind::CocoaDialog
    }

    fn program(&self) -> &Path {
        &self.program
    }

    fn plan(&self, request: &DialogRequest) -> Result<Invocation> {
        let opts = &request.options;
        let text = opts.text()?;
        let multiline = opts.flag_or("multiline", false)?;
        let password = opts.flag_or("password", false)?;

        let mode = match request.kind {
            DialogKind::Message => "msgbox",
            DialogKind::Confirm => match Buttons::from_options(opts)?.validate()? {
                ButtonSet::WarningContinueCancel => "msgbox",
                _ => "yesno-msgbox",
            },
            DialogKind::Input if multiline => "textbox",
            DialogKind::Input if password => "secure-inputbox",
            DialogKind::Input => "inputbox",
            DialogKind::SingleSelect => "radio",
            DialogKind::MultiSelect => "checkbox",
            DialogKind::Dropdown => "dropdown",
            DialogKind::FilePick => match FilePick::from_options(opts)?.action {
                FileAction::Open => "fileselect",
                FileAction::Save => "filesave",
            },
            DialogKind::Slider => "slider",
            DialogKind::Notification => "bubble",
            DialogKind::TextBox => "textbox",
            DialogKind::Calendar
            | DialogKind::Color
            | DialogKind::Progress
            | DialogKind::Grid
            | DialogKind::Icon => {
                return Err(unsupported(self.kind(), request.kind))
            }
        };

        let mut cmd = CommandLine::new();
        cmd.flag(mode);
        cmd.options(opts, GENERAL, FlagStyle::Separate)?;

        let invocation = match request.kind {
            DialogKind::Message => {
                cmd.opt("--text", text)?.opt("--button1", "OK")?;
                match MessageStyle::from_options(opts)? {
                    MessageStyle::Info => cmd.opt("--icon", "info")?,
                    MessageStyle::Warning => cmd.opt("--icon", "caution")?,
                    MessageStyle::Error => cmd.opt("--icon", "stop")?,
                };
                Invocation::new(cmd, OK_CANCEL, Outcome::Accepted)
            }
            DialogKind::Confirm => {
                let buttons = Buttons::from_options(opts)?.validate()?;
                cmd.opt("--text", text)?;
                if buttons == ButtonSet::WarningContinueCancel {
                    cmd.opt("--button1", "Continue")?.opt("--button2", "Cancel")?;
                } else {
                    cmd.flag_if(!buttons.has_cancel(), "--no-cancel");
                }
                if buttons.is_warning() {
                    cmd.opt("--icon", "caution")?;
                }
                // 1 yes, 2 no, 3 cancel
                let gate = Gate::Button {
                    accept: "1",
                    decline: Some("2"),
                };
                let decline_cancels = buttons == ButtonSet::WarningContinueCancel;
                Invocation::new(cmd, gate, Outcome::Confirm { decline_cancels })
            }
            DialogKind::Input if multiline => {
                let file = scratch_file(opts.str("content")?.unwrap_or(""))?;
                cmd.opt("--informative-text", text)?
                    .opt("--text-from-file", scratch_arg(&file))?
                    .flag("--editable");
                ok_cancel_buttons(&mut cmd)?;
                return Ok(Invocation::new(cmd, OK_CANCEL, Outcome::Text).with_scratch(file));
            }
            DialogKind::Input => {
                cmd.opt("--informative-text", text)?;
                if let Some(content) = opts.str("content")? {
                    cmd.opt("--text", content)?;
                }
                ok_cancel_buttons(&mut cmd)?;
                Invocation::new(cmd, OK_CANCEL, Outcome::Text)
            }
            DialogKind::SingleSelect | DialogKind::Dropdown => {
                require_entries(request)?;
                cmd.opt(if mode == "radio" { "--label" } else { "--text" }, text)?
                    .guard('\n');
                cmd.flag("--items");
                for entry in &request.entries {
                    cmd.value(&entry.label)?;
                }
                if let Some(i) = request.entries.iter().position(|e| e.selected) {
                    cmd.opt("--selected", i.to_string())?;
                }
                ok_cancel_buttons(&mut cmd)?;
                let outcome = Outcome::Choice {
                    tags: index_tags(request),
                    separators: LINES,
                    multi: false,
                };
                Invocation::new(cmd, OK_CANCEL, outcome)
            }
            DialogKind::MultiSelect => {
                require_entries(request)?;
                cmd.opt("--label", text)?.guard('\n');
                cmd.flag("--items");
                for entry in &request.entries {
                    cmd.value(&entry.label)?;
                }
                let checked: Vec<String> = request
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.selected)
                    .map(|(i, _)| i.to_string())
                    .collect();
                if !checked.is_empty() {
                    cmd.flag("--checked");
                    for i in &checked {
                        cmd.value(i)?;
                    }
                }
                ok_cancel_buttons(&mut cmd)?;
                Invocation::new(cmd, OK_CANCEL, Outcome::Flags)
            }
            DialogKind::FilePick => {
                let pick = FilePick::from_options(opts)?;
                if !text.is_empty() {
                    cmd.opt("--text", text)?;
                }
                if pick.target == FileTarget::Directory {
                    cmd.flag("--select-directories").flag("--select-only-directories");
                }
                cmd.flag_if(pick.multiple, "--select-multiple");
                cmd.opt("--with-directory", start_dir(pick.dir.as_deref()))?;
                if let Some(filter) = &pick.filter {
                    cmd.flag("--with-extensions");
                    for pattern in filter.split_whitespace() {
                        cmd.value(pattern.trim_start_matches('*'))?;
                    }
                }
                let outcome = if pick.multiple {
                    Outcome::List { separators: LINES }
                } else {
                    Outcome::Text
                };
                Invocation::new(cmd, Gate::NonEmpty(EXIT), outcome)
            }
            DialogKind::Slider => {
                let range = SliderRange::from_options(opts)?;
                cmd.opt("--label", text)?
                    .opt("--min", range.min.to_string())?
                    .opt("--max", range.max.to_string())?
                    .opt("--value", range.value.to_string())?;
                ok_cancel_buttons(&mut cmd)?;
                Invocation::new(cmd, OK_CANCEL, Outcome::Integer)
            }
            DialogKind::Notification => {
                if !opts.contains("timeout") {
                    cmd.opt("--timeout", "3")?;
                }
                cmd.opt("--text", text)?;
                Invocation::new(cmd, Gate::Exit(EXIT), Outcome::Accepted)
            }
            DialogKind::TextBox => {
                let file = scratch_file(text)?;
                let editable = opts.flag_or("editable", false)?;
                cmd.opt("--text-from-file", scratch_arg(&file))?;
                if editable {
                    cmd.flag("--editable");
                    ok_cancel_buttons(&mut cmd)?;
                } else {
                    cmd.opt("--button1", "OK")?;
                }
                let outcome = if editable { Outcome::Text } else { Outcome::Accepted };
                Invocation::new(cmd, OK_CANCEL, outcome).with_scratch(file)
            }
            DialogKind::Calendar
            | DialogKind::Color
            | DialogKind::Progress
            | DialogKind::Grid
            | DialogKind::Icon => {
                return Err(unsupported(self.kind(), request.kind))
            }
        };
        Ok(invocation)
    }
}
