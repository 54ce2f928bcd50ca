//! Text-mode `dialog` adapter
//!
//! Draws with curses on the controlling terminal, so it only makes sense when
//! stdin and stdout are a TTY. The answer is written to stdout (`--stdout`);
//! common options have to precede the box option. Every box takes its size
//! as positional `height width`, 0 meaning auto-size.

use std::path::{Path, PathBuf};

use super::{
    index_tags, require_entries, scratch_arg, scratch_file, start_dir, unsupported, Backend, BackendKind, ExitCodes,
    Gate, Invocation, Outcome,
};
use crate::command::{CommandLine, FlagStyle, FlagTable};
use crate::error::Result;
use crate::parse::DateOrder;
use crate::request::{ButtonSet, Buttons, DialogKind, DialogRequest, FilePick, FileTarget, SliderRange};

const EXIT: ExitCodes = ExitCodes {
    ok: &[0],
    declined: &[1],
    // 3: extra button, 5: --timeout expired, 255: ESC
    cancelled: &[3, 5, 255],
};

const GENERAL: FlagTable = &[("title", "--title"), ("timeout", "--timeout")];

const LINES: &[char] = &['\n'];

#[derive(Debug, Clone)]
pub struct TextDialog {
    program: PathBuf,
}

impl TextDialog {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// `height width` for the box
fn size(request: &DialogRequest) -> Result<[String; 2]> {
    let opts = &request.options;
    Ok([
        opts.int("height")?.unwrap_or(0).to_string(),
        opts.int("width")?.unwrap_or(0).to_string(),
    ])
}

fn push_size(cmd: &mut CommandLine, size: &[String; 2]) -> Result<()> {
    cmd.value(&size[0])?.value(&size[1])?;
    Ok(())
}

impl Backend for TextDialog {
    fn kind(&self) -> BackendKind {
        BackendKind::Dialog
    }

    fn program(&self) -> &Path {
        &self.program
    }

    fn plan(&self, request: &DialogRequest) -> Result<Invocation> {
        let opts = &request.options;
        let text = opts.text()?;
        let size = size(request)?;
        let gate = Gate::Exit(EXIT);

        let mut cmd = CommandLine::new();
        cmd.flag("--stdout");
        cmd.options(opts, GENERAL, FlagStyle::Separate)?;

        let invocation = match request.kind {
            DialogKind::Message => {
                cmd.opt("--msgbox", text)?;
                push_size(&mut cmd, &size)?;
                Invocation::new(cmd, gate, Outcome::Accepted)
            }
            DialogKind::Confirm => {
                let buttons = Buttons::from_options(opts)?.validate()?;
                match buttons {
                    ButtonSet::WarningContinueCancel => {
                        cmd.opt("--yes-label", "Continue")?.opt("--no-label", "Cancel")?;
                    }
                    set if set.has_cancel() => {
                        cmd.flag("--extra-button").opt("--extra-label", "Cancel")?;
                    }
                    _ => {}
                }
                cmd.opt("--yesno", text)?;
                push_size(&mut cmd, &size)?;
                let decline_cancels = buttons == ButtonSet::WarningContinueCancel;
                Invocation::new(cmd, gate, Outcome::Confirm { decline_cancels })
            }
            DialogKind::Input => {
                let content = opts.str("content")?;
                if opts.flag_or("multiline", false)? {
                    let file = scratch_file(content.unwrap_or(""))?;
                    cmd.opt("--editbox", scratch_arg(&file))?;
                    push_size(&mut cmd, &size)?;
                    return Ok(Invocation::new(cmd, gate, Outcome::Text).with_scratch(file));
                }
                let flag = if opts.flag_or("password", false)? { "--passwordbox" } else { "--inputbox" };
                cmd.opt(flag, text)?;
                push_size(&mut cmd, &size)?;
                if let Some(content) = content {
                    cmd.value(content)?;
                }
                Invocation::new(cmd, gate, Outcome::Text)
            }
            DialogKind::SingleSelect | DialogKind::MultiSelect => {
                require_entries(request)?;
                let multi = request.kind == DialogKind::MultiSelect;
                if multi {
                    cmd.flag("--separate-output").opt("--checklist", text)?;
                } else {
                    cmd.opt("--radiolist", text)?;
                }
                cmd.guard('\n');
                push_size(&mut cmd, &size)?;
                cmd.value(request.entries.len().to_string())?;
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
                let tags = index_tags(request);
                if let Some(i) = request.entries.iter().position(|e| e.selected) {
                    cmd.opt("--default-item", &tags[i])?;
                }
                cmd.opt("--menu", text)?.guard('\n');
                push_size(&mut cmd, &size)?;
                cmd.value(request.entries.len().to_string())?;
                for (tag, entry) in tags.iter().zip(&request.entries) {
                    cmd.value(tag)?.value(&entry.label)?;
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
                let mut dir = start_dir(pick.dir.as_deref());
                if !dir.ends_with('/') {
                    dir.push('/');
                }
                let flag = if pick.target == FileTarget::Directory { "--dselect" } else { "--fselect" };
                cmd.opt(flag, dir)?;
                push_size(&mut cmd, &size)?;
                // One path at most; a multiple pick still answers with a list
                let outcome = if pick.multiple {
                    Outcome::List { separators: LINES }
                } else {
                    Outcome::Text
                };
                Invocation::new(cmd, Gate::NonEmpty(EXIT), outcome)
            }
            DialogKind::Calendar => {
                use chrono::Datelike;

                cmd.opt("--calendar", text)?;
                push_size(&mut cmd, &size)?;
                if let Some(date) = opts.date("initial_date")? {
                    cmd.value(date.day().to_string())?
                        .value(date.month().to_string())?
                        .value(date.year().to_string())?;
                }
                Invocation::new(cmd, gate, Outcome::Date(DateOrder::DayMonthYear))
            }
            DialogKind::Slider => {
                let range = SliderRange::from_options(opts)?;
                cmd.opt("--rangebox", text)?;
                push_size(&mut cmd, &size)?;
                cmd.value(range.min.to_string())?
                    .value(range.max.to_string())?
                    .value(range.value.to_string())?;
                Invocation::new(cmd, gate, Outcome::Integer)
            }
            DialogKind::Notification => {
                cmd.opt("--infobox", text)?;
                push_size(&mut cmd, &size)?;
                Invocation::new(cmd, gate, Outcome::Accepted)
            }
            DialogKind::TextBox => {
                let file = scratch_file(text)?;
                let editable = opts.flag_or("editable", false)?;
                cmd.opt(if editable { "--editbox" } else { "--textbox" }, scratch_arg(&file))?;
                push_size(&mut cmd, &size)?;
                let outcome = if editable { Outcome::Text } else { Outcome::Accepted };
                Invocation::new(cmd, gate, outcome).with_scratch(file)
            }
            DialogKind::Color | DialogKind::Progress | DialogKind::Grid | DialogKind::Icon => {
                return Err(unsupported(self.kind(), request.kind))
            }
        };
        Ok(invocation)
    }
}
