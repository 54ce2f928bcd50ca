//! GTK adapters: `zenity` and `yad`
//!
//! yad started as a zenity fork and still accepts most of its vocabulary, so
//! both adapters share one planner and only differ where the tools do.
//! Values are always joined (`--text=...`). Multi-value answers are separated
//! by a vertical tab.

use std::path::{Path, PathBuf};

use super::{
    label_tags, require_entries, require_table, scratch_arg, scratch_file, start_dir, unsupported, Backend,
    BackendKind, ExitCodes, Gate, Invocation, Outcome,
};
use crate::command::{CommandLine, FlagStyle, FlagTable};
use crate::error::Result;
use crate::parse::DateOrder;
use crate::request::{
    ButtonSet, Buttons, DialogKind, DialogRequest, FileAction, FilePick, FileTarget, MessageStyle, SliderRange,
};

const ZENITY_EXIT: ExitCodes = ExitCodes {
    ok: &[0],
    declined: &[1],
    // 5: --timeout expired
    cancelled: &[5],
};

const YAD_EXIT: ExitCodes = ExitCodes {
    ok: &[0],
    declined: &[1],
    // 70: --timeout expired, 252: window closed
    cancelled: &[70, 252],
};

/// yad question boxes use an explicit Cancel:2 button
const YAD_CONFIRM_EXIT: ExitCodes = ExitCodes {
    ok: &[0],
    declined: &[1],
    cancelled: &[2, 70, 252],
};

/// A yad notification window closing on its own is the normal outcome
const YAD_NOTIFY_EXIT: ExitCodes = ExitCodes {
    ok: &[0, 70],
    declined: &[1],
    cancelled: &[252],
};

const GENERAL: FlagTable = &[
    ("title", "--title"),
    ("width", "--width"),
    ("height", "--height"),
    ("timeout", "--timeout"),
];

const SEPARATOR_ARG: &str = "--separator=\u{b}";
const FIELDS: &[char] = &['\u{b}'];
/// yad terminates every printed list row with a newline as well
const ROWS: &[char] = &['\u{b}', '\n'];
const LINES: &[char] = &['\n'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Zenity,
    Yad,
}

impl Flavor {
    fn exit(self) -> ExitCodes {
        match self {
            Flavor::Zenity => ZENITY_EXIT,
            Flavor::Yad => YAD_EXIT,
        }
    }

    fn kind(self) -> BackendKind {
        match self {
            Flavor::Zenity => BackendKind::Zenity,
            Flavor::Yad => BackendKind::Yad,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Zenity {
    program: PathBuf,
}

impl Zenity {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Backend for Zenity {
    fn kind(&self) -> BackendKind {
        BackendKind::Zenity
    }

    fn program(&self) -> &Path {
        &self.program
    }

    fn plan(&self, request: &DialogRequest) -> Result<Invocation> {
        plan(Flavor::Zenity, request)
    }
}

#[derive(Debug, Clone)]
pub struct Yad {
    program: PathBuf,
}

impl Yad {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Backend for Yad {
    fn kind(&self) -> BackendKind {
        BackendKind::Yad
    }

    fn program(&self) -> &Path {
        &self.program
    }

    fn plan(&self, request: &DialogRequest) -> Result<Invocation> {
        plan(Flavor::Yad, request)
    }
}

fn plan(flavor: Flavor, request: &DialogRequest) -> Result<Invocation> {
    let opts = &request.options;
    let text = opts.text()?;
    let gate = Gate::Exit(flavor.exit());

    let mut cmd = CommandLine::new();
    cmd.options(opts, GENERAL, FlagStyle::Joined)?;

    let invocation = match request.kind {
        DialogKind::Message => {
            let style = MessageStyle::from_options(opts)?;
            match flavor {
                Flavor::Zenity => {
                    cmd.flag(match style {
                        MessageStyle::Info => "--info",
                        MessageStyle::Warning => "--warning",
                        MessageStyle::Error => "--error",
                    });
                    cmd.opt_joined("--text", text)?;
                    cmd.flag_if(opts.flag_or("no_wrap", false)?, "--no-wrap");
                }
                Flavor::Yad => {
                    cmd.opt_joined("--text", text)?;
                    cmd.opt_joined(
                        "--image",
                        match style {
                            MessageStyle::Info => "dialog-information",
                            MessageStyle::Warning => "dialog-warning",
                            MessageStyle::Error => "dialog-error",
                        },
                    )?;
                    cmd.flag("--button=OK:0");
                }
            }
            Invocation::new(cmd, gate, Outcome::Accepted)
        }
        DialogKind::Confirm => {
            let buttons = Buttons::from_options(opts)?.validate()?;
            let (yes, no) = buttons.labels();
            let yes = opts.str("ok_label")?.unwrap_or(yes);
            let no = opts.str("cancel_label")?.unwrap_or(no);
            let outcome = Outcome::Confirm {
                decline_cancels: buttons == ButtonSet::WarningContinueCancel,
            };
            match flavor {
                Flavor::Zenity => {
                    cmd.flag("--question");
                    cmd.opt_joined("--text", text)?;
                    cmd.flag_if(opts.flag_or("no_wrap", false)?, "--no-wrap");
                    cmd.opt_joined("--ok-label", yes)?.opt_joined("--cancel-label", no)?;
                    cmd.flag_if(buttons.is_warning(), "--icon-name=dialog-warning");
                    // A third button prints its label and exits like "no"
                    if buttons.has_cancel() && buttons != ButtonSet::WarningContinueCancel {
                        cmd.flag("--extra-button=Cancel");
                        let gate = Gate::ExitWithExtra {
                            codes: ZENITY_EXIT,
                            label: "Cancel",
                        };
                        return Ok(Invocation::new(cmd, gate, outcome));
                    }
                    Invocation::new(cmd, gate, outcome)
                }
                Flavor::Yad => {
                    cmd.opt_joined("--text", text)?;
                    cmd.opt_joined(
                        "--image",
                        if buttons.is_warning() { "dialog-warning" } else { "dialog-question" },
                    )?;
                    cmd.opt_joined("--button", format!("{yes}:0"))?
                        .opt_joined("--button", format!("{no}:1"))?;
                    if buttons.has_cancel() && buttons != ButtonSet::WarningContinueCancel {
                        cmd.flag("--button=Cancel:2");
                    }
                    Invocation::new(cmd, Gate::Exit(YAD_CONFIRM_EXIT), outcome)
                }
            }
        }
        DialogKind::Input => {
            if opts.flag_or("multiline", false)? {
                let file = scratch_file(opts.str("content")?.unwrap_or(""))?;
                cmd.flag("--text-info").flag("--editable");
                cmd.opt_joined("--filename", scratch_arg(&file))?;
                return Ok(Invocation::new(cmd, gate, Outcome::Text).with_scratch(file));
            }
            cmd.flag("--entry");
            cmd.opt_joined("--text", text)?;
            if let Some(content) = opts.str("content")? {
                cmd.opt_joined("--entry-text", content)?;
            }
            cmd.flag_if(opts.flag_or("password", false)?, "--hide-text");
            Invocation::new(cmd, gate, Outcome::Text)
        }
        DialogKind::SingleSelect | DialogKind::MultiSelect => {
            require_entries(request)?;
            let multi = request.kind == DialogKind::MultiSelect;
            let separators = match flavor {
                Flavor::Zenity => FIELDS,
                Flavor::Yad => ROWS,
            };
            cmd.flag("--list")
                .flag(if multi { "--checklist" } else { "--radiolist" })
                .flag(SEPARATOR_ARG);
            cmd.opt_joined("--text", text)?;
            cmd.flag("--column=")
                .flag("--column=Id")
                .opt_joined("--column", opts.str("column")?.unwrap_or("Option"))?;
            // Only the rows come back on stdout
            for &sep in separators {
                cmd.guard(sep);
            }
            cmd.flag("--hide-column=2").flag("--print-column=2");
            cmd.flag_if(multi && flavor == Flavor::Zenity, "--multiple");

            // Rows are addressed by entry id, which the hidden column prints back
            let mut tags = Vec::with_capacity(request.entries.len());
            for entry in &request.entries {
                cmd.flag(if entry.selected { "TRUE" } else { "FALSE" });
                cmd.value(&entry.id)?.value(&entry.label)?;
                tags.push(entry.id.clone());
            }
            Invocation::new(
                cmd,
                gate,
                Outcome::Choice {
                    tags,
                    separators,
                    multi,
                },
            )
        }
        DialogKind::Dropdown => {
            require_entries(request)?;
            let tags = label_tags(request)?;
            // Put the preselected entry first; both tools open on the first value
            let mut ordered: Vec<&str> = Vec::with_capacity(tags.len());
            for entry in request.entries.iter().filter(|e| e.selected) {
                ordered.push(&entry.label);
            }
            for entry in request.entries.iter().filter(|e| !e.selected) {
                ordered.push(&entry.label);
            }
            match flavor {
                Flavor::Zenity => {
                    cmd.flag("--forms");
                    cmd.opt_joined("--text", text)?.guard('\n');
                    cmd.opt_joined("--add-combo", opts.str("column")?.unwrap_or("Choice"))?;
                    cmd.opt_list("--combo-values", &ordered, '|')?;
                }
                Flavor::Yad => {
                    cmd.flag("--entry");
                    cmd.opt_joined("--text", text)?.guard('\n');
                    for label in &ordered {
                        cmd.value(label)?;
                    }
                }
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
            cmd.flag(match flavor {
                Flavor::Zenity => "--file-selection",
                Flavor::Yad => "--file",
            });
            if pick.multiple {
                cmd.flag("--multiple").flag(SEPARATOR_ARG);
            }
            cmd.flag_if(pick.target == FileTarget::Directory, "--directory");
            if pick.action == FileAction::Save {
                cmd.flag("--save");
                cmd.flag_if(pick.confirm_overwrite, "--confirm-overwrite");
            }
            let mut dir = start_dir(pick.dir.as_deref());
            if !dir.ends_with('/') {
                dir.push('/');
            }
            cmd.opt_joined("--filename", dir)?;
            if let Some(filter) = &pick.filter {
                cmd.opt_joined("--file-filter", filter)?;
            }
            let outcome = if pick.multiple {
                Outcome::List { separators: FIELDS }
            } else {
                Outcome::Text
            };
            Invocation::new(cmd, gate, outcome)
        }
        DialogKind::Calendar => {
            use chrono::Datelike;

            cmd.flag("--calendar");
            cmd.opt_joined("--text", text)?;
            cmd.flag("--date-format=%Y %m %d");
            if let Some(date) = opts.date("initial_date")? {
                cmd.opt_joined("--day", date.day().to_string())?
                    .opt_joined("--month", date.month().to_string())?
                    .opt_joined("--year", date.year().to_string())?;
            }
            Invocation::new(cmd, gate, Outcome::Date(DateOrder::YearMonthDay))
        }
        DialogKind::Slider => {
            let range = SliderRange::from_options(opts)?;
            cmd.flag("--scale");
            cmd.opt_joined("--text", text)?
                .opt_joined("--min-value", range.min.to_string())?
                .opt_joined("--max-value", range.max.to_string())?
                .opt_joined("--value", range.value.to_string())?
                .opt_joined("--step", range.step.to_string())?;
            cmd.flag_if(opts.flag_or("hide_value", false)?, "--hide-value");
            // One line per move; the answer is the last
            cmd.flag_if(opts.flag_or("print_partial", false)?, "--print-partial");
            Invocation::new(cmd, gate, Outcome::Integer)
        }
        DialogKind::Color => {
            let initial = opts.str("initial_color")?;
            match flavor {
                Flavor::Zenity => {
                    cmd.flag("--color-selection");
                    if let Some(c) = initial {
                        cmd.opt_joined("--color", c)?;
                    }
                }
                Flavor::Yad => {
                    cmd.flag("--color");
                    if let Some(c) = initial {
                        cmd.opt_joined("--init-color", c)?;
                    }
                }
            }
            Invocation::new(cmd, gate, Outcome::Color)
        }
        DialogKind::Notification => match flavor {
            Flavor::Zenity => {
                cmd.flag("--notification");
                cmd.opt_joined("--text", text)?;
                Invocation::new(cmd, gate, Outcome::Accepted)
            }
            Flavor::Yad => {
                if !opts.contains("timeout") {
                    cmd.flag("--timeout=3");
                }
                cmd.opt_joined("--text", text)?;
                cmd.flag("--no-buttons")
                    .flag("--undecorated")
                    .flag("--on-top")
                    .flag("--skip-taskbar");
                Invocation::new(cmd, Gate::Exit(YAD_NOTIFY_EXIT), Outcome::Accepted)
            }
        },
        DialogKind::TextBox => {
            let file = scratch_file(text)?;
            let editable = opts.flag_or("editable", false)?;
            cmd.flag("--text-info");
            cmd.opt_joined("--filename", scratch_arg(&file))?;
            cmd.flag_if(editable, "--editable");
            let outcome = if editable { Outcome::Text } else { Outcome::Accepted };
            Invocation::new(cmd, gate, outcome).with_scratch(file)
        }
        DialogKind::Grid => {
            let table = require_table(request)?;
            let separators = match flavor {
                Flavor::Zenity => FIELDS,
                Flavor::Yad => ROWS,
            };
            cmd.flag("--list").flag(SEPARATOR_ARG);
            cmd.opt_joined("--text", text)?;
            cmd.flag_if(opts.flag_or("multiple", false)?, "--multiple");
            if flavor == Flavor::Zenity {
                cmd.flag("--print-column=ALL");
            }
            for column in &table.columns {
                cmd.opt_joined("--column", column)?;
            }
            for &sep in separators {
                cmd.guard(sep);
            }
            for cell in table.rows.iter().flatten() {
                cmd.value(cell)?;
            }
            Invocation::new(cmd, gate, Outcome::List { separators })
        }
        DialogKind::Progress | DialogKind::Icon => return Err(unsupported(flavor.kind(), request.kind)),
    };
    Ok(invocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choices::Choices;
    use crate::error::DialogError;
    use crate::request::{DialogResult, OptionValue, Table};
    use crate::runner::RunOutput;

    fn zenity(request: &DialogRequest) -> Vec<String> {
        Zenity::new("zenity").plan(request).unwrap().args
    }

    fn yad(request: &DialogRequest) -> Vec<String> {
        Yad::new("yad").plan(request).unwrap().args
    }

    fn run(backend: &dyn Backend, request: &DialogRequest, stdout: &str, code: i32) -> Result<DialogResult> {
        let invocation = backend.plan(request)?;
        invocation
            .interpret(request, backend.program(), RunOutput::new(stdout, code))
            .map(|a| a.result)
    }

    #[test]
    fn test_zenity_message() {
        let request = DialogRequest::new(DialogKind::Message)
            .text("Something you should know about...")
            .option("width", 480)
            .option("no_wrap", true);
        assert_eq!(
            zenity(&request),
            vec!["--width=480", "--info", "--text=Something you should know about...", "--no-wrap"]
        );
    }

    #[test]
    fn test_yad_message_uses_image() {
        let request = DialogRequest::new(DialogKind::Message).text("Bad").option("style", "error");
        assert_eq!(yad(&request), vec!["--text=Bad", "--image=dialog-error", "--button=OK:0"]);
    }

    #[test]
    fn test_zenity_confirm_extra_cancel() {
        let request = DialogRequest::new(DialogKind::Confirm).text("Save?").option("cancel", true);
        let backend = Zenity::new("zenity");
        let args = backend.plan(&request).unwrap().args;
        assert!(args.contains(&"--extra-button=Cancel".to_string()));
        assert_eq!(run(&backend, &request, "", 0).unwrap(), DialogResult::Boolean(true));
        assert_eq!(run(&backend, &request, "", 1).unwrap(), DialogResult::Boolean(false));
        assert_eq!(run(&backend, &request, "Cancel", 1).unwrap(), DialogResult::Cancelled);
    }

    #[test]
    fn test_yad_confirm_buttons() {
        let request = DialogRequest::new(DialogKind::Confirm)
            .text("Go on?")
            .option("yesno", false)
            .option("continue_btn", true)
            .option("cancel", true)
            .option("warning", true);
        let backend = Yad::new("yad");
        assert_eq!(
            backend.plan(&request).unwrap().args,
            vec!["--text=Go on?", "--image=dialog-warning", "--button=Continue:0", "--button=Cancel:1"]
        );
        assert_eq!(run(&backend, &request, "", 1).unwrap(), DialogResult::Cancelled);
    }

    #[test]
    fn test_entry() {
        let request = DialogRequest::new(DialogKind::Input)
            .text("Name")
            .option("content", "Foo things")
            .option("password", true);
        assert_eq!(
            zenity(&request),
            vec!["--entry", "--text=Name", "--entry-text=Foo things", "--hide-text"]
        );
    }

    #[test]
    fn test_zenity_checklist() {
        let mut choices = Choices::new(["one", "two", "three"]);
        choices.preselect("choice_001").unwrap();
        let request = DialogRequest::new(DialogKind::MultiSelect)
            .text("Pick")
            .entries(choices.entries().to_vec());
        let backend = Zenity::new("zenity");
        let args = backend.plan(&request).unwrap().args;
        assert_eq!(
            args,
            vec![
                "--list", "--checklist", "--separator=\u{b}", "--text=Pick", "--column=", "--column=Id",
                "--column=Option", "--hide-column=2", "--print-column=2", "--multiple", "FALSE", "choice_000", "one",
                "TRUE", "choice_001", "two", "FALSE", "choice_002", "three"
            ]
        );
        assert_eq!(
            run(&backend, &request, "choice_002\u{b}choice_000", 0).unwrap(),
            DialogResult::List(vec!["three".into(), "one".into()])
        );
    }

    #[test]
    fn test_yad_list_rows() {
        let request = DialogRequest::new(DialogKind::MultiSelect).entries(Choices::new(["a", "b"]).entries().to_vec());
        let backend = Yad::new("yad");
        assert_eq!(
            run(&backend, &request, "choice_000\u{b}\nchoice_001\u{b}", 0).unwrap(),
            DialogResult::List(vec!["a".into(), "b".into()])
        );
        assert_eq!(run(&backend, &request, "", 252).unwrap(), DialogResult::Cancelled);
    }

    #[test]
    fn test_separator_in_label_rejected() {
        let request =
            DialogRequest::new(DialogKind::SingleSelect).entries(Choices::new(["bad\u{b}label"]).entries().to_vec());
        let err = Zenity::new("zenity").plan(&request).unwrap_err();
        assert!(matches!(err, DialogError::InvalidOption { .. }));
    }

    #[test]
    fn test_zenity_dropdown_combo_values() {
        let choices = Choices::new(["Red", "Green", "Blue"]).with_default("choice_002").unwrap();
        let request = DialogRequest::new(DialogKind::Dropdown)
            .text("Colour")
            .entries(choices.entries().to_vec());
        let backend = Zenity::new("zenity");
        assert_eq!(
            backend.plan(&request).unwrap().args,
            vec!["--forms", "--text=Colour", "--add-combo=Choice", "--combo-values=Blue|Red|Green"]
        );
        assert_eq!(run(&backend, &request, "Green", 0).unwrap(), DialogResult::Text("Green".into()));

        let bad = DialogRequest::new(DialogKind::Dropdown).entries(Choices::new(["a|b"]).entries().to_vec());
        assert!(backend.plan(&bad).is_err());
    }

    #[test]
    fn test_yad_dropdown_entry_items() {
        let request = DialogRequest::new(DialogKind::Dropdown)
            .text("Colour")
            .entries(Choices::new(["Red", "Blue"]).entries().to_vec());
        assert_eq!(yad(&request), vec!["--entry", "--text=Colour", "Red", "Blue"]);
    }

    #[test]
    fn test_file_selection() {
        let request = DialogRequest::new(DialogKind::FilePick)
            .option("dir", "/home/socket")
            .option("multiple", true);
        let backend = Zenity::new("zenity");
        assert_eq!(
            backend.plan(&request).unwrap().args,
            vec!["--file-selection", "--multiple", "--separator=\u{b}", "--filename=/home/socket/"]
        );
        assert_eq!(
            run(&backend, &request, "/a\u{b}/b c", 0).unwrap(),
            DialogResult::List(vec!["/a".into(), "/b c".into()])
        );

        let save = DialogRequest::new(DialogKind::FilePick)
            .option("action", "save")
            .option("confirm_overwrite", true)
            .option("dir", "/tmp/");
        assert_eq!(yad(&save), vec!["--file", "--save", "--confirm-overwrite", "--filename=/tmp/"]);
    }

    #[test]
    fn test_calendar() {
        let request = DialogRequest::new(DialogKind::Calendar)
            .text("Enter some weird date...")
            .option("title", "Date entry thingie")
            .option("initial_date", OptionValue::Date(2009, 1, 1));
        let backend = Zenity::new("zenity");
        assert_eq!(
            backend.plan(&request).unwrap().args,
            vec![
                "--title=Date entry thingie", "--calendar", "--text=Enter some weird date...",
                "--date-format=%Y %m %d", "--day=1", "--month=1", "--year=2009"
            ]
        );
        let date = run(&backend, &request, "2009 01 15", 0).unwrap();
        assert_eq!(date.as_date(), chrono::NaiveDate::from_ymd_opt(2009, 1, 15));
    }

    #[test]
    fn test_scale() {
        let request = DialogRequest::new(DialogKind::Slider).option("min", 1).option("max", 10);
        assert_eq!(
            zenity(&request),
            vec!["--scale", "--text=", "--min-value=1", "--max-value=10", "--value=1", "--step=1"]
        );
    }

    #[test]
    fn test_color_outputs() {
        let request = DialogRequest::new(DialogKind::Color);
        let zen = Zenity::new("zenity");
        assert_eq!(
            run(&zen, &request, "rgb(26,43,60)", 0).unwrap(),
            DialogResult::Color(crate::request::Rgb::new(26, 43, 60))
        );
        let yad_backend = Yad::new("yad");
        let request = DialogRequest::new(DialogKind::Color).option("initial_color", "#ff0000");
        assert_eq!(yad_backend.plan(&request).unwrap().args, vec!["--color", "--init-color=#ff0000"]);
    }

    #[test]
    fn test_zenity_timeout_is_cancelled() {
        let request = DialogRequest::new(DialogKind::Input).option("timeout", 10);
        assert_eq!(run(&Zenity::new("zenity"), &request, "", 5).unwrap(), DialogResult::Cancelled);
    }

    #[test]
    fn test_yad_notification_times_out_normally() {
        let request = DialogRequest::new(DialogKind::Notification).text("Done");
        let backend = Yad::new("yad");
        assert_eq!(
            backend.plan(&request).unwrap().args,
            vec!["--timeout=3", "--text=Done", "--no-buttons", "--undecorated", "--on-top", "--skip-taskbar"]
        );
        assert_eq!(run(&backend, &request, "", 70).unwrap(), DialogResult::Boolean(true));
    }

    #[test]
    fn test_editable_textbox_returns_text() {
        let request = DialogRequest::new(DialogKind::TextBox)
            .text("Hello, world!\nFine day, isn't it?")
            .option("editable", true);
        let backend = Zenity::new("zenity");
        let invocation = backend.plan(&request).unwrap();
        assert!(invocation.args[1].starts_with("--filename="));
        assert_eq!(invocation.args[2], "--editable");
        let answer = invocation
            .interpret(&request, backend.program(), RunOutput::new("edited", 0))
            .unwrap();
        assert_eq!(answer.result, DialogResult::Text("edited".into()));
    }

    #[test]
    fn test_progress_unsupported() {
        let err = Yad::new("yad").plan(&DialogRequest::new(DialogKind::Progress)).unwrap_err();
        assert!(matches!(err, DialogError::UnsupportedDialogKind { backend: "yad", .. }));
    }

    #[test]
    fn test_multiline_prompt_allowed() {
        let prompt = "What would you like for lunch?\nPick any.";
        let request = DialogRequest::new(DialogKind::Dropdown)
            .text(prompt)
            .entries(Choices::new(["Red", "Blue"]).entries().to_vec());
        assert!(zenity(&request).contains(&format!("--text={prompt}")));
        assert!(yad(&request).contains(&format!("--text={prompt}")));

        let request = DialogRequest::new(DialogKind::MultiSelect)
            .text(prompt)
            .entries(Choices::new(["Sandwich", "Soup"]).entries().to_vec());
        assert!(yad(&request).contains(&format!("--text={prompt}")));
    }

    #[test]
    fn test_yad_rejects_newline_in_row_id() {
        let choices = Choices::with_ids([("soup\ndu jour", "Soup"), ("salad", "Salad")]).unwrap();
        let request = DialogRequest::new(DialogKind::SingleSelect)
            .text("Lunch?")
            .entries(choices.entries().to_vec());
        let err = Yad::new("yad").plan(&request).unwrap_err();
        assert!(matches!(err, DialogError::InvalidOption { .. }));
        // zenity splits on the vertical tab only
        assert!(Zenity::new("zenity").plan(&request).is_ok());
    }

    fn files() -> Table {
        Table::new(["Name", "Size"], [vec!["a.txt", "3"], vec!["b.txt", "9"]]).unwrap()
    }

    #[test]
    fn test_zenity_grid_prints_whole_rows() {
        let request = DialogRequest::new(DialogKind::Grid).text("Files").table(files());
        assert_eq!(
            zenity(&request),
            vec![
                "--list", "--separator=\u{b}", "--text=Files", "--print-column=ALL", "--column=Name", "--column=Size",
                "a.txt", "3", "b.txt", "9"
            ]
        );
        let backend = Zenity::new("zenity");
        assert_eq!(
            run(&backend, &request, "b.txt\u{b}9", 0).unwrap(),
            DialogResult::List(vec!["b.txt".into(), "9".into()])
        );
        assert_eq!(run(&backend, &request, "", 1).unwrap(), DialogResult::Cancelled);
    }

    #[test]
    fn test_yad_grid_rows_end_with_newline() {
        let request = DialogRequest::new(DialogKind::Grid)
            .table(files())
            .option("multiple", true);
        assert!(yad(&request).contains(&"--multiple".to_string()));
        assert!(!yad(&request).contains(&"--print-column=ALL".to_string()));
        let result = run(&Yad::new("yad"), &request, "a.txt\u{b}3\u{b}\nb.txt\u{b}9\u{b}\n", 0).unwrap();
        let cells: Vec<String> = ["a.txt", "3", "b.txt", "9"].iter().map(|s| s.to_string()).collect();
        assert_eq!(result, DialogResult::List(cells));
    }

    #[test]
    fn test_grid_needs_rows_and_clean_cells() {
        let empty = DialogRequest::new(DialogKind::Grid);
        assert!(matches!(Zenity::new("zenity").plan(&empty), Err(DialogError::InvalidOption { .. })));

        let table = Table::new(["Name"], [vec!["two\nlines"]]).unwrap();
        let request = DialogRequest::new(DialogKind::Grid).table(table);
        assert!(Zenity::new("zenity").plan(&request).is_ok());
        assert!(Yad::new("yad").plan(&request).is_err());
    }

    #[test]
    fn test_scale_hide_value_and_partial() {
        let request = DialogRequest::new(DialogKind::Slider)
            .option("hide_value", true)
            .option("print_partial", true);
        let args = zenity(&request);
        assert!(args.ends_with(&["--hide-value".to_string(), "--print-partial".to_string()]));
        let result = run(&Zenity::new("zenity"), &request, "10\n20\n35", 0).unwrap();
        assert_eq!(result, DialogResult::Integer(35));
    }

    #[test]
    fn test_icon_unsupported() {
        let err = Zenity::new("zenity").plan(&DialogRequest::new(DialogKind::Icon)).unwrap_err();
        assert!(matches!(err, DialogError::UnsupportedDialogKind { backend: "zenity", kind: DialogKind::Icon }));
    }
}
