//! The dialog facade
//!
//! [`Dialogs`] owns one backend adapter and a process runner and offers one
//! method per dialog kind. Everything funnels through [`Dialogs::show`]:
//! plan the command line, run it, interpret the exit status and output.

use chrono::NaiveDate;
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::backend::{Backend, BackendKind};
use crate::choices::Choices;
use crate::config::{Config, DefaultsConfig};
use crate::error::{DialogError, Result};
use crate::progress::ProgressHandle;
use crate::request::{Buttons, DialogKind, DialogOptions, DialogRequest, DialogResult, MessageStyle, Rgb, Table};
use crate::runner::{ProcessRunner, SystemRunner};
use crate::selector::{self, Detected, Environment, SelectorState};

pub struct Dialogs {
    backend: Box<dyn Backend>,
    runner: Arc<dyn ProcessRunner>,
    defaults: DefaultsConfig,
}

impl std::fmt::Debug for Dialogs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dialogs")
            .field("backend", &self.backend)
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl Dialogs {
    /// Use `backend` with real processes
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self::with_runner(backend, Arc::new(SystemRunner))
    }

    pub fn with_runner(backend: Box<dyn Backend>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            backend,
            runner,
            defaults: DefaultsConfig::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: DefaultsConfig) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn from_detected(detected: Detected) -> Self {
        Self::new(detected.kind.adapter(detected.program))
    }

    /// Detect a backend for the current process environment
    pub fn detect(config: &Config) -> Result<Self> {
        let detected = selector::detect(&Environment::capture(), &config.selector, &config.binaries)?;
        Ok(Self::from_detected(detected).with_defaults(config.defaults.clone()))
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn program(&self) -> &Path {
        self.backend.program()
    }

    /// Show any non-progress dialog and return its answer
    pub fn show(&self, mut request: DialogRequest) -> Result<DialogResult> {
        let (result, _) = self.run(&mut request)?;
        request.complete(&result);
        Ok(result)
    }

    fn run(&self, request: &mut DialogRequest) -> Result<(DialogResult, Option<Vec<String>>)> {
        if request.kind == DialogKind::Progress {
            return Err(DialogError::invalid("kind", "progress dialogs are opened with progress_start"));
        }
        self.defaults.apply(request);

        let invocation = self.backend.plan(request)?;
        debug!("{} {} {:?}", self.backend.kind(), request.kind, invocation.args);
        let output = self.runner.run(self.backend.program(), &invocation.args)?;
        let answer = invocation.interpret(request, self.backend.program(), output)?;
        Ok((answer.result, answer.chosen))
    }

    pub fn message(&self, text: &str, style: MessageStyle) -> Result<DialogResult> {
        self.show(
            DialogRequest::new(DialogKind::Message)
                .text(text)
                .option("style", style.as_str()),
        )
    }

    /// Ask a question. Yes is `Boolean(true)`, no is `Boolean(false)`.
    pub fn confirm(&self, text: &str, buttons: Buttons) -> Result<DialogResult> {
        buttons.validate()?;
        self.show(
            DialogRequest::new(DialogKind::Confirm)
                .text(text)
                .option("yesno", buttons.yesno)
                .option("cancel", buttons.cancel)
                .option("continue_btn", buttons.continue_btn)
                .option("warning", buttons.warning),
        )
    }

    pub fn input(&self, prompt: &str, options: DialogOptions) -> Result<DialogResult> {
        self.show(DialogRequest::new(DialogKind::Input).options(options).text(prompt))
    }

    /// Run a selection dialog over `choices` and record the answer in it
    pub fn select(
        &self,
        kind: DialogKind,
        choices: &mut Choices,
        label: &str,
        options: DialogOptions,
    ) -> Result<DialogResult> {
        let entries = match kind {
            DialogKind::MultiSelect => choices.entries().to_vec(),
            DialogKind::SingleSelect | DialogKind::Dropdown => choices.single_entries()?,
            other => return Err(DialogError::invalid("kind", format!("{other} is not a selection dialog"))),
        };
        let mut request = DialogRequest::new(kind).options(options).text(label).entries(entries);
        let (result, chosen) = self.run(&mut request)?;
        if !result.is_cancelled() {
            choices.apply(&chosen.unwrap_or_default())?;
        }
        request.complete(&result);
        Ok(result)
    }

    pub fn single_select(&self, choices: &mut Choices, label: &str) -> Result<DialogResult> {
        self.select(DialogKind::SingleSelect, choices, label, DialogOptions::new())
    }

    pub fn multi_select(&self, choices: &mut Choices, label: &str) -> Result<DialogResult> {
        self.select(DialogKind::MultiSelect, choices, label, DialogOptions::new())
    }

    pub fn dropdown(&self, choices: &mut Choices, label: &str) -> Result<DialogResult> {
        self.select(DialogKind::Dropdown, choices, label, DialogOptions::new())
    }

    /// Pick one row of `table` (several with `multiple`). The answer lists the
    /// picked rows' cells, row after row.
    pub fn grid(&self, text: &str, table: Table, multiple: bool) -> Result<DialogResult> {
        self.show(
            DialogRequest::new(DialogKind::Grid)
                .text(text)
                .table(table)
                .option("multiple", multiple),
        )
    }

    /// Choose a KDE icon by name. `group` defaults to Desktop and `context`
    /// to Applications.
    pub fn icon(&self, group: Option<&str>, context: Option<&str>) -> Result<DialogResult> {
        let mut request = DialogRequest::new(DialogKind::Icon);
        if let Some(group) = group {
            request = request.option("group", group);
        }
        if let Some(context) = context {
            request = request.option("context", context);
        }
        self.show(request)
    }

    /// Keys: `action` (open/save), `target` (file/url/directory), `multiple`,
    /// `dir`, `filter`, `confirm_overwrite`
    pub fn file_pick(&self, options: DialogOptions) -> Result<DialogResult> {
        self.show(DialogRequest::new(DialogKind::FilePick).options(options))
    }

    pub fn calendar(&self, text: &str, initial: Option<NaiveDate>) -> Result<DialogResult> {
        let mut request = DialogRequest::new(DialogKind::Calendar).text(text);
        if let Some(date) = initial {
            request = request.option("initial_date", date);
        }
        self.show(request)
    }

    pub fn slider(&self, text: &str, range: RangeInclusive<i64>, step: i64) -> Result<DialogResult> {
        self.show(
            DialogRequest::new(DialogKind::Slider)
                .text(text)
                .option("min", *range.start())
                .option("max", *range.end())
                .option("step", step),
        )
    }

    pub fn color(&self, initial: Option<Rgb>) -> Result<DialogResult> {
        let mut request = DialogRequest::new(DialogKind::Color);
        if let Some(rgb) = initial {
            request = request.option("initial_color", rgb.to_hex());
        }
        self.show(request)
    }

    /// Passive popup; `timeout` in seconds
    pub fn notify(&self, text: &str, timeout: Option<u32>) -> Result<DialogResult> {
        let mut request = DialogRequest::new(DialogKind::Notification).text(text);
        if let Some(secs) = timeout {
            request = request.option("timeout", secs);
        }
        self.show(request)
    }

    /// Show `text` in a scrollable box. Editable boxes answer with the edited text.
    pub fn textbox(&self, text: &str, editable: bool) -> Result<DialogResult> {
        self.show(
            DialogRequest::new(DialogKind::TextBox)
                .text(text)
                .option("editable", editable),
        )
    }

    /// Open a progress window with `steps` as its maximum
    pub fn progress_start(&self, label: &str, steps: u32) -> Result<Box<dyn ProgressHandle>> {
        let mut request = DialogRequest::new(DialogKind::Progress)
            .text(label)
            .option("max", steps);
        self.defaults.apply(&mut request);
        self.backend.start_progress(self.runner.as_ref(), &request)
    }

    /// Run `f` with an open progress window, closing it however `f` returns
    pub fn with_progress<T>(
        &self,
        label: &str,
        steps: u32,
        f: impl FnOnce(&mut dyn ProgressHandle) -> Result<T>,
    ) -> Result<T> {
        let mut progress = self.progress_start(label, steps)?;
        let result = f(progress.as_mut());
        let closed = progress.close();
        let value = result?;
        closed?;
        Ok(value)
    }
}

static GLOBAL: OnceLock<Result<Dialogs>> = OnceLock::new();

fn shared(init: impl FnOnce() -> Result<Dialogs>) -> Result<&'static Dialogs> {
    GLOBAL.get_or_init(init).as_ref().map_err(DialogError::replay)
}

/// Detect the shared backend with `config`. Only the first call detects;
/// later calls return the same facade (or the same failure).
pub fn autosetup(config: &Config) -> Result<&'static Dialogs> {
    shared(|| Dialogs::detect(config))
}

/// The shared facade, detected on first use from the user's configuration
pub fn dialogs() -> Result<&'static Dialogs> {
    shared(|| Config::load().and_then(|config| Dialogs::detect(&config)))
}

pub fn selector_state() -> SelectorState {
    match GLOBAL.get() {
        None => SelectorState::Undetected,
        Some(Ok(dialogs)) => SelectorState::Detected(dialogs.kind()),
        Some(Err(reason)) => SelectorState::Unavailable(reason.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{KDialog, TextDialog, Zenity};
    use crate::progress::fake::{FakeBus, FakeConnector};
    use crate::runner::ScriptedRunner;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn kdialog(runner: &Arc<ScriptedRunner>) -> Dialogs {
        Dialogs::with_runner(Box::new(KDialog::new("/usr/bin/kdialog")), runner.clone())
    }

    #[test]
    fn test_message_box() {
        let runner = Arc::new(ScriptedRunner::new().reply("", 0));
        let dialogs = kdialog(&runner);
        let result = dialogs.message("Kittens are cute.", MessageStyle::Info).unwrap();
        assert_eq!(result, DialogResult::Boolean(true));
        assert_eq!(runner.last_args().unwrap(), vec!["--msgbox", "Kittens are cute."]);
    }

    #[test]
    fn test_invalid_buttons_never_spawn() {
        let runner = Arc::new(ScriptedRunner::new());
        let dialogs = kdialog(&runner);
        let buttons = Buttons {
            yesno: false,
            cancel: false,
            continue_btn: false,
            warning: false,
        };
        assert!(matches!(dialogs.confirm("?", buttons), Err(DialogError::InvalidOption { .. })));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_confirm_yes_no_cancel() {
        let runner = Arc::new(ScriptedRunner::new().reply("", 0).reply("", 1).reply("", 2));
        let dialogs = kdialog(&runner);
        let buttons = Buttons {
            cancel: true,
            ..Buttons::default()
        };
        assert_eq!(dialogs.confirm("Save?", buttons).unwrap(), DialogResult::Boolean(true));
        assert_eq!(dialogs.confirm("Save?", buttons).unwrap(), DialogResult::Boolean(false));
        assert_eq!(dialogs.confirm("Save?", buttons).unwrap(), DialogResult::Cancelled);
    }

    #[test]
    fn test_multi_select_updates_choices_and_fires_callbacks() {
        let runner = Arc::new(ScriptedRunner::new().reply("0\n2\n", 0));
        let dialogs = kdialog(&runner);
        let picked = Rc::new(RefCell::new(Vec::new()));
        let mut choices = Choices::new(["Sandwich", "Soup", "Salad"]);
        for id in ["choice_000", "choice_001", "choice_002"] {
            let picked = picked.clone();
            choices.on_select(id, move |label| picked.borrow_mut().push(label.to_string())).unwrap();
        }

        let result = dialogs.multi_select(&mut choices, "Lunch?").unwrap();
        assert_eq!(result, DialogResult::List(vec!["Sandwich".into(), "Salad".into()]));
        assert_eq!(choices.selected_ids(), vec!["choice_000", "choice_002"]);
        assert_eq!(*picked.borrow(), vec!["Sandwich", "Salad"]);
    }

    #[test]
    fn test_cancelled_selection_leaves_choices() {
        let runner = Arc::new(ScriptedRunner::new().reply("", 1));
        let dialogs = Dialogs::with_runner(Box::new(Zenity::new("zenity")), runner.clone());
        let mut choices = Choices::new(["a", "b"]).with_default("choice_001").unwrap();
        assert_eq!(dialogs.single_select(&mut choices, "Pick").unwrap(), DialogResult::Cancelled);
        assert_eq!(choices.selected_ids(), vec!["choice_001"]);
    }

    #[test]
    fn test_single_select_rejects_two_defaults() {
        let runner = Arc::new(ScriptedRunner::new());
        let dialogs = kdialog(&runner);
        let mut choices = Choices::new(["a", "b"]);
        choices.preselect("choice_000").unwrap();
        choices.preselect("choice_001").unwrap();
        assert!(dialogs.single_select(&mut choices, "Pick").is_err());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_defaults_applied() {
        let runner = Arc::new(ScriptedRunner::new().reply("", 0));
        let dialogs = kdialog(&runner).with_defaults(DefaultsConfig {
            title: Some("Shim".into()),
            notification_timeout_secs: 7,
            ..DefaultsConfig::default()
        });
        dialogs.notify("Hello, world.", None).unwrap();
        assert_eq!(
            runner.last_args().unwrap(),
            vec!["--title", "Shim", "--passivepopup", "Hello, world.", "7"]
        );
    }

    #[test]
    fn test_completion_callback() {
        let runner = Arc::new(ScriptedRunner::new().reply("2009 01 15", 0).reply("", 2));
        let dialogs = kdialog(&runner);
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        let request = DialogRequest::new(DialogKind::Calendar).on_complete(move |r| *sink.borrow_mut() = r.as_date());
        dialogs.show(request).unwrap();
        assert_eq!(*seen.borrow(), NaiveDate::from_ymd_opt(2009, 1, 15));

        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        let request = DialogRequest::new(DialogKind::Input).on_complete(move |_| *counter.borrow_mut() += 1);
        assert_eq!(dialogs.show(request).unwrap(), DialogResult::Cancelled);
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn test_slider_and_color() {
        let runner = Arc::new(ScriptedRunner::new().reply("12", 0).reply("#1a2b3c", 0));
        let dialogs = kdialog(&runner);
        assert_eq!(dialogs.slider("How many?", 1..=25, 2).unwrap(), DialogResult::Integer(12));
        assert_eq!(runner.last_args().unwrap(), vec!["--slider", "How many?", "1", "25", "2"]);
        assert_eq!(
            dialogs.color(Some(Rgb::new(255, 0, 0))).unwrap(),
            DialogResult::Color(Rgb::new(26, 43, 60))
        );
        assert_eq!(runner.last_args().unwrap(), vec!["--getcolor", "--default", "#ff0000"]);
    }

    #[test]
    fn test_progress_through_show_is_rejected() {
        let runner = Arc::new(ScriptedRunner::new());
        let dialogs = kdialog(&runner);
        let err = dialogs.show(DialogRequest::new(DialogKind::Progress)).unwrap_err();
        assert!(matches!(err, DialogError::InvalidOption { .. }));
    }

    #[test]
    fn test_progress_unsupported_on_dialog() {
        let runner = Arc::new(ScriptedRunner::new());
        let dialogs = Dialogs::with_runner(Box::new(TextDialog::new("dialog")), runner.clone());
        let err = dialogs.progress_start("Working", 10).unwrap_err();
        assert!(matches!(err, DialogError::UnsupportedDialogKind { backend: "dialog", .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_kdialog_progress_failure_reported() {
        let runner = Arc::new(ScriptedRunner::new().reply("", 1));
        let dialogs = kdialog(&runner);
        let err = dialogs.with_progress("Working", 10, |_| Ok(())).unwrap_err();
        assert!(matches!(err, DialogError::ExternalProcessFailure { .. }));
        assert_eq!(runner.last_args().unwrap(), vec!["--progressbar", "Working", "10"]);
    }

    #[test]
    fn test_grid_on_zenity() {
        let runner = Arc::new(ScriptedRunner::new().reply("b.txt\u{b}9", 0));
        let dialogs = Dialogs::with_runner(Box::new(Zenity::new("zenity")), runner.clone());
        let table = Table::new(["Name", "Size"], [vec!["a.txt", "3"], vec!["b.txt", "9"]]).unwrap();
        let result = dialogs.grid("Files", table, false).unwrap();
        assert_eq!(result, DialogResult::List(vec!["b.txt".into(), "9".into()]));
        assert!(runner.last_args().unwrap().contains(&"--print-column=ALL".to_string()));
    }

    #[test]
    fn test_icon_only_on_kdialog() {
        let runner = Arc::new(ScriptedRunner::new().reply("folder", 0));
        assert_eq!(
            kdialog(&runner).icon(None, None).unwrap(),
            DialogResult::Text("folder".into())
        );
        assert_eq!(runner.last_args().unwrap(), vec!["--geticon", "Desktop", "Applications"]);

        let dialogs = Dialogs::with_runner(Box::new(TextDialog::new("dialog")), runner.clone());
        assert!(matches!(
            dialogs.icon(None, None),
            Err(DialogError::UnsupportedDialogKind { kind: DialogKind::Icon, .. })
        ));
    }

    fn kdialog_with_bus(runner: &Arc<ScriptedRunner>, bus: &FakeBus) -> Dialogs {
        let backend = KDialog::new("/usr/bin/kdialog").with_connector(Arc::new(FakeConnector(bus.clone())));
        Dialogs::with_runner(Box::new(backend), runner.clone())
    }

    #[test]
    fn test_with_progress_drives_window() {
        let runner = Arc::new(ScriptedRunner::new().reply("org.kde.kdialog-4242 /ProgressDialog\n", 0));
        let bus = FakeBus::default();
        let dialogs = kdialog_with_bus(&runner, &bus);
        let steps = dialogs
            .with_progress("Working", 3, |progress| {
                progress.advance(1)?;
                progress.set_label("Almost")?;
                Ok(progress.value())
            })
            .unwrap();
        assert_eq!(steps, 1);
        assert_eq!(
            bus.calls(),
            vec!["maximum=3", "showCancelButton(true)", "value=1", "setLabelText(Almost)", "close"]
        );
    }

    #[test]
    fn test_with_progress_closes_when_work_fails() {
        let runner = Arc::new(ScriptedRunner::new().reply("org.kde.kdialog-4242 /ProgressDialog", 0));
        let bus = FakeBus::default();
        let dialogs = kdialog_with_bus(&runner, &bus);
        let err = dialogs
            .with_progress("Working", 3, |_| -> Result<()> { Err(DialogError::Config("boom".into())) })
            .unwrap_err();
        assert!(matches!(err, DialogError::Config(_)));
        assert_eq!(bus.closes(), 1);
    }

    #[test]
    fn test_progress_setup_failure_closes_window() {
        let runner = Arc::new(ScriptedRunner::new().reply("org.kde.kdialog-4242 /ProgressDialog", 0));
        let bus = FakeBus::failing("showCancelButton");
        let dialogs = kdialog_with_bus(&runner, &bus);
        let ran = std::cell::Cell::new(false);
        let err = dialogs
            .with_progress("Working", 3, |_| {
                ran.set(true);
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, DialogError::Io(_)));
        assert!(!ran.get());
        assert_eq!(bus.closes(), 1);
    }
}
