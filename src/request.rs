//! Dialog requests and results
//!
//! A [`DialogRequest`] is backend-neutral: a kind, a bag of named options and,
//! for selection kinds, the entries to pick from. Adapters translate it into
//! one tool's command line; the answer comes back as a [`DialogResult`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::choices::ChoiceEntry;
use crate::error::{DialogError, Result};

/// Every dialog kind the facade knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    Message,
    Confirm,
    Input,
    SingleSelect,
    MultiSelect,
    Dropdown,
    FilePick,
    Calendar,
    Slider,
    Color,
    Notification,
    TextBox,
    Progress,
    /// Multi-column list answering with the picked rows' cells
    Grid,
    /// KDE icon chooser
    Icon,
}

impl DialogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogKind::Message => "message",
            DialogKind::Confirm => "confirm",
            DialogKind::Input => "input",
            DialogKind::SingleSelect => "single_select",
            DialogKind::MultiSelect => "multi_select",
            DialogKind::Dropdown => "dropdown",
            DialogKind::FilePick => "file_pick",
            DialogKind::Calendar => "calendar",
            DialogKind::Slider => "slider",
            DialogKind::Color => "color",
            DialogKind::Notification => "notification",
            DialogKind::TextBox => "textbox",
            DialogKind::Progress => "progress",
            DialogKind::Grid => "grid",
            DialogKind::Icon => "icon",
        }
    }
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single option value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
    /// (year, month, day)
    Date(i32, u32, u32),
}

impl OptionValue {
    fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "boolean",
            OptionValue::Int(_) => "integer",
            OptionValue::Str(_) => "string",
            OptionValue::Date(..) => "date",
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(v.into())
    }
}

impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        OptionValue::Int(v.into())
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Str(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Str(v)
    }
}

impl From<PathBuf> for OptionValue {
    fn from(v: PathBuf) -> Self {
        OptionValue::Str(v.to_string_lossy().into_owned())
    }
}

impl From<NaiveDate> for OptionValue {
    fn from(d: NaiveDate) -> Self {
        use chrono::Datelike;
        OptionValue::Date(d.year(), d.month(), d.day())
    }
}

/// Named options for a request. Keys an adapter does not understand are ignored.
///
/// Recognised keys: `title`, `text`, `width`, `height`, `timeout`, `content`,
/// `password`, `multiline`, `style`, `yesno`, `cancel`, `continue_btn`, `warning`,
/// `ok_label`, `cancel_label`, `no_wrap`, `action`, `target`, `multiple`,
/// `dir`, `filter`, `confirm_overwrite`, `initial_date`, `min`, `max`,
/// `step`, `value`, `hide_value`, `print_partial`, `initial_color`, `editable`,
/// `default`, `column`, `cancellable`, `group`, `context`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogOptions {
    values: BTreeMap<String, OptionValue>,
}

impl DialogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Insert only when the key is absent (used for configured defaults)
    pub fn set_default(&mut self, key: &str, value: impl Into<OptionValue>) {
        if !self.values.contains_key(key) {
            self.values.insert(key.to_string(), value.into());
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn str(&self, key: &str) -> Result<Option<&str>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(OptionValue::Str(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(mismatch(key, "string", other)),
        }
    }

    pub fn int(&self, key: &str) -> Result<Option<i64>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(OptionValue::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(mismatch(key, "integer", other)),
        }
    }

    pub fn flag(&self, key: &str) -> Result<Option<bool>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(OptionValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(mismatch(key, "boolean", other)),
        }
    }

    pub fn date(&self, key: &str) -> Result<Option<NaiveDate>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(OptionValue::Date(y, m, d)) => NaiveDate::from_ymd_opt(*y, *m, *d)
                .map(Some)
                .ok_or_else(|| DialogError::invalid(key, format!("{y}-{m}-{d} is not a date"))),
            Some(other) => Err(mismatch(key, "date", other)),
        }
    }

    /// Boolean flag with a fallback
    pub fn flag_or(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self.flag(key)?.unwrap_or(default))
    }

    pub fn text(&self) -> Result<&str> {
        Ok(self.str("text")?.unwrap_or(""))
    }
}

fn mismatch(key: &str, expected: &str, got: &OptionValue) -> DialogError {
    DialogError::invalid(key, format!("expected a {expected}, got a {}", got.type_name()))
}

/// Icon/severity of a message box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageStyle {
    #[default]
    Info,
    Warning,
    Error,
}

impl FromStr for MessageStyle {
    type Err = DialogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "info" | "msgbox" => Ok(MessageStyle::Info),
            "warning" | "sorry" => Ok(MessageStyle::Warning),
            "error" => Ok(MessageStyle::Error),
            other => Err(DialogError::invalid(
                "style",
                format!("unknown message box type '{other}'"),
            )),
        }
    }
}

impl MessageStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStyle::Info => "info",
            MessageStyle::Warning => "warning",
            MessageStyle::Error => "error",
        }
    }

    pub(crate) fn from_options(options: &DialogOptions) -> Result<Self> {
        options.str("style")?.map_or(Ok(MessageStyle::Info), |s| s.parse())
    }
}

/// Button flags as a caller states them; only some combinations exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buttons {
    pub yesno: bool,
    pub cancel: bool,
    pub continue_btn: bool,
    pub warning: bool,
}

impl Default for Buttons {
    fn default() -> Self {
        Self {
            yesno: true,
            cancel: false,
            continue_btn: false,
            warning: false,
        }
    }
}

/// A validated button combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSet {
    YesNo,
    YesNoCancel,
    WarningYesNo,
    WarningYesNoCancel,
    WarningContinueCancel,
}

impl Buttons {
    pub fn validate(self) -> Result<ButtonSet> {
        let set = match (self.warning, self.yesno, self.continue_btn, self.cancel) {
            (false, true, false, false) => ButtonSet::YesNo,
            (false, true, false, true) => ButtonSet::YesNoCancel,
            (true, true, false, false) => ButtonSet::WarningYesNo,
            (true, true, false, true) => ButtonSet::WarningYesNoCancel,
            (true, false, true, true) => ButtonSet::WarningContinueCancel,
            _ => {
                return Err(DialogError::invalid(
                    "buttons",
                    format!("can't make a dialog box with {self:?}"),
                ))
            }
        };
        Ok(set)
    }

    pub(crate) fn from_options(options: &DialogOptions) -> Result<Self> {
        let d = Buttons::default();
        Ok(Self {
            yesno: options.flag_or("yesno", d.yesno)?,
            cancel: options.flag_or("cancel", d.cancel)?,
            continue_btn: options.flag_or("continue_btn", d.continue_btn)?,
            warning: options.flag_or("warning", d.warning)?,
        })
    }
}

impl ButtonSet {
    pub fn has_cancel(&self) -> bool {
        matches!(
            self,
            ButtonSet::YesNoCancel | ButtonSet::WarningYesNoCancel | ButtonSet::WarningContinueCancel
        )
    }

    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ButtonSet::WarningYesNo | ButtonSet::WarningYesNoCancel | ButtonSet::WarningContinueCancel
        )
    }

    /// Labels for the accept/decline buttons
    pub fn labels(&self) -> (&'static str, &'static str) {
        match self {
            ButtonSet::WarningContinueCancel => ("Continue", "Cancel"),
            _ => ("Yes", "No"),
        }
    }
}

/// Open or save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileAction {
    #[default]
    Open,
    Save,
}

/// What kind of location the picker returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileTarget {
    #[default]
    File,
    Url,
    Directory,
}

/// File picker options, decoded from [`DialogOptions`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FilePick {
    pub action: FileAction,
    pub target: FileTarget,
    pub multiple: bool,
    pub dir: Option<String>,
    pub filter: Option<String>,
    pub confirm_overwrite: bool,
}

impl FilePick {
    pub(crate) fn from_options(options: &DialogOptions) -> Result<Self> {
        let action = match options.str("action")? {
            None | Some("open") => FileAction::Open,
            Some("save") => FileAction::Save,
            Some(other) => {
                return Err(DialogError::invalid("action", format!("expected open or save, got '{other}'")))
            }
        };
        let target = match options.str("target")? {
            None | Some("file") => FileTarget::File,
            Some("url") => FileTarget::Url,
            Some("directory") => FileTarget::Directory,
            Some(other) => {
                return Err(DialogError::invalid(
                    "target",
                    format!("expected file, url or directory, got '{other}'"),
                ))
            }
        };
        Ok(Self {
            action,
            target,
            // Multiple selection only makes sense when opening
            multiple: options.flag_or("multiple", false)? && action == FileAction::Open,
            dir: options.str("dir")?.map(str::to_string),
            filter: options.str("filter")?.map(str::to_string),
            confirm_overwrite: options.flag_or("confirm_overwrite", false)?,
        })
    }
}

/// Slider bounds, decoded from [`DialogOptions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SliderRange {
    pub min: i64,
    pub max: i64,
    pub step: i64,
    pub value: i64,
}

impl SliderRange {
    pub(crate) fn from_options(options: &DialogOptions) -> Result<Self> {
        let min = options.int("min")?.unwrap_or(0);
        let max = options.int("max")?.unwrap_or(100);
        let step = options.int("step")?.unwrap_or(1);
        if min > max {
            return Err(DialogError::invalid("min", format!("{min} is greater than max {max}")));
        }
        if step <= 0 {
            return Err(DialogError::invalid("step", "must be positive"));
        }
        let value = options.int("value")?.unwrap_or(min).clamp(min, max);
        Ok(Self { min, max, step, value })
    }
}

/// Header and rows for [`DialogKind::Grid`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Every row must have one cell per column
    pub fn new<C, R, S>(columns: C, rows: R) -> Result<Self>
    where
        C: IntoIterator<Item = S>,
        R: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(DialogError::invalid("columns", "a grid needs at least one column"));
        }
        let mut table = Self {
            rows: Vec::new(),
            columns,
        };
        for (i, row) in rows.into_iter().enumerate() {
            let row: Vec<String> = row.into_iter().map(Into::into).collect();
            if row.len() != table.columns.len() {
                return Err(DialogError::invalid(
                    "rows",
                    format!("row {i} has {} cells, expected {}", row.len(), table.columns.len()),
                ));
            }
            table.rows.push(row);
        }
        Ok(table)
    }
}

/// Callback run once a request produced a non-cancelled answer
pub type Completion = Box<dyn FnOnce(&DialogResult)>;

/// A backend-neutral dialog request
pub struct DialogRequest {
    pub kind: DialogKind,
    pub options: DialogOptions,
    /// Entries for selection kinds, in display order
    pub entries: Vec<ChoiceEntry>,
    pub table: Option<Table>,
    on_complete: Option<Completion>,
}

impl fmt::Debug for DialogRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogRequest")
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("entries", &self.entries)
            .field("table", &self.table)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl DialogRequest {
    pub fn new(kind: DialogKind) -> Self {
        Self {
            kind,
            options: DialogOptions::default(),
            entries: Vec::new(),
            table: None,
            on_complete: None,
        }
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.set(key, value);
        self
    }

    pub fn options(mut self, options: DialogOptions) -> Self {
        self.options = options;
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.option("text", text.into())
    }

    pub fn entries(mut self, entries: Vec<ChoiceEntry>) -> Self {
        self.entries = entries;
        self
    }

    pub fn table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }

    pub fn on_complete(mut self, f: impl FnOnce(&DialogResult) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Run the completion callback unless the user backed out
    pub(crate) fn complete(&mut self, result: &DialogResult) {
        if result.is_cancelled() || matches!(result, DialogResult::Boolean(false)) {
            return;
        }
        if let Some(f) = self.on_complete.take() {
            f(result);
        }
    }
}

/// An 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The answer to a dialog. Exactly one variant per request kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DialogResult {
    Boolean(bool),
    Text(String),
    List(Vec<String>),
    Date(NaiveDate),
    Integer(i64),
    Color(Rgb),
    /// The user closed or cancelled the dialog
    Cancelled,
}

impl DialogResult {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DialogResult::Cancelled)
    }

    /// True for an accepted boolean answer
    pub fn accepted(&self) -> bool {
        matches!(self, DialogResult::Boolean(true))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DialogResult::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            DialogResult::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DialogResult::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DialogResult::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgb> {
        match self {
            DialogResult::Color(c) => Some(*c),
            _ => None,
        }
    }
}
