//! Argument vector assembly
//!
//! Every backend builds its command line through [`CommandLine`]. Values are
//! pushed as separate argv entries; when the dialog's answer will be split on
//! a separator, values containing that separator are refused up front.

use crate::error::{DialogError, Result};
use crate::request::{DialogOptions, OptionValue};

/// How a backend spells an option that takes a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagStyle {
    /// `--width=40`
    Joined,
    /// `--width 40`
    Separate,
}

/// Maps a request option key to a backend flag
pub type FlagTable = &'static [(&'static str, &'static str)];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    args: Vec<String>,
    guards: Vec<char>,
}

impl CommandLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse values containing `separator` from here on. Guards add up.
    pub fn guard(&mut self, separator: char) -> &mut Self {
        if !self.guards.contains(&separator) {
            self.guards.push(separator);
        }
        self
    }

    pub fn separators(&self) -> &[char] {
        &self.guards
    }

    /// Push a literal flag
    pub fn flag(&mut self, flag: &str) -> &mut Self {
        self.args.push(flag.to_string());
        self
    }

    pub fn flag_if(&mut self, cond: bool, flag: &str) -> &mut Self {
        if cond {
            self.flag(flag);
        }
        self
    }

    /// Push a caller-supplied value as its own argument
    pub fn value(&mut self, value: impl AsRef<str>) -> Result<&mut Self> {
        let value = value.as_ref();
        self.check(value)?;
        self.args.push(value.to_string());
        Ok(self)
    }

    /// `flag value` as two arguments
    pub fn opt(&mut self, flag: &str, value: impl AsRef<str>) -> Result<&mut Self> {
        self.flag(flag).value(value)
    }

    /// `flag=value` as one argument
    pub fn opt_joined(&mut self, flag: &str, value: impl AsRef<str>) -> Result<&mut Self> {
        let value = value.as_ref();
        self.check(value)?;
        self.args.push(format!("{flag}={value}"));
        Ok(self)
    }

    /// `flag=a|b|c` as one argument; no value may contain `sep`
    pub fn opt_list(&mut self, flag: &str, values: &[&str], sep: char) -> Result<&mut Self> {
        for value in values {
            self.check(value)?;
            if value.contains(sep) {
                return Err(DialogError::invalid(
                    "argument",
                    format!("{value:?} contains the list separator {sep:?}"),
                ));
            }
        }
        let joined = values.join(sep.to_string().as_str());
        self.args.push(format!("{flag}={joined}"));
        Ok(self)
    }

    pub fn opt_styled(&mut self, style: FlagStyle, flag: &str, value: impl AsRef<str>) -> Result<&mut Self> {
        match style {
            FlagStyle::Joined => self.opt_joined(flag, value),
            FlagStyle::Separate => self.opt(flag, value),
        }
    }

    /// Push every option from `table` that is present in `options`.
    ///
    /// Strings and integers become values; a `true` boolean becomes a bare flag.
    pub fn options(&mut self, options: &DialogOptions, table: FlagTable, style: FlagStyle) -> Result<&mut Self> {
        for (key, flag) in table {
            match options.get(key) {
                None | Some(OptionValue::Bool(false)) => {}
                Some(OptionValue::Bool(true)) => {
                    self.flag(flag);
                }
                Some(OptionValue::Str(s)) => {
                    self.opt_styled(style, flag, s)?;
                }
                Some(OptionValue::Int(n)) => {
                    self.opt_styled(style, flag, n.to_string())?;
                }
                Some(OptionValue::Date(..)) => {
                    return Err(DialogError::invalid(*key, "a date is not valid here"));
                }
            }
        }
        Ok(self)
    }

    fn check(&self, value: &str) -> Result<()> {
        if value.contains('\0') {
            return Err(DialogError::invalid("argument", "values cannot contain NUL bytes"));
        }
        if let Some(sep) = self.guards.iter().find(|&&sep| value.contains(sep)) {
            return Err(DialogError::invalid(
                "argument",
                format!("{value:?} contains the output separator {sep:?}"),
            ));
        }
        Ok(())
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }
}
