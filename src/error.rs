//! Error types for dialog-shim

use thiserror::Error;

use crate::request::DialogKind;

#[derive(Error, Debug)]
pub enum DialogError {
    #[error("{backend} cannot show a {kind} dialog")]
    UnsupportedDialogKind {
        backend: &'static str,
        kind: DialogKind,
    },

    #[error("Invalid option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    #[error("No dialog backend available: {0}")]
    BackendUnavailable(String),

    #[error("Failed to run {program}: {reason}")]
    ExternalProcessFailure { program: String, reason: String },

    #[error("Could not parse {kind} output {output:?}")]
    ParseFailure { kind: DialogKind, output: String },

    #[error("Progress dialog is already closed")]
    ProgressClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("D-Bus error: {0}")]
    DBus(#[from] zbus::Error),
}

impl DialogError {
    pub(crate) fn invalid(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(kind: DialogKind, output: impl Into<String>) -> Self {
        Self::ParseFailure {
            kind,
            output: output.into(),
        }
    }
}

impl DialogError {
    /// A fresh copy of a stored error, same variant and message
    pub(crate) fn replay(&self) -> Self {
        match self {
            Self::UnsupportedDialogKind { backend, kind } => Self::UnsupportedDialogKind {
                backend: *backend,
                kind: *kind,
            },
            Self::InvalidOption { option, reason } => Self::invalid(option.clone(), reason.clone()),
            Self::BackendUnavailable(reason) => Self::BackendUnavailable(reason.clone()),
            Self::ExternalProcessFailure { program, reason } => Self::ExternalProcessFailure {
                program: program.clone(),
                reason: reason.clone(),
            },
            Self::ParseFailure { kind, output } => Self::parse(*kind, output.clone()),
            Self::ProgressClosed => Self::ProgressClosed,
            Self::Config(reason) => Self::Config(reason.clone()),
            Self::Io(e) => Self::Io(std::io::Error::new(e.kind(), e.to_string())),
            Self::DBus(e) => Self::DBus(zbus::Error::Failure(e.to_string())),
        }
    }
}

impl From<zbus::fdo::Error> for DialogError {
    fn from(e: zbus::fdo::Error) -> Self {
        Self::DBus(e.into())
    }
}

pub type Result<T> = std::result::Result<T, DialogError>;
