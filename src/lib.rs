//! dialog-shim
//!
//! One dialog API over the native dialog tools: kdialog, zenity, yad, the
//! text-mode `dialog` and cocoaDialog. Pick a backend automatically with
//! [`dialogs()`] or build a [`Dialogs`] around a specific adapter.
//!
//! ```no_run
//! use dialog_shim::{dialogs, Choices, MessageStyle};
//!
//! let d = dialogs()?;
//! d.message("Kittens are cute.", MessageStyle::Info)?;
//!
//! let mut lunch = Choices::new(["Sandwich", "Soup", "Salad"]);
//! d.multi_select(&mut lunch, "What's for lunch?")?;
//! println!("{:?}", lunch.selected_labels());
//! # Ok::<(), dialog_shim::DialogError>(())
//! ```

pub mod backend;
pub mod choices;
pub mod command;
pub mod config;
pub mod dialogs;
pub mod error;
pub mod parse;
pub mod progress;
pub mod request;
pub mod runner;
pub mod selector;

pub use backend::{Backend, BackendKind, CocoaDialog, KDialog, TextDialog, Yad, Zenity};
pub use choices::{ChoiceEntry, Choices};
pub use config::Config;
pub use dialogs::{autosetup, dialogs, selector_state, Dialogs};
pub use error::{DialogError, Result};
pub use progress::ProgressHandle;
pub use request::{
    Buttons, DialogKind, DialogOptions, DialogRequest, DialogResult, MessageStyle, OptionValue, Rgb, Table,
};
pub use runner::{ProcessRunner, RunOutput, ScriptedRunner, SystemRunner};
pub use selector::{Detected, Environment, SelectorState};
