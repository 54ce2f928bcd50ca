//! Backend detection
//!
//! Picks one installed tool for the current session. Detection reads an
//! [`Environment`] snapshot so the rules can be exercised without touching the
//! real process environment.

use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::backend::BackendKind;
use crate::config::{BinaryOverrides, SelectorConfig};
use crate::error::{DialogError, Result};

/// Where an app bundle install of cocoaDialog keeps its executable
pub const COCOA_BUNDLE_PATH: &str = "/Applications/cocoaDialog.app/Contents/MacOS/cocoaDialog";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    /// Linux and the BSDs
    Unix,
    MacOs,
    Windows,
    Other,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            OsFamily::MacOs
        } else if cfg!(windows) {
            OsFamily::Windows
        } else if cfg!(unix) {
            OsFamily::Unix
        } else {
            OsFamily::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Desktop {
    Kde,
    Gnome,
    Other,
}

impl Desktop {
    /// Classify from `XDG_CURRENT_DESKTOP` (colon-separated) and `KDE_FULL_SESSION`
    pub fn from_vars(current_desktop: Option<&str>, kde_full_session: Option<&str>) -> Self {
        let names: Vec<String> = current_desktop
            .unwrap_or("")
            .split(':')
            .map(|s| s.trim().to_ascii_uppercase())
            .collect();
        if names.iter().any(|n| n == "KDE") || kde_full_session.is_some_and(|v| v.eq_ignore_ascii_case("true")) {
            Desktop::Kde
        } else if names.iter().any(|n| n == "GNOME" || n.ends_with("GNOME")) {
            Desktop::Gnome
        } else {
            Desktop::Other
        }
    }

    /// The dialog tool that belongs to this desktop
    fn native(self) -> Option<BackendKind> {
        match self {
            Desktop::Kde => Some(BackendKind::Kdialog),
            Desktop::Gnome => Some(BackendKind::Zenity),
            Desktop::Other => None,
        }
    }
}

/// What detection looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub os: OsFamily,
    /// An X11 or Wayland session is reachable
    pub display: bool,
    pub desktop: Desktop,
    /// stdin and stdout are both terminals
    pub interactive: bool,
    /// `PATH` to search; `None` searches nothing
    pub search_path: Option<OsString>,
    pub cwd: PathBuf,
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

impl Environment {
    /// Snapshot the current process
    pub fn capture() -> Self {
        let desktop = Desktop::from_vars(
            non_empty("XDG_CURRENT_DESKTOP").as_deref(),
            non_empty("KDE_FULL_SESSION").as_deref(),
        );
        Self {
            os: OsFamily::current(),
            display: non_empty("DISPLAY").is_some() || non_empty("WAYLAND_DISPLAY").is_some(),
            desktop,
            interactive: std::io::stdin().is_terminal() && std::io::stdout().is_terminal(),
            search_path: std::env::var_os("PATH"),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Look `binary` up on the search path
    pub fn find(&self, binary: &str) -> Option<PathBuf> {
        which::which_in(binary, self.search_path.as_ref(), &self.cwd).ok()
    }

    /// Whether `kind` can draw in this session at all
    fn usable(&self, kind: BackendKind) -> bool {
        if kind.needs_terminal() {
            return self.interactive;
        }
        match (self.os, kind) {
            (OsFamily::MacOs, BackendKind::CocoaDialog) => true,
            (_, BackendKind::CocoaDialog) => false,
            (OsFamily::Windows, _) => true,
            (_, _) => self.display,
        }
    }
}

/// The outcome of a successful detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detected {
    pub kind: BackendKind,
    pub program: PathBuf,
}

/// Lifecycle of the shared backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorState {
    Undetected,
    Detected(BackendKind),
    Unavailable(String),
}

/// Locate the executable for `kind`: explicit override, then `PATH`, then
/// the app bundle for cocoaDialog on macOS
pub fn resolve(kind: BackendKind, overrides: &BinaryOverrides, env: &Environment) -> Option<PathBuf> {
    if let Some(path) = overrides.get(kind) {
        return path.is_file().then(|| path.to_path_buf());
    }
    env.find(kind.binary()).or_else(|| {
        let bundle = Path::new(COCOA_BUNDLE_PATH);
        (kind == BackendKind::CocoaDialog && env.os == OsFamily::MacOs && bundle.is_file())
            .then(|| bundle.to_path_buf())
    })
}

/// Tools to try, in order, for this environment
pub fn candidates(env: &Environment, config: &SelectorConfig) -> Vec<BackendKind> {
    match env.os {
        OsFamily::MacOs => vec![BackendKind::CocoaDialog, BackendKind::Dialog],
        OsFamily::Windows => config
            .priority
            .iter()
            .copied()
            .filter(|k| matches!(k, BackendKind::Yad | BackendKind::Zenity | BackendKind::Dialog))
            .collect(),
        OsFamily::Unix | OsFamily::Other => {
            let mut order: Vec<BackendKind> = Vec::with_capacity(config.priority.len() + 1);
            if config.prefer_desktop_native {
                if let Some(native) = env.desktop.native() {
                    order.push(native);
                }
            }
            for kind in &config.priority {
                if !order.contains(kind) && *kind != BackendKind::CocoaDialog {
                    order.push(*kind);
                }
            }
            order
        }
    }
}

/// Pick a backend. A forced backend skips the rules but must still resolve.
pub fn detect(env: &Environment, config: &SelectorConfig, overrides: &BinaryOverrides) -> Result<Detected> {
    if let Some(kind) = config.backend {
        let program = resolve(kind, overrides, env)
            .ok_or_else(|| DialogError::BackendUnavailable(format!("{} was requested but is not installed", kind)))?;
        info!("Using forced backend {} at {}", kind, program.display());
        return Ok(Detected { kind, program });
    }

    let order = candidates(env, config);
    for kind in &order {
        if !env.usable(*kind) {
            debug!("Skipping {}: no display or terminal for it", kind);
            continue;
        }
        match resolve(*kind, overrides, env) {
            Some(program) => {
                info!("Selected backend {} at {}", kind, program.display());
                return Ok(Detected { kind: *kind, program });
            }
            None => debug!("{} not found", kind),
        }
    }

    let tried: Vec<&str> = order.iter().map(|k| k.name()).collect();
    Err(DialogError::BackendUnavailable(format!(
        "no usable dialog tool (display: {}, terminal: {}, tried: {})",
        env.display,
        env.interactive,
        tried.join(", ")
    )))
}
