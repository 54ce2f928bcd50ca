//! Configuration for dialog-shim
//!
//! Read from `$XDG_CONFIG_HOME/dialog-shim/config.toml` (or the file named by
//! `DIALOG_SHIM_CONFIG`). A missing file means defaults. `DIALOG_SHIM_BACKEND`
//! overrides the configured backend.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::backend::BackendKind;
use crate::error::{DialogError, Result};
use crate::request::{DialogKind, DialogRequest};

pub const CONFIG_ENV: &str = "DIALOG_SHIM_CONFIG";
pub const BACKEND_ENV: &str = "DIALOG_SHIM_BACKEND";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub selector: SelectorConfig,
    pub binaries: BinaryOverrides,
    pub defaults: DefaultsConfig,
}

/// How a backend gets picked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Tools to try, best first
    pub priority: Vec<BackendKind>,
    /// Promote the desktop's own tool (kdialog on KDE, zenity on GNOME) ahead
    /// of `priority`. Off unless asked for.
    pub prefer_desktop_native: bool,
    /// Skip detection and use this tool
    pub backend: Option<BackendKind>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            priority: vec![
                BackendKind::Kdialog,
                BackendKind::Yad,
                BackendKind::Zenity,
                BackendKind::Dialog,
            ],
            prefer_desktop_native: false,
            backend: None,
        }
    }
}

/// Explicit executable paths, bypassing the `PATH` lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryOverrides {
    pub kdialog: Option<PathBuf>,
    pub yad: Option<PathBuf>,
    pub zenity: Option<PathBuf>,
    pub dialog: Option<PathBuf>,
    pub cocoadialog: Option<PathBuf>,
}

impl BinaryOverrides {
    pub fn get(&self, kind: BackendKind) -> Option<&Path> {
        match kind {
            BackendKind::Kdialog => self.kdialog.as_deref(),
            BackendKind::Yad => self.yad.as_deref(),
            BackendKind::Zenity => self.zenity.as_deref(),
            BackendKind::Dialog => self.dialog.as_deref(),
            BackendKind::CocoaDialog => self.cocoadialog.as_deref(),
        }
    }
}

/// Options filled into every request that doesn't set them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Window title
    pub title: Option<String>,
    /// Seconds a notification stays up
    pub notification_timeout_secs: u32,
    pub textbox_width: Option<u32>,
    pub textbox_height: Option<u32>,
    /// Where file pickers open; the home directory otherwise
    pub start_dir: Option<PathBuf>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            title: None,
            notification_timeout_secs: 3,
            textbox_width: None,
            textbox_height: None,
            start_dir: None,
        }
    }
}

impl DefaultsConfig {
    /// Fill unset request options
    pub fn apply(&self, request: &mut DialogRequest) {
        let opts = &mut request.options;
        if let Some(title) = &self.title {
            opts.set_default("title", title.as_str());
        }
        match request.kind {
            DialogKind::Notification => opts.set_default("timeout", self.notification_timeout_secs),
            DialogKind::TextBox => {
                if let Some(w) = self.textbox_width {
                    opts.set_default("width", w);
                }
                if let Some(h) = self.textbox_height {
                    opts.set_default("height", h);
                }
            }
            DialogKind::FilePick => {
                if let Some(dir) = &self.start_dir {
                    opts.set_default("dir", dir.clone());
                }
            }
            _ => {}
        }
    }
}

impl Config {
    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dialog-shim")
            .join("config.toml")
    }

    /// Load from `DIALOG_SHIM_CONFIG` or the default path, then apply the environment
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_path);
        let mut config = Self::load_from(&path)?;
        config.overlay(std::env::var(BACKEND_ENV).ok().as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {:?}", path);
            let content = std::fs::read_to_string(path)
                .map_err(|e| DialogError::Config(format!("{}: {}", path.display(), e)))?;

            toml::from_str(&content).map_err(|e| DialogError::Config(format!("{}: {}", path.display(), e)))
        } else {
            debug!("Config not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DialogError::Config(format!("Failed to create directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| DialogError::Config(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| DialogError::Config(format!("{}: {}", path.display(), e)))?;

        info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Apply a forced backend name from the environment
    pub fn overlay(&mut self, backend: Option<&str>) -> Result<()> {
        match backend.map(str::trim) {
            None | Some("") => {}
            Some(name) => {
                let kind = name
                    .parse::<BackendKind>()
                    .map_err(|_| DialogError::Config(format!("{BACKEND_ENV}: unknown backend '{name}'")))?;
                debug!("Backend forced to {} by {}", kind, BACKEND_ENV);
                self.selector.backend = Some(kind);
            }
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.selector.priority.is_empty() && self.selector.backend.is_none() {
            return Err(DialogError::Config(
                "selector.priority must name at least one backend".into(),
            ));
        }

        for (i, kind) in self.selector.priority.iter().enumerate() {
            if self.selector.priority[..i].contains(kind) {
                return Err(DialogError::Config(format!("selector.priority lists {kind} twice")));
            }
        }

        if self.defaults.notification_timeout_secs == 0 {
            return Err(DialogError::Config(
                "defaults.notification_timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }
}
