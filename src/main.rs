//! dialog-shim command line
//!
//! Shows one dialog with whatever tool the session has and prints the answer
//! as JSON. Exits 1 when the user cancelled.
//!
//! # Usage
//!
//! ```bash
//! dialog-shim detect
//! dialog-shim message --style warning "Disk almost full"
//! dialog-shim confirm --cancel "Save changes?"
//! dialog-shim choose --multi "Lunch?" Sandwich Soup Salad
//! dialog-shim --backend dialog calendar "Pick a day" --date 2009-01-15
//! dialog-shim grid "Files" --column Name --column Size a.txt 3 b.txt 9
//! ```

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dialog_shim::{
    BackendKind, Buttons, Choices, Config, DialogKind, DialogOptions, DialogRequest, DialogResult, Dialogs, MessageStyle,
    ProgressHandle, Rgb, Table,
};

#[derive(Parser, Debug)]
#[command(name = "dialog-shim")]
#[command(about = "Show native dialogs from scripts")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Use this tool instead of detecting one (kdialog, yad, zenity, dialog, cocoadialog)
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// Config file (default: ~/.config/dialog-shim/config.toml)
    #[arg(long, global = true, env = "DIALOG_SHIM_CONFIG")]
    config: Option<PathBuf>,

    /// Window title
    #[arg(long, global = true)]
    title: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the backend that would be used
    Detect,

    /// Show a message box
    Message {
        text: String,
        /// info, warning or error
        #[arg(long, short, default_value = "info")]
        style: MessageStyle,
    },

    /// Ask a yes/no question
    Confirm {
        text: String,
        /// Add a Cancel button
        #[arg(long)]
        cancel: bool,
        /// Continue/Cancel instead of Yes/No (implies --warning and --cancel)
        #[arg(long = "continue")]
        continue_btn: bool,
        /// Warning icon
        #[arg(long)]
        warning: bool,
    },

    /// Ask for a line of text
    Input {
        prompt: String,
        /// Initial content
        #[arg(long)]
        default: Option<String>,
        /// Hide what is typed
        #[arg(long)]
        password: bool,
        /// Multi-line editor
        #[arg(long)]
        multiline: bool,
    },

    /// Pick from a list
    Choose {
        label: String,
        #[arg(required = true)]
        items: Vec<String>,
        /// Allow several picks
        #[arg(long, conflicts_with = "dropdown")]
        multi: bool,
        /// Show a combo box
        #[arg(long)]
        dropdown: bool,
        /// Preselected item (repeat for --multi)
        #[arg(long)]
        default: Vec<String>,
    },

    /// Pick a file or directory
    File {
        /// Save instead of open
        #[arg(long)]
        save: bool,
        #[arg(long)]
        directory: bool,
        #[arg(long)]
        multiple: bool,
        /// Starting directory
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Filter pattern, e.g. "*.png *.jpg"
        #[arg(long)]
        filter: Option<String>,
    },

    /// Pick a date
    Calendar {
        #[arg(default_value = "")]
        text: String,
        /// Initial date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Pick a number
    Slider {
        #[arg(default_value = "")]
        text: String,
        #[arg(long, default_value = "0")]
        min: i64,
        #[arg(long, default_value = "100")]
        max: i64,
        #[arg(long, default_value = "1")]
        step: i64,
        /// Hide the number next to the scale (zenity, yad)
        #[arg(long)]
        hide_value: bool,
    },

    /// Pick a row from a table (zenity, yad)
    Grid {
        label: String,
        /// Column header, once per column
        #[arg(long = "column", required = true)]
        columns: Vec<String>,
        /// Cells, row after row
        cells: Vec<String>,
        #[arg(long)]
        multiple: bool,
    },

    /// Pick an icon by name (kdialog only)
    Icon {
        /// Icon group, e.g. Desktop or Toolbar
        #[arg(long)]
        group: Option<String>,
        /// Icon context, e.g. Applications or MimeTypes
        #[arg(long)]
        context: Option<String>,
    },

    /// Pick a colour
    Color {
        /// Initial colour (#rrggbb)
        #[arg(long)]
        initial: Option<String>,
    },

    /// Show a passive notification
    Notify {
        text: String,
        /// Seconds before it disappears
        #[arg(long)]
        timeout: Option<u32>,
    },

    /// Show a file (or stdin) in a scrollable box
    Textbox {
        file: Option<PathBuf>,
        /// Return the edited text
        #[arg(long)]
        editable: bool,
    },

    /// Run a demo progress bar (kdialog only)
    Progress {
        #[arg(default_value = "Working...")]
        label: String,
        #[arg(long, default_value = "10")]
        steps: u32,
        /// Delay per step in milliseconds
        #[arg(long, default_value = "300")]
        delay_ms: u64,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("{s}: {e}"))
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            config.overlay(std::env::var(dialog_shim::config::BACKEND_ENV).ok().as_deref())?;
            config
        }
        None => Config::load()?,
    };
    if let Some(kind) = args.backend {
        config.selector.backend = Some(kind);
    }
    if let Some(title) = &args.title {
        config.defaults.title = Some(title.clone());
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries the answer, so logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    let dialogs = Dialogs::detect(&config)?;
    info!("Using {} ({})", dialogs.kind(), dialogs.program().display());

    let result = match args.command {
        Commands::Detect => {
            let out = json!({
                "backend": dialogs.kind(),
                "program": dialogs.program(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(());
        }

        Commands::Message { text, style } => dialogs.message(&text, style)?,

        Commands::Confirm {
            text,
            cancel,
            continue_btn,
            warning,
        } => {
            let buttons = if continue_btn {
                Buttons {
                    yesno: false,
                    cancel: true,
                    continue_btn: true,
                    warning: true,
                }
            } else {
                Buttons {
                    cancel,
                    warning,
                    ..Buttons::default()
                }
            };
            dialogs.confirm(&text, buttons)?
        }

        Commands::Input {
            prompt,
            default,
            password,
            multiline,
        } => {
            let mut options = DialogOptions::new()
                .with("password", password)
                .with("multiline", multiline);
            if let Some(content) = default {
                options.set("content", content);
            }
            dialogs.input(&prompt, options)?
        }

        Commands::Choose {
            label,
            items,
            multi,
            dropdown,
            default,
        } => {
            let mut choices = Choices::new(items);
            for wanted in &default {
                let id = choices
                    .entries()
                    .iter()
                    .find(|e| &e.label == wanted)
                    .map(|e| e.id.clone())
                    .with_context(|| format!("--default {wanted:?} is not one of the items"))?;
                choices.preselect(&id)?;
            }
            let kind = match (multi, dropdown) {
                (true, _) => DialogKind::MultiSelect,
                (false, true) => DialogKind::Dropdown,
                (false, false) => DialogKind::SingleSelect,
            };
            let result = dialogs.select(kind, &mut choices, &label, DialogOptions::new())?;
            debug!("Selected {:?}", choices.selected_ids());
            result
        }

        Commands::File {
            save,
            directory,
            multiple,
            dir,
            filter,
        } => {
            let mut options = DialogOptions::new()
                .with("action", if save { "save" } else { "open" })
                .with("target", if directory { "directory" } else { "file" })
                .with("multiple", multiple)
                .with("confirm_overwrite", save);
            if let Some(dir) = dir {
                options.set("dir", dir);
            }
            if let Some(filter) = filter {
                options.set("filter", filter);
            }
            dialogs.file_pick(options)?
        }

        Commands::Calendar { text, date } => dialogs.calendar(&text, date)?,

        Commands::Slider {
            text,
            min,
            max,
            step,
            hide_value,
        } => dialogs.show(
            DialogRequest::new(DialogKind::Slider)
                .text(&text)
                .option("min", min)
                .option("max", max)
                .option("step", step)
                .option("hide_value", hide_value),
        )?,

        Commands::Grid {
            label,
            columns,
            cells,
            multiple,
        } => {
            let rows: Vec<Vec<String>> = cells.chunks(columns.len()).map(<[String]>::to_vec).collect();
            let table = Table::new(columns, rows).context("grid cells must fill whole rows")?;
            dialogs.grid(&label, table, multiple)?
        }

        Commands::Icon { group, context } => dialogs.icon(group.as_deref(), context.as_deref())?,

        Commands::Color { initial } => {
            let initial: Option<Rgb> = initial
                .as_deref()
                .map(dialog_shim::parse::parse_color)
                .transpose()
                .context("--initial")?;
            dialogs.color(initial)?
        }

        Commands::Notify { text, timeout } => dialogs.notify(&text, timeout)?,

        Commands::Textbox { file, editable } => {
            let text = match file {
                Some(path) => {
                    std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?
                }
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
                    buf
                }
            };
            dialogs.textbox(&text, editable)?
        }

        Commands::Progress {
            label,
            steps,
            delay_ms,
        } => {
            let (done, cancelled) = dialogs.with_progress(&label, steps, |progress| {
                for step in 1..=steps {
                    if progress.was_cancelled()? {
                        return Ok((step - 1, true));
                    }
                    std::thread::sleep(Duration::from_millis(delay_ms));
                    progress.set_value(step)?;
                    progress.set_label(&format!("{label} ({step}/{steps})"))?;
                }
                Ok((steps, false))
            })?;
            if cancelled {
                DialogResult::Cancelled
            } else {
                DialogResult::Integer(done.into())
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&result)?);

    // Exit with error if cancelled
    if result.is_cancelled() {
        std::process::exit(1);
    }

    Ok(())
}
