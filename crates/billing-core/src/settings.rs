use crate::error::{BillingError, Result};
use crate::time_utils::TimezoneHandler;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const VIEWS: [&str; 2] = ["list", "charts"];
const FORMATS: [&str; 2] = ["table", "json"];

/// Name of the per-user state directory under `$HOME`.
pub const APP_DIR_NAME: &str = ".energy-dashboard";

/// Root of the per-user state directory, `~/.energy-dashboard/`.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Energy billing dashboard: invoice listing, filters and consumption charts
#[derive(Parser, Debug, Clone)]
#[command(
    name = "energy-dashboard",
    about = "Energy billing dashboard: invoice listing, filters and consumption charts",
    version
)]
pub struct Settings {
    /// Dashboard tab to show
    #[arg(long, default_value = "list", value_parser = VIEWS)]
    pub view: String,

    /// Invoice listing: a JSON file or a directory of JSON files
    #[arg(long, env = "ENERGY_DASHBOARD_SOURCE")]
    pub source: Option<PathBuf>,

    /// Directory holding the invoice documents referenced by `fileName`
    #[arg(long)]
    pub files_dir: Option<PathBuf>,

    /// Keep only invoices whose client number contains this text
    #[arg(long, default_value = "")]
    pub client: String,

    /// Lookback window: 1m, 3m, 6m, 1y or all
    #[arg(long, default_value = "")]
    pub period: String,

    /// Timezone used for "now" and for naive invoice dates (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Output format
    #[arg(long, default_value = "table", value_parser = FORMATS)]
    pub format: String,

    /// Drop invoices with malformed numbers from the charts instead of failing
    #[arg(long)]
    pub skip_invalid: bool,

    /// Download the invoice document with this file name
    #[arg(long)]
    pub download: Option<String>,

    /// Where downloaded documents are written (defaults to the current directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.energy-dashboard/last_used.json`.
///
/// Filter criteria are deliberately absent: they belong to a single session.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(APP_DIR_NAME).join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    ///
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &Path) -> std::io::Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation with an explicit argument list and config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("could not clear {}: {}", config_path.display(), e);
            }
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "source") && settings.source.is_none() {
            settings.source = last.source;
        }
        if !is_arg_explicitly_set(&matches, "files_dir") && settings.files_dir.is_none() {
            settings.files_dir = last.files_dir;
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::debug!("could not persist settings: {}", e);
        }

        settings
    }

    /// Resolve the `"auto"` timezone and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            let detected = crate::time_utils::get_system_timezone();
            settings.timezone = if TimezoneHandler::validate_timezone(&detected) {
                detected
            } else {
                tracing::warn!("system timezone {:?} is not recognised; using UTC", detected);
                "UTC".to_string()
            };
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// Reject values that clap cannot check: the timezone name, and view or
    /// format values merged in from `last_used.json`.
    pub fn validate(&self) -> Result<()> {
        if !TimezoneHandler::validate_timezone(&self.timezone) {
            return Err(BillingError::Config(format!(
                "unknown timezone {:?}",
                self.timezone
            )));
        }
        if !VIEWS.contains(&self.view.as_str()) {
            return Err(BillingError::Config(format!("unknown view {:?}", self.view)));
        }
        if !FORMATS.contains(&self.format.as_str()) {
            return Err(BillingError::Config(format!(
                "unknown output format {:?}",
                self.format
            )));
        }
        Ok(())
    }

    /// Configured listing path, or `~/.energy-dashboard/invoices.json`.
    pub fn source_path(&self) -> PathBuf {
        self.source
            .clone()
            .unwrap_or_else(|| app_dir().join("invoices.json"))
    }

    /// Configured document directory, or `~/.energy-dashboard/invoices/`.
    pub fn files_dir_path(&self) -> PathBuf {
        self.files_dir
            .clone()
            .unwrap_or_else(|| app_dir().join("invoices"))
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            view: Some(s.view.clone()),
            source: s.source.clone(),
            files_dir: s.files_dir.clone(),
            timezone: Some(s.timezone.clone()),
            format: Some(s.format.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line.
///
/// clap stores the arg id under the field name (underscores), not the flag.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
