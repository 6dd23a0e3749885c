//! Runtime settings.
//!
//! Settings are layered, later sources winning:
//!
//! 1. built-in defaults
//! 2. an optional config file (`--config`, format from the extension)
//! 3. `VUMETER_*` environment variables
//! 4. command-line flags
//!
//! ```toml
//! refresh_per_second = 20
//! fallback_title = "Levels"
//! border_color = "#ff8800"
//! peak_level = 0.8
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use ratatui::style::Color;
use serde::Deserialize;

use crate::registry::DEFAULT_TITLE;

/// Prefix for environment overrides, e.g. `VUMETER_PEAK_LEVEL`.
pub const ENV_PREFIX: &str = "VUMETER";

/// Highest accepted redraw rate.
pub const MAX_REFRESH_PER_SECOND: u32 = 1000;

/// Display and logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Redraws per second.
    pub refresh_per_second: u32,
    /// Panel title when channels are not grouped under one device.
    pub fallback_title: String,
    /// Panel border color, any ratatui color name or `#rrggbb`.
    pub border_color: String,
    /// Fraction at which a bar switches to the peak color.
    pub peak_level: f64,
    /// Default tracing filter, overridden by `RUST_LOG`.
    pub log_level: String,
    /// Write diagnostics to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

/// Where diagnostics are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
    /// No subscriber; skipped frames still show in the panel border.
    Off,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub refresh_per_second: Option<u32>,
    pub fallback_title: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from all layers and validate them.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("refresh_per_second", 10_i64)?
            .set_default("fallback_title", DEFAULT_TITLE)?
            .set_default("border_color", "red")?
            .set_default("peak_level", 0.9)?
            .set_default("log_level", "warn")?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .set_override_option(
                "refresh_per_second",
                overrides.refresh_per_second.map(i64::from),
            )?
            .set_override_option("fallback_title", overrides.fallback_title.clone())?
            .set_override_option(
                "log_file",
                overrides.log_file.as_ref().map(|p| p.display().to_string()),
            )?
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_REFRESH_PER_SECOND).contains(&self.refresh_per_second) {
            bail!(
                "refresh_per_second must be between 1 and {}, got {}",
                MAX_REFRESH_PER_SECOND,
                self.refresh_per_second
            );
        }
        if !self.peak_level.is_finite() {
            bail!("peak_level must be a finite number");
        }
        self.border_color()?;
        Ok(())
    }

    /// Time between redraws.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(1) / self.refresh_per_second.max(1)
    }

    /// Destination for diagnostics.
    ///
    /// The panel is drawn inline on stdout. When stderr is the same terminal,
    /// log lines would land inside the panel, so stderr logging is off unless
    /// a log file is configured.
    pub fn log_target(&self, stdout_is_tty: bool, stderr_is_tty: bool) -> LogTarget {
        match &self.log_file {
            Some(path) => LogTarget::File(path.clone()),
            None if stdout_is_tty && stderr_is_tty => LogTarget::Off,
            None => LogTarget::Stderr,
        }
    }

    /// Parsed border color.
    pub fn border_color(&self) -> Result<Color> {
        Color::from_str(&self.border_color)
            .map_err(|_| anyhow::anyhow!("Unknown border color: {}", self.border_color))
    }
}
