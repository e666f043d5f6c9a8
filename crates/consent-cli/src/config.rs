//! Configuration for the consent CLI

use crate::error::{CliError, CliResult};
use consent_document::{DisplayLocale, DisplaySettings};
use consent_export::{ExportOptions, GlyphRasterizer};
use consent_store::Validator;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Name of the per-user data directory.
const APP_DIR: &str = "consent-desk";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the record collection lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process-local; nothing survives the command
    Memory,

    /// One JSON file per slot
    File {
        /// Defaults to the platform data directory
        #[serde(default)]
        dir: Option<PathBuf>,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::File { dir: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Offset instants are shown at
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            utc_offset_minutes: default_utc_offset(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_scale")]
    pub scale: u32,

    #[serde(default = "default_width")]
    pub width: u32,

    /// Defaults to the working directory
    #[serde(default)]
    pub out_dir: Option<PathBuf>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Font files in fallback order; system fonts when empty
    #[serde(default)]
    pub fonts: Vec<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            width: default_width(),
            out_dir: None,
            timeout_secs: default_timeout(),
            fonts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_true")]
    pub strict_legal_id: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict_legal_id: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_locale() -> String {
    "zh-CN".to_string()
}

fn default_utc_offset() -> i32 {
    8 * 60
}

fn default_scale() -> u32 {
    2
}

fn default_width() -> u32 {
    consent_document::EXPORT_WIDTH
}

fn default_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl CliConfig {
    /// Defaults, then the optional file, then `CONSENT_*` variables
    /// (`CONSENT_EXPORT__SCALE=3`).
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&CliConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CONSENT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn data_dir(&self) -> PathBuf {
        match &self.storage {
            StorageConfig::File { dir: Some(dir) } => dir.clone(),
            _ => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR),
        }
    }

    pub fn out_dir(&self) -> PathBuf {
        self.export
            .out_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn display_settings(&self) -> CliResult<DisplaySettings> {
        let locale: DisplayLocale = self.display.locale.parse().map_err(CliError::Config)?;
        if self.display.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(CliError::Config(format!(
                "utc_offset_minutes out of range: {}",
                self.display.utc_offset_minutes
            )));
        }
        Ok(DisplaySettings::with_offset_minutes(
            locale,
            self.display.utc_offset_minutes,
        ))
    }

    pub fn export_options(&self) -> CliResult<ExportOptions> {
        if self.export.scale == 0 || self.export.width == 0 {
            return Err(CliError::Config(
                "export scale and width must be positive".to_string(),
            ));
        }
        Ok(ExportOptions {
            width: self.export.width,
            scale: self.export.scale,
            timeout: Duration::from_secs(self.export.timeout_secs),
        })
    }

    pub fn rasterizer(&self) -> CliResult<GlyphRasterizer> {
        Ok(GlyphRasterizer::discover(&self.export.fonts)?)
    }

    pub fn validator(&self) -> Validator {
        Validator {
            strict_legal_id: self.validation.strict_legal_id,
        }
    }
}
