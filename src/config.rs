//! Configuration for the Kompaktor client.
//!
//! Settings are read from `kompaktor.toml` in the data directory and layered
//! file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! environment = "production"   # or "development"
//! # base_url = "https://example.org"   # wins over environment
//!
//! [defaults]
//! mode = "summary"
//! language = "de"
//! max_flashcards = 10
//! detail_level = "normal"
//!
//! [ads]
//! publisher_id = "ca-pub-1048222071695232"
//! top_slot_id = "4124950988"
//! side_slot_id = "5661393931"
//!
//! [export]
//! # output_dir = "/home/me/Downloads"
//! ```

use crate::ads;
use crate::model::{CompactionMode, DEFAULT_MAX_FLASHCARDS, DetailLevel, LanguageCode, MAX_FLASHCARDS, MIN_FLASHCARDS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "kompaktor.toml";
pub const APP_DIR_NAME: &str = "wissen-kompaktor";
pub const LOG_DIR_NAME: &str = "logs";

pub const DEVELOPMENT_API_BASE: &str = "http://localhost:8000";
pub const PRODUCTION_API_BASE: &str = "https://wissen-backend-u8d0.onrender.com";

/// Which backend deployment to talk to when no explicit URL is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiEnvironment {
    #[default]
    Production,
    Development,
}

impl ApiEnvironment {
    pub fn base_url(self) -> &'static str {
        match self {
            ApiEnvironment::Production => PRODUCTION_API_BASE,
            ApiEnvironment::Development => DEVELOPMENT_API_BASE,
        }
    }
}

impl std::fmt::Display for ApiEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiEnvironment::Production => write!(f, "production"),
            ApiEnvironment::Development => write!(f, "development"),
        }
    }
}

impl std::str::FromStr for ApiEnvironment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(ApiEnvironment::Production),
            "development" | "dev" | "local" => Ok(ApiEnvironment::Development),
            _ => anyhow::bail!(
                "Invalid API environment '{}'. Valid values: production, development",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default)]
    pub environment: ApiEnvironment,
    /// Explicit base URL; overrides `environment`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsSection {
    #[serde(default)]
    pub mode: CompactionMode,
    #[serde(default)]
    pub language: LanguageCode,
    #[serde(default = "default_max_flashcards")]
    pub max_flashcards: u32,
    #[serde(default)]
    pub detail_level: DetailLevel,
}

fn default_max_flashcards() -> u32 {
    DEFAULT_MAX_FLASHCARDS
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            mode: CompactionMode::default(),
            language: LanguageCode::default(),
            max_flashcards: default_max_flashcards(),
            detail_level: DetailLevel::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdsSection {
    #[serde(default = "default_publisher_id")]
    pub publisher_id: String,
    #[serde(default = "default_top_slot_id")]
    pub top_slot_id: String,
    #[serde(default = "default_side_slot_id")]
    pub side_slot_id: String,
}

fn default_publisher_id() -> String {
    ads::DEFAULT_PUBLISHER_ID.to_string()
}

fn default_top_slot_id() -> String {
    ads::TOP_SLOT_ID.to_string()
}

fn default_side_slot_id() -> String {
    ads::SIDE_SLOT_ID.to_string()
}

impl Default for AdsSection {
    fn default() -> Self {
        Self {
            publisher_id: default_publisher_id(),
            top_slot_id: default_top_slot_id(),
            side_slot_id: default_side_slot_id(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSection {
    /// Where exports land when no explicit path is given (default: cwd).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

/// The complete kompaktor.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KompaktorToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub ads: AdsSection,
    #[serde(default)]
    pub export: ExportSection,
}

impl KompaktorToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse kompaktor.toml")
    }

    /// Load `<data_dir>/kompaktor.toml`, or defaults if it does not exist.
    pub fn load_or_default(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize kompaktor.toml")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Human-readable warnings for suspicious values.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(url) = &self.api.base_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            warnings.push(format!(
                "api.base_url '{}' should start with http:// or https://",
                url
            ));
        }

        let cards = self.defaults.max_flashcards;
        if !(MIN_FLASHCARDS..=MAX_FLASHCARDS).contains(&cards) {
            warnings.push(format!(
                "defaults.max_flashcards = {} is outside {}..={} and will be clamped",
                cards, MIN_FLASHCARDS, MAX_FLASHCARDS
            ));
        }

        for (name, value) in [
            ("ads.publisher_id", &self.ads.publisher_id),
            ("ads.top_slot_id", &self.ads.top_slot_id),
            ("ads.side_slot_id", &self.ads.side_slot_id),
        ] {
            if value.trim().is_empty() {
                warnings.push(format!("{} is empty; the ad slot will request nothing useful", name));
            }
        }

        if let Some(dir) = &self.export.output_dir
            && dir.exists()
            && !dir.is_dir()
        {
            warnings.push(format!(
                "export.output_dir '{}' exists but is not a directory",
                dir.display()
            ));
        }

        warnings
    }
}

/// Values that come from outside the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--api-base` / `KOMPAKTOR_API_BASE`.
    pub api_base: Option<String>,
    /// `--dev`.
    pub development: bool,
    /// `KOMPAKTOR_ENV`.
    pub environment: Option<ApiEnvironment>,
}

impl Overrides {
    /// Read `KOMPAKTOR_ENV`; invalid values are logged and ignored.
    pub fn environment_from_env() -> Option<ApiEnvironment> {
        let raw = std::env::var("KOMPAKTOR_ENV").ok()?;
        match raw.parse() {
            Ok(env) => Some(env),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring KOMPAKTOR_ENV");
                None
            }
        }
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub file: KompaktorToml,
    pub api_base: String,
    pub environment: ApiEnvironment,
}

impl Settings {
    pub fn load(data_dir: PathBuf, overrides: &Overrides) -> Result<Self> {
        let file = KompaktorToml::load_or_default(&data_dir)?;
        Ok(Self::resolve(data_dir, file, overrides))
    }

    pub fn resolve(data_dir: PathBuf, file: KompaktorToml, overrides: &Overrides) -> Self {
        let environment = if overrides.development {
            ApiEnvironment::Development
        } else {
            overrides.environment.unwrap_or(file.api.environment)
        };
        let api_base = overrides
            .api_base
            .clone()
            .or_else(|| file.api.base_url.clone())
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| environment.base_url().to_string());

        Self {
            data_dir,
            file,
            api_base,
            environment,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    /// Default location for an export file named `filename`.
    pub fn export_path(&self, filename: &str) -> PathBuf {
        match &self.file.export.output_dir {
            Some(dir) => dir.join(filename),
            None => PathBuf::from(filename),
        }
    }
}

/// Log directory for `data_dir`, usable before `Settings` exists.
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_DIR_NAME)
}

/// Pick the data directory: explicit path, else the platform data dir.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(".kompaktor"))
}
