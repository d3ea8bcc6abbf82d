use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs;
use std::path::Path;
use url::Url;

use crate::document::DEFAULT_GAP_THRESHOLD;
use crate::language_utils::{self, LanguageCodeType};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO) or "auto"
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation service config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Page extraction config
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Export layout config
    #[serde(default)]
    pub export: ExportConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: LibreTranslate-compatible HTTP service
    #[default]
    LibreTranslate,
    // @provider: Offline echo provider for dry runs
    Mock,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::LibreTranslate => "LibreTranslate",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::LibreTranslate => "libretranslate".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "libretranslate" | "libre" => Ok(Self::LibreTranslate),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key, if the service requires one
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default)]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Alternatives requested per row when translating a document
    #[serde(default = "default_page_alternatives")]
    pub page_alternatives: usize,

    /// Alternatives requested when translating a single block
    #[serde(default = "default_block_alternatives")]
    pub block_alternatives: usize,

    /// Upper bound on concurrent requests; unset sends every row of a page at once
    #[serde(default)]
    pub max_concurrent_requests: Option<usize>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            endpoint: default_endpoint(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            retry_count: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            page_alternatives: default_page_alternatives(),
            block_alternatives: default_block_alternatives(),
            max_concurrent_requests: None,
        }
    }
}

/// Page extraction configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Horizontal gap above which glyphs are padded apart
    #[serde(default = "default_gap_threshold")]
    pub gap_threshold: f64,

    /// Character used for gap padding
    #[serde(default = "default_padding_char")]
    pub padding_char: char,

    /// Whether images are kept in the page content
    #[serde(default = "default_true")]
    pub include_images: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            gap_threshold: default_gap_threshold(),
            padding_char: default_padding_char(),
            include_images: true,
        }
    }
}

/// Export layout configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExportConfig {
    #[serde(default = "default_page_width_mm")]
    pub page_width_mm: f64,

    #[serde(default = "default_page_height_mm")]
    pub page_height_mm: f64,

    /// Margin on every side, in centimetres
    #[serde(default = "default_margin_cm")]
    pub margin_cm: f64,

    /// Body text size in points
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// TrueType font to embed; Helvetica when unset
    #[serde(default)]
    pub font_path: Option<std::path::PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_width_mm: default_page_width_mm(),
            page_height_mm: default_page_height_mm(),
            margin_cm: default_margin_cm(),
            font_size: default_font_size(),
            font_path: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_endpoint() -> String {
    // LibreTranslate's default listen address
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_page_alternatives() -> usize {
    1
}

fn default_block_alternatives() -> usize {
    3
}

fn default_gap_threshold() -> f64 {
    DEFAULT_GAP_THRESHOLD
}

fn default_padding_char() -> char {
    ' '
}

fn default_true() -> bool {
    true
}

fn default_page_width_mm() -> f64 {
    210.0
}

fn default_page_height_mm() -> f64 {
    297.0
}

fn default_margin_cm() -> f64 {
    1.5
}

fn default_font_size() -> f64 {
    11.0
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Save the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        crate::file_utils::FileManager::write_to_file(path, &content)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        language_utils::validate_language_code(&self.source_language)?;
        if language_utils::validate_language_code(&self.target_language)? == LanguageCodeType::Auto {
            return Err(anyhow!("Target language cannot be auto-detected"));
        }
        if language_utils::language_codes_match(&self.source_language, &self.target_language) {
            return Err(anyhow!(
                "Source and target language are both {}",
                language_utils::get_language_name(&self.target_language)?
            ));
        }

        if self.translation.provider == TranslationProvider::LibreTranslate {
            Url::parse(&self.translation.endpoint)
                .with_context(|| format!("Invalid translation endpoint: {}", self.translation.endpoint))?;
        }
        if self.translation.timeout_secs == 0 {
            return Err(anyhow!("Translation timeout must be at least one second"));
        }
        if self.translation.max_concurrent_requests == Some(0) {
            return Err(anyhow!("max_concurrent_requests must be at least 1 when set"));
        }

        if !self.extraction.gap_threshold.is_finite() || self.extraction.gap_threshold < 0.0 {
            return Err(anyhow!("gap_threshold must be a non-negative number"));
        }

        let export = &self.export;
        if export.page_width_mm <= 0.0 || export.page_height_mm <= 0.0 {
            return Err(anyhow!("Page size must be positive"));
        }
        if export.margin_cm < 0.0 || export.margin_cm * 20.0 >= export.page_width_mm.min(export.page_height_mm) {
            return Err(anyhow!("Margins leave no room on the page"));
        }
        if export.font_size <= 0.0 {
            return Err(anyhow!("Font size must be positive"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "fr".to_string(),
            translation: TranslationConfig::default(),
            extraction: ExtractionConfig::default(),
            export: ExportConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
