/*!
 * Translation service clients.
 *
 * - `libretranslate`: LibreTranslate HTTP API
 * - `mock`: scripted provider used by tests and dry runs
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One text to translate
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
    /// Number of alternative translations wanted on top of the primary one
    pub alternatives: usize,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            alternatives: 0,
        }
    }

    pub fn with_alternatives(mut self, alternatives: usize) -> Self {
        self.alternatives = alternatives;
        self
    }
}

/// A translation with its alternatives, best first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslatedText {
    pub primary: String,
    pub alternatives: Vec<String>,
}

impl TranslatedText {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            alternatives: Vec::new(),
        }
    }

    /// Primary followed by the alternatives
    pub fn into_candidates(self) -> Vec<String> {
        let mut candidates = Vec::with_capacity(self.alternatives.len() + 1);
        candidates.push(self.primary);
        candidates.extend(self.alternatives);
        candidates
    }
}

/// A language supported by a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
    /// Target codes reachable from this language, when the service reports them
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Common trait for translation services
///
/// Implementations must be shareable across the row tasks of a run.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate one text
    async fn translate(&self, request: TranslationRequest) -> Result<TranslatedText, ProviderError>;

    /// Check the service is reachable
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Languages the service supports
    async fn languages(&self) -> Result<Vec<LanguageInfo>, ProviderError> {
        Ok(Vec::new())
    }

    /// Short name for logs
    fn name(&self) -> &str;
}

pub mod libretranslate;
pub mod mock;

pub use self::libretranslate::LibreTranslate;
pub use self::mock::{MockBehavior, MockProvider};
