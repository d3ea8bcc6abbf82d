/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with a tagged translation
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::failing_on(needle)` - Fails for texts containing `needle`
 * - `MockProvider::slow(ms)` - Succeeds after a delay
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;

use super::{LanguageInfo, Provider, TranslatedText, TranslationRequest};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Always fails with an error
    Failing,
    /// Fails only for texts containing the needle
    FailingOn { needle: &'static str },
    /// Simulates slow response (for abort testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
///
/// Clones share the request counter and request log.
#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<TranslationRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that fails whenever the text contains `needle`
    pub fn failing_on(needle: &'static str) -> Self {
        Self::new(MockBehavior::FailingOn { needle })
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of translate calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of every request received, in arrival order
    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests.lock().clone()
    }

    fn success(&self, request: &TranslationRequest) -> TranslatedText {
        let primary = format!("[{}] {}", request.target_language, request.text);
        let alternatives = (1..=request.alternatives)
            .map(|i| format!("[{}#{}] {}", request.target_language, i, request.text))
            .collect();
        TranslatedText { primary, alternatives }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn translate(&self, request: TranslationRequest) -> Result<TranslatedText, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(self.success(&request)),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::FailingOn { needle } => {
                if request.text.contains(needle) {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated failure for '{}'", needle),
                        status_code: 500,
                    })
                } else {
                    Ok(self.success(&request))
                }
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.success(&request))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            _ => Ok(()),
        }
    }

    async fn languages(&self) -> Result<Vec<LanguageInfo>, ProviderError> {
        let language = |code: &str, name: &str| LanguageInfo {
            code: code.to_string(),
            name: name.to_string(),
            targets: vec!["en".to_string(), "fr".to_string(), "de".to_string()],
        };
        Ok(vec![language("en", "English"), language("fr", "French"), language("de", "German")])
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
