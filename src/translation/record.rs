/*!
 * Translation record: one row's translation plus the alternative on display.
 */

use crate::providers::TranslatedText;

/// Candidates for one text block with a cursor over them
///
/// Index 0 is the service's primary translation, the rest are its
/// alternatives in the order received. Moving the cursor clamps at both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRecord {
    candidates: Vec<String>,
    cursor: usize,
}

impl TranslationRecord {
    pub fn new(text: TranslatedText) -> Self {
        Self {
            candidates: text.into_candidates(),
            cursor: 0,
        }
    }

    pub fn primary(&self) -> &str {
        self.candidates.first().map(String::as_str).unwrap_or_default()
    }

    /// Candidate under the cursor
    pub fn current(&self) -> &str {
        self.candidates.get(self.cursor).map(String::as_str).unwrap_or_default()
    }

    pub fn alternatives(&self) -> &[String] {
        self.candidates.get(1..).unwrap_or_default()
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.candidates.len()
    }

    pub fn has_previous(&self) -> bool {
        self.cursor > 0
    }

    /// Show the next alternative, staying on the last one
    pub fn next_alternative(&mut self) -> &str {
        if self.has_next() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Show the previous alternative, staying on the primary
    pub fn previous_alternative(&mut self) -> &str {
        if self.has_previous() {
            self.cursor -= 1;
        }
        self.current()
    }
}

impl From<TranslatedText> for TranslationRecord {
    fn from(text: TranslatedText) -> Self {
        Self::new(text)
    }
}
