//! Spelling and grammar detectors
//!
//! Detectors are swappable behind [`SpellingDetector`] and [`GrammarDetector`].
//! Each returns human-readable findings for one piece of text: misspelled
//! words for spelling, one message per problem for grammar.

use std::path::PathBuf;

use thiserror::Error;

mod disabled;
mod grammar;
#[cfg(feature = "languagetool")]
mod languagetool;
mod lexicon;
mod spelling;

pub use disabled::DisabledDetector;
pub use grammar::RuleGrammarChecker;
#[cfg(feature = "languagetool")]
pub use languagetool::LanguageToolChecker;
pub use lexicon::{Lexicon, LexiconSource};
pub use spelling::DictionarySpeller;

/// Errors raised by detector backends
#[derive(Debug, Error)]
pub enum DetectorError {
    /// The backend could not be initialised
    #[error("{backend} is unavailable: {reason}")]
    Unavailable { backend: String, reason: String },

    /// A single check failed
    #[error("{backend} check failed: {reason}")]
    Failed { backend: String, reason: String },

    /// A dictionary file could not be read
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DetectorError {
    /// The backend could not be started
    pub fn unavailable(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// A started backend failed on one call
    pub fn failed(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            backend: backend.into(),
            reason: reason.into(),
        }
    }
}

/// Finds misspelled words
pub trait SpellingDetector: Send + Sync {
    fn name(&self) -> &str;

    /// Misspelled words, de-duplicated, in order of first appearance
    fn check(&self, text: &str) -> Result<Vec<String>, DetectorError>;
}

/// Finds grammar problems
pub trait GrammarDetector: Send + Sync {
    fn name(&self) -> &str;

    /// One message per finding
    fn check(&self, text: &str) -> Result<Vec<String>, DetectorError>;
}

/// Primary subtag of a language tag, lowercased: `en-US` -> `en`
pub(crate) fn primary_language(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_language() {
        assert_eq!(primary_language("en-US"), "en");
        assert_eq!(primary_language("EN_gb"), "en");
        assert_eq!(primary_language("de"), "de");
        assert_eq!(primary_language(""), "");
    }

    #[test]
    fn test_error_messages() {
        let err = DetectorError::unavailable("dictionary", "no word list for fr");
        assert_eq!(err.to_string(), "dictionary is unavailable: no word list for fr");
    }
}
