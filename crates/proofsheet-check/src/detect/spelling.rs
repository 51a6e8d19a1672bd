//! Dictionary-based spelling detector

use ahash::AHashSet;
use tracing::debug;

use super::lexicon::{Lexicon, LexiconSource};
use super::{DetectorError, SpellingDetector};
use crate::classify;

/// Flags words missing from a [`Lexicon`]
#[derive(Debug, Clone)]
pub struct DictionarySpeller {
    lexicon: Lexicon,
}

impl DictionarySpeller {
    /// Accept exactly the words of `lexicon`
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Build from lexicon sources plus extra accepted words.
    ///
    /// Fails when the sources yield no words at all.
    pub fn from_sources(
        sources: &[LexiconSource],
        extra_words: &[String],
        language: &str,
    ) -> Result<Self, DetectorError> {
        let sources: Vec<LexiconSource> = if sources.is_empty() {
            vec![LexiconSource::System]
        } else {
            sources.to_vec()
        };

        let mut lexicon = Lexicon::new();
        for source in &sources {
            lexicon.absorb(Lexicon::load(source, language)?);
        }
        if lexicon.is_empty() {
            return Err(DetectorError::unavailable(
                "dictionary",
                "the configured word lists are empty",
            ));
        }
        lexicon.extend(extra_words);

        debug!(words = lexicon.len(), %language, "dictionary speller ready");
        Ok(Self::new(lexicon))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }
}

impl SpellingDetector for DictionarySpeller {
    fn name(&self) -> &str {
        "dictionary"
    }

    fn check(&self, text: &str) -> Result<Vec<String>, DetectorError> {
        let mut seen = AHashSet::new();
        Ok(classify::words(text)
            .into_iter()
            .filter(|word| !self.lexicon.contains(word))
            .filter(|word| seen.insert(word.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn speller() -> DictionarySpeller {
        DictionarySpeller::new(Lexicon::from_words([
            "this", "is", "a", "test", "the", "quick", "fox",
        ]))
    }

    #[test]
    fn test_flags_unknown_words() {
        assert_eq!(speller().check("Ths is a test").unwrap(), vec!["ths"]);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        assert_eq!(
            speller().check("Teh quikc fox, teh QUIKC fox").unwrap(),
            vec!["teh", "quikc"]
        );
    }

    #[test]
    fn test_digits_and_punctuation_are_ignored() {
        assert!(speller().check("The fox: 42 (test)!").unwrap().is_empty());
    }

    #[test]
    fn test_empty_sources_are_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "# nothing here\n").unwrap();

        let result = DictionarySpeller::from_sources(
            &[LexiconSource::WordList { path }],
            &["extra".to_string()],
            "en",
        );
        assert!(matches!(result, Err(DetectorError::Unavailable { .. })));
    }

    #[test]
    fn test_extra_words_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "order\nnumber\n").unwrap();

        let speller = DictionarySpeller::from_sources(
            &[LexiconSource::WordList { path }],
            &["SKU".to_string()],
            "en",
        )
        .unwrap();
        assert_eq!(speller.check("SKU order nmber").unwrap(), vec!["nmber"]);
    }
}
