//! Word lists for the dictionary speller

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{primary_language, DetectorError};
use crate::classify;

/// Where a lexicon's words come from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LexiconSource {
    /// One word per line; `#` starts a comment
    WordList { path: PathBuf },
    /// Hunspell `.dic` file: a leading count line and `word/FLAGS` entries
    Hunspell { path: PathBuf },
    /// The dictionary installed on this system for the language
    System,
}

/// A set of accepted words.
///
/// Entries pass through the same tokenizer used when checking, so a list
/// entry like `isn't` accepts both `isn` and `t`.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    words: AHashSet<String>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lexicon of the given words
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lexicon = Self::new();
        lexicon.extend(words);
        lexicon
    }

    /// Parse a plain word list
    pub fn from_word_list<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut lexicon = Self::new();
        for line in reader.lines() {
            let line = line?;
            let entry = line.split('#').next().unwrap_or_default();
            lexicon.insert(entry);
        }
        Ok(lexicon)
    }

    /// Parse a Hunspell `.dic` file
    pub fn from_hunspell_dic<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut lexicon = Self::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if i == 0 && line.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            // word/FLAGS<tab>morphology
            let entry = line
                .split(['/', '\t'])
                .next()
                .unwrap_or_default();
            lexicon.insert(entry);
        }
        Ok(lexicon)
    }

    /// Load words from a source, resolving [`LexiconSource::System`] for `language`
    pub fn load(source: &LexiconSource, language: &str) -> Result<Self, DetectorError> {
        match source {
            LexiconSource::WordList { path } => read_with(path, Self::from_word_list),
            LexiconSource::Hunspell { path } => read_with(path, Self::from_hunspell_dic),
            LexiconSource::System => {
                let (path, hunspell) = system_dictionary(language).ok_or_else(|| {
                    DetectorError::unavailable(
                        "dictionary",
                        format!("no system dictionary found for {}", language),
                    )
                })?;
                debug!(path = %path.display(), "using system dictionary");
                if hunspell {
                    read_with(&path, Self::from_hunspell_dic)
                } else {
                    read_with(&path, Self::from_word_list)
                }
            }
        }
    }

    /// Add every word in `entry`. Entries are split the same way cell text
    /// is, so `well-known` adds `well` and `known`.
    pub fn insert(&mut self, entry: &str) {
        for word in classify::words(entry) {
            self.words.insert(word);
        }
    }

    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.insert(word.as_ref());
        }
    }

    /// Merge another lexicon into this one
    pub fn absorb(&mut self, other: Lexicon) {
        self.words.extend(other.words);
    }

    /// Case-insensitive lookup
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word) || self.words.contains(&word.to_lowercase())
    }

    /// Number of distinct lowercase words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn read_with(
    path: &Path,
    parse: fn(BufReader<File>) -> std::io::Result<Lexicon>,
) -> Result<Lexicon, DetectorError> {
    let io_err = |source| DetectorError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    parse(BufReader::new(file)).map_err(io_err)
}

/// Locate an installed dictionary for a language tag.
///
/// Returns the path and whether it is in Hunspell format.
fn system_dictionary(language: &str) -> Option<(PathBuf, bool)> {
    let tag = language.replace('-', "_");
    let primary = primary_language(language);

    let mut candidates: Vec<(PathBuf, bool)> = Vec::new();
    for dir in ["/usr/share/hunspell", "/usr/share/myspell", "/usr/share/myspell/dicts"] {
        candidates.push((Path::new(dir).join(format!("{}.dic", tag)), true));
    }
    if primary == "en" {
        let variant = if tag.eq_ignore_ascii_case("en_gb") {
            "british-english"
        } else {
            "american-english"
        };
        candidates.push((Path::new("/usr/share/dict").join(variant), false));
        candidates.push((PathBuf::from("/usr/share/dict/words"), false));
    }

    candidates.into_iter().find(|(path, _)| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_word_list() {
        let data = "# comment\nApple\nbanana # trailing\n\ndon't\n";
        let lexicon = Lexicon::from_word_list(data.as_bytes()).unwrap();

        assert!(lexicon.contains("apple"));
        assert!(lexicon.contains("APPLE"));
        assert!(lexicon.contains("banana"));
        assert!(lexicon.contains("don"));
        assert!(lexicon.contains("t"));
        assert!(!lexicon.contains("comment"));
        assert!(!lexicon.contains("trailing"));
    }

    #[test]
    fn test_hunspell_dic() {
        let data = "3\nhello/MS\nworld\ncolour/S\tpo:noun\n";
        let lexicon = Lexicon::from_hunspell_dic(data.as_bytes()).unwrap();

        assert_eq!(lexicon.len(), 3);
        assert!(lexicon.contains("hello"));
        assert!(lexicon.contains("colour"));
        assert!(!lexicon.contains("ms"));
        assert!(!lexicon.contains("3"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "spreadsheet").unwrap();

        let source = LexiconSource::WordList {
            path: file.path().to_path_buf(),
        };
        let lexicon = Lexicon::load(&source, "en-US").unwrap();
        assert!(lexicon.contains("spreadsheet"));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let source = LexiconSource::Hunspell {
            path: PathBuf::from("/nonexistent/xx_XX.dic"),
        };
        assert!(matches!(
            Lexicon::load(&source, "xx"),
            Err(DetectorError::Io { .. })
        ));
    }

    #[test]
    fn test_source_deserialize() {
        let source: LexiconSource =
            serde_json::from_str(r#"{"kind": "hunspell", "path": "/tmp/en_US.dic"}"#).unwrap();
        assert_eq!(
            source,
            LexiconSource::Hunspell {
                path: PathBuf::from("/tmp/en_US.dic")
            }
        );
    }
}
