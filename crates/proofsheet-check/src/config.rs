//! Checker configuration
//!
//! [`CheckConfig`] can be built in code or loaded from JSON:
//!
//! ```json
//! {
//!   "language": "en-GB",
//!   "palette": { "spelling": "#FFCCCC", "grammar": "#CCCCFF", "both": "#FFCCFF" },
//!   "spelling": { "backend": "dictionary", "extra_words": ["SKU"] },
//!   "grammar": { "backend": "languagetool", "url": "http://localhost:8081" }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use proofsheet_core::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detect::LexiconSource;
use crate::render::{HighlightCategory, RenderOptions};

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Spelling backend selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum SpellingBackend {
    /// Word lists; no lexicons means the system dictionary for the language
    Dictionary {
        #[serde(default)]
        lexicons: Vec<LexiconSource>,
        #[serde(default)]
        extra_words: Vec<String>,
    },
    Disabled,
}

impl Default for SpellingBackend {
    fn default() -> Self {
        SpellingBackend::Dictionary {
            lexicons: Vec::new(),
            extra_words: Vec::new(),
        }
    }
}

/// Grammar backend selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum GrammarBackend {
    /// Built-in English rules
    #[default]
    Rules,
    /// LanguageTool server, requires the `languagetool` feature
    #[serde(rename = "languagetool")]
    LanguageTool { url: String },
    Disabled,
}

/// Fill colours per highlight category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightPalette {
    #[serde(with = "hex_color")]
    pub spelling: Color,
    #[serde(with = "hex_color")]
    pub grammar: Color,
    #[serde(with = "hex_color")]
    pub both: Color,
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self {
            spelling: Color::rgb(0xFF, 0xCC, 0xCC),
            grammar: Color::rgb(0xCC, 0xCC, 0xFF),
            both: Color::rgb(0xFF, 0xCC, 0xFF),
        }
    }
}

impl HighlightPalette {
    /// Fill colour for a category; `None` leaves the cell untouched
    pub fn color_for(&self, category: HighlightCategory) -> Option<Color> {
        match category {
            HighlightCategory::None => None,
            HighlightCategory::Spelling => Some(self.spelling),
            HighlightCategory::Grammar => Some(self.grammar),
            HighlightCategory::Both => Some(self.both),
        }
    }

    /// Human-readable legend, one entry per highlighted category
    pub fn legend(&self) -> Vec<(HighlightCategory, Color)> {
        vec![
            (HighlightCategory::Spelling, self.spelling),
            (HighlightCategory::Grammar, self.grammar),
            (HighlightCategory::Both, self.both),
        ]
    }
}

/// The part of the configuration that decides which detectors run.
///
/// Used as the [`CheckerPool`](crate::CheckerPool) key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DetectorConfig {
    pub language: String,
    pub spelling: SpellingBackend,
    pub grammar: GrammarBackend,
    pub grammar_min_word_count: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        CheckConfig::default().detector_config()
    }
}

/// Options for a check run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// BCP 47 language tag, e.g. `en-US`
    pub language: String,
    /// Grammar runs only on texts with at least this many words
    pub grammar_min_word_count: usize,
    pub palette: HighlightPalette,
    /// Attach a note listing the findings to each flagged cell
    pub notes: bool,
    pub note_author: String,
    pub spelling: SpellingBackend,
    pub grammar: GrammarBackend,
    /// Worker threads for scanning; 0 uses all cores
    pub threads: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            grammar_min_word_count: 3,
            palette: HighlightPalette::default(),
            notes: true,
            note_author: "proofsheet".to_string(),
            spelling: SpellingBackend::default(),
            grammar: GrammarBackend::default(),
            threads: 0,
        }
    }
}

impl CheckConfig {
    /// Parse and validate a JSON document. Missing fields take their
    /// defaults.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject settings no scan could run with: an empty language, a zero
    /// word-count gate or a non-HTTP LanguageTool URL
    pub fn validate(&self) -> ConfigResult<()> {
        if self.language.trim().is_empty() {
            return Err(ConfigError::Invalid("language must not be empty".into()));
        }
        if self.grammar_min_word_count == 0 {
            return Err(ConfigError::Invalid(
                "grammar_min_word_count must be at least 1".into(),
            ));
        }
        if let GrammarBackend::LanguageTool { url } = &self.grammar {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "languagetool url must be http(s): {}",
                    url
                )));
            }
        }
        Ok(())
    }

    /// The part of the configuration that decides which detectors are built;
    /// [`CheckerPool`](crate::CheckerPool) caches by it
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            language: self.language.clone(),
            spelling: self.spelling.clone(),
            grammar: self.grammar.clone(),
            grammar_min_word_count: self.grammar_min_word_count,
        }
    }

    /// Note settings for the [`Renderer`](crate::Renderer)
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            notes: self.notes,
            note_author: self.note_author.clone(),
        }
    }
}

/// `Color` as `"#RRGGBB"`
mod hex_color {
    use proofsheet_core::Color;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&color.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let text = String::deserialize(deserializer)?;
        match Color::from_hex(&text) {
            // an opaque ARGB value is a plain RGB colour
            Some(Color::Argb { a: 0xFF, r, g, b }) => Ok(Color::rgb(r, g, b)),
            Some(color) => Ok(color),
            None => Err(de::Error::custom(format!("invalid hex colour: {}", text))),
        }
    }
}
