//! Rule-based English grammar checker
//!
//! A small set of pattern rules covering the mistakes that show up most in
//! spreadsheet prose. Every rule pushes one message per finding.

use lazy_regex::{lazy_regex, Lazy, Regex};

use super::{primary_language, DetectorError, GrammarDetector};

static WORD_TOKEN: Lazy<Regex> = lazy_regex!(r"[A-Za-z]+(?:'[A-Za-z]+)*");

static SENTENCE_START: Lazy<Regex> = lazy_regex!(r#"(?:^\s*|[.!?]["')\]]?\s+)([a-z][A-Za-z']*)"#);

static ARTICLE: Lazy<Regex> = lazy_regex!(r"\b(a|an|A|An)\s+([A-Za-z][A-Za-z'-]*)");

static PRONOUN_I: Lazy<Regex> = lazy_regex!(r"\bi\b");

static SPACE_BEFORE_PUNCT: Lazy<Regex> = lazy_regex!(r"\w[ \t]+([,;:!?]|\.(?:\s|$))");

static MISSING_SPACE_AFTER: Lazy<Regex> =
    lazy_regex!(r"[a-z]{2,}(?:[,;][A-Za-z]|[.!?][A-Z][a-z])");

static REPEATED_SPACES: Lazy<Regex> = lazy_regex!(r"\S {2,}\S");

/// Words that are legitimately doubled ("had had", "that that")
const ALLOWED_REPEATS: &[&str] = &["had", "that"];

const ABBREVIATIONS: &[&str] = &[
    "e.g.", "i.e.", "etc.", "vs.", "approx.", "no.", "dr.", "mr.", "mrs.", "ms.", "st.",
];

/// Vowel-initial words read with a consonant sound
const CONSONANT_SOUND_PREFIXES: &[&str] = &["uni", "use", "usu", "uti", "ubiq", "eu", "ewe", "one", "once"];

/// Words whose initial `h` is silent
const SILENT_H_PREFIXES: &[&str] = &["hour", "honest", "honor", "honour", "heir"];

/// Grammar rules for English text
#[derive(Debug, Clone)]
pub struct RuleGrammarChecker {
    language: String,
}

impl RuleGrammarChecker {
    /// Rules for generic English
    pub fn english() -> Self {
        Self {
            language: "en".to_string(),
        }
    }

    /// Rules for a language tag; only `en` and `en-*` are supported
    pub fn for_language(tag: &str) -> Result<Self, DetectorError> {
        if primary_language(tag) == "en" {
            Ok(Self {
                language: tag.to_string(),
            })
        } else {
            Err(DetectorError::unavailable(
                "rules",
                format!("no grammar rules for {}", tag),
            ))
        }
    }

    /// The language tag the checker was built for
    pub fn language(&self) -> &str {
        &self.language
    }

    fn check_repeated_words(&self, text: &str, out: &mut Vec<String>) {
        let mut previous: Option<regex::Match<'_>> = None;
        for word in WORD_TOKEN.find_iter(text) {
            if let Some(prev) = previous {
                let gap = &text[prev.end()..word.start()];
                let repeated = !gap.is_empty()
                    && gap.chars().all(char::is_whitespace)
                    && prev.as_str().eq_ignore_ascii_case(word.as_str())
                    && !ALLOWED_REPEATS.contains(&word.as_str().to_lowercase().as_str());
                if repeated {
                    out.push(format!(
                        "Repeated word: \"{} {}\"",
                        prev.as_str(),
                        word.as_str()
                    ));
                }
            }
            previous = Some(word);
        }
    }

    fn check_sentence_start(&self, text: &str, out: &mut Vec<String>) {
        for caps in SENTENCE_START.captures_iter(text) {
            let Some(word) = caps.get(1) else { continue };

            // iPhone, eBay
            if word.as_str().chars().any(char::is_uppercase) {
                continue;
            }
            let rest = &text[word.end()..];
            if rest.starts_with('.') && rest[1..].starts_with(char::is_alphabetic) {
                continue;
            }
            let previous = text[..word.start()]
                .trim_end()
                .rsplit(char::is_whitespace)
                .next()
                .unwrap_or_default()
                .to_lowercase();
            if previous.ends_with("..") || ABBREVIATIONS.contains(&previous.as_str()) {
                continue;
            }

            out.push(format!(
                "Sentence starts with a lowercase letter: \"{}\"",
                word.as_str()
            ));
        }
    }

    fn check_articles(&self, text: &str, out: &mut Vec<String>) {
        for caps in ARTICLE.captures_iter(text) {
            let (Some(article), Some(word)) = (caps.get(1), caps.get(2)) else {
                continue;
            };

            // "Part A is" uses A as a label
            if article.as_str().starts_with('A') {
                let head = text[..article.start()].trim_end();
                if !(head.is_empty() || head.ends_with(['.', '!', '?', ':'])) {
                    continue;
                }
            }

            let Some(wants_an) = wants_an(word.as_str()) else {
                continue;
            };
            let has_an = article.as_str().len() == 2;
            if wants_an != has_an {
                let (expected, found) = if wants_an { ("an", "a") } else { ("a", "an") };
                out.push(format!(
                    "Use \"{}\" instead of \"{}\" before \"{}\"",
                    expected,
                    found,
                    word.as_str()
                ));
            }
        }
    }

    fn check_lowercase_i(&self, text: &str, out: &mut Vec<String>) {
        for m in PRONOUN_I.find_iter(text) {
            let before = text[..m.start()].chars().next_back();
            let after = &text[m.end()..];
            let standalone = before.map_or(true, |c| c.is_whitespace() || c == '"' || c == '(');
            let abbreviation = after.starts_with('.') && after[1..].starts_with(char::is_alphabetic);
            if standalone && !abbreviation && !after.starts_with('-') {
                out.push("The pronoun \"I\" should be capitalized".to_string());
                return;
            }
        }
    }

    fn check_space_before_punctuation(&self, text: &str, out: &mut Vec<String>) {
        for caps in SPACE_BEFORE_PUNCT.captures_iter(text) {
            let Some(punct) = caps.get(1).and_then(|m| m.as_str().chars().next()) else {
                continue;
            };
            out.push(format!("Remove the space before \"{}\"", punct));
        }
    }

    fn check_missing_space_after(&self, text: &str, out: &mut Vec<String>) {
        for m in MISSING_SPACE_AFTER.find_iter(text) {
            let snippet = m.as_str();
            let Some(punct) = snippet.chars().find(|c| !c.is_ascii_lowercase()) else {
                continue;
            };
            out.push(format!("Add a space after \"{}\" in \"{}\"", punct, snippet));
        }
    }

    fn check_repeated_whitespace(&self, text: &str, out: &mut Vec<String>) {
        if REPEATED_SPACES.is_match(text) {
            out.push("Repeated whitespace between words".to_string());
        }
    }
}

impl Default for RuleGrammarChecker {
    fn default() -> Self {
        Self::english()
    }
}

impl GrammarDetector for RuleGrammarChecker {
    fn name(&self) -> &str {
        "rules"
    }

    fn check(&self, text: &str) -> Result<Vec<String>, DetectorError> {
        let mut out = Vec::new();
        if text.trim().is_empty() {
            return Ok(out);
        }

        self.check_repeated_words(text, &mut out);
        self.check_sentence_start(text, &mut out);
        self.check_articles(text, &mut out);
        self.check_lowercase_i(text, &mut out);
        self.check_space_before_punctuation(text, &mut out);
        self.check_missing_space_after(text, &mut out);
        self.check_repeated_whitespace(text, &mut out);

        Ok(out)
    }
}

/// Whether `word` takes "an"; `None` when the sound cannot be guessed
fn wants_an(word: &str) -> Option<bool> {
    if word.chars().count() < 2 {
        return None;
    }
    // acronyms are read letter by letter
    if word.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }

    let lower = word.to_lowercase();
    if SILENT_H_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return Some(true);
    }
    if CONSONANT_SOUND_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return Some(false);
    }
    Some(lower.starts_with(['a', 'e', 'i', 'o', 'u']))
}
