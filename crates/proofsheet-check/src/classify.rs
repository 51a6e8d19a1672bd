//! Decides which cell values are prose worth proof-reading

use lazy_regex::{lazy_regex, Lazy, Regex};
use proofsheet_core::CellValue;

static DATE_LIKE: Lazy<Regex> = lazy_regex!(r"^\d{1,2}[/-]\d{1,2}[/-]\d{2,4}$");

static WORD: Lazy<Regex> = lazy_regex!(r"\b[a-zA-Z]+\b");

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹', '¢'];

/// Texts shorter than this (after trimming) are never checked
pub const MIN_CHECKABLE_CHARS: usize = 2;

/// Whether a cell value should be handed to the detectors.
///
/// Only string values qualify. A formula is never proof-read, even when its
/// cached result is text.
pub fn is_checkable(value: &CellValue) -> bool {
    match value {
        CellValue::String(s) => is_checkable_text(s.as_str()),
        _ => false,
    }
}

/// Whether a piece of text is prose rather than a number, a date or noise.
/// Text without a single letter (`***`, `+/-`) is noise.
pub fn is_checkable_text(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.chars().count() >= MIN_CHECKABLE_CHARS
        && trimmed.chars().any(char::is_alphabetic)
        && !is_numeric_like(trimmed)
        && !is_date_like(trimmed)
}

/// Text made only of digits, separators, signs, percent and currency
/// symbols, e.g. `$1,200.50`. Placeholders without any digit (`--`, `$ %`)
/// count too: there is no word in them to check.
pub fn is_numeric_like(text: &str) -> bool {
    text.chars().all(|c| {
        c.is_ascii_digit()
            || matches!(c, '.' | ',' | '-' | '+' | '%')
            || c.is_whitespace()
            || CURRENCY_SYMBOLS.contains(&c)
    })
}

/// Short numeric dates such as `12/31/2024` or `1-2-24`
pub fn is_date_like(text: &str) -> bool {
    DATE_LIKE.is_match(text)
}

/// Number of whitespace-delimited tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lowercased alphabetic words, in order of appearance
pub fn words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proofsheet_core::CellError;

    #[test]
    fn test_non_strings_are_not_checkable() {
        assert!(!is_checkable(&CellValue::Empty));
        assert!(!is_checkable(&CellValue::Number(42.5)));
        assert!(!is_checkable(&CellValue::Boolean(true)));
        assert!(!is_checkable(&CellValue::Error(CellError::Na)));
        assert!(!is_checkable(&CellValue::Formula {
            text: "\"Teh text\"".into(),
            cached_value: Some(Box::new(CellValue::string("Teh text"))),
        }));
        assert!(is_checkable(&CellValue::string("Ths is a test")));
    }

    #[test]
    fn test_short_numeric_and_dates() {
        assert!(!is_checkable_text(""));
        assert!(!is_checkable_text("  a  "));
        assert!(is_checkable_text("ok"));
        assert!(!is_checkable_text("42.50"));
        assert!(!is_checkable_text("$1,200.00"));
        assert!(!is_checkable_text("- 15 %"));
        assert!(!is_checkable_text("€ 3"));
        assert!(!is_checkable_text("12/31/2024"));
        assert!(!is_checkable_text("1-2-24"));
        assert!(!is_checkable_text("2024-12-31"));
        assert!(is_checkable_text("31 Dec 2024"));
        assert!(!is_checkable_text("--"));
        assert!(!is_checkable_text("$ %"));
        assert!(!is_checkable_text("+/-"));
        assert!(!is_checkable_text("*** ..."));
        assert!(is_checkable_text("Room 101"));
    }

    #[test]
    fn test_words_and_count() {
        assert_eq!(words("Ths isn't 2 TEST-case"), vec!["ths", "isn", "t", "test", "case"]);
        assert_eq!(word_count("  one two\tthree\n"), 3);
        assert_eq!(word_count(""), 0);
    }

    proptest! {
        #[test]
        fn numbers_are_never_checkable(n in any::<f64>()) {
            prop_assert!(!is_checkable(&CellValue::Number(n)));
        }

        #[test]
        fn formatted_numbers_are_never_checkable(n in -1_000_000i64..1_000_000, cents in 0u8..100) {
            let text = format!("{}.{:02}", n, cents);
            prop_assert!(!is_checkable_text(&text));
            let money = format!("${}", text);
            prop_assert!(!is_checkable_text(&money));
        }

        #[test]
        fn numeric_dates_are_never_checkable(d in 1u8..=31, m in 1u8..=12, y in 0u16..=9999) {
            let text = format!("{}/{}/{:04}", m, d, y);
            prop_assert!(!is_checkable_text(&text));
        }

        #[test]
        fn numeric_punctuation_is_never_checkable(text in "[-.,+% $€£¥₹¢]{0,12}") {
            prop_assert!(!is_checkable_text(&text));
        }

        #[test]
        fn letters_make_text_checkable(word in "[a-zA-Z]{2,12}") {
            prop_assert!(is_checkable_text(&word));
        }
    }
}
