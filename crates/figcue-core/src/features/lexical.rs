//! Per-token lexical classifiers.

use crate::features::record::{Capitalisation, DigitClass, Punctuation};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

const COMMON_WORDS: &str = include_str!("../../../../lexicon/common.txt");
const PROPER_NAMES: &str = include_str!("../../../../lexicon/names.txt");
const MONTH_NAMES: &str = include_str!("../../../../lexicon/months.txt");

static COMMON: LazyLock<HashSet<&'static str>> = LazyLock::new(|| load_lexicon(COMMON_WORDS));
static NAMES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| load_lexicon(PROPER_NAMES));
static MONTHS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| load_lexicon(MONTH_NAMES));

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[12][0-9]{3}[a-z]?$").expect("valid year pattern"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.+-]+@[\w-]+(\.[\w-]+)+$").expect("valid email pattern")
});
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:https?|ftp)(?::\S*)?|www\.\S+)$").expect("valid url pattern")
});

/// One word per line; blank lines and `#` comments are skipped.
fn load_lexicon(source: &'static str) -> HashSet<&'static str> {
    source
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}

pub fn punctuation(text: &str) -> Punctuation {
    match text {
        "(" | "[" | "{" => Punctuation::OpenBracket,
        ")" | "]" | "}" => Punctuation::EndBracket,
        "." => Punctuation::Dot,
        "," => Punctuation::Comma,
        "-" | "\u{2010}" | "\u{2011}" => Punctuation::Hyphen,
        "\"" | "'" | "`" | "\u{2018}" | "\u{2019}" | "\u{201C}" | "\u{201D}" => {
            Punctuation::Quote
        }
        _ if !text.is_empty() && text.chars().all(is_punctuation_char) => Punctuation::Punct,
        _ => Punctuation::NoPunct,
    }
}

fn is_punctuation_char(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '\u{2013}' | '\u{2014}' | '\u{2026}' | '\u{2022}' | '\u{00B7}' | '\u{00A7}'
        )
}

pub fn capitalisation(text: &str) -> Capitalisation {
    let has_upper = text.chars().any(char::is_uppercase);
    let has_lower = text.chars().any(char::is_lowercase);
    if has_upper && !has_lower {
        Capitalisation::AllCap
    } else if text.chars().next().is_some_and(char::is_uppercase) {
        Capitalisation::InitCap
    } else {
        Capitalisation::NoCaps
    }
}

pub fn digits(text: &str) -> DigitClass {
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        DigitClass::AllDigit
    } else if text.chars().any(|c| c.is_ascii_digit()) {
        DigitClass::ContainsDigits
    } else {
        DigitClass::NoDigit
    }
}

pub fn is_single_char(text: &str) -> bool {
    text.chars().count() == 1
}

pub fn is_common_word(text: &str) -> bool {
    COMMON.contains(text.to_lowercase().as_str())
}

/// Capitalised token whose lowercase form is a known name.
pub fn is_proper_name(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_uppercase)
        && NAMES.contains(text.to_lowercase().as_str())
}

pub fn is_month(text: &str) -> bool {
    MONTHS.contains(text.to_lowercase().trim_end_matches('.'))
}

pub fn is_year(text: &str) -> bool {
    YEAR.is_match(text)
}

pub fn is_email(text: &str) -> bool {
    EMAIL.is_match(text)
}

pub fn is_url(text: &str) -> bool {
    URL.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_table() {
        assert_eq!(punctuation("("), Punctuation::OpenBracket);
        assert_eq!(punctuation("]"), Punctuation::EndBracket);
        assert_eq!(punctuation("."), Punctuation::Dot);
        assert_eq!(punctuation(","), Punctuation::Comma);
        assert_eq!(punctuation("-"), Punctuation::Hyphen);
        assert_eq!(punctuation("\u{201C}"), Punctuation::Quote);
        assert_eq!(punctuation(":"), Punctuation::Punct);
        assert_eq!(punctuation("..."), Punctuation::Punct);
        assert_eq!(punctuation("Fig"), Punctuation::NoPunct);
        assert_eq!(punctuation("a."), Punctuation::NoPunct);
    }

    #[test]
    fn test_capitalisation() {
        assert_eq!(capitalisation("Fig"), Capitalisation::InitCap);
        assert_eq!(capitalisation("TABLE"), Capitalisation::AllCap);
        assert_eq!(capitalisation("A"), Capitalisation::AllCap);
        assert_eq!(capitalisation("cat"), Capitalisation::NoCaps);
        assert_eq!(capitalisation("1"), Capitalisation::NoCaps);
        assert_eq!(capitalisation("3D"), Capitalisation::AllCap);
    }

    #[test]
    fn test_digits() {
        assert_eq!(digits("1"), DigitClass::AllDigit);
        assert_eq!(digits("2015"), DigitClass::AllDigit);
        assert_eq!(digits("3D"), DigitClass::ContainsDigits);
        assert_eq!(digits("cat"), DigitClass::NoDigit);
        assert_eq!(digits(""), DigitClass::NoDigit);
    }

    #[test]
    fn test_dictionaries() {
        assert!(is_common_word("The"));
        assert!(!is_common_word("histogram"));
        assert!(is_proper_name("Smith"));
        assert!(!is_proper_name("smith"));
        assert!(is_month("January"));
        assert!(is_month("Sept."));
        assert!(!is_month("cat"));
    }

    #[test]
    fn test_patterns() {
        assert!(is_year("1998"));
        assert!(is_year("2015b"));
        assert!(!is_year("3000"));
        assert!(!is_year("199"));
        assert!(is_email("someone@example.org"));
        assert!(!is_email("someone@"));
        assert!(is_url("http"));
        assert!(is_url("https://example.org/x"));
        assert!(is_url("www.example.org"));
        assert!(!is_url("httpd"));
    }

    #[test]
    fn test_single_char() {
        assert!(is_single_char("é"));
        assert!(!is_single_char("ab"));
    }
}
