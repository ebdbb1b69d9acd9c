use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical tags with a fixed textual spelling in the feature text.
macro_rules! feature_tag {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

feature_tag!(LineStatus {
    LineStart => "LINESTART",
    LineIn => "LINEIN",
    LineEnd => "LINEEND",
});

feature_tag!(BlockStatus {
    BlockStart => "BLOCKSTART",
    BlockIn => "BLOCKIN",
    BlockEnd => "BLOCKEND",
});

feature_tag!(PageStatus {
    PageStart => "PAGESTART",
    PageIn => "PAGEIN",
    PageEnd => "PAGEEND",
});

feature_tag!(Punctuation {
    OpenBracket => "OPENBRACKET",
    EndBracket => "ENDBRACKET",
    Dot => "DOT",
    Comma => "COMMA",
    Hyphen => "HYPHEN",
    Quote => "QUOTE",
    Punct => "PUNCT",
    NoPunct => "NOPUNCT",
});

feature_tag!(Capitalisation {
    InitCap => "INITCAP",
    AllCap => "ALLCAP",
    NoCaps => "NOCAPS",
});

feature_tag!(DigitClass {
    AllDigit => "ALLDIGIT",
    ContainsDigits => "CONTAINSDIGITS",
    NoDigit => "NODIGIT",
});

feature_tag!(FontStatus {
    NewFont => "NEWFONT",
    SameFont => "SAMEFONT",
});

feature_tag!(FontSizeStatus {
    HigherFont => "HIGHERFONT",
    SameFontSize => "SAMEFONTSIZE",
    LowerFont => "LOWERFONT",
});

/// Features of one retained token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Token text with whitespace removed.
    pub text: String,
    /// Index of the token in the document token stream.
    pub position: usize,
    pub page_number: usize,
    pub line: LineStatus,
    pub block: BlockStatus,
    pub page: PageStatus,
    pub punctuation: Punctuation,
    pub capitalisation: Capitalisation,
    pub digits: DigitClass,
    pub single_char: bool,
    pub common_word: bool,
    pub proper_name: bool,
    pub month: bool,
    pub year: bool,
    pub email: bool,
    pub url: bool,
    pub bold: bool,
    pub italic: bool,
    pub font: FontStatus,
    pub font_size: FontSizeStatus,
    pub document_bin: usize,
    pub page_bin: usize,
}

/// Number of whitespace-separated columns written by [`FeatureRecord::to_line`].
pub const FEATURE_COLUMNS: usize = 29;

impl FeatureRecord {
    /// One line of feature text, no trailing newline.
    ///
    /// Columns: token, lowercase token, prefixes of length 1-4, suffixes of
    /// length 1-4, block, line, page, font, font size, bold, italic,
    /// capitalisation, digits, single char, proper name, common word, month,
    /// year, email, url, punctuation, document bin, page bin.
    pub fn to_line(&self) -> String {
        let chars: Vec<char> = self.text.chars().collect();
        let mut cols: Vec<String> = Vec::with_capacity(FEATURE_COLUMNS);

        cols.push(self.text.clone());
        cols.push(self.text.to_lowercase());
        for len in 1..=4 {
            cols.push(chars[..len.min(chars.len())].iter().collect());
        }
        for len in 1..=4 {
            cols.push(chars[chars.len() - len.min(chars.len())..].iter().collect());
        }
        cols.push(self.block.to_string());
        cols.push(self.line.to_string());
        cols.push(self.page.to_string());
        cols.push(self.font.to_string());
        cols.push(self.font_size.to_string());
        cols.push(flag(self.bold).into());
        cols.push(flag(self.italic).into());
        cols.push(self.capitalisation.to_string());
        cols.push(self.digits.to_string());
        cols.push(flag(self.single_char).into());
        cols.push(flag(self.proper_name).into());
        cols.push(flag(self.common_word).into());
        cols.push(flag(self.month).into());
        cols.push(flag(self.year).into());
        cols.push(flag(self.email).into());
        cols.push(flag(self.url).into());
        cols.push(self.punctuation.to_string());
        cols.push(self.document_bin.to_string());
        cols.push(self.page_bin.to_string());

        cols.join(" ")
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}
