//! Text splitting for per-unit reveals

use serde::{Deserialize, Serialize};

/// Non-breaking space; keeps whitespace units from collapsing
pub const NBSP: char = '\u{a0}';

/// How text is split into animated units
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Chars,
    #[default]
    Words,
}

impl Granularity {
    /// Class name given to generated unit elements
    pub fn unit_class(&self) -> &'static str {
        match self {
            Granularity::Chars => "unveil-char",
            Granularity::Words => "unveil-word",
        }
    }
}

/// Split raw text into display units
///
/// Characters: one unit per char, spaces become non-breaking spaces.
/// Words: split on single spaces, each word followed by a non-breaking space.
pub fn split_units(text: &str, granularity: Granularity) -> Vec<String> {
    match granularity {
        Granularity::Chars => text
            .chars()
            .map(|c| if c == ' ' { NBSP } else { c })
            .map(String::from)
            .collect(),
        Granularity::Words => {
            if text.is_empty() {
                return Vec::new();
            }
            text.split(' ')
                .map(|word| {
                    let mut unit = String::with_capacity(word.len() + NBSP.len_utf8());
                    unit.push_str(word);
                    unit.push(NBSP);
                    unit
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chars_replace_spaces() {
        assert_eq!(split_units("a b", Granularity::Chars), vec!["a", "\u{a0}", "b"]);
    }

    #[test]
    fn test_words_get_trailing_nbsp() {
        assert_eq!(
            split_units("Power your farm", Granularity::Words),
            vec!["Power\u{a0}", "your\u{a0}", "farm\u{a0}"]
        );
    }

    #[test]
    fn test_empty_text_has_no_units() {
        assert!(split_units("", Granularity::Words).is_empty());
        assert!(split_units("", Granularity::Chars).is_empty());
    }

    #[test]
    fn test_multibyte_chars() {
        assert_eq!(split_units("₹1", Granularity::Chars), vec!["₹", "1"]);
    }
}
