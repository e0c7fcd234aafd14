use std::collections::HashSet;

use crate::error::{Result, ScanError};

/// Words that only show up when the link is producing legible text.
/// Matching is exact and case-sensitive: `"login:"` is not `"login"`.
#[derive(Debug, Clone)]
pub struct KnownTokens {
    words: HashSet<String>,
}

impl KnownTokens {
    pub fn new<I, S>(words: I) -> KnownTokens
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KnownTokens {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// First word of `line` in the set, splitting on single spaces.
    pub fn match_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.split(' ').find(|word| self.contains(word))
    }

    /// First known word anywhere in `text`, line by line.
    pub fn match_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        lines(text).find_map(|line| self.match_line(line))
    }
}

pub fn lines(text: &str) -> std::str::Split<'_, char> {
    text.split('\n')
}

pub fn decode(baud_rate: u32, bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|source| ScanError::Decode { baud_rate, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known_good() -> KnownTokens {
        KnownTokens::new(["login", "error", "invalid", "command", "not", "found"])
    }

    #[test]
    fn exact_words_match() {
        let tokens = known_good();
        assert_eq!(tokens.match_text("command not found\n"), Some("command"));
        assert_eq!(tokens.match_text("garbage\nsyntax error here"), Some("error"));
    }

    #[test]
    fn punctuation_and_case_do_not_match() {
        let tokens = known_good();
        assert_eq!(tokens.match_text("Welcome\nlogin: "), None);
        assert_eq!(tokens.match_text("Login ERROR Invalid"), None);
    }

    #[test]
    fn split_is_on_single_spaces_only() {
        let tokens = known_good();
        assert_eq!(tokens.match_line("a\tlogin"), None);
        assert_eq!(tokens.match_line("a  login"), Some("login"));
        assert_eq!(tokens.match_line("login\r"), None);
    }

    #[test]
    fn empty_response_has_one_empty_line() {
        assert_eq!(lines("").collect::<Vec<_>>(), vec![""]);
        assert_eq!(known_good().match_text(""), None);
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let err = decode(9600, &[0x66, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ScanError::Decode { baud_rate: 9600, .. }));
        assert_eq!(decode(9600, b"ok").unwrap(), "ok");
    }
}
