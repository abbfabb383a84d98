use std::fmt;
use std::sync::Arc;

/// One unit to type: a word, a symbol, or a key/chord name such as `Ctrl F5`.
///
/// Tokens are compared by exact value. The text is shared, so cloning a token
/// into penalty stores and question lines does not copy it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(Arc<str>);

impl Token {
    pub fn new(text: &str) -> Self {
        Self(Arc::from(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn first_word(&self) -> Option<&str> {
        self.0.split_whitespace().next()
    }

    pub fn last_word(&self) -> Option<&str> {
        self.0.split_whitespace().next_back()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Token {
    fn from(text: String) -> Self {
        Self(Arc::from(text))
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_helpers() {
        let token = Token::new("Ctrl Shift F5");
        assert_eq!(token.first_word(), Some("Ctrl"));
        assert_eq!(token.last_word(), Some("F5"));
        assert_eq!(token.char_len(), 13);
    }

    #[test]
    fn test_blank_token_has_no_words() {
        let token = Token::new("   ");
        assert_eq!(token.first_word(), None);
        assert_eq!(token.last_word(), None);
    }

    #[test]
    fn test_char_len_counts_chars_not_bytes() {
        assert_eq!(Token::new("æøå").char_len(), 3);
    }
}
