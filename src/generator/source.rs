use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::PathBuf;

use icu_normalizer::ComposingNormalizerBorrowed;
use rust_embed::Embed;
use tracing::{debug, warn};

use crate::engine::token::Token;
use crate::error::DrillError;

#[derive(Embed)]
#[folder = "assets/drills/"]
struct DrillAssets;

const EXTENSION: &str = ".txt";

/// The tokens of one named drill file.
#[derive(Clone, Debug)]
pub struct Category {
    pub name: String,
    pub tokens: Vec<Token>,
}

/// Supplies token lists by category name.
///
/// A file `<name>.txt` in the user drills directory shadows the bundled
/// category of the same name.
pub struct TokenSource {
    user_dir: Option<PathBuf>,
    exclude: Vec<String>,
}

impl TokenSource {
    pub fn new(user_dir: Option<PathBuf>) -> Self {
        Self {
            user_dir,
            exclude: Vec::new(),
        }
    }

    /// Drop tokens containing any of these key names as a whole word.
    pub fn with_exclusions(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// All category names, bundled and user-provided, sorted.
    pub fn available(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = DrillAssets::iter()
            .filter_map(|f| f.strip_suffix(EXTENSION).map(|n| n.to_string()))
            .collect();

        if let Some(dir) = &self.user_dir {
            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.flatten() {
                    let file_name = entry.file_name();
                    if let Some(name) = file_name.to_str().and_then(|n| n.strip_suffix(EXTENSION)) {
                        names.insert(name.to_string());
                    }
                }
            }
        }

        names.into_iter().collect()
    }

    pub fn load(&self, name: &str) -> Result<Category, DrillError> {
        let filename = format!("{name}{EXTENSION}");

        if let Some(dir) = &self.user_dir {
            let path = dir.join(&filename);
            match fs::read_to_string(&path) {
                Ok(content) => return Ok(self.category(name, &content)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(DrillError::Io { path, source }),
            }
        }

        let file = DrillAssets::get(&filename)
            .ok_or_else(|| DrillError::UnknownCategory(name.to_string()))?;
        let content = String::from_utf8_lossy(file.data.as_ref());
        Ok(self.category(name, &content))
    }

    /// Concatenates the named categories, dropping repeats across categories.
    ///
    /// A category that fails to load is logged and contributes no tokens.
    pub fn merged(&self, names: &[String]) -> Vec<Token> {
        let mut merged = Vec::new();
        let mut seen_elsewhere: HashSet<Token> = HashSet::new();

        for name in names {
            let category = match self.load(name) {
                Ok(category) => category,
                Err(err) => {
                    warn!(target: "keychenga::source", category = %name, %err, "skipping drill category");
                    continue;
                }
            };
            debug!(target: "keychenga::source", category = %name, tokens = category.tokens.len(), "loaded");

            let local: HashSet<Token> = category.tokens.iter().cloned().collect();
            merged.extend(
                category
                    .tokens
                    .into_iter()
                    .filter(|token| !seen_elsewhere.contains(token)),
            );
            seen_elsewhere.extend(local);
        }

        merged
    }

    fn category(&self, name: &str, content: &str) -> Category {
        let tokens = parse_lines(content)
            .into_iter()
            .filter(|token| !self.is_excluded(token))
            .collect();
        Category {
            name: name.to_string(),
            tokens,
        }
    }

    fn is_excluded(&self, token: &Token) -> bool {
        token
            .as_str()
            .split_whitespace()
            .any(|word| self.exclude.iter().any(|key| key == word))
    }
}

/// One token per non-blank line, NFC-normalized, inner whitespace collapsed.
///
/// Repeated lines are kept; a drill file repeats a line to weight it.
pub fn parse_lines(content: &str) -> Vec<Token> {
    let nfc = ComposingNormalizerBorrowed::new_nfc();
    content
        .lines()
        .filter_map(|line| {
            let normalized = nfc.normalize(line);
            let words: Vec<&str> = normalized.split_whitespace().collect();
            if words.is_empty() {
                None
            } else {
                Some(Token::from(words.join(" ")))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(Token::as_str).collect()
    }

    #[test]
    fn test_parse_lines_skips_blank_and_collapses_spaces() {
        let tokens = parse_lines("F1\n\n  Ctrl   F5  \r\n\t\n{\n");
        assert_eq!(strings(&tokens), vec!["F1", "Ctrl F5", "{"]);
    }

    #[test]
    fn test_parse_lines_keeps_repeats() {
        let tokens = parse_lines("F9\nF9\nF8\n");
        assert_eq!(strings(&tokens), vec!["F9", "F9", "F8"]);
    }

    #[test]
    fn test_parse_lines_composes_to_nfc() {
        // "a" + combining ring above composes to "å".
        let tokens = parse_lines("a\u{030A}\n");
        assert_eq!(strings(&tokens), vec!["\u{00E5}"]);
    }

    #[test]
    fn test_bundled_categories_are_available() {
        let source = TokenSource::new(None);
        let names = source.available();
        assert!(names.contains(&"f-keys".to_string()));
        assert!(names.contains(&"symbols".to_string()));
    }

    #[test]
    fn test_bundled_f_keys_load() {
        let source = TokenSource::new(None);
        let category = source.load("f-keys").unwrap();
        assert!(category.tokens.contains(&Token::new("F1")));
        assert!(category.tokens.contains(&Token::new("F12")));
    }

    #[test]
    fn test_unknown_category_is_error() {
        let source = TokenSource::new(None);
        assert!(matches!(
            source.load("no-such-drill"),
            Err(DrillError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_merged_skips_missing_category() {
        let source = TokenSource::new(None);
        let merged = source.merged(&["no-such-drill".to_string(), "f-keys".to_string()]);
        assert!(!merged.is_empty());
    }

    #[test]
    fn test_exclusion_matches_whole_words() {
        let source = TokenSource::new(None).with_exclusions(vec!["F10".to_string()]);
        let category = source.load("f-keys").unwrap();
        assert!(!category.tokens.contains(&Token::new("F10")));
        assert!(category.tokens.contains(&Token::new("F1")));
    }
}
