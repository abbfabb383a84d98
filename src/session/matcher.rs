use tracing::trace;

use crate::engine::state::EngineState;
use crate::engine::token::Token;
use crate::generator::question::Question;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The answer consumed part of the current token.
    Matched,
    /// The answer did not fit; `penalized` if the token was recorded.
    Mismatched { penalized: bool },
    /// The last token of the question was finished.
    Completed,
}

/// Tracks the answer to one question, token by token.
///
/// For each token the cursor starts as the separator plus the token text and
/// shrinks as matching answers arrive.
pub struct Matcher {
    question: Question,
    index: usize,
    cursor: String,
    answer: String,
    miss: Option<String>,
    penalties_added: usize,
}

impl Matcher {
    pub fn new(question: Question) -> Self {
        let cursor = question
            .tokens
            .first()
            .map(|token| format!(" {token}"))
            .unwrap_or_default();
        Self {
            question,
            index: 0,
            cursor,
            answer: String::new(),
            miss: None,
            penalties_added: 0,
        }
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn current_token(&self) -> Option<&Token> {
        self.question.tokens.get(self.index)
    }

    /// Unmatched remainder of the current token, separator included.
    pub fn remaining(&self) -> &str {
        &self.cursor
    }

    /// Everything answered correctly so far.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// The last rejected answer, cleared by the next match.
    pub fn miss(&self) -> Option<&str> {
        self.miss.as_deref()
    }

    /// Column of the next expected character, skipping an implied separator.
    pub fn aim_column(&self) -> usize {
        let skip = usize::from(self.cursor.starts_with(' '));
        self.answer.chars().count() + skip
    }

    pub fn penalties_added(&self) -> usize {
        self.penalties_added
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.question.tokens.len()
    }

    /// Applies one normalized answer.
    ///
    /// `attempt` marks answers from printable or action keys; only those
    /// register a penalty when they do not match.
    pub fn feed(&mut self, answer: &str, attempt: bool, state: &mut EngineState) -> Step {
        let Some(token) = self.question.tokens.get(self.index).cloned() else {
            return Step::Completed;
        };

        let answer = if self.cursor.starts_with(' ') && answer != " " {
            format!(" {answer}")
        } else {
            answer.to_string()
        };

        if accepts(&self.cursor, &answer) {
            self.cursor.drain(..answer.len());
            self.answer.push_str(&answer);
            self.miss = None;
            trace!(target: "keychenga::session", %token, answer, remaining = %self.cursor, "match");

            if self.cursor.is_empty() {
                self.index += 1;
                match self.question.tokens.get(self.index) {
                    Some(next) => self.cursor = format!(" {next}"),
                    None => return Step::Completed,
                }
            }
            return Step::Matched;
        }

        let mut penalized = false;
        if attempt {
            if answer != " " {
                state.register_mismatch(&token);
                self.penalties_added += 1;
                penalized = true;
            }
            self.miss = Some(answer);
        }
        trace!(target: "keychenga::session", %token, penalized, remaining = %self.cursor, "mismatch");
        Step::Mismatched { penalized }
    }

    /// Handles a poll timeout. Returns whether a penalty was registered.
    pub fn timeout(&mut self, state: &mut EngineState) -> bool {
        if self.answer.is_empty() {
            return false;
        }
        let Some(token) = self.current_token().cloned() else {
            return false;
        };
        let penalized = state.register_timeout(&token);
        if penalized {
            self.penalties_added += 1;
        }
        penalized
    }
}

/// Whether `answer` is a prefix of the unmatched text.
///
/// A key name longer than one character must also end on a word boundary, so
/// the `F1` key never passes for the start of `F10` and `Up` never passes for
/// the start of `Upload`.
fn accepts(cursor: &str, answer: &str) -> bool {
    if !cursor.starts_with(answer) {
        return false;
    }
    if answer.trim().chars().count() <= 1 {
        return true;
    }
    cursor[answer.len()..]
        .chars()
        .next()
        .is_none_or(char::is_whitespace)
}
