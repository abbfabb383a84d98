use std::collections::VecDeque;

use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::engine::state::EngineState;
use crate::engine::token::Token;

/// One display line of tokens.
///
/// The text starts with a separator and every token is followed by one, so
/// `" F1 Ctrl F5 { "` holds the tokens `F1`, `Ctrl F5` and `{`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub tokens: Vec<Token>,
    pub text: String,
}

impl Default for Question {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            text: " ".to_string(),
        }
    }
}

impl Question {
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let mut question = Self::default();
        for token in tokens {
            question.push(token.clone());
        }
        question
    }

    /// Display width in characters.
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn push(&mut self, token: Token) {
        self.text.push_str(token.as_str());
        self.text.push(' ');
        self.tokens.push(token);
    }
}

/// Splits a pool of tokens into width-bounded questions, one at a time.
///
/// Each call to [`next_question`](Self::next_question) builds only the next
/// line, so penalties registered while answering one line already bias the
/// selection of the next. Once the pool is exhausted the last line is padded
/// from a fresh shuffle of the full set so it is not abnormally short.
pub struct QuestionBuilder {
    original: Vec<Token>,
    remaining: VecDeque<Token>,
    limit: usize,
    current: Question,
    pending: Option<Token>,
    last: Option<Token>,
    exhausted: bool,
}

impl QuestionBuilder {
    /// `pool` is consumed in order; it doubles as the resampling set.
    pub fn new(pool: Vec<Token>, limit: usize) -> Self {
        let (fitting, oversized): (Vec<Token>, Vec<Token>) =
            pool.into_iter().partition(|token| fits_alone(token, limit));
        for token in &oversized {
            warn!(target: "keychenga::engine", %token, limit, "token wider than a question line, skipped");
        }

        Self {
            remaining: fitting.iter().cloned().collect(),
            original: fitting,
            limit,
            current: Question::default(),
            pending: None,
            last: None,
            exhausted: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn next_question(&mut self, state: &mut EngineState) -> Option<Question> {
        if self.exhausted {
            return None;
        }

        loop {
            let token = match self.pending.take() {
                Some(token) => token,
                None => {
                    let tail = clash_tail(&self.current, self.last.as_ref());
                    match state.next_token(&mut self.remaining, &self.original, tail) {
                        Some(token) => token,
                        None => break,
                    }
                }
            };

            if !self.current.is_empty() && self.current.width() + token.char_len() >= self.limit {
                self.pending = Some(token);
                return Some(self.flush());
            }
            self.push(token);
        }

        self.exhausted = true;
        if self.current.is_empty() {
            return None;
        }

        let mut filler: Vec<Token> = self.original.clone();
        filler.shuffle(state.rng());
        let mut filler: VecDeque<Token> = filler.into();
        loop {
            let tail = clash_tail(&self.current, self.last.as_ref());
            let Some(token) = state.next_token(&mut filler, &self.original, tail) else {
                break;
            };
            if self.current.width() + token.char_len() >= self.limit {
                break;
            }
            self.push(token);
        }

        Some(self.flush())
    }

    fn push(&mut self, token: Token) {
        self.last = Some(token.clone());
        self.current.push(token);
    }

    fn flush(&mut self) -> Question {
        let question = std::mem::take(&mut self.current);
        debug!(target: "keychenga::engine", question = %question.text, width = question.width(), "question built");
        question
    }
}

fn fits_alone(token: &Token, limit: usize) -> bool {
    token.char_len() + 2 <= limit
}

fn clash_tail<'a>(current: &'a Question, last: Option<&'a Token>) -> &'a str {
    if current.is_empty() {
        last.map(Token::as_str).unwrap_or("")
    } else {
        &current.text
    }
}
