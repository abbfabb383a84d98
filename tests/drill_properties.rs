use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use keychenga::engine::clash::{clashes, select_next};
use keychenga::engine::{EngineState, PenaltyStore, Token, Tuning};
use keychenga::generator::{Question, QuestionBuilder, TokenSource};
use keychenga::session::input::normalize;
use keychenga::session::{KeyPhase, Matcher, RawKeyEvent, Step};

fn tokens(items: &[&str]) -> Vec<Token> {
    items.iter().map(|s| Token::new(s)).collect()
}

fn all_bundled_tokens() -> Vec<Token> {
    let source = TokenSource::new(None);
    source.merged(&source.available())
}

const KEY_NAMES: &[&str] = &[
    "Up", "Down", "Left", "Right", "Home", "End", "PageUp", "PageDown", "Insert", "Delete",
    "Backspace", "Tab", "Enter", "Space", "Escape",
];

const MODIFIERS: &[&str] = &["Ctrl", "Alt", "Shift", "Windows"];

fn is_key_name(word: &str) -> bool {
    KEY_NAMES.contains(&word)
        || word
            .strip_prefix('F')
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Whether `text` is pressed as one key event rather than typed out.
fn is_pressed(text: &str) -> bool {
    let words: Vec<&str> = text.split(' ').collect();
    match words.split_last() {
        Some((key, [])) => is_key_name(key),
        Some((key, modifiers)) => {
            modifiers.iter().all(|m| MODIFIERS.contains(m))
                && (is_key_name(key) || key.chars().count() == 1)
        }
        None => false,
    }
}

/// Key events a user would produce to type `token` exactly.
fn keystrokes(token: &Token) -> Vec<RawKeyEvent> {
    let text = token.as_str();
    if text == "Escape" {
        vec![RawKeyEvent::escape(KeyPhase::Typed)]
    } else if is_pressed(text) {
        vec![RawKeyEvent::action(text)]
    } else {
        text.chars().map(RawKeyEvent::typed).collect()
    }
}

fn feed(matcher: &mut Matcher, state: &mut EngineState, event: &RawKeyEvent) -> Option<Step> {
    let answer = normalize(event)?;
    Some(matcher.feed(&answer, event.is_attempt(), state))
}

#[test]
fn test_only_key_names_and_chords_are_pressed() {
    for pressed in ["F1", "F12", "PageDown", "Ctrl A", "Alt F4", "Shift Tab", "Ctrl Shift F9"] {
        assert!(is_pressed(pressed), "{pressed}");
    }
    let typed = ["Vec::new()", "String::from(\"\")", "Option", "async", "F", "Fn", "Ctrl", "Ctrl Vec::new()", "{"];
    for typed in typed {
        assert!(!is_pressed(typed), "{typed}");
    }
}

#[test]
fn test_questions_never_exceed_limit() {
    let pool = all_bundled_tokens();
    assert!(!pool.is_empty());
    for limit in [20, 33, 75, 100] {
        for seed in 0..8 {
            let mut state = EngineState::seeded(Tuning::default(), seed);
            // Mistakes feed the penalty store so penalty draws are exercised too.
            for token in pool.iter().step_by(7) {
                state.register_mismatch(token);
            }
            let mut builder = QuestionBuilder::new(pool.clone(), limit);
            let mut count = 0;
            while let Some(question) = builder.next_question(&mut state) {
                assert!(
                    question.width() <= limit,
                    "limit {limit}, seed {seed}: {:?} is {} wide",
                    question.text,
                    question.width()
                );
                count += 1;
            }
            assert!(count > 0);
        }
    }
}

#[test]
fn test_penalty_store_never_exceeds_capacity() {
    let words = tokens(&["a", "b", "c", "d", "e", "f", "g"]);
    for capacity in [1, 3, 10, 64] {
        let mut store = PenaltyStore::with_capacity(capacity);
        for round in 0..200 {
            let token = &words[(round * 5 + round / 3) % words.len()];
            if round % 4 == 0 {
                store.add_times(token, 16);
            } else {
                store.add(token.clone());
            }
            assert!(store.len() <= capacity, "capacity {capacity}, len {}", store.len());
        }
    }
}

#[test]
fn test_penalty_store_evicts_oldest() {
    let mut store = PenaltyStore::with_capacity(3);
    for token in tokens(&["a", "b", "c", "d"]) {
        store.add(token);
    }
    let order: Vec<&str> = store.iter().map(Token::as_str).collect();
    assert_eq!(order, vec!["b", "c", "d"]);
}

#[test]
fn test_selector_avoids_cat_after_cat() {
    let original = tokens(&["cat", "dog", "cat food"]);
    for seed in 0..16 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut pool: VecDeque<Token> = tokens(&["cat", "cat food", "dog"]).into();
        let next = select_next(&mut pool, &original, " fish cat ", &mut rng).unwrap();
        assert_eq!(next, Token::new("dog"));
        assert!(!clashes(" fish cat ", next.as_str()));
    }
}

#[test]
fn test_typing_the_question_completes_without_penalties() {
    let pool = all_bundled_tokens();
    for seed in 0..4 {
        let tuning = Tuning {
            penalty_probability: 0.0,
            sticky_probability: 0.0,
            ..Tuning::default()
        };
        let mut state = EngineState::seeded(tuning, seed);
        let mut builder = QuestionBuilder::new(pool.clone(), 75);
        let mut rounds = 0;
        while let Some(question) = builder.next_question(&mut state) {
            let mut matcher = Matcher::new(question.clone());
            let mut last = None;
            for token in &question.tokens {
                // Key names need their separator typed; single characters
                // get it implied too, so type it explicitly every time.
                last = feed(&mut matcher, &mut state, &RawKeyEvent::typed(' '));
                for event in keystrokes(token) {
                    last = feed(&mut matcher, &mut state, &event);
                }
            }
            assert_eq!(last, Some(Step::Completed), "{:?}", question.text);
            assert!(matcher.is_complete());
            assert_eq!(matcher.answer(), question.text.trim_end());
            assert_eq!(matcher.penalties_added(), 0);
            rounds += 1;
        }
        assert!(rounds > 0);
        assert!(state.penalties.is_empty(), "seed {seed}");
    }
}

#[test]
fn test_typed_escape_matches_escape_token() {
    let event = RawKeyEvent::escape(KeyPhase::Typed);
    assert_eq!(normalize(&event), Some("Escape".to_string()));

    let mut state = EngineState::seeded(Tuning::default(), 1);
    let mut matcher = Matcher::new(Question::from_tokens(&tokens(&["Escape"])));
    assert_eq!(feed(&mut matcher, &mut state, &event), Some(Step::Completed));
    assert!(state.penalties.is_empty());
}

#[test]
fn test_f1_matches_only_the_f1_segment() {
    let mut state = EngineState::seeded(Tuning::default(), 1);
    let question = Question::from_tokens(&tokens(&["F1", "F10", "F11"]));
    assert_eq!(question.text, " F1 F10 F11 ");
    let mut matcher = Matcher::new(question);

    let f1 = RawKeyEvent::action("F1");
    assert_eq!(feed(&mut matcher, &mut state, &f1), Some(Step::Matched));
    assert_eq!(matcher.remaining(), " F10");

    assert!(matches!(
        feed(&mut matcher, &mut state, &f1),
        Some(Step::Mismatched { penalized: true })
    ));
    assert_eq!(matcher.remaining(), " F10");
    assert!(state.penalties.contains(&Token::new("F10")));

    let f10 = RawKeyEvent::action("F10");
    assert_eq!(feed(&mut matcher, &mut state, &f10), Some(Step::Matched));
    let f11 = RawKeyEvent::action("F11");
    assert_eq!(feed(&mut matcher, &mut state, &f11), Some(Step::Completed));
}

#[test]
fn test_unresolved_keys_cause_no_transition() {
    let mut state = EngineState::seeded(Tuning::default(), 1);
    let mut matcher = Matcher::new(Question::from_tokens(&tokens(&["F4"])));
    let unknown = RawKeyEvent::action("Unknown keyCode: 0xff");
    assert_eq!(feed(&mut matcher, &mut state, &unknown), None);
    assert_eq!(matcher.remaining(), " F4");
    assert!(state.penalties.is_empty());
}

#[test]
fn test_penalized_tokens_come_back() {
    let pool = tokens(&["F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8"]);
    let tuning = Tuning {
        penalty_probability: 1.0,
        ..Tuning::default()
    };
    let mut state = EngineState::seeded(tuning, 2);
    state.register_mismatch(&Token::new("F8"));
    let mut builder = QuestionBuilder::new(pool, 75);
    let question = builder.next_question(&mut state).unwrap();
    let served = question.tokens.iter().filter(|t| *t == "F8").count();
    assert!(served > 1, "{:?}", question.text);
}
