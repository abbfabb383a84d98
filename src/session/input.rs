use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

const ESCAPE_CHAR: char = '\u{1b}';

/// Modifier glyphs some hosts report in place of key names.
const MODIFIER_GLYPHS: &[(&str, &str)] = &[
    ("⌘", "Alt"),
    ("⌥", "Windows"),
    ("⌃", "Ctrl"),
    ("⇧", "Shift"),
    ("⎋", "Escape"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPhase {
    /// The physical key went down.
    Pressed,
    /// The key produced a character.
    Typed,
}

/// A key event as delivered by the host, before normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub phase: KeyPhase,
    /// Character produced by the key, if the host defines one.
    pub ch: Option<char>,
    /// Host name of the key or chord, e.g. `F5`, `Left`, `Ctrl F5`, `⌘`.
    pub name: String,
    /// Non-printing key such as an arrow, function key, or chord.
    pub action: bool,
}

impl RawKeyEvent {
    pub fn typed(ch: char) -> Self {
        Self {
            phase: KeyPhase::Typed,
            ch: Some(ch),
            name: ch.to_string(),
            action: false,
        }
    }

    pub fn action(name: &str) -> Self {
        Self {
            phase: KeyPhase::Pressed,
            ch: None,
            name: name.to_string(),
            action: true,
        }
    }

    pub fn escape(phase: KeyPhase) -> Self {
        Self {
            phase,
            ch: Some(ESCAPE_CHAR),
            name: "Escape".to_string(),
            action: false,
        }
    }

    /// A real attempt at the expected text; misses on these are penalized.
    pub fn is_attempt(&self) -> bool {
        self.ch.is_some() || self.action
    }

    fn is_escape(&self) -> bool {
        self.ch == Some(ESCAPE_CHAR) || self.name == "Escape" || self.name == "⎋"
    }
}

/// Turns a raw key event into the answer text it stands for.
///
/// Printable keys count on their typed event, named keys on their pressed
/// event, and Escape on either. Enter and Space both become a single space.
/// Returns `None` for events that carry no answer.
pub fn normalize(event: &RawKeyEvent) -> Option<String> {
    let escape = event.is_escape();
    let named = event.ch.is_none() || event.action || escape;

    let answer = if named {
        if event.phase != KeyPhase::Pressed && !escape {
            return None;
        }
        if escape { "Escape".to_string() } else { remap_glyphs(&event.name) }
    } else {
        if event.phase != KeyPhase::Typed {
            return None;
        }
        match event.ch {
            Some('\n' | '\r' | ' ') => " ".to_string(),
            Some(ch) => remap_glyphs(&ch.to_string()),
            None => return None,
        }
    };

    if answer.is_empty() || answer.starts_with("Unknown") || answer.starts_with("Undefined") {
        return None;
    }
    Some(answer)
}

fn remap_glyphs(name: &str) -> String {
    if !name.contains(|c: char| MODIFIER_GLYPHS.iter().any(|(glyph, _)| glyph.contains(c))) {
        return name.to_string();
    }
    name.split_whitespace()
        .map(|word| {
            MODIFIER_GLYPHS
                .iter()
                .find(|(glyph, _)| *glyph == word)
                .map_or(word, |(_, canonical)| canonical)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Translates a terminal key event into the host-neutral model.
///
/// Releases and auto-repeats are dropped, as are bare modifier presses; a
/// terminal reports a chord as one event with modifiers attached, which
/// becomes a single space-separated name such as `Ctrl Shift F9`.
pub fn from_crossterm(key: &KeyEvent) -> Option<RawKeyEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let mut chord: Vec<&str> = Vec::new();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        chord.push("Ctrl");
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        chord.push("Alt");
    }
    if key.modifiers.contains(KeyModifiers::SUPER) {
        chord.push("Windows");
    }
    if key.modifiers.contains(KeyModifiers::META) {
        chord.push("Meta");
    }
    if key.modifiers.contains(KeyModifiers::HYPER) {
        chord.push("Hyper");
    }
    let chorded = !chord.is_empty();
    if key.modifiers.contains(KeyModifiers::SHIFT) {
        chord.push("Shift");
    }

    let base = match key.code {
        KeyCode::Char(ch) if !chorded => return Some(RawKeyEvent::typed(ch)),
        KeyCode::Char(ch) => {
            // Shift is already folded into punctuation, but not into letters.
            chord.retain(|m| *m != "Shift");
            if ch.is_ascii_alphabetic()
                && (key.modifiers.contains(KeyModifiers::SHIFT) || ch.is_ascii_uppercase())
            {
                chord.push("Shift");
            }
            let base = match ch {
                ' ' => "Space".to_string(),
                ch => ch.to_ascii_uppercase().to_string(),
            };
            return Some(RawKeyEvent::action(&join_chord(&chord, &base)));
        }
        KeyCode::Enter if !chorded => return Some(RawKeyEvent::typed('\n')),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => return Some(RawKeyEvent::escape(KeyPhase::Typed)),
        KeyCode::BackTab => {
            chord.retain(|m| *m != "Shift");
            "Shift Tab".to_string()
        }
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::CapsLock => "CapsLock".to_string(),
        KeyCode::ScrollLock => "ScrollLock".to_string(),
        KeyCode::NumLock => "NumLock".to_string(),
        KeyCode::PrintScreen => "PrintScreen".to_string(),
        KeyCode::Pause => "Pause".to_string(),
        KeyCode::Menu => "Menu".to_string(),
        KeyCode::KeypadBegin => "Begin".to_string(),
        KeyCode::Modifier(_) => return None,
        KeyCode::Null => "Undefined".to_string(),
        KeyCode::Media(media) => format!("Unknown media key {media:?}"),
    };

    Some(RawKeyEvent::action(&join_chord(&chord, &base)))
}

fn join_chord(modifiers: &[&str], base: &str) -> String {
    if modifiers.is_empty() {
        base.to_string()
    } else {
        format!("{} {base}", modifiers.join(" "))
    }
}
