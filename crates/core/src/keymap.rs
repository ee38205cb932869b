//! Human-editable keymap text format.
//!
//! One directive per line:
//!
//! ```text
//! # comments start with '#'
//! map newChat cmd+shift+o
//! map chatSearch shift+p
//! ```
//!
//! Command aliases (`cmd`, `command`, `⌘`, `ctrl`, `control`) are accepted and ignored
//! since the command modifier is always implied; `shift`/`⇧` set the shift flag.

use crate::action::ActionId;
use crate::shortcut::{Shortcut, ShortcutMap, blocked_reason, normalize_key};

use std::collections::BTreeMap;

/// What went wrong on one line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeymapErrorKind {
    #[error("Unknown command \"{0}\"")]
    UnknownCommand(String),

    #[error("Missing action id")]
    MissingAction,

    #[error("Unknown action \"{0}\"")]
    UnknownAction(String),

    #[error("Missing combo for \"{0}\"")]
    MissingCombo(String),

    #[error("Invalid combo \"{0}\"")]
    InvalidCombo(String),

    #[error("{0}")]
    Blocked(&'static str),
}

/// A line-numbered keymap error (1-based line)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Line {line}: {kind}")]
pub struct KeymapError {
    pub line: usize,
    pub kind: KeymapErrorKind,
}

/// Parsed keymap text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeymapParse {
    /// Valid assignments; later lines override earlier ones
    pub assignments: BTreeMap<ActionId, Shortcut>,
    pub errors: Vec<KeymapError>,
}

impl KeymapParse {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Full map: assignments over defaults
    pub fn to_map(&self) -> ShortcutMap {
        merge_assignments(&self.assignments)
    }
}

/// Parse a combo such as `cmd+shift+o`
pub fn parse_combo(combo: &str) -> Option<Shortcut> {
    let compact: String = combo.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let mut shift = false;
    let mut key_part: Option<&str> = None;

    for part in compact.split('+').filter(|segment| !segment.is_empty()) {
        match part.to_lowercase().as_str() {
            "cmd" | "command" | "⌘" | "control" | "ctrl" => continue,
            "shift" | "⇧" => shift = true,
            _ if key_part.is_none() => key_part = Some(part),
            _ => return None,
        }
    }

    let key = normalize_key(key_part?)?;
    Some(Shortcut { key, shift })
}

/// Parse keymap text; never fails as a whole, errors are collected per line
pub fn parse_keymap(text: &str) -> KeymapParse {
    let mut parsed = KeymapParse::default();

    for (index, line) in text.split('\n').enumerate() {
        let line_number = index + 1;
        let effective = match line.trim().split_once('#') {
            Some((before, _)) => before.trim(),
            None => line.trim(),
        };
        if effective.is_empty() {
            continue;
        }

        match parse_directive(effective) {
            Ok((id, shortcut)) => {
                parsed.assignments.insert(id, shortcut);
            }
            Err(kind) => parsed.errors.push(KeymapError { line: line_number, kind }),
        }
    }

    parsed
}

fn parse_directive(effective: &str) -> Result<(ActionId, Shortcut), KeymapErrorKind> {
    let mut parts = effective.split_whitespace();
    let command = parts.next().unwrap_or_default();
    if !command.eq_ignore_ascii_case("map") {
        return Err(KeymapErrorKind::UnknownCommand(command.to_string()));
    }

    let action_token = parts.next().ok_or(KeymapErrorKind::MissingAction)?;
    let id = ActionId::parse_str(action_token).ok_or_else(|| KeymapErrorKind::UnknownAction(action_token.to_string()))?;

    let combo = parts.collect::<Vec<_>>().join(" ");
    if combo.is_empty() {
        return Err(KeymapErrorKind::MissingCombo(action_token.to_string()));
    }

    let shortcut = parse_combo(&combo).ok_or(KeymapErrorKind::InvalidCombo(combo))?;
    if let Some(reason) = blocked_reason(shortcut.key, shortcut.shift) {
        return Err(KeymapErrorKind::Blocked(reason));
    }

    Ok((id, shortcut))
}

/// Assignments over defaults, dropping anything that fails validation
pub fn merge_assignments(assignments: &BTreeMap<ActionId, Shortcut>) -> ShortcutMap {
    assignments.iter().fold(ShortcutMap::defaults(), |map, (id, shortcut)| {
        map.with_binding(*id, *shortcut).unwrap_or(map)
    })
}

/// Combo text as written in keymap files, e.g. `shift+o`
pub fn format_shortcut(shortcut: &Shortcut) -> String {
    shortcut.to_combo()
}

/// One `map` line per action, in enumeration order
pub fn serialize_keymap(map: &ShortcutMap) -> String {
    map.iter()
        .map(|(id, shortcut)| format!("map {} {}", id, format_shortcut(&shortcut)))
        .collect::<Vec<_>>()
        .join("\n")
}
