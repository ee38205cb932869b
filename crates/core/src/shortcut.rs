//! Shortcut bindings, the host blocklist, and the total action → shortcut map.
//!
//! Every binding is implicitly combined with the platform command modifier, so a
//! [`Shortcut`] only stores the letter and whether shift is required.

use crate::action::ActionId;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unshifted combos the browser consumes before the page sees the keydown.
const BLOCKED_UNSHIFTED: &[(char, &str)] = &[
    ('n', "Command+N opens a new window before the page can react."),
    ('t', "Command+T opens a new tab before the page can react."),
    ('w', "Command+W closes the tab before the page can react."),
    ('q', "Command+Q quits the browser before the page can react."),
    ('h', "Command+H hides the browser before the page can react."),
    ('m', "Command+M minimizes the window before the page can react."),
    ('l', "Command+L focuses the address bar before the page can react."),
];

/// Shifted combos the browser consumes before the page sees the keydown.
const BLOCKED_SHIFTED: &[(char, &str)] = &[
    ('n', "Command+Shift+N opens an Incognito window before the page can react."),
    ('t', "Command+Shift+T reopens the last tab before the page can react."),
    ('w', "Command+Shift+W reopens a closed window before the page can react."),
];

/// Reason a combo can never be bound, or `None` if the host lets the page see it
pub fn blocked_reason(key: char, shift: bool) -> Option<&'static str> {
    let table = if shift { BLOCKED_SHIFTED } else { BLOCKED_UNSHIFTED };
    let key = key.to_ascii_lowercase();
    table.iter().find(|(blocked, _)| *blocked == key).map(|(_, reason)| *reason)
}

pub fn is_blocked(key: char, shift: bool) -> bool {
    blocked_reason(key, shift).is_some()
}

/// Every blocked (key, shift, reason) triple
pub fn blocked_shortcuts() -> impl Iterator<Item = (char, bool, &'static str)> {
    BLOCKED_UNSHIFTED
        .iter()
        .map(|(key, reason)| (*key, false, *reason))
        .chain(BLOCKED_SHIFTED.iter().map(|(key, reason)| (*key, true, *reason)))
}

/// Normalize a key string to a single lowercase ASCII letter
pub fn normalize_key(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase()),
        _ => None,
    }
}

/// Why a candidate binding was discarded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    /// Candidate is not a `{ key, shift }` record
    #[error("binding is not a {{ key, shift }} record")]
    Malformed,

    /// Key is not a single letter
    #[error("'{0}' is not a single letter")]
    InvalidKey(String),

    /// Host intercepts the combo
    #[error("{0}")]
    Blocked(&'static str),
}

/// A letter plus shift flag, always combined with the command modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shortcut {
    pub key: char,
    pub shift: bool,
}

impl Shortcut {
    /// Validated constructor: single letter, not blocked
    pub fn new(key: char, shift: bool) -> Result<Self, RejectReason> {
        if !key.is_ascii_alphabetic() {
            return Err(RejectReason::InvalidKey(key.to_string()));
        }
        let key = key.to_ascii_lowercase();
        if let Some(reason) = blocked_reason(key, shift) {
            return Err(RejectReason::Blocked(reason));
        }
        Ok(Self { key, shift })
    }

    /// Read a stored `{ "key": "o", "shift": true }` record
    ///
    /// `shift` follows JavaScript truthiness, matching what the options page writes.
    pub fn from_value(value: &Value) -> Result<Self, RejectReason> {
        let record = value.as_object().ok_or(RejectReason::Malformed)?;
        let raw_key = match record.get("key") {
            Some(Value::String(key)) if !key.is_empty() => key,
            Some(Value::String(_)) | Some(Value::Null) | None => return Err(RejectReason::Malformed),
            Some(other) => return Err(RejectReason::InvalidKey(other.to_string())),
        };
        let key = normalize_key(raw_key).ok_or_else(|| RejectReason::InvalidKey(raw_key.clone()))?;
        let shift = record.get("shift").is_some_and(is_truthy);
        Self::new(key, shift)
    }

    /// Text-format combo, e.g. `shift+o`
    pub fn to_combo(&self) -> String {
        match self.shift {
            true => format!("shift+{}", self.key),
            false => self.key.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({ "key": self.key.to_string(), "shift": self.shift })
    }

    pub fn matches(&self, key: char, shift: bool) -> bool {
        self.key == key && self.shift == shift
    }
}

impl std::fmt::Display for Shortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.shift {
            true => write!(f, "Cmd+Shift+{}", self.key.to_ascii_uppercase()),
            false => write!(f, "Cmd+{}", self.key.to_ascii_uppercase()),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Compiled-in binding for an action
pub fn default_shortcut(id: ActionId) -> Shortcut {
    let key = match id {
        ActionId::NewChat => 'o',
        ActionId::ToggleSidebar => 's',
        ActionId::ChatSearch => 'p',
        ActionId::VoiceMode => 'k',
        ActionId::CopyLastResponse => 'c',
        ActionId::CopyConversation => 'e',
    };
    Shortcut { key, shift: true }
}

/// A candidate that was replaced by its default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub action: ActionId,
    pub reason: RejectReason,
}

/// Result of building a map, with what had to fall back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub map: ShortcutMap,
    pub rejected: Vec<Rejection>,
}

/// Two actions bound to the same combo; `shadowed` never fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    pub winner: ActionId,
    pub shadowed: ActionId,
    pub shortcut: Shortcut,
}

/// Total mapping from every [`ActionId`] to exactly one [`Shortcut`]
///
/// Never holds a blocked combo. Rebuilt as a whole; callers swap the previous map out
/// rather than patching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutMap {
    bindings: [Shortcut; ActionId::ALL.len()],
}

impl ShortcutMap {
    pub fn defaults() -> Self {
        Self { bindings: ActionId::ALL.map(default_shortcut) }
    }

    /// Build from a raw settings record, falling back per action to the default
    pub fn from_raw(raw: Option<&Value>) -> Self {
        Self::build_report(raw).map
    }

    /// Like [`ShortcutMap::from_raw`] but also reports what was discarded
    pub fn build_report(raw: Option<&Value>) -> BuildReport {
        let mut map = Self::defaults();
        let mut rejected = Vec::new();

        for id in ActionId::ALL {
            let Some(candidate) = raw.and_then(|raw| raw.get(id.as_str())) else {
                continue;
            };

            match Shortcut::from_value(candidate) {
                Ok(shortcut) => map.bindings[id.index()] = shortcut,
                Err(reason) => {
                    match &reason {
                        RejectReason::Malformed => {
                            tracing::debug!(action = %id, "ignoring malformed shortcut record")
                        }
                        _ => tracing::warn!(action = %id, %reason, "ignoring {} shortcut", id),
                    }
                    rejected.push(Rejection { action: id, reason });
                }
            }
        }

        BuildReport { map, rejected }
    }

    /// Replace one binding, validating it first
    pub fn with_binding(mut self, id: ActionId, shortcut: Shortcut) -> Result<Self, RejectReason> {
        let shortcut = Shortcut::new(shortcut.key, shortcut.shift)?;
        self.bindings[id.index()] = shortcut;
        Ok(self)
    }

    pub fn get(&self, id: ActionId) -> Shortcut {
        self.bindings[id.index()]
    }

    /// Bindings in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (ActionId, Shortcut)> + '_ {
        ActionId::ALL.into_iter().zip(self.bindings.iter().copied())
    }

    /// First action in enumeration order bound to (key, shift)
    pub fn action_for(&self, key: char, shift: bool) -> Option<ActionId> {
        self.iter()
            .find(|(_, shortcut)| shortcut.matches(key, shift))
            .map(|(id, _)| id)
    }

    /// Pairs of actions sharing a combo; the earlier one wins at lookup time
    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for (position, (shadowed, shortcut)) in self.iter().enumerate() {
            if let Some((winner, _)) = self.iter().take(position).find(|(_, other)| *other == shortcut) {
                conflicts.push(Conflict { winner, shadowed, shortcut });
            }
        }
        conflicts
    }
}

impl Default for ShortcutMap {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blocked_reason_lookup() {
        assert!(blocked_reason('n', false).unwrap().contains("new window"));
        assert!(blocked_reason('N', true).unwrap().contains("Incognito"));
        assert_eq!(blocked_reason('o', true), None);
        assert_eq!(blocked_reason('h', true), None);
    }

    #[test]
    fn test_blocked_shortcuts_lists_both_tables() {
        let all: Vec<_> = blocked_shortcuts().collect();
        assert_eq!(all.len(), 10);
        assert_eq!(all.iter().filter(|(_, shift, _)| *shift).count(), 3);
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("A"), Some('a'));
        assert_eq!(normalize_key("z"), Some('z'));
        assert_eq!(normalize_key(""), None);
        assert_eq!(normalize_key("ab"), None);
        assert_eq!(normalize_key("1"), None);
        assert_eq!(normalize_key("é"), None);
        assert_eq!(normalize_key(" a"), None);
    }

    #[test]
    fn test_defaults_pass_validation() {
        for id in ActionId::ALL {
            let shortcut = default_shortcut(id);
            assert_eq!(Shortcut::new(shortcut.key, shortcut.shift), Ok(shortcut));
        }
    }

    #[test]
    fn test_map_is_total_for_any_input() {
        let inputs = [
            None,
            Some(json!(null)),
            Some(json!("garbage")),
            Some(json!({ "newChat": 42, "voiceMode": { "key": "" } })),
            Some(json!({ "toggleSidebar": { "key": "x", "shift": false } })),
        ];

        for raw in inputs.iter() {
            let map = ShortcutMap::from_raw(raw.as_ref());
            assert_eq!(map.iter().count(), ActionId::ALL.len());
            for (_, shortcut) in map.iter() {
                assert!(!is_blocked(shortcut.key, shortcut.shift));
            }
        }
    }

    #[test]
    fn test_valid_user_binding_overrides_default() {
        let raw = json!({ "chatSearch": { "key": "F", "shift": false } });
        let map = ShortcutMap::from_raw(Some(&raw));
        assert_eq!(map.get(ActionId::ChatSearch), Shortcut { key: 'f', shift: false });
        assert_eq!(map.get(ActionId::NewChat), default_shortcut(ActionId::NewChat));
    }

    #[test]
    fn test_blocked_new_chat_binding_keeps_default() {
        let raw = json!({ "newChat": { "key": "n", "shift": false } });
        let report = ShortcutMap::build_report(Some(&raw));

        assert_eq!(report.map.get(ActionId::NewChat), Shortcut { key: 'o', shift: true });
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].action, ActionId::NewChat);
        assert!(matches!(report.rejected[0].reason, RejectReason::Blocked(_)));
    }

    #[test]
    fn test_every_blocked_pair_falls_back_for_every_action() {
        for (key, shift, _) in blocked_shortcuts() {
            for id in ActionId::ALL {
                let raw = json!({ id.as_str(): { "key": key.to_string(), "shift": shift } });
                let map = ShortcutMap::from_raw(Some(&raw));
                assert_eq!(map.get(id), default_shortcut(id));
            }
        }
    }

    #[test]
    fn test_shift_uses_truthiness() {
        let raw = json!({
            "newChat": { "key": "a", "shift": 1 },
            "toggleSidebar": { "key": "b", "shift": "" },
            "chatSearch": { "key": "d" },
        });
        let map = ShortcutMap::from_raw(Some(&raw));
        assert!(map.get(ActionId::NewChat).shift);
        assert!(!map.get(ActionId::ToggleSidebar).shift);
        assert!(!map.get(ActionId::ChatSearch).shift);
    }

    #[test]
    fn test_invalid_key_is_reported() {
        let raw = json!({ "voiceMode": { "key": "F5", "shift": true } });
        let report = ShortcutMap::build_report(Some(&raw));
        assert_eq!(report.rejected[0].reason, RejectReason::InvalidKey("F5".to_string()));
        assert_eq!(report.map.get(ActionId::VoiceMode), default_shortcut(ActionId::VoiceMode));
    }

    #[test]
    fn test_action_for_uses_enumeration_order() {
        let raw = json!({ "voiceMode": { "key": "o", "shift": true } });
        let map = ShortcutMap::from_raw(Some(&raw));

        assert_eq!(map.action_for('o', true), Some(ActionId::NewChat));
        assert_eq!(map.action_for('o', false), None);

        let conflicts = map.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].winner, ActionId::NewChat);
        assert_eq!(conflicts[0].shadowed, ActionId::VoiceMode);
    }

    #[test]
    fn test_with_binding_rejects_blocked() {
        let result = ShortcutMap::defaults().with_binding(ActionId::NewChat, Shortcut { key: 't', shift: true });
        assert!(matches!(result, Err(RejectReason::Blocked(_))));
    }

    #[test]
    fn test_shortcut_display_and_combo() {
        let shortcut = Shortcut { key: 'o', shift: true };
        assert_eq!(shortcut.to_string(), "Cmd+Shift+O");
        assert_eq!(shortcut.to_combo(), "shift+o");
        assert_eq!(Shortcut { key: 'k', shift: false }.to_combo(), "k");
    }
}
