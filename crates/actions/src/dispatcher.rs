//! Turns keyboard events into actions.

use aihotkeys_core::{ActionId, ShortcutMap, normalize_key};

/// The element a key event was aimed at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyTarget {
    /// Lowercase tag name
    pub tag: String,
    pub read_only: bool,
    pub content_editable: bool,
    /// `data-force-hotkeys` is present and non-empty
    pub force_hotkeys: bool,
}

impl KeyTarget {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into().to_ascii_lowercase(), ..Default::default() }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn content_editable(mut self) -> Self {
        self.content_editable = true;
        self
    }

    pub fn force_hotkeys(mut self) -> Self {
        self.force_hotkeys = true;
        self
    }
}

/// The parts of a `keydown` event the dispatcher looks at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    /// `KeyboardEvent.key`
    pub key: String,
    pub meta: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub repeat: bool,
    pub target: Option<KeyTarget>,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), ..Default::default() }
    }

    /// Parse a combo such as `cmd+shift+o` or `ctrl+alt+k`
    ///
    /// Modifier names are case-insensitive; the last part is the key. With shift held the
    /// key is reported uppercase, as a browser would.
    pub fn from_combo(combo: &str) -> Option<Self> {
        let parts = combo.split('+').map(str::trim).filter(|part| !part.is_empty()).collect::<Vec<_>>();
        let (key, modifiers) = parts.split_last()?;

        let mut event = KeyEvent::default();
        for modifier in modifiers {
            match modifier.to_lowercase().as_str() {
                "cmd" | "command" | "meta" | "⌘" => event.meta = true,
                "ctrl" | "control" => event.ctrl = true,
                "alt" | "option" | "opt" | "⌥" => event.alt = true,
                "shift" | "⇧" => event.shift = true,
                _ => return None,
            }
        }

        event.key = match event.shift {
            true => key.to_uppercase(),
            false => key.to_string(),
        };
        Some(event)
    }

    pub fn with_target(mut self, target: KeyTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }
}

/// What happened to a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a hotkey; let the event through
    Ignored,
    /// A bound hotkey; the event must not reach the page
    Handled { action: ActionId, resolved: bool },
}

impl DispatchOutcome {
    /// Whether the caller must prevent default and stop propagation
    pub fn consumes_event(&self) -> bool {
        matches!(self, DispatchOutcome::Handled { .. })
    }
}

/// Read-only text fields swallow hotkeys unless they opt in with `data-force-hotkeys`
///
/// Content-editable targets are never ignored.
pub fn should_ignore_target(target: Option<&KeyTarget>) -> bool {
    let Some(target) = target else { return false };
    if target.content_editable {
        return false;
    }

    match target.tag.as_str() {
        "input" | "textarea" => target.read_only && !target.force_hotkeys,
        _ => false,
    }
}

/// Action bound to an event's key combination, if any
///
/// Requires the command key and rejects control or alt. Ties go to the first action in
/// enumeration order.
pub fn action_for_event(map: &ShortcutMap, event: &KeyEvent) -> Option<ActionId> {
    if !event.meta || event.ctrl || event.alt {
        return None;
    }
    let key = normalize_key(&event.key)?;
    map.action_for(key, event.shift)
}

/// Apply the target and repeat filters, then look the event up
pub fn match_event(map: &ShortcutMap, event: &KeyEvent) -> Option<ActionId> {
    if should_ignore_target(event.target.as_ref()) || event.repeat {
        return None;
    }
    action_for_event(map, event)
}
