use aihotkeys_core::{ActionId, Rejection, ShortcutMap};
use aihotkeys_page::Location;
use serde_json::Value;

use crate::attempt::ActionContext;
use crate::dispatcher::{DispatchOutcome, KeyEvent, match_event};
use crate::profile::{LocationWatcher, SiteProfile, match_profile_index};
use crate::registry::ActionRegistry;
use crate::resolver::{Resolution, resolve_traced};
use crate::sites;

/// Everything the content script keeps between events
///
/// The active profile is always re-derived from the location, never patched, and the
/// shortcut map is swapped whole on every rebuild.
#[derive(Debug)]
pub struct Controller {
    profiles: Vec<SiteProfile>,
    generic: ActionRegistry,
    shortcuts: ShortcutMap,
    active: Option<usize>,
    watcher: LocationWatcher,
}

impl Controller {
    pub fn new(profiles: Vec<SiteProfile>, generic: ActionRegistry, location: &Location) -> Self {
        let mut controller = Self {
            profiles,
            generic,
            shortcuts: ShortcutMap::defaults(),
            active: None,
            watcher: LocationWatcher::new(location.href.clone()),
        };
        controller.refresh(location);
        controller
    }

    /// Controller with the builtin site profiles and generic heuristics
    pub fn builtin(location: &Location) -> Self {
        Self::new(sites::builtin_profiles(), sites::generic::registry(), location)
    }

    /// Re-derive the active profile for `location`
    pub fn refresh(&mut self, location: &Location) {
        let active = match_profile_index(&self.profiles, location);
        if active != self.active {
            tracing::debug!(
                hostname = %location.hostname,
                profile = active.map(|index| self.profiles[index].name()),
                "active site profile changed"
            );
        }
        self.active = active;
    }

    /// Refresh only when the URL differs from the last one seen; true if it did
    ///
    /// Safe to call from both the structural observer and the poll timer.
    pub fn location_changed(&mut self, location: &Location) -> bool {
        if !self.watcher.observe(&location.href) {
            return false;
        }
        self.refresh(location);
        true
    }

    /// Replace the shortcut map from a raw settings record
    ///
    /// `None` restores the defaults. Returns the candidates that fell back.
    pub fn rebuild(&mut self, raw: Option<&Value>) -> Vec<Rejection> {
        let report = ShortcutMap::build_report(raw);
        self.shortcuts = report.map;
        report.rejected
    }

    pub fn shortcuts(&self) -> &ShortcutMap {
        &self.shortcuts
    }

    pub fn active_profile(&self) -> Option<&SiteProfile> {
        self.active.map(|index| &self.profiles[index])
    }

    pub fn profiles(&self) -> &[SiteProfile] {
        &self.profiles
    }

    pub fn generic(&self) -> &ActionRegistry {
        &self.generic
    }

    /// Route a key event; a bound combo is consumed even if no attempt succeeds
    pub fn handle_key(&self, event: &KeyEvent, ctx: &ActionContext<'_>) -> DispatchOutcome {
        let Some(action) = match_event(&self.shortcuts, event) else {
            return DispatchOutcome::Ignored;
        };
        let resolved = self.perform(action, ctx);
        DispatchOutcome::Handled { action, resolved }
    }

    pub fn perform(&self, action: ActionId, ctx: &ActionContext<'_>) -> bool {
        self.perform_traced(action, ctx).handled()
    }

    /// Like [`Controller::perform`], keeping the per-attempt record
    pub fn perform_traced(&self, action: ActionId, ctx: &ActionContext<'_>) -> Resolution {
        resolve_traced(action, self.active_profile(), &self.generic, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn location(href: &str) -> Location {
        Location::parse(href).unwrap()
    }

    #[test]
    fn test_builtin_picks_profile_from_location() {
        let controller = Controller::builtin(&location("https://claude.ai/new"));
        assert_eq!(controller.active_profile().map(SiteProfile::name), Some("claude"));

        let controller = Controller::builtin(&location("https://example.com/"));
        assert!(controller.active_profile().is_none());
    }

    #[test]
    fn test_location_changed_is_idempotent() {
        let mut controller = Controller::builtin(&location("https://chatgpt.com/"));
        assert!(!controller.location_changed(&location("https://chatgpt.com/")));

        assert!(controller.location_changed(&location("https://grok.com/chat/1")));
        assert_eq!(controller.active_profile().map(SiteProfile::name), Some("grok"));
        assert!(!controller.location_changed(&location("https://grok.com/chat/1")));
    }

    #[test]
    fn test_rebuild_replaces_map_and_reports_rejections() {
        let mut controller = Controller::builtin(&location("https://chatgpt.com/"));
        let rejected = controller.rebuild(Some(&json!({
            "newChat": { "key": "n", "shift": false },
            "chatSearch": { "key": "g", "shift": false }
        })));

        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].action, ActionId::NewChat);
        assert_eq!(controller.shortcuts().get(ActionId::NewChat).to_combo(), "shift+o");
        assert_eq!(controller.shortcuts().get(ActionId::ChatSearch).to_combo(), "g");

        controller.rebuild(None);
        assert_eq!(*controller.shortcuts(), ShortcutMap::defaults());
    }
}
