use aihotkeys_actions::{ActionContext, Controller, DispatchOutcome, KeyEvent, KeyTarget, Resolution};
use aihotkeys_core::ActionId;
use aihotkeys_page::{Clipboard, MemoryClipboard, NodeId, Page, StaticPage};
use futures::executor::LocalPool;
use serde_json::json;
use std::rc::Rc;

const CHATGPT: &str = r#"
<html><body>
  <nav>
    <button data-testid="close-sidebar-button" aria-label="Close sidebar">x</button>
    <a data-testid="create-new-chat-button" href="/">New chat</a>
  </nav>
  <main>
    <input type="search" id="search" hidden>
    <div data-message-author-role="user">What is Rust?</div>
    <div data-message-author-role="assistant">A systems language.</div>
    <button data-testid="copy-turn-action-button" id="copy1">Copy</button>
    <div data-message-author-role="user">Thanks</div>
    <div data-message-author-role="assistant">You're welcome.</div>
    <button data-testid="copy-turn-action-button" id="copy2">Copy</button>
  </main>
</body></html>
"#;

struct Harness {
    page: StaticPage,
    memory: MemoryClipboard,
    clipboard: Rc<dyn Clipboard>,
    pool: LocalPool,
}

impl Harness {
    fn new(html: &str, href: &str) -> Self {
        let memory = MemoryClipboard::new();
        Self {
            page: StaticPage::parse(html, href).unwrap(),
            clipboard: Rc::new(memory.clone()),
            memory,
            pool: LocalPool::new(),
        }
    }

    fn press_event(&mut self, controller: &Controller, event: &KeyEvent) -> DispatchOutcome {
        let spawner = self.pool.spawner();
        let ctx = ActionContext::new(&self.page, &self.clipboard, &spawner);
        let outcome = controller.handle_key(event, &ctx);
        self.pool.run_until_stalled();
        outcome
    }

    fn press(&mut self, controller: &Controller, combo: &str) -> DispatchOutcome {
        self.press_event(controller, &KeyEvent::from_combo(combo).unwrap())
    }

    fn trace(&mut self, controller: &Controller, action: ActionId) -> Resolution {
        let spawner = self.pool.spawner();
        let ctx = ActionContext::new(&self.page, &self.clipboard, &spawner);
        let resolution = controller.perform_traced(action, &ctx);
        self.pool.run_until_stalled();
        resolution
    }

    fn node(&self, selector: &str) -> NodeId {
        self.page.query_selector(selector).unwrap().unwrap()
    }

    fn controller(&self) -> Controller {
        Controller::builtin(&self.page.location())
    }
}

fn handled(action: ActionId, resolved: bool) -> DispatchOutcome {
    DispatchOutcome::Handled { action, resolved }
}

#[test]
fn test_chatgpt_new_chat() {
    let mut harness = Harness::new(CHATGPT, "https://chatgpt.com/c/abc");
    let controller = harness.controller();

    assert_eq!(harness.press(&controller, "cmd+shift+o"), handled(ActionId::NewChat, true));
    assert_eq!(harness.page.clicked(), vec![harness.node("a[data-testid='create-new-chat-button']")]);
}

#[test]
fn test_chatgpt_toggle_sidebar() {
    let mut harness = Harness::new(CHATGPT, "https://chatgpt.com/");
    let controller = harness.controller();

    assert_eq!(harness.press(&controller, "cmd+shift+s"), handled(ActionId::ToggleSidebar, true));
    assert_eq!(harness.page.clicked(), vec![harness.node("[data-testid='close-sidebar-button']")]);
}

#[test]
fn test_chatgpt_copy_clicks_last_copy_button() {
    let mut harness = Harness::new(CHATGPT, "https://chatgpt.com/");
    let controller = harness.controller();

    assert_eq!(harness.press(&controller, "cmd+shift+c"), handled(ActionId::CopyLastResponse, true));
    assert_eq!(harness.page.clicked(), vec![harness.node("#copy2")]);
    assert_eq!(harness.memory.contents(), None);
}

#[test]
fn test_copy_falls_back_to_transcript_helper() {
    let html = CHATGPT.replace("copy-turn-action-button", "unrelated");
    let mut harness = Harness::new(&html, "https://chatgpt.com/");
    let controller = harness.controller();

    assert_eq!(harness.press(&controller, "cmd+shift+c"), handled(ActionId::CopyLastResponse, true));
    assert!(harness.page.clicked().is_empty());
    assert_eq!(harness.memory.contents().as_deref(), Some("You're welcome."));
}

#[test]
fn test_copy_conversation_transcript() {
    let mut harness = Harness::new(CHATGPT, "https://chatgpt.com/");
    let controller = harness.controller();

    assert_eq!(harness.press(&controller, "cmd+shift+e"), handled(ActionId::CopyConversation, true));
    assert_eq!(
        harness.memory.contents().as_deref(),
        Some("User:\nWhat is Rust?\n\nAssistant:\nA systems language.\n\nUser:\nThanks\n\nAssistant:\nYou're welcome.")
    );
}

#[test]
fn test_unresolved_hotkey_is_still_consumed() {
    let mut harness = Harness::new(CHATGPT, "https://chatgpt.com/");
    let controller = harness.controller();

    let outcome = harness.press(&controller, "cmd+shift+p");
    assert_eq!(outcome, handled(ActionId::ChatSearch, false));
    assert!(outcome.consumes_event());
    assert!(harness.page.events().is_empty());
}

#[test]
fn test_chat_search_trace() {
    let mut harness = Harness::new(CHATGPT, "https://chatgpt.com/");
    let controller = harness.controller();

    let resolution = harness.trace(&controller, ActionId::ChatSearch);
    let trace = resolution
        .outcomes
        .iter()
        .map(|outcome| format!("{:?} {} {:?}", outcome.source, outcome.label, outcome.result))
        .collect::<Vec<_>>()
        .join("\n");

    insta::assert_snapshot!(trace, @r"
    Profile input(input[data-testid='search-input'] +2) Failed
    Profile selector(button[data-testid='search-button'] +5) Failed
    Profile menu-item(search chats) Failed
    Profile sr-button(Search) Failed
    Generic input(input[type='search'] +1) Failed
    ");
}

#[test]
fn test_non_hotkeys_pass_through() {
    let mut harness = Harness::new(CHATGPT, "https://chatgpt.com/");
    let controller = harness.controller();

    assert_eq!(harness.press(&controller, "cmd+alt+shift+o"), DispatchOutcome::Ignored);
    assert_eq!(harness.press(&controller, "cmd+t"), DispatchOutcome::Ignored);

    let repeated = KeyEvent::from_combo("cmd+shift+o").unwrap().repeated();
    assert_eq!(harness.press_event(&controller, &repeated), DispatchOutcome::Ignored);

    let read_only = KeyEvent::from_combo("cmd+shift+o").unwrap().with_target(KeyTarget::new("input").read_only());
    assert_eq!(harness.press_event(&controller, &read_only), DispatchOutcome::Ignored);

    assert!(harness.page.events().is_empty());
}

#[test]
fn test_generic_fallback_on_unknown_site() {
    let html = r#"<html><body><button id="start">Start new chat</button></body></html>"#;
    let mut harness = Harness::new(html, "https://chat.example.org/");
    let controller = harness.controller();

    assert!(controller.active_profile().is_none());
    assert_eq!(harness.press(&controller, "cmd+shift+o"), handled(ActionId::NewChat, true));
    assert_eq!(harness.page.clicked(), vec![harness.node("#start")]);
}

#[test]
fn test_claude_voice_mode_uses_generic_attempts() {
    let html = r#"<html><body><button aria-label="Voice input" id="mic">mic</button></body></html>"#;
    let mut harness = Harness::new(html, "https://claude.ai/chat/1");
    let controller = harness.controller();

    let resolution = harness.trace(&controller, ActionId::VoiceMode);
    assert!(resolution.handled());
    assert_eq!(resolution.outcomes.len(), 1);
    assert_eq!(harness.page.clicked(), vec![harness.node("#mic")]);
}

#[test]
fn test_client_side_navigation_switches_profile() {
    let html = r#"<html><body><a href="/new" id="new">+</a><a href="/" data-discover="true" id="home">Home</a></body></html>"#;
    let mut harness = Harness::new(html, "https://example.com/");
    let mut controller = harness.controller();
    assert!(controller.active_profile().is_none());

    harness.page.navigate("https://claude.ai/recents").unwrap();
    assert!(controller.location_changed(&harness.page.location()));
    assert!(!controller.location_changed(&harness.page.location()));

    assert_eq!(harness.press(&controller, "cmd+shift+o"), handled(ActionId::NewChat, true));
    assert_eq!(harness.page.clicked(), vec![harness.node("#new")]);
}

#[test]
fn test_custom_bindings_take_effect_after_rebuild() {
    let mut harness = Harness::new(CHATGPT, "https://chatgpt.com/");
    let mut controller = harness.controller();

    let rejected = controller.rebuild(Some(&json!({
        "newChat": { "key": "j", "shift": false },
        "toggleSidebar": { "key": "W", "shift": true }
    })));
    assert_eq!(rejected.len(), 1);

    assert_eq!(harness.press(&controller, "cmd+shift+o"), DispatchOutcome::Ignored);
    assert_eq!(harness.press(&controller, "cmd+j"), handled(ActionId::NewChat, true));
    assert_eq!(harness.press(&controller, "cmd+shift+s"), handled(ActionId::ToggleSidebar, true));
}
