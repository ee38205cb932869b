use aihotkeys_core::ActionId;

use crate::attempt::Attempt;
use crate::profile::SiteProfile;
use crate::registry::ActionRegistry;
use crate::transcript::{copy_conversation_attempt, copy_last_response_attempt};

pub fn profile() -> SiteProfile {
    SiteProfile::for_host("claude", |host| host.ends_with("claude.ai"), registry())
}

fn registry() -> ActionRegistry {
    ActionRegistry::new()
        .with(
            ActionId::NewChat,
            vec![
                Attempt::selector([
                    "button[data-testid='new-chat-button']",
                    "a[href='/new']",
                    "button[aria-label*='new chat' i]",
                    "a[aria-label='New chat']",
                ]),
                Attempt::text(["new chat", "start new chat"]),
            ],
        )
        .with(
            ActionId::ToggleSidebar,
            vec![Attempt::selector([
                "button[aria-label*='toggle sidebar' i]",
                "button[aria-label*='show sidebar' i]",
                "button[aria-label*='hide sidebar' i]",
                "button[data-testid='pin-sidebar-toggle']",
                "button[aria-label='Sidebar']",
            ])],
        )
        .with(
            ActionId::ChatSearch,
            vec![
                Attempt::input(["input[type='search']", "input[placeholder*='Search' i]"]),
                Attempt::selector(["a[aria-label='Chats']", "a[href='/recents']"]),
                Attempt::text_in(["Chats", "Search"], "a[href], button, [role='button']"),
            ],
        )
        // No voice controls on this site; the generic attempts still run.
        .with(ActionId::VoiceMode, vec![])
        .with(
            ActionId::CopyLastResponse,
            vec![
                Attempt::click_last([
                    "button[aria-label='Copy response to clipboard']",
                    "button[aria-label*='copy response' i]",
                    "button[aria-label='Copy']",
                ]),
                copy_last_response_attempt(),
            ],
        )
        .with(ActionId::CopyConversation, vec![copy_conversation_attempt()])
}
