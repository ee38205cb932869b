use aihotkeys_core::ActionId;

use crate::attempt::Attempt;
use crate::profile::{SiteProfile, is_domain_or_subdomain};
use crate::registry::ActionRegistry;
use crate::transcript::{copy_conversation_attempt, copy_last_response_attempt};

pub fn profile() -> SiteProfile {
    SiteProfile::for_host(
        "chatgpt",
        |host| is_domain_or_subdomain(host, "chat.openai.com") || is_domain_or_subdomain(host, "chatgpt.com"),
        registry(),
    )
}

fn registry() -> ActionRegistry {
    ActionRegistry::new()
        .with(
            ActionId::NewChat,
            vec![Attempt::selector([
                "button[data-testid='new-chat-button']",
                "button[data-testid='new-conversation-button']",
                "button[data-testid='left-panel-new-chat-button']",
                "a[data-testid='create-new-chat-button']",
                "nav button[aria-label*='new chat' i]",
                "button[aria-label='New chat']",
                "button[aria-label='New conversation']",
            ])],
        )
        .with(
            ActionId::ToggleSidebar,
            vec![Attempt::selector([
                "button[aria-label*='close sidebar' i]",
                "button[aria-label='Close sidebar']",
                "button[data-testid='close-sidebar-button']",
                "button[aria-label*='hide sidebar' i]",
                "button[aria-label='Hide sidebar']",
                "button[data-testid='sidebar-toggle']",
                "button[aria-label*='toggle sidebar' i]",
                "button[aria-label*='show sidebar' i]",
                "button[aria-label='Show sidebar']",
                "button[data-testid='left-panel-toggle-button']",
            ])],
        )
        .with(
            ActionId::ChatSearch,
            vec![
                Attempt::input([
                    "input[data-testid='search-input']",
                    "input[type='search']",
                    "input[placeholder*='Search chats' i]",
                ]),
                Attempt::selector([
                    "button[data-testid='search-button']",
                    "button[aria-label*='search conversations' i]",
                    "button[aria-label='Search chats']",
                    "button[aria-label='Search']",
                    "button[data-testid='search-panel-trigger']",
                    "button[data-testid='search-panel-button']",
                ]),
                Attempt::menu_item("search chats"),
                Attempt::sr_button("Search"),
            ],
        )
        .with(
            ActionId::VoiceMode,
            vec![Attempt::selector([
                "button[data-testid='voice-mode-button']",
                "button[aria-label*='voice mode' i]",
                "button[aria-label*='start dictation' i]",
                "button[data-testid='composer-speech-button']",
                "button[aria-label='Start voice mode']",
            ])],
        )
        .with(
            ActionId::CopyLastResponse,
            vec![
                Attempt::click_last(["button[data-testid='copy-turn-action-button']"]),
                copy_last_response_attempt(),
            ],
        )
        .with(
            ActionId::CopyConversation,
            vec![
                Attempt::selector([
                    "button[data-testid='copy-chat-history-button']",
                    "button[aria-label*='copy conversation' i]",
                ]),
                copy_conversation_attempt(),
            ],
        )
}
