//! Heuristics tried on every site after the active profile's own attempts.

use aihotkeys_core::ActionId;

use crate::attempt::Attempt;
use crate::registry::ActionRegistry;
use crate::transcript::{copy_conversation_attempt, copy_last_response_attempt};

pub fn registry() -> ActionRegistry {
    ActionRegistry::new()
        .with(
            ActionId::NewChat,
            vec![
                Attempt::text(["new chat", "new thread", "start new"]),
                Attempt::selector(["button[aria-label*='new chat' i]"]),
            ],
        )
        .with(
            ActionId::ToggleSidebar,
            vec![Attempt::selector(["button[aria-label*='sidebar' i]", "button[aria-label*='navigation' i]"])],
        )
        .with(
            ActionId::ChatSearch,
            vec![Attempt::input(["input[type='search']", "input[placeholder*='search' i]"])],
        )
        .with(
            ActionId::VoiceMode,
            vec![Attempt::selector(["button[aria-label*='voice' i]", "button[aria-label*='microphone' i]"])],
        )
        .with(
            ActionId::CopyLastResponse,
            vec![
                Attempt::click_last([
                    "button[data-testid='copy-turn-action-button']",
                    "button[aria-label='Copy response']",
                    "button[aria-label*='copy response' i]",
                ]),
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
