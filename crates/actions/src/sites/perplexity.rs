use aihotkeys_core::ActionId;

use crate::attempt::Attempt;
use crate::profile::{SiteProfile, is_domain_or_subdomain};
use crate::registry::ActionRegistry;
use crate::transcript::{copy_conversation_attempt, copy_last_response_attempt};

pub fn profile() -> SiteProfile {
    SiteProfile::for_host("perplexity", |host| is_domain_or_subdomain(host, "perplexity.ai"), registry())
}

fn registry() -> ActionRegistry {
    ActionRegistry::new()
        .with(
            ActionId::NewChat,
            vec![
                Attempt::selector([
                    "button[data-testid='new-thread-button']",
                    "button[data-testid='sidebar-new-thread']",
                    "button[aria-label*='new chat' i]",
                    "button[aria-label*='new thread' i]",
                ]),
                Attempt::text(["new thread", "new chat"]),
            ],
        )
        .with(
            ActionId::ToggleSidebar,
            vec![Attempt::selector(["button[aria-label*='toggle sidebar' i]", "button[aria-label*='library' i]"])],
        )
        .with(
            ActionId::ChatSearch,
            vec![Attempt::input(["input[type='search']", "input[placeholder*='Search' i]"])],
        )
        .with(
            ActionId::VoiceMode,
            vec![Attempt::selector([
                "button[aria-label*='voice' i]",
                "button[aria-label*='microphone' i]",
                "button[aria-label='Voice mode']",
            ])],
        )
        .with(
            ActionId::CopyLastResponse,
            vec![
                Attempt::click_last(["button[aria-label='Copy']", "button[data-testid='copy-button']"]),
                copy_last_response_attempt(),
            ],
        )
        .with(ActionId::CopyConversation, vec![copy_conversation_attempt()])
}
