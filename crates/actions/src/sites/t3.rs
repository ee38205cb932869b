use aihotkeys_core::ActionId;

use crate::attempt::Attempt;
use crate::profile::{SiteProfile, is_domain_or_subdomain};
use crate::registry::ActionRegistry;
use crate::transcript::{copy_conversation_attempt, copy_last_response_attempt};

pub fn profile() -> SiteProfile {
    SiteProfile::for_host("t3", |host| is_domain_or_subdomain(host, "t3.gg"), registry())
}

fn registry() -> ActionRegistry {
    ActionRegistry::new()
        .with(
            ActionId::NewChat,
            vec![
                Attempt::selector([
                    "button[aria-label*='new chat' i]",
                    "button[data-testid='new-thread']",
                    "a[data-discover='true'][href='/']",
                ]),
                Attempt::text(["new thread", "new chat"]),
                Attempt::sr_link("New Thread"),
            ],
        )
        .with(
            ActionId::ToggleSidebar,
            vec![
                Attempt::selector(["button[aria-label*='sidebar' i]", "button[data-sidebar='trigger']"]),
                Attempt::sr_button("Toggle Sidebar"),
            ],
        )
        .with(
            ActionId::ChatSearch,
            vec![
                Attempt::input(["input[type='search']", "input[placeholder*='Search' i]"]),
                Attempt::sr_button("Search"),
            ],
        )
        .with(ActionId::VoiceMode, vec![])
        .with(
            ActionId::CopyLastResponse,
            vec![
                Attempt::click_last(["button[aria-label='Copy response to clipboard']", "button[aria-label='Copy']"]),
                copy_last_response_attempt(),
            ],
        )
        .with(ActionId::CopyConversation, vec![copy_conversation_attempt()])
}
