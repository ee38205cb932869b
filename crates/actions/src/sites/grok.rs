use aihotkeys_core::ActionId;

use crate::attempt::Attempt;
use crate::profile::SiteProfile;
use crate::registry::ActionRegistry;
use crate::transcript::{copy_conversation_attempt, copy_last_response_attempt};

pub fn profile() -> SiteProfile {
    SiteProfile::for_host("grok", |host| host.ends_with("grok.com") || host.ends_with("grok.app"), registry())
}

fn registry() -> ActionRegistry {
    ActionRegistry::new()
        .with(
            ActionId::NewChat,
            vec![
                Attempt::selector([
                    "button[aria-label*='new chat' i]",
                    "button[aria-label*='compose' i]",
                    "button[data-testid='new-chat']",
                    "a[aria-label='New chat']",
                    "a[href='/'][data-discover]",
                    "a[href='/'][data-state]",
                    "a[href='/'][class*='rounded-full']",
                ]),
                Attempt::text_in(["new chat"], "a[href], button, [role='button']"),
                Attempt::sr_link("New Thread"),
            ],
        )
        .with(
            ActionId::ToggleSidebar,
            vec![Attempt::selector([
                "button[aria-label*='toggle sidebar' i]",
                "button[data-testid='sidebar-toggle']",
                "button[data-sidebar='trigger']",
                "button[aria-label='Toggle Sidebar']",
            ])],
        )
        .with(
            ActionId::ChatSearch,
            vec![
                Attempt::input(["input[type='search']", "input[placeholder*='Search' i]"]),
                Attempt::selector([
                    "button[data-sidebar='menu-button'][aria-label='Search']",
                    "button[aria-label='Search'][data-sidebar='menu-button']",
                ]),
            ],
        )
        .with(
            ActionId::VoiceMode,
            vec![Attempt::selector(["button[aria-label*='voice' i]", "button[aria-label*='microphone' i]"])],
        )
        .with(
            ActionId::CopyLastResponse,
            vec![
                Attempt::click_last([
                    "button[aria-label='Copy']",
                    "button[aria-label*='copy response' i]",
                    "button[data-state][aria-label*='copy' i]",
                    "button[aria-label*='copy' i]",
                ]),
                copy_last_response_attempt(),
            ],
        )
        .with(ActionId::CopyConversation, vec![copy_conversation_attempt()])
}
