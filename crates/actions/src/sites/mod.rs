//! Builtin site profiles.
//!
//! Selector lists follow each site's markup as observed; they are expected to drift
//! and are kept as plain data so they can be updated without touching the resolver.

mod chatgpt;
mod claude;
pub mod generic;
mod grok;
mod perplexity;
mod t3;

use crate::profile::SiteProfile;

/// Every builtin profile, in match order
pub fn builtin_profiles() -> Vec<SiteProfile> {
    vec![chatgpt::profile(), claude::profile(), perplexity::profile(), grok::profile(), t3::profile()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::ActionContext;
    use crate::profile::match_profile;
    use aihotkeys_core::ActionId;
    use aihotkeys_page::{Clipboard, Location, MemoryClipboard, StaticPage};
    use futures::executor::LocalPool;
    use std::rc::Rc;

    fn matched(host: &str) -> Option<String> {
        let profiles = builtin_profiles();
        let location = Location::new(format!("https://{}/", host), host);
        match_profile(&profiles, &location).map(|profile| profile.name().to_string())
    }

    #[test]
    fn test_hosts_map_to_profiles() {
        assert_eq!(matched("chatgpt.com").as_deref(), Some("chatgpt"));
        assert_eq!(matched("chat.openai.com").as_deref(), Some("chatgpt"));
        assert_eq!(matched("eu.chatgpt.com").as_deref(), Some("chatgpt"));
        assert_eq!(matched("claude.ai").as_deref(), Some("claude"));
        assert_eq!(matched("www.perplexity.ai").as_deref(), Some("perplexity"));
        assert_eq!(matched("grok.com").as_deref(), Some("grok"));
        assert_eq!(matched("x.grok.app").as_deref(), Some("grok"));
        assert_eq!(matched("t3.gg").as_deref(), Some("t3"));
        assert_eq!(matched("beta.t3.gg").as_deref(), Some("t3"));
    }

    #[test]
    fn test_unknown_hosts_have_no_profile() {
        assert_eq!(matched("openai.com"), None);
        assert_eq!(matched("example.com"), None);
        assert_eq!(matched("perplexity.ai.example.com"), None);
    }

    #[test]
    fn test_profiles_without_voice_controls() {
        let profiles = builtin_profiles();
        let empty = profiles
            .iter()
            .filter(|profile| profile.registry().attempts(ActionId::VoiceMode).is_empty())
            .map(|profile| profile.name())
            .collect::<Vec<_>>();
        assert_eq!(empty, vec!["claude", "t3"]);
    }

    /// Every selector must be accepted by the host, or its attempt could never succeed
    #[test]
    fn test_every_attempt_runs_cleanly_on_a_blank_page() {
        let page = StaticPage::parse("<html><body></body></html>", "https://example.com/").unwrap();
        let clipboard: Rc<dyn Clipboard> = Rc::new(MemoryClipboard::new());
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        let ctx = ActionContext::new(&page, &clipboard, &spawner);

        let profiles = builtin_profiles();
        let generic = generic::registry();
        let registries = profiles.iter().map(SiteProfile::registry).chain(std::iter::once(&generic));

        for registry in registries {
            for id in ActionId::ALL {
                for attempt in registry.attempts(id) {
                    let result = attempt.run(&ctx);
                    assert!(matches!(result, Ok(false)), "{} for {}: {:?}", attempt.label(), id, result);
                }
            }
        }
    }
}
