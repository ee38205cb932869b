pub mod attempt;
pub mod controller;
pub mod dispatcher;
pub mod profile;
pub mod registry;
pub mod resolver;
pub mod sites;
pub mod transcript;

pub use attempt::{ActionContext, Attempt, AttemptError, DEFAULT_TEXT_BASE, Locator, MENU_ITEM_BASE, SelectorMode};
pub use controller::Controller;
pub use dispatcher::{DispatchOutcome, KeyEvent, KeyTarget, action_for_event, match_event, should_ignore_target};
pub use profile::{LocationWatcher, ProfileError, SiteProfile, is_domain_or_subdomain, match_profile, match_profile_index};
pub use registry::ActionRegistry;
pub use resolver::{AttemptOutcome, AttemptResult, AttemptSource, Resolution, resolve, resolve_traced};
pub use sites::builtin_profiles;
pub use transcript::{
    MESSAGE_NODE_SELECTORS, NodeSnapshot, copy_conversation_transcript, copy_last_assistant_response, format_transcript,
    is_assistant, last_assistant_text, message_nodes, message_snapshots, role_label,
};
