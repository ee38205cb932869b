use serde::{Deserialize, Serialize};

/// Actions the extension can trigger on a chat page
///
/// The declaration order is the enumeration order used everywhere a tie has to be
/// broken (shortcut lookup, keymap serialization, settings records).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionId {
    NewChat,
    ToggleSidebar,
    ChatSearch,
    VoiceMode,
    CopyLastResponse,
    CopyConversation,
}

/// Human-readable title and description of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionMetadata {
    pub title: &'static str,
    pub description: &'static str,
}

impl ActionId {
    /// Every action, in enumeration order
    pub const ALL: [ActionId; 6] = [
        ActionId::NewChat,
        ActionId::ToggleSidebar,
        ActionId::ChatSearch,
        ActionId::VoiceMode,
        ActionId::CopyLastResponse,
        ActionId::CopyConversation,
    ];

    /// Identifier used in settings records and the keymap text format
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionId::NewChat => "newChat",
            ActionId::ToggleSidebar => "toggleSidebar",
            ActionId::ChatSearch => "chatSearch",
            ActionId::VoiceMode => "voiceMode",
            ActionId::CopyLastResponse => "copyLastResponse",
            ActionId::CopyConversation => "copyConversation",
        }
    }

    /// Position in [`ActionId::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Exact (case-sensitive) lookup by identifier
    pub fn parse_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }

    pub fn metadata(&self) -> ActionMetadata {
        match self {
            ActionId::NewChat => {
                ActionMetadata { title: "New chat", description: "Start a blank conversation thread." }
            }
            ActionId::ToggleSidebar => ActionMetadata {
                title: "Toggle sidebar",
                description: "Show or hide the navigation/sidebar panel.",
            },
            ActionId::ChatSearch => {
                ActionMetadata { title: "Chat search", description: "Focus the conversation search UI." }
            }
            ActionId::VoiceMode => ActionMetadata {
                title: "Voice mode",
                description: "Toggle voice input/listening when available.",
            },
            ActionId::CopyLastResponse => ActionMetadata {
                title: "Copy last response",
                description: "Copy the latest AI reply to your clipboard.",
            },
            ActionId::CopyConversation => ActionMetadata {
                title: "Copy conversation",
                description: "Copy the visible conversation transcript.",
            },
        }
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActionId {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse_str(s).ok_or_else(|| crate::Error::Validation(format!("unknown action: {}", s)))
    }
}
