//! Copy helpers for chat transcripts.
//!
//! Messages are found heuristically: a fixed list of selectors that chat UIs commonly
//! put on message containers, kept in selector-major order with duplicates removed.
//! Nothing here understands the content; it only copies rendered text.

use aihotkeys_core::redact_sensitive;
use aihotkeys_page::{DomError, NodeId, Page, copy_text};

use crate::attempt::{ActionContext, Attempt, AttemptError};

use std::collections::{BTreeMap, HashSet};

/// Selectors that identify message containers, most specific first
pub const MESSAGE_NODE_SELECTORS: &[&str] = &[
    "[data-message-author-role]",
    "[data-author-role]",
    "[data-role='message']",
    "[data-message-id]",
    "[data-testid='message']",
    "[data-testid='conversation-turn']",
    "[data-testid='chat-message']",
    "[data-testid='message-wrapper']",
    "article[data-testid]",
    "article[data-role]",
    "[data-qa='chat-message']",
    ".chat-message",
    ".message",
    ".prose",
];

/// Attributes whose value may name the assistant
const ASSISTANT_ATTRIBUTES: &[&str] =
    &["data-message-author-role", "data-author-role", "data-role", "data-sender", "data-user", "data-name"];

/// Case-insensitive substrings that mark an attribute value as the assistant
const ASSISTANT_ATTRIBUTE_TERMS: &[&str] =
    &["assistant", "bot", "ai", "model", "claude", "perplexity", "grok", "response"];

/// Substrings of the lowercased class name that mark the assistant
const ASSISTANT_CLASS_TERMS: &[&str] = &["assistant", "ai-response", "bot-message", "model-response"];

/// Attributes consulted, in order, for the transcript role label
const ROLE_LABEL_ATTRIBUTES: &[&str] = &["data-message-author-role", "data-author-role", "data-role", "data-author"];

/// Minimum trimmed length for a node to count as a message
const MIN_MESSAGE_CHARS: usize = 2;

const FALLBACK_ROLE: &str = "Message";

/// What the classifier and formatter need to know about a message node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSnapshot {
    /// Non-empty role-related attributes
    pub attributes: BTreeMap<String, String>,
    pub class_name: String,
    /// Trimmed rendered text
    pub text: String,
}

impl NodeSnapshot {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Default::default() }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Read the relevant parts of `node`
    pub fn capture(page: &dyn Page, node: NodeId) -> Self {
        let attributes = ASSISTANT_ATTRIBUTES
            .iter()
            .chain(ROLE_LABEL_ATTRIBUTES)
            .filter_map(|name| page.attribute(node, name).map(|value| (name.to_string(), value)))
            .filter(|(_, value)| !value.is_empty())
            .collect();

        Self {
            attributes,
            class_name: page.attribute(node, "class").unwrap_or_default(),
            text: page.inner_text(node).trim().to_string(),
        }
    }

    /// Attribute value; empty values count as absent
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str).filter(|value| !value.is_empty())
    }
}

/// Message containers in selector-major, first-seen order
pub fn message_nodes(page: &dyn Page) -> Result<Vec<NodeId>, DomError> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::new();

    for selector in MESSAGE_NODE_SELECTORS {
        for node in page.query_selector_all(selector)? {
            if seen.contains(&node) {
                continue;
            }
            if page.inner_text(node).trim().chars().count() < MIN_MESSAGE_CHARS {
                continue;
            }
            seen.insert(node);
            nodes.push(node);
        }
    }

    Ok(nodes)
}

/// Snapshots of every message node, in [`message_nodes`] order
pub fn message_snapshots(page: &dyn Page) -> Result<Vec<NodeSnapshot>, DomError> {
    Ok(message_nodes(page)?.into_iter().map(|node| NodeSnapshot::capture(page, node)).collect())
}

/// Whether a message looks like it came from the assistant
pub fn is_assistant(snapshot: &NodeSnapshot) -> bool {
    let by_attribute = ASSISTANT_ATTRIBUTES.iter().filter_map(|name| snapshot.attribute(name)).any(|value| {
        let value = value.to_lowercase();
        ASSISTANT_ATTRIBUTE_TERMS.iter().any(|term| value.contains(term))
    });
    if by_attribute {
        return true;
    }

    let class_name = snapshot.class_name.to_lowercase();
    ASSISTANT_CLASS_TERMS.iter().any(|term| class_name.contains(term))
}

/// Role label with its first character uppercased, `"Message"` when unknown
pub fn role_label(snapshot: &NodeSnapshot) -> String {
    let Some(raw) = ROLE_LABEL_ATTRIBUTES.iter().find_map(|name| snapshot.attribute(name)) else {
        return FALLBACK_ROLE.to_string();
    };

    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => FALLBACK_ROLE.to_string(),
    }
}

/// `"{Role}:\n{text}"` per message, joined by a blank line; empty messages are skipped
pub fn format_transcript(snapshots: &[NodeSnapshot]) -> String {
    snapshots
        .iter()
        .filter(|snapshot| !snapshot.text.trim().is_empty())
        .map(|snapshot| format!("{}:\n{}", role_label(snapshot), snapshot.text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Text of the last assistant message, or of the last message if none look like one
pub fn last_assistant_text(snapshots: &[NodeSnapshot]) -> Option<&str> {
    let last = snapshots
        .iter()
        .rev()
        .find(|snapshot| is_assistant(snapshot))
        .or_else(|| snapshots.last())?;

    let text = last.text.trim();
    (!text.is_empty()).then_some(text)
}

pub fn copy_last_assistant_response(ctx: &ActionContext<'_>) -> Result<bool, AttemptError> {
    let snapshots = message_snapshots(ctx.page)?;
    let Some(text) = last_assistant_text(&snapshots) else {
        tracing::debug!(messages = snapshots.len(), "no message to copy");
        return Ok(false);
    };

    tracing::debug!(text = %redact_sensitive(text, &ctx.privacy), "copying last response");
    Ok(copy_text(ctx.clipboard, ctx.spawner, text))
}

pub fn copy_conversation_transcript(ctx: &ActionContext<'_>) -> Result<bool, AttemptError> {
    let snapshots = message_snapshots(ctx.page)?;
    let transcript = format_transcript(&snapshots);
    if transcript.is_empty() {
        tracing::debug!("no messages to copy");
        return Ok(false);
    }

    tracing::debug!(
        messages = snapshots.len(),
        text = %redact_sensitive(&transcript, &ctx.privacy),
        "copying transcript"
    );
    Ok(copy_text(ctx.clipboard, ctx.spawner, &transcript))
}

/// Attempt wrapping [`copy_last_assistant_response`]
pub fn copy_last_response_attempt() -> Attempt {
    Attempt::custom("copy-last-response", copy_last_assistant_response)
}

/// Attempt wrapping [`copy_conversation_transcript`]
pub fn copy_conversation_attempt() -> Attempt {
    Attempt::custom("copy-transcript", copy_conversation_transcript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aihotkeys_page::{Clipboard, MemoryClipboard, StaticPage};
    use futures::executor::LocalPool;
    use std::rc::Rc;

    fn page(body: &str) -> StaticPage {
        StaticPage::parse(&format!("<html><body>{}</body></html>", body), "https://chatgpt.com/c/1").unwrap()
    }

    fn copy_with(page: &StaticPage, f: fn(&ActionContext<'_>) -> Result<bool, AttemptError>) -> (bool, Option<String>) {
        let memory = MemoryClipboard::new();
        let clipboard: Rc<dyn Clipboard> = Rc::new(memory.clone());
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let copied = f(&ActionContext::new(page, &clipboard, &spawner)).unwrap();
        pool.run_until_stalled();
        (copied, memory.contents())
    }

    #[test]
    fn test_format_transcript() {
        let snapshots = vec![
            NodeSnapshot::new("Hi").with_attribute("data-message-author-role", "assistant"),
            NodeSnapshot::new("Hello").with_attribute("data-message-author-role", "user"),
        ];
        assert_eq!(format_transcript(&snapshots), "Assistant:\nHi\n\nUser:\nHello");
    }

    #[test]
    fn test_format_transcript_skips_empty_and_labels_unknown() {
        let snapshots = vec![NodeSnapshot::new("  "), NodeSnapshot::new("Plain text")];
        assert_eq!(format_transcript(&snapshots), "Message:\nPlain text");
        assert_eq!(format_transcript(&[]), "");
    }

    #[test]
    fn test_role_label_order() {
        let snapshot = NodeSnapshot::new("x").with_attribute("data-author", "bot").with_attribute("data-role", "model");
        assert_eq!(role_label(&snapshot), "Model");

        let snapshot = NodeSnapshot::new("x").with_attribute("data-role", "").with_attribute("data-author", "élan");
        assert_eq!(role_label(&snapshot), "Élan");
    }

    #[test]
    fn test_is_assistant_rules() {
        assert!(is_assistant(&NodeSnapshot::new("x").with_attribute("data-message-author-role", "Assistant")));
        assert!(is_assistant(&NodeSnapshot::new("x").with_attribute("data-sender", "Claude")));
        assert!(is_assistant(&NodeSnapshot::new("x").with_attribute("data-name", "GROK-2")));
        assert!(is_assistant(&NodeSnapshot::new("x").with_class("Msg AI-Response")));
        assert!(!is_assistant(&NodeSnapshot::new("x").with_attribute("data-message-author-role", "user")));
        assert!(!is_assistant(&NodeSnapshot::new("x").with_class("user-message")));
    }

    #[test]
    fn test_last_assistant_text() {
        let snapshots = vec![
            NodeSnapshot::new("Question").with_attribute("data-role", "user"),
            NodeSnapshot::new("  Answer  ").with_attribute("data-role", "assistant"),
            NodeSnapshot::new("Follow-up").with_attribute("data-role", "user"),
        ];
        assert_eq!(last_assistant_text(&snapshots), Some("Answer"));
    }

    #[test]
    fn test_last_assistant_text_falls_back_to_last_message() {
        let snapshots = vec![NodeSnapshot::new("one"), NodeSnapshot::new("two")];
        assert_eq!(last_assistant_text(&snapshots), Some("two"));
        assert_eq!(last_assistant_text(&[]), None);
    }

    #[test]
    fn test_message_nodes_dedup_and_order() {
        let page = page(
            r#"<div class="message" id="m1">First message</div>
               <div data-message-author-role="user" class="message" id="m2">Second</div>
               <div class="prose" id="m3">x</div>
               <div data-role="message" id="m4">Third</div>"#,
        );

        let nodes = message_nodes(&page).unwrap();
        let ids = nodes.iter().map(|node| page.attribute(*node, "id").unwrap()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["m2", "m4", "m1"]);
    }

    #[test]
    fn test_message_nodes_skip_hidden_text() {
        let page = page(r#"<div class="message" hidden>Hidden reply</div>"#);
        assert!(message_nodes(&page).unwrap().is_empty());
    }

    #[test]
    fn test_copy_last_assistant_response() {
        let page = page(
            r#"<div data-message-author-role="user">Hello</div>
               <div data-message-author-role="assistant">Hi there</div>
               <div data-message-author-role="user">Thanks</div>"#,
        );

        let (copied, contents) = copy_with(&page, copy_last_assistant_response);
        assert!(copied);
        assert_eq!(contents.as_deref(), Some("Hi there"));
    }

    #[test]
    fn test_copy_conversation_transcript() {
        let page = page(
            r#"<div data-message-author-role="assistant">Hi</div>
               <div data-message-author-role="user">Hello</div>"#,
        );

        let (copied, contents) = copy_with(&page, copy_conversation_transcript);
        assert!(copied);
        assert_eq!(contents.as_deref(), Some("Assistant:\nHi\n\nUser:\nHello"));
    }

    #[test]
    fn test_copy_without_messages() {
        let page = page("<main><p>nothing here</p></main>");
        assert_eq!(copy_with(&page, copy_last_assistant_response), (false, None));
        assert_eq!(copy_with(&page, copy_conversation_transcript), (false, None));
    }
}
