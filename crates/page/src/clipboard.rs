//! Clipboard access with a two-step fallback chain.
//!
//! The asynchronous clipboard API is preferred. Its result is not awaited: the write is
//! spawned and reported as successful straight away. If the write later fails, the
//! spawned task copies through the selection-based path instead. When no asynchronous
//! API exists, the selection-based copy runs inline and its result is reported.

use futures::future::LocalBoxFuture;
use futures::task::{LocalSpawn, LocalSpawnExt};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    /// No clipboard surface exists in this environment
    #[error("clipboard unavailable")]
    Unavailable,

    /// The host refused the write
    #[error("clipboard write denied: {0}")]
    Denied(String),

    /// The copy command threw
    #[error("copy command failed: {0}")]
    Command(String),
}

/// Write access to the system clipboard
pub trait Clipboard {
    /// Start an asynchronous write; `None` when the host has no async clipboard API
    fn write_text(&self, text: &str) -> Option<LocalBoxFuture<'static, Result<(), ClipboardError>>>;

    /// Copy through a temporary selection; `Ok(false)` when the host declined
    fn copy_with_selection(&self, text: &str) -> Result<bool, ClipboardError>;
}

fn copy_with_selection(clipboard: &dyn Clipboard, text: &str) -> bool {
    match clipboard.copy_with_selection(text) {
        Ok(copied) => copied,
        Err(err) => {
            tracing::warn!(%err, "selection copy failed");
            false
        }
    }
}

/// Copy `text`, returning whether the copy is believed to have succeeded
///
/// Empty text is never copied.
pub fn copy_text(clipboard: &Rc<dyn Clipboard>, spawner: &dyn LocalSpawn, text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    let Some(write) = clipboard.write_text(text) else {
        return copy_with_selection(clipboard.as_ref(), text);
    };

    let fallback = Rc::clone(clipboard);
    let owned = text.to_string();
    let task = async move {
        if let Err(err) = write.await {
            tracing::warn!(%err, "clipboard API failed, falling back");
            copy_with_selection(fallback.as_ref(), &owned);
        }
    };

    match spawner.spawn_local(task) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(%err, "could not spawn clipboard write");
            copy_with_selection(clipboard.as_ref(), text)
        }
    }
}

/// How a [`MemoryClipboard`] answers asynchronous writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncSupport {
    /// No async API; only the selection path exists
    Missing,
    Resolves,
    Rejects,
}

/// One write that reached a [`MemoryClipboard`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardWrite {
    Async(String),
    Selection(String),
}

#[derive(Debug)]
struct MemoryState {
    async_support: Cell<AsyncSupport>,
    selection_works: Cell<bool>,
    contents: RefCell<Option<String>>,
    writes: RefCell<Vec<ClipboardWrite>>,
}

/// In-process clipboard used by tests and the CLI
///
/// Clones share the same contents.
#[derive(Debug, Clone)]
pub struct MemoryClipboard {
    state: Rc<MemoryState>,
}

impl Default for MemoryClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClipboard {
    /// Async writes resolve, selection copies succeed
    pub fn new() -> Self {
        Self {
            state: Rc::new(MemoryState {
                async_support: Cell::new(AsyncSupport::Resolves),
                selection_works: Cell::new(true),
                contents: RefCell::new(None),
                writes: RefCell::new(Vec::new()),
            }),
        }
    }

    /// No async API, like an insecure context
    pub fn selection_only() -> Self {
        Self::new().with_async(AsyncSupport::Missing)
    }

    pub fn with_async(self, support: AsyncSupport) -> Self {
        self.state.async_support.set(support);
        self
    }

    pub fn with_selection(self, works: bool) -> Self {
        self.state.selection_works.set(works);
        self
    }

    pub fn contents(&self) -> Option<String> {
        self.state.contents.borrow().clone()
    }

    pub fn writes(&self) -> Vec<ClipboardWrite> {
        self.state.writes.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Option<LocalBoxFuture<'static, Result<(), ClipboardError>>> {
        let support = self.state.async_support.get();
        if support == AsyncSupport::Missing {
            return None;
        }

        let state = Rc::clone(&self.state);
        let text = text.to_string();
        Some(Box::pin(async move {
            match support {
                AsyncSupport::Resolves => {
                    state.writes.borrow_mut().push(ClipboardWrite::Async(text.clone()));
                    *state.contents.borrow_mut() = Some(text);
                    Ok(())
                }
                _ => Err(ClipboardError::Denied("document is not focused".to_string())),
            }
        }))
    }

    fn copy_with_selection(&self, text: &str) -> Result<bool, ClipboardError> {
        if !self.state.selection_works.get() {
            return Ok(false);
        }
        self.state.writes.borrow_mut().push(ClipboardWrite::Selection(text.to_string()));
        *self.state.contents.borrow_mut() = Some(text.to_string());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::LocalPool;

    fn shared(clipboard: &MemoryClipboard) -> Rc<dyn Clipboard> {
        Rc::new(clipboard.clone())
    }

    #[test]
    fn test_empty_text_is_not_copied() {
        let pool = LocalPool::new();
        let clipboard = MemoryClipboard::new();
        assert!(!copy_text(&shared(&clipboard), &pool.spawner(), ""));
        assert!(clipboard.writes().is_empty());
    }

    #[test]
    fn test_async_write_is_optimistic() {
        let mut pool = LocalPool::new();
        let clipboard = MemoryClipboard::new();

        assert!(copy_text(&shared(&clipboard), &pool.spawner(), "hello"));
        assert_eq!(clipboard.contents(), None);

        pool.run_until_stalled();
        assert_eq!(clipboard.writes(), vec![ClipboardWrite::Async("hello".to_string())]);
        assert_eq!(clipboard.contents().as_deref(), Some("hello"));
    }

    #[test]
    fn test_rejected_async_write_falls_back_to_selection() {
        let mut pool = LocalPool::new();
        let clipboard = MemoryClipboard::new().with_async(AsyncSupport::Rejects);

        assert!(copy_text(&shared(&clipboard), &pool.spawner(), "hello"));
        pool.run_until_stalled();
        assert_eq!(clipboard.writes(), vec![ClipboardWrite::Selection("hello".to_string())]);
    }

    #[test]
    fn test_rejected_async_write_still_reports_true() {
        let mut pool = LocalPool::new();
        let clipboard = MemoryClipboard::new().with_async(AsyncSupport::Rejects).with_selection(false);

        assert!(copy_text(&shared(&clipboard), &pool.spawner(), "hello"));
        pool.run_until_stalled();
        assert_eq!(clipboard.contents(), None);
    }

    #[test]
    fn test_selection_only_reports_its_result() {
        let pool = LocalPool::new();
        let working = MemoryClipboard::selection_only();
        assert!(copy_text(&shared(&working), &pool.spawner(), "hi"));
        assert_eq!(working.contents().as_deref(), Some("hi"));

        let broken = MemoryClipboard::selection_only().with_selection(false);
        assert!(!copy_text(&shared(&broken), &pool.spawner(), "hi"));
    }
}
