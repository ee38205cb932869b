//! Runs the content-script logic against a saved HTML page.

use aihotkeys_actions::{ActionContext, Controller, DispatchOutcome, KeyEvent, Resolution};
use aihotkeys_core::{ActionId, PrivacyConfig, Rejection};
use aihotkeys_page::{Clipboard, MemoryClipboard, Page, PageEvent, StaticPage};

use anyhow::{Context, Result};
use futures::executor::LocalPool;
use serde_json::Value;
use std::path::Path;
use std::rc::Rc;

/// A page snapshot, an in-memory clipboard and a controller bound to the page's URL
pub struct Sandbox {
    page: StaticPage,
    clipboard: MemoryClipboard,
    controller: Controller,
    privacy: PrivacyConfig,
}

impl Sandbox {
    pub fn new(html: &str, url: &str, record: Option<&Value>, privacy: PrivacyConfig) -> Result<(Self, Vec<Rejection>)> {
        let page = StaticPage::parse(html, url).with_context(|| format!("Invalid page URL '{}'", url))?;
        let mut controller = Controller::builtin(&page.location());
        let rejected = controller.rebuild(record);
        let sandbox = Self { page, clipboard: MemoryClipboard::new(), controller, privacy };
        Ok((sandbox, rejected))
    }

    pub fn load(html_path: &Path, url: &str, record: Option<&Value>, privacy: PrivacyConfig) -> Result<(Self, Vec<Rejection>)> {
        let html = std::fs::read_to_string(html_path)
            .with_context(|| format!("Failed to read {}", html_path.display()))?;
        Self::new(&html, url, record, privacy)
    }

    pub fn profile_name(&self) -> Option<&str> {
        self.controller.active_profile().map(|profile| profile.name())
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Run the resolver for `action` and drain pending clipboard writes
    pub fn resolve(&self, action: ActionId) -> Resolution {
        self.with_context(|ctx| self.controller.perform_traced(action, ctx))
    }

    /// Feed a key event through the dispatcher
    pub fn press(&self, event: &KeyEvent) -> DispatchOutcome {
        self.with_context(|ctx| self.controller.handle_key(event, ctx))
    }

    fn with_context<T>(&self, run: impl FnOnce(&ActionContext<'_>) -> T) -> T {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let clipboard: Rc<dyn Clipboard> = Rc::new(self.clipboard.clone());

        let result = {
            let ctx = ActionContext::new(&self.page, &clipboard, &spawner).with_privacy(self.privacy);
            run(&ctx)
        };
        pool.run();
        result
    }

    /// Human-readable side effects, oldest first
    pub fn effects(&self) -> Vec<String> {
        let mut effects = self
            .page
            .events()
            .into_iter()
            .map(|event| match event {
                PageEvent::Activated(node) => format!("clicked {}", self.page.describe(node)),
                PageEvent::SyntheticClick(node) => format!("dispatched click on {}", self.page.describe(node)),
                PageEvent::Focused(node) => format!("focused {}", self.page.describe(node)),
            })
            .collect::<Vec<_>>();

        if let Some(contents) = self.clipboard.contents() {
            effects.push(format!("copied {} chars", contents.chars().count()));
        }
        effects
    }

    pub fn clipboard_contents(&self) -> Option<String> {
        self.clipboard.contents()
    }
}
