//! Attempt strategies.
//!
//! An [`Attempt`] is one way of carrying out an action on a page. It reports `Ok(true)`
//! after causing its effect, `Ok(false)` when nothing applicable was found, and `Err`
//! when the host threw. Callers treat `Err` the same as `Ok(false)`.

use aihotkeys_core::PrivacyConfig;
use aihotkeys_page::{Clipboard, DomError, NodeId, Page, click_element, is_visible};

use futures::task::LocalSpawn;
use std::rc::Rc;
use thiserror::Error;

/// Candidates for the text strategy when no base selector is given
pub const DEFAULT_TEXT_BASE: &str = "button, [role='button'], a[role='button'], a[href]";

/// Candidates for the menu item strategy
pub const MENU_ITEM_BASE: &str = "div.__menu-item, div[role='menuitem'], div[tabindex]";

#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("{0}")]
    Custom(String),
}

/// What an attempt is allowed to touch while it runs
pub struct ActionContext<'a> {
    pub page: &'a dyn Page,
    pub clipboard: &'a Rc<dyn Clipboard>,
    pub spawner: &'a dyn LocalSpawn,
    /// Controls how copied text shows up in logs
    pub privacy: PrivacyConfig,
}

impl<'a> ActionContext<'a> {
    pub fn new(page: &'a dyn Page, clipboard: &'a Rc<dyn Clipboard>, spawner: &'a dyn LocalSpawn) -> Self {
        Self { page, clipboard, spawner, privacy: PrivacyConfig::default() }
    }

    pub fn with_privacy(mut self, privacy: PrivacyConfig) -> Self {
        self.privacy = privacy;
        self
    }
}

type FindFn = dyn Fn(&dyn Page) -> Result<Option<NodeId>, DomError>;
type NodeFn = dyn Fn(&ActionContext<'_>, NodeId) -> Result<(), AttemptError>;
type AttemptFn = dyn Fn(&ActionContext<'_>) -> Result<bool, AttemptError>;

/// How a selector attempt finds its candidate
pub enum Locator {
    /// First match of a CSS selector
    Css(String),
    /// Arbitrary lookup
    Find(Box<FindFn>),
}

impl Locator {
    pub fn find<F>(f: F) -> Self
    where
        F: Fn(&dyn Page) -> Result<Option<NodeId>, DomError> + 'static,
    {
        Locator::Find(Box::new(f))
    }

    fn locate(&self, page: &dyn Page) -> Result<Option<NodeId>, DomError> {
        match self {
            Locator::Css(selector) => page.query_selector(selector),
            Locator::Find(find) => find(page),
        }
    }

    fn describe(&self) -> &str {
        match self {
            Locator::Css(selector) => selector,
            Locator::Find(_) => "<fn>",
        }
    }
}

impl From<&str> for Locator {
    fn from(selector: &str) -> Self {
        Locator::Css(selector.to_string())
    }
}

impl From<String> for Locator {
    fn from(selector: String) -> Self {
        Locator::Css(selector)
    }
}

/// What a selector attempt does with the first visible candidate
pub enum SelectorMode {
    Click,
    Focus,
    /// Hand the element to a callback; success once the callback returns
    Custom(Box<NodeFn>),
}

/// One strategy for carrying out an action
pub struct Attempt {
    label: String,
    run: Box<AttemptFn>,
}

impl std::fmt::Debug for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attempt").field("label", &self.label).finish_non_exhaustive()
    }
}

fn describe_list<'a>(kind: &str, items: impl IntoIterator<Item = &'a str>) -> String {
    let items = items.into_iter().collect::<Vec<_>>();
    match items.as_slice() {
        [] => format!("{}()", kind),
        [only] => format!("{}({})", kind, only),
        [first, rest @ ..] => format!("{}({} +{})", kind, first, rest.len()),
    }
}

impl Attempt {
    pub fn new<F>(label: impl Into<String>, run: F) -> Self
    where
        F: Fn(&ActionContext<'_>) -> Result<bool, AttemptError> + 'static,
    {
        Self { label: label.into(), run: Box::new(run) }
    }

    /// Arbitrary closure, e.g. the clipboard helpers
    pub fn custom<F>(label: impl Into<String>, run: F) -> Self
    where
        F: Fn(&ActionContext<'_>) -> Result<bool, AttemptError> + 'static,
    {
        Self::new(label, run)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn run(&self, ctx: &ActionContext<'_>) -> Result<bool, AttemptError> {
        (self.run)(ctx)
    }

    /// Click the first visible candidate, trying locators in order
    pub fn selector<L, I>(locators: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Locator>,
    {
        Self::selector_with(locators, SelectorMode::Click)
    }

    /// Like [`Attempt::selector`] with an explicit treatment of the candidate
    pub fn selector_with<L, I>(locators: I, mode: SelectorMode) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Locator>,
    {
        let locators = locators.into_iter().map(Into::into).collect::<Vec<Locator>>();
        let kind = match mode {
            SelectorMode::Click => "selector",
            SelectorMode::Focus => "input",
            SelectorMode::Custom(_) => "selector-custom",
        };
        let label = describe_list(kind, locators.iter().map(Locator::describe));

        Self::new(label, move |ctx| {
            for locator in &locators {
                let Some(node) = locator.locate(ctx.page)? else { continue };
                if !is_visible(ctx.page, node) {
                    continue;
                }

                match &mode {
                    SelectorMode::Click => {
                        if click_element(ctx.page, node) {
                            return Ok(true);
                        }
                    }
                    SelectorMode::Focus => match ctx.page.focus(node) {
                        Ok(()) => return Ok(true),
                        Err(err) => tracing::warn!(%err, selector = locator.describe(), "focus failed"),
                    },
                    SelectorMode::Custom(handle) => {
                        handle(ctx, node)?;
                        return Ok(true);
                    }
                }
            }
            Ok(false)
        })
    }

    /// Focus the first visible candidate
    pub fn input<L, I>(locators: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Locator>,
    {
        Self::selector_with(locators, SelectorMode::Focus)
    }

    /// Per selector, click the last visible match
    pub fn click_last<'s>(selectors: impl IntoIterator<Item = &'s str>) -> Self {
        let selectors = selectors.into_iter().map(str::to_string).collect::<Vec<_>>();
        let label = describe_list("click-last", selectors.iter().map(String::as_str));

        Self::new(label, move |ctx| {
            for selector in &selectors {
                let matches = ctx.page.query_selector_all(selector)?;
                for node in matches.into_iter().rev() {
                    if is_visible(ctx.page, node) && click_element(ctx.page, node) {
                        return Ok(true);
                    }
                }
            }
            Ok(false)
        })
    }

    /// Click the first visible control whose text contains one of the phrases
    pub fn text<'s>(phrases: impl IntoIterator<Item = &'s str>) -> Self {
        Self::text_in(phrases, DEFAULT_TEXT_BASE)
    }

    /// [`Attempt::text`] over a custom candidate selector
    pub fn text_in<'s>(phrases: impl IntoIterator<Item = &'s str>, base_selector: &str) -> Self {
        let phrases = phrases.into_iter().map(str::to_lowercase).collect::<Vec<_>>();
        let label = describe_list("text", phrases.iter().map(String::as_str));
        Self::new(label, contains_text(phrases, base_selector.to_string()))
    }

    /// Click a visible menu entry whose text contains `phrase`
    pub fn menu_item(phrase: &str) -> Self {
        let phrase = phrase.to_lowercase();
        let label = format!("menu-item({})", phrase);
        Self::new(label, contains_text(vec![phrase], MENU_ITEM_BASE.to_string()))
    }

    /// Click an element of `tag` whose `.sr-only` label equals `label`
    pub fn screen_reader(tag: &str, label: &str) -> Self {
        let tag = tag.to_string();
        let needle = label.to_lowercase();
        let attempt_label = format!("sr-{}({})", tag, label);

        Self::new(attempt_label, move |ctx| {
            for node in ctx.page.query_selector_all(&tag)? {
                let Some(sr_only) = ctx.page.query_within(node, ".sr-only")? else { continue };
                let text = ctx.page.text_content(sr_only).trim().to_lowercase();
                if text == needle && is_visible(ctx.page, node) && click_element(ctx.page, node) {
                    return Ok(true);
                }
            }
            Ok(false)
        })
    }

    pub fn sr_button(label: &str) -> Self {
        Self::screen_reader("button", label)
    }

    pub fn sr_link(label: &str) -> Self {
        Self::screen_reader("a", label)
    }
}

fn contains_text(
    phrases: Vec<String>, base_selector: String,
) -> impl Fn(&ActionContext<'_>) -> Result<bool, AttemptError> + 'static {
    move |ctx: &ActionContext<'_>| {
        for node in ctx.page.query_selector_all(&base_selector)? {
            let text = ctx.page.text_content(node).trim().to_lowercase();
            if text.is_empty() || !phrases.iter().any(|phrase| text.contains(phrase.as_str())) {
                continue;
            }
            if is_visible(ctx.page, node) && click_element(ctx.page, node) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aihotkeys_page::{MemoryClipboard, PageEvent, StaticPage};
    use futures::executor::LocalPool;
    use std::cell::Cell;

    fn run(attempt: &Attempt, page: &StaticPage) -> Result<bool, AttemptError> {
        let clipboard: Rc<dyn Clipboard> = Rc::new(MemoryClipboard::new());
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        let ctx = ActionContext::new(page, &clipboard, &spawner);
        attempt.run(&ctx)
    }

    fn page(body: &str) -> StaticPage {
        StaticPage::parse(&format!("<html><body>{}</body></html>", body), "https://example.com/").unwrap()
    }

    fn node(page: &StaticPage, selector: &str) -> NodeId {
        page.query_selector(selector).unwrap().unwrap()
    }

    #[test]
    fn test_selector_clicks_first_visible_match() {
        let page = page(r#"<button id="a" hidden>A</button><button id="b" aria-label="New chat">B</button>"#);
        let attempt = Attempt::selector(["#a", "button[aria-label*='new chat' i]"]);

        assert!(run(&attempt, &page).unwrap());
        assert_eq!(page.clicked(), vec![node(&page, "#b")]);
    }

    #[test]
    fn test_selector_without_candidates_fails() {
        let page = page("<div></div>");
        assert!(!run(&Attempt::selector(["button"]), &page).unwrap());
        assert!(page.events().is_empty());
    }

    #[test]
    fn test_selector_uses_first_match_only() {
        let page = page(r#"<button class="x" hidden>A</button><button class="x">B</button>"#);
        assert!(!run(&Attempt::selector([".x"]), &page).unwrap());
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let page = page("<button>A</button>");
        let err = run(&Attempt::selector(["button["]), &page).unwrap_err();
        assert!(matches!(err, AttemptError::Dom(DomError::InvalidSelector { .. })));
    }

    #[test]
    fn test_selector_with_locator_fn() {
        let page = page(r#"<button>One</button><button>Two</button>"#);
        let attempt = Attempt::selector([Locator::find(|page| Ok(page.query_selector_all("button")?.last().copied()))]);

        assert!(run(&attempt, &page).unwrap());
        assert_eq!(page.text_content(page.clicked()[0]), "Two");
    }

    #[test]
    fn test_input_focuses() {
        let page = page(r#"<input type="search" id="q">"#);
        assert!(run(&Attempt::input(["input[type='search']"]), &page).unwrap());
        assert_eq!(page.focused(), Some(node(&page, "#q")));
        assert!(page.clicked().is_empty());
    }

    #[test]
    fn test_input_focus_failure_tries_next_locator() {
        let page = page(r#"<input type="search" id="q"><input id="r" placeholder="Search chats">"#);
        page.break_focus("#q").unwrap();

        let attempt = Attempt::input(["input[type='search']", "input[placeholder*='search' i]"]);
        assert!(run(&attempt, &page).unwrap());
        assert_eq!(page.focused(), Some(node(&page, "#r")));
    }

    #[test]
    fn test_selector_custom_mode() {
        let page = page(r#"<div id="target">x</div>"#);
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        let attempt = Attempt::selector_with(
            ["#target"],
            SelectorMode::Custom(Box::new(move |_, node| {
                sink.set(Some(node));
                Ok(())
            })),
        );

        assert!(run(&attempt, &page).unwrap());
        assert_eq!(seen.get(), Some(node(&page, "#target")));
    }

    #[test]
    fn test_click_last_prefers_last_visible() {
        let page = page(
            r#"<button class="copy" id="c1">c</button><button class="copy" id="c2">c</button>
               <button class="copy" id="c3" hidden>c</button>"#,
        );
        assert!(run(&Attempt::click_last([".copy"]), &page).unwrap());
        assert_eq!(page.clicked(), vec![node(&page, "#c2")]);
    }

    #[test]
    fn test_text_matches_case_insensitive_substring() {
        let page = page(r#"<a href="/">Home</a><button id="n">  Start New Chat </button>"#);
        assert!(run(&Attempt::text(["new chat"]), &page).unwrap());
        assert_eq!(page.clicked(), vec![node(&page, "#n")]);
    }

    #[test]
    fn test_text_in_custom_base() {
        let page = page(r#"<button>Chats</button><a href="/recents" id="r">Chats</a>"#);
        assert!(run(&Attempt::text_in(["Chats"], "a[href]"), &page).unwrap());
        assert_eq!(page.clicked(), vec![node(&page, "#r")]);
    }

    #[test]
    fn test_menu_item() {
        let page = page(r#"<div role="menuitem" id="m">Search chats</div>"#);
        assert!(run(&Attempt::menu_item("Search chats"), &page).unwrap());
        assert_eq!(page.clicked(), vec![node(&page, "#m")]);
    }

    #[test]
    fn test_screen_reader_label_must_match_exactly() {
        let page = page(
            r#"<button id="a"><span class="sr-only">Search history</span></button>
               <button id="b"><span class="sr-only"> search </span></button>"#,
        );
        assert!(run(&Attempt::sr_button("Search"), &page).unwrap());
        assert_eq!(page.clicked(), vec![node(&page, "#b")]);
    }

    #[test]
    fn test_sr_link_ignores_buttons() {
        let page = page(r#"<button><span class="sr-only">New Thread</span></button>"#);
        assert!(!run(&Attempt::sr_link("New Thread"), &page).unwrap());
    }

    #[test]
    fn test_click_falls_back_to_synthetic_event() {
        let page = page(r#"<button id="a">A</button>"#);
        page.break_activation("#a").unwrap();
        assert!(run(&Attempt::selector(["#a"]), &page).unwrap());
        assert_eq!(page.events(), vec![PageEvent::SyntheticClick(node(&page, "#a"))]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Attempt::selector(["#a", "#b", "#c"]).label(), "selector(#a +2)");
        assert_eq!(Attempt::input(["#q"]).label(), "input(#q)");
        assert_eq!(Attempt::sr_button("Search").label(), "sr-button(Search)");
    }
}
