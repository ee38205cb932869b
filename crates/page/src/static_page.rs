//! HTML snapshot implementing [`Page`].
//!
//! Used by tests and the CLI. Layout is approximated: an element is rendered with a
//! fixed non-zero box unless it or an ancestor is hidden (`hidden` attribute, inline
//! `display: none`, or a non-rendered tag such as `template`).

use crate::page::{DomError, Location, NodeId, Page, Rect};

use scraper::{ElementRef, Html, Selector};
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

const NON_RENDERED_TAGS: &[&str] = &["head", "template", "script", "style", "noscript"];

/// Box reported for rendered elements
const RENDERED_BOX: Rect = Rect { width: 120.0, height: 24.0 };

/// Side effect observed on a [`StaticPage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// Native activation succeeded
    Activated(NodeId),
    /// A synthetic click event was dispatched
    SyntheticClick(NodeId),
    Focused(NodeId),
}

impl PageEvent {
    pub fn node(&self) -> NodeId {
        match self {
            PageEvent::Activated(node) | PageEvent::SyntheticClick(node) | PageEvent::Focused(node) => *node,
        }
    }
}

/// Parsed HTML document with a recorded event log
///
/// Node handles are positions in the document-order element list.
pub struct StaticPage {
    html: Html,
    location: RefCell<Location>,
    events: RefCell<Vec<PageEvent>>,
    broken_activation: RefCell<BTreeSet<NodeId>>,
    broken_dispatch: RefCell<BTreeSet<NodeId>>,
    unfocusable: RefCell<BTreeSet<NodeId>>,
    focused: Cell<Option<NodeId>>,
}

impl std::fmt::Debug for StaticPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticPage")
            .field("location", &self.location.borrow())
            .field("events", &self.events.borrow())
            .finish_non_exhaustive()
    }
}

fn parse_selector(selector: &str) -> Result<Selector, DomError> {
    Selector::parse(selector)
        .map_err(|e| DomError::InvalidSelector { selector: selector.to_string(), reason: e.to_string() })
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if NON_RENDERED_TAGS.contains(&value.name()) || value.attr("hidden").is_some() {
        return true;
    }

    value.attr("style").is_some_and(|style| {
        style
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .any(|(prop, val)| prop.trim().eq_ignore_ascii_case("display") && val.trim().eq_ignore_ascii_case("none"))
    })
}

fn is_rendered(element: ElementRef<'_>) -> bool {
    !is_hidden(element) && !element.ancestors().filter_map(ElementRef::wrap).any(is_hidden)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl StaticPage {
    /// Parse a document served from `href`
    pub fn parse(html: &str, href: &str) -> Result<Self, DomError> {
        Ok(Self::with_location(html, Location::parse(href)?))
    }

    pub fn with_location(html: &str, location: Location) -> Self {
        Self {
            html: Html::parse_document(html),
            location: RefCell::new(location),
            events: RefCell::new(Vec::new()),
            broken_activation: RefCell::new(BTreeSet::new()),
            broken_dispatch: RefCell::new(BTreeSet::new()),
            unfocusable: RefCell::new(BTreeSet::new()),
            focused: Cell::new(None),
        }
    }

    /// Move to a new URL without changing the document (client-side routing)
    pub fn navigate(&self, href: &str) -> Result<(), DomError> {
        *self.location.borrow_mut() = Location::parse(href)?;
        Ok(())
    }

    /// Make native activation throw for every element matching `selector`
    pub fn break_activation(&self, selector: &str) -> Result<(), DomError> {
        let nodes = self.query_selector_all(selector)?;
        self.broken_activation.borrow_mut().extend(nodes);
        Ok(())
    }

    /// Make synthetic click dispatch throw for every element matching `selector`
    pub fn break_dispatch(&self, selector: &str) -> Result<(), DomError> {
        let nodes = self.query_selector_all(selector)?;
        self.broken_dispatch.borrow_mut().extend(nodes);
        Ok(())
    }

    /// Make focus throw for every element matching `selector`
    pub fn break_focus(&self, selector: &str) -> Result<(), DomError> {
        let nodes = self.query_selector_all(selector)?;
        self.unfocusable.borrow_mut().extend(nodes);
        Ok(())
    }

    pub fn events(&self) -> Vec<PageEvent> {
        self.events.borrow().clone()
    }

    /// Elements that received a native or synthetic click, in order
    pub fn clicked(&self) -> Vec<NodeId> {
        self.events
            .borrow()
            .iter()
            .filter(|event| !matches!(event, PageEvent::Focused(_)))
            .map(PageEvent::node)
            .collect()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused.get()
    }

    /// Short CSS-like description of an element, e.g. `button#send.primary[data-testid="x"]`
    pub fn describe(&self, node: NodeId) -> String {
        let Some(element) = self.element(node) else {
            return format!("<missing {}>", node.0);
        };

        let value = element.value();
        let mut out = value.name().to_string();
        if let Some(id) = value.id() {
            out.push('#');
            out.push_str(id);
        }
        for class in value.classes().take(2) {
            out.push('.');
            out.push_str(class);
        }
        for name in ["data-testid", "aria-label", "role"] {
            if let Some(attr) = value.attr(name) {
                out.push_str(&format!("[{}=\"{}\"]", name, attr));
            }
        }
        out
    }

    fn elements(&self) -> Vec<ElementRef<'_>> {
        self.html.tree.root().descendants().filter_map(ElementRef::wrap).collect()
    }

    fn element(&self, node: NodeId) -> Option<ElementRef<'_>> {
        self.elements().into_iter().nth(node.0)
    }

    fn node_ids<'a>(&self, matches: impl Iterator<Item = ElementRef<'a>>) -> Vec<NodeId> {
        let all = self.elements();
        matches
            .filter_map(|found| all.iter().position(|element| element.id() == found.id()))
            .map(NodeId)
            .collect()
    }

    fn record(&self, event: PageEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl Page for StaticPage {
    fn location(&self) -> Location {
        self.location.borrow().clone()
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = parse_selector(selector)?;
        Ok(self.node_ids(self.html.select(&selector)))
    }

    fn query_within(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let parsed = parse_selector(selector)?;
        let scope = self.element(scope).ok_or(DomError::MissingNode(scope))?;
        Ok(self.node_ids(scope.select(&parsed).filter(|found| found.id() != scope.id())).into_iter().next())
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.element(node).map(|element| element.value().name().to_ascii_lowercase()).unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.value().attr(name).map(str::to_string)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.element(node).map(|element| element.text().collect()).unwrap_or_default()
    }

    fn inner_text(&self, node: NodeId) -> String {
        let Some(element) = self.element(node) else {
            return String::new();
        };
        if !is_rendered(element) {
            return String::new();
        }

        let mut raw = String::new();
        for descendant in element.descendants() {
            let Some(text) = descendant.value().as_text() else { continue };
            let hidden = descendant
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take_while(|ancestor| ancestor.id() != element.id())
                .any(is_hidden);
            if !hidden {
                raw.push_str(text);
                raw.push(' ');
            }
        }
        collapse_whitespace(&raw)
    }

    fn bounding_box(&self, node: NodeId) -> Rect {
        match self.element(node) {
            Some(element) if is_rendered(element) => RENDERED_BOX,
            _ => Rect::default(),
        }
    }

    fn activate(&self, node: NodeId) -> Result<(), DomError> {
        self.element(node).ok_or(DomError::MissingNode(node))?;
        if self.broken_activation.borrow().contains(&node) {
            return Err(DomError::Activation(format!("click() threw on {}", self.describe(node))));
        }
        self.record(PageEvent::Activated(node));
        Ok(())
    }

    fn dispatch_click(&self, node: NodeId) -> Result<(), DomError> {
        self.element(node).ok_or(DomError::MissingNode(node))?;
        if self.broken_dispatch.borrow().contains(&node) {
            return Err(DomError::Activation(format!("dispatchEvent threw on {}", self.describe(node))));
        }
        self.record(PageEvent::SyntheticClick(node));
        Ok(())
    }

    fn focus(&self, node: NodeId) -> Result<(), DomError> {
        self.element(node).ok_or(DomError::MissingNode(node))?;
        if self.unfocusable.borrow().contains(&node) {
            return Err(DomError::Focus(self.describe(node)));
        }
        self.focused.set(Some(node));
        self.record(PageEvent::Focused(node));
        Ok(())
    }
}
