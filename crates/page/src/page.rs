use thiserror::Error;

/// Handle to an element owned by a [`Page`]
///
/// Handles are only meaningful for the page that produced them. The same element
/// always maps to the same handle, so handles can be compared for identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Rendered bounding box of an element
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Strictly positive in both dimensions
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Where the page currently is
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub href: String,
    pub hostname: String,
}

impl Location {
    /// Parse an absolute URL; the hostname is lowercased by the parser
    pub fn parse(href: &str) -> Result<Self, DomError> {
        let url = url::Url::parse(href).map_err(|e| DomError::Host(format!("invalid URL '{}': {}", href, e)))?;
        Ok(Self { href: url.to_string(), hostname: url.host_str().unwrap_or_default().to_string() })
    }

    pub fn new(href: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self { href: href.into(), hostname: hostname.into() }
    }
}

/// Failures reported by a host page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// Selector could not be parsed by the host
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Handle does not refer to an element on this page
    #[error("no element for {0:?}")]
    MissingNode(NodeId),

    /// Native activation or synthetic event dispatch threw
    #[error("activation failed: {0}")]
    Activation(String),

    /// Element refused focus
    #[error("focus failed: {0}")]
    Focus(String),

    /// Anything else the host environment raised
    #[error("host error: {0}")]
    Host(String),
}

/// The slice of the DOM the resolver needs
///
/// Reads are plain queries; the only writes are activation, focus and a synthetic
/// click. Implementations live next to a real document (web-sys) or a parsed HTML
/// snapshot (`StaticPage`, behind the `native` feature).
pub trait Page {
    /// Current location of the page
    fn location(&self) -> Location;

    /// All matches of a CSS selector, in document order
    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError>;

    /// First match of a CSS selector
    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// First descendant of `scope` matching a CSS selector
    fn query_within(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, DomError>;

    /// Lowercase tag name
    fn tag_name(&self, node: NodeId) -> String;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Raw text of every descendant text node
    fn text_content(&self, node: NodeId) -> String;

    /// Text as rendered (skips hidden content)
    fn inner_text(&self, node: NodeId) -> String;

    fn bounding_box(&self, node: NodeId) -> Rect;

    /// Native activation (`element.click()`)
    fn activate(&self, node: NodeId) -> Result<(), DomError>;

    /// Dispatch a bubbling, cancelable synthetic click event
    fn dispatch_click(&self, node: NodeId) -> Result<(), DomError>;

    fn focus(&self, node: NodeId) -> Result<(), DomError>;
}

/// Visible iff the rendered box has strictly positive width and height
pub fn is_visible(page: &dyn Page, node: NodeId) -> bool {
    page.bounding_box(node).has_area()
}

/// Click with fallback: native activation first, then a synthetic click event
///
/// Returns false only when both paths fail.
pub fn click_element(page: &dyn Page, node: NodeId) -> bool {
    match page.activate(node) {
        Ok(()) => return true,
        Err(err) => tracing::warn!(%err, "native click failed, falling back"),
    }

    match page.dispatch_click(node) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(%err, "synthetic click failed");
            false
        }
    }
}
