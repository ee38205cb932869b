//! [`Page`] over the live document.

use aihotkeys_page::{DomError, Location, NodeId, Page, Rect};

use std::cell::RefCell;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, MouseEvent, MouseEventInit, Window};

/// Best-effort message out of a thrown JS value
pub(crate) fn js_error(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Current `window.location`
pub fn current_location(window: &Window) -> Location {
    let location = window.location();
    Location::new(location.href().unwrap_or_default(), location.hostname().unwrap_or_default())
}

/// The live DOM
///
/// Elements are interned on first sight, so handles stay valid for the life of the
/// value. Create one per key event.
pub struct BrowserPage {
    window: Window,
    document: Document,
    nodes: RefCell<Vec<Element>>,
    /// Element -> position in `nodes`
    index: js_sys::WeakMap,
}

impl BrowserPage {
    pub fn new(window: Window) -> Result<Self, DomError> {
        let document = window.document().ok_or_else(|| DomError::Host("window has no document".to_string()))?;
        Ok(Self { window, document, nodes: RefCell::new(Vec::new()), index: js_sys::WeakMap::new() })
    }

    /// Constant-time: one `WeakMap` lookup per element
    fn intern(&self, element: Element) -> NodeId {
        let key: &js_sys::Object = element.as_ref();
        if let Some(position) = self.index.get(key).as_f64() {
            return NodeId(position as usize);
        }

        let mut nodes = self.nodes.borrow_mut();
        let position = nodes.len();
        self.index.set(key, &JsValue::from_f64(position as f64));
        nodes.push(element);
        NodeId(position)
    }

    /// Number of distinct elements seen so far
    pub fn interned(&self) -> usize {
        self.nodes.borrow().len()
    }

    fn element(&self, node: NodeId) -> Option<Element> {
        self.nodes.borrow().get(node.0).cloned()
    }

    fn require(&self, node: NodeId) -> Result<Element, DomError> {
        self.element(node).ok_or(DomError::MissingNode(node))
    }
}

fn invalid_selector(selector: &str, err: &JsValue) -> DomError {
    DomError::InvalidSelector { selector: selector.to_string(), reason: js_error(err) }
}

impl Page for BrowserPage {
    fn location(&self) -> Location {
        current_location(&self.window)
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let list = self.document.query_selector_all(selector).map_err(|e| invalid_selector(selector, &e))?;
        Ok((0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.intern(element))
            .collect())
    }

    fn query_within(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let scope = self.require(scope)?;
        let found = scope.query_selector(selector).map_err(|e| invalid_selector(selector, &e))?;
        Ok(found.map(|element| self.intern(element)))
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.element(node).map(|element| element.tag_name().to_lowercase()).unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.element(node).and_then(|element| element.text_content()).unwrap_or_default()
    }

    fn inner_text(&self, node: NodeId) -> String {
        let Some(element) = self.element(node) else {
            return String::new();
        };
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => html.inner_text(),
            None => element.text_content().unwrap_or_default(),
        }
    }

    fn bounding_box(&self, node: NodeId) -> Rect {
        match self.element(node) {
            Some(element) => {
                let rect = element.get_bounding_client_rect();
                Rect::new(rect.width(), rect.height())
            }
            None => Rect::default(),
        }
    }

    /// Calls the element's own `click` so page overrides and exceptions are respected
    fn activate(&self, node: NodeId) -> Result<(), DomError> {
        let element = self.require(node)?;
        let click = js_sys::Reflect::get(&element, &JsValue::from_str("click"))
            .map_err(|e| DomError::Activation(js_error(&e)))?;
        let click = click
            .dyn_into::<js_sys::Function>()
            .map_err(|_| DomError::Activation("element has no click()".to_string()))?;
        click.call0(&element).map_err(|e| DomError::Activation(js_error(&e)))?;
        Ok(())
    }

    fn dispatch_click(&self, node: NodeId) -> Result<(), DomError> {
        let element = self.require(node)?;

        let init = MouseEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        init.set_view(Some(&self.window));

        let event = MouseEvent::new_with_mouse_event_init_dict("click", &init)
            .map_err(|e| DomError::Activation(js_error(&e)))?;
        element.dispatch_event(&event).map_err(|e| DomError::Activation(js_error(&e)))?;
        Ok(())
    }

    fn focus(&self, node: NodeId) -> Result<(), DomError> {
        let element = self.require(node)?;
        let html = element
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| DomError::Focus(format!("<{}> cannot take focus", element.tag_name().to_lowercase())))?;
        html.focus().map_err(|e| DomError::Focus(js_error(&e)))
    }
}
