use aihotkeys_actions::{KeyEvent, KeyTarget};

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement, KeyboardEvent};

/// Describe the element a key event was aimed at
pub fn key_target(element: &Element) -> KeyTarget {
    let read_only = if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.read_only()
    } else if let Some(textarea) = element.dyn_ref::<HtmlTextAreaElement>() {
        textarea.read_only()
    } else {
        false
    };

    KeyTarget {
        tag: element.tag_name().to_lowercase(),
        read_only,
        content_editable: element.dyn_ref::<HtmlElement>().is_some_and(HtmlElement::is_content_editable),
        force_hotkeys: element.get_attribute("data-force-hotkeys").is_some_and(|value| !value.is_empty()),
    }
}

/// Snapshot the fields of a browser `keydown` event
pub fn key_event(event: &KeyboardEvent) -> KeyEvent {
    let target = event.target().and_then(|target| target.dyn_into::<Element>().ok()).map(|element| key_target(&element));

    KeyEvent {
        key: event.key(),
        meta: event.meta_key(),
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        shift: event.shift_key(),
        repeat: event.repeat(),
        target,
    }
}
