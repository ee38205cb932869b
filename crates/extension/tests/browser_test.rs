#![cfg(target_arch = "wasm32")]

use aihotkeys_extension::{BrowserClipboard, BrowserPage, keyboard};
use aihotkeys_page::{Clipboard, Page, click_element, is_visible};

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_test::*;
use web_sys::{KeyboardEvent, KeyboardEventInit};

wasm_bindgen_test_configure!(run_in_browser);

fn mount(html: &str) -> BrowserPage {
    let window = web_sys::window().unwrap();
    let body = window.document().unwrap().body().unwrap();
    body.set_inner_html(html);
    BrowserPage::new(window).unwrap()
}

#[wasm_bindgen_test]
fn test_query_interns_same_element() {
    let page = mount(r#"<button id="new" aria-label="New chat">New</button>"#);

    let first = page.query_selector("#new").unwrap().unwrap();
    let second = page.query_selector("button[aria-label='New chat']").unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(page.tag_name(first), "button");
    assert_eq!(page.attribute(first, "aria-label").as_deref(), Some("New chat"));
}

#[wasm_bindgen_test]
fn test_large_pages_intern_each_element_once() {
    let links = (0..3000).map(|i| format!(r#"<a href="/c/{i}">chat {i}</a>"#)).collect::<String>();
    let page = mount(&links);

    let first = page.query_selector_all("a[href]").unwrap();
    let second = page.query_selector_all("button, [role='button'], a[role='button'], a[href]").unwrap();
    assert_eq!(first.len(), 3000);
    assert_eq!(first, second);
    assert_eq!(page.interned(), 3000);

    let last = page.query_selector("a[href='/c/2999']").unwrap().unwrap();
    assert_eq!(last, first[2999]);
}

#[wasm_bindgen_test]
fn test_invalid_selector_is_an_error() {
    let page = mount("<div></div>");
    assert!(page.query_selector_all("div[").is_err());
}

#[wasm_bindgen_test]
fn test_click_reaches_page_listeners() {
    let page = mount(r#"<button id="go">Go</button>"#);
    let document = web_sys::window().unwrap().document().unwrap();
    let button = document.get_element_by_id("go").unwrap();
    let marked = button.clone();
    let on_click = Closure::<dyn FnMut()>::new(move || {
        marked.set_attribute("data-clicked", "yes").unwrap();
    });
    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref()).unwrap();
    on_click.forget();

    let node = page.query_selector("#go").unwrap().unwrap();
    assert!(is_visible(&page, node));
    assert!(click_element(&page, node));
    assert_eq!(page.attribute(node, "data-clicked").as_deref(), Some("yes"));
}

#[wasm_bindgen_test]
fn test_key_event_reads_target() {
    let page = mount(r#"<textarea id="prompt" readonly data-force-hotkeys="1"></textarea>"#);
    let node = page.query_selector("#prompt").unwrap().unwrap();
    assert_eq!(page.tag_name(node), "textarea");

    let document = web_sys::window().unwrap().document().unwrap();
    let textarea = document.get_element_by_id("prompt").unwrap();
    let target = keyboard::key_target(&textarea);
    assert_eq!(target.tag, "textarea");
    assert!(target.read_only);
    assert!(target.force_hotkeys);
    assert!(!target.content_editable);

    let init = KeyboardEventInit::new();
    init.set_key("O");
    init.set_meta_key(true);
    init.set_shift_key(true);
    let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    let snapshot = keyboard::key_event(&event);
    assert_eq!(snapshot.key, "O");
    assert!(snapshot.meta && snapshot.shift && !snapshot.alt);
}

#[wasm_bindgen_test]
fn test_selection_copy_cleans_up_textarea() {
    let page = mount("<main></main>");
    let clipboard = BrowserClipboard::new(web_sys::window().unwrap());

    assert!(clipboard.copy_with_selection("Assistant:\nHi").is_ok());
    assert!(page.query_selector("textarea").unwrap().is_none());
}
