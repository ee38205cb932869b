use aihotkeys_page::{Clipboard, ClipboardError};

use futures::future::LocalBoxFuture;
use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlDocument, HtmlTextAreaElement, Window};

use crate::dom::js_error;

/// Runs futures on the page's microtask queue
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}

/// `navigator.clipboard` with the `execCommand("copy")` fallback
pub struct BrowserClipboard {
    window: Window,
}

impl BrowserClipboard {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    /// `navigator.clipboard.writeText`, when the context exposes it
    fn write_text_fn(&self) -> Option<(JsValue, js_sys::Function)> {
        let clipboard = js_sys::Reflect::get(&self.window.navigator(), &JsValue::from_str("clipboard")).ok()?;
        if clipboard.is_undefined() || clipboard.is_null() {
            return None;
        }
        let write = js_sys::Reflect::get(&clipboard, &JsValue::from_str("writeText")).ok()?;
        let write = write.dyn_into::<js_sys::Function>().ok()?;
        Some((clipboard, write))
    }
}

impl Clipboard for BrowserClipboard {
    fn write_text(&self, text: &str) -> Option<LocalBoxFuture<'static, Result<(), ClipboardError>>> {
        let (clipboard, write) = self.write_text_fn()?;
        let promise = write.call1(&clipboard, &JsValue::from_str(text));

        Some(Box::pin(async move {
            let promise = promise
                .and_then(|value| value.dyn_into::<js_sys::Promise>())
                .map_err(|e| ClipboardError::Denied(js_error(&e)))?;
            JsFuture::from(promise).await.map_err(|e| ClipboardError::Denied(js_error(&e)))?;
            Ok(())
        }))
    }

    /// Selects the text in an off-screen read-only textarea and runs the copy command
    fn copy_with_selection(&self, text: &str) -> Result<bool, ClipboardError> {
        let document = self.window.document().ok_or(ClipboardError::Unavailable)?;
        let body = document.body().ok_or(ClipboardError::Unavailable)?;
        let command = |e: JsValue| ClipboardError::Command(js_error(&e));

        let textarea = document
            .create_element("textarea")
            .map_err(command)?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_| ClipboardError::Command("created element is not a textarea".to_string()))?;
        textarea.set_value(text);
        textarea.set_attribute("readonly", "").map_err(command)?;
        let style = textarea.style();
        style.set_property("position", "fixed").map_err(command)?;
        style.set_property("top", "-9999px").map_err(command)?;
        style.set_property("opacity", "0").map_err(command)?;

        body.append_child(&textarea).map_err(command)?;
        textarea.select();
        if let Err(e) = textarea.set_selection_range(0, text.encode_utf16().count() as u32) {
            tracing::debug!(error = %js_error(&e), "could not extend selection, copying what select() chose");
        }

        let copied = match document.dyn_ref::<HtmlDocument>() {
            Some(html) => html.exec_command("copy").map_err(command),
            None => Err(ClipboardError::Unavailable),
        };

        if let Err(e) = body.remove_child(&textarea) {
            tracing::debug!(error = %js_error(&e), "could not remove copy textarea");
        }
        copied
    }
}
