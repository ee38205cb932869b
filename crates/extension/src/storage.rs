//! `chrome.storage.sync` bindings.
//!
//! The extension APIs are reached through `Reflect` so the content script still loads
//! (with default shortcuts) when storage is missing.

use aihotkeys_core::{Error, Result, STORAGE_KEY, SettingsChange, extract_record};

use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::dom::js_error;

const SYNC_AREA: &str = "sync";

fn get_path(root: &JsValue, path: &[&str]) -> Option<JsValue> {
    path.iter().try_fold(root.clone(), |value, key| {
        let next = js_sys::Reflect::get(&value, &JsValue::from_str(key)).ok()?;
        (!next.is_undefined() && !next.is_null()).then_some(next)
    })
}

fn chrome() -> Option<JsValue> {
    get_path(&js_sys::global(), &["chrome"])
}

fn to_json(value: JsValue) -> Result<Value> {
    serde_wasm_bindgen::from_value(value).map_err(|e| Error::Parse(e.to_string()))
}

/// Read the raw shortcut record; `Ok(None)` when nothing is stored or storage is missing
pub async fn load_record() -> Result<Option<Value>> {
    let Some(sync) = chrome().and_then(|chrome| get_path(&chrome, &["storage", SYNC_AREA])) else {
        tracing::debug!("sync storage unavailable, using defaults");
        return Ok(None);
    };

    let get = js_sys::Reflect::get(&sync, &JsValue::from_str("get"))
        .ok()
        .and_then(|get| get.dyn_into::<js_sys::Function>().ok())
        .ok_or_else(|| Error::Storage("storage.sync.get is not a function".to_string()))?;

    let promise = get
        .call1(&sync, &JsValue::from_str(STORAGE_KEY))
        .and_then(|value| value.dyn_into::<js_sys::Promise>())
        .map_err(|e| Error::Storage(js_error(&e)))?;
    let stored = JsFuture::from(promise).await.map_err(|e| Error::Storage(js_error(&e)))?;

    Ok(extract_record(&to_json(stored)?))
}

/// Interpret an `onChanged` payload; `None` when it does not touch the shortcut record
pub fn settings_change(changes: &Value, area: &str) -> Option<SettingsChange> {
    if area != SYNC_AREA {
        return None;
    }
    let change = changes.get(STORAGE_KEY)?;
    let new_value = change.get("newValue").filter(|value| !value.is_null()).cloned();
    Some(SettingsChange { new_value })
}

/// Subscribe to `chrome.storage.onChanged`; a no-op when the API is missing
pub fn on_change<F>(mut callback: F) -> Result<()>
where
    F: FnMut(SettingsChange) + 'static,
{
    let Some(on_changed) = chrome().and_then(|chrome| get_path(&chrome, &["storage", "onChanged"])) else {
        tracing::debug!("storage.onChanged unavailable");
        return Ok(());
    };

    let add_listener = js_sys::Reflect::get(&on_changed, &JsValue::from_str("addListener"))
        .ok()
        .and_then(|add| add.dyn_into::<js_sys::Function>().ok())
        .ok_or_else(|| Error::Storage("storage.onChanged.addListener is not a function".to_string()))?;

    let listener = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |changes: JsValue, area: JsValue| {
        let area = area.as_string().unwrap_or_default();
        let changes = match to_json(changes) {
            Ok(changes) => changes,
            Err(err) => {
                tracing::warn!(%err, "unreadable storage change");
                return;
            }
        };
        if let Some(change) = settings_change(&changes, &area) {
            callback(change);
        }
    });

    add_listener
        .call1(&on_changed, listener.as_ref())
        .map_err(|e| Error::Storage(js_error(&e)))?;
    listener.forget();
    Ok(())
}
