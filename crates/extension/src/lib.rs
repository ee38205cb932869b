//! Content script entry point.
//!
//! Wires the live page to a [`Controller`]: one capturing `keydown` listener, a
//! structural observer plus poll timer for client-side navigation, and the shortcut
//! record from `chrome.storage.sync`.

pub mod clipboard;
pub mod console;
pub mod dom;
pub mod keyboard;
pub mod storage;
pub mod watch;

use aihotkeys_actions::{ActionContext, Controller};
use aihotkeys_core::{PrivacyConfig, WatchConfig};
use aihotkeys_page::Clipboard;

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, KeyboardEvent, MutationObserver, MutationObserverInit, Window};

pub use clipboard::{BrowserClipboard, BrowserSpawner};
pub use dom::{BrowserPage, current_location};
pub use watch::PendingRecord;

type SharedController = Rc<RefCell<Controller>>;
type SharedPending = Rc<PendingRecord>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console::init_logging(console::DEFAULT_FILTER);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let controller = Rc::new(RefCell::new(Controller::builtin(&current_location(&window))));
    let pending = Rc::new(PendingRecord::new());
    let watch_config = watch::watch_config(watch::BUILD_POLL_INTERVAL);

    watch_location(&window, &controller, &pending, &watch_config)?;
    load_shortcuts(&controller, &pending);
    watch_shortcuts(&controller, &pending);
    listen_for_hotkeys(&window, &controller, &pending)?;

    if let Some(profile) = controller.borrow().active_profile() {
        tracing::debug!(profile = profile.name(), "content script ready");
    }
    Ok(())
}

/// Observe DOM changes and poll, since client-side routing fires no event we can rely on
///
/// The poll tick also applies any shortcut record queued while the controller was busy.
fn watch_location(
    window: &Window, controller: &SharedController, pending: &SharedPending, config: &WatchConfig,
) -> Result<(), JsValue> {
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

    let observed = (window.clone(), controller.clone());
    let on_mutation = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |_records: JsValue, _observer: JsValue| {
        watch::refresh_location(&observed.1, &current_location(&observed.0));
    });
    let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_subtree(true);
    init.set_child_list(true);
    observer.observe_with_options(&document, &init)?;
    on_mutation.forget();

    let polled = (window.clone(), controller.clone(), pending.clone());
    let on_tick = Closure::<dyn FnMut()>::new(move || {
        watch::refresh_location(&polled.1, &current_location(&polled.0));
        polled.2.flush(&polled.1);
    });
    window.set_interval_with_callback_and_timeout_and_arguments_0(
        on_tick.as_ref().unchecked_ref(),
        watch::timer_millis(config),
    )?;
    on_tick.forget();
    Ok(())
}

fn load_shortcuts(controller: &SharedController, pending: &SharedPending) {
    let controller = controller.clone();
    let pending = pending.clone();
    wasm_bindgen_futures::spawn_local(async move {
        match storage::load_record().await {
            Ok(record) => pending.offer(&controller, record),
            Err(err) => {
                tracing::warn!(%err, "failed to read shortcuts");
                pending.offer(&controller, None)
            }
        };
    });
}

fn watch_shortcuts(controller: &SharedController, pending: &SharedPending) {
    let controller = controller.clone();
    let pending = pending.clone();
    let subscribed = storage::on_change(move |change| {
        pending.offer(&controller, change.new_value);
    });
    if let Err(err) = subscribed {
        tracing::warn!(%err, "cannot watch shortcut changes");
    }
}

fn listen_for_hotkeys(window: &Window, controller: &SharedController, pending: &SharedPending) -> Result<(), JsValue> {
    let controller = controller.clone();
    let pending = pending.clone();
    let page_window = window.clone();
    let clipboard: Rc<dyn Clipboard> = Rc::new(BrowserClipboard::new(window.clone()));

    let on_keydown = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
        let key_event = keyboard::key_event(&event);
        let page = match BrowserPage::new(page_window.clone()) {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(%err, "page unavailable");
                return;
            }
        };

        let outcome = match controller.try_borrow() {
            Ok(controller) => {
                let ctx =
                    ActionContext::new(&page, &clipboard, &BrowserSpawner).with_privacy(PrivacyConfig::default());
                controller.handle_key(&key_event, &ctx)
            }
            Err(_) => return,
        };
        if outcome.consumes_event() {
            event.prevent_default();
            event.stop_propagation();
        }
        pending.flush(&controller);
    });

    let options = AddEventListenerOptions::new();
    options.set_capture(true);
    window.add_event_listener_with_callback_and_add_event_listener_options(
        "keydown",
        on_keydown.as_ref().unchecked_ref(),
        &options,
    )?;
    on_keydown.forget();
    Ok(())
}
