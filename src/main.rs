use log::{error, info};
use wasm_bindgen::JsValue;
use web_sys::{Document, Event};

mod blog;
mod config;
mod counter;
mod dom;
mod enhance;
mod form;
mod nav;
mod notification;
mod reveal;
mod scheduling;
mod storage;
mod theme;
mod typing;

mod components {
    pub mod overlay;
    pub mod scroll_top;
    pub mod toast;
}

#[cfg(test)]
mod testing;

use components::overlay::Overlay;
use notification::OverlayNotifier;
use storage::PageStore;

const OVERLAY_ROOT_ID: &str = "portfolio-overlay";

fn mount_overlay(document: &Document) -> Result<OverlayNotifier, JsValue> {
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    let host = document.create_element("div")?;
    host.set_id(OVERLAY_ROOT_ID);
    body.append_child(&host)?;
    let app = yew::Renderer::<Overlay>::with_root(host).render();
    Ok(OverlayNotifier::new(app))
}

fn report(component: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        error!("{component} failed to initialise: {e:?}");
    }
}

// A failed installer is logged and the rest carry on.
fn boot() -> Result<(), JsValue> {
    let window = dom::window()?;
    let document = dom::document()?;
    let store = PageStore::detect(&window);

    // Before anything paints, so the saved theme never flashes.
    report("theme", theme::install(&document, store.clone()));

    let notifier = mount_overlay(&document)?;

    report("reveal", reveal::install(&window, &document));
    report("nav", nav::install(&window, &document));
    report("form", form::install(&document, store, notifier.clone()));
    report("scheduling", scheduling::install(&window, &document, notifier));
    report("counter", counter::install(&window, &document));
    typing::install(&document);
    report("blog", blog::install(&document));
    report("enhance", enhance::install(&window, &document));

    info!("portfolio interactivity ready");
    Ok(())
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(config::log_level()) {
        web_sys::console::error_1(&JsValue::from_str(&format!("error initializing log: {e}")));
    }

    info!("Starting portfolio scripts");

    let document = match dom::document() {
        Ok(document) => document,
        Err(e) => {
            error!("no document to enhance: {e:?}");
            return;
        }
    };

    if document.ready_state() == "loading" {
        let listened = dom::listen(&document, "DOMContentLoaded", |_: Event| {
            report("boot", boot());
        });
        report("boot", listened);
    } else {
        report("boot", boot());
    }
}
