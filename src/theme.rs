use wasm_bindgen::JsValue;
use web_sys::{Document, Event};

use crate::config;
use crate::dom::{self, ClassList};
use crate::storage::KeyValueStore;

pub const DARK_MODE_CLASS: &str = "dark-mode";

pub struct DarkMode<S> {
    store: S,
}

impl<S: KeyValueStore> DarkMode<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn saved_preference(&self) -> bool {
        self.store.get(config::DARK_MODE_KEY).as_deref() == Some("true")
    }

    // Only ever adds the class.
    pub fn apply_saved(&self, body: &impl ClassList) {
        if self.saved_preference() {
            body.add_class(DARK_MODE_CLASS);
        }
    }

    pub fn toggle(&self, body: &impl ClassList) -> bool {
        let enabled = body.toggle_class(DARK_MODE_CLASS);
        self.store.set(config::DARK_MODE_KEY, if enabled { "true" } else { "false" });
        enabled
    }
}

pub fn install<S: KeyValueStore + 'static>(document: &Document, store: S) -> Result<(), JsValue> {
    let Some(body) = document.body() else {
        return Ok(());
    };
    let dark_mode = DarkMode::new(store);
    dark_mode.apply_saved(&*body);

    if let Some(toggle) = document.query_selector(".dark-mode-toggle").ok().flatten() {
        dom::listen(&toggle, "click", move |_: Event| {
            let enabled = dark_mode.toggle(&*body);
            log::debug!("dark mode {}", if enabled { "on" } else { "off" });
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::FakeElement;

    #[test]
    fn saved_true_applies_before_interaction() {
        let store = MemoryStore::new();
        store.set(config::DARK_MODE_KEY, "true");
        let body = FakeElement::new();

        DarkMode::new(store).apply_saved(&body);
        assert!(body.has_class(DARK_MODE_CLASS));
    }

    #[test]
    fn anything_else_leaves_light_mode() {
        for saved in [None, Some("false"), Some("TRUE"), Some("1")] {
            let store = MemoryStore::new();
            if let Some(value) = saved {
                store.set(config::DARK_MODE_KEY, value);
            }
            let body = FakeElement::new();
            DarkMode::new(store).apply_saved(&body);
            assert!(!body.has_class(DARK_MODE_CLASS), "saved = {saved:?}");
        }
    }

    #[test]
    fn toggle_persists_new_state() {
        let store = MemoryStore::new();
        let dark_mode = DarkMode::new(store.clone());
        let body = FakeElement::new();

        assert!(dark_mode.toggle(&body));
        assert_eq!(store.get(config::DARK_MODE_KEY).as_deref(), Some("true"));
        assert!(!dark_mode.toggle(&body));
        assert_eq!(store.get(config::DARK_MODE_KEY).as_deref(), Some("false"));
    }
}
