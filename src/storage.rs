use std::cell::RefCell;
use std::collections::HashMap;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

#[derive(Clone)]
pub struct BrowserStore {
    storage: web_sys::Storage,
}

impl BrowserStore {
    pub fn new(storage: web_sys::Storage) -> Self {
        Self { storage }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if self.storage.set_item(key, value).is_err() {
            log::warn!("could not persist {key} to local storage");
        }
    }

    fn remove(&self, key: &str) {
        let _ = self.storage.remove_item(key);
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: std::rc::Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[derive(Clone)]
pub enum PageStore {
    Browser(BrowserStore),
    Memory(MemoryStore),
}

impl PageStore {
    pub fn detect(window: &web_sys::Window) -> Self {
        match window.local_storage() {
            Ok(Some(storage)) => PageStore::Browser(BrowserStore::new(storage)),
            _ => {
                log::warn!("local storage unavailable, preferences will not persist");
                PageStore::Memory(MemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for PageStore {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            PageStore::Browser(store) => store.get(key),
            PageStore::Memory(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) {
        match self {
            PageStore::Browser(store) => store.set(key, value),
            PageStore::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&self, key: &str) {
        match self {
            PageStore::Browser(store) => store.remove(key),
            PageStore::Memory(store) => store.remove(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_overwrites_and_removes() {
        let store = MemoryStore::new();
        assert_eq!(store.get("darkMode"), None);

        store.set("darkMode", "true");
        store.set("darkMode", "false");
        assert_eq!(store.get("darkMode").as_deref(), Some("false"));

        store.remove("darkMode");
        assert_eq!(store.get("darkMode"), None);
    }

    #[test]
    fn clones_share_entries() {
        let store = PageStore::Memory(MemoryStore::new());
        let other = store.clone();
        store.set("talkFormData", "{}");
        assert_eq!(other.get("talkFormData").as_deref(), Some("{}"));
    }
}
