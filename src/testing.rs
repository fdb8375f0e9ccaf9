use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::dom::ClassList;
use crate::notification::{Notification, Notify};

#[derive(Clone, Default)]
pub struct FakeElement {
    classes: Rc<RefCell<BTreeSet<String>>>,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classes(classes: &[&str]) -> Self {
        let element = Self::new();
        for class in classes {
            element.add_class(class);
        }
        element
    }
}

impl ClassList for FakeElement {
    fn add_class(&self, name: &str) {
        self.classes.borrow_mut().insert(name.to_string());
    }

    fn remove_class(&self, name: &str) {
        self.classes.borrow_mut().remove(name);
    }

    fn has_class(&self, name: &str) -> bool {
        self.classes.borrow().contains(name)
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Rc<RefCell<Vec<Notification>>>,
}

impl Notify for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.borrow_mut().push(notification);
    }
}

#[derive(Clone, Default)]
pub struct FakeForm {
    pub fields: Rc<RefCell<BTreeMap<String, String>>>,
    pub loading_history: Rc<RefCell<Vec<bool>>>,
}

impl FakeForm {
    pub fn with_fields(fields: &[(&str, &str)]) -> Self {
        let form = Self::default();
        for (name, value) in fields {
            form.fields
                .borrow_mut()
                .insert(name.to_string(), value.to_string());
        }
        form
    }

    pub fn value(&self, name: &str) -> Option<String> {
        self.fields.borrow().get(name).cloned()
    }
}
