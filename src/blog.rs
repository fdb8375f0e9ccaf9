use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, MouseEvent};

use crate::config;
use crate::dom::{self, ClassList};

const HIDDEN: &str = "hidden";
const SHOW: &str = "show";
const ACTIVE: &str = "active";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterStep {
    pub index: usize,
    pub visible: bool,
    pub delay_ms: u32,
}

pub fn matches(selected: &str, item_category: Option<&str>) -> bool {
    selected == config::ALL_CATEGORIES || item_category == Some(selected)
}

pub fn plan_filter(selected: &str, item_categories: &[Option<String>]) -> Vec<FilterStep> {
    item_categories
        .iter()
        .enumerate()
        .map(|(index, category)| {
            let visible = matches(selected, category.as_deref());
            FilterStep {
                index,
                visible,
                delay_ms: if visible {
                    index as u32 * config::BLOG_STAGGER_MS
                } else {
                    0
                },
            }
        })
        .collect()
}

// Each filter bumps the generation, so reveals queued by an earlier filter
// become no-ops.
pub struct BlogFilter<E> {
    items: Vec<E>,
    categories: Vec<Option<String>>,
    generation: Rc<Cell<u64>>,
}

impl<E: ClassList + Clone + 'static> BlogFilter<E> {
    pub fn new(items: Vec<E>, categories: Vec<Option<String>>) -> Self {
        Self {
            items,
            categories,
            generation: Rc::default(),
        }
    }

    pub fn categories(&self) -> &[Option<String>] {
        &self.categories
    }

    pub fn apply<S>(&self, selected: &str, mut schedule: S)
    where
        S: FnMut(u32, Box<dyn FnOnce()>),
    {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        for step in plan_filter(selected, &self.categories) {
            let Some(item) = self.items.get(step.index) else {
                continue;
            };
            if step.visible {
                let item = item.clone();
                let current = self.generation.clone();
                schedule(
                    step.delay_ms,
                    Box::new(move || {
                        if current.get() != generation {
                            return;
                        }
                        item.remove_class(HIDDEN);
                        item.add_class(SHOW);
                    }),
                );
            } else {
                item.add_class(HIDDEN);
                item.remove_class(SHOW);
            }
        }
    }
}

pub fn select_link<E: ClassList>(links: &[E], chosen: &E) {
    for link in links {
        link.remove_class(ACTIVE);
    }
    chosen.add_class(ACTIVE);
}

pub fn count_label(selected: &str, item_categories: &[Option<String>]) -> Option<String> {
    let count = item_categories
        .iter()
        .filter(|category| matches(selected, category.as_deref()))
        .count();
    if count == 0 && selected != config::ALL_CATEGORIES {
        return None;
    }
    Some(format!(" <span class=\"filter-count\">({count})</span>"))
}

fn categories(items: &[Element]) -> Vec<Option<String>> {
    items
        .iter()
        .map(|item| item.get_attribute("data-category"))
        .collect()
}

pub fn install(document: &Document) -> Result<(), JsValue> {
    let links = dom::query_all(document, ".category-link");
    let items = dom::query_all(document, ".blog-item");
    let item_categories = categories(&items);
    log::debug!("blog filter: {} links, {} items", links.len(), items.len());

    let filter = Rc::new(BlogFilter::new(items, item_categories));
    let timers: Rc<RefCell<Vec<Timeout>>> = Rc::default();

    for link in &links {
        let links = links.clone();
        let filter = filter.clone();
        let timers = timers.clone();
        let link_for_click = link.clone();
        dom::listen(link, "click", move |event: MouseEvent| {
            event.prevent_default();
            let selected = link_for_click.get_attribute("data-category").unwrap_or_default();
            log::debug!("blog category {selected}");
            select_link(&links, &link_for_click);
            // Dropping a Timeout cancels it.
            timers.borrow_mut().clear();
            filter.apply(&selected, |delay, reveal| {
                timers.borrow_mut().push(Timeout::new(delay, reveal));
            });
        })?;
    }

    for button in dom::query_all(document, ".filter-btn") {
        let selected = button.get_attribute("data-category").unwrap_or_default();
        if let Some(label) = count_label(&selected, filter.categories()) {
            button.set_inner_html(&format!("{}{label}", button.inner_html()));
        }
    }

    Ok(())
}
