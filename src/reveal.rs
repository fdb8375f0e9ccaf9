use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    Window,
};

use crate::config;
use crate::dom::{self, ClassList};

pub const VISIBLE: &str = "visible";

const FADE_TARGETS: &str =
    ".about-card, .fun-fact, .stat-item, .timeline-item, .skill-category-modern, .value-item";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Observer,
    ScrollProbe,
}

pub fn detect_strategy(window: &Window) -> Strategy {
    if dom::has_global(window, "IntersectionObserver") {
        Strategy::Observer
    } else {
        Strategy::ScrollProbe
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatchOptions {
    pub threshold: f64,
    // px trimmed off the viewport bottom
    pub bottom_margin: f64,
}

impl WatchOptions {
    pub fn root_margin(&self) -> String {
        if self.bottom_margin == 0.0 {
            "0px".to_string()
        } else {
            format!("0px 0px -{}px 0px", self.bottom_margin)
        }
    }
}

// Probe mode: top edge above the trimmed viewport bottom.
pub fn probe_visible(rect_top: f64, viewport_height: f64, bottom_margin: f64) -> bool {
    rect_top < viewport_height - bottom_margin
}

type OnVisible<T> = Box<dyn FnOnce(&T)>;

pub struct Pending<T> {
    items: Vec<(T, OnVisible<T>)>,
}

impl<T> Default for Pending<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Pending<T> {
    pub fn push(&mut self, item: T, on_visible: OnVisible<T>) {
        self.items.push((item, on_visible));
    }

    // Callers run the callbacks after releasing the borrow.
    pub fn take_where(&mut self, mut is_visible: impl FnMut(&T) -> bool) -> Vec<(T, OnVisible<T>)> {
        let (ready, waiting) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|(item, _)| is_visible(item));
        self.items = waiting;
        ready
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn fire<T>(ready: Vec<(T, OnVisible<T>)>) {
    for (item, on_visible) in ready {
        on_visible(&item);
    }
}

pub struct VisibilityWatcher {
    window: Window,
    options: WatchOptions,
    pending: Rc<RefCell<Pending<Element>>>,
    observer: Option<IntersectionObserver>,
}

impl VisibilityWatcher {
    pub fn new(window: &Window, options: WatchOptions) -> Result<Self, JsValue> {
        Self::with_strategy(window, options, detect_strategy(window))
    }

    pub fn with_strategy(
        window: &Window,
        options: WatchOptions,
        strategy: Strategy,
    ) -> Result<Self, JsValue> {
        let pending: Rc<RefCell<Pending<Element>>> = Rc::default();

        let observer = match strategy {
            Strategy::Observer => Some(Self::observer(options, pending.clone())?),
            Strategy::ScrollProbe => {
                let window_for_probe = window.clone();
                let pending = pending.clone();
                dom::listen_passive(window, "scroll", move || {
                    probe(&window_for_probe, options, &pending);
                })?;
                None
            }
        };

        Ok(Self {
            window: window.clone(),
            options,
            pending,
            observer,
        })
    }

    fn observer(
        options: WatchOptions,
        pending: Rc<RefCell<Pending<Element>>>,
    ) -> Result<IntersectionObserver, JsValue> {
        let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
            let seen: Vec<Element> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .filter(|entry| entry.is_intersecting())
                .map(|entry| entry.target())
                .collect();
            for target in &seen {
                observer.unobserve(target);
            }
            let ready = pending.borrow_mut().take_where(|el| seen.contains(el));
            fire(ready);
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin());
        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        callback.forget();
        Ok(observer)
    }

    pub fn watch(&self, element: Element, on_visible: impl FnOnce(&Element) + 'static) {
        if let Some(observer) = &self.observer {
            observer.observe(&element);
        }
        self.pending.borrow_mut().push(element, Box::new(on_visible));
    }

    pub fn check_now(&self) {
        if self.observer.is_none() {
            probe(&self.window, self.options, &self.pending);
        }
    }
}

fn probe(window: &Window, options: WatchOptions, pending: &RefCell<Pending<Element>>) {
    if pending.borrow().is_empty() {
        return;
    }
    let viewport_height = window
        .inner_height()
        .ok()
        .and_then(|h| h.as_f64())
        .unwrap_or_default();
    let ready = pending.borrow_mut().take_where(|el| {
        probe_visible(
            el.get_bounding_client_rect().top(),
            viewport_height,
            options.bottom_margin,
        )
    });
    fire(ready);
}

pub fn reset_sections<E: ClassList>(sections: &[E]) {
    for section in sections {
        section.remove_class(VISIBLE);
    }
    if let Some(first) = sections.first() {
        first.add_class(VISIBLE);
    }
}

fn prepare_fade(element: &Element) {
    dom::set_style(element, "opacity", "0");
    dom::set_style(element, "transition", "opacity 0.6s ease");
    dom::set_style(element, "transform", "none");
}

fn fade_in(element: &Element) {
    dom::set_style(element, "opacity", "1");
    dom::set_style(element, "transform", "none");
}

fn stagger_lines(lines: Vec<Element>) {
    for (index, line) in lines.into_iter().enumerate() {
        dom::set_style(&line, "opacity", "0");
        dom::set_style(&line, "transform", "translateX(-10px)");
        dom::set_style(&line, "transition", "opacity 0.8s ease, transform 0.8s ease");
        let delay = index as u32 * config::CODE_LINE_STAGGER_MS;
        Timeout::new(delay, move || {
            dom::set_style(&line, "opacity", "1");
            dom::set_style(&line, "transform", "translateX(0)");
        })
        .forget();
    }
}

fn swap_lazy_source(image: &Element) {
    if let Some(source) = image.get_attribute("data-src") {
        let _ = image.set_attribute("src", &source);
        let _ = image.remove_attribute("data-src");
    }
}

pub fn install(window: &Window, document: &Document) -> Result<(), JsValue> {
    let sections = dom::query_all(document, ".section");
    reset_sections(&sections);
    let sections_watcher = VisibilityWatcher::new(
        window,
        WatchOptions {
            threshold: 0.0,
            bottom_margin: config::SECTION_REVEAL_MARGIN,
        },
    )?;
    for section in sections.into_iter().skip(1) {
        sections_watcher.watch(section, |el| el.add_class(VISIBLE));
    }
    sections_watcher.check_now();

    let fade_targets = dom::query_all(document, FADE_TARGETS);
    let fade_watcher = VisibilityWatcher::new(
        window,
        WatchOptions {
            threshold: config::FADE_THRESHOLD,
            bottom_margin: config::FADE_MARGIN,
        },
    )?;
    let fade_count = fade_targets.len();
    for element in fade_targets {
        prepare_fade(&element);
        fade_watcher.watch(element, fade_in);
    }
    fade_watcher.check_now();

    if let Some(snippet) = document.query_selector(".code-snippet").ok().flatten() {
        let code_watcher = VisibilityWatcher::new(
            window,
            WatchOptions {
                threshold: config::CODE_THRESHOLD,
                bottom_margin: config::CODE_MARGIN,
            },
        )?;
        let document = document.clone();
        code_watcher.watch(snippet, move |_| {
            stagger_lines(dom::query_all(&document, ".code-line"));
        });
        code_watcher.check_now();
    }

    let lazy_images = dom::query_all(document, "img[data-src]");
    if !lazy_images.is_empty() {
        let image_watcher = VisibilityWatcher::new(
            window,
            WatchOptions {
                threshold: 0.0,
                bottom_margin: 0.0,
            },
        )?;
        for image in lazy_images {
            image_watcher.watch(image, swap_lazy_source);
        }
        image_watcher.check_now();
    }

    log::info!(
        "reveal wired ({:?}), {} fade targets",
        detect_strategy(window),
        fade_count
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeElement;
    use std::cell::Cell;

    #[test]
    fn pending_items_fire_once() {
        let fired = Rc::new(Cell::new(0));
        let mut pending: Pending<u32> = Pending::default();
        for id in 0..3 {
            let fired = fired.clone();
            pending.push(id, Box::new(move |_| fired.set(fired.get() + 1)));
        }

        fire(pending.take_where(|id| *id < 2));
        assert_eq!(fired.get(), 2);
        assert!(!pending.is_empty());

        // Scrolling back over revealed items does nothing.
        fire(pending.take_where(|id| *id < 2));
        assert_eq!(fired.get(), 2);

        fire(pending.take_where(|_| true));
        assert_eq!(fired.get(), 3);
        assert!(pending.is_empty());
    }

    #[test]
    fn probe_respects_margin() {
        assert!(probe_visible(400.0, 800.0, 150.0));
        assert!(!probe_visible(650.0, 800.0, 150.0));
        assert!(!probe_visible(700.0, 800.0, 150.0));
        assert!(probe_visible(-200.0, 800.0, 150.0));
    }

    #[test]
    fn root_margin_trims_bottom_edge() {
        let options = WatchOptions {
            threshold: 0.1,
            bottom_margin: 50.0,
        };
        assert_eq!(options.root_margin(), "0px 0px -50px 0px");
        let flush = WatchOptions {
            threshold: 0.0,
            bottom_margin: 0.0,
        };
        assert_eq!(flush.root_margin(), "0px");
    }

    #[test]
    fn only_first_section_starts_visible() {
        let sections = vec![
            FakeElement::with_classes(&["section", VISIBLE]),
            FakeElement::with_classes(&["section", VISIBLE]),
            FakeElement::with_classes(&["section"]),
        ];
        reset_sections(&sections);
        assert!(sections[0].has_class(VISIBLE));
        assert!(!sections[1].has_class(VISIBLE));
        assert!(!sections[2].has_class(VISIBLE));
    }
}
