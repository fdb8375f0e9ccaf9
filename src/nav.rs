use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, HtmlElement, MouseEvent, Node, ScrollBehavior, ScrollToOptions, Window,
};

use crate::config;
use crate::dom::{self, ClassList};

const ACTIVE: &str = "active";

#[derive(Clone, Debug, PartialEq)]
pub struct SectionBounds {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionBounds {
    pub fn contains(&self, position: f64) -> bool {
        position >= self.top && position < self.top + self.height
    }
}

// Later sections win when bounds overlap.
pub fn section_at(sections: &[SectionBounds], scroll_y: f64) -> Option<&SectionBounds> {
    let position = scroll_y + config::NAV_HIGHLIGHT_OFFSET;
    sections.iter().rev().find(|section| section.contains(position))
}

pub fn anchor_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

pub struct NavLink<E> {
    pub element: E,
    // None for links that don't point at a section on this page.
    pub target: Option<String>,
}

pub struct NavController<E> {
    hamburger: Option<E>,
    menu: Option<E>,
    links: Vec<NavLink<E>>,
}

impl<E: ClassList> NavController<E> {
    pub fn new(hamburger: Option<E>, menu: Option<E>, links: Vec<NavLink<E>>) -> Self {
        Self { hamburger, menu, links }
    }

    pub fn toggle_menu(&self) {
        for part in self.menu_parts() {
            part.toggle_class(ACTIVE);
        }
    }

    pub fn close_menu(&self) {
        for part in self.menu_parts() {
            part.remove_class(ACTIVE);
        }
    }

    pub fn is_open(&self) -> bool {
        self.menu.as_ref().is_some_and(|menu| menu.has_class(ACTIVE))
    }

    pub fn handle_resize(&self, viewport_width: f64) {
        if viewport_width > config::MOBILE_BREAKPOINT {
            self.close_menu();
        }
    }

    // Nothing changes when no section is under the navbar.
    pub fn highlight(&self, scroll_y: f64, sections: &[SectionBounds]) -> Option<String> {
        let section = section_at(sections, scroll_y)?;
        for link in &self.links {
            if link.target.as_deref() == Some(section.id.as_str()) {
                link.element.add_class(ACTIVE);
            } else {
                link.element.remove_class(ACTIVE);
            }
        }
        Some(section.id.clone())
    }

    fn menu_parts(&self) -> impl Iterator<Item = &E> {
        self.hamburger.iter().chain(self.menu.iter())
    }
}

// One scroll update per animation frame.
#[derive(Clone, Default)]
pub struct FrameGate {
    pending: Rc<Cell<bool>>,
}

impl FrameGate {
    pub fn try_claim(&self) -> bool {
        !self.pending.replace(true)
    }

    pub fn release(&self) {
        self.pending.set(false);
    }
}

fn section_bounds(sections: &[Element]) -> Vec<SectionBounds> {
    sections
        .iter()
        .filter_map(|section| {
            let html = section.dyn_ref::<HtmlElement>()?;
            Some(SectionBounds {
                id: section.id(),
                top: f64::from(html.offset_top()),
                height: f64::from(html.offset_height()),
            })
        })
        .collect()
}

fn smooth_scroll_to(window: &Window, document: &Document, target: &str) {
    let Some(section) = document
        .get_element_by_id(target)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        log::debug!("nav target #{target} not on page");
        return;
    };
    let options = ScrollToOptions::new();
    options.set_top(f64::from(section.offset_top()) - config::NAV_SCROLL_OFFSET);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

pub fn install(window: &Window, document: &Document) -> Result<(), JsValue> {
    let hamburger = document.get_element_by_id("hamburger");
    let menu = document.get_element_by_id("nav-menu");
    let link_elements = dom::query_all(document, ".nav-link");
    let sections = dom::query_all(document, ".section");

    let links = link_elements
        .iter()
        .map(|element| NavLink {
            element: element.clone(),
            target: element
                .get_attribute("href")
                .as_deref()
                .and_then(anchor_target)
                .map(str::to_string),
        })
        .collect();
    let nav = Rc::new(NavController::new(hamburger.clone(), menu.clone(), links));

    if let Some(hamburger) = &hamburger {
        let nav = nav.clone();
        dom::listen(hamburger, "click", move |_: Event| nav.toggle_menu())?;
    }

    for link in &link_elements {
        let nav = nav.clone();
        let window = window.clone();
        let document = document.clone();
        let href = link.get_attribute("href").unwrap_or_default();
        dom::listen(link, "click", move |event: MouseEvent| {
            nav.close_menu();
            if let Some(target) = anchor_target(&href) {
                event.prevent_default();
                smooth_scroll_to(&window, &document, target);
            }
        })?;
    }

    // Clicking outside the open menu closes it.
    if let (Some(hamburger), Some(menu)) = (hamburger, menu) {
        let nav = nav.clone();
        dom::listen(document, "click", move |event: MouseEvent| {
            let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
            let inside = menu.contains(target.as_ref()) || hamburger.contains(target.as_ref());
            if !inside && nav.is_open() {
                nav.close_menu();
            }
        })?;
    }

    {
        let nav = nav.clone();
        let window_for_resize = window.clone();
        dom::listen(window, "resize", move |_: Event| {
            let width = window_for_resize
                .inner_width()
                .ok()
                .and_then(|w| w.as_f64())
                .unwrap_or_default();
            nav.handle_resize(width);
        })?;
    }

    {
        let nav = nav.clone();
        let window_for_rotation = window.clone();
        dom::listen(window, "orientationchange", move |_: Event| {
            nav.close_menu();
            let window = window_for_rotation.clone();
            gloo_timers::callback::Timeout::new(config::ORIENTATION_RESIZE_DELAY_MS, move || {
                if let Ok(resize) = Event::new("resize") {
                    let _ = window.dispatch_event(&resize);
                }
            })
            .forget();
        })?;
    }

    let update = {
        let nav = nav.clone();
        let window = window.clone();
        move || {
            let scroll_y = window.scroll_y().unwrap_or(0.0);
            nav.highlight(scroll_y, &section_bounds(&sections));
        }
    };
    update();

    let gate = FrameGate::default();
    let window_for_frames = window.clone();
    dom::listen_passive(window, "scroll", move || {
        if !gate.try_claim() {
            return;
        }
        let frame_gate = gate.clone();
        let update = update.clone();
        let frame = Closure::once_into_js(move || {
            update();
            frame_gate.release();
        });
        if window_for_frames
            .request_animation_frame(frame.unchecked_ref())
            .is_err()
        {
            gate.release();
        }
    })?;

    log::info!("navigation wired with {} links", link_elements.len());
    Ok(())
}
