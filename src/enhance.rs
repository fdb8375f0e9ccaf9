use std::cell::Cell;

use chrono::Utc;
use gloo_timers::callback::Timeout;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, MouseEvent, Window};

use crate::config;
use crate::dom::{self, ClassList};

const LOADING_CSS: &str = r#"
body:not(.loaded) {
    overflow: hidden;
}
body:not(.loaded)::before {
    content: '';
    position: fixed;
    top: 0;
    left: 0;
    width: 100%;
    height: 100%;
    background: #667eea;
    z-index: 10001;
}
body:not(.loaded)::after {
    content: '';
    position: fixed;
    top: 50%;
    left: 50%;
    width: 50px;
    height: 50px;
    border: 4px solid rgba(255, 255, 255, 0.3);
    border-top: 4px solid white;
    border-radius: 50%;
    animation: spin 1s linear infinite;
    z-index: 10002;
    transform: translate(-50%, -50%);
}
@keyframes spin {
    0% { transform: translate(-50%, -50%) rotate(0deg); }
    100% { transform: translate(-50%, -50%) rotate(360deg); }
}
"#;

type Styles = &'static [(&'static str, &'static str)];

struct HoverLift {
    selector: &'static str,
    enter: Styles,
    leave: Styles,
}

const HOVER_LIFTS: [HoverLift; 3] = [
    HoverLift {
        selector: ".project-card",
        enter: &[("transform", "translateY(-10px) scale(1.02)")],
        leave: &[("transform", "translateY(0) scale(1)")],
    },
    HoverLift {
        selector: ".skill-pill",
        enter: &[
            ("transform", "scale(1.1) rotate(2deg)"),
            ("box-shadow", "0 5px 15px rgba(0, 0, 0, 0.2)"),
        ],
        leave: &[("transform", "scale(1) rotate(0deg)"), ("box-shadow", "none")],
    },
    HoverLift {
        selector: ".blog-item",
        enter: &[
            ("transform", "translateY(-5px)"),
            ("box-shadow", "0 10px 30px rgba(0, 0, 0, 0.15)"),
        ],
        leave: &[
            ("transform", "translateY(0)"),
            ("box-shadow", "0 4px 15px rgba(0, 0, 0, 0.08)"),
        ],
    },
];

const TOUCH_FEEDBACK_TARGETS: &str = ".btn, .calendly-btn, .nav-link, .social-link, .project-link";

pub fn parallax_offset(scroll_y: f64) -> f64 {
    scroll_y * config::PARALLAX_SPEED
}

pub fn viewport_unit(inner_height: f64) -> String {
    format!("{}px", inner_height / 100.0)
}

// Swallows the second tap so iOS doesn't zoom.
#[derive(Default)]
pub struct DoubleTapGuard {
    last_touch_end: Cell<Option<i64>>,
}

impl DoubleTapGuard {
    pub fn should_block(&self, now_ms: i64) -> bool {
        let block = self
            .last_touch_end
            .get()
            .is_some_and(|last| now_ms - last <= config::DOUBLE_TAP_WINDOW_MS);
        self.last_touch_end.set(Some(now_ms));
        block
    }
}

pub fn is_placeholder_anchor(tag_name: &str, href: Option<&str>) -> bool {
    tag_name.eq_ignore_ascii_case("a") && href == Some("#")
}

fn apply_styles(element: &Element, styles: Styles) {
    for (property, value) in styles {
        dom::set_style(element, property, value);
    }
}

fn install_hover_lifts(document: &Document) -> Result<(), JsValue> {
    for lift in &HOVER_LIFTS {
        for element in dom::query_all(document, lift.selector) {
            let target = element.clone();
            let enter = lift.enter;
            dom::listen(&element, "mouseenter", move |_: MouseEvent| apply_styles(&target, enter))?;
            let target = element.clone();
            let leave = lift.leave;
            dom::listen(&element, "mouseleave", move |_: MouseEvent| apply_styles(&target, leave))?;
        }
    }
    Ok(())
}

fn install_touch(window: &Window, document: &Document) -> Result<(), JsValue> {
    let has_touch =
        dom::has_global(window, "ontouchstart") || window.navigator().max_touch_points() > 0;
    if has_touch {
        if let Some(body) = document.body() {
            body.add_class("touch-device");
        }
    }

    let guard = DoubleTapGuard::default();
    dom::listen(document, "touchend", move |event: Event| {
        if guard.should_block(Utc::now().timestamp_millis()) {
            event.prevent_default();
        }
    })?;

    for element in dom::query_all(document, TOUCH_FEEDBACK_TARGETS) {
        let target = element.clone();
        dom::listen(&element, "touchstart", move |_: Event| {
            dom::set_style(&target, "opacity", "0.7");
        })?;
        let target = element.clone();
        dom::listen(&element, "touchend", move |_: Event| {
            let target = target.clone();
            Timeout::new(config::TOUCH_FEEDBACK_MS, move || {
                dom::set_style(&target, "opacity", "1");
            })
            .forget();
        })?;
    }
    Ok(())
}

fn install_viewport_unit(window: &Window, document: &Document) -> Result<(), JsValue> {
    let Some(root) = document.document_element() else {
        return Ok(());
    };
    let window_for_resize = window.clone();
    let update = move || {
        let height = window_for_resize
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or_default();
        dom::set_style(&root, "--vh", &viewport_unit(height));
    };
    update();
    dom::listen(window, "resize", move |_: Event| update())
}

fn install_parallax(window: &Window, document: &Document) -> Result<(), JsValue> {
    let Some(home) = document.query_selector(".home-section").ok().flatten() else {
        return Ok(());
    };
    let window_for_scroll = window.clone();
    dom::listen_passive(window, "scroll", move || {
        let scroll_y = window_for_scroll.scroll_y().unwrap_or(0.0);
        dom::set_style(
            &home,
            "transform",
            &format!("translateY({}px)", parallax_offset(scroll_y)),
        );
    })
}

fn install_load_state(window: &Window, document: &Document) -> Result<(), JsValue> {
    dom::inject_style_once(document, "loading-styles", LOADING_CSS)?;
    let Some(body) = document.body() else {
        return Ok(());
    };
    if document.ready_state() == "complete" {
        body.add_class("loaded");
        return Ok(());
    }
    dom::listen(window, "load", move |_: Event| body.add_class("loaded"))
}

fn install_anchor_guard(document: &Document) -> Result<(), JsValue> {
    dom::listen(document, "click", |event: MouseEvent| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        if is_placeholder_anchor(&target.tag_name(), target.get_attribute("href").as_deref()) {
            event.prevent_default();
        }
    })
}

fn lazy_load_images(document: &Document) {
    for image in dom::query_all(document, "img") {
        if !image.has_attribute("loading") {
            let _ = image.set_attribute("loading", "lazy");
        }
    }
}

pub fn install(window: &Window, document: &Document) -> Result<(), JsValue> {
    install_load_state(window, document)?;
    install_touch(window, document)?;
    install_viewport_unit(window, document)?;
    install_parallax(window, document)?;
    install_hover_lifts(document)?;
    install_anchor_guard(document)?;
    lazy_load_images(document);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_tap_inside_window_is_blocked() {
        let guard = DoubleTapGuard::default();
        assert!(!guard.should_block(1_000));
        assert!(guard.should_block(1_250));
        assert!(guard.should_block(1_550));
        assert!(!guard.should_block(2_000));
    }

    #[test]
    fn first_tap_is_never_blocked() {
        let guard = DoubleTapGuard::default();
        assert!(!guard.should_block(0));
    }

    #[test]
    fn placeholder_anchors() {
        assert!(is_placeholder_anchor("A", Some("#")));
        assert!(!is_placeholder_anchor("A", Some("#about")));
        assert!(!is_placeholder_anchor("BUTTON", Some("#")));
        assert!(!is_placeholder_anchor("A", None));
    }

    #[test]
    fn parallax_moves_at_half_speed() {
        assert_eq!(parallax_offset(0.0), 0.0);
        assert_eq!(parallax_offset(400.0), 200.0);
    }

    #[test]
    fn viewport_unit_is_one_percent() {
        assert_eq!(viewport_unit(800.0), "8px");
    }
}
