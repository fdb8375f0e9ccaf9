use stylist::Style;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{ScrollBehavior, ScrollToOptions};
use yew::prelude::*;

use crate::config;

const BUTTON_CSS: &str = r#"
    position: fixed;
    bottom: 30px;
    right: 30px;
    background: #667eea;
    color: white;
    border: none;
    border-radius: 50%;
    width: 50px;
    height: 50px;
    font-size: 1.2rem;
    cursor: pointer;
    transition: all 0.3s ease;
    z-index: 1000;
    box-shadow: 0 4px 12px rgba(102, 126, 234, 0.3);
"#;

pub fn should_show(scroll_y: f64) -> bool {
    scroll_y > config::SCROLL_TOP_THRESHOLD
}

#[function_component(ScrollToTop)]
pub fn scroll_to_top() -> Html {
    let visible = use_state(|| false);

    {
        let visible = visible.clone();
        use_effect_with_deps(move |_| {
            let window = web_sys::window();
            let scroll_callback = window.clone().map(|window| {
                Closure::wrap(Box::new(move || {
                    let scroll_y = window.scroll_y().unwrap_or(0.0);
                    visible.set(should_show(scroll_y));
                }) as Box<dyn FnMut()>)
            });

            if let (Some(window), Some(callback)) = (&window, &scroll_callback) {
                let _ = window.add_event_listener_with_callback("scroll", callback.as_ref().unchecked_ref());
            }

            move || {
                if let (Some(window), Some(callback)) = (window, scroll_callback) {
                    let _ = window.remove_event_listener_with_callback("scroll", callback.as_ref().unchecked_ref());
                }
            }
        }, ());
    }

    let onclick = Callback::from(|_: MouseEvent| {
        if let Some(window) = web_sys::window() {
            let options = ScrollToOptions::new();
            options.set_top(0.0);
            options.set_behavior(ScrollBehavior::Smooth);
            window.scroll_to_with_scroll_to_options(&options);
        }
    });

    let style_class = Style::new(BUTTON_CSS)
        .map(|style| style.get_class_name().to_string())
        .unwrap_or_default();

    let state_style = if *visible {
        "opacity: 1; transform: translateY(0);"
    } else {
        "opacity: 0; transform: translateY(10px); pointer-events: none;"
    };

    html! {
        <button class={classes!("scroll-to-top", style_class)} style={state_style} aria-label="Scroll to top" {onclick}>
            <i class="fas fa-arrow-up"></i>
        </button>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appears_past_threshold() {
        assert!(!should_show(0.0));
        assert!(!should_show(300.0));
        assert!(should_show(301.0));
    }
}
