use stylist::Style;
use yew::prelude::*;

use crate::notification::Notification;

#[derive(Properties, PartialEq)]
pub struct ToastProps {
    pub notification: Notification,
    pub on_close: Callback<MouseEvent>,
}

fn toast_css(notification: &Notification) -> String {
    let palette = notification.kind.palette();
    format!(
        r#"
        position: fixed;
        top: 100px;
        right: 20px;
        background: {background};
        color: {text};
        border: 1px solid {border};
        border-radius: 8px;
        padding: 1rem;
        max-width: 400px;
        z-index: 10000;
        box-shadow: 0 4px 12px rgba(0, 0, 0, 0.15);
        animation: slideIn 0.3s ease;

        @keyframes slideIn {{
            from {{
                transform: translateX(100%);
                opacity: 0;
            }}
            to {{
                transform: translateX(0);
                opacity: 1;
            }}
        }}
        .notification-content {{
            display: flex;
            justify-content: space-between;
            align-items: center;
            gap: 1rem;
        }}
        .notification-close {{
            background: none;
            border: none;
            font-size: 1.5rem;
            cursor: pointer;
            padding: 0;
            line-height: 1;
            color: inherit;
        }}
        "#,
        background = palette.background,
        text = palette.text,
        border = palette.border,
    )
}

#[function_component(Toast)]
pub fn toast(props: &ToastProps) -> Html {
    let style_class = match Style::new(toast_css(&props.notification)) {
        Ok(style) => style.get_class_name().to_string(),
        Err(e) => {
            log::error!("notification style rejected: {e}");
            String::new()
        }
    };

    html! {
        <div class={classes!("notification", props.notification.kind.css_modifier(), style_class)} role="status">
            <div class="notification-content">
                <span class="notification-message">{ &props.notification.message }</span>
                <button class="notification-close" aria-label="Close" onclick={props.on_close.clone()}>
                    {"×"}
                </button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_uses_kind_palette() {
        let css = toast_css(&Notification::error("boom"));
        assert!(css.contains("background: #f8d7da;"));
        assert!(css.contains("border: 1px solid #f5c6cb;"));
        assert!(css.contains("@keyframes slideIn"));
    }
}
