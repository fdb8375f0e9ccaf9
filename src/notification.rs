use std::rc::Rc;

use yew::AppHandle;

use crate::components::overlay::{Overlay, OverlayMsg};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
}

impl NotificationKind {
    pub fn palette(self) -> Palette {
        match self {
            NotificationKind::Success => Palette {
                background: "#d4edda",
                text: "#155724",
                border: "#c3e6cb",
            },
            NotificationKind::Error => Palette {
                background: "#f8d7da",
                text: "#721c24",
                border: "#f5c6cb",
            },
            NotificationKind::Info => Palette {
                background: "#d1ecf1",
                text: "#0c5460",
                border: "#bee5eb",
            },
        }
    }

    pub fn css_modifier(self) -> &'static str {
        match self {
            NotificationKind::Info => "notification-info",
            NotificationKind::Success => "notification-success",
            NotificationKind::Error => "notification-error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Error)
    }
}

pub trait Notify {
    fn notify(&self, notification: Notification);
}

#[derive(Clone)]
pub struct OverlayNotifier {
    app: Rc<AppHandle<Overlay>>,
}

impl OverlayNotifier {
    pub fn new(app: AppHandle<Overlay>) -> Self {
        Self { app: Rc::new(app) }
    }
}

impl Notify for OverlayNotifier {
    fn notify(&self, notification: Notification) {
        log::debug!("notification ({:?}): {}", notification.kind, notification.message);
        self.app.send_message(OverlayMsg::Show(notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_has_its_own_colours() {
        let success = NotificationKind::Success.palette();
        let error = NotificationKind::Error.palette();
        let info = NotificationKind::Info.palette();
        assert_eq!(success.background, "#d4edda");
        assert_eq!(error.text, "#721c24");
        assert_eq!(info.border, "#bee5eb");
    }

    #[test]
    fn constructors_set_kind() {
        assert_eq!(Notification::error("x").kind, NotificationKind::Error);
        assert_eq!(Notification::success("ok").message, "ok");
    }
}
