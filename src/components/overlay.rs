use gloo_timers::callback::Timeout;
use yew::prelude::*;

use crate::components::scroll_top::ScrollToTop;
use crate::components::toast::Toast;
use crate::config;
use crate::notification::Notification;

// Ids keep an older banner's timer from closing a newer one.
#[derive(Default)]
pub struct BannerSlot {
    current: Option<(u64, Notification)>,
    next_id: u64,
}

impl BannerSlot {
    pub fn show(&mut self, notification: Notification) -> u64 {
        self.next_id += 1;
        self.current = Some((self.next_id, notification));
        self.next_id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        match &self.current {
            Some((current, _)) if *current == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&(u64, Notification)> {
        self.current.as_ref()
    }
}

pub enum OverlayMsg {
    Show(Notification),
    Dismiss(u64),
}

pub struct Overlay {
    slot: BannerSlot,
}

impl Component for Overlay {
    type Message = OverlayMsg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            slot: BannerSlot::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            OverlayMsg::Show(notification) => {
                let id = self.slot.show(notification);
                let dismiss = ctx.link().callback(OverlayMsg::Dismiss);
                let timeout = Timeout::new(config::NOTIFICATION_TIMEOUT_MS, move || {
                    dismiss.emit(id);
                });
                timeout.forget();
                true
            }
            OverlayMsg::Dismiss(id) => self.slot.dismiss(id),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let banner = match self.slot.current() {
            Some((id, notification)) => {
                let id = *id;
                let on_close = ctx.link().callback(move |_: MouseEvent| OverlayMsg::Dismiss(id));
                html! {
                    <Toast key={id.to_string()} notification={notification.clone()} {on_close} />
                }
            }
            None => html! {},
        };

        html! {
            <>
                { banner }
                <ScrollToTop />
            </>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_banner_replaces_old_one() {
        let mut slot = BannerSlot::default();
        slot.show(Notification::success("first"));
        let second = slot.show(Notification::error("second"));

        let (id, shown) = slot.current().unwrap();
        assert_eq!(*id, second);
        assert_eq!(shown.message, "second");
    }

    #[test]
    fn stale_timer_leaves_newer_banner() {
        let mut slot = BannerSlot::default();
        let first = slot.show(Notification::success("first"));
        let second = slot.show(Notification::success("second"));

        assert!(!slot.dismiss(first));
        assert!(slot.current().is_some());
        assert!(slot.dismiss(second));
        assert!(slot.current().is_none());
    }
}
