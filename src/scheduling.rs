use gloo_timers::callback::Timeout;
use gloo_timers::future::TimeoutFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::js_sys::{Function, Reflect};
use web_sys::{Document, Element, HtmlButtonElement, MessageEvent, MouseEvent, Window};

use crate::config;
use crate::dom;
use crate::notification::{Notification, NotificationKind, Notify};

const BUTTONS: &str = ".calendly-btn";
const URL_ATTRIBUTE: &str = "data-calendly-url";
const BOOKED_MESSAGE: &str = "Great! Your mentorship session has been scheduled. You should receive a confirmation email shortly.";

#[derive(Debug, Error, PartialEq)]
pub enum UrlProblem {
    #[error("no scheduling URL configured")]
    Missing,
    #[error("scheduling URL is malformed: {0}")]
    Malformed(String),
    #[error("scheduling URL points at {0}, expected calendly.com")]
    ForeignHost(String),
}

pub fn validate_url(raw: Option<&str>) -> Result<Url, UrlProblem> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or(UrlProblem::Missing)?;
    let url = Url::parse(raw).map_err(|e| UrlProblem::Malformed(e.to_string()))?;
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let domain = config::SCHEDULING_DOMAIN;
    if host == domain || host.ends_with(&format!(".{domain}")) {
        Ok(url)
    } else {
        Err(UrlProblem::ForeignHost(host))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollStep {
    Ready,
    Retry,
    GiveUp,
}

// `max_attempts` retries after the first check.
#[derive(Debug)]
pub struct WidgetPoll {
    attempts: u32,
    max_attempts: u32,
}

impl WidgetPoll {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
        }
    }

    pub fn step(&mut self, widget_available: bool) -> PollStep {
        if widget_available {
            PollStep::Ready
        } else if self.attempts < self.max_attempts {
            self.attempts += 1;
            PollStep::Retry
        } else {
            PollStep::GiveUp
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Launch {
    Popup,
    NewTab,
}

// Local development always gets a tab; the embed refuses to frame there.
pub fn choose_launch(hostname: &str, widget_ready: bool) -> Launch {
    if config::LOCAL_HOSTNAMES.contains(&hostname) || !widget_ready {
        Launch::NewTab
    } else {
        Launch::Popup
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WidgetMessage {
    #[serde(default)]
    pub event: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SchedulingEvent {
    Scheduled,
    Other(String),
}

pub fn classify(message: &WidgetMessage) -> Option<SchedulingEvent> {
    let event = message.event.as_deref()?;
    if !event.starts_with(config::SCHEDULING_EVENT_PREFIX) {
        return None;
    }
    if event == config::SCHEDULING_BOOKED_EVENT {
        Some(SchedulingEvent::Scheduled)
    } else {
        Some(SchedulingEvent::Other(event.to_string()))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageSettings {
    background_color: &'static str,
    hide_event_type_details: bool,
    hide_landing_page_details: bool,
    primary_color: &'static str,
    text_color: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PopupOptions<'a> {
    url: &'a str,
    page_settings: PageSettings,
}

impl<'a> PopupOptions<'a> {
    fn new(url: &'a str) -> Self {
        Self {
            url,
            page_settings: PageSettings {
                background_color: "ffffff",
                hide_event_type_details: false,
                hide_landing_page_details: false,
                primary_color: "667eea",
                text_color: "4d4d4d",
            },
        }
    }
}

#[derive(Serialize)]
struct BookingAnalytics {
    event_category: &'static str,
    event_label: &'static str,
}

fn global_function(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

fn popup_widget(window: &Window) -> Option<(JsValue, Function)> {
    let widget = Reflect::get(window, &JsValue::from_str("Calendly")).ok()?;
    if widget.is_undefined() || widget.is_null() {
        return None;
    }
    let init = global_function(&widget, "initPopupWidget")?;
    Some((widget, init))
}

fn open_popup(window: &Window, url: &str) -> Result<(), JsValue> {
    let (widget, init) =
        popup_widget(window).ok_or_else(|| JsValue::from_str("popup widget unavailable"))?;
    let options = serde_wasm_bindgen::to_value(&PopupOptions::new(url))?;
    init.call1(&widget, &options)?;
    Ok(())
}

// Popup blockers answer `window.open` with null rather than an exception.
pub fn opened_tab<W, E>(result: Result<Option<W>, E>) -> Option<W> {
    result.ok().flatten()
}

pub fn blocked_tab_notice(url: &str) -> Notification {
    Notification::new(
        format!("Your browser blocked the booking page. You can open it directly at {url}"),
        NotificationKind::Info,
    )
}

fn open_new_tab(window: &Window, url: &str, notifier: &impl Notify) {
    match opened_tab(window.open_with_url_and_target(url, "_blank")) {
        Some(tab) => {
            // Same effect as "noopener" without losing the handle.
            let _ = tab.set_opener(&JsValue::NULL);
        }
        None => {
            log::warn!("browser blocked opening {url}");
            notifier.notify(blocked_tab_notice(url));
        }
    }
}

// The launch URL, or `None` (logged) when the button points somewhere else.
pub fn booking_target(raw: Option<&str>) -> Option<Url> {
    match validate_url(raw) {
        Ok(url) => Some(url),
        Err(problem) => {
            log::warn!("ignoring booking click: {problem}");
            None
        }
    }
}

fn launch(window: &Window, url: &str, notifier: &impl Notify) {
    let hostname = window.location().hostname().unwrap_or_default();
    match choose_launch(&hostname, popup_widget(window).is_some()) {
        Launch::Popup => {
            if let Err(e) = open_popup(window, url) {
                log::warn!("popup failed ({e:?}), opening a tab instead");
                open_new_tab(window, url, notifier);
            }
        }
        Launch::NewTab => open_new_tab(window, url, notifier),
    }
}

// Cloning drops handlers from an earlier bind.
fn bind_buttons<N>(window: &Window, document: &Document, notifier: &N) -> Result<usize, JsValue>
where
    N: Notify + Clone + 'static,
{
    let buttons = dom::query_all(document, BUTTONS);
    for button in &buttons {
        let fresh: Element = button.clone_node_with_deep(true)?.dyn_into()?;
        if let Some(parent) = button.parent_node() {
            parent.replace_child(&fresh, button)?;
        }
        let window = window.clone();
        let target = fresh.clone();
        let notifier = notifier.clone();
        dom::listen(&fresh, "click", move |event: MouseEvent| {
            event.prevent_default();
            event.stop_propagation();
            if let Some(url) = booking_target(target.get_attribute(URL_ATTRIBUTE).as_deref()) {
                launch(&window, url.as_str(), &notifier);
            }
        })?;
    }
    Ok(buttons.len())
}

pub fn check_buttons(document: &Document) -> bool {
    let mut all_valid = true;
    for button in dom::query_all(document, BUTTONS) {
        if let Err(problem) = validate_url(button.get_attribute(URL_ATTRIBUTE).as_deref()) {
            log::warn!("disabling booking button: {problem}");
            all_valid = false;
            if let Some(button) = button.dyn_ref::<HtmlButtonElement>() {
                button.set_disabled(true);
            } else {
                let _ = button.set_attribute("disabled", "");
            }
            let _ = button.set_attribute("title", "Calendly URL not configured");
            dom::set_style(&button, "opacity", "0.5");
        }
    }
    all_valid
}

fn report_booking(window: &Window) {
    let Some(gtag) = global_function(window, "gtag") else {
        return;
    };
    let params = BookingAnalytics {
        event_category: "conversion",
        event_label: "calendly_booking",
    };
    match serde_wasm_bindgen::to_value(&params) {
        Ok(params) => {
            let _ = gtag.call3(
                &JsValue::NULL,
                &JsValue::from_str("event"),
                &JsValue::from_str("mentorship_booked"),
                &params,
            );
        }
        Err(e) => log::debug!("analytics params not serialisable: {e}"),
    }
}

pub fn install<N>(window: &Window, document: &Document, notifier: N) -> Result<(), JsValue>
where
    N: Notify + Clone + 'static,
{
    {
        let window = window.clone();
        let document = document.clone();
        let notifier = notifier.clone();
        spawn_local(async move {
            let mut poll = WidgetPoll::new(config::WIDGET_POLL_MAX_ATTEMPTS);
            loop {
                match poll.step(popup_widget(&window).is_some()) {
                    PollStep::Ready => break,
                    PollStep::GiveUp => {
                        log::info!("scheduling widget not loaded, buttons will open tabs");
                        break;
                    }
                    PollStep::Retry => TimeoutFuture::new(config::WIDGET_POLL_INTERVAL_MS).await,
                }
            }
            match bind_buttons(&window, &document, &notifier) {
                Ok(count) => log::info!("bound {count} booking buttons after {} polls", poll.attempts()),
                Err(e) => log::error!("binding booking buttons failed: {e:?}"),
            }
        });
    }

    {
        let window_for_messages = window.clone();
        dom::listen(window, "message", move |event: MessageEvent| {
            let Ok(message) = serde_wasm_bindgen::from_value::<WidgetMessage>(event.data()) else {
                return;
            };
            match classify(&message) {
                Some(SchedulingEvent::Scheduled) => {
                    notifier.notify(Notification::success(BOOKED_MESSAGE));
                    report_booking(&window_for_messages);
                }
                Some(SchedulingEvent::Other(name)) => log::debug!("scheduling widget event {name}"),
                None => {}
            }
        })?;
    }

    let document = document.clone();
    Timeout::new(config::WIDGET_URL_CHECK_DELAY_MS, move || {
        if check_buttons(&document) {
            log::debug!("all booking URLs valid");
        }
    })
    .forget();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_calendly_hosts_only() {
        assert!(validate_url(Some("https://calendly.com/jane/mentorship")).is_ok());
        assert!(validate_url(Some("https://www.calendly.com/jane")).is_ok());
        assert_eq!(
            validate_url(Some("https://calendly.com.evil.io/jane")),
            Err(UrlProblem::ForeignHost("calendly.com.evil.io".to_string()))
        );
        assert_eq!(
            validate_url(Some("https://example.com/?next=calendly.com")),
            Err(UrlProblem::ForeignHost("example.com".to_string()))
        );
    }

    #[test]
    fn missing_or_broken_urls() {
        assert_eq!(validate_url(None), Err(UrlProblem::Missing));
        assert_eq!(validate_url(Some("  ")), Err(UrlProblem::Missing));
        assert!(matches!(validate_url(Some("calendly.com/jane")), Err(UrlProblem::Malformed(_))));
    }

    #[test]
    fn clicks_only_launch_booking_urls() {
        assert_eq!(
            booking_target(Some("https://calendly.com/jane/30min")).map(String::from),
            Some("https://calendly.com/jane/30min".to_string())
        );
        assert_eq!(booking_target(Some("https://evil.example/phish")), None);
        assert_eq!(booking_target(None), None);
    }

    #[test]
    fn null_from_window_open_counts_as_blocked() {
        assert_eq!(opened_tab::<u8, ()>(Ok(None)), None);
        assert_eq!(opened_tab::<u8, ()>(Err(())), None);
        assert_eq!(opened_tab::<u8, ()>(Ok(Some(1))), Some(1));

        let notice = blocked_tab_notice("https://calendly.com/jane");
        assert_eq!(notice.kind, NotificationKind::Info);
        assert!(notice.message.contains("https://calendly.com/jane"));
    }

    #[test]
    fn poll_gives_up_after_max_attempts() {
        let mut poll = WidgetPoll::new(20);
        let retries = std::iter::repeat_with(|| poll.step(false))
            .take_while(|step| *step == PollStep::Retry)
            .count();
        assert_eq!(retries, 20);
        assert_eq!(poll.step(false), PollStep::GiveUp);
    }

    #[test]
    fn poll_stops_as_soon_as_widget_loads() {
        let mut poll = WidgetPoll::new(20);
        assert_eq!(poll.step(false), PollStep::Retry);
        assert_eq!(poll.step(false), PollStep::Retry);
        assert_eq!(poll.step(true), PollStep::Ready);
        assert_eq!(poll.attempts(), 2);
    }

    #[test]
    fn localhost_always_opens_tab() {
        assert_eq!(choose_launch("localhost", true), Launch::NewTab);
        assert_eq!(choose_launch("127.0.0.1", true), Launch::NewTab);
        assert_eq!(choose_launch("jane.dev", false), Launch::NewTab);
        assert_eq!(choose_launch("jane.dev", true), Launch::Popup);
    }

    #[test]
    fn classifies_widget_messages() {
        let booked = WidgetMessage {
            event: Some("calendly.event_scheduled".to_string()),
        };
        assert_eq!(classify(&booked), Some(SchedulingEvent::Scheduled));

        let viewed = WidgetMessage {
            event: Some("calendly.profile_page_viewed".to_string()),
        };
        assert_eq!(
            classify(&viewed),
            Some(SchedulingEvent::Other("calendly.profile_page_viewed".to_string()))
        );

        let foreign = WidgetMessage {
            event: Some("stripe.checkout".to_string()),
        };
        assert_eq!(classify(&foreign), None);
        assert_eq!(classify(&WidgetMessage::default()), None);
    }

    #[test]
    fn popup_options_use_widget_field_names() {
        let json = serde_json::to_value(PopupOptions::new("https://calendly.com/jane")).unwrap();
        assert_eq!(json["url"], "https://calendly.com/jane");
        assert_eq!(json["pageSettings"]["primaryColor"], "667eea");
        assert_eq!(json["pageSettings"]["hideEventTypeDetails"], false);
    }
}
