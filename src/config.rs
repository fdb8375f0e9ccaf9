use log::Level;

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose console output when running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

// Local storage keys
pub const DARK_MODE_KEY: &str = "darkMode";
pub const FORM_AUTOSAVE_KEY: &str = "talkFormData";

// Navigation
pub const NAV_HIGHLIGHT_OFFSET: f64 = 100.0;
pub const NAV_SCROLL_OFFSET: f64 = 80.0; // fixed navbar height
pub const MOBILE_BREAKPOINT: f64 = 768.0;
pub const ORIENTATION_RESIZE_DELAY_MS: u32 = 100;

// Reveal
pub const SECTION_REVEAL_MARGIN: f64 = 150.0;
pub const FADE_THRESHOLD: f64 = 0.1;
pub const FADE_MARGIN: f64 = 50.0;
pub const STATS_THRESHOLD: f64 = 0.5;
pub const CODE_THRESHOLD: f64 = 0.3;
pub const CODE_MARGIN: f64 = 20.0;
pub const CODE_LINE_STAGGER_MS: u32 = 200;

// Counter
pub const COUNTER_START_DELAY_MS: u32 = 500;
pub const COUNTER_DURATION_MS: u32 = 2000;
pub const COUNTER_TICK_MS: u32 = 16;

// Typing
pub const TYPING_START_DELAY_MS: u32 = 1000;
pub const TYPING_CHAR_DELAY_MS: u32 = 100;
pub const TYPING_CARET_LINGER_MS: u32 = 1000;
pub const TYPING_CARET_STYLE: &str = "2px solid #ffd700";

// Notifications
pub const NOTIFICATION_TIMEOUT_MS: u32 = 5000;

// Scheduling widget
pub const WIDGET_POLL_INTERVAL_MS: u32 = 100;
pub const WIDGET_POLL_MAX_ATTEMPTS: u32 = 20;
pub const WIDGET_URL_CHECK_DELAY_MS: u32 = 1000;
pub const SCHEDULING_DOMAIN: &str = "calendly.com";
pub const SCHEDULING_EVENT_PREFIX: &str = "calendly";
pub const SCHEDULING_BOOKED_EVENT: &str = "calendly.event_scheduled";
pub const LOCAL_HOSTNAMES: [&str; 2] = ["localhost", "127.0.0.1"];

// Blog
pub const BLOG_STAGGER_MS: u32 = 100;
pub const ALL_CATEGORIES: &str = "all";

// Page polish
pub const SCROLL_TOP_THRESHOLD: f64 = 300.0;
pub const PARALLAX_SPEED: f64 = 0.5;
pub const DOUBLE_TAP_WINDOW_MS: i64 = 300;
pub const TOUCH_FEEDBACK_MS: u32 = 150;
