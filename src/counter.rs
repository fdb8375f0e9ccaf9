use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, Window};

use crate::config;
use crate::dom;
use crate::reveal::{VisibilityWatcher, WatchOptions};

// parseInt semantics: leading digits only.
pub fn parse_count(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u64>().ok().filter(|count| *count > 0)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Value(u64),
    Done(String),
}

#[derive(Clone, Debug)]
pub struct CounterRamp {
    target: u64,
    total_ticks: u64,
    tick: u64,
}

impl CounterRamp {
    pub fn new(target: u64, duration_ms: u32, tick_ms: u32) -> Self {
        let total_ticks = u64::from(duration_ms.div_ceil(tick_ms.max(1))).max(1);
        Self {
            target,
            total_ticks,
            tick: 0,
        }
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }
}

impl Iterator for CounterRamp {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.tick >= self.total_ticks {
            return None;
        }
        self.tick += 1;
        if self.tick == self.total_ticks {
            Some(Frame::Done(format!("{}+", self.target)))
        } else {
            let value = (u128::from(self.target) * u128::from(self.tick) / u128::from(self.total_ticks)) as u64;
            Some(Frame::Value(value))
        }
    }
}

fn animate(element: Element, target: u64) {
    let ramp = CounterRamp::new(target, config::COUNTER_DURATION_MS, config::COUNTER_TICK_MS);
    log::trace!("counting to {target} over {} ticks", ramp.total_ticks());
    let ramp = RefCell::new(ramp);
    let handle: Rc<RefCell<Option<Interval>>> = Rc::default();
    let handle_clone = handle.clone();

    let interval = Interval::new(config::COUNTER_TICK_MS, move || {
        match ramp.borrow_mut().next() {
            Some(Frame::Value(value)) => element.set_text_content(Some(&value.to_string())),
            Some(Frame::Done(text)) => {
                element.set_text_content(Some(&text));
                // Cancel from outside this tick's callback.
                let handle = handle_clone.clone();
                Timeout::new(0, move || {
                    handle.borrow_mut().take();
                })
                .forget();
            }
            None => {}
        }
    });
    *handle.borrow_mut() = Some(interval);
}

fn start_all(document: &Document) {
    for stat in dom::query_all(document, ".stat-number[data-count]") {
        let Some(target) = stat.get_attribute("data-count").as_deref().and_then(parse_count) else {
            continue;
        };
        stat.set_text_content(Some("0"));
        Timeout::new(config::COUNTER_START_DELAY_MS, move || animate(stat, target)).forget();
    }
}

pub fn install(window: &Window, document: &Document) -> Result<(), JsValue> {
    let Some(stats) = document.query_selector(".intro-stats").ok().flatten() else {
        return Ok(());
    };
    let watcher = VisibilityWatcher::new(
        window,
        WatchOptions {
            threshold: config::STATS_THRESHOLD,
            bottom_margin: 0.0,
        },
    )?;
    let document = document.clone();
    watcher.watch(stats, move |_| {
        log::debug!("stats in view, starting counters");
        start_all(&document);
    });
    watcher.check_now();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_with_target_and_plus() {
        for target in [1, 7, 42, 150, 1000, 123_456] {
            let frames: Vec<Frame> = CounterRamp::new(target, 2000, 16).collect();
            assert_eq!(frames.last(), Some(&Frame::Done(format!("{target}+"))));
        }
    }

    #[test]
    fn finishes_within_duration() {
        let ramp = CounterRamp::new(500, 2000, 16);
        let ticks = ramp.total_ticks();
        assert_eq!(ticks, 125);
        assert!(ticks * 16 <= 2000);
        assert_eq!(ramp.count() as u64, ticks);
    }

    #[test]
    fn values_never_decrease_or_overshoot() {
        let mut last = 0;
        for frame in CounterRamp::new(37, 2000, 16) {
            if let Frame::Value(value) = frame {
                assert!(value >= last);
                assert!(value < 37);
                last = value;
            }
        }
    }

    #[test]
    fn duration_not_a_multiple_of_tick_rounds_up() {
        let ramp = CounterRamp::new(10, 100, 16);
        assert_eq!(ramp.total_ticks(), 7);
    }

    #[test]
    fn parses_like_parse_int() {
        assert_eq!(parse_count("250"), Some(250));
        assert_eq!(parse_count("  12px"), Some(12));
        assert_eq!(parse_count("0"), None);
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count("-5"), None);
        assert_eq!(parse_count(""), None);
    }
}
