use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;
use web_sys::Document;

use crate::config;
use crate::dom;

pub struct Typewriter {
    chars: Vec<char>,
    shown: usize,
}

impl Typewriter {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            shown: 0,
        }
    }
}

impl Iterator for Typewriter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.shown >= self.chars.len() {
            return None;
        }
        self.shown += 1;
        Some(self.chars[..self.shown].iter().collect())
    }
}

pub fn install(document: &Document) {
    let Some(subtitle) = document.query_selector(".home-subtitle").ok().flatten() else {
        return;
    };
    let text = subtitle.text_content().unwrap_or_default();
    subtitle.set_text_content(Some(""));
    dom::set_style(&subtitle, "border-right", config::TYPING_CARET_STYLE);

    spawn_local(async move {
        TimeoutFuture::new(config::TYPING_START_DELAY_MS).await;
        for frame in Typewriter::new(&text) {
            subtitle.set_text_content(Some(&frame));
            TimeoutFuture::new(config::TYPING_CHAR_DELAY_MS).await;
        }
        TimeoutFuture::new(config::TYPING_CARET_LINGER_MS).await;
        dom::set_style(&subtitle, "border-right", "none");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveals_one_character_per_step() {
        let frames: Vec<String> = Typewriter::new("Hi!").collect();
        assert_eq!(frames, vec!["H", "Hi", "Hi!"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let frames: Vec<String> = Typewriter::new("Öl ☕").collect();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames.last().unwrap(), "Öl ☕");
    }

    #[test]
    fn empty_text_types_nothing() {
        assert_eq!(Typewriter::new("").count(), 0);
    }
}
