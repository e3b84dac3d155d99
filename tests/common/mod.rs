//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use span_engine::{BoxedRandom, Mode, RandomFactory, Session, Settings};

pub const DELAY: Duration = Duration::from_millis(1000);

/// Every engine replays `indexes` from the start, cycling when exhausted.
pub fn scripted_factory(indexes: Vec<usize>) -> RandomFactory {
    Box::new(move || {
        let indexes = indexes.clone();
        let mut cursor = 0;
        let source: BoxedRandom = Box::new(move |_bound: usize| {
            let index = indexes[cursor % indexes.len()];
            cursor += 1;
            index
        });
        source
    })
}

pub fn settings(starting_length: usize, mode: Mode) -> Settings {
    let mut settings = Settings::default();
    settings
        .set_starting_length(starting_length)
        .expect("positive length");
    settings.set_mode(mode);
    settings
}

pub fn scripted_session(starting_length: usize, mode: Mode, indexes: Vec<usize>) -> Session {
    Session::with_rng_factory(settings(starting_length, mode), scripted_factory(indexes))
}

/// Tick far enough past `start` for a reveal of `len` symbols to finish.
pub fn after_reveal(start: Instant, len: usize) -> Instant {
    start + DELAY * (u32::try_from(len).expect("small length") + 1)
}

pub fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn char_key(c: char) -> Event {
    key(KeyCode::Char(c))
}
