//! Core engine for digit span - sequence state, reveal scheduling and the
//! session state machine.
//!
//! This crate has no terminal dependencies. The TUI reads a [`Session`] to
//! render and calls into it for every key press and frame tick.

mod config;
mod panel;
mod random;
mod reveal;
mod sequence;
mod session;
mod trial;

pub use config::{
    AppConfig, CONFIG_PATH_ENV, ConfigError, DEFAULT_DELAY, DEFAULT_STARTING_LENGTH, GameConfig,
    Settings, SettingsError, SpanConfig, config_path, load_settings, load_settings_from,
};
pub use panel::{SettingsPanel, SettingsRow};
pub use random::{BoxedRandom, RandomFactory, RandomSource, ThreadRandom, thread_random_factory};
pub use reveal::{RevealScheduler, RevealStep, RevealTicket};
pub use sequence::SequenceEngine;
pub use session::{
    Cue, DELAY_STEP, MAX_DELAY, MAX_STARTING_LENGTH, MIN_DELAY, MessageKind, Scoreboard, Session,
    StatusMessage,
};
pub use trial::{KeyOutcome, Phase, Trial};

pub use span_types::{
    InvalidConfigurationError, InvalidModeError, Mode, SymbolSet, UiOptions, spaced,
};
