//! Session controller: explicit owner of everything one play session needs.
//!
//! ```text
//! Idle --start--> Presenting --reveal done--> AwaitingInput --+--> Success --start--> (advance)
//!                                                              +--> Failure --start--> (retreat)
//! ```
//!
//! The controller decides how the engine moves between trials: `advance` after
//! a success, `retreat` after a failure, `reshuffle` for a retry. Time is passed
//! in by the caller so the whole state machine is deterministic under test.

use std::fmt;
use std::mem;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use span_types::{InvalidConfigurationError, InvalidModeError, Mode, UiOptions, spaced};

use crate::config::{ConfigError, Settings};
use crate::panel::{SettingsPanel, SettingsRow};
use crate::random::{RandomFactory, thread_random_factory};
use crate::reveal::{RevealScheduler, RevealStep, RevealTicket};
use crate::sequence::SequenceEngine;
use crate::trial::{KeyOutcome, Phase, Trial};

pub const DELAY_STEP: Duration = Duration::from_millis(100);
pub const MIN_DELAY: Duration = Duration::from_millis(100);
pub const MAX_DELAY: Duration = Duration::from_millis(10_000);
pub const MAX_STARTING_LENGTH: usize = 30;

/// Audio feedback request for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Symbol(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scoreboard {
    best: usize,
    misses: u32,
    successes: u32,
}

impl Scoreboard {
    /// Longest length completed.
    #[must_use]
    pub fn best(&self) -> usize {
        self.best
    }

    #[must_use]
    pub fn misses(&self) -> u32 {
        self.misses
    }

    #[must_use]
    pub fn successes(&self) -> u32 {
        self.successes
    }

    fn record_success(&mut self, length: usize) {
        self.successes += 1;
        self.best = self.best.max(length);
    }

    fn record_miss(&mut self) {
        self.misses += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    kind: MessageKind,
    text: String,
}

impl StatusMessage {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Info,
            text: text.into(),
        }
    }

    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    fn failure(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Failure,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// What the next `start` does with the existing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextTrial {
    Fresh,
    Advance,
    Retreat,
    Replay,
}

pub struct Session {
    settings: Settings,
    ui_options: UiOptions,
    engine: Option<SequenceEngine>,
    rng_factory: RandomFactory,
    phase: Phase,
    next: NextTrial,
    trial: Option<Trial>,
    /// Sequence of the current (or last) trial, in shown order.
    shown: Vec<char>,
    reveal: RevealScheduler,
    ticket: Option<RevealTicket>,
    display: Option<char>,
    cues: Vec<Cue>,
    scoreboard: Scoreboard,
    message: StatusMessage,
    panel: Option<SettingsPanel>,
    config_path: Option<PathBuf>,
    should_quit: bool,
}

impl Session {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self::with_rng_factory(settings, thread_random_factory())
    }

    /// Session whose engines draw from sources built by `rng_factory`.
    #[must_use]
    pub fn with_rng_factory(settings: Settings, rng_factory: RandomFactory) -> Self {
        let message = StatusMessage::info(idle_prompt(&settings));
        Self {
            settings,
            ui_options: UiOptions::default(),
            engine: None,
            rng_factory,
            phase: Phase::Idle,
            next: NextTrial::Fresh,
            trial: None,
            shown: Vec::new(),
            reveal: RevealScheduler::new(),
            ticket: None,
            display: None,
            cues: Vec::new(),
            scoreboard: Scoreboard::default(),
            message,
            panel: None,
            config_path: None,
            should_quit: false,
        }
    }

    #[must_use]
    pub fn with_ui_options(mut self, ui_options: UiOptions) -> Self {
        self.ui_options = ui_options;
        self
    }

    /// Save settings here instead of the default config location.
    #[must_use]
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    #[must_use]
    pub fn message(&self) -> &StatusMessage {
        &self.message
    }

    #[must_use]
    pub fn engine(&self) -> Option<&SequenceEngine> {
        self.engine.as_ref()
    }

    #[must_use]
    pub fn trial(&self) -> Option<&Trial> {
        self.trial.as_ref()
    }

    /// Sequence of the current or most recent trial.
    #[must_use]
    pub fn shown_sequence(&self) -> &[char] {
        &self.shown
    }

    /// Symbol on screen right now. Each symbol stays up until the next one
    /// replaces it. `None` before the first symbol, after the reveal, or when
    /// visual feedback is off.
    #[must_use]
    pub fn display_symbol(&self) -> Option<char> {
        self.display
    }

    /// Length of the current trial, if an engine exists.
    #[must_use]
    pub fn current_length(&self) -> Option<usize> {
        self.engine.as_ref().map(SequenceEngine::length)
    }

    /// Length the next `start` will play.
    #[must_use]
    pub fn next_length(&self) -> usize {
        match (&self.engine, self.next) {
            (None, _) => self.settings.starting_length(),
            (Some(engine), NextTrial::Advance) => engine.length() + 1,
            (Some(engine), NextTrial::Retreat) => engine.retreat_length(),
            (Some(engine), NextTrial::Fresh | NextTrial::Replay) => engine.length(),
        }
    }

    /// Fraction for the progress bar: symbols revealed while presenting,
    /// symbols entered while awaiting input.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let ratio = |done: usize, total: usize| {
            if total == 0 {
                0.0
            } else {
                done as f64 / total as f64
            }
        };
        match self.phase {
            Phase::Presenting => self
                .reveal
                .progress()
                .map_or(0.0, |(shown, total)| ratio(shown, total)),
            Phase::AwaitingInput => self
                .trial
                .as_ref()
                .map_or(0.0, |t| ratio(t.position(), t.len())),
            Phase::Success => 1.0,
            Phase::Idle | Phase::Failure => 0.0,
        }
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    // ========================================================================
    // Trial flow
    // ========================================================================

    /// Start the next trial: a fresh engine, or advance/retreat/reshuffle the
    /// existing one depending on how the last trial ended. Ignored while a
    /// trial is running or the settings panel is open.
    pub fn start(&mut self, now: Instant) -> Result<(), InvalidConfigurationError> {
        if self.phase.in_trial() || self.panel.is_some() {
            return Ok(());
        }

        if let Some(engine) = self.engine.as_mut() {
            match self.next {
                NextTrial::Advance => {
                    engine.advance();
                }
                NextTrial::Retreat => {
                    engine.retreat();
                }
                NextTrial::Fresh | NextTrial::Replay => {
                    engine.reshuffle();
                }
            }
        } else {
            let engine = SequenceEngine::with_boxed_rng(
                self.settings.starting_length(),
                self.settings.symbols().clone(),
                (self.rng_factory)(),
            )?;
            info!(
                length = engine.length(),
                mode = %self.settings.mode(),
                "Session started"
            );
            self.engine = Some(engine);
        }

        let Some(engine) = self.engine.as_ref() else {
            return Ok(());
        };
        let sequence = engine.current_sequence();
        let target = engine.target_sequence(self.settings.mode());
        self.begin_trial(sequence, target, now);
        Ok(())
    }

    /// Play the last length again with a new sequence.
    pub fn retry(&mut self, now: Instant) -> Result<(), InvalidConfigurationError> {
        if self.phase.in_trial() || self.panel.is_some() {
            return Ok(());
        }
        if self.engine.is_some() {
            self.next = NextTrial::Replay;
        }
        self.start(now)
    }

    /// Abandon the running trial; the next `start` replays the same length.
    pub fn abort_trial(&mut self) {
        if !self.phase.in_trial() {
            return;
        }
        self.cancel_reveal();
        self.phase = Phase::Idle;
        self.trial = None;
        self.display = None;
        self.next = NextTrial::Replay;
        let length = self.next_length();
        debug!(length, "Trial aborted");
        self.message = StatusMessage::info(format!(
            "Trial abandoned. Press Enter to replay {length} symbols."
        ));
    }

    /// Discard the engine and any pending reveal. The scoreboard is kept.
    pub fn restart(&mut self) {
        self.cancel_reveal();
        self.engine = None;
        self.next = NextTrial::Fresh;
        self.phase = Phase::Idle;
        self.trial = None;
        self.shown.clear();
        self.display = None;
        info!("Session restarted");
        self.message = StatusMessage::info(idle_prompt(&self.settings));
    }

    /// Advance the reveal to `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.phase != Phase::Presenting {
            return;
        }
        for step in self.reveal.poll(now) {
            match step {
                RevealStep::Show { index, symbol } => {
                    debug!(index, "Revealing symbol");
                    self.display = self.settings.visual().then_some(symbol);
                    if self.settings.audio() {
                        self.cues.push(Cue::Symbol(symbol));
                    }
                }
                RevealStep::Finished => {
                    self.ticket = None;
                    self.display = None;
                    self.phase = Phase::AwaitingInput;
                    self.message = StatusMessage::info(format!(
                        "Type the {} symbols {}.",
                        self.shown.len(),
                        mode_hint(self.settings.mode())
                    ));
                }
            }
        }
    }

    /// Feed one keystroke. `None` unless input is being awaited.
    pub fn press(&mut self, key: char) -> Option<KeyOutcome> {
        if self.phase != Phase::AwaitingInput {
            return None;
        }
        let outcome = self.trial.as_mut()?.press(key);
        match outcome {
            KeyOutcome::Correct { .. } => {}
            KeyOutcome::Success => self.finish_success(),
            KeyOutcome::Failure { expected, got } => self.finish_failure(expected, got),
        }
        Some(outcome)
    }

    /// Drain audio cues queued by the reveal.
    pub fn take_cues(&mut self) -> Vec<Cue> {
        mem::take(&mut self.cues)
    }

    fn begin_trial(&mut self, sequence: Vec<char>, target: Vec<char>, now: Instant) {
        let length = sequence.len();
        self.cancel_reveal();
        self.trial = Some(Trial::new(target));
        self.shown.clone_from(&sequence);
        self.ticket = Some(self.reveal.schedule(sequence, self.settings.delay(), now));
        self.phase = Phase::Presenting;
        self.display = None;
        self.message = StatusMessage::info(format!("Watch closely: {length} symbols."));
        debug!(length, "Trial presenting");
        self.tick(now);
    }

    fn finish_success(&mut self) {
        let length = self.shown.len();
        self.scoreboard.record_success(length);
        self.phase = Phase::Success;
        self.next = NextTrial::Advance;
        info!(length, best = self.scoreboard.best(), "Trial succeeded");
        self.message = StatusMessage::success(format!(
            "Correct! Press Enter to try {} symbols.",
            length + 1
        ));
    }

    fn finish_failure(&mut self, expected: char, got: char) {
        let length = self.shown.len();
        self.scoreboard.record_miss();
        self.phase = Phase::Failure;
        self.next = NextTrial::Retreat;
        info!(
            length,
            %expected,
            %got,
            misses = self.scoreboard.misses(),
            "Trial failed"
        );

        let mut text = format!("The sequence was {}", spaced(&self.shown));
        if self.settings.mode() != Mode::Default
            && let Some(trial) = self.trial.as_ref()
        {
            text.push_str(&format!(
                ", you should have entered {}",
                spaced(trial.target())
            ));
        }
        let next = self.next_length();
        text.push_str(&format!(". Press Enter to continue with {next} symbols"));
        if next != length {
            text.push_str(&format!(", or r to retry {length}"));
        }
        text.push('.');
        self.message = StatusMessage::failure(text);
    }

    fn cancel_reveal(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.reveal.cancel(ticket);
        }
    }

    // ========================================================================
    // Settings
    // ========================================================================

    #[must_use]
    pub fn can_edit_settings(&self) -> bool {
        !self.phase.in_trial()
    }

    /// Returns `false` if the change was rejected (zero delay or a trial is running).
    pub fn set_delay(&mut self, delay: Duration) -> bool {
        if !self.can_edit_settings() {
            return false;
        }
        self.settings.set_delay(delay).is_ok()
    }

    /// Takes effect at the next start: the current engine is discarded.
    pub fn set_starting_length(&mut self, starting_length: usize) -> bool {
        if !self.can_edit_settings() || self.settings.set_starting_length(starting_length).is_err()
        {
            return false;
        }
        self.engine = None;
        self.next = NextTrial::Fresh;
        if self.phase.is_terminal() {
            self.phase = Phase::Idle;
        }
        true
    }

    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if !self.can_edit_settings() {
            return false;
        }
        self.settings.set_mode(mode);
        true
    }

    /// Select a mode by name, failing for anything that is not a recognised key.
    pub fn set_mode_named(&mut self, name: &str) -> Result<bool, InvalidModeError> {
        let mode = Mode::parse(name)?;
        Ok(self.set_mode(mode))
    }

    pub fn toggle_audio(&mut self) -> bool {
        if !self.can_edit_settings() {
            return false;
        }
        let audio = !self.settings.audio();
        self.settings.set_audio(audio);
        true
    }

    pub fn toggle_visual(&mut self) -> bool {
        if !self.can_edit_settings() {
            return false;
        }
        let visual = !self.settings.visual();
        self.settings.set_visual(visual);
        true
    }

    // ========================================================================
    // Settings panel
    // ========================================================================

    #[must_use]
    pub fn settings_panel(&self) -> Option<&SettingsPanel> {
        self.panel.as_ref()
    }

    pub fn open_settings(&mut self) {
        if self.can_edit_settings() && self.panel.is_none() {
            self.panel = Some(SettingsPanel::default());
        }
    }

    pub fn close_settings(&mut self) {
        if self.panel.take().is_some() && !self.phase.is_terminal() {
            self.message = StatusMessage::info(idle_prompt_for(&self.settings, self.next_length()));
        }
    }

    pub fn settings_move_up(&mut self) {
        if let Some(panel) = self.panel.as_mut() {
            panel.move_up();
        }
    }

    pub fn settings_move_down(&mut self) {
        if let Some(panel) = self.panel.as_mut() {
            panel.move_down();
        }
    }

    /// Left/Right on the selected row.
    pub fn settings_adjust(&mut self, forward: bool) {
        let Some(row) = self.panel.as_ref().map(SettingsPanel::selected_row) else {
            return;
        };
        let changed = match row {
            SettingsRow::Delay => {
                let current = self.settings.delay();
                let next = if forward {
                    current.saturating_add(DELAY_STEP).min(MAX_DELAY)
                } else {
                    current.saturating_sub(DELAY_STEP).max(MIN_DELAY)
                };
                next != current && self.set_delay(next)
            }
            SettingsRow::StartingLength => {
                let current = self.settings.starting_length();
                let next = if forward {
                    (current + 1).min(MAX_STARTING_LENGTH)
                } else {
                    current.saturating_sub(1).max(1)
                };
                next != current && self.set_starting_length(next)
            }
            SettingsRow::Mode => {
                let mode = self.settings.mode();
                let next = if forward {
                    mode.cycle()
                } else {
                    mode.cycle_back()
                };
                self.set_mode(next)
            }
            SettingsRow::Audio => self.toggle_audio(),
            SettingsRow::Visual => self.toggle_visual(),
        };
        if changed && let Some(panel) = self.panel.as_mut() {
            panel.mark_dirty();
        }
    }

    /// Enter/Space on the selected row.
    pub fn settings_activate(&mut self) {
        let Some(row) = self.panel.as_ref().map(SettingsPanel::selected_row) else {
            return;
        };
        match row {
            SettingsRow::Mode | SettingsRow::Audio | SettingsRow::Visual => {
                self.settings_adjust(true);
            }
            SettingsRow::Delay | SettingsRow::StartingLength => {}
        }
    }

    /// Write the current settings to the config file.
    pub fn save_settings(&mut self) -> Result<PathBuf, ConfigError> {
        let result = match self.config_path.clone() {
            Some(path) => self.settings.persist_to(&path).map(|()| path),
            None => self.settings.persist(),
        };
        match &result {
            Ok(path) => {
                if let Some(panel) = self.panel.as_mut() {
                    panel.mark_saved();
                }
                self.message =
                    StatusMessage::success(format!("Settings saved to {}.", path.display()));
            }
            Err(err) => {
                warn!("Failed to save settings: {err}");
                self.message = StatusMessage::failure(format!("Could not save settings: {err}"));
            }
        }
        result
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("settings", &self.settings)
            .field("phase", &self.phase)
            .field("next", &self.next)
            .field("engine", &self.engine)
            .field("scoreboard", &self.scoreboard)
            .finish_non_exhaustive()
    }
}

fn idle_prompt(settings: &Settings) -> String {
    idle_prompt_for(settings, settings.starting_length())
}

fn idle_prompt_for(settings: &Settings, length: usize) -> String {
    format!(
        "Press Enter to start with {length} symbols ({} mode).",
        settings.mode().display_name().to_ascii_lowercase()
    )
}

fn mode_hint(mode: Mode) -> &'static str {
    match mode {
        Mode::Default => "in the order shown",
        Mode::Reversed => "in reverse order",
        Mode::Ordered => "sorted from lowest to highest",
    }
}
