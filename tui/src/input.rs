//! Input handling for the digit span TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::debug;

use span_engine::{Phase, Session};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 256; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

/// Keys that replay the last length after a trial.
const RETRY_KEYS: [char; 5] = ['r', '+', '-', '*', '/'];

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Reads crossterm events on a blocking task and forwards them over a bounded
/// channel, so the frame loop only ever drains without blocking.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so a backpressured send in the input thread unblocks.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if caller exits early; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain queued input into the session. Returns `true` when the app should quit.
pub fn handle_events(session: &mut Session, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        if dispatch_event(session, ev, Instant::now())? {
            return Ok(true);
        }
        processed += 1;
    }
    Ok(session.should_quit())
}

/// Apply one terminal event at time `now`. Returns `true` when the app should quit.
pub fn dispatch_event(session: &mut Session, event: Event, now: Instant) -> Result<bool> {
    if let Event::Key(key) = event {
        // Handle press + repeat events (ignore releases)
        if matches!(key.kind, KeyEventKind::Release) {
            return Ok(session.should_quit());
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            session.request_quit();
            return Ok(true);
        }

        if session.settings_panel().is_some() {
            handle_settings_panel(session, key);
        } else {
            match session.phase() {
                Phase::Presenting => handle_presenting(session, key),
                Phase::AwaitingInput => handle_awaiting_input(session, key),
                Phase::Idle | Phase::Success | Phase::Failure => {
                    handle_between_trials(session, key, now)?;
                }
            }
        }
    }
    Ok(session.should_quit())
}

fn handle_presenting(session: &mut Session, key: KeyEvent) {
    // Input surface is disabled during the reveal.
    if key.code == KeyCode::Esc {
        session.abort_trial();
    }
}

fn handle_awaiting_input(session: &mut Session, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => session.abort_trial(),
        KeyCode::Char(c) => {
            if let Some(outcome) = session.press(c) {
                debug!(?outcome, "Key matched");
            }
        }
        _ => {}
    }
}

fn handle_between_trials(session: &mut Session, key: KeyEvent, now: Instant) -> Result<()> {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => session.start(now)?,
        KeyCode::Char(c) if RETRY_KEYS.contains(&c) => session.retry(now)?,
        KeyCode::Char('n') => session.restart(),
        KeyCode::Char('s') => session.open_settings(),
        KeyCode::Char('q') => session.request_quit(),
        _ => {}
    }
    Ok(())
}

fn handle_settings_panel(session: &mut Session, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('s' | 'q') => session.close_settings(),
        KeyCode::Up | KeyCode::Char('k') => session.settings_move_up(),
        KeyCode::Down | KeyCode::Char('j') => session.settings_move_down(),
        KeyCode::Left | KeyCode::Char('h') => session.settings_adjust(false),
        KeyCode::Right | KeyCode::Char('l') => session.settings_adjust(true),
        KeyCode::Enter | KeyCode::Char(' ') => session.settings_activate(),
        KeyCode::Char('w') => {
            // The session reports the outcome in its status message.
            let _ = session.save_settings();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use span_engine::{Mode, Settings};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn ctrl_c_quits_from_any_phase() {
        let mut session = Session::new(Settings::default());
        session.start(Instant::now()).unwrap();
        let quit = dispatch_event(
            &mut session,
            Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Instant::now(),
        )
        .unwrap();
        assert!(quit);
    }

    #[test]
    fn enter_starts_trial_and_keys_are_ignored_while_presenting() {
        let mut session = Session::new(Settings::default());
        let now = Instant::now();
        dispatch_event(&mut session, key(KeyCode::Enter), now).unwrap();
        assert_eq!(session.phase(), Phase::Presenting);

        dispatch_event(&mut session, key(KeyCode::Char('q')), now).unwrap();
        assert!(!session.should_quit());
        assert_eq!(session.phase(), Phase::Presenting);
    }

    #[test]
    fn settings_panel_keys_edit_settings() {
        let mut session = Session::new(Settings::default());
        let now = Instant::now();
        dispatch_event(&mut session, key(KeyCode::Char('s')), now).unwrap();
        assert!(session.settings_panel().is_some());

        dispatch_event(&mut session, key(KeyCode::Down), now).unwrap();
        dispatch_event(&mut session, key(KeyCode::Down), now).unwrap();
        dispatch_event(&mut session, key(KeyCode::Enter), now).unwrap();
        assert_eq!(session.settings().mode(), Mode::Reversed);

        dispatch_event(&mut session, key(KeyCode::Esc), now).unwrap();
        assert!(session.settings_panel().is_none());
        assert!(!session.should_quit());
    }

    #[test]
    fn release_events_are_ignored() {
        let mut session = Session::new(Settings::default());
        let mut release = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        dispatch_event(&mut session, Event::Key(release), Instant::now()).unwrap();
        assert_eq!(session.phase(), Phase::Idle);
    }
}
