//! Digit span CLI - Binary entry point and terminal session management.
//!
//! The CLI bridges [`span_engine`] (session state) and [`span_tui`] (rendering),
//! providing RAII-based terminal management with guaranteed cleanup.
//!
//! # Event Loop
//!
//! A fixed 8ms render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`span_tui::InputPump`])
//! 3. Advance the reveal (`session.tick(now)`)
//! 4. Ring the bell for queued audio cues
//! 5. Render frame

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Stdout, Write, stdout},
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use span_engine::{Cue, Session, Settings, UiOptions, config_path, load_settings};
use span_tui::{BELL, InputPump, draw, handle_events};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: drop logs rather than write over the TUI.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: next to the config file (~/.digit-span/logs/digit-span.log)
    if let Some(path) = config_path()
        && let Some(config_dir) = path.parent()
    {
        candidates.push(config_dir.join("logs").join("digit-span.log"));
    }

    // Fallback: ./.digit-span/logs/digit-span.log
    candidates.push(
        PathBuf::from(".digit-span")
            .join("logs")
            .join("digit-span.log"),
    );

    candidates
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Raw mode and the alternate screen are restored even after panics or
/// early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }

        match Terminal::new(CrosstermBackend::new(out)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen);
                Err(err.into())
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn build_session() -> Session {
    let (settings, ui_options) = match load_settings() {
        Ok(loaded) => loaded,
        Err(err) => {
            tracing::warn!("Using default settings: {err}");
            (Settings::default(), UiOptions::default())
        }
    };
    tracing::info!(
        delay_ms = settings.delay().as_millis() as u64,
        starting_length = settings.starting_length(),
        mode = %settings.mode(),
        "Settings loaded"
    );
    Session::new(settings).with_ui_options(ui_options)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut session = build_session();

    let result = {
        let mut terminal = TerminalSession::new()?;
        run_app(&mut terminal.terminal, &mut session).await
    };

    if let Err(err) = &result {
        eprintln!("Error: {err:?}");
    }

    let score = session.scoreboard();
    tracing::info!(
        best = score.best(),
        successes = score.successes(),
        misses = score.misses(),
        "Session ended"
    );

    result
}

const FRAME_DURATION: Duration = Duration::from_millis(8);

async fn run_app<B>(terminal: &mut Terminal<B>, session: &mut Session) -> Result<()>
where
    B: Backend + Write,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        let quit_now = match handle_events(session, &mut input) {
            Ok(q) => q,
            Err(e) => break Err(e),
        };
        if quit_now {
            break Ok(());
        }

        session.tick(Instant::now());

        if let Err(e) = ring_cues(terminal.backend_mut(), session) {
            break Err(e.into());
        }

        if let Err(e) = terminal.draw(|frame| draw(frame, session)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}

fn ring_cues<W: Write>(out: &mut W, session: &mut Session) -> io::Result<()> {
    let cues = session.take_cues();
    if cues.is_empty() {
        return Ok(());
    }
    for Cue::Symbol(_) in cues {
        out.write_all(BELL.as_bytes())?;
    }
    out.flush()
}
