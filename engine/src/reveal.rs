//! Timed, cancellable reveal of a sequence.
//!
//! The scheduler is driven by the caller's clock (`poll(now)` from the frame
//! loop) instead of sleeping tasks, so discarding a reveal is just dropping its
//! ticket's state. Symbol `i` is due at `start + i * delay`; the reveal
//! finishes one further `delay` after the last symbol.

use std::time::{Duration, Instant};

use tracing::debug;

/// Cancellation token for one scheduled reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealTicket(u64);

impl RevealTicket {
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    Show {
        index: usize,
        symbol: char,
    },
    /// Every symbol has been shown and held for one delay.
    Finished,
}

#[derive(Debug)]
struct ScheduledReveal {
    ticket: RevealTicket,
    symbols: Vec<char>,
    delay: Duration,
    started_at: Instant,
    /// Symbols already emitted.
    shown: usize,
}

impl ScheduledReveal {
    fn due_at(&self, step: usize) -> Instant {
        let step = u32::try_from(step).unwrap_or(u32::MAX);
        self.started_at + self.delay.saturating_mul(step)
    }
}

/// Holds at most one pending reveal.
#[derive(Debug, Default)]
pub struct RevealScheduler {
    next_id: u64,
    active: Option<ScheduledReveal>,
}

impl RevealScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a reveal starting at `now`. Replaces any pending reveal; the
    /// previous ticket becomes stale.
    pub fn schedule(&mut self, symbols: Vec<char>, delay: Duration, now: Instant) -> RevealTicket {
        self.next_id += 1;
        let ticket = RevealTicket(self.next_id);
        if let Some(previous) = self.active.take() {
            debug!(
                previous = previous.ticket.id(),
                next = ticket.id(),
                "Replacing pending reveal"
            );
        }
        self.active = Some(ScheduledReveal {
            ticket,
            symbols,
            delay,
            started_at: now,
            shown: 0,
        });
        ticket
    }

    /// Discard the reveal identified by `ticket`. Returns `false` for a stale
    /// ticket (already finished, cancelled, or replaced).
    pub fn cancel(&mut self, ticket: RevealTicket) -> bool {
        if self.active.as_ref().is_some_and(|r| r.ticket == ticket) {
            self.active = None;
            debug!(ticket = ticket.id(), "Reveal cancelled");
            true
        } else {
            false
        }
    }

    /// Steps that have come due by `now`, in order. Emitting `Finished` retires
    /// the reveal.
    pub fn poll(&mut self, now: Instant) -> Vec<RevealStep> {
        let mut steps = Vec::new();
        let Some(reveal) = self.active.as_mut() else {
            return steps;
        };

        while reveal.shown < reveal.symbols.len() && now >= reveal.due_at(reveal.shown) {
            steps.push(RevealStep::Show {
                index: reveal.shown,
                symbol: reveal.symbols[reveal.shown],
            });
            reveal.shown += 1;
        }

        if reveal.shown == reveal.symbols.len() && now >= reveal.due_at(reveal.symbols.len()) {
            steps.push(RevealStep::Finished);
            self.active = None;
        }

        steps
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn current_ticket(&self) -> Option<RevealTicket> {
        self.active.as_ref().map(|r| r.ticket)
    }

    /// `(shown, total)` for the pending reveal, `None` when idle.
    #[must_use]
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.active.as_ref().map(|r| (r.shown, r.symbols.len()))
    }
}
