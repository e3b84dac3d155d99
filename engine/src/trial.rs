//! Keystroke matching for one trial.
//!
//! First mismatch ends the trial: no partial credit, no backtracking.

/// Where a trial is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No trial running. Waiting for the player to start one.
    #[default]
    Idle,
    /// Symbols are being revealed; input is disabled.
    Presenting,
    /// Reveal finished; keystrokes are matched one at a time.
    AwaitingInput,
    Success,
    Failure,
}

impl Phase {
    /// Presenting or awaiting input.
    #[must_use]
    pub const fn in_trial(self) -> bool {
        matches!(self, Phase::Presenting | Phase::AwaitingInput)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::Success | Phase::Failure)
    }
}

/// Result of feeding one keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Matched; `position` symbols have been entered correctly so far.
    Correct { position: usize },
    /// Matched the final symbol.
    Success,
    /// Mismatch at the cursor.
    Failure { expected: char, got: char },
}

impl KeyOutcome {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, KeyOutcome::Success | KeyOutcome::Failure { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Trial {
    target: Vec<char>,
    position: usize,
    finished: Option<KeyOutcome>,
}

impl Trial {
    #[must_use]
    pub fn new(target: Vec<char>) -> Self {
        Self {
            target,
            position: 0,
            finished: None,
        }
    }

    /// Match one keystroke against the cursor. Once the trial has ended, the
    /// terminal outcome is returned again and nothing changes.
    pub fn press(&mut self, key: char) -> KeyOutcome {
        if let Some(outcome) = self.finished {
            return outcome;
        }

        let Some(&expected) = self.target.get(self.position) else {
            // Zero-length target: nothing to type.
            self.finished = Some(KeyOutcome::Success);
            return KeyOutcome::Success;
        };

        if key != expected {
            let outcome = KeyOutcome::Failure { expected, got: key };
            self.finished = Some(outcome);
            return outcome;
        }

        self.position += 1;
        if self.position == self.target.len() {
            self.finished = Some(KeyOutcome::Success);
            KeyOutcome::Success
        } else {
            KeyOutcome::Correct {
                position: self.position,
            }
        }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.target.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    #[must_use]
    pub fn target(&self) -> &[char] {
        &self.target
    }

    /// Symbols entered correctly so far.
    #[must_use]
    pub fn entered(&self) -> &[char] {
        &self.target[..self.position]
    }

    #[must_use]
    pub fn outcome(&self) -> Option<KeyOutcome> {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_target_succeeds_on_last_key() {
        let mut trial = Trial::new(vec!['2', '1', '3']);
        assert_eq!(trial.press('2'), KeyOutcome::Correct { position: 1 });
        assert_eq!(trial.press('1'), KeyOutcome::Correct { position: 2 });
        assert_eq!(trial.press('3'), KeyOutcome::Success);
        assert_eq!(trial.position(), 3);
        assert_eq!(trial.outcome(), Some(KeyOutcome::Success));
    }

    #[test]
    fn first_mismatch_fails_immediately() {
        let mut trial = Trial::new(vec!['5', '2']);
        assert_eq!(
            trial.press('2'),
            KeyOutcome::Failure {
                expected: '5',
                got: '2'
            }
        );
        assert_eq!(trial.position(), 0);
    }

    #[test]
    fn presses_after_end_are_ignored() {
        let mut trial = Trial::new(vec!['5', '2']);
        trial.press('1');
        assert!(trial.press('5').is_terminal());
        assert_eq!(trial.position(), 0);

        let mut done = Trial::new(vec!['4']);
        assert_eq!(done.press('4'), KeyOutcome::Success);
        assert_eq!(done.press('9'), KeyOutcome::Success);
        assert_eq!(done.position(), 1);
    }

    #[test]
    fn entered_tracks_cursor() {
        let mut trial = Trial::new(vec!['1', '1', '8']);
        trial.press('1');
        trial.press('1');
        assert_eq!(trial.entered(), &['1', '1']);
        assert_eq!(trial.len(), 3);
    }

    #[test]
    fn phase_helpers() {
        assert!(Phase::Presenting.in_trial());
        assert!(Phase::AwaitingInput.in_trial());
        assert!(!Phase::Idle.in_trial());
        assert!(Phase::Failure.is_terminal());
        assert!(!Phase::Presenting.is_terminal());
    }
}
