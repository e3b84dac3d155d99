//! End-to-end play through the public engine and session API.

use std::time::Instant;

use span_engine::{KeyOutcome, Mode, Phase, SequenceEngine, SymbolSet};

use crate::common::{DELAY, after_reveal, scripted_session};

#[test]
fn constant_draw_repeats_first_symbol_and_advance_grows() {
    let mut engine = SequenceEngine::with_rng(3, SymbolSet::digits(), |_bound: usize| 0_usize)
        .expect("valid engine");
    assert_eq!(engine.current_sequence(), vec!['0'; 3]);

    let next = engine.advance();
    assert_eq!(engine.length(), 4);
    assert_eq!(next, vec!['0'; 4]);
}

#[test]
fn reversed_trial_succeeds_after_last_correct_key() {
    let mut session = scripted_session(3, Mode::Reversed, vec![3, 1, 2]);
    let start = Instant::now();
    session.start(start).unwrap();
    assert_eq!(session.shown_sequence(), ['3', '1', '2']);

    session.tick(after_reveal(start, 3));
    assert_eq!(session.phase(), Phase::AwaitingInput);

    assert_eq!(
        session.press('2'),
        Some(KeyOutcome::Correct { position: 1 })
    );
    assert_eq!(
        session.press('1'),
        Some(KeyOutcome::Correct { position: 2 })
    );
    assert_eq!(session.phase(), Phase::AwaitingInput);
    assert_eq!(session.press('3'), Some(KeyOutcome::Success));
    assert_eq!(session.phase(), Phase::Success);
}

#[test]
fn wrong_first_key_fails_without_advancing() {
    let mut session = scripted_session(2, Mode::Default, vec![5, 2]);
    let start = Instant::now();
    session.start(start).unwrap();
    session.tick(after_reveal(start, 2));

    assert_eq!(
        session.press('2'),
        Some(KeyOutcome::Failure {
            expected: '5',
            got: '2'
        })
    );
    let trial = session.trial().expect("trial kept after failure");
    assert_eq!(trial.position(), 0);
    assert!(trial.entered().is_empty());
}

#[test]
fn retreat_at_starting_length_keeps_length() {
    let mut engine = SequenceEngine::digits(4).unwrap();
    let sequence = engine.retreat();
    assert_eq!(engine.length(), 4);
    assert_eq!(sequence.len(), 4);
}

#[test]
fn streak_then_miss_walks_length_up_and_back() {
    let mut session = scripted_session(2, Mode::Default, vec![7]);
    let mut now = Instant::now();

    for expected_len in [2, 3, 4] {
        session.start(now).unwrap();
        assert_eq!(session.current_length(), Some(expected_len));
        now = after_reveal(now, expected_len);
        session.tick(now);
        for _ in 0..expected_len {
            session.press('7');
        }
        assert_eq!(session.phase(), Phase::Success);
    }
    assert_eq!(session.scoreboard().best(), 4);
    assert_eq!(session.scoreboard().successes(), 3);

    session.start(now).unwrap();
    now = after_reveal(now, 5);
    session.tick(now);
    session.press('1');
    assert_eq!(session.phase(), Phase::Failure);
    assert_eq!(session.next_length(), 4);

    session.start(now).unwrap();
    assert_eq!(session.current_length(), Some(4));
}

#[test]
fn ordered_mode_expects_sorted_input() {
    let mut session = scripted_session(4, Mode::Ordered, vec![9, 0, 4, 0]);
    let start = Instant::now();
    session.start(start).unwrap();
    session.tick(start + DELAY * 5);

    for key in ['0', '0', '4'] {
        assert!(matches!(
            session.press(key),
            Some(KeyOutcome::Correct { .. })
        ));
    }
    assert_eq!(session.press('9'), Some(KeyOutcome::Success));
}

#[test]
fn restart_mid_reveal_discards_pending_symbols() {
    let mut session = scripted_session(3, Mode::Default, vec![1, 2, 3]);
    let start = Instant::now();
    session.start(start).unwrap();
    assert_eq!(session.display_symbol(), Some('1'));

    session.restart();
    session.tick(start + DELAY * 5);
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.display_symbol(), None);
    assert!(session.engine().is_none());
}
