//! Key handling driven through `span_tui::dispatch_event`.

use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use span_engine::{Mode, Phase, Session, Settings};
use span_tui::dispatch_event;

use crate::common::{after_reveal, char_key, key, scripted_session};

fn send(session: &mut Session, event: Event, now: Instant) -> bool {
    dispatch_event(session, event, now).expect("dispatch")
}

#[test]
fn typing_the_sequence_completes_a_trial() {
    let mut session = scripted_session(3, Mode::Default, vec![4, 0, 8]);
    let start = Instant::now();
    send(&mut session, key(KeyCode::Enter), start);
    session.tick(after_reveal(start, 3));

    for c in ['4', '0', '8'] {
        send(&mut session, char_key(c), start);
    }
    assert_eq!(session.phase(), Phase::Success);
    assert!(session.message().text().contains("4 symbols"));
}

#[test]
fn retry_keys_replay_last_length() {
    for retry in ['r', '+', '-', '*', '/'] {
        let mut session = scripted_session(3, Mode::Default, vec![1]);
        let start = Instant::now();
        send(&mut session, char_key(' '), start);
        session.tick(after_reveal(start, 3));
        for _ in 0..3 {
            send(&mut session, char_key('1'), start);
        }
        assert_eq!(session.next_length(), 4);

        send(&mut session, char_key(retry), start);
        assert_eq!(session.phase(), Phase::Presenting, "retry key {retry}");
        assert_eq!(session.current_length(), Some(3), "retry key {retry}");
    }
}

#[test]
fn symbol_keys_are_answers_not_commands_while_awaiting_input() {
    let mut session = scripted_session(2, Mode::Default, vec![3]);
    let start = Instant::now();
    send(&mut session, key(KeyCode::Enter), start);
    session.tick(after_reveal(start, 2));

    assert!(!send(&mut session, char_key('q'), start));
    assert_eq!(session.phase(), Phase::Failure);
    assert!(!session.should_quit());
}

#[test]
fn escape_abandons_trial_and_q_quits_afterwards() {
    let mut session = Session::new(Settings::default());
    let start = Instant::now();
    send(&mut session, key(KeyCode::Enter), start);
    send(&mut session, key(KeyCode::Esc), start);
    assert_eq!(session.phase(), Phase::Idle);
    assert!(!session.should_quit());

    assert!(send(&mut session, char_key('q'), start));
}

#[test]
fn ctrl_c_quits_mid_trial() {
    let mut session = Session::new(Settings::default());
    let start = Instant::now();
    send(&mut session, key(KeyCode::Enter), start);
    session.tick(after_reveal(start, 4));
    let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(send(&mut session, ctrl_c, start));
}

#[test]
fn settings_panel_navigation_and_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("config.toml");
    let mut session = Session::new(Settings::default()).with_config_path(path.clone());
    let now = Instant::now();

    send(&mut session, char_key('s'), now);
    send(&mut session, key(KeyCode::Right), now);
    send(&mut session, key(KeyCode::Right), now);
    send(&mut session, char_key('j'), now);
    send(&mut session, key(KeyCode::Left), now);
    send(&mut session, char_key('j'), now);
    send(&mut session, key(KeyCode::Right), now);
    assert_eq!(session.settings().delay(), Duration::from_millis(1200));
    assert_eq!(session.settings().starting_length(), 3);
    assert_eq!(session.settings().mode(), Mode::Reversed);

    send(&mut session, char_key('w'), now);
    let saved = std::fs::read_to_string(&path).expect("config written");
    assert!(saved.contains("delay_ms = 1200"), "{saved}");
    assert!(saved.contains("mode = \"reversed\""), "{saved}");

    send(&mut session, char_key('s'), now);
    assert!(session.settings_panel().is_none());
    send(&mut session, key(KeyCode::Enter), now);
    assert_eq!(session.current_length(), Some(3));
}

#[test]
fn n_restarts_from_starting_length() {
    let mut session = scripted_session(2, Mode::Default, vec![6]);
    let start = Instant::now();
    send(&mut session, key(KeyCode::Enter), start);
    session.tick(after_reveal(start, 2));
    send(&mut session, char_key('6'), start);
    send(&mut session, char_key('6'), start);
    assert_eq!(session.next_length(), 3);

    send(&mut session, char_key('n'), start);
    assert!(session.engine().is_none());
    assert_eq!(session.next_length(), 2);
    assert_eq!(session.scoreboard().successes(), 1);
}
