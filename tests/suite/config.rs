//! Config file loading and persistence.

use std::fs;
use std::time::Duration;

use span_engine::{ConfigError, Mode, Settings, SpanConfig};
use tempfile::tempdir;

#[test]
fn load_from_resolves_game_and_app_tables() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[game]
delay_ms = 400
starting_length = 5
mode = "ORDERED"
visual = false

[app]
ascii_only = true
"#,
    )
    .unwrap();

    let config = SpanConfig::load_from(&path).expect("config loads");
    let settings = config.settings().expect("valid settings");
    assert_eq!(settings.delay(), Duration::from_millis(400));
    assert_eq!(settings.starting_length(), 5);
    assert_eq!(settings.mode(), Mode::Ordered);
    assert!(settings.audio());
    assert!(!settings.visual());

    let ui = config.ui_options();
    assert!(ui.ascii_only);
    assert!(!ui.high_contrast);
}

#[test]
fn unknown_mode_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[game]\nmode = \"sideways\"\n").unwrap();

    let err = SpanConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    assert_eq!(err.path(), Some(path.as_path()));
}

#[test]
fn zero_values_are_rejected_at_resolution() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[game]\nstarting_length = 0\n").unwrap();
    let config = SpanConfig::load_from(&path).unwrap();
    assert!(config.settings().is_err());

    fs::write(&path, "[game]\ndelay_ms = 0\n").unwrap();
    let config = SpanConfig::load_from(&path).unwrap();
    assert!(config.settings().is_err());
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempdir().unwrap();
    let err = SpanConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn persist_keeps_unrelated_content_and_reloads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "# my settings\n[app]\nhigh_contrast = true\n\n[game]\ndelay_ms = 900\n",
    )
    .unwrap();

    let mut settings = Settings::default();
    settings.set_delay(Duration::from_millis(650)).unwrap();
    settings.set_starting_length(7).unwrap();
    settings.set_mode(Mode::Reversed);
    settings.set_audio(false);
    settings.persist_to(&path).expect("persist");

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("# my settings"), "{written}");
    assert!(written.contains("high_contrast = true"), "{written}");

    let reloaded = SpanConfig::load_from(&path).unwrap();
    assert_eq!(reloaded.settings().unwrap(), settings);
    assert!(reloaded.ui_options().high_contrast);
}
