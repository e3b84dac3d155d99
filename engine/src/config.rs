//! Configuration loading, validation and persistence.
//!
//! Raw TOML structs (all `Option`) stay at the parse boundary and are resolved
//! into [`Settings`], whose existence is the proof of validity.
//!
//! ```toml
//! [game]
//! delay_ms = 1000
//! starting_length = 4
//! mode = "reversed"
//! audio = true
//! visual = true
//! symbols = "0123456789"
//!
//! [app]
//! ascii_only = false
//! high_contrast = false
//! ```

use serde::Deserialize;
use std::{
    env, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use span_types::{InvalidConfigurationError, Mode, SymbolSet, UiOptions};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_STARTING_LENGTH: usize = 4;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "DIGIT_SPAN_CONFIG";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("delay must be greater than zero")]
    ZeroDelay,
    #[error(transparent)]
    Invalid(#[from] InvalidConfigurationError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config at {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        source: SettingsError,
    },
    #[error("failed to write config at {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("could not determine config path")]
    NoConfigPath,
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. }
            | ConfigError::Write { path, .. } => Some(path),
            ConfigError::NoConfigPath => None,
        }
    }
}

// ============================================================================
// Raw file format
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SpanConfig {
    pub game: Option<GameConfig>,
    pub app: Option<AppConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GameConfig {
    /// Time each symbol is held on screen, in milliseconds.
    pub delay_ms: Option<u64>,
    pub starting_length: Option<usize>,
    /// "default", "reversed" or "ordered".
    pub mode: Option<Mode>,
    pub audio: Option<bool>,
    pub visual: Option<bool>,
    /// Allowed symbols as one string, e.g. "0123456789".
    pub symbols: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
}

impl SpanConfig {
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded config");
                Ok(config)
            }
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// Resolve the `[game]` table, filling gaps with defaults.
    pub fn settings(&self) -> Result<Settings, SettingsError> {
        let mut settings = Settings::default();
        let Some(game) = self.game.as_ref() else {
            return Ok(settings);
        };
        if let Some(delay_ms) = game.delay_ms {
            settings.set_delay(Duration::from_millis(delay_ms))?;
        }
        if let Some(starting_length) = game.starting_length {
            settings.set_starting_length(starting_length)?;
        }
        if let Some(mode) = game.mode {
            settings.set_mode(mode);
        }
        if let Some(audio) = game.audio {
            settings.set_audio(audio);
        }
        if let Some(visual) = game.visual {
            settings.set_visual(visual);
        }
        if let Some(symbols) = game.symbols.as_deref() {
            settings.set_symbols(SymbolSet::try_from(symbols)?);
        }
        Ok(settings)
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.app
            .as_ref()
            .map(|app| UiOptions {
                ascii_only: app.ascii_only,
                high_contrast: app.high_contrast,
            })
            .unwrap_or_default()
    }
}

/// `$DIGIT_SPAN_CONFIG` if set, otherwise `~/.digit-span/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(raw) = env::var_os(CONFIG_PATH_ENV)
        && !raw.is_empty()
    {
        return Some(PathBuf::from(raw));
    }
    dirs::home_dir().map(|home| home.join(".digit-span").join("config.toml"))
}

/// Load settings and UI options from the default location, falling back to
/// defaults when there is no config path or no file.
pub fn load_settings() -> Result<(Settings, UiOptions), ConfigError> {
    match config_path() {
        Some(path) => load_settings_from(&path),
        None => Ok((Settings::default(), UiOptions::default())),
    }
}

/// Like [`load_settings`] for an explicit path. A missing file yields defaults.
pub fn load_settings_from(path: &Path) -> Result<(Settings, UiOptions), ConfigError> {
    if !path.exists() {
        return Ok((Settings::default(), UiOptions::default()));
    }
    let config = SpanConfig::load_from(path)?;
    let settings = config.settings().map_err(|source| ConfigError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((settings, config.ui_options()))
}

// ============================================================================
// Resolved settings
// ============================================================================

/// Validated player options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    delay: Duration,
    starting_length: usize,
    mode: Mode,
    audio: bool,
    visual: bool,
    symbols: SymbolSet,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            starting_length: DEFAULT_STARTING_LENGTH,
            mode: Mode::Default,
            audio: true,
            visual: true,
            symbols: SymbolSet::digits(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn starting_length(&self) -> usize {
        self.starting_length
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn audio(&self) -> bool {
        self.audio
    }

    #[must_use]
    pub fn visual(&self) -> bool {
        self.visual
    }

    #[must_use]
    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    pub fn set_delay(&mut self, delay: Duration) -> Result<(), SettingsError> {
        if delay.is_zero() {
            return Err(SettingsError::ZeroDelay);
        }
        self.delay = delay;
        Ok(())
    }

    pub fn set_starting_length(&mut self, starting_length: usize) -> Result<(), SettingsError> {
        if starting_length == 0 {
            return Err(InvalidConfigurationError::ZeroLength.into());
        }
        self.starting_length = starting_length;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn set_audio(&mut self, audio: bool) {
        self.audio = audio;
    }

    pub fn set_visual(&mut self, visual: bool) {
        self.visual = visual;
    }

    pub fn set_symbols(&mut self, symbols: SymbolSet) {
        self.symbols = symbols;
    }

    /// Write the `[game]` table to the default config path.
    pub fn persist(&self) -> Result<PathBuf, ConfigError> {
        let path = config_path().ok_or(ConfigError::NoConfigPath)?;
        self.persist_to(&path)?;
        Ok(path)
    }

    /// Write the `[game]` table into `path`.
    ///
    /// Uses `toml_edit` so comments and unrelated tables survive. Creates the
    /// file and parent directory if they don't exist.
    pub fn persist_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source: io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = if path.exists() {
            fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            String::new()
        };

        let mut doc = content
            .parse::<toml_edit::DocumentMut>()
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        if !doc.contains_key("game") {
            doc["game"] = toml_edit::Item::Table(toml_edit::Table::new());
        }

        let delay_ms = i64::try_from(self.delay.as_millis()).unwrap_or(i64::MAX);
        let starting_length = i64::try_from(self.starting_length).unwrap_or(i64::MAX);
        doc["game"]["delay_ms"] = toml_edit::value(delay_ms);
        doc["game"]["starting_length"] = toml_edit::value(starting_length);
        doc["game"]["mode"] = toml_edit::value(self.mode.as_str());
        doc["game"]["audio"] = toml_edit::value(self.audio);
        doc["game"]["visual"] = toml_edit::value(self.visual);
        doc["game"]["symbols"] = toml_edit::value(self.symbols.to_string());

        write_atomically(path, doc.to_string().as_bytes()).map_err(write_err)?;
        tracing::info!(path = %path.display(), "Saved settings");
        Ok(())
    }
}

/// Temp file + rename in the destination directory.
fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
