//! Core domain types for digit span.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod ui;
pub use ui::UiOptions;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// A mode name that is not one of `default`, `reversed` or `ordered`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid mode '{mode}'")]
pub struct InvalidModeError {
    pub mode: String,
}

/// Rejected engine construction parameters.
///
/// An engine is never created in an invalid state; these are returned instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidConfigurationError {
    #[error("starting length must be at least 1")]
    ZeroLength,
    #[error("symbol set must not be empty")]
    EmptySymbols,
    #[error("symbol '{0}' appears more than once")]
    DuplicateSymbol(char),
}

// ============================================================================
// Mode
// ============================================================================

/// How the shown sequence maps to the input the player must type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mode {
    /// Same order as shown.
    #[default]
    Default,
    /// Shown order reversed.
    Reversed,
    /// Sorted ascending by symbol.
    Ordered,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Default, Mode::Reversed, Mode::Ordered];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Default => "default",
            Mode::Reversed => "reversed",
            Mode::Ordered => "ordered",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Mode::Default => "Forward",
            Mode::Reversed => "Reversed",
            Mode::Ordered => "Ordered",
        }
    }

    /// Parse a mode name. Trimmed and case-insensitive; anything that is not a
    /// recognised key fails.
    pub fn parse(raw: &str) -> Result<Self, InvalidModeError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Mode::Default),
            "reversed" => Ok(Mode::Reversed),
            "ordered" => Ok(Mode::Ordered),
            _ => Err(InvalidModeError {
                mode: raw.to_string(),
            }),
        }
    }

    /// Next mode in `ALL`, wrapping around.
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Mode::Default => Mode::Reversed,
            Mode::Reversed => Mode::Ordered,
            Mode::Ordered => Mode::Default,
        }
    }

    #[must_use]
    pub const fn cycle_back(self) -> Self {
        match self {
            Mode::Default => Mode::Ordered,
            Mode::Reversed => Mode::Default,
            Mode::Ordered => Mode::Reversed,
        }
    }

    /// Derive the expected input from a shown sequence.
    #[must_use]
    pub fn apply(self, shown: &[char]) -> Vec<char> {
        let mut target = shown.to_vec();
        match self {
            Mode::Default => {}
            Mode::Reversed => target.reverse(),
            Mode::Ordered => target.sort_unstable(),
        }
        target
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = InvalidModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Mode {
    type Error = InvalidModeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Mode> for String {
    fn from(value: Mode) -> Self {
        value.as_str().to_string()
    }
}

// ============================================================================
// SymbolSet
// ============================================================================

/// Ordered, non-empty, duplicate-free set of single-character symbols.
///
/// Existence of a value is the proof of its validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SymbolSet(Vec<char>);

impl SymbolSet {
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Result<Self, InvalidConfigurationError> {
        let mut out: Vec<char> = Vec::new();
        for symbol in symbols {
            if out.contains(&symbol) {
                return Err(InvalidConfigurationError::DuplicateSymbol(symbol));
            }
            out.push(symbol);
        }
        if out.is_empty() {
            return Err(InvalidConfigurationError::EmptySymbols);
        }
        Ok(Self(out))
    }

    /// The ten decimal digits `'0'..='9'`.
    #[must_use]
    pub fn digits() -> Self {
        Self(('0'..='9').collect())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[char] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, symbol: char) -> bool {
        self.0.contains(&symbol)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<char> {
        self.0.get(index).copied()
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::digits()
    }
}

impl TryFrom<String> for SymbolSet {
    type Error = InvalidConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value.chars())
    }
}

impl TryFrom<&str> for SymbolSet {
    type Error = InvalidConfigurationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.chars())
    }
}

impl From<SymbolSet> for String {
    fn from(value: SymbolSet) -> Self {
        value.0.into_iter().collect()
    }
}

impl fmt::Display for SymbolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.0 {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

/// Render a sequence with single spaces between symbols, e.g. `3 1 2`.
#[must_use]
pub fn spaced(sequence: &[char]) -> String {
    let mut out = String::with_capacity(sequence.len() * 2);
    for (i, symbol) in sequence.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(*symbol);
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
