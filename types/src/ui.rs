//! UI state types for the TUI layer.
//!
//! Pure data, no ratatui dependency.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
}
