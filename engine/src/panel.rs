//! Settings panel selection state.

/// Editable rows, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    Delay,
    StartingLength,
    Mode,
    Audio,
    Visual,
}

impl SettingsRow {
    pub const ALL: [SettingsRow; 5] = [
        SettingsRow::Delay,
        SettingsRow::StartingLength,
        SettingsRow::Mode,
        SettingsRow::Audio,
        SettingsRow::Visual,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            SettingsRow::Delay => "Delay",
            SettingsRow::StartingLength => "Starting length",
            SettingsRow::Mode => "Mode",
            SettingsRow::Audio => "Audio cue",
            SettingsRow::Visual => "Show symbols",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsPanel {
    selected: usize,
    /// Edited since the last save.
    dirty: bool,
}

impl SettingsPanel {
    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn selected_row(&self) -> SettingsRow {
        SettingsRow::ALL[self.selected.min(SettingsRow::ALL.len() - 1)]
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < SettingsRow::ALL.len() {
            self.selected += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_clamped() {
        let mut panel = SettingsPanel::default();
        panel.move_up();
        assert_eq!(panel.selected_row(), SettingsRow::Delay);
        for _ in 0..10 {
            panel.move_down();
        }
        assert_eq!(panel.selected_row(), SettingsRow::Visual);
    }
}
