//! TUI rendering for digit span using ratatui.

mod glyph;
mod input;
mod theme;

pub use glyph::{BIG_HEIGHT, big_symbol};
pub use input::{InputPump, dispatch_event, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use span_engine::{MessageKind, Phase, Session, SettingsPanel, SettingsRow, spaced};

const SETTINGS_WIDTH: u16 = 46;

/// Main draw function
pub fn draw(frame: &mut Frame, session: &Session) {
    let options = session.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(7),    // Stage
            Constraint::Length(1), // Progress
            Constraint::Length(1), // Entered
            Constraint::Length(3), // Message
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    draw_header(frame, session, chunks[0], &palette, &glyphs);
    draw_stage(frame, session, chunks[1], &palette, &glyphs);
    draw_progress(frame, session, chunks[2], &palette, &glyphs);
    draw_entered(frame, session, chunks[3], &palette, &glyphs);
    draw_message(frame, session, chunks[4], &palette);
    draw_key_hints(frame, session, chunks[5], &palette);

    if let Some(panel) = session.settings_panel() {
        draw_settings(frame, session, panel, &palette, &glyphs);
    }
}

fn phase_label(phase: Phase, palette: &Palette) -> (&'static str, Color) {
    match phase {
        Phase::Idle => ("READY", palette.text_secondary),
        Phase::Presenting => ("WATCH", palette.accent),
        Phase::AwaitingInput => ("TYPE", palette.primary),
        Phase::Success => ("CORRECT", palette.success),
        Phase::Failure => ("MISSED", palette.error),
    }
}

fn draw_header(
    frame: &mut Frame,
    session: &Session,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let (label, color) = phase_label(session.phase(), palette);
    let score = session.scoreboard();
    let settings = session.settings();
    let length = session
        .current_length()
        .unwrap_or_else(|| session.next_length());
    let sep = format!(" {} ", glyphs.separator);

    let info = format!(
        "Length {length}{sep}Best {}{sep}Misses {}{sep}{} mode",
        score.best(),
        score.misses(),
        settings.mode().display_name()
    );

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" Digit Span ", styles::title(palette)),
        Span::raw(" "),
        Span::styled(format!(" {label} "), styles::phase_badge(palette, color)),
        Span::raw("  "),
        Span::styled(info, Style::default().fg(palette.text_secondary)),
    ]));
    frame.render_widget(header, area);
}

fn draw_stage(
    frame: &mut Frame,
    session: &Session,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.bg_border))
        .style(Style::default().bg(palette.bg_panel));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = stage_lines(session, palette, glyphs);
    let height = u16::try_from(lines.len()).unwrap_or(inner.height);
    let top = inner.height.saturating_sub(height) / 2;
    let content = Rect {
        x: inner.x,
        y: inner.y + top,
        width: inner.width,
        height: inner.height.saturating_sub(top),
    };
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), content);
}

fn stage_lines(session: &Session, palette: &Palette, glyphs: &Glyphs) -> Vec<Line<'static>> {
    let strong = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(palette.text_muted);

    match session.phase() {
        Phase::Idle => vec![
            Line::from(Span::styled("Ready", strong(palette.text_primary))),
            Line::from(""),
            Line::from(Span::styled(
                format!("Next trial: {} symbols", session.next_length()),
                muted,
            )),
        ],
        Phase::Presenting => match session.display_symbol() {
            Some(symbol) => {
                let accent = Style::default().fg(palette.accent);
                match big_symbol(symbol, glyphs.pixel) {
                    Some(rows) => rows
                        .into_iter()
                        .map(|row| Line::from(Span::styled(row, accent)))
                        .collect(),
                    None => {
                        let line = Span::styled(symbol.to_string(), strong(palette.accent));
                        vec![Line::from(line)]
                    }
                }
            }
            None if !session.settings().visual() => {
                vec![Line::from(Span::styled("Listen...", muted))]
            }
            None => Vec::new(),
        },
        Phase::AwaitingInput => {
            let entered = session
                .trial()
                .map(|t| spaced(t.entered()))
                .unwrap_or_default();
            let text = Style::default().fg(palette.text_primary);
            vec![
                Line::from(Span::styled("...", strong(palette.primary))),
                Line::from(""),
                Line::from(Span::styled(entered, text)),
            ]
        }
        Phase::Success => vec![
            Line::from(Span::styled("Correct", strong(palette.success))),
            Line::from(""),
            Line::from(Span::styled(spaced(session.shown_sequence()), muted)),
        ],
        Phase::Failure => {
            let mut lines = vec![
                Line::from(Span::styled("Missed", strong(palette.error))),
                Line::from(""),
                Line::from(vec![
                    Span::styled("shown    ", muted),
                    Span::styled(
                        spaced(session.shown_sequence()),
                        Style::default().fg(palette.text_primary),
                    ),
                ]),
            ];
            if let Some(trial) = session.trial() {
                lines.push(Line::from(vec![
                    Span::styled("expected ", muted),
                    Span::styled(spaced(trial.target()), Style::default().fg(palette.warning)),
                ]));
            }
            lines
        }
    }
}

fn draw_progress(
    frame: &mut Frame,
    session: &Session,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let width = area.width.saturating_sub(8) as usize;
    let ratio = session.progress().clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let color = match session.phase() {
        Phase::Success => palette.success,
        Phase::Presenting => palette.accent,
        _ => palette.primary,
    };

    let bar = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(glyphs.filled.repeat(filled), Style::default().fg(color)),
        Span::styled(
            glyphs.empty.repeat(width - filled),
            Style::default().fg(palette.bg_border),
        ),
        Span::styled(
            format!(" {:>3}%", (ratio * 100.0).round() as u32),
            Style::default().fg(palette.text_muted),
        ),
    ]));
    frame.render_widget(bar, area);
}

fn draw_entered(
    frame: &mut Frame,
    session: &Session,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let Some(trial) = session.trial() else {
        return;
    };
    if !matches!(
        session.phase(),
        Phase::AwaitingInput | Phase::Success | Phase::Failure
    ) {
        return;
    }

    let failed_at = (session.phase() == Phase::Failure).then(|| trial.position());
    let mut spans = vec![Span::raw(" ")];
    for index in 0..trial.len() {
        let (glyph, color) = if Some(index) == failed_at {
            (glyphs.entered, palette.error)
        } else if index < trial.position() {
            (glyphs.entered, palette.success)
        } else {
            (glyphs.pending, palette.text_muted)
        };
        spans.push(Span::styled(glyph, Style::default().fg(color)));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_message(frame: &mut Frame, session: &Session, area: Rect, palette: &Palette) {
    let message = session.message();
    let color = match message.kind() {
        MessageKind::Info => palette.text_secondary,
        MessageKind::Success => palette.success,
        MessageKind::Failure => palette.error,
    };
    let paragraph = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(message.text().to_string(), Style::default().fg(color)),
    ]))
    .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_key_hints(frame: &mut Frame, session: &Session, area: Rect, palette: &Palette) {
    let hints: &[(&str, &str)] = if session.settings_panel().is_some() {
        &[]
    } else {
        match session.phase() {
            Phase::Presenting => &[("Esc", "abandon")],
            Phase::AwaitingInput => &[("keys", "answer"), ("Esc", "abandon")],
            Phase::Idle => &[
                ("Enter", "start"),
                ("s", "settings"),
                ("n", "restart"),
                ("q", "quit"),
            ],
            Phase::Success | Phase::Failure => &[
                ("Enter", "continue"),
                ("r", "retry"),
                ("s", "settings"),
                ("n", "restart"),
                ("q", "quit"),
            ],
        }
    };

    let mut spans = vec![Span::raw(" ")];
    for (key, action) in hints {
        spans.push(Span::styled(*key, styles::key_highlight(palette)));
        spans.push(Span::styled(
            format!(" {action}  "),
            styles::key_hint(palette),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_settings(
    frame: &mut Frame,
    session: &Session,
    panel: &SettingsPanel,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let area = frame.area();
    let width = SETTINGS_WIDTH.min(area.width.saturating_sub(4));
    let content_width = width.saturating_sub(4) as usize; // borders + padding
    let settings = session.settings();

    let mut lines: Vec<Line> = Vec::new();
    for (index, row) in SettingsRow::ALL.into_iter().enumerate() {
        let selected = index == panel.selected();
        let value = match row {
            SettingsRow::Delay => format!("{} ms", settings.delay().as_millis()),
            SettingsRow::StartingLength => settings.starting_length().to_string(),
            SettingsRow::Mode => settings.mode().display_name().to_string(),
            SettingsRow::Audio => on_off(settings.audio(), glyphs),
            SettingsRow::Visual => on_off(settings.visual(), glyphs),
        };
        let prefix = if selected { glyphs.selected } else { " " };
        let left = format!(" {prefix} {}", row.label());
        let filler = content_width.saturating_sub(left.width() + value.width() + 1);

        let mut style = if selected {
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text_secondary)
        };
        if selected {
            style = style.bg(palette.bg_highlight);
        }
        lines.push(Line::from(vec![
            Span::styled(left, style),
            Span::styled(" ".repeat(filler), style),
            Span::styled(format!("{value} "), style.fg(palette.accent)),
        ]));
    }

    let select = format!(" {}{}", glyphs.arrow_up, glyphs.arrow_down);
    let adjust = format!("{}{}", glyphs.arrow_left, glyphs.arrow_right);
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(select, styles::key_highlight(palette)),
        Span::styled(" select  ", styles::key_hint(palette)),
        Span::styled(adjust, styles::key_highlight(palette)),
        Span::styled(" adjust  ", styles::key_hint(palette)),
        Span::styled("w", styles::key_highlight(palette)),
        Span::styled(" save  ", styles::key_hint(palette)),
        Span::styled("Esc", styles::key_highlight(palette)),
        Span::styled(" close", styles::key_hint(palette)),
    ]));

    let height = u16::try_from(lines.len())
        .unwrap_or(u16::MAX)
        .saturating_add(4)
        .min(area.height);
    let rect = Rect {
        x: area.x + (area.width.saturating_sub(width) / 2),
        y: area.y + (area.height.saturating_sub(height) / 2),
        width,
        height,
    };

    let title = if panel.is_dirty() {
        " Settings (unsaved) "
    } else {
        " Settings "
    };

    // Clear background
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.primary))
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::uniform(1))
        .title(Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD),
        )]));
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn on_off(value: bool, glyphs: &Glyphs) -> String {
    if value {
        format!("{} on", glyphs.on)
    } else {
        format!("{} off", glyphs.off)
    }
}

/// Terminal bell written once per revealed symbol when audio cues are on.
pub const BELL: &str = "\x07";
