//! Custom widgets for the trainer.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::theme::{icons, Theme};
use crate::progress::Progress;

// ══════════════════════════════════════════════════════════════════════════
// Logo Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct Logo<'a> {
    theme: &'a Theme,
}

impl<'a> Logo<'a> {
    const ART: &'static str = r#"
 __     __         _
 \ \   / /__ _ __| |__   ___  ___
  \ \ / / _ \ '__| '_ \ / _ \/ __|
   \ V /  __/ |  | |_) | (_) \__ \
    \_/ \___|_|  |_.__/ \___/|___/
     hablo · hablas · habla · hablamos"#;

    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for Logo<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = Self::ART
            .lines()
            .skip(1)
            .map(|line| Line::from(Span::styled(line, Style::default().fg(self.theme.colors.primary))))
            .collect();

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Stats Bar Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct StatsBar<'a> {
    progress: Progress,
    theme: &'a Theme,
}

impl<'a> StatsBar<'a> {
    pub fn new(progress: Progress, theme: &'a Theme) -> Self {
        Self { progress, theme }
    }

    fn cell(&self, label: &'static str, value: String, style: Style) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{} ", icons::DOT), style),
            Span::styled(label, self.theme.muted()),
            Span::styled(value, style),
        ])
    }
}

impl Widget for StatsBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::horizontal([Constraint::Percentage(25); 4]).split(area);
        let colors = &self.theme.colors;
        let bold = |color| Style::default().fg(color).add_modifier(Modifier::BOLD);

        let cells = [
            self.cell(
                "Mastered: ",
                format!("{}/{}", self.progress.mastered, self.progress.total_items),
                bold(colors.mastered),
            ),
            self.cell(
                "Mastery: ",
                format!("{}%", self.progress.mastery_percent()),
                bold(colors.mastered),
            ),
            self.cell(
                "Accuracy: ",
                format!("{}%", self.progress.accuracy_percent()),
                bold(colors.accuracy),
            ),
            self.cell(
                "Card: ",
                format!("{}/{}", self.progress.position, self.progress.remaining),
                bold(colors.remaining),
            ),
        ];

        for (cell, chunk) in cells.into_iter().zip(chunks.iter()) {
            Paragraph::new(cell)
                .alignment(Alignment::Center)
                .render(*chunk, buf);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Flashcard Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct FlashcardWidget<'a> {
    content: &'a str,
    caption: &'a str,
    is_prompt: bool,
    theme: &'a Theme,
}

impl<'a> FlashcardWidget<'a> {
    pub fn new(content: &'a str, caption: &'a str, is_prompt: bool, theme: &'a Theme) -> Self {
        Self {
            content,
            caption,
            is_prompt,
            theme,
        }
    }
}

impl Widget for FlashcardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (label, label_style, border_color) = if self.is_prompt {
            ("PROMPT", self.theme.prompt_side(), self.theme.colors.primary)
        } else {
            ("ANSWER", self.theme.answer_side(), self.theme.colors.success)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(label, label_style),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        let text_width = inner.width.saturating_sub(4).max(1) as usize;
        let wrapped = textwrap::wrap(self.content, text_width);

        let mut lines: Vec<Line> = wrapped
            .iter()
            .map(|l| {
                Line::from(Span::styled(
                    l.to_string(),
                    Style::default()
                        .fg(self.theme.colors.text)
                        .add_modifier(Modifier::BOLD),
                ))
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(self.caption, self.theme.dim())));

        // Center vertically
        let content_height = lines.len() as u16;
        let vertical_padding = inner.height.saturating_sub(content_height) / 2;

        let content_area = Rect {
            x: inner.x + 2,
            y: inner.y + vertical_padding,
            width: inner.width.saturating_sub(4),
            height: inner.height.saturating_sub(vertical_padding),
        };

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(content_area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Key Hints Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct KeyHints<'a> {
    hints: &'a [(&'a str, &'a str)],
    theme: &'a Theme,
}

impl<'a> KeyHints<'a> {
    pub fn new(hints: &'a [(&'a str, &'a str)], theme: &'a Theme) -> Self {
        Self { hints, theme }
    }
}

impl Widget for KeyHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut used = 0usize;
        let mut spans: Vec<Span> = Vec::new();

        // Drop trailing hints that would not fit on the line
        for (key, desc) in self.hints {
            let desc = format!(" {} ", desc);
            let width = key.width() + desc.width() + 2;
            if used + width > area.width as usize {
                break;
            }
            used += width;
            spans.push(Span::styled(*key, self.theme.key_highlight()));
            spans.push(Span::styled(desc, self.theme.key_hint()));
            spans.push(Span::styled("│ ", self.theme.dim()));
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Completion Screen Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct CompletionScreen<'a> {
    progress: Progress,
    theme: &'a Theme,
}

impl<'a> CompletionScreen<'a> {
    pub fn new(progress: Progress, theme: &'a Theme) -> Self {
        Self { progress, theme }
    }
}

impl Widget for CompletionScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.colors.success))
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled("¡FELICIDADES!", self.theme.answer_side()),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        let value = Style::default()
            .fg(self.theme.colors.primary)
            .add_modifier(Modifier::BOLD);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{} You've mastered every conjugation in this set!", icons::STAR),
                Style::default()
                    .fg(self.theme.colors.success)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Conjugations conquered: ", self.theme.muted()),
                Span::styled(self.progress.mastered.to_string(), value),
            ]),
            Line::from(vec![
                Span::styled("Accuracy: ", self.theme.muted()),
                Span::styled(format!("{}%", self.progress.accuracy_percent()), value),
            ]),
            Line::from(vec![
                Span::styled("Regular: ", self.theme.muted()),
                Span::styled(self.progress.regular_mastered.to_string(), value),
                Span::styled("   Irregular: ", self.theme.muted()),
                Span::styled(self.progress.irregular_mastered.to_string(), value),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", self.theme.dim()),
                Span::styled("r", self.theme.key_highlight()),
                Span::styled(" to start over, ", self.theme.dim()),
                Span::styled("Esc", self.theme.key_highlight()),
                Span::styled(" to pick another set", self.theme.dim()),
            ]),
        ];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Confirm Dialog Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct ConfirmDialog<'a> {
    title: &'a str,
    body: &'a str,
    theme: &'a Theme,
}

impl<'a> ConfirmDialog<'a> {
    pub fn new(title: &'a str, body: &'a str, theme: &'a Theme) -> Self {
        Self { title, body, theme }
    }
}

impl Widget for ConfirmDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(self.theme.colors.warning))
            .style(Style::default().bg(self.theme.colors.bg_dark))
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(self.theme.colors.warning)
                    .add_modifier(Modifier::BOLD),
            )
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(self.body, Style::default().fg(self.theme.colors.text))),
            Line::from(""),
            Line::from(vec![
                Span::styled("y", self.theme.key_highlight()),
                Span::styled(" confirm   ", self.theme.key_hint()),
                Span::styled("n", self.theme.key_highlight()),
                Span::styled(" cancel", self.theme.key_hint()),
            ]),
        ];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
