//! Screen rendering.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::app::{App, MenuEntry, Screen};
use super::theme::icons;
use super::widgets::{CompletionScreen, ConfirmDialog, FlashcardWidget, KeyHints, Logo, StatsBar};
use crate::drill::FieldStatus;
use crate::models::Tense;
use crate::progress::{score_message, Progress};
use crate::reference::ENDING_PATTERNS;
use crate::session::SessionState;

impl App {
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Clear with background
        frame.render_widget(Clear, area);
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.colors.bg_dark)),
            area,
        );

        match self.screen {
            Screen::SetSelect => self.render_set_select(frame, area),
            Screen::VerbPicker => self.render_picker(frame, area),
            Screen::Study => self.render_study(frame, area),
            Screen::Complete => self.render_complete(frame, area),
            Screen::Quiz => self.render_quiz(frame, area),
            Screen::DrillSetup => self.render_drill_setup(frame, area),
            Screen::Drill => self.render_drill(frame, area),
            Screen::Reference => self.render_reference(frame, area),
            Screen::Help => self.render_help(frame, area),
        }

        if let Some(confirm) = self.confirm {
            let dialog_area = centered_rect(50, 30, area);
            frame.render_widget(
                ConfirmDialog::new(confirm.title(), confirm.body(), &self.theme),
                dialog_area,
            );
        }
    }

    /// Status or feedback line just above `hints`.
    fn render_toast(&self, frame: &mut Frame, hints: Rect) {
        let Some(toast) = self.visible_toast() else {
            return;
        };
        let style = match toast.tone {
            Some(tone) => self.theme.feedback(tone),
            None => Style::default().fg(self.theme.colors.info),
        };
        let status = Paragraph::new(toast.text.as_str())
            .alignment(Alignment::Center)
            .style(style);
        let status_area = Rect {
            x: hints.x,
            y: hints.y.saturating_sub(1),
            width: hints.width,
            height: 1,
        };
        frame.render_widget(status, status_area);
    }

    fn render_set_select(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(2),   // Top padding
            Constraint::Length(6),   // Logo
            Constraint::Length(2),   // Spacing
            Constraint::Min(5),      // Set list
            Constraint::Length(3),   // Help
        ])
        .split(area);

        frame.render_widget(Logo::new(&self.theme), chunks[1]);

        let list_area = centered_rect(70, 100, chunks[3]);
        let items: Vec<ListItem> = self
            .menu_entries()
            .iter()
            .map(|entry| {
                let (name, detail) = match entry {
                    MenuEntry::Resume => {
                        let (label, left) = self
                            .session
                            .as_ref()
                            .map(|s| {
                                let label = s
                                    .selection()
                                    .map(|sel| sel.label(&self.catalog))
                                    .unwrap_or_else(|| "Current set".to_string());
                                (label, s.remaining())
                            })
                            .unwrap_or_default();
                        (format!("Resume: {}", label), format!(" ({} left)", left))
                    }
                    MenuEntry::Set(id) => match self.catalog.set(id) {
                        Some(set) => (
                            set.name.clone(),
                            format!(" · {} · {}", set.difficulty.name(), set.description),
                        ),
                        None => (id.clone(), String::new()),
                    },
                    MenuEntry::Custom => (
                        "Custom selection".to_string(),
                        " · pick verbs and tenses".to_string(),
                    ),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(detail, self.theme.muted()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.theme.colors.primary))
                    .title(" Practice ")
                    .title_style(self.theme.highlight()),
            )
            .highlight_style(self.theme.selected())
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, list_area, &mut self.menu_state);

        let theme_hint = format!("[{}]", self.theme.name.display_name());
        let hints_data: [(&str, &str); 8] = [
            ("j/k", "nav"),
            ("Enter", "start"),
            ("h", "reference"),
            ("d", "drills"),
            ("c", "clear all"),
            ("?", "help"),
            ("t", &theme_hint),
            ("q", "quit"),
        ];
        frame.render_widget(KeyHints::new(&hints_data, &self.theme), chunks[4]);
        self.render_toast(frame, chunks[4]);
    }

    fn render_picker(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3),   // Title
            Constraint::Length(1),   // Filters
            Constraint::Length(1),   // Spacing
            Constraint::Min(5),      // Verb list
            Constraint::Length(1),   // Totals
            Constraint::Length(3),   // Hints
        ])
        .split(centered_rect(80, 100, area));

        let title = Paragraph::new("Custom Selection")
            .alignment(Alignment::Center)
            .style(self.theme.title());
        frame.render_widget(title, chunks[0]);

        let filter = &self.picker.filter;
        let search = match (&filter.text, self.picker.searching) {
            (Some(text), true) => format!("{}_", text),
            (Some(text), false) => text.clone(),
            (None, true) => "_".to_string(),
            (None, false) => "-".to_string(),
        };
        let filters = Line::from(vec![
            Span::styled("Class: ", self.theme.muted()),
            Span::styled(filter.class.map_or("all", |c| c.name()), self.theme.highlight()),
            Span::styled("   Family: ", self.theme.muted()),
            Span::styled(filter.family.map_or("all", |f| f.name()), self.theme.highlight()),
            Span::styled("   Tense: ", self.theme.muted()),
            Span::styled(filter.tense.map_or("all", |t| t.name()), self.theme.highlight()),
            Span::styled("   Search: ", self.theme.muted()),
            Span::styled(search, self.theme.highlight()),
        ]);
        frame.render_widget(Paragraph::new(filters).alignment(Alignment::Center), chunks[1]);

        let tense = filter.tense;
        let items: Vec<ListItem> = self
            .picker
            .visible()
            .iter()
            .map(|group| {
                let chosen = self.picker.chosen.contains(&group.verb);
                let mark = if chosen { icons::CHECK } else { " " };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("[{}] ", mark), self.theme.answer_side()),
                    Span::styled(
                        format!("{:<10}", group.verb),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!(" {:<14}", group.english), self.theme.muted()),
                    Span::styled(
                        format!(" {:<9}", group.grammatical_class.name()),
                        Style::default().fg(group.grammatical_class.color_for_theme(&self.theme)),
                    ),
                    Span::styled(format!(" {}", group.family.name()), self.theme.dim()),
                    Span::styled(
                        format!("  {} items", group.count_for(tense)),
                        self.theme.dim(),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.theme.colors.primary))
                    .title(" Verbs ")
                    .title_style(self.theme.highlight()),
            )
            .highlight_style(self.theme.selected())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, chunks[3], &mut self.picker.list_state);

        let totals = Paragraph::new(format!(
            "{} verbs chosen, {} conjugations",
            self.picker.chosen.len(),
            self.picker.item_count()
        ))
        .alignment(Alignment::Center)
        .style(self.theme.muted());
        frame.render_widget(totals, chunks[4]);

        let hints = if self.picker.searching {
            KeyHints::new(&[("type", "search"), ("Enter/Esc", "done")], &self.theme)
        } else {
            KeyHints::new(
                &[
                    ("Space", "toggle"),
                    ("a", "all shown"),
                    ("x", "none"),
                    ("f", "class"),
                    ("g", "family"),
                    ("e", "tense"),
                    ("/", "search"),
                    ("Enter", "start"),
                    ("Esc", "back"),
                ],
                &self.theme,
            )
        };
        frame.render_widget(hints, chunks[5]);
        self.render_toast(frame, chunks[5]);
    }

    fn render_study(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3),   // Header
            Constraint::Length(1),   // Stats
            Constraint::Length(1),   // Mastery gauge
            Constraint::Length(1),   // Separator
            Constraint::Min(10),     // Card
            Constraint::Length(2),   // Feedback
            Constraint::Length(2),   // Hints
        ])
        .split(area);

        let Some(ref session) = self.session else {
            return;
        };
        let progress = Progress::of(session);

        let label = session
            .selection()
            .map(|s| s.label(&self.catalog))
            .unwrap_or_else(|| "Study".to_string());
        let header = Paragraph::new(Line::from(vec![
            Span::styled(label, self.theme.title()),
            Span::styled(format!("  {}", session.direction().label()), self.theme.muted()),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(header, chunks[0]);

        frame.render_widget(StatsBar::new(progress, &self.theme), chunks[1]);

        let gauge = Gauge::default()
            .gauge_style(
                Style::default()
                    .fg(self.theme.colors.mastered)
                    .bg(self.theme.colors.bg_highlight),
            )
            .percent(u16::from(progress.mastery_percent()))
            .label(format!("{}% mastered", progress.mastery_percent()));
        frame.render_widget(gauge, centered_rect(60, 100, chunks[2]));

        if let Some(item) = session.current() {
            let direction = session.direction();
            let (content, is_prompt) = if session.is_revealed() {
                (direction.answer(item), false)
            } else {
                (direction.prompt(item), true)
            };
            let caption = format!(
                "{} · {} · {} · {}",
                item.verb,
                item.family.name(),
                item.grammatical_class.name(),
                item.tense.name()
            );
            frame.render_widget(
                FlashcardWidget::new(content, &caption, is_prompt, &self.theme),
                centered_rect(80, 100, chunks[4]),
            );
        }

        let next_hint = if session.can_advance() {
            ("→/n", "next")
        } else {
            ("m", "last one!")
        };
        let hints_data = [
            ("Space", "flip"),
            next_hint,
            ("←/p", "prev"),
            ("m", "mastered"),
            ("s", "shuffle"),
            ("l", "direction"),
            ("z", "quiz"),
            ("h", "reference"),
            ("r", "reset"),
            ("?", "help"),
            ("Esc", "sets"),
        ];
        frame.render_widget(KeyHints::new(&hints_data, &self.theme), chunks[6]);
        self.render_toast(frame, chunks[6]);
    }

    fn render_complete(&mut self, frame: &mut Frame, area: Rect) {
        let Some(ref session) = self.session else {
            return;
        };
        let card_area = centered_rect(60, 50, area);
        frame.render_widget(
            CompletionScreen::new(Progress::of(session), &self.theme),
            card_area,
        );
    }

    fn render_quiz(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3),   // Title
            Constraint::Min(8),      // Body
            Constraint::Length(3),   // Hints
        ])
        .split(centered_rect(70, 100, area));

        let title = Paragraph::new("Quiz")
            .alignment(Alignment::Center)
            .style(self.theme.title());
        frame.render_widget(title, chunks[0]);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.colors.secondary));
        let body_area = block.inner(chunks[1]);
        frame.render_widget(block, chunks[1]);

        let value = self.theme.highlight();
        let length = if self.quiz.all {
            let remaining = self.session.as_ref().map_or(0, SessionState::remaining);
            format!("All ({})", remaining)
        } else {
            self.quiz.length.to_string()
        };
        let (lines, hints): (Vec<Line>, Vec<(&str, &str)>) = match self.quiz.quiz {
            None => (
                vec![
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("Questions: ", self.theme.muted()),
                        Span::styled(length, value),
                    ]),
                    Line::from(vec![
                        Span::styled("Direction: ", self.theme.muted()),
                        Span::styled(self.quiz.direction.label(), value),
                    ]),
                    Line::from(""),
                    Line::from(Span::styled(
                        "Only conjugations you have not mastered are asked.",
                        self.theme.dim(),
                    )),
                ],
                vec![("←/→", "length"), ("l", "direction"), ("Enter", "start"), ("Esc", "close")],
            ),
            Some(ref quiz) if quiz.is_finished() => {
                let score = quiz.score();
                (
                    vec![
                        Line::from(""),
                        Line::from(Span::styled(
                            format!(
                                "{}/{} correct ({}%)",
                                score.correct,
                                score.answered,
                                score.percent()
                            ),
                            value,
                        )),
                        Line::from(""),
                        Line::from(Span::styled(
                            score_message(score.percent()),
                            self.theme.answer_side(),
                        )),
                    ],
                    vec![("r", "new quiz"), ("Esc", "close")],
                )
            }
            Some(ref quiz) => {
                let mut lines = Vec::new();
                lines.push(Line::from(Span::styled(
                    format!("Question {} of {}", quiz.position() + 1, quiz.len()),
                    self.theme.dim(),
                )));
                lines.push(Line::from(""));
                if let Some(question) = quiz.current() {
                    lines.push(Line::from(Span::styled(
                        question.prompt.clone(),
                        self.theme.prompt_side(),
                    )));
                    lines.push(Line::from(""));
                }
                let hints = match self.quiz.outcome {
                    Some(ref outcome) if outcome.correct => {
                        lines.push(Line::from(Span::styled(
                            format!("{} ¡Correcto!", icons::CHECK),
                            self.theme.answer_side(),
                        )));
                        vec![("Enter", "next"), ("Esc", "close")]
                    }
                    Some(ref outcome) => {
                        lines.push(Line::from(Span::styled(
                            format!("{} The answer is: {}", icons::CROSS, outcome.expected),
                            Style::default().fg(self.theme.colors.error),
                        )));
                        vec![("Enter", "next"), ("Esc", "close")]
                    }
                    None => {
                        lines.push(Line::from(vec![
                            Span::styled("> ", self.theme.key_highlight()),
                            Span::styled(format!("{}_", self.quiz.input), self.theme.title()),
                        ]));
                        vec![("Enter", "check"), ("Esc", "close")]
                    }
                };
                let score = quiz.score();
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("Score: {}/{}", score.correct, score.answered),
                    self.theme.muted(),
                )));
                (lines, hints)
            }
        };

        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            body_area,
        );
        frame.render_widget(KeyHints::new(&hints, &self.theme), chunks[2]);
        self.render_toast(frame, chunks[2]);
    }

    fn render_drill_setup(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3),   // Title
            Constraint::Length(1),   // Tenses
            Constraint::Length(1),   // Spacing
            Constraint::Min(5),      // Verb list
            Constraint::Length(3),   // Hints
        ])
        .split(centered_rect(60, 100, area));

        let title = Paragraph::new("Conjugation Drills")
            .alignment(Alignment::Center)
            .style(self.theme.title());
        frame.render_widget(title, chunks[0]);

        let tenses = self.drill_setup.chosen_tenses();
        let tense_span = |key: &'static str, tense: Tense| {
            let on = tenses.contains(&tense);
            Span::styled(
                format!("[{}] {} {}   ", if on { icons::DOT } else { icons::EMPTY }, key, tense.name()),
                if on { self.theme.highlight() } else { self.theme.dim() },
            )
        };
        let tense_line = Line::from(vec![
            tense_span("1", Tense::Present),
            tense_span("2", Tense::Preterite),
        ]);
        frame.render_widget(Paragraph::new(tense_line).alignment(Alignment::Center), chunks[1]);

        let items: Vec<ListItem> = self
            .irregular
            .iter()
            .map(|table| {
                let chosen = self.drill_setup.chosen.contains(&table.verb);
                let mark = if chosen { icons::CHECK } else { " " };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("[{}] ", mark), self.theme.answer_side()),
                    Span::styled(
                        format!("{:<8}", table.verb),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!(" {}", table.english), self.theme.muted()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.theme.colors.warning))
                    .title(" Irregular verbs ")
                    .title_style(Style::default().fg(self.theme.colors.warning)),
            )
            .highlight_style(self.theme.selected())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, chunks[3], &mut self.drill_setup.list_state);

        let hints = KeyHints::new(
            &[
                ("Space", "toggle verb"),
                ("1/2", "tenses"),
                ("Enter", "irregular drill"),
                ("p", "ending patterns"),
                ("Esc", "close"),
            ],
            &self.theme,
        );
        frame.render_widget(hints, chunks[4]);
        self.render_toast(frame, chunks[4]);
    }

    fn render_drill(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3),   // Title
            Constraint::Min(8),      // Fields
            Constraint::Length(1),   // Score
            Constraint::Length(3),   // Hints
        ])
        .split(centered_rect(70, 100, area));

        let Some(ref drill) = self.drill else {
            return;
        };

        let title = Paragraph::new(drill.title())
            .alignment(Alignment::Center)
            .style(self.theme.title());
        frame.render_widget(title, chunks[0]);

        let mut lines = Vec::new();
        let mut focus_line = 0usize;
        let mut group: Option<&str> = None;
        for (i, field) in drill.fields().iter().enumerate() {
            if group != Some(field.group.as_str()) {
                if group.is_some() {
                    lines.push(Line::from(""));
                }
                group = Some(field.group.as_str());
                lines.push(Line::from(Span::styled(
                    field.group.clone(),
                    self.theme.highlight(),
                )));
            }

            let status = drill.status(i);
            let marker = match status {
                Some(FieldStatus::Correct) => icons::CHECK,
                Some(FieldStatus::Incorrect) => icons::CROSS,
                Some(FieldStatus::Empty) => icons::EMPTY,
                None => " ",
            };
            let focused = i == drill.focus();
            if focused {
                focus_line = lines.len();
            }
            let answer = if focused {
                format!("{}_", drill.answer(i))
            } else {
                drill.answer(i).to_string()
            };
            let row_style = if focused {
                self.theme.selected()
            } else {
                Style::default()
            };
            lines.push(
                Line::from(vec![
                    Span::styled(format!("  {:<24}", field.person.label()), self.theme.muted()),
                    Span::styled(format!("{:<10}", field.column.label()), self.theme.dim()),
                    Span::styled(format!("{:<20}", answer), self.theme.field_status(status)),
                    Span::styled(marker, self.theme.field_status(status)),
                ])
                .style(row_style),
            );
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.colors.secondary));
        let inner = block.inner(chunks[1]);
        let scroll = focus_line.saturating_sub(inner.height as usize / 2) as u16;
        frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), chunks[1]);

        if drill.is_validating() {
            let score = drill.score();
            let line = Paragraph::new(format!(
                "{}/{} correct ({}%)",
                score.correct,
                score.total,
                score.percent()
            ))
            .alignment(Alignment::Center)
            .style(self.theme.highlight());
            frame.render_widget(line, chunks[2]);
        }

        let check = if drill.is_validating() {
            ("Enter", "hide check")
        } else {
            ("Enter", "check")
        };
        let hints_data = [
            ("Tab/↓", "next"),
            ("S-Tab/↑", "prev"),
            check,
            ("C-r", "clear"),
            ("Esc", "setup"),
        ];
        frame.render_widget(KeyHints::new(&hints_data, &self.theme), chunks[3]);
        self.render_toast(frame, chunks[3]);
    }

    fn render_reference(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3),   // Title
            Constraint::Min(8),      // Tables
            Constraint::Length(3),   // Hints
        ])
        .split(centered_rect(70, 100, area));

        let title = Paragraph::new("Reference")
            .alignment(Alignment::Center)
            .style(self.theme.title());
        frame.render_widget(title, chunks[0]);

        let mut lines = vec![Line::from(Span::styled(
            "Regular endings",
            self.theme.title(),
        ))];
        for pattern in &ENDING_PATTERNS {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(pattern.title, self.theme.highlight()),
                Span::styled(format!("  (model: {})", pattern.model_verb), self.theme.dim()),
            ]));
            for row in &pattern.rows {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<24}", row.person.label()), self.theme.muted()),
                    Span::styled(format!("{:<10}", row.ending), self.theme.answer_side()),
                    Span::styled(row.example, Style::default().fg(self.theme.colors.text)),
                ]));
            }
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Irregular verbs", self.theme.title())));
        for table in &self.irregular {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(table.verb.clone(), Style::default().fg(self.theme.colors.warning)),
                Span::styled(format!("  {}", table.english), self.theme.dim()),
            ]));
            for form in &table.forms {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<24}", form.person.label()), self.theme.muted()),
                    Span::styled(format!("{:<14}", form.present), Style::default().fg(self.theme.colors.text)),
                    Span::styled(form.preterite.clone(), Style::default().fg(self.theme.colors.text)),
                ]));
            }
        }

        let max_scroll = lines.len().saturating_sub(1) as u16;
        self.reference_scroll = self.reference_scroll.min(max_scroll);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.colors.primary));
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .scroll((self.reference_scroll, 0)),
            chunks[1],
        );

        let hints = KeyHints::new(
            &[("j/k", "scroll"), ("PgUp/PgDn", "page"), ("Esc", "close")],
            &self.theme,
        );
        frame.render_widget(hints, chunks[2]);
    }

    fn render_help(&mut self, frame: &mut Frame, area: Rect) {
        let help_area = centered_rect(60, 80, area);

        let keys: [(&str, &str); 15] = [
            ("Space", "Flip the card"),
            ("→ / n", "Next card"),
            ("← / p", "Previous card"),
            ("m", "Mark as mastered"),
            ("s", "Shuffle remaining cards"),
            ("l", "Switch prompt language"),
            ("r", "Reset progress"),
            ("c", "Clear all progress"),
            ("z", "Quiz"),
            ("d", "Conjugation drills"),
            ("h", "Reference tables"),
            ("t", "Change theme"),
            ("?", "This help"),
            ("Esc", "Close / back"),
            ("q", "Quit (from the set list)"),
        ];
        let lines: Vec<Line> = keys
            .iter()
            .map(|(key, desc)| {
                Line::from(vec![
                    Span::styled(format!("{:>8}  ", key), self.theme.key_highlight()),
                    Span::styled(*desc, Style::default().fg(self.theme.colors.text)),
                ])
            })
            .collect();

        let help = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(self.theme.colors.primary))
                .title(" Keys ")
                .title_style(self.theme.highlight())
                .title_alignment(Alignment::Center),
        );
        frame.render_widget(help, help_area);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Helper Functions
// ══════════════════════════════════════════════════════════════════════════

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
