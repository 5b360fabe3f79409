//! Main application state and logic.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info, warn};
use rand_chacha::ChaCha8Rng;
use ratatui::widgets::ListState;

use super::theme::Theme;
use crate::catalog::{Catalog, ItemFilter, VerbGroup};
use crate::config::Config;
use crate::drill::TableDrill;
use crate::models::{ConjugationFamily, Direction, GrammaticalClass, Tense};
use crate::progress::{score_message, Feedback, Tone};
use crate::quiz::{Quiz, QuizOutcome, MAX_QUIZ_LENGTH, MIN_QUIZ_LENGTH};
use crate::reference::{irregular_tables, IrregularTable, ENDING_PATTERNS};
use crate::selector::Selection;
use crate::session::{SessionPhase, SessionState};
use crate::storage::SessionStore;

/// How long a quiz verdict stays up before the next question.
pub const QUIZ_ADVANCE_AFTER: Duration = Duration::from_secs(2);

const QUIZ_LENGTH_STEP: usize = 5;
const DEFAULT_DRILL_VERB: &str = "tener";

// ══════════════════════════════════════════════════════════════════════════
// Application State
// ══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SetSelect,
    VerbPicker,
    Study,
    Complete,
    Quiz,
    DrillSetup,
    Drill,
    Reference,
    Help,
}

impl Screen {
    /// Screens opened over another one and closed with Esc.
    fn is_overlay(self) -> bool {
        matches!(
            self,
            Screen::Quiz | Screen::DrillSetup | Screen::Drill | Screen::Reference | Screen::Help
        )
    }
}

/// Destructive actions waiting for a yes/no.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Reset,
    ClearAll,
}

impl Confirm {
    pub fn title(&self) -> &'static str {
        match self {
            Confirm::Reset => "Reset progress",
            Confirm::ClearAll => "Clear all progress",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Confirm::Reset => "Unmark every conjugation in this set and zero the counters?",
            Confirm::ClearAll => "Forget the stored session entirely? This cannot be undone.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Resume,
    Set(String),
    Custom,
}

/// A transient message. `tone` is `None` for plain status lines.
#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub tone: Option<Tone>,
    pub shown_at: Instant,
}

/// Custom verb picker state.
pub struct VerbPicker {
    pub groups: Vec<VerbGroup>,
    pub chosen: BTreeSet<String>,
    pub filter: ItemFilter,
    pub list_state: ListState,
    pub searching: bool,
}

impl VerbPicker {
    fn new(groups: Vec<VerbGroup>) -> Self {
        Self {
            groups,
            chosen: BTreeSet::new(),
            filter: ItemFilter::default(),
            list_state: ListState::default().with_selected(Some(0)),
            searching: false,
        }
    }

    pub fn visible(&self) -> Vec<&VerbGroup> {
        self.groups.iter().filter(|g| g.matches(&self.filter)).collect()
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.visible().len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let i = self.list_state.selected().unwrap_or(0).min(len - 1);
        let new_i = if down {
            if i + 1 >= len {
                0
            } else {
                i + 1
            }
        } else if i == 0 {
            len - 1
        } else {
            i - 1
        };
        self.list_state.select(Some(new_i));
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        let selected = if len == 0 {
            None
        } else {
            Some(self.list_state.selected().unwrap_or(0).min(len - 1))
        };
        self.list_state.select(selected);
    }

    fn toggle_selected(&mut self) {
        let Some(verb) = self
            .list_state
            .selected()
            .and_then(|i| self.visible().get(i).map(|g| g.verb.clone()))
        else {
            return;
        };
        if !self.chosen.remove(&verb) {
            self.chosen.insert(verb);
        }
    }

    fn choose_visible(&mut self) {
        let verbs: Vec<String> = self.visible().iter().map(|g| g.verb.clone()).collect();
        self.chosen.extend(verbs);
    }

    fn push_search(&mut self, c: char) {
        self.filter.text.get_or_insert_with(String::new).push(c);
        self.clamp_selection();
    }

    fn pop_search(&mut self) {
        if let Some(text) = self.filter.text.as_mut() {
            text.pop();
            if text.is_empty() {
                self.filter.text = None;
            }
        }
        self.clamp_selection();
    }

    /// Items the current choice would put in the working set.
    pub fn item_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| self.chosen.contains(&g.verb))
            .map(|g| g.count_for(self.filter.tense))
            .sum()
    }

    /// Browsing filters narrow the list only; the tense filter also narrows
    /// the items practiced.
    pub fn selection(&self) -> Option<Selection> {
        if self.chosen.is_empty() {
            return None;
        }
        Some(Selection::Verbs {
            verbs: self.chosen.iter().cloned().collect(),
            filter: ItemFilter {
                tense: self.filter.tense,
                ..ItemFilter::default()
            },
        })
    }
}

/// Quiz overlay state. No quiz means the setup step.
pub struct QuizPanel {
    pub quiz: Option<Quiz>,
    pub length: usize,
    /// Past the longest fixed length: ask every unmastered item.
    pub all: bool,
    pub direction: Direction,
    pub input: String,
    pub outcome: Option<QuizOutcome>,
    pub answered_at: Option<Instant>,
}

impl QuizPanel {
    fn new(length: usize, direction: Direction) -> Self {
        Self {
            quiz: None,
            length,
            all: false,
            direction,
            input: String::new(),
            outcome: None,
            answered_at: None,
        }
    }
}

/// Irregular drill setup.
pub struct DrillSetup {
    pub verbs: Vec<String>,
    pub chosen: BTreeSet<String>,
    pub tenses: Vec<Tense>,
    pub list_state: ListState,
}

impl DrillSetup {
    fn new(tables: &[IrregularTable]) -> Self {
        let verbs: Vec<String> = tables.iter().map(|t| t.verb.clone()).collect();
        let chosen = verbs
            .iter()
            .filter(|v| v.as_str() == DEFAULT_DRILL_VERB)
            .cloned()
            .collect();
        Self {
            verbs,
            chosen,
            tenses: Tense::ALL.to_vec(),
            list_state: ListState::default().with_selected(Some(0)),
        }
    }

    fn toggle_tense(&mut self, tense: Tense) {
        if let Some(pos) = self.tenses.iter().position(|t| *t == tense) {
            self.tenses.remove(pos);
        } else {
            self.tenses.push(tense);
        }
    }

    /// Chosen tenses in canonical order.
    pub fn chosen_tenses(&self) -> Vec<Tense> {
        Tense::ALL
            .into_iter()
            .filter(|t| self.tenses.contains(t))
            .collect()
    }

    /// Chosen verbs in table order.
    pub fn chosen_verbs(&self) -> Vec<String> {
        self.verbs
            .iter()
            .filter(|v| self.chosen.contains(*v))
            .cloned()
            .collect()
    }
}

pub struct App {
    pub screen: Screen,
    pub running: bool,

    // Config and theme
    pub config: Config,
    pub config_path: PathBuf,
    pub theme: Theme,

    // Content and storage
    pub catalog: Catalog,
    pub irregular: Vec<IrregularTable>,
    pub store: SessionStore,
    rng: ChaCha8Rng,

    // Current session
    pub session: Option<SessionState>,

    // Where Esc goes from an overlay
    pub back_to: Screen,
    pub confirm: Option<Confirm>,

    // Selection screens
    pub menu_state: ListState,
    pub picker: VerbPicker,

    // Overlays
    pub quiz: QuizPanel,
    pub drill_setup: DrillSetup,
    pub drill: Option<TableDrill>,
    pub reference_scroll: u16,

    // Feedback and status (shown temporarily)
    pub toast: Option<Toast>,
}

impl App {
    /// Loads the bundled content and resumes the stored session, if any.
    pub fn new(store: SessionStore, config: Config, mut rng: ChaCha8Rng) -> anyhow::Result<Self> {
        let catalog = Catalog::bundled().context("Failed to load bundled catalog")?;
        let irregular = irregular_tables().context("Failed to load irregular verb tables")?;
        let theme = Theme::from_name(&config.theme);

        let session = store
            .load_or_discard()
            .and_then(|snapshot| SessionState::restore(snapshot, &mut rng));
        let screen = match session.as_ref().map(SessionState::phase) {
            Some(SessionPhase::Active) => Screen::Study,
            Some(SessionPhase::Completed) => Screen::Complete,
            _ => Screen::SetSelect,
        };
        if let Some(ref session) = session {
            info!(
                "resumed session with {} items, {} remaining",
                session.items().len(),
                session.remaining()
            );
        }

        let direction = Direction::from_spanish_first(config.spanish_first);
        let picker = VerbPicker::new(catalog.verb_groups());
        let drill_setup = DrillSetup::new(&irregular);

        Ok(Self {
            screen,
            running: true,
            quiz: QuizPanel::new(config.quiz_length, direction),
            config,
            config_path: Config::default_path(),
            theme,
            catalog,
            irregular,
            store,
            rng,
            session,
            back_to: Screen::SetSelect,
            confirm: None,
            menu_state: ListState::default().with_selected(Some(0)),
            picker,
            drill_setup,
            drill: None,
            reference_scroll: 0,
            toast: None,
        })
    }

    /// Use another file for saving preferences.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = path;
        self
    }

    pub fn cycle_theme(&mut self) {
        let new_theme_name = self.theme.name.next();
        self.theme = Theme::new(new_theme_name);
        self.config.theme = new_theme_name.as_str().to_string();
        if let Err(err) = self.config.save_to(&self.config_path) {
            warn!("failed to save config: {:#}", err);
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            text: message.into(),
            tone: None,
            shown_at: Instant::now(),
        });
    }

    fn show_feedback(&mut self, feedback: Feedback) {
        self.toast = Some(Toast {
            text: feedback.message.to_string(),
            tone: Some(feedback.tone),
            shown_at: Instant::now(),
        });
    }

    /// The current message, if it has not expired yet.
    pub fn visible_toast(&self) -> Option<&Toast> {
        let lifetime = Duration::from_secs(self.config.message_secs);
        self.toast
            .as_ref()
            .filter(|toast| toast.shown_at.elapsed() < lifetime)
    }

    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        let mut entries = Vec::new();
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.phase() != SessionPhase::Empty)
        {
            entries.push(MenuEntry::Resume);
        }
        entries.extend(
            self.catalog
                .sets()
                .iter()
                .map(|set| MenuEntry::Set(set.id.clone())),
        );
        entries.push(MenuEntry::Custom);
        entries
    }

    // ══════════════════════════════════════════════════════════════════════
    // Session actions
    // ══════════════════════════════════════════════════════════════════════

    /// Starts a fresh session over `selection`. Returns false, keeping the
    /// current session, when the selection has nothing to practice.
    pub fn start_session(&mut self, selection: Selection) -> bool {
        let direction = Direction::from_spanish_first(self.config.spanish_first);
        let session =
            SessionState::from_selection(&self.catalog, selection, direction, &mut self.rng);
        if session.phase() == SessionPhase::Empty {
            self.set_status("Nothing to practice in that selection");
            return false;
        }

        let label = session
            .selection()
            .map(|s| s.label(&self.catalog))
            .unwrap_or_default();
        info!("new session '{}' with {} items", label, session.items().len());

        self.session = Some(session);
        self.toast = None;
        self.persist();
        self.screen = Screen::Study;
        true
    }

    fn persist(&mut self) {
        let Some(ref session) = self.session else {
            return;
        };
        if let Err(err) = self.store.save(&session.snapshot()) {
            warn!("failed to save session: {:#}", err);
            self.set_status(format!("Could not save progress: {}", err));
        }
    }

    pub fn reveal(&mut self) {
        if let Some(ref mut session) = self.session {
            if session.current().is_some() {
                session.reveal();
                self.persist();
            }
        }
    }

    pub fn advance(&mut self) {
        let Some(ref mut session) = self.session else {
            return;
        };
        if let Some(feedback) = session.advance(&mut self.rng) {
            self.show_feedback(feedback);
            self.persist();
        }
    }

    pub fn retreat(&mut self) {
        let Some(ref mut session) = self.session else {
            return;
        };
        if session.retreat() {
            self.persist();
        }
    }

    pub fn mark_mastered(&mut self) {
        let Some(ref mut session) = self.session else {
            return;
        };
        if session.mark_current_mastered(&mut self.rng).is_some() {
            let feedback = Feedback::after_mastered(&mut self.rng);
            self.show_feedback(feedback);
            self.persist();
            self.settle_screen();
        }
    }

    pub fn shuffle(&mut self) {
        let Some(ref mut session) = self.session else {
            return;
        };
        if session.remaining() > 0 {
            session.shuffle(&mut self.rng);
            self.set_status("Shuffled");
            self.persist();
        }
    }

    pub fn toggle_direction(&mut self) {
        let Some(ref mut session) = self.session else {
            return;
        };
        session.toggle_direction();
        let label = session.direction().label();
        self.set_status(label);
        self.persist();
    }

    pub fn reset_progress(&mut self) {
        let Some(ref mut session) = self.session else {
            return;
        };
        session.reset(&mut self.rng);
        info!("session reset, {} items", session.items().len());
        self.set_status("Progress reset");
        self.persist();
        self.screen = Screen::Study;
        self.settle_screen();
    }

    pub fn clear_all(&mut self) {
        if let Err(err) = self.store.clear() {
            warn!("failed to clear session: {:#}", err);
            self.set_status(format!("Could not clear progress: {}", err));
            return;
        }
        info!("all progress cleared");
        self.session = None;
        self.quiz.quiz = None;
        self.quiz.outcome = None;
        self.quiz.answered_at = None;
        self.drill = None;
        self.screen = Screen::SetSelect;
        self.menu_state.select(Some(0));
        self.set_status("All progress cleared");
    }

    /// Keeps the screen consistent with the session phase.
    fn settle_screen(&mut self) {
        let phase = self.session.as_ref().map(SessionState::phase);
        self.screen = match (self.screen, phase) {
            (Screen::Study, Some(SessionPhase::Completed)) => {
                info!("session complete");
                Screen::Complete
            }
            (Screen::Complete, Some(SessionPhase::Active)) => Screen::Study,
            (Screen::Study | Screen::Complete, None | Some(SessionPhase::Empty)) => {
                Screen::SetSelect
            }
            (screen, _) => screen,
        };
    }

    fn open_overlay(&mut self, screen: Screen) {
        if !self.screen.is_overlay() {
            self.back_to = self.screen;
        }
        self.screen = screen;
    }

    fn close_overlay(&mut self) {
        self.screen = self.back_to;
        self.settle_screen();
    }

    fn open_quiz(&mut self) {
        self.quiz.quiz = None;
        self.quiz.input.clear();
        self.quiz.outcome = None;
        self.quiz.answered_at = None;
        if let Some(ref session) = self.session {
            self.quiz.direction = session.direction();
        }
        self.open_overlay(Screen::Quiz);
    }

    fn open_drill_setup(&mut self) {
        self.drill = None;
        self.open_overlay(Screen::DrillSetup);
    }

    fn go_to_menu(&mut self) {
        self.screen = Screen::SetSelect;
        self.menu_state.select(Some(0));
    }

    // ══════════════════════════════════════════════════════════════════════
    // Quiz actions
    // ══════════════════════════════════════════════════════════════════════

    fn begin_quiz(&mut self) {
        let Some(ref session) = self.session else {
            self.set_status("Pick a set before taking a quiz");
            return;
        };
        let length = if self.quiz.all {
            session.remaining()
        } else {
            self.quiz.length
        };
        let quiz = Quiz::start(
            session.items(),
            length,
            self.quiz.direction,
            &mut self.rng,
        );
        if quiz.is_empty() {
            self.set_status("Nothing left to quiz in this set");
            return;
        }
        self.quiz.quiz = Some(quiz);
        self.quiz.input.clear();
        self.quiz.outcome = None;
        self.quiz.answered_at = None;
    }

    fn submit_quiz_answer(&mut self) {
        let Some(ref mut quiz) = self.quiz.quiz else {
            return;
        };
        let Some(outcome) = quiz.submit(&self.quiz.input) else {
            return;
        };

        if outcome.correct {
            if let Some(ref mut session) = self.session {
                if session.mark_mastered(&outcome.item_id, &mut self.rng) {
                    self.persist();
                }
            }
        }
        debug!("quiz answer for {}: {}", outcome.item_id, outcome.correct);

        self.quiz.input.clear();
        self.quiz.outcome = Some(outcome);
        self.quiz.answered_at = Some(Instant::now());
    }

    fn next_quiz_question(&mut self) {
        if let Some(ref mut quiz) = self.quiz.quiz {
            quiz.next();
        }
        self.quiz.outcome = None;
        self.quiz.answered_at = None;
    }

    fn change_quiz_length(&mut self, longer: bool) {
        if self.quiz.all {
            if !longer {
                self.quiz.all = false;
                self.quiz.length = MAX_QUIZ_LENGTH;
            }
            return;
        }
        if longer && self.quiz.length >= MAX_QUIZ_LENGTH {
            self.quiz.all = true;
            return;
        }
        let length = if longer {
            self.quiz.length + QUIZ_LENGTH_STEP
        } else {
            self.quiz.length.saturating_sub(QUIZ_LENGTH_STEP)
        };
        self.quiz.length = length.clamp(MIN_QUIZ_LENGTH, MAX_QUIZ_LENGTH);
    }

    // ══════════════════════════════════════════════════════════════════════
    // Drill actions
    // ══════════════════════════════════════════════════════════════════════

    fn start_irregular_drill(&mut self) {
        let verbs = self.drill_setup.chosen_verbs();
        let tenses = self.drill_setup.chosen_tenses();
        match TableDrill::irregular(&self.irregular, &verbs, &tenses) {
            Ok(drill) => {
                info!("irregular drill: {} verbs, {} tenses", verbs.len(), tenses.len());
                self.drill = Some(drill);
                self.screen = Screen::Drill;
            }
            Err(err) => self.set_status(err.to_string()),
        }
    }

    fn start_pattern_drill(&mut self) {
        info!("ending pattern drill");
        self.drill = Some(TableDrill::endings(&ENDING_PATTERNS));
        self.screen = Screen::Drill;
    }

    fn toggle_drill_check(&mut self) {
        let Some(ref mut drill) = self.drill else {
            return;
        };
        if let Some(score) = drill.toggle_validation() {
            let text = format!(
                "{}/{} correct ({}%) {}",
                score.correct,
                score.total,
                score.percent(),
                score_message(score.percent())
            );
            self.set_status(text);
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Event Handling
    // ══════════════════════════════════════════════════════════════════════

    pub fn handle_events(&mut self) -> anyhow::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        self.tick();
        Ok(())
    }

    /// Time-driven updates: quiz auto-advance and message expiry.
    pub fn tick(&mut self) {
        if self.screen == Screen::Quiz
            && self
                .quiz
                .answered_at
                .is_some_and(|at| at.elapsed() >= QUIZ_ADVANCE_AFTER)
        {
            self.next_quiz_question();
        }
        if self.toast.is_some() && self.visible_toast().is_none() {
            self.toast = None;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(confirm) = self.confirm {
            self.handle_confirm_keys(confirm, key.code);
            return;
        }

        match self.screen {
            Screen::SetSelect => self.handle_set_select_keys(key.code),
            Screen::VerbPicker => self.handle_picker_keys(key.code),
            Screen::Study => self.handle_study_keys(key.code),
            Screen::Complete => self.handle_complete_keys(key.code),
            Screen::Quiz => self.handle_quiz_keys(key.code),
            Screen::DrillSetup => self.handle_drill_setup_keys(key.code),
            Screen::Drill => self.handle_drill_keys(key),
            Screen::Reference => self.handle_reference_keys(key.code),
            Screen::Help => self.handle_help_keys(key.code),
        }
    }

    fn handle_confirm_keys(&mut self, confirm: Confirm, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.confirm = None;
                match confirm {
                    Confirm::Reset => self.reset_progress(),
                    Confirm::ClearAll => self.clear_all(),
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.confirm = None,
            _ => {}
        }
    }

    fn handle_set_select_keys(&mut self, key: KeyCode) {
        let entries = self.menu_entries();
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char('h') => self.open_overlay(Screen::Reference),
            KeyCode::Char('d') => self.open_drill_setup(),
            KeyCode::Char('?') => self.open_overlay(Screen::Help),
            KeyCode::Char('c') => self.confirm = Some(Confirm::ClearAll),
            KeyCode::Up | KeyCode::Char('k') => {
                let i = self.menu_state.selected().unwrap_or(0);
                let new_i = if i == 0 {
                    entries.len().saturating_sub(1)
                } else {
                    i - 1
                };
                self.menu_state.select(Some(new_i));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let i = self.menu_state.selected().unwrap_or(0);
                let new_i = if i >= entries.len().saturating_sub(1) {
                    0
                } else {
                    i + 1
                };
                self.menu_state.select(Some(new_i));
            }
            KeyCode::Enter => {
                let selected = self.menu_state.selected().unwrap_or(0);
                match entries.get(selected) {
                    Some(MenuEntry::Resume) => {
                        self.screen = Screen::Study;
                        self.settle_screen();
                    }
                    Some(MenuEntry::Set(id)) => {
                        self.start_session(Selection::set(id.clone()));
                    }
                    Some(MenuEntry::Custom) => {
                        self.picker.clamp_selection();
                        self.screen = Screen::VerbPicker;
                    }
                    None => {}
                }
            }
            _ => {}
        }
    }

    fn handle_picker_keys(&mut self, key: KeyCode) {
        if self.picker.searching {
            match key {
                KeyCode::Esc | KeyCode::Enter => self.picker.searching = false,
                KeyCode::Backspace => self.picker.pop_search(),
                KeyCode::Char(c) => self.picker.push_search(c),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Esc => self.go_to_menu(),
            KeyCode::Up | KeyCode::Char('k') => self.picker.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.picker.move_selection(true),
            KeyCode::Char(' ') => self.picker.toggle_selected(),
            KeyCode::Char('a') => self.picker.choose_visible(),
            KeyCode::Char('x') => self.picker.chosen.clear(),
            KeyCode::Char('f') => {
                self.picker.filter.class = cycle(self.picker.filter.class, &GrammaticalClass::ALL);
                self.picker.clamp_selection();
            }
            KeyCode::Char('g') => {
                self.picker.filter.family =
                    cycle(self.picker.filter.family, &ConjugationFamily::ALL);
                self.picker.clamp_selection();
            }
            KeyCode::Char('e') => {
                self.picker.filter.tense = cycle(self.picker.filter.tense, &Tense::ALL);
            }
            KeyCode::Char('/') => self.picker.searching = true,
            KeyCode::Enter => match self.picker.selection() {
                Some(selection) => {
                    self.start_session(selection);
                }
                None => self.set_status("Pick at least one verb"),
            },
            _ => {}
        }
    }

    fn handle_study_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.go_to_menu(),
            KeyCode::Char(' ') => self.reveal(),
            KeyCode::Right | KeyCode::Char('n') => self.advance(),
            KeyCode::Left | KeyCode::Char('p') => self.retreat(),
            KeyCode::Char('m') => self.mark_mastered(),
            KeyCode::Char('s') => self.shuffle(),
            KeyCode::Char('r') => self.confirm = Some(Confirm::Reset),
            KeyCode::Char('c') => self.confirm = Some(Confirm::ClearAll),
            KeyCode::Char('l') => self.toggle_direction(),
            KeyCode::Char('h') => self.open_overlay(Screen::Reference),
            KeyCode::Char('z') => self.open_quiz(),
            KeyCode::Char('d') => self.open_drill_setup(),
            KeyCode::Char('?') => self.open_overlay(Screen::Help),
            KeyCode::Char('t') => self.cycle_theme(),
            _ => {}
        }
    }

    fn handle_complete_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Enter => self.go_to_menu(),
            KeyCode::Char('r') => self.confirm = Some(Confirm::Reset),
            KeyCode::Char('c') => self.confirm = Some(Confirm::ClearAll),
            KeyCode::Char('h') => self.open_overlay(Screen::Reference),
            KeyCode::Char('d') => self.open_drill_setup(),
            KeyCode::Char('?') => self.open_overlay(Screen::Help),
            KeyCode::Char('t') => self.cycle_theme(),
            _ => {}
        }
    }

    fn handle_quiz_keys(&mut self, key: KeyCode) {
        let finished = self.quiz.quiz.as_ref().map(Quiz::is_finished);
        match finished {
            // Setup
            None => match key {
                KeyCode::Esc => self.close_overlay(),
                KeyCode::Left | KeyCode::Char('-') => self.change_quiz_length(false),
                KeyCode::Right | KeyCode::Char('+') => self.change_quiz_length(true),
                KeyCode::Char('l') => self.quiz.direction = self.quiz.direction.toggled(),
                KeyCode::Enter => self.begin_quiz(),
                _ => {}
            },
            // Results
            Some(true) => match key {
                KeyCode::Esc | KeyCode::Enter => self.close_overlay(),
                KeyCode::Char('r') => self.quiz.quiz = None,
                _ => {}
            },
            // Question or verdict
            Some(false) => {
                if self.quiz.outcome.is_some() {
                    match key {
                        KeyCode::Enter => self.next_quiz_question(),
                        KeyCode::Esc => self.close_overlay(),
                        _ => {}
                    }
                    return;
                }
                match key {
                    KeyCode::Esc => self.close_overlay(),
                    KeyCode::Enter => self.submit_quiz_answer(),
                    KeyCode::Backspace => {
                        self.quiz.input.pop();
                    }
                    KeyCode::Char(c) => self.quiz.input.push(c),
                    _ => {}
                }
            }
        }
    }

    fn handle_drill_setup_keys(&mut self, key: KeyCode) {
        let setup = &mut self.drill_setup;
        match key {
            KeyCode::Esc => self.close_overlay(),
            KeyCode::Up | KeyCode::Char('k') => {
                let i = setup.list_state.selected().unwrap_or(0);
                let new_i = if i == 0 {
                    setup.verbs.len().saturating_sub(1)
                } else {
                    i - 1
                };
                setup.list_state.select(Some(new_i));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let i = setup.list_state.selected().unwrap_or(0);
                let new_i = if i >= setup.verbs.len().saturating_sub(1) {
                    0
                } else {
                    i + 1
                };
                setup.list_state.select(Some(new_i));
            }
            KeyCode::Char(' ') => {
                if let Some(verb) = setup
                    .list_state
                    .selected()
                    .and_then(|i| setup.verbs.get(i))
                {
                    if !setup.chosen.remove(verb) {
                        setup.chosen.insert(verb.clone());
                    }
                }
            }
            KeyCode::Char('1') => setup.toggle_tense(Tense::Present),
            KeyCode::Char('2') => setup.toggle_tense(Tense::Preterite),
            KeyCode::Enter => self.start_irregular_drill(),
            KeyCode::Char('p') => self.start_pattern_drill(),
            _ => {}
        }
    }

    fn handle_drill_keys(&mut self, key: KeyEvent) {
        let Some(ref mut drill) = self.drill else {
            self.screen = Screen::DrillSetup;
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.drill = None;
                self.screen = Screen::DrillSetup;
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                drill.reset();
                self.set_status("Answers cleared");
            }
            KeyCode::Tab | KeyCode::Down => drill.focus_next(),
            KeyCode::BackTab | KeyCode::Up => drill.focus_prev(),
            KeyCode::Enter => self.toggle_drill_check(),
            KeyCode::Backspace => drill.backspace(),
            KeyCode::Char(c) => drill.type_char(c),
            _ => {}
        }
    }

    fn handle_reference_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') => self.close_overlay(),
            KeyCode::Down | KeyCode::Char('j') => {
                self.reference_scroll = self.reference_scroll.saturating_add(1)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.reference_scroll = self.reference_scroll.saturating_sub(1)
            }
            KeyCode::PageDown => self.reference_scroll = self.reference_scroll.saturating_add(10),
            KeyCode::PageUp => self.reference_scroll = self.reference_scroll.saturating_sub(10),
            KeyCode::Home => self.reference_scroll = 0,
            _ => {}
        }
    }

    fn handle_help_keys(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            self.close_overlay();
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Helper Functions
// ══════════════════════════════════════════════════════════════════════════

/// Steps an optional filter through `all` and back to unset.
fn cycle<T: Copy + PartialEq>(current: Option<T>, all: &[T]) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => all
            .iter()
            .position(|v| *v == value)
            .and_then(|i| all.get(i + 1))
            .copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn app_in(dir: &TempDir) -> App {
        let store = SessionStore::new(dir.path().join("data")).unwrap();
        let rng = ChaCha8Rng::seed_from_u64(7);
        App::new(store, Config::default(), rng)
            .unwrap()
            .with_config_path(dir.path().join("config.toml"))
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn start_first_set(app: &mut App) {
        assert_eq!(app.screen, Screen::SetSelect);
        press(app, KeyCode::Enter);
    }

    #[test]
    fn fresh_start_shows_set_selection() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);
        assert_eq!(app.screen, Screen::SetSelect);
        assert!(app.session.is_none());
        assert_eq!(app.menu_entries().len(), 5);
        assert_eq!(app.menu_entries()[4], MenuEntry::Custom);
    }

    #[test]
    fn choosing_a_set_starts_and_persists_a_session() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        start_first_set(&mut app);

        assert_eq!(app.screen, Screen::Study);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.items().len(), 40);
        assert!(app.store.load().unwrap().is_some());
    }

    #[test]
    fn study_keys_drive_the_session() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        start_first_set(&mut app);

        press(&mut app, KeyCode::Char(' '));
        assert!(app.session.as_ref().unwrap().is_revealed());

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Left);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.total_attempts(), 2);
        assert!(!session.is_revealed());
        assert!(app.toast.is_some());

        press(&mut app, KeyCode::Char('m'));
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.remaining(), 39);
        assert_eq!(session.correct_attempts(), 1);
        assert_eq!(app.toast.as_ref().unwrap().tone, Some(Tone::Progress));

        let stored = app.store.load().unwrap().unwrap();
        assert_eq!(stored.correct_attempts, 1);
        assert_eq!(stored.total_attempts, 3);
    }

    #[test]
    fn mastering_everything_completes() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        start_first_set(&mut app);

        for _ in 0..40 {
            press(&mut app, KeyCode::Char('m'));
        }
        assert_eq!(app.screen, Screen::Complete);

        // Nothing left, nothing changes
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.session.as_ref().unwrap().total_attempts(), 40);
    }

    #[test]
    fn reset_asks_first() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        start_first_set(&mut app);
        press(&mut app, KeyCode::Char('m'));

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.confirm, Some(Confirm::Reset));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.confirm, None);
        assert_eq!(app.session.as_ref().unwrap().remaining(), 39);

        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char('y'));
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.remaining(), 40);
        assert_eq!(session.total_attempts(), 0);
        assert_eq!(app.screen, Screen::Study);
    }

    #[test]
    fn clear_all_forgets_the_record() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        start_first_set(&mut app);

        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.screen, Screen::SetSelect);
        assert!(app.session.is_none());
        assert!(app.store.load().unwrap().is_none());
    }

    #[test]
    fn session_resumes_on_restart() {
        let dir = TempDir::new().unwrap();
        {
            let mut app = app_in(&dir);
            start_first_set(&mut app);
            press(&mut app, KeyCode::Char('m'));
            press(&mut app, KeyCode::Char('n'));
        }

        let app = app_in(&dir);
        assert_eq!(app.screen, Screen::Study);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.remaining(), 39);
        assert_eq!(session.cursor(), 1);
        assert_eq!(app.menu_entries()[0], MenuEntry::Resume);
    }

    #[test]
    fn escape_keeps_session_for_resume() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        start_first_set(&mut app);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::SetSelect);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Study);
        assert_eq!(app.session.as_ref().unwrap().items().len(), 40);
    }

    #[test]
    fn quiz_answers_feed_mastery() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        start_first_set(&mut app);

        press(&mut app, KeyCode::Char('z'));
        assert_eq!(app.screen, Screen::Quiz);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.quiz.quiz.as_ref().unwrap().len(), 10);

        // Blank answers are ignored
        type_text(&mut app, "  ");
        press(&mut app, KeyCode::Enter);
        assert!(app.quiz.outcome.is_none());
        app.quiz.input.clear();

        let expected = app.quiz.quiz.as_ref().unwrap().current().unwrap().expected.clone();
        type_text(&mut app, &expected.to_uppercase());
        press(&mut app, KeyCode::Enter);
        assert!(app.quiz.outcome.as_ref().unwrap().correct);
        assert_eq!(app.session.as_ref().unwrap().remaining(), 39);

        // Auto-advance once the verdict has been up long enough
        app.quiz.answered_at = Instant::now().checked_sub(QUIZ_ADVANCE_AFTER);
        app.tick();
        assert!(app.quiz.outcome.is_none());
        assert_eq!(app.quiz.quiz.as_ref().unwrap().position(), 1);

        type_text(&mut app, "nope");
        press(&mut app, KeyCode::Enter);
        assert!(!app.quiz.outcome.as_ref().unwrap().correct);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.quiz.quiz.as_ref().unwrap().position(), 2);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Study);
    }

    #[test]
    fn quiz_length_is_bounded() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        start_first_set(&mut app);
        press(&mut app, KeyCode::Char('z'));

        for _ in 0..20 {
            press(&mut app, KeyCode::Right);
        }
        assert!(app.quiz.all);
        press(&mut app, KeyCode::Left);
        assert!(!app.quiz.all);
        assert_eq!(app.quiz.length, MAX_QUIZ_LENGTH);
        for _ in 0..20 {
            press(&mut app, KeyCode::Left);
        }
        assert_eq!(app.quiz.length, MIN_QUIZ_LENGTH);
    }

    #[test]
    fn cycling_the_theme_saves_the_preference() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, KeyCode::Char('t'));

        assert_eq!(app.config.theme, "kanagawa-wave");
        let saved = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(saved.theme, "kanagawa-wave");
    }

    #[test]
    fn failed_clear_keeps_the_session() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        start_first_set(&mut app);

        let path = app.store.session_path();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('y'));

        assert!(app.session.is_some());
        assert_eq!(app.screen, Screen::Study);
        let toast = app.visible_toast().unwrap();
        assert!(toast.text.starts_with("Could not clear progress"));
    }

    #[test]
    fn quiz_can_ask_every_unmastered_item() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        assert!(app.start_session(Selection::set("all-verbs")));
        let remaining = app.session.as_ref().unwrap().remaining();
        assert_eq!(remaining, 150);

        press(&mut app, KeyCode::Char('z'));
        for _ in 0..100 {
            press(&mut app, KeyCode::Right);
        }
        press(&mut app, KeyCode::Enter);

        let quiz = app.quiz.quiz.as_ref().unwrap();
        assert_eq!(quiz.len(), remaining);
    }

    #[test]
    fn irregular_drill_from_setup() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.screen, Screen::DrillSetup);
        assert_eq!(app.drill_setup.chosen_verbs(), vec!["tener".to_string()]);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Drill);
        assert_eq!(app.drill.as_ref().unwrap().fields().len(), 10);

        type_text(&mut app, "tengo");
        press(&mut app, KeyCode::Enter);
        assert!(app.drill.as_ref().unwrap().is_validating());
        assert!(app.toast.as_ref().unwrap().text.starts_with("1/10"));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::DrillSetup);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::SetSelect);
    }

    #[test]
    fn drill_needs_a_tense() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::DrillSetup);
        assert!(app.toast.is_some());
    }

    #[test]
    fn custom_picker_builds_a_verb_selection() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::VerbPicker);

        // Nothing chosen yet
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::VerbPicker);

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "habl");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.picker.visible().len(), 1);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.picker.item_count(), 5);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Study);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.items().len(), 5);
        assert!(session.items().iter().all(|i| i.verb == "hablar"));
    }

    #[test]
    fn overlays_return_where_they_came_from() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        start_first_set(&mut app);

        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.screen, Screen::Reference);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.reference_scroll, 1);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Study);

        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.screen, Screen::Help);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Study);
    }

    #[test]
    fn cycle_walks_options_then_unsets() {
        assert_eq!(cycle(None, &Tense::ALL), Some(Tense::Present));
        assert_eq!(cycle(Some(Tense::Present), &Tense::ALL), Some(Tense::Preterite));
        assert_eq!(cycle(Some(Tense::Preterite), &Tense::ALL), None);
    }
}
