//! Fill-in-the-table drills over the reference tables.

use thiserror::Error;

use crate::models::{Person, Tense};
use crate::progress::percent;
use crate::quiz::answers_match;
use crate::reference::{EndingPattern, IrregularTable};

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DrillError {
    #[error("pick at least one verb and one tense")]
    EmptySelection,
    #[error("no irregular table for {0}")]
    UnknownVerb(String),
}

/// What a drill cell asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillColumn {
    Form(Tense),
    Ending,
    Example,
}

impl DrillColumn {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Form(tense) => tense.name(),
            Self::Ending => "ending",
            Self::Example => "example",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillField {
    /// Verb or pattern title the cell belongs to.
    pub group: String,
    pub person: Person,
    pub column: DrillColumn,
    pub expected: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Correct,
    Incorrect,
    Empty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrillScore {
    pub correct: usize,
    pub total: usize,
}

impl DrillScore {
    pub fn percent(&self) -> u8 {
        percent(self.correct, self.total)
    }
}

#[derive(Debug, Clone)]
pub struct TableDrill {
    title: String,
    fields: Vec<DrillField>,
    answers: Vec<String>,
    focus: usize,
    validating: bool,
}

impl TableDrill {
    /// One cell per person and tense of each chosen irregular verb.
    pub fn irregular(
        tables: &[IrregularTable],
        verbs: &[String],
        tenses: &[Tense],
    ) -> Result<Self, DrillError> {
        if verbs.is_empty() || tenses.is_empty() {
            return Err(DrillError::EmptySelection);
        }

        let mut fields = Vec::new();
        for verb in verbs {
            let table = tables
                .iter()
                .find(|t| t.verb == *verb)
                .ok_or_else(|| DrillError::UnknownVerb(verb.clone()))?;
            for form in &table.forms {
                for &tense in tenses {
                    fields.push(DrillField {
                        group: table.verb.clone(),
                        person: form.person,
                        column: DrillColumn::Form(tense),
                        expected: form.form(tense).to_string(),
                    });
                }
            }
        }

        Ok(Self::with_fields("Irregular verbs", fields))
    }

    /// Ending and example cells for every row of each pattern.
    pub fn endings(patterns: &[EndingPattern]) -> Self {
        let fields = patterns
            .iter()
            .flat_map(|pattern| {
                pattern.rows.iter().flat_map(move |row| {
                    [
                        DrillField {
                            group: pattern.title.to_string(),
                            person: row.person,
                            column: DrillColumn::Ending,
                            expected: row.ending.to_string(),
                        },
                        DrillField {
                            group: pattern.title.to_string(),
                            person: row.person,
                            column: DrillColumn::Example,
                            expected: row.example.to_string(),
                        },
                    ]
                })
            })
            .collect();

        Self::with_fields("Conjugation patterns", fields)
    }

    fn with_fields(title: &str, fields: Vec<DrillField>) -> Self {
        Self {
            title: title.to_string(),
            answers: vec![String::new(); fields.len()],
            fields,
            focus: 0,
            validating: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &[DrillField] {
        &self.fields
    }

    pub fn answer(&self, index: usize) -> &str {
        self.answers.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn set_answer(&mut self, index: usize, text: &str) {
        if let Some(answer) = self.answers.get_mut(index) {
            *answer = text.to_string();
        }
    }

    pub fn type_char(&mut self, c: char) {
        if let Some(answer) = self.answers.get_mut(self.focus) {
            answer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(answer) = self.answers.get_mut(self.focus) {
            answer.pop();
        }
    }

    pub fn is_validating(&self) -> bool {
        self.validating
    }

    /// Turns checking on or off. Returns the score when turned on.
    pub fn toggle_validation(&mut self) -> Option<DrillScore> {
        self.validating = !self.validating;
        self.validating.then(|| self.score())
    }

    /// Per-field verdict, only while checking is on.
    pub fn status(&self, index: usize) -> Option<FieldStatus> {
        if !self.validating {
            return None;
        }
        let field = self.fields.get(index)?;
        let answer = self.answer(index);
        Some(if answer.trim().is_empty() {
            FieldStatus::Empty
        } else if answers_match(answer, &field.expected) {
            FieldStatus::Correct
        } else {
            FieldStatus::Incorrect
        })
    }

    pub fn score(&self) -> DrillScore {
        let correct = self
            .fields
            .iter()
            .zip(&self.answers)
            .filter(|(field, answer)| answers_match(answer, &field.expected))
            .count();
        DrillScore {
            correct,
            total: self.fields.len(),
        }
    }

    /// Clears every answer and turns checking off.
    pub fn reset(&mut self) {
        for answer in &mut self.answers {
            answer.clear();
        }
        self.validating = false;
        self.focus = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{irregular_tables, ENDING_PATTERNS};

    fn verbs(list: &[&str]) -> Vec<String> {
        list.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn requires_verbs_and_tenses() {
        let tables = irregular_tables().unwrap();
        assert_eq!(
            TableDrill::irregular(&tables, &[], &Tense::ALL).unwrap_err(),
            DrillError::EmptySelection
        );
        assert_eq!(
            TableDrill::irregular(&tables, &verbs(&["tener"]), &[]).unwrap_err(),
            DrillError::EmptySelection
        );
        assert_eq!(
            TableDrill::irregular(&tables, &verbs(&["volar"]), &Tense::ALL).unwrap_err(),
            DrillError::UnknownVerb("volar".to_string())
        );
    }

    #[test]
    fn irregular_drill_has_cell_per_person_and_tense() {
        let tables = irregular_tables().unwrap();
        let drill = TableDrill::irregular(&tables, &verbs(&["tener", "ser"]), &Tense::ALL).unwrap();
        assert_eq!(drill.fields().len(), 20);

        let present_only =
            TableDrill::irregular(&tables, &verbs(&["tener"]), &[Tense::Present]).unwrap();
        assert_eq!(present_only.fields().len(), 5);
        assert_eq!(present_only.fields()[0].expected, "tengo");
    }

    #[test]
    fn validation_reports_each_field() {
        let tables = irregular_tables().unwrap();
        let mut drill =
            TableDrill::irregular(&tables, &verbs(&["tener"]), &[Tense::Present]).unwrap();
        drill.set_answer(0, " Tengo ");
        drill.set_answer(1, "tenes");

        assert_eq!(drill.status(0), None);
        let score = drill.toggle_validation().unwrap();
        assert_eq!(score, DrillScore { correct: 1, total: 5 });
        assert_eq!(score.percent(), 20);
        assert_eq!(drill.status(0), Some(FieldStatus::Correct));
        assert_eq!(drill.status(1), Some(FieldStatus::Incorrect));
        assert_eq!(drill.status(2), Some(FieldStatus::Empty));

        assert!(drill.toggle_validation().is_none());
        assert_eq!(drill.status(0), None);
    }

    #[test]
    fn typing_goes_to_focused_field() {
        let mut drill = TableDrill::endings(&ENDING_PATTERNS);
        assert_eq!(drill.fields().len(), 50);

        drill.focus_prev();
        assert_eq!(drill.focus(), 49);
        drill.focus_next();
        assert_eq!(drill.focus(), 0);

        for c in "-oo".chars() {
            drill.type_char(c);
        }
        drill.backspace();
        assert_eq!(drill.answer(0), "-o");
        assert_eq!(drill.score().correct, 1);

        drill.toggle_validation();
        drill.reset();
        assert_eq!(drill.answer(0), "");
        assert!(!drill.is_validating());
        assert_eq!(drill.score().correct, 0);
    }
}
