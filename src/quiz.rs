//! Typed-answer quiz over a working set.
//!
//! Scored independently of the flashcard counters. A correct answer reports
//! the item id so the caller can mark it mastered in the session.

use log::info;
use rand::seq::index;
use rand::Rng;

use crate::models::{ConjugationItem, Direction};
use crate::progress::percent;

pub const DEFAULT_QUIZ_LENGTH: usize = 10;
pub const MIN_QUIZ_LENGTH: usize = 5;
pub const MAX_QUIZ_LENGTH: usize = 50;

/// Trimmed, case-insensitive exact comparison.
pub fn answers_match(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub item_id: String,
    pub prompt: String,
    pub expected: String,
    pub answer: Option<String>,
    pub correct: bool,
}

/// Result of submitting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub item_id: String,
    pub correct: bool,
    pub expected: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: usize,
    pub answered: usize,
}

impl QuizScore {
    pub fn percent(&self) -> u8 {
        percent(self.correct, self.answered)
    }
}

#[derive(Debug, Clone)]
pub struct Quiz {
    questions: Vec<QuizQuestion>,
    index: usize,
    direction: Direction,
    correct_answers: usize,
    total_answered: usize,
    finished: bool,
}

impl Quiz {
    /// Samples up to `length` unmastered items without replacement.
    pub fn start<R: Rng + ?Sized>(
        items: &[ConjugationItem],
        length: usize,
        direction: Direction,
        rng: &mut R,
    ) -> Self {
        let available: Vec<&ConjugationItem> = items.iter().filter(|i| !i.mastered).collect();
        let amount = length.min(available.len());

        let questions: Vec<QuizQuestion> = index::sample(rng, available.len(), amount)
            .into_iter()
            .map(|i| {
                let item = available[i];
                QuizQuestion {
                    item_id: item.id.clone(),
                    prompt: direction.prompt(item).to_string(),
                    expected: direction.answer(item).to_string(),
                    answer: None,
                    correct: false,
                }
            })
            .collect();

        info!("quiz started with {} questions", questions.len());

        Self {
            finished: questions.is_empty(),
            questions,
            index: 0,
            direction,
            correct_answers: 0,
            total_answered: 0,
        }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Zero-based index of the current question.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn current(&self) -> Option<&QuizQuestion> {
        if self.finished {
            return None;
        }
        self.questions.get(self.index)
    }

    /// Whether the current question already has an answer.
    pub fn is_answered(&self) -> bool {
        self.current().is_some_and(|q| q.answer.is_some())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn score(&self) -> QuizScore {
        QuizScore {
            correct: self.correct_answers,
            answered: self.total_answered,
        }
    }

    /// Checks `input` against the current question.
    ///
    /// Blank input and a second answer to the same question are ignored.
    pub fn submit(&mut self, input: &str) -> Option<QuizOutcome> {
        if input.trim().is_empty() || self.finished {
            return None;
        }
        let question = self.questions.get_mut(self.index)?;
        if question.answer.is_some() {
            return None;
        }

        let correct = answers_match(input, &question.expected);
        question.answer = Some(input.trim().to_string());
        question.correct = correct;

        self.total_answered += 1;
        if correct {
            self.correct_answers += 1;
        }

        Some(QuizOutcome {
            item_id: question.item_id.clone(),
            correct,
            expected: question.expected.clone(),
        })
    }

    /// Moves past an answered question. Finishes after the last one.
    pub fn next(&mut self) -> bool {
        if !self.is_answered() {
            return false;
        }
        if self.index + 1 < self.questions.len() {
            self.index += 1;
        } else {
            self.finished = true;
            let score = self.score();
            info!("quiz finished: {}/{}", score.correct, score.answered);
        }
        true
    }
}
