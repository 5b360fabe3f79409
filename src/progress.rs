//! Derived statistics and feedback messages.

use rand::Rng;

use crate::session::SessionState;

/// Rounded percentage of `part` in `whole`, 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let value = (part as f64 / whole as f64 * 100.0).round();
    value.clamp(0.0, 100.0) as u8
}

/// Read-side statistics over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub total_items: usize,
    pub mastered: usize,
    pub remaining: usize,
    pub regular_mastered: usize,
    pub irregular_mastered: usize,
    pub total_attempts: u32,
    pub correct_attempts: u32,
    /// 1-based position in the traversal, 0 when nothing is left.
    pub position: usize,
}

impl Progress {
    pub fn of(session: &SessionState) -> Self {
        let mut progress = Self {
            total_items: session.items().len(),
            remaining: session.remaining(),
            total_attempts: session.total_attempts(),
            correct_attempts: session.correct_attempts(),
            position: if session.remaining() > 0 {
                session.cursor() + 1
            } else {
                0
            },
            ..Default::default()
        };

        for item in session.items().iter().filter(|i| i.mastered) {
            progress.mastered += 1;
            if item.is_irregular() {
                progress.irregular_mastered += 1;
            } else {
                progress.regular_mastered += 1;
            }
        }

        progress
    }

    pub fn mastery_percent(&self) -> u8 {
        percent(self.mastered, self.total_items)
    }

    /// Share of attempts that ended in marking an item mastered. Advancing
    /// counts as an attempt, marking mastered counts as a correct one.
    pub fn accuracy_percent(&self) -> u8 {
        percent(self.correct_attempts as usize, self.total_attempts as usize)
    }

    /// An empty working set is never complete.
    pub fn is_complete(&self) -> bool {
        self.total_items > 0 && self.mastered == self.total_items
    }
}

/// Tone of a transient message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Encouraging,
    Critical,
    Progress,
}

const ENCOURAGING: [&str; 5] = [
    "¡Excelente! You're on fire! 🔥",
    "¡Muy bien! You're crushing it! 💪",
    "¡Perfecto! You're a Spanish superstar! ⭐",
    "¡Increíble! You're making amazing progress! 🎉",
    "¡Fantástico! You're becoming fluent! 🌟",
];

const CRITICAL: [&str; 4] = [
    "¡Ay caramba! That was... interesting! 🤔",
    "¡Ups! I think you might need a coffee break! ☕",
    "¡Oh no! That was like watching a cat try to dance! 😸",
    "¡Madre mía! That attempt was... creative! 🎨",
];

const PROGRESS: [&str; 3] = [
    "¡Felicidades! You've mastered another verb! 🎊",
    "¡Increíble progreso! You're getting stronger! 💪",
    "¡Excelente trabajo! You're building your vocabulary! 📚",
];

/// A cosmetic message picked after a study action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub tone: Tone,
    pub message: &'static str,
}

impl Feedback {
    /// Roughly 70% encouraging, 30% critical.
    pub fn after_advance<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random::<f64>() > 0.3 {
            Self::pick(Tone::Encouraging, &ENCOURAGING, rng)
        } else {
            Self::pick(Tone::Critical, &CRITICAL, rng)
        }
    }

    pub fn after_mastered<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::pick(Tone::Progress, &PROGRESS, rng)
    }

    fn pick<R: Rng + ?Sized>(tone: Tone, pool: &[&'static str], rng: &mut R) -> Self {
        let message = pool[rng.random_range(0..pool.len())];
        Self { tone, message }
    }
}

/// Verdict for a quiz or drill score.
pub fn score_message(percentage: u8) -> &'static str {
    match percentage {
        90..=u8::MAX => "¡Excelente! You're a conjugation master! 🌟",
        80..=89 => "¡Muy bien! Great job! 💪",
        70..=79 => "¡Bien! Good understanding of the forms! 👍",
        60..=69 => "¡Bastante bien! Keep practicing! 📚",
        _ => "¡Sigue practicando! Review the forms and try again! 🔄",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{test_item, Direction, GrammaticalClass};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn session(n: usize, rng: &mut ChaCha8Rng) -> SessionState {
        let items = (0..n).map(|i| test_item(&format!("i{i}"))).collect();
        SessionState::new(items, Direction::EnglishFirst, rng)
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(5, 5), 100);
    }

    #[test]
    fn fresh_session_has_zero_accuracy() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let progress = Progress::of(&session(4, &mut rng));
        assert_eq!(progress.accuracy_percent(), 0);
        assert_eq!(progress.mastery_percent(), 0);
        assert_eq!(progress.position, 1);
        assert!(!progress.is_complete());
    }

    #[test]
    fn empty_set_is_not_complete() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let progress = Progress::of(&session(0, &mut rng));
        assert!(!progress.is_complete());
        assert_eq!(progress.mastery_percent(), 0);
        assert_eq!(progress.position, 0);
    }

    #[test]
    fn accuracy_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut s = session(6, &mut rng);
        for step in 0..40 {
            if step % 3 == 0 {
                s.mark_current_mastered(&mut rng);
            } else if s.advance(&mut rng).is_none() {
                s.shuffle(&mut rng);
            }
            let accuracy = Progress::of(&s).accuracy_percent();
            assert!(accuracy <= 100);
        }
    }

    #[test]
    fn counts_mastered_by_class() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut irregular = test_item("irr");
        irregular.grammatical_class = GrammaticalClass::Irregular;
        let items = vec![test_item("reg"), irregular];
        let mut s = SessionState::new(items, Direction::EnglishFirst, &mut rng);
        s.mark_mastered("irr", &mut rng);

        let progress = Progress::of(&s);
        assert_eq!(progress.mastered, 1);
        assert_eq!(progress.irregular_mastered, 1);
        assert_eq!(progress.regular_mastered, 0);
        assert_eq!(progress.mastery_percent(), 50);
    }

    #[test]
    fn advance_feedback_is_mostly_encouraging() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let encouraging = (0..1000)
            .filter(|_| Feedback::after_advance(&mut rng).tone == Tone::Encouraging)
            .count();
        assert!((620..780).contains(&encouraging), "encouraging {encouraging}");
    }

    #[test]
    fn mastered_feedback_uses_progress_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let feedback = Feedback::after_mastered(&mut rng);
        assert_eq!(feedback.tone, Tone::Progress);
        assert!(PROGRESS.contains(&feedback.message));
    }

    #[test]
    fn score_message_bands() {
        assert!(score_message(100).starts_with("¡Excelente"));
        assert!(score_message(85).starts_with("¡Muy bien"));
        assert!(score_message(70).starts_with("¡Bien"));
        assert!(score_message(60).starts_with("¡Bastante"));
        assert!(score_message(10).starts_with("¡Sigue"));
    }
}
