//! Study session state machine.
//!
//! A [`SessionState`] owns the working-set copy with its mastery flags, the
//! shuffled traversal over the unmastered items, the cursor into it and the
//! attempt counters. Every mutation goes through the methods here; the UI
//! persists a [`SessionSnapshot`] after each one.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Local};
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::models::{ConjugationItem, Direction};
use crate::progress::Feedback;
use crate::selector::{build_working_set, Selection};

/// Version of the persisted record layout.
pub const SNAPSHOT_VERSION: u32 = 1;

/// In-place Fisher–Yates shuffle: walk from the back, swap each slot with a
/// uniformly drawn slot at or before it.
pub fn fisher_yates<T, R: Rng + ?Sized>(slice: &mut [T], rng: &mut R) {
    for i in (1..slice.len()).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

/// Coarse lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The working set has no items; the user must pick something else.
    Empty,
    Active,
    /// Every item is mastered. Only a reset or a new working set leaves this.
    Completed,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    selection: Option<Selection>,
    items: Vec<ConjugationItem>,
    /// Indices into `items` of the unmastered items, in traversal order.
    order: Vec<usize>,
    cursor: usize,
    total_attempts: u32,
    correct_attempts: u32,
    direction: Direction,
    revealed: bool,
}

impl SessionState {
    /// Starts a session over `items`. Mastery flags are cleared.
    pub fn new<R: Rng + ?Sized>(
        items: Vec<ConjugationItem>,
        direction: Direction,
        rng: &mut R,
    ) -> Self {
        let items = items.iter().map(ConjugationItem::fresh_clone).collect();
        let mut session = Self {
            selection: None,
            items,
            order: Vec::new(),
            cursor: 0,
            total_attempts: 0,
            correct_attempts: 0,
            direction,
            revealed: false,
        };
        session.reshuffle(rng);
        session
    }

    /// Builds the working set for `selection` and starts a session over it.
    pub fn from_selection<R: Rng + ?Sized>(
        catalog: &Catalog,
        selection: Selection,
        direction: Direction,
        rng: &mut R,
    ) -> Self {
        let items = build_working_set(catalog, &selection);
        let mut session = Self::new(items, direction, rng);
        session.selection = Some(selection);
        session
    }

    // ══════════════════════════════════════════════════════════════════════
    // Read access
    // ══════════════════════════════════════════════════════════════════════

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn items(&self) -> &[ConjugationItem] {
        &self.items
    }

    /// Ids of the unmastered items in traversal order.
    pub fn traversal(&self) -> Vec<&str> {
        self.order.iter().map(|&i| self.items[i].id.as_str()).collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_attempts(&self) -> u32 {
        self.total_attempts
    }

    pub fn correct_attempts(&self) -> u32 {
        self.correct_attempts
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn remaining(&self) -> usize {
        self.order.len()
    }

    pub fn current(&self) -> Option<&ConjugationItem> {
        self.order.get(self.cursor).map(|&i| &self.items[i])
    }

    pub fn is_last(&self) -> bool {
        !self.order.is_empty() && self.cursor + 1 == self.order.len()
    }

    pub fn can_advance(&self) -> bool {
        self.cursor + 1 < self.order.len()
    }

    pub fn can_retreat(&self) -> bool {
        self.cursor > 0 && !self.order.is_empty()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.items.is_empty() {
            SessionPhase::Empty
        } else if self.order.is_empty() {
            SessionPhase::Completed
        } else {
            SessionPhase::Active
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Operations
    // ══════════════════════════════════════════════════════════════════════

    /// Flips between prompt and answer.
    pub fn reveal(&mut self) {
        self.revealed = !self.revealed;
    }

    /// Marks `id` mastered, counts a correct attempt and reshuffles what is
    /// left. Returns false, changing nothing, when `id` is unknown or already
    /// mastered.
    pub fn mark_mastered<R: Rng + ?Sized>(&mut self, id: &str, rng: &mut R) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return false;
        };
        if item.mastered {
            return false;
        }
        item.mastered = true;
        self.total_attempts += 1;
        self.correct_attempts += 1;
        self.reshuffle(rng);
        debug!("mastered {} ({} remaining)", id, self.order.len());
        true
    }

    /// Marks the item under the cursor mastered.
    pub fn mark_current_mastered<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        let id = self.current()?.id.clone();
        self.mark_mastered(&id, rng).then_some(id)
    }

    /// Moves to the next item, counting an attempt without credit.
    ///
    /// Not allowed on the last item, where the only way forward is marking it
    /// mastered; returns `None` and changes nothing in that case.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Feedback> {
        if !self.can_advance() {
            return None;
        }
        self.total_attempts += 1;
        self.revealed = false;
        self.cursor += 1;
        debug!("advance to {}/{}", self.cursor + 1, self.order.len());
        Some(Feedback::after_advance(rng))
    }

    /// Steps back one item. Returns false at the first item.
    pub fn retreat(&mut self) -> bool {
        if !self.can_retreat() {
            return false;
        }
        self.cursor -= 1;
        self.revealed = false;
        true
    }

    /// New random order over the same unmastered items.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.reshuffle(rng);
    }

    pub fn toggle_direction(&mut self) {
        self.direction = self.direction.toggled();
        self.revealed = false;
    }

    /// Clears every mastery flag and both counters, keeping the working set.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for item in &mut self.items {
            item.mastered = false;
        }
        self.total_attempts = 0;
        self.correct_attempts = 0;
        self.reshuffle(rng);
    }

    /// Rebuilds the traversal from scratch over the unmastered items.
    fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.mastered)
            .map(|(i, _)| i)
            .collect();
        fisher_yates(&mut self.order, rng);
        self.cursor = 0;
        self.revealed = false;
    }

    // ══════════════════════════════════════════════════════════════════════
    // Persistence boundary
    // ══════════════════════════════════════════════════════════════════════

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: SNAPSHOT_VERSION,
            selection: self.selection.clone(),
            items: self.items.clone(),
            order: self.traversal().into_iter().map(str::to_string).collect(),
            cursor: self.cursor,
            total_attempts: self.total_attempts,
            correct_attempts: self.correct_attempts,
            revealed: self.revealed,
            direction: self.direction,
            saved_at: Some(Local::now()),
        }
    }

    /// Rebuilds a session from a stored record.
    ///
    /// Returns `None` for a record written by a newer layout, with no items,
    /// with duplicate ids, or with counters that cannot both be true. A
    /// record without a version predates versioning and is read as version 1.
    /// A stored order that is not exactly the unmastered ids is replaced by a
    /// fresh shuffle.
    pub fn restore<R: Rng + ?Sized>(snapshot: SessionSnapshot, rng: &mut R) -> Option<Self> {
        if snapshot.version > SNAPSHOT_VERSION {
            warn!(
                "session record version {} is newer than {}",
                snapshot.version, SNAPSHOT_VERSION
            );
            return None;
        }
        if snapshot.items.is_empty() || snapshot.correct_attempts > snapshot.total_attempts {
            return None;
        }

        let index: HashMap<&str, usize> = snapshot
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.as_str(), i))
            .collect();
        if index.len() != snapshot.items.len() {
            return None;
        }

        let unmastered: HashSet<usize> = snapshot
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.mastered)
            .map(|(i, _)| i)
            .collect();
        let order: Option<Vec<usize>> = snapshot
            .order
            .iter()
            .map(|id| index.get(id.as_str()).copied())
            .collect();
        let order = order.filter(|order| {
            order.len() == unmastered.len()
                && order.iter().collect::<HashSet<_>>().len() == order.len()
                && order.iter().all(|i| unmastered.contains(i))
        });

        let mut session = Self {
            selection: snapshot.selection,
            items: snapshot.items,
            order: Vec::new(),
            cursor: 0,
            total_attempts: snapshot.total_attempts,
            correct_attempts: snapshot.correct_attempts,
            direction: snapshot.direction,
            revealed: false,
        };

        match order {
            Some(order) => {
                session.order = order;
                if snapshot.cursor < session.order.len() {
                    session.cursor = snapshot.cursor;
                    session.revealed = snapshot.revealed;
                }
            }
            None => session.reshuffle(rng),
        }

        Some(session)
    }
}

/// The persisted record. Every field falls back to a default when missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
    #[serde(default)]
    pub items: Vec<ConjugationItem>,
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub cursor: usize,
    #[serde(default)]
    pub total_attempts: u32,
    #[serde(default)]
    pub correct_attempts: u32,
    #[serde(default)]
    pub revealed: bool,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Local>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_item;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn items(n: usize) -> Vec<ConjugationItem> {
        (0..n).map(|i| test_item(&format!("item-{i}"))).collect()
    }

    fn sorted(mut ids: Vec<String>) -> Vec<String> {
        ids.sort();
        ids
    }

    fn traversal(session: &SessionState) -> Vec<String> {
        session.traversal().into_iter().map(str::to_string).collect()
    }

    #[test]
    fn fisher_yates_is_a_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut values: Vec<u32> = (0..50).collect();
        fisher_yates(&mut values, &mut rng);
        let mut back = values.clone();
        back.sort();
        assert_eq!(back, (0..50).collect::<Vec<_>>());
        assert_ne!(values, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn fisher_yates_handles_tiny_slices() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut empty: Vec<u8> = Vec::new();
        fisher_yates(&mut empty, &mut rng);
        let mut one = vec![9];
        fisher_yates(&mut one, &mut rng);
        assert_eq!(one, vec![9]);
    }

    #[test]
    fn fisher_yates_is_roughly_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut first_counts = [0u32; 3];
        for _ in 0..6000 {
            let mut values = [0usize, 1, 2];
            fisher_yates(&mut values, &mut rng);
            first_counts[values[0]] += 1;
        }
        for count in first_counts {
            assert!((1800..2200).contains(&count), "count {count}");
        }
    }

    #[test]
    fn new_session_covers_every_item() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut input = items(6);
        input[2].mastered = true;
        let session = SessionState::new(input, Direction::EnglishFirst, &mut rng);

        assert!(session.items().iter().all(|i| !i.mastered));
        assert_eq!(session.cursor(), 0);
        assert!(!session.is_revealed());
        let expected: Vec<String> = (0..6).map(|i| format!("item-{i}")).collect();
        assert_eq!(sorted(traversal(&session)), expected);
        assert_eq!(session.phase(), SessionPhase::Active);
    }

    #[test]
    fn same_seed_same_order() {
        let a = SessionState::new(items(10), Direction::EnglishFirst, &mut ChaCha8Rng::seed_from_u64(3));
        let b = SessionState::new(items(10), Direction::EnglishFirst, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(traversal(&a), traversal(&b));
    }

    #[test]
    fn reveal_toggles_without_counting() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut session = SessionState::new(items(2), Direction::EnglishFirst, &mut rng);
        session.reveal();
        assert!(session.is_revealed());
        session.reveal();
        assert!(!session.is_revealed());
        assert_eq!(session.total_attempts(), 0);
    }

    #[test]
    fn mark_mastered_is_idempotent() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut session = SessionState::new(items(3), Direction::EnglishFirst, &mut rng);

        assert!(session.mark_mastered("item-1", &mut rng));
        assert!(!session.mark_mastered("item-1", &mut rng));
        assert_eq!(session.total_attempts(), 1);
        assert_eq!(session.correct_attempts(), 1);
    }

    #[test]
    fn mark_mastered_unknown_id_changes_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut session = SessionState::new(items(3), Direction::EnglishFirst, &mut rng);
        session.advance(&mut rng);
        let before = traversal(&session);

        assert!(!session.mark_mastered("nope", &mut rng));
        assert_eq!(traversal(&session), before);
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.total_attempts(), 1);
    }

    #[test]
    fn mastered_items_leave_the_traversal() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut session = SessionState::new(items(5), Direction::EnglishFirst, &mut rng);
        session.advance(&mut rng);
        session.reveal();

        assert!(session.mark_mastered("item-3", &mut rng));
        assert_eq!(session.cursor(), 0);
        assert!(!session.is_revealed());
        assert_eq!(session.remaining(), 4);

        for _ in 0..5 {
            session.shuffle(&mut rng);
            assert!(!traversal(&session).contains(&"item-3".to_string()));
        }
    }

    #[test]
    fn shuffle_keeps_membership_and_counters() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut session = SessionState::new(items(8), Direction::EnglishFirst, &mut rng);
        session.mark_mastered("item-0", &mut rng);
        session.advance(&mut rng);
        let before = sorted(traversal(&session));
        let (total, correct) = (session.total_attempts(), session.correct_attempts());

        session.shuffle(&mut rng);

        assert_eq!(sorted(traversal(&session)), before);
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.total_attempts(), total);
        assert_eq!(session.correct_attempts(), correct);
    }

    #[test]
    fn advance_stops_at_last_item() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut session = SessionState::new(items(3), Direction::EnglishFirst, &mut rng);

        assert!(session.advance(&mut rng).is_some());
        assert!(session.advance(&mut rng).is_some());
        assert!(session.is_last());
        assert!(session.advance(&mut rng).is_none());
        assert_eq!(session.cursor(), 2);
        assert_eq!(session.total_attempts(), 2);
    }

    #[test]
    fn retreat_stops_at_first_item() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut session = SessionState::new(items(3), Direction::EnglishFirst, &mut rng);

        assert!(!session.retreat());
        session.advance(&mut rng);
        session.reveal();
        assert!(session.retreat());
        assert_eq!(session.cursor(), 0);
        assert!(!session.is_revealed());
        assert_eq!(session.total_attempts(), 1);
    }

    #[test]
    fn toggle_direction_hides_answer() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut session = SessionState::new(items(2), Direction::EnglishFirst, &mut rng);
        session.reveal();
        session.toggle_direction();
        assert_eq!(session.direction(), Direction::SpanishFirst);
        assert!(!session.is_revealed());
        assert_eq!(session.total_attempts(), 0);
    }

    #[test]
    fn completion_is_terminal_until_reset() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut session = SessionState::new(items(2), Direction::EnglishFirst, &mut rng);
        session.mark_current_mastered(&mut rng);
        session.mark_current_mastered(&mut rng);

        assert_eq!(session.phase(), SessionPhase::Completed);
        assert!(session.current().is_none());
        assert!(session.advance(&mut rng).is_none());
        assert!(!session.retreat());
        assert!(session.mark_current_mastered(&mut rng).is_none());

        session.reset(&mut rng);
        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.remaining(), 2);
        assert_eq!(session.total_attempts(), 0);
        assert_eq!(session.correct_attempts(), 0);
        assert!(session.items().iter().all(|i| !i.mastered));
    }

    #[test]
    fn empty_working_set_is_its_own_phase() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut session = SessionState::new(Vec::new(), Direction::EnglishFirst, &mut rng);
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(session.current().is_none());
        assert!(session.advance(&mut rng).is_none());
    }

    #[test]
    fn snapshot_restores_exact_state() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut session = SessionState::new(items(7), Direction::SpanishFirst, &mut rng);
        for id in ["item-0", "item-4", "item-6"] {
            session.mark_mastered(id, &mut rng);
        }
        session.advance(&mut rng);
        session.advance(&mut rng);
        session.reveal();

        let json = serde_json::to_string(&session.snapshot()).unwrap();
        let snapshot: SessionSnapshot = serde_json::from_str(&json).unwrap();
        let restored = SessionState::restore(snapshot, &mut rng).unwrap();

        assert_eq!(restored.items(), session.items());
        assert_eq!(restored.cursor(), 2);
        assert_eq!(restored.total_attempts(), 5);
        assert_eq!(restored.correct_attempts(), 3);
        assert_eq!(traversal(&restored), traversal(&session));
        assert!(restored.is_revealed());
        assert_eq!(restored.direction(), Direction::SpanishFirst);
    }

    #[test]
    fn restore_reshuffles_inconsistent_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut session = SessionState::new(items(4), Direction::EnglishFirst, &mut rng);
        session.mark_mastered("item-2", &mut rng);
        session.advance(&mut rng);

        let mut snapshot = session.snapshot();
        snapshot.order.push("item-2".to_string());
        let restored = SessionState::restore(snapshot, &mut rng).unwrap();

        assert_eq!(restored.cursor(), 0);
        assert_eq!(
            sorted(traversal(&restored)),
            vec!["item-0".to_string(), "item-1".to_string(), "item-3".to_string()]
        );
        assert_eq!(restored.total_attempts(), 2);
    }

    #[test]
    fn restore_clamps_out_of_range_cursor() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let session = SessionState::new(items(3), Direction::EnglishFirst, &mut rng);
        let mut snapshot = session.snapshot();
        snapshot.cursor = 10;
        let restored = SessionState::restore(snapshot, &mut rng).unwrap();
        assert_eq!(restored.cursor(), 0);
    }

    #[test]
    fn restore_rejects_bad_records() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!(SessionState::restore(SessionSnapshot::default(), &mut rng).is_none());

        let session = SessionState::new(items(3), Direction::EnglishFirst, &mut rng);
        let mut dup = session.snapshot();
        dup.items.push(test_item("item-0"));
        assert!(SessionState::restore(dup, &mut rng).is_none());

        let mut counters = session.snapshot();
        counters.correct_attempts = 3;
        counters.total_attempts = 1;
        assert!(SessionState::restore(counters, &mut rng).is_none());
    }

    #[test]
    fn restore_rejects_newer_record_versions() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let session = SessionState::new(items(3), Direction::EnglishFirst, &mut rng);

        let mut newer = session.snapshot();
        newer.version = SNAPSHOT_VERSION + 1;
        assert!(SessionState::restore(newer, &mut rng).is_none());

        let mut unversioned = session.snapshot();
        unversioned.version = 0;
        assert!(SessionState::restore(unversioned, &mut rng).is_some());

        let current = session.snapshot();
        assert_eq!(current.version, SNAPSHOT_VERSION);
        assert!(SessionState::restore(current, &mut rng).is_some());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let json = r#"{"items":[{"id":"x","english":"I speak","spanish":"hablo","verb":"hablar","class":"regular","family":"ar","person":"yo","tense":"present","mastered":true}]}"#;
        let snapshot: SessionSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.total_attempts, 0);
        assert_eq!(snapshot.direction, Direction::EnglishFirst);
        assert!(!snapshot.revealed);

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let restored = SessionState::restore(snapshot, &mut rng).unwrap();
        assert_eq!(restored.phase(), SessionPhase::Completed);
    }
}
