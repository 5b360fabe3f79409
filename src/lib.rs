//! Verbos - Spanish verb conjugation trainer
//!
//! Flashcards over a bundled catalog of conjugations, with a typed-answer
//! quiz, conjugation-table drills and a persisted study session.

pub mod catalog;
pub mod config;
pub mod drill;
pub mod models;
pub mod progress;
pub mod quiz;
pub mod reference;
pub mod selector;
pub mod session;
pub mod storage;
pub mod ui;

pub use catalog::{Catalog, CatalogError, ItemFilter, VerbGroup, VerbSet};
pub use models::{ConjugationItem, Direction};
pub use progress::{Feedback, Progress};
pub use selector::Selection;
pub use session::{SessionPhase, SessionSnapshot, SessionState};
pub use storage::{SessionStore, StoreError};
