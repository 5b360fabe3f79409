//! TUI module for the trainer.

mod app;
pub mod theme;
mod views;
mod widgets;

pub use app::{App, Confirm, MenuEntry, Screen, QUIZ_ADVANCE_AFTER};
pub use theme::Theme;
