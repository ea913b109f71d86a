// ============================================
// src/lib.rs
// IDE ERRORS: コードの空欄を埋めて英語の句動詞を覚えるゲーム
// ============================================

pub mod cli;
pub mod controller;
pub mod error;
pub mod exercises;
pub mod game;
pub mod logging;
pub mod save_data;
pub mod session;
pub mod ui;

pub use controller::{Controller, Page, PageHandler, Settings};
pub use error::{ExerciseError, SaveError};
pub use exercises::{AnswerResult, Difficulty, Exercise, ExerciseStore};
pub use game::GameFlow;
pub use save_data::{ScoreRecord, ScoreStore};
pub use session::QuizSession;
