// ============================================
// src/error.rs
// エラー型の定義
// ============================================

use std::path::PathBuf;

use thiserror::Error;

/// 問題データの読み込み・検証で起きるエラー
#[derive(Debug, Error)]
pub enum ExerciseError {
    #[error("failed to read exercise file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid exercise JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("exercise collection is empty")]
    Empty,

    #[error("duplicate exercise id `{0}`")]
    DuplicateId(String),

    #[error("exercise `{0}` has no options")]
    NoOptions(String),

    /// `correct` が `options` の範囲外
    #[error("exercise `{id}`: correct index {correct} is out of range (options: {len})")]
    CorrectOutOfRange { id: String, correct: usize, len: usize },
}

/// スコア記録の保存で起きるエラー
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write score record {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize score record: {0}")]
    Serialize(#[from] serde_json::Error),
}
