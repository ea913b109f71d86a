// ============================================
// src/cli.rs
// コマンドライン引数
// ============================================

use std::path::PathBuf;

use clap::Parser;

use crate::controller::Settings;
use crate::error::ExerciseError;
use crate::exercises::{DEFAULT_SET_SIZE, Difficulty, ExerciseStore};
use crate::logging::default_log_path;

#[derive(Debug, Parser)]
#[command(name = "iderrors", version, about = "Learn English phrasal verbs by fixing code.")]
pub struct Cli {
    /// 問題リストのJSONファイル (省略時は組み込みの問題)
    #[arg(long, value_name = "PATH")]
    pub exercises: Option<PathBuf>,

    /// 1回に出題する問題数
    #[arg(short = 'n', long, default_value_t = DEFAULT_SET_SIZE, value_parser = parse_count)]
    pub count: usize,

    /// 難易度で絞り込む (beginner / intermediate / advanced)
    #[arg(short, long)]
    pub difficulty: Option<Difficulty>,

    /// キーボードショートカットを無効にする
    #[arg(long)]
    pub no_shortcuts: bool,

    /// アニメーションを無効にする
    #[arg(long)]
    pub no_animations: bool,

    /// ログファイル
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// 問題の一覧を表示して終了
    #[arg(long)]
    pub list: bool,
}

fn parse_count(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("count must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            shortcuts: !self.no_shortcuts,
            animations: !self.no_animations,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(default_log_path)
    }

    /// 問題リストを読み込み、難易度で絞り込む
    pub fn load_store(&self) -> Result<ExerciseStore, ExerciseError> {
        let store = match &self.exercises {
            Some(path) => ExerciseStore::from_json_file(path)?,
            None => ExerciseStore::builtin()?,
        };
        match self.difficulty {
            Some(level) => {
                let filtered = store.with_difficulty(level);
                if filtered.is_empty() {
                    return Err(ExerciseError::Empty);
                }
                Ok(filtered)
            }
            None => Ok(store),
        }
    }
}
