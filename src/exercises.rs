/*
 * src/exercises.rs
 * 問題データ (Exercise) とその検索・検証を管理するモジュール
 */

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ExerciseError;

/// 組み込みの問題リスト (JSON)
const BUILTIN_EXERCISES_JSON: &str = include_str!("../data/exercises.json");

/// `get_random_exercise_set` の既定の出題数
pub const DEFAULT_SET_SIZE: usize = 5;

/// 実行結果の行区切り
const EXECUTE_RESULT_DELIMITER: char = '|';

/// 難易度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(format!(
                "unknown difficulty `{other}` (expected beginner, intermediate or advanced)"
            )),
        }
    }
}

/// 1問分のデータ
///
/// フィールド名は既存のコンテンツファイルと互換 (camelCase)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub title: String,
    /// 空欄 (`______`) を含むコード
    pub code: String,
    /// 例: "break out = escape from a loop"
    pub phrasal_verb: String,
    pub explanation: String,
    pub error: String,
    pub options: Vec<String>,
    /// `options` への0始まりのインデックス
    pub correct: usize,
    /// `|` 区切りの実行結果
    pub execute_result: String,
    pub difficulty: Difficulty,
}

impl Exercise {
    /// 正解の選択肢の文字列 (`correct` が範囲外なら None)
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct).map(String::as_str)
    }

    /// 実行結果を1行ずつに分解する
    pub fn execute_result_lines(&self) -> impl Iterator<Item = &str> {
        self.execute_result.split(EXECUTE_RESULT_DELIMITER)
    }
}

/// `validate_exercise_answer` の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub correct: bool,
    /// 提出した答えに関係なく、常に正解の選択肢
    pub correct_answer: String,
    pub explanation: String,
    pub phrasal_verb: String,
}

/// 問題リスト (起動時に一度だけ作られ、以後は読み取り専用)
#[derive(Debug, Clone)]
pub struct ExerciseStore {
    exercises: Vec<Exercise>,
}

impl ExerciseStore {
    /// 検証済みの問題リストから作成
    pub fn new(exercises: Vec<Exercise>) -> Result<Self, ExerciseError> {
        validate_collection(&exercises)?;
        Ok(Self { exercises })
    }

    /// 組み込みの問題リスト
    pub fn builtin() -> Result<Self, ExerciseError> {
        Self::from_json_str(BUILTIN_EXERCISES_JSON)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ExerciseError> {
        let exercises: Vec<Exercise> = serde_json::from_str(json)?;
        Self::new(exercises)
    }

    /// MARK:JSONファイルから問題リストを読み込む
    pub fn from_json_file(path: &Path) -> Result<Self, ExerciseError> {
        let json = fs::read_to_string(path).map_err(|source| ExerciseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json_str(&json)?;
        info!(path = %path.display(), count = store.len(), "loaded exercises");
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// 定義順に走査
    pub fn iter(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.iter()
    }

    pub fn as_slice(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn get_exercise_by_id(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|exercise| exercise.id == id)
    }

    /// 指定した難易度の問題を定義順のまま返す
    pub fn get_exercises_by_difficulty(&self, level: Difficulty) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|exercise| exercise.difficulty == level)
            .collect()
    }

    /// 難易度で絞り込んだ新しいリスト (該当なしなら空)
    pub fn with_difficulty(&self, level: Difficulty) -> ExerciseStore {
        ExerciseStore {
            exercises: self
                .get_exercises_by_difficulty(level)
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    /// シャッフルした `min(count, len)` 問を返す
    pub fn get_random_exercise_set(&self, count: usize) -> Vec<&Exercise> {
        self.get_random_exercise_set_with_rng(count, &mut rand::rng())
    }

    pub fn get_random_exercise_set_with_rng<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Vec<&Exercise> {
        let mut shuffled: Vec<&Exercise> = self.exercises.iter().collect();
        // Fisher-Yates なので並びは一様
        shuffled.shuffle(rng);
        shuffled.truncate(count.min(self.exercises.len()));
        debug!(requested = count, picked = shuffled.len(), "sampled exercise set");
        shuffled
    }

    /// 定義順で `index` 番目の問題
    pub fn get_exercise_by_index(&self, index: usize) -> Option<&Exercise> {
        self.exercises.get(index)
    }

    /// MARK:回答の正誤判定
    pub fn validate_exercise_answer(
        &self,
        exercise_id: &str,
        answer_index: usize,
    ) -> Option<AnswerResult> {
        let exercise = self.get_exercise_by_id(exercise_id)?;
        Some(AnswerResult {
            correct: answer_index == exercise.correct,
            correct_answer: exercise.correct_option()?.to_string(),
            explanation: exercise.explanation.clone(),
            phrasal_verb: exercise.phrasal_verb.clone(),
        })
    }
}

fn validate_collection(exercises: &[Exercise]) -> Result<(), ExerciseError> {
    if exercises.is_empty() {
        return Err(ExerciseError::Empty);
    }

    let mut seen = HashSet::new();
    for exercise in exercises {
        if !seen.insert(exercise.id.as_str()) {
            return Err(ExerciseError::DuplicateId(exercise.id.clone()));
        }
        if exercise.options.is_empty() {
            return Err(ExerciseError::NoOptions(exercise.id.clone()));
        }
        if exercise.correct >= exercise.options.len() {
            return Err(ExerciseError::CorrectOutOfRange {
                id: exercise.id.clone(),
                correct: exercise.correct,
                len: exercise.options.len(),
            });
        }
    }
    Ok(())
}
