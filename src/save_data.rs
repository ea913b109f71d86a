// ============================================
// src/save_data.rs
// スコア記録の構造と読み書きロジック
// ============================================

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::SaveError;

/// 保存キー (ファイル名はこれに `.json` を付けたもの)
pub const STORAGE_KEY: &str = "englishIDEGame";

/// 保存されるスコア記録 (常に丸ごと上書きする)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub score: u32,
    pub answered: u32,
    /// 覚えた句動詞
    pub learned: Vec<String>,
    pub current_exercise: usize,
}

/// スコア記録の保存先
#[derive(Debug, Clone)]
pub struct ScoreStore {
    path: PathBuf,
}

impl ScoreStore {
    /// 指定ディレクトリの `englishIDEGame.json` を使う
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{STORAGE_KEY}.json")),
        }
    }

    /// OSごとのデータ保存用ディレクトリを使う
    pub fn default_location() -> Self {
        Self::in_dir(&data_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// MARK:ファイルから記録を読み込む
    /// ファイルが無い・壊れている場合は新しいセッションとして扱う
    pub fn load(&self) -> ScoreRecord {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no score record, starting fresh");
            return ScoreRecord::default();
        }

        match File::open(&self.path) {
            Ok(file) => match serde_json::from_reader(BufReader::new(file)) {
                Ok(record) => record,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "corrupt score record ignored");
                    ScoreRecord::default()
                }
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not open score record");
                ScoreRecord::default()
            }
        }
    }

    /// MARK:記録を丸ごと上書き保存する
    pub fn save(&self, record: &ScoreRecord) -> Result<(), SaveError> {
        let json = serde_json::to_string_pretty(record)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SaveError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, json).map_err(|source| SaveError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "score record saved");
        Ok(())
    }
}

/// データ保存用ディレクトリ
/// 取得できなかったらカレントディレクトリ (フォールバック)
pub fn data_dir() -> PathBuf {
    match ProjectDirs::from("jp", "Fukumoto0141", "IDERRORS") {
        Some(proj_dirs) => proj_dirs.data_dir().to_path_buf(),
        None => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_record_is_fresh_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::in_dir(dir.path());
        assert_eq!(store.load(), ScoreRecord::default());
    }

    #[test]
    fn save_overwrites_whole_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::in_dir(dir.path());

        let first = ScoreRecord {
            score: 3,
            answered: 4,
            learned: vec!["break out = escape from a loop".to_string()],
            current_exercise: 4,
        };
        store.save(&first).unwrap();
        assert_eq!(store.load(), first);

        store.save(&ScoreRecord::default()).unwrap();
        assert_eq!(store.load(), ScoreRecord::default());
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::in_dir(dir.path());
        store.save(&ScoreRecord::default()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["currentExercise"], 0);
        assert_eq!(value["learned"], serde_json::json!([]));
        assert!(store.path().ends_with("englishIDEGame.json"));
    }

    #[test]
    fn corrupt_record_is_fresh_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load(), ScoreRecord::default());
    }
}
