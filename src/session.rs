// ============================================
// src/session.rs
// 1回のプレイ (出題セット) の進行状況
// ============================================

use crate::exercises::{AnswerResult, Exercise, ExerciseStore};
use crate::save_data::ScoreRecord;

/// お祝い表示をする正答率 (%)
pub const CELEBRATION_ACCURACY: f64 = 80.0;

#[derive(Debug, Clone)]
pub struct QuizSession {
    exercises: Vec<Exercise>,
    current: usize,
    score: u32,
    answered: u32,
    /// 正解した句動詞 (重複なし、正解した順)
    learned: Vec<String>,
    last_result: Option<AnswerResult>,
}

impl QuizSession {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self {
            exercises,
            current: 0,
            score: 0,
            answered: 0,
            learned: Vec::new(),
            last_result: None,
        }
    }

    /// ストアからランダムに `count` 問選んで開始
    pub fn random(store: &ExerciseStore, count: usize) -> Self {
        let picked = store
            .get_random_exercise_set(count)
            .into_iter()
            .cloned()
            .collect();
        Self::new(picked)
    }

    /// 今の問題 (全問終わっていれば None)
    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.exercises.get(self.current)
    }

    /// 何問目か (0始まり)
    pub fn position(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.exercises.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn answered(&self) -> u32 {
        self.answered
    }

    pub fn learned(&self) -> &[String] {
        &self.learned
    }

    pub fn last_result(&self) -> Option<&AnswerResult> {
        self.last_result.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.exercises.len()
    }

    /// 今の問題に回答する
    pub fn record_answer(
        &mut self,
        store: &ExerciseStore,
        answer_index: usize,
    ) -> Option<AnswerResult> {
        let id = self.current_exercise()?.id.clone();
        let result = store.validate_exercise_answer(&id, answer_index)?;

        self.answered += 1;
        if result.correct {
            self.score += 1;
            if !self.learned.contains(&result.phrasal_verb) {
                self.learned.push(result.phrasal_verb.clone());
            }
        }
        self.last_result = Some(result.clone());
        Some(result)
    }

    /// 次の問題へ進む。まだ問題が残っていれば true
    pub fn advance(&mut self) -> bool {
        if self.current < self.exercises.len() {
            self.current += 1;
        }
        self.last_result = None;
        !self.is_finished()
    }

    /// 正答率 (%)
    pub fn accuracy(&self) -> f64 {
        if self.answered == 0 {
            return 0.0;
        }
        self.score as f64 / self.answered as f64 * 100.0
    }

    pub fn should_celebrate(&self) -> bool {
        self.accuracy() >= CELEBRATION_ACCURACY
    }

    pub fn to_score_record(&self) -> ScoreRecord {
        ScoreRecord {
            score: self.score,
            answered: self.answered,
            learned: self.learned.clone(),
            current_exercise: self.current,
        }
    }

    /// 結果共有用のテキスト
    pub fn share_text(&self) -> String {
        format!(
            "I just completed the English Game IDERRORS! 🎮\n\
             Score: {}/{} ({:.0}%)\n\
             Phrasal Verbs learned: {}\n\
             #EnglishProgramming #PhrasalVerbs #CodingChallenge",
            self.score,
            self.answered,
            self.accuracy(),
            self.learned.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_of(ids: &[&str]) -> (ExerciseStore, QuizSession) {
        let store = ExerciseStore::builtin().unwrap();
        let picked = ids
            .iter()
            .map(|id| store.get_exercise_by_id(id).unwrap().clone())
            .collect();
        (store, QuizSession::new(picked))
    }

    #[test]
    fn correct_answer_scores_and_learns() {
        let (store, mut session) = session_of(&["loop_control_01", "memory_cleanup_01"]);

        let result = session.record_answer(&store, 1).unwrap();
        assert!(result.correct);
        assert_eq!(session.score(), 1);
        assert_eq!(session.answered(), 1);
        assert_eq!(session.learned(), ["break out = escape from a loop"]);
        assert!(session.advance());

        let result = session.record_answer(&store, 0).unwrap();
        assert!(!result.correct);
        assert_eq!(result.correct_answer, "purge");
        assert_eq!(session.score(), 1);
        assert_eq!(session.answered(), 2);
        assert!(!session.advance());
        assert!(session.is_finished());
        assert_eq!(session.accuracy(), 50.0);
    }

    #[test]
    fn learned_has_no_duplicates() {
        // 同じ問題に2回正解しても記録は1つ
        let (store, mut session) = session_of(&["loop_control_01", "loop_control_01"]);
        session.record_answer(&store, 1);
        session.advance();
        session.record_answer(&store, 1);
        assert_eq!(session.learned().len(), 1);
        assert_eq!(session.score(), 2);
    }

    #[test]
    fn finished_session_ignores_answers() {
        let (store, mut session) = session_of(&["loop_control_01"]);
        session.advance();
        assert!(session.record_answer(&store, 1).is_none());
        assert_eq!(session.answered(), 0);
        assert_eq!(session.accuracy(), 0.0);
    }

    #[test]
    fn score_record_and_share_text() {
        let (store, mut session) = session_of(&["loop_control_01", "data_validation_01"]);
        session.record_answer(&store, 1);
        session.advance();
        session.record_answer(&store, 0);
        session.advance();

        let record = session.to_score_record();
        assert_eq!(record.score, 2);
        assert_eq!(record.answered, 2);
        assert_eq!(record.current_exercise, 2);
        assert!(session.should_celebrate());

        let text = session.share_text();
        assert!(text.contains("Score: 2/2 (100%)"));
        assert!(text.contains("Phrasal Verbs learned: 2"));
    }

    #[test]
    fn random_session_respects_count() {
        let store = ExerciseStore::builtin().unwrap();
        assert_eq!(QuizSession::random(&store, 3).total(), 3);
        assert_eq!(QuizSession::random(&store, 100).total(), store.len());
    }
}
