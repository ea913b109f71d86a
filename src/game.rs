// ============================================
// src/game.rs
// 問題リスト・プレイ状況・スコア保存をつなぐゲーム進行
// ============================================

use tracing::{error, info};

use crate::controller::{Page, PageHandler};
use crate::exercises::ExerciseStore;
use crate::save_data::{ScoreRecord, ScoreStore};
use crate::session::QuizSession;

pub struct GameFlow {
    store: ExerciseStore,
    scores: ScoreStore,
    /// 1回に出題する問題数
    set_size: usize,
    session: QuizSession,
    last_error: Option<String>,
}

impl GameFlow {
    pub fn new(store: ExerciseStore, scores: ScoreStore, set_size: usize) -> Self {
        let session = QuizSession::random(&store, set_size);
        info!(
            total = store.len(),
            picked = session.total(),
            "new exercise set"
        );
        Self {
            store,
            scores,
            set_size,
            session,
            last_error: None,
        }
    }

    pub fn store(&self) -> &ExerciseStore {
        &self.store
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// 今のセッションの記録をログに残し、保存先を新しい記録で上書きする
    fn reset_record(&mut self) {
        let finished = self.session.to_score_record();
        info!(
            score = finished.score,
            answered = finished.answered,
            learned = finished.learned.len(),
            current_exercise = finished.current_exercise,
            "session closed"
        );
        if let Err(e) = self.scores.save(&ScoreRecord::default()) {
            error!(error = %e, "failed to reset score record");
            self.last_error = Some(format!("Could not save score: {e}"));
        }
    }
}

impl PageHandler for GameFlow {
    fn start(&mut self) -> Page {
        Page::Ide
    }

    fn option_count(&self) -> usize {
        self.session
            .current_exercise()
            .map_or(0, |exercise| exercise.options.len())
    }

    fn submit(&mut self, answer_index: usize) -> Page {
        match self.session.record_answer(&self.store, answer_index) {
            Some(result) => {
                info!(
                    answer = answer_index,
                    correct = result.correct,
                    score = self.session.score(),
                    answered = self.session.answered(),
                    "answer checked"
                );
                Page::Validation
            }
            // 出題が尽きている
            None => Page::Results,
        }
    }

    fn next(&mut self) -> Page {
        if self.session.advance() {
            Page::Ide
        } else {
            info!(
                score = self.session.score(),
                answered = self.session.answered(),
                accuracy = self.session.accuracy(),
                "exercise set finished"
            );
            Page::Results
        }
    }

    /// MARK:記録をリセットして新しいセットを始める
    fn restart(&mut self) -> Page {
        self.reset_record();
        self.session = QuizSession::random(&self.store, self.set_size);
        Page::Ide
    }

    /// 終了時も記録はリセットする
    fn exit(&mut self) {
        self.reset_record();
    }

    fn share(&self) -> Option<String> {
        Some(self.session.share_text())
    }

    fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }
}
