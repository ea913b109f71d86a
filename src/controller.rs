// ============================================
// src/controller.rs
// 画面状態・キー操作・通知を管理するコントローラ
// ============================================

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info};

/// 「コンパイル」ボタンを押してから結果が出るまで
pub const COMPILE_DELAY: Duration = Duration::from_millis(1000);
/// 通知の表示時間
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);
/// ウェルカム画面のタイピング演出 (開始までの待ち / 1文字ごとの間隔)
pub const TYPING_DELAY: Duration = Duration::from_millis(1000);
pub const TYPING_INTERVAL: Duration = Duration::from_millis(100);
pub const CONSOLE_LINE_INTERVAL: Duration = Duration::from_millis(500);

pub const WELCOME_NOTICE: &str =
    "Welcome to the English IDE Game! Use keys 1-4 to select options.";
pub const SELECT_FIRST_NOTICE: &str = "Please select an option before compiling.";

/// 画面の種類 (起動時に呼び出し側が明示する)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Welcome,
    Ide,
    Validation,
    Results,
}

/// 機能の on/off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub shortcuts: bool,
    pub animations: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shortcuts: true,
            animations: true,
        }
    }
}

/// 画面の状態
#[derive(Debug, Clone)]
pub struct UiState {
    /// 選択中の選択肢 (None = 未選択)
    pub selected_option: Option<usize>,
    pub page: Page,
    pub shortcuts: bool,
    pub animations: bool,
    /// ステータスバーのメッセージ
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NoticeKind,
    shown_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Restart,
    Exit,
}

/// 画面中央に出すダイアログ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Help,
    Confirm(ConfirmAction),
    Share(String),
}

/// キー入力のあとにループを続けるか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// 画面ごとの処理 (ゲーム側がコントローラに渡す)
pub trait PageHandler {
    /// ウェルカム画面から開始
    fn start(&mut self) -> Page;
    /// 今の問題の選択肢の数
    fn option_count(&self) -> usize;
    /// コンパイル完了時に回答を判定する
    fn submit(&mut self, answer_index: usize) -> Page;
    /// 結果画面から次へ
    fn next(&mut self) -> Page;
    fn restart(&mut self) -> Page;
    /// 共有用テキスト
    fn share(&self) -> Option<String>;
    /// 終了前の後始末
    fn exit(&mut self) {}
    /// 直前の処理で起きたエラー (通知に出す)
    fn take_error(&mut self) -> Option<String> {
        None
    }
}

pub struct Controller<H: PageHandler> {
    ui: UiState,
    handler: H,
    notifications: Vec<Notification>,
    dialog: Option<Dialog>,
    /// コンパイル中の (回答, 完了時刻)
    compiling: Option<(usize, Instant)>,
    page_entered_at: Instant,
    welcomed: bool,
}

impl<H: PageHandler> Controller<H> {
    pub fn new(page: Page, settings: Settings, handler: H, now: Instant) -> Self {
        let mut controller = Self {
            ui: UiState {
                selected_option: None,
                page,
                shortcuts: settings.shortcuts,
                animations: settings.animations,
                status: String::new(),
            },
            handler,
            notifications: Vec::new(),
            dialog: None,
            compiling: None,
            page_entered_at: now,
            welcomed: false,
        };
        controller.enter_page(page, now);
        controller
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn is_compiling(&self) -> bool {
        self.compiling.is_some()
    }

    /// MARK:画面の切り替え
    fn enter_page(&mut self, page: Page, now: Instant) {
        info!(?page, "page initialized");
        self.ui.page = page;
        self.ui.selected_option = None;
        self.compiling = None;
        self.page_entered_at = now;
        self.ui.status = match page {
            Page::Welcome => "Press Enter to start",
            Page::Ide => "Ready",
            Page::Validation => "Build finished",
            Page::Results => "Session complete",
        }
        .to_string();

        if page == Page::Ide && !self.welcomed {
            self.welcomed = true;
            self.notify(WELCOME_NOTICE, NoticeKind::Success, now);
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NoticeKind, now: Instant) {
        let message = message.into();
        debug!(?kind, %message, "notification");
        self.notifications.push(Notification {
            message,
            kind,
            shown_at: now,
        });
    }

    /// 選択肢を選ぶ (存在しない番号なら false)
    pub fn select_option(&mut self, index: usize) -> bool {
        if self.ui.page != Page::Ide || index >= self.handler.option_count() {
            return false;
        }
        self.ui.selected_option = Some(index);
        self.ui.status = "Selected option - Ready to compile".to_string();
        true
    }

    /// MARK:回答を送信 (コンパイル開始)
    pub fn submit_answer(&mut self, now: Instant) {
        if self.compiling.is_some() {
            return;
        }
        let Some(index) = self.ui.selected_option else {
            self.notify(SELECT_FIRST_NOTICE, NoticeKind::Warning, now);
            return;
        };

        self.ui.status = "Compiling code...".to_string();
        let delay = if self.ui.animations {
            COMPILE_DELAY
        } else {
            Duration::ZERO
        };
        self.compiling = Some((index, now + delay));
        self.tick(now);
    }

    /// 時間経過の処理 (通知の期限切れ、コンパイル完了)
    pub fn tick(&mut self, now: Instant) {
        self.notifications
            .retain(|n| now.saturating_duration_since(n.shown_at) < NOTIFICATION_TTL);

        if let Some((index, deadline)) = self.compiling {
            if now >= deadline {
                self.compiling = None;
                let page = self.handler.submit(index);
                self.enter_page(page, now);
            }
        }
    }

    /// 今の画面に入ってからの経過時間
    pub fn page_elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.page_entered_at)
    }

    /// 実行結果を何行まで表示するか (0.5秒ごとに1行)
    pub fn revealed_lines(&self, total: usize, now: Instant) -> usize {
        if !self.ui.animations {
            return total;
        }
        let shown = self.page_elapsed(now).as_millis() / CONSOLE_LINE_INTERVAL.as_millis();
        (shown as usize).min(total)
    }

    /// ウェルカム画面のコマンドを何文字まで表示するか
    pub fn typed_chars(&self, total: usize, now: Instant) -> usize {
        if !self.ui.animations {
            return total;
        }
        match self.page_elapsed(now).checked_sub(TYPING_DELAY) {
            Some(typing) => {
                let typed = typing.as_millis() / TYPING_INTERVAL.as_millis();
                (typed as usize).min(total)
            }
            None => 0,
        }
    }

    /// MARK:キー入力の処理
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Ctrl+C はいつでも終了
        if ctrl && matches!(key.code, KeyCode::Char('c')) {
            return Flow::Quit;
        }

        // ダイアログ表示中はどのキーでも閉じる (確認は y のみ実行)
        if let Some(dialog) = self.dialog.take() {
            if let Dialog::Confirm(action) = dialog {
                if matches!(key.code, KeyCode::Char('y' | 'Y')) {
                    return self.confirm(action, now);
                }
            }
            return Flow::Continue;
        }

        if self.compiling.is_some() {
            return Flow::Continue;
        }

        let shortcuts = self.ui.shortcuts;
        match self.ui.page {
            Page::Ide => match key.code {
                // 選択肢キー `1`-`4`
                KeyCode::Char(c @ '1'..='4') => {
                    self.select_option(c as usize - '1' as usize);
                }
                KeyCode::Enter if !ctrl || shortcuts => self.submit_answer(now),
                KeyCode::Char('r' | 'R') if shortcuts => {
                    self.dialog = Some(Dialog::Confirm(ConfirmAction::Restart));
                }
                _ => {}
            },
            Page::Validation => {
                if key.code == KeyCode::Enter {
                    let page = self.handler.next();
                    self.enter_page(page, now);
                }
            }
            Page::Results => match key.code {
                KeyCode::Enter => self.restart(now),
                KeyCode::Char(' ') if shortcuts => self.restart(now),
                KeyCode::Char('s' | 'S') if shortcuts => self.share(now),
                _ => {}
            },
            Page::Welcome => match key.code {
                KeyCode::Enter => {
                    let page = self.handler.start();
                    self.enter_page(page, now);
                }
                KeyCode::Char(' ') if shortcuts => {
                    let page = self.handler.start();
                    self.enter_page(page, now);
                }
                _ => {}
            },
        }

        if !shortcuts {
            return Flow::Continue;
        }

        // 全画面共通
        match key.code {
            KeyCode::Esc => self.dialog = Some(Dialog::Confirm(ConfirmAction::Exit)),
            KeyCode::Char('h') if ctrl => self.dialog = Some(Dialog::Help),
            // Ctrl+H を Backspace として送る端末向け
            KeyCode::F(1) => self.dialog = Some(Dialog::Help),
            _ => {}
        }
        Flow::Continue
    }

    fn confirm(&mut self, action: ConfirmAction, now: Instant) -> Flow {
        match action {
            ConfirmAction::Restart => {
                self.restart(now);
                Flow::Continue
            }
            ConfirmAction::Exit => {
                info!("exit confirmed");
                self.handler.exit();
                Flow::Quit
            }
        }
    }

    fn restart(&mut self, now: Instant) {
        info!("restarting game");
        let page = self.handler.restart();
        self.enter_page(page, now);
        match self.handler.take_error() {
            Some(message) => self.notify(message, NoticeKind::Error, now),
            None => self.notify("Game restarted", NoticeKind::Info, now),
        }
    }

    fn share(&mut self, now: Instant) {
        if let Some(text) = self.handler.share() {
            self.dialog = Some(Dialog::Share(text));
            self.notify("Results ready to copy!", NoticeKind::Success, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 呼び出しを記録するだけのハンドラ
    #[derive(Default)]
    struct Recorder {
        submitted: Vec<usize>,
        nexts: usize,
        restarts: usize,
        exits: usize,
        finished: bool,
    }

    impl PageHandler for Recorder {
        fn start(&mut self) -> Page {
            Page::Ide
        }

        fn option_count(&self) -> usize {
            3
        }

        fn submit(&mut self, answer_index: usize) -> Page {
            self.submitted.push(answer_index);
            Page::Validation
        }

        fn next(&mut self) -> Page {
            self.nexts += 1;
            if self.finished { Page::Results } else { Page::Ide }
        }

        fn restart(&mut self) -> Page {
            self.restarts += 1;
            Page::Ide
        }

        fn share(&self) -> Option<String> {
            Some("shared".to_string())
        }

        fn exit(&mut self) {
            self.exits += 1;
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn ide(settings: Settings) -> (Controller<Recorder>, Instant) {
        let now = Instant::now();
        (Controller::new(Page::Ide, settings, Recorder::default(), now), now)
    }

    #[test]
    fn ide_shows_welcome_once() {
        let (mut c, now) = ide(Settings::default());
        assert_eq!(c.notifications().len(), 1);
        assert_eq!(c.notifications()[0].message, WELCOME_NOTICE);

        c.handle_key(key(KeyCode::Char('1')), now);
        c.submit_answer(now);
        c.tick(now + COMPILE_DELAY);
        c.handle_key(key(KeyCode::Enter), now + COMPILE_DELAY);
        assert_eq!(c.ui().page, Page::Ide);
        assert_eq!(c.notifications().len(), 1);
    }

    #[test]
    fn digit_keys_select_existing_options() {
        let (mut c, now) = ide(Settings::default());
        c.handle_key(key(KeyCode::Char('2')), now);
        assert_eq!(c.ui().selected_option, Some(1));
        assert_eq!(c.ui().status, "Selected option - Ready to compile");

        // 選択肢は3つなので 4 は無視
        c.handle_key(key(KeyCode::Char('4')), now);
        assert_eq!(c.ui().selected_option, Some(1));
    }

    #[test]
    fn submit_without_selection_warns() {
        let (mut c, now) = ide(Settings::default());
        c.handle_key(key(KeyCode::Enter), now);
        assert!(!c.is_compiling());
        let last = c.notifications().last().unwrap();
        assert_eq!(last.kind, NoticeKind::Warning);
        assert_eq!(last.message, SELECT_FIRST_NOTICE);
    }

    #[test]
    fn submit_fires_after_compile_delay() {
        let (mut c, now) = ide(Settings::default());
        c.handle_key(key(KeyCode::Char('1')), now);
        c.handle_key(key(KeyCode::Enter), now);
        assert!(c.is_compiling());
        assert_eq!(c.ui().status, "Compiling code...");

        c.tick(now + Duration::from_millis(500));
        assert!(c.handler().submitted.is_empty());

        c.tick(now + COMPILE_DELAY);
        assert_eq!(c.handler().submitted, [0]);
        assert_eq!(c.ui().page, Page::Validation);
        assert_eq!(c.ui().selected_option, None);
    }

    #[test]
    fn submit_is_immediate_without_animations() {
        let (mut c, now) = ide(Settings {
            shortcuts: true,
            animations: false,
        });
        c.handle_key(key(KeyCode::Char('3')), now);
        c.handle_key(key(KeyCode::Enter), now);
        assert_eq!(c.handler().submitted, [2]);
        assert_eq!(c.ui().page, Page::Validation);
    }

    #[test]
    fn notifications_expire() {
        let (mut c, now) = ide(Settings::default());
        c.tick(now + Duration::from_secs(2));
        assert_eq!(c.notifications().len(), 1);
        c.tick(now + NOTIFICATION_TTL);
        assert!(c.notifications().is_empty());
    }

    #[test]
    fn restart_requires_confirmation() {
        let (mut c, now) = ide(Settings::default());
        c.handle_key(key(KeyCode::Char('r')), now);
        assert_eq!(c.dialog(), Some(&Dialog::Confirm(ConfirmAction::Restart)));

        c.handle_key(key(KeyCode::Char('n')), now);
        assert!(c.dialog().is_none());
        assert_eq!(c.handler().restarts, 0);

        c.handle_key(key(KeyCode::Char('R')), now);
        c.handle_key(key(KeyCode::Char('y')), now);
        assert_eq!(c.handler().restarts, 1);
    }

    #[test]
    fn escape_confirms_exit() {
        let (mut c, now) = ide(Settings::default());
        assert_eq!(c.handle_key(key(KeyCode::Esc), now), Flow::Continue);
        assert_eq!(c.handle_key(key(KeyCode::Char('n')), now), Flow::Continue);
        assert_eq!(c.handler().exits, 0);
        assert_eq!(c.handle_key(key(KeyCode::Esc), now), Flow::Continue);
        assert_eq!(c.handle_key(key(KeyCode::Char('y')), now), Flow::Quit);
        assert_eq!(c.handler().exits, 1);
    }

    #[test]
    fn ctrl_h_opens_help_and_any_key_closes() {
        let (mut c, now) = ide(Settings::default());
        c.handle_key(ctrl('h'), now);
        assert_eq!(c.dialog(), Some(&Dialog::Help));
        c.handle_key(key(KeyCode::Char('1')), now);
        assert!(c.dialog().is_none());
        assert_eq!(c.ui().selected_option, None);
    }

    #[test]
    fn disabled_shortcuts_keep_basic_controls() {
        let (mut c, now) = ide(Settings {
            shortcuts: false,
            animations: false,
        });
        c.handle_key(key(KeyCode::Char('r')), now);
        c.handle_key(key(KeyCode::Esc), now);
        c.handle_key(ctrl('h'), now);
        assert!(c.dialog().is_none());

        c.handle_key(key(KeyCode::Char('1')), now);
        c.handle_key(key(KeyCode::Enter), now);
        assert_eq!(c.handler().submitted, [0]);
        assert_eq!(c.handle_key(ctrl('c'), now), Flow::Quit);
    }

    #[test]
    fn validation_enter_moves_on() {
        let now = Instant::now();
        let handler = Recorder {
            finished: true,
            ..Recorder::default()
        };
        let mut c = Controller::new(Page::Validation, Settings::default(), handler, now);
        c.handle_key(key(KeyCode::Enter), now);
        assert_eq!(c.handler().nexts, 1);
        assert_eq!(c.ui().page, Page::Results);
    }

    #[test]
    fn results_page_share_and_restart() {
        let now = Instant::now();
        let mut c = Controller::new(Page::Results, Settings::default(), Recorder::default(), now);
        c.handle_key(key(KeyCode::Char('s')), now);
        assert_eq!(c.dialog(), Some(&Dialog::Share("shared".to_string())));

        c.handle_key(key(KeyCode::Enter), now); // ダイアログを閉じるだけ
        assert_eq!(c.handler().restarts, 0);

        c.handle_key(key(KeyCode::Char(' ')), now);
        assert_eq!(c.handler().restarts, 1);
        assert_eq!(c.ui().page, Page::Ide);
    }

    #[test]
    fn welcome_typing_animation() {
        let now = Instant::now();
        let c = Controller::new(Page::Welcome, Settings::default(), Recorder::default(), now);
        assert_eq!(c.typed_chars(10, now), 0);
        assert_eq!(c.typed_chars(10, now + TYPING_DELAY), 0);
        assert_eq!(c.typed_chars(10, now + Duration::from_millis(1350)), 3);
        assert_eq!(c.typed_chars(10, now + Duration::from_secs(5)), 10);

        let still = Controller::new(
            Page::Welcome,
            Settings {
                shortcuts: true,
                animations: false,
            },
            Recorder::default(),
            now,
        );
        assert_eq!(still.typed_chars(10, now), 10);
    }

    #[test]
    fn console_lines_appear_one_by_one() {
        let now = Instant::now();
        let c = Controller::new(Page::Validation, Settings::default(), Recorder::default(), now);
        assert_eq!(c.revealed_lines(4, now), 0);
        assert_eq!(c.revealed_lines(4, now + CONSOLE_LINE_INTERVAL), 1);
        assert_eq!(c.revealed_lines(4, now + Duration::from_millis(1700)), 3);
        assert_eq!(c.revealed_lines(4, now + Duration::from_secs(10)), 4);
    }

    #[test]
    fn welcome_enter_starts_game() {
        let now = Instant::now();
        let mut c = Controller::new(Page::Welcome, Settings::default(), Recorder::default(), now);
        assert!(c.notifications().is_empty());
        c.handle_key(key(KeyCode::Enter), now);
        assert_eq!(c.ui().page, Page::Ide);
        assert_eq!(c.notifications()[0].message, WELCOME_NOTICE);
    }
}
