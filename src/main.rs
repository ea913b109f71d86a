// ============================================
// src/main.rs (メインファイル)
// ============================================

use std::io::{self, Result, stdout};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::{error, info};

use iderrors::cli::Cli;
use iderrors::controller::{Controller, Flow, Page};
use iderrors::game::GameFlow;
use iderrors::logging;
use iderrors::save_data::ScoreStore;
use iderrors::ui::ui;

// --------------------------------------------------
// メイン関数 (TUIセットアップと実行ループ)
// --------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_path())?;

    // 問題リストはTUIに入る前に読み込んで検証する
    let store = cli.load_store().map_err(|e| {
        error!(error = %e, "failed to load exercises");
        io::Error::other(e)
    })?;

    if cli.list {
        for (i, exercise) in store.iter().enumerate() {
            println!(
                "{:>2}. [{}] {} ({}) - {}",
                i + 1,
                exercise.difficulty,
                exercise.title,
                exercise.id,
                exercise.phrasal_verb
            );
        }
        return Ok(());
    }

    let scores = ScoreStore::default_location();
    let previous = scores.load();
    info!(
        path = %scores.path().display(),
        score = previous.score,
        answered = previous.answered,
        "score record loaded"
    );

    let game = GameFlow::new(store, scores, cli.count);
    let mut controller = Controller::new(Page::Welcome, cli.settings(), game, Instant::now());

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut controller);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal(_terminal: &mut Terminal<impl Backend>) -> Result<()> {
    stdout().execute(Show)?; // カーソルを再表示
    stdout().execute(LeaveAlternateScreen)?; // 代替スクリーンを終了
    disable_raw_mode()?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<impl Backend>,
    controller: &mut Controller<GameFlow>,
) -> Result<()> {
    loop {
        let now = Instant::now();
        controller.tick(now);
        terminal.draw(|f| ui(f, controller, now))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if controller.handle_key(key, Instant::now()) == Flow::Quit {
                    break;
                }
            }
        }
    }

    info!("bye");
    Ok(())
}
