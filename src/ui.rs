// ============================================
// src/ui.rs
// UI描画
// ============================================

use std::time::Instant;

use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
};

use crate::controller::{ConfirmAction, Controller, Dialog, NoticeKind, Page};
use crate::game::GameFlow;

/// コード中の空欄
const BLANK: &str = "______";

/// ウェルカム画面でタイプされるコマンド
const WELCOME_COMMAND: &str = "javac PhrasalVerbs.java && java PhrasalVerbs";

const HELP_TEXT: &str = "ENGLISH IDE GAME - HELP

KEYBOARD SHORTCUTS:
  1-4         Select answer option
  Enter       Compile and execute code
  Ctrl+Enter  Quick compile
  R           Restart game
  Esc         Exit game
  Ctrl+H / F1 Show this help

OBJECTIVE:
Complete programming exercises using the correct phrasal verbs.
Learn technical English in the context of software development.

TIPS:
  - Read the programming context carefully
  - Think about the meaning of the phrasal verb
  - Notice how it relates to the programming concept

Good luck learning!";

pub fn ui(f: &mut Frame, controller: &Controller<GameFlow>, now: Instant) {
    let size = f.area();
    // 枠線を描画
    let block = Block::default()
        .borders(Borders::ALL)
        .title("IDE ERRORS - English Phrasal Verbs");
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] 進行状況
            Constraint::Min(1),    // [1] 画面本体
            Constraint::Length(1), // [2] ステータスバー
        ])
        .split(inner_area);

    render_progress(f, controller, chunks[0]);

    match controller.ui().page {
        Page::Welcome => render_welcome(f, controller, now, chunks[1]),
        Page::Ide => render_ide(f, controller, chunks[1]),
        Page::Validation => render_validation(f, controller, now, chunks[1]),
        Page::Results => render_results(f, controller, chunks[1]),
    }

    let status = Paragraph::new(controller.ui().status.as_str())
        .style(Style::default().fg(Color::White).bg(Color::Blue));
    f.render_widget(status, chunks[2]);

    render_notifications(f, controller, inner_area);

    if let Some(dialog) = controller.dialog() {
        render_dialog(f, dialog, size);
    }
}

/// 0. 進行状況ゲージ
fn render_progress(f: &mut Frame, controller: &Controller<GameFlow>, area: Rect) {
    let session = controller.handler().session();
    let total = session.total();
    let done = session.position().min(total);
    let ratio = if total > 0 {
        done as f64 / total as f64
    } else {
        0.0
    };

    let label = format!(
        "Exercise {} / {}  |  Score: {} / {}",
        (done + 1).min(total),
        total,
        session.score(),
        session.answered()
    );
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::NONE))
        .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
        .ratio(ratio)
        .label(label);
    f.render_widget(gauge, area);
}

fn render_welcome(f: &mut Frame, controller: &Controller<GameFlow>, now: Instant, area: Rect) {
    let total = WELCOME_COMMAND.chars().count();
    let typed = controller.typed_chars(total, now);
    let shown: String = WELCOME_COMMAND.chars().take(typed).collect();

    let mut command = vec![
        Span::styled("$ ", Style::default().fg(Color::Green)),
        Span::styled(shown, Style::default().fg(Color::Cyan)),
    ];
    // タイピング中だけカーソルを出す
    if typed < total {
        command.push(Span::styled(" ", Style::default().bg(Color::Cyan)));
    }

    let lines = vec![
        Line::from(""),
        Line::from("IDE ERRORS").bold().centered(),
        Line::from("Fix the code. Learn the phrasal verbs.").centered(),
        Line::from(""),
        Line::from(command).centered(),
        Line::from(""),
        Line::from("Press Enter to start")
            .style(Style::default().fg(Color::Yellow))
            .centered(),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

/// コード1行を描画 (空欄は赤く強調)
fn code_line(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    for (i, part) in line.split(BLANK).enumerate() {
        if i > 0 {
            spans.push(Span::styled(
                BLANK,
                Style::default().fg(Color::Red).underlined(),
            ));
        }
        spans.push(Span::styled(part, Style::default().fg(Color::White)));
    }
    Line::from(spans)
}

fn render_ide(f: &mut Frame, controller: &Controller<GameFlow>, area: Rect) {
    let Some(exercise) = controller.handler().session().current_exercise() else {
        f.render_widget(Paragraph::new("No exercise loaded."), area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),                                     // コード
            Constraint::Length(3),                                  // エラー表示
            Constraint::Length(exercise.options.len() as u16 + 2), // 選択肢
        ])
        .split(area);

    let code: Vec<Line> = exercise.code.lines().map(code_line).collect();
    f.render_widget(
        Paragraph::new(code).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {}.java ", exercise.title)),
        ),
        chunks[0],
    );

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("error: ", Style::default().fg(Color::Red).bold()),
            Span::raw(exercise.error.as_str()),
        ]))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Problems ")),
        chunks[1],
    );

    let selected = controller.ui().selected_option;
    let options: Vec<Line> = exercise
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let text = format!(" {}. {} ", i + 1, option);
            if selected == Some(i) {
                Line::from(text).style(Style::default().fg(Color::Black).bg(Color::White))
            } else {
                Line::from(text).style(Style::default().fg(Color::Gray))
            }
        })
        .collect();
    let title = if controller.is_compiling() {
        " Compiling... "
    } else {
        " Fill the blank (1-4, Enter to compile) "
    };
    f.render_widget(
        Paragraph::new(options).block(Block::default().borders(Borders::ALL).title(title)),
        chunks[2],
    );
}

fn render_validation(f: &mut Frame, controller: &Controller<GameFlow>, now: Instant, area: Rect) {
    let session = controller.handler().session();
    let (Some(exercise), Some(result)) = (session.current_exercise(), session.last_result())
    else {
        f.render_widget(Paragraph::new("Nothing to validate."), area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // 結果ヘッダ
            Constraint::Min(3),    // コンソール出力
            Constraint::Length(6), // 解説
        ])
        .split(area);

    let header = if result.correct {
        Line::from("BUILD SUCCESSFUL").style(Style::default().fg(Color::Green).bold())
    } else {
        Line::from("BUILD FAILED").style(Style::default().fg(Color::Red).bold())
    };
    f.render_widget(Paragraph::new(header).centered(), chunks[0]);

    // 正解なら実行結果、不正解ならコンパイルエラー
    let output: Vec<&str> = if result.correct {
        exercise.execute_result_lines().collect()
    } else {
        vec![exercise.error.as_str()]
    };
    let shown = controller.revealed_lines(output.len(), now);
    let color = if result.correct { Color::Green } else { Color::Red };
    let console: Vec<Line> = output
        .into_iter()
        .take(shown)
        .map(|line| Line::from(format!("> {line}")).style(Style::default().fg(color)))
        .collect();
    f.render_widget(
        Paragraph::new(console)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Console ")),
        chunks[1],
    );

    let explanation = vec![
        Line::from(vec![
            Span::styled("Correct answer: ", Style::default().fg(Color::Yellow)),
            Span::raw(result.correct_answer.as_str()).bold(),
        ]),
        Line::from(vec![
            Span::styled("Phrasal verb: ", Style::default().fg(Color::Yellow)),
            Span::raw(result.phrasal_verb.as_str()),
        ]),
        Line::from(result.explanation.as_str()),
        Line::from("Press Enter to continue").style(Style::default().fg(Color::DarkGray)),
    ];
    f.render_widget(
        Paragraph::new(explanation)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL)),
        chunks[2],
    );
}

fn render_results(f: &mut Frame, controller: &Controller<GameFlow>, area: Rect) {
    let session = controller.handler().session();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // お祝い
            Constraint::Length(4), // 成績
            Constraint::Length(1), // 正答率ゲージ
            Constraint::Min(1),    // 覚えた句動詞
        ])
        .split(area);

    if session.should_celebrate() {
        f.render_widget(
            Paragraph::new("*  *  *  Excellent work!  *  *  *")
                .style(Style::default().fg(Color::Yellow).bold())
                .centered(),
            chunks[0],
        );
    }

    let stats = vec![
        Line::from(format!("Score: {} / {}", session.score(), session.answered())),
        Line::from(format!("Accuracy: {:.0}%", session.accuracy())),
        Line::from(format!("Phrasal verbs learned: {}", session.learned().len())),
        Line::from("Enter: play again   S: share   Esc: exit")
            .style(Style::default().fg(Color::DarkGray)),
    ];
    f.render_widget(Paragraph::new(stats).centered(), chunks[1]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .ratio((session.accuracy() / 100.0).clamp(0.0, 1.0));
    f.render_widget(gauge, chunks[2]);

    let learned: Vec<Line> = session
        .learned()
        .iter()
        .map(|pv| Line::from(format!("  - {pv}")))
        .collect();
    f.render_widget(
        Paragraph::new(learned)
            .block(Block::default().borders(Borders::ALL).title(" Learned ")),
        chunks[3],
    );
}

/// 右上に通知を積む
fn render_notifications(f: &mut Frame, controller: &Controller<GameFlow>, area: Rect) {
    let width = 40.min(area.width);
    let mut y = area.y;
    for notification in controller.notifications() {
        let color = match notification.kind {
            NoticeKind::Info => Color::Yellow,
            NoticeKind::Success => Color::Cyan,
            NoticeKind::Warning => Color::LightYellow,
            NoticeKind::Error => Color::LightRed,
        };
        let height = 4;
        if y + height > area.y + area.height {
            break;
        }
        let rect = Rect {
            x: area.x + area.width - width,
            y,
            width,
            height,
        };
        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(notification.message.as_str())
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(color))
                .block(Block::default().borders(Borders::ALL)),
            rect,
        );
        y += height;
    }
}

fn render_dialog(f: &mut Frame, dialog: &Dialog, area: Rect) {
    let (title, body, height) = match dialog {
        Dialog::Help => (" Help ", HELP_TEXT.to_string(), 24),
        Dialog::Confirm(ConfirmAction::Restart) => {
            (" Confirm ", "Restart the game? (y/N)".to_string(), 3)
        }
        Dialog::Confirm(ConfirmAction::Exit) => {
            (" Confirm ", "Exit the game? (y/N)".to_string(), 3)
        }
        Dialog::Share(text) => (" Share your results ", text.clone(), 8),
    };
    let rect = centered_rect(64, height, area);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title)),
        rect,
    );
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
