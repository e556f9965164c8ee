use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::config::ModeConfig;
use crate::models::QuizMode;

pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(16),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    let remaining = app.remaining_attempts();
    let reset_in = app.time_until_reset();
    let attempts_color = if remaining > 0 { Color::Green } else { Color::Red };

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "AWS EXAM PREP",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            app.track().title(),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(format!("{} questions in bank", app.bank().len()).fg(Color::DarkGray)),
        Line::from(""),
        mode_line('1', QuizMode::Quick, app.mode_config(QuizMode::Quick)),
        mode_line('2', QuizMode::Full, app.mode_config(QuizMode::Full)),
        Line::from(""),
        Line::from(vec![
            Span::styled("Attempts left today: ", Style::default().fg(Color::Gray)),
            Span::styled(remaining.to_string(), Style::default().fg(attempts_color).bold()),
        ]),
        Line::from(format!("Resets in {}", reset_in).fg(Color::DarkGray)),
    ];

    if app.bank().is_empty() && app.message().is_none() {
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            "No questions available for this exam",
            Style::default().fg(Color::Red),
        )));
    }
    if let Some(message) = app.message() {
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    }

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, chunks[1]);
    super::render_controls(
        frame,
        chunks[3],
        "1 quick  ·  2 full  ·  e exam  ·  h history  ·  q quit",
    );
}

fn mode_line(key: char, mode: QuizMode, config: ModeConfig) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}  ", key), Style::default().fg(Color::Green).bold()),
        Span::styled(mode.title(), Style::default().fg(Color::Gray)),
        Span::styled(
            format!(
                "  {} questions · {} min",
                config.question_count,
                config.time_limit_secs / 60
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}
