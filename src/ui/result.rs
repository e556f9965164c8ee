use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::models::PASS_THRESHOLD;
use crate::session::format_clock;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(outcome) = app.session().and_then(|s| s.outcome()) else {
        return;
    };
    let result = &outcome.result;
    let percentage = result.percentage();

    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(12),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    let (verdict, verdict_color) = if outcome.passed {
        ("PASSED", Color::Green)
    } else {
        ("NOT PASSED", Color::Red)
    };

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            verdict,
            Style::default().fg(verdict_color).bold(),
        )),
        Line::from(Span::styled(
            format!(
                "{} / {}  ({:.0}%)",
                result.score, result.total_questions, percentage
            ),
            Style::default().fg(super::grade_color(percentage)).bold(),
        )),
        Line::from(format!("Pass mark {:.0}%", PASS_THRESHOLD).fg(Color::DarkGray)),
        Line::from(""),
        Line::from(
            format!(
                "Time spent {} of {}",
                format_clock(result.time_spent),
                format_clock(result.time_limit)
            )
            .fg(Color::Gray),
        ),
    ];
    if outcome.timed_out {
        content.push(Line::from(Span::styled(
            "Time ran out",
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
        "r restart  ·  h history  ·  esc home  ·  q quit",
    );
}
