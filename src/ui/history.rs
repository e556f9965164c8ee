use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::results::HistorySummary;
use crate::session::format_clock;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let (results, summary) = app.history();

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(6),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_summary(frame, chunks[1], &summary);

    let lines: Vec<Line> = if results.is_empty() {
        vec![Line::from("No attempts yet".fg(Color::DarkGray))]
    } else {
        results
            .iter()
            .map(|result| {
                let (symbol, color) = if result.passed() {
                    ("+", Color::Green)
                } else {
                    ("-", Color::Red)
                };
                Line::from(vec![
                    Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
                    Span::styled(
                        result.date.format("%Y-%m-%d %H:%M  ").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        format!(
                            "{:>3}/{:<3} {:>5.1}%  ",
                            result.score,
                            result.total_questions,
                            result.percentage()
                        ),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(
                        format_clock(result.time_spent),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };

    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((app.history_scroll() as u16, 0));
    frame.render_widget(widget, chunks[2]);

    super::render_controls(frame, chunks[3], "j/k scroll  ·  esc back  ·  q quit");
}

fn render_summary(frame: &mut Frame, area: Rect, summary: &HistorySummary) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "HISTORY",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(
            format!(
                "{} attempts  ·  average {:.0}%  ·  passed {:.0}%  ·  average time {}",
                summary.count,
                summary.average_percentage,
                summary.pass_rate,
                format_clock(summary.average_time_spent.round() as u32)
            )
            .fg(Color::Gray),
        ),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}
