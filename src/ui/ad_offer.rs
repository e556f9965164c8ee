use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(11),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    let reset_in = app.time_until_reset();
    let mode = app
        .pending_mode()
        .map(|m| m.title())
        .unwrap_or("a quiz");

    let status = if app.is_watching_ad() {
        Span::styled("Watching ad...", Style::default().fg(Color::Yellow))
    } else if app.ad_ready() {
        Span::styled("Ad ready", Style::default().fg(Color::Green))
    } else {
        Span::styled("Loading ad...", Style::default().fg(Color::DarkGray))
    };

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "OUT OF ATTEMPTS",
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(""),
        Line::from(format!("Watch an ad to unlock {}", mode).fg(Color::Gray)),
        Line::from(format!("or wait {} for the daily reset", reset_in).fg(Color::DarkGray)),
        Line::from(""),
        Line::from(status),
    ];
    if let Some(message) = app.message() {
        content.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    }

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::DarkGray),
        );
    frame.render_widget(widget, chunks[1]);
    super::render_controls(frame, chunks[3], "w watch ad  ·  esc back  ·  q quit");
}
