use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::session::{format_clock, AnswerFeedback, QuizSession, SessionPhase};

const OPTION_LABELS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];
const LOW_TIME_SECS: u32 = 60;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.session() else {
        return;
    };
    let Some(question) = session.current_question() else {
        return;
    };
    let feedback = session.last_feedback();

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(if feedback.is_some() { 6 } else { 0 }),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(area);

    render_status(frame, chunks[0], session);
    render_question_text(frame, chunks[1], &question.question_text, question.required_answer_count());
    render_options(frame, chunks[2], session, app.selected_option(), feedback);
    if let Some(feedback) = feedback {
        render_feedback(frame, chunks[3], feedback);
    }
    super::render_controls(frame, chunks[4], controls_hint(session));
}

fn render_status(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let halves = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(area);

    let clock_color = match session.phase() {
        SessionPhase::NotStarted => Color::DarkGray,
        _ if session.is_paused() => Color::Yellow,
        _ if session.time_remaining() <= LOW_TIME_SECS => Color::Red,
        _ => Color::Green,
    };
    let mut clock = vec![Span::styled(
        format_clock(session.time_remaining()),
        Style::default().fg(clock_color).bold(),
    )];
    if session.is_paused() {
        clock.push(Span::styled("  PAUSED", Style::default().fg(Color::Yellow)));
    } else if session.phase() == SessionPhase::NotStarted {
        clock.push(Span::styled("  press p to start", Style::default().fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(Line::from(clock)), halves[0]);

    let progress = format!(
        "Question {} of {}  ·  from a pool of {}",
        session.question_number(),
        session.total_questions(),
        session.pool_size()
    );
    let widget = Paragraph::new(progress)
        .alignment(Alignment::Right)
        .fg(Color::DarkGray);
    frame.render_widget(widget, halves[1]);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str, required: usize) {
    let mut lines = vec![Line::from(Span::styled(
        text,
        Style::default().fg(Color::White).bold(),
    ))];
    if required > 1 {
        lines.push(Line::from(
            format!("(Choose {})", required).fg(Color::DarkGray),
        ));
    }
    let widget = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    session: &QuizSession,
    cursor: usize,
    feedback: Option<&AnswerFeedback>,
) {
    let Some(question) = session.current_question() else {
        return;
    };
    let mut lines: Vec<Line> = Vec::with_capacity(question.options.len() * 2);

    for (index, option) in question.options.iter().enumerate() {
        let is_cursor = index == cursor && feedback.is_none();
        let is_selected = session.is_selected(option);

        let style = match feedback {
            Some(_) if question.is_correct_answer(option) => {
                Style::default().fg(Color::Green).bold()
            }
            Some(_) if is_selected => Style::default().fg(Color::Red),
            Some(_) => Style::default().fg(Color::DarkGray),
            None if is_cursor => Style::default().fg(Color::Cyan).bold(),
            None => Style::default().fg(Color::Gray),
        };
        let marker = if is_cursor { ">" } else { " " };
        let check = if is_selected { "[x]" } else { "[ ]" };
        let label = OPTION_LABELS.get(index).copied().unwrap_or('?');

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{} {}. ", check, label), style),
            Span::styled(option.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_feedback(frame: &mut Frame, area: Rect, feedback: &AnswerFeedback) {
    let (verdict, color) = if feedback.correct {
        ("Correct", Color::Green)
    } else {
        ("Incorrect", Color::Red)
    };

    let mut lines = vec![Line::from(Span::styled(
        verdict,
        Style::default().fg(color).bold(),
    ))];
    if let Some(explanation) = &feedback.explanation {
        lines.push(Line::from(Span::styled(
            explanation.as_str(),
            Style::default().fg(Color::Gray),
        )));
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn controls_hint(session: &QuizSession) -> &'static str {
    match session.phase() {
        SessionPhase::AnsweredWaiting => "enter next  ·  p pause  ·  esc quit quiz",
        SessionPhase::NotStarted => "j/k navigate  ·  space select  ·  enter submit  ·  p start",
        _ => "j/k navigate  ·  space select  ·  enter submit  ·  p pause",
    }
}
