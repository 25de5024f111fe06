use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{option_label, progress_bar, rich_spans};
use crate::session::{ActiveQuiz, HintSlot};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(quiz) = app.session.as_ref().and_then(|s| s.active()) else {
        let block = Block::default().borders(Borders::ALL).title(" Quiz ");
        let paragraph = Paragraph::new("No quiz in progress").block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress
            Constraint::Min(8),    // Question and options
            Constraint::Length(5), // Hint or explanation
        ])
        .split(area);

    draw_progress(f, quiz, chunks[0]);
    draw_question(f, quiz, chunks[1]);
    draw_footer(f, quiz, chunks[2]);
}

fn draw_progress(f: &mut Frame, quiz: &ActiveQuiz, area: Rect) {
    let total = quiz.questions.len();
    let position = quiz.current + 1;

    let line = Line::from(vec![
        Span::styled(
            format!("Question {} of {}  ", position, total),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            progress_bar(position, total, 20),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("  Score: {}", quiz.score()),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", quiz.bank.name))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_question(f: &mut Frame, quiz: &ActiveQuiz, area: Rect) {
    let question = quiz.current_question();
    let chosen = quiz.current_answer();

    let mut text = vec![
        Line::from(rich_spans(
            &question.text,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (i, option) in question.options.iter().enumerate() {
        // Correctness is only revealed once the question is answered
        let style = match chosen {
            Some(_) if i == question.correct_answer_index => Style::default().fg(Color::Green),
            Some(c) if c == i => Style::default().fg(Color::Red),
            Some(_) => Style::default().fg(Color::DarkGray),
            None => Style::default().fg(Color::White),
        };
        let marker = match chosen {
            Some(c) if c == i => "● ",
            _ => "  ",
        };

        let mut spans = vec![
            Span::styled(marker, style),
            Span::styled(format!("[{}] {}. ", i + 1, option_label(i)), Style::default().fg(Color::Cyan)),
        ];
        spans.extend(rich_spans(option, style));
        text.push(Line::from(spans));
    }

    let block = Block::default().borders(Borders::ALL);
    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_footer(f: &mut Frame, quiz: &ActiveQuiz, area: Rect) {
    let question = quiz.current_question();

    let (title, line) = if let Some(chosen) = quiz.current_answer() {
        let verdict = if question.is_correct(Some(chosen)) {
            Span::styled("Correct! ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            Span::styled("Incorrect. ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        };
        let mut spans = vec![verdict];
        match &question.explanation {
            Some(explanation) => spans.extend(rich_spans(explanation, Style::default().fg(Color::White))),
            None => spans.push(Span::styled(
                format!("The answer is {}.", option_label(question.correct_answer_index)),
                Style::default().fg(Color::Gray),
            )),
        }
        (" Explanation ", Line::from(spans))
    } else {
        let line = match &quiz.hint {
            HintSlot::Idle => Line::from(Span::styled(
                "Press ? for a hint.",
                Style::default().fg(Color::DarkGray),
            )),
            HintSlot::Pending(_) => Line::from(Span::styled(
                "Thinking...",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            )),
            HintSlot::Ready(hint) => Line::from(rich_spans(hint.as_str(), Style::default().fg(Color::Cyan))),
        };
        (" Hint ", line)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(line).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
