use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::{grade_color, option_label, rich_spans, truncate};
use crate::markup;
use crate::models::{Question, QuizResult};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(result) = app.session.as_ref().and_then(|s| s.result()) else {
        let block = Block::default().borders(Borders::ALL).title(" Results ");
        let paragraph = Paragraph::new("No completed quiz").block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),      // Score
            Constraint::Percentage(50), // Review list
            Constraint::Min(0),         // Selected question
        ])
        .split(area);

    draw_score(f, result, chunks[0]);
    draw_review(f, app, result, chunks[1]);
    draw_selected(f, app, result, chunks[2]);
}

fn draw_score(f: &mut Frame, result: &QuizResult, area: Rect) {
    let color = grade_color(result.grade());

    let text = vec![Line::from(vec![
        Span::styled("You scored ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{} / {}", result.score, result.total_questions),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ({}%)", result.percentage()),
            Style::default().fg(color),
        ),
    ])];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} Results ", result.question_bank.name))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn answer_text(question: &Question, answer: Option<usize>) -> String {
    match answer.and_then(|i| question.options.get(i)) {
        Some(option) => markup::plain(option),
        None => "(not answered)".to_string(),
    }
}

fn draw_review(f: &mut Frame, app: &App, result: &QuizResult, area: Rect) {
    let items: Vec<ListItem> = app
        .review
        .items
        .iter()
        .filter_map(|&i| {
            let question = result.questions.get(i)?;
            let answer = result.user_answers.get(i).copied().flatten();
            let (mark, color) = if question.is_correct(answer) {
                ("✓", Color::Green)
            } else {
                ("✗", Color::Red)
            };
            Some(ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", mark), Style::default().fg(color)),
                Span::styled(
                    format!("{:>2}. ", i + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    truncate(&markup::plain(&question.text), 60),
                    Style::default().fg(Color::White),
                ),
            ])))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Review ")
        .title_style(Style::default().fg(Color::Cyan));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.review.selected);

    f.render_stateful_widget(list, area, &mut state);
}

fn draw_selected(f: &mut Frame, app: &App, result: &QuizResult, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Details ")
        .title_style(Style::default().fg(Color::Cyan));

    let Some((index, question)) = app
        .review
        .selected_item()
        .and_then(|&i| result.questions.get(i).map(|q| (i, q)))
    else {
        f.render_widget(Paragraph::new("").block(block), area);
        return;
    };
    let answer = result.user_answers.get(index).copied().flatten();
    let answer_color = if question.is_correct(answer) {
        Color::Green
    } else {
        Color::Red
    };

    let mut text = vec![
        Line::from(rich_spans(
            &question.text,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Your answer: ", Style::default().fg(Color::Gray)),
            Span::styled(answer_text(question, answer), Style::default().fg(answer_color)),
        ]),
        Line::from(vec![
            Span::styled("Correct answer: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!(
                    "{}. {}",
                    option_label(question.correct_answer_index),
                    markup::plain(question.correct_option())
                ),
                Style::default().fg(Color::Green),
            ),
        ]),
    ];

    if let Some(explanation) = &question.explanation {
        text.push(Line::from(""));
        text.push(Line::from(rich_spans(
            explanation,
            Style::default().fg(Color::White),
        )));
    }

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
