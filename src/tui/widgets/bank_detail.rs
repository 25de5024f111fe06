use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::{option_label, rich_spans, truncate};
use crate::markup;
use crate::models::BankSummary;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(summary) = &app.selected_bank else {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Question Bank ");
        let paragraph = Paragraph::new("No bank selected").block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Description
            Constraint::Length(5), // Quiz setup
            Constraint::Min(0),    // Questions
        ])
        .split(area);

    draw_header(f, summary, chunks[0]);
    draw_setup(f, app, chunks[1]);
    draw_questions(f, app, chunks[2]);
}

fn draw_header(f: &mut Frame, summary: &BankSummary, area: Rect) {
    let description = if summary.bank.description.trim().is_empty() {
        vec![Span::styled("No description", Style::default().fg(Color::DarkGray))]
    } else {
        rich_spans(&summary.bank.description, Style::default().fg(Color::White))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", summary.bank.name))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let paragraph = Paragraph::new(Line::from(description))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn on_off(flag: bool) -> Span<'static> {
    if flag {
        Span::styled("on", Style::default().fg(Color::Green))
    } else {
        Span::styled("off", Style::default().fg(Color::DarkGray))
    }
}

fn draw_setup(f: &mut Frame, app: &App, area: Rect) {
    let available = app.questions.items.len();
    let config = &app.quiz_config;

    let text = if available == 0 {
        vec![Line::from(Span::styled(
            "This bank has no questions to quiz on.",
            Style::default().fg(Color::Red),
        ))]
    } else {
        vec![
            Line::from(vec![
                Span::styled("Questions: ", Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("{}", config.effective_count(available)),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" of {}", available),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::from(vec![
                Span::styled("Shuffle questions: ", Style::default().fg(Color::Gray)),
                on_off(config.shuffle_questions),
                Span::styled("   Shuffle options: ", Style::default().fg(Color::Gray)),
                on_off(config.shuffle_options),
            ]),
        ]
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Quiz Setup ")
        .title_style(Style::default().fg(Color::Cyan));

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_questions(f: &mut Frame, app: &App, area: Rect) {
    let width = (area.width.saturating_sub(30) as usize).max(10);

    let items: Vec<ListItem> = app
        .questions
        .items
        .iter()
        .map(|question| {
            let answer = format!(
                "{}: {}",
                option_label(question.correct_answer_index),
                markup::plain(question.correct_option())
            );
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<w$}", truncate(&markup::plain(&question.text), width), w = width + 2),
                    Style::default().fg(Color::White),
                ),
                Span::styled(truncate(&answer, 24), Style::default().fg(Color::Green)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Questions ({}) ", app.questions.items.len()))
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
    state.select(app.questions.selected);

    f.render_stateful_widget(list, area, &mut state);
}
