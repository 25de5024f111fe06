use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{format_date, grade_color, truncate};
use crate::models::Grade;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    draw_stats(f, app, chunks[0]);
    draw_entries(f, app, chunks[1]);
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let stats = &app.history_stats;
    let average = stats.average_percentage.round() as u32;

    let line = Line::from(vec![
        Span::styled("Attempts: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}", stats.attempts),
            Style::default().fg(Color::White),
        ),
        Span::styled("   Average: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}%", average),
            Style::default().fg(grade_color(Grade::from_percentage(average))),
        ),
        Span::styled("   Best: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}%", stats.best_percentage),
            Style::default().fg(grade_color(Grade::from_percentage(stats.best_percentage))),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Summary ")
        .title_style(Style::default().fg(Color::Cyan));

    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_entries(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Quiz History ")
        .title_style(Style::default().fg(Color::Cyan));

    if app.history.items.is_empty() {
        let paragraph = Paragraph::new("You haven't completed any quizzes yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .history
        .items
        .iter()
        .map(|entry| {
            let color = grade_color(entry.grade());
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<16}", format_date(&entry.date_completed)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<32}", truncate(&entry.bank_name, 30)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<10}", format!("{}/{}", entry.score, entry.total_questions)),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(format!("{}%", entry.percentage), Style::default().fg(color)),
            ]))
        })
        .collect();

    let bold_gray = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let header = Line::from(vec![
        Span::styled(format!("{:<16}", "Completed"), bold_gray),
        Span::styled(format!("{:<32}", "Bank"), bold_gray),
        Span::styled(format!("{:<10}", "Score"), bold_gray),
        Span::styled("Percent", bold_gray),
    ]);

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.history.selected);

    let header_area = Rect {
        x: area.x + 3,
        y: area.y + 1,
        width: area.width.saturating_sub(4),
        height: 1,
    };
    f.render_widget(Paragraph::new(header), header_area);

    let list_area = Rect {
        x: area.x,
        y: area.y + 1,
        width: area.width,
        height: area.height.saturating_sub(1),
    };
    f.render_stateful_widget(list, list_area, &mut state);
}
