use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{format_date, truncate};
use crate::markup;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Question Banks ")
        .title_style(Style::default().fg(Color::Cyan));

    if app.banks.items.is_empty() {
        let paragraph = Paragraph::new("No question banks yet. Add one with `quizbank bank add`.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .banks
        .items
        .iter()
        .map(|summary| {
            let count_color = if summary.question_count == 0 {
                Color::DarkGray
            } else {
                Color::Green
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<32}", truncate(&summary.bank.name, 30)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<12}", format!("{} Qs", summary.question_count)),
                    Style::default().fg(count_color),
                ),
                Span::styled(
                    format!("{:<16}", format_date(&summary.bank.created_at)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    truncate(&markup::plain(&summary.bank.description), 40),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();

    let bold_gray = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let header = Line::from(vec![
        Span::styled(format!("{:<32}", "Name"), bold_gray),
        Span::styled(format!("{:<12}", "Questions"), bold_gray),
        Span::styled(format!("{:<16}", "Created"), bold_gray),
        Span::styled("Description", bold_gray),
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
    state.select(app.banks.selected);

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
