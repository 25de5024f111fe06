use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use super::widgets::{bank_detail, banks, history, quiz, result};
use super::{App, View};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_help_bar(f, app, chunks[2]);

    if app.pending.is_some() {
        draw_confirmation(f, app);
    }
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let tab_titles = vec!["Banks", "History"];
    let selected = match app.view {
        View::History => 1,
        _ => 0,
    };

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(" Quizbank "))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::Banks => banks::draw(f, app, area),
        View::BankDetail => bank_detail::draw(f, app, area),
        View::Quiz => quiz::draw(f, app, area),
        View::Result => result::draw(f, app, area),
        View::History => history::draw(f, app, area),
    }
}

fn key(k: &'static str) -> Span<'static> {
    Span::styled(k, Style::default().fg(Color::Cyan))
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let help_text = if let Some(status) = &app.status {
        vec![Span::styled(
            status.as_str(),
            Style::default().fg(Color::Yellow),
        )]
    } else if app.pending.is_some() {
        vec![key("y"), Span::raw(" Confirm  "), key("n/<Esc>"), Span::raw(" Cancel")]
    } else {
        let mut spans = Vec::new();

        match app.view {
            View::Banks => {
                spans.extend(vec![
                    key("j/k"),
                    Span::raw(" Nav  "),
                    key("g/G"),
                    Span::raw(" Top/Bot  "),
                    key("l/<CR>"),
                    Span::raw(" Open  "),
                    key("d"),
                    Span::raw(" Delete  "),
                    key("<Tab>"),
                    Span::raw(" History  "),
                ]);
            }
            View::BankDetail => {
                spans.extend(vec![
                    key("<CR>"),
                    Span::raw(" Start  "),
                    key("+/-"),
                    Span::raw(" Count  "),
                    key("s/o"),
                    Span::raw(" Shuffle  "),
                    key("x"),
                    Span::raw(" Del question  "),
                    key("d"),
                    Span::raw(" Del bank  "),
                    key("h/<Esc>"),
                    Span::raw(" Back  "),
                ]);
            }
            View::Quiz => {
                spans.extend(vec![
                    key("1-4"),
                    Span::raw(" Answer  "),
                    key("<CR>"),
                    Span::raw(" Next  "),
                    key("?"),
                    Span::raw(" Hint  "),
                    key("<Esc>"),
                    Span::raw(" Exit quiz"),
                ]);
            }
            View::Result => {
                spans.extend(vec![
                    key("j/k"),
                    Span::raw(" Review  "),
                    key("r"),
                    Span::raw(" Retake  "),
                    key("<CR>/<Esc>"),
                    Span::raw(" Back  "),
                ]);
            }
            View::History => {
                spans.extend(vec![
                    key("j/k"),
                    Span::raw(" Nav  "),
                    key("^r"),
                    Span::raw(" Refresh  "),
                    key("<Tab>"),
                    Span::raw(" Banks  "),
                ]);
            }
        }

        if app.view != View::Quiz {
            spans.extend(vec![key("q"), Span::raw(" Quit")]);
        }

        spans
    };

    let help = Paragraph::new(Line::from(help_text)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}

fn draw_confirmation(f: &mut Frame, app: &App) {
    let Some(pending) = &app.pending else {
        return;
    };

    let area = centered_rect(60, 7, f.area());

    let text = vec![
        Line::from(Span::styled(
            pending.message(),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(vec![
            key("y"),
            Span::raw(" Confirm   "),
            key("n"),
            Span::raw(" Cancel"),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(format!(" {} ", pending.title()))
        .title_style(
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = r.width * percent_x / 100;
    Rect {
        x: r.x + (r.width.saturating_sub(width)) / 2,
        y: r.y + (r.height.saturating_sub(height)) / 2,
        width,
        height: height.min(r.height),
    }
}
