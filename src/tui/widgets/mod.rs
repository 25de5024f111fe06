pub mod bank_detail;
pub mod banks;
pub mod history;
pub mod quiz;
pub mod result;

use chrono::{DateTime, Local, Utc};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

use crate::markup::RichText;
use crate::models::Grade;

/// Styled spans for stored rich text, layered over `base`.
pub fn rich_spans(input: &str, base: Style) -> Vec<Span<'static>> {
    RichText::parse(input)
        .segments()
        .iter()
        .map(|segment| {
            let mut style = base;
            if segment.style.bold {
                style = style.add_modifier(Modifier::BOLD);
            }
            if segment.style.italic {
                style = style.add_modifier(Modifier::ITALIC);
            }
            if segment.style.code {
                style = style.fg(Color::LightMagenta);
            }
            Span::styled(segment.text.clone(), style)
        })
        .collect()
}

pub fn grade_color(grade: Grade) -> Color {
    match grade {
        Grade::Good => Color::Green,
        Grade::Fair => Color::Yellow,
        Grade::Poor => Color::Red,
    }
}

pub fn progress_bar(done: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 { 0 } else { done * width / total };
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled.min(width)))
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%b %d, %H:%M").to_string()
}

pub fn option_label(index: usize) -> char {
    (b'A' + index as u8) as char
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
