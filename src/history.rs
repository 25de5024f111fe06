use tracing::info;

use crate::db::Database;
use crate::error::{QuizError, Result};
use crate::models::{percentage, QuizHistory};

// Append-only: entries are never updated, only removed by a bank's cascade delete
pub fn record(db: &Database, entry: &QuizHistory) -> Result<i64> {
    if entry.total_questions == 0 {
        return Err(QuizError::invalid("history entry must cover at least one question"));
    }
    if entry.score > entry.total_questions {
        return Err(QuizError::invalid(format!(
            "score {} exceeds total {}",
            entry.score, entry.total_questions
        )));
    }
    if entry.percentage != percentage(entry.score, entry.total_questions) {
        return Err(QuizError::invalid(format!(
            "percentage {} does not match score {}/{}",
            entry.percentage, entry.score, entry.total_questions
        )));
    }

    let id = db.add_history(entry)?;
    info!(
        history_id = id,
        bank_id = entry.bank_id,
        score = entry.score,
        total = entry.total_questions,
        "Recorded quiz result"
    );
    Ok(id)
}

// Most recent first; full scan is fine for one user's history
pub fn list(db: &Database) -> Result<Vec<QuizHistory>> {
    let mut entries = db.list_history()?;
    sort_recent_first(&mut entries);
    Ok(entries)
}

pub fn list_for_bank(db: &Database, bank_id: i64) -> Result<Vec<QuizHistory>> {
    let mut entries = db.list_history_for_bank(bank_id)?;
    sort_recent_first(&mut entries);
    Ok(entries)
}

fn sort_recent_first(entries: &mut [QuizHistory]) {
    entries.sort_by(|a, b| {
        b.date_completed
            .cmp(&a.date_completed)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct HistoryStats {
    pub attempts: usize,
    pub average_percentage: f64,
    pub best_percentage: u32,
}

pub fn stats(entries: &[QuizHistory]) -> HistoryStats {
    if entries.is_empty() {
        return HistoryStats::default();
    }
    let total: u64 = entries.iter().map(|e| e.percentage as u64).sum();
    HistoryStats {
        attempts: entries.len(),
        average_percentage: total as f64 / entries.len() as f64,
        best_percentage: entries.iter().map(|e| e.percentage).max().unwrap_or(0),
    }
}
