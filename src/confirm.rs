//! Two-step confirmation for destructive operations.
//!
//! A `request_*` call checks that the target exists and describes what will
//! happen; nothing changes until [`PendingConfirmation::confirm`] runs.

use serde::Serialize;

use crate::db::Database;
use crate::error::{QuizError, Result};
use crate::models::DeleteSummary;
use crate::transfer::{self, ImportSummary, TransferDocument};

#[derive(Debug)]
enum Action {
    DeleteBank { id: i64 },
    DeleteQuestion { id: i64 },
    Import { document: TransferDocument },
}

#[derive(Debug)]
pub struct PendingConfirmation {
    title: &'static str,
    message: String,
    action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ConfirmedAction {
    BankDeleted { id: i64, summary: DeleteSummary },
    QuestionDeleted { id: i64, removed: bool },
    Imported { summary: ImportSummary },
}

impl ConfirmedAction {
    pub fn describe(&self) -> String {
        match self {
            ConfirmedAction::BankDeleted { id, summary } => format!(
                "Deleted bank {} ({} questions, {} history entries)",
                id, summary.questions_removed, summary.history_removed
            ),
            ConfirmedAction::QuestionDeleted { id, removed: true } => {
                format!("Deleted question {}", id)
            }
            ConfirmedAction::QuestionDeleted { id, removed: false } => {
                format!("Question {} was already gone", id)
            }
            ConfirmedAction::Imported { summary } => format!(
                "Imported {} banks and {} questions",
                summary.banks, summary.questions
            ),
        }
    }
}

pub fn request_delete_bank(db: &Database, id: i64) -> Result<PendingConfirmation> {
    let bank = db
        .get_bank(id)?
        .ok_or_else(|| QuizError::not_found("question bank", id))?;
    let questions = db.list_questions(id)?.len();
    let history = db.list_history_for_bank(id)?.len();

    Ok(PendingConfirmation {
        title: "Delete Question Bank",
        message: format!(
            "Delete \"{}\"? This also deletes its {} questions and {} history entries.",
            bank.name, questions, history
        ),
        action: Action::DeleteBank { id },
    })
}

pub fn request_delete_question(db: &Database, id: i64) -> Result<PendingConfirmation> {
    db.get_question(id)?
        .ok_or_else(|| QuizError::not_found("question", id))?;

    Ok(PendingConfirmation {
        title: "Delete Question",
        message: "Are you sure you want to delete this question?".to_string(),
        action: Action::DeleteQuestion { id },
    })
}

// The document is parsed and validated here, so confirm() cannot fail on format
pub fn request_import(text: &str) -> Result<PendingConfirmation> {
    let document = transfer::parse_document(text)?;

    Ok(PendingConfirmation {
        title: "Import Data",
        message: format!(
            "Importing will overwrite ALL existing banks and questions with {} banks and {} questions. Continue?",
            document.question_banks.len(),
            document.questions.len()
        ),
        action: Action::Import { document },
    })
}

impl PendingConfirmation {
    pub fn title(&self) -> &str {
        self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn confirm(self, db: &Database) -> Result<ConfirmedAction> {
        match self.action {
            Action::DeleteBank { id } => Ok(ConfirmedAction::BankDeleted {
                id,
                summary: db.delete_bank(id)?,
            }),
            Action::DeleteQuestion { id } => Ok(ConfirmedAction::QuestionDeleted {
                id,
                removed: db.delete_question(id)?,
            }),
            Action::Import { document } => Ok(ConfirmedAction::Imported {
                summary: transfer::import_document(db, &document)?,
            }),
        }
    }

    pub fn cancel(self) {}
}
