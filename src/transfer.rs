//! Whole-store and single-bank snapshots in the portable JSON document format.
//!
//! Import is two-phase: [`parse_document`] turns untrusted text into a typed
//! [`TransferDocument`] (or `InvalidFormat`) without touching the store, and
//! [`import_document`] replaces banks and questions in one transaction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::db::Database;
use crate::error::{QuizError, Result};
use crate::models::{Question, QuestionBank};

pub const EXPORT_ALL_FILENAME: &str = "quiz-data-export-all.json";

const BANKS_KEY: &str = "questionBanks";
const QUESTIONS_KEY: &str = "questions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDocument {
    pub question_banks: Vec<QuestionBank>,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub banks: usize,
    pub questions: usize,
}

pub fn export_all(db: &Database) -> Result<TransferDocument> {
    let doc = TransferDocument {
        question_banks: db.list_banks()?,
        questions: db.list_all_questions()?,
    };
    info!(
        banks = doc.question_banks.len(),
        questions = doc.questions.len(),
        "Exported all data"
    );
    Ok(doc)
}

// None when the bank does not exist
pub fn export_bank(db: &Database, bank_id: i64) -> Result<Option<TransferDocument>> {
    let Some(bank) = db.get_bank(bank_id)? else {
        return Ok(None);
    };
    let questions = db.list_questions(bank_id)?;
    info!(bank_id, questions = questions.len(), "Exported question bank");

    Ok(Some(TransferDocument {
        question_banks: vec![bank],
        questions,
    }))
}

pub fn to_json_pretty(doc: &TransferDocument) -> Result<String> {
    serde_json::to_string_pretty(doc).map_err(|e| QuizError::invalid(e.to_string()))
}

pub fn parse_document(text: &str) -> Result<TransferDocument> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| QuizError::invalid(format!("not valid JSON: {}", e)))?;

    let Some(object) = value.as_object() else {
        return Err(QuizError::invalid("import document must be a JSON object"));
    };
    for key in [BANKS_KEY, QUESTIONS_KEY] {
        match object.get(key) {
            Some(Value::Array(_)) => {}
            Some(_) => return Err(QuizError::invalid(format!("`{}` must be an array", key))),
            None => return Err(QuizError::invalid(format!("missing `{}`", key))),
        }
    }

    serde_json::from_value(value).map_err(|e| QuizError::invalid(e.to_string()))
}

/// Replaces every bank and question with the document's content.
///
/// Not a merge: anything absent from the document is gone afterwards. Quiz
/// history and install state are left alone. On any failure the store is
/// unchanged.
pub fn import_document(db: &Database, doc: &TransferDocument) -> Result<ImportSummary> {
    db.replace_all(&doc.question_banks, &doc.questions)?;

    let summary = ImportSummary {
        banks: doc.question_banks.len(),
        questions: doc.questions.len(),
    };
    info!(banks = summary.banks, questions = summary.questions, "Imported data");
    Ok(summary)
}

pub fn bank_export_filename(bank_name: &str) -> String {
    format!("{}-export.json", slugify(bank_name))
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut dash = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            dash = false;
        } else if !dash && !slug.is_empty() {
            slug.push('-');
            dash = true;
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "bank".to_string()
    } else {
        trimmed.to_string()
    }
}
