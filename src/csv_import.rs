use serde::Serialize;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::{ErrorKind, QuizError, Result};
use crate::models::{NewQuestion, OPTIONS_PER_QUESTION};

// text, four options, correct index
const REQUIRED_COLUMNS: usize = 2 + OPTIONS_PER_QUESTION;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub row: usize,
    pub kind: ErrorKind,
    pub reason: String,
}

impl RowFailure {
    fn new(row: usize, err: &QuizError) -> Self {
        Self {
            row,
            kind: err.kind(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CsvImportSummary {
    pub imported: usize,
    pub total: usize,
    pub failures: Vec<RowFailure>,
}

impl CsvImportSummary {
    pub fn message(&self) -> String {
        format!("{} of {} questions imported.", self.imported, self.total)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Splits one CSV line into fields.
///
/// Double-quoted fields may contain commas, and `""` inside quotes is a literal
/// quote. An unterminated quote runs to the end of the line.
pub fn parse_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
        } else {
            match ch {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                _ => field.push(ch),
            }
        }
    }
    fields.push(field);
    fields
}

pub fn row_to_question(bank_id: i64, columns: &[String]) -> Result<NewQuestion> {
    if columns.len() < REQUIRED_COLUMNS {
        return Err(QuizError::invalid(format!(
            "expected at least {} columns, found {}",
            REQUIRED_COLUMNS,
            columns.len()
        )));
    }

    let cols: Vec<&str> = columns.iter().map(|c| c.trim()).collect();
    let text = cols[0];
    let options = [cols[1], cols[2], cols[3], cols[4]];
    if text.is_empty() || options.iter().any(|o| o.is_empty()) {
        return Err(QuizError::invalid(
            "question text and all four options are required",
        ));
    }

    let correct_answer_index = match cols[5].parse::<usize>() {
        Ok(i) if i < OPTIONS_PER_QUESTION => i,
        _ => {
            return Err(QuizError::invalid(format!(
                "invalid correct answer index `{}`",
                cols[5]
            )))
        }
    };

    let explanation = cols
        .get(6)
        .filter(|e| !e.is_empty())
        .map(|e| e.to_string());

    Ok(NewQuestion {
        question_bank_id: bank_id,
        text: text.to_string(),
        options: options.map(str::to_string),
        correct_answer_index,
        explanation,
    })
}

/// Adds every valid row of `text` to the bank.
///
/// Partial success: a bad row is recorded in the summary and the rest still go in.
/// Only a missing bank fails the whole call.
pub fn import_csv(db: &Database, bank_id: i64, text: &str) -> Result<CsvImportSummary> {
    if db.get_bank(bank_id)?.is_none() {
        return Err(QuizError::not_found("question bank", bank_id));
    }

    let mut summary = CsvImportSummary::default();
    let rows = text.lines().filter(|line| !line.trim().is_empty());

    for (i, line) in rows.enumerate() {
        let row = i + 1;
        summary.total += 1;

        let outcome = row_to_question(bank_id, &parse_csv_row(line))
            .and_then(|q| db.add_question(&q));

        match outcome {
            Ok(_) => summary.imported += 1,
            Err(e) => {
                warn!(bank_id, row, error = %e, "Skipped CSV row");
                summary.failures.push(RowFailure::new(row, &e));
            }
        }
    }

    info!(
        bank_id,
        imported = summary.imported,
        failed = summary.failures.len(),
        "CSV import finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        db
    }

    fn cols(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    mod tokenizer {
        use super::*;

        #[test]
        fn plain_fields() {
            assert_eq!(parse_csv_row("a,b,c"), cols(&["a", "b", "c"]));
        }

        #[test]
        fn quoted_comma() {
            assert_eq!(parse_csv_row(r#""a, b",c"#), cols(&["a, b", "c"]));
        }

        #[test]
        fn escaped_quote() {
            assert_eq!(
                parse_csv_row(r#""say ""hi""",x"#),
                cols(&[r#"say "hi""#, "x"])
            );
        }

        #[test]
        fn trailing_empty_field() {
            assert_eq!(parse_csv_row("a,"), cols(&["a", ""]));
        }
    }

    mod rows {
        use super::*;

        #[test]
        fn valid_row_with_explanation() {
            let q = row_to_question(1, &cols(&["Q", "a", "b", "c", "d", "2", " why "])).unwrap();
            assert_eq!(q.correct_answer_index, 2);
            assert_eq!(q.explanation.as_deref(), Some("why"));
        }

        #[test]
        fn blank_explanation_is_none() {
            let q = row_to_question(1, &cols(&["Q", "a", "b", "c", "d", "0", ""])).unwrap();
            assert!(q.explanation.is_none());
        }

        #[test]
        fn too_few_columns() {
            let err = row_to_question(1, &cols(&["Q", "a", "b", "c"])).unwrap_err();
            assert!(matches!(err, QuizError::InvalidFormat(ref msg) if msg.contains("columns")));
        }

        #[test]
        fn blank_option() {
            assert!(row_to_question(1, &cols(&["Q", "a", " ", "c", "d", "0"])).is_err());
        }

        #[test]
        fn bad_index() {
            assert!(row_to_question(1, &cols(&["Q", "a", "b", "c", "d", "4"])).is_err());
            assert!(row_to_question(1, &cols(&["Q", "a", "b", "c", "d", "-1"])).is_err());
            assert!(row_to_question(1, &cols(&["Q", "a", "b", "c", "d", "x"])).is_err());
        }
    }

    mod import {
        use super::*;

        #[test]
        fn partial_success_reports_failed_row() {
            let db = setup_db();
            let bank = db.add_bank("Geography", "").unwrap();
            let csv = "Capital of France?,Paris,Rome,Berlin,Madrid,0\n\
                       Broken row,a,b,c\n\
                       \"Largest ocean, by area?\",Atlantic,Pacific,Indian,Arctic,1,It covers a third of Earth\n";

            let summary = import_csv(&db, bank, csv).unwrap();

            assert_eq!(summary.message(), "2 of 3 questions imported.");
            assert_eq!(summary.failures.len(), 1);
            assert_eq!(summary.failures[0].row, 2);
            assert_eq!(summary.failures[0].kind, ErrorKind::InvalidFormat);

            let stored = db.list_questions(bank).unwrap();
            assert_eq!(stored.len(), 2);
            assert_eq!(stored[0].text, "Capital of France?");
            assert_eq!(stored[1].text, "Largest ocean, by area?");
            assert_eq!(stored[1].correct_option(), "Pacific");
        }

        #[test]
        fn blank_lines_do_not_count() {
            let db = setup_db();
            let bank = db.add_bank("B", "").unwrap();
            let summary = import_csv(&db, bank, "\r\nQ,a,b,c,d,3\r\n\r\n").unwrap();
            assert_eq!(summary.total, 1);
            assert_eq!(summary.imported, 1);
            assert!(summary.is_complete());
        }

        #[test]
        fn store_failure_is_recorded_per_row() {
            let db = setup_db();
            let bank = db.add_bank("B", "").unwrap();
            db.conn_for_tests()
                .execute_batch(
                    "CREATE TRIGGER block_questions BEFORE INSERT ON questions
                     BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
                )
                .unwrap();

            let summary = import_csv(&db, bank, "Q,a,b,c,d,0\nShort,a").unwrap();

            assert_eq!(summary.message(), "0 of 2 questions imported.");
            let kinds: Vec<ErrorKind> = summary.failures.iter().map(|f| f.kind).collect();
            assert_eq!(kinds, vec![ErrorKind::Storage, ErrorKind::InvalidFormat]);
        }

        #[test]
        fn missing_bank_is_not_found() {
            let db = setup_db();
            let err = import_csv(&db, 42, "Q,a,b,c,d,0").unwrap_err();
            assert!(matches!(err, QuizError::NotFound { .. }));
        }

        #[test]
        fn empty_input() {
            let db = setup_db();
            let bank = db.add_bank("B", "").unwrap();
            let summary = import_csv(&db, bank, "").unwrap();
            assert_eq!(summary.message(), "0 of 0 questions imported.");
        }
    }
}
