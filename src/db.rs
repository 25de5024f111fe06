use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{QuizError, Result};
use crate::models::{
    BankSummary, DeleteSummary, InstallState, NewQuestion, Question, QuestionBank, QuizHistory,
    OPTIONS_PER_QUESTION,
};

pub const SCHEMA_VERSION: i64 = 2;

const SEEDED_KEY: &str = "db_seeded_v1";

const BANK_COLUMNS: &str = "id, name, description, created_at";
const QUESTION_COLUMNS: &str =
    "id, question_bank_id, text, options, correct_answer_index, explanation";
const HISTORY_COLUMNS: &str =
    "id, bank_id, bank_name, score, total_questions, percentage, date_completed";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| QuizError::from(e))
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS install_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;

        self.migrate()?;
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i64> {
        let version = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(version)
    }

    // Upgrades are additive only; existing rows from older versions are never touched
    fn migrate(&self) -> Result<()> {
        let version = self.schema_version()?;

        if version < 1 {
            self.conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS question_banks (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    description TEXT NOT NULL DEFAULT '',
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS questions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    question_bank_id INTEGER NOT NULL,
                    text TEXT NOT NULL,
                    options TEXT NOT NULL,
                    correct_answer_index INTEGER NOT NULL CHECK(correct_answer_index BETWEEN 0 AND 3),
                    explanation TEXT,
                    FOREIGN KEY (question_bank_id) REFERENCES question_banks(id) ON DELETE CASCADE
                );

                CREATE INDEX IF NOT EXISTS idx_questions_bank ON questions(question_bank_id);
                "#,
            )?;
        }

        if version < 2 {
            // History keeps a denormalized bank name and no foreign key
            self.conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS quiz_history (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    bank_id INTEGER NOT NULL,
                    bank_name TEXT NOT NULL,
                    score INTEGER NOT NULL,
                    total_questions INTEGER NOT NULL,
                    percentage INTEGER NOT NULL,
                    date_completed TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_history_bank ON quiz_history(bank_id);
                CREATE INDEX IF NOT EXISTS idx_history_date ON quiz_history(date_completed);
                "#,
            )?;
        }

        if version < SCHEMA_VERSION {
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)?;
            info!(from = version, to = SCHEMA_VERSION, "Upgraded schema");
        }

        Ok(())
    }

    // Install state
    pub fn install_state(&self) -> Result<InstallState> {
        let value: Option<String> = match self.conn.query_row(
            "SELECT value FROM install_state WHERE key = ?1",
            params![SEEDED_KEY],
            |row| row.get(0),
        ) {
            Ok(v) => Some(v),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        Ok(InstallState {
            seeded: value.as_deref() == Some("true"),
        })
    }

    pub fn save_install_state(&self, state: &InstallState) -> Result<()> {
        self.conn.execute(
            "INSERT INTO install_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![SEEDED_KEY, if state.seeded { "true" } else { "false" }],
        )?;
        Ok(())
    }

    // Question bank operations
    pub fn add_bank(&self, name: &str, description: &str) -> Result<i64> {
        insert_bank(&self.conn, name, description, Utc::now())
    }

    // Inserts a bank and its questions as one unit
    pub fn add_bank_with_questions(
        &self,
        name: &str,
        description: &str,
        questions: &[NewQuestion],
    ) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        let bank_id = insert_bank(&tx, name, description, Utc::now())?;
        for question in questions {
            let question = NewQuestion {
                question_bank_id: bank_id,
                ..question.clone()
            };
            insert_question(&tx, &question)?;
        }
        tx.commit()?;
        Ok(bank_id)
    }

    pub fn get_bank(&self, id: i64) -> Result<Option<QuestionBank>> {
        let sql = format!("SELECT {} FROM question_banks WHERE id = ?1", BANK_COLUMNS);
        match self.conn.query_row(&sql, params![id], bank_from_row) {
            Ok(bank) => Ok(Some(bank)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_banks(&self) -> Result<Vec<QuestionBank>> {
        let sql = format!("SELECT {} FROM question_banks ORDER BY id", BANK_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], bank_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn list_bank_summaries(&self) -> Result<Vec<BankSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT b.id, b.name, b.description, b.created_at, COUNT(q.id)
            FROM question_banks b
            LEFT JOIN questions q ON q.question_bank_id = b.id
            GROUP BY b.id
            ORDER BY b.id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(BankSummary {
                bank: bank_from_row(row)?,
                question_count: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_banks(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM question_banks", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn update_bank(&self, bank: &QuestionBank) -> Result<()> {
        require_bank_name(&bank.name)?;
        let rows = self.conn.execute(
            "UPDATE question_banks SET name = ?1, description = ?2, created_at = ?3 WHERE id = ?4",
            params![
                bank.name,
                bank.description,
                format_timestamp(&bank.created_at),
                bank.id
            ],
        )?;
        if rows == 0 {
            return Err(QuizError::not_found("question bank", bank.id));
        }
        Ok(())
    }

    // Removes the bank, its questions and its history in one transaction
    pub fn delete_bank(&self, id: i64) -> Result<DeleteSummary> {
        let tx = self.conn.unchecked_transaction()?;

        let questions_removed = tx.execute(
            "DELETE FROM questions WHERE question_bank_id = ?1",
            params![id],
        )?;
        let history_removed =
            tx.execute("DELETE FROM quiz_history WHERE bank_id = ?1", params![id])?;
        let banks_removed = tx.execute("DELETE FROM question_banks WHERE id = ?1", params![id])?;

        tx.commit()?;

        let summary = DeleteSummary {
            bank_removed: banks_removed > 0,
            questions_removed,
            history_removed,
        };
        if summary.bank_removed {
            info!(
                bank_id = id,
                questions = questions_removed,
                history = history_removed,
                "Deleted question bank"
            );
        }
        Ok(summary)
    }

    // Question operations
    pub fn add_question(&self, question: &NewQuestion) -> Result<i64> {
        insert_question(&self.conn, question)
    }

    pub fn get_question(&self, id: i64) -> Result<Option<Question>> {
        let sql = format!("SELECT {} FROM questions WHERE id = ?1", QUESTION_COLUMNS);
        match self.conn.query_row(&sql, params![id], question_from_row) {
            Ok(q) => Ok(Some(q)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // Stored order is insertion order
    pub fn list_questions(&self, bank_id: i64) -> Result<Vec<Question>> {
        let sql = format!(
            "SELECT {} FROM questions WHERE question_bank_id = ?1 ORDER BY id",
            QUESTION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![bank_id], question_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn list_all_questions(&self) -> Result<Vec<Question>> {
        let sql = format!("SELECT {} FROM questions ORDER BY id", QUESTION_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], question_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_question(&self, question: &Question) -> Result<()> {
        NewQuestion::from(question).validate()?;
        self.require_bank(question.question_bank_id)?;

        let rows = self.conn.execute(
            r#"
            UPDATE questions
            SET question_bank_id = ?1,
                text = ?2,
                options = ?3,
                correct_answer_index = ?4,
                explanation = ?5
            WHERE id = ?6
            "#,
            params![
                question.question_bank_id,
                question.text,
                encode_options(&question.options)?,
                question.correct_answer_index as i64,
                question.explanation,
                question.id
            ],
        )?;
        if rows == 0 {
            return Err(QuizError::not_found("question", question.id));
        }
        Ok(())
    }

    pub fn delete_question(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM questions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // History operations
    pub fn add_history(&self, entry: &QuizHistory) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO quiz_history (bank_id, bank_name, score, total_questions, percentage, date_completed)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                entry.bank_id,
                entry.bank_name,
                entry.score,
                entry.total_questions,
                entry.percentage,
                format_timestamp(&entry.date_completed)
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_history(&self) -> Result<Vec<QuizHistory>> {
        let sql = format!(
            "SELECT {} FROM quiz_history ORDER BY date_completed DESC, id DESC",
            HISTORY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], history_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn list_history_for_bank(&self, bank_id: i64) -> Result<Vec<QuizHistory>> {
        let sql = format!(
            "SELECT {} FROM quiz_history WHERE bank_id = ?1 ORDER BY date_completed DESC, id DESC",
            HISTORY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![bank_id], history_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // Full restore of banks and questions; ids are kept as given
    pub fn replace_all(&self, banks: &[QuestionBank], questions: &[Question]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM questions", [])?;
        tx.execute("DELETE FROM question_banks", [])?;

        for bank in banks {
            require_bank_name(&bank.name)?;
            tx.execute(
                "INSERT INTO question_banks (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    bank.id,
                    bank.name,
                    bank.description,
                    format_timestamp(&bank.created_at)
                ],
            )?;
        }

        for question in questions {
            NewQuestion::from(question).validate()?;
            require_bank_in(&tx, question.question_bank_id)?;
            tx.execute(
                r#"
                INSERT INTO questions (id, question_bank_id, text, options, correct_answer_index, explanation)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    question.id,
                    question.question_bank_id,
                    question.text,
                    encode_options(&question.options)?,
                    question.correct_answer_index as i64,
                    question.explanation
                ],
            )?;
        }

        tx.commit()?;
        debug!(banks = banks.len(), questions = questions.len(), "Replaced store content");
        Ok(())
    }

    fn require_bank(&self, bank_id: i64) -> Result<()> {
        require_bank_in(&self.conn, bank_id)
    }

    #[cfg(test)]
    pub(crate) fn conn_for_tests(&self) -> &Connection {
        &self.conn
    }
}

fn insert_bank(
    conn: &Connection,
    name: &str,
    description: &str,
    created_at: DateTime<Utc>,
) -> Result<i64> {
    require_bank_name(name)?;
    conn.execute(
        "INSERT INTO question_banks (name, description, created_at) VALUES (?1, ?2, ?3)",
        params![name, description, format_timestamp(&created_at)],
    )?;
    Ok(conn.last_insert_rowid())
}

fn require_bank_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(QuizError::invalid("bank name is required"));
    }
    Ok(())
}

fn insert_question(conn: &Connection, question: &NewQuestion) -> Result<i64> {
    question.validate()?;
    require_bank_in(conn, question.question_bank_id)?;

    conn.execute(
        r#"
        INSERT INTO questions (question_bank_id, text, options, correct_answer_index, explanation)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            question.question_bank_id,
            question.text,
            encode_options(&question.options)?,
            question.correct_answer_index as i64,
            question.explanation
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn require_bank_in(conn: &Connection, bank_id: i64) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM question_banks WHERE id = ?1)",
        params![bank_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(QuizError::not_found("question bank", bank_id))
    }
}

// Fixed-width UTC so that text order matches time order
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

fn encode_options(options: &[String; OPTIONS_PER_QUESTION]) -> Result<String> {
    serde_json::to_string(options).map_err(|e| QuizError::invalid(e.to_string()))
}

fn timestamp_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn bank_from_row(row: &Row) -> rusqlite::Result<QuestionBank> {
    Ok(QuestionBank {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
    })
}

fn question_from_row(row: &Row) -> rusqlite::Result<Question> {
    let options_json: String = row.get(3)?;
    let options: [String; OPTIONS_PER_QUESTION] = serde_json::from_str(&options_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    let correct: i64 = row.get(4)?;

    Ok(Question {
        id: row.get(0)?,
        question_bank_id: row.get(1)?,
        text: row.get(2)?,
        options,
        correct_answer_index: correct as usize,
        explanation: row.get(5)?,
    })
}

fn history_from_row(row: &Row) -> rusqlite::Result<QuizHistory> {
    Ok(QuizHistory {
        id: row.get(0)?,
        bank_id: row.get(1)?,
        bank_name: row.get(2)?,
        score: row.get(3)?,
        total_questions: row.get(4)?,
        percentage: row.get(5)?,
        date_completed: timestamp_column(row, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn setup_db() -> Database {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        db
    }

    fn new_question(bank_id: i64, text: &str, correct: usize) -> NewQuestion {
        NewQuestion {
            question_bank_id: bank_id,
            text: text.to_string(),
            options: [
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ],
            correct_answer_index: correct,
            explanation: None,
        }
    }

    fn history(bank_id: i64, name: &str, minutes: i64) -> QuizHistory {
        QuizHistory {
            id: None,
            bank_id,
            bank_name: name.to_string(),
            score: 1,
            total_questions: 2,
            percentage: 50,
            date_completed: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
                + chrono::Duration::minutes(minutes),
        }
    }

    mod init_tests {
        use super::*;

        #[test]
        fn init_creates_tables() {
            let db = setup_db();
            for table in ["question_banks", "questions", "quiz_history", "install_state"] {
                let count: i64 = db
                    .conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                        row.get(0)
                    })
                    .unwrap_or_else(|_| panic!("{} table should exist", table));
                assert_eq!(count, 0);
            }
        }

        #[test]
        fn init_sets_schema_version() {
            let db = setup_db();
            assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
        }

        #[test]
        fn init_is_idempotent() {
            let db = setup_db();
            db.add_bank("Test", "").unwrap();

            db.init().expect("Re-init should succeed");

            assert_eq!(db.list_banks().unwrap().len(), 1);
        }

        #[test]
        fn upgrade_from_version_one_keeps_rows() {
            let db = Database::open(":memory:").unwrap();
            db.conn
                .execute_batch(
                    r#"
                    CREATE TABLE install_state (key TEXT PRIMARY KEY, value TEXT NOT NULL);
                    CREATE TABLE question_banks (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        name TEXT NOT NULL UNIQUE,
                        description TEXT NOT NULL DEFAULT '',
                        created_at TEXT NOT NULL
                    );
                    CREATE TABLE questions (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        question_bank_id INTEGER NOT NULL,
                        text TEXT NOT NULL,
                        options TEXT NOT NULL,
                        correct_answer_index INTEGER NOT NULL,
                        explanation TEXT
                    );
                    INSERT INTO question_banks (name, description, created_at)
                        VALUES ('Old', '', '2023-01-01T00:00:00.000000000Z');
                    PRAGMA user_version = 1;
                    "#,
                )
                .unwrap();

            db.init().unwrap();

            assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
            assert_eq!(db.list_banks().unwrap()[0].name, "Old");
            assert!(db.list_history().unwrap().is_empty());
        }

        #[test]
        fn file_database_survives_reopen() {
            let path = std::env::temp_dir().join(format!(
                "quizbank-reopen-{}-{}.db",
                std::process::id(),
                Utc::now().timestamp_nanos_opt().unwrap_or_default()
            ));

            let db = Database::open(&path).unwrap();
            db.init().unwrap();
            let bank_id = db.add_bank("Persistent", "kept").unwrap();
            db.add_question(&new_question(bank_id, "Q1", 0)).unwrap();
            db.close().unwrap();

            let db = Database::open(&path).unwrap();
            db.init().unwrap();
            let bank = db.get_bank(bank_id).unwrap().unwrap();
            assert_eq!(bank.name, "Persistent");
            assert_eq!(db.list_questions(bank_id).unwrap().len(), 1);
            db.close().unwrap();

            std::fs::remove_file(&path).ok();
        }
    }

    mod install_state_tests {
        use super::*;

        #[test]
        fn defaults_to_not_seeded() {
            let db = setup_db();
            assert!(!db.install_state().unwrap().seeded);
        }

        #[test]
        fn save_and_reload() {
            let db = setup_db();
            db.save_install_state(&InstallState { seeded: true }).unwrap();
            assert!(db.install_state().unwrap().seeded);

            db.save_install_state(&InstallState { seeded: false }).unwrap();
            assert!(!db.install_state().unwrap().seeded);
        }
    }

    mod bank_tests {
        use super::*;

        #[test]
        fn add_bank_basic() {
            let db = setup_db();
            let id = db.add_bank("Geography", "Maps and capitals").unwrap();
            assert!(id > 0);

            let bank = db.get_bank(id).unwrap().unwrap();
            assert_eq!(bank.name, "Geography");
            assert_eq!(bank.description, "Maps and capitals");
        }

        #[test]
        fn add_bank_duplicate_name_is_constraint_violation() {
            let db = setup_db();
            db.add_bank("Unique Name", "").unwrap();
            let result = db.add_bank("Unique Name", "other");
            assert!(matches!(result, Err(QuizError::ConstraintViolation(_))));
        }

        #[test]
        fn add_bank_blank_name_fails() {
            let db = setup_db();
            assert!(matches!(
                db.add_bank("   ", ""),
                Err(QuizError::InvalidFormat(_))
            ));
        }

        #[test]
        fn get_bank_not_found() {
            let db = setup_db();
            assert!(db.get_bank(999).unwrap().is_none());
        }

        #[test]
        fn list_banks_empty() {
            let db = setup_db();
            assert!(db.list_banks().unwrap().is_empty());
            assert_eq!(db.count_banks().unwrap(), 0);
        }

        #[test]
        fn list_bank_summaries_counts_questions() {
            let db = setup_db();
            let a = db.add_bank("A", "").unwrap();
            let b = db.add_bank("B", "").unwrap();
            db.add_question(&new_question(a, "Q1", 0)).unwrap();
            db.add_question(&new_question(a, "Q2", 1)).unwrap();

            let summaries = db.list_bank_summaries().unwrap();
            assert_eq!(summaries.len(), 2);
            assert_eq!(summaries[0].bank.id, a);
            assert_eq!(summaries[0].question_count, 2);
            assert_eq!(summaries[1].bank.id, b);
            assert_eq!(summaries[1].question_count, 0);
        }

        #[test]
        fn update_bank_replaces_fields() {
            let db = setup_db();
            let id = db.add_bank("Old", "old desc").unwrap();
            let mut bank = db.get_bank(id).unwrap().unwrap();
            bank.name = "New".to_string();
            bank.description = "new desc".to_string();

            db.update_bank(&bank).unwrap();

            let stored = db.get_bank(id).unwrap().unwrap();
            assert_eq!(stored, bank);
        }

        #[test]
        fn update_bank_missing_is_not_found() {
            let db = setup_db();
            let bank = QuestionBank {
                id: 42,
                name: "Ghost".to_string(),
                description: String::new(),
                created_at: Utc::now(),
            };
            assert!(matches!(
                db.update_bank(&bank),
                Err(QuizError::NotFound { id: 42, .. })
            ));
        }

        #[test]
        fn update_bank_blank_name_fails() {
            let db = setup_db();
            let id = db.add_bank("Named", "").unwrap();
            let mut bank = db.get_bank(id).unwrap().unwrap();
            bank.name = "  ".to_string();
            assert!(matches!(
                db.update_bank(&bank),
                Err(QuizError::InvalidFormat(_))
            ));
            assert_eq!(db.get_bank(id).unwrap().unwrap().name, "Named");
        }

        #[test]
        fn update_bank_to_taken_name_fails() {
            let db = setup_db();
            db.add_bank("Taken", "").unwrap();
            let id = db.add_bank("Free", "").unwrap();
            let mut bank = db.get_bank(id).unwrap().unwrap();
            bank.name = "Taken".to_string();
            assert!(matches!(
                db.update_bank(&bank),
                Err(QuizError::ConstraintViolation(_))
            ));
        }

        #[test]
        fn add_bank_with_questions_is_atomic() {
            let db = setup_db();
            let bad = vec![new_question(0, "Good", 0), new_question(0, "", 0)];

            let result = db.add_bank_with_questions("Seed", "", &bad);
            assert!(result.is_err());
            assert_eq!(db.count_banks().unwrap(), 0);
            assert!(db.list_all_questions().unwrap().is_empty());
        }

        #[test]
        fn add_bank_with_questions_rebinds_bank_id() {
            let db = setup_db();
            let qs = vec![new_question(999, "Q1", 0), new_question(999, "Q2", 3)];
            let id = db.add_bank_with_questions("Seed", "", &qs).unwrap();

            let stored = db.list_questions(id).unwrap();
            assert_eq!(stored.len(), 2);
            assert!(stored.iter().all(|q| q.question_bank_id == id));
        }
    }

    mod delete_tests {
        use super::*;

        #[test]
        fn delete_bank_cascades_questions_and_history() {
            let db = setup_db();
            let id = db.add_bank("Doomed", "").unwrap();
            db.add_question(&new_question(id, "Q1", 0)).unwrap();
            db.add_question(&new_question(id, "Q2", 1)).unwrap();
            db.add_history(&history(id, "Doomed", 0)).unwrap();

            let summary = db.delete_bank(id).unwrap();

            assert_eq!(
                summary,
                DeleteSummary {
                    bank_removed: true,
                    questions_removed: 2,
                    history_removed: 1,
                }
            );
            assert!(db.get_bank(id).unwrap().is_none());
            assert!(db.list_questions(id).unwrap().is_empty());
            assert!(db.list_history_for_bank(id).unwrap().is_empty());
        }

        #[test]
        fn failed_delete_bank_leaves_cascade_undone() {
            let db = setup_db();
            let id = db.add_bank("Kept", "").unwrap();
            db.add_question(&new_question(id, "Q1", 0)).unwrap();
            db.add_history(&history(id, "Kept", 0)).unwrap();
            // questions and history go first, then the bank row fails
            db.conn
                .execute_batch(
                    "CREATE TRIGGER block_bank_delete BEFORE DELETE ON question_banks
                     BEGIN SELECT RAISE(ABORT, 'locked'); END;",
                )
                .unwrap();

            assert!(db.delete_bank(id).is_err());

            assert!(db.get_bank(id).unwrap().is_some());
            assert_eq!(db.list_questions(id).unwrap().len(), 1);
            assert_eq!(db.list_history_for_bank(id).unwrap().len(), 1);
        }

        #[test]
        fn delete_bank_leaves_other_banks_untouched() {
            let db = setup_db();
            let b1 = db.add_bank("B1", "").unwrap();
            let b2 = db.add_bank("B2", "").unwrap();
            db.add_question(&new_question(b1, "B1 Q", 0)).unwrap();
            let kept_q = db.add_question(&new_question(b2, "B2 Q", 2)).unwrap();
            db.add_history(&history(b1, "B1", 0)).unwrap();
            db.add_history(&history(b2, "B2", 1)).unwrap();

            db.delete_bank(b1).unwrap();

            let b2_questions = db.list_questions(b2).unwrap();
            assert_eq!(b2_questions.len(), 1);
            assert_eq!(b2_questions[0].id, kept_q);
            let b2_history = db.list_history_for_bank(b2).unwrap();
            assert_eq!(b2_history.len(), 1);
            assert_eq!(b2_history[0].bank_name, "B2");
        }

        #[test]
        fn delete_bank_is_idempotent() {
            let db = setup_db();
            let id = db.add_bank("Once", "").unwrap();
            assert!(db.delete_bank(id).unwrap().bank_removed);

            let again = db.delete_bank(id).unwrap();
            assert_eq!(again, DeleteSummary::default());
        }

        #[test]
        fn uncommitted_transaction_rolls_back() {
            let db = setup_db();
            let id = db.add_bank("Safe", "").unwrap();
            db.add_question(&new_question(id, "Q", 0)).unwrap();

            {
                let tx = db.conn.unchecked_transaction().unwrap();
                tx.execute("DELETE FROM questions WHERE question_bank_id = ?1", params![id])
                    .unwrap();
                // dropped without commit
            }

            assert_eq!(db.list_questions(id).unwrap().len(), 1);
        }
    }

    mod question_tests {
        use super::*;

        #[test]
        fn add_question_roundtrips_fields() {
            let db = setup_db();
            let bank = db.add_bank("Bank", "").unwrap();
            let mut nq = new_question(bank, "What is <b>2+2</b>?", 3);
            nq.explanation = Some("Arithmetic".to_string());

            let id = db.add_question(&nq).unwrap();
            let q = db.get_question(id).unwrap().unwrap();

            assert_eq!(q.question_bank_id, bank);
            assert_eq!(q.text, "What is <b>2+2</b>?");
            assert_eq!(q.options[3], "D");
            assert_eq!(q.correct_answer_index, 3);
            assert_eq!(q.explanation.as_deref(), Some("Arithmetic"));
        }

        #[test]
        fn add_question_missing_bank_is_not_found() {
            let db = setup_db();
            let result = db.add_question(&new_question(77, "Orphan", 0));
            assert!(matches!(result, Err(QuizError::NotFound { id: 77, .. })));
        }

        #[test]
        fn add_question_invalid_content_fails() {
            let db = setup_db();
            let bank = db.add_bank("Bank", "").unwrap();
            let mut nq = new_question(bank, "Q", 0);
            nq.options[2] = " ".to_string();
            assert!(matches!(
                db.add_question(&nq),
                Err(QuizError::InvalidFormat(_))
            ));
        }

        #[test]
        fn list_questions_filters_by_bank_in_stored_order() {
            let db = setup_db();
            let a = db.add_bank("A", "").unwrap();
            let b = db.add_bank("B", "").unwrap();
            db.add_question(&new_question(a, "A1", 0)).unwrap();
            db.add_question(&new_question(b, "B1", 0)).unwrap();
            db.add_question(&new_question(a, "A2", 0)).unwrap();

            let texts: Vec<String> = db
                .list_questions(a)
                .unwrap()
                .into_iter()
                .map(|q| q.text)
                .collect();
            assert_eq!(texts, vec!["A1", "A2"]);
            assert!(db.list_questions(999).unwrap().is_empty());
        }

        #[test]
        fn update_question_replaces_record() {
            let db = setup_db();
            let bank = db.add_bank("Bank", "").unwrap();
            let id = db.add_question(&new_question(bank, "Before", 0)).unwrap();

            let mut q = db.get_question(id).unwrap().unwrap();
            q.text = "After".to_string();
            q.correct_answer_index = 2;
            db.update_question(&q).unwrap();

            assert_eq!(db.get_question(id).unwrap().unwrap(), q);
        }

        #[test]
        fn update_question_missing_is_not_found() {
            let db = setup_db();
            let bank = db.add_bank("Bank", "").unwrap();
            let q = Question {
                id: 500,
                question_bank_id: bank,
                text: "Ghost".to_string(),
                options: new_question(bank, "x", 0).options,
                correct_answer_index: 0,
                explanation: None,
            };
            assert!(matches!(
                db.update_question(&q),
                Err(QuizError::NotFound { id: 500, .. })
            ));
        }

        #[test]
        fn delete_question_is_idempotent() {
            let db = setup_db();
            let bank = db.add_bank("Bank", "").unwrap();
            let id = db.add_question(&new_question(bank, "Q", 0)).unwrap();

            assert!(db.delete_question(id).unwrap());
            assert!(!db.delete_question(id).unwrap());
            assert!(db.get_question(id).unwrap().is_none());
        }
    }

    mod history_tests {
        use super::*;

        #[test]
        fn add_history_assigns_id() {
            let db = setup_db();
            let id = db.add_history(&history(1, "Bank", 0)).unwrap();
            assert!(id > 0);
            assert_eq!(db.list_history().unwrap()[0].id, Some(id));
        }

        #[test]
        fn list_history_most_recent_first() {
            let db = setup_db();
            db.add_history(&history(1, "Middle", 10)).unwrap();
            db.add_history(&history(1, "Oldest", 0)).unwrap();
            db.add_history(&history(1, "Newest", 20)).unwrap();

            let names: Vec<String> = db
                .list_history()
                .unwrap()
                .into_iter()
                .map(|h| h.bank_name)
                .collect();
            assert_eq!(names, vec!["Newest", "Middle", "Oldest"]);
        }

        #[test]
        fn history_timestamps_roundtrip_exactly() {
            let db = setup_db();
            let mut entry = history(1, "Precise", 0);
            entry.date_completed = entry.date_completed + chrono::Duration::nanoseconds(123_456_789);
            db.add_history(&entry).unwrap();

            let stored = &db.list_history().unwrap()[0];
            assert_eq!(stored.date_completed, entry.date_completed);
        }
    }

    mod replace_all_tests {
        use super::*;

        fn bank(id: i64, name: &str) -> QuestionBank {
            QuestionBank {
                id,
                name: name.to_string(),
                description: format!("{} description", name),
                created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            }
        }

        fn question(id: i64, bank_id: i64) -> Question {
            Question {
                id,
                question_bank_id: bank_id,
                text: format!("Question {}", id),
                options: new_question(bank_id, "x", 0).options,
                correct_answer_index: 1,
                explanation: Some("because".to_string()),
            }
        }

        #[test]
        fn replaces_existing_content_and_keeps_ids() {
            let db = setup_db();
            let old = db.add_bank("Old", "").unwrap();
            db.add_question(&new_question(old, "Old Q", 0)).unwrap();
            db.replace_all(&[bank(10, "Ten")], &[question(100, 10)])
                .unwrap();

            let banks = db.list_banks().unwrap();
            assert_eq!(banks, vec![bank(10, "Ten")]);
            assert_eq!(db.list_all_questions().unwrap(), vec![question(100, 10)]);
        }

        #[test]
        fn keeps_history() {
            let db = setup_db();
            db.add_history(&history(1, "Old", 0)).unwrap();
            db.replace_all(&[bank(1, "New")], &[]).unwrap();
            assert_eq!(db.list_history().unwrap().len(), 1);
        }

        #[test]
        fn failure_leaves_store_unchanged() {
            let db = setup_db();
            let existing = db.add_bank("Existing", "").unwrap();
            db.add_question(&new_question(existing, "Keep me", 0))
                .unwrap();

            // second bank duplicates the first bank's name
            let result = db.replace_all(&[bank(1, "Dup"), bank(2, "Dup")], &[]);
            assert!(matches!(result, Err(QuizError::ConstraintViolation(_))));

            assert_eq!(db.list_banks().unwrap().len(), 1);
            assert_eq!(db.list_banks().unwrap()[0].name, "Existing");
            assert_eq!(db.list_questions(existing).unwrap().len(), 1);
        }

        #[test]
        fn blank_bank_name_rolls_back() {
            let db = setup_db();
            db.add_bank("Existing", "").unwrap();

            let result = db.replace_all(&[bank(1, "One"), bank(2, " ")], &[]);
            assert!(matches!(result, Err(QuizError::InvalidFormat(_))));
            assert_eq!(db.list_banks().unwrap().len(), 1);
            assert_eq!(db.list_banks().unwrap()[0].name, "Existing");
        }

        #[test]
        fn dangling_question_rolls_back() {
            let db = setup_db();
            db.add_bank("Existing", "").unwrap();

            let result = db.replace_all(&[bank(1, "One")], &[question(5, 2)]);
            assert!(matches!(result, Err(QuizError::NotFound { .. })));
            assert_eq!(db.list_banks().unwrap()[0].name, "Existing");
        }

        #[test]
        fn new_inserts_continue_after_imported_ids() {
            let db = setup_db();
            db.replace_all(&[bank(40, "Forty")], &[]).unwrap();
            let id = db.add_bank("Next", "").unwrap();
            assert!(id > 40);
        }
    }
}
