use tracing::{error, info};

use crate::db::Database;
use crate::error::Result;
use crate::models::{InstallState, NewQuestion};

pub const FIXTURE_BANK_NAME: &str = "General Knowledge";
const FIXTURE_BANK_DESCRIPTION: &str = "A starter set of trivia questions to try the quiz out.";

// (text, options, correct index, explanation)
const FIXTURE_QUESTIONS: &[(&str, [&str; 4], usize, &str)] = &[
    (
        "What is the capital city of <b>Australia</b>?",
        ["Sydney", "Melbourne", "Canberra", "Perth"],
        2,
        "Canberra was purpose-built as a compromise between Sydney and Melbourne.",
    ),
    (
        "Which planet is known as the <i>Red Planet</i>?",
        ["Venus", "Mars", "Jupiter", "Mercury"],
        1,
        "Iron oxide on its surface gives Mars its reddish appearance.",
    ),
    (
        "What is the chemical symbol for gold?",
        ["Go", "Gd", "Ag", "Au"],
        3,
        "Au comes from the Latin word <i>aurum</i>.",
    ),
    (
        "How many continents are there on Earth?",
        ["5", "6", "7", "8"],
        2,
        "Africa, Antarctica, Asia, Australia, Europe, North America and South America.",
    ),
    (
        "Which language prints with <code>println!</code>?",
        ["Python", "Rust", "Go", "Java"],
        1,
        "<code>println!</code> is a macro from the Rust standard library.",
    ),
    (
        "What is the largest ocean on Earth?",
        ["Atlantic", "Indian", "Arctic", "Pacific"],
        3,
        "The Pacific covers roughly a third of the planet's surface.",
    ),
    (
        "Who painted the <b>Mona Lisa</b>?",
        ["Leonardo da Vinci", "Michelangelo", "Raphael", "Donatello"],
        0,
        "Leonardo worked on it from about 1503 into the 1510s.",
    ),
    (
        "What is the boiling point of water at sea level in Celsius?",
        ["90", "100", "110", "120"],
        1,
        "At one standard atmosphere water boils at 100 degrees Celsius.",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    AlreadySeeded,
    ExistingData,
    Seeded { bank_id: i64, questions: usize },
    Failed { reason: String },
}

pub fn fixture_questions() -> Vec<NewQuestion> {
    FIXTURE_QUESTIONS
        .iter()
        .map(|(text, options, correct, explanation)| NewQuestion {
            question_bank_id: 0,
            text: text.to_string(),
            options: options.map(str::to_string),
            correct_answer_index: *correct,
            explanation: Some(explanation.to_string()),
        })
        .collect()
}

/// Populates an empty store with the built-in bank, at most once per installation.
///
/// Safe to call on every startup. Failures are logged and reported in the outcome,
/// never returned as errors, and leave the seed flag unset so the next start retries.
pub fn ensure_seeded(db: &Database) -> SeedOutcome {
    match try_seed(db) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Database seeding failed");
            SeedOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

fn try_seed(db: &Database) -> Result<SeedOutcome> {
    if db.install_state()?.seeded {
        return Ok(SeedOutcome::AlreadySeeded);
    }

    // Data already present (e.g. restored from an export) counts as seeded
    if db.count_banks()? > 0 {
        db.save_install_state(&InstallState { seeded: true })?;
        return Ok(SeedOutcome::ExistingData);
    }

    info!("Performing initial database seed");
    let questions = fixture_questions();
    let bank_id =
        db.add_bank_with_questions(FIXTURE_BANK_NAME, FIXTURE_BANK_DESCRIPTION, &questions)?;
    db.save_install_state(&InstallState { seeded: true })?;
    info!(bank_id, questions = questions.len(), "Database seeded");

    Ok(SeedOutcome::Seeded {
        bank_id,
        questions: questions.len(),
    })
}
