mod assist;
mod config;
mod confirm;
mod csv_import;
mod db;
mod error;
mod history;
mod markup;
mod models;
mod seed;
mod session;
mod telemetry;
mod transfer;
mod tui;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use config::AppConfig;
use confirm::PendingConfirmation;
use db::Database;
use error::QuizError;
use models::{JsonOutput, NewQuestion, OPTIONS_PER_QUESTION};
use session::SessionConfig;
use telemetry::LogTarget;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "quizbank")]
#[command(about = "Author question banks and take randomized multiple-choice quizzes")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database and seed the starter bank
    Init,

    /// Manage question banks
    #[command(subcommand)]
    Bank(BankCommands),

    /// Manage questions
    #[command(subcommand)]
    Question(QuestionCommands),

    /// Export all banks and questions to JSON
    Export {
        /// Output file (default: quiz-data-export-all.json)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace all banks and questions with the content of a JSON export
    Import {
        /// JSON file produced by `export`
        file: PathBuf,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Show completed quiz history, most recent first
    History {
        /// Only show results for this bank
        #[arg(long, short)]
        bank: Option<i64>,
    },

    /// Take a quiz in the terminal UI
    Quiz {
        /// Bank ID
        bank: i64,

        /// Number of questions (default: configured count, capped at bank size)
        #[arg(long, short = 'n')]
        count: Option<usize>,

        /// Keep stored question order
        #[arg(long)]
        no_shuffle_questions: bool,

        /// Keep stored option order
        #[arg(long)]
        no_shuffle_options: bool,
    },

    /// Launch interactive terminal UI
    Tui,
}

#[derive(Subcommand)]
enum BankCommands {
    /// List all banks
    List,

    /// Add a new bank
    Add {
        /// Bank name (must be unique)
        name: String,

        /// Bank description
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Show bank details
    Show {
        /// Bank ID
        id: i64,
    },

    /// Rename or redescribe a bank
    Edit {
        /// Bank ID
        id: i64,

        #[arg(long, short)]
        name: Option<String>,

        #[arg(long, short)]
        description: Option<String>,
    },

    /// Delete a bank with its questions and history
    Delete {
        /// Bank ID
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Export one bank to JSON
    Export {
        /// Bank ID
        id: i64,

        /// Output file (default: <bank-name>-export.json)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum QuestionCommands {
    /// List the questions of a bank
    List {
        /// Bank ID
        bank: i64,

        /// Print each question as a sanitized HTML fragment
        #[arg(long)]
        html: bool,
    },

    /// Add a question to a bank
    Add {
        /// Bank ID
        bank: i64,

        /// Question text (<b>, <i>, <code> allowed)
        text: String,

        /// The four answer options
        #[arg(long, num_args = OPTIONS_PER_QUESTION, required = true, value_names = ["A", "B", "C", "D"])]
        options: Vec<String>,

        /// Index of the correct option (0-3)
        #[arg(long, short)]
        correct: usize,

        #[arg(long, short)]
        explanation: Option<String>,
    },

    /// Edit a question
    Edit {
        /// Question ID
        id: i64,

        #[arg(long, short)]
        text: Option<String>,

        #[arg(long, num_args = OPTIONS_PER_QUESTION, value_names = ["A", "B", "C", "D"])]
        options: Option<Vec<String>>,

        #[arg(long, short)]
        correct: Option<usize>,

        #[arg(long, short)]
        explanation: Option<String>,
    },

    /// Delete a question
    Delete {
        /// Question ID
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Bulk-add questions from CSV: text,opt1,opt2,opt3,opt4,correct_index[,explanation]
    Import {
        /// Bank ID
        bank: i64,

        /// CSV file
        file: PathBuf,
    },

    /// Generate questions about a topic with the AI proxy
    Generate {
        /// Bank ID
        bank: i64,

        /// Topic to write questions about
        topic: String,

        /// Number of questions (1-15)
        #[arg(long, short = 'n', default_value_t = 5)]
        count: usize,
    },

    /// Ask the AI proxy why the correct answer is right
    Explain {
        /// Question ID
        id: i64,

        /// Store the explanation on the question
        #[arg(long, short)]
        save: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            if let Ok(out) = serde_json::to_string(&JsonOutput::<()>::err(e.to_string())) {
                println!("{}", out);
            }
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = AppConfig::load()?;

    let interactive = matches!(cli.command, Commands::Tui | Commands::Quiz { .. });
    if interactive {
        telemetry::init_tracing(LogTarget::File(&config::log_file_path()))?;
    } else {
        telemetry::init_tracing(LogTarget::Stderr)?;
    }

    let db_path = config.db_path();
    config::ensure_parent_dir(&db_path)?;
    let db = Database::open(&db_path)?;
    db.init()?;
    let seeded = seed::ensure_seeded(&db);

    match cli.command {
        Commands::Init => {
            if cli.json {
                print_json(serde_json::json!({
                    "path": db_path,
                    "schema_version": db.schema_version()?,
                    "seed": format!("{:?}", seeded),
                }))?;
            } else {
                println!("Database initialized at: {}", db_path.display());
                match seeded {
                    seed::SeedOutcome::Seeded { questions, .. } => println!(
                        "Added starter bank '{}' with {} questions.",
                        seed::FIXTURE_BANK_NAME,
                        questions
                    ),
                    seed::SeedOutcome::Failed { reason } => {
                        println!("Starter bank could not be added: {}", reason)
                    }
                    _ => {}
                }
            }
        }

        Commands::Bank(bank_cmd) => run_bank(&db, bank_cmd, cli.json)?,

        Commands::Question(question_cmd) => run_question(&db, &config, question_cmd, cli.json)?,

        Commands::Export { output } => {
            let doc = transfer::export_all(&db)?;
            let path = output.unwrap_or_else(|| PathBuf::from(transfer::EXPORT_ALL_FILENAME));
            std::fs::write(&path, transfer::to_json_pretty(&doc)?)?;

            if cli.json {
                print_json(serde_json::json!({
                    "path": path,
                    "banks": doc.question_banks.len(),
                    "questions": doc.questions.len(),
                }))?;
            } else {
                println!(
                    "Exported {} banks and {} questions to {}",
                    doc.question_banks.len(),
                    doc.questions.len(),
                    path.display()
                );
            }
        }

        Commands::Import { file, yes } => {
            let text = std::fs::read_to_string(&file)?;
            let pending = confirm::request_import(&text)?;
            confirm_and_report(&db, pending, yes, cli.json)?;
        }

        Commands::History { bank } => {
            let entries = match bank {
                Some(id) => history::list_for_bank(&db, id)?,
                None => history::list(&db)?,
            };

            if cli.json {
                print_json(&entries)?;
            } else if entries.is_empty() {
                println!("No quizzes taken yet.");
            } else {
                println!(
                    "{:<18} {:<30} {:>7} {:>5}  GRADE",
                    "DATE", "BANK", "SCORE", "%"
                );
                println!("{}", "-".repeat(72));
                for entry in &entries {
                    println!(
                        "{:<18} {:<30} {:>7} {:>4}%  {}",
                        entry.date_completed.format("%Y-%m-%d %H:%M"),
                        truncate(&entry.bank_name, 28),
                        format!("{}/{}", entry.score, entry.total_questions),
                        entry.percentage,
                        entry.grade().as_str()
                    );
                }
                let stats = history::stats(&entries);
                println!();
                println!(
                    "{} quizzes, average {:.0}%, best {}%",
                    stats.attempts, stats.average_percentage, stats.best_percentage
                );
            }
        }

        Commands::Quiz {
            bank,
            count,
            no_shuffle_questions,
            no_shuffle_options,
        } => {
            let available = db.list_questions(bank)?.len();
            if db.get_bank(bank)?.is_none() || available == 0 {
                return Err(QuizError::EmptyBank(bank).into());
            }

            let mut session_config = SessionConfig::for_bank(config.quiz, available);
            if let Some(n) = count {
                session_config.question_count = n;
            }
            session_config.question_count = session_config.effective_count(available);
            session_config.shuffle_questions &= !no_shuffle_questions;
            session_config.shuffle_options &= !no_shuffle_options;

            let options = tui::TuiOptions {
                generator: assist::generator_from_config(&config.ai),
                defaults: config.quiz,
            };
            let db = tui::run(
                db,
                options,
                tui::Launch::Quiz {
                    bank_id: bank,
                    config: session_config,
                },
            )?;
            db.close()?;
            return Ok(());
        }

        Commands::Tui => {
            let options = tui::TuiOptions {
                generator: assist::generator_from_config(&config.ai),
                defaults: config.quiz,
            };
            let db = tui::run(db, options, tui::Launch::Browse)?;
            db.close()?;
            return Ok(());
        }
    }

    db.close()?;
    Ok(())
}

fn run_bank(db: &Database, cmd: BankCommands, json: bool) -> CliResult<()> {
    match cmd {
        BankCommands::List => {
            let banks = db.list_bank_summaries()?;
            if json {
                print_json(&banks)?;
            } else if banks.is_empty() {
                println!("No question banks found.");
            } else {
                println!("{:<5} {:<40} QUESTIONS", "ID", "NAME");
                println!("{}", "-".repeat(60));
                for s in banks {
                    println!(
                        "{:<5} {:<40} {}",
                        s.bank.id,
                        truncate(&s.bank.name, 38),
                        s.question_count
                    );
                }
            }
        }

        BankCommands::Add { name, description } => {
            let id = db.add_bank(&name, description.as_deref().unwrap_or(""))?;
            if json {
                print_json(serde_json::json!({ "id": id, "name": name }))?;
            } else {
                println!("Added bank '{}' with ID: {}", name, id);
            }
        }

        BankCommands::Show { id } => {
            let bank = db
                .get_bank(id)?
                .ok_or_else(|| QuizError::not_found("question bank", id))?;
            let questions = db.list_questions(id)?;
            let stats = history::stats(&history::list_for_bank(db, id)?);

            if json {
                print_json(serde_json::json!({
                    "bank": bank,
                    "question_count": questions.len(),
                    "history": stats,
                }))?;
            } else {
                println!("Bank: {}", bank.name);
                println!("ID: {}", bank.id);
                if !bank.description.is_empty() {
                    println!("Description: {}", bank.description);
                }
                println!("Created: {}", bank.created_at.format("%Y-%m-%d %H:%M"));
                println!("Questions: {}", questions.len());
                if stats.attempts > 0 {
                    println!();
                    println!("--- History ---");
                    println!(
                        "Quizzes: {} (average {:.0}%, best {}%)",
                        stats.attempts, stats.average_percentage, stats.best_percentage
                    );
                }
            }
        }

        BankCommands::Edit {
            id,
            name,
            description,
        } => {
            let mut bank = db
                .get_bank(id)?
                .ok_or_else(|| QuizError::not_found("question bank", id))?;
            if let Some(name) = name {
                bank.name = name;
            }
            if let Some(description) = description {
                bank.description = description;
            }
            db.update_bank(&bank)?;

            if json {
                print_json(&bank)?;
            } else {
                println!("Updated bank {}.", id);
            }
        }

        BankCommands::Delete { id, yes } => {
            let pending = confirm::request_delete_bank(db, id)?;
            confirm_and_report(db, pending, yes, json)?;
        }

        BankCommands::Export { id, output } => {
            let doc = transfer::export_bank(db, id)?
                .ok_or_else(|| QuizError::not_found("question bank", id))?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(transfer::bank_export_filename(&doc.question_banks[0].name))
            });
            std::fs::write(&path, transfer::to_json_pretty(&doc)?)?;

            if json {
                print_json(serde_json::json!({
                    "path": path,
                    "questions": doc.questions.len(),
                }))?;
            } else {
                println!(
                    "Exported {} questions to {}",
                    doc.questions.len(),
                    path.display()
                );
            }
        }
    }
    Ok(())
}

fn run_question(
    db: &Database,
    config: &AppConfig,
    cmd: QuestionCommands,
    json: bool,
) -> CliResult<()> {
    match cmd {
        QuestionCommands::List { bank, html } => {
            if db.get_bank(bank)?.is_none() {
                return Err(QuizError::not_found("question bank", bank).into());
            }
            let questions = db.list_questions(bank)?;
            if json {
                print_json(&questions)?;
            } else if questions.is_empty() {
                println!("No questions in this bank.");
            } else if html {
                for q in &questions {
                    println!("{}", question_html(q));
                }
            } else {
                println!("{:<5} {:<50} ANSWER", "ID", "QUESTION");
                println!("{}", "-".repeat(80));
                for q in questions {
                    println!(
                        "{:<5} {:<50} {}",
                        q.id,
                        truncate(&markup::plain(&q.text), 48),
                        truncate(&markup::plain(q.correct_option()), 24)
                    );
                }
            }
        }

        QuestionCommands::Add {
            bank,
            text,
            options,
            correct,
            explanation,
        } => {
            let question = NewQuestion {
                question_bank_id: bank,
                text,
                options: four_options(options)?,
                correct_answer_index: correct,
                explanation,
            };
            let id = db.add_question(&question)?;

            if json {
                print_json(serde_json::json!({ "id": id, "bank": bank }))?;
            } else {
                println!("Added question {} to bank {}.", id, bank);
            }
        }

        QuestionCommands::Edit {
            id,
            text,
            options,
            correct,
            explanation,
        } => {
            let mut question = db
                .get_question(id)?
                .ok_or_else(|| QuizError::not_found("question", id))?;
            if let Some(text) = text {
                question.text = text;
            }
            if let Some(options) = options {
                question.options = four_options(options)?;
            }
            if let Some(correct) = correct {
                question.correct_answer_index = correct;
            }
            if let Some(explanation) = explanation {
                question.explanation = Some(explanation).filter(|e| !e.trim().is_empty());
            }
            db.update_question(&question)?;

            if json {
                print_json(&question)?;
            } else {
                println!("Updated question {}.", id);
            }
        }

        QuestionCommands::Delete { id, yes } => {
            let pending = confirm::request_delete_question(db, id)?;
            confirm_and_report(db, pending, yes, json)?;
        }

        QuestionCommands::Import { bank, file } => {
            let text = std::fs::read_to_string(&file)?;
            let summary = csv_import::import_csv(db, bank, &text)?;

            if json {
                print_json(&summary)?;
            } else {
                println!("{}", summary.message());
                if !summary.is_complete() {
                    println!("{} rows failed:", summary.failures.len());
                    for failure in &summary.failures {
                        println!("  Row {}: {}", failure.row, failure.reason);
                    }
                }
            }
        }

        QuestionCommands::Generate { bank, topic, count } => {
            if db.get_bank(bank)?.is_none() {
                return Err(QuizError::not_found("question bank", bank).into());
            }
            let generator = assist::generator_from_config(&config.ai);
            let batch = assist::generate_questions(generator.as_ref(), bank, &topic, count)?;
            let summary = assist::add_generated(db, &batch);

            if json {
                print_json(&summary)?;
            } else {
                println!(
                    "{} questions generated and added to bank {}.",
                    summary.added, bank
                );
                for failure in &summary.failures {
                    println!("  Skipped {}", failure);
                }
            }
        }

        QuestionCommands::Explain { id, save } => {
            let mut question = db
                .get_question(id)?
                .ok_or_else(|| QuizError::not_found("question", id))?;
            let generator = assist::generator_from_config(&config.ai);
            let explanation = assist::explain(generator.as_ref(), &NewQuestion::from(&question));

            if save {
                if let Some(text) = &explanation {
                    question.explanation = Some(text.clone());
                    db.update_question(&question)?;
                }
            }

            if json {
                print_json(serde_json::json!({
                    "id": id,
                    "explanation": explanation,
                    "saved": save && explanation.is_some(),
                }))?;
            } else {
                match explanation {
                    Some(text) => println!("{}", text),
                    None => println!("No explanation available right now."),
                }
            }
        }
    }
    Ok(())
}

fn confirm_and_report(
    db: &Database,
    pending: PendingConfirmation,
    yes: bool,
    json: bool,
) -> CliResult<()> {
    if !yes {
        if json {
            return Err("confirmation required: pass --yes".into());
        }
        if !prompt_yes_no(pending.title(), pending.message())? {
            pending.cancel();
            println!("Cancelled.");
            return Ok(());
        }
    }

    let done = pending.confirm(db)?;
    if json {
        print_json(&done)?;
    } else {
        println!("{}.", done.describe());
    }
    Ok(())
}

fn prompt_yes_no(title: &str, message: &str) -> CliResult<bool> {
    println!("{}", title);
    print!("{} [y/N] ", message);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// Stored markup goes through RichText, so only the allowed inline tags survive
fn question_html(q: &models::Question) -> String {
    let rich = |text: &str| markup::RichText::parse(text).to_safe_html();
    let mut out = format!("<div class=\"question\" data-id=\"{}\">\n", q.id);
    out.push_str(&format!("  <p>{}</p>\n  <ol>\n", rich(&q.text)));
    for (i, option) in q.options.iter().enumerate() {
        let class = if i == q.correct_answer_index {
            " class=\"correct\""
        } else {
            ""
        };
        out.push_str(&format!("    <li{}>{}</li>\n", class, rich(option)));
    }
    out.push_str("  </ol>\n");
    if let Some(explanation) = &q.explanation {
        out.push_str(&format!("  <p class=\"explanation\">{}</p>\n", rich(explanation)));
    }
    out.push_str("</div>");
    out
}

fn four_options(options: Vec<String>) -> Result<[String; OPTIONS_PER_QUESTION], QuizError> {
    options.try_into().map_err(|v: Vec<String>| {
        QuizError::invalid(format!(
            "expected {} options, got {}",
            OPTIONS_PER_QUESTION,
            v.len()
        ))
    })
}

fn print_json<T: Serialize>(data: T) -> CliResult<()> {
    println!("{}", serde_json::to_string(&JsonOutput::ok(data))?);
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod truncate_tests {
        use super::*;

        #[test]
        fn truncate_short_string() {
            assert_eq!(truncate("hello", 10), "hello");
        }

        #[test]
        fn truncate_exact_length() {
            assert_eq!(truncate("hello", 5), "hello");
        }

        #[test]
        fn truncate_long_string() {
            assert_eq!(truncate("hello world", 8), "hello...");
        }

        #[test]
        fn truncate_multibyte() {
            assert_eq!(truncate("ñandú ñandú", 6), "ñan...");
        }
    }

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn parse_init_command() {
            let cli = Cli::try_parse_from(["quizbank", "init"]).unwrap();
            assert!(!cli.json);
            assert!(matches!(cli.command, Commands::Init));
        }

        #[test]
        fn parse_json_flag_global() {
            let cli = Cli::try_parse_from(["quizbank", "bank", "list", "--json"]).unwrap();
            assert!(cli.json);
            assert!(matches!(cli.command, Commands::Bank(BankCommands::List)));
        }

        #[test]
        fn parse_bank_add_with_description() {
            let cli =
                Cli::try_parse_from(["quizbank", "bank", "add", "Geography", "-d", "Maps"]).unwrap();
            match cli.command {
                Commands::Bank(BankCommands::Add { name, description }) => {
                    assert_eq!(name, "Geography");
                    assert_eq!(description.as_deref(), Some("Maps"));
                }
                _ => panic!("Expected Bank Add command"),
            }
        }

        #[test]
        fn parse_bank_delete_yes() {
            let cli = Cli::try_parse_from(["quizbank", "bank", "delete", "3", "--yes"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Bank(BankCommands::Delete { id: 3, yes: true })
            ));
        }

        #[test]
        fn parse_question_add() {
            let cli = Cli::try_parse_from([
                "quizbank", "question", "add", "1", "Capital of France?", "--options", "Paris",
                "Rome", "Berlin", "Madrid", "--correct", "0",
            ])
            .unwrap();
            match cli.command {
                Commands::Question(QuestionCommands::Add {
                    bank,
                    text,
                    options,
                    correct,
                    explanation,
                }) => {
                    assert_eq!(bank, 1);
                    assert_eq!(text, "Capital of France?");
                    assert_eq!(options, vec!["Paris", "Rome", "Berlin", "Madrid"]);
                    assert_eq!(correct, 0);
                    assert!(explanation.is_none());
                }
                _ => panic!("Expected Question Add command"),
            }
        }

        #[test]
        fn parse_question_add_requires_four_options() {
            let result = Cli::try_parse_from([
                "quizbank", "question", "add", "1", "Q", "--options", "a", "b", "c", "--correct",
                "0",
            ]);
            assert!(result.is_err());
        }

        #[test]
        fn parse_question_generate_default_count() {
            let cli =
                Cli::try_parse_from(["quizbank", "question", "generate", "2", "Rust"]).unwrap();
            match cli.command {
                Commands::Question(QuestionCommands::Generate { bank, topic, count }) => {
                    assert_eq!(bank, 2);
                    assert_eq!(topic, "Rust");
                    assert_eq!(count, 5);
                }
                _ => panic!("Expected Question Generate command"),
            }
        }

        #[test]
        fn parse_quiz_flags() {
            let cli = Cli::try_parse_from([
                "quizbank",
                "quiz",
                "4",
                "-n",
                "3",
                "--no-shuffle-options",
            ])
            .unwrap();
            match cli.command {
                Commands::Quiz {
                    bank,
                    count,
                    no_shuffle_questions,
                    no_shuffle_options,
                } => {
                    assert_eq!(bank, 4);
                    assert_eq!(count, Some(3));
                    assert!(!no_shuffle_questions);
                    assert!(no_shuffle_options);
                }
                _ => panic!("Expected Quiz command"),
            }
        }

        #[test]
        fn parse_history_with_bank() {
            let cli = Cli::try_parse_from(["quizbank", "history", "--bank", "2"]).unwrap();
            assert!(matches!(cli.command, Commands::History { bank: Some(2) }));
        }

        #[test]
        fn parse_import_requires_file() {
            assert!(Cli::try_parse_from(["quizbank", "import"]).is_err());
        }

        #[test]
        fn parse_invalid_command_fails() {
            assert!(Cli::try_parse_from(["quizbank", "invalid"]).is_err());
        }
    }

    mod helper_tests {
        use super::*;

        #[test]
        fn is_yes_accepts_variants() {
            assert!(is_yes("y\n"));
            assert!(is_yes(" YES "));
            assert!(!is_yes(""));
            assert!(!is_yes("no"));
        }

        #[test]
        fn question_html_escapes_unknown_tags() {
            let q = models::Question {
                id: 3,
                question_bank_id: 1,
                text: "Is <b>2 < 3</b>?".into(),
                options: [
                    "yes".into(),
                    "<script>no</script>".into(),
                    "c".into(),
                    "d".into(),
                ],
                correct_answer_index: 0,
                explanation: Some("<i>basic</i> order".into()),
            };

            let html = question_html(&q);

            assert!(html.contains("<p>Is <b>2 &lt; 3</b>?</p>"));
            assert!(html.contains("<li class=\"correct\">yes</li>"));
            assert!(html.contains("&lt;script&gt;no&lt;/script&gt;"));
            assert!(!html.contains("<script>"));
            assert!(html.contains("<p class=\"explanation\"><i>basic</i> order</p>"));
        }

        #[test]
        fn parse_question_list_html_flag() {
            let cli = Cli::try_parse_from(["quizbank", "question", "list", "4", "--html"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Question(QuestionCommands::List { bank: 4, html: true })
            ));
        }

        #[test]
        fn four_options_checks_length() {
            let ok = four_options(vec!["a".into(), "b".into(), "c".into(), "d".into()]).unwrap();
            assert_eq!(ok[3], "d");
            assert!(four_options(vec!["a".into()]).is_err());
        }
    }
}
