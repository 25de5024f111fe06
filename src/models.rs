use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};

pub const OPTIONS_PER_QUESTION: usize = 4;

// Wire value for an unanswered question in serialized results
pub const UNANSWERED: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBank {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub question_bank_id: i64,
    pub text: String,
    pub options: [String; OPTIONS_PER_QUESTION],
    pub correct_answer_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_answer_index]
    }

    pub fn is_correct(&self, answer: Option<usize>) -> bool {
        answer == Some(self.correct_answer_index)
    }
}

// A question before the store assigns it an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub question_bank_id: i64,
    pub text: String,
    pub options: [String; OPTIONS_PER_QUESTION],
    pub correct_answer_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl NewQuestion {
    pub fn validate(&self) -> Result<()> {
        validate_content(&self.text, &self.options, self.correct_answer_index)
    }
}

impl From<&Question> for NewQuestion {
    fn from(q: &Question) -> Self {
        Self {
            question_bank_id: q.question_bank_id,
            text: q.text.clone(),
            options: q.options.clone(),
            correct_answer_index: q.correct_answer_index,
            explanation: q.explanation.clone(),
        }
    }
}

pub fn validate_content(
    text: &str,
    options: &[String; OPTIONS_PER_QUESTION],
    correct_answer_index: usize,
) -> Result<()> {
    if text.trim().is_empty() {
        return Err(QuizError::invalid("question text is required"));
    }
    if let Some(pos) = options.iter().position(|o| o.trim().is_empty()) {
        return Err(QuizError::invalid(format!("option {} is blank", pos + 1)));
    }
    if correct_answer_index >= OPTIONS_PER_QUESTION {
        return Err(QuizError::invalid(format!(
            "correct answer index {} is outside 0..={}",
            correct_answer_index,
            OPTIONS_PER_QUESTION - 1
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub bank_id: i64,
    pub bank_name: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub date_completed: DateTime<Utc>,
}

impl QuizHistory {
    pub fn grade(&self) -> Grade {
        Grade::from_percentage(self.percentage)
    }
}

// Outcome of one completed session; never persisted as such
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub question_bank: QuestionBank,
    pub questions: Vec<Question>,
    #[serde(serialize_with = "serialize_answer_codes")]
    pub user_answers: Vec<Option<usize>>,
    pub score: u32,
    pub total_questions: u32,
    pub date_completed: DateTime<Utc>,
}

impl QuizResult {
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total_questions)
    }

    pub fn grade(&self) -> Grade {
        Grade::from_percentage(self.percentage())
    }

    pub fn to_history(&self) -> QuizHistory {
        QuizHistory {
            id: None,
            bank_id: self.question_bank.id,
            bank_name: self.question_bank.name.clone(),
            score: self.score,
            total_questions: self.total_questions,
            percentage: self.percentage(),
            date_completed: self.date_completed,
        }
    }
}

fn serialize_answer_codes<S>(answers: &[Option<usize>], s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.collect_seq(
        answers
            .iter()
            .map(|a| a.map(|i| i as i64).unwrap_or(UNANSWERED)),
    )
}

// Round-half-up integer percentage; zero when there is nothing to score
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (score, total) = (score as u64, total as u64);
    ((score * 200 + total) / (total * 2)) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Good,
    Fair,
    Poor,
}

impl Grade {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= 80 {
            Grade::Good
        } else if percentage >= 50 {
            Grade::Fair
        } else {
            Grade::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Good => "good",
            Grade::Fair => "fair",
            Grade::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BankSummary {
    pub bank: QuestionBank,
    pub question_count: i64,
}

// What a cascade delete removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    pub bank_removed: bool,
    pub questions_removed: usize,
    pub history_removed: usize,
}

// Per-installation flags kept outside the entity collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallState {
    pub seeded: bool,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(a: &str, b: &str, c: &str, d: &str) -> [String; 4] {
        [a.to_string(), b.to_string(), c.to_string(), d.to_string()]
    }

    fn sample_question() -> Question {
        Question {
            id: 1,
            question_bank_id: 1,
            text: "Capital of France?".to_string(),
            options: options("Berlin", "Paris", "Rome", "Madrid"),
            correct_answer_index: 1,
            explanation: None,
        }
    }

    mod percentage_tests {
        use super::*;

        #[test]
        fn zero_total_is_zero() {
            assert_eq!(percentage(0, 0), 0);
        }

        #[test]
        fn full_score_is_hundred() {
            assert_eq!(percentage(3, 3), 100);
        }

        #[test]
        fn rounds_half_up() {
            // 1/8 = 12.5%
            assert_eq!(percentage(1, 8), 13);
            // 3/8 = 37.5%
            assert_eq!(percentage(3, 8), 38);
        }

        #[test]
        fn rounds_down_below_half() {
            // 1/3 = 33.33%
            assert_eq!(percentage(1, 3), 33);
            // 2/3 = 66.67%
            assert_eq!(percentage(2, 3), 67);
        }
    }

    mod grade_tests {
        use super::*;

        #[test]
        fn boundaries() {
            assert_eq!(Grade::from_percentage(100), Grade::Good);
            assert_eq!(Grade::from_percentage(80), Grade::Good);
            assert_eq!(Grade::from_percentage(79), Grade::Fair);
            assert_eq!(Grade::from_percentage(50), Grade::Fair);
            assert_eq!(Grade::from_percentage(49), Grade::Poor);
            assert_eq!(Grade::from_percentage(0), Grade::Poor);
        }

        #[test]
        fn as_str_returns_correct_values() {
            assert_eq!(Grade::Good.as_str(), "good");
            assert_eq!(Grade::Fair.as_str(), "fair");
            assert_eq!(Grade::Poor.as_str(), "poor");
        }
    }

    mod question_tests {
        use super::*;

        #[test]
        fn correct_option_follows_index() {
            assert_eq!(sample_question().correct_option(), "Paris");
        }

        #[test]
        fn unanswered_is_never_correct() {
            let q = sample_question();
            assert!(!q.is_correct(None));
            assert!(q.is_correct(Some(1)));
            assert!(!q.is_correct(Some(0)));
        }

        #[test]
        fn validate_rejects_blank_text() {
            let err = validate_content("  ", &options("a", "b", "c", "d"), 0).unwrap_err();
            assert!(matches!(err, QuizError::InvalidFormat(_)));
        }

        #[test]
        fn validate_rejects_blank_option() {
            let err = validate_content("Q", &options("a", "", "c", "d"), 0).unwrap_err();
            assert!(err.to_string().contains("option 2"));
        }

        #[test]
        fn validate_rejects_out_of_range_index() {
            assert!(validate_content("Q", &options("a", "b", "c", "d"), 4).is_err());
            assert!(validate_content("Q", &options("a", "b", "c", "d"), 3).is_ok());
        }

        #[test]
        fn serializes_camel_case_without_missing_explanation() {
            let json = serde_json::to_string(&sample_question()).unwrap();
            assert!(json.contains("\"questionBankId\":1"));
            assert!(json.contains("\"correctAnswerIndex\":1"));
            assert!(!json.contains("explanation"));
        }
    }

    mod result_tests {
        use super::*;

        fn sample_result(answers: Vec<Option<usize>>, score: u32) -> QuizResult {
            let total = answers.len() as u32;
            QuizResult {
                question_bank: QuestionBank {
                    id: 4,
                    name: "Geography".to_string(),
                    description: String::new(),
                    created_at: Utc::now(),
                },
                questions: vec![sample_question(); answers.len()],
                user_answers: answers,
                score,
                total_questions: total,
                date_completed: Utc::now(),
            }
        }

        #[test]
        fn unanswered_serializes_as_minus_one() {
            let result = sample_result(vec![Some(1), None, Some(0)], 1);
            let json = serde_json::to_value(&result).unwrap();
            assert_eq!(json["userAnswers"], serde_json::json!([1, -1, 0]));
        }

        #[test]
        fn to_history_snapshots_bank_and_score() {
            let result = sample_result(vec![Some(1), Some(1), None], 2);
            let history = result.to_history();
            assert!(history.id.is_none());
            assert_eq!(history.bank_id, 4);
            assert_eq!(history.bank_name, "Geography");
            assert_eq!(history.score, 2);
            assert_eq!(history.total_questions, 3);
            assert_eq!(history.percentage, 67);
            assert_eq!(history.date_completed, result.date_completed);
        }
    }

    mod json_output_tests {
        use super::*;

        #[test]
        fn ok_with_string() {
            let output = JsonOutput::ok("test data");
            assert!(output.success);
            assert_eq!(output.data, Some("test data"));
            assert!(output.error.is_none());
        }

        #[test]
        fn err_with_string() {
            let output = JsonOutput::<()>::err("something went wrong");
            assert!(!output.success);
            assert!(output.data.is_none());
            assert_eq!(output.error, Some("something went wrong".to_string()));
        }

        #[test]
        fn serializes_ok_correctly() {
            let output = JsonOutput::ok("test");
            let json = serde_json::to_string(&output).unwrap();
            assert!(json.contains("\"success\":true"));
            assert!(json.contains("\"data\":\"test\""));
            assert!(json.contains("\"error\":null"));
        }

        #[test]
        fn serializes_err_correctly() {
            let output = JsonOutput::<()>::err("error");
            let json = serde_json::to_string(&output).unwrap();
            assert!(json.contains("\"success\":false"));
            assert!(json.contains("\"data\":null"));
            assert!(json.contains("\"error\":\"error\""));
        }
    }
}
