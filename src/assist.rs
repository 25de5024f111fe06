//! AI assistance through an external text-generation proxy.
//!
//! The proxy takes `{prompt, model}` and answers `{text}`. Nothing here retries;
//! callers get one attempt and a degraded value when it fails.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::AiConfig;
use crate::db::Database;
use crate::error::{QuizError, Result};
use crate::markup;
use crate::models::{NewQuestion, Question, OPTIONS_PER_QUESTION};

pub const MAX_GENERATED_QUESTIONS: usize = 15;

pub const HINT_UNAVAILABLE: &str = "Sorry, couldn't generate a hint right now.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("text generation is not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("proxy returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode proxy response: {0}")]
    Decode(String),
    #[error("proxy returned no text")]
    Empty,
}

impl From<GenerationError> for QuizError {
    fn from(e: GenerationError) -> Self {
        QuizError::GenerationFailed(e.to_string())
    }
}

pub trait TextGenerator: Send + Sync {
    fn generate_text(&self, prompt: &str) -> std::result::Result<String, GenerationError>;
}

// Stands in when no endpoint is configured
pub struct Disabled;

impl TextGenerator for Disabled {
    fn generate_text(&self, _prompt: &str) -> std::result::Result<String, GenerationError> {
        Err(GenerationError::NotConfigured)
    }
}

#[derive(Serialize)]
struct ProxyRequest<'a> {
    prompt: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct ProxyResponse {
    #[serde(default)]
    text: Option<String>,
}

pub struct ProxyClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
}

impl ProxyClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> std::result::Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quizbank/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
        })
    }
}

impl TextGenerator for ProxyClient {
    #[instrument(level = "debug", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    fn generate_text(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let started = Instant::now();
        let res = self
            .client
            .post(&self.endpoint)
            .json(&ProxyRequest {
                prompt,
                model: &self.model,
            })
            .send()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body: ProxyResponse = res
            .json()
            .map_err(|e| GenerationError::Decode(e.to_string()))?;
        let text = body.text.unwrap_or_default().trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::Empty);
        }

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            response_len = text.len(),
            "Proxy responded"
        );
        Ok(text)
    }
}

pub fn generator_from_config(config: &AiConfig) -> Arc<dyn TextGenerator> {
    let Some(endpoint) = config.endpoint.as_deref().filter(|e| !e.trim().is_empty()) else {
        return Arc::new(Disabled);
    };
    match ProxyClient::new(endpoint, &config.model, Duration::from_secs(config.timeout_secs)) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            warn!(error = %e, "Could not build proxy client; AI features disabled");
            Arc::new(Disabled)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    Text(String),
    Unavailable,
}

impl Hint {
    pub fn as_str(&self) -> &str {
        match self {
            Hint::Text(text) => text.as_str(),
            Hint::Unavailable => HINT_UNAVAILABLE,
        }
    }
}

pub fn hint_prompt(question: &Question) -> String {
    format!(
        "Provide a short, one-sentence hint for the following multiple-choice question. \
         Do NOT give away the answer or mention the correct option. Just give a clue. \
         Question: \"{}\"",
        markup::plain(&question.text)
    )
}

pub fn fetch_hint(generator: &dyn TextGenerator, prompt: &str) -> Hint {
    match generator.generate_text(prompt) {
        Ok(text) => Hint::Text(text),
        Err(e) => {
            warn!(error = %e, "Hint generation failed");
            Hint::Unavailable
        }
    }
}

// Why the correct option is right; None when generation fails
pub fn explain(generator: &dyn TextGenerator, question: &NewQuestion) -> Option<String> {
    let correct = question.options.get(question.correct_answer_index)?;
    let prompt = format!(
        "Explain why \"{}\" is the correct answer to the question: \"{}\". \
         Keep the explanation concise and clear.",
        markup::plain(correct),
        markup::plain(&question.text)
    );

    match generator.generate_text(&prompt) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(error = %e, "Explanation generation failed");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedItem {
    text: String,
    options: Vec<String>,
    correct_answer_index: i64,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedBatch {
    pub questions: Vec<NewQuestion>,
    pub rejected: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddSummary {
    pub added: usize,
    pub failures: Vec<String>,
}

/// Asks the generator for `count` questions about `topic`, for `bank_id`.
///
/// The reply may wrap the JSON array in prose or a code fence. Items that do not
/// form a valid question are listed in `rejected`; a reply with no usable item
/// at all is `GenerationFailed`.
pub fn generate_questions(
    generator: &dyn TextGenerator,
    bank_id: i64,
    topic: &str,
    count: usize,
) -> Result<GeneratedBatch> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(QuizError::invalid("topic is required"));
    }
    if !(1..=MAX_GENERATED_QUESTIONS).contains(&count) {
        return Err(QuizError::invalid(format!(
            "question count must be between 1 and {}",
            MAX_GENERATED_QUESTIONS
        )));
    }

    let prompt = format!(
        "Generate {} multiple-choice questions about \"{}\". For each question, provide: \
         a 'text' (the question), an 'options' array with exactly 4 strings, a \
         'correctAnswerIndex' (0-3), and a brief 'explanation'. Return as a valid JSON array.",
        count, topic
    );
    let reply = generator.generate_text(&prompt)?;

    let items: Vec<serde_json::Value> = serde_json::from_str(extract_json_array(&reply))
        .map_err(|e| QuizError::GenerationFailed(format!("reply is not a JSON array: {}", e)))?;

    let mut batch = GeneratedBatch::default();
    for (i, item) in items.into_iter().enumerate() {
        match item_to_question(bank_id, item) {
            Ok(q) => batch.questions.push(q),
            Err(reason) => batch.rejected.push(format!("item {}: {}", i + 1, reason)),
        }
    }

    if batch.questions.is_empty() {
        return Err(QuizError::GenerationFailed(
            "reply contained no usable questions".to_string(),
        ));
    }
    Ok(batch)
}

fn extract_json_array(reply: &str) -> &str {
    match (reply.find('['), reply.rfind(']')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => reply,
    }
}

fn item_to_question(bank_id: i64, item: serde_json::Value) -> std::result::Result<NewQuestion, String> {
    let item: GeneratedItem = serde_json::from_value(item).map_err(|e| e.to_string())?;
    let options: [String; OPTIONS_PER_QUESTION] = item
        .options
        .try_into()
        .map_err(|v: Vec<String>| format!("expected 4 options, got {}", v.len()))?;
    let correct_answer_index = usize::try_from(item.correct_answer_index)
        .map_err(|_| format!("invalid correct answer index {}", item.correct_answer_index))?;

    let question = NewQuestion {
        question_bank_id: bank_id,
        text: item.text,
        options,
        correct_answer_index,
        explanation: item.explanation.filter(|e| !e.trim().is_empty()),
    };
    question.validate().map_err(|e| e.to_string())?;
    Ok(question)
}

pub fn add_generated(db: &Database, batch: &GeneratedBatch) -> AddSummary {
    let mut summary = AddSummary {
        added: 0,
        failures: batch.rejected.clone(),
    };
    for question in &batch.questions {
        match db.add_question(question) {
            Ok(_) => summary.added += 1,
            Err(e) => summary.failures.push(e.to_string()),
        }
    }
    info!(
        added = summary.added,
        failed = summary.failures.len(),
        "Added generated questions"
    );
    summary
}
