//! Quiz sessions as a pure state machine.
//!
//! [`transition`] maps `(state, event)` to `(state', effects)` and never touches the
//! store or the network. [`QuizSession`] wraps it for callers: it persists history
//! when a session completes and hands hint requests back to be run elsewhere.
//!
//! ```text
//! NotStarted -> InProgress -> Completed(result)
//!                   |
//!                   +-------> Abandoned        (Exit; nothing persisted)
//! ```

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::assist::{self, Hint};
use crate::config::QuizDefaults;
use crate::db::Database;
use crate::error::{QuizError, Result};
use crate::history;
use crate::models::{Question, QuestionBank, QuizHistory, QuizResult, OPTIONS_PER_QUESTION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    pub question_count: usize,
    pub shuffle_questions: bool,
    pub shuffle_options: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(QuizDefaults::default())
    }
}

impl From<QuizDefaults> for SessionConfig {
    fn from(d: QuizDefaults) -> Self {
        Self {
            question_count: d.question_count,
            shuffle_questions: d.shuffle_questions,
            shuffle_options: d.shuffle_options,
        }
    }
}

impl SessionConfig {
    // Default count for a bank: the configured count, capped at what the bank holds
    pub fn for_bank(defaults: QuizDefaults, available: usize) -> Self {
        let mut config = Self::from(defaults);
        config.question_count = config.question_count.min(available);
        config
    }

    pub fn effective_count(&self, available: usize) -> usize {
        if available == 0 {
            return 0;
        }
        self.question_count.clamp(1, available)
    }
}

/// Selects and orders the session's questions.
///
/// Uniform Fisher-Yates shuffles throughout; the correct index of every shuffled
/// question is remapped so it still points at the same option text.
pub fn prepare_questions<R: Rng + ?Sized>(
    mut questions: Vec<Question>,
    config: &SessionConfig,
    rng: &mut R,
) -> Vec<Question> {
    if config.shuffle_questions {
        questions.shuffle(rng);
    }
    questions.truncate(config.effective_count(questions.len()));

    if config.shuffle_options {
        questions
            .iter()
            .map(|q| shuffle_options(q, rng))
            .collect()
    } else {
        questions
    }
}

pub fn shuffle_options<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Question {
    let mut order: [usize; OPTIONS_PER_QUESTION] = std::array::from_fn(|i| i);
    order.shuffle(rng);

    let options = order.map(|from| question.options[from].clone());
    let correct_answer_index = order
        .iter()
        .position(|&from| from == question.correct_answer_index)
        .unwrap_or(question.correct_answer_index);

    Question {
        options,
        correct_answer_index,
        ..question.clone()
    }
}

/// Identifies one hint request. The session key differs between sessions, and
/// `seq` between requests of the same session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HintTicket {
    pub session: u64,
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HintSlot {
    #[default]
    Idle,
    Pending(HintTicket),
    Ready(Hint),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveQuiz {
    pub session_key: u64,
    pub bank: QuestionBank,
    pub questions: Vec<Question>,
    pub answers: Vec<Option<usize>>,
    pub current: usize,
    pub hint: HintSlot,
    next_hint_seq: u64,
}

impl ActiveQuiz {
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn current_answer(&self) -> Option<usize> {
        self.answers[self.current]
    }

    pub fn is_answered(&self) -> bool {
        self.current_answer().is_some()
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    pub fn score(&self) -> u32 {
        self.questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| q.is_correct(**a))
            .count() as u32
    }

    fn finish(self, at: DateTime<Utc>) -> QuizResult {
        let score = self.score();
        let total_questions = self.questions.len() as u32;
        QuizResult {
            question_bank: self.bank,
            questions: self.questions,
            user_answers: self.answers,
            score,
            total_questions,
            date_completed: at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    NotStarted,
    InProgress(ActiveQuiz),
    Completed(QuizResult),
    Abandoned,
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::NotStarted => "not_started",
            SessionState::InProgress(_) => "in_progress",
            SessionState::Completed(_) => "completed",
            SessionState::Abandoned => "abandoned",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Answer(usize),
    Advance { at: DateTime<Utc> },
    Exit,
    RequestHint,
    HintArrived { ticket: HintTicket, hint: Hint },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotInProgress,
    AlreadyAnswered,
    InvalidOption(usize),
    NotAnswered,
    HintAfterAnswer,
    HintPending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PersistHistory(QuizHistory),
    FetchHint { ticket: HintTicket, prompt: String },
    Rejected(Rejection),
    HintDiscarded(HintTicket),
}

/// Builds the in-progress state for a bank's questions.
pub fn begin<R: Rng + ?Sized>(
    bank: QuestionBank,
    questions: Vec<Question>,
    config: &SessionConfig,
    rng: &mut R,
) -> Result<SessionState> {
    if questions.is_empty() {
        return Err(QuizError::EmptyBank(bank.id));
    }

    let questions = prepare_questions(questions, config, rng);
    let answers = vec![None; questions.len()];

    Ok(SessionState::InProgress(ActiveQuiz {
        session_key: rng.gen(),
        bank,
        questions,
        answers,
        current: 0,
        hint: HintSlot::Idle,
        next_hint_seq: 0,
    }))
}

pub fn transition(state: SessionState, event: SessionEvent) -> (SessionState, Vec<Effect>) {
    let mut quiz = match state {
        SessionState::InProgress(quiz) => quiz,
        other => {
            let effect = match event {
                SessionEvent::HintArrived { ticket, .. } => Effect::HintDiscarded(ticket),
                _ => Effect::Rejected(Rejection::NotInProgress),
            };
            return (other, vec![effect]);
        }
    };

    match event {
        SessionEvent::Answer(option) => {
            if quiz.is_answered() {
                return reject(quiz, Rejection::AlreadyAnswered);
            }
            if option >= OPTIONS_PER_QUESTION {
                return reject(quiz, Rejection::InvalidOption(option));
            }
            let current = quiz.current;
            quiz.answers[current] = Some(option);
            (SessionState::InProgress(quiz), vec![])
        }

        SessionEvent::Advance { at } => {
            if !quiz.is_answered() {
                return reject(quiz, Rejection::NotAnswered);
            }
            if !quiz.is_last() {
                quiz.current += 1;
                quiz.hint = HintSlot::Idle;
                return (SessionState::InProgress(quiz), vec![]);
            }
            let result = quiz.finish(at);
            let entry = result.to_history();
            (
                SessionState::Completed(result),
                vec![Effect::PersistHistory(entry)],
            )
        }

        SessionEvent::Exit => (SessionState::Abandoned, vec![]),

        SessionEvent::RequestHint => {
            if quiz.is_answered() {
                return reject(quiz, Rejection::HintAfterAnswer);
            }
            if matches!(quiz.hint, HintSlot::Pending(_)) {
                return reject(quiz, Rejection::HintPending);
            }
            let ticket = HintTicket {
                session: quiz.session_key,
                seq: quiz.next_hint_seq,
            };
            quiz.next_hint_seq += 1;
            quiz.hint = HintSlot::Pending(ticket);
            let prompt = assist::hint_prompt(quiz.current_question());
            (
                SessionState::InProgress(quiz),
                vec![Effect::FetchHint { ticket, prompt }],
            )
        }

        SessionEvent::HintArrived { ticket, hint } => {
            if quiz.hint == HintSlot::Pending(ticket) {
                quiz.hint = HintSlot::Ready(hint);
                (SessionState::InProgress(quiz), vec![])
            } else {
                (
                    SessionState::InProgress(quiz),
                    vec![Effect::HintDiscarded(ticket)],
                )
            }
        }
    }
}

fn reject(quiz: ActiveQuiz, reason: Rejection) -> (SessionState, Vec<Effect>) {
    (
        SessionState::InProgress(quiz),
        vec![Effect::Rejected(reason)],
    )
}

/// Drives one session against the store.
pub struct QuizSession {
    state: SessionState,
}

impl QuizSession {
    pub fn start<R: Rng + ?Sized>(
        db: &Database,
        bank_id: i64,
        config: &SessionConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let bank = db.get_bank(bank_id)?.ok_or(QuizError::EmptyBank(bank_id))?;
        let questions = db.list_questions(bank_id)?;
        let state = begin(bank, questions, config, rng)?;

        if let SessionState::InProgress(quiz) = &state {
            debug!(bank_id, questions = quiz.questions.len(), "Quiz session started");
        }
        Ok(Self { state })
    }

    #[cfg(test)]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn active(&self) -> Option<&ActiveQuiz> {
        match &self.state {
            SessionState::InProgress(quiz) => Some(quiz),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&QuizResult> {
        match &self.state {
            SessionState::Completed(result) => Some(result),
            _ => None,
        }
    }

    // Runs the pure transition; effects are returned untouched
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let from = state.name();
        let (next, effects) = transition(state, event);
        if from != next.name() {
            debug!(from, to = next.name(), "Quiz session transition");
        }
        self.state = next;
        effects
    }

    /// Applies `event` and writes any history it produces.
    ///
    /// The returned effects no longer contain `PersistHistory`. If the history
    /// write fails the session is put back where it was, so the event can be
    /// retried.
    pub fn handle(&mut self, db: &Database, event: SessionEvent) -> Result<Vec<Effect>> {
        let before = self.state.clone();
        let mut remaining = Vec::new();
        for effect in self.apply(event) {
            match effect {
                Effect::PersistHistory(entry) => {
                    if let Err(e) = history::record(db, &entry) {
                        warn!(error = %e, "Could not record quiz history; session restored");
                        self.state = before;
                        return Err(e);
                    }
                }
                other => remaining.push(other),
            }
        }
        Ok(remaining)
    }

    pub fn answer(&mut self, option: usize) -> Vec<Effect> {
        self.apply(SessionEvent::Answer(option))
    }

    pub fn advance(&mut self, db: &Database, at: DateTime<Utc>) -> Result<Vec<Effect>> {
        self.handle(db, SessionEvent::Advance { at })
    }

    pub fn exit(&mut self) -> Vec<Effect> {
        self.apply(SessionEvent::Exit)
    }

    // The prompt to send, if a hint may be requested now
    pub fn request_hint(&mut self) -> Option<(HintTicket, String)> {
        self.apply(SessionEvent::RequestHint)
            .into_iter()
            .find_map(|effect| match effect {
                Effect::FetchHint { ticket, prompt } => Some((ticket, prompt)),
                _ => None,
            })
    }

    // True when the hint was applied to the current question
    pub fn hint_arrived(&mut self, ticket: HintTicket, hint: Hint) -> bool {
        let effects = self.apply(SessionEvent::HintArrived { ticket, hint });
        let applied = effects.is_empty();
        if !applied {
            debug!(seq = ticket.seq, "Discarded late hint");
        }
        applied
    }
}
