mod ui;
mod widgets;

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use crate::assist::{self, Hint, TextGenerator};
use crate::config::QuizDefaults;
use crate::confirm::{self, PendingConfirmation};
use crate::db::Database;
use crate::history::{self, HistoryStats};
use crate::models::{BankSummary, Question, QuizHistory, OPTIONS_PER_QUESTION};
use crate::session::{Effect, HintTicket, QuizSession, Rejection, SessionConfig};

type TuiResult<T> = Result<T, Box<dyn std::error::Error>>;

pub struct TuiOptions {
    pub generator: Arc<dyn TextGenerator>,
    pub defaults: QuizDefaults,
}

pub enum Launch {
    Browse,
    Quiz { bank_id: i64, config: SessionConfig },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Banks,
    BankDetail,
    Quiz,
    Result,
    History,
}

impl View {
    // Tabs are Banks and History; the other views live under Banks
    fn toggle_tab(&self) -> Self {
        match self {
            View::History => View::Banks,
            _ => View::History,
        }
    }
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }

    fn first(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(0);
        }
    }

    fn last(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(self.items.len() - 1);
        }
    }

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

pub struct App {
    db: Database,
    generator: Arc<dyn TextGenerator>,
    defaults: QuizDefaults,
    hint_tx: Sender<(HintTicket, Hint)>,
    hint_rx: Receiver<(HintTicket, Hint)>,
    pub view: View,
    pub banks: StatefulList<BankSummary>,
    pub selected_bank: Option<BankSummary>,
    pub questions: StatefulList<Question>,
    pub quiz_config: SessionConfig,
    pub session: Option<QuizSession>,
    pub review: StatefulList<usize>,
    pub history: StatefulList<QuizHistory>,
    pub history_stats: HistoryStats,
    pub pending: Option<PendingConfirmation>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(db: Database, options: TuiOptions) -> TuiResult<Self> {
        let banks = db.list_bank_summaries()?;
        let entries = history::list(&db)?;
        let (hint_tx, hint_rx) = mpsc::channel();

        Ok(Self {
            db,
            generator: options.generator,
            defaults: options.defaults,
            hint_tx,
            hint_rx,
            view: View::Banks,
            banks: StatefulList::with_items(banks),
            selected_bank: None,
            questions: StatefulList::with_items(Vec::new()),
            quiz_config: SessionConfig::from(options.defaults),
            session: None,
            review: StatefulList::with_items(Vec::new()),
            history_stats: history::stats(&entries),
            history: StatefulList::with_items(entries),
            pending: None,
            status: None,
            should_quit: false,
        })
    }

    pub fn refresh_data(&mut self) -> TuiResult<()> {
        let selected = self.banks.selected;
        self.banks = StatefulList::with_items(self.db.list_bank_summaries()?);
        if let Some(i) = selected.filter(|&i| i < self.banks.items.len()) {
            self.banks.selected = Some(i);
        }

        let entries = history::list(&self.db)?;
        self.history_stats = history::stats(&entries);
        self.history = StatefulList::with_items(entries);

        if let Some(bank_id) = self.selected_bank.as_ref().map(|s| s.bank.id) {
            match self.banks.items.iter().find(|s| s.bank.id == bank_id) {
                Some(summary) => {
                    self.selected_bank = Some(summary.clone());
                    let selected = self.questions.selected;
                    self.questions = StatefulList::with_items(self.db.list_questions(bank_id)?);
                    if let Some(i) = selected.filter(|&i| i < self.questions.items.len()) {
                        self.questions.selected = Some(i);
                    }
                    self.clamp_quiz_count();
                }
                None => {
                    self.selected_bank = None;
                    self.questions = StatefulList::with_items(Vec::new());
                    if self.view == View::BankDetail {
                        self.view = View::Banks;
                    }
                }
            }
        }
        Ok(())
    }

    fn open_bank(&mut self, bank_id: i64) -> TuiResult<()> {
        let Some(summary) = self.banks.items.iter().find(|s| s.bank.id == bank_id).cloned() else {
            self.status = Some(format!("Question bank {} not found", bank_id));
            return Ok(());
        };
        let questions = self.db.list_questions(bank_id)?;
        self.quiz_config = SessionConfig::for_bank(self.defaults, questions.len());
        self.questions = StatefulList::with_items(questions);
        self.selected_bank = Some(summary);
        self.view = View::BankDetail;
        Ok(())
    }

    fn open_selected_bank(&mut self) -> TuiResult<()> {
        if let Some(id) = self.banks.selected_item().map(|s| s.bank.id) {
            self.open_bank(id)?;
        }
        Ok(())
    }

    fn clamp_quiz_count(&mut self) {
        let available = self.questions.items.len();
        self.quiz_config.question_count = self.quiz_config.effective_count(available);
    }

    fn adjust_quiz_count(&mut self, up: bool) {
        let available = self.questions.items.len();
        if available == 0 {
            return;
        }
        let count = self.quiz_config.question_count;
        self.quiz_config.question_count = if up {
            (count + 1).min(available)
        } else {
            count.saturating_sub(1).max(1)
        };
    }

    fn start_quiz(&mut self) {
        let Some(bank_id) = self.selected_bank.as_ref().map(|s| s.bank.id) else {
            return;
        };
        match QuizSession::start(&self.db, bank_id, &self.quiz_config, &mut rand::thread_rng()) {
            Ok(session) => {
                info!(bank_id, "Started quiz from TUI");
                self.session = Some(session);
                self.view = View::Quiz;
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn request_hint(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some((ticket, prompt)) = session.request_hint() else {
            return;
        };

        let generator = Arc::clone(&self.generator);
        let tx = self.hint_tx.clone();
        thread::spawn(move || {
            let hint = assist::fetch_hint(generator.as_ref(), &prompt);
            // The app may have quit before the hint arrived
            let _ = tx.send((ticket, hint));
        });
    }

    pub fn poll_hints(&mut self) {
        while let Ok((ticket, hint)) = self.hint_rx.try_recv() {
            match self.session.as_mut() {
                Some(session) => {
                    session.hint_arrived(ticket, hint);
                }
                None => warn!(seq = ticket.seq, "Hint arrived with no active quiz"),
            }
        }
    }

    fn answer(&mut self, option: usize) {
        if let Some(session) = self.session.as_mut() {
            session.answer(option);
        }
    }

    fn advance(&mut self) -> TuiResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let effects = match session.advance(&self.db, Utc::now()) {
            Ok(effects) => effects,
            Err(e) => {
                self.status = Some(format!("Could not save result: {} (press Enter to retry)", e));
                return Ok(());
            }
        };
        if effects.contains(&Effect::Rejected(Rejection::NotAnswered)) {
            self.status = Some("Choose an answer first (1-4)".to_string());
            return Ok(());
        }

        if let Some(result) = session.result() {
            self.review = StatefulList::with_items((0..result.questions.len()).collect());
            self.view = View::Result;
            self.refresh_data()?;
        }
        Ok(())
    }

    fn exit_quiz(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.exit();
            self.status = Some("Quiz abandoned; no result recorded".to_string());
        }
        self.view = View::BankDetail;
    }

    fn leave_result(&mut self) {
        self.session = None;
        self.view = View::BankDetail;
    }

    fn ask(&mut self, request: crate::error::Result<PendingConfirmation>) {
        match request {
            Ok(pending) => self.pending = Some(pending),
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn resolve_pending(&mut self, pending: PendingConfirmation, confirmed: bool) -> TuiResult<()> {
        if !confirmed {
            pending.cancel();
            self.status = Some("Cancelled".to_string());
            return Ok(());
        }
        match pending.confirm(&self.db) {
            Ok(done) => self.status = Some(done.describe()),
            Err(e) => self.status = Some(format!("Error: {}", e)),
        }
        self.refresh_data()
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> TuiResult<()> {
        // A confirmation dialog captures every key until answered
        if let Some(pending) = self.pending.take() {
            match key {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.resolve_pending(pending, true)?,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.resolve_pending(pending, false)?
                }
                _ => self.pending = Some(pending),
            }
            return Ok(());
        }

        self.status = None;

        if self.view == View::Quiz {
            return self.handle_quiz_key(key);
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_data()?;
            }

            KeyCode::Tab | KeyCode::BackTab if self.view != View::Result => {
                self.view = self.view.toggle_tab();
            }

            _ => match self.view {
                View::Banks => self.handle_banks_key(key)?,
                View::BankDetail => self.handle_bank_detail_key(key)?,
                View::Result => self.handle_result_key(key),
                View::History => self.handle_history_key(key),
                View::Quiz => {}
            },
        }
        Ok(())
    }

    fn handle_banks_key(&mut self, key: KeyCode) -> TuiResult<()> {
        match key {
            KeyCode::Char('j') | KeyCode::Down => self.banks.next(),
            KeyCode::Char('k') | KeyCode::Up => self.banks.previous(),
            KeyCode::Char('g') => self.banks.first(),
            KeyCode::Char('G') => self.banks.last(),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => self.open_selected_bank()?,
            KeyCode::Char('h') | KeyCode::Left => self.view = View::History,
            KeyCode::Char('d') => {
                if let Some(id) = self.banks.selected_item().map(|s| s.bank.id) {
                    let request = confirm::request_delete_bank(&self.db, id);
                    self.ask(request);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_bank_detail_key(&mut self, key: KeyCode) -> TuiResult<()> {
        match key {
            KeyCode::Char('j') | KeyCode::Down => self.questions.next(),
            KeyCode::Char('k') | KeyCode::Up => self.questions.previous(),
            KeyCode::Char('g') => self.questions.first(),
            KeyCode::Char('G') => self.questions.last(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_quiz_count(true),
            KeyCode::Char('-') => self.adjust_quiz_count(false),
            KeyCode::Char('s') => {
                self.quiz_config.shuffle_questions = !self.quiz_config.shuffle_questions
            }
            KeyCode::Char('o') => {
                self.quiz_config.shuffle_options = !self.quiz_config.shuffle_options
            }
            KeyCode::Enter => self.start_quiz(),
            KeyCode::Char('x') => {
                if let Some(id) = self.questions.selected_item().map(|q| q.id) {
                    let request = confirm::request_delete_question(&self.db, id);
                    self.ask(request);
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_bank.as_ref().map(|s| s.bank.id) {
                    let request = confirm::request_delete_bank(&self.db, id);
                    self.ask(request);
                }
            }
            KeyCode::Char('h') | KeyCode::Left | KeyCode::Esc => {
                self.view = View::Banks;
                self.selected_bank = None;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_quiz_key(&mut self, key: KeyCode) -> TuiResult<()> {
        match key {
            KeyCode::Char(c @ '1'..='4') => {
                let option = c as usize - '1' as usize;
                debug_assert!(option < OPTIONS_PER_QUESTION);
                self.answer(option);
            }
            KeyCode::Enter | KeyCode::Char('n') | KeyCode::Right => self.advance()?,
            KeyCode::Char('?') => self.request_hint(),
            KeyCode::Esc => self.exit_quiz(),
            _ => {}
        }
        Ok(())
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('j') | KeyCode::Down => self.review.next(),
            KeyCode::Char('k') | KeyCode::Up => self.review.previous(),
            KeyCode::Char('r') => self.start_quiz(),
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => {
                self.leave_result()
            }
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('j') | KeyCode::Down => self.history.next(),
            KeyCode::Char('k') | KeyCode::Up => self.history.previous(),
            KeyCode::Char('g') => self.history.first(),
            KeyCode::Char('G') => self.history.last(),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('l') | KeyCode::Right => {
                self.view = View::Banks
            }
            _ => {}
        }
    }
}

/// Runs the terminal UI until the user quits, then hands the store back.
pub fn run(db: Database, options: TuiOptions, launch: Launch) -> TuiResult<Database> {
    let mut app = App::new(db, options)?;
    if let Launch::Quiz { bank_id, config } = launch {
        app.open_bank(bank_id)?;
        app.quiz_config = config;
        app.start_quiz();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;
    Ok(app.db)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> TuiResult<()> {
    loop {
        app.poll_hints();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, key.modifiers)?;
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
