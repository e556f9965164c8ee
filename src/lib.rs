//! # aws-exam-prep
//!
//! Timed multiple-choice practice for AWS certification exams, with a daily
//! attempt quota and a result history kept on the local machine.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use aws_exam_prep::ads::{AdConfig, TimedAdProvider};
//! use aws_exam_prep::clock::SystemClock;
//! use aws_exam_prep::config::AppConfig;
//! use aws_exam_prep::quota::QuotaManager;
//! use aws_exam_prep::results::ResultStore;
//! use aws_exam_prep::storage::FilePreferences;
//! use aws_exam_prep::{App, ExamTrack, QuizError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     let config = AppConfig::default();
//!     let quota = QuotaManager::new(
//!         config.quota.clone(),
//!         Box::new(FilePreferences::open(config.quota_path())),
//!         Box::new(SystemClock),
//!     );
//!     let results = ResultStore::new(Box::new(FilePreferences::open(config.results_path())));
//!     let ads = TimedAdProvider::new(AdConfig::default());
//!
//!     let app = App::new(
//!         config,
//!         ExamTrack::CloudPractitioner,
//!         Box::new(quota),
//!         Box::new(results),
//!         Box::new(ads),
//!     );
//!     aws_exam_prep::run(app).await
//! }
//! ```

pub mod ads;
mod app;
pub mod clock;
pub mod config;
mod data;
mod models;
pub mod quota;
pub mod results;
pub mod reward;
pub mod session;
pub mod storage;
pub mod telemetry;
pub mod terminal;
mod ui;

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tokio::sync::mpsc;
use tracing::info;

pub use app::App;
pub use config::ConfigError;
pub use data::{
    bank_path, load_questions, try_load_questions, ExamTrack, LoadError, QuestionBank,
};
pub use models::{AppState, QuizMode, QuizQuestion, QuizResult, PASS_THRESHOLD};
pub use storage::PersistenceError;

use session::ticker::Ticker;

/// Errors that stop the binary. Bank and storage failures degrade in place
/// and never reach here.
#[derive(Debug)]
pub enum QuizError {
    /// Unusable configuration file.
    Config(ConfigError),
    /// IO error during quiz execution.
    Io(io::Error),
}

impl std::fmt::Display for QuizError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizError::Config(e) => write!(f, "Invalid configuration: {}", e),
            QuizError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for QuizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuizError::Config(e) => Some(e),
            QuizError::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for QuizError {
    fn from(err: ConfigError) -> Self {
        QuizError::Config(err)
    }
}

impl From<io::Error> for QuizError {
    fn from(err: io::Error) -> Self {
        QuizError::Io(err)
    }
}

/// Run the app in the terminal until the user quits.
///
/// Must be called inside a tokio runtime: the countdown and the ad provider
/// run as tasks.
pub async fn run(mut app: App) -> Result<(), QuizError> {
    let mut term = terminal::init()?;
    let result = run_event_loop(&mut term, &mut app).await;
    terminal::restore()?;
    info!(target: "app", "Exited");
    result
}

async fn run_event_loop(terminal: &mut terminal::AppTerminal, app: &mut App) -> Result<(), QuizError> {
    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
    let mut ticker = Ticker::new(tick_tx);
    let mut session_epoch = app.session_epoch();

    loop {
        while let Ok(generation) = tick_rx.try_recv() {
            if ticker.accept(generation) {
                app.tick();
            }
        }
        app.poll_reward();
        sync_ticker(&mut ticker, app, &mut session_epoch);

        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if handle_input(app, key.code) {
                    break;
                }
                sync_ticker(&mut ticker, app, &mut session_epoch);
            }
        }

        tokio::task::yield_now().await;
    }

    ticker.cancel();
    Ok(())
}

/// A new or restarted session starts its countdown from a whole second.
fn sync_ticker(ticker: &mut Ticker, app: &App, session_epoch: &mut u64) {
    if app.session_epoch() != *session_epoch {
        *session_epoch = app.session_epoch();
        ticker.reset();
    }
    ticker.sync(app.clock_running());
}

/// Returns true if the app should exit.
fn handle_input(app: &mut App, key: KeyCode) -> bool {
    match app.state {
        AppState::Landing => handle_landing_input(app, key),
        AppState::Quiz => handle_quiz_input(app, key),
        AppState::Result => handle_result_input(app, key),
        AppState::History => handle_history_input(app, key),
        AppState::AdOffer => handle_ad_offer_input(app, key),
    }
}

fn handle_landing_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('1') => app.start_quiz(QuizMode::Quick),
        KeyCode::Char('2') => app.start_quiz(QuizMode::Full),
        KeyCode::Char('e') | KeyCode::Char('E') => app.switch_track(),
        KeyCode::Char('h') | KeyCode::Char('H') => app.show_history(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

fn handle_quiz_input(app: &mut App, key: KeyCode) -> bool {
    let answered = app
        .session()
        .is_some_and(|s| s.last_feedback().is_some());

    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Char(' ') => app.toggle_selected_option(),
        KeyCode::Enter if answered => app.next_question(),
        KeyCode::Enter => app.submit_answer(),
        KeyCode::Char('p') | KeyCode::Char('P') => app.toggle_timer(),
        KeyCode::Esc => app.back_to_landing(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

fn handle_result_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('r') | KeyCode::Char('R') => app.restart(),
        KeyCode::Char('h') | KeyCode::Char('H') => app.show_history(),
        KeyCode::Esc | KeyCode::Enter => app.back_to_landing(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

fn handle_history_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_history_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_history_up(),
        KeyCode::Esc | KeyCode::Enter => app.back_to_landing(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

fn handle_ad_offer_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('w') | KeyCode::Char('W') => app.watch_ad(),
        KeyCode::Esc => app.back_to_landing(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}
