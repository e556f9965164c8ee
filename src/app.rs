use tracing::{debug, info, warn};

use crate::ads::AdProvider;
use crate::config::{AppConfig, ModeConfig};
use crate::data::{ExamTrack, QuestionBank};
use crate::models::{AppState, QuizMode, QuizQuestion, QuizResult};
use crate::quota::QuotaProvider;
use crate::results::{newest_first, HistorySummary, ResultStorage};
use crate::reward::{PendingReward, RewardGate};
use crate::session::QuizSession;

pub struct App {
    pub state: AppState,
    config: AppConfig,
    bank: QuestionBank,
    quota: Box<dyn QuotaProvider>,
    results: Box<dyn ResultStorage>,
    ads: Box<dyn AdProvider>,
    session: Option<QuizSession>,
    /// Bumped whenever a countdown starts from full time.
    session_epoch: u64,
    pending_reward: Option<PendingReward>,
    /// Mode to start once a bonus attempt is granted.
    pending_mode: Option<QuizMode>,
    selected_option: usize,
    history_scroll: usize,
    message: Option<String>,
}

impl App {
    pub fn new(
        config: AppConfig,
        track: ExamTrack,
        quota: Box<dyn QuotaProvider>,
        results: Box<dyn ResultStorage>,
        mut ads: Box<dyn AdProvider>,
    ) -> Self {
        let bank = QuestionBank::load(&config.bank_dir, track);
        ads.load();
        Self::with_bank(config, bank, quota, results, ads)
    }

    pub fn with_bank(
        config: AppConfig,
        bank: QuestionBank,
        quota: Box<dyn QuotaProvider>,
        results: Box<dyn ResultStorage>,
        ads: Box<dyn AdProvider>,
    ) -> Self {
        Self {
            state: AppState::Landing,
            config,
            bank,
            quota,
            results,
            ads,
            session: None,
            session_epoch: 0,
            pending_reward: None,
            pending_mode: None,
            selected_option: 0,
            history_scroll: 0,
            message: None,
        }
    }

    pub fn track(&self) -> ExamTrack {
        self.bank.track()
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn session_epoch(&self) -> u64 {
        self.session_epoch
    }

    pub fn selected_option(&self) -> usize {
        self.selected_option
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn history_scroll(&self) -> usize {
        self.history_scroll
    }

    pub fn pending_mode(&self) -> Option<QuizMode> {
        self.pending_mode
    }

    pub fn is_watching_ad(&self) -> bool {
        self.pending_reward.is_some()
    }

    pub fn mode_config(&self, mode: QuizMode) -> ModeConfig {
        self.config.mode(mode)
    }

    pub fn ad_ready(&self) -> bool {
        self.ads.is_loaded()
    }

    pub fn remaining_attempts(&mut self) -> u32 {
        self.quota.remaining_attempts()
    }

    pub fn time_until_reset(&mut self) -> String {
        self.quota.time_until_reset()
    }

    pub fn clock_running(&self) -> bool {
        self.state == AppState::Quiz && self.session.as_ref().is_some_and(|s| s.is_clock_running())
    }

    /// Starts a quiz if an attempt is left; otherwise offers an ad.
    pub fn start_quiz(&mut self, mode: QuizMode) {
        if self.bank.is_empty() {
            self.message = Some("No questions available for this exam".to_string());
            return;
        }
        if !self.quota.can_start_quiz() {
            info!(target: "app", mode = ?mode, "Out of attempts; offering ad");
            self.offer_ad(mode);
            return;
        }
        self.quota.use_attempt();
        self.begin_session(mode);
    }

    fn begin_session(&mut self, mode: QuizMode) {
        let mode_config = self.config.mode(mode);
        let questions = self
            .bank
            .sample(mode_config.question_count, &mut rand::thread_rng());
        self.session = Some(QuizSession::new(
            questions,
            mode,
            mode_config.time_limit_secs,
            self.bank.len(),
        ));
        self.session_epoch += 1;
        self.selected_option = 0;
        self.pending_mode = None;
        self.message = None;
        self.state = AppState::Quiz;
    }

    fn offer_ad(&mut self, mode: QuizMode) {
        self.pending_mode = Some(mode);
        self.message = None;
        self.state = AppState::AdOffer;
        self.ads.load();
    }

    pub fn watch_ad(&mut self) {
        if self.pending_reward.is_some() {
            return;
        }
        self.message = None;
        self.pending_reward = Some(RewardGate::request(self.ads.as_mut()));
    }

    /// Applies a finished ad view. A granted attempt is spent right away on
    /// the quiz that was refused.
    pub fn poll_reward(&mut self) {
        let Some(pending) = self.pending_reward.take() else {
            return;
        };
        match pending.try_resolve(self.quota.as_mut()) {
            Err(pending) => self.pending_reward = Some(pending),
            Ok(true) => {
                let mode = self.pending_mode.unwrap_or(QuizMode::Quick);
                self.quota.use_attempt();
                self.begin_session(mode);
            }
            Ok(false) => {
                self.message = Some("Ad not available right now. Try again shortly.".to_string());
                self.ads.load();
            }
        }
    }

    fn current_options(&self) -> Option<&[String]> {
        self.session
            .as_ref()
            .and_then(QuizSession::current_question)
            .map(|q: &QuizQuestion| q.options.as_slice())
    }

    pub fn select_next_option(&mut self) {
        if let Some(count) = self.current_options().map(<[String]>::len) {
            if count > 0 {
                self.selected_option = (self.selected_option + 1) % count;
            }
        }
    }

    pub fn select_previous_option(&mut self) {
        if let Some(count) = self.current_options().map(<[String]>::len) {
            if count > 0 {
                self.selected_option = (self.selected_option + count - 1) % count;
            }
        }
    }

    pub fn toggle_selected_option(&mut self) {
        let Some(option) = self
            .current_options()
            .and_then(|options| options.get(self.selected_option))
            .cloned()
        else {
            return;
        };
        if let Some(session) = self.session.as_mut() {
            session.toggle_option(&option);
        }
    }

    pub fn submit_answer(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.submit();
        }
    }

    pub fn next_question(&mut self) {
        let result = self.session.as_mut().and_then(QuizSession::advance);
        self.selected_option = 0;
        if let Some(result) = result {
            self.finish(result);
        }
    }

    pub fn tick(&mut self) {
        let result = self.session.as_mut().and_then(QuizSession::tick);
        if let Some(result) = result {
            self.finish(result);
        }
    }

    pub fn toggle_timer(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.toggle_timer();
        }
    }

    fn finish(&mut self, result: QuizResult) {
        self.results.save_result(&result);
        self.state = AppState::Result;
    }

    pub fn restart(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.restart(self.quota.as_mut()) {
            Ok(()) => {
                self.session_epoch += 1;
                self.selected_option = 0;
                self.message = None;
                self.state = AppState::Quiz;
            }
            Err(_) => {
                let mode = session.mode();
                warn!(target: "app", "Restart refused; out of attempts");
                self.offer_ad(mode);
            }
        }
    }

    pub fn switch_track(&mut self) {
        let track = self.bank.track().next();
        self.bank = QuestionBank::load(&self.config.bank_dir, track);
        self.message = None;
        info!(target: "app", track = track.bank_id(), questions = self.bank.len(), "Switched exam track");
    }

    pub fn show_history(&mut self) {
        self.history_scroll = 0;
        self.state = AppState::History;
    }

    /// Leaves any quiz or offer and drops the session. Ignored while an ad
    /// is playing, so its reward still lands.
    pub fn back_to_landing(&mut self) {
        if self.is_watching_ad() {
            debug!(target: "app", "Ad view in progress; staying on offer");
            return;
        }
        self.session = None;
        self.pending_mode = None;
        self.pending_reward = None;
        self.message = None;
        self.state = AppState::Landing;
    }

    pub fn history(&self) -> (Vec<QuizResult>, HistorySummary) {
        let results = self.results.fetch_results();
        let summary = HistorySummary::from_results(&results);
        (newest_first(results), summary)
    }

    pub fn scroll_history_down(&mut self) {
        let max_scroll = self.results.fetch_results().len().saturating_sub(1);
        self.history_scroll = (self.history_scroll + 1).min(max_scroll);
    }

    pub fn scroll_history_up(&mut self) {
        self.history_scroll = self.history_scroll.saturating_sub(1);
    }
}
