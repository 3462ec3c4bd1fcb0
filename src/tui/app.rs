//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Dispatch of API calls to the background worker
//! - Routing completions back to the owning orchestrator

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::http::HttpPredictionApi;
use crate::application::{
    BatchOrchestrator, MetadataKind, ModelOrchestrator, Phase, Probe, StatusOrchestrator,
};
use crate::config::ClientConfig;
use crate::ports::PredictionApi;

use super::ui::{
    batch::{render_batch, BatchView},
    dashboard::{render_dashboard, Overview},
    model::render_model,
    predict::{render_predict, PredictView},
    render_disclaimer,
};
use super::worker::{Completion, RequestWorker};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Predict,
    Batch,
    Model,
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,
    config: ClientConfig,
    /// `base_url` + prefix, shown on the dashboard.
    endpoint: String,
    worker: RequestWorker,
    status: StatusOrchestrator,
    predict: PredictView,
    batch: BatchView,
    model: ModelOrchestrator,
}

impl App {
    /// Create the application against the HTTP API described by `config`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api = HttpPredictionApi::new(&config)?;
        Ok(Self::with_api(config, Arc::new(api)))
    }

    /// Create the application with an injected API implementation.
    #[must_use]
    pub fn with_api(config: ClientConfig, api: Arc<dyn PredictionApi>) -> Self {
        let endpoint = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            config.endpoints.prefix()
        );
        Self {
            screen: Screen::Dashboard,
            should_quit: false,
            config,
            endpoint,
            worker: RequestWorker::new(api),
            status: StatusOrchestrator::new(),
            predict: PredictView::default(),
            batch: BatchView::default(),
            model: ModelOrchestrator::new(),
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        self.check_status();

        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        self.predict.form.clear_sensitive();
        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_worker();

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                let content_area = chunks[0];
                let disclaimer_area = chunks[1];

                match self.screen {
                    Screen::Dashboard => render_dashboard(
                        f,
                        content_area,
                        &self.status,
                        Overview {
                            endpoint: &self.endpoint,
                            last_prediction: self.predict.prediction.result(),
                            last_batch: self.batch.batch.summary(),
                        },
                    ),
                    Screen::Predict => render_predict(f, content_area, &self.predict),
                    Screen::Batch => render_batch(f, content_area, &self.batch),
                    Screen::Model => render_model(f, content_area, &self.model),
                }

                render_disclaimer(f, disclaimer_area);
            })?;

            // Short poll to stay responsive to worker completions
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Apply every finished request. Stale completions are dropped by the
    /// orchestrators.
    fn poll_worker(&mut self) {
        while let Some(done) = self.worker.try_recv() {
            match done {
                Completion::Status(probe, ticket, outcome) => {
                    self.status.resolve(probe, ticket, outcome);
                }
                Completion::Prediction(ticket, outcome) => {
                    self.predict.prediction.resolve(ticket, outcome);
                }
                Completion::Validation(ticket, outcome) => {
                    self.predict.screening.resolve(ticket, outcome);
                }
                Completion::Batch(ticket, outcome) => {
                    self.batch.batch.resolve(ticket, outcome);
                }
                Completion::BatchValidation(ticket, outcome) => {
                    self.batch.screening.resolve_batch(ticket, outcome);
                }
                Completion::ModelInfo(ticket, outcome) => {
                    self.model.resolve_info(ticket, outcome);
                }
                Completion::Metrics(ticket, outcome) => {
                    self.model.resolve_metrics(ticket, outcome);
                }
                Completion::Features(ticket, outcome) => {
                    self.model.resolve_features(ticket, outcome);
                }
                Completion::Reload(ticket, outcome) => {
                    if self.model.resolve_reload(ticket, outcome) {
                        self.fetch_model_metadata();
                    }
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::Predict => self.handle_predict_key(key),
            Screen::Batch => self.handle_batch_key(key, modifiers),
            Screen::Model => self.handle_model_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.screen = Screen::Predict;
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                self.screen = Screen::Batch;
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                if matches!(self.model.info().phase(), Phase::Idle) {
                    self.fetch_model_metadata();
                }
                self.screen = Screen::Model;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.check_status();
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_predict_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Up | KeyCode::BackTab => self.predict.form.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.predict.form.next_field(),
            KeyCode::Left => self.predict.form.cycle_choice(false),
            KeyCode::Right => self.predict.form.cycle_choice(true),
            KeyCode::Char('s') | KeyCode::Char('S') => self.predict.form.load_sample_data(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.predict.reset(),
            KeyCode::Char('v') | KeyCode::Char('V') => self.submit_validation(),
            KeyCode::Char(c) => self.predict.form.input_char(c),
            KeyCode::Backspace => self.predict.form.delete_char(),
            KeyCode::Delete => self.predict.form.clear_field(),
            KeyCode::Enter => self.submit_prediction(),
            _ => {}
        }
    }

    fn handle_batch_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('p') => self.submit_batch(),
                KeyCode::Char('v') => self.submit_batch_validation(),
                KeyCode::Char('e') => self.export_batch(),
                KeyCode::Char('r') => self.batch.reset(),
                KeyCode::Char('d') => self.batch.batch.dismiss_parse_error(),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Enter => {
                self.batch.load();
            }
            KeyCode::Char(c) => self.batch.input_char(c),
            KeyCode::Backspace => self.batch.delete_char(),
            _ => {}
        }
    }

    fn handle_model_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if !self.model.reload().is_loading() {
                    let ticket = self.model.begin_reload();
                    self.worker
                        .spawn(move |api| Completion::Reload(ticket, api.reload_model()));
                }
            }
            KeyCode::Char('f') | KeyCode::Char('F') => self.fetch_model_metadata(),
            _ => {}
        }
    }

    fn check_status(&mut self) {
        let ticket = self.status.begin(Probe::Health);
        self.worker
            .spawn(move |api| Completion::Status(Probe::Health, ticket, api.health()));
        let ticket = self.status.begin(Probe::Ready);
        self.worker
            .spawn(move |api| Completion::Status(Probe::Ready, ticket, api.ready()));
    }

    fn fetch_model_metadata(&mut self) {
        for kind in MetadataKind::ALL {
            let ticket = self.model.begin_fetch(kind);
            match kind {
                MetadataKind::Info => self
                    .worker
                    .spawn(move |api| Completion::ModelInfo(ticket, api.model_info())),
                MetadataKind::Metrics => self
                    .worker
                    .spawn(move |api| Completion::Metrics(ticket, api.model_metrics())),
                MetadataKind::Features => self
                    .worker
                    .spawn(move |api| Completion::Features(ticket, api.model_features())),
            }
        }
    }

    fn submit_prediction(&mut self) {
        let record = match self.predict.form.to_record() {
            Ok(record) => record,
            Err(errors) => {
                self.predict.form.errors = errors;
                return;
            }
        };
        match self.predict.prediction.submit(&record) {
            Ok((ticket, features)) => {
                self.predict.form.errors = Default::default();
                self.worker
                    .spawn(move |api| Completion::Prediction(ticket, api.predict(&features)));
            }
            Err(errors) => self.predict.form.errors = errors,
        }
    }

    fn submit_validation(&mut self) {
        let record = match self.predict.form.to_record() {
            Ok(record) => record,
            Err(errors) => {
                self.predict.form.errors = errors;
                return;
            }
        };
        match self.predict.screening.submit(&record) {
            Ok((ticket, features)) => {
                self.worker
                    .spawn(move |api| Completion::Validation(ticket, api.validate(&features)));
            }
            Err(errors) => self.predict.form.errors = errors,
        }
    }

    fn submit_batch(&mut self) {
        if let Some((ticket, records)) = self.batch.batch.submit_loaded() {
            self.batch.notice = None;
            self.worker
                .spawn(move |api| Completion::Batch(ticket, api.batch_predict(&records)));
        }
    }

    fn submit_batch_validation(&mut self) {
        let records = self.batch.batch.records().to_vec();
        if let Some(ticket) = self.batch.screening.submit_batch(records.len()) {
            self.worker.spawn(move |api| {
                Completion::BatchValidation(ticket, api.validate_batch(&records))
            });
        }
    }

    fn export_batch(&mut self) {
        let Some(result) = self.batch.batch.result() else {
            self.batch.notice = Some("Nothing to export yet".to_string());
            return;
        };
        self.batch.notice = Some(
            match BatchOrchestrator::export_to_dir(result, &self.config.export_dir) {
                Ok(path) => {
                    tracing::info!("Exported {} rows", result.len());
                    format!("Exported {} rows to {}", result.len(), path.display())
                }
                Err(e) => {
                    tracing::error!("Export failed: {}", e);
                    format!("Export failed: {e}")
                }
            },
        );
    }
}
