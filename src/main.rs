pub mod compare;
pub mod config;
pub mod logging;
pub mod provider;
pub mod runtime;
pub mod score;
pub mod session;
pub mod timer;
pub mod ui;

use std::error::Error;
use std::io::{self, stdin};
use std::sync::mpsc::Sender;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use tracing::{error, info};

use crate::config::{Config, ConfigStore, FileConfigStore};
use crate::provider::{BundledProvider, FixedTextProvider, GithubDirProvider, TextProvider};
use crate::runtime::{event_channel, spawn_key_reader, spawn_loader, spawn_ticker, AppEvent, TICK_RATE_MS};
use crate::session::{Phase, Session};
use crate::timer::TestDuration;

/// terminal typing speed test with remotely fetched passages
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Fetches a random practice passage, measures your typing against it character by character, and reports words per minute and accuracy when the countdown runs out or the text is finished."
)]
pub struct Cli {
    /// countdown length for the test
    #[clap(short = 'd', long, value_enum)]
    duration: Option<TestDuration>,

    /// custom reference text (skips the fetch entirely)
    #[clap(short = 't', long)]
    text: Option<String>,

    /// pull the passage from the bundled set instead of the network
    #[clap(long)]
    offline: bool,

    /// override the GitHub directory listing the passages come from
    #[clap(long)]
    listing_url: Option<String>,
}

impl Cli {
    fn make_provider(&self) -> Result<Box<dyn TextProvider + Send>, provider::FetchError> {
        if let Some(ref text) = self.text {
            return Ok(Box::new(FixedTextProvider(text.clone())));
        }
        if self.offline {
            return Ok(Box::new(BundledProvider));
        }
        let provider = match self.listing_url {
            Some(ref url) => GithubDirProvider::with_listing_url(url)?,
            None => GithubDirProvider::new()?,
        };
        Ok(Box::new(provider))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Loading,
    Typing,
    Results,
    LoadFailed(String),
}

#[derive(Debug)]
pub struct App {
    pub cli: Cli,
    pub session: Option<Session>,
    pub state: AppState,
    pub duration: TestDuration,
    /// Live input buffer; key events mutate it and the full value feeds the
    /// session's input-changed handler, recomputed from scratch each time.
    pub input_buffer: String,
}

impl App {
    pub fn new(cli: Cli, duration: TestDuration) -> Self {
        Self {
            cli,
            session: None,
            state: AppState::Loading,
            duration,
            input_buffer: String::new(),
        }
    }

    pub fn on_text_loaded(&mut self, result: Result<String, provider::FetchError>) {
        match result {
            Ok(text) => {
                info!(chars = text.chars().count(), "sample text loaded");
                self.session = Some(Session::new(text, self.duration));
                self.input_buffer.clear();
                self.state = AppState::Typing;
            }
            Err(e) => {
                error!(error = %e, "sample fetch failed");
                self.state = AppState::LoadFailed(e.to_string());
            }
        }
    }

    fn sync_results_state(&mut self) {
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.is_completed())
        {
            if let Some(s) = &self.session {
                let score = s.score();
                info!(
                    reason = ?s.end_reason(),
                    wpm = score.wpm,
                    accuracy = score.accuracy,
                    "session completed"
                );
            }
            self.state = AppState::Results;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let saved = store.load();
    let duration = cli.duration.unwrap_or(saved.duration);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli, duration);
    let run = run_app(&mut terminal, &mut app, &store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run
}

#[derive(Debug)]
enum ExitType {
    Restart,
    New,
    Quit,
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &FileConfigStore,
) -> Result<(), Box<dyn Error>> {
    let (tx, rx) = event_channel();
    spawn_key_reader(tx.clone());
    spawn_ticker(tx.clone(), Duration::from_millis(TICK_RATE_MS));
    start_fetch(&tx, app)?;

    loop {
        terminal.draw(|f| draw(app, f))?;

        let exit_type = match rx.recv()? {
            AppEvent::TextLoaded(result) => {
                app.on_text_loaded(result);
                None
            }
            AppEvent::Tick => {
                if let Some(session) = app.session.as_mut() {
                    if session.phase() == Phase::Running {
                        session.on_tick();
                        app.sync_results_state();
                    }
                }
                None
            }
            AppEvent::Resize => None,
            AppEvent::Key(key) => handle_key(app, store, key),
        };

        match exit_type {
            Some(ExitType::Quit) => break,
            Some(ExitType::Restart) => {
                let reference = app
                    .session
                    .as_ref()
                    .map(|s| s.reference().to_string());
                if let Some(text) = reference {
                    app.session = Some(Session::new(text, app.duration));
                    app.input_buffer.clear();
                    app.state = AppState::Typing;
                }
            }
            Some(ExitType::New) => {
                app.session = None;
                app.input_buffer.clear();
                app.state = AppState::Loading;
                start_fetch(&tx, app)?;
            }
            None => {}
        }
    }

    Ok(())
}

fn start_fetch(tx: &Sender<AppEvent>, app: &App) -> Result<(), Box<dyn Error>> {
    let provider = app.cli.make_provider()?;
    spawn_loader(tx.clone(), provider);
    Ok(())
}

fn handle_key(
    app: &mut App,
    store: &FileConfigStore,
    key: crossterm::event::KeyEvent,
) -> Option<ExitType> {
    if key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
    {
        return Some(ExitType::Quit);
    }

    match app.state {
        AppState::Loading | AppState::LoadFailed(_) => None,
        AppState::Typing => {
            let idle = app
                .session
                .as_ref()
                .is_some_and(|s| s.phase() == Phase::Idle);

            match key.code {
                // Duration can only change before the first keystroke.
                KeyCode::Tab if idle => {
                    let next = app.duration.next();
                    app.duration = next;
                    if let Some(session) = app.session.as_mut() {
                        session.set_duration(next);
                    }
                    let _ = store.save(&Config {
                        duration: next,
                        offline: app.cli.offline,
                    });
                    None
                }
                KeyCode::Enter => {
                    if let Some(session) = app.session.as_mut() {
                        session.on_submit();
                        app.sync_results_state();
                    }
                    None
                }
                KeyCode::Backspace => {
                    app.input_buffer.pop();
                    let buffer = app.input_buffer.clone();
                    if let Some(session) = app.session.as_mut() {
                        session.on_input_changed(&buffer);
                        app.sync_results_state();
                    }
                    None
                }
                KeyCode::Char(c) => {
                    app.input_buffer.push(c);
                    let buffer = app.input_buffer.clone();
                    if let Some(session) = app.session.as_mut() {
                        session.on_input_changed(&buffer);
                        app.sync_results_state();
                    }
                    None
                }
                _ => None,
            }
        }
        AppState::Results => match key.code {
            KeyCode::Char('r') => Some(ExitType::Restart),
            KeyCode::Char('n') => Some(ExitType::New),
            _ => None,
        },
    }
}

fn draw(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}
