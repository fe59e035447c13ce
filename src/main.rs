mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use furitype::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{CrosstermEventSource, Runner, TrainerEvent},
    session::{self, PracticeSession},
    word::{Dictionary, DictionaryError, Word},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn};

const TICK_RATE_MS: u64 = 100;

/// furigana typing practice in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type Japanese words in romaji while their furigana readings light up mora by mora."
)]
pub struct Cli {
    /// bundled dictionary to practice
    #[clap(short = 'd', long)]
    dictionary: Option<String>,

    /// number of words to practice (0 for the whole dictionary)
    #[clap(short = 'w', long)]
    number_of_words: Option<usize>,

    /// custom word to type, in romaji
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// furigana notation for the custom word, e.g. "日(に)本(ほん)"
    #[clap(short = 'n', long, requires = "prompt")]
    notation: Option<String>,

    /// present words in dictionary order
    #[clap(long)]
    in_order: bool,

    /// treat upper and lower case as different keys
    #[clap(long)]
    case_sensitive: bool,

    /// milliseconds a wrong keystroke stays on screen
    #[clap(long)]
    pause_ms: Option<u64>,

    /// seed for word order and letter hints
    #[clap(long)]
    seed: Option<u64>,

    /// write completion records as json when the session ends
    #[clap(long)]
    export: Option<PathBuf>,

    /// list bundled dictionaries and exit
    #[clap(long)]
    list: bool,
}

impl Cli {
    /// Command line flags win over the stored config.
    fn apply_to(&self, cfg: &mut Config) {
        if let Some(dictionary) = &self.dictionary {
            cfg.dictionary = dictionary.clone();
        }
        if let Some(n) = self.number_of_words {
            cfg.number_of_words = n;
        }
        if self.in_order {
            cfg.random_order = false;
        }
        if self.case_sensitive {
            cfg.ignore_case = false;
        }
        if let Some(ms) = self.pause_ms {
            cfg.wrong_pause_ms = ms;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
    }

    fn custom_word(&self) -> Option<Word> {
        self.prompt
            .as_ref()
            .map(|p| Word::new(p.as_str(), self.notation.as_deref()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

pub struct App {
    config: Config,
    custom: Option<Word>,
    words: Vec<Word>,
    export: Option<PathBuf>,
    session: PracticeSession,
    state: AppState,
}

impl App {
    pub fn new(cli: &Cli, config: Config) -> Result<Self, DictionaryError> {
        let custom = cli.custom_word();
        let words = load_words(custom.as_ref(), &config)?;
        let mut app = Self::with_words(config, words);
        app.custom = custom;
        app.export = cli.export.clone();
        Ok(app)
    }

    pub fn with_words(config: Config, words: Vec<Word>) -> Self {
        Self {
            session: PracticeSession::new(words.clone(), &config),
            config,
            custom: None,
            words,
            export: None,
            state: AppState::Typing,
        }
    }

    /// Starts over, on the same words or on a fresh selection.
    pub fn reset(&mut self, fresh: bool) {
        if fresh {
            match load_words(self.custom.as_ref(), &self.config) {
                Ok(words) => self.words = words,
                Err(err) => warn!(%err, "keeping previous words"),
            }
        }
        self.session = PracticeSession::new(self.words.clone(), &self.config);
        self.state = AppState::Typing;
    }

    fn finish(&mut self) {
        self.state = AppState::Results;
        let summary = self.session.summary();
        info!(?summary, "session results");

        if let Some(path) = &self.export {
            let written = serde_json::to_vec_pretty(self.session.records())
                .map_err(io::Error::from)
                .and_then(|data| fs::write(path, data));
            if let Err(err) = written {
                warn!(path = %path.display(), %err, "could not export records");
            }
        }
    }
}

fn load_words(custom: Option<&Word>, config: &Config) -> Result<Vec<Word>, DictionaryError> {
    if let Some(word) = custom {
        return Ok(vec![word.clone()]);
    }
    let dictionary = Dictionary::bundled(&config.dictionary)?;
    Ok(session::select_words(&dictionary, config))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list {
        for name in Dictionary::bundled_names() {
            println!("{name}");
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _guard = logging::init_tracing(&AppDirs::log_dir());

    let mut config = FileConfigStore::new().load();
    cli.apply_to(&mut config);

    let mut app = match App::new(&cli, config) {
        Ok(app) => app,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, err).exit();
        }
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    start_tui(&mut terminal, &mut app)?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitType {
    Restart,
    New,
    Quit,
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    loop {
        terminal.draw(|f| ui(app, f))?;

        match handle_event(app, &runner.step()) {
            Some(ExitType::Restart) => app.reset(false),
            Some(ExitType::New) => app.reset(true),
            Some(ExitType::Quit) => break,
            None => {}
        }
    }

    Ok(())
}

fn handle_event(app: &mut App, event: &TrainerEvent) -> Option<ExitType> {
    if let TrainerEvent::Key(key) = event {
        match key.code {
            KeyCode::Esc => return Some(ExitType::Quit),
            // ctrl+c to quit
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(ExitType::Quit)
            }
            _ => {}
        }

        match (app.state, key.code) {
            (AppState::Typing, KeyCode::Left) | (AppState::Results, KeyCode::Char('r')) => {
                return Some(ExitType::Restart)
            }
            (AppState::Typing, KeyCode::Right) | (AppState::Results, KeyCode::Char('n')) => {
                return Some(ExitType::New)
            }
            (AppState::Typing, KeyCode::Tab) => {
                app.session.skip();
            }
            (AppState::Typing, _) => {
                event.feed(&mut app.session);
            }
            (AppState::Results, _) => {}
        }
    } else if app.state == AppState::Typing {
        event.feed(&mut app.session);
    }

    if app.state == AppState::Typing && app.session.is_finished() {
        app.finish();
    }

    None
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
