use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use tokenwatch::app::{App, Focus, InputMode, PromptKind, Screen, StatusLevel};
use tokenwatch::config;
use tokenwatch::infrastructure::{RuntimeBridge, RuntimeCommand, WorkerSettings};
use tokenwatch::store::SqliteStore;
use tokenwatch::ui;

#[derive(Debug, Parser)]
#[command(
    name = "tokenwatch",
    version,
    about = "tokenwatch: a terminal wallet and ERC-721 watchlist"
)]
struct Args {
    /// HTTP JSON-RPC endpoint offered on the login screen (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// Config file (defaults to ~/.config/tokenwatch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the store, keystore and log file
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match args.config.clone() {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| config.data_dir())
        .context("cannot determine a data directory; pass --data-dir")?;
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("cannot create {}", data_dir.display()))?;

    init_logging(&config::log_path(&data_dir))?;
    tracing::info!(data_dir = %data_dir.display(), "starting tokenwatch");

    let store_path = config::store_db_path(&data_dir);
    let store = SqliteStore::open(&store_path)
        .with_context(|| format!("cannot open store {}", store_path.display()))?;

    let runtime = RuntimeBridge::new(WorkerSettings {
        keystore_dir: config.keystore_dir(&data_dir),
        metadata_timeout: config.metadata_timeout(),
    })?;

    let mut app = App::new(Box::new(store), &config.default_rpc());
    if let Some(rpc) = args.rpc.as_deref() {
        app.login.node_url = config::normalize_http_endpoint(rpc);
    }

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("{err:#}");
        eprintln!("{err:?}");
    }

    Ok(())
}

/// stdout belongs to the terminal UI, so logs go to a file.
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let filter =
        EnvFilter::try_from_env("TOKENWATCH_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("cannot install logger: {err}"))
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        pump_background(&mut app, &runtime);
    }
}

/// Apply worker events, then hand queued commands to the worker.
fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        app.apply_runtime_event(event);
    }
    for cmd in app.take_commands() {
        if let Err(err) = runtime.send(cmd) {
            tracing::error!("{err:#}");
            app.set_status(format!("{err:#}"), StatusLevel::Error);
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal if app.screen == Screen::Login => handle_login_mode(app, key),
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
        InputMode::Prompt(kind) => handle_prompt_mode(app, key, kind),
    }
}

fn handle_login_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_login(),
        KeyCode::Tab | KeyCode::Down => app.login.next_field(),
        KeyCode::Backspace => app.login.pop(),
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char(ch) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL) {
                app.login.push(ch);
            }
        }
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.help_open = true,
        KeyCode::Char(':') | KeyCode::Char('/') => app.enter_command(),
        KeyCode::Char('1') => app.navigate(Screen::Wallet),
        KeyCode::Char('2') => app.navigate(Screen::Watchlist),
        KeyCode::Char('3') => app.navigate(Screen::Details),
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(false),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(true),
        KeyCode::Esc => {
            if !app.state.error.is_empty() {
                app.state.dismiss_error();
            } else if app.screen == Screen::Details {
                app.navigate(Screen::Watchlist);
            }
        }
        _ if app.focus == Focus::Transactions => {
            if key.code == KeyCode::Char('d') {
                app.remove_selected_transaction();
            }
        }
        code => match app.screen {
            Screen::Wallet => handle_wallet_key(app, code),
            Screen::Watchlist => handle_watchlist_key(app, code),
            Screen::Details => handle_details_key(app, code),
            Screen::Login => {}
        },
    }
}

fn handle_wallet_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('i') => app.enter_prompt(PromptKind::ImportKey, String::new()),
        KeyCode::Char('p') | KeyCode::Enter => app.set_selected_primary(),
        KeyCode::Char('d') => app.confirm_remove_selected_account(),
        _ => {}
    }
}

fn handle_watchlist_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('a') => app.enter_prompt(PromptKind::AddContract, String::new()),
        KeyCode::Char('d') => app.remove_selected_token(),
        KeyCode::Enter => {
            if let Some(key) = app.selected_token_key() {
                app.open_details(key);
            }
        }
        _ => {}
    }
}

fn handle_details_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('t') => app.enter_prompt(PromptKind::SellTo, String::new()),
        KeyCode::Char('s') => app.sell(),
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}

fn handle_prompt_mode(app: &mut App, key: KeyEvent, kind: PromptKind) {
    match key.code {
        KeyCode::Esc => app.exit_prompt(),
        KeyCode::Enter => app.apply_prompt(kind),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}
