use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use arcpoke::app::{App, Focus, InputMode, StatusLevel};
use arcpoke::config::{self, Config, ARC_TESTNET};
use arcpoke::core::{Action, NotifyLevel};
use arcpoke::domain::submission::{SubmissionError, SubmissionState};
use arcpoke::infrastructure::runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
use arcpoke::infrastructure::wallet::{AlloyWallet, WalletSettings};
use arcpoke::modules::export;
use arcpoke::{logging, ui};

#[derive(Debug, Parser)]
#[command(
    name = "arcpoke",
    version,
    about = "arcpoke: send gm / faucet / drip / claim / setGreeting to Arc Testnet contracts"
)]
struct Args {
    /// Contract address to prefill (overrides the config file)
    #[arg(long)]
    contract: Option<String>,

    /// Hex private key for the local signer
    #[arg(long)]
    private_key: Option<String>,

    /// Send through node-managed accounts (eth_sendTransaction)
    #[arg(long)]
    unlocked: bool,

    /// Sign without the in-terminal confirmation prompt
    #[arg(long)]
    no_prompt: bool,
}

impl Args {
    fn merge_into(self, config: &mut Config) {
        if let Some(contract) = self.contract {
            config.contract = contract;
        }
        if let Some(key) = self.private_key {
            config.private_key = Some(key);
        }
        config.unlocked |= self.unlocked;
        if self.no_prompt {
            config.confirm_before_sign = false;
        }
    }
}

fn wallet_settings(config: &Config) -> WalletSettings {
    WalletSettings {
        private_key: config.private_key().map(str::to_string),
        unlocked: config.unlocked,
        confirm_before_sign: config.confirm_before_sign,
        confirmations: config.confirmations.max(1),
        confirmation_timeout: Duration::from_secs(config.confirmation_timeout_secs),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = config::load();
    args.merge_into(&mut config);

    let log_file = logging::init();

    // Fail on a bad key before touching the terminal
    let wallet = AlloyWallet::new(&ARC_TESTNET, wallet_settings(&config))?;

    let mut app = App::new(&config);
    app.connector = wallet.connector_label().to_string();
    app.requires_approval = wallet.requires_approval();
    match &log_file {
        Ok(path) => tracing::info!(log = %path.display(), network = %ARC_TESTNET.display(), "arcpoke starting"),
        Err(err) => app.set_status(format!("Logging disabled: {err}"), StatusLevel::Warn),
    }

    let runtime = RuntimeBridge::new(wallet)?;

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
        tracing::error!("{err:?}");
        eprintln!("{err:?}");
    }

    Ok(())
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
                handle_key(&mut app, key, &runtime);
            }
        }

        if let Some(text) = app.take_copy_request() {
            copy_to_clipboard(&mut app, text);
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::Connected { account, balance } => app.on_connected(account, balance),
            RuntimeEvent::ConnectFailed { message } => app.on_connect_failed(&message),
            RuntimeEvent::Disconnected => app.on_disconnected(),
            RuntimeEvent::Balance { display } => app.on_balance(display),
            RuntimeEvent::Submission(state) => app.apply_submission(state),
            RuntimeEvent::Error { message } => app.set_status(message, StatusLevel::Error),
        }
    }
}

fn send(app: &mut App, runtime: &RuntimeBridge, cmd: RuntimeCommand) {
    if let Err(err) = runtime.send(cmd) {
        app.set_status(err.to_string(), StatusLevel::Error);
    }
}

fn handle_key(app: &mut App, key: KeyEvent, runtime: &RuntimeBridge) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.help_open = false;
        }
        return;
    }

    if app.awaiting_approval() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                send(app, runtime, RuntimeCommand::ApproveSignature { approved: true });
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                send(app, runtime, RuntimeCommand::ApproveSignature { approved: false });
            }
            _ => {}
        }
        return;
    }

    match app.input_mode {
        InputMode::Editing => handle_editing_mode(app, key),
        InputMode::Normal => handle_normal_mode(app, key, runtime),
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.stop_editing(),
        KeyCode::Tab => app.cycle_focus(true),
        KeyCode::BackTab => app.cycle_focus(false),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Char(c) => app.push_char(c),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent, runtime: &RuntimeBridge) {
    match key.code {
        KeyCode::Char('q') => app.apply_action(Action::Quit),
        KeyCode::Char('?') => app.help_open = true,
        KeyCode::Tab => app.cycle_focus(true),
        KeyCode::BackTab => app.cycle_focus(false),
        KeyCode::Char('i') => {
            app.start_editing();
        }
        KeyCode::Enter => {
            if app.focus == Focus::Function {
                submit(app, runtime);
            } else {
                app.start_editing();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.cycle_function(false),
        KeyCode::Down | KeyCode::Char('j') => app.cycle_function(true),
        KeyCode::Char('[') => app.select_history(false),
        KeyCode::Char(']') => app.select_history(true),
        KeyCode::Char('s') => submit(app, runtime),
        KeyCode::Char('c') => {
            if app.begin_connect() {
                send(app, runtime, RuntimeCommand::Connect);
            }
        }
        KeyCode::Char('d') => {
            if app.is_connected() {
                send(app, runtime, RuntimeCommand::Disconnect);
            }
        }
        KeyCode::Char('r') => {
            if app.is_connected() {
                send(app, runtime, RuntimeCommand::RefreshBalance);
            }
        }
        KeyCode::Char('y') => {
            let action = match app.copy_target() {
                Some(hash) => Action::Copy(hash),
                None => Action::Notify("Nothing to copy".to_string(), NotifyLevel::Warn),
            };
            app.apply_action(action);
        }
        KeyCode::Char('e') => {
            let action = export::export_history(app);
            app.apply_action(action);
        }
        _ => {}
    }
}

fn submit(app: &mut App, runtime: &RuntimeBridge) {
    let Some(request) = app.begin_submission() else {
        return;
    };
    if let Err(err) = runtime.send(RuntimeCommand::Submit(request)) {
        app.apply_submission(SubmissionState::Failed {
            tx_hash: None,
            error: SubmissionError::network(err),
        });
    }
}

fn copy_to_clipboard(app: &mut App, text: String) {
    use arboard::Clipboard;

    match Clipboard::new() {
        Ok(mut clipboard) => {
            if clipboard.set_text(&text).is_ok() {
                app.set_status(format!("Copied: {text}"), StatusLevel::Info);
            } else {
                app.set_status("Failed to copy to clipboard", StatusLevel::Error);
            }
        }
        Err(_) => {
            app.set_status("Clipboard not available", StatusLevel::Error);
        }
    }
}
