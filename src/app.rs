use std::time::{Duration, Instant};

use alloy_primitives::Address;
use chrono::{DateTime, Local};

use crate::config::{Config, NetworkConfig, ARC_TESTNET};
use crate::domain::contract::{build_descriptor, FunctionDescriptor, FunctionKind, FunctionSelector};
use crate::domain::submission::{short_message, SubmissionPhase, SubmissionState};
use crate::modules::submit::SubmitRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Contract,
    Function,
    Greeting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

/// Wallet connection as seen by the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletStatus {
    Disconnected,
    Connecting,
    Connected {
        account: Address,
        balance: Option<String>,
    },
}

/// One submission made during this session
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub submitted_at: DateTime<Local>,
    pub contract: String,
    pub call: String,
    pub state: SubmissionState,
}

impl HistoryEntry {
    pub fn block_number(&self) -> Option<u64> {
        match self.state {
            SubmissionState::Confirmed { block_number, .. } => block_number,
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub network: &'static NetworkConfig,
    pub wallet: WalletStatus,
    /// How the wallet signs, e.g. "local key"
    pub connector: String,
    pub contract_input: String,
    pub function: FunctionKind,
    pub argument_input: String,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub submission: SubmissionState,
    pub history: Vec<HistoryEntry>,
    pub selected_history: usize,
    /// Wallet waits for an in-TUI approval before signing
    pub requires_approval: bool,
    pub status: Option<StatusMessage>,
    pub help_open: bool,
    pub should_quit: bool,
    pending_copy: Option<String>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            network: &ARC_TESTNET,
            wallet: WalletStatus::Disconnected,
            connector: String::new(),
            contract_input: config.contract.trim().to_string(),
            function: config.function,
            argument_input: config.greeting.clone(),
            focus: Focus::Contract,
            input_mode: InputMode::Normal,
            submission: SubmissionState::Idle,
            history: Vec::new(),
            selected_history: 0,
            requires_approval: config.confirm_before_sign,
            status: None,
            help_open: false,
            should_quit: false,
            pending_copy: None,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > Duration::from_secs(3) {
                self.status = None;
            }
        }
    }

    // -- wallet ---------------------------------------------------------

    pub fn is_connected(&self) -> bool {
        matches!(self.wallet, WalletStatus::Connected { .. })
    }

    pub fn account(&self) -> Option<Address> {
        match &self.wallet {
            WalletStatus::Connected { account, .. } => Some(*account),
            _ => None,
        }
    }

    /// Returns false when a connect is pointless (already connected or pending)
    pub fn begin_connect(&mut self) -> bool {
        if self.wallet != WalletStatus::Disconnected {
            return false;
        }
        self.wallet = WalletStatus::Connecting;
        true
    }

    pub fn on_connected(&mut self, account: Address, balance: Option<String>) {
        self.wallet = WalletStatus::Connected { account, balance };
        self.set_status(format!("Connected {}", short_addr(&account)), StatusLevel::Info);
    }

    pub fn on_connect_failed(&mut self, message: &str) {
        self.wallet = WalletStatus::Disconnected;
        self.set_status(format!("Error: {}", short_message(message)), StatusLevel::Error);
    }

    pub fn on_disconnected(&mut self) {
        self.wallet = WalletStatus::Disconnected;
        self.set_status("Wallet disconnected", StatusLevel::Info);
    }

    pub fn on_balance(&mut self, display: String) {
        if let WalletStatus::Connected { balance, .. } = &mut self.wallet {
            *balance = Some(display);
        }
    }

    /// Header text for the wallet button
    pub fn wallet_label(&self) -> String {
        match &self.wallet {
            WalletStatus::Disconnected => "Connect Wallet".to_string(),
            WalletStatus::Connecting => "Connecting...".to_string(),
            WalletStatus::Connected { account, balance } => match balance {
                Some(balance) => format!("{}  {}", short_addr(account), balance),
                None => short_addr(account),
            },
        }
    }

    // -- form -----------------------------------------------------------

    pub fn selector(&self) -> FunctionSelector {
        self.function.with_argument(&self.argument_input)
    }

    pub fn descriptor(&self) -> FunctionDescriptor {
        build_descriptor(&self.selector())
    }

    pub fn show_greeting(&self) -> bool {
        self.function.takes_argument()
    }

    pub fn hint(&self) -> &'static str {
        if self.function.takes_argument() {
            "Use a HelloArchitect contract address for setGreeting."
        } else {
            "Use a faucet contract address for gm / faucet / drip / claim."
        }
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        let order: &[Focus] = if self.show_greeting() {
            &[Focus::Contract, Focus::Function, Focus::Greeting]
        } else {
            &[Focus::Contract, Focus::Function]
        };
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (idx + 1) % order.len()
        } else {
            (idx + order.len() - 1) % order.len()
        };
        self.focus = order[next];
        self.input_mode = InputMode::Normal;
    }

    pub fn cycle_function(&mut self, forward: bool) {
        self.function = self.function.cycle(forward);
        if self.focus == Focus::Greeting && !self.show_greeting() {
            self.focus = Focus::Function;
            self.input_mode = InputMode::Normal;
        }
    }

    /// Enter edit mode if a text field is focused
    pub fn start_editing(&mut self) -> bool {
        if matches!(self.focus, Focus::Contract | Focus::Greeting) {
            self.input_mode = InputMode::Editing;
            true
        } else {
            false
        }
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    fn focused_input(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Contract => Some(&mut self.contract_input),
            Focus::Greeting => Some(&mut self.argument_input),
            Focus::Function => None,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(input) = self.focused_input() {
            input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(input) = self.focused_input() {
            input.pop();
        }
    }

    // -- submission -----------------------------------------------------

    /// Submit is disabled while disconnected, with an empty address or
    /// while a submission is in flight.
    pub fn can_submit(&self) -> bool {
        self.is_connected() && !self.contract_input.trim().is_empty() && !self.submission.is_busy()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.submission.is_busy() {
            "Sending..."
        } else if self.function.takes_argument() {
            "Set greeting"
        } else {
            "GM"
        }
    }

    /// Start a submission if allowed, recording it in the history
    pub fn begin_submission(&mut self) -> Option<SubmitRequest> {
        if !self.can_submit() {
            let reason = if !self.is_connected() {
                "Connect a wallet first (c)"
            } else if self.submission.is_busy() {
                "A submission is already in flight"
            } else {
                "Enter a contract address"
            };
            self.set_status(reason, StatusLevel::Warn);
            return None;
        }

        let request = SubmitRequest {
            contract_address: self.contract_input.trim().to_string(),
            selector: self.selector(),
        };

        self.submission.reset();
        self.submission.begin();
        self.history.push(HistoryEntry {
            submitted_at: Local::now(),
            contract: request.contract_address.clone(),
            call: request.selector.to_string(),
            state: self.submission.clone(),
        });
        self.selected_history = self.history.len() - 1;
        Some(request)
    }

    /// Mirror a state reported by the worker
    pub fn apply_submission(&mut self, state: SubmissionState) {
        match state.phase() {
            SubmissionPhase::Confirmed => self.set_status("Transaction confirmed", StatusLevel::Info),
            SubmissionPhase::Failed => {
                if let Some(error) = state.error() {
                    self.set_status(format!("Error: {}", short_message(error)), StatusLevel::Error);
                }
            }
            _ => {}
        }
        if let Some(entry) = self.history.last_mut() {
            entry.state = state.clone();
        }
        self.submission = state;
    }

    /// Signature prompt is visible
    pub fn awaiting_approval(&self) -> bool {
        self.requires_approval && self.submission.phase() == SubmissionPhase::AwaitingSignature
    }

    /// Lines for the status area, derived from the current state only
    pub fn status_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(tx_hash) = self.submission.transaction_id() {
            lines.push(format!("tx: {tx_hash}"));
        }
        match &self.submission {
            SubmissionState::Confirmed { .. } => lines.push("Transaction confirmed".to_string()),
            SubmissionState::Failed { error, .. } => {
                lines.push(format!("Error: {}", short_message(error)));
            }
            _ => {}
        }
        lines
    }

    pub fn select_history(&mut self, forward: bool) {
        if self.history.is_empty() {
            return;
        }
        let last = self.history.len() - 1;
        self.selected_history = if forward {
            (self.selected_history + 1).min(last)
        } else {
            self.selected_history.saturating_sub(1)
        };
    }

    /// Hash to copy: current submission first, else the selected history row
    pub fn copy_target(&self) -> Option<String> {
        self.submission
            .transaction_id()
            .or_else(|| {
                self.history
                    .get(self.selected_history)
                    .and_then(|entry| entry.state.transaction_id())
            })
            .map(|hash| hash.to_string())
    }

    /// Apply an action returned by a module
    pub fn apply_action(&mut self, action: crate::core::Action) {
        use crate::core::{Action, NotifyLevel};

        match action {
            Action::None => {}
            Action::Copy(text) => self.pending_copy = Some(text),
            Action::Notify(msg, level) => {
                let level = match level {
                    NotifyLevel::Info => StatusLevel::Info,
                    NotifyLevel::Warn => StatusLevel::Warn,
                    NotifyLevel::Error => StatusLevel::Error,
                };
                self.set_status(msg, level);
            }
            Action::Quit => self.should_quit = true,
        }
    }

    pub fn take_copy_request(&mut self) -> Option<String> {
        self.pending_copy.take()
    }
}

/// `0x1234…abcd`
pub fn short_addr(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}
