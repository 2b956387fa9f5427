//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! The TUI thread never awaits. Wallet operations run on a dedicated thread
//! that owns its own Tokio runtime; both sides talk over std channels.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use alloy_primitives::Address;
use anyhow::Context;
use tokio::runtime::Runtime;

use crate::domain::submission::SubmissionState;
use crate::infrastructure::runtime::worker::run_async_worker;
use crate::infrastructure::wallet::WalletSession;
use crate::modules::submit::SubmitRequest;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Resolve the wallet account
    Connect,
    /// Forget the wallet account
    Disconnect,
    /// Start a submission
    Submit(SubmitRequest),
    /// Answer the signature prompt
    ApproveSignature { approved: bool },
    /// Re-fetch the connected account's balance
    RefreshBalance,
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Wallet connected
    Connected {
        account: Address,
        balance: Option<String>,
    },
    /// Wallet could not connect
    ConnectFailed { message: String },
    /// Wallet disconnected
    Disconnected,
    /// Fresh balance for the connected account
    Balance { display: String },
    /// Submission moved to a new state
    Submission(SubmissionState),
    /// Error occurred
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Spawn the worker thread around the given wallet
    pub fn new<W: WalletSession>(wallet: W) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        let rt = Runtime::new().context("Failed to create Tokio runtime")?;
        let wallet = Arc::new(wallet);

        thread::Builder::new()
            .name("arcpoke-worker".into())
            .spawn(move || {
                rt.block_on(async {
                    if let Err(err) = run_async_worker(wallet, cmd_rx, evt_tx.clone()).await {
                        tracing::error!("worker exited: {err:#}");
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })
            .context("Failed to spawn worker thread")?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        // Try to send shutdown command
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
