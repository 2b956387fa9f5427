//! Async worker - runs in Tokio runtime and drives the wallet

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::domain::submission::{SubmissionError, SubmissionPhase, SubmissionState};
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent};
use crate::infrastructure::wallet::WalletSession;
use crate::modules::submit::submit;

/// Run the async worker loop
pub async fn run_async_worker<W: WalletSession>(
    wallet: Arc<W>,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    // Lives exactly as long as the submission workflow, nothing after it
    let mut submission: Option<JoinHandle<()>> = None;

    // Command polling interval
    let mut poll_interval = interval(Duration::from_millis(50));

    tracing::info!(network = %wallet.network().display(), "worker started");

    loop {
        // Process commands (non-blocking)
        loop {
            let cmd = match cmd_rx.try_recv() {
                Ok(cmd) => cmd,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            };

            match cmd {
                RuntimeCommand::Shutdown => {
                    wallet.approvals().cancel();
                    tracing::info!("worker shutting down");
                    return Ok(());
                }

                RuntimeCommand::Connect => {
                    let wallet = Arc::clone(&wallet);
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        match wallet.connect().await {
                            Ok(account) => {
                                let balance = balance_display(wallet.as_ref()).await;
                                let _ = evt_tx.send(RuntimeEvent::Connected { account, balance });
                            }
                            Err(err) => {
                                tracing::warn!(%err, "connect failed");
                                let _ = evt_tx.send(RuntimeEvent::ConnectFailed {
                                    message: err.to_string(),
                                });
                            }
                        }
                    });
                }

                RuntimeCommand::Disconnect => {
                    wallet.disconnect().await;
                    let _ = evt_tx.send(RuntimeEvent::Disconnected);
                }

                RuntimeCommand::Submit(request) => {
                    if submission.as_ref().is_some_and(|task| !task.is_finished()) {
                        tracing::warn!(call = %request.selector, "submission refused: one already in flight");
                        // The app has already moved to AwaitingSignature for this request
                        let _ = evt_tx.send(RuntimeEvent::Submission(SubmissionState::Failed {
                            tx_hash: None,
                            error: SubmissionError::validation("A submission is already in flight"),
                        }));
                        continue;
                    }

                    let wallet = Arc::clone(&wallet);
                    let evt_tx = evt_tx.clone();
                    submission = Some(tokio::spawn(async move {
                        let observer_tx = evt_tx.clone();
                        let final_state = submit(wallet.as_ref(), wallet.network(), request, move |state| {
                            let _ = observer_tx.send(RuntimeEvent::Submission(state.clone()));
                        })
                        .await;

                        if final_state.phase() == SubmissionPhase::Confirmed {
                            spawn_balance_refresh(wallet, evt_tx);
                        }
                    }));
                }

                RuntimeCommand::ApproveSignature { approved } => {
                    if !wallet.approvals().resolve(approved) {
                        tracing::debug!(approved, "no signature request pending");
                    }
                }

                RuntimeCommand::RefreshBalance => {
                    spawn_balance_refresh(Arc::clone(&wallet), evt_tx.clone());
                }
            }
        }

        poll_interval.tick().await;
    }
}

fn spawn_balance_refresh<W: WalletSession>(wallet: Arc<W>, evt_tx: Sender<RuntimeEvent>) {
    tokio::spawn(async move {
        if let Some(display) = balance_display(wallet.as_ref()).await {
            let _ = evt_tx.send(RuntimeEvent::Balance { display });
        }
    });
}

/// Formatted native balance, or None when unavailable
async fn balance_display<W: WalletSession>(wallet: &W) -> Option<String> {
    match wallet.balance().await {
        Ok(Some(raw)) => Some(wallet.network().format_balance(raw)),
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(%err, "balance fetch failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::Mutex;

    use alloy_primitives::{address, Address, TxHash, U256};

    use super::*;
    use crate::config::{NetworkConfig, ARC_TESTNET};
    use crate::domain::contract::FunctionSelector;
    use crate::infrastructure::wallet::{
        SignatureApprovals, TxOutcome, WalletClient, WriteContract,
    };
    use crate::modules::submit::SubmitRequest;

    const ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    /// Wallet that always asks for approval before "sending"
    struct PromptingWallet {
        approvals: SignatureApprovals,
        connect_error: Option<SubmissionError>,
        account: Mutex<Option<Address>>,
    }

    impl PromptingWallet {
        fn new() -> Self {
            Self {
                approvals: SignatureApprovals::new(),
                connect_error: None,
                account: Mutex::new(None),
            }
        }

        fn offline() -> Self {
            Self {
                connect_error: Some(SubmissionError::connection("Cannot reach node")),
                ..Self::new()
            }
        }
    }

    #[async_trait::async_trait]
    impl WalletClient for PromptingWallet {
        async fn connect(&self) -> Result<Address, SubmissionError> {
            if let Some(err) = &self.connect_error {
                return Err(err.clone());
            }
            *self.account.lock().unwrap() = Some(ACCOUNT);
            Ok(ACCOUNT)
        }

        async fn disconnect(&self) {
            self.approvals.cancel();
            *self.account.lock().unwrap() = None;
        }

        fn current_account(&self) -> Option<Address> {
            *self.account.lock().unwrap()
        }

        async fn write_contract(&self, _request: WriteContract) -> Result<TxHash, SubmissionError> {
            if self.approvals.request().await != Ok(true) {
                return Err(SubmissionError::rejected());
            }
            Ok(TxHash::with_last_byte(1))
        }

        async fn watch_transaction(&self, _tx_hash: TxHash) -> Result<TxOutcome, SubmissionError> {
            Ok(TxOutcome::Success {
                block_number: Some(5),
            })
        }
    }

    #[async_trait::async_trait]
    impl WalletSession for PromptingWallet {
        fn network(&self) -> &'static NetworkConfig {
            &ARC_TESTNET
        }

        fn approvals(&self) -> &SignatureApprovals {
            &self.approvals
        }

        async fn balance(&self) -> Result<Option<U256>, SubmissionError> {
            Ok(self.current_account().map(|_| U256::from(1_500_000u64)))
        }
    }

    struct Harness {
        wallet: Arc<PromptingWallet>,
        cmd_tx: mpsc::Sender<RuntimeCommand>,
        evt_rx: mpsc::Receiver<RuntimeEvent>,
        worker: JoinHandle<Result<()>>,
    }

    impl Harness {
        fn start(wallet: PromptingWallet) -> Self {
            let wallet = Arc::new(wallet);
            let (cmd_tx, cmd_rx) = mpsc::channel();
            let (evt_tx, evt_rx) = mpsc::channel();
            let worker = tokio::spawn(run_async_worker(Arc::clone(&wallet), cmd_rx, evt_tx));
            Self {
                wallet,
                cmd_tx,
                evt_rx,
                worker,
            }
        }

        fn send(&self, cmd: RuntimeCommand) {
            self.cmd_tx.send(cmd).unwrap();
        }

        async fn next_event(&self) -> RuntimeEvent {
            tokio::time::timeout(Duration::from_secs(5), async {
                loop {
                    if let Ok(event) = self.evt_rx.try_recv() {
                        return event;
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            })
            .await
            .expect("worker event")
        }

        async fn wait_for_prompt(&self) {
            tokio::time::timeout(Duration::from_secs(5), async {
                while !self.wallet.approvals.is_pending() {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            })
            .await
            .expect("signature prompt");
        }

        async fn shutdown(self) {
            self.send(RuntimeCommand::Shutdown);
            self.worker.await.unwrap().unwrap();
        }
    }

    fn gm() -> RuntimeCommand {
        RuntimeCommand::Submit(SubmitRequest {
            contract_address: "0xf9D1FAb74B24353C3a878B8E299Bbe6d4e100237".into(),
            selector: FunctionSelector::Gm,
        })
    }

    fn phase_of(event: &RuntimeEvent) -> Option<SubmissionPhase> {
        match event {
            RuntimeEvent::Submission(state) => Some(state.phase()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_connect_reports_account_and_balance() {
        let harness = Harness::start(PromptingWallet::new());
        harness.send(RuntimeCommand::Connect);

        match harness.next_event().await {
            RuntimeEvent::Connected { account, balance } => {
                assert_eq!(account, ACCOUNT);
                assert_eq!(balance.as_deref(), Some("1.5 USDC"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        harness.shutdown().await;
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        let harness = Harness::start(PromptingWallet::offline());
        harness.send(RuntimeCommand::Connect);

        match harness.next_event().await {
            RuntimeEvent::ConnectFailed { message } => assert_eq!(message, "Cannot reach node"),
            other => panic!("unexpected event: {other:?}"),
        }
        harness.shutdown().await;
    }

    #[tokio::test]
    async fn test_approval_routes_to_waiting_signer() {
        let harness = Harness::start(PromptingWallet::new());
        harness.send(RuntimeCommand::Connect);
        harness.next_event().await;

        harness.send(gm());
        assert_eq!(
            phase_of(&harness.next_event().await),
            Some(SubmissionPhase::AwaitingSignature)
        );
        harness.wait_for_prompt().await;

        harness.send(RuntimeCommand::ApproveSignature { approved: true });
        assert_eq!(
            phase_of(&harness.next_event().await),
            Some(SubmissionPhase::AwaitingConfirmation)
        );
        assert_eq!(
            phase_of(&harness.next_event().await),
            Some(SubmissionPhase::Confirmed)
        );
        match harness.next_event().await {
            RuntimeEvent::Balance { display } => assert_eq!(display, "1.5 USDC"),
            other => panic!("unexpected event: {other:?}"),
        }
        harness.shutdown().await;
    }

    #[tokio::test]
    async fn test_second_submit_is_refused_as_failed_state() {
        let harness = Harness::start(PromptingWallet::new());
        harness.send(RuntimeCommand::Connect);
        harness.next_event().await;

        harness.send(gm());
        harness.next_event().await;
        harness.wait_for_prompt().await;

        harness.send(gm());
        match harness.next_event().await {
            RuntimeEvent::Submission(SubmissionState::Failed { tx_hash, error }) => {
                assert_eq!(tx_hash, None);
                assert_eq!(error.kind(), "validation");
                assert_eq!(error.to_string(), "A submission is already in flight");
            }
            other => panic!("unexpected event: {other:?}"),
        }

        // The first submission is untouched and still answerable
        assert!(harness.wallet.approvals.is_pending());
        harness.send(RuntimeCommand::ApproveSignature { approved: false });
        match harness.next_event().await {
            RuntimeEvent::Submission(state) => {
                assert_eq!(state.error(), Some(&SubmissionError::rejected()));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        harness.shutdown().await;
    }

    #[tokio::test]
    async fn test_disconnect_declines_pending_prompt() {
        let harness = Harness::start(PromptingWallet::new());
        harness.send(RuntimeCommand::Connect);
        harness.next_event().await;

        harness.send(gm());
        harness.next_event().await;
        harness.wait_for_prompt().await;

        harness.send(RuntimeCommand::Disconnect);
        let events = [harness.next_event().await, harness.next_event().await];

        assert!(events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::Disconnected)));
        assert!(events.iter().any(|event| matches!(
            event,
            RuntimeEvent::Submission(SubmissionState::Failed { error, .. })
                if *error == SubmissionError::rejected()
        )));
        assert!(!harness.wallet.approvals.is_pending());
        harness.shutdown().await;
    }

    #[tokio::test]
    async fn test_submit_after_confirmation_is_accepted() {
        let harness = Harness::start(PromptingWallet::new());
        harness.send(RuntimeCommand::Connect);
        harness.next_event().await;

        harness.send(gm());
        harness.next_event().await;
        harness.wait_for_prompt().await;
        harness.send(RuntimeCommand::ApproveSignature { approved: true });
        loop {
            if phase_of(&harness.next_event().await) == Some(SubmissionPhase::Confirmed) {
                break;
            }
        }

        // Give the finished task a moment to be reaped by the runtime
        tokio::time::sleep(Duration::from_millis(100)).await;
        harness.send(gm());
        let mut saw_prompt = false;
        for _ in 0..2 {
            match harness.next_event().await {
                RuntimeEvent::Balance { .. } => {}
                event => {
                    assert_eq!(phase_of(&event), Some(SubmissionPhase::AwaitingSignature));
                    saw_prompt = true;
                    break;
                }
            }
        }
        assert!(saw_prompt);
        harness.shutdown().await;
    }
}
