//! Submission workflow
//!
//! Builds the descriptor for the chosen function, hands the write to the
//! wallet and follows the transaction until it is mined or fails. The
//! observer sees every state after a transition, in order.

use crate::config::NetworkConfig;
use crate::domain::contract::{build_descriptor, call_args, FunctionSelector};
use crate::domain::submission::{SubmissionError, SubmissionState};
use crate::infrastructure::wallet::{TxOutcome, WalletClient, WriteContract};

/// A user-initiated submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub contract_address: String,
    pub selector: FunctionSelector,
}

/// Assemble the wallet request for a selector
pub fn write_request(
    network: &NetworkConfig,
    contract_address: &str,
    selector: &FunctionSelector,
) -> WriteContract {
    WriteContract {
        address: contract_address.trim().to_string(),
        descriptor: build_descriptor(selector),
        function_name: selector.function_name().to_string(),
        args: call_args(selector),
        chain_id: network.id,
    }
}

/// Run one submission to completion and return its terminal state.
///
/// Only an empty address is rejected locally; address format and everything
/// else is left to the wallet. Nothing is retried.
pub async fn submit<W, F>(
    wallet: &W,
    network: &NetworkConfig,
    request: SubmitRequest,
    mut observer: F,
) -> SubmissionState
where
    W: WalletClient + ?Sized,
    F: FnMut(&SubmissionState) + Send,
{
    let mut state = SubmissionState::Idle;

    if request.contract_address.trim().is_empty() {
        state.fail(SubmissionError::validation("Contract address is empty"));
        observer(&state);
        return state;
    }

    state.begin();
    observer(&state);
    tracing::info!(call = %request.selector, to = %request.contract_address.trim(), "awaiting signature");

    let write = write_request(network, &request.contract_address, &request.selector);
    let tx_hash = match wallet.write_contract(write).await {
        Ok(tx_hash) => tx_hash,
        Err(error) => {
            tracing::warn!(kind = error.kind(), %error, "submission failed before broadcast");
            state.fail(error);
            observer(&state);
            return state;
        }
    };

    state.signed(tx_hash);
    observer(&state);
    tracing::info!(%tx_hash, "awaiting confirmation");

    match wallet.watch_transaction(tx_hash).await {
        Ok(TxOutcome::Success { block_number }) => {
            state.confirmed(block_number);
            tracing::info!(%tx_hash, ?block_number, "transaction confirmed");
        }
        Ok(TxOutcome::Reverted { block_number }) => {
            let location = block_number
                .map(|number| format!(" in block {number}"))
                .unwrap_or_default();
            state.fail(SubmissionError::reverted(format!(
                "Transaction {tx_hash} reverted{location}"
            )));
            tracing::warn!(%tx_hash, ?block_number, "transaction reverted");
        }
        Err(error) => {
            tracing::warn!(%tx_hash, kind = error.kind(), %error, "confirmation failed");
            state.fail(error);
        }
    }
    observer(&state);
    state
}
