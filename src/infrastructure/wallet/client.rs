//! Wallet collaborator contract

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, TxHash, U256};

use crate::config::NetworkConfig;
use crate::domain::contract::FunctionDescriptor;
use crate::domain::submission::SubmissionError;
use crate::infrastructure::wallet::approval::SignatureApprovals;

/// Everything a wallet needs to send one contract write
#[derive(Debug, Clone, PartialEq)]
pub struct WriteContract {
    /// Target contract, unparsed; the wallet decides whether it is valid
    pub address: String,
    pub descriptor: FunctionDescriptor,
    pub function_name: String,
    pub args: Vec<DynSolValue>,
    pub chain_id: u64,
}

/// How a mined transaction ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Success { block_number: Option<u64> },
    Reverted { block_number: Option<u64> },
}

/// Wallet connector plus transaction sender.
///
/// Signing, broadcasting and receipt polling all happen behind this trait.
#[async_trait::async_trait]
pub trait WalletClient: Send + Sync + 'static {
    /// Resolve and remember the active account
    async fn connect(&self) -> Result<Address, SubmissionError>;

    /// Forget the active account
    async fn disconnect(&self);

    /// Active account, if connected
    fn current_account(&self) -> Option<Address>;

    /// Sign and broadcast a contract write, returning its hash
    async fn write_contract(&self, request: WriteContract) -> Result<TxHash, SubmissionError>;

    /// Wait until the transaction is mined (or the wallet gives up)
    async fn watch_transaction(&self, tx_hash: TxHash) -> Result<TxOutcome, SubmissionError>;
}

/// What the background worker needs beyond the collaborator contract
#[async_trait::async_trait]
pub trait WalletSession: WalletClient {
    /// Network the wallet is bound to
    fn network(&self) -> &'static NetworkConfig;

    /// Prompt gate shared with the UI
    fn approvals(&self) -> &SignatureApprovals;

    /// Native balance of the connected account, None while disconnected
    async fn balance(&self) -> Result<Option<U256>, SubmissionError>;
}
