//! Wallet infrastructure - the transaction collaborator and its alloy implementation

mod approval;
mod client;
mod provider;

pub use approval::SignatureApprovals;
pub use client::{TxOutcome, WalletClient, WalletSession, WriteContract};
pub use provider::{AlloyWallet, WalletSettings};
