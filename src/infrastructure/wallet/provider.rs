//! Alloy-backed wallet
//!
//! Two connector modes, same as `cast send`:
//! - a local private key wrapped in an `EthereumWallet` filler
//! - node-managed ("unlocked") accounts via `eth_sendTransaction`

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use alloy::network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::TransportError;
use anyhow::{Context, Result};

use crate::config::NetworkConfig;
use crate::domain::submission::SubmissionError;
use crate::infrastructure::wallet::approval::SignatureApprovals;
use crate::infrastructure::wallet::client::{TxOutcome, WalletClient, WalletSession, WriteContract};

/// JSON-RPC code wallets use for "user rejected the request"
const USER_REJECTED_CODE: i64 = 4001;

/// Wallet settings resolved from CLI and config file
#[derive(Debug, Clone)]
pub struct WalletSettings {
    pub private_key: Option<String>,
    pub unlocked: bool,
    pub confirm_before_sign: bool,
    pub confirmations: u64,
    pub confirmation_timeout: Duration,
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self {
            private_key: None,
            unlocked: false,
            confirm_before_sign: true,
            confirmations: 1,
            confirmation_timeout: Duration::from_secs(120),
        }
    }
}

/// Where the signing account comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connector {
    Local(Address),
    Unlocked,
    Missing,
}

pub struct AlloyWallet {
    network: &'static NetworkConfig,
    settings: WalletSettings,
    provider: DynProvider,
    connector: Connector,
    account: RwLock<Option<Address>>,
    approvals: SignatureApprovals,
}

impl AlloyWallet {
    /// Bind a connector to the network's RPC endpoint. No I/O happens here.
    pub fn new(network: &'static NetworkConfig, settings: WalletSettings) -> Result<Self> {
        let url = network.rpc_url()?;

        let key = settings
            .private_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty());

        let (provider, connector) = match key {
            Some(key) => {
                let signer: PrivateKeySigner = key.parse().context("Invalid private key")?;
                let address = signer.address();
                if settings.unlocked {
                    tracing::warn!("both a private key and --unlocked given; using the key");
                }
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(url)
                    .erased();
                (provider, Connector::Local(address))
            }
            None => {
                let provider = ProviderBuilder::new().connect_http(url).erased();
                let connector = if settings.unlocked {
                    Connector::Unlocked
                } else {
                    Connector::Missing
                };
                (provider, connector)
            }
        };

        Ok(Self {
            network,
            settings,
            provider,
            connector,
            account: RwLock::new(None),
            approvals: SignatureApprovals::new(),
        })
    }

    pub fn requires_approval(&self) -> bool {
        self.settings.confirm_before_sign
    }

    /// Short description of the connector, for the header
    pub fn connector_label(&self) -> &'static str {
        match self.connector {
            Connector::Local(_) => "local key",
            Connector::Unlocked => "node account",
            Connector::Missing => "no wallet",
        }
    }

    fn set_account(&self, account: Option<Address>) {
        *self.account.write().unwrap_or_else(PoisonError::into_inner) = account;
    }
}

#[async_trait::async_trait]
impl WalletClient for AlloyWallet {
    async fn connect(&self) -> Result<Address, SubmissionError> {
        let local = match self.connector {
            Connector::Local(address) => Some(address),
            Connector::Unlocked => None,
            Connector::Missing => {
                return Err(SubmissionError::connection(
                    "No wallet configured: pass --private-key or --unlocked",
                ))
            }
        };

        let chain_id = self.provider.get_chain_id().await.map_err(|err| {
            SubmissionError::connection(format!(
                "Cannot reach {}: {}",
                self.network.rpc_endpoint, err
            ))
        })?;
        if chain_id != self.network.id {
            return Err(SubmissionError::connection(format!(
                "Wrong network: endpoint reports chain {}, expected {}",
                chain_id, self.network.id
            )));
        }

        let account = match local {
            Some(address) => address,
            None => self
                .provider
                .get_accounts()
                .await
                .map_err(|err| SubmissionError::connection(format!("eth_accounts failed: {err}")))?
                .into_iter()
                .next()
                .ok_or_else(|| SubmissionError::connection("Node exposes no unlocked accounts"))?,
        };

        self.set_account(Some(account));
        tracing::info!(%account, chain_id, "wallet connected");
        Ok(account)
    }

    async fn disconnect(&self) {
        self.approvals.cancel();
        self.set_account(None);
        tracing::info!("wallet disconnected");
    }

    fn current_account(&self) -> Option<Address> {
        *self.account.read().unwrap_or_else(PoisonError::into_inner)
    }

    async fn write_contract(&self, request: WriteContract) -> Result<TxHash, SubmissionError> {
        let from = self
            .current_account()
            .ok_or_else(|| SubmissionError::connection("Wallet not connected"))?;

        if request.chain_id != self.network.id {
            return Err(SubmissionError::connection(format!(
                "Chain mismatch: request targets {}, wallet is on {}",
                request.chain_id, self.network.id
            )));
        }

        let address = request.address.trim();
        let to: Address = address
            .parse()
            .map_err(|_| SubmissionError::validation(format!("Address \"{address}\" is invalid.")))?;

        let calldata = request.descriptor.encode_call(&request.args).map_err(|err| {
            SubmissionError::validation(format!(
                "Cannot encode {}: {}",
                request.function_name, err
            ))
        })?;
        tracing::debug!(
            function = %request.function_name,
            calldata = %format!("0x{}", hex::encode(&calldata)),
            "encoded call"
        );

        if self.settings.confirm_before_sign {
            let answer = self.approvals.request().await;
            if answer != Ok(true) {
                tracing::info!(function = %request.function_name, "signature declined");
                return Err(SubmissionError::rejected());
            }
        }

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(calldata)
            .with_chain_id(request.chain_id);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(classify_transport_error)?;
        let tx_hash = *pending.tx_hash();
        tracing::info!(%tx_hash, function = %request.function_name, "transaction sent");
        Ok(tx_hash)
    }

    async fn watch_transaction(&self, tx_hash: TxHash) -> Result<TxOutcome, SubmissionError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_required_confirmations(self.settings.confirmations.max(1))
            .with_timeout(Some(self.settings.confirmation_timeout))
            .get_receipt()
            .await
            .map_err(|err| SubmissionError::network(format!("Confirmation failed: {err}")))?;

        let block_number = ReceiptResponse::block_number(&receipt);
        if ReceiptResponse::status(&receipt) {
            Ok(TxOutcome::Success { block_number })
        } else {
            Ok(TxOutcome::Reverted { block_number })
        }
    }
}

#[async_trait::async_trait]
impl WalletSession for AlloyWallet {
    fn network(&self) -> &'static NetworkConfig {
        self.network
    }

    fn approvals(&self) -> &SignatureApprovals {
        &self.approvals
    }

    async fn balance(&self) -> Result<Option<U256>, SubmissionError> {
        let Some(account) = self.current_account() else {
            return Ok(None);
        };
        self.provider
            .get_balance(account)
            .await
            .map(Some)
            .map_err(classify_transport_error)
    }
}

fn classify_transport_error(err: TransportError) -> SubmissionError {
    match err.as_error_resp() {
        Some(payload) => classify_error_payload(payload.code, &payload.message),
        None => SubmissionError::network(err),
    }
}

/// Map a JSON-RPC error response onto the submission taxonomy
fn classify_error_payload(code: i64, message: &str) -> SubmissionError {
    if code == USER_REJECTED_CODE {
        return SubmissionError::rejected();
    }
    if message.to_ascii_lowercase().contains("revert") {
        return SubmissionError::reverted(message);
    }
    SubmissionError::network(message)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;
    use crate::config::ARC_TESTNET;
    use crate::domain::contract::{build_descriptor, FunctionSelector};

    // Well-known development key (anvil account #0)
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn gm_request() -> WriteContract {
        WriteContract {
            address: "0xf9D1FAb74B24353C3a878B8E299Bbe6d4e100237".to_string(),
            descriptor: build_descriptor(&FunctionSelector::Gm),
            function_name: "gm".to_string(),
            args: Vec::new(),
            chain_id: ARC_TESTNET.id,
        }
    }

    #[test]
    fn test_classify_error_payload() {
        assert_eq!(
            classify_error_payload(4001, "User denied transaction signature"),
            SubmissionError::rejected()
        );
        assert_eq!(
            classify_error_payload(3, "execution reverted: already claimed").kind(),
            "reverted"
        );
        assert_eq!(
            classify_error_payload(-32000, "insufficient funds for gas * price + value"),
            SubmissionError::Network("insufficient funds for gas * price + value".into())
        );
    }

    #[test]
    fn test_invalid_private_key_is_rejected() {
        let settings = WalletSettings {
            private_key: Some("not-a-key".into()),
            ..Default::default()
        };
        assert!(AlloyWallet::new(&ARC_TESTNET, settings).is_err());
    }

    #[test]
    fn test_connector_modes() {
        let local = AlloyWallet::new(
            &ARC_TESTNET,
            WalletSettings {
                private_key: Some(DEV_KEY.into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            local.connector,
            Connector::Local(address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"))
        );
        assert_eq!(local.connector_label(), "local key");

        let unlocked = AlloyWallet::new(
            &ARC_TESTNET,
            WalletSettings {
                unlocked: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(unlocked.connector, Connector::Unlocked);

        let missing = AlloyWallet::new(&ARC_TESTNET, WalletSettings::default()).unwrap();
        assert_eq!(missing.connector, Connector::Missing);
    }

    #[tokio::test]
    async fn test_connect_without_wallet_fails_offline() {
        let wallet = AlloyWallet::new(&ARC_TESTNET, WalletSettings::default()).unwrap();
        let err = wallet.connect().await.unwrap_err();
        assert_eq!(err.kind(), "connection");
        assert!(wallet.current_account().is_none());
    }

    #[tokio::test]
    async fn test_write_requires_connection() {
        let wallet = AlloyWallet::new(
            &ARC_TESTNET,
            WalletSettings {
                private_key: Some(DEV_KEY.into()),
                ..Default::default()
            },
        )
        .unwrap();
        let err = wallet.write_contract(gm_request()).await.unwrap_err();
        assert_eq!(err, SubmissionError::Connection("Wallet not connected".into()));
    }

    #[tokio::test]
    async fn test_malformed_address_and_chain_are_rejected_by_wallet() {
        let wallet = AlloyWallet::new(
            &ARC_TESTNET,
            WalletSettings {
                private_key: Some(DEV_KEY.into()),
                ..Default::default()
            },
        )
        .unwrap();
        wallet.set_account(Some(address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")));

        let mut request = gm_request();
        request.address = "0xABC".into();
        let err = wallet.write_contract(request).await.unwrap_err();
        assert_eq!(err.to_string(), "Address \"0xABC\" is invalid.");

        let mut request = gm_request();
        request.chain_id = 1;
        let err = wallet.write_contract(request).await.unwrap_err();
        assert_eq!(err.kind(), "connection");
    }

    #[tokio::test]
    async fn test_declined_prompt_is_rejection() {
        let wallet = AlloyWallet::new(
            &ARC_TESTNET,
            WalletSettings {
                private_key: Some(DEV_KEY.into()),
                ..Default::default()
            },
        )
        .unwrap();
        wallet.set_account(Some(address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")));

        let approvals = wallet.approvals().clone();
        let decline = async {
            while !approvals.is_pending() {
                tokio::task::yield_now().await;
            }
            approvals.resolve(false);
        };
        let (result, _) = tokio::join!(wallet.write_contract(gm_request()), decline);
        assert_eq!(result.unwrap_err(), SubmissionError::rejected());
    }
}
