//! Wallet / chain provider contract
//!
//! The game only needs to know whether a signature request succeeded. It
//! never waits for confirmations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::CHAIN_ID;

/// Errors surfaced by wallet providers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("no wallet provider available")]
    NoWallet,

    #[error("wallet returned no accounts")]
    NoAccounts,

    /// User dismissed the signature prompt (EIP-1193 code 4001)
    #[error("transaction rejected by user")]
    Rejected,

    #[error("transaction failed: {0}")]
    Failed(String),
}

impl WalletError {
    /// Short message shown under the button that started the request
    pub fn user_message(&self) -> &'static str {
        match self {
            WalletError::NoWallet => "No wallet found!",
            WalletError::Rejected => "Transaction\ncancelled",
            WalletError::NoAccounts | WalletError::Failed(_) => "Transaction\nfailed",
        }
    }
}

/// `eth_sendTransaction` parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    pub value: String,
    pub data: String,
    pub chain_id: String,
}

impl TransactionRequest {
    /// Zero-value transfer to self on Base, used as a proof of intent
    pub fn zero_value_to_self(address: &str) -> Self {
        Self {
            from: address.to_string(),
            to: address.to_string(),
            value: "0x0".to_string(),
            data: "0x".to_string(),
            chain_id: CHAIN_ID.to_string(),
        }
    }
}

/// Browser wallet provider. Futures are not `Send`: everything runs on the
/// page's single-threaded executor.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// `eth_requestAccounts`
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;

    /// `eth_sendTransaction`; returns the transaction hash
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String, WalletError>;
}

/// A signed zero-value self transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIntent {
    pub account: String,
    pub tx_hash: String,
}

/// Request accounts, then sign a zero-value transaction from the first one
pub async fn sign_intent(wallet: &dyn WalletProvider) -> Result<SignedIntent, WalletError> {
    let accounts = wallet.request_accounts().await?;
    let account = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;
    let tx = TransactionRequest::zero_value_to_self(&account);
    let tx_hash = wallet.send_transaction(&tx).await?;
    if tx_hash.is_empty() {
        return Err(WalletError::Failed("empty transaction hash".to_string()));
    }
    log::info!("Transaction signed: {tx_hash}");
    Ok(SignedIntent { account, tx_hash })
}

/// Scripted wallet for tests and the native harness
#[derive(Debug, Clone)]
pub struct ScriptedWallet {
    pub accounts: Vec<String>,
    pub outcome: Result<String, WalletError>,
}

impl ScriptedWallet {
    pub fn approving(account: &str) -> Self {
        Self {
            accounts: vec![account.to_string()],
            outcome: Ok("0xfeed".to_string()),
        }
    }

    pub fn failing(account: &str, err: WalletError) -> Self {
        Self {
            accounts: vec![account.to_string()],
            outcome: Err(err),
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for ScriptedWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        Ok(self.accounts.clone())
    }

    async fn send_transaction(&self, _tx: &TransactionRequest) -> Result<String, WalletError> {
        self.outcome.clone()
    }
}
