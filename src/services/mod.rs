//! External collaborators: wallet, leaderboard store, host platform
//!
//! Only the contracts live here. Browser implementations are in `platform`.

pub mod host;
pub mod leaderboard;
pub mod wallet;

pub use host::{HostBridge, HostContext, HostEvent, HostMessage};
pub use leaderboard::{LeaderboardError, LeaderboardStore, PlayerProfile, PlayerRecord};
pub use wallet::{TransactionRequest, WalletError, WalletProvider};
