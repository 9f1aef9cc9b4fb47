//! Remote leaderboard contract
//!
//! Scores are cumulative: each submission adds to the player's total. Records
//! are keyed by the lower-cased wallet address.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaderboardError {
    #[error("leaderboard unavailable: {0}")]
    Unavailable(String),

    #[error("invalid player identifier")]
    InvalidPlayer,
}

/// Host profile attached to a submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub username: Option<String>,
    pub fid: u64,
    pub pfp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub address: String,
    pub username: String,
    pub fid: u64,
    pub pfp: String,
    pub total_score: u64,
    pub games_played: u32,
    pub highest_score: u64,
}

impl PlayerRecord {
    /// Name shown in the panel: username, else the start of the address
    pub fn display_name(&self) -> String {
        let name = if self.username.is_empty() {
            self.address.chars().take(8).collect::<String>()
        } else {
            self.username.clone()
        };
        name.chars().take(10).collect()
    }
}

/// Case-normalized record key
pub fn player_key(address: &str) -> Result<String, LeaderboardError> {
    let key = address.trim().to_lowercase();
    if key.is_empty() {
        return Err(LeaderboardError::InvalidPlayer);
    }
    Ok(key)
}

#[async_trait(?Send)]
pub trait LeaderboardStore {
    /// Add `delta` to the player's total, creating the record if needed
    async fn submit_score(
        &self,
        address: &str,
        delta: u64,
        profile: &PlayerProfile,
    ) -> Result<(), LeaderboardError>;

    /// Top `n` records, highest total first
    async fn fetch_top(&self, n: usize) -> Result<Vec<PlayerRecord>, LeaderboardError>;

    async fn fetch_one(&self, address: &str) -> Result<Option<PlayerRecord>, LeaderboardError>;

    async fn count(&self) -> Result<usize, LeaderboardError>;

    /// 1-based rank by total score
    async fn rank_of(&self, address: &str) -> Result<Option<usize>, LeaderboardError> {
        let key = player_key(address)?;
        let total = self.count().await?;
        let all = self.fetch_top(total).await?;
        Ok(all.iter().position(|r| r.address == key).map(|i| i + 1))
    }
}

/// In-process store used natively and in tests
#[derive(Debug, Default)]
pub struct MemoryLeaderboard {
    records: RefCell<BTreeMap<String, PlayerRecord>>,
    offline: Cell<bool>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `Unavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    fn ensure_online(&self) -> Result<(), LeaderboardError> {
        if self.offline.get() {
            return Err(LeaderboardError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl LeaderboardStore for MemoryLeaderboard {
    async fn submit_score(
        &self,
        address: &str,
        delta: u64,
        profile: &PlayerProfile,
    ) -> Result<(), LeaderboardError> {
        self.ensure_online()?;
        let key = player_key(address)?;
        let username = profile.username.clone().filter(|u| !u.is_empty());
        let pfp = profile.pfp.clone().filter(|p| !p.is_empty());

        let mut records = self.records.borrow_mut();
        match records.get_mut(&key) {
            Some(record) => {
                record.total_score += delta;
                record.games_played += 1;
                record.highest_score = record.highest_score.max(delta);
                if let Some(username) = username {
                    record.username = username;
                }
                if profile.fid != 0 {
                    record.fid = profile.fid;
                }
                if let Some(pfp) = pfp {
                    record.pfp = pfp;
                }
                log::info!("Updated {key}: total {}", record.total_score);
            }
            None => {
                let username =
                    username.unwrap_or_else(|| address.chars().take(10).collect::<String>());
                records.insert(
                    key.clone(),
                    PlayerRecord {
                        address: key.clone(),
                        username,
                        fid: profile.fid,
                        pfp: pfp.unwrap_or_default(),
                        total_score: delta,
                        games_played: 1,
                        highest_score: delta,
                    },
                );
                log::info!("Created {key} with score {delta}");
            }
        }
        Ok(())
    }

    async fn fetch_top(&self, n: usize) -> Result<Vec<PlayerRecord>, LeaderboardError> {
        self.ensure_online()?;
        let mut all: Vec<PlayerRecord> = self.records.borrow().values().cloned().collect();
        // BTreeMap order breaks ties by address
        all.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        all.truncate(n);
        Ok(all)
    }

    async fn fetch_one(&self, address: &str) -> Result<Option<PlayerRecord>, LeaderboardError> {
        self.ensure_online()?;
        let key = player_key(address)?;
        Ok(self.records.borrow().get(&key).cloned())
    }

    async fn count(&self) -> Result<usize, LeaderboardError> {
        self.ensure_online()?;
        Ok(self.records.borrow().len())
    }
}
