//! End-of-run reward claim
//!
//! ```text
//! Idle --claim--> AwaitingSignature --signed--> SavingScore --saved/failed--> Opening --> Revealed
//!                        \--rejected/failed--> Idle (message)
//! ```
//!
//! The flow is driven from async code that only borrows the session between
//! awaits; every result carries the ticket it was issued for and is dropped
//! if the run it belongs to is gone.

use std::cell::RefCell;

use rand::Rng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Session;
use crate::consts::*;
use crate::services::leaderboard::{LeaderboardStore, PlayerProfile};
use crate::services::wallet::{self, WalletError, WalletProvider};
use crate::sim::timer::OneShotTimer;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// The run this result belongs to has been reset or torn down
    #[error("claim result arrived for a finished session")]
    Stale,

    #[error("claim not available")]
    Unavailable,
}

/// Creator coins handed out by the chest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coin {
    Pratzyy,
    Bhadoriya,
    Jesse,
}

impl Coin {
    pub const ALL: [Coin; 3] = [Coin::Pratzyy, Coin::Bhadoriya, Coin::Jesse];

    pub fn symbol(self) -> &'static str {
        match self {
            Coin::Pratzyy => "$pratzyy",
            Coin::Bhadoriya => "$bhadoriya",
            Coin::Jesse => "$jesse",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTier {
    pub coin: Coin,
    pub amount: u32,
}

impl RewardTier {
    pub fn roll(rng: &mut Pcg32) -> Self {
        let coin = Coin::ALL.choose(rng).copied().unwrap_or(Coin::Pratzyy);
        let amount = rng.random_range(REWARD_MIN..=REWARD_MAX);
        Self { coin, amount }
    }

    pub fn text(&self) -> String {
        format!("You got:\n{} {}", self.amount, self.coin.symbol())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClaimState {
    #[default]
    Idle,
    AwaitingSignature,
    SavingScore,
    /// Short pause, then the chest animation
    Opening {
        reward: RewardTier,
        chest_visible: bool,
    },
    Revealed {
        reward: RewardTier,
    },
}

/// Issued when a claim starts; results must present it back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimTicket {
    pub(crate) generation: u64,
    pub score: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ClaimFlow {
    pub state: ClaimState,
    /// At most one successful claim per run
    pub has_claimed: bool,
    /// Last failure shown under the claim button
    pub message: Option<&'static str>,
    timer: OneShotTimer,
}

impl ClaimFlow {
    /// Claim button shown and enabled
    pub fn can_claim(&self) -> bool {
        self.state == ClaimState::Idle && !self.has_claimed
    }

    /// A request or the chest is in flight; other end-screen buttons are disabled
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            ClaimState::AwaitingSignature | ClaimState::SavingScore | ClaimState::Opening { .. }
        )
    }

    /// Pending indicator text
    pub fn status_text(&self) -> Option<&'static str> {
        match self.state {
            ClaimState::AwaitingSignature => Some("Confirm in wallet..."),
            ClaimState::SavingScore => Some("Saving score..."),
            ClaimState::Opening {
                chest_visible: false,
                ..
            } => Some("Opening chest..."),
            _ => None,
        }
    }

    pub fn reward(&self) -> Option<RewardTier> {
        match self.state {
            ClaimState::Revealed { reward } => Some(reward),
            _ => None,
        }
    }

    pub(crate) fn begin(&mut self) -> bool {
        if !self.can_claim() {
            return false;
        }
        self.state = ClaimState::AwaitingSignature;
        self.message = None;
        true
    }

    pub(crate) fn signed(&mut self) -> bool {
        if self.state != ClaimState::AwaitingSignature {
            return false;
        }
        self.state = ClaimState::SavingScore;
        true
    }

    pub(crate) fn fail(&mut self, err: &WalletError) {
        log::warn!("Claim failed: {err}");
        self.state = ClaimState::Idle;
        self.message = Some(err.user_message());
    }

    pub(crate) fn open(&mut self, reward: RewardTier) -> bool {
        if self.state != ClaimState::SavingScore {
            return false;
        }
        self.state = ClaimState::Opening {
            reward,
            chest_visible: false,
        };
        self.timer.arm(CHEST_DELAY_MS);
        true
    }

    /// Advance the chest timers
    pub(crate) fn advance(&mut self, dt_ms: f32) {
        if !self.timer.advance(dt_ms) {
            return;
        }
        if let ClaimState::Opening {
            reward,
            chest_visible,
        } = self.state
        {
            if chest_visible {
                self.state = ClaimState::Revealed { reward };
                self.has_claimed = true;
                log::info!("Reward revealed: {} {}", reward.amount, reward.coin.symbol());
            } else {
                self.state = ClaimState::Opening {
                    reward,
                    chest_visible: true,
                };
                self.timer.arm(CHEST_ANIM_MS);
            }
        }
    }
}

/// Run the whole claim: sign, save the score, open the chest.
///
/// A leaderboard failure is logged and does not block the reveal.
pub async fn drive_claim(
    session: &RefCell<Session>,
    wallet: &dyn WalletProvider,
    store: &dyn LeaderboardStore,
    profile: &PlayerProfile,
) -> Result<(), ClaimError> {
    let ticket = session
        .borrow_mut()
        .begin_claim()
        .ok_or(ClaimError::Unavailable)?;

    let signed = wallet::sign_intent(wallet).await;
    let account = session.borrow_mut().apply_claim_signature(&ticket, signed)?;

    let saved = store.submit_score(&account, ticket.score, profile).await;
    if let Err(err) = &saved {
        log::warn!("Score not saved: {err}");
    }
    session.borrow_mut().apply_claim_saved(&ticket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn reward() -> RewardTier {
        RewardTier {
            coin: Coin::Jesse,
            amount: 42,
        }
    }

    #[test]
    fn test_reward_roll_range() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..200 {
            let r = RewardTier::roll(&mut rng);
            assert!((REWARD_MIN..=REWARD_MAX).contains(&r.amount));
        }
        assert_eq!(reward().text(), "You got:\n42 $jesse");
    }

    #[test]
    fn test_chest_sequence() {
        let mut flow = ClaimFlow::default();
        assert!(flow.begin());
        assert!(!flow.begin());
        assert!(flow.is_busy());
        assert!(flow.signed());
        assert_eq!(flow.status_text(), Some("Saving score..."));
        assert!(flow.open(reward()));
        assert_eq!(flow.status_text(), Some("Opening chest..."));

        flow.advance(CHEST_DELAY_MS + 1.0);
        assert!(matches!(
            flow.state,
            ClaimState::Opening {
                chest_visible: true,
                ..
            }
        ));
        assert_eq!(flow.reward(), None);
        flow.advance(CHEST_ANIM_MS + 1.0);
        assert_eq!(flow.reward(), Some(reward()));
        assert!(flow.has_claimed);
        assert!(!flow.is_busy());
        assert!(!flow.can_claim());
    }

    #[test]
    fn test_failure_returns_to_idle_with_message() {
        let mut flow = ClaimFlow::default();
        flow.begin();
        flow.fail(&WalletError::Rejected);
        assert_eq!(flow.state, ClaimState::Idle);
        assert_eq!(flow.message, Some("Transaction\ncancelled"));
        assert!(flow.can_claim());
    }

    #[test]
    fn test_open_requires_saving_state() {
        let mut flow = ClaimFlow::default();
        assert!(!flow.signed());
        assert!(!flow.open(reward()));
        assert_eq!(flow.state, ClaimState::Idle);
    }
}
