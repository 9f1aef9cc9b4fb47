//! View models rebuilt from the simulation every frame
//!
//! Nothing here is stored between frames; the game state stays the only
//! source of truth.

use crate::consts::*;
use crate::puzzle::PuzzleView;
use crate::services::leaderboard::{LeaderboardError, PlayerRecord};
use crate::session::{Session, SessionPhase};
use crate::sim::shop::{self, ShopItem};
use crate::sim::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyIcon {
    Sun,
    Moon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopOffer {
    pub item: ShopItem,
    pub label: &'static str,
    pub cost: u32,
    pub enabled: bool,
}

/// Every shop item with its price and whether it can be bought now
pub fn shop_offers(state: &GameState) -> Vec<ShopOffer> {
    ShopItem::ALL
        .into_iter()
        .map(|item| ShopOffer {
            item,
            label: item.label(),
            cost: item.cost(),
            enabled: shop::check(state, item).is_none(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudView {
    pub score_text: String,
    pub cash_text: String,
    /// health / MAX_HEALTH
    pub health_fraction: f32,
    /// meter / MUTATION_KILLS_NEEDED
    pub mutation_fraction: f32,
    pub clock_text: String,
    /// "Day: N" or "Wave: N"
    pub phase_label: String,
    pub icon: SkyIcon,
    pub shop_visible: bool,
    pub offers: Vec<ShopOffer>,
    pub show_trigger: bool,
    pub confirm_label: &'static str,
    pub puzzle: Option<PuzzleView>,
    pub puzzle_cleared: bool,
    pub infected_modal: bool,
    pub infected: bool,
}

impl HudView {
    pub fn from_state(state: &GameState) -> Self {
        let wave = state.wave();
        let is_day = state.is_day();
        let gate = &state.gate;
        Self {
            score_text: format!("Score:{}", state.score),
            cash_text: format!("$ {}", state.cash),
            health_fraction: f32::from(state.player.health) / f32::from(MAX_HEALTH),
            mutation_fraction: f32::from(gate.meter) / f32::from(MUTATION_KILLS_NEEDED),
            clock_text: state.clock.clock_text(),
            phase_label: format!("{}: {wave}", if is_day { "Day" } else { "Wave" }),
            icon: if is_day { SkyIcon::Sun } else { SkyIcon::Moon },
            shop_visible: state.near_shop,
            offers: if state.near_shop {
                shop_offers(state)
            } else {
                Vec::new()
            },
            show_trigger: gate.show_solve_puzzle_btn(),
            confirm_label: gate.confirm_label.text(),
            puzzle: gate.view(),
            puzzle_cleared: gate.current_wave_cleared(),
            infected_modal: matches!(gate.state, crate::puzzle::GateState::Infected),
            infected: gate.is_infected(),
        }
    }
}

/// End-of-run screen
#[derive(Debug, Clone, PartialEq)]
pub struct EndScreenView {
    pub stats_text: String,
    pub continue_enabled: bool,
    pub claim_enabled: bool,
    pub claim_status: Option<&'static str>,
    pub claim_message: Option<&'static str>,
    pub chest_visible: bool,
    pub reward_text: Option<String>,
}

impl EndScreenView {
    pub fn from_session(session: &Session) -> Option<Self> {
        if session.phase() != SessionPhase::Ended {
            return None;
        }
        let report = session.report()?;
        let claim = &session.claim;
        Some(Self {
            stats_text: report.text(),
            continue_enabled: session.can_continue(),
            claim_enabled: claim.can_claim(),
            claim_status: claim.status_text(),
            claim_message: claim.message,
            chest_visible: matches!(
                claim.state,
                crate::session::ClaimState::Opening {
                    chest_visible: true,
                    ..
                } | crate::session::ClaimState::Revealed { .. }
            ),
            reward_text: claim.reward().map(|r| r.text()),
        })
    }
}

/// One panel row: rank, name, total score, games played
pub fn leaderboard_row(rank: usize, record: &PlayerRecord) -> String {
    format!(
        "{rank}. {:<10} {:>5}  {:>2}",
        record.display_name(),
        record.total_score,
        record.games_played
    )
}

/// Panel lines for a fetch result
pub fn leaderboard_lines(result: &Result<Vec<PlayerRecord>, LeaderboardError>) -> Vec<String> {
    match result {
        Ok(records) if records.is_empty() => vec!["No scores yet!".to_string()],
        Ok(records) => records
            .iter()
            .enumerate()
            .map(|(i, r)| leaderboard_row(i + 1, r))
            .collect(),
        Err(err) => {
            log::warn!("Leaderboard fetch failed: {err}");
            vec!["Error loading".to_string()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Gun;

    fn record(name: &str, total: u64, games: u32) -> PlayerRecord {
        PlayerRecord {
            address: "0xdeadbeefcafe".into(),
            username: name.into(),
            fid: 0,
            pfp: String::new(),
            total_score: total,
            games_played: games,
            highest_score: total,
        }
    }

    #[test]
    fn test_hud_texts() {
        let mut state = GameState::new(1);
        state.score = 70;
        state.cash = 12;
        state.player.health = 3;
        state.gate.meter = 2;
        let hud = HudView::from_state(&state);
        assert_eq!(hud.score_text, "Score:70");
        assert_eq!(hud.cash_text, "$ 12");
        assert!((hud.health_fraction - 0.6).abs() < 1e-6);
        assert!((hud.mutation_fraction - 0.5).abs() < 1e-6);
        assert_eq!(hud.clock_text, "09:00");
        assert_eq!(hud.phase_label, "Day: 1");
        assert_eq!(hud.icon, SkyIcon::Sun);
        assert_eq!(hud.confirm_label, "CONFIRM");
        assert!(!hud.shop_visible);
        assert!(hud.offers.is_empty());
    }

    #[test]
    fn test_shop_offers_enabled_flags() {
        let mut state = GameState::new(1);
        state.player.pos = state.world.shop;
        state.near_shop = shop::menu_visible(&state);
        state.cash = 60;
        state.player.health = 4;
        let offers = shop_offers(&state);
        assert!(offers.iter().all(|o| o.enabled));

        state.player.gun = Gun::Shotgun;
        state.player.health = MAX_HEALTH;
        let offers = shop_offers(&state);
        assert!(offers.iter().all(|o| !o.enabled));
        assert_eq!(offers[0].label, "STIMMY");
        assert_eq!(offers[1].cost, SHOTGUN_COST);
    }

    #[test]
    fn test_leaderboard_lines() {
        let lines = leaderboard_lines(&Ok(vec![record("zed", 120, 3), record("", 9, 1)]));
        assert_eq!(lines[0], "1. zed          120   3");
        assert_eq!(lines[1], "2. 0xdeadbe       9   1");
        assert_eq!(leaderboard_lines(&Ok(Vec::new())), vec!["No scores yet!"]);
        assert_eq!(
            leaderboard_lines(&Err(LeaderboardError::Unavailable("down".into()))),
            vec!["Error loading"]
        );
    }
}
