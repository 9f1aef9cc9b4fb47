//! Daytime shop: heal and weapon upgrade
//!
//! Purchases are only accepted while the shop menu is visible (day and the
//! player within reach of the counter). A failed precondition leaves state
//! untouched and reports why.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState, Gun};
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopItem {
    /// +1 health
    Heal,
    /// Switch to the shotgun
    Shotgun,
}

impl ShopItem {
    pub const ALL: [ShopItem; 2] = [ShopItem::Heal, ShopItem::Shotgun];

    pub fn cost(self) -> u32 {
        match self {
            ShopItem::Heal => HEAL_COST,
            ShopItem::Shotgun => SHOTGUN_COST,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShopItem::Heal => "STIMMY",
            ShopItem::Shotgun => "SHOTGUN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    ShopClosed,
    NotEnoughCash,
    FullHealth,
    AlreadyOwned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Bought(ShopItem),
    Rejected(RejectReason),
}

/// Shop menu visibility: day and within the interaction radius
pub fn menu_visible(state: &GameState) -> bool {
    state.is_day()
        && state.shop_open
        && state.player.pos.distance(state.world.shop) <= SHOP_INTERACT_RADIUS
}

/// Why `item` can't be bought right now, if anything
pub fn check(state: &GameState, item: ShopItem) -> Option<RejectReason> {
    if !state.near_shop {
        return Some(RejectReason::ShopClosed);
    }
    if state.cash < item.cost() {
        return Some(RejectReason::NotEnoughCash);
    }
    match item {
        ShopItem::Heal if state.player.health >= MAX_HEALTH => Some(RejectReason::FullHealth),
        ShopItem::Shotgun if state.player.gun == Gun::Shotgun => Some(RejectReason::AlreadyOwned),
        _ => None,
    }
}

pub fn purchase(state: &mut GameState, item: ShopItem) -> PurchaseOutcome {
    if let Some(reason) = check(state, item) {
        log::debug!("Purchase of {} rejected: {reason:?}", item.label());
        return PurchaseOutcome::Rejected(reason);
    }
    state.cash -= item.cost();
    match item {
        ShopItem::Heal => state.player.gain_health(),
        ShopItem::Shotgun => state.player.gun = Gun::Shotgun,
    }
    log::info!("Bought {} for ${}", item.label(), item.cost());
    state.push_event(GameEvent::Purchased { item: item.label() });
    PurchaseOutcome::Bought(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_counter() -> GameState {
        let mut state = GameState::new(2);
        state.player.pos = state.world.shop;
        state.near_shop = menu_visible(&state);
        assert!(state.near_shop);
        state
    }

    #[test]
    fn test_heal_with_too_little_cash_is_noop() {
        let mut state = at_counter();
        state.cash = 5;
        state.player.health = 3;
        let outcome = purchase(&mut state, ShopItem::Heal);
        assert_eq!(outcome, PurchaseOutcome::Rejected(RejectReason::NotEnoughCash));
        assert_eq!(state.cash, 5);
        assert_eq!(state.player.health, 3);
    }

    #[test]
    fn test_heal_at_full_health_is_noop() {
        let mut state = at_counter();
        state.cash = 40;
        let outcome = purchase(&mut state, ShopItem::Heal);
        assert_eq!(outcome, PurchaseOutcome::Rejected(RejectReason::FullHealth));
        assert_eq!(state.cash, 40);
    }

    #[test]
    fn test_heal_spends_ten() {
        let mut state = at_counter();
        state.cash = 12;
        state.player.health = 2;
        assert_eq!(purchase(&mut state, ShopItem::Heal), PurchaseOutcome::Bought(ShopItem::Heal));
        assert_eq!(state.cash, 2);
        assert_eq!(state.player.health, 3);
    }

    #[test]
    fn test_shotgun_upgrade_once() {
        let mut state = at_counter();
        state.cash = 120;
        assert_eq!(
            purchase(&mut state, ShopItem::Shotgun),
            PurchaseOutcome::Bought(ShopItem::Shotgun)
        );
        assert_eq!(state.player.gun, Gun::Shotgun);
        assert_eq!(state.cash, 70);
        assert_eq!(
            purchase(&mut state, ShopItem::Shotgun),
            PurchaseOutcome::Rejected(RejectReason::AlreadyOwned)
        );
        assert_eq!(state.cash, 70);
    }

    #[test]
    fn test_shop_closed_away_from_counter() {
        let mut state = GameState::new(2);
        state.cash = 100;
        state.player.health = 1;
        state.near_shop = menu_visible(&state);
        assert!(!state.near_shop);
        assert_eq!(
            purchase(&mut state, ShopItem::Heal),
            PurchaseOutcome::Rejected(RejectReason::ShopClosed)
        );
        assert_eq!(state.cash, 100);
    }
}
