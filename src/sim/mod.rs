//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod combat;
pub mod shop;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;

pub use clock::{PhaseTransition, WorldClock};
pub use collision::CollisionResult;
pub use shop::{PurchaseOutcome, RejectReason, ShopItem};
pub use state::{
    Bullet, Facing, GameEvent, GameState, Gun, Money, Player, Rect, World, Zombie, ZombieKind,
};
pub use tick::{MoveKeys, TickInput, tick};
pub use timer::OneShotTimer;
