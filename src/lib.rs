//! Survivor Zombies - a day/night wave survival shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clock, spawning, motion, combat, shop)
//! - `puzzle`: DNA puzzle gate driven by the mutation meter
//! - `session`: Title/Running/Ended lifecycle and the reward claim flow
//! - `services`: Contracts for the wallet, leaderboard store and host platform
//! - `ui`: View models read from the simulation every frame
//! - `render`: World draw list and the canvas painter
//! - `audio`: Sound effects and night music driven by frame events
//! - `platform`: Browser glue (wallet provider, host SDK, storage)

pub mod audio;
pub mod platform;
pub mod puzzle;
pub mod render;
pub mod services;
pub mod session;
pub mod settings;
pub mod sim;
pub mod ui;

pub use session::{Session, SessionConfig, SessionPhase};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Viewport size in CSS pixels (portrait mini app)
    pub const VIEW_WIDTH: f32 = 360.0;
    pub const VIEW_HEIGHT: f32 = 640.0;
    /// Everything in the world is drawn 1.5x
    pub const TERRAIN_SCALE: f32 = 1.5;

    /// World rectangle
    pub const WORLD_WIDTH: f32 = 2400.0;
    pub const WORLD_HEIGHT: f32 = 2400.0;

    /// Player defaults
    pub const PLAYER_START_X: f32 = 450.0 * TERRAIN_SCALE;
    pub const PLAYER_START_Y: f32 = 550.0 * TERRAIN_SCALE;
    pub const PLAYER_SPEED: f32 = 260.0 * TERRAIN_SCALE;
    pub const PLAYER_RADIUS: f32 = 16.0 * TERRAIN_SCALE;
    pub const MAX_HEALTH: u8 = 5;
    /// Invulnerability window after being hit (ms)
    pub const INVULN_MS: f32 = 1200.0;
    pub const PLAYER_KNOCKBACK: f32 = 180.0;
    /// Joystick handle travel (px) and velocity gain
    pub const JOYSTICK_MAX_DISTANCE: f32 = 40.0;
    pub const JOYSTICK_GAIN: f32 = 4.0;

    /// Knockback decay rate (1/s)
    pub const KNOCKBACK_DAMPING: f32 = 8.0;

    /// Clock: 6 in-game hours of day in 15 s, 18 hours of night in 45 s
    pub const MINUTES_PER_DAY: f32 = 1440.0;
    pub const DAY_START_HOUR: u32 = 9;
    pub const NIGHT_START_HOUR: u32 = 15;
    pub const DAY_REAL_SECONDS: f32 = 15.0;
    pub const NIGHT_REAL_SECONDS: f32 = 45.0;
    pub const DAY_GAME_MINUTES: f32 = 6.0 * 60.0;
    pub const NIGHT_GAME_MINUTES: f32 = 18.0 * 60.0;
    pub const START_TIME_MINUTES: f32 = 9.0 * 60.0;

    /// Spawner
    pub const SPAWN_DELAY_BASE_MS: f32 = 3000.0;
    pub const SPAWN_DELAY_STEP_MS: f32 = 500.0;
    pub const SPAWN_DELAY_MIN_MS: f32 = 1500.0;
    pub const SPAWN_MARGIN_FACTOR: f32 = 0.6;
    pub const SPAWN_JITTER_MIN: i32 = 80;
    pub const SPAWN_JITTER_MAX: i32 = 220;
    /// Percent chance a kill at night pulls in a replacement
    pub const CHAIN_SPAWN_PERCENT: u32 = 18;

    /// Hostile flash on hit (ms)
    pub const ZOMBIE_FLASH_MS: f32 = 80.0;
    pub const ZOMBIE_KNOCKBACK: f32 = 80.0;

    /// Weapons
    pub const BULLET_SPEED: f32 = 900.0;
    pub const BULLET_RADIUS: f32 = 3.0 * TERRAIN_SCALE;
    pub const MAX_BULLETS: usize = 40;
    pub const MUZZLE_OFFSET: f32 = 20.0;
    pub const PISTOL_COOLDOWN_MS: f64 = 180.0;
    pub const SHOTGUN_COOLDOWN_MS: f64 = 400.0;
    pub const PISTOL_LIFETIME_MS: f32 = 300.0;
    pub const SHOTGUN_LIFETIME_MS: f32 = 200.0;
    pub const SHOTGUN_PELLETS: u32 = 3;
    pub const SHOTGUN_SPREAD_DEG: f32 = 8.0;

    /// Pickups
    pub const MONEY_RADIUS: f32 = 12.0 * TERRAIN_SCALE;
    pub const MONEY_MIN: u32 = 1;
    pub const MONEY_MAX: u32 = 3;

    /// Shop
    pub const SHOP_X: f32 = 620.0 * TERRAIN_SCALE;
    pub const SHOP_Y: f32 = 470.0 * TERRAIN_SCALE;
    pub const SHOP_INTERACT_RADIUS: f32 = 90.0;
    pub const HEAL_COST: u32 = 10;
    pub const SHOTGUN_COST: u32 = 50;

    /// Puzzle gate
    pub const MUTATION_KILLS_NEEDED: u8 = 4;
    pub const PUZZLE_BONUS: u64 = 50;
    pub const CONFIRM_RESET_MS: f32 = 1000.0;
    pub const INFECTION_DRAIN_MS: f32 = 5000.0;

    /// Session / claim
    pub const START_DELAY_MS: f32 = 1500.0;
    pub const CHEST_DELAY_MS: f32 = 1500.0;
    pub const CHEST_ANIM_MS: f32 = 1000.0;
    pub const REWARD_MIN: u32 = 10;
    pub const REWARD_MAX: u32 = 100;
    /// Base mainnet
    pub const CHAIN_ID: &str = "0x2105";
    pub const LEADERBOARD_PANEL_SIZE: usize = 5;
}

/// Angle (radians) from `from` toward `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for an angle in radians
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
