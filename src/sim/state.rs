//! Game state and core simulation types
//!
//! Everything the frame update mutates lives in one owned `GameState`.
//! Entity collections are kept sorted by id so iteration order never depends
//! on insertion history.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::WorldClock;
use super::spawner::Spawner;
use crate::consts::*;
use crate::puzzle::PuzzleGate;

/// Equipped weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gun {
    #[default]
    Pistol,
    Shotgun,
}

impl Gun {
    /// Minimum time between shots
    pub fn cooldown_ms(self) -> f64 {
        match self {
            Gun::Pistol => PISTOL_COOLDOWN_MS,
            Gun::Shotgun => SHOTGUN_COOLDOWN_MS,
        }
    }

    /// How long a fired projectile lives
    pub fn lifetime_ms(self) -> f32 {
        match self {
            Gun::Pistol => PISTOL_LIFETIME_MS,
            Gun::Shotgun => SHOTGUN_LIFETIME_MS,
        }
    }

    pub fn pellets(self) -> u32 {
        match self {
            Gun::Pistol => 1,
            Gun::Shotgun => SHOTGUN_PELLETS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gun::Pistol => "pistol",
            Gun::Shotgun => "shotgun",
        }
    }
}

/// Hostile archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZombieKind {
    Normal,
    Kid,
    Giant,
}

impl ZombieKind {
    /// Draw order for the weighted spawn roll
    pub const ALL: [ZombieKind; 3] = [ZombieKind::Normal, ZombieKind::Kid, ZombieKind::Giant];

    pub fn spawn_weight(self) -> u32 {
        match self {
            ZombieKind::Normal => 40,
            ZombieKind::Kid => 35,
            ZombieKind::Giant => 25,
        }
    }

    /// Score awarded on kill
    pub fn reward(self) -> u64 {
        match self {
            ZombieKind::Normal => 5,
            ZombieKind::Kid => 10,
            ZombieKind::Giant => 25,
        }
    }

    /// Body radius used for overlap tests
    pub fn radius(self) -> f32 {
        match self {
            ZombieKind::Normal => 16.0 * TERRAIN_SCALE,
            ZombieKind::Kid => 14.0 * TERRAIN_SCALE,
            ZombieKind::Giant => 24.0 * TERRAIN_SCALE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ZombieKind::Normal => "normal",
            ZombieKind::Kid => "kid",
            ZombieKind::Giant => "giant",
        }
    }
}

/// Animation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Idle,
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Steered velocity from input
    pub vel: Vec2,
    /// Decaying impulse applied on top of `vel`
    pub knockback: Vec2,
    /// 0..=MAX_HEALTH
    pub health: u8,
    pub can_be_hit: bool,
    /// Remaining invulnerability (ms)
    pub invuln_ms: f32,
    pub facing: Facing,
    /// Gun rotation in radians
    pub aim_angle: f32,
    /// Pointer is left of the player
    pub gun_flipped: bool,
    pub gun: Gun,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            vel: Vec2::ZERO,
            knockback: Vec2::ZERO,
            health: MAX_HEALTH,
            can_be_hit: true,
            invuln_ms: 0.0,
            facing: Facing::Idle,
            aim_angle: 0.0,
            gun_flipped: false,
            gun: Gun::Pistol,
        }
    }
}

impl Player {
    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Lose one health point, clamped at zero
    pub fn lose_health(&mut self) {
        self.health = self.health.saturating_sub(1);
    }

    /// Gain one health point, clamped at the maximum
    pub fn gain_health(&mut self) {
        self.health = (self.health + 1).min(MAX_HEALTH);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zombie {
    pub id: u32,
    pub kind: ZombieKind,
    pub health: u32,
    pub base_speed: f32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub knockback: Vec2,
    pub facing: Facing,
    /// Remaining hit flash (ms)
    pub flash_ms: f32,
    pub active: bool,
}

impl Zombie {
    pub fn radius(&self) -> f32 {
        self.kind.radius()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    /// Remaining lifetime (ms)
    pub ttl_ms: f32,
    pub active: bool,
}

/// Currency pickup dropped by a kill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Money {
    pub id: u32,
    pub pos: Vec2,
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            min: Vec2::new(x0, y0),
            max: Vec2::new(x1, y1),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// Static layout: bounds, obstacles and the shop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub bounds: Rect,
    /// Buildings, fences and parked cars
    pub obstacles: Vec<Rect>,
    pub shop: Vec2,
}

impl Default for World {
    fn default() -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, WORLD_WIDTH, WORLD_HEIGHT),
            obstacles: vec![
                Rect::new(300.0, 300.0, 520.0, 460.0),
                Rect::new(1200.0, 300.0, 1500.0, 520.0),
                Rect::new(200.0, 1000.0, 500.0, 1030.0),
                Rect::new(1100.0, 1100.0, 1400.0, 1250.0),
                Rect::new(400.0, 1300.0, 700.0, 1500.0),
                Rect::new(1600.0, 1500.0, 1900.0, 1800.0),
            ],
            shop: Vec2::new(SHOP_X, SHOP_Y),
        }
    }
}

impl World {
    /// A world without obstacles (handy for deterministic tests)
    pub fn open() -> Self {
        Self {
            obstacles: Vec::new(),
            ..Self::default()
        }
    }
}

/// Things that happened during a frame, drained by the session for
/// feedback (sound, haptics, log lines, host notifications)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ShotFired { gun: Gun, pellets: u32 },
    ZombieSpawned { id: u32, kind: ZombieKind },
    ZombieHit { id: u32 },
    ZombieKilled { id: u32, kind: ZombieKind, reward: u64 },
    /// Hostiles cleared at dawn
    ZombiesWiped { count: usize },
    BulletImpact { pos: Vec2 },
    PlayerHit { health: u8 },
    CashCollected { amount: u32 },
    Purchased { item: &'static str },
    DayBreak { wave: u32 },
    NightFall { wave: u32 },
    PuzzleReady,
    PuzzleStarted { variant: &'static str },
    PuzzleWrong,
    PuzzleSolved { bonus: u64 },
    PlayerInfected,
    InfectionDamage { health: u8 },
    InfectionCured,
    PlayerDied,
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Simulation time since the run started (ms)
    pub time_ms: f64,
    pub clock: WorldClock,
    pub spawner: Spawner,
    pub player: Player,
    /// Sorted by id
    pub zombies: Vec<Zombie>,
    /// Sorted by id
    pub bullets: Vec<Bullet>,
    /// Sorted by id
    pub money: Vec<Money>,
    pub world: World,
    pub score: u64,
    pub cash: u32,
    pub kills: u32,
    /// Simulation time of the last shot
    pub last_fired_ms: Option<f64>,
    /// Opens at dawn, closes at dusk
    pub shop_open: bool,
    /// Day and within interaction range of the shop
    pub near_shop: bool,
    pub gate: PuzzleGate,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(seed, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(seed: u64, rng: Pcg32) -> Self {
        let clock = WorldClock::new();
        let shop_open = clock.is_day;
        Self {
            seed,
            rng,
            time_ms: 0.0,
            clock,
            spawner: Spawner::default(),
            player: Player::default(),
            zombies: Vec::new(),
            bullets: Vec::new(),
            money: Vec::new(),
            world: World::default(),
            score: 0,
            cash: 0,
            kills: 0,
            last_fired_ms: None,
            shop_open,
            near_shop: false,
            gate: PuzzleGate::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Fresh run in the same world. The RNG keeps running so consecutive runs differ.
    pub fn reset(&mut self) {
        let world = std::mem::take(&mut self.world);
        let rng = self.rng.clone();
        *self = Self::with_rng(self.seed, rng);
        self.world = world;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn wave(&self) -> u32 {
        self.clock.wave_number
    }

    pub fn is_day(&self) -> bool {
        self.clock.is_day
    }

    /// Remove every hostile, returning how many were live
    pub fn wipe_zombies(&mut self) -> usize {
        let count = self.zombies.iter().filter(|z| z.active).count();
        self.zombies.clear();
        count
    }

    /// Drop inactive entities
    pub fn prune(&mut self) {
        self.zombies.retain(|z| z.active);
        self.bullets.retain(|b| b.active);
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.zombies.sort_by_key(|z| z.id);
        self.bullets.sort_by_key(|b| b.id);
        self.money.sort_by_key(|m| m.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(7);
        assert_eq!(state.player.health, MAX_HEALTH);
        assert_eq!(state.player.gun, Gun::Pistol);
        assert_eq!(state.score, 0);
        assert_eq!(state.cash, 0);
        assert_eq!(state.wave(), 1);
        assert!(state.shop_open);
    }

    #[test]
    fn test_entity_ids_increase() {
        let mut state = GameState::new(1);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_health_is_clamped() {
        let mut player = Player::default();
        player.gain_health();
        assert_eq!(player.health, MAX_HEALTH);
        for _ in 0..10 {
            player.lose_health();
        }
        assert_eq!(player.health, 0);
        assert!(player.is_dead());
    }

    #[test]
    fn test_world_start_positions_are_clear() {
        let world = World::default();
        let start = Vec2::new(PLAYER_START_X, PLAYER_START_Y);
        for rect in &world.obstacles {
            assert!(!rect.contains(start));
            assert!(rect.closest_point(world.shop).distance(world.shop) > SHOP_INTERACT_RADIUS);
        }
    }

    #[test]
    fn test_reset_keeps_world_and_clears_progress() {
        let mut state = GameState::new(3);
        state.world = World::open();
        state.score = 99;
        state.cash = 12;
        state.player.gun = Gun::Shotgun;
        state.reset();
        assert_eq!(state.score, 0);
        assert_eq!(state.cash, 0);
        assert_eq!(state.player.gun, Gun::Pistol);
        assert!(state.world.obstacles.is_empty());
    }
}
