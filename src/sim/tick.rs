//! Per-frame simulation step
//!
//! Order within a frame: clock (and its phase transitions), spawner, puzzle
//! input, motion, shop and firing, combat, timers. Everything runs on the
//! one `GameState`; nothing here touches the platform.

use glam::Vec2;

use super::clock::PhaseTransition;
use super::collision::{clamp_to_bounds, push_out_of_obstacles};
use super::combat;
use super::shop::{self, ShopItem};
use super::spawner;
use super::state::{Facing, GameEvent, GameState};
use crate::angle_between;
use crate::consts::*;
use crate::puzzle::{GateOutcome, PuzzleAction};

/// Keyboard movement keys held this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub keys: MoveKeys,
    /// Virtual joystick handle offset from its base (px); overrides keys
    pub joystick: Option<Vec2>,
    /// Pointer position in world coordinates
    pub aim: Option<Vec2>,
    /// Pointer pressed outside any button
    pub fire: bool,
    pub purchase: Option<ShopItem>,
    /// Trigger affordance tapped
    pub accept_puzzle: bool,
    pub puzzle: Option<PuzzleAction>,
}

/// Steered player velocity from keys or joystick
pub fn steer_velocity(keys: MoveKeys, joystick: Option<Vec2>) -> Vec2 {
    if let Some(offset) = joystick {
        let dist = offset.length();
        if dist > 0.0 {
            let dist = dist.min(JOYSTICK_MAX_DISTANCE);
            return offset / offset.length() * dist * JOYSTICK_GAIN;
        }
    }
    // Single axis, priority left > right > up > down
    if keys.left {
        Vec2::new(-PLAYER_SPEED, 0.0)
    } else if keys.right {
        Vec2::new(PLAYER_SPEED, 0.0)
    } else if keys.up {
        Vec2::new(0.0, -PLAYER_SPEED)
    } else if keys.down {
        Vec2::new(0.0, PLAYER_SPEED)
    } else {
        Vec2::ZERO
    }
}

/// Player facing from velocity, horizontal first
pub fn facing_from_velocity(vel: Vec2) -> Facing {
    if vel.x < 0.0 {
        Facing::Left
    } else if vel.x > 0.0 {
        Facing::Right
    } else if vel.y < 0.0 {
        Facing::Up
    } else if vel.y > 0.0 {
        Facing::Down
    } else {
        Facing::Idle
    }
}

/// Hostile facing bucket for a heading in degrees (y axis points down)
pub fn facing_toward(degrees: f32) -> Facing {
    if degrees > -45.0 && degrees <= 45.0 {
        Facing::Right
    } else if degrees > 45.0 && degrees <= 135.0 {
        Facing::Down
    } else if degrees > 135.0 || degrees <= -135.0 {
        Facing::Left
    } else {
        Facing::Up
    }
}

/// Exponential decay factor for knockback over `dt` seconds
fn knockback_decay(dt: f32) -> f32 {
    (-KNOCKBACK_DAMPING * dt).exp()
}

/// Advance the game state by one frame of `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    let dt_ms = dt_ms.max(0.0);
    state.time_ms += f64::from(dt_ms);

    for transition in state.clock.advance(dt_ms) {
        apply_transition(state, transition);
    }

    spawner::update(state, dt_ms);

    handle_puzzle_input(state, input);

    move_player(state, input, dt_ms);
    move_zombies(state, dt_ms);
    combat::advance_bullets(state, dt_ms);

    state.near_shop = shop::menu_visible(state);
    if let Some(item) = input.purchase {
        shop::purchase(state, item);
    }
    if input.fire && firing_allowed(state) {
        combat::fire(state);
    }

    combat::resolve_bullet_obstacles(state);
    combat::resolve_bullet_zombies(state);
    combat::resolve_zombie_player(state);
    combat::resolve_pickups(state);
    combat::update_invulnerability(state, dt_ms);

    if state.gate.advance(dt_ms) && !state.player.is_dead() {
        state.player.lose_health();
        let health = state.player.health;
        log::debug!("Infection drains health to {health}");
        state.push_event(GameEvent::InfectionDamage { health });
    }

    state.prune();
    state.normalize_order();
}

/// Firing is suspended while the gate is open, the shop menu is up, or the player is down
pub fn firing_allowed(state: &GameState) -> bool {
    state.gate.is_inactive() && !state.near_shop && !state.player.is_dead()
}

fn apply_transition(state: &mut GameState, transition: PhaseTransition) {
    let wave = state.wave();
    match transition {
        PhaseTransition::DayBreak => {
            let count = state.wipe_zombies();
            state.push_event(GameEvent::ZombiesWiped { count });
            state.shop_open = true;
            state.spawner.timer_ms = 0.0;
            if state.gate.cure() {
                log::info!("Dawn cures the infection");
                state.push_event(GameEvent::InfectionCured);
            }
            state.push_event(GameEvent::DayBreak { wave });
        }
        PhaseTransition::NightFall => {
            state.shop_open = false;
            state.push_event(GameEvent::NightFall { wave });
        }
    }
}

fn handle_puzzle_input(state: &mut GameState, input: &TickInput) {
    if input.accept_puzzle {
        let wave = state.wave();
        if let Some(kind) = state.gate.accept(wave, &mut state.rng) {
            for zombie in &mut state.zombies {
                zombie.vel = Vec2::ZERO;
            }
            state.push_event(GameEvent::PuzzleStarted {
                variant: kind.as_str(),
            });
        }
    }

    let Some(action) = input.puzzle else {
        return;
    };
    match state.gate.apply(action) {
        GateOutcome::Solved { bonus } => {
            state.score += bonus;
            state.push_event(GameEvent::PuzzleSolved { bonus });
        }
        GateOutcome::Wrong => state.push_event(GameEvent::PuzzleWrong),
        GateOutcome::Infected => state.push_event(GameEvent::PlayerInfected),
        GateOutcome::Ignored
        | GateOutcome::Updated
        | GateOutcome::Resumed
        | GateOutcome::InfectionStarted => {}
    }
}

fn move_player(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    let dt = dt_ms / 1000.0;
    let bounds = state.world.bounds;
    let player = &mut state.player;

    player.vel = steer_velocity(input.keys, input.joystick);
    player.facing = facing_from_velocity(player.vel);

    let pos = player.pos + (player.vel + player.knockback) * dt;
    player.knockback *= knockback_decay(dt);
    let pos = push_out_of_obstacles(pos, PLAYER_RADIUS, &state.world.obstacles);
    player.pos = clamp_to_bounds(pos, PLAYER_RADIUS, &bounds);

    if let Some(target) = input.aim {
        player.aim_angle = angle_between(player.pos, target);
        player.gun_flipped = target.x < player.pos.x;
    }
}

fn move_zombies(state: &mut GameState, dt_ms: f32) {
    let dt = dt_ms / 1000.0;
    let frozen = state.gate.freezes_world();
    let target = state.player.pos;
    let bounds = state.world.bounds;

    for zombie in state.zombies.iter_mut().filter(|z| z.active) {
        zombie.flash_ms = (zombie.flash_ms - dt_ms).max(0.0);
        if frozen {
            zombie.vel = Vec2::ZERO;
            continue;
        }

        let heading = angle_between(zombie.pos, target);
        zombie.vel = (target - zombie.pos).normalize_or_zero() * zombie.base_speed;
        zombie.facing = facing_toward(heading.to_degrees());

        let radius = zombie.radius();
        let pos = zombie.pos + (zombie.vel + zombie.knockback) * dt;
        zombie.knockback *= knockback_decay(dt);
        let pos = push_out_of_obstacles(pos, radius, &state.world.obstacles);
        zombie.pos = clamp_to_bounds(pos, radius, &bounds);
    }
}
