//! Firing and pairwise combat rules
//!
//! Each rule is a plain function over `GameState`, run once per frame by
//! `tick` in a fixed order: bullets vs obstacles, bullets vs hostiles,
//! hostiles vs player, player vs pickups.

use glam::Vec2;
use rand::Rng;

use super::collision::{circles_overlap, first_obstacle_contact};
use super::spawner;
use super::state::{Bullet, GameEvent, GameState, Money};
use crate::consts::*;
use crate::direction;

/// Angular offsets (radians) for each pellet, symmetric around the aim
pub fn pellet_offsets(pellets: u32) -> Vec<f32> {
    let spread = SHOTGUN_SPREAD_DEG.to_radians();
    let mid = (pellets.saturating_sub(1)) as f32 / 2.0;
    (0..pellets).map(|i| (i as f32 - mid) * spread).collect()
}

/// Whether the equipped gun has cooled down
pub fn can_fire(state: &GameState) -> bool {
    match state.last_fired_ms {
        Some(last) => state.time_ms - last >= state.player.gun.cooldown_ms(),
        None => true,
    }
}

/// Fire the equipped gun along the player's aim.
///
/// Returns false if the gun is still cooling down. Pellets beyond the live
/// projectile capacity are dropped.
pub fn fire(state: &mut GameState) -> bool {
    if !can_fire(state) {
        return false;
    }
    let gun = state.player.gun;
    let aim = state.player.aim_angle;
    let muzzle = state.player.pos + direction(aim) * MUZZLE_OFFSET;

    let mut live = state.bullets.iter().filter(|b| b.active).count();
    let mut spawned = 0;
    for offset in pellet_offsets(gun.pellets()) {
        if live >= MAX_BULLETS {
            break;
        }
        let angle = aim + offset;
        let id = state.next_entity_id();
        state.bullets.push(Bullet {
            id,
            pos: muzzle,
            vel: direction(angle) * BULLET_SPEED,
            rotation: angle,
            ttl_ms: gun.lifetime_ms(),
            active: true,
        });
        live += 1;
        spawned += 1;
    }

    state.last_fired_ms = Some(state.time_ms);
    state.push_event(GameEvent::ShotFired {
        gun,
        pellets: spawned,
    });
    true
}

/// Move projectiles and expire them by lifetime or leaving the world
pub fn advance_bullets(state: &mut GameState, dt_ms: f32) {
    let dt = dt_ms / 1000.0;
    let bounds = state.world.bounds;
    for bullet in state.bullets.iter_mut().filter(|b| b.active) {
        bullet.pos += bullet.vel * dt;
        bullet.ttl_ms -= dt_ms;
        if bullet.ttl_ms <= 0.0 || !bounds.contains(bullet.pos) {
            bullet.active = false;
        }
    }
}

/// Projectiles that touch an obstacle are destroyed; the impact sits on its surface
pub fn resolve_bullet_obstacles(state: &mut GameState) {
    let mut impacts = Vec::new();
    for bullet in state.bullets.iter_mut().filter(|b| b.active) {
        if let Some(contact) = first_obstacle_contact(bullet.pos, BULLET_RADIUS, &state.world.obstacles) {
            bullet.active = false;
            impacts.push(contact.point);
        }
    }
    for pos in impacts {
        state.push_event(GameEvent::BulletImpact { pos });
    }
}

/// Each projectile damages at most one hostile, on first contact
pub fn resolve_bullet_zombies(state: &mut GameState) {
    let mut killed = Vec::new();

    for bi in 0..state.bullets.len() {
        if !state.bullets[bi].active {
            continue;
        }
        let bullet_pos = state.bullets[bi].pos;
        let target = state.zombies.iter().position(|z| {
            z.active && circles_overlap(bullet_pos, BULLET_RADIUS, z.pos, z.radius())
        });
        let Some(zi) = target else {
            continue;
        };

        state.bullets[bi].active = false;
        let zombie = &mut state.zombies[zi];
        zombie.health = zombie.health.saturating_sub(1);
        zombie.flash_ms = ZOMBIE_FLASH_MS;
        let id = zombie.id;
        if zombie.health == 0 {
            zombie.active = false;
            killed.push(zi);
        } else {
            let push = (zombie.pos - bullet_pos).normalize_or_zero();
            zombie.knockback += push * ZOMBIE_KNOCKBACK;
            state.push_event(GameEvent::ZombieHit { id });
        }
    }

    for zi in killed {
        on_zombie_killed(state, zi);
    }
}

/// Kill bookkeeping: score, kill count, pickup drop, meter, chain spawn
fn on_zombie_killed(state: &mut GameState, zi: usize) {
    let (id, kind, pos) = {
        let z = &state.zombies[zi];
        (z.id, z.kind, z.pos)
    };
    let reward = kind.reward();
    state.kills += 1;
    state.score += reward;

    let money_id = state.next_entity_id();
    state.money.push(Money { id: money_id, pos });

    log::debug!("Killed {} #{id}: +{reward} (score {})", kind.as_str(), state.score);
    state.push_event(GameEvent::ZombieKilled { id, kind, reward });

    if state.gate.record_kill() {
        state.push_event(GameEvent::PuzzleReady);
    }
    spawner::maybe_chain_spawn(state);
}

/// Contact damage, ignored during the invulnerability window
pub fn resolve_zombie_player(state: &mut GameState) {
    if !state.player.can_be_hit || state.player.is_dead() {
        return;
    }
    let player_pos = state.player.pos;
    let attacker = state
        .zombies
        .iter()
        .find(|z| z.active && circles_overlap(player_pos, PLAYER_RADIUS, z.pos, z.radius()))
        .map(|z| z.pos);
    let Some(zombie_pos) = attacker else {
        return;
    };

    let player = &mut state.player;
    player.can_be_hit = false;
    player.invuln_ms = INVULN_MS;
    player.lose_health();
    let away: Vec2 = (player_pos - zombie_pos).normalize_or_zero();
    player.knockback += away * PLAYER_KNOCKBACK;
    let health = player.health;

    log::debug!("Player hit, health {health}");
    state.push_event(GameEvent::PlayerHit { health });
}

/// Count down the invulnerability window
pub fn update_invulnerability(state: &mut GameState, dt_ms: f32) {
    let player = &mut state.player;
    if player.can_be_hit {
        return;
    }
    player.invuln_ms -= dt_ms;
    if player.invuln_ms <= 0.0 {
        player.invuln_ms = 0.0;
        player.can_be_hit = true;
    }
}

/// Walking over a pickup collects 1..=3 cash
pub fn resolve_pickups(state: &mut GameState) {
    let player_pos = state.player.pos;
    let mut collected = 0;
    state.money.retain(|m| {
        let touching = circles_overlap(player_pos, PLAYER_RADIUS, m.pos, MONEY_RADIUS);
        if touching {
            collected += 1;
        }
        !touching
    });
    for _ in 0..collected {
        let amount = state.rng.random_range(MONEY_MIN..=MONEY_MAX);
        state.cash += amount;
        state.push_event(GameEvent::CashCollected { amount });
    }
}
