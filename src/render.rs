//! World view drawing
//!
//! The draw list is built from `GameState` with the camera centred on the
//! player; the browser paints it on the `#game` canvas.

use glam::Vec2;

use crate::consts::*;
use crate::direction;
use crate::sim::state::{GameState, Rect, ZombieKind};

/// Shop stall footprint
const SHOP_HALF_SIZE: Vec2 = Vec2::new(30.0 * TERRAIN_SCALE, 20.0 * TERRAIN_SCALE);
/// Gun barrel drawn from the player's centre
const GUN_LENGTH: f32 = PLAYER_RADIUS + 10.0;
const GUN_WIDTH: f32 = 4.0;

const OUTSIDE_COLOR: [f32; 4] = [0.05, 0.05, 0.07, 1.0];
const GROUND_COLOR: [f32; 4] = [0.36, 0.45, 0.28, 1.0];
const OBSTACLE_COLOR: [f32; 4] = [0.32, 0.27, 0.22, 1.0];
const SHOP_COLOR: [f32; 4] = [0.75, 0.55, 0.2, 1.0];
const MONEY_COLOR: [f32; 4] = [1.0, 0.85, 0.2, 1.0];
const BULLET_COLOR: [f32; 4] = [1.0, 0.95, 0.6, 1.0];
const PLAYER_COLOR: [f32; 4] = [0.25, 0.55, 0.95, 1.0];
const GUN_COLOR: [f32; 4] = [0.15, 0.15, 0.15, 1.0];
const FLASH_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const NIGHT_TINT: [f32; 4] = [0.02, 0.03, 0.12, 0.45];

/// Drawing primitive in screen space
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect { min: Vec2, size: Vec2 },
    Circle { center: Vec2, radius: f32 },
    Line { from: Vec2, to: Vec2, width: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCmd {
    pub shape: Shape,
    pub color: [f32; 4],
}

/// Maps world positions to the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World position of the viewport's top-left corner
    pub origin: Vec2,
}

impl Camera {
    pub fn centered_on(focus: Vec2) -> Self {
        Self {
            origin: focus - Vec2::new(VIEW_WIDTH, VIEW_HEIGHT) * 0.5,
        }
    }

    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world - self.origin
    }

    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.origin
    }

    fn sees_circle(&self, center: Vec2, radius: f32) -> bool {
        let p = self.to_screen(center);
        p.x + radius >= 0.0
            && p.y + radius >= 0.0
            && p.x - radius <= VIEW_WIDTH
            && p.y - radius <= VIEW_HEIGHT
    }

    fn sees_rect(&self, rect: &Rect) -> bool {
        let min = self.to_screen(rect.min);
        let max = self.to_screen(rect.max);
        max.x >= 0.0 && max.y >= 0.0 && min.x <= VIEW_WIDTH && min.y <= VIEW_HEIGHT
    }
}

fn zombie_color(kind: ZombieKind) -> [f32; 4] {
    match kind {
        ZombieKind::Normal => [0.4, 0.6, 0.3, 1.0],
        ZombieKind::Kid => [0.55, 0.75, 0.35, 1.0],
        ZombieKind::Giant => [0.3, 0.4, 0.2, 1.0],
    }
}

/// CSS form of a colour, e.g. `rgba(255,128,0,0.5)`
pub fn css_color(color: [f32; 4]) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({},{},{},{})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

/// Back-to-front draw list for one frame. With `hit_flash` off (reduced
/// motion) struck hostiles keep their colour and the player does not blink.
pub fn world_draw_list(state: &GameState, hit_flash: bool) -> Vec<DrawCmd> {
    let camera = Camera::centered_on(state.player.pos);
    let mut cmds = Vec::with_capacity(
        4 + state.world.obstacles.len() + state.money.len() + state.bullets.len() + state.zombies.len(),
    );
    let view = Vec2::new(VIEW_WIDTH, VIEW_HEIGHT);

    cmds.push(DrawCmd {
        shape: Shape::Rect { min: Vec2::ZERO, size: view },
        color: OUTSIDE_COLOR,
    });
    let bounds = &state.world.bounds;
    cmds.push(DrawCmd {
        shape: Shape::Rect {
            min: camera.to_screen(bounds.min),
            size: bounds.max - bounds.min,
        },
        color: GROUND_COLOR,
    });

    for rect in state.world.obstacles.iter().filter(|r| camera.sees_rect(r)) {
        cmds.push(DrawCmd {
            shape: Shape::Rect {
                min: camera.to_screen(rect.min),
                size: rect.max - rect.min,
            },
            color: OBSTACLE_COLOR,
        });
    }

    let shop = Rect {
        min: state.world.shop - SHOP_HALF_SIZE,
        max: state.world.shop + SHOP_HALF_SIZE,
    };
    if camera.sees_rect(&shop) {
        let mut color = SHOP_COLOR;
        if !state.shop_open {
            color[3] = 0.4;
        }
        cmds.push(DrawCmd {
            shape: Shape::Rect {
                min: camera.to_screen(shop.min),
                size: SHOP_HALF_SIZE * 2.0,
            },
            color,
        });
    }

    for money in state.money.iter().filter(|m| camera.sees_circle(m.pos, MONEY_RADIUS)) {
        cmds.push(DrawCmd {
            shape: Shape::Circle {
                center: camera.to_screen(money.pos),
                radius: MONEY_RADIUS * 0.5,
            },
            color: MONEY_COLOR,
        });
    }

    for bullet in state
        .bullets
        .iter()
        .filter(|b| b.active && camera.sees_circle(b.pos, BULLET_RADIUS))
    {
        cmds.push(DrawCmd {
            shape: Shape::Circle {
                center: camera.to_screen(bullet.pos),
                radius: BULLET_RADIUS,
            },
            color: BULLET_COLOR,
        });
    }

    for zombie in state
        .zombies
        .iter()
        .filter(|z| z.active && camera.sees_circle(z.pos, z.radius()))
    {
        let color = if hit_flash && zombie.flash_ms > 0.0 {
            FLASH_COLOR
        } else {
            zombie_color(zombie.kind)
        };
        cmds.push(DrawCmd {
            shape: Shape::Circle {
                center: camera.to_screen(zombie.pos),
                radius: zombie.radius(),
            },
            color,
        });
    }

    let player = &state.player;
    let center = camera.to_screen(player.pos);
    let mut color = PLAYER_COLOR;
    // Blink at 10 Hz while invulnerable
    if hit_flash && player.invuln_ms > 0.0 && (player.invuln_ms / 100.0) as u32 % 2 == 0 {
        color[3] = 0.35;
    }
    cmds.push(DrawCmd {
        shape: Shape::Circle {
            center,
            radius: PLAYER_RADIUS,
        },
        color,
    });
    cmds.push(DrawCmd {
        shape: Shape::Line {
            from: center,
            to: center + direction(player.aim_angle) * GUN_LENGTH,
            width: GUN_WIDTH,
        },
        color: GUN_COLOR,
    });

    if !state.is_day() {
        cmds.push(DrawCmd {
            shape: Shape::Rect { min: Vec2::ZERO, size: view },
            color: NIGHT_TINT,
        });
    }

    cmds
}

#[cfg(target_arch = "wasm32")]
pub use web::CanvasRenderer;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::f64::consts::TAU;

    use wasm_bindgen::JsCast;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

    use super::{DrawCmd, Shape, css_color};
    use crate::consts::{VIEW_HEIGHT, VIEW_WIDTH};

    /// Paints draw lists on the `#game` canvas
    pub struct CanvasRenderer {
        ctx: CanvasRenderingContext2d,
    }

    impl CanvasRenderer {
        pub fn new(document: &Document) -> Option<Self> {
            let canvas = document
                .get_element_by_id("game")?
                .dyn_into::<HtmlCanvasElement>()
                .ok()?;
            canvas.set_width(VIEW_WIDTH as u32);
            canvas.set_height(VIEW_HEIGHT as u32);
            let ctx = canvas
                .get_context("2d")
                .ok()??
                .dyn_into::<CanvasRenderingContext2d>()
                .ok()?;
            log::info!("Canvas renderer initialized");
            Some(Self { ctx })
        }

        pub fn draw(&self, cmds: &[DrawCmd]) {
            let ctx = &self.ctx;
            ctx.clear_rect(0.0, 0.0, VIEW_WIDTH as f64, VIEW_HEIGHT as f64);
            for cmd in cmds {
                let color = css_color(cmd.color);
                match cmd.shape {
                    Shape::Rect { min, size } => {
                        ctx.set_fill_style_str(&color);
                        ctx.fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
                    }
                    Shape::Circle { center, radius } => {
                        ctx.set_fill_style_str(&color);
                        ctx.begin_path();
                        if ctx
                            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
                            .is_ok()
                        {
                            ctx.fill();
                        }
                    }
                    Shape::Line { from, to, width } => {
                        ctx.set_stroke_style_str(&color);
                        ctx.set_line_width(width as f64);
                        ctx.begin_path();
                        ctx.move_to(from.x as f64, from.y as f64);
                        ctx.line_to(to.x as f64, to.y as f64);
                        ctx.stroke();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Bullet, Facing, World, Zombie};

    fn zombie(id: u32, pos: Vec2, flash_ms: f32) -> Zombie {
        Zombie {
            id,
            kind: ZombieKind::Normal,
            health: 1,
            base_speed: 30.0,
            pos,
            vel: Vec2::ZERO,
            knockback: Vec2::ZERO,
            facing: Facing::Idle,
            flash_ms,
            active: true,
        }
    }

    fn circles(cmds: &[DrawCmd]) -> Vec<(Vec2, f32, [f32; 4])> {
        cmds.iter()
            .filter_map(|c| match c.shape {
                Shape::Circle { center, radius } => Some((center, radius, c.color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_camera_round_trip_centres_player() {
        let camera = Camera::centered_on(Vec2::new(500.0, 800.0));
        assert_eq!(
            camera.to_screen(Vec2::new(500.0, 800.0)),
            Vec2::new(VIEW_WIDTH, VIEW_HEIGHT) * 0.5
        );
        let screen = Vec2::new(12.0, 34.0);
        assert_eq!(camera.to_screen(camera.to_world(screen)), screen);
    }

    #[test]
    fn test_player_drawn_at_view_centre() {
        let mut state = GameState::new(1);
        state.world = World::open();
        let cmds = world_draw_list(&state, true);
        let centre = Vec2::new(VIEW_WIDTH, VIEW_HEIGHT) * 0.5;
        let player = circles(&cmds).last().copied().expect("player circle");
        assert_eq!(player.0, centre);
        assert_eq!(player.1, PLAYER_RADIUS);
        assert!(matches!(cmds.last().map(|c| &c.shape), Some(Shape::Line { from, .. }) if *from == centre));
    }

    #[test]
    fn test_offscreen_entities_culled() {
        let mut state = GameState::new(1);
        state.world = World::open();
        let origin = state.player.pos;
        state.zombies.push(zombie(1, origin + Vec2::new(50.0, 0.0), 0.0));
        state.zombies.push(zombie(2, origin + Vec2::new(VIEW_WIDTH * 2.0, 0.0), 0.0));
        state.bullets.push(Bullet {
            id: 3,
            pos: origin + Vec2::new(0.0, -40.0),
            vel: Vec2::ZERO,
            rotation: 0.0,
            ttl_ms: 100.0,
            active: true,
        });
        let drawn = circles(&world_draw_list(&state, true));
        let centre = Vec2::new(VIEW_WIDTH, VIEW_HEIGHT) * 0.5;
        assert!(drawn.iter().any(|(c, _, _)| *c == centre + Vec2::new(50.0, 0.0)));
        assert!(drawn.iter().any(|(c, r, _)| *c == centre + Vec2::new(0.0, -40.0) && *r == BULLET_RADIUS));
        assert!(!drawn.iter().any(|(c, _, _)| c.x > VIEW_WIDTH));
    }

    #[test]
    fn test_hit_flash_follows_setting() {
        let mut state = GameState::new(1);
        state.world = World::open();
        let pos = state.player.pos + Vec2::new(60.0, 0.0);
        let mut kid = zombie(1, pos, ZOMBIE_FLASH_MS);
        kid.kind = ZombieKind::Kid;
        state.zombies.push(kid);
        let colour_of_zombie = |hit_flash: bool| {
            circles(&world_draw_list(&state, hit_flash))
                .into_iter()
                .find(|(_, radius, _)| *radius == ZombieKind::Kid.radius())
                .map(|(_, _, color)| color)
        };
        assert_eq!(colour_of_zombie(true), Some(FLASH_COLOR));
        assert_eq!(colour_of_zombie(false), Some(zombie_color(ZombieKind::Kid)));
    }

    #[test]
    fn test_night_adds_tint_last_layer() {
        let mut state = GameState::new(1);
        state.world = World::open();
        assert!(!world_draw_list(&state, true).iter().any(|c| c.color == NIGHT_TINT));
        state.clock.advance(DAY_REAL_SECONDS * 1000.0 + 1.0);
        assert!(!state.is_day());
        let cmds = world_draw_list(&state, true);
        assert_eq!(cmds.last().map(|c| c.color), Some(NIGHT_TINT));
    }

    #[test]
    fn test_css_color() {
        assert_eq!(css_color([1.0, 0.5, 0.0, 0.25]), "rgba(255,128,0,0.25)");
        assert_eq!(css_color([2.0, -1.0, 0.0, 1.0]), "rgba(255,0,0,1)");
    }
}
