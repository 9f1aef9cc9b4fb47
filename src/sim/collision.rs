//! Overlap tests and push-out for circles against rectangles
//!
//! Bodies are circles; buildings, fences and cars are axis-aligned boxes.

use glam::Vec2;

use super::state::Rect;

/// Result of a collision check
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the rectangle (if hit)
    pub point: Vec2,
    /// Surface normal pointing from the rectangle toward the circle centre
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle against an axis-aligned rectangle
pub fn circle_rect_collision(center: Vec2, radius: f32, rect: &Rect) -> CollisionResult {
    if rect.contains(center) {
        // Centre is inside the box: leave through the nearest face
        let to_min = center - rect.min;
        let to_max = rect.max - center;
        let faces = [
            (to_min.x, Vec2::NEG_X),
            (to_max.x, Vec2::X),
            (to_min.y, Vec2::NEG_Y),
            (to_max.y, Vec2::Y),
        ];
        let (depth, normal) = faces
            .into_iter()
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .unwrap_or((0.0, Vec2::X));
        return CollisionResult {
            hit: true,
            point: center + normal * depth,
            normal,
            penetration: depth + radius,
        };
    }

    let closest = rect.closest_point(center);
    let offset = center - closest;
    let dist_sq = offset.length_squared();
    if dist_sq >= radius * radius {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    CollisionResult {
        hit: true,
        point: closest,
        normal: offset / dist,
        penetration: radius - dist,
    }
}

#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// First obstacle a circle touches, with the contact on its surface
pub fn first_obstacle_contact(center: Vec2, radius: f32, obstacles: &[Rect]) -> Option<CollisionResult> {
    obstacles
        .iter()
        .map(|rect| circle_rect_collision(center, radius, rect))
        .find(|result| result.hit)
}

/// Move a circle out of every obstacle it overlaps
pub fn push_out_of_obstacles(mut center: Vec2, radius: f32, obstacles: &[Rect]) -> Vec2 {
    for rect in obstacles {
        let result = circle_rect_collision(center, radius, rect);
        if result.hit {
            center += result.normal * result.penetration;
        }
    }
    center
}

/// Keep a circle fully inside the world bounds
pub fn clamp_to_bounds(center: Vec2, radius: f32, bounds: &Rect) -> Vec2 {
    let r = Vec2::splat(radius);
    center.clamp(bounds.min + r, bounds.max - r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    #[test]
    fn test_circle_rect_side_hit() {
        let result = circle_rect_collision(Vec2::new(105.0, 50.0), 8.0, &unit_box());
        assert!(result.hit);
        assert!((result.normal - Vec2::X).length() < 1e-6);
        assert!((result.penetration - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_rect_miss() {
        let result = circle_rect_collision(Vec2::new(120.0, 50.0), 8.0, &unit_box());
        assert!(!result.hit);
    }

    #[test]
    fn test_center_inside_exits_nearest_face() {
        let result = circle_rect_collision(Vec2::new(50.0, 95.0), 5.0, &unit_box());
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::Y);
        assert!((result.penetration - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_push_out_clears_overlap() {
        let boxes = [unit_box()];
        let pushed = push_out_of_obstacles(Vec2::new(50.0, 95.0), 5.0, &boxes);
        assert!(!circle_rect_collision(pushed, 4.99, &boxes[0]).hit);
    }

    #[test]
    fn test_first_contact_reports_surface_point() {
        let boxes = [Rect::new(200.0, 0.0, 300.0, 100.0), unit_box()];
        let contact = first_obstacle_contact(Vec2::new(104.0, 40.0), 6.0, &boxes).unwrap();
        assert_eq!(contact.point, Vec2::new(100.0, 40.0));
        assert_eq!(contact.normal, Vec2::X);
        assert!(first_obstacle_contact(Vec2::new(150.0, 40.0), 6.0, &boxes).is_none());
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(11.0, 0.0), 5.0));
    }

    #[test]
    fn test_clamp_to_bounds() {
        let clamped = clamp_to_bounds(Vec2::new(-20.0, 150.0), 10.0, &unit_box());
        assert_eq!(clamped, Vec2::new(10.0, 90.0));
    }
}
