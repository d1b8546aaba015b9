//! Per-tick integration and axis-separated collision resolution
//!
//! Each body moves along x and is pushed out of platforms along x only, then
//! moves along y and is pushed out along y only. With axis-aligned geometry
//! this never has to pick between two diagonal resolutions.

use glam::Vec2;

use super::geom::AxisBox;
use super::state::{Body, Platform, PlatformKind};
use crate::tuning::PhysicsTuning;

/// What happened to a body during one step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// Vertical pass put the body on top of solid ground
    pub landed: bool,
    /// Launched by a bounce pad (`platform id`)
    pub bounced_by: Option<u32>,
    /// Horizontal pass pushed the body out of a platform
    pub hit_wall: bool,
    /// Rising body hit a platform's underside
    pub hit_ceiling: bool,
    /// Horizontal displacement inherited from a moving platform
    pub carried_dx: f32,
}

/// Advance one body by one tick against the platform set
pub fn step_body(body: &mut Body, platforms: &[Platform], physics: &PhysicsTuning) -> StepReport {
    body.vel.y = (body.vel.y + physics.gravity).min(physics.terminal_velocity);
    body.vel.x = body.vel.x.clamp(-physics.max_speed, physics.max_speed);

    // A body launched from a bounce pad is still inside it; let it leave
    let start = body.bounds;
    let embedded = |p: &Platform| {
        matches!(p.kind, PlatformKind::Bounce { .. }) && start.overlaps(&p.bounds)
    };

    let mut report = StepReport {
        hit_wall: resolve_horizontal(body, platforms, &embedded),
        ..Default::default()
    };
    resolve_vertical(body, platforms, &embedded, &mut report);
    report
}

/// Move along x and push out of every overlapping platform
///
/// Repeats until a full sweep finds no overlap, so being pushed out of one
/// platform into another is corrected too.
pub fn resolve_horizontal(
    body: &mut Body,
    platforms: &[Platform],
    skip: &impl Fn(&Platform) -> bool,
) -> bool {
    let dx = body.vel.x;
    body.bounds.pos.x += dx;
    if dx == 0.0 {
        return false;
    }

    let mut hit = false;
    for _ in 0..=platforms.len() {
        let mut pushed = false;
        for platform in platforms {
            if skip(platform) || !body.bounds.overlaps(&platform.bounds) {
                continue;
            }
            if dx > 0.0 {
                body.bounds.set_right(platform.bounds.left());
            } else {
                body.bounds.set_left(platform.bounds.right());
            }
            pushed = true;
        }
        if !pushed {
            break;
        }
        hit = true;
    }

    if hit {
        body.vel.x = 0.0;
    }
    hit
}

/// Move along y, then land, bounce or bump a ceiling
///
/// `grounded` is cleared first and only set again by an actual landing.
pub fn resolve_vertical(
    body: &mut Body,
    platforms: &[Platform],
    skip: &impl Fn(&Platform) -> bool,
    report: &mut StepReport,
) {
    let dy = body.vel.y;
    body.bounds.pos.y += dy;
    body.grounded = false;

    for platform in platforms {
        if skip(platform) || !body.bounds.overlaps(&platform.bounds) {
            continue;
        }

        if dy > 0.0 {
            match platform.kind {
                PlatformKind::Bounce { strength } => {
                    body.vel.y = -strength;
                    report.bounced_by = Some(platform.id);
                }
                PlatformKind::Static | PlatformKind::Moving { .. } => {
                    body.bounds.set_bottom(platform.bounds.top());
                    body.vel.y = 0.0;
                    body.grounded = true;
                    report.landed = true;
                    report.carried_dx = platform.last_dx;
                }
            }
        } else if dy < 0.0 {
            body.bounds.set_top(platform.bounds.bottom());
            body.vel.y = 0.0;
            report.hit_ceiling = true;
        }
    }

    if report.carried_dx != 0.0 {
        body.bounds.translate(Vec2::new(report.carried_dx, 0.0));
    }
}

/// Any solid (non-bounce) platform overlaps the box
pub fn has_support(sensor: &AxisBox, platforms: &[Platform]) -> bool {
    platforms
        .iter()
        .any(|p| p.is_solid_ground() && sensor.overlaps(&p.bounds))
}

/// First platform of any kind overlapping the box
pub fn first_overlap<'a>(bounds: &AxisBox, platforms: &'a [Platform]) -> Option<&'a Platform> {
    platforms.iter().find(|p| bounds.overlaps(&p.bounds))
}

/// Thin box just past the leading edge, one unit below the feet
pub fn edge_sensor(bounds: &AxisBox, direction: f32, width: f32) -> AxisBox {
    let x = if direction >= 0.0 {
        bounds.right()
    } else {
        bounds.left() - width
    };
    AxisBox {
        pos: Vec2::new(x, bounds.bottom()),
        size: Vec2::new(width, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> PhysicsTuning {
        PhysicsTuning::default()
    }

    fn platform(id: u32, x: f32, y: f32, w: f32, h: f32, kind: PlatformKind) -> Platform {
        Platform::new(id, AxisBox::new(x, y, w, h).unwrap(), kind)
    }

    fn body(x: f32, y: f32) -> Body {
        Body::new(AxisBox::new(x, y, 30.0, 50.0).unwrap())
    }

    #[test]
    fn test_gravity_and_terminal_velocity() {
        let mut b = body(0.0, 0.0);
        step_body(&mut b, &[], &physics());
        assert!((b.vel.y - 0.6).abs() < 1e-6);

        b.vel.y = 11.9;
        step_body(&mut b, &[], &physics());
        assert_eq!(b.vel.y, 12.0);
    }

    #[test]
    fn test_horizontal_speed_clamped() {
        let mut b = body(0.0, 0.0);
        b.vel.x = 50.0;
        step_body(&mut b, &[], &physics());
        assert_eq!(b.vel.x, 7.0);
        assert_eq!(b.bounds.left(), 7.0);
    }

    #[test]
    fn test_lands_on_static_platform() {
        let floor = platform(1, 0.0, 100.0, 200.0, 20.0, PlatformKind::Static);
        let mut b = body(50.0, 45.0);
        b.vel.y = 8.0;
        let report = step_body(&mut b, &[floor], &physics());
        assert!(report.landed);
        assert!(b.grounded);
        assert_eq!(b.vel.y, 0.0);
        assert_eq!(b.bounds.bottom(), 100.0);
    }

    #[test]
    fn test_resting_body_stays_grounded() {
        let floor = platform(1, 0.0, 100.0, 200.0, 20.0, PlatformKind::Static);
        let mut b = body(50.0, 50.0);
        for _ in 0..10 {
            let report = step_body(&mut b, std::slice::from_ref(&floor), &physics());
            assert!(report.landed);
            assert_eq!(b.bounds.bottom(), 100.0);
        }
    }

    #[test]
    fn test_grounded_cleared_without_landing() {
        let mut b = body(0.0, 0.0);
        b.grounded = true;
        step_body(&mut b, &[], &physics());
        assert!(!b.grounded);
    }

    #[test]
    fn test_bounce_platform_launches() {
        let pad = platform(3, 0.0, 100.0, 200.0, 20.0, PlatformKind::Bounce { strength: 15.0 });
        let mut b = body(50.0, 45.0);
        b.vel.y = 10.0 - 0.6; // 10 after gravity
        let report = step_body(&mut b, &[pad], &physics());
        assert_eq!(b.vel.y, -15.0);
        assert!(!b.grounded);
        assert!(!report.landed);
        assert_eq!(report.bounced_by, Some(3));
    }

    #[test]
    fn test_bounce_launch_leaves_pad_cleanly() {
        let pad = platform(3, 0.0, 100.0, 200.0, 20.0, PlatformKind::Bounce { strength: 15.0 });
        let platforms = [pad];
        let mut b = body(50.0, 45.0);
        b.vel = Vec2::new(3.0, 9.4);
        step_body(&mut b, &platforms, &physics());
        let x_after_launch = b.bounds.left();

        // Next tick: still inside the pad but rising; not pushed sideways or under it
        step_body(&mut b, &platforms, &physics());
        assert!(b.vel.y < 0.0);
        assert!(b.bounds.bottom() < 100.0);
        assert!(b.bounds.left() > x_after_launch);
    }

    #[test]
    fn test_ceiling_bump() {
        let ceiling = platform(1, 0.0, 0.0, 200.0, 20.0, PlatformKind::Static);
        let mut b = body(50.0, 25.0);
        b.vel.y = -10.0;
        let report = step_body(&mut b, &[ceiling], &physics());
        assert!(report.hit_ceiling);
        assert_eq!(b.bounds.top(), 20.0);
        assert_eq!(b.vel.y, 0.0);
        assert!(!b.grounded);
    }

    #[test]
    fn test_wall_push_moving_right() {
        let wall = platform(1, 100.0, 0.0, 20.0, 200.0, PlatformKind::Static);
        let mut b = body(65.0, 50.0);
        b.vel.x = 6.0;
        let report = step_body(&mut b, &[wall], &physics());
        assert!(report.hit_wall);
        assert_eq!(b.bounds.right(), 100.0);
        assert_eq!(b.vel.x, 0.0);
    }

    #[test]
    fn test_wall_push_moving_left() {
        let wall = platform(1, 0.0, 0.0, 20.0, 200.0, PlatformKind::Static);
        let mut b = body(24.0, 50.0);
        b.vel.x = -6.0;
        step_body(&mut b, &[wall], &physics());
        assert_eq!(b.bounds.left(), 20.0);
    }

    #[test]
    fn test_horizontal_resolves_every_overlap() {
        // Two stacked wall blocks at the same x; both must be cleared
        let walls = [
            platform(1, 100.0, 0.0, 20.0, 40.0, PlatformKind::Static),
            platform(2, 96.0, 40.0, 20.0, 40.0, PlatformKind::Static),
        ];
        let mut b = body(65.0, 10.0);
        b.vel.x = 6.0;
        resolve_horizontal(&mut b, &walls, &|_| false);
        for w in &walls {
            assert!(!b.bounds.overlaps(&w.bounds));
        }
        assert_eq!(b.bounds.right(), 96.0);
    }

    #[test]
    fn test_carried_by_moving_platform() {
        let mut lift = platform(
            1,
            0.0,
            100.0,
            200.0,
            20.0,
            PlatformKind::Moving {
                direction: 1.0,
                speed: 2.0,
                min_x: 0.0,
                max_x: 100.0,
            },
        );
        lift.advance();
        let mut b = body(50.0, 50.0);
        let report = step_body(&mut b, &[lift], &physics());
        assert!(report.landed);
        assert_eq!(report.carried_dx, 2.0);
        assert_eq!(b.bounds.left(), 52.0);
    }

    #[test]
    fn test_edge_sensor_placement() {
        let b = AxisBox::new(100.0, 50.0, 32.0, 32.0).unwrap();
        let right = edge_sensor(&b, 1.0, 4.0);
        assert_eq!(right.left(), 132.0);
        assert_eq!(right.top(), 82.0);
        let left = edge_sensor(&b, -1.0, 4.0);
        assert_eq!(left.right(), 100.0);
    }

    #[test]
    fn test_has_support_ignores_bounce_pads() {
        let sensor = AxisBox::new(10.0, 100.0, 4.0, 1.0).unwrap();
        let pad = [platform(1, 0.0, 100.0, 50.0, 20.0, PlatformKind::Bounce { strength: 15.0 })];
        assert!(!has_support(&sensor, &pad));
        let floor = [platform(1, 0.0, 100.0, 50.0, 20.0, PlatformKind::Static)];
        assert!(has_support(&sensor, &floor));
        assert!(first_overlap(&sensor, &floor).is_some());
    }
}
