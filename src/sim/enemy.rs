//! Enemy behaviour and enemy projectiles

use glam::Vec2;

use super::collision::{edge_sensor, first_overlap, has_support, step_body};
use super::geom::AxisBox;
use super::state::{Behavior, Enemy, GameEvent, Platform, Projectile, World};
use crate::tuning::{EnemyTuning, Tuning};

/// A shooter's request to fire, resolved once all enemies have moved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub owner: u32,
    pub origin: Vec2,
    pub direction: f32,
}

/// Update every active enemy, then spawn whatever they fired
pub fn update_enemies(
    world: &mut World,
    player: &AxisBox,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    let shots: Vec<Shot> = {
        let World {
            enemies,
            platforms,
            death_plane,
            ..
        } = world;
        enemies
            .iter_mut()
            .filter_map(|enemy| update_enemy(enemy, platforms, player, tuning, *death_plane))
            .collect()
    };

    for shot in shots {
        spawn_projectile(world, &shot, &tuning.enemy);
        events.push(GameEvent::ProjectileFired {
            enemy_id: shot.owner,
        });
    }
}

/// Advance one enemy; defeated enemies are left untouched
pub fn update_enemy(
    enemy: &mut Enemy,
    platforms: &[Platform],
    player: &AxisBox,
    tuning: &Tuning,
    death_plane: f32,
) -> Option<Shot> {
    if !enemy.is_active() {
        return None;
    }
    let et = &tuning.enemy;
    let mut shot = None;

    match enemy.behavior {
        Behavior::Patrol => {
            turn_at_edge(enemy, platforms, et);
            enemy.body.vel.x = enemy.direction * enemy.speed;
        }
        Behavior::Hop { jump_timer } => {
            let mut timer = jump_timer.saturating_sub(1);
            if enemy.body.grounded {
                turn_at_edge(enemy, platforms, et);
                enemy.body.vel.x = enemy.direction * enemy.speed;
                if timer == 0 {
                    enemy.body.vel.y = -et.jump_speed;
                    timer = et.jump_interval_ticks;
                }
            } else {
                enemy.body.vel.x = 0.0;
            }
            enemy.behavior = Behavior::Hop { jump_timer: timer };
        }
        Behavior::Turret { cooldown } => {
            enemy.body.vel.x = 0.0;
            let dx = player.center_x() - enemy.body.bounds.center_x();
            if dx != 0.0 {
                enemy.direction = dx.signum();
            }
            let mut cooldown = cooldown.saturating_sub(1);
            if cooldown == 0 && dx.abs() <= et.shoot_range {
                shot = Some(Shot {
                    owner: enemy.id,
                    origin: enemy.body.bounds.center(),
                    direction: enemy.direction,
                });
                cooldown = et.shoot_interval_ticks;
            }
            enemy.behavior = Behavior::Turret { cooldown };
        }
    }
    enemy.body.facing = enemy.direction;

    let report = step_body(&mut enemy.body, platforms, &tuning.physics);
    if report.hit_wall {
        enemy.direction = -enemy.direction;
    }

    if enemy.body.bounds.top() > death_plane {
        log::debug!("Enemy {} fell out of the level", enemy.id);
        enemy.defeat();
        return None;
    }
    shot
}

/// Reverse when the ground ahead ends
fn turn_at_edge(enemy: &mut Enemy, platforms: &[Platform], et: &EnemyTuning) {
    if !enemy.body.grounded {
        return;
    }
    let sensor = edge_sensor(&enemy.body.bounds, enemy.direction, et.sensor_width);
    if !has_support(&sensor, platforms) {
        enemy.direction = -enemy.direction;
    }
}

fn spawn_projectile(world: &mut World, shot: &Shot, et: &EnemyTuning) {
    let size = et.projectile_size;
    let id = world.next_entity_id();
    world.projectiles.push(Projectile {
        id,
        owner: shot.owner,
        bounds: AxisBox {
            pos: shot.origin - Vec2::splat(size / 2.0),
            size: Vec2::splat(size),
        },
        vel: Vec2::new(shot.direction * et.projectile_speed, 0.0),
        ttl_ticks: et.projectile_ttl_ticks,
    });
}

/// Move projectiles; drop them on platform contact, expiry or leaving the level
pub fn update_projectiles(world: &mut World) {
    let World {
        projectiles,
        platforms,
        level_length,
        death_plane,
        ..
    } = world;
    projectiles.retain_mut(|p| {
        p.bounds.translate(p.vel);
        p.ttl_ticks = p.ttl_ticks.saturating_sub(1);
        p.ttl_ticks > 0
            && p.bounds.right() > 0.0
            && p.bounds.left() < *level_length
            && p.bounds.top() < *death_plane
            && first_overlap(&p.bounds, platforms).is_none()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{EnemySpawn, LevelDescriptor};
    use crate::sim::state::{EnemyKind, PlatformKind};

    fn ledge(x: f32, w: f32) -> Platform {
        Platform::new(1, AxisBox::new(x, 400.0, w, 20.0).unwrap(), PlatformKind::Static)
    }

    fn enemy_at(kind: EnemyKind, x: f32, direction: f32, tuning: &Tuning) -> Enemy {
        let spawn = EnemySpawn {
            kind,
            pos: Vec2::new(x, 400.0),
            size: Vec2::new(32.0, 32.0),
            direction,
        };
        Enemy::spawn(10, &spawn, 1, tuning).unwrap()
    }

    fn far_player() -> AxisBox {
        AxisBox::new(5000.0, 0.0, 30.0, 50.0).unwrap()
    }

    #[test]
    fn test_walker_turns_at_edge_and_stays_on_ledge() {
        let tuning = Tuning::default();
        let platforms = [ledge(100.0, 200.0)];
        let mut enemy = enemy_at(EnemyKind::Walker, 250.0, 1.0, &tuning);
        let player = far_player();

        let mut turned = false;
        for _ in 0..300 {
            update_enemy(&mut enemy, &platforms, &player, &tuning, 1000.0);
            assert!(enemy.body.bounds.left() >= 100.0 - 4.0);
            assert!(enemy.body.bounds.right() <= 300.0 + 4.0);
            assert!(enemy.is_active());
            if enemy.direction < 0.0 {
                turned = true;
            }
        }
        assert!(turned);
        assert_eq!(enemy.body.bounds.bottom(), 400.0);
    }

    #[test]
    fn test_walker_turns_at_wall() {
        let tuning = Tuning::default();
        let platforms = [
            ledge(0.0, 600.0),
            Platform::new(2, AxisBox::new(300.0, 300.0, 20.0, 100.0).unwrap(), PlatformKind::Static),
        ];
        let mut enemy = enemy_at(EnemyKind::Walker, 250.0, 1.0, &tuning);
        for _ in 0..40 {
            update_enemy(&mut enemy, &platforms, &far_player(), &tuning, 1000.0);
        }
        assert_eq!(enemy.direction, -1.0);
        assert!(enemy.body.bounds.right() <= 300.0);
    }

    #[test]
    fn test_jumper_hops_on_interval() {
        let tuning = Tuning::default();
        let platforms = [ledge(0.0, 2000.0)];
        let mut enemy = enemy_at(EnemyKind::Jumper, 1000.0, 1.0, &tuning);
        let mut left_ground = None;
        for i in 1..=200u32 {
            update_enemy(&mut enemy, &platforms, &far_player(), &tuning, 1000.0);
            if left_ground.is_none() && enemy.body.bounds.bottom() < 400.0 {
                left_ground = Some(i);
            }
        }
        assert_eq!(left_ground, Some(tuning.enemy.jump_interval_ticks));
    }

    #[test]
    fn test_shooter_faces_player_and_fires() {
        let tuning = Tuning::default();
        let platforms = [ledge(0.0, 1000.0)];
        let mut enemy = enemy_at(EnemyKind::Shooter, 500.0, 1.0, &tuning);
        let player = AxisBox::new(300.0, 350.0, 30.0, 50.0).unwrap();

        let mut shots = Vec::new();
        for _ in 0..tuning.enemy.shoot_interval_ticks * 2 {
            if let Some(shot) = update_enemy(&mut enemy, &platforms, &player, &tuning, 1000.0) {
                shots.push(shot);
            }
        }
        assert_eq!(enemy.direction, -1.0);
        assert_eq!(enemy.body.bounds.center_x(), 500.0);
        assert_eq!(shots.len(), 2);
        assert!(shots.iter().all(|s| s.owner == 10 && s.direction == -1.0));
    }

    #[test]
    fn test_shooter_holds_fire_out_of_range() {
        let tuning = Tuning::default();
        let platforms = [ledge(0.0, 1000.0)];
        let mut enemy = enemy_at(EnemyKind::Shooter, 500.0, 1.0, &tuning);
        for _ in 0..400 {
            assert!(update_enemy(&mut enemy, &platforms, &far_player(), &tuning, 1000.0).is_none());
        }
    }

    #[test]
    fn test_defeated_enemy_is_frozen() {
        let tuning = Tuning::default();
        let platforms = [ledge(0.0, 1000.0)];
        let mut enemy = enemy_at(EnemyKind::Walker, 500.0, 1.0, &tuning);
        enemy.defeat();
        let before = enemy.body.bounds;
        update_enemy(&mut enemy, &platforms, &far_player(), &tuning, 1000.0);
        assert_eq!(enemy.body.bounds, before);
    }

    #[test]
    fn test_enemy_below_death_plane_is_defeated() {
        let tuning = Tuning::default();
        let mut enemy = enemy_at(EnemyKind::Walker, 500.0, 1.0, &tuning);
        for _ in 0..100 {
            update_enemy(&mut enemy, &[], &far_player(), &tuning, 600.0);
        }
        assert!(!enemy.is_active());
    }

    /// 2000-wide floor at y=400 with a wall at x=1000..1020
    fn walled_world(tuning: &Tuning) -> World {
        let desc = LevelDescriptor {
            seed: 1,
            world: 1,
            level: 1,
            length: 2000.0,
            spawn: Vec2::new(50.0, 400.0),
            terrain: Vec::new(),
            platforms: vec![
                Platform::new(1, AxisBox::new(0.0, 400.0, 2000.0, 20.0).unwrap(), PlatformKind::Static),
                Platform::new(2, AxisBox::new(1000.0, 300.0, 20.0, 100.0).unwrap(), PlatformKind::Static),
            ],
            enemies: Vec::new(),
            collectibles: Vec::new(),
        };
        World::from_descriptor(&desc, tuning).unwrap()
    }

    fn fire(world: &mut World, x: f32, direction: f32, tuning: &Tuning) {
        let shot = Shot {
            owner: 10,
            origin: Vec2::new(x, 350.0),
            direction,
        };
        spawn_projectile(world, &shot, &tuning.enemy);
    }

    #[test]
    fn test_projectile_expires_after_ttl() {
        let tuning = Tuning::default();
        let mut world = walled_world(&tuning);
        fire(&mut world, 50.0, 1.0, &tuning);
        assert_eq!(world.projectiles[0].ttl_ticks, tuning.enemy.projectile_ttl_ticks);
        assert_eq!(world.projectiles[0].bounds.size, Vec2::splat(tuning.enemy.projectile_size));

        for _ in 1..tuning.enemy.projectile_ttl_ticks {
            update_projectiles(&mut world);
        }
        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(world.projectiles[0].ttl_ticks, 1);
        assert!(world.projectiles[0].bounds.right() < 1000.0);

        update_projectiles(&mut world);
        assert!(world.projectiles.is_empty());
    }

    #[test]
    fn test_projectile_stops_at_platform() {
        let tuning = Tuning::default();
        let mut world = walled_world(&tuning);
        fire(&mut world, 955.0, 1.0, &tuning);

        // Touching the wall is not overlapping it
        for _ in 0..8 {
            update_projectiles(&mut world);
        }
        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(world.projectiles[0].bounds.right(), 1000.0);

        update_projectiles(&mut world);
        assert!(world.projectiles.is_empty());
    }

    #[test]
    fn test_projectile_removed_outside_level() {
        let tuning = Tuning::default();
        let mut world = walled_world(&tuning);
        fire(&mut world, 20.0, -1.0, &tuning);
        fire(&mut world, 1980.0, 1.0, &tuning);

        for _ in 0..4 {
            update_projectiles(&mut world);
        }
        assert_eq!(world.projectiles.len(), 2);

        update_projectiles(&mut world);
        assert!(world.projectiles.is_empty());
    }
}
