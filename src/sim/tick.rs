//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation deterministically. One call is
//! one 1/60 s step; there is no elapsed-time input.

use super::enemy::{update_enemies, update_projectiles};
use super::player::{DamageOutcome, apply_damage, respawn, update_player};
use super::state::{CollectibleKind, DeathCause, GameEvent, GamePhase, Player, Simulation};
use crate::consts::SIM_HZ;
use crate::tuning::PlayerTuning;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Jump button is down
    pub jump_held: bool,
    /// Jump button went down this tick
    pub jump_pressed: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// -1.0, 0.0 or 1.0; opposing directions cancel
    pub fn move_dir(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Advance the simulation by one fixed timestep
pub fn tick(sim: &mut Simulation, input: &TickInput) {
    sim.events.clear();

    // Handle pause toggle
    if input.pause {
        match sim.phase {
            GamePhase::Playing => {
                sim.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => sim.phase = GamePhase::Playing,
            _ => {}
        }
    }

    if sim.phase != GamePhase::Playing {
        return;
    }
    sim.time_ticks += 1;

    for platform in &mut sim.world.platforms {
        platform.advance();
    }

    update_player(
        &mut sim.player,
        input,
        &sim.world.platforms,
        &sim.tuning,
        &mut sim.events,
    );

    let player_bounds = sim.player.body.bounds;
    update_enemies(&mut sim.world, &player_bounds, &sim.tuning, &mut sim.events);
    update_projectiles(&mut sim.world);

    let mut killed = resolve_enemy_contacts(sim);
    killed |= resolve_projectile_hits(sim);
    collect_items(sim);

    if killed {
        lose_life(sim, DeathCause::Health);
    } else if sim.player.bounds().top() > sim.world.death_plane {
        lose_life(sim, DeathCause::Fell);
    }

    if sim.phase == GamePhase::Playing {
        sim.time_left_ticks = sim.time_left_ticks.saturating_sub(1);
        if sim.time_left_ticks == 0 {
            sim.time_left_ticks = sim.tuning.rules.level_time_ticks();
            lose_life(sim, DeathCause::TimeUp);
        }
    }

    if sim.phase == GamePhase::Playing
        && sim.player.bounds().center_x() >= sim.world.goal_x(sim.tuning.rules.goal_zone)
    {
        complete_level(sim);
    }

    sim.camera.follow(sim.player.bounds().center_x());

    for event in &sim.events {
        log::debug!("tick {}: {:?}", sim.time_ticks, event);
    }
}

/// Stomp or get hurt by every overlapping active enemy. Returns true if the
/// player ran out of health.
fn resolve_enemy_contacts(sim: &mut Simulation) -> bool {
    let mut killed = false;
    for enemy in sim.world.enemies.iter_mut() {
        if !enemy.is_active() || !sim.player.bounds().overlaps(&enemy.body.bounds) {
            continue;
        }

        let stomp = sim.player.body.vel.y > 0.0
            && sim.player.bounds().bottom() <= enemy.body.bounds.center_y();
        if stomp {
            enemy.defeat();
            let score = sim.tuning.enemy.stomp_score;
            sim.score += score;
            sim.player.body.vel.y = -sim.tuning.player.stomp_bounce_speed;
            sim.player.jump_cut_eligible = false;
            sim.events.push(GameEvent::EnemyStomped {
                enemy_id: enemy.id,
                score,
            });
        } else {
            killed |= hurt(&mut sim.player, &sim.tuning.player, &mut sim.events);
        }
    }
    killed
}

/// Projectiles touching the player are consumed and deal damage
fn resolve_projectile_hits(sim: &mut Simulation) -> bool {
    let mut killed = false;
    let player = &mut sim.player;
    let pt = &sim.tuning.player;
    let events = &mut sim.events;
    sim.world.projectiles.retain(|p| {
        if !p.bounds.overlaps(player.bounds()) {
            return true;
        }
        killed |= hurt(player, pt, events);
        false
    });
    killed
}

fn hurt(player: &mut Player, pt: &PlayerTuning, events: &mut Vec<GameEvent>) -> bool {
    let outcome = apply_damage(player, pt);
    if outcome != DamageOutcome::Ignored {
        events.push(GameEvent::PlayerDamaged {
            health: player.health,
            powerup_tier: player.powerup_tier,
        });
    }
    outcome == DamageOutcome::Killed
}

fn collect_items(sim: &mut Simulation) {
    let rules = &sim.tuning.rules;
    let pt = &sim.tuning.player;
    for item in sim.world.collectibles.iter_mut() {
        if item.collected || !item.bounds.overlaps(sim.player.bounds()) {
            continue;
        }
        item.collected = true;
        match item.kind {
            CollectibleKind::Coin => {
                sim.score += rules.coin_score;
                sim.coins += 1;
                sim.player.health = (sim.player.health + rules.coin_heal).min(pt.max_health);
            }
            CollectibleKind::PowerUp => {
                sim.score += rules.powerup_score;
                sim.player.powerup_tier = (sim.player.powerup_tier + 1).min(pt.max_powerup_tier);
            }
        }
        sim.events.push(GameEvent::CollectibleCollected {
            collectible_id: item.id,
            kind: item.kind,
        });
    }
}

/// Spend a life and respawn, or end the run
fn lose_life(sim: &mut Simulation, cause: DeathCause) {
    sim.lives = sim.lives.saturating_sub(1);
    log::info!("Life lost ({:?}), {} left", cause, sim.lives);
    sim.events.push(GameEvent::LifeLost {
        lives_left: sim.lives,
        cause,
    });

    if sim.lives == 0 {
        log::info!("Game over, final score {}", sim.score);
        sim.phase = GamePhase::GameOver;
        sim.events.push(GameEvent::GameOver { score: sim.score });
        return;
    }

    respawn(&mut sim.player, &sim.tuning.player);
    sim.camera.snap_to(sim.player.bounds().center_x());
    sim.events.push(GameEvent::PlayerRespawned);
}

fn complete_level(sim: &mut Simulation) {
    let seconds_left = u64::from(sim.time_left_ticks / SIM_HZ);
    let time_bonus = seconds_left * sim.tuning.rules.time_bonus_per_sec;
    sim.score += time_bonus;
    sim.phase = GamePhase::LevelComplete;
    log::info!(
        "Level {}-{} complete, time bonus {}, score {}",
        sim.world.world_index,
        sim.world.level_index,
        time_bonus,
        sim.score
    );
    sim.events.push(GameEvent::LevelComplete {
        world: sim.world.world_index,
        level: sim.world.level_index,
        time_bonus,
    });
}
