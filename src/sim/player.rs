//! Player controller: run, jump assists, damage and respawn
//!
//! Jump gating order per tick:
//! 1. a press arms the jump buffer
//! 2. releasing jump while rising fast cuts the jump short
//! 3. buffer + (grounded or coyote) fires a ground jump, else a fresh press
//!    in the air may spend the double jump
//! 4. physics step
//! 5. touching down with a live buffer fires the buffered jump immediately

use glam::Vec2;

use super::collision::{StepReport, step_body};
use super::state::{GameEvent, MoveState, Platform, Player};
use super::tick::TickInput;
use crate::tuning::{PlayerTuning, Tuning};

/// Result of a damage event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable, nothing happened
    Ignored,
    /// Lost a powerup tier instead of health
    PoweredDown,
    Hurt,
    /// Health reached zero
    Killed,
}

/// Advance the player one tick
pub fn update_player(
    player: &mut Player,
    input: &TickInput,
    platforms: &[Platform],
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> StepReport {
    let pt = &tuning.player;

    let dir = input.move_dir();
    player.body.vel.x = dir * pt.run_speed;
    if dir != 0.0 {
        player.body.facing = dir;
    }

    if input.jump_pressed {
        player.jump_buffer = pt.jump_buffer_ticks;
    }

    // Variable jump height
    if player.jump_cut_eligible {
        if player.body.vel.y >= 0.0 {
            player.jump_cut_eligible = false;
        } else if !input.jump_held && player.body.vel.y < -pt.jump_cut_speed {
            player.body.vel.y = -pt.jump_cut_speed;
            player.jump_cut_eligible = false;
        }
    }

    let mut jumped = try_ground_jump(player, pt, events);
    if !jumped && input.jump_pressed {
        jumped = try_double_jump(player, pt, events);
    }

    let was_grounded = player.state == MoveState::Grounded;
    let report = step_body(&mut player.body, platforms, &tuning.physics);

    if report.landed {
        player.state = MoveState::Grounded;
        player.double_jump_available = true;
        player.jump_cut_eligible = false;
        player.coyote = 0;
        // Press arrived shortly before touchdown
        try_ground_jump(player, pt, events);
    } else {
        if was_grounded && !jumped {
            player.coyote = pt.coyote_ticks;
        } else {
            player.coyote = player.coyote.saturating_sub(1);
        }
        player.state = MoveState::Airborne;
    }

    if let Some(platform_id) = report.bounced_by {
        player.jump_cut_eligible = false;
        events.push(GameEvent::PlayerBounced { platform_id });
    }

    player.jump_buffer = player.jump_buffer.saturating_sub(1);
    player.invulnerable_ticks = player.invulnerable_ticks.saturating_sub(1);
    report
}

/// Full jump from the ground or within coyote time
fn try_ground_jump(player: &mut Player, pt: &PlayerTuning, events: &mut Vec<GameEvent>) -> bool {
    if player.jump_buffer == 0 || !(player.body.grounded || player.coyote > 0) {
        return false;
    }
    player.body.vel.y = -pt.jump_speed;
    player.body.grounded = false;
    player.state = MoveState::Airborne;
    player.jump_buffer = 0;
    player.coyote = 0;
    player.jump_cut_eligible = true;
    events.push(GameEvent::PlayerJumped { double: false });
    true
}

/// Smaller air jump, once per ground contact
fn try_double_jump(player: &mut Player, pt: &PlayerTuning, events: &mut Vec<GameEvent>) -> bool {
    if !pt.double_jump || !player.double_jump_available || player.body.grounded {
        return false;
    }
    player.body.vel.y = -pt.double_jump_speed;
    player.double_jump_available = false;
    player.jump_buffer = 0;
    player.jump_cut_eligible = true;
    events.push(GameEvent::PlayerJumped { double: true });
    true
}

/// Apply one hit. Invulnerability follows any hit that landed.
pub fn apply_damage(player: &mut Player, pt: &PlayerTuning) -> DamageOutcome {
    if player.invulnerable_ticks > 0 {
        return DamageOutcome::Ignored;
    }
    player.invulnerable_ticks = pt.invulnerable_ticks;

    if player.powerup_tier > 0 {
        player.powerup_tier -= 1;
        return DamageOutcome::PoweredDown;
    }

    player.health -= pt.damage;
    if player.health <= 0 {
        player.health = 0;
        DamageOutcome::Killed
    } else {
        DamageOutcome::Hurt
    }
}

/// Soft reset at the spawn point: full health, no velocity, no powerups
pub fn respawn(player: &mut Player, pt: &PlayerTuning) {
    let size = player.body.bounds.size;
    player.body.bounds.pos = Vec2::new(player.spawn.x - size.x / 2.0, player.spawn.y - size.y);
    player.body.vel = Vec2::ZERO;
    player.body.grounded = false;
    player.state = MoveState::Airborne;
    player.jump_buffer = 0;
    player.coyote = 0;
    player.double_jump_available = true;
    player.jump_cut_eligible = false;
    player.health = pt.max_health;
    player.powerup_tier = 0;
    player.invulnerable_ticks = pt.invulnerable_ticks;
}
