//! Platform Sim entry point
//!
//! Runs the simulation headlessly with a scripted runner as input and prints a
//! JSON summary. Useful for checking determinism and level balance from the
//! command line:
//!
//! ```text
//! RUST_LOG=info platform-sim --seed 42 --world 2 --ticks 6000
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::init();
    native::run(native::Cli::parse())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host page; there is no headless runner
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use platform_sim::sim::{GameEvent, GamePhase, Simulation, TickInput, edge_sensor, has_support, tick};
    use platform_sim::{Difficulty, Tuning};

    /// Run the platformer simulation headlessly and print a JSON summary
    #[derive(Debug, Parser)]
    #[command(name = "platform-sim", version, about)]
    pub struct Cli {
        /// Run seed
        #[arg(long, default_value_t = 42)]
        pub seed: u64,
        /// Starting world (1-based)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pub world: u32,
        /// Starting level within the world (1-based)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pub level: u32,
        /// Number of ticks to simulate (60 per second)
        #[arg(long, default_value_t = 3600)]
        pub ticks: u64,
        /// Difficulty preset: easy, normal or hard
        #[arg(long, default_value = "normal", value_parser = parse_difficulty)]
        pub difficulty: Difficulty,
        /// Tuning JSON file; missing fields use the defaults
        #[arg(long, value_name = "PATH")]
        pub tuning: Option<PathBuf>,
    }

    fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
        Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty '{s}' (easy, normal, hard)"))
    }

    fn load_tuning(cli: &Cli) -> Result<Tuning> {
        let mut tuning = match &cli.tuning {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read tuning file {}", path.display()))?;
                Tuning::from_json(&json).context("Invalid tuning file")?
            }
            None => Tuning::default(),
        };
        tuning.apply_difficulty(cli.difficulty);
        tuning.validate()?;
        Ok(tuning)
    }

    /// Run right, hop at ledges and periodically over enemies
    fn scripted_input(sim: &Simulation, prev: &TickInput) -> TickInput {
        let player = sim.player();
        let ledge_ahead = player.is_grounded()
            && !has_support(&edge_sensor(player.bounds(), 1.0, 24.0), sim.platforms());
        let enemy_ahead = sim.enemies().iter().any(|e| {
            let dx = e.body.bounds.left() - player.bounds().right();
            e.is_active() && (0.0..60.0).contains(&dx)
        });
        let want_jump = ledge_ahead || enemy_ahead || sim.time_ticks % 120 == 0;
        TickInput {
            move_right: true,
            jump_pressed: want_jump && !prev.jump_held,
            jump_held: want_jump || (prev.jump_held && player.body.vel.y < 0.0),
            ..Default::default()
        }
    }

    pub fn run(cli: Cli) -> Result<()> {
        log::info!("Platform Sim (headless) starting: {:?}", cli);

        let tuning = load_tuning(&cli)?;
        let mut sim = Simulation::at_level(cli.seed, cli.world, cli.level, tuning)?;

        let mut input = TickInput::default();
        let mut levels_cleared = 0u32;
        let mut stomps = 0u32;
        let mut lives_lost = 0u32;

        for _ in 0..cli.ticks {
            input = scripted_input(&sim, &input);
            tick(&mut sim, &input);

            for event in sim.drain_events() {
                match event {
                    GameEvent::EnemyStomped { .. } => stomps += 1,
                    GameEvent::LifeLost { .. } => lives_lost += 1,
                    GameEvent::LevelComplete { .. } => levels_cleared += 1,
                    _ => {}
                }
            }

            match sim.phase {
                GamePhase::LevelComplete => sim.advance_level()?,
                GamePhase::GameOver | GamePhase::Won => break,
                GamePhase::Playing | GamePhase::Paused => {}
            }
        }

        let summary = serde_json::json!({
            "seed": cli.seed,
            "difficulty": cli.difficulty.as_str(),
            "ticks": sim.time_ticks,
            "phase": sim.phase,
            "world": sim.world.world_index,
            "level": sim.world.level_index,
            "score": sim.score,
            "coins": sim.coins,
            "lives": sim.lives,
            "levels_cleared": levels_cleared,
            "stomps": stomps,
            "lives_lost": lives_lost,
            "player_x": sim.player().bounds().center_x(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }

}
