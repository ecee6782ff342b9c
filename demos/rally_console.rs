//! Drives the tennis core against a rapier world and prints the avatar,
//! ball and camera state to the terminal.
//!
//! Run with `RUST_LOG=debug` to see serves, resets and phase changes.

use std::io::{stdout, Write};

use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use tennis_rig::{
    engine::RapierWorld, InputFrame, MatchPhase, PhaseStore, PhysicsEngine, SwingIntent, TennisConfig, TennisCore,
};

const TICK: f32 = 1.0 / 60.0;
const DURATION: f32 = 12.0;
const PRINT_EVERY: u32 = 30;

/// Scripted input for the given time, in seconds
fn scripted_input(time: f32) -> InputFrame {
    match time {
        t if t < 0.5 => InputFrame::default(),
        t if t < 2.0 => InputFrame::holding(SwingIntent::FORWARD),
        t if t < 2.8 => InputFrame::holding(SwingIntent::FOREHAND | SwingIntent::TOPSPIN),
        t if t < 3.0 => InputFrame::new(SwingIntent::CHOP, SwingIntent::JUMP),
        t if t < 4.5 => InputFrame::holding(SwingIntent::BACKHAND | SwingIntent::SLICE | SwingIntent::LEFT),
        // Keep tapping serve until the ball has settled on the court.
        t if t < 6.0 => InputFrame::new(SwingIntent::empty(), SwingIntent::SERVE),
        _ => InputFrame::default(),
    }
}

fn phase_color(phase: MatchPhase) -> Color {
    match phase {
        MatchPhase::Ready => Color::Yellow,
        MatchPhase::Playing => Color::Green,
        MatchPhase::Ended => Color::Red,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut world = RapierWorld::new();
    let mut phases = PhaseStore::new();
    let mut core = TennisCore::init(&mut world, TennisConfig::default(), &mut phases)?;

    let mut stdout = stdout();
    let mut tick = 0u32;
    let mut time = 0.0f32;

    while time < DURATION {
        let input = scripted_input(time);
        core.physics_step(&mut world, &mut phases, input, TICK)?;
        world.step(TICK);
        let camera = core.render_frame(&world, TICK)?;

        if tick % PRINT_EVERY == 0 {
            let root = world.translation(core.rig().root())?;
            let ball = world.translation(core.ball())?;
            let phase = phases.phase();

            stdout
                .queue(SetForegroundColor(phase_color(phase)))?
                .queue(Print(format!("{:>6.2}s {:<8}", time, phase.to_string())))?
                .queue(ResetColor)?
                .queue(Print(format!(
                    " root ({:>6.2}, {:>5.2}, {:>6.2})  ball ({:>6.2}, {:>5.2}, {:>6.2})  camera ({:>6.2}, {:>5.2}, {:>6.2})\n",
                    root.x, root.y, root.z, ball.x, ball.y, ball.z, camera.position.x, camera.position.y, camera.position.z,
                )))?;
            stdout.flush()?;
        }

        tick += 1;
        time += TICK;
    }

    core.shutdown(&mut world, &mut phases)?;
    println!("bodies left in the world: {}", world.body_count());
    Ok(())
}
