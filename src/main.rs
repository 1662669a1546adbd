//! Stackwell Headless Host
//!
//! Drives the deterministic engine without a renderer: either plays
//! back a replay file, or runs a scripted demo game and then verifies
//! its own recording reproduces the same final state hash.

use std::process::ExitCode;

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use stackwell::{
    read_replay, write_replay, Engine, Options, ReplayPlayer, State, VirtualKeySet, VERSION,
};

/// Ticks of slack granted past the last recorded input before playback
/// is considered stalled.
const PLAYBACK_GRACE_TICKS: u32 = 36_000;

/// Final game summary printed as JSON.
#[derive(Serialize)]
struct GameSummary {
    state: State,
    ticks: i64,
    lines_cleared: u32,
    blocks_placed: u32,
    state_hash: String,
}

fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Stackwell v{}", VERSION);

    let result = match std::env::args().nth(1) {
        Some(path) => play_replay(&path),
        None => demo_game(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Re-simulate a recorded game and print its summary.
fn play_replay(path: &str) -> anyhow::Result<()> {
    info!("=== Replay Playback: {} ===", path);

    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path))?;
    let replay = read_replay(&bytes).context("decoding replay")?;
    info!("{} input edges", replay.inputs.len());

    let horizon = replay
        .inputs
        .last()
        .map(|i| i.tick)
        .unwrap_or(0)
        .saturating_add(PLAYBACK_GRACE_TICKS);

    let mut engine = Engine::new(replay.options).context("verifying replay options")?;
    let mut player = ReplayPlayer::new(replay.inputs);

    let mut tick_index = 0u32;
    while !engine.quit() {
        if tick_index > horizon {
            bail!("playback stalled: no terminal state by tick {}", horizon);
        }
        let keys = player.keys_at(tick_index);
        engine.tick(keys);
        tick_index += 1;
    }

    print_summary(&engine);
    Ok(())
}

/// Run a scripted demo game, then prove the recording round-trips.
fn demo_game() -> anyhow::Result<()> {
    info!("=== Demo Game ===");

    let options = Options {
        seed: Some(12345),
        goal: 10,
        ..Options::default()
    };
    let mut engine = Engine::new(options).context("verifying demo options")?;

    let mut ticks = 0u32;
    while !engine.quit() && ticks < 120_000 {
        engine.tick(demo_keys(ticks));
        ticks += 1;
    }
    let live_hash = engine.state_hash();
    print_summary(&engine);

    // Serialize the recording and play it back against a fresh engine
    info!("=== Verifying Determinism ===");
    let mut bytes = Vec::new();
    write_replay(&mut bytes, &engine.options, engine.recorder.inputs())
        .context("serializing recording")?;
    info!("recording is {} bytes", bytes.len());

    let replay = read_replay(&bytes).context("re-reading recording")?;
    let mut verify = Engine::new(replay.options).context("verifying recorded options")?;
    let mut player = ReplayPlayer::new(replay.inputs);
    for tick_index in 0..ticks {
        verify.tick(player.keys_at(tick_index));
    }

    let replay_hash = verify.state_hash();
    info!("live hash:   {}", hex::encode(live_hash));
    info!("replay hash: {}", hex::encode(replay_hash));
    if live_hash != replay_hash {
        bail!("determinism failure: replay diverged from live game");
    }
    info!("DETERMINISM VERIFIED: hashes match");
    Ok(())
}

/// Scripted demo input: a repeating pattern of shifts, rotations, and
/// drops that exercises most of the state machine.
fn demo_keys(tick: u32) -> VirtualKeySet {
    const SCRIPT: [u32; 16] = [
        0,
        VirtualKeySet::LEFT,
        VirtualKeySet::LEFT,
        0,
        VirtualKeySet::ROTATE_RIGHT,
        0,
        VirtualKeySet::DOWN,
        VirtualKeySet::DOWN,
        0,
        VirtualKeySet::RIGHT,
        0,
        VirtualKeySet::ROTATE_LEFT,
        0,
        VirtualKeySet::HOLD,
        0,
        VirtualKeySet::UP,
    ];
    // Hold each script entry for a few ticks so DAS and lock delay see
    // realistic key shapes
    VirtualKeySet(SCRIPT[(tick / 3) as usize % SCRIPT.len()])
}

/// Log and print the end-of-game summary as JSON.
fn print_summary(engine: &Engine) {
    let summary = GameSummary {
        state: engine.state,
        ticks: engine.total_ticks_raw,
        lines_cleared: engine.stats.lines_cleared,
        blocks_placed: engine.stats.blocks_placed,
        state_hash: hex::encode(engine.state_hash()),
    };
    info!(
        "final: {:?} after {} ticks, {} lines, {} pieces",
        summary.state, summary.ticks, summary.lines_cleared, summary.blocks_placed
    );
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(err) => tracing::error!("summary serialization failed: {}", err),
    }
}
