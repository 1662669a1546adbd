//! Replay Codec
//!
//! A recording is everything needed to reproduce a game bit-exactly:
//! the options (seed included) and the input edges. The engine being a
//! pure function of (options, seed, input stream) does the rest.
//!
//! ## File layout
//!
//! ```text
//! ┌──────────────┬────────────────────┬──────────────┬──────────────────┐
//! │ "ZS1\n"      │ ini options text   │ 8 x 0xFF     │ input stream     │
//! │ 4 bytes      │ variable           │ sentinel     │ 8-byte records   │
//! └──────────────┴────────────────────┴──────────────┴──────────────────┘
//! ```
//!
//! Each input record is `u32 tick || u32 keys`, little-endian, written
//! only when the key bitset changes (input edges).

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::input::VirtualKeySet;
use crate::game::options::{Options, ParseError};

/// File magic, including the terminating newline.
pub const REPLAY_MAGIC: &[u8; 4] = b"ZS1\n";

/// Separator between the options text and the input stream.
pub const REPLAY_SENTINEL: [u8; 8] = [0xFF; 8];

/// Size of one encoded input record.
const RECORD_SIZE: usize = 8;

/// One input edge: the key bitset in force from `tick` onward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayInput {
    /// Tick the bitset took effect
    pub tick: u32,
    /// Raw virtual-key bits
    pub keys: u32,
}

/// Replay decode failures. Fatal for playback; live play never reads
/// replays so the host can treat them as optional.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Magic bytes missing or wrong
    #[error("invalid replay header")]
    InvalidHeader,
    /// No sentinel, so no input stream
    #[error("no inputs found (missing sentinel)")]
    NoInputsFound,
    /// Input stream length not a multiple of the record size
    #[error("input stream length {0} is not a multiple of 8")]
    InvalidInputLength(usize),
    /// Options text did not parse
    #[error("bad options block: {0}")]
    BadOptions(#[from] ParseError),
    /// Options text was not UTF-8
    #[error("options block is not valid UTF-8")]
    BadEncoding,
}

// =============================================================================
// WRITING
// =============================================================================

/// Serialize a replay: header, options ini block, sentinel, input edges.
pub fn write_replay<W: Write>(
    mut writer: W,
    options: &Options,
    inputs: &[ReplayInput],
) -> io::Result<()> {
    writer.write_all(REPLAY_MAGIC)?;
    writer.write_all(options.to_ini().as_bytes())?;
    writer.write_all(&REPLAY_SENTINEL)?;
    for input in inputs {
        writer.write_all(&input.tick.to_le_bytes())?;
        writer.write_all(&input.keys.to_le_bytes())?;
    }
    Ok(())
}

/// Records input edges during live play.
///
/// `record` is called once per tick with the raw key bitset; only
/// changes are stored, so an idle game stays tiny.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReplayRecorder {
    inputs: Vec<ReplayInput>,
    last_keys: u32,
}

impl ReplayRecorder {
    /// Empty recorder; the implicit starting bitset is all-released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Note the keys in force at `tick`, storing an edge if they changed.
    pub fn record(&mut self, tick: u32, keys: VirtualKeySet) {
        if keys.bits() != self.last_keys {
            self.inputs.push(ReplayInput {
                tick,
                keys: keys.bits(),
            });
            self.last_keys = keys.bits();
        }
    }

    /// Recorded edges so far.
    pub fn inputs(&self) -> &[ReplayInput] {
        &self.inputs
    }
}

// =============================================================================
// READING
// =============================================================================

/// A decoded replay: verified options plus the input edge list.
#[derive(Clone, Debug)]
pub struct Replay {
    /// Options parsed from the pre-sentinel text
    pub options: Options,
    /// Input edges in recorded order
    pub inputs: Vec<ReplayInput>,
}

/// Decode a replay from raw bytes.
pub fn read_replay(bytes: &[u8]) -> Result<Replay, ReplayError> {
    let body = bytes
        .strip_prefix(REPLAY_MAGIC.as_slice())
        .ok_or(ReplayError::InvalidHeader)?;

    let sentinel_at = body
        .windows(REPLAY_SENTINEL.len())
        .position(|w| w == REPLAY_SENTINEL)
        .ok_or(ReplayError::NoInputsFound)?;

    let options_text =
        std::str::from_utf8(&body[..sentinel_at]).map_err(|_| ReplayError::BadEncoding)?;
    let options = Options::parse_str(options_text)?;

    let stream = &body[sentinel_at + REPLAY_SENTINEL.len()..];
    if stream.len() % RECORD_SIZE != 0 {
        return Err(ReplayError::InvalidInputLength(stream.len()));
    }

    let inputs = stream
        .chunks_exact(RECORD_SIZE)
        .map(|record| ReplayInput {
            tick: u32::from_le_bytes(record[0..4].try_into().expect("chunk size")),
            keys: u32::from_le_bytes(record[4..8].try_into().expect("chunk size")),
        })
        .collect();

    Ok(Replay { options, inputs })
}

/// Streams the recorded bitset back out tick by tick.
#[derive(Clone, Debug)]
pub struct ReplayPlayer {
    inputs: Vec<ReplayInput>,
    next: usize,
    current: u32,
}

impl ReplayPlayer {
    /// Player over a decoded edge list (must be in recorded order).
    pub fn new(inputs: Vec<ReplayInput>) -> Self {
        Self {
            inputs,
            next: 0,
            current: 0,
        }
    }

    /// Keys in force at `tick`. Ticks must be queried in nondecreasing
    /// order; the player carries the bitset forward between edges.
    pub fn keys_at(&mut self, tick: u32) -> VirtualKeySet {
        while let Some(input) = self.inputs.get(self.next) {
            if input.tick > tick {
                break;
            }
            self.current = input.keys;
            self.next += 1;
        }
        VirtualKeySet(self.current)
    }

    /// Tick of the last recorded edge (playback horizon).
    pub fn last_tick(&self) -> Option<u32> {
        self.inputs.last().map(|i| i.tick)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::randomizer::RandomizerKind;
    use crate::game::rotation::RotationSystem;

    #[test]
    fn test_replay_round_trip() {
        // goal 10, DTET rotation, one recorded edge
        let mut options = Options::default();
        options.goal = 10;
        options.rotation_system = RotationSystem::Dtet;
        options.seed = Some(12345);

        let inputs = [ReplayInput {
            tick: 786,
            keys: 0x3000_0198,
        }];

        let mut bytes = Vec::new();
        write_replay(&mut bytes, &options, &inputs).expect("write");

        let replay = read_replay(&bytes).expect("read");
        assert_eq!(replay.options, options);
        assert_eq!(replay.inputs, inputs);
    }

    #[test]
    fn test_round_trip_preserves_every_option_field() {
        let mut options = Options::default();
        options.seed = None;
        options.randomizer = RandomizerKind::Tgm3;
        options.well_width = 12;
        options.are_delay_ms = 417;
        options.infinite_ready_go_hold = true;

        let mut bytes = Vec::new();
        write_replay(&mut bytes, &options, &[]).expect("write");
        let replay = read_replay(&bytes).expect("read");
        assert_eq!(replay.options, options);
        assert!(replay.inputs.is_empty());
    }

    #[test]
    fn test_bad_header_rejected() {
        let err = read_replay(b"ZS2\nwhatever").unwrap_err();
        assert!(matches!(err, ReplayError::InvalidHeader));

        let err = read_replay(b"ZS").unwrap_err();
        assert!(matches!(err, ReplayError::InvalidHeader));
    }

    #[test]
    fn test_missing_sentinel_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(REPLAY_MAGIC);
        bytes.extend_from_slice(b"goal = 10\n");
        let err = read_replay(&bytes).unwrap_err();
        assert!(matches!(err, ReplayError::NoInputsFound));
    }

    #[test]
    fn test_truncated_stream_rejected() {
        let mut bytes = Vec::new();
        write_replay(
            &mut bytes,
            &Options::default(),
            &[ReplayInput { tick: 1, keys: 2 }],
        )
        .expect("write");
        bytes.pop();
        let err = read_replay(&bytes).unwrap_err();
        assert!(matches!(err, ReplayError::InvalidInputLength(7)));
    }

    #[test]
    fn test_recorder_stores_edges_only() {
        let mut recorder = ReplayRecorder::new();
        recorder.record(0, VirtualKeySet::none());
        recorder.record(1, VirtualKeySet(VirtualKeySet::LEFT));
        recorder.record(2, VirtualKeySet(VirtualKeySet::LEFT));
        recorder.record(3, VirtualKeySet(VirtualKeySet::LEFT));
        recorder.record(4, VirtualKeySet::none());

        assert_eq!(
            recorder.inputs(),
            &[
                ReplayInput {
                    tick: 1,
                    keys: VirtualKeySet::LEFT
                },
                ReplayInput { tick: 4, keys: 0 },
            ]
        );
    }

    #[test]
    fn test_player_carries_bitset_between_edges() {
        let mut player = ReplayPlayer::new(vec![
            ReplayInput { tick: 2, keys: 0x04 },
            ReplayInput { tick: 5, keys: 0x00 },
        ]);

        assert_eq!(player.keys_at(0).bits(), 0);
        assert_eq!(player.keys_at(1).bits(), 0);
        assert_eq!(player.keys_at(2).bits(), 0x04);
        assert_eq!(player.keys_at(3).bits(), 0x04);
        assert_eq!(player.keys_at(4).bits(), 0x04);
        assert_eq!(player.keys_at(5).bits(), 0);
        assert_eq!(player.keys_at(100).bits(), 0);
    }
}
