//! Runtime Options
//!
//! Every knob the engine exposes, with verification against the well
//! and preview maxima, plus the ini-style text form embedded in replay
//! files: `key = value` lines, `;`/`#` comments, optional `[group]`
//! headers, case-insensitive keys and enum names, `null` for absent
//! optionals.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::game::randomizer::RandomizerKind;
use crate::game::rotation::RotationSystem;
use crate::game::well::{MAX_WELL_HEIGHT, MAX_WELL_WIDTH};

/// Maximum configurable preview length.
pub const MAX_PREVIEW_PIECES: usize = 5;

/// When the lock timer is allowed to reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockStyle {
    /// Never reset after spawn
    Entry,
    /// Reset when gravity advances the piece a row
    Step,
    /// Reset on gravity steps, shifts, and rotations
    #[default]
    Move,
}

/// How held rotation keys apply to a freshly spawned piece.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialActionStyle {
    /// Ignore held keys at spawn
    #[default]
    None,
    /// Apply held rotation keys at spawn
    Persistent,
    /// Reserved: tap-to-buffer initial actions (not yet implemented)
    Trigger,
}

/// Engine configuration. Constructed by the host, verified once, then
/// owned (and serialized into recordings) by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// PRNG seed; absent means "host did not choose" and resolves to 0
    pub seed: Option<u32>,
    /// Well width in columns
    pub well_width: u8,
    /// Well height in rows, hidden rows included
    pub well_height: u8,
    /// Hidden spawn rows at the top
    pub well_hidden: u8,
    /// Auto-shift repeat interval; 0 = instant to the wall
    pub das_speed_ms: u32,
    /// Charge time before auto-shift engages
    pub das_delay_ms: u32,
    /// Appearance delay between lock and next spawn
    pub are_delay_ms: u32,
    /// Log a warning when a piece took more presses than needed
    pub warn_on_bad_finesse: bool,
    /// Any new key press skips the remaining appearance delay
    pub are_cancellable: bool,
    /// Lock timer reset policy
    pub lock_style: LockStyle,
    /// Grounded time before a piece locks
    pub lock_delay_ms: u32,
    /// Floorkicks allowed per piece; 0 disables the limit
    pub floorkick_limit: u32,
    /// Soft drop applies only on the press edge
    pub one_shot_soft_drop: bool,
    /// Rotation system
    pub rotation_system: RotationSystem,
    /// Held-key treatment at spawn
    pub initial_action_style: InitialActionStyle,
    /// Base gravity
    pub gravity_ms_per_cell: u32,
    /// Soft-drop gravity (replaces the base rate)
    pub soft_drop_gravity_ms_per_cell: u32,
    /// Piece randomizer
    pub randomizer: RandomizerKind,
    /// Length of the Ready phase
    pub ready_phase_length_ms: u32,
    /// Length of the Go phase
    pub go_phase_length_ms: u32,
    /// Pre-game holds never consume hold availability
    pub infinite_ready_go_hold: bool,
    /// Preview queue length
    pub preview_piece_count: u8,
    /// Lines to clear before the game ends
    pub goal: u32,
    /// Expose the ghost position in snapshots
    pub show_ghost: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            seed: None,
            well_width: 10,
            well_height: 22,
            well_hidden: 2,
            das_speed_ms: 0,
            das_delay_ms: 150,
            are_delay_ms: 0,
            warn_on_bad_finesse: false,
            are_cancellable: false,
            lock_style: LockStyle::Move,
            lock_delay_ms: 150,
            floorkick_limit: 1,
            one_shot_soft_drop: false,
            rotation_system: RotationSystem::Srs,
            initial_action_style: InitialActionStyle::None,
            gravity_ms_per_cell: 1000,
            soft_drop_gravity_ms_per_cell: 200,
            randomizer: RandomizerKind::Bag7SeamCheck,
            ready_phase_length_ms: 833,
            go_phase_length_ms: 833,
            infinite_ready_go_hold: false,
            preview_piece_count: 4,
            goal: 40,
            show_ghost: true,
        }
    }
}

/// Rejected option values. Fatal at engine construction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OptionsError {
    /// Well width outside the supported range
    #[error("well width {0} outside 4..={max}", max = MAX_WELL_WIDTH)]
    WellWidth(u8),
    /// Well height outside the supported range
    #[error("well height {0} outside 4..={max}", max = MAX_WELL_HEIGHT)]
    WellHeight(u8),
    /// Hidden rows must leave a visible field
    #[error("hidden rows {hidden} do not fit in height {height}")]
    WellHidden {
        /// Configured hidden rows
        hidden: u8,
        /// Configured height
        height: u8,
    },
    /// Preview longer than the backing queue
    #[error("preview count {0} exceeds maximum {max}", max = MAX_PREVIEW_PIECES)]
    PreviewCount(u8),
}

/// Option text parse failures, with source line context.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Line without a `key = value` shape
    #[error("line {line}: malformed line: `{content}`")]
    MalformedLine {
        /// 1-based source line
        line: usize,
        /// Offending text
        content: String,
    },
    /// Boolean value outside the accepted forms
    #[error("line {line}: unknown boolean `{value}` (want true/yes/1/false/no/0)")]
    UnknownBool {
        /// 1-based source line
        line: usize,
        /// Offending value
        value: String,
    },
    /// Enum value not matching any variant name
    #[error("line {line}: unknown value `{value}` for `{key}`")]
    UnknownEnum {
        /// 1-based source line
        line: usize,
        /// Option key
        key: String,
        /// Offending value
        value: String,
    },
    /// Unparseable number
    #[error("line {line}: bad number `{value}` for `{key}`")]
    BadNumber {
        /// 1-based source line
        line: usize,
        /// Option key
        key: String,
        /// Offending value
        value: String,
    },
}

impl Options {
    /// Check bounds. Called once at engine construction.
    pub fn verify(&self) -> Result<(), OptionsError> {
        if self.well_width < 4 || self.well_width as usize > MAX_WELL_WIDTH {
            return Err(OptionsError::WellWidth(self.well_width));
        }
        if self.well_height < 4 || self.well_height as usize > MAX_WELL_HEIGHT {
            return Err(OptionsError::WellHeight(self.well_height));
        }
        if self.well_hidden >= self.well_height {
            return Err(OptionsError::WellHidden {
                hidden: self.well_hidden,
                height: self.well_height,
            });
        }
        if self.preview_piece_count as usize > MAX_PREVIEW_PIECES {
            return Err(OptionsError::PreviewCount(self.preview_piece_count));
        }
        Ok(())
    }

    /// Parse an ini-style option block on top of the defaults.
    pub fn parse_str(text: &str) -> Result<Options, ParseError> {
        let mut options = Options::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                continue; // group headers are organizational only
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ParseError::MalformedLine {
                    line,
                    content: trimmed.to_string(),
                });
            };
            options.set(key.trim(), value.trim(), line)?;
        }
        Ok(options)
    }

    /// Apply one `key = value` pair. Unknown keys are skipped with a
    /// warning so newer recordings stay readable.
    fn set(&mut self, key: &str, value: &str, line: usize) -> Result<(), ParseError> {
        let key_lower = key.to_ascii_lowercase();
        match key_lower.as_str() {
            "seed" => {
                self.seed = if value.eq_ignore_ascii_case("null") {
                    None
                } else {
                    Some(parse_number(&key_lower, value, line)?)
                }
            }
            "well_width" => self.well_width = parse_number(&key_lower, value, line)? as u8,
            "well_height" => self.well_height = parse_number(&key_lower, value, line)? as u8,
            "well_hidden" => self.well_hidden = parse_number(&key_lower, value, line)? as u8,
            "das_speed_ms" => self.das_speed_ms = parse_number(&key_lower, value, line)?,
            "das_delay_ms" => self.das_delay_ms = parse_number(&key_lower, value, line)?,
            "are_delay_ms" => self.are_delay_ms = parse_number(&key_lower, value, line)?,
            "warn_on_bad_finesse" => self.warn_on_bad_finesse = parse_bool(value, line)?,
            "are_cancellable" => self.are_cancellable = parse_bool(value, line)?,
            "lock_style" => {
                self.lock_style = match value.to_ascii_lowercase().as_str() {
                    "entry" => LockStyle::Entry,
                    "step" => LockStyle::Step,
                    "move" => LockStyle::Move,
                    _ => return Err(unknown_enum(&key_lower, value, line)),
                }
            }
            "lock_delay_ms" => self.lock_delay_ms = parse_number(&key_lower, value, line)?,
            "floorkick_limit" => self.floorkick_limit = parse_number(&key_lower, value, line)?,
            "one_shot_soft_drop" => self.one_shot_soft_drop = parse_bool(value, line)?,
            "rotation_system" => {
                self.rotation_system = match value.to_ascii_lowercase().as_str() {
                    "srs" => RotationSystem::Srs,
                    "arikasrs" => RotationSystem::ArikaSrs,
                    "sega" => RotationSystem::Sega,
                    "nes" => RotationSystem::Nes,
                    "dtet" => RotationSystem::Dtet,
                    "tgm" => RotationSystem::Tgm,
                    "tgm3" => RotationSystem::Tgm3,
                    _ => return Err(unknown_enum(&key_lower, value, line)),
                }
            }
            "initial_action_style" => {
                self.initial_action_style = match value.to_ascii_lowercase().as_str() {
                    "none" => InitialActionStyle::None,
                    "persistent" => InitialActionStyle::Persistent,
                    "trigger" => InitialActionStyle::Trigger,
                    _ => return Err(unknown_enum(&key_lower, value, line)),
                }
            }
            "gravity_ms_per_cell" => {
                self.gravity_ms_per_cell = parse_number(&key_lower, value, line)?
            }
            "soft_drop_gravity_ms_per_cell" => {
                self.soft_drop_gravity_ms_per_cell = parse_number(&key_lower, value, line)?
            }
            "randomizer" => {
                self.randomizer = match value.to_ascii_lowercase().as_str() {
                    "memoryless" => RandomizerKind::Memoryless,
                    "nes" => RandomizerKind::Nes,
                    "bag7" => RandomizerKind::Bag7,
                    "bag7seamcheck" => RandomizerKind::Bag7SeamCheck,
                    "bag6" => RandomizerKind::Bag6,
                    "multi2" => RandomizerKind::Multi2,
                    "multi4" => RandomizerKind::Multi4,
                    "multi9" => RandomizerKind::Multi9,
                    "tgm1" => RandomizerKind::Tgm1,
                    "tgm2" => RandomizerKind::Tgm2,
                    "tgm3" => RandomizerKind::Tgm3,
                    _ => return Err(unknown_enum(&key_lower, value, line)),
                }
            }
            "ready_phase_length_ms" => {
                self.ready_phase_length_ms = parse_number(&key_lower, value, line)?
            }
            "go_phase_length_ms" => {
                self.go_phase_length_ms = parse_number(&key_lower, value, line)?
            }
            "infinite_ready_go_hold" => self.infinite_ready_go_hold = parse_bool(value, line)?,
            "preview_piece_count" => {
                self.preview_piece_count = parse_number(&key_lower, value, line)? as u8
            }
            "goal" => self.goal = parse_number(&key_lower, value, line)?,
            "show_ghost" => self.show_ghost = parse_bool(value, line)?,
            _ => warn!(key, line, "ignoring unknown option"),
        }
        Ok(())
    }

    /// Serialize as the ini block written into replay files.
    pub fn to_ini(&self) -> String {
        let mut out = String::from("[game]\n");
        let mut kv = |k: &str, v: String| {
            out.push_str(k);
            out.push_str(" = ");
            out.push_str(&v);
            out.push('\n');
        };
        kv("seed", match self.seed {
            Some(s) => s.to_string(),
            None => "null".to_string(),
        });
        kv("well_width", self.well_width.to_string());
        kv("well_height", self.well_height.to_string());
        kv("well_hidden", self.well_hidden.to_string());
        kv("das_speed_ms", self.das_speed_ms.to_string());
        kv("das_delay_ms", self.das_delay_ms.to_string());
        kv("are_delay_ms", self.are_delay_ms.to_string());
        kv("warn_on_bad_finesse", self.warn_on_bad_finesse.to_string());
        kv("are_cancellable", self.are_cancellable.to_string());
        kv("lock_style", lock_style_name(self.lock_style).to_string());
        kv("lock_delay_ms", self.lock_delay_ms.to_string());
        kv("floorkick_limit", self.floorkick_limit.to_string());
        kv("one_shot_soft_drop", self.one_shot_soft_drop.to_string());
        kv(
            "rotation_system",
            rotation_system_name(self.rotation_system).to_string(),
        );
        kv(
            "initial_action_style",
            initial_action_style_name(self.initial_action_style).to_string(),
        );
        kv("gravity_ms_per_cell", self.gravity_ms_per_cell.to_string());
        kv(
            "soft_drop_gravity_ms_per_cell",
            self.soft_drop_gravity_ms_per_cell.to_string(),
        );
        kv("randomizer", randomizer_name(self.randomizer).to_string());
        kv("ready_phase_length_ms", self.ready_phase_length_ms.to_string());
        kv("go_phase_length_ms", self.go_phase_length_ms.to_string());
        kv(
            "infinite_ready_go_hold",
            self.infinite_ready_go_hold.to_string(),
        );
        kv("preview_piece_count", self.preview_piece_count.to_string());
        kv("goal", self.goal.to_string());
        kv("show_ghost", self.show_ghost.to_string());
        out
    }
}

fn parse_bool(value: &str, line: usize) -> Result<bool, ParseError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ParseError::UnknownBool {
            line,
            value: value.to_string(),
        }),
    }
}

fn parse_number(key: &str, value: &str, line: usize) -> Result<u32, ParseError> {
    value.parse::<u32>().map_err(|_| ParseError::BadNumber {
        line,
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn unknown_enum(key: &str, value: &str, line: usize) -> ParseError {
    ParseError::UnknownEnum {
        line,
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Canonical text name for a lock style.
pub fn lock_style_name(style: LockStyle) -> &'static str {
    match style {
        LockStyle::Entry => "entry",
        LockStyle::Step => "step",
        LockStyle::Move => "move",
    }
}

/// Canonical text name for an initial-action style.
pub fn initial_action_style_name(style: InitialActionStyle) -> &'static str {
    match style {
        InitialActionStyle::None => "none",
        InitialActionStyle::Persistent => "persistent",
        InitialActionStyle::Trigger => "trigger",
    }
}

/// Canonical text name for a rotation system.
pub fn rotation_system_name(rs: RotationSystem) -> &'static str {
    match rs {
        RotationSystem::Srs => "srs",
        RotationSystem::ArikaSrs => "arikasrs",
        RotationSystem::Sega => "sega",
        RotationSystem::Nes => "nes",
        RotationSystem::Dtet => "dtet",
        RotationSystem::Tgm => "tgm",
        RotationSystem::Tgm3 => "tgm3",
    }
}

/// Canonical text name for a randomizer kind.
pub fn randomizer_name(kind: RandomizerKind) -> &'static str {
    match kind {
        RandomizerKind::Memoryless => "memoryless",
        RandomizerKind::Nes => "nes",
        RandomizerKind::Bag7 => "bag7",
        RandomizerKind::Bag7SeamCheck => "bag7seamcheck",
        RandomizerKind::Bag6 => "bag6",
        RandomizerKind::Multi2 => "multi2",
        RandomizerKind::Multi4 => "multi4",
        RandomizerKind::Multi9 => "multi9",
        RandomizerKind::Tgm1 => "tgm1",
        RandomizerKind::Tgm2 => "tgm2",
        RandomizerKind::Tgm3 => "tgm3",
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_verify() {
        assert!(Options::default().verify().is_ok());
    }

    #[test]
    fn test_bounds_rejected() {
        let mut options = Options::default();
        options.well_width = 21;
        assert_eq!(options.verify(), Err(OptionsError::WellWidth(21)));

        let mut options = Options::default();
        options.well_height = 26;
        assert_eq!(options.verify(), Err(OptionsError::WellHeight(26)));

        let mut options = Options::default();
        options.preview_piece_count = 6;
        assert_eq!(options.verify(), Err(OptionsError::PreviewCount(6)));

        let mut options = Options::default();
        options.well_hidden = 22;
        assert!(matches!(
            options.verify(),
            Err(OptionsError::WellHidden { .. })
        ));
    }

    #[test]
    fn test_parse_round_trip() {
        let mut options = Options::default();
        options.seed = Some(99);
        options.goal = 10;
        options.rotation_system = RotationSystem::Dtet;
        options.randomizer = RandomizerKind::Tgm2;
        options.lock_style = LockStyle::Entry;
        options.are_cancellable = true;
        options.preview_piece_count = 5;

        let text = options.to_ini();
        let parsed = Options::parse_str(&text).expect("round trip parse");
        assert_eq!(parsed, options);
    }

    #[test]
    fn test_parse_comments_groups_case() {
        let text = "\
; comment
# another comment
[Game]
Seed = 7
GOAL = 25
rotation_system = TGM3
are_cancellable = Yes
";
        let parsed = Options::parse_str(text).expect("parse");
        assert_eq!(parsed.seed, Some(7));
        assert_eq!(parsed.goal, 25);
        assert_eq!(parsed.rotation_system, RotationSystem::Tgm3);
        assert!(parsed.are_cancellable);
    }

    #[test]
    fn test_parse_null_seed() {
        let parsed = Options::parse_str("seed = null").expect("parse");
        assert_eq!(parsed.seed, None);
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let err = Options::parse_str("seed = 1\nnot a line\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedLine {
                line: 2,
                content: "not a line".to_string()
            }
        );

        let err = Options::parse_str("\nshow_ghost = maybe\n").unwrap_err();
        assert!(matches!(err, ParseError::UnknownBool { line: 2, .. }));

        let err = Options::parse_str("randomizer = bag8").unwrap_err();
        assert!(matches!(err, ParseError::UnknownEnum { line: 1, .. }));

        let err = Options::parse_str("goal = forty").unwrap_err();
        assert!(matches!(err, ParseError::BadNumber { line: 1, .. }));
    }

    #[test]
    fn test_unknown_keys_skipped() {
        let parsed = Options::parse_str("future_option = 3\ngoal = 5\n").expect("parse");
        assert_eq!(parsed.goal, 5);
    }
}
