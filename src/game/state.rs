//! Engine State
//!
//! The engine owns everything: well, falling piece, hold slot, preview,
//! randomizer, PRNG, DAS interpreter, counters, and the input recorder.
//! Nothing is shared across ticks; the renderer only ever sees the
//! read-only snapshot.

use serde::Serialize;

use crate::core::hash::{StateHash, StateHasher};
use crate::core::queue::FixedQueue;
use crate::core::rng::SmallRng;
use crate::game::input::InputInterpreter;
use crate::game::options::{Options, OptionsError, MAX_PREVIEW_PIECES};
use crate::game::piece::{Piece, PieceId};
use crate::game::randomizer::Randomizer;
use crate::game::rotation::RotationSystem;
use crate::game::well::Well;
use crate::replay::ReplayRecorder;
use crate::TICKS_PER_DRAW_FRAME;

/// State machine phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum State {
    /// Pre-game countdown, first half
    #[default]
    Ready,
    /// Pre-game countdown, second half
    Go,
    /// Piece is above its resting row
    Falling,
    /// Piece is grounded; lock timer running
    Landed,
    /// Appearance delay between lock and next spawn
    Are,
    /// Spawn the next piece this tick
    NewPiece,
    /// Scan and collapse full rows this tick
    ClearLines,
    /// Terminal: player quit
    Quit,
    /// Terminal: topped out or goal reached
    GameOver,
    /// Terminal: player asked for a fresh game
    Restart,
}

impl State {
    /// Whether the machine has stopped.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Quit | State::GameOver | State::Restart)
    }

    /// Stable discriminant for hashing.
    #[inline]
    pub(crate) fn kind(self) -> u8 {
        match self {
            State::Ready => 0,
            State::Go => 1,
            State::Falling => 2,
            State::Landed => 3,
            State::Are => 4,
            State::NewPiece => 5,
            State::ClearLines => 6,
            State::Quit => 7,
            State::GameOver => 8,
            State::Restart => 9,
        }
    }
}

/// Running gameplay counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Rows cleared so far
    pub lines_cleared: u32,
    /// Pieces locked so far
    pub blocks_placed: u32,
    /// Finesse warnings emitted (when enabled)
    pub finesse_warnings: u32,
}

/// The simulation core. Construct with [`Engine::new`], then feed one
/// [`VirtualKeySet`](crate::game::input::VirtualKeySet) per tick.
#[derive(Clone, Debug)]
pub struct Engine {
    /// Verified options; `seed` is resolved at construction
    pub options: Options,
    /// Current phase
    pub state: State,
    /// The playing field
    pub well: Well,
    /// Falling piece, absent outside Falling/Landed
    pub piece: Option<Piece>,
    /// Stashed piece identity
    pub hold_piece: Option<PieceId>,
    /// Whether hold can still be used for the current piece
    pub hold_available: bool,
    /// Upcoming pieces
    pub preview: FixedQueue<PieceId, MAX_PREVIEW_PIECES>,
    /// Piece randomizer
    pub randomizer: Randomizer,
    /// Rotation system
    pub rotation_system: RotationSystem,
    /// Shared PRNG feeding the randomizer
    pub prng: SmallRng,
    /// Gameplay counters
    pub stats: Stats,
    /// DAS and edge-detection state
    pub input: InputInterpreter,
    /// Appearance-delay counter
    pub are_counter: u32,
    /// Ready/Go phase counter
    pub generic_counter: u32,
    /// Monotonic tick counter, advanced on every call
    pub total_ticks_raw: i64,
    /// Input-edge recorder for replay serialization
    pub recorder: ReplayRecorder,
    /// Left/right press edges seen for the current piece
    pub(crate) presses_this_piece: u32,
    /// Spawn column of the current piece (finesse baseline)
    pub(crate) spawn_x: i8,
}

impl Engine {
    /// Build an engine from verified options. The seed resolves to
    /// `options.seed` or 0 and is written back so recordings carry it.
    pub fn new(mut options: Options) -> Result<Engine, OptionsError> {
        options.verify()?;
        let seed = options.seed.unwrap_or(0);
        options.seed = Some(seed);

        let mut prng = SmallRng::new(seed);
        let mut randomizer = Randomizer::new(options.randomizer);
        let mut preview = FixedQueue::new(options.preview_piece_count as usize);
        preview.fill(|| randomizer.next(&mut prng));

        Ok(Engine {
            well: Well::new(options.well_width, options.well_height, options.well_hidden),
            state: State::Ready,
            piece: None,
            hold_piece: None,
            hold_available: true,
            preview,
            randomizer,
            rotation_system: options.rotation_system,
            prng,
            stats: Stats::default(),
            input: InputInterpreter::new(),
            are_counter: 0,
            generic_counter: 0,
            total_ticks_raw: 0,
            recorder: ReplayRecorder::new(),
            presses_this_piece: 0,
            spawn_x: 0,
            options,
        })
    }

    /// Pop the next piece: the randomizer refills the preview slot the
    /// head vacates.
    pub(crate) fn next_piece_id(&mut self) -> PieceId {
        let generated = self.randomizer.next(&mut self.prng);
        self.preview.take(generated)
    }

    /// Lock delay in ticks.
    #[inline]
    pub(crate) fn lock_ticks(&self) -> u32 {
        crate::ticks_from_ms(self.options.lock_delay_ms)
    }

    /// Whether the host loop should exit.
    #[inline]
    pub fn quit(&self) -> bool {
        self.state.is_terminal()
    }

    /// Whether the host should render after this tick.
    #[inline]
    pub fn in_draw_frame(&self) -> bool {
        self.total_ticks_raw % TICKS_PER_DRAW_FRAME as i64 == 0
    }

    /// Read-only view for the renderer.
    pub fn snapshot(&self) -> EngineSnapshot<'_> {
        let mut preview = [None; MAX_PREVIEW_PIECES];
        for (slot, id) in preview.iter_mut().zip(self.preview.iter()) {
            *slot = Some(id);
        }
        EngineSnapshot {
            state: self.state,
            well: &self.well,
            piece: self.piece.as_ref(),
            ghost_y: match (&self.piece, self.options.show_ghost) {
                (Some(piece), true) => Some(piece.y_hard_drop),
                _ => None,
            },
            hold_piece: self.hold_piece,
            hold_available: self.hold_available,
            preview,
            stats: self.stats,
            total_ticks_raw: self.total_ticks_raw,
            options: &self.options,
        }
    }

    /// Digest of the full simulation state. Two engines fed identical
    /// options, seed, and key streams hash identically on every tick.
    pub fn state_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_engine_state();
        hasher.update_u8(self.state.kind());
        hasher.update_i64(self.total_ticks_raw);
        hasher.update_u32(self.stats.lines_cleared);
        hasher.update_u32(self.stats.blocks_placed);
        hasher.update_u32(self.are_counter);
        hasher.update_u32(self.generic_counter);

        for y in 0..self.well.height() as i32 {
            for x in 0..self.well.width() as i32 {
                match self.well.cell(x, y) {
                    Some(block) => hasher.update_u8(block.id.index() as u8),
                    None => hasher.update_u8(0xFF),
                }
            }
        }

        match &self.piece {
            Some(piece) => {
                hasher.update_u8(1);
                hasher.update_u8(piece.id.index() as u8);
                hasher.update_i8(piece.x);
                hasher.update_i8(piece.y);
                hasher.update_fixed(piece.y_actual);
                hasher.update_i8(piece.y_hard_drop);
                hasher.update_u8(piece.theta.index() as u8);
                hasher.update_u32(piece.lock_timer);
                hasher.update_u32(piece.floorkick_count);
            }
            None => hasher.update_u8(0),
        }

        match self.hold_piece {
            Some(id) => hasher.update_u8(id.index() as u8),
            None => hasher.update_u8(0xFF),
        }
        hasher.update_bool(self.hold_available);

        for id in self.preview.iter() {
            hasher.update_u8(id.index() as u8);
        }
        for word in self.prng.state() {
            hasher.update_u32(word);
        }
        hasher.finalize()
    }
}

/// Read-only per-tick view of the engine for rendering and inspection.
#[derive(Clone, Debug, Serialize)]
pub struct EngineSnapshot<'a> {
    /// Current phase
    pub state: State,
    /// The playing field
    pub well: &'a Well,
    /// Falling piece, if any
    pub piece: Option<&'a Piece>,
    /// Resting row of the falling piece, when the ghost is enabled
    pub ghost_y: Option<i8>,
    /// Stashed piece
    pub hold_piece: Option<PieceId>,
    /// Whether hold is usable right now
    pub hold_available: bool,
    /// Upcoming pieces, front first; trailing slots `None` when the
    /// preview is configured shorter than the maximum
    pub preview: [Option<PieceId>; MAX_PREVIEW_PIECES],
    /// Gameplay counters
    pub stats: Stats,
    /// Monotonic tick counter
    pub total_ticks_raw: i64,
    /// The options in force
    pub options: &'a Options,
}

// =============================================================================
// TESTS
// =============================================================================
