//! Function-pointer finite state machine for the engine lifecycle.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  StateTable                                                 │
//! │  ┌──────────┬───────────┬─────────────────────┐             │
//! │  │ State    │ on_enter  │ on_update           │             │
//! │  ├──────────┼───────────┼─────────────────────┤             │
//! │  │ Off      │ fn(ctx)   │ fn(ctx,dt)->Option  │             │
//! │  │ Starting │ fn(ctx)   │ fn(ctx,dt)->Option  │             │
//! │  │ Stable   │ fn(ctx)   │ fn(ctx,dt)->Option  │             │
//! │  │ Stopping │ fn(ctx)   │ fn(ctx,dt)->Option  │             │
//! │  └──────────┴───────────┴─────────────────────┘             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state with
//! the step length.  If it returns `Some(next_id)`, the engine updates the
//! current pointer and runs `on_enter` for the next state.  All functions receive `&mut PlantContext`.

pub mod context;
pub mod states;

use context::PlantContext;
use log::info;
use serde::Serialize;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Engine lifecycle states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum EngineState {
    Off = 0,
    Starting = 1,
    Stable = 2,
    Stopping = 3,
}

impl EngineState {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert an index back to `EngineState`.  Panics on out-of-range in
    /// debug builds; returns `Off` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Off,
            1 => Self::Starting,
            2 => Self::Stable,
            3 => Self::Stopping,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Off
            }
        }
    }

    /// True for states in which the engines turn or burn fuel.
    pub fn is_running(self) -> bool {
        self != Self::Off
    }
}

/// Refinement of [`EngineState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SubState {
    /// Engines off.
    None,
    /// Starting, linear N1 ramp.
    LinearRamp,
    /// Starting, logarithmic N1 ramp.
    LogRamp,
    /// Stable, oscillating around the reference values.
    StableRun,
    /// Stopping, logarithmic decay.
    Shutdown,
}

impl SubState {
    /// Either phase of the start sequence.
    pub fn is_starting(self) -> bool {
        matches!(self, Self::LinearRamp | Self::LogRamp)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut PlantContext);

/// Signature for the per-tick update handler.
/// Receives the step length; returns `Some(next)` to trigger a transition.
pub type StateUpdateFn = fn(&mut PlantContext, f64) -> Option<EngineState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single lifecycle state.
pub struct StateDescriptor {
    pub id: EngineState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `EngineState as usize`.
    table: [StateDescriptor; EngineState::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; EngineState::COUNT], initial: EngineState) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut PlantContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one step of `dt` seconds.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut PlantContext, dt: f64) {
        let next = (self.table[self.current].on_update)(ctx, dt);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition (commands and safety shutdowns).
    /// A transition to the current state is ignored.
    pub fn force_transition(&mut self, next: EngineState, ctx: &mut PlantContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> EngineState {
        EngineState::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: EngineState, ctx: &mut PlantContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
