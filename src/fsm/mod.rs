//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern expressed in Rust:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                     │
//! │  ┌──────────┬──────────┬─────────┬───────────────┬────────────┐ │
//! │  │ StateId  │ on_enter │ on_exit │ on_event      │ auto       │ │
//! │  ├──────────┼──────────┼─────────┼───────────────┼────────────┤ │
//! │  │ Boot     │ fn(ctx)  │ fn(ctx) │ fn(ctx,&ev)-> │ fn(ctx)->  │ │
//! │  │ Normal   │ fn(ctx)  │ fn(ctx) │   Option<Id>  │ Option<Id> │ │
//! │  │ Alert    │ fn(ctx)  │ fn(ctx) │               │            │ │
//! │  │ Recovery │ fn(ctx)  │ fn(ctx) │               │            │ │
//! │  └──────────┴──────────┴─────────┴───────────────┴────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is event-driven: [`Fsm::dispatch`] calls `on_event` for
//! the **current** state with one [`HazardEvent`].  If the handler
//! returns `Some(next_id)`, the engine runs `on_exit` for the current
//! state, then `on_enter` for the next, and updates the current pointer.
//! After any transition the caller drains [`Fsm::auto_advance`], which
//! lets a state's entry resolve immediately into another state (Boot
//! settles into Normal, Recovery settles into Normal) while still
//! publishing each hop as a distinct transition.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;
use serde::Serialize;

use crate::app::events::HazardEvent;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all possible system states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum StateId {
    Boot = 0,
    Normal = 1,
    Alert = 2,
    Recovery = 3,
}

impl StateId {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert a `usize` index back to `StateId`.  Panics on out-of-range
    /// in debug builds; returns `Alert` in release (the de-energized state
    /// is the safe fallback for a corrupted index).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Boot,
            1 => Self::Normal,
            2 => Self::Alert,
            3 => Self::Recovery,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Alert
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-event handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateEventFn = fn(&mut FsmContext, &HazardEvent) -> Option<StateId>;

/// Signature for entry auto-resolution.
/// Queried after every transition; `Some(next)` chains immediately.
pub type StateAdvanceFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_event: StateEventFn,
    pub auto_advance: Option<StateAdvanceFn>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]); the mutable
/// [`FsmContext`] is threaded through every handler call by the owner.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `dispatch()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Dispatch one event to the current state's handler.
    ///
    /// Returns the `(from, to)` pair if the event triggered a transition.
    /// The caller must then drain [`auto_advance`](Self::auto_advance).
    pub fn dispatch(&mut self, ctx: &mut FsmContext, event: &HazardEvent) -> Option<(StateId, StateId)> {
        let next = (self.table[self.current].on_event)(ctx, event);
        next.map(|next_id| self.transition(next_id, ctx))
    }

    /// Let the current state's entry resolve into another state.
    ///
    /// Returns one `(from, to)` hop, or `None` when the state is stable.
    /// Callers loop until `None` so every intermediate state is observed.
    pub fn auto_advance(&mut self, ctx: &mut FsmContext) -> Option<(StateId, StateId)> {
        let advance = self.table[self.current].auto_advance?;
        advance(ctx).map(|next_id| self.transition(next_id, ctx))
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) -> (StateId, StateId) {
        let from = self.current_state();
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        // Exit current state
        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        // Enter new state
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }

        (from, next_id)
    }
}
