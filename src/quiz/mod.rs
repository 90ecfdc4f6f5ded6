//! Quiz engine core: state machine and viewport math.

/// Target selection, guess evaluation, and deferred transitions.
pub mod state;
/// Pan/zoom bookkeeping for the map view.
pub mod viewport;
