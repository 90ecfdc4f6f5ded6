//! Single-writer async session runtime and event stream APIs.

/// Event stream types emitted by a session.
pub mod events;
/// Handle and command loop implementation.
pub mod handle;
