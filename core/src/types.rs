//! Shared primitive types used across the entire simulation.

/// Whole-dollar currency amount. Signed: the balance may go negative.
pub type Money = i64;

/// The canonical simulation identifier (a v4 UUID rendered as text).
pub type SimulationId = String;

/// Number of agent messages (steps) taken so far.
pub type MessageCount = u64;
