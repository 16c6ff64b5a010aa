//! The fall engine: decomposition, choreography, restoration and the run controller.

/// Phase scheduling and synchronization points.
pub mod choreograph;
/// Run controller: reentrancy guard, trigger routing and teardown.
pub mod controller;
/// Content decomposition into per-character units.
pub mod decompose;
/// Snapshot restoration.
pub mod restore;
/// Virtual-clock timer queue.
pub mod scheduler;
/// Units, snapshots, run context and counters.
pub mod state;
