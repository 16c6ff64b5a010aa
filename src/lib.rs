//! textfall decomposes block-level document text into per-character units, drives them
//! through a timed pop, fall and rise choreography, and restores the original content exactly.
//!
//! # Cycle overview
//!
//! 1. **Activate**: [`FallController::activate`] refuses to start while a cycle runs.
//! 2. **Prepare**: matching containers are snapshotted and split into `span.fall-char` units,
//!    each with a random pop delay. Exceeding the unit cap rolls everything back.
//! 3. **Choreograph**: every unit pops at its own delay, then all units fall together at
//!    `max(delay) + pop + margin`, rise together when the fall completes, and
//! 4. **Restore**: each container is rebuilt from its snapshot.
//!
//! The host document is an arena tree ([`Document`]) and the host's delayed callbacks are a
//! deterministic virtual-clock queue ([`TimerQueue`]), so a whole cycle can be driven and
//! inspected without a browser.
//!
//! For a longer walkthrough, see [`crate::guide`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Engine configuration.
pub mod config;
/// Host document abstraction.
pub mod document;
/// Decomposition, choreography, restoration and the run controller.
pub mod engine;
/// Standalone walkthrough of the cycle and its guarantees.
pub mod guide;
/// Timing parameters read from style variables.
pub mod timing;

pub use crate::config::engine::{EngineConfig, TriggerBindings};
pub use crate::document::fragment::{FragmentElement, FragmentNode};
pub use crate::document::markup::{inner_html, outer_html};
pub use crate::document::selector::SelectorList;
pub use crate::document::tree::{Document, ElementData, NodeId, NodeKind};
pub use crate::engine::choreograph::{CycleTask, fall_sync_point};
pub use crate::engine::controller::{Activation, FallController, Signal};
pub use crate::engine::decompose::{DecomposeOptions, PrepareReport, prepare};
pub use crate::engine::restore::{RestoreReport, restore_all};
pub use crate::engine::scheduler::{Fired, TimerId, TimerQueue};
pub use crate::engine::state::{
    AnimatableUnit, ContainerSnapshot, CycleSchedule, CycleStats, Phase, PhaseEvent, RunContext,
    SnapshotStore,
};
pub use crate::foundation::core::Millis;
pub use crate::foundation::error::{FallError, FallResult};
pub use crate::foundation::rng::{Rng64, UnitRandom};
pub use crate::timing::reader::{TimingConfig, TimingReader, parse_time_ms};
