//! Track state-of-record and population control for Lumen.
//!
//! A run holds a fixed number of track *slots*, each addressed by a
//! [`ThreadId`](lumen_core::ThreadId). [`CoreState`] stores every per-slot
//! sub-state in its own [`Collection`](lumen_core::Collection) plus the
//! per-step secondary arena and the [`TrackInitBuffer`]:
//!
//! ```text
//! CoreState
//! ├── geo / particle / physics / sim / interaction / rng   (one entry per slot)
//! ├── StackAllocator<Secondary>                            (cleared every step)
//! └── TrackInitBuffer
//!     ├── initializers   (LIFO, capacity-bounded)
//!     └── vacancies      (LIFO stack of free slots)
//! ```
//!
//! Sweeps over every slot run through [`launch`], which captures per-slot
//! failures on the host and aborts on the device.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod init;
pub mod launch;
pub mod params;
pub mod state;

pub use init::{
    cleanup, extend_from_secondaries, initialize_tracks, start_step, TrackInitBuffer,
};
pub use launch::{launch, ExecutionSpace};
pub use params::{Cutoff, CutoffParams, ParticleDef, ParticleParams, RngParams};
pub use state::{
    CoreState, GeoTrackState, Interaction, InteractionAction, ParticleTrackState,
    PhysicsTrackState, SimTrackState, StepLimit, StepLimitAction, TrackRef, TrackStatus,
    TrackView,
};
