//! Core ids, records, errors and traits for the Lumen transport engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Lumen workspace:
//! opaque ids, typed collections, track records, error types, and the
//! geometry oracle trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod collection;
pub mod error;
pub mod id;
pub mod traits;
pub mod types;

pub use collection::Collection;
pub use error::{InitError, KernelError, StepError, TrackError, TrackFailure};
pub use id::{
    ActionId, EventId, ModelId, OpaqueId, ParticleId, SurfaceId, ThreadId, TrackId, VolumeId,
};
pub use traits::{BoundaryHit, GeometryOracle};
pub use types::{Primary, Real3, Secondary, TrackInitializer};
