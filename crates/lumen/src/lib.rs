//! Lumen: parallel Monte Carlo particle transport over fixed-capacity
//! track slots.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Lumen sub-crates. For most users, adding `lumen` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use lumen::prelude::*;
//! use lumen::physics::{AbsorptionModel, InfiniteMedium};
//!
//! // One particle type, absorbed after 1 cm on average.
//! let mut particles = ParticleParams::new();
//! let gamma = particles.insert("gamma", 0.0, 0.0);
//! let mut physics = PhysicsParams::new();
//! physics.add_model(Box::new(AbsorptionModel::new(
//!     Applicability::new([gamma], 0.0, f64::INFINITY),
//!     1.0,
//! )));
//!
//! let config = RunConfig {
//!     input: RunInput {
//!         track_slots: 16,
//!         initializer_capacity: 64,
//!         ..RunInput::default()
//!     },
//!     geometry: Arc::new(InfiniteMedium),
//!     particles,
//!     physics,
//!     cutoffs: CutoffParams::new(),
//!     actions: lumen::physics::standard_actions(),
//! };
//!
//! let primaries: Vec<Primary> = (0..32)
//!     .map(|i| Primary {
//!         particle: gamma,
//!         energy: 1.0,
//!         position: [0.0; 3],
//!         direction: [1.0, 0.0, 0.0],
//!         time: 0.0,
//!         event: EventId(i),
//!     })
//!     .collect();
//!
//! let result = Transporter::new(config).unwrap().run(&primaries).unwrap();
//! assert_eq!(result.termination, Termination::Drained);
//! assert!((result.total_energy_deposition() - 32.0).abs() < 1e-9);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `lumen-core` | IDs, track records, error types, geometry trait |
//! | [`arena`] | `lumen-arena` | Fixed-capacity secondary arena |
//! | [`track`] | `lumen-track` | Per-slot state, sweeps, population control |
//! | [`action`] | `lumen-action` | Action and model traits, shared parameters |
//! | [`physics`] | `lumen-physics` | Reference geometry, actions and models |
//! | [`engine`] | `lumen-engine` | Step loop, configuration, diagnostics, output |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`lumen-core`).
///
/// Contains the track records, the error taxonomy, and the
/// [`types::GeometryOracle`] trait.
pub use lumen_core as types;

/// The per-step secondary arena (`lumen-arena`).
pub use lumen_arena as arena;

/// Track state, parallel sweeps and population control (`lumen-track`).
///
/// [`track::CoreState`] owns every slot; [`track::launch`] runs a sweep
/// with host failure capture or device abort.
pub use lumen_track as track;

/// Action and model traits (`lumen-action`).
///
/// [`action::Action`] and [`action::Model`] are the main extension points
/// for user-defined stepping and physics.
pub use lumen_action as action;

/// Reference geometry, actions and models (`lumen-physics`).
pub use lumen_physics as physics;

/// Step loop and run output (`lumen-engine`).
///
/// [`engine::Stepper`] for one step at a time, [`engine::Transporter`] for
/// whole runs.
pub use lumen_engine as engine;

/// Common imports for typical Lumen usage.
///
/// ```rust
/// use lumen::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use lumen_core::{
        EventId, GeometryOracle, ParticleId, Primary, Secondary, ThreadId, TrackId, VolumeId,
    };

    // Errors
    pub use lumen_core::{InitError, KernelError, StepError, TrackError, TrackFailure};

    // Track state
    pub use lumen_track::{
        CoreState, Cutoff, CutoffParams, ExecutionSpace, ParticleParams, TrackView,
    };

    // Actions and models
    pub use lumen_action::{
        Action, ActionOrder, Applicability, CoreParams, Interaction, Model, PhysicsParams,
    };

    // Engine
    pub use lumen_engine::{
        Diagnostic, RunConfig, RunError, RunInput, RunResult, StepMetrics, StepResult, Stepper,
        Termination, Transporter,
    };
}
