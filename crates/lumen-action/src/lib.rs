//! Step actions, physics model dispatch and shared parameters for Lumen.
//!
//! Every step runs a fixed sequence of stages over all track slots:
//!
//! ```text
//! reset → pre-step actions → along-step actions → launch_models → post-step actions
//! ```
//!
//! [`Action`]s are validated into an [`ActionSequence`] once at startup.
//! Discrete interactions go through [`launch_models`], which sweeps every
//! registered [`Model`] over every slot in [`ModelId`](lumen_core::ModelId)
//! order; each model acts only on the slots whose step ended in it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod model;
pub mod params;
pub mod pipeline;

pub use action::{Action, ActionOrder};
pub use lumen_track::{Interaction, InteractionAction};
pub use model::{launch_models, Applicability, Model};
pub use params::{CoreParams, PhysicsParams};
pub use pipeline::{ActionSequence, PipelineError};
