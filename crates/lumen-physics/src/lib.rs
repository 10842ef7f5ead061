//! Reference geometry, stepping actions and physics models for Lumen.
//!
//! # Actions (each step)
//!
//! The stepper resets per-step track state before these run.
//!
//! 1. [`AlongStepAction`]: pick the step length, move, apply continuous loss
//! 2. *models*: launched by [`lumen_action::launch_models`]
//! 3. [`ProcessInteractionsAction`]: apply interaction outcomes
//!
//! # Models
//!
//! - [`AbsorptionModel`]: kills the track, depositing its energy
//! - [`IsotropicScatterModel`]: new direction, same energy
//! - [`PairConversionModel`]: photon to electron-positron pair
//!
//! # Geometry
//!
//! - [`InfiniteMedium`]: one volume filling all space
//! - [`SlabGeometry`]: layers bounded by planes normal to x

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod absorption;
pub mod along_step;
pub mod geometry;
pub mod isotropic_scatter;
pub mod pair_conversion;
pub mod post_step;

pub use absorption::AbsorptionModel;
pub use along_step::AlongStepAction;
pub use geometry::{InfiniteMedium, SlabGeometry};
pub use isotropic_scatter::IsotropicScatterModel;
pub use pair_conversion::{PairConversionModel, ELECTRON_MASS};
pub use post_step::ProcessInteractionsAction;

use lumen_action::Action;

/// The along-step and post-step actions, in order.
pub fn standard_actions() -> Vec<Box<dyn Action>> {
    vec![
        Box::new(AlongStepAction),
        Box::new(ProcessInteractionsAction),
    ]
}
