//! Step loop orchestration, configuration and run results for Lumen.
//!
//! [`Stepper`] executes one step of the transport pipeline over every
//! track slot; [`Transporter`] repeats steps until the population drains
//! or the step budget runs out and aggregates the diagnostics into a
//! [`RunResult`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod diagnostic;
pub mod hash;
pub mod metrics;
pub mod output;
pub mod step;
pub mod transport;

pub use config::{ConfigError, HistogramInput, RunConfig, RunInput};
pub use diagnostic::{
    Diagnostic, DiagnosticSet, EnergyDiagnostic, ProcessDiagnostic, StepDiagnostic,
    TrackDiagnostic,
};
pub use hash::Fingerprint;
pub use metrics::{StepCounters, StepMetrics};
pub use output::{Histogram, OutputError, RunResult, Termination, TimingTotals};
pub use step::{StepResult, Stepper};
pub use transport::{transport, RunError, Transporter};
