//! Run configuration, validation, and error types.
//!
//! [`RunInput`] holds the scalar knobs of a run and round-trips through
//! JSON. [`RunConfig`] adds the parts that cannot be serialized: geometry,
//! particles, physics models and actions.
//! [`validate()`](RunConfig::validate) checks everything at startup,
//! before any track is stepped.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lumen_action::{Action, ActionSequence, PhysicsParams, PipelineError};
use lumen_core::GeometryOracle;
use lumen_track::{CutoffParams, ExecutionSpace, ParticleParams};
use serde::{Deserialize, Serialize};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while loading or validating a run configuration.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Action pipeline or physics registry validation failed.
    Pipeline(PipelineError),
    /// A buffer capacity is zero.
    ZeroCapacity {
        /// Which capacity.
        name: &'static str,
    },
    /// The initializer buffer cannot hold one initializer per slot.
    InitializerCapacityTooSmall {
        /// Configured initializer capacity.
        initializer_capacity: usize,
        /// Configured track slots.
        track_slots: usize,
    },
    /// More track slots than a `ThreadId` can address.
    TrackSlotOverflow {
        /// The configured slot count.
        value: usize,
    },
    /// `max_steps` is zero.
    ZeroStepBudget,
    /// `threads` is `Some(0)`.
    InvalidThreadCount,
    /// A diagnostic histogram is malformed.
    InvalidHistogram {
        /// Description of the problem.
        reason: String,
    },
    /// The worker thread pool could not be built.
    ThreadPool {
        /// Description of the failure.
        reason: String,
    },
    /// The input file could not be read.
    Io {
        /// The offending path.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },
    /// The input file is not valid run input JSON.
    Parse {
        /// The offending path.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipeline(e) => write!(f, "pipeline: {e}"),
            Self::ZeroCapacity { name } => write!(f, "{name} must be at least 1"),
            Self::InitializerCapacityTooSmall {
                initializer_capacity,
                track_slots,
            } => write!(
                f,
                "initializer_capacity {initializer_capacity} is below track_slots {track_slots}"
            ),
            Self::TrackSlotOverflow { value } => {
                write!(f, "track_slots {value} exceeds u32::MAX")
            }
            Self::ZeroStepBudget => write!(f, "max_steps must be at least 1"),
            Self::InvalidThreadCount => write!(f, "threads must be at least 1 when set"),
            Self::InvalidHistogram { reason } => write!(f, "invalid histogram: {reason}"),
            Self::ThreadPool { reason } => write!(f, "thread pool: {reason}"),
            Self::Io { path, reason } => {
                write!(f, "cannot read '{}': {reason}", path.display())
            }
            Self::Parse { path, reason } => {
                write!(f, "invalid run input '{}': {reason}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PipelineError> for ConfigError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

// ── HistogramInput ─────────────────────────────────────────────────

/// Uniform binning of `[lower, upper)` into `bins` bins.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistogramInput {
    /// Lower edge.
    pub lower: f64,
    /// Upper edge.
    pub upper: f64,
    /// Number of bins.
    pub bins: usize,
}

impl HistogramInput {
    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.bins == 0 {
            return Err(ConfigError::InvalidHistogram {
                reason: format!("{name} needs at least one bin"),
            });
        }
        if !(self.lower.is_finite() && self.upper.is_finite() && self.lower < self.upper) {
            return Err(ConfigError::InvalidHistogram {
                reason: format!(
                    "{name} range [{}, {}) must be finite and non-empty",
                    self.lower, self.upper
                ),
            });
        }
        Ok(())
    }
}

// ── RunInput ───────────────────────────────────────────────────────

/// Scalar run parameters, loadable from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunInput {
    /// Number of track slots stepped in parallel.
    pub track_slots: usize,
    /// Maximum pending track initializers.
    pub initializer_capacity: usize,
    /// Maximum secondaries emitted in one step.
    pub secondary_capacity: usize,
    /// Step budget; the run stops after this many steps.
    pub max_steps: u64,
    /// Run seed.
    pub seed: u64,
    /// Worker threads; `None` uses the global pool.
    pub threads: Option<usize>,
    /// Failure strategy for every sweep.
    pub execution_space: ExecutionSpace,
    /// Energy deposition histogram along x (cm).
    pub energy_histogram: HistogramInput,
    /// Bins of the per-particle steps-at-death histogram.
    pub step_histogram_bins: usize,
}

impl Default for RunInput {
    fn default() -> Self {
        Self {
            track_slots: 1024,
            initializer_capacity: 8192,
            secondary_capacity: 4096,
            max_steps: 10_000,
            seed: 0,
            threads: None,
            execution_space: ExecutionSpace::Host,
            energy_histogram: HistogramInput {
                lower: -700.0,
                upper: 700.0,
                bins: 1024,
            },
            step_histogram_bins: 20,
        }
    }
}

impl RunInput {
    /// Load from a JSON file. Missing keys take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.track_slots == 0 {
            return Err(ConfigError::ZeroCapacity {
                name: "track_slots",
            });
        }
        if u32::try_from(self.track_slots).is_err() {
            return Err(ConfigError::TrackSlotOverflow {
                value: self.track_slots,
            });
        }
        if self.secondary_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                name: "secondary_capacity",
            });
        }
        if self.initializer_capacity < self.track_slots {
            return Err(ConfigError::InitializerCapacityTooSmall {
                initializer_capacity: self.initializer_capacity,
                track_slots: self.track_slots,
            });
        }
        if self.max_steps == 0 {
            return Err(ConfigError::ZeroStepBudget);
        }
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidThreadCount);
        }
        self.energy_histogram.validate("energy_histogram")?;
        if self.step_histogram_bins == 0 {
            return Err(ConfigError::InvalidHistogram {
                reason: "step_histogram_bins needs at least one bin".to_string(),
            });
        }
        Ok(())
    }
}

// ── RunConfig ──────────────────────────────────────────────────────

/// Everything needed to construct a [`Stepper`](crate::Stepper).
pub struct RunConfig {
    /// Scalar run parameters.
    pub input: RunInput,
    /// Geometry navigation.
    pub geometry: Arc<dyn GeometryOracle>,
    /// Particle definitions.
    pub particles: ParticleParams,
    /// Discrete models, continuous loss and step limit.
    pub physics: PhysicsParams,
    /// Tracking and production cutoffs.
    pub cutoffs: CutoffParams,
    /// Step actions; sorted into stages at construction.
    pub actions: Vec<Box<dyn Action>>,
}

impl RunConfig {
    /// Check the scalar input, the action list and the physics registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.input.validate()?;
        ActionSequence::validate(&self.actions, &self.physics)?;
        Ok(())
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("input", &self.input)
            .field("geometry", &self.geometry.name())
            .field("particles", &self.particles)
            .field("physics", &self.physics)
            .field(
                "actions",
                &self.actions.iter().map(|a| a.label()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
