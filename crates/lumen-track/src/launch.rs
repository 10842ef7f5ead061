//! Parallel sweeps over every track slot.
//!
//! A sweep applies one kernel to each slot independently. How a per-slot
//! failure surfaces depends on the [`ExecutionSpace`]:
//!
//! - **Host:** every slot is attempted; failures are captured with full
//!   slot context and the lowest-thread failure is returned afterwards,
//!   together with the number of failures not reported.
//! - **Device:** the first failure aborts the process the way a trapped
//!   device kernel would, by panicking with the failure context.

use lumen_core::{KernelError, TrackError, TrackFailure};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::state::{CoreState, TrackView};

/// Where sweeps execute, which selects the failure strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionSpace {
    /// Capture failures and report after the sweep.
    #[default]
    Host,
    /// Abort on the first failure.
    Device,
}

/// Run `kernel` on every slot of `state` in parallel.
///
/// Kernels are called for vacant slots too and must skip slots they do
/// not apply to. The sweep is complete when this returns.
///
/// # Panics
///
/// On [`ExecutionSpace::Device`], panics with the failure context of the
/// first slot whose kernel fails.
pub fn launch<F>(
    label: &str,
    space: ExecutionSpace,
    state: &mut CoreState,
    kernel: F,
) -> Result<(), KernelError>
where
    F: Fn(&mut TrackView<'_>) -> Result<(), TrackError> + Sync + Send,
{
    match space {
        ExecutionSpace::Host => {
            let failures: Vec<TrackFailure> = state
                .par_views()
                .filter_map(|mut view| match kernel(&mut view) {
                    Ok(()) => None,
                    Err(e) => Some(view.failure(label, e)),
                })
                .collect();
            let mut failures = failures.into_iter();
            match failures.next() {
                None => Ok(()),
                Some(first) => {
                    let suppressed = failures.len();
                    if suppressed > 0 {
                        eprintln!(
                            "lumen: {} track failures in '{label}'; reporting the first (thread {})",
                            suppressed + 1,
                            first.thread
                        );
                    }
                    Err(KernelError {
                        first: Box::new(first),
                        suppressed,
                    })
                }
            }
        }
        ExecutionSpace::Device => {
            state.par_views().for_each(|mut view| {
                if let Err(e) = kernel(&mut view) {
                    let failure = view.failure(label, e);
                    panic!("device kernel abort: {failure}");
                }
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{ThreadId, TrackId};

    use crate::state::TrackStatus;

    fn occupied(slots: usize) -> CoreState {
        let mut state = CoreState::new(slots, slots, 4);
        for (i, sim) in state.sim.as_mut_slice().iter_mut().enumerate() {
            sim.track_id = Some(TrackId(i as u64));
            sim.status = TrackStatus::Alive;
        }
        state
    }

    #[test]
    fn host_sweep_visits_every_slot() {
        let mut state = occupied(16);
        launch("count", ExecutionSpace::Host, &mut state, |v| {
            v.sim.num_steps += 1;
            Ok(())
        })
        .unwrap();
        assert!(state.slots().all(|s| s.sim.num_steps == 1));
    }

    #[test]
    fn host_reports_lowest_thread_and_suppressed_count() {
        let mut state = occupied(32);
        let err = launch("odd-fails", ExecutionSpace::Host, &mut state, |v| {
            v.sim.num_steps += 1;
            if v.thread.0 % 2 == 1 {
                Err(TrackError::InvalidEnergy { energy: -1.0 })
            } else {
                Ok(())
            }
        })
        .unwrap_err();
        assert_eq!(err.first.thread, ThreadId(1));
        assert_eq!(err.first.label, "odd-fails");
        assert_eq!(err.first.track, Some(TrackId(1)));
        assert_eq!(err.suppressed, 15);
        // Every slot was attempted despite the failures.
        assert!(state.slots().all(|s| s.sim.num_steps == 1));
    }

    #[test]
    #[should_panic(expected = "device kernel abort")]
    fn device_sweep_aborts() {
        let mut state = occupied(8);
        let _ = launch("fails", ExecutionSpace::Device, &mut state, |v| {
            if v.thread.0 == 3 {
                Err(TrackError::InvalidEnergy { energy: f64::NAN })
            } else {
                Ok(())
            }
        });
    }
}
