//! Every model sweeps every slot, acting only where the step ended in it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lumen_action::{launch_models, Action, Interaction, InteractionAction, Model};
use lumen_core::{ModelId, ThreadId, TrackError};
use lumen_test_utils::{
    core_params, physics, primaries, CallbackModel, FailingModel, ForceInteractAction, KillModel,
    ELECTRON, GAMMA,
};
use lumen_track::{initialize_tracks, CoreState, ExecutionSpace, TrackStatus};

fn counting_model(label: &str, calls: &Arc<AtomicUsize>) -> CallbackModel {
    let calls = Arc::clone(calls);
    CallbackModel::new(label, 1.0, move |track| {
        calls.fetch_add(1, Ordering::Relaxed);
        Ok(Interaction::scattered(track.particle.energy, track.geo.dir))
    })
}

fn started(n: usize, slots: usize, params: &lumen_action::CoreParams) -> CoreState {
    let mut state = CoreState::new(slots, slots.max(n), 16);
    state.init_mut().extend_from_primaries(&primaries(n, 1.0)).unwrap();
    initialize_tracks(&*params.geometry, &params.rng, params.space, &mut state).unwrap();
    state
}

#[test]
fn only_the_selected_model_interacts() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let models: Vec<Box<dyn Model>> = vec![
        Box::new(counting_model("first", &first)),
        Box::new(counting_model("second", &second)),
    ];
    let params = core_params(physics(models), ExecutionSpace::Host);
    let mut state = started(3, 8, &params);

    ForceInteractAction::new(ModelId(1))
        .execute(&params, &mut state)
        .unwrap();
    let timings = launch_models(&params, &mut state).unwrap();

    assert_eq!(timings.len(), 2);
    assert_eq!(first.load(Ordering::Relaxed), 0);
    assert_eq!(second.load(Ordering::Relaxed), 3);
    let outcomes: Vec<_> = state
        .slots()
        .filter_map(|t| t.interaction.map(|i| i.action))
        .collect();
    assert_eq!(outcomes, vec![InteractionAction::Scattered; 3]);
}

#[test]
fn vacant_and_unselected_slots_are_untouched() {
    let models: Vec<Box<dyn Model>> = vec![Box::new(KillModel::new(1.0))];
    let params = core_params(physics(models), ExecutionSpace::Host);
    let mut state = started(2, 6, &params);

    // Tracks are still initializing: no step limit selects a model.
    launch_models(&params, &mut state).unwrap();
    assert!(state.slots().all(|t| t.interaction.is_none()));
    assert!(state
        .slots()
        .all(|t| t.sim.status != TrackStatus::Killed));
}

#[test]
fn model_failures_are_collected_across_the_sweep() {
    let models: Vec<Box<dyn Model>> = vec![Box::new(FailingModel::new(1.0, |id| id.0 >= 2))];
    let params = core_params(physics(models), ExecutionSpace::Host);
    let mut state = started(5, 8, &params);

    ForceInteractAction::new(ModelId(0))
        .execute(&params, &mut state)
        .unwrap();
    let err = launch_models(&params, &mut state).unwrap_err();

    assert_eq!(err.first.label, "failing");
    assert_eq!(err.first.thread, ThreadId(2));
    assert_eq!(err.suppressed, 2);
    // Slots that succeeded still recorded their outcome.
    assert!(state
        .slot(ThreadId(0))
        .and_then(|t| t.interaction)
        .is_some());
}

#[test]
fn selected_model_outside_applicability_is_a_track_failure() {
    let models: Vec<Box<dyn Model>> = vec![Box::new(KillModel::for_particles(
        "electron-only",
        [ELECTRON],
        1.0,
    ))];
    let params = core_params(physics(models), ExecutionSpace::Host);
    let mut state = started(2, 4, &params);

    ForceInteractAction::new(ModelId(0))
        .execute(&params, &mut state)
        .unwrap();
    let err = launch_models(&params, &mut state).unwrap_err();

    assert_eq!(err.first.label, "electron-only");
    assert_eq!(
        err.first.error,
        TrackError::NoApplicableModel {
            particle: GAMMA,
            energy: 1.0
        }
    );
    assert!(state.slots().all(|t| t.sim.status != TrackStatus::Killed));
}

#[test]
#[should_panic(expected = "device kernel abort")]
fn device_model_failure_aborts() {
    let models: Vec<Box<dyn Model>> = vec![Box::new(FailingModel::always(1.0))];
    let params = core_params(physics(models), ExecutionSpace::Device);
    let mut state = started(2, 4, &params);
    ForceInteractAction::new(ModelId(0))
        .execute(&params, &mut state)
        .unwrap();
    let _ = launch_models(&params, &mut state);
}
