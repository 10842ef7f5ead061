//! End-to-end population scenarios: drain, secondary promotion, step
//! budget and initializer overflow.

mod common;

use std::sync::Arc;

use lumen_action::{Action, Interaction, Model};
use lumen_core::{InitError, StepError};
use lumen_engine::{RunError, Stepper, Termination, Transporter};
use lumen_physics::{AlongStepAction, ProcessInteractionsAction};
use lumen_test_utils::{
    primaries, CallbackModel, KillModel, MockGeometry, SecondaryModel, ELECTRON, GAMMA,
};

use common::{config, config_with, input};

/// Cross section large enough that every step ends in an interaction.
const ALWAYS: f64 = 1.0e6;

#[test]
fn killed_on_first_interaction_drains_in_one_step() {
    let models: Vec<Box<dyn Model>> = vec![Box::new(KillModel::new(ALWAYS))];
    let result = Transporter::new(config(input(10, 100), models))
        .unwrap()
        .run(&primaries(3, 1.0))
        .unwrap();

    assert_eq!(result.termination, Termination::Drained);
    assert_eq!(result.steps, 1);
    assert_eq!(result.alive_per_step, vec![0]);
    let c = result.counters[0];
    assert_eq!(c.initialized, 3);
    assert_eq!(c.active, 3);
    assert_eq!(c.killed, 3);
    assert_eq!(c.alive, 0);
    assert_eq!(c.pending, 0);
    assert_eq!(c.secondaries, 0);
    assert_eq!(result.interactions["gamma"]["kill"], 3);
    assert_eq!(result.steps_at_death["gamma"][1], 3);
    assert!((result.total_energy_deposition() - 3.0).abs() < 1e-12);
}

#[test]
fn all_slots_vacant_after_drain() {
    let models: Vec<Box<dyn Model>> = vec![Box::new(KillModel::new(ALWAYS))];
    let mut stepper = Stepper::new(config(input(10, 100), models)).unwrap();
    stepper.load_primaries(&primaries(3, 1.0)).unwrap();
    let mut diagnostics = lumen_engine::TrackDiagnostic::default();
    stepper.step(&mut diagnostics).unwrap();

    let state = stepper.state();
    assert_eq!(state.init().num_vacancies(), 10);
    assert_eq!(state.num_alive(), 0);
    assert_eq!(state.num_initializers(), 0);
    assert!(!stepper.has_work());
    assert_eq!(diagnostics.alive_per_step(), &[0]);
}

#[test]
fn one_secondary_each_drains_in_two_steps() {
    let models: Vec<Box<dyn Model>> = vec![
        Box::new(SecondaryModel::new(GAMMA, ELECTRON, 1, ALWAYS)),
        Box::new(KillModel::for_particles("kill-electron", [ELECTRON], ALWAYS)),
    ];
    let mut run_input = input(5, 100);
    run_input.initializer_capacity = 5;
    let result = Transporter::new(config(run_input, models))
        .unwrap()
        .run(&primaries(5, 2.0))
        .unwrap();

    assert_eq!(result.termination, Termination::Drained);
    assert_eq!(result.steps, 2);

    let first = result.counters[0];
    assert_eq!(first.active, 5);
    assert_eq!(first.killed, 5);
    assert_eq!(first.secondaries, 5);
    assert_eq!(first.promoted, 5);
    assert_eq!(first.pending, 5);
    assert_eq!(first.alive, 0);

    let second = result.counters[1];
    assert_eq!(second.initialized, 5);
    assert_eq!(second.killed, 5);
    assert_eq!(second.pending, 0);
    assert_eq!(second.alive, 0);

    assert_eq!(result.interactions["gamma"]["emit"], 5);
    assert_eq!(result.interactions["electron"]["kill-electron"], 5);
    assert!((result.total_energy_deposition() - 10.0).abs() < 1e-9);
}

#[test]
fn immortal_tracks_stop_at_step_budget() {
    let models: Vec<Box<dyn Model>> = vec![Box::new(CallbackModel::new(
        "bounce",
        ALWAYS,
        |track| Ok(Interaction::scattered(track.particle.energy, track.geo.dir)),
    ))];
    let result = Transporter::new(config(input(4, 7), models))
        .unwrap()
        .run(&primaries(6, 1.0))
        .unwrap();

    assert_eq!(
        result.termination,
        Termination::StepBudgetExhausted {
            alive: 4,
            pending: 2
        }
    );
    assert_eq!(result.steps, 7);
    assert_eq!(result.alive_per_step, vec![4; 7]);
    assert!(result.steps_at_death.is_empty());
    assert_eq!(result.total_energy_deposition(), 0.0);
}

#[test]
fn stepper_refuses_to_exceed_budget() {
    let models: Vec<Box<dyn Model>> = vec![Box::new(CallbackModel::new(
        "bounce",
        ALWAYS,
        |track| Ok(Interaction::scattered(track.particle.energy, track.geo.dir)),
    ))];
    let mut stepper = Stepper::new(config(input(2, 2), models)).unwrap();
    stepper.load_primaries(&primaries(1, 1.0)).unwrap();
    let mut diagnostics = lumen_engine::TrackDiagnostic::default();
    stepper.step(&mut diagnostics).unwrap();
    stepper.step(&mut diagnostics).unwrap();
    match stepper.step(&mut diagnostics) {
        Err(StepError::StepBudgetExhausted) => {}
        other => panic!("expected StepBudgetExhausted, got {other:?}"),
    }
    assert!(!stepper.is_disabled());
    assert_eq!(stepper.state().num_alive(), 1);
}

#[test]
fn too_many_primaries_fail_before_stepping() {
    let models: Vec<Box<dyn Model>> = vec![Box::new(KillModel::new(ALWAYS))];
    let mut run_input = input(4, 10);
    run_input.initializer_capacity = 4;
    let err = Transporter::new(config(run_input, models))
        .unwrap()
        .run(&primaries(5, 1.0))
        .unwrap_err();
    assert_eq!(
        err,
        RunError::Init(InitError::CapacityExceeded {
            requested: 5,
            capacity: 4
        })
    );
}

#[test]
fn arena_exhaustion_retries_instead_of_failing() {
    let models: Vec<Box<dyn Model>> = vec![
        Box::new(SecondaryModel::new(GAMMA, ELECTRON, 3, ALWAYS)),
        Box::new(KillModel::for_particles("kill-electron", [ELECTRON], ALWAYS)),
    ];
    let mut run_input = input(4, 100);
    run_input.secondary_capacity = 4;
    run_input.threads = Some(1);
    let result = Transporter::new(config(run_input, models))
        .unwrap()
        .run(&primaries(4, 3.0))
        .unwrap();

    assert_eq!(result.termination, Termination::Drained);
    assert!(result.counters[0].arena_exhausted);
    assert!(result.counters[0].failed_interactions >= 3);
    assert_eq!(result.interactions["gamma"]["emit"], 4);
    assert_eq!(result.interactions["electron"]["kill-electron"], 12);
    assert!((result.total_energy_deposition() - 12.0).abs() < 1e-9);
}

#[test]
fn tracks_start_stepping_without_any_pre_step_action() {
    let actions: Vec<Box<dyn Action>> =
        vec![Box::new(AlongStepAction), Box::new(ProcessInteractionsAction)];
    let models: Vec<Box<dyn Model>> = vec![Box::new(KillModel::new(ALWAYS))];
    let config = config_with(
        input(4, 5),
        Arc::new(MockGeometry::unbounded()),
        models,
        actions,
    );
    let result = Transporter::new(config)
        .unwrap()
        .run(&primaries(2, 1.0))
        .unwrap();

    assert_eq!(result.termination, Termination::Drained);
    assert_eq!(result.alive_per_step, vec![0]);
    assert_eq!(result.interactions["gamma"]["kill"], 2);
}
