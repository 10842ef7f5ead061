//! Shared run configuration builders for the engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use lumen_action::{Action, Model};
use lumen_core::GeometryOracle;
use lumen_engine::{RunConfig, RunInput};
use lumen_test_utils::{particles, physics, MockGeometry};
use lumen_track::CutoffParams;

pub fn input(track_slots: usize, max_steps: u64) -> RunInput {
    RunInput {
        track_slots,
        initializer_capacity: track_slots.max(64),
        secondary_capacity: 256,
        max_steps,
        threads: Some(2),
        ..RunInput::default()
    }
}

pub fn config(input: RunInput, models: Vec<Box<dyn Model>>) -> RunConfig {
    config_with(
        input,
        Arc::new(MockGeometry::unbounded()),
        models,
        lumen_physics::standard_actions(),
    )
}

pub fn config_with(
    input: RunInput,
    geometry: Arc<dyn GeometryOracle>,
    models: Vec<Box<dyn Model>>,
    actions: Vec<Box<dyn Action>>,
) -> RunConfig {
    RunConfig {
        input,
        geometry,
        particles: particles(),
        physics: physics(models),
        cutoffs: CutoffParams::new(),
        actions,
    }
}
