//! Post-step action: apply the outcome of discrete interactions.

use lumen_action::{Action, ActionOrder, CoreParams, InteractionAction};
use lumen_core::types::is_unit;
use lumen_core::{KernelError, TrackError};
use lumen_track::{launch, CoreState, TrackView};

/// Applies each slot's [`Interaction`](lumen_action::Interaction):
/// new kinematics, absorption, or a retry after secondary exhaustion.
///
/// Local energy deposition, the energy of secondaries below their
/// production cutoff, and the energy of tracks falling below the tracking
/// cutoff are added to the slot's deposition for the step.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessInteractionsAction;

impl Action for ProcessInteractionsAction {
    fn label(&self) -> &str {
        "process-interactions"
    }

    fn description(&self) -> &str {
        "apply interaction outcomes to track state"
    }

    fn order(&self) -> ActionOrder {
        ActionOrder::PostStep
    }

    fn execute(&self, params: &CoreParams, state: &mut CoreState) -> Result<(), KernelError> {
        launch(self.label(), params.space, state, |track| {
            process_interaction(params, track)
        })
    }
}

fn process_interaction(params: &CoreParams, track: &mut TrackView<'_>) -> Result<(), TrackError> {
    if !track.sim.is_alive() {
        return Ok(());
    }
    let Some(outcome) = *track.interaction else {
        return Ok(());
    };
    let model_error = |reason: String| TrackError::Model {
        model: model_label(params, track),
        reason,
    };

    if !(outcome.energy_deposition.is_finite() && outcome.energy_deposition >= 0.0) {
        return Err(model_error(format!(
            "invalid energy deposition {}",
            outcome.energy_deposition
        )));
    }
    let mut deposit = outcome.energy_deposition;
    deposit += track
        .secondaries
        .get(outcome.secondaries)
        .filter(|s| s.energy < params.cutoffs.get(s.particle).production)
        .map(|s| s.energy)
        .sum::<f64>();

    match outcome.action {
        InteractionAction::Unchanged => {}
        InteractionAction::Scattered => {
            if !(outcome.energy.is_finite() && outcome.energy >= 0.0) {
                return Err(TrackError::InvalidEnergy {
                    energy: outcome.energy,
                });
            }
            if !is_unit(outcome.direction) {
                return Err(TrackError::InvalidDirection {
                    direction: outcome.direction,
                });
            }
            track.particle.energy = outcome.energy;
            track.geo.dir = outcome.direction;
        }
        InteractionAction::Absorbed => {
            track.particle.energy = 0.0;
            track.kill();
        }
        InteractionAction::Failed => {
            track.physics.retry = true;
        }
    }

    if track.sim.is_alive() {
        let energy = track.particle.energy;
        if energy <= 0.0 || energy < params.cutoffs.get(track.particle.particle).tracking {
            deposit += energy;
            track.particle.energy = 0.0;
            track.kill();
        }
    }
    track.physics.energy_deposition += deposit;
    Ok(())
}

fn model_label(params: &CoreParams, track: &TrackView<'_>) -> String {
    match track.sim.step_limit.action {
        Some(lumen_track::StepLimitAction::Interact(id)) => params
            .physics
            .model(id)
            .map_or_else(|| format!("model {id}"), |m| m.label().to_string()),
        _ => "unknown".to_string(),
    }
}
