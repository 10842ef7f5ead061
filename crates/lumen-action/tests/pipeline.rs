//! Action sequence validation and ordering.

use lumen_action::{Action, ActionOrder, ActionSequence, Applicability, Model, PipelineError};
use lumen_core::ActionId;
use lumen_test_utils::{physics, KillModel, NoopAction, GAMMA};

fn noop(label: &str, order: ActionOrder) -> Box<dyn Action> {
    Box::new(NoopAction::new(label, order))
}

fn one_model() -> Vec<Box<dyn Model>> {
    vec![Box::new(KillModel::new(1.0))]
}

#[test]
fn actions_sorted_by_stage_keeping_registration_order() {
    let actions = vec![
        noop("post-a", ActionOrder::PostStep),
        noop("along", ActionOrder::AlongStep),
        noop("pre", ActionOrder::PreStep),
        noop("post-b", ActionOrder::PostStep),
    ];
    let seq = ActionSequence::new(actions, &physics(one_model())).unwrap();
    assert_eq!(seq.labels(), vec!["pre", "along", "post-a", "post-b"]);
    assert_eq!(seq.get(ActionId(1)).map(|a| a.label()), Some("along"));
    let post: Vec<_> = seq
        .stage(ActionOrder::PostStep)
        .map(|(_, a)| a.label())
        .collect();
    assert_eq!(post, vec!["post-a", "post-b"]);
}

#[test]
fn missing_along_step_rejected() {
    let actions = vec![noop("pre", ActionOrder::PreStep)];
    match ActionSequence::new(actions, &physics(one_model())) {
        Err(PipelineError::MissingAlongStep) => {}
        other => panic!("expected MissingAlongStep, got {other:?}"),
    }
}

#[test]
fn duplicate_action_labels_rejected() {
    let actions = vec![
        noop("step", ActionOrder::AlongStep),
        noop("step", ActionOrder::PostStep),
    ];
    match ActionSequence::new(actions, &physics(one_model())) {
        Err(PipelineError::DuplicateLabel { label }) => assert_eq!(label, "step"),
        other => panic!("expected DuplicateLabel, got {other:?}"),
    }
}

#[test]
fn model_label_may_not_shadow_action() {
    let actions = vec![noop("kill", ActionOrder::AlongStep)];
    match ActionSequence::new(actions, &physics(one_model())) {
        Err(PipelineError::DuplicateLabel { label }) => assert_eq!(label, "kill"),
        other => panic!("expected DuplicateLabel, got {other:?}"),
    }
}

#[test]
fn empty_registry_rejected() {
    let actions = vec![noop("along", ActionOrder::AlongStep)];
    match ActionSequence::new(actions, &physics(Vec::new())) {
        Err(PipelineError::NoModels) => {}
        other => panic!("expected NoModels, got {other:?}"),
    }
}

#[test]
fn inverted_applicability_rejected() {
    let mut bad = KillModel::new(1.0);
    bad.applicability = Applicability::new([GAMMA], 10.0, 1.0);
    let actions = vec![noop("along", ActionOrder::AlongStep)];
    match ActionSequence::new(actions, &physics(vec![Box::new(bad)])) {
        Err(PipelineError::InvalidApplicability { model }) => assert_eq!(model, "kill"),
        other => panic!("expected InvalidApplicability, got {other:?}"),
    }
}
