//! Deferred-commit behavior: the countdown, undo, commit-now, and the
//! confirmation gate for critical responses. Time is virtual throughout.

use std::time::Duration;

use automation::{
    AutomationError, AutomationSettings, CommitOutcome, CommitResolution, ResponseController,
    effective_response,
};
use brizzi_tests::{TestHarness, commit_for, sales_stages};
use entity::response::responses;

const PROCESS: &str = "תהליך מכירה";

async fn controller_with_pending(
    harness: &TestHarness,
) -> (ResponseController, entity::ProcessAction, entity::Lead) {
    harness.seed_process(PROCESS, sales_stages()).await;
    let lead = harness.create_lead("ישראל כהן", Some(PROCESS)).await;
    let action = harness.sole_pending_action(&lead.id).await;
    let controller =
        ResponseController::new(harness.engine.clone(), &AutomationSettings::default());
    (controller, action, lead)
}

#[tokio::test(start_paused = true)]
async fn countdown_reaches_zero_and_commits() {
    let harness = TestHarness::new();
    let (controller, action, lead) = controller_with_pending(&harness).await;

    let staged = controller
        .select(commit_for(&action, responses::SCHEDULED), false)
        .unwrap();
    let pending = controller.begin(staged);
    assert_eq!(pending.remaining_secs(), 10);

    let resolution = pending.wait().await.unwrap();
    assert_eq!(
        resolution,
        CommitResolution::Committed(CommitOutcome::Advanced { to_stage: 3 })
    );
    assert_eq!(harness.reload_lead(&lead.id).await.current_stage, Some(3));
}

#[tokio::test(start_paused = true)]
async fn undo_cancels_before_the_window_closes() {
    let harness = TestHarness::new();
    let (controller, action, lead) = controller_with_pending(&harness).await;

    let staged = controller
        .select(commit_for(&action, responses::SCHEDULED), false)
        .unwrap();
    let pending = controller.begin(staged);
    let resolution = pending.undo().await.unwrap();
    assert_eq!(resolution, CommitResolution::Cancelled);

    // Nothing committed: the action is still pending, the stage untouched.
    let action = harness.sole_pending_action(&lead.id).await;
    assert!(action.user_response.is_none());
    assert_eq!(harness.reload_lead(&lead.id).await.current_stage, Some(2));
}

#[tokio::test(start_paused = true)]
async fn do_now_short_circuits_the_countdown() {
    let harness = TestHarness::new();
    let (controller, action, lead) = controller_with_pending(&harness).await;

    let staged = controller
        .select(commit_for(&action, responses::SCHEDULED), false)
        .unwrap();
    let pending = controller.begin(staged);
    let resolution = pending.commit_now().await.unwrap();
    assert_eq!(
        resolution,
        CommitResolution::Committed(CommitOutcome::Advanced { to_stage: 3 })
    );
    assert_eq!(harness.reload_lead(&lead.id).await.current_stage, Some(3));
}

#[tokio::test(start_paused = true)]
async fn ticks_count_down_once_per_second() {
    let harness = TestHarness::new();
    let (controller, action, _lead) = controller_with_pending(&harness).await;

    let staged = controller
        .select(commit_for(&action, responses::SCHEDULED), false)
        .unwrap();
    let pending = controller.begin(staged);

    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(pending.remaining_secs(), 7);

    let resolution = pending.wait().await.unwrap();
    assert!(matches!(resolution, CommitResolution::Committed(_)));
}

#[tokio::test(start_paused = true)]
async fn critical_responses_demand_confirmation_first() {
    let harness = TestHarness::new();
    let (controller, action, lead) = controller_with_pending(&harness).await;

    for response in [
        responses::LEAD_IRRELEVANT,
        responses::QUOTE_IRRELEVANT,
        responses::LEAD_CONVERTED,
    ] {
        let err = controller
            .select(commit_for(&action, response), false)
            .unwrap_err();
        assert!(matches!(err, AutomationError::ConfirmationRequired { .. }));
    }

    // Non-critical choices never ask.
    controller
        .select(commit_for(&action, responses::SKIP), false)
        .unwrap();

    // Once confirmed, the critical response goes through the normal window.
    let staged = controller
        .select(commit_for(&action, responses::LEAD_IRRELEVANT), true)
        .unwrap();
    let resolution = controller.begin(staged).wait().await.unwrap();
    assert_eq!(
        resolution,
        CommitResolution::Committed(CommitOutcome::MarkedIrrelevant)
    );
    assert!(!harness.reload_lead(&lead.id).await.is_active);
}

#[tokio::test(start_paused = true)]
async fn empty_selection_is_rejected_before_any_countdown() {
    let harness = TestHarness::new();
    let (controller, action, _lead) = controller_with_pending(&harness).await;

    let err = controller
        .select(commit_for(&action, ""), false)
        .unwrap_err();
    assert!(matches!(err, AutomationError::MissingResponse));
}

#[tokio::test]
async fn secondary_choice_overrides_the_primary() {
    // "לא בוצע" with a secondary disambiguation commits the secondary.
    assert_eq!(
        effective_response("לא בוצע", Some(responses::LEAD_IRRELEVANT)),
        responses::LEAD_IRRELEVANT
    );
    assert_eq!(effective_response(responses::SCHEDULED, None), responses::SCHEDULED);
}
