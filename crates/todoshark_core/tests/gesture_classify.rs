use todoshark_core::gesture::{should_capture, GesturePhase};
use todoshark_core::{
    classify_release, GestureAction, GestureConfig, GestureContext, GestureOutcome,
    GestureTracker, HuntAction, ReleaseAnimation, SwipeDirection,
};

fn hunt(dx: f64, dy: f64) -> GestureOutcome {
    classify_release(GestureContext::HuntCard, &GestureConfig::default(), dx, dy)
}

#[test]
fn hunt_card_release_classification() {
    assert_eq!(
        hunt(150.0, 0.0).action(),
        Some(GestureAction::Hunt(HuntAction::Complete))
    );
    assert_eq!(
        hunt(-150.0, 0.0).action(),
        Some(GestureAction::Hunt(HuntAction::TakeOut))
    );
    assert_eq!(
        hunt(0.0, 150.0).action(),
        Some(GestureAction::Hunt(HuntAction::PutBack))
    );
    assert_eq!(hunt(50.0, 0.0), GestureOutcome::Cancelled);
}

#[test]
fn upward_and_exact_threshold_releases_cancel() {
    assert_eq!(hunt(0.0, -150.0), GestureOutcome::Cancelled);
    assert_eq!(hunt(100.0, 0.0), GestureOutcome::Cancelled);
    assert_eq!(hunt(0.0, 100.0), GestureOutcome::Cancelled);
}

#[test]
fn resolved_outcomes_slide_off_in_direction_of_travel() {
    assert_eq!(
        hunt(-150.0, 20.0).animation(),
        ReleaseAnimation::OffScreen(SwipeDirection::Left)
    );
    assert_eq!(
        hunt(10.0, 150.0).animation(),
        ReleaseAnimation::OffScreen(SwipeDirection::Down)
    );
    assert_eq!(hunt(30.0, 30.0).animation(), ReleaseAnimation::SnapBack);
}

#[test]
fn swipe_to_delete_only_requests_on_leftward_motion() {
    let config = GestureConfig::default();
    let outcome = classify_release(GestureContext::SwipeToDelete, &config, -150.0, 0.0);
    assert_eq!(outcome.action(), Some(GestureAction::DeleteRequested));

    for (dx, dy) in [(150.0, 0.0), (-50.0, 0.0), (0.0, 150.0)] {
        assert_eq!(
            classify_release(GestureContext::SwipeToDelete, &config, dx, dy),
            GestureOutcome::Cancelled
        );
    }
}

#[test]
fn thresholds_come_from_config() {
    let config = GestureConfig {
        swipe_threshold: 40.0,
        haptic_threshold: 30.0,
        ..GestureConfig::default()
    };
    assert_eq!(
        classify_release(GestureContext::HuntCard, &config, 50.0, 0.0).action(),
        Some(GestureAction::Hunt(HuntAction::Complete))
    );
}

#[test]
fn outcome_depends_only_on_release_displacement() {
    let mut tracker = GestureTracker::new(GestureContext::HuntCard, GestureConfig::default());
    tracker.begin();
    for (dx, dy) in [(40.0, 0.0), (160.0, 5.0), (-170.0, 0.0), (0.0, 180.0)] {
        tracker.drag(dx, dy).unwrap();
    }
    let outcome = tracker.release(20.0, 0.0).unwrap();
    assert_eq!(outcome, GestureOutcome::Cancelled);
    assert_eq!(tracker.phase(), GesturePhase::Cancelled);
    assert!(tracker.drag(1.0, 0.0).is_err());
}

#[test]
fn haptic_fires_once_per_direction() {
    let mut tracker = GestureTracker::new(GestureContext::HuntCard, GestureConfig::default());
    tracker.begin();

    let pulses: Vec<SwipeDirection> = [
        (50.0, 0.0),
        (85.0, 0.0),
        (120.0, 0.0),
        (60.0, 0.0),
        (90.0, 0.0),
        (-90.0, 0.0),
        (-120.0, 0.0),
    ]
    .into_iter()
    .filter_map(|(dx, dy)| tracker.drag(dx, dy).unwrap().haptic)
    .collect();

    assert_eq!(pulses, vec![SwipeDirection::Right, SwipeDirection::Left]);
    assert_eq!(
        tracker.release(120.0, 0.0).unwrap().action(),
        Some(GestureAction::Hunt(HuntAction::Complete))
    );
}

#[test]
fn drag_feedback_reports_progress_toward_threshold() {
    let mut tracker = GestureTracker::new(GestureContext::SwipeToDelete, GestureConfig::default());
    tracker.begin();

    let feedback = tracker.drag(-50.0, 0.0).unwrap();
    assert_eq!(feedback.translate_x, -50.0);
    assert_eq!(feedback.progress.left, 0.5);
    assert_eq!(feedback.progress.right, 0.0);

    let inert = tracker.drag(80.0, 0.0).unwrap();
    assert_eq!(inert.translate_x, 0.0);
}

#[test]
fn small_movements_are_not_captured() {
    let config = GestureConfig::default();
    assert!(!should_capture(GestureContext::HuntCard, &config, 5.0, 3.0));
    assert!(should_capture(GestureContext::HuntCard, &config, 15.0, 0.0));
    assert!(!should_capture(GestureContext::HuntCard, &config, 0.0, -15.0));
    assert!(!should_capture(GestureContext::SwipeToDelete, &config, 0.0, 15.0));
    assert!(should_capture(GestureContext::SwipeToDelete, &config, -15.0, 0.0));
}
