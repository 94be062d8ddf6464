//! Drag gesture to action classification.
//!
//! # Responsibility
//! - Decide whether a drag should be captured at all.
//! - Produce live feedback (translation, indicator progress, haptic pulses)
//!   while dragging.
//! - Resolve the terminal action from the final displacement at release.
//!
//! # Invariants
//! - Per gesture: `Idle -> Dragging -> {Resolved(action) | Cancelled}`.
//! - The terminal outcome depends only on the release displacement, never on
//!   the path taken to reach it.
//! - Haptic pulses fire at most once per direction per gesture and never
//!   influence classification.
//! - Swipe-to-delete only ever requests deletion; it never deletes.

use crate::config::GestureConfig;
use crate::hunt::HuntAction;

/// Where the gesture happens; decides which directions are eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureContext {
    /// Single task card in hunt mode: right, left and down are eligible.
    HuntCard,
    /// Row in a note/reminder/task list: only leftward motion is eligible.
    SwipeToDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Down,
}

impl SwipeDirection {
    fn slot(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Down => 2,
        }
    }
}

/// Discrete action produced by a resolved gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureAction {
    Hunt(HuntAction),
    /// Must route through a delete confirmation before anything is destroyed.
    DeleteRequested,
}

/// What the item should do visually once the gesture ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseAnimation {
    /// Slide off-screen in the direction of travel, then fire the action.
    OffScreen(SwipeDirection),
    /// Spring back to displacement `(0, 0)`.
    SnapBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Resolved {
        action: GestureAction,
        exit: SwipeDirection,
    },
    Cancelled,
}

impl GestureOutcome {
    pub fn action(self) -> Option<GestureAction> {
        match self {
            Self::Resolved { action, .. } => Some(action),
            Self::Cancelled => None,
        }
    }

    pub fn animation(self) -> ReleaseAnimation {
        match self {
            Self::Resolved { exit, .. } => ReleaseAnimation::OffScreen(exit),
            Self::Cancelled => ReleaseAnimation::SnapBack,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Dragging,
    Resolved(GestureAction),
    Cancelled,
}

/// Opacity-style progress `0.0..=1.0` for each swipe indicator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndicatorProgress {
    pub left: f64,
    pub right: f64,
    pub down: f64,
}

/// Live rendering feedback for one drag sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragFeedback {
    pub translate_x: f64,
    pub translate_y: f64,
    pub progress: IndicatorProgress,
    /// Set only on the sample that first crosses the haptic threshold.
    pub haptic: Option<SwipeDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureError {
    /// Drag or release received outside of the `Dragging` phase.
    NotDragging(GesturePhase),
}

impl std::fmt::Display for GestureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotDragging(phase) => write!(f, "gesture is not dragging (phase {phase:?})"),
        }
    }
}

impl std::error::Error for GestureError {}

/// Horizontal when `|dx| > |dy|`, vertical otherwise (ties are vertical).
pub fn dominant_axis(dx: f64, dy: f64) -> Axis {
    if dx.abs() > dy.abs() {
        Axis::Horizontal
    } else {
        Axis::Vertical
    }
}

/// Whether a movement sample should start capturing the drag.
pub fn should_capture(context: GestureContext, config: &GestureConfig, dx: f64, dy: f64) -> bool {
    let horizontal = dx.abs() > dy.abs() && dx.abs() > config.activation_distance;
    match context {
        GestureContext::HuntCard => {
            let vertical = dy.abs() > dx.abs() && dy > config.activation_distance;
            horizontal || vertical
        }
        GestureContext::SwipeToDelete => horizontal,
    }
}

/// Classifies the release displacement.
///
/// A displacement must be strictly beyond the threshold to resolve.
pub fn classify_release(
    context: GestureContext,
    config: &GestureConfig,
    dx: f64,
    dy: f64,
) -> GestureOutcome {
    let axis = dominant_axis(dx, dy);
    match (context, axis) {
        (GestureContext::HuntCard, Axis::Horizontal) => {
            if dx > config.swipe_threshold {
                resolved(GestureAction::Hunt(HuntAction::Complete), SwipeDirection::Right)
            } else if dx < -config.swipe_threshold {
                resolved(GestureAction::Hunt(HuntAction::TakeOut), SwipeDirection::Left)
            } else {
                GestureOutcome::Cancelled
            }
        }
        (GestureContext::HuntCard, Axis::Vertical) => {
            if dy > config.swipe_threshold {
                resolved(GestureAction::Hunt(HuntAction::PutBack), SwipeDirection::Down)
            } else {
                GestureOutcome::Cancelled
            }
        }
        (GestureContext::SwipeToDelete, Axis::Horizontal) if dx < -config.delete_threshold => {
            resolved(GestureAction::DeleteRequested, SwipeDirection::Left)
        }
        (GestureContext::SwipeToDelete, _) => GestureOutcome::Cancelled,
    }
}

fn resolved(action: GestureAction, exit: SwipeDirection) -> GestureOutcome {
    GestureOutcome::Resolved { action, exit }
}

/// Per-gesture state machine with one-shot haptic tracking.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    context: GestureContext,
    config: GestureConfig,
    phase: GesturePhase,
    haptic_fired: [bool; 3],
}

impl GestureTracker {
    pub fn new(context: GestureContext, config: GestureConfig) -> Self {
        Self {
            context,
            config,
            phase: GesturePhase::Idle,
            haptic_fired: [false; 3],
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn context(&self) -> GestureContext {
        self.context
    }

    /// Starts a new gesture, discarding any previous terminal state.
    pub fn begin(&mut self) {
        self.phase = GesturePhase::Dragging;
        self.haptic_fired = [false; 3];
    }

    /// Processes one movement sample relative to the gesture origin.
    pub fn drag(&mut self, dx: f64, dy: f64) -> Result<DragFeedback, GestureError> {
        if self.phase != GesturePhase::Dragging {
            return Err(GestureError::NotDragging(self.phase));
        }

        let (translate_x, translate_y) = self.translation(dx, dy);
        let haptic = self
            .crossed_haptic(translate_x, translate_y)
            .filter(|direction| !self.haptic_fired[direction.slot()]);
        if let Some(direction) = haptic {
            self.haptic_fired[direction.slot()] = true;
        }

        Ok(DragFeedback {
            translate_x,
            translate_y,
            progress: self.progress(translate_x, translate_y),
            haptic,
        })
    }

    /// Ends the gesture and returns its terminal classification.
    pub fn release(&mut self, dx: f64, dy: f64) -> Result<GestureOutcome, GestureError> {
        if self.phase != GesturePhase::Dragging {
            return Err(GestureError::NotDragging(self.phase));
        }
        let outcome = classify_release(self.context, &self.config, dx, dy);
        self.phase = match outcome {
            GestureOutcome::Resolved { action, .. } => GesturePhase::Resolved(action),
            GestureOutcome::Cancelled => GesturePhase::Cancelled,
        };
        Ok(outcome)
    }

    fn translation(&self, dx: f64, dy: f64) -> (f64, f64) {
        match (self.context, dominant_axis(dx, dy)) {
            (GestureContext::HuntCard, Axis::Horizontal) => (dx, 0.0),
            (GestureContext::HuntCard, Axis::Vertical) if dy > 0.0 => (0.0, dy),
            (GestureContext::SwipeToDelete, Axis::Horizontal) if dx < 0.0 => (dx, 0.0),
            _ => (0.0, 0.0),
        }
    }

    fn crossed_haptic(&self, x: f64, y: f64) -> Option<SwipeDirection> {
        let threshold = self.config.haptic_threshold;
        if x > threshold {
            Some(SwipeDirection::Right)
        } else if x < -threshold {
            Some(SwipeDirection::Left)
        } else if y > threshold {
            Some(SwipeDirection::Down)
        } else {
            None
        }
    }

    fn progress(&self, x: f64, y: f64) -> IndicatorProgress {
        let span = match self.context {
            GestureContext::HuntCard => self.config.swipe_threshold,
            GestureContext::SwipeToDelete => self.config.delete_threshold,
        };
        let ratio = |value: f64| (value / span).clamp(0.0, 1.0);
        IndicatorProgress {
            left: ratio(-x),
            right: ratio(x),
            down: ratio(y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{dominant_axis, should_capture, Axis, GestureContext};
    use crate::config::GestureConfig;

    #[test]
    fn ties_resolve_to_vertical_axis() {
        assert_eq!(dominant_axis(5.0, -5.0), Axis::Vertical);
        assert_eq!(dominant_axis(-6.0, 5.0), Axis::Horizontal);
    }

    #[test]
    fn capture_requires_activation_distance() {
        let config = GestureConfig::default();
        assert!(!should_capture(GestureContext::HuntCard, &config, 8.0, 1.0));
        assert!(should_capture(GestureContext::HuntCard, &config, 12.0, 1.0));
        assert!(should_capture(GestureContext::HuntCard, &config, 1.0, 12.0));
        assert!(!should_capture(GestureContext::HuntCard, &config, 1.0, -12.0));
        assert!(!should_capture(GestureContext::SwipeToDelete, &config, 1.0, 40.0));
    }
}
