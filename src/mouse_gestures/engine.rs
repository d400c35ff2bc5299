use crate::mouse_gestures::action::Action;
use crate::mouse_gestures::geometry::{classify, Direction, Point};
use crate::mouse_gestures::gesture::Gesture;
use crate::mouse_gestures::modifiers::ModifierSet;
use crate::mouse_gestures::notify::Notifier;
use crate::mouse_gestures::session::RecordingSession;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_WIGGLE_RADIUS_PX: u32 = 25;
pub const DEFAULT_MAX_SAMPLES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureEngineConfig {
    /// Squared distance a movement must cover before it counts as a
    /// direction, and the minimum separation of a re-anchoring sample.
    pub wiggle_radius_sq: i64,
    /// Upper bound on buffered samples per movement segment.
    pub max_samples: usize,
}

impl Default for GestureEngineConfig {
    fn default() -> Self {
        Self::with_wiggle_radius(DEFAULT_WIGGLE_RADIUS_PX)
    }
}

impl GestureEngineConfig {
    pub fn with_wiggle_radius(radius_px: u32) -> Self {
        let radius = i64::from(radius_px);
        Self {
            wiggle_radius_sq: radius * radius,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Recording,
}

/// Turns primitive input events into [`Gesture`]s.
///
/// Entry points take `&mut self` and are meant to be driven by a single
/// producer (the input hook). Each returns whether the event was consumed by
/// gesture recognition, which the hook uses to decide whether to swallow the
/// underlying OS event. Notifications are delivered through the
/// [`Notifier`] on other threads and never block the caller.
pub struct GestureEngine {
    config: GestureEngineConfig,
    session: Option<Arc<RecordingSession>>,
    notifier: Notifier,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new(GestureEngineConfig::default())
    }
}

impl GestureEngine {
    pub fn new(config: GestureEngineConfig) -> Self {
        Self::with_notifier(config, Notifier::new())
    }

    pub fn with_notifier(config: GestureEngineConfig, notifier: Notifier) -> Self {
        Self {
            config,
            session: None,
            notifier,
        }
    }

    pub fn config(&self) -> &GestureEngineConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn state(&self) -> EngineState {
        if self.session.is_some() {
            EngineState::Recording
        } else {
            EngineState::Idle
        }
    }

    /// Snapshot of the active session. Later engine mutations do not show up
    /// in a snapshot that is still held.
    pub fn session(&self) -> Option<Arc<RecordingSession>> {
        self.session.clone()
    }

    /// Direction from `from` to `to` under this engine's wiggle radius.
    pub fn classify(&self, from: Point, to: Point) -> Option<Direction> {
        classify(from, to, self.config.wiggle_radius_sq)
    }

    pub fn trigger_down(&mut self, position: Point, modifiers: ModifierSet) -> bool {
        if self.session.is_some() {
            tracing::debug!(%position, "trigger down while already recording; ignored");
            return false;
        }

        let session = Arc::new(RecordingSession::new(
            modifiers,
            position,
            self.config.max_samples,
        ));
        tracing::debug!(%position, %modifiers, "gesture started");
        self.notifier.start(Arc::clone(&session));
        self.session = Some(session);
        true
    }

    pub fn move_to(&mut self, position: Point) -> bool {
        let wiggle_radius_sq = self.config.wiggle_radius_sq;
        let Some(active) = self.session.as_mut() else {
            return false;
        };
        if active.current_position() == position {
            return false;
        }

        let session = Arc::make_mut(active);
        session.push_sample(position);

        match session.latest_action().map(|entry| entry.action) {
            Some(Action::Movement(current)) => {
                let samples = session.samples();
                let earlier = &samples[..samples.len() - 1];
                match find_anchor(earlier, position, wiggle_radius_sq) {
                    Some(anchor) => {
                        if let Some(dir) = classify(anchor, position, wiggle_radius_sq) {
                            if dir != current {
                                tracing::trace!(%anchor, %position, from = %current, to = %dir, "direction change");
                                session.push_action(Action::Movement(dir), anchor);
                            }
                        }
                    }
                    None => {
                        tracing::trace!(%position, "no re-anchor sample yet; buffering");
                    }
                }
            }
            _ => {
                let start = session.start_position();
                if let Some(dir) = classify(start, position, wiggle_radius_sq) {
                    tracing::trace!(%start, %position, %dir, "movement segment");
                    session.push_action(Action::Movement(dir), start);
                }
            }
        }

        self.publish_update();
        true
    }

    /// One notch of scrolling. Repeated notches are repeated calls.
    pub fn wheel_notch(&mut self, direction: Direction) -> bool {
        let Some(active) = self.session.as_mut() else {
            return false;
        };

        let session = Arc::make_mut(active);
        session.clear_samples(None);
        session.push_action_here(Action::Wheel(direction));
        tracing::trace!(%direction, "wheel notch");

        self.publish_update();
        true
    }

    pub fn modifiers_changed(&mut self, modifiers: ModifierSet) -> bool {
        let Some(active) = self.session.as_mut() else {
            return false;
        };
        if active.current_modifiers() == modifiers {
            return false;
        }

        let session = Arc::make_mut(active);
        session.clear_samples(None);
        session.push_action_here(Action::ModifierChange(modifiers));
        tracing::trace!(%modifiers, "modifiers changed");

        self.publish_update();
        true
    }

    pub fn modifiers_pressed(&mut self, delta: ModifierSet) -> bool {
        match &self.session {
            Some(session) => {
                let next = session.current_modifiers() | delta;
                self.modifiers_changed(next)
            }
            None => false,
        }
    }

    pub fn modifiers_released(&mut self, delta: ModifierSet) -> bool {
        match &self.session {
            Some(session) => {
                let next = session.current_modifiers() - delta;
                self.modifiers_changed(next)
            }
            None => false,
        }
    }

    /// Finish the active session at `position`.
    ///
    /// A press and release with no actions and no movement is a plain click
    /// and is reported through the click-through notification instead,
    /// unless the auxiliary button was held at trigger-down. Otherwise
    /// `cleanup` runs on a worker thread and the completion is published
    /// once it returns.
    pub fn trigger_up<F>(&mut self, position: Point, cleanup: F) -> bool
    where
        F: FnOnce(&Gesture) + Send + 'static,
    {
        let Some(mut session) = self.session.take() else {
            return false;
        };

        if is_click_through(&session) {
            tracing::debug!(%position, "click through");
            self.notifier.click_through(position);
            return true;
        }

        let gesture = RecordingSession::finalize(&mut session, position);
        tracing::debug!(%gesture, %position, "gesture complete");
        self.notifier.complete(gesture, session, Box::new(cleanup));
        true
    }

    /// Abandon any active session. Safe to call at any time.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("gesture abandoned");
            self.notifier.update(None);
        }
    }

    fn publish_update(&self) {
        self.notifier.update(self.session.clone());
    }
}

fn is_click_through(session: &RecordingSession) -> bool {
    session.actions().is_empty()
        && session.samples().len() == 1
        && !session.initial_modifiers().aux
}

/// Most recent sample at least the wiggle radius away from `position`.
fn find_anchor(samples: &[Point], position: Point, wiggle_radius_sq: i64) -> Option<Point> {
    samples
        .iter()
        .rev()
        .find(|sample| sample.distance_sq(position) >= wiggle_radius_sq)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_scan_prefers_most_recent() {
        let samples = [
            Point::new(0, 0),
            Point::new(50, 0),
            Point::new(60, 0),
            Point::new(70, 0),
        ];
        assert_eq!(
            find_anchor(&samples, Point::new(80, 0), 625),
            Some(Point::new(50, 0))
        );
        assert_eq!(find_anchor(&samples[2..], Point::new(80, 0), 625), None);
    }

    #[test]
    fn click_through_requires_no_aux() {
        let plain = RecordingSession::new(ModifierSet::CONTROL, Point::new(0, 0), 8);
        assert!(is_click_through(&plain));

        let aux = RecordingSession::new(ModifierSet::AUX, Point::new(0, 0), 8);
        assert!(!is_click_through(&aux));

        let mut moved = RecordingSession::new(ModifierSet::NONE, Point::new(0, 0), 8);
        moved.push_sample(Point::new(1, 0));
        assert!(!is_click_through(&moved));
    }

    #[test]
    fn config_squares_radius() {
        let config = GestureEngineConfig::with_wiggle_radius(25);
        assert_eq!(config.wiggle_radius_sq, 625);
        assert_eq!(GestureEngineConfig::default(), config);
    }
}
