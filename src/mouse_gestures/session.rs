use crate::mouse_gestures::action::Action;
use crate::mouse_gestures::geometry::Point;
use crate::mouse_gestures::gesture::Gesture;
use crate::mouse_gestures::modifiers::ModifierSet;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Smallest buffer that still holds a start anchor plus the newest sample.
pub const MIN_SAMPLES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedAction {
    pub action: Action,
    pub at: Instant,
    /// Position the action is measured from.
    pub anchor: Point,
}

/// In-progress gesture between trigger-down and trigger-up.
///
/// The sample buffer is never empty: it always holds at least the most
/// recent anchor. It keeps at most `max_samples` points. On overflow older
/// copies of a repeated point are dropped first, since the backward anchor
/// scan always meets the newer copy before them; only then are the oldest
/// samples dropped. The first sample is kept while no movement is the
/// latest action, because it is the start of the pending segment.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    initial_modifiers: ModifierSet,
    started_at: Instant,
    actions: Vec<RecordedAction>,
    samples: Vec<Point>,
    max_samples: usize,
}

impl RecordingSession {
    pub fn new(initial_modifiers: ModifierSet, position: Point, max_samples: usize) -> Self {
        Self {
            initial_modifiers,
            started_at: Instant::now(),
            actions: Vec::new(),
            samples: vec![position],
            max_samples: max_samples.max(MIN_SAMPLES),
        }
    }

    pub fn initial_modifiers(&self) -> ModifierSet {
        self.initial_modifiers
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn actions(&self) -> &[RecordedAction] {
        &self.actions
    }

    pub fn samples(&self) -> &[Point] {
        &self.samples
    }

    pub fn latest_action(&self) -> Option<&RecordedAction> {
        self.actions.last()
    }

    /// Modifiers after the last committed modifier change.
    pub fn current_modifiers(&self) -> ModifierSet {
        self.actions
            .iter()
            .rev()
            .find_map(|entry| match entry.action {
                Action::ModifierChange(set) => Some(set),
                _ => None,
            })
            .unwrap_or(self.initial_modifiers)
    }

    pub fn current_position(&self) -> Point {
        self.samples
            .last()
            .copied()
            .unwrap_or_else(|| self.start_position())
    }

    /// First sample in the buffer: the anchor before any movement since the
    /// last clear.
    pub fn start_position(&self) -> Point {
        self.samples.first().copied().unwrap_or_default()
    }

    /// Anchor of the first committed action, or the first sample.
    pub fn initial_position(&self) -> Point {
        self.actions
            .first()
            .map(|entry| entry.anchor)
            .unwrap_or_else(|| self.start_position())
    }

    pub fn push_action(&mut self, action: Action, anchor: Point) {
        let now = Instant::now();
        // Instant is monotonic; the max keeps the log ordered regardless.
        let at = self.actions.last().map_or(now, |last| last.at.max(now));
        self.actions.push(RecordedAction { action, at, anchor });
    }

    /// Commit an instantaneous action at the current position.
    pub fn push_action_here(&mut self, action: Action) {
        let anchor = self.current_position();
        self.push_action(action, anchor);
    }

    pub fn push_sample(&mut self, point: Point) {
        self.samples.push(point);
        if self.samples.len() > self.max_samples {
            self.compact_samples();
        }
    }

    fn compact_samples(&mut self) {
        let pinned = match self.latest_action() {
            Some(entry) if entry.action.is_movement() => 0,
            _ => 1,
        };

        let mut seen = HashSet::with_capacity(self.samples.len());
        let mut kept: Vec<Point> = self.samples[pinned..]
            .iter()
            .rev()
            .copied()
            .filter(|point| seen.insert(*point))
            .collect();
        kept.reverse();

        let room = self.max_samples - pinned;
        if kept.len() > room {
            kept.drain(..kept.len() - room);
        }

        self.samples.truncate(pinned);
        self.samples.extend(kept);
    }

    /// Drop every buffered sample and restart the buffer at `anchor`, or at
    /// the current position when `anchor` is `None`.
    pub fn clear_samples(&mut self, anchor: Option<Point>) {
        let anchor = anchor.unwrap_or_else(|| self.current_position());
        self.samples.clear();
        self.samples.push(anchor);
    }

    /// Close the session at `position` and build the finished gesture.
    ///
    /// The gesture holds a weak link to `session`; it stays resolvable only
    /// as long as someone keeps the `Arc` alive.
    pub fn finalize(session: &mut Arc<RecordingSession>, position: Point) -> Gesture {
        Arc::make_mut(session).clear_samples(Some(position));
        let actions = session.actions.iter().map(|entry| entry.action).collect();
        Gesture::with_origin(session.initial_modifiers, actions, session)
    }
}
