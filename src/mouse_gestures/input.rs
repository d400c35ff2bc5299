use crate::mouse_gestures::engine::GestureEngine;
use crate::mouse_gestures::geometry::{Direction, Point};
use crate::mouse_gestures::modifiers::ModifierSet;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// A primitive input event as delivered by a hook adapter.
///
/// Serialized as internally tagged JSON, one event per line in trace files:
///
/// ```json
/// {"event":"trigger_down","position":{"x":0,"y":0},"modifiers":"SHIFT"}
/// {"event":"move","position":{"x":40,"y":0}}
/// {"event":"trigger_up","position":{"x":40,"y":0}}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    TriggerDown {
        position: Point,
        #[serde(default)]
        modifiers: ModifierSet,
    },
    TriggerUp {
        position: Point,
    },
    Move {
        position: Point,
    },
    Wheel {
        direction: Direction,
    },
    KeysPressed {
        modifiers: ModifierSet,
    },
    KeysReleased {
        modifiers: ModifierSet,
    },
    Reset,
}

impl GestureEngine {
    /// Route one event to the matching entry point. `TriggerUp` finishes the
    /// gesture without a cleanup step; use [`GestureEngine::trigger_up`]
    /// directly when one is needed.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::TriggerDown {
                position,
                modifiers,
            } => self.trigger_down(position, modifiers),
            InputEvent::TriggerUp { position } => self.trigger_up(position, |_| {}),
            InputEvent::Move { position } => self.move_to(position),
            InputEvent::Wheel { direction } => self.wheel_notch(direction),
            InputEvent::KeysPressed { modifiers } => self.modifiers_pressed(modifiers),
            InputEvent::KeysReleased { modifiers } => self.modifiers_released(modifiers),
            InputEvent::Reset => {
                self.reset();
                false
            }
        }
    }
}

/// Read a JSON-lines event trace. Blank lines and lines starting with `#`
/// are skipped.
pub fn read_trace<R: BufRead>(reader: R) -> anyhow::Result<Vec<InputEvent>> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(trimmed)
            .map_err(|err| anyhow::anyhow!("trace line {}: {err}", idx + 1))?;
        events.push(event);
    }
    Ok(events)
}
