use crate::mouse_gestures::geometry::Direction;
use crate::mouse_gestures::modifiers::ModifierSet;
use std::fmt;

const WHEEL_PREFIX: &str = "WHEEL ";

/// One committed step of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Movement(Direction),
    Wheel(Direction),
    ModifierChange(ModifierSet),
}

impl Action {
    pub fn is_movement(&self) -> bool {
        matches!(self, Action::Movement(_))
    }

    /// Canonical token, e.g. `RIGHT`, `WHEEL DOWN` or `CONTROL|SHIFT`.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode a single action token.
    ///
    /// Anything that is neither a direction nor a wheel token falls back to a
    /// leniently parsed `ModifierChange`, so `"garbage"` decodes to
    /// `ModifierChange(NONE)`. Only an empty token is rejected.
    pub fn decode(token: &str) -> Option<Action> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        if let Ok(dir) = token.parse::<Direction>() {
            return Some(Action::Movement(dir));
        }
        let upper = token.to_ascii_uppercase();
        if let Some(rest) = upper.strip_prefix(WHEEL_PREFIX) {
            if let Ok(dir) = rest.parse::<Direction>() {
                return Some(Action::Wheel(dir));
            }
        }
        Some(Action::ModifierChange(ModifierSet::parse_lenient(token)))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Movement(dir) => write!(f, "{dir}"),
            Action::Wheel(dir) => write!(f, "{WHEEL_PREFIX}{dir}"),
            Action::ModifierChange(set) => write!(f, "{set}"),
        }
    }
}
