use crate::mouse_gestures::action::Action;
use crate::mouse_gestures::modifiers::ModifierSet;
use crate::mouse_gestures::session::RecordingSession;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::{Arc, Weak};

pub const TOKEN_SEPARATOR: char = ';';

/// A finished gesture: the modifiers held at trigger-down followed by the
/// committed actions in order.
///
/// Equality and hashing only look at the modifiers and actions. The link
/// back to the producing [`RecordingSession`] is weak and is only meant for
/// position lookups while the completion is being delivered.
#[derive(Clone, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Gesture {
    initial_modifiers: ModifierSet,
    actions: Vec<Action>,
    #[serde(skip)]
    origin: Weak<RecordingSession>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGestureError {
    pub input: String,
}

impl fmt::Display for ParseGestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a recognised gesture: {:?}", self.input)
    }
}

impl std::error::Error for ParseGestureError {}

impl Gesture {
    pub fn new(initial_modifiers: ModifierSet, actions: Vec<Action>) -> Self {
        Self {
            initial_modifiers,
            actions,
            origin: Weak::new(),
        }
    }

    pub(crate) fn with_origin(
        initial_modifiers: ModifierSet,
        actions: Vec<Action>,
        origin: &Arc<RecordingSession>,
    ) -> Self {
        Self {
            initial_modifiers,
            actions,
            origin: Arc::downgrade(origin),
        }
    }

    pub fn initial_modifiers(&self) -> ModifierSet {
        self.initial_modifiers
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The session this gesture was recorded from, while it is still alive.
    pub fn session(&self) -> Option<Arc<RecordingSession>> {
        self.origin.upgrade()
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Inverse of [`Gesture::encode`]. Blank input and empty action segments
    /// yield `None`; unknown action tokens follow [`Action::decode`].
    pub fn decode(input: &str) -> Option<Gesture> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        let mut parts = input.split(TOKEN_SEPARATOR);
        let modifiers = ModifierSet::parse_lenient(parts.next()?);
        let actions = parts.map(Action::decode).collect::<Option<Vec<_>>>()?;
        Some(Gesture::new(modifiers, actions))
    }
}

impl PartialEq for Gesture {
    fn eq(&self, other: &Self) -> bool {
        self.initial_modifiers == other.initial_modifiers && self.actions == other.actions
    }
}

impl Eq for Gesture {}

impl Hash for Gesture {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.initial_modifiers.hash(state);
        self.actions.hash(state);
    }
}

impl fmt::Debug for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gesture")
            .field("initial_modifiers", &self.initial_modifiers)
            .field("actions", &self.actions)
            .field("attached", &(self.origin.strong_count() > 0))
            .finish()
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.initial_modifiers)?;
        for action in &self.actions {
            write!(f, "{TOKEN_SEPARATOR}{action}")?;
        }
        Ok(())
    }
}

impl FromStr for Gesture {
    type Err = ParseGestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gesture::decode(s).ok_or_else(|| ParseGestureError {
            input: s.to_string(),
        })
    }
}

impl TryFrom<String> for Gesture {
    type Error = ParseGestureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Gesture> for String {
    fn from(value: Gesture) -> Self {
        value.to_string()
    }
}
