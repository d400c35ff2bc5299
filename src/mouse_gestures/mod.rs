pub mod action;
pub mod engine;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod modifiers;
pub mod notify;
pub mod session;

pub use action::Action;
pub use engine::{EngineState, GestureEngine, GestureEngineConfig};
pub use geometry::{classify, Direction, ParseDirectionError, Point};
pub use gesture::{Gesture, ParseGestureError};
pub use input::{read_trace, InputEvent};
pub use modifiers::ModifierSet;
pub use notify::{Notifier, SubscriptionId};
pub use session::{RecordedAction, RecordingSession};
