use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, Sub};
use std::str::FromStr;

pub const NONE_TOKEN: &str = "NONE";

/// Modifiers held while a gesture is being recorded.
///
/// The canonical text form lists the held modifiers sorted and joined with
/// `|` (for example `ALT|SHIFT`), or `NONE` when nothing is held. Parsing is
/// lenient: tokens are matched as case-insensitive substrings and anything
/// unrecognised is ignored, so strings written by newer builds still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ModifierSet {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    /// Secondary button held together with the trigger.
    pub aux: bool,
}

impl ModifierSet {
    pub const NONE: ModifierSet = ModifierSet {
        shift: false,
        control: false,
        alt: false,
        aux: false,
    };
    pub const SHIFT: ModifierSet = ModifierSet {
        shift: true,
        ..ModifierSet::NONE
    };
    pub const CONTROL: ModifierSet = ModifierSet {
        control: true,
        ..ModifierSet::NONE
    };
    pub const ALT: ModifierSet = ModifierSet {
        alt: true,
        ..ModifierSet::NONE
    };
    pub const AUX: ModifierSet = ModifierSet {
        aux: true,
        ..ModifierSet::NONE
    };

    pub fn is_empty(self) -> bool {
        self == ModifierSet::NONE
    }

    /// True when every modifier in `other` is also held in `self`.
    pub fn contains(self, other: ModifierSet) -> bool {
        self.union(other) == self
    }

    pub fn union(self, other: ModifierSet) -> ModifierSet {
        ModifierSet {
            shift: self.shift || other.shift,
            control: self.control || other.control,
            alt: self.alt || other.alt,
            aux: self.aux || other.aux,
        }
    }

    pub fn difference(self, other: ModifierSet) -> ModifierSet {
        ModifierSet {
            shift: self.shift && !other.shift,
            control: self.control && !other.control,
            alt: self.alt && !other.alt,
            aux: self.aux && !other.aux,
        }
    }

    /// Held modifier tokens in canonical (alphabetical) order.
    pub fn tokens(self) -> Vec<&'static str> {
        // Listed alphabetically so the join is already sorted.
        [
            (self.alt, "ALT"),
            (self.aux, "AUX"),
            (self.control, "CONTROL"),
            (self.shift, "SHIFT"),
        ]
        .into_iter()
        .filter_map(|(held, token)| held.then_some(token))
        .collect()
    }

    /// Lenient parse used both by `FromStr` and the gesture decoder.
    pub fn parse_lenient(s: &str) -> ModifierSet {
        let upper = s.to_ascii_uppercase();
        ModifierSet {
            shift: upper.contains("SHIFT"),
            control: upper.contains("CONTROL") || upper.contains("CTRL"),
            alt: upper.contains("ALT"),
            aux: upper.contains("AUX"),
        }
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(NONE_TOKEN);
        }
        f.write_str(&self.tokens().join("|"))
    }
}

impl FromStr for ModifierSet {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ModifierSet::parse_lenient(s))
    }
}

impl From<String> for ModifierSet {
    fn from(value: String) -> Self {
        ModifierSet::parse_lenient(&value)
    }
}

impl From<ModifierSet> for String {
    fn from(value: ModifierSet) -> Self {
        value.to_string()
    }
}

impl BitOr for ModifierSet {
    type Output = ModifierSet;

    fn bitor(self, rhs: ModifierSet) -> ModifierSet {
        self.union(rhs)
    }
}

impl Sub for ModifierSet {
    type Output = ModifierSet;

    fn sub(self, rhs: ModifierSet) -> ModifierSet {
        self.difference(rhs)
    }
}
