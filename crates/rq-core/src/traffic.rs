//! Ordinal congestion level attached to every street segment.

use std::fmt;

/// Four-level traffic state.  The discriminant is the ordinal used in the
/// travel-time multiplier `1 + 0.25 × ordinal`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[repr(u8)]
pub enum TrafficState {
    #[default]
    Light    = 0,
    Moderate = 1,
    Heavy    = 2,
    Severe   = 3,
}

impl TrafficState {
    /// All states in ascending order of congestion.
    pub const ALL: [TrafficState; 4] = [
        TrafficState::Light,
        TrafficState::Moderate,
        TrafficState::Heavy,
        TrafficState::Severe,
    ];

    #[inline]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Inverse of [`ordinal`](Self::ordinal).  Returns `None` above 3.
    pub fn from_ordinal(n: u8) -> Option<Self> {
        Self::ALL.get(n as usize).copied()
    }

    /// Factor applied to free-flow travel time (length / speed limit).
    #[inline]
    pub fn time_multiplier(self) -> f64 {
        1.0 + 0.25 * f64::from(self.ordinal())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrafficState::Light    => "LIGHT",
            TrafficState::Moderate => "MODERATE",
            TrafficState::Heavy    => "HEAVY",
            TrafficState::Severe   => "SEVERE",
        }
    }
}

impl fmt::Display for TrafficState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
