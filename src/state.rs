//! Abstract charger states
//!
//! `ChargeState` is the verdict produced once per evaluation tick. The first
//! three values double as keys of the raw-status translation table.

use crate::error::{ChargeGuardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical operating verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeState {
    /// No vehicle plugged in
    Idle,

    /// Vehicle plugged in, charger not enabled
    Connected,

    /// Charger reports an active charge
    Charging,

    /// Charging should start or continue
    Start,

    /// Charging should stop
    Stop,

    /// Vehicle finished charging
    Done,

    /// No rule matched the current readings
    Error,
}

impl ChargeState {
    /// Every verdict, in declaration order
    pub const ALL: [ChargeState; 7] = [
        ChargeState::Idle,
        ChargeState::Connected,
        ChargeState::Charging,
        ChargeState::Start,
        ChargeState::Stop,
        ChargeState::Done,
        ChargeState::Error,
    ];

    /// States that must carry raw hardware statuses in the translation table
    pub const TRANSLATED: [ChargeState; 3] = [
        ChargeState::Idle,
        ChargeState::Connected,
        ChargeState::Charging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connected => "connected",
            Self::Charging => "charging",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ChargeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargeState {
    type Err = ChargeGuardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let message = format!("Unknown state: {}", s);
                ChargeGuardError::validation("state", message.as_str())
            })
    }
}
