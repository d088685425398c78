//! Raw hardware status translation
//!
//! Maps the abstract states `Idle`, `Connected` and `Charging` to the sets of
//! raw status strings a charger reports for them. The table is validated once
//! when it is built and is immutable afterwards.

use crate::error::{ChargeGuardError, Result};
use crate::state::ChargeState;
use std::collections::{HashMap, HashSet};

/// Validated raw-status lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTranslationTable {
    idle: HashSet<String>,
    connected: HashSet<String>,
    charging: HashSet<String>,
}

impl StateTranslationTable {
    /// Build a table from three explicit lists.
    ///
    /// Entries are lowercased. Fails with a configuration error when any of
    /// the three lists is empty.
    pub fn new<I, S>(idle: I, connected: I, charging: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            idle: normalized_set(ChargeState::Idle, idle)?,
            connected: normalized_set(ChargeState::Connected, connected)?,
            charging: normalized_set(ChargeState::Charging, charging)?,
        })
    }

    /// Build a table from a state-keyed map.
    ///
    /// Keys other than the three translated states are ignored; a missing
    /// key counts as an empty set.
    pub fn from_map(map: &HashMap<ChargeState, Vec<String>>) -> Result<Self> {
        let [idle, connected, charging] = ChargeState::TRANSLATED
            .map(|state| map.get(&state).cloned().unwrap_or_default());
        Self::new(idle, connected, charging)
    }

    /// Raw statuses configured for a translated state
    pub fn statuses(&self, state: ChargeState) -> Option<&HashSet<String>> {
        match state {
            ChargeState::Idle => Some(&self.idle),
            ChargeState::Connected => Some(&self.connected),
            ChargeState::Charging => Some(&self.charging),
            _ => None,
        }
    }

    /// `status` must already be lowercase
    pub fn is_idle(&self, status: &str) -> bool {
        self.idle.contains(status)
    }

    /// `status` must already be lowercase
    pub fn is_connected(&self, status: &str) -> bool {
        self.connected.contains(status)
    }

    /// `status` must already be lowercase
    pub fn is_charging(&self, status: &str) -> bool {
        self.charging.contains(status)
    }
}

fn normalized_set<I, S>(state: ChargeState, raw: I) -> Result<HashSet<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let set: HashSet<String> = raw
        .into_iter()
        .map(|s| s.as_ref().to_lowercase())
        .collect();
    if set.is_empty() {
        return Err(ChargeGuardError::config(format!(
            "No raw charger statuses configured for state '{}'",
            state
        )));
    }
    Ok(set)
}
