//! Charging-state resolution
//!
//! [`StateResolver`] turns one tick of charger telemetry plus policy inputs
//! into a single [`ChargeState`]. Rules are evaluated top to bottom and the
//! first rule that produces an outcome wins:
//!
//! 1. idle status -> `Idle` (reset)
//! 2. connected status, charger disabled -> `Connected` (reset)
//! 3. any non-idle status with the done flag -> `Done`
//! 4. hour in the non-charging hours -> `Stop` (reset)
//! 5. connected status -> `Done` after the idle timeout, `Start` below the
//!    start threshold with energy this hour, else `Stop` (reset)
//! 6. charging status -> `Stop` above the stop threshold with energy this
//!    hour, else `Start` (always resets)
//! 7. anything else -> `Error`
//!
//! A "reset" restarts the hysteresis timer after the rule has matched.

use crate::clock::Clock;
use crate::config::ResolverConfig;
use crate::error::{ChargeGuardError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::state::ChargeState;
use crate::threshold::ThresholdInputs;
use crate::timer::HysteresisTimer;
use crate::translation::StateTranslationTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Hours of day during which charging must not proceed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NonHours(BTreeSet<u8>);

impl NonHours {
    /// Build from a list of hours; every hour must be in 0..=23
    pub fn new<I: IntoIterator<Item = u8>>(hours: I) -> Result<Self> {
        let set: BTreeSet<u8> = hours.into_iter().collect();
        if let Some(hour) = set.iter().find(|h| **h > 23) {
            let message = format!("Hour {} is outside 0-23", hour);
            return Err(ChargeGuardError::validation("non_hours", message.as_str()));
        }
        Ok(Self(set))
    }

    pub fn contains(&self, hour: u8) -> bool {
        self.0.contains(&hour)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

/// Readings for a single evaluation tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationInput {
    /// Raw status string reported by the charger
    pub charger_state: String,

    /// Whether the charger is enabled
    #[serde(default)]
    pub charger_enabled: bool,

    /// Whether the charger reports the car as done
    #[serde(default)]
    pub charger_done: bool,

    /// Instantaneous car power draw
    #[serde(default)]
    pub car_power: f64,

    /// Energy consumed so far this hour
    #[serde(default)]
    pub energy_this_hour: f64,

    /// Hour of day override; the clock's hour is used when absent
    #[serde(default)]
    pub hour: Option<u8>,

    /// Start/stop threshold inputs for this tick
    #[serde(flatten)]
    pub thresholds: ThresholdInputs,
}

impl EvaluationInput {
    pub fn new<S: Into<String>>(charger_state: S) -> Self {
        Self {
            charger_state: charger_state.into(),
            ..Default::default()
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.charger_enabled = enabled;
        self
    }

    pub fn done(mut self, done: bool) -> Self {
        self.charger_done = done;
        self
    }

    pub fn car_power(mut self, power: f64) -> Self {
        self.car_power = power;
        self
    }

    pub fn energy_this_hour(mut self, energy: f64) -> Self {
        self.energy_this_hour = energy;
        self
    }

    pub fn at_hour(mut self, hour: u8) -> Self {
        self.hour = Some(hour);
        self
    }

    pub fn thresholds(mut self, thresholds: ThresholdInputs) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// Normalized view of one tick, shared by all rules
struct Tick<'a> {
    status: String,
    hour: u8,
    input: &'a EvaluationInput,
    timed_out: bool,
}

/// Result of a matching rule
#[derive(Debug, Clone, Copy)]
struct Outcome {
    state: ChargeState,
    reset_timer: bool,
}

impl Outcome {
    const fn keep(state: ChargeState) -> Option<Self> {
        Some(Self {
            state,
            reset_timer: false,
        })
    }

    const fn reset(state: ChargeState) -> Option<Self> {
        Some(Self {
            state,
            reset_timer: true,
        })
    }
}

type Rule = fn(&StateTranslationTable, &NonHours, &Tick<'_>) -> Option<Outcome>;

/// Ordered rule list; position is priority
const RULES: [(&str, Rule); 7] = [
    ("idle", rule_idle),
    ("connected_disabled", rule_connected_disabled),
    ("done_flag", rule_done_flag),
    ("non_hour", rule_non_hour),
    ("connected", rule_connected),
    ("charging", rule_charging),
    ("unclassified", rule_unclassified),
];

fn rule_idle(table: &StateTranslationTable, _: &NonHours, tick: &Tick<'_>) -> Option<Outcome> {
    if table.is_idle(&tick.status) {
        return Outcome::reset(ChargeState::Idle);
    }
    None
}

fn rule_connected_disabled(
    table: &StateTranslationTable,
    _: &NonHours,
    tick: &Tick<'_>,
) -> Option<Outcome> {
    if table.is_connected(&tick.status) && !tick.input.charger_enabled {
        return Outcome::reset(ChargeState::Connected);
    }
    None
}

fn rule_done_flag(table: &StateTranslationTable, _: &NonHours, tick: &Tick<'_>) -> Option<Outcome> {
    if !table.is_idle(&tick.status) && tick.input.charger_done {
        return Outcome::keep(ChargeState::Done);
    }
    None
}

fn rule_non_hour(_: &StateTranslationTable, non_hours: &NonHours, tick: &Tick<'_>) -> Option<Outcome> {
    if non_hours.contains(tick.hour) {
        return Outcome::reset(ChargeState::Stop);
    }
    None
}

fn rule_connected(table: &StateTranslationTable, _: &NonHours, tick: &Tick<'_>) -> Option<Outcome> {
    if !table.is_connected(&tick.status) {
        return None;
    }
    let input = tick.input;
    if input.car_power < 1.0 && tick.timed_out {
        Outcome::keep(ChargeState::Done)
    } else if input.thresholds.below_start() && input.energy_this_hour > 0.0 {
        Outcome::keep(ChargeState::Start)
    } else {
        Outcome::reset(ChargeState::Stop)
    }
}

fn rule_charging(table: &StateTranslationTable, _: &NonHours, tick: &Tick<'_>) -> Option<Outcome> {
    if !table.is_charging(&tick.status) {
        return None;
    }
    let input = tick.input;
    if input.thresholds.above_stop() && input.energy_this_hour > 0.0 {
        Outcome::reset(ChargeState::Stop)
    } else {
        Outcome::reset(ChargeState::Start)
    }
}

fn rule_unclassified(_: &StateTranslationTable, _: &NonHours, _: &Tick<'_>) -> Option<Outcome> {
    Outcome::keep(ChargeState::Error)
}

/// Charging-state decision engine
pub struct StateResolver {
    table: StateTranslationTable,
    non_hours: NonHours,
    timer: HysteresisTimer,
    clock: Arc<dyn Clock>,
    last_verdict: Option<ChargeState>,
    logger: StructuredLogger,
}

impl std::fmt::Debug for StateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateResolver")
            .field("table", &self.table)
            .field("non_hours", &self.non_hours)
            .field("timer", &self.timer)
            .field("last_verdict", &self.last_verdict)
            .finish_non_exhaustive()
    }
}

impl StateResolver {
    /// Create a resolver; the hysteresis timer starts at the clock's `now`
    pub fn new(
        table: StateTranslationTable,
        non_hours: NonHours,
        done_timeout_seconds: u64,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let timer = HysteresisTimer::new(done_timeout_seconds, clock.now())?;
        let logger = get_logger_with_context(
            LogContext::new("resolver")
                .with_field("timeout_s", done_timeout_seconds.to_string()),
        );
        logger.debug(&format!(
            "State resolver ready, non-hours: {:?}",
            non_hours.iter().collect::<Vec<_>>()
        ));
        Ok(Self {
            table,
            non_hours,
            timer,
            clock,
            last_verdict: None,
            logger,
        })
    }

    /// Create a resolver from YAML-level policy
    pub fn from_config(config: &ResolverConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let table = StateTranslationTable::new(
            config.translation.idle.iter(),
            config.translation.connected.iter(),
            config.translation.charging.iter(),
        )?;
        let non_hours = NonHours::new(config.non_hours.iter().copied())?;
        Self::new(table, non_hours, config.done_timeout_seconds, clock)
    }

    /// Resolve one tick into a verdict.
    ///
    /// Never fails: readings that match no rule resolve to
    /// [`ChargeState::Error`]. May restart the hysteresis timer.
    pub fn evaluate(&mut self, input: &EvaluationInput) -> ChargeState {
        let now = self.clock.now();
        let tick = Tick {
            status: input.charger_state.to_lowercase(),
            hour: input.hour.unwrap_or_else(|| self.clock.current_hour()),
            input,
            timed_out: self.timer.is_timed_out(now),
        };

        let (rule, outcome) = RULES
            .iter()
            .find_map(|(name, rule)| rule(&self.table, &self.non_hours, &tick).map(|o| (*name, o)))
            .unwrap_or((
                "unclassified",
                Outcome {
                    state: ChargeState::Error,
                    reset_timer: false,
                },
            ));

        if outcome.reset_timer {
            self.timer.reset_activity(now);
        }

        self.logger.trace(&format!(
            "status='{}' hour={} rule={} -> {}",
            tick.status, tick.hour, rule, outcome.state
        ));
        if self.last_verdict != Some(outcome.state) {
            self.logger.debug(&format!(
                "Verdict changed {} -> {} (rule {})",
                self.last_verdict
                    .map_or("none", |s| s.as_str()),
                outcome.state,
                rule
            ));
            self.last_verdict = Some(outcome.state);
        }

        outcome.state
    }

    /// Restart the hysteresis timer at the clock's `now`
    pub fn reset_activity(&mut self) {
        self.timer.reset_activity(self.clock.now());
    }

    pub fn is_timed_out(&self) -> bool {
        self.timer.is_timed_out(self.clock.now())
    }

    pub fn done_timeout_seconds(&self) -> u64 {
        self.timer.timeout_seconds()
    }

    /// Instant of the last activity reset
    pub fn last_reset(&self) -> DateTime<Utc> {
        self.timer.last_reset()
    }

    /// Most recent verdict, if any tick has been evaluated
    pub fn last_verdict(&self) -> Option<ChargeState> {
        self.last_verdict
    }

    pub fn table(&self) -> &StateTranslationTable {
        &self.table
    }

    pub fn non_hours(&self) -> &NonHours {
        &self.non_hours
    }
}
