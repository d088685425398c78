//! Host tick loop around the state resolver
//!
//! The controller pulls one set of readings per interval from a
//! [`TelemetrySource`], resolves it and publishes the verdict on a watch
//! channel. A failing source skips that tick; there are no retries.

use crate::error::{ChargeGuardError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::resolver::{EvaluationInput, StateResolver};
use crate::state::ChargeState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Producer of per-tick readings
#[async_trait]
pub trait TelemetrySource: Send {
    /// Name used in log context
    fn name(&self) -> &str;

    /// Next readings, or `None` once the source is exhausted
    async fn next_tick(&mut self) -> Result<Option<EvaluationInput>>;
}

/// In-memory scripted source
pub struct VecSource {
    name: String,
    ticks: VecDeque<Result<EvaluationInput>>,
}

impl VecSource {
    pub fn new<I: IntoIterator<Item = EvaluationInput>>(name: &str, ticks: I) -> Self {
        Self {
            name: name.to_string(),
            ticks: ticks.into_iter().map(Ok).collect(),
        }
    }

    pub fn push(&mut self, input: EvaluationInput) {
        self.ticks.push_back(Ok(input));
    }

    /// Queue a failed read
    pub fn push_error(&mut self, message: &str) {
        self.ticks
            .push_back(Err(ChargeGuardError::telemetry(message)));
    }
}

#[async_trait]
impl TelemetrySource for VecSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_tick(&mut self) -> Result<Option<EvaluationInput>> {
        self.ticks.pop_front().transpose()
    }
}

/// Replays ticks from a JSON-lines file.
///
/// Each non-empty line not starting with `#` holds one [`EvaluationInput`].
pub struct ReplaySource {
    name: String,
    lines: VecDeque<(usize, String)>,
}

impl ReplaySource {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        Ok(Self::from_contents(&path.display().to_string(), &contents))
    }

    pub fn from_contents(name: &str, contents: &str) -> Self {
        let lines = contents
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim().to_string()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
            .collect();
        Self {
            name: name.to_string(),
            lines,
        }
    }

    /// Ticks not yet replayed
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

#[async_trait]
impl TelemetrySource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_tick(&mut self) -> Result<Option<EvaluationInput>> {
        let Some((line_no, line)) = self.lines.pop_front() else {
            return Ok(None);
        };
        serde_json::from_str(&line).map(Some).map_err(|e| ChargeGuardError::Serialization {
            message: format!("line {}: {}", line_no, e),
        })
    }
}

/// Result of a single controller tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Readings were resolved into a verdict
    Verdict(ChargeState),
    /// The source failed; nothing was evaluated
    Skipped,
    /// The source has no more readings
    Exhausted,
}

/// Point-in-time summary of the tick loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub verdict: Option<ChargeState>,
    pub total_ticks: u64,
    pub skipped_ticks: u64,
    pub last_reset: DateTime<Utc>,
    pub timed_out: bool,
}

/// Drives a [`StateResolver`] from a telemetry source
pub struct Controller {
    resolver: StateResolver,
    source: Box<dyn TelemetrySource>,
    verdict_tx: watch::Sender<Option<ChargeState>>,
    total_ticks: u64,
    skipped_ticks: u64,
    logger: StructuredLogger,
}

impl Controller {
    pub fn new(resolver: StateResolver, source: Box<dyn TelemetrySource>) -> Self {
        let logger = get_logger_with_context(
            LogContext::new("controller").with_instance(source.name()),
        );
        let (verdict_tx, _) = watch::channel(None);
        Self {
            resolver,
            source,
            verdict_tx,
            total_ticks: 0,
            skipped_ticks: 0,
            logger,
        }
    }

    /// Receive every published verdict (latest value only)
    pub fn subscribe(&self) -> watch::Receiver<Option<ChargeState>> {
        self.verdict_tx.subscribe()
    }

    pub fn resolver(&self) -> &StateResolver {
        &self.resolver
    }

    /// Pull one set of readings and resolve it
    pub async fn tick(&mut self) -> TickOutcome {
        let input = match self.source.next_tick().await {
            Ok(Some(input)) => input,
            Ok(None) => return TickOutcome::Exhausted,
            Err(e) => {
                self.skipped_ticks = self.skipped_ticks.saturating_add(1);
                self.logger
                    .warn(&format!("Telemetry read failed, skipping tick: {}", e));
                return TickOutcome::Skipped;
            }
        };

        let verdict = self.resolver.evaluate(&input);
        self.total_ticks = self.total_ticks.saturating_add(1);
        self.verdict_tx.send_replace(Some(verdict));
        TickOutcome::Verdict(verdict)
    }

    /// Tick every `poll_interval` until the source is exhausted or
    /// `shutdown` flips to `true` (or its sender is dropped).
    pub async fn run(
        &mut self,
        poll_interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        if poll_interval.is_zero() {
            return Err(ChargeGuardError::validation(
                "poll_interval_ms",
                "Must be greater than 0",
            ));
        }

        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.logger.info(&format!(
            "Starting tick loop every {} ms",
            poll_interval.as_millis()
        ));

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.tick().await {
                        TickOutcome::Verdict(verdict) => {
                            self.logger.info(&format!("Verdict: {}", verdict));
                        }
                        TickOutcome::Skipped => {}
                        TickOutcome::Exhausted => {
                            self.logger.info("Telemetry source exhausted");
                            break;
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        self.logger.info("Shutdown channel closed");
                        break;
                    }
                }
            }
        }

        let snapshot = self.snapshot();
        match serde_json::to_string(&snapshot) {
            Ok(json) => self.logger.info(&format!("Tick loop stopped: {}", json)),
            Err(e) => self
                .logger
                .warn(&format!("Tick loop stopped, snapshot unavailable: {}", e)),
        }
        Ok(())
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            timestamp: Utc::now(),
            source: self.source.name().to_string(),
            verdict: self.resolver.last_verdict(),
            total_ticks: self.total_ticks,
            skipped_ticks: self.skipped_ticks,
            last_reset: self.resolver.last_reset(),
            timed_out: self.resolver.is_timed_out(),
        }
    }
}
