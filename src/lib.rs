//! # Chargeguard - charging-state decision engine
//!
//! Turns raw charger telemetry plus policy inputs (energy thresholds,
//! non-charging hours) into one canonical verdict per evaluation tick.
//! Downstream logic uses the verdict to start or stop the physical charger.
//!
//! ## Architecture
//!
//! - `state`: the seven-valued `ChargeState` verdict
//! - `translation`: raw hardware status to abstract state lookup
//! - `clock`: injected time sources (wall clock or manual)
//! - `timer`: hysteresis timer guarding the "done" verdict
//! - `threshold`: start/stop energy threshold comparisons
//! - `resolver`: the ordered rule set producing a verdict per tick
//! - `controller`: async tick loop feeding the resolver from a telemetry source
//! - `config`: YAML configuration and validation
//! - `logging`: structured logging and tracing
//!
//! ## Example
//!
//! ```
//! use chargeguard::clock::ManualClock;
//! use chargeguard::config::ResolverConfig;
//! use chargeguard::resolver::{EvaluationInput, StateResolver};
//! use chargeguard::ChargeState;
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::default());
//! let mut resolver = StateResolver::from_config(&ResolverConfig::default(), clock).unwrap();
//! let verdict = resolver.evaluate(&EvaluationInput::new("Idle").at_hour(10));
//! assert_eq!(verdict, ChargeState::Idle);
//! ```

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod state;
pub mod threshold;
pub mod timer;
pub mod translation;

// Re-export commonly used types
pub use config::Config;
pub use error::{ChargeGuardError, Result};
pub use resolver::{EvaluationInput, NonHours, StateResolver};
pub use state::ChargeState;
