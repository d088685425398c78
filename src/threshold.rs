//! Energy threshold comparisons
//!
//! Both comparisons scale energy and peak to watt-hours before comparing. The
//! factor cancels out, so the result only depends on the ratio between the
//! predicted energy and the current peak.

use serde::{Deserialize, Serialize};

/// True when the predicted energy stays below `threshold_start` percent of the peak
pub fn below_start_threshold(predicted_energy: f64, current_peak: f64, threshold_start: f64) -> bool {
    (predicted_energy * 1000.0) < ((current_peak * 1000.0) * (threshold_start / 100.0))
}

/// True when the predicted energy exceeds `threshold_stop` percent of the peak
pub fn above_stop_threshold(predicted_energy: f64, current_peak: f64, threshold_stop: f64) -> bool {
    (predicted_energy * 1000.0) > ((current_peak * 1000.0) * (threshold_stop / 100.0))
}

/// Per-tick policy figures supplied by the price/threshold collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdInputs {
    /// Predicted energy use for the current hour (kWh)
    pub predicted_energy: f64,

    /// Current peak the household should stay below (kW)
    pub current_peak: f64,

    /// Start threshold in percent of the peak
    pub threshold_start: f64,

    /// Stop threshold in percent of the peak
    pub threshold_stop: f64,
}

impl ThresholdInputs {
    pub fn below_start(&self) -> bool {
        below_start_threshold(self.predicted_energy, self.current_peak, self.threshold_start)
    }

    pub fn above_stop(&self) -> bool {
        above_stop_threshold(self.predicted_energy, self.current_peak, self.threshold_stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_threshold_is_strict() {
        // 75% of a 2.0 peak is 1.5
        assert!(below_start_threshold(1.25, 2.0, 75.0));
        assert!(!below_start_threshold(1.5, 2.0, 75.0));
        assert!(!below_start_threshold(1.75, 2.0, 75.0));
    }

    #[test]
    fn stop_threshold_is_strict() {
        assert!(above_stop_threshold(1.75, 2.0, 75.0));
        assert!(!above_stop_threshold(1.5, 2.0, 75.0));
        assert!(!above_stop_threshold(1.25, 2.0, 75.0));
    }

    #[test]
    fn inputs_delegate_to_free_functions() {
        let inputs = ThresholdInputs {
            predicted_energy: 1.0,
            current_peak: 2.0,
            threshold_start: 70.0,
            threshold_stop: 40.0,
        };
        assert!(inputs.below_start());
        assert!(inputs.above_stop());
        assert!(!ThresholdInputs::default().below_start());
        assert!(!ThresholdInputs::default().above_stop());
    }
}
