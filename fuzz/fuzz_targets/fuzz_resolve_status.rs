#![no_main]
use chargeguard::clock::ManualClock;
use chargeguard::config::ResolverConfig;
use chargeguard::resolver::{EvaluationInput, StateResolver};
use chargeguard::threshold::ThresholdInputs;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    // First byte drives the flags and hour, the rest is the raw status
    let Some((&head, rest)) = data.split_first() else {
        return;
    };
    let status = String::from_utf8_lossy(rest);

    let clock = ManualClock::default();
    let Ok(mut resolver) =
        StateResolver::from_config(&ResolverConfig::default(), Arc::new(clock.clone()))
    else {
        return;
    };

    let input = EvaluationInput::new(status.into_owned())
        .enabled(head & 0x01 != 0)
        .done(head & 0x02 != 0)
        .car_power(f64::from(head >> 4))
        .energy_this_hour(f64::from(head & 0x0c))
        .at_hour(head % 26)
        .thresholds(ThresholdInputs {
            predicted_energy: f64::from(head),
            current_peak: f64::from(rest.len() as u32),
            threshold_start: 80.0,
            threshold_stop: 90.0,
        });

    // Evaluation is total: any input resolves without panicking
    let _ = resolver.evaluate(&input);
    clock.advance_secs(i64::from(head) * 10);
    let _ = resolver.evaluate(&input);
});
