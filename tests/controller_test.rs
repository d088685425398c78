use chargeguard::clock::ManualClock;
use chargeguard::config::ResolverConfig;
use chargeguard::controller::{
    Controller, ReplaySource, TelemetrySource, TickOutcome, VecSource,
};
use chargeguard::resolver::{EvaluationInput, StateResolver};
use chargeguard::state::ChargeState;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Duration;

fn resolver() -> StateResolver {
    StateResolver::from_config(&ResolverConfig::default(), Arc::new(ManualClock::default()))
        .unwrap()
}

#[tokio::test]
async fn tick_publishes_verdicts_and_skips_failures() {
    let mut source = VecSource::new("scripted", vec![EvaluationInput::new("idle").at_hour(9)]);
    source.push_error("modbus timeout");
    source.push(EvaluationInput::new("connected").at_hour(9));

    let mut controller = Controller::new(resolver(), Box::new(source));
    let rx = controller.subscribe();
    assert_eq!(*rx.borrow(), None);

    assert_eq!(controller.tick().await, TickOutcome::Verdict(ChargeState::Idle));
    assert_eq!(*rx.borrow(), Some(ChargeState::Idle));

    assert_eq!(controller.tick().await, TickOutcome::Skipped);
    assert_eq!(*rx.borrow(), Some(ChargeState::Idle));

    assert_eq!(
        controller.tick().await,
        TickOutcome::Verdict(ChargeState::Connected)
    );
    assert_eq!(controller.tick().await, TickOutcome::Exhausted);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.total_ticks, 2);
    assert_eq!(snapshot.skipped_ticks, 1);
    assert_eq!(snapshot.verdict, Some(ChargeState::Connected));
    assert_eq!(snapshot.source, "scripted");
    assert_eq!(snapshot.last_reset, controller.resolver().last_reset());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["last_reset"], "1970-01-01T00:00:00Z");
    assert_eq!(json["verdict"], "connected");
}

#[tokio::test]
async fn run_stops_when_source_is_exhausted() {
    let ticks = vec![
        EvaluationInput::new("charging").enabled(true).at_hour(12),
        EvaluationInput::new("mystery").enabled(true).at_hour(12),
    ];
    let mut controller = Controller::new(resolver(), Box::new(VecSource::new("vec", ticks)));
    let rx = controller.subscribe();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    controller
        .run(Duration::from_millis(1), shutdown_rx)
        .await
        .unwrap();

    assert_eq!(*rx.borrow(), Some(ChargeState::Error));
    assert_eq!(controller.snapshot().total_ticks, 2);
}

#[tokio::test]
async fn run_honours_shutdown_signal() {
    let ticks = (0..10_000).map(|_| EvaluationInput::new("idle").at_hour(1));
    let mut controller = Controller::new(resolver(), Box::new(VecSource::new("long", ticks)));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown_tx.send(true).unwrap();
    });

    controller
        .run(Duration::from_millis(1), shutdown_rx)
        .await
        .unwrap();
    stopper.await.unwrap();

    assert!(controller.snapshot().total_ticks < 10_000);
}

#[tokio::test]
async fn run_rejects_zero_interval() {
    let mut controller = Controller::new(resolver(), Box::new(VecSource::new("vec", Vec::new())));
    let (_tx, rx) = watch::channel(false);
    assert!(controller.run(Duration::ZERO, rx).await.is_err());
}

#[tokio::test]
async fn replay_source_reads_json_lines() {
    let contents = r#"
# recorded on the driveway
{"charger_state": "Connected", "charger_enabled": true, "car_power": 3.1, "energy_this_hour": 0.5, "hour": 14, "predicted_energy": 1.0, "current_peak": 2.0, "threshold_start": 75.0, "threshold_stop": 90.0}
not json
{"charger_state": "idle"}
"#;
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), contents).unwrap();

    let mut source = ReplaySource::open(tmp.path()).await.unwrap();
    assert_eq!(source.remaining(), 3);

    let first = source.next_tick().await.unwrap().unwrap();
    assert_eq!(first.charger_state, "Connected");
    assert_eq!(first.hour, Some(14));
    assert!(first.thresholds.below_start());

    let err = source.next_tick().await.unwrap_err();
    assert!(err.to_string().contains("line 4"));

    let last = source.next_tick().await.unwrap().unwrap();
    assert!(!last.charger_enabled);
    assert_eq!(last.hour, None);
    assert!(source.next_tick().await.unwrap().is_none());
}

#[tokio::test]
async fn replayed_ticks_resolve_in_order() {
    let contents = [
        r#"{"charger_state": "connected", "charger_enabled": false, "hour": 8}"#,
        r#"{"charger_state": "connected", "charger_enabled": true, "car_power": 2.0, "energy_this_hour": 0.2, "hour": 8, "predicted_energy": 0.5, "current_peak": 2.0, "threshold_start": 80.0}"#,
        r#"{"charger_state": "charging", "charger_enabled": true, "energy_this_hour": 1.9, "hour": 8, "predicted_energy": 2.5, "current_peak": 2.0, "threshold_stop": 100.0}"#,
        r#"{"charger_state": "charging", "charger_done": true, "hour": 8}"#,
    ]
    .join("\n");
    let source = ReplaySource::from_contents("inline", &contents);
    let mut controller = Controller::new(resolver(), Box::new(source));

    let mut verdicts = Vec::new();
    while let TickOutcome::Verdict(v) = controller.tick().await {
        verdicts.push(v);
    }
    assert_eq!(
        verdicts,
        vec![
            ChargeState::Connected,
            ChargeState::Start,
            ChargeState::Stop,
            ChargeState::Done
        ]
    );
}
