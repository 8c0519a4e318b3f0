//! Integration tests for the command → SimService → event pipeline.
//!
//! These drive the service exactly as the headless binary does, through
//! text commands and fixed steps, and assert on the emitted events.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use twinspool::app::commands::SimCommand;
use twinspool::app::events::SimEvent;
use twinspool::app::service::SimService;
use twinspool::noise::Midpoint;
use twinspool::{Channel as SensorChannel, EngineState, Quantity, Side, SimConfig};

use crate::mock_sink::RecordingSink;

fn make_service() -> (SimService, RecordingSink) {
    let mut service = SimService::with_noise(SimConfig::default(), Midpoint);
    let mut sink = RecordingSink::new();
    service.start(&mut sink);
    (service, sink)
}

fn command(service: &mut SimService, line: &str, sink: &mut RecordingSink) {
    let cmd = SimCommand::parse(line).expect("test command must parse");
    service.handle_command(cmd, sink);
}

fn run_for(service: &mut SimService, secs: f64, sink: &mut RecordingSink) {
    let steps = (secs / service.step_secs()).round() as usize;
    for _ in 0..steps {
        service.step(sink);
    }
}

// ── Nominal session ───────────────────────────────────────────

#[test]
fn full_session_walks_the_lifecycle() {
    let (mut s, mut sink) = make_service();
    assert!(matches!(sink.events[0], SimEvent::Started(EngineState::Off)));

    command(&mut s, "start", &mut sink);
    run_for(&mut s, 8.0, &mut sink);
    assert_eq!(s.engine().state(), EngineState::Stable);

    command(&mut s, "thrust up", &mut sink);
    run_for(&mut s, 1.0, &mut sink);
    command(&mut s, "stop", &mut sink);
    run_for(&mut s, 9.0, &mut sink);

    assert_eq!(
        sink.state_changes(),
        [
            (EngineState::Off, EngineState::Starting),
            (EngineState::Starting, EngineState::Stable),
            (EngineState::Stable, EngineState::Stopping),
            (EngineState::Stopping, EngineState::Off),
        ]
    );
    assert!(sink.alert_messages().is_empty(), "{:?}", sink.alert_messages());
    assert!(sink.shutdown_reasons().is_empty());
}

#[test]
fn commands_in_wrong_state_are_reported_and_ignored() {
    let (mut s, mut sink) = make_service();
    command(&mut s, "thrust up", &mut sink);
    command(&mut s, "stop", &mut sink);
    assert_eq!(sink.ignored(), 2);
    assert_eq!(s.engine().state(), EngineState::Off);

    command(&mut s, "start", &mut sink);
    command(&mut s, "start", &mut sink);
    assert_eq!(sink.ignored(), 3);
    assert_eq!(sink.state_changes().len(), 1);
}

// ── Fault scenarios ───────────────────────────────────────────

#[test]
fn dual_n1_failure_commands_a_shutdown() {
    let (mut s, mut sink) = make_service();
    command(&mut s, "start", &mut sink);
    run_for(&mut s, 1.0, &mut sink);

    for id in ["N1_L1", "N1_L2", "N1_R1", "N1_R2"] {
        command(&mut s, &format!("set {id} fail"), &mut sink);
    }
    s.step(&mut sink);

    assert_eq!(s.engine().state(), EngineState::Stopping);
    assert_eq!(
        sink.shutdown_reasons(),
        ["DUAL N1 SYSTEM FAILURE - SHUTDOWN"]
    );
    let alerts = sink.alert_messages();
    assert!(alerts.contains(&"N1 SENSOR 1 LEFT ANOMALY"));
    assert!(alerts.contains(&"N1 SENSOR 2 RIGHT ANOMALY"));
    assert!(alerts.contains(&"N1 SYSTEM FAULT"));
    assert_eq!(
        s.annunciator().master().map(|a| a.message),
        Some("DUAL N1 SYSTEM FAILURE - SHUTDOWN")
    );
    assert!(sink
        .state_changes()
        .contains(&(EngineState::Starting, EngineState::Stopping)));
}

#[test]
fn overspeed_red_stops_stable_engines() {
    let (mut s, mut sink) = make_service();
    command(&mut s, "start", &mut sink);
    run_for(&mut s, 8.0, &mut sink);
    command(&mut s, "set N1_R1 overspeed red", &mut sink);
    command(&mut s, "set N1_R2 overspeed red", &mut sink);
    s.step(&mut sink);

    assert_eq!(sink.shutdown_reasons(), ["N1 RIGHT OVERSPEED - SHUTDOWN"]);
    assert_eq!(s.engine().state(), EngineState::Stopping);
    // Plausible overrides are released on stop.
    assert!(!s
        .engine()
        .engine(Side::Right)
        .n1
        .is_overridden(SensorChannel::One));
}

#[test]
fn invalid_reserve_sensor_stops_without_monitor_shutdown() {
    let (mut s, mut sink) = make_service();
    command(&mut s, "start", &mut sink);
    run_for(&mut s, 1.0, &mut sink);
    command(&mut s, "set FUEL_RES invalid", &mut sink);
    s.step(&mut sink);

    assert_eq!(s.engine().state(), EngineState::Stopping);
    assert!(s.engine().fuel_reserve().is_nan());
    assert!(sink.alert_messages().contains(&"FUEL RESERVE SENSOR INVALID"));
    assert!(sink.shutdown_reasons().is_empty());

    command(&mut s, "reset FUEL_RES", &mut sink);
    assert!(!s.engine().is_fuel_reserve_sensor_invalid());
    assert_eq!(s.engine().fuel_reserve(), SimConfig::default().fuel_capacity);
}

#[test]
fn fuel_flow_override_and_reset() {
    let (mut s, mut sink) = make_service();
    command(&mut s, "start", &mut sink);
    command(&mut s, "set FUEL_FLOW value 62", &mut sink);
    s.step(&mut sink);
    assert_eq!(s.engine().fuel_flow(), 62.0);
    assert!(sink.alert_messages().contains(&"FUEL FLOW EXCEEDED LIMIT"));

    command(&mut s, "set FUEL_FLOW invalid", &mut sink);
    s.step(&mut sink);
    assert!(s.engine().fuel_flow().is_nan());
    assert!(sink.alert_messages().contains(&"FUEL FLOW SENSOR INVALID"));

    command(&mut s, "reset FUEL_FLOW", &mut sink);
    s.step(&mut sink);
    assert!(!s.engine().is_fuel_flow_sensor_invalid());
    assert!(s.engine().fuel_flow() < 62.0);
}

#[test]
fn stuck_sensor_holds_then_recovers() {
    let (mut s, mut sink) = make_service();
    command(&mut s, "start", &mut sink);
    run_for(&mut s, 1.0, &mut sink);
    command(&mut s, "set N1_L1 stuck", &mut sink);
    let frozen = s
        .engine()
        .engine(Side::Left)
        .n1
        .reading(SensorChannel::One);
    run_for(&mut s, 0.5, &mut sink);

    let left = s.engine().engine(Side::Left);
    assert_eq!(left.n1.reading(SensorChannel::One), frozen);
    assert!(s.engine().is_n1_sensor_anomalous(Side::Left, SensorChannel::One));
    // The instrument keeps showing the frozen value.
    assert_eq!(
        s.engine()
            .sensor_value(Side::Left, Quantity::N1, SensorChannel::One),
        frozen
    );
    assert!(sink.alert_messages().contains(&"N1 SENSOR 1 LEFT ANOMALY"));
    // The healthy channel carries the display.
    assert!(s.engine().n1_left() > frozen);

    command(&mut s, "reset N1_L1", &mut sink);
    s.step(&mut sink);
    assert!(!s.engine().is_n1_sensor_anomalous(Side::Left, SensorChannel::One));
}

#[test]
fn repeated_alert_is_raised_once_per_hold_window() {
    let (mut s, mut sink) = make_service();
    command(&mut s, "start", &mut sink);
    command(&mut s, "set EGT_L1 fail", &mut sink);
    run_for(&mut s, 1.0, &mut sink);
    let count = |sink: &RecordingSink| {
        sink.alert_messages()
            .iter()
            .filter(|m| **m == "EGT SENSOR 1 LEFT ANOMALY")
            .count()
    };
    assert_eq!(count(&sink), 1);
    run_for(&mut s, 5.5, &mut sink);
    assert_eq!(count(&sink), 2);
}

#[test]
fn restart_begins_a_fresh_alert_timeline() {
    let (mut s, mut sink) = make_service();
    command(&mut s, "start", &mut sink);
    command(&mut s, "set EGT_L1 fail", &mut sink);
    run_for(&mut s, 1.0, &mut sink);
    command(&mut s, "stop", &mut sink);
    run_for(&mut s, 9.0, &mut sink);
    assert_eq!(s.engine().state(), EngineState::Off);
    assert!(s.engine().sim_time() > 9.0);

    command(&mut s, "start", &mut sink);
    assert_eq!(s.engine().sim_time(), 0.0);
    assert!(s.annunciator().master().is_none());
    assert_eq!(s.annunciator().history_len(), 0);

    sink.clear();
    command(&mut s, "set EGT_L1 fail", &mut sink);
    s.step(&mut sink);
    assert_eq!(sink.alert_messages(), ["EGT SENSOR 1 LEFT ANOMALY"]);
    assert_eq!(
        s.annunciator().master().map(|a| a.message),
        Some("EGT SENSOR 1 LEFT ANOMALY")
    );
}

// ── Channel and telemetry ─────────────────────────────────────

#[test]
fn commands_arrive_through_the_channel() {
    let channel: Channel<CriticalSectionRawMutex, SimCommand, 8> = Channel::new();
    let (mut s, mut sink) = make_service();
    for line in ["start", "set EGT_R2 overtemp amber", "quit"] {
        let cmd = SimCommand::parse(line).expect("valid");
        assert!(channel.try_send(cmd).is_ok());
    }
    assert_eq!(s.drain_commands(&channel, &mut sink), 3);
    assert_eq!(s.engine().state(), EngineState::Starting);
    assert!(s
        .engine()
        .engine(Side::Right)
        .egt
        .is_overridden(SensorChannel::Two));
    assert!(s.quit_requested());
}

#[test]
fn telemetry_serialises_nan_as_null() {
    let (mut s, mut sink) = make_service();
    command(&mut s, "start", &mut sink);
    command(&mut s, "set N1_L1 fail", &mut sink);
    command(&mut s, "set N1_L2 fail", &mut sink);
    command(&mut s, "set FUEL_FLOW invalid", &mut sink);
    s.step(&mut sink);

    let json = serde_json::to_value(s.build_telemetry()).expect("telemetry serialises");
    assert_eq!(json["state"], "Starting");
    assert_eq!(json["sub_state"], "LinearRamp");
    assert!(json["n1"][0].is_null());
    assert!(json["n1"][1].is_number());
    assert!(json["fuel_flow"].is_null());
    // Later amber alerts of a different message take over the master.
    assert_eq!(json["master_alert"], "FUEL FLOW SENSOR INVALID");
}
