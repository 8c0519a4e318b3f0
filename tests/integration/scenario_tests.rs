//! End-to-end scenarios against the engine controller and safety monitor,
//! driven with a seeded noise source.

use twinspool::controller::EngineController;
use twinspool::noise::seeded;
use twinspool::safety::SafetyMonitor;
use twinspool::{Channel, EngineState, Side, SimConfig, SubState};

fn seeded_controller(seed: u64) -> EngineController {
    EngineController::with_noise(SimConfig::default(), seeded(seed))
}

fn advance_until(c: &mut EngineController, dt: f64, limit: f64, state: EngineState) {
    let mut t = 0.0;
    while c.state() != state {
        assert!(t < limit, "no {state:?} within {limit}s, still {:?}", c.state());
        c.advance(dt);
        t += dt;
    }
}

#[test]
fn two_and_a_half_seconds_into_start() {
    let mut c = seeded_controller(1);
    c.start();
    for _ in 0..25 {
        c.advance(0.1);
    }
    assert_eq!(c.state(), EngineState::Starting);
    assert_eq!(c.sub_state(), SubState::LogRamp);
    for side in Side::BOTH {
        // ±1 % sensor noise around 178.48.
        let egt = c.egt(side);
        assert!((egt - 178.48).abs() < 178.48 * 0.011, "EGT {egt}");
    }
}

#[test]
fn stable_transition_latches_bases() {
    let mut c = seeded_controller(2);
    c.start();
    advance_until(&mut c, 0.005, 10.0, EngineState::Stable);
    assert!(c.sim_time() > 7.0 && c.sim_time() < 7.2, "t={}", c.sim_time());
    for side in Side::BOTH {
        let e = c.engine(side);
        assert!(e.n1_true >= 38_000.0);
        assert_eq!(e.n1_base, e.n1_true);
        assert_eq!(e.egt_base, e.egt_true);
    }
    assert_eq!(c.fuel().flow_base(), c.fuel().true_flow());
}

#[test]
fn fuel_runs_dry_and_engines_stop() {
    let mut c = seeded_controller(3);
    c.start();
    c.set_forced_fuel_reserve(100.0);
    c.set_forced_fuel_flow(50.0);
    // 100 units at 50/s: empty after 2 s.
    for _ in 0..19 {
        c.advance(0.1);
    }
    assert_eq!(c.state(), EngineState::Starting);
    assert!((c.fuel_reserve() - 5.0).abs() < 1e-6);
    c.advance(0.1);
    assert_eq!(c.fuel_reserve(), 0.0);
    assert_eq!(c.state(), EngineState::Stopping);

    let monitor = SafetyMonitor::new(c.config());
    let report = monitor.evaluate(&c);
    assert!(
        report
            .alerts
            .iter()
            .any(|a| a.message == "FUEL DEPLETED - ENGINE SHUTDOWN")
    );
}

#[test]
fn dual_egt_failure_shuts_down_after_evaluation() {
    let mut c = seeded_controller(4);
    let mut monitor = SafetyMonitor::new(c.config());
    c.start();
    advance_until(&mut c, 0.01, 10.0, EngineState::Stable);
    for side in Side::BOTH {
        for ch in Channel::BOTH {
            c.set_forced_egt_sensor(side, ch, 1_500.0);
        }
    }
    c.advance(0.01);
    assert_eq!(c.state(), EngineState::Stable);
    let report = monitor.apply(&mut c);
    assert!(report.shutdown_commanded);
    assert!(matches!(c.state(), EngineState::Stopping | EngineState::Off));
}

#[test]
fn cooldown_starts_from_what_the_crew_saw() {
    let mut c = seeded_controller(5);
    c.start();
    advance_until(&mut c, 0.01, 10.0, EngineState::Stable);
    for _ in 0..50 {
        c.advance(0.01);
    }
    let shown = [c.n1_left(), c.n1_right()];
    c.stop();
    assert_eq!(c.engine(Side::Left).n1_base, shown[0]);
    assert_eq!(c.engine(Side::Right).n1_base, shown[1]);

    advance_until(&mut c, 0.01, 9.0, EngineState::Off);
    assert_eq!(c.fuel_flow(), 0.0);
    assert_eq!(c.sub_state(), SubState::None);
}

#[test]
fn failed_channel_rides_through_shutdown() {
    let mut c = seeded_controller(6);
    c.start();
    advance_until(&mut c, 0.01, 10.0, EngineState::Stable);
    c.set_forced_n1_sensor(Side::Left, Channel::Two, -50.0);
    c.advance(0.01);
    let display = c.n1_left();
    assert_eq!(display, c.engine(Side::Left).n1.reading(Channel::One));

    c.stop();
    // Out-of-range override survives the stop and the healthy channel
    // becomes the cooldown base.
    assert!(c.engine(Side::Left).n1.is_overridden(Channel::Two));
    assert_eq!(c.engine(Side::Left).n1_base, display);
}
