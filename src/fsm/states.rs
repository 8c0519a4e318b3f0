//! Concrete state handler functions and table builder.
//!
//! ```text
//!  OFF ──[start]──▶ STARTING ──[both N1 ≥ 95 %]──▶ STABLE
//!   ▲                  │                              │
//!   │               [stop]                         [stop]
//!   │                  ▼                              │
//!   └─[spun down]── STOPPING ◀────────────────────────┘
//! ```
//!
//! `start` and `stop` are forced transitions issued by the controller;
//! the handlers below only model the autonomous transitions.

use super::context::PlantContext;
use super::{EngineState, StateDescriptor, SubState};
use crate::engine::Side;
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once per controller.
pub fn build_state_table() -> [StateDescriptor; EngineState::COUNT] {
    [
        // Index 0: Off
        StateDescriptor {
            id: EngineState::Off,
            name: "Off",
            on_enter: Some(off_enter),
            on_update: off_update,
        },
        // Index 1: Starting
        StateDescriptor {
            id: EngineState::Starting,
            name: "Starting",
            on_enter: Some(starting_enter),
            on_update: starting_update,
        },
        // Index 2: Stable
        StateDescriptor {
            id: EngineState::Stable,
            name: "Stable",
            on_enter: Some(stable_enter),
            on_update: stable_update,
        },
        // Index 3: Stopping
        StateDescriptor {
            id: EngineState::Stopping,
            name: "Stopping",
            on_enter: Some(stopping_enter),
            on_update: stopping_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  OFF state
// ═══════════════════════════════════════════════════════════════════════════

fn off_enter(ctx: &mut PlantContext) {
    let ambient = ctx.config.ambient_temp;
    for engine in &mut ctx.engines {
        engine.come_to_rest(ambient);
    }
    ctx.fuel.shut_off();
    ctx.sub_state = SubState::None;
    info!("OFF: engines at rest");
}

fn off_update(_ctx: &mut PlantContext, _dt: f64) -> Option<EngineState> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  STARTING state: linear then logarithmic spool-up
// ═══════════════════════════════════════════════════════════════════════════

fn starting_enter(ctx: &mut PlantContext) {
    ctx.reset();
    ctx.sub_state = SubState::LinearRamp;
    info!("STARTING: start sequence initiated");
}

/// Start-sequence targets `(n1, fuel_flow, egt)` at `t` seconds, unclamped.
pub fn start_profile(t: f64, linear_secs: f64, ambient: f64) -> (f64, f64, f64) {
    if t <= linear_secs {
        (10_000.0 * t, 5.0 * t, ambient)
    } else {
        let l = (t - 1.0).log10();
        (23_000.0 * l + 20_000.0, 42.0 * l + 10.0, 900.0 * l + ambient)
    }
}

fn starting_update(ctx: &mut PlantContext, dt: f64) -> Option<EngineState> {
    ctx.start_phase_elapsed += dt;
    let t = ctx.start_phase_elapsed;
    let cfg = &ctx.config;

    let linear = t <= cfg.start_linear_secs;
    let (n1, flow, egt) = start_profile(t, cfg.start_linear_secs, cfg.ambient_temp);
    let n1 = n1.min(cfg.n1_rated_max);
    let egt = egt.min(cfg.egt_max);
    let flow = flow.min(cfg.fuel_flow_max);
    let threshold = cfg.stable_n1_threshold();

    let next_sub = if linear {
        SubState::LinearRamp
    } else {
        SubState::LogRamp
    };
    if next_sub != ctx.sub_state {
        debug!("STARTING: {:?} -> {:?} at t={:.3}s", ctx.sub_state, next_sub, t);
        ctx.sub_state = next_sub;
    }

    ctx.set_both(n1, egt);
    ctx.fuel.set_flow(flow);

    if ctx.all_engines(|e| e.n1_true >= threshold) {
        return Some(EngineState::Stable);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  STABLE state: oscillation around the reference values
// ═══════════════════════════════════════════════════════════════════════════

fn stable_enter(ctx: &mut PlantContext) {
    for engine in &mut ctx.engines {
        engine.latch_base();
    }
    ctx.fuel.latch_flow_base();
    ctx.sub_state = SubState::StableRun;
    info!(
        "STABLE: N1 base {:.0}/{:.0}, fuel flow base {:.2}",
        ctx.engine(Side::Left).n1_base,
        ctx.engine(Side::Right).n1_base,
        ctx.fuel.flow_base()
    );
}

fn stable_update(ctx: &mut PlantContext, _dt: f64) -> Option<EngineState> {
    let jitter = ctx.config.stable_jitter;
    for engine in &mut ctx.engines {
        engine.oscillate(jitter, ctx.noise.as_mut());
    }
    let flow = ctx.fuel.flow_base() * (1.0 + ctx.noise.uniform(-jitter, jitter));
    ctx.fuel.set_flow(flow.min(ctx.config.fuel_flow_max));
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  STOPPING state: logarithmic spool-down from the displayed values
// ═══════════════════════════════════════════════════════════════════════════

fn stopping_enter(ctx: &mut PlantContext) {
    let mut released = 0;
    for engine in &mut ctx.engines {
        engine.rebase_on_display();
        released += engine.n1.release_plausible_overrides();
        released += engine.egt.release_plausible_overrides();
    }
    ctx.fuel.shut_off();
    ctx.stop_phase_elapsed = 0.0;
    ctx.sub_state = SubState::Shutdown;
    info!("STOPPING: shutdown sequence initiated, {released} sensor override(s) released");
}

/// Shutdown decay factor at `t` seconds: 1 at the stop command, 0 once
/// `duration` has elapsed.
pub fn stop_factor(t: f64, duration: f64) -> f64 {
    if t < duration {
        1.0 - (t + 1.0).log10() / (duration + 1.0).log10()
    } else {
        0.0
    }
}

fn stopping_update(ctx: &mut PlantContext, dt: f64) -> Option<EngineState> {
    ctx.stop_phase_elapsed += dt;
    let t = ctx.stop_phase_elapsed;
    let duration = ctx.config.stop_duration_secs;
    let ambient = ctx.config.ambient_temp;
    let floor = ctx.config.stop_n1_floor;

    let factor = stop_factor(t, duration);
    for engine in &mut ctx.engines {
        engine.decay(factor, ambient);
    }

    if t >= duration || ctx.all_engines(|e| e.n1_true <= floor) {
        return Some(EngineState::Off);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_profile_is_linear_then_logarithmic() {
        assert_eq!(start_profile(1.0, 2.0, 20.0), (10_000.0, 5.0, 20.0));
        assert_eq!(start_profile(2.0, 2.0, 20.0), (20_000.0, 10.0, 20.0));
        // log10(1) = 0 makes the log branch continuous at t = 2.
        let (n1, flow, egt) = start_profile(2.0 + 1e-12, 2.0, 20.0);
        assert!((n1 - 20_000.0).abs() < 1e-6);
        assert!((flow - 10.0).abs() < 1e-6);
        assert!((egt - 20.0).abs() < 1e-6);
    }

    #[test]
    fn start_profile_egt_at_two_and_a_half_seconds() {
        let (_, _, egt) = start_profile(2.5, 2.0, 20.0);
        assert!((egt - (900.0 * 1.5f64.log10() + 20.0)).abs() < 1e-9);
        assert!((egt - 178.48).abs() < 0.01);
    }

    #[test]
    fn stop_factor_runs_from_one_to_zero() {
        assert_eq!(stop_factor(0.0, 8.0), 1.0);
        assert!((stop_factor(2.0, 8.0) - 0.5).abs() < 1e-12);
        assert!(stop_factor(7.999, 8.0) > 0.0);
        assert_eq!(stop_factor(8.0, 8.0), 0.0);
        assert_eq!(stop_factor(100.0, 8.0), 0.0);
    }

    #[test]
    fn table_rows_match_their_index() {
        for (i, row) in build_state_table().iter().enumerate() {
            assert_eq!(row.id as usize, i, "{} is out of place", row.name);
        }
    }
}
