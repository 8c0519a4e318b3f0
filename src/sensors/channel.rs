//! Dual-redundant sensor channel pair.
//!
//! Each tick a channel's reading comes from exactly one source, in this
//! order of precedence:
//!
//! 1. an injected override value,
//! 2. the frozen last reading of a stuck channel,
//! 3. NaN while an auto-detected anomaly is latched,
//! 4. the true value plus bounded relative measurement noise.
//!
//! The displayed value is the vote of the healthy channels.

use crate::noise::NoiseSource;

use super::Channel;

/// Physically plausible reading range for one quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NominalRange {
    pub min: f64,
    pub max: f64,
}

impl NominalRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// NaN is never in range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Two redundant channels measuring the same quantity on one engine.
#[derive(Debug, Clone)]
pub struct SensorChannelPair {
    range: NominalRange,
    reading: [f64; 2],
    anomalous: [bool; 2],
    overridden: [bool; 2],
    override_value: [f64; 2],
    /// Stuck channel: reading frozen, anomaly re-evaluation suspended.
    forced_anomalous: [bool; 2],
}

impl SensorChannelPair {
    /// Healthy pair with both channels reading `initial`.
    pub fn new(range: NominalRange, initial: f64) -> Self {
        Self {
            range,
            reading: [initial; 2],
            anomalous: [false; 2],
            overridden: [false; 2],
            override_value: [0.0; 2],
            forced_anomalous: [false; 2],
        }
    }

    /// Refresh both channels from the engine's true value.
    ///
    /// `noise_amp` is the relative measurement noise (0.01 = ±1 %).
    pub fn update(&mut self, true_value: f64, noise_amp: f64, noise: &mut dyn NoiseSource) {
        for s in 0..2 {
            if self.overridden[s] {
                self.reading[s] = self.override_value[s];
            } else if self.forced_anomalous[s] {
                continue;
            } else if self.anomalous[s] {
                self.reading[s] = f64::NAN;
            } else {
                self.reading[s] = true_value * (1.0 + noise.uniform(-noise_amp, noise_amp));
            }
            if !self.forced_anomalous[s] {
                self.anomalous[s] = !self.range.contains(self.reading[s]);
            }
        }
    }

    /// Voted value: mean of the healthy channels, NaN if none is healthy.
    pub fn displayed(&self) -> f64 {
        let (sum, count) = (0..2)
            .filter(|&s| !self.anomalous[s] && !self.reading[s].is_nan())
            .fold((0.0, 0u8), |(sum, count), s| (sum + self.reading[s], count + 1));
        if count == 0 {
            f64::NAN
        } else {
            sum / f64::from(count)
        }
    }

    /// Last raw reading of a channel, including any held or injected value.
    pub fn reading(&self, ch: Channel) -> f64 {
        self.reading[ch.index()]
    }

    /// Reading as reported to instruments.  An anomalous channel reports
    /// NaN, except a stuck one, which keeps showing its frozen reading.
    /// Neither takes part in the vote.
    pub fn reported(&self, ch: Channel) -> f64 {
        if self.anomalous[ch.index()] && !self.is_stuck(ch) {
            f64::NAN
        } else {
            self.reading[ch.index()]
        }
    }

    pub fn is_anomalous(&self, ch: Channel) -> bool {
        self.anomalous[ch.index()]
    }

    /// Both channels anomalous.
    pub fn is_system_fault(&self) -> bool {
        self.anomalous[0] && self.anomalous[1]
    }

    pub fn is_overridden(&self, ch: Channel) -> bool {
        self.overridden[ch.index()]
    }

    pub fn override_value(&self, ch: Channel) -> Option<f64> {
        let s = ch.index();
        self.overridden[s].then_some(self.override_value[s])
    }

    pub fn is_stuck(&self, ch: Channel) -> bool {
        self.forced_anomalous[ch.index()]
    }

    // ── Fault injection ───────────────────────────────────────

    /// Pin a channel to `value` from the next update on.
    pub fn set_override(&mut self, ch: Channel, value: f64) {
        let s = ch.index();
        self.overridden[s] = true;
        self.override_value[s] = value;
    }

    /// Release an override.  Unless the channel is stuck, the anomaly latch
    /// is cleared too so the next update produces a fresh measurement.
    pub fn reset_override(&mut self, ch: Channel) {
        let s = ch.index();
        self.overridden[s] = false;
        if !self.forced_anomalous[s] {
            self.anomalous[s] = false;
        }
    }

    /// Freeze (or thaw) a channel at its last reading.  A stuck channel is
    /// flagged anomalous and drops out of the vote.
    pub fn set_stuck(&mut self, ch: Channel, stuck: bool) {
        let s = ch.index();
        self.forced_anomalous[s] = stuck;
        self.anomalous[s] = stuck;
    }

    /// Release overrides whose value is itself plausible.
    ///
    /// An out-of-range override models a failed sensor and stays in place,
    /// as does any override on a stuck channel.  Returns how many channels
    /// were released.
    pub fn release_plausible_overrides(&mut self) -> usize {
        let mut released = 0;
        for s in 0..2 {
            if self.overridden[s]
                && !self.forced_anomalous[s]
                && self.range.contains(self.override_value[s])
            {
                self.overridden[s] = false;
                released += 1;
            }
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{Midpoint, seeded};

    const N1_RANGE: NominalRange = NominalRange::new(0.0, 50_000.0);

    fn pair() -> SensorChannelPair {
        SensorChannelPair::new(N1_RANGE, 0.0)
    }

    #[test]
    fn healthy_channels_track_true_value_within_noise() {
        let mut p = pair();
        let mut rng = seeded(3);
        for _ in 0..100 {
            p.update(20_000.0, 0.01, &mut rng);
            for ch in Channel::BOTH {
                let r = p.reading(ch);
                assert!((19_800.0..=20_200.0).contains(&r), "reading {r}");
                assert!(!p.is_anomalous(ch));
            }
        }
    }

    #[test]
    fn voting_averages_two_healthy_channels() {
        let mut p = pair();
        p.set_override(Channel::One, 20_000.0);
        p.set_override(Channel::Two, 30_000.0);
        p.update(0.0, 0.01, &mut Midpoint);
        assert_eq!(p.displayed(), 25_000.0);
    }

    #[test]
    fn voting_uses_single_healthy_channel() {
        let mut p = pair();
        p.set_override(Channel::One, -50.0);
        p.set_override(Channel::Two, 30_000.0);
        p.update(0.0, 0.01, &mut Midpoint);
        assert!(p.is_anomalous(Channel::One));
        assert_eq!(p.displayed(), 30_000.0);
        assert!(p.reported(Channel::One).is_nan());
        assert_eq!(p.reading(Channel::One), -50.0);
    }

    #[test]
    fn voting_is_nan_when_both_anomalous() {
        let mut p = pair();
        p.set_override(Channel::One, -50.0);
        p.set_override(Channel::Two, 60_000.0);
        p.update(10_000.0, 0.01, &mut Midpoint);
        assert!(p.is_system_fault());
        assert!(p.displayed().is_nan());
    }

    #[test]
    fn override_wins_over_latched_anomaly() {
        let mut p = pair();
        p.set_override(Channel::One, -50.0);
        p.update(10_000.0, 0.0, &mut Midpoint);
        assert!(p.is_anomalous(Channel::One));

        p.set_override(Channel::One, 12_345.0);
        p.update(10_000.0, 0.0, &mut Midpoint);
        assert_eq!(p.reading(Channel::One), 12_345.0);
        assert!(!p.is_anomalous(Channel::One));
    }

    #[test]
    fn anomaly_latches_as_nan_without_override() {
        let mut p = pair();
        p.set_override(Channel::Two, -50.0);
        p.update(10_000.0, 0.0, &mut Midpoint);
        // Bypass reset_override so the latch stays set.
        p.overridden[1] = false;
        p.update(10_000.0, 0.0, &mut Midpoint);
        assert!(p.reading(Channel::Two).is_nan());
        assert!(p.is_anomalous(Channel::Two));
    }

    #[test]
    fn reset_override_restores_measurement() {
        let mut p = pair();
        p.set_override(Channel::Two, -50.0);
        p.update(10_000.0, 0.0, &mut Midpoint);
        p.reset_override(Channel::Two);
        p.update(10_000.0, 0.0, &mut Midpoint);
        assert_eq!(p.reading(Channel::Two), 10_000.0);
        assert!(!p.is_anomalous(Channel::Two));
    }

    #[test]
    fn stuck_channel_holds_last_reading() {
        let mut p = pair();
        p.update(10_000.0, 0.0, &mut Midpoint);
        p.set_stuck(Channel::One, true);
        p.update(30_000.0, 0.0, &mut Midpoint);
        assert_eq!(p.reading(Channel::One), 10_000.0);
        assert_eq!(p.reading(Channel::Two), 30_000.0);
        assert!(p.is_anomalous(Channel::One));
        assert!(p.is_stuck(Channel::One));
        assert_eq!(p.reported(Channel::One), 10_000.0);
        assert_eq!(p.displayed(), 30_000.0);

        p.set_stuck(Channel::One, false);
        p.update(30_000.0, 0.0, &mut Midpoint);
        assert_eq!(p.reading(Channel::One), 30_000.0);
        assert!(!p.is_anomalous(Channel::One));
    }

    #[test]
    fn release_keeps_implausible_and_stuck_overrides() {
        let mut p = pair();
        p.set_override(Channel::One, 43_000.0);
        p.set_override(Channel::Two, -50.0);
        assert_eq!(p.release_plausible_overrides(), 1);
        assert!(!p.is_overridden(Channel::One));
        assert!(p.is_overridden(Channel::Two));

        p.set_override(Channel::One, 43_000.0);
        p.set_stuck(Channel::One, true);
        assert_eq!(p.release_plausible_overrides(), 0);
        assert_eq!(p.override_value(Channel::One), Some(43_000.0));
    }

    #[test]
    fn override_wins_over_stuck_hold() {
        let mut p = pair();
        p.update(10_000.0, 0.0, &mut Midpoint);
        p.set_stuck(Channel::One, true);
        p.set_override(Channel::One, 43_000.0);
        p.update(20_000.0, 0.0, &mut Midpoint);
        assert_eq!(p.reading(Channel::One), 43_000.0);
        assert_eq!(p.reported(Channel::One), 43_000.0);
        // Still stuck: the channel stays out of the vote.
        assert!(p.is_anomalous(Channel::One));
        assert_eq!(p.displayed(), 20_000.0);

        p.reset_override(Channel::One);
        p.update(25_000.0, 0.0, &mut Midpoint);
        assert_eq!(p.reading(Channel::One), 43_000.0, "hold resumes at the last reading");
    }

    #[test]
    fn auto_anomaly_reports_nan() {
        let mut p = pair();
        p.set_override(Channel::Two, -50.0);
        p.update(10_000.0, 0.0, &mut Midpoint);
        assert!(p.is_anomalous(Channel::Two));
        assert!(!p.is_stuck(Channel::Two));
        assert!(p.reported(Channel::Two).is_nan());
    }

    #[test]
    fn nan_is_out_of_range() {
        assert!(!N1_RANGE.contains(f64::NAN));
        assert!(N1_RANGE.contains(0.0));
        assert!(N1_RANGE.contains(50_000.0));
        assert!(!N1_RANGE.contains(50_000.1));
    }
}
