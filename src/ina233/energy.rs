//! Energy integration over the INA233 power accumulator.
//!
//! The accumulator is configured to clear on every read, so each READ_EIN covers the interval
//! since the previous one. The average power of that interval times its length is folded into a
//! running total kept on the host.
//!
//! Preconditions the integrator cannot check:
//! - `read_ein` (auto-clear) is set in MFR_DEVICE_CONFIG.
//! - Reads are frequent enough that the rollover counter cannot wrap between two of them.

use crate::clock::{seconds_between, Instant};
use crate::ina233::register::EinSample;

const WATT_SECONDS_PER_KWH: f64 = 3_600_000.0;

/// Running energy total for one device.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnergyState {
    accumulated_kwh: f64,
    last_read: Instant,
}

impl EnergyState {
    /// A zero total starting at `now`.
    pub fn new(now: Instant) -> Self {
        Self { accumulated_kwh: 0.0, last_read: now }
    }

    /// Resets the total to zero, counting from `now`.
    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }

    pub fn accumulated_kwh(&self) -> f64 {
        self.accumulated_kwh
    }

    pub fn last_read(&self) -> Instant {
        self.last_read
    }

    /// Folds one accumulator snapshot taken at `now` into the total and returns the new total
    /// in kWh.
    ///
    /// A snapshot with no samples returns 0.0 and leaves the state untouched.
    ///
    /// The device must be configured to clear its accumulator on every READ_EIN, and it must be
    /// polled often enough that the rollover counter cannot wrap between two calls.
    pub fn integrate(&mut self, sample: &EinSample, current_lsb: f64, now: Instant) -> f64 {
        if sample.samples == 0 {
            return 0.0;
        }

        let accumulated = sample.rollover as f64 * 65536.0 + sample.pow_acc as f64;
        let total_energy = current_lsb * 25.0 * accumulated;
        let dt = seconds_between(self.last_read, now);

        self.accumulated_kwh += total_energy / sample.samples as f64 * dt / WATT_SECONDS_PER_KWH;
        self.last_read = now;

        self.accumulated_kwh
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use super::*;

    const CURRENT_LSB: f64 = 15.0 / 32768.0;

    fn secs(s: u64) -> Instant {
        Instant::from_ticks(s * 1_000_000)
    }

    #[test]
    fn two_reads_sixty_seconds_apart() {
        let mut state = EnergyState::new(secs(0));
        let sample = EinSample { pow_acc: 100, rollover: 0, samples: 10 };

        let first = state.integrate(&sample, CURRENT_LSB, secs(60));
        assert!(approx_eq!(f64, first, 1.9073486328125e-06, epsilon = 1e-18));

        let second = state.integrate(&sample, CURRENT_LSB, secs(120));
        assert!(approx_eq!(f64, second - first, (CURRENT_LSB * 25.0 * 100.0 / 10.0) * 60.0 / 3_600_000.0, epsilon = 1e-18));
        assert!(approx_eq!(f64, second, 3.814697265625e-06, epsilon = 1e-18));
        assert_eq!(secs(120), state.last_read());
    }

    #[test]
    fn empty_sample_leaves_state_untouched() {
        let mut state = EnergyState::new(secs(0));
        state.integrate(&EinSample { pow_acc: 100, rollover: 0, samples: 10 }, CURRENT_LSB, secs(60));
        let before = state;

        let energy = state.integrate(&EinSample { pow_acc: 500, rollover: 1, samples: 0 }, CURRENT_LSB, secs(90));

        assert_eq!(0.0, energy);
        assert_eq!(before, state);
    }

    #[test]
    fn rollover_counts_full_accumulator_range() {
        let mut state = EnergyState::new(secs(0));
        let energy = state.integrate(&EinSample { pow_acc: 0, rollover: 1, samples: 1 }, 1.0, secs(3600));

        // 25 * 65536 W for one hour
        assert!(approx_eq!(f64, energy, 1638.4, epsilon = 1e-9));
    }

    #[test]
    fn reset_clears_total() {
        let mut state = EnergyState::new(secs(0));
        state.integrate(&EinSample { pow_acc: 100, rollover: 0, samples: 10 }, CURRENT_LSB, secs(60));

        state.reset(secs(75));

        assert_eq!(0.0, state.accumulated_kwh());
        assert_eq!(secs(75), state.last_read());
    }
}
