//! Time source for stateful conversions.
//!
//! Only energy integration needs wall-clock intervals. The clock is injected so the integration
//! can be driven deterministically in tests and backed by any monotonic timer on target.

/// Microsecond-resolution instant.
pub type Instant = fugit::TimerInstantU64<1_000_000>;

pub trait Clock {
    fn now(&mut self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now(&mut self) -> Instant {
        (**self).now()
    }
}

/// Seconds elapsed from `earlier` to `later`, or zero if the clock went backwards.
pub fn seconds_between(earlier: Instant, later: Instant) -> f64 {
    match later.checked_duration_since(earlier) {
        Some(elapsed) => elapsed.ticks() as f64 / 1_000_000.0,
        None => 0.0,
    }
}

/// [`Clock`] backed by [`std::time::Instant`], counting from the moment it was created.
#[cfg(feature = "std")]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    pub fn new() -> Self {
        Self { origin: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&mut self) -> Instant {
        Instant::from_ticks(self.origin.elapsed().as_micros() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_in_seconds() {
        let a = Instant::from_ticks(1_000_000);
        let b = Instant::from_ticks(61_500_000);

        assert_eq!(60.5, seconds_between(a, b));
    }

    #[test]
    fn backwards_clock_is_zero() {
        let a = Instant::from_ticks(5_000_000);
        let b = Instant::from_ticks(4_000_000);

        assert_eq!(0.0, seconds_between(a, b));
    }
}
