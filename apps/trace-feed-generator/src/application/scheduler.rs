//! Emission pacing: steady-state intervals with jitter, periodic bursts.
//!
//! The feed loop asks [`EmitSchedule`] what the current cycle is. A cycle
//! is either a burst (records back-to-back, no trailing sleep) or a steady
//! single record followed by a jittered inter-record sleep. Bursts become
//! due once `burst_interval` has elapsed since the previous one; steady
//! pacing derives from the configured per-second rate.

use std::time::{Duration, Instant};

use rand::Rng;

/// Sleep floor for steady-state pacing. Very high rates or extreme jitter
/// draws can push the computed interval to zero or below; emission still
/// yields at least this long.
const MIN_STEADY_SLEEP: Duration = Duration::from_millis(1);

/// Sleep ceiling for steady-state pacing. Rates small enough to push the
/// computed interval past this would overflow the conversion to `Duration`;
/// pacing tops out at one year instead.
const MAX_STEADY_SLEEP: Duration = Duration::from_secs(31_536_000);

/// Bounds of the delay between a primary record and its pair leg.
const PAIR_DELAY_SECS: (f64, f64) = (0.1, 0.5);

/// What the feed loop should do this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// Emit this many records back-to-back, then return to steady pacing.
    Burst(u32),
    /// Emit one record, then sleep the jittered steady interval.
    Steady,
}

/// Pacing state for the generation loop.
#[derive(Debug)]
pub struct EmitSchedule {
    rate: f64,
    rate_jitter: f64,
    burst_size: u32,
    burst_interval: Duration,
    last_burst: Instant,
}

impl EmitSchedule {
    /// Creates a schedule. The first burst becomes due one full
    /// `burst_interval` after construction; `burst_size` of zero disables
    /// bursting.
    #[must_use]
    pub fn new(rate: f64, rate_jitter: f64, burst_size: u32, burst_interval: Duration) -> Self {
        Self {
            rate,
            rate_jitter,
            burst_size,
            burst_interval,
            last_burst: Instant::now(),
        }
    }

    /// Decides the cycle for `now`, marking the burst timestamp when a
    /// burst comes due.
    #[must_use]
    pub fn next_cycle(&mut self, now: Instant) -> Cycle {
        if self.burst_size > 0 && now.duration_since(self.last_burst) >= self.burst_interval {
            self.last_burst = now;
            Cycle::Burst(self.burst_size)
        } else {
            Cycle::Steady
        }
    }

    /// The sleep after a steady-cycle record: `1/rate` seconds, plus a
    /// uniform offset within `±(interval * rate_jitter)` when jitter is
    /// configured, clamped between the millisecond floor and the one-year
    /// ceiling.
    #[must_use]
    pub fn steady_sleep(&self, rng: &mut impl Rng) -> Duration {
        let mut interval = (1.0 / self.rate).min(MAX_STEADY_SLEEP.as_secs_f64());
        if self.rate_jitter > 0.0 {
            let bound = interval * self.rate_jitter;
            interval += rng.random_range(-bound..=bound);
        }
        Duration::from_secs_f64(interval.clamp(
            MIN_STEADY_SLEEP.as_secs_f64(),
            MAX_STEADY_SLEEP.as_secs_f64(),
        ))
    }
}

/// The delay between a steady-cycle primary record and its pair leg.
#[must_use]
pub fn pair_delay(rng: &mut impl Rng) -> Duration {
    Duration::from_secs_f64(rng.random_range(PAIR_DELAY_SECS.0..=PAIR_DELAY_SECS.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn burst_size_zero_disables_bursting() {
        let mut schedule = EmitSchedule::new(1.0, 0.0, 0, Duration::from_millis(10));
        let far_future = Instant::now() + Duration::from_secs(3600);
        assert_eq!(schedule.next_cycle(far_future), Cycle::Steady);
    }

    #[test]
    fn burst_comes_due_after_interval() {
        let mut schedule = EmitSchedule::new(1.0, 0.0, 5, Duration::from_millis(100));
        let now = Instant::now();

        assert_eq!(schedule.next_cycle(now), Cycle::Steady);
        assert_eq!(
            schedule.next_cycle(now + Duration::from_millis(150)),
            Cycle::Burst(5)
        );
    }

    #[test]
    fn burst_marks_timestamp_and_returns_to_steady() {
        let mut schedule = EmitSchedule::new(1.0, 0.0, 3, Duration::from_millis(100));
        let due = Instant::now() + Duration::from_millis(120);

        assert_eq!(schedule.next_cycle(due), Cycle::Burst(3));
        assert_eq!(schedule.next_cycle(due), Cycle::Steady);
        assert_eq!(
            schedule.next_cycle(due + Duration::from_millis(99)),
            Cycle::Steady
        );
        assert_eq!(
            schedule.next_cycle(due + Duration::from_millis(100)),
            Cycle::Burst(3)
        );
    }

    #[test]
    fn steady_sleep_without_jitter_is_exact() {
        let mut rng = StdRng::seed_from_u64(11);
        let schedule = EmitSchedule::new(4.0, 0.0, 0, Duration::from_secs(60));
        assert_eq!(schedule.steady_sleep(&mut rng), Duration::from_millis(250));
    }

    #[test]
    fn steady_sleep_with_jitter_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(12);
        let schedule = EmitSchedule::new(10.0, 0.5, 0, Duration::from_secs(60));
        for _ in 0..200 {
            let sleep = schedule.steady_sleep(&mut rng);
            assert!(sleep >= Duration::from_millis(50), "sleep {sleep:?}");
            assert!(sleep <= Duration::from_millis(150), "sleep {sleep:?}");
        }
    }

    #[test]
    fn steady_sleep_never_drops_below_floor() {
        let mut rng = StdRng::seed_from_u64(13);
        let schedule = EmitSchedule::new(100_000.0, 1.0, 0, Duration::from_secs(60));
        for _ in 0..200 {
            assert!(schedule.steady_sleep(&mut rng) >= Duration::from_millis(1));
        }
    }

    #[test]
    fn steady_sleep_caps_pathological_rates() {
        let mut rng = StdRng::seed_from_u64(15);

        // A denormal rate inverts to infinity; the ceiling keeps the
        // conversion to Duration in range.
        let schedule = EmitSchedule::new(5e-324, 0.0, 0, Duration::from_secs(60));
        assert_eq!(schedule.steady_sleep(&mut rng), MAX_STEADY_SLEEP);

        let jittered = EmitSchedule::new(1e-30, 1.0, 0, Duration::from_secs(60));
        for _ in 0..200 {
            assert!(jittered.steady_sleep(&mut rng) <= MAX_STEADY_SLEEP);
        }
    }

    #[test]
    fn pair_delay_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(14);
        for _ in 0..200 {
            let delay = pair_delay(&mut rng);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(500));
        }
    }
}
