//! Randomized pause between page fetches.
//!
//! Delays are drawn from a normal distribution centred on the configured
//! delay so consecutive requests do not arrive at a fixed cadence. Samples
//! below zero are clamped to no wait at all.

use std::time::Duration;

use b2bscout_core::CrawlConfig;
use rand::Rng;
use rand_distr::{Distribution, Normal};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throttle {
    /// Mean delay in seconds.
    delay: f64,
    /// Standard deviation in seconds.
    jitter: f64,
}

impl Throttle {
    #[must_use]
    pub fn new(delay: f64, jitter: f64) -> Self {
        Self { delay, jitter }
    }

    #[must_use]
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(config.delay, config.jitter)
    }

    /// Draws one delay using `rng`.
    ///
    /// A zero, negative or non-finite jitter disables randomization and the
    /// mean delay is used as-is.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let secs = if self.jitter > 0.0 && self.jitter.is_finite() {
            Normal::new(self.delay, self.jitter).map_or(self.delay, |normal| normal.sample(rng))
        } else {
            self.delay
        };

        if !secs.is_finite() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }

    /// Draws one delay from the thread-local RNG.
    #[must_use]
    pub fn sample(&self) -> Duration {
        self.sample_with(&mut rand::rng())
    }

    /// Sleeps for one sampled delay.
    pub async fn wait(&self) {
        let delay = self.sample();
        if delay.is_zero() {
            return;
        }
        tracing::trace!(delay_ms = delay.as_millis(), "throttling before next page");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn zero_jitter_returns_mean_delay() {
        let throttle = Throttle::new(2.5, 0.0);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(throttle.sample_with(&mut rng), Duration::from_millis(2500));
    }

    #[test]
    fn samples_are_never_negative() {
        // Mean far below zero: every sample must clamp to zero.
        let throttle = Throttle::new(-10.0, 1.0);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            assert_eq!(throttle.sample_with(&mut rng), Duration::ZERO);
        }
    }

    #[test]
    fn samples_vary_with_jitter() {
        let throttle = Throttle::new(3.0, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        let samples: Vec<Duration> = (0..50).map(|_| throttle.sample_with(&mut rng)).collect();
        let first = samples[0];
        assert!(samples.iter().any(|s| *s != first), "expected varied delays");
    }

    #[test]
    fn sample_mean_tracks_configured_delay() {
        let throttle = Throttle::new(3.0, 0.9);
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 5000;
        let total: f64 = (0..n)
            .map(|_| throttle.sample_with(&mut rng).as_secs_f64())
            .sum();
        let mean = total / f64::from(n);
        assert!((mean - 3.0).abs() < 0.1, "mean was {mean}");
    }

    #[test]
    fn non_finite_jitter_falls_back_to_mean() {
        let throttle = Throttle::new(1.0, f64::NAN);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(throttle.sample_with(&mut rng), Duration::from_secs(1));
    }

    #[test]
    fn from_config_copies_delay_and_jitter() {
        let cfg = CrawlConfig::with_delay(4.0, true);
        let throttle = Throttle::from_config(&cfg);
        assert!((throttle.delay - 4.0).abs() < f64::EPSILON);
        assert!((throttle.jitter - 1.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn zero_delay_wait_returns_immediately() {
        let started = std::time::Instant::now();
        Throttle::new(0.0, 0.0).wait().await;
        assert!(started.elapsed() < Duration::from_millis(100));
    }
}
