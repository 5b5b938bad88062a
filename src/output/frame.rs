use std::future;
use std::time::Duration;
use tokio::time::{self, Instant};

/// One-shot frame callbacks on a fixed refresh grid.
///
/// Ticks fall on `origin + k * period`. [`FrameClock::request`] arms a single
/// callback at the first tick strictly after the request; further requests
/// while armed are absorbed. [`FrameClock::wait`] is cancel-safe: dropping it
/// keeps the armed deadline for the next call.
#[derive(Debug)]
pub struct FrameClock {
    origin: Instant,
    period: Duration,
    deadline: Option<Instant>,
}

impl FrameClock {
    pub fn new(rate_hz: u32) -> Self {
        Self::starting_at(Instant::now(), rate_hz)
    }

    pub fn starting_at(origin: Instant, rate_hz: u32) -> Self {
        Self {
            origin,
            period: Duration::from_secs(1) / rate_hz.max(1),
            deadline: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn request(&mut self) {
        if self.deadline.is_none() {
            self.deadline = Some(self.next_boundary(Instant::now()));
        }
    }

    /// First grid tick strictly after `now`.
    pub fn next_boundary(&self, now: Instant) -> Instant {
        let period = self.period.as_nanos().max(1);
        let elapsed = now.saturating_duration_since(self.origin).as_nanos();
        let ticks = elapsed / period + 1;
        let offset = u64::try_from(ticks * period).unwrap_or(u64::MAX);
        self.origin + Duration::from_nanos(offset)
    }

    /// Sleep until the armed tick, then disarm. Pends forever when unarmed.
    pub async fn wait(&mut self) {
        match self.deadline {
            Some(deadline) => {
                time::sleep_until(deadline).await;
                self.deadline = None;
            }
            None => future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_follows_rate() {
        let clock = FrameClock::starting_at(Instant::now(), 50);
        assert_eq!(clock.period(), Duration::from_millis(20));
    }

    #[test]
    fn zero_rate_is_clamped() {
        let clock = FrameClock::starting_at(Instant::now(), 0);
        assert_eq!(clock.period(), Duration::from_secs(1));
    }

    #[test]
    fn boundary_is_strictly_after_now() {
        let origin = Instant::now();
        let clock = FrameClock::starting_at(origin, 50);
        assert_eq!(clock.next_boundary(origin), origin + Duration::from_millis(20));
        assert_eq!(
            clock.next_boundary(origin + Duration::from_millis(20)),
            origin + Duration::from_millis(40)
        );
        assert_eq!(
            clock.next_boundary(origin + Duration::from_millis(25)),
            origin + Duration::from_millis(40)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn request_arms_once() {
        let mut clock = FrameClock::new(50);
        time::advance(Duration::from_millis(5)).await;
        clock.request();
        let first = clock.deadline();
        time::advance(Duration::from_millis(10)).await;
        clock.request();
        assert!(clock.is_armed());
        assert_eq!(clock.deadline(), first);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_fires_on_grid_and_disarms() {
        let origin = Instant::now();
        let mut clock = FrameClock::starting_at(origin, 50);
        time::advance(Duration::from_millis(5)).await;
        clock.request();
        clock.wait().await;
        let fired = Instant::now();
        assert!(fired >= origin + Duration::from_millis(20));
        assert!(fired < origin + Duration::from_millis(40));
        assert!(!clock.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn unarmed_wait_never_fires() {
        let mut clock = FrameClock::new(60);
        let outcome = time::timeout(Duration::from_secs(1), clock.wait()).await;
        assert!(outcome.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_wait_keeps_deadline() {
        let mut clock = FrameClock::new(10);
        clock.request();
        let deadline = clock.deadline();
        let outcome = time::timeout(Duration::from_millis(10), clock.wait()).await;
        assert!(outcome.is_err());
        assert_eq!(clock.deadline(), deadline);
        clock.wait().await;
        assert!(!clock.is_armed());
    }
}
