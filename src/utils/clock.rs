use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};
use tokio::time::Instant;

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// Wall clock time in the local time zone. Records are keyed by its date.
    fn time(&self) -> DateTime<Local>;

    fn today(&self) -> NaiveDate {
        self.time().date_naive()
    }

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Local> {
        Local::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}

/// Keeps the sampling schedule for a fixed period.
pub struct Schedule {
    next: Instant,
    period: Duration,
}

impl Schedule {
    pub fn new(start: Instant, period: Duration) -> Self {
        Self {
            next: start + period,
            period,
        }
    }

    /// Returns the instant to sleep until and moves the schedule one period forward. When the
    /// schedule has fallen behind `now` it restarts from `now` instead of firing a burst of
    /// late ticks.
    pub fn advance(&mut self, now: Instant) -> Instant {
        if self.next < now {
            self.next = now;
        }
        let wake = self.next;
        self.next += self.period;
        wake
    }
}
