use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    storage::record_storage::RecordStorage,
    summary::{aggregate::recompute_total_time, Summary},
    utils::clock::{Clock, Schedule},
    window_api::{ActiveWindowData, ProbeError, WindowProbe},
};

use super::sample::is_valid_sample;

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Time between two samples. Every accepted sample adds exactly this much time.
    pub period: Duration,
    /// Upper bound for a single probe call. A probe that takes longer counts as no sample.
    pub probe_timeout: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Summary being recorded for one local day.
#[derive(Debug)]
struct LiveDay {
    date: NaiveDate,
    summary: Summary,
}

#[derive(Debug)]
enum SamplerState {
    AwaitingFirstSample,
    Sampling(LiveDay),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The sample was counted and the record rewritten.
    Recorded,
    /// The sample was counted but writing the record failed. The next recorded tick writes
    /// the whole summary again.
    SaveFailed,
    /// Nothing usable was focused, or the probe failed.
    Rejected,
}

/// The sampling loop. Owns the summary of the current day and is its only writer.
pub struct Sampler<R: RecordStorage> {
    probe: Box<dyn WindowProbe>,
    storage: R,
    clock: Box<dyn Clock>,
    config: SamplerConfig,
    shutdown: CancellationToken,
    state: SamplerState,
}

impl<R: RecordStorage> Sampler<R> {
    pub fn new(
        probe: Box<dyn WindowProbe>,
        storage: R,
        clock: Box<dyn Clock>,
        config: SamplerConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            probe,
            storage,
            clock,
            config,
            shutdown,
            state: SamplerState::AwaitingFirstSample,
        }
    }

    /// Date and summary currently being recorded. `None` before the first tick.
    pub fn live(&self) -> Option<(NaiveDate, &Summary)> {
        match &self.state {
            SamplerState::AwaitingFirstSample => None,
            SamplerState::Sampling(day) => Some((day.date, &day.summary)),
        }
    }

    /// Switches the live summary to `today` when it belongs to another day, or when there is
    /// none yet. An existing record for `today` is resumed, otherwise recording starts empty.
    /// The previous day needs no final write because every tick already persisted it.
    async fn roll_over(&mut self, today: NaiveDate) -> Result<()> {
        let previous = match &self.state {
            SamplerState::Sampling(day) if day.date == today => return Ok(()),
            SamplerState::Sampling(day) => Some(day.date),
            SamplerState::AwaitingFirstSample => None,
        };

        let path = self.storage.record_path(today);
        let exists = self
            .storage
            .exists(today)
            .await
            .with_context(|| format!("Failed to check record {path:?}"))?;

        let summary = if exists {
            let summary = self
                .storage
                .load(today)
                .await
                .with_context(|| format!("Failed to load record {path:?}"))?;
            println!("Reading summary from file: {}", path.display());
            info!(
                "Resuming {path:?} with {} applications",
                summary.len()
            );
            summary
        } else {
            println!("Start logging to file: {}", path.display());
            info!("Starting new record {path:?}");
            Summary::new()
        };

        if let Some(previous) = previous {
            info!("Day changed from {previous} to {today}");
        }

        self.state = SamplerState::Sampling(LiveDay {
            date: today,
            summary,
        });
        Ok(())
    }

    /// Asks the probe for the focused window. Failures are logged and reported as the unknown
    /// sample, which the validity check rejects.
    async fn sample(&mut self) -> ActiveWindowData {
        let timeout = self.config.probe_timeout;
        let result = match tokio::time::timeout(timeout, self.probe.sample()).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(timeout)),
        };

        result.unwrap_or_else(|e| {
            warn!("Window probe failed {e}");
            ActiveWindowData::unknown()
        })
    }

    /// Runs one sampling step: day check, probe, accumulate and persist.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        self.roll_over(self.clock.today()).await?;

        let sample = self.sample().await;
        if !is_valid_sample(&sample) {
            debug!("Dropping sample {sample:?}");
            return Ok(TickOutcome::Rejected);
        }

        let SamplerState::Sampling(day) = &mut self.state else {
            return Err(anyhow!("Sampler has no live summary after day check"));
        };

        day.summary.accumulate(
            &sample.app_name,
            &sample.title,
            self.config.period.as_secs_f64(),
        );
        recompute_total_time(&mut day.summary);

        match self.storage.save(day.date, &day.summary).await {
            Ok(()) => {
                debug!("Recorded {sample:?}");
                Ok(TickOutcome::Recorded)
            }
            Err(e) => {
                error!(
                    "Failed to save record {:?} {e:?}",
                    self.storage.record_path(day.date)
                );
                Ok(TickOutcome::SaveFailed)
            }
        }
    }

    /// Executes the sampling loop until the shutdown token is cancelled.
    pub async fn run(mut self) -> Result<()> {
        let mut schedule = Schedule::new(self.clock.instant(), self.config.period);
        loop {
            self.tick().await?;

            let wake = schedule.advance(self.clock.instant());
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Sampler stopped");
                    return Ok(())
                }
                _ = self.clock.sleep_until(wake) => ()
            }
        }
    }
}
