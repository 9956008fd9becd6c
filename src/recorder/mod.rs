//! Record mode: samples the focused window once per period and keeps today's record file up
//! to date.

use std::path::PathBuf;

use anyhow::Result;
use sampler::{Sampler, SamplerConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    storage::record_storage::RecordStorageImpl,
    utils::clock::{Clock, DefaultClock},
    window_api::{GenericWindowProbe, WindowProbe},
};

pub mod sample;
pub mod sampler;
pub mod shutdown;

/// Represents the starting point for record mode. Runs until Ctrl-C or a fatal error.
pub async fn start_recorder(record_dir: PathBuf, config: SamplerConfig) -> Result<()> {
    let probe = GenericWindowProbe::new()?;
    let shutdown_token = CancellationToken::new();

    info!("Recording into {record_dir:?} every {:?}", config.period);
    let sampler = create_sampler(record_dir, probe, &shutdown_token, DefaultClock, config)?;

    let (_, result) = tokio::join!(shutdown::detect_shutdown(shutdown_token.clone()), async {
        let result = sampler.run().await;
        shutdown_token.cancel();
        result
    });

    result.inspect_err(|e| error!("Sampler stopped with an error {e:?}"))
}

fn create_sampler(
    record_dir: PathBuf,
    probe: impl WindowProbe + 'static,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
    config: SamplerConfig,
) -> Result<Sampler<RecordStorageImpl>> {
    let storage = RecordStorageImpl::new(record_dir)?;
    Ok(Sampler::new(
        Box::new(probe),
        storage,
        Box::new(clock),
        config,
        shutdown_token.clone(),
    ))
}

#[cfg(test)]
mod recorder_tests {
    use std::time::Duration;

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Local, NaiveDate, TimeZone};
    use tempfile::tempdir;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    use crate::{
        recorder::{create_sampler, sampler::SamplerConfig},
        storage::record_storage::{RecordStorage, RecordStorageImpl},
        utils::clock::Clock,
        window_api::{ActiveWindowData, MockWindowProbe},
    };

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2018, 7, 4).unwrap();

    struct FixedClock;

    #[async_trait]
    impl Clock for FixedClock {
        fn time(&self) -> DateTime<Local> {
            Local
                .from_local_datetime(&TEST_DATE.and_hms_opt(12, 0, 0).unwrap())
                .single()
                .unwrap()
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    #[tokio::test]
    async fn test_create_sampler_records_into_directory() -> Result<()> {
        let dir = tempdir()?;
        let record_dir = dir.path().join("records");
        let mut probe = MockWindowProbe::new();
        probe.expect_sample().returning(|| {
            Ok(ActiveWindowData {
                app_name: "firefox".into(),
                pid: 7,
                title: "Inbox".into(),
            })
        });

        let shutdown = CancellationToken::new();
        let mut sampler = create_sampler(
            record_dir.clone(),
            probe,
            &shutdown,
            FixedClock,
            SamplerConfig {
                period: Duration::from_millis(500),
                probe_timeout: Duration::from_millis(500),
            },
        )?;
        sampler.tick().await?;

        let storage = RecordStorageImpl::new(record_dir)?;
        let stored = storage.load(TEST_DATE).await?;
        assert_eq!(stored.app("firefox").and_then(|a| a.get("Inbox")), Some(0.5));
        Ok(())
    }
}
