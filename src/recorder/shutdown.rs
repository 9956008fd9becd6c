use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancels `cancelation` once the process receives Ctrl-C. Returns early when something else
/// cancels it first. Any other way of stopping the recorder is external termination, which
/// the continuously rewritten record survives.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => {
                info!("Received Ctrl-C, stopping");
                cancelation.cancel();
            }
            Err(e) => {
                error!("Failed to listen for Ctrl-C {e:?}");
                cancelation.cancelled().await;
            }
        },
        _ = cancelation.cancelled() => (),
    };
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use super::detect_shutdown;

    #[tokio::test]
    async fn test_returns_when_cancelled_elsewhere() {
        let token = CancellationToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), detect_shutdown(token))
            .await
            .expect("detect_shutdown should return once the token is cancelled");
    }
}
