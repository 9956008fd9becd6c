use anyhow::Result;
use tracing::error;
use wasted_time::cli::run_cli;


fn main() -> Result<()> {
    run_cli().inspect_err(|e| {
        error!("Error running wasted-time {e:?}");
    })?;
    Ok(())
}
