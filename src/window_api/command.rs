use std::io::ErrorKind;

use tokio::process::Command;
use tracing::trace;

use super::ProbeError;

/// Runs an external tool and returns its trimmed stdout. The child is killed if the returned
/// future is dropped, which is how the sampler's timeout stops a hanging tool.
pub(super) async fn run_tool(program: &str, args: &[&str]) -> Result<String, ProbeError> {
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => ProbeError::ToolMissing {
                tool: program.to_owned(),
            },
            _ => ProbeError::CommandFailed {
                command: program.to_owned(),
                message: e.to_string(),
            },
        })?;

    if !output.status.success() {
        return Err(ProbeError::CommandFailed {
            command: format!("{program} {}", args.join(" ")),
            message: format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    trace!("{program} {args:?} -> {stdout:?}");
    Ok(stdout)
}
