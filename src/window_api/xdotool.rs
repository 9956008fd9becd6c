use async_trait::async_trait;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::instrument;

use super::{command::run_tool, ActiveWindowData, ProbeError, WindowProbe, UNKNOWN};

/// Linux probe built on the `xdotool` command line tool. Works on any X11 session without
/// linking against X libraries.
pub struct XdotoolProbe {
    system: System,
}

impl XdotoolProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    fn process_name(&mut self, pid: u32) -> Option<String> {
        let pid = Pid::from_u32(pid);
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        self.system
            .process(pid)
            .map(|process| process.name().to_string_lossy().into_owned())
    }
}

impl Default for XdotoolProbe {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_pid(output: &str) -> Result<i64, ProbeError> {
    output
        .parse::<i64>()
        .map_err(|_| ProbeError::InvalidOutput(format!("expected a process id, got {output:?}")))
}

#[async_trait]
impl WindowProbe for XdotoolProbe {
    #[instrument(skip(self))]
    async fn sample(&mut self) -> Result<ActiveWindowData, ProbeError> {
        let pid = parse_pid(&run_tool("xdotool", &["getactivewindow", "getwindowpid"]).await?)?;
        let title = run_tool("xdotool", &["getwindowfocus", "getwindowname"]).await?;

        let app_name = u32::try_from(pid)
            .ok()
            .filter(|pid| *pid > 0)
            .and_then(|pid| self.process_name(pid))
            .unwrap_or_else(|| UNKNOWN.into());

        Ok(ActiveWindowData {
            app_name,
            pid,
            title,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::window_api::ProbeError;

    use super::{parse_pid, XdotoolProbe};

    #[test]
    fn test_parse_pid() {
        assert_eq!(parse_pid("4242").ok(), Some(4242));
        assert!(matches!(parse_pid(""), Err(ProbeError::InvalidOutput(_))));
        assert!(matches!(parse_pid("abc"), Err(ProbeError::InvalidOutput(_))));
    }

    #[test]
    fn test_process_name_of_current_process() {
        let mut probe = XdotoolProbe::new();
        let name = probe.process_name(std::process::id());
        assert!(name.is_some_and(|name| !name.is_empty()));
    }
}
