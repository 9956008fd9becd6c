use async_trait::async_trait;

use super::{command::run_tool, ActiveWindowData, ProbeError, WindowProbe, UNKNOWN};

const FRONTMOST_SCRIPT: &str = r#"
tell application "System Events"
    set frontApp to first application process whose frontmost is true
    set appName to name of frontApp
    set appPid to unix id of frontApp
    set windowTitle to ""
    try
        set windowTitle to name of window 1 of frontApp
    end try
end tell
return appName & linefeed & appPid & linefeed & windowTitle
"#;

/// macOS probe asking System Events for the frontmost application through `osascript`.
pub struct OsascriptProbe;

fn parse_output(output: &str) -> Result<ActiveWindowData, ProbeError> {
    let mut lines = output.lines();
    let (Some(app_name), Some(pid)) = (lines.next(), lines.next()) else {
        return Err(ProbeError::InvalidOutput(output.to_owned()));
    };
    let pid = pid
        .trim()
        .parse::<i64>()
        .map_err(|_| ProbeError::InvalidOutput(output.to_owned()))?;
    let title = match lines.next().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_owned(),
        _ => UNKNOWN.to_owned(),
    };

    Ok(ActiveWindowData {
        app_name: app_name.trim().to_owned(),
        pid,
        title,
    })
}

#[async_trait]
impl WindowProbe for OsascriptProbe {
    async fn sample(&mut self) -> Result<ActiveWindowData, ProbeError> {
        parse_output(&run_tool("osascript", &["-e", FRONTMOST_SCRIPT]).await?)
    }
}

#[cfg(test)]
mod tests {
    use crate::window_api::{ActiveWindowData, ProbeError};

    use super::parse_output;

    #[test]
    fn test_parse_output() {
        assert_eq!(
            parse_output("Safari\n312\nApple").ok(),
            Some(ActiveWindowData {
                app_name: "Safari".into(),
                pid: 312,
                title: "Apple".into(),
            })
        );
        assert_eq!(
            parse_output("Finder\n90").ok().map(|data| data.title),
            Some("Unknown".into())
        );
        assert!(matches!(parse_output("Finder"), Err(ProbeError::InvalidOutput(_))));
    }
}
