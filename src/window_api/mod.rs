//! Contains logic for finding out what the user is looking at in different environments.
//! [GenericWindowProbe] is the main artifact of this module that abstracts
//! the operations. The backend is picked once, when the probe is created.

#[cfg(any(target_os = "linux", target_os = "macos"))]
mod command;
#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(feature = "win")]
pub mod win;
#[cfg(feature = "x11")]
pub mod x11;
#[cfg(target_os = "linux")]
pub mod xdotool;

#[cfg(feature = "win")]
extern crate windows;

#[cfg(feature = "x11")]
extern crate xcb;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// Value reported when the application or the title can't be determined.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveWindowData {
    /// Short name of the focused application. For example 'firefox' or 'alacritty'
    pub app_name: String,
    /// Process identifier of the focused application. Zero or negative when unknown.
    pub pid: i64,
    /// Name of the window. For example 'bash in hello' or 'Document 1' or 'Vibing in YouTube -
    /// Chrome'
    pub title: String,
}

impl ActiveWindowData {
    /// Sample used when nothing is focused or the probe failed.
    pub fn unknown() -> Self {
        Self {
            app_name: UNKNOWN.into(),
            pid: -1,
            title: UNKNOWN.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("active window detection is not supported on this platform")]
    Unsupported,
    #[error("required tool `{tool}` is not installed")]
    ToolMissing { tool: String },
    #[error("`{command}` failed: {message}")]
    CommandFailed { command: String, message: String },
    #[error("probe did not answer within {0:?}")]
    Timeout(std::time::Duration),
    #[error("unexpected probe output: {0}")]
    InvalidOutput(String),
    #[error("platform call failed: {0}")]
    Platform(String),
}

/// Intended to serve as a contract every supported platform must implement.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WindowProbe: Send {
    /// Reports the focused application, its process id and the focused window title.
    async fn sample(&mut self) -> Result<ActiveWindowData, ProbeError>;
}

/// Probe used where no backend exists. Every sample fails with [ProbeError::Unsupported].
pub struct UnsupportedProbe;

#[async_trait]
impl WindowProbe for UnsupportedProbe {
    async fn sample(&mut self) -> Result<ActiveWindowData, ProbeError> {
        Err(ProbeError::Unsupported)
    }
}

/// Serves as a cross-compatible WindowProbe implementation.
pub struct GenericWindowProbe {
    inner: Box<dyn WindowProbe>,
}

impl GenericWindowProbe {
    pub fn new() -> anyhow::Result<Self> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "win")] {
                Ok(Self {
                    inner: Box::new(win::WindowsProbe::new()),
                })
            } else if #[cfg(feature = "x11")] {
                Ok(Self {
                    inner: Box::new(x11::X11Probe::new()?),
                })
            } else if #[cfg(target_os = "linux")] {
                Ok(Self {
                    inner: Box::new(xdotool::XdotoolProbe::new()),
                })
            } else if #[cfg(target_os = "macos")] {
                Ok(Self {
                    inner: Box::new(macos::OsascriptProbe),
                })
            } else {
                tracing::warn!("No window probe available, every sample will be dropped");
                Ok(Self {
                    inner: Box::new(UnsupportedProbe),
                })
            }
        }
    }
}

#[async_trait]
impl WindowProbe for GenericWindowProbe {
    async fn sample(&mut self) -> Result<ActiveWindowData, ProbeError> {
        self.inner.sample().await
    }
}
