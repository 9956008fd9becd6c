
use std::path::Path;

use async_trait::async_trait;
use tracing::{error, instrument};
use windows::{
    core::PWSTR,
    Win32::{
        Foundation::{CloseHandle, BOOL, HANDLE, HWND},
        System::Threading::{
            OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
            PROCESS_QUERY_LIMITED_INFORMATION,
        },
        UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowTextW, GetWindowThreadProcessId},
    },
};

use super::{ActiveWindowData, ProbeError, WindowProbe, UNKNOWN};

fn platform_error(context: &str, e: windows::core::Error) -> ProbeError {
    ProbeError::Platform(format!("{context}: {e}"))
}

#[instrument]
pub fn get_active() -> Result<ActiveWindowData, ProbeError> {
    let window = unsafe { GetForegroundWindow() };

    if window.is_invalid() {
        // Happens while the desktop or a lock screen has focus.
        return Ok(ActiveWindowData::unknown());
    }

    let mut pid = 0u32;
    unsafe { GetWindowThreadProcessId(window, Some(&mut pid)) };
    if pid == 0 {
        return Err(platform_error(
            "failed to get window process",
            windows::core::Error::from_win32(),
        ));
    }

    let mut text: [u16; 4096] = [0; 4096];
    let title = unsafe { get_window_title(window, &mut text) };

    let process_handle =
        unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, BOOL::from(false), pid) }
            .map_err(|e| platform_error("failed to open process", e))?;

    let image = unsafe { get_window_process_path(process_handle, &mut text) };

    unsafe { CloseHandle(process_handle) }
        .inspect_err(|e| error!("Failed to close handle {e:?}"))
        .map_err(|e| platform_error("failed to close process handle", e))?;

    let app_name = Path::new(&image?)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNKNOWN.into());

    Ok(ActiveWindowData {
        app_name,
        pid: pid.into(),
        title,
    })
}

unsafe fn get_window_process_path(
    process_handle: HANDLE,
    text: &mut [u16],
) -> Result<String, ProbeError> {
    unsafe {
        let mut length = text.len() as u32;
        QueryFullProcessImageNameW(
            process_handle,
            PROCESS_NAME_WIN32,
            PWSTR(text.as_mut_ptr()),
            &mut length,
        )
        .map_err(|e| platform_error("failed to get process image name", e))?;
        Ok(String::from_utf16_lossy(&text[..length as usize]))
    }
}

unsafe fn get_window_title(window_handle: HWND, text: &mut [u16]) -> String {
    let len = unsafe { GetWindowTextW(window_handle, text) };
    String::from_utf16_lossy(&text[..len.max(0) as usize])
}

pub struct WindowsProbe {}

impl WindowsProbe {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for WindowsProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WindowProbe for WindowsProbe {
    async fn sample(&mut self) -> Result<ActiveWindowData, ProbeError> {
        get_active()
    }
}
