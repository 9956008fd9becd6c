use crate::window_api::{ActiveWindowData, UNKNOWN};

fn is_known(value: &str) -> bool {
    !value.is_empty() && value != UNKNOWN
}

/// Whether a probe sample may be counted. The process id must be positive, and neither the
/// application nor the title may be empty or unknown.
pub fn is_valid_sample(sample: &ActiveWindowData) -> bool {
    sample.pid > 0 && is_known(&sample.title) && is_known(&sample.app_name)
}
