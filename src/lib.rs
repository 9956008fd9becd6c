//! Records how much time is spent in every application and window title. One record file is
//! kept per local day and rewritten every second, and any set of records can later be merged
//! into one report.
//!

pub mod cli;
pub mod merge;
pub mod recorder;
pub mod storage;
pub mod summary;
pub mod utils;
pub mod window_api;
