use std::{env, io, path::PathBuf};

use anyhow::{anyhow, Result};

const RECORD_DIR_NAME: &str = "wasted_time";

/// `$HOME/wasted_time`, or `%USERPROFILE%\wasted_time` on Windows.
pub fn default_record_dir() -> Result<PathBuf> {
    let home = {
        #[cfg(windows)]
        {
            env::var_os("USERPROFILE")
        }
        #[cfg(not(windows))]
        {
            env::var_os("HOME")
        }
    };

    let mut path = home
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("Couldn't find the home directory to store records in"))?;
    path.push(RECORD_DIR_NAME);
    Ok(path)
}

pub fn create_application_dir(path: PathBuf) -> Result<PathBuf> {
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
