//! Merge mode: folds every record in a directory into one combined record.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use crate::{
    storage::{
        codec::RecordError,
        record_storage::{read_record, write_record},
    },
    summary::{aggregate::combine, total_time_key, Summary},
    utils::time::format_hms,
};

pub const MERGED_RECORD_NAME: &str = "wasted_time_merged.csv";

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Folder not found '{}'", .0.display())]
    SourceNotFound(PathBuf),
    #[error("failed to list '{}': {source}", .path.display())]
    ListSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read record '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: RecordError,
    },
    #[error("failed to write merged record '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: RecordError,
    },
}

/// Where merged records go unless another path is given.
pub fn default_output_path() -> PathBuf {
    std::env::temp_dir().join(MERGED_RECORD_NAME)
}

/// Regular files directly inside `source`, in path order.
async fn list_records(source: &Path) -> Result<Vec<PathBuf>, MergeError> {
    let list_error = |source_error| MergeError::ListSource {
        path: source.to_owned(),
        source: source_error,
    };

    match fs::metadata(source).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(MergeError::SourceNotFound(source.to_owned()))
        }
        Err(e) => return Err(list_error(e)),
    }

    let mut entries = fs::read_dir(source).await.map_err(list_error)?;
    let mut records = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
        let path = entry.path();
        if fs::metadata(&path).await.map_err(list_error)?.is_file() {
            records.push(path);
        } else {
            debug!("Skipping {path:?}, not a file");
        }
    }
    records.sort();
    Ok(records)
}

/// Reads every file in `source` and combines them. Any file that isn't a valid record aborts
/// the whole merge.
pub async fn merge_directory(source: &Path) -> Result<Summary, MergeError> {
    let mut total = Summary::new();
    for path in list_records(source).await? {
        let summary = read_record(&path).await.map_err(|source| MergeError::Read {
            path: path.clone(),
            source,
        })?;
        info!("Merging {path:?} with {} applications", summary.len());
        total = combine(&total, &summary);
    }
    Ok(total)
}

/// Merges `source` and writes the result to `output`, replacing any earlier merge.
pub async fn run_merge(source: &Path, output: &Path) -> Result<Summary, MergeError> {
    let merged = merge_directory(source).await?;
    write_record(output, &merged)
        .await
        .map_err(|source| MergeError::Write {
            path: output.to_owned(),
            source,
        })?;
    Ok(merged)
}

/// One line per application, `HH:MM:SS<tab>name`, longest first.
pub fn format_report(summary: &Summary) -> String {
    let mut totals = summary
        .apps()
        .map(|(app_name, record)| {
            let total = record
                .get(&total_time_key(app_name))
                .unwrap_or_else(|| record.sum());
            (app_name, total)
        })
        .collect::<Vec<_>>();
    totals.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    totals
        .into_iter()
        .map(|(app_name, total)| format!("{}\t{app_name}\n", format_hms(total)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use tempfile::tempdir;

    use crate::{
        storage::record_storage::{read_record, RecordStorageImpl},
        summary::{aggregate::recompute_total_time, Summary},
    };

    use super::{format_report, merge_directory, run_merge, MergeError};

    #[tokio::test]
    async fn test_missing_source() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let result = merge_directory(&missing).await;
        assert!(matches!(result, Err(MergeError::SourceNotFound(path)) if path == missing));
    }

    #[tokio::test]
    async fn test_merge_directory() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("wasted_time_04072018.csv"),
            "application,title,time\n\
             firefox,Inbox,5\n\
             firefox,News,3\n\
             firefox,firefox total time,8\n",
        )?;
        fs::write(
            dir.path().join("wasted_time_05072018.csv"),
            "application,title,time\n\
             firefox,Inbox,8\n\
             firefox,firefox total time,8\n\
             alacritty,vim,2\n",
        )?;
        fs::create_dir(dir.path().join("logs"))?;

        let merged = merge_directory(dir.path()).await?;

        let firefox = merged.app("firefox").unwrap();
        assert_eq!(firefox.get("Inbox"), Some(13.));
        assert_eq!(firefox.get("News"), Some(3.));
        assert_eq!(firefox.get("firefox total time"), Some(16.));
        assert_eq!(
            merged.app("alacritty").unwrap().get("alacritty total time"),
            Some(2.)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_directory() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(merge_directory(dir.path()).await?, Summary::new());
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_file_aborts_merge() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.csv"), "firefox,Inbox,5\n")?;
        fs::write(dir.path().join("notes.txt"), "just some notes\n")?;

        let result = merge_directory(dir.path()).await;
        assert!(matches!(
            result,
            Err(MergeError::Read { path, .. }) if path == dir.path().join("notes.txt")
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_unfinished_write_is_not_merged_after_restart() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("wasted_time_04072018.csv"),
            "firefox,Inbox,100\n",
        )?;
        fs::write(
            dir.path().join("wasted_time_04072018.csv.tmp"),
            "firefox,Inbox,101\n",
        )?;

        RecordStorageImpl::new(dir.path().to_owned())?;
        let merged = merge_directory(dir.path()).await?;

        assert_eq!(merged.app("firefox").unwrap().get("Inbox"), Some(100.));
        Ok(())
    }

    #[tokio::test]
    async fn test_run_merge_overwrites_output() -> Result<()> {
        let source = tempdir()?;
        let out = tempdir()?;
        let output = out.path().join("merged.csv");
        fs::write(&output, "stale content that is not a record\n")?;
        fs::write(source.path().join("a.csv"), "firefox,Inbox,5\n")?;

        let merged = run_merge(source.path(), &output).await?;

        assert_eq!(read_record(&output).await?, merged);
        Ok(())
    }

    #[test]
    fn test_format_report() {
        let mut summary = Summary::new();
        summary.accumulate("firefox", "Inbox", 3725.);
        summary.accumulate("alacritty", "vim", 59.);
        summary.accumulate("alacritty", "htop", 2.);
        summary.accumulate("code", "main.rs", 3725.);
        recompute_total_time(&mut summary);

        assert_eq!(
            format_report(&summary),
            "01:02:05\tcode\n01:02:05\tfirefox\n00:01:01\talacritty\n"
        );
    }
}
