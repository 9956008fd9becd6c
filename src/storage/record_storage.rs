use std::{
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use tokio::fs;
use tracing::{debug, warn};

use crate::{summary::Summary, utils::time::date_to_record_name};

use super::codec::{self, RecordError};

/// Interface for abstracting storage of day records.
pub trait RecordStorage {
    /// Location of the record for `date`.
    fn record_path(&self, date: NaiveDate) -> PathBuf;

    /// Whether a record for `date` has already been written.
    fn exists(&self, date: NaiveDate) -> impl Future<Output = Result<bool, RecordError>>;

    /// Reads the record for `date`. Totals are recomputed on read.
    fn load(&self, date: NaiveDate) -> impl Future<Output = Result<Summary, RecordError>>;

    /// Replaces the record for `date` with `summary`.
    fn save(
        &self,
        date: NaiveDate,
        summary: &Summary,
    ) -> impl Future<Output = Result<(), RecordError>>;
}

/// The main realization of [RecordStorage]: one file per local day in a single directory.
pub struct RecordStorageImpl {
    record_dir: PathBuf,
}

impl RecordStorageImpl {
    /// Creates `record_dir` if needed and drops temporary files left behind by an interrupted
    /// write, since every file in the directory is read as a record when merging.
    pub fn new(record_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&record_dir)?;
        remove_stale_temporaries(&record_dir)?;

        Ok(Self { record_dir })
    }

    pub fn record_dir(&self) -> &Path {
        &self.record_dir
    }
}

impl RecordStorage for RecordStorageImpl {
    fn record_path(&self, date: NaiveDate) -> PathBuf {
        self.record_dir.join(date_to_record_name(date))
    }

    async fn exists(&self, date: NaiveDate) -> Result<bool, RecordError> {
        Ok(fs::try_exists(self.record_path(date)).await?)
    }

    async fn load(&self, date: NaiveDate) -> Result<Summary, RecordError> {
        read_record(&self.record_path(date)).await
    }

    async fn save(&self, date: NaiveDate, summary: &Summary) -> Result<(), RecordError> {
        write_record(&self.record_path(date), summary).await
    }
}

const TEMPORARY_SUFFIX: &str = ".tmp";

fn temporary_path(path: &Path) -> PathBuf {
    let mut temporary = path.as_os_str().to_owned();
    temporary.push(TEMPORARY_SUFFIX);
    PathBuf::from(temporary)
}

fn remove_stale_temporaries(record_dir: &Path) -> Result<(), std::io::Error> {
    for entry in std::fs::read_dir(record_dir)? {
        let path = entry?.path();
        let is_temporary = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(TEMPORARY_SUFFIX));
        if is_temporary && path.is_file() {
            warn!("Removing unfinished record write {path:?}");
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Reads and decodes a single record file.
pub async fn read_record(path: &Path) -> Result<Summary, RecordError> {
    debug!("Reading record {path:?}");
    let bytes = fs::read(path).await?;
    let text = String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e.utf8_error()))?;
    codec::decode(&text)
}

/// Writes a record file in full. The content goes to a sibling temporary file first and is
/// then renamed over `path`, so readers never see a half written record.
pub async fn write_record(path: &Path, summary: &Summary) -> Result<(), RecordError> {
    let temporary = temporary_path(path);

    let written = match fs::write(&temporary, codec::encode(summary)).await {
        Ok(()) => fs::rename(&temporary, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        if let Err(remove_error) = fs::remove_file(&temporary).await {
            if remove_error.kind() != ErrorKind::NotFound {
                warn!("Failed to remove {temporary:?} {remove_error}");
            }
        }
        return Err(e.into());
    }
    debug!("Wrote {} entries to {path:?}", summary.entry_count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        storage::codec::RecordError,
        summary::{aggregate::recompute_total_time, Summary},
    };

    use super::{read_record, write_record, RecordStorage, RecordStorageImpl};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2018, 7, 4).unwrap();

    #[tokio::test]
    async fn test_record_storage_basic() -> Result<()> {
        let dir = tempdir()?;
        let storage = RecordStorageImpl::new(dir.path().to_owned())?;
        assert!(!storage.exists(TEST_DATE).await?);

        let mut summary = Summary::new();
        summary.accumulate("firefox", "Inbox", 3.);
        summary.accumulate("alacritty", "vim", 1.);
        recompute_total_time(&mut summary);

        storage.save(TEST_DATE, &summary).await?;

        assert!(storage.exists(TEST_DATE).await?);
        assert_eq!(
            storage.record_path(TEST_DATE),
            dir.path().join("wasted_time_04072018.csv")
        );
        assert_eq!(storage.load(TEST_DATE).await?, summary);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_storage_creates_directory() -> Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("a").join("b");
        let storage = RecordStorageImpl::new(nested.clone())?;
        assert_eq!(storage.record_dir(), nested);
        assert!(nested.is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn test_write_replaces_previous_content() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("record.csv");

        let mut summary = Summary::new();
        summary.accumulate("firefox", "Inbox", 3.);
        write_record(&path, &summary).await?;

        let mut summary = Summary::new();
        summary.accumulate("alacritty", "vim", 1.);
        write_record(&path, &summary).await?;

        let stored = read_record(&path).await?;
        assert!(stored.app("firefox").is_none());
        assert_eq!(stored.app("alacritty").unwrap().get("vim"), Some(1.));

        let files = std::fs::read_dir(dir.path())?.count();
        assert_eq!(files, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_no_temporary_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("record.csv");
        std::fs::create_dir(&path)?;

        let mut summary = Summary::new();
        summary.accumulate("firefox", "Inbox", 3.);
        assert!(write_record(&path, &summary).await.is_err());

        assert!(!dir.path().join("record.csv.tmp").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_new_removes_unfinished_writes() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(
            dir.path().join("wasted_time_04072018.csv"),
            "firefox,Inbox,100\n",
        )?;
        std::fs::write(
            dir.path().join("wasted_time_04072018.csv.tmp"),
            "firefox,Inbox,101\n",
        )?;
        std::fs::write(dir.path().join("notes.txt"), "kept\n")?;

        let storage = RecordStorageImpl::new(dir.path().to_owned())?;

        assert!(!dir.path().join("wasted_time_04072018.csv.tmp").exists());
        assert!(dir.path().join("notes.txt").exists());
        let stored = storage.load(TEST_DATE).await?;
        assert_eq!(stored.app("firefox").unwrap().get("Inbox"), Some(100.));
        Ok(())
    }

    #[tokio::test]
    async fn test_read_missing_record() -> Result<()> {
        let dir = tempdir()?;
        let result = read_record(&dir.path().join("missing.csv")).await;
        assert!(matches!(result, Err(RecordError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound));
        Ok(())
    }

    #[tokio::test]
    async fn test_read_rejects_invalid_utf8() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("binary.csv");
        std::fs::write(&path, [0xff, 0xfe, b',', b'\n'])?;
        assert!(matches!(read_record(&path).await, Err(RecordError::Io(_))));
        Ok(())
    }
}
