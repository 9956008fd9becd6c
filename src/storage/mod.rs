//!  Storage is organized through [record_storage::RecordStorageImpl].
//!  The basic idea is:
//!   - There is a directory with all the records.
//!   - Every record holds the [Summary](crate::summary::Summary) of one local day.
//!   - A record is rewritten in full every time it changes.

pub mod codec;
pub mod record_storage;
