pub mod session;
pub mod storage;
pub mod supabase;

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::port::PortRecord;

pub use session::{Session, SessionUser};
pub use storage::StorageService;
pub use supabase::SupabaseClient;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The backend answered with a failure. The message is shown as is.
    #[error("{0}")]
    Rejected(String),

    #[error("Could not reach the backend: {0}")]
    Unreachable(String),
}

/// Row persistence for finished ports.
pub trait PortStore {
    fn insert_ports(&self, table: &str, records: &[PortRecord]) -> Result<(), StoreError>;
}

impl<T: PortStore + ?Sized> PortStore for &T {
    fn insert_ports(&self, table: &str, records: &[PortRecord]) -> Result<(), StoreError> {
        (**self).insert_ports(table, records)
    }
}

/// Raw object storage. Session checks and key layout live in [`StorageService`].
pub trait ObjectStore {
    /// Store `bytes` under `key` and return the stored object's path.
    fn put_object(
        &self,
        user: &SessionUser,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StoreError>;

    fn remove_object(
        &self,
        user: &SessionUser,
        bucket: &str,
        path: &str,
    ) -> Result<(), StoreError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn put_object(
        &self,
        user: &SessionUser,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StoreError> {
        (**self).put_object(user, bucket, key, bytes, content_type)
    }

    fn remove_object(
        &self,
        user: &SessionUser,
        bucket: &str,
        path: &str,
    ) -> Result<(), StoreError> {
        (**self).remove_object(user, bucket, path)
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        (**self).public_url(bucket, path)
    }
}

/// Source of upload timestamps.
pub trait Clock {
    fn now_millis(&self) -> u128;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    }
}
