//! Port for durable storage of cache pools.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{CachePool, PoolKind};

/// Errors from the pool backing store.
#[derive(Debug, Error)]
pub enum PoolStoreError {
    /// Reading or writing the backing file failed.
    #[error("io error on {} pool at {}: {source}", kind, path.display())]
    Io {
        /// Pool being accessed.
        kind: PoolKind,
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Reads and writes the three cache pools.
#[async_trait]
pub trait PoolStorePort: Send + Sync {
    /// Loads a pool, creating an empty backing file if none exists.
    async fn load(&self, kind: PoolKind) -> Result<CachePool, PoolStoreError>;

    /// Overwrites the backing file with the pool contents.
    async fn save(&self, kind: PoolKind, pool: &CachePool) -> Result<(), PoolStoreError>;
}
