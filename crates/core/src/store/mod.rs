//! Keyed persistence for [`CacheRecord`]s.
//!
//! The cache only needs point lookup, point upsert, full clear and a key count,
//! so any backend offering those four operations can sit behind [`RecordStore`].

mod fs;
mod memory;

use async_trait::async_trait;

pub use fs::JsonDirStore;
pub use memory::MemoryStore;

use crate::{error::Result, identity::VideoIdentity, types::CacheRecord};

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn load(&self, identity: &VideoIdentity) -> Result<Option<CacheRecord>>;

    /// Upsert the record under its own `video_identity`.
    async fn save(&self, record: &CacheRecord) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    async fn count(&self) -> Result<usize>;
}
