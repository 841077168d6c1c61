use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::RecordStore;
use crate::{error::Result, identity::VideoIdentity, types::CacheRecord};

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<VideoIdentity, CacheRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load(&self, identity: &VideoIdentity) -> Result<Option<CacheRecord>> {
        Ok(self.records.read().get(identity).cloned())
    }

    async fn save(&self, record: &CacheRecord) -> Result<()> {
        self.records
            .write()
            .insert(record.video_identity.clone(), record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.records.write().clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().len())
    }
}
