//! Video-identity-keyed translation cache.
//!
//! One [`CacheRecord`] per video holds independent entries per language. An
//! entry stops being served once it is [`RETENTION`] old; stale entries stay on
//! disk until they are overwritten or the whole cache is cleared.

use std::{path::PathBuf, sync::Arc, time::Duration};

use tracing::debug;

use crate::{
    clock::{Clock, SystemClock},
    error::Result,
    identity::{VideoIdentity, derive_identity},
    locks::KeyedLocks,
    store::RecordStore,
    types::{CacheRecord, CachedTranslation, LanguageEntry, Segment},
};

/// How long a cached language entry stays valid.
pub const RETENTION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("vidtrans")
}

/// Directory holding one JSON file per cached video.
pub fn get_translations_dir() -> PathBuf {
    get_root_cache_dir().join("translations")
}

pub struct TranslationCache {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    writers: KeyedLocks<VideoIdentity>,
    retention: Duration,
}

impl TranslationCache {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            writers: KeyedLocks::new(),
            retention: RETENTION,
        }
    }

    /// Cached segments for `url` in `lang`, or `None` when absent or expired.
    pub async fn get(&self, url: &str, lang: &str) -> Result<Option<CachedTranslation>> {
        let identity = derive_identity(url);
        let Some(record) = self.store.load(&identity).await? else {
            debug!(%identity, lang, "cache miss (no record)");
            return Ok(None);
        };
        let Some(entry) = record.languages.get(lang) else {
            debug!(%identity, lang, "cache miss (no language entry)");
            return Ok(None);
        };
        if !self.is_fresh(entry) {
            debug!(%identity, lang, "cache miss (expired)");
            return Ok(None);
        }

        debug!(%identity, lang, "cache hit");
        Ok(Some(CachedTranslation {
            original: entry.original.clone(),
            translation: entry.translation.clone(),
        }))
    }

    /// Store segments for `url` in `lang`, keeping other languages of the same video.
    pub async fn put(
        &self,
        url: &str,
        lang: &str,
        original: Vec<Segment>,
        translation: Vec<Segment>,
    ) -> Result<()> {
        let identity = derive_identity(url);
        let _writer = self.writers.lock(&identity).await;

        let now = self.clock.now_millis();
        let mut record = match self.store.load(&identity).await? {
            Some(mut existing) => {
                existing.video_url = url.to_string();
                existing
            }
            None => CacheRecord::new(identity.clone(), url, now),
        };
        record.languages.insert(
            lang.to_string(),
            LanguageEntry {
                original,
                translation,
                timestamp: now,
            },
        );

        self.store.save(&record).await?;
        debug!(%identity, lang, languages = record.languages.len(), "cache write");
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }

    /// Raw number of stored videos, expired entries included.
    pub async fn count(&self) -> Result<usize> {
        self.store.count().await
    }

    /// Full record for the video behind `url`, without expiry filtering.
    pub async fn record(&self, url: &str) -> Result<Option<CacheRecord>> {
        self.store.load(&derive_identity(url)).await
    }

    /// Milliseconds since `timestamp`; future timestamps count as zero.
    pub fn age_millis(&self, timestamp: u64) -> u64 {
        self.clock.now_millis().saturating_sub(timestamp)
    }

    /// Whether `get` would still serve this entry.
    pub fn is_fresh(&self, entry: &LanguageEntry) -> bool {
        u128::from(self.age_millis(entry.timestamp)) < self.retention.as_millis()
    }
}
