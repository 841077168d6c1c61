//! vidtrans Core Library
//!
//! Resolves video URLs to stable identities, caches per-language transcripts
//! and translations under those identities, and fetches misses from the
//! video processing backend.

pub mod backend;
pub mod cache;
pub mod clock;
pub mod error;
pub mod format;
pub mod identity;
pub mod languages;
pub mod locks;
pub mod settings;
pub mod store;
pub mod translate;
pub mod types;

// Re-export commonly used items at crate root
pub use backend::{BackendClient, VideoProcessor};
pub use cache::{RETENTION, TranslationCache, get_root_cache_dir, get_translations_dir};
pub use clock::{Clock, SystemClock};
pub use error::{Result, VidtransError};
pub use format::{
    active_segment, format_segment_range, format_timestamp, format_transcript_with_timestamps,
    parse_time_to_seconds, to_srt,
};
pub use identity::{Platform, VideoIdentity, derive_identity, stable_hash};
pub use languages::{SUPPORTED_LANGUAGES, language_name, supported_languages};
pub use settings::{Settings, SettingsPatch, SettingsStore};
pub use store::{JsonDirStore, MemoryStore, RecordStore};
pub use translate::{LanguageTranslation, TranslateOutcome, TranslateRequest, translate_video};
pub use types::{
    CacheRecord, CachedTranslation, Language, LanguageEntry, ProcessVideoRequest,
    ProcessVideoResponse, Segment,
};
