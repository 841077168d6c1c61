use std::{
    fmt::Write as _,
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use super::RecordStore;
use crate::{
    cache::get_translations_dir,
    error::{Result, VidtransError},
    identity::VideoIdentity,
    types::CacheRecord,
};

const RECORD_EXT: &str = "json";

/// Longest stem kept verbatim; leaves room for the extension and the temp suffix.
const MAX_STEM_LEN: usize = 200;

/// One JSON file per video identity inside a cache directory.
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Open (or create) the store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|source| VidtransError::StorageUnavailable {
                path: root.clone(),
                source,
            })?;
        info!(path = %root.display(), "translation cache opened");
        Ok(Self { root })
    }

    /// Open the store in the user's cache directory.
    pub async fn open_default() -> Result<Self> {
        Self::open(get_translations_dir()).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, identity: &VideoIdentity) -> PathBuf {
        self.root
            .join(format!("{}.{}", file_stem(identity.as_str()), RECORD_EXT))
    }

    async fn record_files(&self) -> Result<Vec<PathBuf>> {
        let unavailable = |source| VidtransError::StorageUnavailable {
            path: self.root.clone(),
            source,
        };
        let mut entries = fs::read_dir(&self.root).await.map_err(unavailable)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == RECORD_EXT) {
                files.push(path);
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl RecordStore for JsonDirStore {
    async fn load(&self, identity: &VideoIdentity) -> Result<Option<CacheRecord>> {
        let path = self.record_path(identity);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(VidtransError::StorageUnavailable { path, source }),
        };
        let record = serde_json::from_slice(&bytes)
            .map_err(|source| VidtransError::CorruptRecord { path, source })?;
        Ok(Some(record))
    }

    async fn save(&self, record: &CacheRecord) -> Result<()> {
        let path = self.record_path(&record.video_identity);
        let write_failed = |source| VidtransError::StorageWriteFailed {
            path: path.clone(),
            source,
        };

        let bytes = serde_json::to_vec(record).map_err(|e| write_failed(io::Error::other(e)))?;

        // Write-then-rename so readers never see a half-written record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await.map_err(write_failed)?;
        if let Err(source) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(write_failed(source));
        }

        debug!(identity = %record.video_identity, bytes = bytes.len(), "record saved");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let files = self.record_files().await?;
        for path in &files {
            match fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(VidtransError::StorageWriteFailed {
                        path: path.clone(),
                        source,
                    });
                }
            }
        }
        info!(removed = files.len(), "translation cache cleared");
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.record_files().await?.len())
    }
}

/// File-system safe stem for an identity.
///
/// Uppercase letters become `^` + lowercase so IDs differing only in case stay
/// distinct on case-insensitive file systems. Anything outside `[a-z0-9_-]` is
/// percent-encoded byte by byte. Stems longer than [`MAX_STEM_LEN`] are cut and
/// suffixed with a digest of the whole identity.
fn file_stem(identity: &str) -> String {
    let stem = escape(identity);
    if stem.len() <= MAX_STEM_LEN {
        return stem;
    }
    let digest = format!("~{:016x}", fnv1a64(identity.as_bytes()));
    // Escaped stems are pure ASCII, so any byte index is a char boundary.
    let mut short = stem[..MAX_STEM_LEN - digest.len()].to_string();
    short.push_str(&digest);
    short
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325_u64, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

fn escape(identity: &str) -> String {
    let mut stem = String::with_capacity(identity.len());
    for ch in identity.chars() {
        match ch {
            'a'..='z' | '0'..='9' | '_' | '-' => stem.push(ch),
            'A'..='Z' => {
                stem.push('^');
                stem.push(ch.to_ascii_lowercase());
            }
            _ => {
                let mut buf = [0u8; 4];
                for byte in ch.encode_utf8(&mut buf).bytes() {
                    let _ = write!(stem, "%{byte:02X}");
                }
            }
        }
    }
    stem
}
