//! Cache-first translation flow.
//!
//! Every requested language is looked up in the cache; the misses are sent to
//! the backend in a single request and written back afterwards. Cache failures
//! only cost the shortcut: they are logged and the backend is used instead.

use tracing::{debug, info, warn};

use crate::{
    backend::VideoProcessor,
    cache::TranslationCache,
    error::{Result, VidtransError},
    settings::{Settings, dedup_languages},
    types::{CachedTranslation, ProcessVideoRequest, Segment},
};

#[derive(Debug, Clone, Default)]
pub struct TranslateRequest {
    pub url: String,
    /// Falls back to the selected languages in settings when empty.
    pub languages: Vec<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    /// Skip cache lookups; results are still written back.
    pub force: bool,
}

impl TranslateRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    fn has_time_range(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageTranslation {
    pub language: String,
    pub segments: Vec<Segment>,
    pub cached: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslateOutcome {
    pub original: Vec<Segment>,
    /// In request order.
    pub translations: Vec<LanguageTranslation>,
    pub backend_called: bool,
}

impl TranslateOutcome {
    pub fn any_cached(&self) -> bool {
        self.translations.iter().any(|t| t.cached)
    }

    pub fn get(&self, language: &str) -> Option<&LanguageTranslation> {
        self.translations.iter().find(|t| t.language == language)
    }
}

pub async fn translate_video(
    cache: Option<&TranslationCache>,
    processor: &dyn VideoProcessor,
    settings: &Settings,
    request: TranslateRequest,
) -> Result<TranslateOutcome> {
    if settings.api_key.is_empty() {
        return Err(VidtransError::MissingApiKey);
    }
    let languages = if request.languages.is_empty() {
        settings.selected_languages.clone()
    } else {
        dedup_languages(request.languages.clone())
    };
    if languages.is_empty() {
        return Err(VidtransError::NoLanguages);
    }

    // A partial transcript must never be served or stored under the whole-video key.
    let use_cache = cache.filter(|_| !request.has_time_range());

    let mut hits: Vec<(String, CachedTranslation)> = Vec::new();
    let mut misses: Vec<String> = Vec::new();
    for lang in &languages {
        let lookup = match use_cache {
            Some(cache) if !request.force => cache.get(&request.url, lang).await,
            _ => Ok(None),
        };
        match lookup {
            Ok(Some(hit)) => hits.push((lang.clone(), hit)),
            Ok(None) => misses.push(lang.clone()),
            Err(e) => {
                warn!(error = %e, lang = %lang, "cache lookup failed, treating as miss");
                misses.push(lang.clone());
            }
        }
    }

    if misses.is_empty() {
        info!(url = %request.url, "all languages served from cache");
        let original = hits
            .first()
            .map(|(_, hit)| hit.original.clone())
            .unwrap_or_default();
        let translations = hits
            .into_iter()
            .map(|(language, hit)| LanguageTranslation {
                language,
                segments: hit.translation,
                cached: true,
            })
            .collect();
        return Ok(TranslateOutcome {
            original,
            translations,
            backend_called: false,
        });
    }

    debug!(hits = hits.len(), misses = ?misses, "calling backend for cache misses");
    let response = processor
        .process_video(&ProcessVideoRequest {
            video_url: request.url.clone(),
            target_languages: misses.clone(),
            api_key: settings.api_key.clone(),
            start_time: request.start_time,
            end_time: request.end_time,
        })
        .await?;

    let mut fetched = response.translations;
    for lang in &misses {
        let Some(translation) = fetched.get(lang) else {
            warn!(lang = %lang, "backend response is missing a requested language");
            continue;
        };
        if let Some(cache) = use_cache {
            if let Err(e) = cache
                .put(&request.url, lang, response.original.clone(), translation.clone())
                .await
            {
                warn!(error = %e, lang = %lang, "cache write failed");
            }
        }
    }

    let translations = languages
        .iter()
        .filter_map(|lang| {
            if let Some((_, hit)) = hits.iter().find(|(l, _)| l == lang) {
                return Some(LanguageTranslation {
                    language: lang.clone(),
                    segments: hit.translation.clone(),
                    cached: true,
                });
            }
            fetched.remove(lang).map(|segments| LanguageTranslation {
                language: lang.clone(),
                segments,
                cached: false,
            })
        })
        .collect();

    Ok(TranslateOutcome {
        original: response.original,
        translations,
        backend_called: true,
    })
}
