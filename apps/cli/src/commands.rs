use anyhow::{Context, Result};
use console::style;
use tokio::fs;

use vidtrans_core::{
    BackendClient, LanguageTranslation, SettingsPatch, SettingsStore, TranslateRequest,
    TranslationCache, active_segment, derive_identity, format_segment_range, format_timestamp,
    format_transcript_with_timestamps, language_name, supported_languages, to_srt,
    translate_video,
};

use crate::{TranslateArgs, create_spinner};

fn check() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}

fn rule() {
    println!("{}", style("─".repeat(60)).dim());
}

fn language_label(code: &str) -> String {
    match language_name(code) {
        Some(name) => format!("{} ({})", code.to_uppercase(), name),
        None => code.to_uppercase(),
    }
}

pub async fn translate(cache: Option<&TranslationCache>, args: TranslateArgs) -> Result<()> {
    let settings = SettingsStore::open_default().get_settings().await?;
    let backend = BackendClient::new(&settings.backend_url);

    println!(
        "\n{}  {}\n",
        style("vidtrans").cyan().bold(),
        style("Video Translator").dim()
    );

    let identity = derive_identity(&args.url);
    println!(
        "{} Video: {} {}",
        check(),
        style(&identity).yellow(),
        style(identity.platform().map(|p| p.name()).unwrap_or_default()).dim()
    );

    let request = TranslateRequest {
        url: args.url.clone(),
        languages: args.lang.clone(),
        start_time: args.start,
        end_time: args.end,
        force: args.force,
    };

    let spinner = create_spinner("Processing video... this may take a few minutes");
    let outcome = match translate_video(cache, &backend, &settings, request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    let cached = outcome.translations.iter().filter(|t| t.cached).count();
    let languages: Vec<_> = outcome
        .translations
        .iter()
        .map(|t| t.language.as_str())
        .collect();
    let source = if outcome.backend_called {
        format!("{} from cache", cached)
    } else {
        "all from cache".to_string()
    };
    spinner.finish_with_message(format!(
        "{} Translated: {} {}",
        check(),
        languages.join(", "),
        style(format!("({source})")).dim()
    ));

    if let Some(dir) = &args.srt {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
        for translation in &outcome.translations {
            let path = dir.join(format!("{}.srt", translation.language));
            fs::write(&path, to_srt(&translation.segments))
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            println!("{} Saved: {}", check(), style(path.display()).cyan());
        }
    }

    rule();
    match args.at {
        Some(time) => print_active(&outcome.translations, time),
        None => print_transcripts(&outcome.translations),
    }

    Ok(())
}

fn print_transcripts(translations: &[LanguageTranslation]) {
    for translation in translations {
        let marker = if translation.cached { " (cached)" } else { "" };
        println!(
            "\n{}{}\n",
            style(language_label(&translation.language)).cyan().bold(),
            style(marker).dim()
        );
        println!("{}", format_transcript_with_timestamps(&translation.segments));
    }
}

fn print_active(translations: &[LanguageTranslation], time: f64) {
    println!("At {}\n", style(format_timestamp(time)).yellow());
    for translation in translations {
        let label = style(translation.language.to_uppercase()).cyan().bold();
        match active_segment(&translation.segments, time) {
            Some(i) => {
                let seg = &translation.segments[i];
                println!(
                    "{}  {}  {}",
                    label,
                    style(format_segment_range(seg)).dim(),
                    seg.text.trim()
                );
            }
            None => println!("{}  {}", label, style("(no subtitle)").dim()),
        }
    }
}

pub fn identity(url: &str) {
    let identity = derive_identity(url);
    println!("{}", identity);
}

pub async fn cache_count(cache: &TranslationCache) -> Result<()> {
    let count = cache.count().await?;
    println!("{} cached video{}", count, if count == 1 { "" } else { "s" });
    Ok(())
}

pub async fn cache_clear(cache: &TranslationCache) -> Result<()> {
    cache.clear().await?;
    println!("{} Cache cleared", check());
    Ok(())
}

pub async fn cache_show(cache: &TranslationCache, url: &str, lang: Option<&str>) -> Result<()> {
    let identity = derive_identity(url);
    let Some(record) = cache.record(url).await? else {
        println!("Nothing cached for {}", style(&identity).yellow());
        return Ok(());
    };

    println!(
        "{}  {}",
        style(&record.video_identity).yellow().bold(),
        record.video_url
    );
    println!("cached {} ago", format_age(cache.age_millis(record.cached_at)));
    for (code, entry) in &record.languages {
        let age = cache.age_millis(entry.timestamp);
        let state = if cache.is_fresh(entry) {
            style("fresh").green()
        } else {
            style("expired").red()
        };
        println!(
            "  {:<28} {:>4} segments  {} ago  {}",
            language_label(code),
            entry.translation.len(),
            format_age(age),
            state
        );
    }

    if let Some(lang) = lang {
        rule();
        match cache.get(url, lang).await? {
            Some(hit) => println!("{}", format_transcript_with_timestamps(&hit.translation)),
            None => println!("No fresh {} translation", language_label(lang)),
        }
    }
    Ok(())
}

fn format_age(ms: u64) -> String {
    let secs = ms / 1000;
    match secs {
        s if s < 60 => format!("{}s", s),
        s if s < 3600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3600),
        s => format!("{}d", s / 86_400),
    }
}

fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }
    let visible: String = key.chars().take(4).collect();
    format!("{}…", visible)
}

pub async fn settings_show() -> Result<()> {
    let store = SettingsStore::open_default();
    let settings = store.get_settings().await?;
    println!("{}", style(store.path().display()).dim());
    println!("api key      {}", mask_key(&settings.api_key));
    println!("backend url  {}", settings.backend_url);
    let languages: Vec<_> = settings
        .selected_languages
        .iter()
        .map(|code| language_label(code))
        .collect();
    println!("languages    {}", languages.join(", "));
    Ok(())
}

pub async fn settings_set(
    api_key: Option<String>,
    backend_url: Option<String>,
    selected_languages: Option<Vec<String>>,
) -> Result<()> {
    let store = SettingsStore::open_default();
    store
        .save_settings(SettingsPatch {
            api_key,
            backend_url,
            selected_languages,
        })
        .await?;
    println!("{} Settings saved", check());
    settings_show().await
}

pub async fn settings_clear() -> Result<()> {
    SettingsStore::open_default().clear().await?;
    println!("{} Settings reset to defaults", check());
    Ok(())
}

pub async fn languages(remote: bool) -> Result<()> {
    let languages = if remote {
        let settings = SettingsStore::open_default().get_settings().await?;
        BackendClient::new(&settings.backend_url).languages().await?
    } else {
        supported_languages()
    };
    for language in languages {
        println!("{:<4} {}", language.code, language.name);
    }
    Ok(())
}

pub async fn health() -> Result<()> {
    let settings = SettingsStore::open_default().get_settings().await?;
    let backend = BackendClient::new(&settings.backend_url);
    if backend.health().await? {
        println!("{} {} is healthy", check(), backend.base_url());
    } else {
        println!(
            "{} {} answered but is not healthy",
            style("✗").red().bold(),
            backend.base_url()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ages_are_humanized() {
        assert_eq!(format_age(5_000), "5s");
        assert_eq!(format_age(120_000), "2m");
        assert_eq!(format_age(7_200_000), "2h");
        assert_eq!(format_age(3 * 86_400_000), "3d");
    }

    #[test]
    fn api_keys_are_masked() {
        assert_eq!(mask_key(""), "(not set)");
        assert_eq!(mask_key("sk-abcdef"), "sk-a…");
    }

    #[test]
    fn labels_include_known_names() {
        assert_eq!(language_label("fr"), "FR (French)");
        assert_eq!(language_label("xx"), "XX");
    }
}
