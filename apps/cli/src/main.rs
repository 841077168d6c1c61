use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use vidtrans_core::{
    JsonDirStore, MemoryStore, RecordStore, TranslationCache, parse_time_to_seconds,
};

mod commands;

#[derive(Parser)]
#[command(name = "vidtrans")]
#[command(about = "Translate video subtitles through a processing backend")]
#[command(long_about = "Translate video subtitles through a processing backend, \
with a local per-video cache")]
struct Cli {
    /// Keep the translation cache in memory for this run only
    #[arg(long, global = true)]
    no_persist: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a video's subtitles, serving cached languages instantly
    Translate(TranslateArgs),

    /// Print the cache identity derived from a video URL
    Identity {
        /// Video page URL
        url: String,
    },

    /// Inspect or clear the translation cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show or change saved settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// List target languages
    Languages {
        /// Ask the backend instead of using the built-in list
        #[arg(long)]
        remote: bool,
    },

    /// Check that the backend is reachable
    Health,
}

#[derive(Args)]
struct TranslateArgs {
    /// Video page URL
    url: String,

    /// Target languages, comma separated (e.g. "es,fr"). Defaults to saved settings.
    #[arg(short, long, value_delimiter = ',')]
    lang: Vec<String>,

    /// Start of the range to translate (ss, mm:ss or h:mm:ss)
    #[arg(long, value_parser = parse_clock)]
    start: Option<f64>,

    /// End of the range to translate (ss, mm:ss or h:mm:ss)
    #[arg(long, value_parser = parse_clock)]
    end: Option<f64>,

    /// Ignore cached translations and ask the backend again
    #[arg(short, long)]
    force: bool,

    /// Only print the subtitle showing at this playback time
    #[arg(long, value_parser = parse_clock)]
    at: Option<f64>,

    /// Write one <lang>.srt file per language into this directory
    #[arg(long)]
    srt: Option<PathBuf>,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Number of cached videos (expired entries included)
    Count,
    /// Remove every cached video
    Clear,
    /// Show what is cached for a video
    Show {
        /// Video page URL
        url: String,
        /// Print this language's cached translation
        lang: Option<String>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    Set {
        #[arg(long)]
        api_key: Option<String>,

        #[arg(long)]
        backend_url: Option<String>,

        /// Comma separated language codes, in display order
        #[arg(long, value_delimiter = ',')]
        languages: Option<Vec<String>>,
    },
    /// Forget all saved settings
    Clear,
}

fn parse_clock(input: &str) -> std::result::Result<f64, String> {
    parse_time_to_seconds(input)
        .ok_or_else(|| format!("invalid time '{input}', expected ss, mm:ss or h:mm:ss"))
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vidtrans=warn,vidtrans_core=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn open_store(no_persist: bool) -> vidtrans_core::Result<Arc<dyn RecordStore>> {
    if no_persist {
        return Ok(Arc::new(MemoryStore::new()));
    }
    Ok(Arc::new(JsonDirStore::open_default().await?))
}

/// Cache for the translate path: a broken cache only costs the shortcut.
async fn open_cache_best_effort(no_persist: bool) -> Option<TranslationCache> {
    match open_store(no_persist).await {
        Ok(store) => Some(TranslationCache::new(store)),
        Err(e) => {
            warn!(error = %e, "translation cache unavailable");
            eprintln!(
                "{} cache unavailable, every language goes to the backend: {}",
                style("!").yellow().bold(),
                e
            );
            None
        }
    }
}

/// Cache for the cache subcommands, where it is the whole point.
async fn open_cache_required(no_persist: bool) -> Result<TranslationCache> {
    Ok(TranslationCache::new(open_store(no_persist).await?))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Translate(args) => {
            let cache = open_cache_best_effort(cli.no_persist).await;
            commands::translate(cache.as_ref(), args).await
        }
        Command::Identity { url } => {
            commands::identity(&url);
            Ok(())
        }
        Command::Cache { action } => {
            let cache = open_cache_required(cli.no_persist).await?;
            match action {
                CacheAction::Count => commands::cache_count(&cache).await,
                CacheAction::Clear => commands::cache_clear(&cache).await,
                CacheAction::Show { url, lang } => {
                    commands::cache_show(&cache, &url, lang.as_deref()).await
                }
            }
        }
        Command::Settings { action } => match action {
            SettingsAction::Show => commands::settings_show().await,
            SettingsAction::Set {
                api_key,
                backend_url,
                languages,
            } => {
                if languages
                    .as_ref()
                    .is_some_and(|langs| langs.iter().all(|l| l.trim().is_empty()))
                {
                    bail!("select at least one target language");
                }
                commands::settings_set(api_key, backend_url, languages).await
            }
            SettingsAction::Clear => commands::settings_clear().await,
        },
        Command::Languages { remote } => commands::languages(remote).await,
        Command::Health => commands::health().await,
    }
}
