//! # AI Pulse
//!
//! A daily AI-news digest. Polls Hacker News and a set of RSS/Atom feeds,
//! keeps AI-related items, scores and translates them, asks an LLM for a
//! short briefing per category, and writes a static site.
//!
//! ## Usage
//!
//! ```sh
//! DEEPSEEK_API_KEY=sk-... ai_pulse -o ./dist
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: Each category's sources are fetched, filtered by keyword
//!    and scored ([`scrapers`])
//! 2. **Enrichment**: Titles and snippets are translated, and each category
//!    gets a briefing; categories run three at a time ([`pipeline`])
//! 3. **Output**: The daily page, the `index.html` shell and `history.json`
//!    are written to the output directory ([`outputs`])
//!
//! Without an API key the build still runs; translation and briefings are
//! simply skipped.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod briefing;
mod cli;
mod config;
mod http;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod translate;
mod utils;

#[cfg(test)]
mod test_support;

use api::{ChatClient, RetryAsk};
use cli::Cli;
use config::AppConfig;
use http::HttpFetcher;
use outputs::html::{render_report, ReportOptions};
use outputs::{indexes, json, shell};
use pipeline::{run_pipeline, LiveStage};
use scrapers::relevance::KeywordFilter;
use scrapers::FetchContext;
use translate::Translator;
use utils::{daily_filename, ensure_writable_dir};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ai_pulse starting up");

    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env file");
    }

    // Parse CLI
    let args = Cli::parse();
    debug!(output_dir = %args.output_dir.display(), config = ?args.config, "Parsed CLI arguments");

    let config = AppConfig::load(args.config.as_deref())?;
    info!(
        categories = config.categories.len(),
        keywords = config.keywords.len(),
        "Configuration ready"
    );

    // Early check: the build is pointless if nothing can be written
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Clients ----
    let http = HttpFetcher::new(&config.http)?;
    let (translate_client, briefing_client) = match args.api_key() {
        Some(key) => {
            let llm = &config.llm;
            let translate = ChatClient::new(
                http.client().clone(),
                llm,
                key,
                &llm.translate_model,
                std::time::Duration::from_secs(llm.translate_timeout_secs),
            );
            let briefing = ChatClient::new(
                http.client().clone(),
                llm,
                key,
                &llm.briefing_model,
                std::time::Duration::from_secs(llm.briefing_timeout_secs),
            );
            info!(
                translate_model = translate.model(),
                briefing_model = briefing.model(),
                "LLM features enabled"
            );
            (Some(translate), Some(RetryAsk::new(briefing, http.policy())))
        }
        None => {
            warn!("DEEPSEEK_API_KEY not set; skipping translation and briefings");
            (None, None)
        }
    };

    let translator = Translator::new(translate_client, config.llm.target_language.as_str());
    let keyword_filter = KeywordFilter::new(&config.keywords);
    let ctx = FetchContext {
        http: &http,
        translator: &translator,
        config: &config,
        filter: &keyword_filter,
    };
    let stage = LiveStage::new(ctx, briefing_client.as_ref());

    // ---- Fetch, translate, brief ----
    let artifact = run_pipeline(
        &stage,
        &config.categories,
        config.limits.batch_size,
        Local::now(),
    )
    .await;

    // ---- Daily page ----
    let daily_file = daily_filename(artifact.generated_at.date_naive());
    let page = render_report(&artifact, &config.categories, ReportOptions::from(&config.limits));
    let daily_path = args.output_dir.join(&daily_file);
    fs::write(&daily_path, page).await?;
    info!(path = %daily_path.display(), items = artifact.total_items(), "Wrote daily report");

    // ---- History & shell ----
    let existing = indexes::scan_history(&args.output_dir).await?;
    let history = indexes::merge_history(existing, &daily_file);

    if let Err(e) = json::write_history(&args.output_dir, &history).await {
        error!(error = %e, "Failed to write history.json");
    }

    let index_path = args.output_dir.join("index.html");
    fs::write(&index_path, shell::render_shell(&history, artifact.generated_at)).await?;
    info!(path = %index_path.display(), days = history.len(), "Wrote shell page");

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
