//! Chunked batch pipeline: fetch every category, then brief it.
//!
//! Categories are split into fixed-size chunks in their configured order.
//! Chunks run one after another; inside a chunk every category's
//! fetch-then-brief task runs concurrently, and the whole chunk settles
//! before the next one starts. This caps concurrent LLM traffic at the chunk
//! size.
//!
//! A task failure is logged and drops that category's contribution; sibling
//! tasks and later chunks still run. Each category writes to its own key in
//! the [`BuildArtifact`], so results never collide.

use crate::api::AskAsync;
use crate::briefing::generate_briefing;
use crate::models::{BuildArtifact, Category, Item};
use crate::scrapers::{fetch_category, FetchContext};
use chrono::{DateTime, Local};
use futures::future::join_all;
use std::error::Error;
use std::future::Future;
use tracing::{debug, error, info, instrument};

/// The two per-category steps the pipeline drives.
pub trait SourceStage {
    async fn fetch(&self, category: Category) -> Result<Vec<Item>, Box<dyn Error>>;

    async fn brief(
        &self,
        category: Category,
        items: &[Item],
    ) -> Result<Option<String>, Box<dyn Error>>;
}

/// What one category contributed to the build.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub items: Vec<Item>,
    pub briefing: Option<String>,
}

/// Split `keys` into consecutive chunks of at most `size` (minimum 1).
pub fn chunk_plan<T>(keys: &[T], size: usize) -> Vec<&[T]> {
    keys.chunks(size.max(1)).collect()
}

/// Run `work` for every key, one chunk at a time, returning results in key order.
pub async fn run_chunked<T, F, Fut, R>(keys: &[T], size: usize, work: F) -> Vec<(T, R)>
where
    T: Copy,
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    let plan = chunk_plan(keys, size);
    let chunk_count = plan.len();
    let mut results = Vec::with_capacity(keys.len());

    for (index, chunk) in plan.into_iter().enumerate() {
        debug!(chunk = index + 1, of = chunk_count, size = chunk.len(), "Starting chunk");
        let settled = join_all(chunk.iter().map(|&key| {
            let fut = work(key);
            async move { (key, fut.await) }
        }))
        .await;
        results.extend(settled);
    }
    results
}

async fn process_source<S: SourceStage>(
    stage: &S,
    category: Category,
) -> Result<SourceOutcome, Box<dyn Error>> {
    let items = stage.fetch(category).await?;
    if items.is_empty() {
        info!(%category, "No items after filtering; skipping briefing");
        return Ok(SourceOutcome { items, briefing: None });
    }
    let briefing = stage.brief(category, &items).await?;
    Ok(SourceOutcome { items, briefing })
}

/// Drive every category through fetch and briefing and collect the artifact.
#[instrument(level = "info", skip(stage, categories), fields(categories = categories.len()))]
pub async fn run_pipeline<S: SourceStage>(
    stage: &S,
    categories: &[Category],
    batch_size: usize,
    generated_at: DateTime<Local>,
) -> BuildArtifact {
    let mut artifact = BuildArtifact::new(generated_at);
    let outcomes =
        run_chunked(categories, batch_size, |category| process_source(stage, category)).await;

    for (category, outcome) in outcomes {
        match outcome {
            Ok(SourceOutcome { items, briefing }) => {
                info!(
                    %category,
                    count = items.len(),
                    briefed = briefing.is_some(),
                    "Source complete"
                );
                artifact.results.insert(category, items);
                if let Some(text) = briefing {
                    artifact.briefings.insert(category, text);
                }
            }
            Err(e) => {
                error!(%category, error = %e, "Source failed; leaving it out of the build");
            }
        }
    }

    info!(
        sources = artifact.results.len(),
        briefings = artifact.briefings.len(),
        items = artifact.total_items(),
        "Pipeline finished"
    );
    artifact
}

/// Production stage: real fetchers plus the briefing LLM.
pub struct LiveStage<'a, C, B> {
    ctx: FetchContext<'a, C>,
    briefer: Option<&'a B>,
}

impl<'a, C, B> LiveStage<'a, C, B> {
    pub fn new(ctx: FetchContext<'a, C>, briefer: Option<&'a B>) -> Self {
        Self { ctx, briefer }
    }
}

impl<C, B> SourceStage for LiveStage<'_, C, B>
where
    C: AskAsync,
    B: AskAsync,
{
    async fn fetch(&self, category: Category) -> Result<Vec<Item>, Box<dyn Error>> {
        Ok(fetch_category(&self.ctx, category).await)
    }

    async fn brief(
        &self,
        category: Category,
        items: &[Item],
    ) -> Result<Option<String>, Box<dyn Error>> {
        Ok(generate_briefing(
            self.briefer,
            category.label(),
            items,
            self.ctx.config.limits.briefing_top_n,
            self.ctx.translator.target_language(),
        )
        .await)
    }
}
