//! Portfolio and other-link collector.
//!
//! Pages within the token budget get one direct summary (retried with backoff).
//! Longer pages are chunked, each chunk summarized in turn with a pause between
//! calls, and the chunk summaries combined by one final extraction.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::chunking::chunk_text;
use super::models::{LinkSummaryRecord, PortfolioAnalysis, SourceError, SourceKind};
use super::prompts::{PORTFOLIO_CHUNK_SYSTEM, PORTFOLIO_SUMMARY_SYSTEM};
use super::CollectionContext;
use crate::extraction::{extract_step, AgentRole, Extraction};

const DIRECT_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct PortfolioSettings {
    /// Pages above this many tokens are chunked.
    pub token_budget: usize,
    pub chunk_tokens: usize,
    /// Pause between consecutive chunk summaries.
    pub chunk_delay: Duration,
    /// First retry delay of the direct path; doubles per attempt.
    pub retry_backoff: Duration,
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        Self {
            token_budget: 8000,
            chunk_tokens: 7000,
            chunk_delay: Duration::from_millis(500),
            retry_backoff: Duration::from_secs(1),
        }
    }
}

pub async fn collect_link(ctx: &CollectionContext, kind: SourceKind, url: &str) -> LinkSummaryRecord {
    let Some(text) = ctx.sources.web.fetch(url).await else {
        warn!(source = kind.as_str(), "Page unavailable");
        return LinkSummaryRecord {
            error: Some(SourceError::unavailable(kind)),
            ..LinkSummaryRecord::default()
        };
    };

    let settings = &ctx.portfolio;
    let token_count = ctx.tokenizer.count(&text);
    debug!(source = kind.as_str(), token_count, "Page text fetched");

    let record = if token_count > settings.token_budget {
        summarize_in_chunks(ctx, kind, &text).await
    } else {
        summarize_directly(ctx, kind, &text).await
    };

    info!(source = kind.as_str(), tokens = record.tokens, "Page collected");
    record
}

async fn summarize_directly(ctx: &CollectionContext, kind: SourceKind, text: &str) -> LinkSummaryRecord {
    let mut tokens = 0;
    let mut last_error = None;

    for attempt in 0..DIRECT_ATTEMPTS {
        if attempt > 0 {
            let delay = ctx.portfolio.retry_backoff * (1 << (attempt - 1));
            warn!(
                source = kind.as_str(),
                "Summary attempt {attempt} failed, retrying after {}ms",
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let analysis = summarize(ctx, text).await;
        tokens += analysis.tokens;
        match analysis.outcome {
            Ok(analysis) => {
                return LinkSummaryRecord {
                    summary: analysis.summary_of_portfolio,
                    tokens,
                    error: None,
                }
            }
            Err(e) => last_error = Some(e),
        }
    }

    LinkSummaryRecord {
        summary: String::new(),
        tokens,
        error: last_error.map(|e| SourceError::new(kind, e.to_string())),
    }
}

async fn summarize_in_chunks(ctx: &CollectionContext, kind: SourceKind, text: &str) -> LinkSummaryRecord {
    let chunks = chunk_text(text, ctx.portfolio.chunk_tokens, ctx.tokenizer.as_ref());
    let total = chunks.len();
    info!(source = kind.as_str(), chunks = total, "Page over budget, summarizing in chunks");

    let mut tokens = 0;
    let mut summaries = Vec::with_capacity(total);

    for (index, chunk) in chunks.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(ctx.portfolio.chunk_delay).await;
        }

        let input = format!("Section {} of {total}:\n\n{chunk}", index + 1);
        let summary = ctx
            .extractor
            .complete(AgentRole::PortfolioChunk, PORTFOLIO_CHUNK_SYSTEM, &input)
            .await;
        tokens += summary.tokens;

        match summary.outcome {
            Ok(text) => summaries.push(text),
            Err(e) => warn!(source = kind.as_str(), chunk = index + 1, "Chunk summary failed: {e}"),
        }
    }

    if summaries.is_empty() {
        return LinkSummaryRecord {
            summary: String::new(),
            tokens,
            error: Some(SourceError::new(kind, "every chunk summary failed")),
        };
    }

    let combined = summarize(ctx, &summaries.join("\n\n")).await;
    tokens += combined.tokens;

    match combined.outcome {
        Ok(analysis) => LinkSummaryRecord {
            summary: analysis.summary_of_portfolio,
            tokens,
            error: None,
        },
        Err(e) => LinkSummaryRecord {
            summary: String::new(),
            tokens,
            error: Some(SourceError::new(kind, e.to_string())),
        },
    }
}

async fn summarize(ctx: &CollectionContext, text: &str) -> Extraction<PortfolioAnalysis> {
    extract_step::<PortfolioAnalysis>(
        ctx.extractor.as_ref(),
        AgentRole::PortfolioSummary,
        PORTFOLIO_SUMMARY_SYSTEM,
        text,
    )
    .await
}
