//! One enrichment request end to end: collect every source (and the job
//! description, when given), then fan out the eight field aggregators over the
//! merged snapshot. Collection gets its own, shorter deadline so a stalled
//! optional source cannot starve aggregation; the request deadline bounds both.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregation::{self, AgentInputs, AnalysisResults, BatchSettings};
use crate::collection::{
    collect_jd, collect_sources, CollectionContext, JobDescriptionData,
    PortfolioSettings, SourceError, SourceKind, SourceLocators, Tokenizer,
};
use crate::extraction::Extractor;
use crate::rewrite::{self, RewriteResults};
use crate::sources::Sources;

pub mod ledger;

pub use ledger::{LedgerCategory, LedgerEntry, TokenLedger, TokenSummary};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub batch_size: usize,
    pub batch_pause: Duration,
    pub request_timeout: Duration,
    /// Budget for source and job description collection, capped at `request_timeout`.
    pub collection_timeout: Duration,
    pub portfolio_token_budget: usize,
    pub portfolio_chunk_tokens: usize,
    pub portfolio_chunk_delay: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            batch_size: 4,
            batch_pause: Duration::from_secs(1),
            request_timeout: Duration::from_secs(240),
            collection_timeout: Duration::from_secs(150),
            portfolio_token_budget: 8000,
            portfolio_chunk_tokens: 7000,
            portfolio_chunk_delay: Duration::from_millis(500),
        }
    }
}

impl PipelineSettings {
    pub fn portfolio(&self) -> PortfolioSettings {
        PortfolioSettings {
            token_budget: self.portfolio_token_budget,
            chunk_tokens: self.portfolio_chunk_tokens,
            chunk_delay: self.portfolio_chunk_delay,
            ..PortfolioSettings::default()
        }
    }

    fn collection_budget(&self) -> Duration {
        self.collection_timeout.min(self.request_timeout)
    }

    pub fn batching(&self) -> BatchSettings {
        BatchSettings {
            batch_size: self.batch_size,
            batch_pause: self.batch_pause,
        }
    }
}

/// Request lifecycle. Stages only move forward; every request reaches `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Pending,
    Collecting,
    Aggregating,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Pending => "pending",
            Stage::Collecting => "collecting",
            Stage::Aggregating => "aggregating",
            Stage::Done => "done",
        }
    }
}

struct StageTracker {
    request_id: Uuid,
    stage: Stage,
}

impl StageTracker {
    fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            stage: Stage::Pending,
        }
    }

    fn advance(&mut self, next: Stage) {
        if next <= self.stage {
            warn!(
                request_id = %self.request_id,
                from = self.stage.as_str(),
                to = next.as_str(),
                "Ignoring backwards stage transition"
            );
            return;
        }
        info!(
            request_id = %self.request_id,
            from = self.stage.as_str(),
            to = next.as_str(),
            "Stage transition"
        );
        self.stage = next;
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnrichmentRequest {
    pub locators: SourceLocators,
    /// Present only in the ATS flow.
    pub job_description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EnrichmentReport {
    pub request_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub stage: Stage,
    pub analysis: AnalysisResults,
    pub job_description: Option<JobDescriptionData>,
    pub source_errors: Vec<SourceError>,
    pub ledger: TokenLedger,
    pub timed_out: bool,
}

impl EnrichmentReport {
    /// Tokens of the eight field calls only, the figure clients know as
    /// `total_tokens_consumed`.
    pub fn analysis_tokens(&self) -> u64 {
        self.ledger.total_for(LedgerCategory::Analysis)
    }

    pub fn tokens(&self) -> TokenSummary {
        self.ledger.summary()
    }
}

/// Outcome of one LinkedIn rewrite request.
#[derive(Debug, Clone)]
pub struct RewriteReport {
    pub request_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub stage: Stage,
    pub rewrite: RewriteResults,
    pub ledger: TokenLedger,
}

pub struct EnrichmentPipeline {
    extractor: Arc<dyn Extractor>,
    sources: Sources,
    tokenizer: Arc<dyn Tokenizer>,
    settings: PipelineSettings,
}

impl EnrichmentPipeline {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        sources: Sources,
        tokenizer: Arc<dyn Tokenizer>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            extractor,
            sources,
            tokenizer,
            settings,
        }
    }

    fn collection_context(&self) -> CollectionContext {
        CollectionContext {
            extractor: self.extractor.clone(),
            sources: self.sources.clone(),
            tokenizer: self.tokenizer.clone(),
            portfolio: self.settings.portfolio(),
        }
    }

    async fn job_description(&self, text: Option<&str>, deadline: Instant) -> Option<JobDescriptionData> {
        let text = text?;
        match tokio::time::timeout_at(deadline, collect_jd(self.extractor.as_ref(), text)).await {
            Ok(jd) => Some(jd),
            Err(_) => {
                warn!(source = "job_description", "Deadline passed while parsing job description");
                Some(JobDescriptionData {
                    error: Some(SourceError::new(SourceKind::JobDescription, "deadline exceeded")),
                    ..JobDescriptionData::default()
                })
            }
        }
    }

    /// Runs one request to completion. Never fails: degraded sources and
    /// fields show up as errors and `null` payloads in the report.
    pub async fn enrich(&self, request: EnrichmentRequest) -> EnrichmentReport {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        let deadline = started + self.settings.request_timeout;
        let collection_deadline = started + self.settings.collection_budget();
        let mut stage = StageTracker::new(request_id);
        let mut ledger = TokenLedger::default();

        stage.advance(Stage::Collecting);
        let ctx = self.collection_context();
        let (collected, jd) = tokio::join!(
            collect_sources(&ctx, &request.locators, collection_deadline),
            self.job_description(request.job_description.as_deref(), collection_deadline),
        );

        ledger.record_sources(&collected.tokens);
        if let Some(jd) = &jd {
            ledger.record_job_description(jd);
        }

        let mut source_errors = collected.basic.errors();
        if let Some(error) = jd.as_ref().and_then(|jd| jd.error.clone()) {
            source_errors.push(error);
        }

        stage.advance(Stage::Aggregating);
        // Sources that missed the collection deadline are already flagged; only
        // a missing resume leaves nothing worth aggregating.
        let analysis = if collected.resume_timed_out || Instant::now() >= deadline {
            warn!(request_id = %request_id, "No time left for field aggregation");
            AnalysisResults::expired()
        } else {
            let inputs = AgentInputs {
                extractor: self.extractor.clone(),
                basic: Arc::new(collected.basic),
                jd: jd.clone().map(Arc::new),
            };
            aggregation::run_all(&inputs, &self.settings.batching(), deadline).await
        };
        ledger.record_fields(&analysis);

        stage.advance(Stage::Done);
        let timed_out = collected.timed_out || analysis.timed_out;
        let tokens = ledger.summary();
        info!(
            request_id = %request_id,
            collection_tokens = tokens.collection_tokens,
            jd_tokens = tokens.jd_tokens,
            analysis_tokens = tokens.analysis_tokens,
            grand_total = tokens.grand_total,
            timed_out,
            "Enrichment finished"
        );

        EnrichmentReport {
            request_id,
            completed_at: Utc::now(),
            stage: stage.stage,
            analysis,
            job_description: jd,
            source_errors,
            ledger,
            timed_out,
        }
    }

    /// Rewrites an already-read LinkedIn export section by section under the
    /// request deadline. Never fails.
    pub async fn rewrite_linkedin(&self, profile_text: &str) -> RewriteReport {
        let request_id = Uuid::new_v4();
        let deadline = Instant::now() + self.settings.request_timeout;
        let mut stage = StageTracker::new(request_id);
        let mut ledger = TokenLedger::default();

        stage.advance(Stage::Aggregating);
        let rewrite =
            rewrite::rewrite_all(self.extractor.clone(), Arc::from(profile_text), deadline).await;
        ledger.record_rewrite(&rewrite);

        stage.advance(Stage::Done);
        info!(
            request_id = %request_id,
            rewrite_tokens = rewrite.total_tokens,
            timed_out = rewrite.timed_out,
            "LinkedIn rewrite request finished"
        );

        RewriteReport {
            request_id,
            completed_at: Utc::now(),
            stage: stage.stage,
            rewrite,
            ledger,
        }
    }
}
