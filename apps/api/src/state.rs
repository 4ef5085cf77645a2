use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::EnrichmentPipeline;
use crate::scoring::AtsScorer;
use crate::sources::Source;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<EnrichmentPipeline>,
    /// Pluggable ATS scorer. Default: `LlmAtsScorer`.
    pub scorer: Arc<dyn AtsScorer>,
    /// Reads uploaded resumes for the scoring endpoints.
    pub documents: Arc<dyn Source<String>>,
    pub config: Config,
}
