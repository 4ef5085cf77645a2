//! Source collection: the mandatory resume first, then every optional source
//! concurrently, merged into one read-only `BasicInformation`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::extraction::Extractor;
use crate::sources::Sources;

pub mod chunking;
pub mod github;
pub mod job_description;
pub mod linkedin;
pub mod models;
pub mod portfolio;
pub mod prompts;
pub mod resume;

pub use chunking::{BpeTokenizer, Tokenizer};
pub use job_description::collect_jd;
pub use models::{
    GithubRecord, JobDescriptionData, LinkSummaryRecord, LinkedinRecord, ResumeRecord,
    SourceError, SourceKind,
};
pub use portfolio::PortfolioSettings;

/// Everything a collector needs, cloned into each spawned task.
#[derive(Clone)]
pub struct CollectionContext {
    pub extractor: Arc<dyn Extractor>,
    pub sources: Sources,
    pub tokenizer: Arc<dyn Tokenizer>,
    pub portfolio: PortfolioSettings,
}

/// Where each source lives. Only the resume is mandatory.
#[derive(Debug, Clone, Default)]
pub struct SourceLocators {
    pub resume: String,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub other_link: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum OptionalSource {
    Linkedin,
    Github,
    Portfolio,
    OtherLink,
}

impl OptionalSource {
    fn kind(self) -> SourceKind {
        match self {
            OptionalSource::Linkedin => SourceKind::Linkedin,
            OptionalSource::Github => SourceKind::Github,
            OptionalSource::Portfolio => SourceKind::Portfolio,
            OptionalSource::OtherLink => SourceKind::OtherLink,
        }
    }
}

impl SourceLocators {
    fn optional(&self) -> Vec<(OptionalSource, String)> {
        [
            (OptionalSource::Linkedin, &self.linkedin),
            (OptionalSource::Github, &self.github),
            (OptionalSource::Portfolio, &self.portfolio),
            (OptionalSource::OtherLink, &self.other_link),
        ]
        .into_iter()
        .filter_map(|(kind, locator)| {
            locator
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| (kind, l.to_string()))
        })
        .collect()
    }
}

/// Merged snapshot of every source for one request. Sources that were not
/// supplied are present in their default form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasicInformation {
    pub resume: ResumeRecord,
    pub linkedin: LinkedinRecord,
    pub github: GithubRecord,
    pub portfolio: LinkSummaryRecord,
    pub other_link: LinkSummaryRecord,
}

impl BasicInformation {
    fn store(&mut self, collected: Collected) {
        match collected {
            Collected::Linkedin(record) => self.linkedin = record,
            Collected::Github(record) => self.github = record,
            Collected::Portfolio(record) => self.portfolio = record,
            Collected::OtherLink(record) => self.other_link = record,
        }
    }

    /// Leaves the source at its defaults, flagged with `error`.
    fn mark_failed(&mut self, error: SourceError) {
        match error.kind {
            SourceKind::Resume => self.resume.error = Some(error),
            SourceKind::Linkedin => self.linkedin.error = Some(error),
            SourceKind::Github => self.github.error = Some(error),
            SourceKind::Portfolio => self.portfolio.error = Some(error),
            SourceKind::OtherLink => self.other_link.error = Some(error),
            SourceKind::JobDescription => {}
        }
    }

    /// Every source that was attempted and came back degraded.
    pub fn errors(&self) -> Vec<SourceError> {
        [
            &self.resume.error,
            &self.linkedin.error,
            &self.github.error,
            &self.portfolio.error,
            &self.other_link.error,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect()
    }
}

/// Tokens consumed while collecting each source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceTokens {
    pub resume: u64,
    pub linkedin: u64,
    pub github: u64,
    pub portfolio: u64,
    pub other_link: u64,
}

impl SourceTokens {
    fn of(basic: &BasicInformation) -> Self {
        Self {
            resume: basic.resume.tokens,
            linkedin: basic.linkedin.tokens,
            github: basic.github.tokens,
            portfolio: basic.portfolio.tokens,
            other_link: basic.other_link.tokens,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectedSources {
    pub basic: BasicInformation,
    pub tokens: SourceTokens,
    /// The deadline passed before every collector finished.
    pub timed_out: bool,
    /// The deadline passed before the resume itself was collected.
    pub resume_timed_out: bool,
}

enum Collected {
    Linkedin(LinkedinRecord),
    Github(GithubRecord),
    Portfolio(LinkSummaryRecord),
    OtherLink(LinkSummaryRecord),
}

async fn collect_optional(ctx: CollectionContext, source: OptionalSource, locator: String) -> Collected {
    match source {
        OptionalSource::Linkedin => {
            Collected::Linkedin(linkedin::collect_linkedin(&ctx, &locator).await)
        }
        OptionalSource::Github => Collected::Github(github::collect_github(&ctx, &locator).await),
        OptionalSource::Portfolio => Collected::Portfolio(
            portfolio::collect_link(&ctx, SourceKind::Portfolio, &locator).await,
        ),
        OptionalSource::OtherLink => Collected::OtherLink(
            portfolio::collect_link(&ctx, SourceKind::OtherLink, &locator).await,
        ),
    }
}

fn task_failure(kind: SourceKind, e: &JoinError) -> SourceError {
    if e.is_panic() {
        SourceError::new(kind, "collector panicked")
    } else {
        SourceError::new(kind, "collector task was cancelled")
    }
}

/// Collects every supplied source, never failing: each source that cannot be
/// collected is left at its defaults with an error recorded. Work still in
/// flight at `deadline` is aborted.
pub async fn collect_sources(
    ctx: &CollectionContext,
    locators: &SourceLocators,
    deadline: Instant,
) -> CollectedSources {
    let mut basic = BasicInformation::default();
    let mut timed_out = false;
    let mut resume_timed_out = false;

    info!("Collecting resume");
    let resume_ctx = ctx.clone();
    let resume_path = locators.resume.clone();
    let mut resume_task =
        tokio::spawn(async move { resume::collect_resume(&resume_ctx, &resume_path).await });

    match tokio::time::timeout_at(deadline, &mut resume_task).await {
        Ok(Ok(record)) => basic.resume = record,
        Ok(Err(e)) => {
            error!(source = "resume", "Resume collector failed: {e}");
            basic.mark_failed(task_failure(SourceKind::Resume, &e));
        }
        Err(_) => {
            resume_task.abort();
            warn!(source = "resume", "Deadline passed while collecting resume");
            basic.mark_failed(SourceError::new(SourceKind::Resume, "deadline exceeded"));
            timed_out = true;
            resume_timed_out = true;
        }
    }

    let optional = locators.optional();
    let mut pending: HashMap<tokio::task::Id, SourceKind> = HashMap::new();
    let mut tasks = JoinSet::new();

    if !timed_out {
        for (source, locator) in optional {
            let handle = tasks.spawn(collect_optional(ctx.clone(), source, locator));
            pending.insert(handle.id(), source.kind());
        }
        if !pending.is_empty() {
            info!(sources = pending.len(), "Collecting optional sources");
        }
    } else {
        for (source, _) in optional {
            basic.mark_failed(SourceError::new(source.kind(), "deadline exceeded"));
        }
    }

    // Results are routed by task id; completion order does not matter.
    while !tasks.is_empty() {
        match tokio::time::timeout_at(deadline, tasks.join_next_with_id()).await {
            Ok(Some(Ok((id, collected)))) => {
                pending.remove(&id);
                basic.store(collected);
            }
            Ok(Some(Err(e))) => {
                if let Some(kind) = pending.remove(&e.id()) {
                    error!(source = kind.as_str(), "Collector task failed: {e}");
                    basic.mark_failed(task_failure(kind, &e));
                }
            }
            Ok(None) => break,
            Err(_) => {
                tasks.abort_all();
                timed_out = true;
                for kind in pending.drain().map(|(_, kind)| kind) {
                    warn!(source = kind.as_str(), "Deadline passed, collector aborted");
                    basic.mark_failed(SourceError::new(kind, "deadline exceeded"));
                }
                break;
            }
        }
    }

    let tokens = SourceTokens::of(&basic);
    info!(
        resume = tokens.resume,
        linkedin = tokens.linkedin,
        github = tokens.github,
        portfolio = tokens.portfolio,
        other_link = tokens.other_link,
        "Source collection finished"
    );

    CollectedSources {
        basic,
        tokens,
        timed_out,
        resume_timed_out,
    }
}
