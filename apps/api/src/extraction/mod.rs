//! Extraction Call — the uniform capability every collector and aggregator composes.
//!
//! One call = one structured-output request to the model provider. Every call
//! reports the tokens it consumed, including on the failure path (0 when the
//! provider was never reached). Callers never see a panic or an `Err` from here:
//! failure is encoded in `Extraction::outcome`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::llm_client::prompts;

#[cfg(test)]
pub mod testing;

/// Every kind of model call the enricher makes. Closed set: each role has one
/// fixed output schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    ResumeProfile,
    ResumeExperience,
    LinkedinBasicInfo,
    LinkedinExperience,
    LinkedinEducation,
    LinkedinCertificationsLanguages,
    LinkedinProjects,
    GithubProfile,
    PortfolioChunk,
    PortfolioSummary,
    JobDescription,
    FieldBasicInformation,
    FieldExperience,
    FieldEducation,
    FieldSkills,
    FieldLanguages,
    FieldProjects,
    FieldCertifications,
    FieldAchievements,
    AtsScore,
    AtsScoreWithJd,
    RewritePersonalInfo,
    RewriteExperience,
    RewriteEducation,
    RewriteSkills,
    RewriteLanguages,
    RewriteCourses,
    RewriteHonorsAwards,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::ResumeProfile => "resume_profile",
            AgentRole::ResumeExperience => "resume_experience",
            AgentRole::LinkedinBasicInfo => "linkedin_basic_info",
            AgentRole::LinkedinExperience => "linkedin_experience",
            AgentRole::LinkedinEducation => "linkedin_education",
            AgentRole::LinkedinCertificationsLanguages => "linkedin_certifications_languages",
            AgentRole::LinkedinProjects => "linkedin_projects",
            AgentRole::GithubProfile => "github_profile",
            AgentRole::PortfolioChunk => "portfolio_chunk",
            AgentRole::PortfolioSummary => "portfolio_summary",
            AgentRole::JobDescription => "job_description",
            AgentRole::FieldBasicInformation => "field_basic_information",
            AgentRole::FieldExperience => "field_experience",
            AgentRole::FieldEducation => "field_education",
            AgentRole::FieldSkills => "field_skills",
            AgentRole::FieldLanguages => "field_languages",
            AgentRole::FieldProjects => "field_projects",
            AgentRole::FieldCertifications => "field_certifications",
            AgentRole::FieldAchievements => "field_achievements",
            AgentRole::AtsScore => "ats_score",
            AgentRole::AtsScoreWithJd => "ats_score_with_jd",
            AgentRole::RewritePersonalInfo => "rewrite_personal_info",
            AgentRole::RewriteExperience => "rewrite_experience",
            AgentRole::RewriteEducation => "rewrite_education",
            AgentRole::RewriteSkills => "rewrite_skills",
            AgentRole::RewriteLanguages => "rewrite_languages",
            AgentRole::RewriteCourses => "rewrite_courses",
            AgentRole::RewriteHonorsAwards => "rewrite_honors_awards",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    /// The model declined to answer.
    #[error("model refused: {0}")]
    Refused(String),

    /// Transport error, malformed response or schema mismatch.
    #[error("extraction failed: {0}")]
    Failed(String),
}

/// Result of one model call: the payload (or why there is none) plus tokens used.
#[derive(Debug, Clone)]
pub struct Extraction<T> {
    pub tokens: u64,
    pub outcome: Result<T, ExtractError>,
}

impl<T> Extraction<T> {
    pub fn ok(value: T, tokens: u64) -> Self {
        Self {
            tokens,
            outcome: Ok(value),
        }
    }

    pub fn refused(tokens: u64, reason: impl Into<String>) -> Self {
        Self {
            tokens,
            outcome: Err(ExtractError::Refused(reason.into())),
        }
    }

    pub fn failed(tokens: u64, message: impl Into<String>) -> Self {
        Self {
            tokens,
            outcome: Err(ExtractError::Failed(message.into())),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The payload, or `None` on refusal/failure.
    pub fn into_value(self) -> Option<T> {
        self.outcome.ok()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extraction<U> {
        Extraction {
            tokens: self.tokens,
            outcome: self.outcome.map(f),
        }
    }
}

/// Model-backed structured extraction.
///
/// Object-safe so the pipeline can hold an `Arc<dyn Extractor>`; the typed
/// entry point is [`extract_as`].
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Issues one call whose answer must be a JSON document.
    async fn extract(
        &self,
        role: AgentRole,
        system: &str,
        input: &str,
    ) -> Extraction<serde_json::Value>;

    /// Issues one call whose answer is free text (chunk summaries).
    async fn complete(&self, role: AgentRole, system: &str, input: &str) -> Extraction<String>;
}

/// Runs one extraction and deserializes the answer into `T`.
/// A schema mismatch becomes `ExtractError::Failed`; the token count survives.
pub async fn extract_as<T: DeserializeOwned>(
    extractor: &dyn Extractor,
    role: AgentRole,
    system: &str,
    input: &str,
) -> Extraction<T> {
    let raw = extractor.extract(role, system, input).await;
    let tokens = raw.tokens;
    let outcome = raw.outcome.and_then(|value| {
        serde_json::from_value::<T>(value).map_err(|e| {
            ExtractError::Failed(format!("schema mismatch for {}: {e}", role.as_str()))
        })
    });

    if let Err(e) = &outcome {
        warn!(role = role.as_str(), tokens, "Extraction produced no value: {e}");
    }

    Extraction { tokens, outcome }
}

/// Output envelope shared by most schemas: a one-element list of variants.
#[derive(Debug, Clone, Deserialize)]
pub struct Steps<T> {
    #[serde(default = "Vec::new")]
    pub steps: Vec<T>,
}

impl<T> Steps<T> {
    /// Unwraps to the first step; an empty list means no answer.
    pub fn first(self) -> Option<T> {
        self.steps.into_iter().next()
    }
}

impl<T> Extraction<Steps<T>> {
    pub fn first_step(self) -> Extraction<T> {
        Extraction {
            tokens: self.tokens,
            outcome: self.outcome.and_then(|steps| {
                steps
                    .first()
                    .ok_or_else(|| ExtractError::Failed("answer contained no steps".to_string()))
            }),
        }
    }
}

/// `extract_as` for the `{"steps": [...]}` envelope, unwrapped to the first step.
pub async fn extract_step<T: DeserializeOwned>(
    extractor: &dyn Extractor,
    role: AgentRole,
    system: &str,
    input: &str,
) -> Extraction<T> {
    let system = prompts::with_steps(system);
    extract_as::<Steps<T>>(extractor, role, &system, input)
        .await
        .first_step()
}

// ────────────────────────────────────────────────────────────────────────────
// Concurrency bound
// ────────────────────────────────────────────────────────────────────────────

/// Caps the number of provider calls in flight, however many collectors and
/// aggregators are fanned out above it.
pub struct BoundedExtractor {
    inner: Arc<dyn Extractor>,
    permits: Arc<Semaphore>,
}

impl BoundedExtractor {
    pub fn new(inner: Arc<dyn Extractor>, max_in_flight: usize) -> Self {
        Self {
            inner,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    #[cfg(test)]
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl Extractor for BoundedExtractor {
    async fn extract(
        &self,
        role: AgentRole,
        system: &str,
        input: &str,
    ) -> Extraction<serde_json::Value> {
        let Ok(_permit) = self.permits.acquire().await else {
            return Extraction::failed(0, "extraction pool closed");
        };
        self.inner.extract(role, system, input).await
    }

    async fn complete(&self, role: AgentRole, system: &str, input: &str) -> Extraction<String> {
        let Ok(_permit) = self.permits.acquire().await else {
            return Extraction::failed(0, "extraction pool closed");
        };
        self.inner.complete(role, system, input).await
    }
}
