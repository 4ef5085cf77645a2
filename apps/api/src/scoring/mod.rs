//! ATS scoring: one model call rating a resume 0–100, optionally against a
//! job description.
//!
//! `AppState` holds an `Arc<dyn AtsScorer>`; handlers never see the backend.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extraction::{extract_as, AgentRole, Extractor};

pub mod prompts;

/// Score (`None` when the call failed) and the tokens the call consumed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtsScore {
    pub score: Option<f64>,
    pub tokens: u64,
}

#[async_trait]
pub trait AtsScorer: Send + Sync {
    async fn score(&self, resume_text: &str, job_description: Option<&str>) -> AtsScore;
}

#[derive(Debug, Deserialize)]
struct AtsAnswer {
    analysis: AtsAnalysis,
}

#[derive(Debug, Deserialize)]
struct AtsAnalysis {
    #[serde(rename = "ATS_score")]
    ats_score: f64,
}

/// Model-backed scorer.
pub struct LlmAtsScorer {
    extractor: Arc<dyn Extractor>,
}

impl LlmAtsScorer {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self { extractor }
    }
}

fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 100.0)
    }
}

#[async_trait]
impl AtsScorer for LlmAtsScorer {
    async fn score(&self, resume_text: &str, job_description: Option<&str>) -> AtsScore {
        if resume_text.trim().is_empty() {
            return AtsScore {
                score: Some(0.0),
                tokens: 0,
            };
        }

        let (role, system, input) = match job_description {
            Some(jd) => (
                AgentRole::AtsScoreWithJd,
                prompts::ATS_SCORE_WITH_JD_SYSTEM,
                format!("Resume:\n{resume_text}\n\nJob description:\n{jd}"),
            ),
            None => (
                AgentRole::AtsScore,
                prompts::ATS_SCORE_SYSTEM,
                format!("Resume:\n{resume_text}"),
            ),
        };

        let answer = extract_as::<AtsAnswer>(self.extractor.as_ref(), role, system, &input).await;
        let tokens = answer.tokens;
        match answer.outcome {
            Ok(answer) => {
                let score = clamp_score(answer.analysis.ats_score);
                info!(role = role.as_str(), score, tokens, "ATS score computed");
                AtsScore {
                    score: Some(score),
                    tokens,
                }
            }
            Err(e) => {
                warn!(role = role.as_str(), tokens, "ATS scoring failed: {e}");
                AtsScore {
                    score: None,
                    tokens,
                }
            }
        }
    }
}
