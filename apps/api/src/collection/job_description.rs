//! Job description collector: decomposes a posting into ATS match terms.

use tracing::{info, warn};

use super::models::{JobDescriptionData, SourceError, SourceKind};
use super::prompts::JOB_DESCRIPTION_SYSTEM;
use crate::extraction::{extract_step, AgentRole, Extractor};

pub async fn collect_jd(extractor: &dyn Extractor, job_description: &str) -> JobDescriptionData {
    let text = job_description.trim();
    if text.is_empty() {
        warn!(source = "job_description", "Empty job description");
        return JobDescriptionData {
            error: Some(SourceError::unavailable(SourceKind::JobDescription)),
            ..JobDescriptionData::default()
        };
    }

    let parsed = extract_step::<JobDescriptionData>(
        extractor,
        AgentRole::JobDescription,
        JOB_DESCRIPTION_SYSTEM,
        text,
    )
    .await;

    let tokens = parsed.tokens;
    let mut jd = match parsed.outcome {
        Ok(jd) => jd,
        Err(e) => JobDescriptionData {
            error: Some(SourceError::new(SourceKind::JobDescription, e.to_string())),
            ..JobDescriptionData::default()
        },
    };
    jd.tokens = tokens;

    info!(
        source = "job_description",
        tokens,
        job_title = %jd.job_title,
        hard_skills = jd.hard_skills.len(),
        "Job description collected"
    );
    jd
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::extraction::testing::ScriptedExtractor;

    const JD: &str = r#"
        Senior Rust Engineer, Core Infrastructure
        You will architect distributed systems and drive reliability.
        Required: 5+ years Rust, Tokio, PostgreSQL. Preferred: Kubernetes.
    "#;

    #[tokio::test]
    async fn test_collect_jd_populates_lists() {
        let extractor = ScriptedExtractor::new().respond(
            AgentRole::JobDescription,
            json!({"steps": [{
                "job_title": "Senior Rust Engineer",
                "hard_skills": ["Rust", "distributed systems"],
                "tools_and_technologies": ["Tokio", "PostgreSQL"],
                "preferred_qualifications": ["Kubernetes"],
                "action_verbs": ["architect", "drive"]
            }]}),
            410,
        );

        let jd = collect_jd(&extractor, JD).await;

        assert_eq!(jd.job_title, "Senior Rust Engineer");
        assert!(!jd.hard_skills.is_empty());
        assert!(!jd.tools_and_technologies.is_empty());
        assert!(jd.soft_skills.is_empty());
        assert_eq!(jd.tokens, 410);
        assert!(jd.error.is_none());
    }

    #[tokio::test]
    async fn test_collect_jd_refusal_keeps_defaults_and_tokens() {
        let extractor = ScriptedExtractor::new().refuse(AgentRole::JobDescription, 22);

        let jd = collect_jd(&extractor, JD).await;

        assert_eq!(jd.job_title, "");
        assert!(jd.hard_skills.is_empty());
        assert_eq!(jd.tokens, 22);
        assert_eq!(jd.error.unwrap().kind, SourceKind::JobDescription);
    }

    #[tokio::test]
    async fn test_collect_jd_blank_text_skips_model() {
        let extractor = ScriptedExtractor::new();

        let jd = collect_jd(&extractor, "   \n ").await;

        assert!(jd.error.is_some());
        assert!(extractor.calls().is_empty());
    }
}
