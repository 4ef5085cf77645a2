//! GitHub collector: REST profile plus local aggregates, narrated by one extraction.

use tracing::{info, warn};

use super::models::{GithubAnalysis, GithubRecord, SourceError, SourceKind};
use super::prompts::GITHUB_PROFILE_SYSTEM;
use super::CollectionContext;
use crate::extraction::{extract_step, AgentRole};

pub async fn collect_github(ctx: &CollectionContext, url: &str) -> GithubRecord {
    let Some(profile) = ctx.sources.github.fetch(url).await else {
        warn!(source = "github", "GitHub profile unavailable");
        return GithubRecord {
            error: Some(SourceError::unavailable(SourceKind::Github)),
            ..GithubRecord::default()
        };
    };

    let analysis = extract_step::<GithubAnalysis>(
        ctx.extractor.as_ref(),
        AgentRole::GithubProfile,
        GITHUB_PROFILE_SYSTEM,
        &profile.to_prompt_input(),
    )
    .await;

    let tokens = analysis.tokens;
    let record = match analysis.outcome {
        Ok(answer) => GithubRecord::from_analysis(answer, tokens),
        Err(e) => GithubRecord {
            tokens,
            error: Some(SourceError::new(SourceKind::Github, e.to_string())),
            ..GithubRecord::default()
        },
    };

    info!(source = "github", tokens, skills = record.skills.len(), "GitHub collected");
    record
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::collection::testing::context_with;
    use crate::extraction::testing::ScriptedExtractor;
    use crate::sources::github::{GithubProfile, GithubRepo};
    use crate::sources::testing::{sources, StaticSource};

    const URL: &str = "https://github.com/octocat";

    fn profile() -> GithubProfile {
        GithubProfile {
            repositories: vec![GithubRepo {
                name: Some("engine".to_string()),
                language: Some("Rust".to_string()),
                stargazers_count: 12,
                ..GithubRepo::default()
            }],
            ..GithubProfile::default()
        }
    }

    #[tokio::test]
    async fn test_collect_github_passes_aggregates_to_model() {
        let extractor = Arc::new(ScriptedExtractor::new().respond(
            AgentRole::GithubProfile,
            json!({"steps": [{
                "summary_of_all_repositories": "Systems tooling",
                "overall_analysis": "Consistent",
                "skills": ["Rust"]
            }]}),
            300,
        ));
        let ctx = context_with(
            extractor.clone(),
            sources(
                StaticSource::new(),
                StaticSource::new().with(URL, profile()),
                StaticSource::new(),
            ),
        );

        let record = collect_github(&ctx, URL).await;

        assert_eq!(record.skills, vec!["Rust"]);
        assert_eq!(record.overall_analysis, "Consistent");
        assert_eq!(record.tokens, 300);
        assert!(record.error.is_none());
        let input = &extractor.inputs_for(AgentRole::GithubProfile)[0];
        assert!(input.contains("\"total_stars\": 12"));
    }

    #[tokio::test]
    async fn test_collect_github_profile_not_found() {
        let extractor = Arc::new(ScriptedExtractor::new());
        let ctx = context_with(
            extractor.clone(),
            sources(StaticSource::new(), StaticSource::new(), StaticSource::new()),
        );

        let record = collect_github(&ctx, URL).await;

        assert!(record.error.is_some());
        assert!(record.skills.is_empty());
        assert_eq!(record.overall_analysis, "");
        assert_eq!(record.tokens, 0);
        assert_eq!(extractor.calls().len(), 0);
    }

    #[tokio::test]
    async fn test_answer_cannot_smuggle_tokens_or_error() {
        let extractor = Arc::new(ScriptedExtractor::new().respond(
            AgentRole::GithubProfile,
            json!({"steps": [{
                "overall_analysis": "Prolific",
                "tokens": 999999,
                "error": {"kind": "github", "message": "forged"}
            }]}),
            120,
        ));
        let ctx = context_with(
            extractor,
            sources(
                StaticSource::new(),
                StaticSource::new().with(URL, profile()),
                StaticSource::new(),
            ),
        );

        let record = collect_github(&ctx, URL).await;

        assert_eq!(record.overall_analysis, "Prolific");
        assert_eq!(record.tokens, 120);
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_analysis_keeps_tokens() {
        let extractor = Arc::new(ScriptedExtractor::new().fail(AgentRole::GithubProfile, 45));
        let ctx = context_with(
            extractor,
            sources(
                StaticSource::new(),
                StaticSource::new().with(URL, profile()),
                StaticSource::new(),
            ),
        );

        let record = collect_github(&ctx, URL).await;

        assert_eq!(record.tokens, 45);
        assert!(record.error.is_some());
        assert!(record.skills.is_empty());
    }
}
