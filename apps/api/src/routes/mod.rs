pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::enrichment::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.upload_max_bytes;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Enrichment
        .route(
            "/improvement-resume",
            post(handlers::handle_improvement_resume),
        )
        .route("/ATS-resume", post(handlers::handle_ats_resume))
        // Scoring
        .route("/ATS-score", post(handlers::handle_ats_score))
        .route(
            "/ATS-score-with-JD",
            post(handlers::handle_ats_score_with_jd),
        )
        // LinkedIn
        .route("/Linkedin-rewrite", post(handlers::handle_linkedin_rewrite))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::aggregation::FieldKind;
    use crate::collection::chunking::testing::CharTokenizer;
    use crate::config::Config;
    use crate::extraction::testing::ScriptedExtractor;
    use crate::extraction::AgentRole;
    use crate::pipeline::EnrichmentPipeline;
    use crate::rewrite::RewriteSection;
    use crate::scoring::LlmAtsScorer;
    use crate::sources::testing::StaticSource;
    use crate::sources::{DocumentReader, GithubProfile, Sources};

    const BOUNDARY: &str = "enricher-test-boundary";

    fn config() -> Config {
        Config {
            anthropic_api_key: "test-key".to_string(),
            github_token: None,
            port: 0,
            rust_log: "info".to_string(),
            max_concurrent_extractions: 4,
            agent_batch_size: 4,
            agent_batch_pause_ms: 0,
            request_timeout_secs: 60,
            collection_timeout_secs: 40,
            portfolio_token_budget: 8000,
            portfolio_chunk_tokens: 7000,
            portfolio_chunk_delay_ms: 0,
            upload_max_bytes: 1024 * 1024,
        }
    }

    fn scripted() -> ScriptedExtractor {
        let extractor = ScriptedExtractor::new()
            .respond(
                AgentRole::ResumeProfile,
                json!({"steps": [{"full_name": "Ada Lovelace"}]}),
                300,
            )
            .respond(AgentRole::ResumeExperience, json!({"steps": [{}]}), 200)
            .respond(
                AgentRole::JobDescription,
                json!({"steps": [{"job_title": "Engineer"}]}),
                40,
            )
            .respond(AgentRole::AtsScore, json!({"analysis": {"ATS_score": 70}}), 90)
            .respond(
                AgentRole::AtsScoreWithJd,
                json!({"analysis": {"ATS_score": 55}}),
                95,
            );
        let extractor = FieldKind::ALL.into_iter().fold(extractor, |e, kind| {
            e.respond(kind.role(), json!({"steps": [{}]}), 10)
        });
        RewriteSection::ALL
            .into_iter()
            .filter(|section| section.is_list())
            .fold(extractor, |e, section| {
                e.respond(section.role(), json!({section.as_str(): []}), 5)
            })
    }

    fn app() -> Router {
        let extractor = Arc::new(scripted());
        let sources = Sources {
            documents: Arc::new(DocumentReader),
            github: Arc::new(StaticSource::<GithubProfile>::new()),
            web: Arc::new(StaticSource::<String>::new()),
        };
        let config = config();
        let pipeline = EnrichmentPipeline::new(
            extractor.clone(),
            sources.clone(),
            Arc::new(CharTokenizer),
            config.pipeline_settings(),
        );

        build_router(AppState {
            pipeline: Arc::new(pipeline),
            scorer: Arc::new(LlmAtsScorer::new(extractor)),
            documents: sources.documents,
            config,
        })
    }

    enum Part<'a> {
        File(&'a str, &'a str, &'a str),
        Text(&'a str, &'a str),
    }

    fn multipart(uri: &str, parts: &[Part]) -> Request<Body> {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match part {
                Part::File(name, file_name, content) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: text/plain\r\n\r\n{content}\r\n"
                )),
                Part::Text(name, value) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )),
            }
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_healthy() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoints"]["ats_score_with_jd"], "/ATS-score-with-JD");
    }

    #[tokio::test]
    async fn test_improvement_resume_returns_all_fields() {
        let (status, body) = send(multipart(
            "/improvement-resume",
            &[Part::File("resume_file", "cv.txt", "Ada Lovelace, engineer")],
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["total_tokens_consumed"], 80);
        assert_eq!(body["token_usage"]["collection_tokens"], 500);
        assert_eq!(body["token_ledger"].as_array().unwrap().len(), 5 + 8);
        let results = body["analysis_results"].as_object().unwrap();
        assert_eq!(results.len(), 8);
        assert!(results.contains_key("basic_information"));
        assert!(body.get("job_description").is_none());
    }

    #[tokio::test]
    async fn test_unsupported_resume_type_is_rejected() {
        let (status, body) = send(multipart(
            "/improvement-resume",
            &[Part::File("resume_file", "cv.doc", "binary")],
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_non_github_profile_is_rejected() {
        let (status, body) = send(multipart(
            "/improvement-resume",
            &[
                Part::File("resume_file", "cv.txt", "resume"),
                Part::Text("github_profile", "https://gitlab.com/ada"),
            ],
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid GitHub URL");
    }

    #[tokio::test]
    async fn test_ats_resume_requires_job_description() {
        let (status, _) = send(multipart(
            "/ATS-resume",
            &[
                Part::File("resume_file", "cv.txt", "resume"),
                Part::Text("job_description", "   "),
            ],
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ats_resume_reports_jd_tokens() {
        let (status, body) = send(multipart(
            "/ATS-resume",
            &[
                Part::File("resume_file", "cv.md", "# Ada"),
                Part::Text("job_description", "Rust engineer wanted"),
            ],
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_usage"]["jd_tokens"], 40);
        assert_eq!(body["job_description"]["job_title"], "Engineer");
    }

    #[tokio::test]
    async fn test_ats_score_endpoints() {
        let (status, body) = send(multipart(
            "/ATS-score",
            &[Part::File("resume_file", "cv.txt", "resume text")],
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ATS_score"], 70.0);
        assert_eq!(body["total_tokens"], 90);

        let (status, body) = send(multipart(
            "/ATS-score-with-JD",
            &[
                Part::File("resume_file", "cv.txt", "resume text"),
                Part::Text("job_description", "needs Go"),
            ],
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ATS_score"], 55.0);
    }

    #[tokio::test]
    async fn test_empty_resume_cannot_be_scored() {
        let (status, body) = send(multipart(
            "/ATS-score",
            &[Part::File("resume_file", "cv.txt", "  ")],
        ))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }

    #[tokio::test]
    async fn test_linkedin_rewrite_returns_every_section() {
        let (status, body) = send(multipart(
            "/Linkedin-rewrite",
            &[Part::File("linkedin_file", "profile.txt", "Ada Lovelace\nEngineer")],
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Linkedin rewrite completed successfully");
        let data = &body["linkedin_rewrite_data"];
        assert_eq!(data["experience_info"], json!([]));
        assert_eq!(data["total_tokens"], 30);
        // no personal info answer is scripted
        assert!(data["personal_info"].is_null());
        assert_eq!(data["error"], "No personal info found");
        assert_eq!(body["failed_sections"], json!(["personal_info"]));
    }

    #[tokio::test]
    async fn test_linkedin_rewrite_requires_file() {
        let (status, body) = send(multipart(
            "/Linkedin-rewrite",
            &[Part::Text("github_profile", "https://github.com/ada")],
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "linkedin_file is required");
    }
}
