use axum::Json;
use serde_json::{json, Value};

const SERVICE: &str = "resume-enricher";

/// GET /
/// Service information and the available endpoints.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Resume enrichment API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "improvement_resume": "/improvement-resume",
            "ats_resume": "/ATS-resume",
            "ats_score": "/ATS-score",
            "ats_score_with_jd": "/ATS-score-with-JD",
            "linkedin_rewrite": "/Linkedin-rewrite"
        }
    }))
}

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": SERVICE
    }))
}
