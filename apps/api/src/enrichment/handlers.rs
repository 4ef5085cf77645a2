//! Axum route handlers for the enrichment and ATS scoring API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::upload::UploadForm;
use crate::collection::{JobDescriptionData, SourceError};
use crate::errors::AppError;
use crate::pipeline::{EnrichmentReport, EnrichmentRequest, LedgerEntry, TokenSummary};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EnrichmentResponse {
    pub status_code: u16,
    pub status: &'static str,
    pub message: &'static str,
    pub request_id: Uuid,
    /// `{field_name: payload | null}` for all eight fields.
    pub analysis_results: Value,
    /// Tokens of the eight field calls.
    pub total_tokens_consumed: u64,
    pub token_usage: TokenSummary,
    /// One entry per source, job description and field.
    pub token_ledger: Vec<LedgerEntry>,
    pub source_errors: Vec<SourceError>,
    pub timed_out: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<JobDescriptionData>,
}

impl EnrichmentResponse {
    fn from_report(report: EnrichmentReport, message: &'static str) -> Self {
        Self {
            status_code: 200,
            status: "success",
            message,
            request_id: report.request_id,
            analysis_results: report.analysis.to_json(),
            total_tokens_consumed: report.analysis_tokens(),
            token_usage: report.tokens(),
            token_ledger: report.ledger.entries().to_vec(),
            source_errors: report.source_errors,
            timed_out: report.timed_out,
            job_description: report.job_description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AtsScoreResponse {
    pub status_code: u16,
    pub status: &'static str,
    pub message: &'static str,
    #[serde(rename = "ATS_score")]
    pub ats_score: Option<f64>,
    pub total_tokens: u64,
}

#[derive(Debug, Serialize)]
pub struct LinkedinRewriteResponse {
    pub status_code: u16,
    pub status: &'static str,
    pub message: &'static str,
    pub request_id: Uuid,
    /// Section keys plus `total_tokens`, and `error` when personal info is missing.
    pub linkedin_rewrite_data: Value,
    pub failed_sections: Vec<&'static str>,
    pub timed_out: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /improvement-resume
///
/// General enrichment: resume plus any of LinkedIn export, GitHub, portfolio
/// and other link.
pub async fn handle_improvement_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EnrichmentResponse>, AppError> {
    let form = UploadForm::read(&mut multipart).await?;
    let request = EnrichmentRequest {
        locators: form.locators()?,
        job_description: None,
    };

    let report = state.pipeline.enrich(request).await;

    Ok(Json(EnrichmentResponse::from_report(
        report,
        "Comprehensive resume analysis completed successfully",
    )))
}

/// POST /ATS-resume
///
/// Same as `/improvement-resume`, with every aggregator tuned toward the
/// required job description.
pub async fn handle_ats_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EnrichmentResponse>, AppError> {
    let form = UploadForm::read(&mut multipart).await?;
    let request = EnrichmentRequest {
        job_description: Some(form.job_description()?),
        locators: form.locators()?,
    };

    let report = state.pipeline.enrich(request).await;

    Ok(Json(EnrichmentResponse::from_report(
        report,
        "ATS-optimized resume analysis completed successfully",
    )))
}

async fn score(
    state: &AppState,
    form: &UploadForm,
    job_description: Option<&str>,
) -> Result<Json<AtsScoreResponse>, AppError> {
    let path = form.resume_path()?.to_string_lossy().into_owned();
    let resume_text = state.documents.fetch(&path).await.ok_or_else(|| {
        AppError::UnprocessableEntity("Could not read any text from the resume file".to_string())
    })?;

    let score = state.scorer.score(&resume_text, job_description).await;

    Ok(Json(AtsScoreResponse {
        status_code: 200,
        status: "success",
        message: "ATS score completed successfully",
        ats_score: score.score,
        total_tokens: score.tokens,
    }))
}

/// POST /ATS-score
pub async fn handle_ats_score(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AtsScoreResponse>, AppError> {
    let form = UploadForm::read(&mut multipart).await?;
    score(&state, &form, None).await
}

/// POST /ATS-score-with-JD
pub async fn handle_ats_score_with_jd(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AtsScoreResponse>, AppError> {
    let form = UploadForm::read(&mut multipart).await?;
    let job_description = form.job_description()?;
    score(&state, &form, Some(&job_description)).await
}

/// POST /Linkedin-rewrite
///
/// Rewrites an exported LinkedIn profile section by section.
pub async fn handle_linkedin_rewrite(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<LinkedinRewriteResponse>, AppError> {
    let form = UploadForm::read(&mut multipart).await?;
    let path = form.linkedin_path()?.to_string_lossy().into_owned();
    let profile_text = state.documents.fetch(&path).await.ok_or_else(|| {
        AppError::UnprocessableEntity("Could not read any text from the LinkedIn file".to_string())
    })?;

    let report = state.pipeline.rewrite_linkedin(&profile_text).await;

    let mut data = report.rewrite.to_json();
    if let Value::Object(map) = &mut data {
        map.insert("total_tokens".to_string(), report.ledger.grand_total().into());
        if let Some(error) = report.rewrite.error() {
            map.insert("error".to_string(), error.into());
        }
    }

    Ok(Json(LinkedinRewriteResponse {
        status_code: 200,
        status: "success",
        message: "Linkedin rewrite completed successfully",
        request_id: report.request_id,
        linkedin_rewrite_data: data,
        failed_sections: report.rewrite.failed_sections(),
        timed_out: report.rewrite.timed_out,
    }))
}
