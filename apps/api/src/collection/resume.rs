//! Resume collector: two concurrent parses of the same text, merged into one record.

use tracing::{info, warn};

use super::models::{ResumeExperience, ResumeProfile, ResumeRecord, SourceError, SourceKind};
use super::prompts::{RESUME_EXPERIENCE_SYSTEM, RESUME_PROFILE_SYSTEM};
use super::CollectionContext;
use crate::extraction::{extract_step, AgentRole};

pub async fn collect_resume(ctx: &CollectionContext, path: &str) -> ResumeRecord {
    let Some(text) = ctx.sources.documents.fetch(path).await else {
        warn!(source = "resume", "Resume text unavailable");
        return ResumeRecord {
            error: Some(SourceError::unavailable(SourceKind::Resume)),
            ..ResumeRecord::default()
        };
    };

    let extractor = ctx.extractor.as_ref();
    let (profile, experience) = tokio::join!(
        extract_step::<ResumeProfile>(
            extractor,
            AgentRole::ResumeProfile,
            RESUME_PROFILE_SYSTEM,
            &text
        ),
        extract_step::<ResumeExperience>(
            extractor,
            AgentRole::ResumeExperience,
            RESUME_EXPERIENCE_SYSTEM,
            &text
        ),
    );

    let mut record = ResumeRecord {
        tokens: profile.tokens + experience.tokens,
        ..ResumeRecord::default()
    };

    match profile.outcome {
        Ok(profile) => {
            record.suggested_role = profile.suggested_role;
            record.full_name = profile.full_name;
            record.email = profile.email;
            record.phone = profile.phone;
            record.professional_title = profile.professional_title;
            record.summary = profile.summary;
            record.experience_in_years = profile.years_of_experience;
            record.education = profile.education;
            record.languages = profile.languages;
            record.projects = profile.projects;
            record.certifications = profile.certifications;
            record.achievements = profile.achievements;
            record.skills = profile.skills;
        }
        Err(e) => record.error = Some(SourceError::new(SourceKind::Resume, e.to_string())),
    }

    match experience.outcome {
        Ok(experience) => record.experience = experience.experience,
        Err(e) => {
            if record.error.is_none() {
                record.error = Some(SourceError::new(SourceKind::Resume, e.to_string()));
            }
        }
    }

    info!(
        source = "resume",
        tokens = record.tokens,
        positions = record.experience.len(),
        "Resume collected"
    );
    record
}
