//! LinkedIn export collector: five section extractions over the same text.

use tracing::{info, warn};

use super::models::{
    LinkedinBasicInfo, LinkedinCertificationsLanguages, LinkedinCredential, LinkedinEducationList,
    LinkedinExperienceList, LinkedinProjectList, LinkedinRecord, SourceError, SourceKind,
};
use super::prompts::{
    LINKEDIN_BASIC_INFO_SYSTEM, LINKEDIN_CERTIFICATIONS_LANGUAGES_SYSTEM,
    LINKEDIN_EDUCATION_SYSTEM, LINKEDIN_EXPERIENCE_SYSTEM, LINKEDIN_PROJECTS_SYSTEM,
};
use super::CollectionContext;
use crate::extraction::{extract_step, AgentRole, Extraction};

pub async fn collect_linkedin(ctx: &CollectionContext, path: &str) -> LinkedinRecord {
    let Some(text) = ctx.sources.documents.fetch(path).await else {
        warn!(source = "linkedin", "LinkedIn export unavailable");
        return LinkedinRecord {
            error: Some(SourceError::unavailable(SourceKind::Linkedin)),
            ..LinkedinRecord::default()
        };
    };

    let extractor = ctx.extractor.as_ref();
    let (basic, experience, education, certs_langs, projects) = tokio::join!(
        extract_step::<LinkedinBasicInfo>(
            extractor,
            AgentRole::LinkedinBasicInfo,
            LINKEDIN_BASIC_INFO_SYSTEM,
            &text
        ),
        extract_step::<LinkedinExperienceList>(
            extractor,
            AgentRole::LinkedinExperience,
            LINKEDIN_EXPERIENCE_SYSTEM,
            &text
        ),
        extract_step::<LinkedinEducationList>(
            extractor,
            AgentRole::LinkedinEducation,
            LINKEDIN_EDUCATION_SYSTEM,
            &text
        ),
        extract_step::<LinkedinCertificationsLanguages>(
            extractor,
            AgentRole::LinkedinCertificationsLanguages,
            LINKEDIN_CERTIFICATIONS_LANGUAGES_SYSTEM,
            &text
        ),
        extract_step::<LinkedinProjectList>(
            extractor,
            AgentRole::LinkedinProjects,
            LINKEDIN_PROJECTS_SYSTEM,
            &text
        ),
    );

    let tokens =
        basic.tokens + experience.tokens + education.tokens + certs_langs.tokens + projects.tokens;

    let mut failed = Vec::new();
    let basic = value_or_default(AgentRole::LinkedinBasicInfo, basic, &mut failed);
    let experience = value_or_default(AgentRole::LinkedinExperience, experience, &mut failed);
    let education = value_or_default(AgentRole::LinkedinEducation, education, &mut failed);
    let certs_langs =
        value_or_default(AgentRole::LinkedinCertificationsLanguages, certs_langs, &mut failed);
    let projects = value_or_default(AgentRole::LinkedinProjects, projects, &mut failed);

    let record = assemble(basic, experience, education, certs_langs, projects, tokens, failed);
    info!(source = "linkedin", tokens = record.tokens, "LinkedIn collected");
    record
}

fn value_or_default<T: Default>(
    role: AgentRole,
    extraction: Extraction<T>,
    failed: &mut Vec<&'static str>,
) -> T {
    if !extraction.is_ok() {
        failed.push(role.as_str());
    }
    extraction.into_value().unwrap_or_default()
}

fn assemble(
    basic: LinkedinBasicInfo,
    experience: LinkedinExperienceList,
    education: LinkedinEducationList,
    certs_langs: LinkedinCertificationsLanguages,
    projects: LinkedinProjectList,
    tokens: u64,
    failed: Vec<&'static str>,
) -> LinkedinRecord {
    // Certifications ride along in the education section.
    let education = education
        .education
        .into_iter()
        .map(LinkedinCredential::Education)
        .chain(
            certs_langs
                .certifications
                .into_iter()
                .map(LinkedinCredential::Certification),
        )
        .collect();

    let error = (!failed.is_empty()).then(|| {
        SourceError::new(
            SourceKind::Linkedin,
            format!("{} of 5 extractions failed: {}", failed.len(), failed.join(", ")),
        )
    });

    LinkedinRecord {
        professional_summary: basic.position.clone(),
        basic_information: basic,
        experience: experience.experience,
        education,
        projects: projects.projects,
        languages: certs_langs.languages,
        tokens,
        error,
    }
}
