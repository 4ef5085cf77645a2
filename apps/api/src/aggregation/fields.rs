//! Field aggregators: one combined-source prompt and one extraction per field.

use std::fmt::Write as _;

use serde::Serialize;
use tracing::{debug, warn};

use super::models::{
    AchievementsField, AggregatedField, BasicInformationField, CertificationsField,
    EducationField, ExperienceField, FieldKind, FieldPayload, LanguagesField, ProjectsField,
    SkillsField,
};
use super::prompts;
use crate::collection::{BasicInformation, JobDescriptionData};
use crate::extraction::{extract_step, Extraction, Extractor};

/// Combined-context prompt: labelled sections of every source relevant to
/// `kind`, plus the matching job description slice when one applies.
pub fn build_context(
    kind: FieldKind,
    basic: &BasicInformation,
    jd: Option<&JobDescriptionData>,
) -> String {
    let resume = &basic.resume;
    let linkedin = &basic.linkedin;
    let github = &basic.github;
    let portfolio = &basic.portfolio.summary;
    let other_link = &basic.other_link.summary;

    let label = kind.as_str().replace('_', " ");
    let mut out = ContextWriter::new(format!(
        "Please analyze and compare the following information from multiple sources \
         to create accurate and comprehensive {label} information:"
    ));

    match kind {
        FieldKind::BasicInformation => {
            out.section("Resume Data");
            out.line("Suggested Role", &resume.suggested_role);
            out.line("Full Name", &resume.full_name);
            out.line("Email", &resume.email);
            out.line("Phone", &resume.phone);
            out.line("Professional Title", &resume.professional_title);
            out.line("Experience in Years", &resume.experience_in_years);
            out.line("Summary", &resume.summary);
            out.section("LinkedIn Profile Data");
            out.line("Basic Information", &json(&linkedin.basic_information));
            out.line("Professional Summary", &linkedin.professional_summary);
        }
        FieldKind::Experience => {
            out.section("Resume Experience Data");
            out.block(&json(&resume.experience));
            out.section("LinkedIn Experience Data");
            out.block(&json(&linkedin.experience));
            out.section("GitHub Experience Data");
            out.block(&github.overall_analysis);
            out.block(&github.summary_of_all_repositories);
            out.section("Portfolio Experience Data");
            out.block(portfolio);
            out.section("Other Link Experience Data");
            out.block(other_link);
        }
        FieldKind::Education => {
            out.section("Resume Education Data");
            out.block(&json(&resume.education));
            out.section("LinkedIn Education Data");
            out.block(&json(&linkedin.education));
            out.section("Portfolio Education Data");
            out.block(portfolio);
            out.section("Other Link Education Data");
            out.block(other_link);
        }
        FieldKind::Skills => {
            out.section("Resume Skills Data");
            out.block(&json(&resume.skills));
            out.section("GitHub Skills Data");
            out.block(&json(&github.skills));
            out.section("Portfolio Skills Data");
            out.block(portfolio);
        }
        FieldKind::Languages => {
            out.section("Resume Languages Data");
            out.block(&json(&resume.languages));
            out.section("LinkedIn Languages Data");
            out.block(&json(&linkedin.languages));
            out.section("Portfolio Languages Information");
            out.line("Portfolio Summary", portfolio);
        }
        FieldKind::Projects => {
            out.section("Resume Projects Data");
            out.block(&json(&resume.projects));
            out.section("LinkedIn Projects Data");
            out.block(&json(&linkedin.projects));
            out.section("GitHub Repository Analysis");
            out.line("Repository Summary", &github.summary_of_all_repositories);
            out.line("Overall Analysis", &github.overall_analysis);
        }
        FieldKind::Certifications => {
            out.section("Resume Certifications Data");
            out.block(&json(&resume.certifications));
            out.section("LinkedIn Certifications Data");
            out.block(&json(&linkedin.education));
            out.section("Portfolio Certifications Information");
            out.line("Portfolio Summary", portfolio);
            out.section("Other Sources");
            out.line("Other Link Summary", other_link);
        }
        FieldKind::Achievements => {
            out.section("Resume Achievements Data");
            out.block(&json(&resume.achievements));
            out.section("LinkedIn Achievements Data");
            out.block(&json(&linkedin.education));
            out.section("Portfolio Achievements Information");
            out.line("Portfolio Summary", portfolio);
            out.section("Other Sources");
            out.line("Other Link Summary", other_link);
        }
    }

    let focus = jd.map(|jd| job_description_focus(kind, jd)).unwrap_or_default();
    if !focus.is_empty() {
        out.section("Job Description Focus");
        for (label, values) in focus {
            out.line(label, &values.join(", "));
        }
    }

    out.finish()
}

/// The slice of the job description each field is tuned against. Empty
/// entries are dropped; languages never take one.
pub fn job_description_focus(
    kind: FieldKind,
    jd: &JobDescriptionData,
) -> Vec<(&'static str, Vec<String>)> {
    if !kind.uses_job_description() {
        return Vec::new();
    }
    let title = || vec![jd.job_title.clone()];
    let slice: Vec<(&'static str, Vec<String>)> = match kind {
        FieldKind::BasicInformation => vec![("Target Job Title", title())],
        FieldKind::Experience => vec![
            ("Hard Skills", jd.hard_skills.clone()),
            ("Tools and Technologies", jd.tools_and_technologies.clone()),
            ("Responsibilities", jd.responsibilities.clone()),
            ("Action Verbs", jd.action_verbs.clone()),
        ],
        FieldKind::Education => vec![(
            "Required Qualifications",
            jd.required_qualifications.clone(),
        )],
        FieldKind::Skills => vec![
            ("Hard Skills", jd.hard_skills.clone()),
            ("Soft Skills", jd.soft_skills.clone()),
            ("Tools and Technologies", jd.tools_and_technologies.clone()),
        ],
        FieldKind::Languages => Vec::new(),
        FieldKind::Projects => vec![
            ("Hard Skills", jd.hard_skills.clone()),
            ("Tools and Technologies", jd.tools_and_technologies.clone()),
            ("Preferred Qualifications", jd.preferred_qualifications.clone()),
        ],
        FieldKind::Certifications => vec![
            ("Preferred Qualifications", jd.preferred_qualifications.clone()),
            ("Required Qualifications", jd.required_qualifications.clone()),
        ],
        FieldKind::Achievements => vec![
            ("Soft Skills", jd.soft_skills.clone()),
            ("Action Verbs", jd.action_verbs.clone()),
        ],
    };

    slice
        .into_iter()
        .map(|(label, values)| {
            let values: Vec<String> = values
                .into_iter()
                .filter(|v| !v.trim().is_empty())
                .collect();
            (label, values)
        })
        .filter(|(_, values)| !values.is_empty())
        .collect()
}

/// Runs one field aggregator. The returned token count is this call's alone.
pub async fn aggregate_field(
    extractor: &dyn Extractor,
    kind: FieldKind,
    basic: &BasicInformation,
    jd: Option<&JobDescriptionData>,
) -> AggregatedField {
    let tuned = jd.is_some_and(|jd| !job_description_focus(kind, jd).is_empty());
    let context = build_context(kind, basic, jd);
    let system = prompts::system_for(kind, tuned);
    debug!(field = kind.as_str(), tuned, chars = context.len(), "Running field aggregator");

    let extraction = match kind {
        FieldKind::BasicInformation => run::<BasicInformationField>(extractor, kind, &system, &context)
            .await
            .map(FieldPayload::BasicInformation),
        FieldKind::Experience => run::<ExperienceField>(extractor, kind, &system, &context)
            .await
            .map(FieldPayload::Experience),
        FieldKind::Education => run::<EducationField>(extractor, kind, &system, &context)
            .await
            .map(FieldPayload::Education),
        FieldKind::Skills => run::<SkillsField>(extractor, kind, &system, &context)
            .await
            .map(FieldPayload::Skills),
        FieldKind::Languages => run::<LanguagesField>(extractor, kind, &system, &context)
            .await
            .map(FieldPayload::Languages),
        FieldKind::Projects => run::<ProjectsField>(extractor, kind, &system, &context)
            .await
            .map(FieldPayload::Projects),
        FieldKind::Certifications => run::<CertificationsField>(extractor, kind, &system, &context)
            .await
            .map(FieldPayload::Certifications),
        FieldKind::Achievements => run::<AchievementsField>(extractor, kind, &system, &context)
            .await
            .map(FieldPayload::Achievements),
    };

    if let Err(e) = &extraction.outcome {
        warn!(field = kind.as_str(), tokens = extraction.tokens, "Field aggregation failed: {e}");
    }

    AggregatedField {
        kind,
        tokens: extraction.tokens,
        payload: extraction.into_value(),
    }
}

async fn run<T: serde::de::DeserializeOwned>(
    extractor: &dyn Extractor,
    kind: FieldKind,
    system: &str,
    context: &str,
) -> Extraction<T> {
    extract_step::<T>(extractor, kind.role(), system, context).await
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

struct ContextWriter {
    text: String,
}

impl ContextWriter {
    fn new(intro: String) -> Self {
        Self { text: intro }
    }

    fn section(&mut self, title: &str) {
        let _ = write!(self.text, "\n\n**{title}:**");
    }

    fn line(&mut self, label: &str, value: &str) {
        let _ = write!(self.text, "\n- {label}: {value}");
    }

    fn block(&mut self, value: &str) {
        let _ = write!(self.text, "\n{value}");
    }

    fn finish(mut self) -> String {
        self.text.push_str(
            "\n\nPlease analyze these sources, cross-reference the information, \
             and provide accurate, comprehensive and well-structured data.",
        );
        self.text
    }
}
