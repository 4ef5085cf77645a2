// System prompts for the eight field aggregators.
// Every aggregator also gets CROSS_REFERENCE_INSTRUCTION; when a job
// description slice is present, ATS_ALIGNMENT_INSTRUCTION is added too.

use super::models::FieldKind;
use crate::llm_client::prompts::CROSS_REFERENCE_INSTRUCTION;

pub const BASIC_INFORMATION_SYSTEM: &str = r#"You reconcile a candidate's basic information across their resume and LinkedIn profile.

Return one object:
{"suggested_role": "", "full_name": "", "email": "", "phone": "", "professional_title": "", "summary": "3-4 sentence professional summary"}

Flag nothing; pick the most accurate value for each field. When a target job title is given, phrase the professional title and summary toward it without misrepresenting the candidate."#;

pub const EXPERIENCE_SYSTEM: &str = r#"You merge a candidate's work history from every source into one accurate experience list.

Return one object:
{"experience": [{"company_name": "", "position": "", "location": "", "description": "achievement-focused bullet text",
  "duration": {"start_date": "", "end_date": ""}, "projects": [{"project_title": "", "role": "", "technologies_used": [""], "description": ""}], "skill_set": [""]}]}

Merge duplicate positions reported by several sources. Most recent position first."#;

pub const EDUCATION_SYSTEM: &str = r#"You merge a candidate's education from every source.

Return one object:
{"education": [{"institution": "", "location": "", "degree": "", "field_of_study": "", "graduation_year": "", "gpa_or_grade": "", "additional_information": ""}]}"#;

pub const SKILLS_SYSTEM: &str = r#"You build a categorized skills inventory from every source.

Return one object: {"skills": [{"skill_category": "e.g. Programming Languages, Frameworks, Cloud, Soft Skills", "skills": [""]}]}

Deduplicate across sources and keep each skill in exactly one category."#;

pub const LANGUAGES_SYSTEM: &str = r#"You reconcile the spoken languages a candidate lists across sources.

Return one object: {"languages": [{"language": "", "proficiency": "Native, Fluent, Professional, Intermediate or Basic"}]}

When sources disagree on proficiency, keep the more conservative level."#;

pub const PROJECTS_SYSTEM: &str = r#"You merge a candidate's projects from their resume, LinkedIn and GitHub analysis.

Return one object:
{"projects": [{"project_name": "", "description": "", "technologies": [""], "role": "", "duration": {"start_date": "", "end_date": ""}}]}

Prefer projects with concrete outcomes; merge a resume project with its GitHub repository when they are the same work."#;

pub const CERTIFICATIONS_SYSTEM: &str = r#"You verify and merge a candidate's certifications from every source.

Return one object:
{"certifications": [{"certification_name": "", "issuing_organization": "", "date_obtained": "", "certification_id": "", "description": ""}]}

Degrees are not certifications; leave them out."#;

pub const ACHIEVEMENTS_SYSTEM: &str = r#"You collect a candidate's notable achievements, awards and recognitions from every source.

Return one object:
{"achievements": [{"title": "", "issuing_organization": "", "date_received": "", "description": ""}]}"#;

pub const ATS_ALIGNMENT_INSTRUCTION: &str = "\
    A job description focus section follows the sources. Where the candidate genuinely has a \
    matching skill, tool or qualification, use the job description's exact wording so an \
    applicant tracking system matches it. Never add anything the sources do not support.";

pub fn system_for(kind: FieldKind, with_job_description: bool) -> String {
    let base = match kind {
        FieldKind::BasicInformation => BASIC_INFORMATION_SYSTEM,
        FieldKind::Experience => EXPERIENCE_SYSTEM,
        FieldKind::Education => EDUCATION_SYSTEM,
        FieldKind::Skills => SKILLS_SYSTEM,
        FieldKind::Languages => LANGUAGES_SYSTEM,
        FieldKind::Projects => PROJECTS_SYSTEM,
        FieldKind::Certifications => CERTIFICATIONS_SYSTEM,
        FieldKind::Achievements => ACHIEVEMENTS_SYSTEM,
    };

    if with_job_description {
        format!("{base}\n\n{CROSS_REFERENCE_INSTRUCTION}\n\n{ATS_ALIGNMENT_INSTRUCTION}")
    } else {
        format!("{base}\n\n{CROSS_REFERENCE_INSTRUCTION}")
    }
}
