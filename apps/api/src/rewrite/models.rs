use serde::{Deserialize, Serialize};

use crate::extraction::AgentRole;

/// Sections of a rewritten LinkedIn profile. Declaration order is response order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteSection {
    PersonalInfo,
    Experience,
    Education,
    Skills,
    Languages,
    Courses,
    HonorsAwards,
}

impl RewriteSection {
    pub const ALL: [RewriteSection; 7] = [
        RewriteSection::PersonalInfo,
        RewriteSection::Experience,
        RewriteSection::Education,
        RewriteSection::Skills,
        RewriteSection::Languages,
        RewriteSection::Courses,
        RewriteSection::HonorsAwards,
    ];

    /// Response key, and the key the model answers under.
    pub fn as_str(&self) -> &'static str {
        match self {
            RewriteSection::PersonalInfo => "personal_info",
            RewriteSection::Experience => "experience_info",
            RewriteSection::Education => "education_info",
            RewriteSection::Skills => "skill_info",
            RewriteSection::Languages => "language_info",
            RewriteSection::Courses => "courses_info",
            RewriteSection::HonorsAwards => "honors_awards_info",
        }
    }

    pub fn role(&self) -> AgentRole {
        match self {
            RewriteSection::PersonalInfo => AgentRole::RewritePersonalInfo,
            RewriteSection::Experience => AgentRole::RewriteExperience,
            RewriteSection::Education => AgentRole::RewriteEducation,
            RewriteSection::Skills => AgentRole::RewriteSkills,
            RewriteSection::Languages => AgentRole::RewriteLanguages,
            RewriteSection::Courses => AgentRole::RewriteCourses,
            RewriteSection::HonorsAwards => AgentRole::RewriteHonorsAwards,
        }
    }

    /// Every section but personal info is a list.
    pub fn is_list(&self) -> bool {
        !matches!(self, RewriteSection::PersonalInfo)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub location: String,
    /// Headline.
    pub description: String,
    pub about: String,
    pub current_company: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceInfo {
    pub company_name: String,
    pub position: String,
    pub location: String,
    pub skill_set: Vec<String>,
    pub job_type: String,
    pub duration: DateRange,
    pub additional_information: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationInfo {
    pub name_of_the_institution: String,
    pub degree_name: String,
    pub field_of_study: String,
    pub location: String,
    pub duration: DateRange,
    pub additional_information: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillInfo {
    pub skill_category: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageInfo {
    pub language_name: String,
    pub proficiency_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseInfo {
    pub course_name: String,
    pub associated_with: String,
    pub issuing_organization: String,
    pub completion_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HonorAwardInfo {
    pub award_name: String,
    pub issuing_organization: String,
    pub date_received: String,
    pub description: String,
}

/// One variant per section, serialized without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RewritePayload {
    PersonalInfo(PersonalInfo),
    Experience(Vec<ExperienceInfo>),
    Education(Vec<EducationInfo>),
    Skills(Vec<SkillInfo>),
    Languages(Vec<LanguageInfo>),
    Courses(Vec<CourseInfo>),
    HonorsAwards(Vec<HonorAwardInfo>),
}

/// Output of one rewrite agent: the payload (`None` on failure) and the
/// tokens of its own call.
#[derive(Debug, Clone, PartialEq)]
pub struct RewrittenSection {
    pub section: RewriteSection,
    pub payload: Option<RewritePayload>,
    pub tokens: u64,
}

impl RewrittenSection {
    pub fn empty(section: RewriteSection) -> Self {
        Self {
            section,
            payload: None,
            tokens: 0,
        }
    }
}
