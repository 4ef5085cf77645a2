//! Normalized per-source records and the schema entries they are built from.
//!
//! Every struct here is `#[serde(default)]`: a model answer that omits a key
//! still deserializes, and `Default` is the zero-value form a failed collector
//! hands downstream.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Resume,
    Linkedin,
    Github,
    Portfolio,
    OtherLink,
    JobDescription,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Resume => "resume",
            SourceKind::Linkedin => "linkedin",
            SourceKind::Github => "github",
            SourceKind::Portfolio => "portfolio",
            SourceKind::OtherLink => "other_link",
            SourceKind::JobDescription => "job_description",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a record holds only defaults (or only part of its data).
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{kind} collection failed: {message}")]
pub struct SourceError {
    pub kind: SourceKind,
    pub message: String,
}

impl SourceError {
    pub fn new(kind: SourceKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(kind: SourceKind) -> Self {
        Self::new(kind, "source unavailable")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Schema entries shared by collectors and field aggregators
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub start_date: String,
    /// "Present" for an ongoing role.
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceProject {
    pub project_title: String,
    pub role: String,
    pub technologies_used: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub company_name: String,
    pub position: String,
    pub duration: DateRange,
    pub location: String,
    pub description: String,
    pub projects: Vec<ExperienceProject>,
    pub skill_set: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub institution: String,
    pub location: String,
    pub degree: String,
    pub field_of_study: String,
    pub graduation_year: String,
    pub gpa_or_grade: String,
    pub additional_information: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageEntry {
    pub language: String,
    pub proficiency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub project_name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub role: String,
    pub duration: DateRange,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationEntry {
    pub certification_name: String,
    pub issuing_organization: String,
    pub date_obtained: String,
    pub certification_id: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementEntry {
    pub title: String,
    pub issuing_organization: String,
    pub date_received: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillGroup {
    pub skill_category: String,
    pub skills: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Resume
// ────────────────────────────────────────────────────────────────────────────

/// Answer of the full resume parse.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResumeProfile {
    pub suggested_role: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub professional_title: String,
    pub summary: String,
    /// "<N> years" or "<N> months", computed by the model.
    pub years_of_experience: String,
    pub education: Vec<EducationEntry>,
    pub languages: Vec<LanguageEntry>,
    pub projects: Vec<ProjectEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub achievements: Vec<AchievementEntry>,
    pub skills: Vec<SkillGroup>,
}

/// Answer of the per-company experience parse.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResumeExperience {
    pub experience: Vec<ExperienceEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumeRecord {
    pub suggested_role: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub professional_title: String,
    pub summary: String,
    pub experience_in_years: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub languages: Vec<LanguageEntry>,
    pub projects: Vec<ProjectEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub achievements: Vec<AchievementEntry>,
    pub skills: Vec<SkillGroup>,
    pub tokens: u64,
    pub error: Option<SourceError>,
}

// ────────────────────────────────────────────────────────────────────────────
// LinkedIn
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedinBasicInfo {
    pub name: String,
    pub location: String,
    pub position: String,
    pub about: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedinPosition {
    pub position: String,
    pub company_name: String,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedinEducation {
    pub institution: String,
    pub degree_name: String,
    pub field_of_study: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedinCertification {
    pub certification_name: String,
    pub issuing_organization: String,
    pub certification_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedinLanguage {
    pub language_name: String,
    pub proficiency_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedinProject {
    pub project_name: String,
    pub description: String,
    pub technologies_used: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkedinExperienceList {
    pub experience: Vec<LinkedinPosition>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkedinEducationList {
    pub education: Vec<LinkedinEducation>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkedinCertificationsLanguages {
    pub certifications: Vec<LinkedinCertification>,
    pub languages: Vec<LinkedinLanguage>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkedinProjectList {
    pub projects: Vec<LinkedinProject>,
}

/// One line of the LinkedIn education section: a degree or a certification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkedinCredential {
    Education(LinkedinEducation),
    Certification(LinkedinCertification),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkedinRecord {
    pub basic_information: LinkedinBasicInfo,
    /// The headline position.
    pub professional_summary: String,
    pub experience: Vec<LinkedinPosition>,
    pub education: Vec<LinkedinCredential>,
    pub projects: Vec<LinkedinProject>,
    pub languages: Vec<LinkedinLanguage>,
    pub tokens: u64,
    pub error: Option<SourceError>,
}

// ────────────────────────────────────────────────────────────────────────────
// GitHub, portfolio, other link
// ────────────────────────────────────────────────────────────────────────────

/// Model answer for one GitHub profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GithubAnalysis {
    pub summary_of_all_repositories: String,
    pub overall_analysis: String,
    pub skills: Vec<String>,
}

/// Narrative assessment of a GitHub profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GithubRecord {
    pub summary_of_all_repositories: String,
    pub overall_analysis: String,
    pub skills: Vec<String>,
    pub tokens: u64,
    pub error: Option<SourceError>,
}

impl GithubRecord {
    pub fn from_analysis(analysis: GithubAnalysis, tokens: u64) -> Self {
        Self {
            summary_of_all_repositories: analysis.summary_of_all_repositories,
            overall_analysis: analysis.overall_analysis,
            skills: analysis.skills,
            tokens,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortfolioAnalysis {
    pub summary_of_portfolio: String,
}

/// Portfolio and other-link pages share one record shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkSummaryRecord {
    pub summary: String,
    pub tokens: u64,
    pub error: Option<SourceError>,
}

// ────────────────────────────────────────────────────────────────────────────
// Job description
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDescriptionData {
    pub job_title: String,
    pub hard_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub tools_and_technologies: Vec<String>,
    pub responsibilities: Vec<String>,
    pub required_qualifications: Vec<String>,
    pub preferred_qualifications: Vec<String>,
    pub action_verbs: Vec<String>,
    #[serde(skip_deserializing)]
    pub tokens: u64,
    #[serde(skip_deserializing)]
    pub error: Option<SourceError>,
}
