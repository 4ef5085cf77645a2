use serde::{Deserialize, Serialize};

use crate::collection::models::{
    AchievementEntry, CertificationEntry, EducationEntry, ExperienceEntry, LanguageEntry,
    ProjectEntry, SkillGroup,
};
use crate::extraction::AgentRole;

/// The eight output field groups. Declaration order is response order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    BasicInformation,
    Experience,
    Education,
    Skills,
    Languages,
    Projects,
    Certifications,
    Achievements,
}

impl FieldKind {
    pub const ALL: [FieldKind; 8] = [
        FieldKind::BasicInformation,
        FieldKind::Experience,
        FieldKind::Education,
        FieldKind::Skills,
        FieldKind::Languages,
        FieldKind::Projects,
        FieldKind::Certifications,
        FieldKind::Achievements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::BasicInformation => "basic_information",
            FieldKind::Experience => "experience",
            FieldKind::Education => "education",
            FieldKind::Skills => "skills",
            FieldKind::Languages => "languages",
            FieldKind::Projects => "projects",
            FieldKind::Certifications => "certifications",
            FieldKind::Achievements => "achievements",
        }
    }

    pub fn role(&self) -> AgentRole {
        match self {
            FieldKind::BasicInformation => AgentRole::FieldBasicInformation,
            FieldKind::Experience => AgentRole::FieldExperience,
            FieldKind::Education => AgentRole::FieldEducation,
            FieldKind::Skills => AgentRole::FieldSkills,
            FieldKind::Languages => AgentRole::FieldLanguages,
            FieldKind::Projects => AgentRole::FieldProjects,
            FieldKind::Certifications => AgentRole::FieldCertifications,
            FieldKind::Achievements => AgentRole::FieldAchievements,
        }
    }

    /// Language proficiency does not depend on the target job.
    pub fn uses_job_description(&self) -> bool {
        !matches!(self, FieldKind::Languages)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicInformationField {
    pub suggested_role: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub professional_title: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceField {
    pub experience: Vec<ExperienceEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationField {
    pub education: Vec<EducationEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsField {
    pub skills: Vec<SkillGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagesField {
    pub languages: Vec<LanguageEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsField {
    pub projects: Vec<ProjectEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationsField {
    pub certifications: Vec<CertificationEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementsField {
    pub achievements: Vec<AchievementEntry>,
}

/// One variant per field kind. Serialized without a tag: each payload
/// appears under its field name in the response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldPayload {
    BasicInformation(BasicInformationField),
    Experience(ExperienceField),
    Education(EducationField),
    Skills(SkillsField),
    Languages(LanguagesField),
    Projects(ProjectsField),
    Certifications(CertificationsField),
    Achievements(AchievementsField),
}

/// Output of one field aggregator: the payload (`None` on failure) and the
/// tokens of that aggregator's own call.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedField {
    pub kind: FieldKind,
    pub payload: Option<FieldPayload>,
    pub tokens: u64,
}

impl AggregatedField {
    pub fn empty(kind: FieldKind) -> Self {
        Self {
            kind,
            payload: None,
            tokens: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kind_keys_are_unique() {
        let mut keys: Vec<&str> = FieldKind::ALL.iter().map(|k| k.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 8);
    }

    #[test]
    fn test_only_languages_skips_job_description() {
        let without: Vec<FieldKind> = FieldKind::ALL
            .into_iter()
            .filter(|k| !k.uses_job_description())
            .collect();
        assert_eq!(without, vec![FieldKind::Languages]);
    }

    #[test]
    fn test_payload_serializes_untagged() {
        let payload = FieldPayload::Skills(SkillsField {
            skills: vec![SkillGroup {
                skill_category: "Languages".to_string(),
                skills: vec!["Rust".to_string()],
            }],
        });
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["skills"][0]["skill_category"], "Languages");
    }
}
