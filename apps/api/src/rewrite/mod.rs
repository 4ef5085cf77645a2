//! LinkedIn rewrite: seven section agents fanned out over one exported profile.
//!
//! Same isolation rules as field aggregation: results are routed by task id, a
//! panicking agent costs only its own section, and tokens are summed once.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::extraction::{ExtractError, Extraction, Extractor};

pub mod models;
pub mod prompts;

pub use models::{RewritePayload, RewriteSection, RewrittenSection};

use models::{
    CourseInfo, EducationInfo, ExperienceInfo, HonorAwardInfo, LanguageInfo, PersonalInfo,
    SkillInfo,
};

/// Runs one rewrite agent. The returned token count is this call's alone.
pub async fn rewrite_section(
    extractor: &dyn Extractor,
    section: RewriteSection,
    profile_text: &str,
) -> RewrittenSection {
    debug!(section = section.as_str(), chars = profile_text.len(), "Running rewrite agent");

    let extraction = match section {
        RewriteSection::PersonalInfo => run::<PersonalInfo>(extractor, section, profile_text)
            .await
            .map(RewritePayload::PersonalInfo),
        RewriteSection::Experience => run::<Vec<ExperienceInfo>>(extractor, section, profile_text)
            .await
            .map(RewritePayload::Experience),
        RewriteSection::Education => run::<Vec<EducationInfo>>(extractor, section, profile_text)
            .await
            .map(RewritePayload::Education),
        RewriteSection::Skills => run::<Vec<SkillInfo>>(extractor, section, profile_text)
            .await
            .map(RewritePayload::Skills),
        RewriteSection::Languages => run::<Vec<LanguageInfo>>(extractor, section, profile_text)
            .await
            .map(RewritePayload::Languages),
        RewriteSection::Courses => run::<Vec<CourseInfo>>(extractor, section, profile_text)
            .await
            .map(RewritePayload::Courses),
        RewriteSection::HonorsAwards => run::<Vec<HonorAwardInfo>>(extractor, section, profile_text)
            .await
            .map(RewritePayload::HonorsAwards),
    };

    if let Err(e) = &extraction.outcome {
        warn!(section = section.as_str(), tokens = extraction.tokens, "Rewrite failed: {e}");
    }

    RewrittenSection {
        section,
        tokens: extraction.tokens,
        payload: extraction.into_value(),
    }
}

/// One call whose answer is `{"<section key>": T}`, unwrapped to `T`.
async fn run<T: DeserializeOwned>(
    extractor: &dyn Extractor,
    section: RewriteSection,
    profile_text: &str,
) -> Extraction<T> {
    let key = section.as_str();
    let raw = extractor
        .extract(section.role(), prompts::system_for(section), profile_text)
        .await;

    let outcome = raw.outcome.and_then(|mut answer| {
        let inner = answer
            .get_mut(key)
            .map(Value::take)
            .ok_or_else(|| ExtractError::Failed(format!("answer has no '{key}'")))?;
        serde_json::from_value(inner)
            .map_err(|e| ExtractError::Failed(format!("schema mismatch for {key}: {e}")))
    });

    Extraction {
        tokens: raw.tokens,
        outcome,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RewriteResults {
    /// Every section is present; failed ones carry `payload: None`.
    pub sections: BTreeMap<RewriteSection, RewrittenSection>,
    pub total_tokens: u64,
    pub timed_out: bool,
}

impl RewriteResults {
    pub fn payload(&self, section: RewriteSection) -> Option<&RewritePayload> {
        self.sections.get(&section).and_then(|s| s.payload.as_ref())
    }

    /// The profile cannot be rewritten without its personal section.
    pub fn error(&self) -> Option<&'static str> {
        self.payload(RewriteSection::PersonalInfo)
            .is_none()
            .then_some("No personal info found")
    }

    /// Section keys in order. A failed personal section is `null`, a failed
    /// list section is `[]`.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for section in RewriteSection::ALL {
            let value = self
                .payload(section)
                .and_then(|p| serde_json::to_value(p).ok())
                .unwrap_or_else(|| {
                    if section.is_list() {
                        Value::Array(Vec::new())
                    } else {
                        Value::Null
                    }
                });
            map.insert(section.as_str().to_string(), value);
        }
        Value::Object(map)
    }

    pub fn failed_sections(&self) -> Vec<&'static str> {
        self.sections
            .values()
            .filter(|s| s.payload.is_none())
            .map(|s| s.section.as_str())
            .collect()
    }
}

/// Runs all seven rewrite agents concurrently over the same profile text.
/// Agents still running at `deadline` are aborted and their sections left empty.
pub async fn rewrite_all(
    extractor: Arc<dyn Extractor>,
    profile_text: Arc<str>,
    deadline: Instant,
) -> RewriteResults {
    let mut tasks = JoinSet::new();
    let mut pending = HashMap::new();
    for section in RewriteSection::ALL {
        let extractor = extractor.clone();
        let text = profile_text.clone();
        let handle = tasks.spawn(async move {
            rewrite_section(extractor.as_ref(), section, &text).await
        });
        pending.insert(handle.id(), section);
    }

    let mut sections = BTreeMap::new();
    let mut timed_out = false;
    while !tasks.is_empty() {
        match tokio::time::timeout_at(deadline, tasks.join_next_with_id()).await {
            Ok(Some(Ok((id, rewritten)))) => {
                pending.remove(&id);
                sections.insert(rewritten.section, rewritten);
            }
            Ok(Some(Err(e))) => {
                if let Some(section) = pending.remove(&e.id()) {
                    error!(section = section.as_str(), "Rewrite agent failed: {e}");
                }
            }
            Ok(None) => break,
            Err(_) => {
                tasks.abort_all();
                timed_out = true;
                for section in pending.values() {
                    warn!(section = section.as_str(), "Deadline passed, rewrite agent aborted");
                }
                break;
            }
        }
    }

    for section in RewriteSection::ALL {
        sections
            .entry(section)
            .or_insert_with(|| RewrittenSection::empty(section));
    }

    let total_tokens = sections.values().map(|s| s.tokens).sum();
    let completed = sections.values().filter(|s| s.payload.is_some()).count();
    info!(total_tokens, completed, timed_out, "LinkedIn rewrite finished");

    RewriteResults {
        sections,
        total_tokens,
        timed_out,
    }
}
