//! Agent orchestration: the eight field aggregators fanned out over one shared,
//! read-only `BasicInformation`.
//!
//! Each aggregator reports only its own call's tokens; `run_all` sums them
//! exactly once. A panicking aggregator costs only its own field. Aggregators
//! cancelled from outside (a scheduling failure, not a failed call) are re-run
//! in fixed-size batches with a pause between batches.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::task::{AbortHandle, JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::collection::{BasicInformation, JobDescriptionData};
use crate::extraction::Extractor;

pub mod fields;
pub mod models;
pub mod prompts;

pub use fields::aggregate_field;
pub use models::{AggregatedField, FieldKind, FieldPayload};

/// A join-level failure of one aggregator task, as opposed to a failed call.
#[derive(Debug, Error, PartialEq)]
pub enum SchedulingError {
    #[error("aggregator for {0} panicked")]
    Panicked(&'static str),
    #[error("aggregator for {0} was cancelled")]
    Cancelled(&'static str),
}

impl SchedulingError {
    fn from_join(kind: FieldKind, e: &JoinError) -> Self {
        if e.is_cancelled() {
            SchedulingError::Cancelled(kind.as_str())
        } else {
            SchedulingError::Panicked(kind.as_str())
        }
    }
}

/// Degraded execution used when the concurrent fan-out is disrupted.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub batch_size: usize,
    pub batch_pause: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: 4,
            batch_pause: Duration::from_secs(1),
        }
    }
}

/// Shared, read-only inputs of every aggregator in one request.
#[derive(Clone)]
pub struct AgentInputs {
    pub extractor: Arc<dyn Extractor>,
    pub basic: Arc<BasicInformation>,
    pub jd: Option<Arc<JobDescriptionData>>,
}

impl AgentInputs {
    async fn aggregate(self, kind: FieldKind) -> AggregatedField {
        aggregate_field(self.extractor.as_ref(), kind, &self.basic, self.jd.as_deref()).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResults {
    /// Every field kind is present; failed ones carry `payload: None`.
    pub fields: BTreeMap<FieldKind, AggregatedField>,
    /// Sum of the eight aggregators' own calls.
    pub total_tokens: u64,
    pub timed_out: bool,
    pub used_fallback: bool,
}

impl AnalysisResults {
    /// Every field empty: the deadline passed before aggregation could start.
    pub fn expired() -> Self {
        Self {
            fields: FieldKind::ALL
                .into_iter()
                .map(|kind| (kind, AggregatedField::empty(kind)))
                .collect(),
            total_tokens: 0,
            timed_out: true,
            used_fallback: false,
        }
    }

    pub fn payload(&self, kind: FieldKind) -> Option<&FieldPayload> {
        self.fields.get(&kind).and_then(|f| f.payload.as_ref())
    }

    /// `{field_name: payload | null}` in field order.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for kind in FieldKind::ALL {
            let value = self
                .payload(kind)
                .and_then(|p| serde_json::to_value(p).ok())
                .unwrap_or(Value::Null);
            map.insert(kind.as_str().to_string(), value);
        }
        Value::Object(map)
    }
}

/// The running fan-out: tasks keyed by id so results route by identity.
pub struct FanOut {
    tasks: JoinSet<AggregatedField>,
    pending: HashMap<tokio::task::Id, FieldKind>,
    handles: BTreeMap<FieldKind, AbortHandle>,
}

impl FanOut {
    pub fn spawn(inputs: &AgentInputs) -> Self {
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::new();
        let mut handles = BTreeMap::new();

        for kind in FieldKind::ALL {
            let handle = tasks.spawn(inputs.clone().aggregate(kind));
            pending.insert(handle.id(), kind);
            handles.insert(kind, handle);
        }

        Self {
            tasks,
            pending,
            handles,
        }
    }

    #[cfg(test)]
    pub fn abort_handle(&self, kind: FieldKind) -> Option<&AbortHandle> {
        self.handles.get(&kind)
    }
}

#[derive(Default)]
struct Drained {
    fields: Vec<AggregatedField>,
    cancelled: Vec<FieldKind>,
    timed_out: bool,
}

async fn drain(mut fan_out: FanOut, deadline: Instant) -> Drained {
    let mut drained = Drained::default();

    while !fan_out.tasks.is_empty() {
        match tokio::time::timeout_at(deadline, fan_out.tasks.join_next_with_id()).await {
            Ok(Some(Ok((id, field)))) => {
                fan_out.pending.remove(&id);
                drained.fields.push(field);
            }
            Ok(Some(Err(e))) => {
                let Some(kind) = fan_out.pending.remove(&e.id()) else {
                    continue;
                };
                match SchedulingError::from_join(kind, &e) {
                    err @ SchedulingError::Cancelled(_) => {
                        warn!(field = kind.as_str(), "{err}");
                        drained.cancelled.push(kind);
                    }
                    err @ SchedulingError::Panicked(_) => {
                        error!(field = kind.as_str(), "{err}: {e}");
                        drained.fields.push(AggregatedField::empty(kind));
                    }
                }
            }
            Ok(None) => break,
            Err(_) => {
                fan_out.tasks.abort_all();
                drained.timed_out = true;
                for kind in fan_out.pending.values() {
                    warn!(field = kind.as_str(), "Deadline passed, aggregator aborted");
                }
                break;
            }
        }
    }

    drained.cancelled.sort();
    drained
}

/// Runs `kinds` batch by batch: each batch fully joined, then a pause.
pub async fn run_batched(
    inputs: &AgentInputs,
    kinds: &[FieldKind],
    batching: &BatchSettings,
    deadline: Instant,
) -> (Vec<AggregatedField>, bool) {
    let mut fields = Vec::with_capacity(kinds.len());

    for (index, batch) in kinds.chunks(batching.batch_size.max(1)).enumerate() {
        if index > 0
            && tokio::time::timeout_at(deadline, tokio::time::sleep(batching.batch_pause))
                .await
                .is_err()
        {
            return (fields, true);
        }

        info!(batch = index + 1, fields = batch.len(), "Running aggregator batch");
        let mut handles: Vec<_> = batch
            .iter()
            .map(|&kind| (kind, tokio::spawn(inputs.clone().aggregate(kind))))
            .collect();

        let joined =
            tokio::time::timeout_at(deadline, join_all(handles.iter_mut().map(|(_, h)| h))).await;

        let Ok(results) = joined else {
            for (_, handle) in &handles {
                handle.abort();
            }
            return (fields, true);
        };

        for ((kind, _), result) in handles.iter().zip(results) {
            match result {
                Ok(field) => fields.push(field),
                Err(e) => {
                    let err = SchedulingError::from_join(*kind, &e);
                    error!(field = kind.as_str(), "{err} in batch");
                    fields.push(AggregatedField::empty(*kind));
                }
            }
        }
    }

    (fields, false)
}

/// Joins a running fan-out, re-runs cancelled aggregators in batches, and
/// reduces everything into one result with every field present.
pub async fn finish(
    inputs: &AgentInputs,
    fan_out: FanOut,
    batching: &BatchSettings,
    deadline: Instant,
) -> AnalysisResults {
    let drained = drain(fan_out, deadline).await;
    let mut timed_out = drained.timed_out;
    let used_fallback = !drained.cancelled.is_empty() && !timed_out;

    let mut fields: BTreeMap<FieldKind, AggregatedField> = drained
        .fields
        .into_iter()
        .map(|field| (field.kind, field))
        .collect();

    if used_fallback {
        warn!(
            fields = drained.cancelled.len(),
            batch_size = batching.batch_size,
            "Concurrent aggregation disrupted, falling back to batches"
        );
        let (rerun, batch_timed_out) =
            run_batched(inputs, &drained.cancelled, batching, deadline).await;
        timed_out |= batch_timed_out;
        for field in rerun {
            fields.insert(field.kind, field);
        }
    }

    for kind in FieldKind::ALL {
        fields.entry(kind).or_insert_with(|| AggregatedField::empty(kind));
    }

    let total_tokens = fields.values().map(|f| f.tokens).sum();
    let completed = fields.values().filter(|f| f.payload.is_some()).count();
    info!(total_tokens, completed, timed_out, "Field aggregation finished");

    AnalysisResults {
        fields,
        total_tokens,
        timed_out,
        used_fallback,
    }
}

/// Runs all eight field aggregators concurrently.
pub async fn run_all(
    inputs: &AgentInputs,
    batching: &BatchSettings,
    deadline: Instant,
) -> AnalysisResults {
    let fan_out = FanOut::spawn(inputs);
    finish(inputs, fan_out, batching, deadline).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::extraction::testing::ScriptedExtractor;
    use crate::extraction::AgentRole;

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(600)
    }

    fn answer(kind: FieldKind) -> serde_json::Value {
        match kind {
            FieldKind::BasicInformation => json!({"steps": [{"full_name": "Ada Lovelace"}]}),
            other => json!({"steps": [{ other.as_str(): [] }]}),
        }
    }

    /// Every field answers; field `i` costs `(i + 1) * 100` tokens.
    fn scripted() -> ScriptedExtractor {
        FieldKind::ALL
            .into_iter()
            .enumerate()
            .fold(ScriptedExtractor::new(), |extractor, (i, kind)| {
                extractor.respond(kind.role(), answer(kind), (i as u64 + 1) * 100)
            })
    }

    fn inputs(extractor: Arc<ScriptedExtractor>, jd: Option<JobDescriptionData>) -> AgentInputs {
        let mut basic = BasicInformation::default();
        basic.resume.tokens = 5_000;
        basic.github.tokens = 2_000;
        basic.portfolio.tokens = 700;
        AgentInputs {
            extractor,
            basic: Arc::new(basic),
            jd: jd.map(Arc::new),
        }
    }

    #[tokio::test]
    async fn test_run_all_conserves_tokens() {
        let extractor = Arc::new(scripted());

        let results = run_all(
            &inputs(extractor.clone(), None),
            &BatchSettings::default(),
            far_deadline(),
        )
        .await;

        // 100 + 200 + ... + 800; upstream source tokens are not re-added.
        assert_eq!(results.total_tokens, 3_600);
        assert_eq!(results.total_tokens, extractor.served_tokens());
        assert_eq!(results.fields.len(), 8);
        assert!(results.fields.values().all(|f| f.payload.is_some()));
        assert!(!results.used_fallback);
        assert!(!results.timed_out);
    }

    #[tokio::test]
    async fn test_one_failed_aggregator_leaves_seven() {
        let extractor = Arc::new(
            FieldKind::ALL
                .into_iter()
                .filter(|k| *k != FieldKind::Skills)
                .fold(ScriptedExtractor::new(), |e, kind| e.respond(kind.role(), answer(kind), 10))
                .fail(AgentRole::FieldSkills, 3),
        );

        let results = run_all(
            &inputs(extractor.clone(), None),
            &BatchSettings::default(),
            far_deadline(),
        )
        .await;

        assert!(results.payload(FieldKind::Skills).is_none());
        assert_eq!(
            results.fields.values().filter(|f| f.payload.is_some()).count(),
            7
        );
        assert_eq!(results.total_tokens, 7 * 10 + 3);
        assert_eq!(results.to_json()["skills"], Value::Null);
    }

    #[tokio::test]
    async fn test_panicking_aggregator_is_isolated() {
        let extractor = Arc::new(
            FieldKind::ALL
                .into_iter()
                .filter(|k| *k != FieldKind::Projects)
                .fold(ScriptedExtractor::new(), |e, kind| e.respond(kind.role(), answer(kind), 10))
                .panic_on(AgentRole::FieldProjects),
        );

        let results = run_all(
            &inputs(extractor, None),
            &BatchSettings::default(),
            far_deadline(),
        )
        .await;

        assert!(results.payload(FieldKind::Projects).is_none());
        assert_eq!(results.fields[&FieldKind::Projects].tokens, 0);
        assert_eq!(results.total_tokens, 70);
        assert!(!results.used_fallback);
    }

    #[tokio::test]
    async fn test_every_tuned_aggregator_sees_jd_context() {
        let extractor = Arc::new(scripted());
        let jd = JobDescriptionData {
            job_title: "Platform Engineer".to_string(),
            hard_skills: vec!["Kubernetes".to_string()],
            soft_skills: vec!["mentoring".to_string()],
            tools_and_technologies: vec!["Terraform".to_string()],
            responsibilities: vec!["own the platform".to_string()],
            required_qualifications: vec!["BSc".to_string()],
            preferred_qualifications: vec!["CKA".to_string()],
            action_verbs: vec!["led".to_string()],
            ..JobDescriptionData::default()
        };

        run_all(
            &inputs(extractor.clone(), Some(jd)),
            &BatchSettings::default(),
            far_deadline(),
        )
        .await;

        for kind in FieldKind::ALL {
            let input = &extractor.inputs_for(kind.role())[0];
            assert_eq!(
                input.contains("**Job Description Focus:**"),
                kind != FieldKind::Languages,
                "{}",
                kind.as_str()
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_aggregators_rerun_in_batches() {
        let extractor = Arc::new(
            FieldKind::ALL.into_iter().fold(scripted(), |e, kind| {
                e.delay(kind.role(), Duration::from_millis(50))
            }),
        );
        let inputs = inputs(extractor.clone(), None);

        let fan_out = FanOut::spawn(&inputs);
        for kind in [FieldKind::Education, FieldKind::Achievements] {
            fan_out.abort_handle(kind).unwrap().abort();
        }
        let results = finish(&inputs, fan_out, &BatchSettings::default(), far_deadline()).await;

        assert!(results.used_fallback);
        assert!(results.fields.values().all(|f| f.payload.is_some()));
        assert_eq!(results.total_tokens, 3_600);
        assert_eq!(extractor.call_count(AgentRole::FieldEducation), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_batched_bounds_batches_and_pauses() {
        let extractor = Arc::new(
            FieldKind::ALL.into_iter().fold(scripted(), |e, kind| {
                e.delay(kind.role(), Duration::from_millis(100))
            }),
        );
        let inputs = inputs(extractor.clone(), None);
        let batching = BatchSettings {
            batch_size: 3,
            batch_pause: Duration::from_secs(1),
        };

        let started = Instant::now();
        let (fields, timed_out) =
            run_batched(&inputs, &FieldKind::ALL, &batching, far_deadline()).await;

        assert!(!timed_out);
        assert_eq!(fields.len(), 8);
        assert_eq!(extractor.max_in_flight(), 3);
        // three batches, two pauses
        assert!(started.elapsed() >= Duration::from_millis(2_300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_keeps_finished_fields() {
        let extractor = Arc::new(scripted().delay(AgentRole::FieldExperience, Duration::from_secs(300)));
        let deadline = Instant::now() + Duration::from_secs(10);

        let results = run_all(&inputs(extractor, None), &BatchSettings::default(), deadline).await;

        assert!(results.timed_out);
        assert!(results.payload(FieldKind::Experience).is_none());
        assert_eq!(results.fields[&FieldKind::Experience].tokens, 0);
        assert_eq!(results.fields.values().filter(|f| f.payload.is_some()).count(), 7);
        assert_eq!(results.total_tokens, 3_600 - 200);
    }
}
