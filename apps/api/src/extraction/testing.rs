//! Scripted in-memory `Extractor` for tests: canned answers per role, a spy
//! log of every prompt received, and in-flight tracking.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{AgentRole, Extraction, Extractor};

#[derive(Debug, Clone)]
pub enum Scripted {
    Json(Value, u64),
    Text(String, u64),
    Refuse(u64),
    Fail(u64),
    Panic,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub role: AgentRole,
    pub system: String,
    pub input: String,
}

#[derive(Default)]
pub struct ScriptedExtractor {
    scripts: Mutex<HashMap<AgentRole, VecDeque<Scripted>>>,
    delays: HashMap<AgentRole, Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    served_tokens: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, role: AgentRole, value: Value, tokens: u64) -> Self {
        self.script(role, Scripted::Json(value, tokens))
    }

    pub fn respond_text(self, role: AgentRole, text: &str, tokens: u64) -> Self {
        self.script(role, Scripted::Text(text.to_string(), tokens))
    }

    pub fn refuse(self, role: AgentRole, tokens: u64) -> Self {
        self.script(role, Scripted::Refuse(tokens))
    }

    pub fn fail(self, role: AgentRole, tokens: u64) -> Self {
        self.script(role, Scripted::Fail(tokens))
    }

    pub fn panic_on(self, role: AgentRole) -> Self {
        self.script(role, Scripted::Panic)
    }

    /// Queues an answer. Answers are consumed in order; the last one repeats.
    pub fn script(self, role: AgentRole, answer: Scripted) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(role)
            .or_default()
            .push_back(answer);
        self
    }

    pub fn delay(mut self, role: AgentRole, delay: Duration) -> Self {
        self.delays.insert(role, delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn inputs_for(&self, role: AgentRole) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.role == role)
            .map(|c| c.input)
            .collect()
    }

    pub fn call_count(&self, role: AgentRole) -> usize {
        self.inputs_for(role).len()
    }

    /// Sum of the token counts handed out so far, across every role.
    pub fn served_tokens(&self) -> u64 {
        self.served_tokens.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_answer(&self, role: AgentRole) -> Option<Scripted> {
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts.get_mut(&role)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    async fn answer(&self, role: AgentRole, system: &str, input: &str) -> Option<Scripted> {
        self.calls.lock().unwrap().push(RecordedCall {
            role,
            system: system.to_string(),
            input: input.to_string(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&role) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let answer = self.next_answer(role);
        let tokens = match &answer {
            Some(
                Scripted::Json(_, t) | Scripted::Text(_, t) | Scripted::Refuse(t) | Scripted::Fail(t),
            ) => *t,
            _ => 0,
        };
        self.served_tokens.fetch_add(tokens, Ordering::SeqCst);
        answer
    }
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    async fn extract(&self, role: AgentRole, system: &str, input: &str) -> Extraction<Value> {
        match self.answer(role, system, input).await {
            Some(Scripted::Json(value, tokens)) => Extraction::ok(value, tokens),
            Some(Scripted::Text(text, tokens)) => match serde_json::from_str(&text) {
                Ok(value) => Extraction::ok(value, tokens),
                Err(e) => Extraction::failed(tokens, e.to_string()),
            },
            Some(Scripted::Refuse(tokens)) => Extraction::refused(tokens, "scripted refusal"),
            Some(Scripted::Fail(tokens)) => Extraction::failed(tokens, "scripted failure"),
            Some(Scripted::Panic) => panic!("scripted panic for {}", role.as_str()),
            None => Extraction::failed(0, format!("no script for {}", role.as_str())),
        }
    }

    async fn complete(&self, role: AgentRole, system: &str, input: &str) -> Extraction<String> {
        match self.answer(role, system, input).await {
            Some(Scripted::Text(text, tokens)) => Extraction::ok(text, tokens),
            Some(Scripted::Json(value, tokens)) => Extraction::ok(value.to_string(), tokens),
            Some(Scripted::Refuse(tokens)) => Extraction::refused(tokens, "scripted refusal"),
            Some(Scripted::Fail(tokens)) => Extraction::failed(tokens, "scripted failure"),
            Some(Scripted::Panic) => panic!("scripted panic for {}", role.as_str()),
            None => Extraction::failed(0, format!("no script for {}", role.as_str())),
        }
    }
}
