// Shared prompt constants and prompt-building utilities.
// Each module that issues model calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt whose output is wrapped in a `steps` array.
pub const STEPS_INSTRUCTION: &str = "\
    Wrap your answer as {\"steps\": [ <one object> ]} — exactly one element in the steps array. \
    If a field is not present in the sources, use an empty string \"\" or an empty list [] \
    rather than omitting it.";

/// Cross-referencing instruction shared by every field aggregator.
pub const CROSS_REFERENCE_INSTRUCTION: &str = "\
    CRITICAL: Only use facts that appear in at least one of the labelled sources. \
    When sources disagree, prefer the most recent and most complete version. \
    Never invent employers, dates, degrees, certifications or metrics.";

/// Appends the `steps` envelope instruction to a role's system prompt.
pub fn with_steps(system: &str) -> String {
    format!("{system}\n\n{STEPS_INSTRUCTION}")
}
