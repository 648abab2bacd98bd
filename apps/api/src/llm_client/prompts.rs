// Shared prompt constants and prompt-building utilities.
// Each feature that calls the model defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

use crate::models::roadmap::RoadmapItem;

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences.";

/// Persona shared by the mentoring features.
pub const MENTOR_SYSTEM: &str = "You are a pragmatic senior engineer mentoring a \
    computer science student. Be direct, specific and encouraging. \
    Never invent facts about the student that were not given to you.";

/// One-line description of a roadmap item for embedding in prompts.
pub fn describe_item(item: &RoadmapItem) -> String {
    let roles = item
        .role_alignment
        .iter()
        .map(|r| r.label())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "\"{}\" (year {}, {:?} priority, roles: {}): {}",
        item.name, item.year, item.priority, roles, item.description
    )
}
