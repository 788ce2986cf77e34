//! Turns a completed deep-research payload into ranked expert records.

use serde_json::Value;

use crate::domain::models::{NewExpert, ProjectId};

/// Projects the `results` array of a provider payload into experts for `project_id`.
///
/// Rank is the 1-based position in the provider's ordering; nothing is re-sorted.
/// Returns an empty list when `results` is missing or not an array.
pub fn project_experts(raw: &Value, project_id: ProjectId, query: &str) -> Vec<NewExpert> {
    let Some(candidates) = raw.get("results").and_then(Value::as_array) else {
        return Vec::new();
    };

    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let profile = candidate.get("profile").unwrap_or(&Value::Null);

            NewExpert {
                project_id,
                name: string_field(profile, &["name"]),
                linkedin_url: string_field(profile, &["linkedin_profile_url", "linkedin_url"]),
                headline: string_field(profile, &["headline"]),
                summary: string_field(profile, &["summary"]),
                reasoning: collect_reasoning(profile),
                for_query: query.to_string(),
                rank: index as i32 + 1,
                raw_json: materialize(candidate),
            }
        })
        .collect()
}

/// First non-empty string among `keys`, or an empty string.
fn string_field(profile: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| profile.get(*key).and_then(Value::as_str))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Joins every non-empty `criteria.*.reasoning` with a blank line, in map order.
fn collect_reasoning(profile: &Value) -> String {
    let Some(criteria) = profile.get("criteria").and_then(Value::as_object) else {
        return String::new();
    };

    criteria
        .values()
        .filter_map(|criterion| criterion.get("reasoning").and_then(Value::as_str))
        .filter(|reasoning| !reasoning.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Round-trips the candidate through its serialized form so the stored payload is an
/// owned structure with no ties to the polling response.
fn materialize(candidate: &Value) -> Value {
    serde_json::to_vec(candidate)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_else(|| candidate.clone())
}
