//! Accomplishment roll-up summarization
//!
//! Builds a plain-text corpus from the requested users' timesheet entries,
//! asks the generation backend for a schema-constrained roll-up, and coerces
//! whatever comes back into the canonical response shape. Backends do not
//! reliably honor structured output across providers and model versions, so
//! the strict request is treated as an optimization: free-form replies run
//! through an ordered cascade of shape recognizers before the request is
//! failed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use opsdeck_common::text::{to_plain_text, truncate_chars};

use crate::config::{CORPUS_EXCERPT_CHARS, MALFORMED_PREVIEW_CHARS};
use crate::services::llm::{LlmClient, LlmError, ResponseMode};

/// Summarization errors. The HTTP layer logs the detail and surfaces an
/// opaque message; upstream provider bodies never reach end users.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error(transparent)]
    Backend(#[from] LlmError),

    #[error("Unrecognized summary payload: {preview}")]
    Malformed { preview: String },
}

/// Roll-up request: a date window and the users to summarize.
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeRequest {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub users: Vec<UserPayload>,
    /// Ask for 3-7 cross-cutting team themes; defaults to true
    #[serde(default)]
    pub include_team_summary: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub badge: i64,
    pub name: String,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub text: String,
}

/// Canonical roll-up shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub users: Vec<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_themes: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub badge: i64,
    pub name: String,
    /// 3-8 concise bullets in Markdown
    pub summary_md: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_focus: Option<Vec<String>>,
}

const SYSTEM_PROMPT: &str = "You help a manager prepare monthly roll-ups of weekly accomplishments. \
    Summarize each person for the date range; prefer outcomes/impact, merge duplicates, avoid trivia. \
    Don't invent numbers or facts. Return only the structured JSON requested: a top-level \"users\" \
    array and, when asked, a \"team_themes\" array.";

/// Emit one block per requested user: display name, badge, the date window,
/// and a bulleted excerpt per entry. Users with no usable entries get a
/// "(none)" placeholder line so the backend is not confused by an absent
/// section.
pub fn build_corpus(req: &SummarizeRequest) -> String {
    req.users
        .iter()
        .map(|u| {
            let lines: Vec<String> = u
                .entries
                .iter()
                .filter(|e| !e.text.trim().is_empty())
                .map(|e| {
                    let plain = to_plain_text(&e.text);
                    format!(
                        "- ({}→{}) {}",
                        e.week_start,
                        e.week_end,
                        truncate_chars(&plain, CORPUS_EXCERPT_CHARS)
                    )
                })
                .collect();

            let body = if lines.is_empty() {
                "- (none)".to_string()
            } else {
                lines.join("\n")
            };

            format!(
                "User: {} (#{})\nWindow: {} → {}\nAccomplishments:\n{}\n",
                u.name, u.badge, req.from, req.to, body
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn user_prompt(req: &SummarizeRequest) -> String {
    let themes_line = if req.include_team_summary != Some(false) {
        "Also extract 3-7 cross-cutting team themes."
    } else {
        "Team themes not required."
    };

    [
        format!("Date window: {} → {}", req.from, req.to),
        themes_line.to_string(),
        "DATA START".to_string(),
        build_corpus(req),
        "DATA END".to_string(),
    ]
    .join("\n")
}

/// JSON schema for the canonical roll-up shape, sent with the strict-mode
/// request.
fn summary_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "users": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "badge": { "type": "integer" },
                        "name": { "type": "string" },
                        "summary_md": { "type": "string" },
                        "highlights": { "type": "array", "items": { "type": "string" } },
                        "blockers": { "type": "array", "items": { "type": "string" } },
                        "next_focus": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["badge", "name", "summary_md"],
                    "additionalProperties": false
                }
            },
            "team_themes": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["users"],
        "additionalProperties": false
    })
}

/// Produce a roll-up for the request.
///
/// Primary attempt asks for schema-validated output; any structural or
/// validation failure falls back to one instruction-only attempt whose reply
/// goes through shape normalization. A timeout counts as a normal failure
/// feeding the fallback, not a retry storm.
pub async fn summarize(
    client: &LlmClient,
    req: &SummarizeRequest,
) -> Result<SummarizeResponse, SummarizeError> {
    let prompt = user_prompt(req);

    match client
        .complete(
            SYSTEM_PROMPT,
            &prompt,
            ResponseMode::JsonSchema {
                name: "AccomplishmentSummaries",
                schema: summary_schema(),
            },
        )
        .await
    {
        Ok(reply) => {
            if let Ok(parsed) = serde_json::from_str::<SummarizeResponse>(&reply) {
                return Ok(parsed);
            }
            tracing::warn!("Schema-constrained reply did not validate, retrying free-form");
        }
        Err(err) => {
            tracing::warn!(error = %err, "Schema-constrained completion failed, retrying free-form");
        }
    }

    let reply = client.complete(SYSTEM_PROMPT, &prompt, ResponseMode::Text).await?;
    normalize_reply(&reply)
}

/// Coerce a free-form reply into the canonical shape, or fail with a bounded
/// preview of the payload.
pub fn normalize_reply(reply: &str) -> Result<SummarizeResponse, SummarizeError> {
    let snippet = extract_json_payload(reply).ok_or_else(|| malformed(reply))?;
    let value: Value = serde_json::from_str(snippet).map_err(|_| malformed(reply))?;
    normalize_value(&value).ok_or_else(|| malformed(reply))
}

fn malformed(payload: &str) -> SummarizeError {
    SummarizeError::Malformed {
        preview: truncate_chars(payload.trim(), MALFORMED_PREVIEW_CHARS).to_string(),
    }
}

/// Locate the first top-level JSON object (or array) substring in the reply.
/// Backends routinely wrap the payload in prose or code fences.
fn extract_json_payload(text: &str) -> Option<&str> {
    let object = text.find('{').zip(text.rfind('}'));
    let array = text.find('[').zip(text.rfind(']'));

    let (start, end) = match (object, array) {
        (Some(obj), Some(arr)) => {
            if arr.0 < obj.0 {
                arr
            } else {
                obj
            }
        }
        (Some(obj), None) => obj,
        (None, Some(arr)) => arr,
        (None, None) => return None,
    };

    (end > start).then(|| &text[start..=end])
}

type Recognizer = fn(&Value) -> Option<SummarizeResponse>;

/// Accepted reply shapes, most specific first. Each recognizer either maps
/// the payload to the canonical shape or passes; new alternate shapes slot
/// in here without touching the existing ones.
const RECOGNIZERS: &[Recognizer] = &[as_canonical, as_team_roll_up, as_individuals, as_bare_list];

fn normalize_value(value: &Value) -> Option<SummarizeResponse> {
    RECOGNIZERS.iter().find_map(|recognize| recognize(value))
}

/// Already canonical: `{users, team_themes?}`
fn as_canonical(value: &Value) -> Option<SummarizeResponse> {
    serde_json::from_value(value.clone()).ok()
}

/// Team roll-up wrapper: `{team_roll_up: {individual_summaries: [..], team_themes?}}`
fn as_team_roll_up(value: &Value) -> Option<SummarizeResponse> {
    let wrapper = value.get("team_roll_up")?;
    let list = wrapper.get("individual_summaries")?.as_array()?;
    let users = mapped_subjects(list)?;
    let team_themes = themes_from(wrapper).or_else(|| themes_from(value));

    Some(SummarizeResponse { users, team_themes })
}

/// Flatter variant: `{individuals: [..], team_themes?}`
fn as_individuals(value: &Value) -> Option<SummarizeResponse> {
    let list = value.get("individuals")?.as_array()?;
    let users = mapped_subjects(list)?;

    Some(SummarizeResponse {
        users,
        team_themes: themes_from(value),
    })
}

/// Bare top-level list of subject-like objects
fn as_bare_list(value: &Value) -> Option<SummarizeResponse> {
    let list = value.as_array()?;
    let first = list.first()?;
    if first.get("name").is_none() || summary_of(first).is_none() {
        return None;
    }

    Some(SummarizeResponse {
        users: mapped_subjects(list)?,
        team_themes: None,
    })
}

fn mapped_subjects(list: &[Value]) -> Option<Vec<UserSummary>> {
    let mut users = Vec::with_capacity(list.len());

    for (idx, item) in list.iter().enumerate() {
        let name = item.get("name")?.as_str()?.to_string();
        let summary_md = summary_of(item)?;
        // Position is the key of last resort when no identifier parses
        let badge = badge_of(item).unwrap_or((idx + 1) as i64);

        users.push(UserSummary {
            badge,
            name,
            summary_md,
            highlights: string_list(item.get("highlights")),
            blockers: string_list(item.get("blockers")),
            next_focus: string_list(item.get("next_focus")),
        });
    }

    Some(users)
}

/// `summary_md` is canonical; `summary` is the alias backends actually emit.
fn summary_of(item: &Value) -> Option<String> {
    item.get("summary_md")
        .or_else(|| item.get("summary"))?
        .as_str()
        .map(str::to_string)
}

/// The identifier may be numeric, or an alphanumeric employee code whose
/// digits form the badge-like key ("E-123" → 123).
fn badge_of(item: &Value) -> Option<i64> {
    let ident = item.get("badge").or_else(|| item.get("employee_id"))?;
    if let Some(n) = ident.as_i64() {
        return Some(n);
    }

    let digits: String = ident
        .as_str()?
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn themes_from(value: &Value) -> Option<Vec<String>> {
    string_list(value.get("team_themes").or_else(|| value.get("themes")))
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
    )
}
