use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::app::{LampstandError, Result};

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").unwrap());

/// Structured analysis returned by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    #[serde(default)]
    pub themes: Vec<Theme>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub passages: Vec<PassageLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassageLink {
    pub reference: String,
    #[serde(default)]
    pub connection: String,
    #[serde(default)]
    pub is_prophetic: bool,
}

impl AnalysisPayload {
    /// Every cited reference once, in order of first appearance.
    pub fn references(&self) -> Vec<String> {
        let mut seen = Vec::<String>::new();
        for passage in self.themes.iter().flat_map(|t| t.passages.iter()) {
            let reference = passage.reference.trim();
            if !reference.is_empty() && !seen.iter().any(|r| r == reference) {
                seen.push(reference.to_string());
            }
        }
        seen
    }
}

/// Parse a model response as bare JSON or JSON inside a fenced code block.
///
/// Prose around the object is tolerated.
pub fn parse_payload(raw: &str) -> Result<AnalysisPayload> {
    let body = FENCE_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw);

    let start = body.find('{');
    let end = body.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => {
            return Err(LampstandError::Generation(
                "response contains no JSON object".to_string(),
            ))
        }
    };

    Ok(serde_json::from_str(json)?)
}
