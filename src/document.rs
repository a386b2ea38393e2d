//! Reformatted document model and response parsing.
//!
//! Model replies rarely arrive as clean JSON: they are often wrapped in prose
//! or markdown fences. The JSON strategy locates the outermost `{...}` span
//! and decodes only that. An older deployment emitted label-delimited plain
//! text instead ("Title:" / "Summary:" / "Content:"), kept here as a second
//! strategy. The active strategy is explicit configuration; a reply in the
//! wrong format is a parse error, never silently accepted.

use crate::error::ProcessingError;
use serde::{Deserialize, Serialize};

/// The AI-produced educational document: title, summary and markdown body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReformattedDocument {
    pub title: String,
    pub summary: String,
    pub content: String,
}

impl ReformattedDocument {
    /// Check the minimum-length quality gate (strict `>`, measured in chars).
    ///
    /// Documents below the gate are skipped, not rejected as errors.
    pub fn meets_minimum_lengths(&self, min_title: usize, min_summary: usize, min_content: usize) -> bool {
        self.title.chars().count() > min_title
            && self.summary.chars().count() > min_summary
            && self.content.chars().count() > min_content
    }
}

/// How raw model replies are interpreted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ParserStrategy {
    /// JSON object with `title`/`summary`/`content` keys, tolerant of
    /// surrounding prose and code fences.
    #[default]
    Json,
    /// Sequential `Title:` / `Summary:` / `Content:` labels (legacy format).
    Labeled,
}

impl std::str::FromStr for ParserStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ParserStrategy::Json),
            "labeled" | "labelled" => Ok(ParserStrategy::Labeled),
            _ => Err(format!("Unknown parser strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for ParserStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserStrategy::Json => write!(f, "json"),
            ParserStrategy::Labeled => write!(f, "labeled"),
        }
    }
}

impl ParserStrategy {
    /// Parse a raw model reply into a document.
    pub fn parse(&self, raw: &str) -> Result<ReformattedDocument, ProcessingError> {
        match self {
            ParserStrategy::Json => parse_json(raw),
            ParserStrategy::Labeled => parse_labeled(raw),
        }
    }
}

/// Extract the `{...}` span and decode it, requiring all three fields.
fn parse_json(raw: &str) -> Result<ReformattedDocument, ProcessingError> {
    let start = raw.find('{');
    let end = raw.rfind('}');

    let json_str = match (start, end) {
        (Some(start), Some(end)) if end > start => &raw[start..=end],
        _ => {
            return Err(ProcessingError::Parse(
                "no JSON object found in response".to_string(),
            ))
        }
    };

    let value: serde_json::Value = serde_json::from_str(json_str).map_err(|e| {
        ProcessingError::Parse(format!(
            "response is not valid JSON: {}. Response was: {}",
            e,
            &json_str[..json_str.len().min(200)]
        ))
    })?;

    let field = |name: &str| -> Result<String, ProcessingError> {
        value
            .get(name)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ProcessingError::Parse(format!("missing required field '{}'", name)))
    };

    Ok(ReformattedDocument {
        title: field("title")?,
        summary: field("summary")?,
        content: field("content")?,
    })
}

/// Split on sequential case-insensitive labels, failing on the first one
/// that is absent.
fn parse_labeled(raw: &str) -> Result<ReformattedDocument, ProcessingError> {
    let (_, rest) = split_on_label(raw, "title:")
        .ok_or_else(|| ProcessingError::Parse("missing 'Title:' label".to_string()))?;
    let (title, rest) = split_on_label(rest, "summary:")
        .ok_or_else(|| ProcessingError::Parse("missing 'Summary:' label".to_string()))?;
    let (summary, content) = split_on_label(rest, "content:")
        .ok_or_else(|| ProcessingError::Parse("missing 'Content:' label".to_string()))?;

    Ok(ReformattedDocument {
        title: title.trim().to_string(),
        summary: summary.trim().to_string(),
        content: content.trim().to_string(),
    })
}

/// Split `text` at the first case-insensitive occurrence of the ASCII
/// `label`, returning (before, after-label).
fn split_on_label<'a>(text: &'a str, label: &str) -> Option<(&'a str, &'a str)> {
    let needle = label.as_bytes();
    let pos = text
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))?;
    Some((&text[..pos], &text[pos + needle.len()..]))
}
