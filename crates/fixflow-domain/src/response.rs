//! Fix response contract returned by the invocation collaborator.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// Structured reply for one fix request.
///
/// Field names and types are part of the boundary contract: the wire form
/// is camelCase and unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FixResponse {
    pub success: bool,
    pub fixed_code: String,
    pub changes_made: Vec<String>,
    /// Self-reported confidence in `[0, 1]`.
    pub confidence: f64,
    pub explanation: String,
}

impl FixResponse {
    /// Parse and validate a raw reply.
    ///
    /// Accepts a bare JSON object or one wrapped in a fenced code block.
    pub fn parse(raw: &str) -> Result<Self> {
        let body = strip_code_fence(raw);
        let response: FixResponse = serde_json::from_str(body)
            .map_err(|e| DomainError::MalformedResponse(e.to_string()))?;
        response.validate()?;
        Ok(response)
    }

    /// Check value-level constraints the type system cannot express.
    pub fn validate(&self) -> Result<()> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(DomainError::MalformedResponse(format!(
                "confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        if self.success && self.fixed_code.trim().is_empty() {
            return Err(DomainError::MalformedResponse(
                "successful response carries empty fixedCode".to_string(),
            ));
        }
        Ok(())
    }

    /// Serialize to the wire form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
