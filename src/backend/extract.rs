use serde_json::Value;
use tracing::debug;

const JSON_FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Pull a JSON object out of free-form model text.
///
/// Locates the first ```` ```json ```` fence, takes everything up to the next
/// closing ```` ``` ````, trims surrounding whitespace, and parses it. Every
/// failure path — no fence, no closing marker, invalid JSON — degrades to
/// `None`; this function never errors. Callers treat `None` as an extraction
/// failure, not a crash.
pub fn extract_json_block(content: &str) -> Option<Value> {
    let start = content.find(JSON_FENCE_OPEN)?;
    let after_open = &content[start + JSON_FENCE_OPEN.len()..];
    let end = after_open.find(FENCE_CLOSE)?;
    let body = after_open[..end].trim();

    match serde_json::from_str(body) {
        Ok(value) => {
            debug!(len = body.len(), "extracted JSON block from response");
            Some(value)
        }
        Err(e) => {
            debug!(error = %e, "fenced block is not valid JSON");
            None
        }
    }
}
