use anyhow::Result;
use regex::Regex;
use serde_json::Value;

/// Extract a JSON object from free text that may wrap it in prose or a
/// fenced code block.
///
/// This is the single repair pass applied to a response that did not parse
/// as-is: strip common non-structured wrapping and try once more. Returns
/// the extracted object as a string suitable for `serde_json::from_str`.
pub fn extract_json_object(text: &str) -> Result<String> {
    // First, try to find an object inside a ```json fenced block
    let re = Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\})\s*```").unwrap();

    if let Some(captures) = re.captures(text) {
        let inner = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        if serde_json::from_str::<Value>(inner).is_ok() {
            return Ok(inner.to_string());
        }
    }

    // No usable fence: take the outermost brace pair and check it balances.
    // Leading/trailing prose around the object is the common failure mode.
    let start = text
        .find('{')
        .ok_or_else(|| anyhow::anyhow!("No JSON object found in text"))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| anyhow::anyhow!("No JSON object found in text"))?;
    if end <= start {
        return Err(anyhow::anyhow!("No JSON object found in text"));
    }

    let candidate = &text[start..=end];
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(_)) => Ok(candidate.to_string()),
        Ok(_) => Err(anyhow::anyhow!("Extracted JSON is not an object")),
        Err(e) => Err(anyhow::anyhow!("Extracted text is not valid JSON: {}", e)),
    }
}
