//! Response Parsing
//!
//! Models wrap JSON in prose or code fences. Extraction tries, in order:
//! the whole text, the first fenced block, then every balanced `{...}`
//! span found by a string-aware brace scan.

use serde_json::Value;

use crate::error::ResponseError;

/// Pulls the first JSON object out of free-form response text
pub fn extract_json(text: &str) -> Result<Value, ResponseError> {
    if let Some(object) = parse_object(text) {
        return Ok(object);
    }
    if let Some(object) = fenced_block(text).and_then(parse_object) {
        return Ok(object);
    }
    brace_candidates(text)
        .into_iter()
        .find_map(parse_object)
        .ok_or(ResponseError::NotJson)
}

fn parse_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Body of the first ``` fence, with an optional language tag dropped
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let rest = &text[start..];
    let end = rest.find("```")?;
    let body = &rest[..end];
    // skip a language tag such as `json`
    match body.find('\n') {
        Some(newline) if !body[..newline].trim_start().starts_with('{') => Some(&body[newline + 1..]),
        _ => Some(body),
    }
}

/// Every balanced `{...}` span, one per opening brace, in text order.
///
/// Braces inside string literals (including escaped quotes) are ignored.
fn brace_candidates(text: &str) -> Vec<&str> {
    let mut candidates = Vec::new();
    for (start, _) in text.match_indices('{') {
        if let Some(end) = matching_brace(&text[start..]) {
            candidates.push(&text[start..start + end + 1]);
        }
    }
    candidates
}

/// Byte offset of the brace closing the one at offset 0
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let value = extract_json(r#"{"voteToEvict": "bo", "reasoning": "numbers"}"#).unwrap();
        assert_eq!(value["voteToEvict"], "bo");
    }

    #[test]
    fn test_fenced_json() {
        let text = "Here is my answer:\n```json\n{\"useVeto\": false, \"reasoning\": \"safe\"}\n```\nGood luck!";
        let value = extract_json(text).unwrap();
        assert_eq!(value["useVeto"], false);
    }

    #[test]
    fn test_prose_wrapped_json_with_braces_in_strings() {
        let text = r#"I think {this} is tricky. {"message": "a } in \"quotes\" {", "reasoning": "r"} done"#;
        let value = extract_json(text).unwrap();
        assert_eq!(value["message"], "a } in \"quotes\" {");
    }

    #[test]
    fn test_nested_objects_keep_outer() {
        let text = r#"answer: {"winner": "cy", "reasoning": "x", "meta": {"confidence": 0.9}}"#;
        let value = extract_json(text).unwrap();
        assert_eq!(value["winner"], "cy");
    }

    #[test]
    fn test_no_json() {
        assert_eq!(extract_json("I refuse to answer."), Err(ResponseError::NotJson));
        assert_eq!(extract_json("[1, 2, 3]"), Err(ResponseError::NotJson));
        assert_eq!(extract_json("{ unterminated"), Err(ResponseError::NotJson));
    }
}
