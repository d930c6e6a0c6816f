//! Pulling a JSON document out of free-form model output.

use anyhow::Result;

/// Remove trailing commas from JSON (invalid but common in LLM outputs)
pub fn remove_trailing_commas(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let chars: Vec<char> = json.chars().collect();
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape_next {
            escape_next = false;
            result.push(ch);
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some('}') | Some(']') | Some(',')) {
                    continue;
                }
            }
            _ => {}
        }
        result.push(ch);
    }

    result
}

/// Byte range of the first balanced `{...}` or `[...]` starting at `start`.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

fn parses(candidate: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(candidate).is_ok()
}

/// Strip a surrounding markdown code fence, if any.
fn strip_fence(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text;
    };
    let after = &text[open + 3..];
    let after = after.strip_prefix("json").unwrap_or(after);
    match after.find("```") {
        Some(close) => after[..close].trim(),
        None => after.trim(),
    }
}

/// Extract JSON from model response with fallback strategies
pub fn extract_json(text: &str) -> Result<String> {
    // Strategy 1: the whole response is already clean JSON
    let trimmed = text.trim();
    if parses(trimmed) {
        return Ok(trimmed.to_string());
    }

    // Strategy 2: JSON inside a markdown code block
    let unfenced = strip_fence(trimmed);
    if unfenced != trimmed && parses(unfenced) {
        tracing::debug!("Extracted JSON from markdown code block");
        return Ok(unfenced.to_string());
    }

    // Strategy 3: first balanced object or array embedded in prose
    if let Some(start) = unfenced.find(|c: char| c == '{' || c == '[') {
        if let Some(end) = balanced_end(unfenced, start) {
            let candidate = &unfenced[start..end];
            if parses(candidate) {
                tracing::debug!("Extracted JSON by matching braces");
                return Ok(candidate.to_string());
            }

            // Strategy 4: same candidate with trailing commas removed
            let repaired = remove_trailing_commas(candidate);
            if parses(&repaired) {
                tracing::debug!("Extracted JSON after removing trailing commas");
                return Ok(repaired);
            }
        }
    }

    let preview: String = trimmed.chars().take(80).collect();
    anyhow::bail!("Failed to extract JSON from model output: {}", preview)
}
