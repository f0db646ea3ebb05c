//! Text extraction primitives for command output parsing.
//!
//! All output parsers (test summaries, plan lines, image digests) are built
//! on these helpers. A pattern that fails to compile or match yields None or
//! an empty Vec; absence of a pattern is never an error at this layer.

use regex::Regex;

/// Extract first match from content using a regex pattern with one capture group.
pub fn extract_first(content: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the capture groups of the first match as a Vec of strings.
/// Returns None if the pattern is invalid or does not match.
pub fn extract_groups(content: &str, pattern: &str) -> Option<Vec<String>> {
    let re = Regex::new(pattern).ok()?;
    let caps = re.captures(content)?;
    Some(
        caps.iter()
            .skip(1)
            .filter_map(|m| m.map(|m| m.as_str().to_string()))
            .collect(),
    )
}

/// Extract all matches from content; each match contributes its capture groups.
pub fn extract_all_groups(content: &str, pattern: &str) -> Vec<Vec<String>> {
    let Ok(re) = Regex::new(pattern) else {
        return Vec::new();
    };
    re.captures_iter(content)
        .map(|caps| {
            caps.iter()
                .skip(1)
                .filter_map(|m| m.map(|m| m.as_str().to_string()))
                .collect()
        })
        .collect()
}

/// Extract the first match as an unsigned integer, defaulting to 0.
///
/// The neutral-default rule: an absent or unparseable count is zero, never
/// an error.
pub fn extract_count(content: &str, pattern: &str) -> u32 {
    extract_first(content, pattern)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Extract the first match as a float, None when absent.
pub fn extract_float(content: &str, pattern: &str) -> Option<f64> {
    extract_first(content, pattern).and_then(|s| s.parse().ok())
}
