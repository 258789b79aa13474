use regex::Regex;

/// Extract a cookie value from a raw cookie string.
///
/// Matches `<name>=` at a word boundary and captures everything up to the
/// next `;` or the end of the string. Returns `None` when the cookie is
/// absent; a missing cookie is an expected outcome, not an error.
pub fn get(cookies: &str, name: &str) -> Option<String> {
    let pattern = format!(r"\b{}=([^;]*)", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(cookies)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
