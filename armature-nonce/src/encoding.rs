//! Escaping and query-string helpers for embedding nonces in pages.

use crate::error::Result;

/// Escape text for use inside a double-quoted HTML attribute
pub fn escape_html_attribute(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Set `name=value` in the query of `url`, replacing earlier values of `name`
///
/// The fragment, if any, stays at the end. Other parameters are kept verbatim.
/// The returned URL is not HTML-escaped.
pub fn set_query_param(url: &str, name: &str, value: &str) -> Result<String> {
    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };
    let (path, query) = match base.split_once('?') {
        Some((path, query)) => (path, query),
        None => (base, ""),
    };

    let mut pairs: Vec<String> = query
        .split('&')
        .filter(|segment| !segment.is_empty() && segment_key(segment).as_deref() != Some(name))
        .map(str::to_string)
        .collect();
    pairs.push(serde_urlencoded::to_string([(name, value)])?);

    let mut result = format!("{}?{}", path, pairs.join("&"));
    if let Some(fragment) = fragment {
        result.push('#');
        result.push_str(fragment);
    }
    Ok(result)
}

/// Read the last value of `name` from the query of `url`
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let base = url.split('#').next().unwrap_or(url);
    let (_, query) = base.split_once('?')?;
    find_pair(query.as_bytes(), name)
}

/// Read `name` from a JSON object or an urlencoded form body
pub fn body_field(body: &[u8], name: &str) -> Option<String> {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(value) = json.get(name) {
            return value.as_str().map(|s| s.to_string());
        }
    }

    find_pair(body, name)
}

fn find_pair(encoded: &[u8], name: &str) -> Option<String> {
    serde_urlencoded::from_bytes::<Vec<(String, String)>>(encoded)
        .ok()?
        .into_iter()
        .rev()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}

fn segment_key(segment: &str) -> Option<String> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(segment)
        .ok()?
        .into_iter()
        .next()
        .map(|(key, _)| key)
}
