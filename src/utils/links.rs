use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RAW_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>\[\]{}"'|]+"#)
        .unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

/// First `http(s)://` URL in `text`, with trailing punctuation removed.
#[must_use]
pub fn find_document_url(text: &str) -> Option<String> {
    RAW_URL_RE
        .find_iter(text)
        .map(|m| trim_trailing_punctuation(m.as_str()))
        .find(|url| is_http_url(url))
        .map(str::to_string)
}

/// Depth-first, in-order scan of every string in `node` for a URL.
///
/// Objects are checked through their `text` field first so a message-shaped
/// entry (`{"kind": "text", "text": ...}`) is read before its other fields.
#[must_use]
pub fn find_document_url_in_value(node: &Value) -> Option<String> {
    match node {
        Value::String(s) => find_document_url(s),
        Value::Array(arr) => arr.iter().find_map(find_document_url_in_value),
        Value::Object(map) => map
            .get("text")
            .and_then(find_document_url_in_value)
            .or_else(|| {
                map.iter()
                    .filter(|(key, _)| key.as_str() != "text")
                    .find_map(|(_, val)| find_document_url_in_value(val))
            }),
        _ => None,
    }
}

#[must_use]
pub fn is_http_url(candidate: &str) -> bool {
    (candidate.starts_with("http://") || candidate.starts_with("https://"))
        && url::Url::parse(candidate).is_ok_and(|u| u.host_str().is_some())
}

/// Strip sentence punctuation from the end of a match. A closing paren is
/// only stripped when it has no opening partner inside the URL.
#[must_use]
fn trim_trailing_punctuation(s: &str) -> &str {
    let mut url = s;
    loop {
        let trimmed = url.trim_end_matches(&['.', ',', ';', ':', '!', '?'][..]);
        let unbalanced_close = trimmed.ends_with(')')
            && trimmed.matches(')').count() > trimmed.matches('(').count();
        let next = if unbalanced_close {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if next.len() == url.len() {
            return url;
        }
        url = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_first_url_in_prose() {
        let text = "please summarize https://example.com/report.pdf, then https://other.org/b.pdf";
        assert_eq!(
            find_document_url(text).as_deref(),
            Some("https://example.com/report.pdf")
        );
    }

    #[test]
    fn keeps_balanced_parentheses() {
        assert_eq!(
            find_document_url("summarize https://example.com/report(final).pdf").as_deref(),
            Some("https://example.com/report(final).pdf")
        );
        assert_eq!(
            find_document_url("(see https://example.com/a.pdf).").as_deref(),
            Some("https://example.com/a.pdf")
        );
        assert_eq!(
            find_document_url("(https://en.wikipedia.org/wiki/Rust_(language))").as_deref(),
            Some("https://en.wikipedia.org/wiki/Rust_(language)")
        );
    }

    #[test]
    fn scans_object_keys_in_document_order() {
        let data: Value = serde_json::from_str(
            r#"{"zeta": "https://z.example.com/first.pdf", "alpha": "https://a.example.com/second.pdf"}"#,
        )
        .unwrap();
        assert_eq!(
            find_document_url_in_value(&data).as_deref(),
            Some("https://z.example.com/first.pdf")
        );
    }

    #[test]
    fn ignores_text_without_urls() {
        assert!(find_document_url("summarize my pdf please").is_none());
        assert!(find_document_url("ftp://example.com/a.pdf").is_none());
    }

    #[test]
    fn scans_embedded_entries_in_order() {
        let data = json!([
            { "kind": "text", "text": "no link here" },
            { "kind": "text", "text": "<p>see https://example.com/first.pdf</p>" },
            "https://example.com/second.pdf"
        ]);
        assert_eq!(
            find_document_url_in_value(&data).as_deref(),
            Some("https://example.com/first.pdf")
        );
    }
}
