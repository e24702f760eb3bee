//! Module lesson-content manipulation.
//!
//! Lesson bodies are stored as `{ "html": "..." }` JSONB. A generated image
//! is prepended as an `<img>` tag; existing content is preserved after the
//! tag. The prepend is idempotent — redelivered webhooks and operator
//! replays must not duplicate the tag.

/// Key of the HTML field inside `modules.content_jsonb`.
pub const HTML_KEY: &str = "html";

/// Build the `<img>` tag for a generated asset.
pub fn image_tag(url: &str) -> String {
    format!(r#"<img src="{url}" alt="Generated illustration" />"#)
}

/// Prepend a generated image to existing lesson HTML.
///
/// Returns `None` when the HTML already contains an image tag for this URL
/// (the caller should skip the write). Otherwise returns the new HTML with
/// the tag first and the original content unchanged after it.
pub fn prepend_image(html: &str, url: &str) -> Option<String> {
    if html.contains(&format!(r#"src="{url}""#)) {
        return None;
    }
    let tag = image_tag(url);
    if html.is_empty() {
        Some(tag)
    } else {
        Some(format!("{tag}\n{html}"))
    }
}

/// Extract the HTML string from a `content_jsonb` value.
///
/// Missing or non-string `html` fields are treated as empty content.
pub fn html_of(content: &serde_json::Value) -> &str {
    content.get(HTML_KEY).and_then(|v| v.as_str()).unwrap_or("")
}

/// Return a copy of `content` with its `html` field replaced.
///
/// Non-object content (legacy rows hold JSON `null`) is promoted to an
/// object so the write never loses the image.
pub fn with_html(content: &serde_json::Value, html: String) -> serde_json::Value {
    let mut obj = match content {
        serde_json::Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    obj.insert(HTML_KEY.to_string(), serde_json::Value::String(html));
    serde_json::Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "https://img.example/x.png";

    #[test]
    fn prepend_puts_image_first_and_preserves_content() {
        let html = "<p>Welcome to the lesson</p>";
        let out = prepend_image(html, URL).unwrap();
        assert!(out.starts_with("<img"));
        assert!(out.ends_with(html));
    }

    #[test]
    fn prepend_into_empty_content() {
        let out = prepend_image("", URL).unwrap();
        assert_eq!(out, image_tag(URL));
    }

    #[test]
    fn prepend_is_idempotent() {
        let once = prepend_image("<p>body</p>", URL).unwrap();
        assert!(prepend_image(&once, URL).is_none());
        // Exactly one occurrence of the URL.
        assert_eq!(once.matches(URL).count(), 1);
    }

    #[test]
    fn different_url_is_still_prepended() {
        let once = prepend_image("<p>body</p>", URL).unwrap();
        let twice = prepend_image(&once, "https://img.example/y.png").unwrap();
        assert_eq!(twice.matches("<img").count(), 2);
    }

    #[test]
    fn html_of_handles_missing_and_null() {
        assert_eq!(html_of(&json!({"html": "<p>x</p>"})), "<p>x</p>");
        assert_eq!(html_of(&json!({})), "");
        assert_eq!(html_of(&json!(null)), "");
        assert_eq!(html_of(&json!({"html": 42})), "");
    }

    #[test]
    fn with_html_preserves_sibling_fields() {
        let content = json!({"html": "old", "version": 3});
        let updated = with_html(&content, "new".to_string());
        assert_eq!(updated["html"], "new");
        assert_eq!(updated["version"], 3);
    }

    #[test]
    fn with_html_promotes_null_content() {
        let updated = with_html(&json!(null), "<img />".to_string());
        assert_eq!(updated["html"], "<img />");
    }
}
