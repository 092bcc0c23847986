//! Event-stream sanitizer
//!
//! Runs on parser events before any HTML is produced, so nothing the author
//! typed can reach the output as live markup.

use pulldown_cmark::{CowStr, Event, Tag};

/// URL schemes that can execute script when followed or loaded
const BLOCKED_SCHEMES: &[&str] = &["javascript", "vbscript", "data", "file"];

/// Neutralise one parser event.
///
/// Raw block and inline HTML becomes text (escaped on output). Link and image
/// targets with a script-capable scheme are replaced by `#`.
pub fn sanitize_event(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_script_capable(&url) {
        tracing::debug!("Dropped link target with blocked scheme");
        CowStr::Borrowed("#")
    } else {
        url
    }
}

/// Whether `url` uses a blocked scheme. Browsers ignore embedded whitespace,
/// control characters and case when resolving a scheme, so this does too.
pub fn is_script_capable(url: &str) -> bool {
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let Some(colon) = cleaned.find(':') else {
        return false;
    };
    let scheme = &cleaned[..colon];
    if scheme.contains(|c| matches!(c, '/' | '?' | '#')) {
        // The colon belongs to a path or query, not a scheme
        return false;
    }
    BLOCKED_SCHEMES.contains(&scheme)
}

/// Escape text for use in HTML bodies and double- or single-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_schemes() {
        assert!(is_script_capable("javascript:alert(1)"));
        assert!(is_script_capable("  JaVaScRiPt:alert(1)"));
        assert!(is_script_capable("java\tscript:alert(1)"));
        assert!(is_script_capable("data:text/html;base64,PHNjcmlwdD4="));
        assert!(is_script_capable("vbscript:msgbox"));
    }

    #[test]
    fn test_allowed_targets() {
        assert!(!is_script_capable("https://example.com/a:b"));
        assert!(!is_script_capable("mailto:amy@example.com"));
        assert!(!is_script_capable("/relative/path"));
        assert!(!is_script_capable("docs/page?x=javascript:1"));
        assert!(!is_script_capable("#anchor"));
    }

    #[test]
    fn test_raw_html_becomes_text() {
        let event = sanitize_event(Event::InlineHtml(CowStr::Borrowed("<b>")));
        assert_eq!(event, Event::Text(CowStr::Borrowed("<b>")));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}
