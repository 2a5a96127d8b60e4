//! Message markup to HTML.
//!
//! Message content is CommonMark. Rendering goes through pulldown-cmark with
//! raw HTML escaped rather than passed through, script-capable link targets
//! dropped, and paragraph wrappers removed so a message renders inline.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

const UNSAFE_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

fn is_unsafe_url(url: &str) -> bool {
    let lowered: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_lowercase();
    UNSAFE_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme))
}

fn sanitize(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if is_unsafe_url(&dest_url) => {
            tracing::debug!(url = %dest_url, "dropping unsafe link target");
            Event::Start(Tag::Link {
                link_type,
                dest_url: CowStr::Borrowed(""),
                title,
                id,
            })
        }
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if is_unsafe_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        }),
        other => other,
    }
}

pub fn options() -> Options {
    Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES
}

/// Render message content as sanitized HTML without `<p>` wrappers.
pub fn to_html(content: &str) -> String {
    let parser = Parser::new_ext(content, options()).map(sanitize);

    let mut out = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut out, parser);

    out.replace("<p>", "")
        .replace("</p>", "")
        .trim_end_matches('\n')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_markup() {
        assert_eq!(to_html("**Hi** there"), "<strong>Hi</strong> there");
        assert_eq!(to_html("*part* `WPW10321304`"), "<em>part</em> <code>WPW10321304</code>");
    }

    #[test]
    fn test_paragraph_wrappers_removed() {
        let html = to_html("first\n\nsecond");
        assert!(!html.contains("<p>"));
        assert!(html.contains("first"));
        assert!(html.contains("second"));
    }

    #[test]
    fn test_links_kept() {
        assert_eq!(
            to_html("[PartSelect](https://www.partselect.com)"),
            r#"<a href="https://www.partselect.com">PartSelect</a>"#
        );
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = to_html("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));

        let inline = to_html("press <b>here</b>");
        assert!(inline.contains("&lt;b&gt;"));
    }

    #[test]
    fn test_script_links_dropped() {
        let html = to_html("[click](javascript:alert(1))");
        assert!(!html.contains("javascript"));
        assert!(html.contains(">click</a>"));

        assert!(is_unsafe_url(" JavaScript:void(0)"));
        assert!(!is_unsafe_url("https://example.com"));
    }
}
