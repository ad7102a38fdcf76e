//! Markdown to HTML conversion for report pages

use pulldown_cmark::{html, Event, Options, Parser};

/// Remove a ```` ```markdown ```` wrapper that flow output sometimes carries
pub fn strip_markdown_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```markdown") {
        Some(rest) => {
            let rest = rest.trim();
            rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
        }
        None => trimmed,
    }
}

/// Render report markdown (tables enabled) to an HTML fragment
///
/// Report text carries user input and LLM output, so raw HTML blocks and
/// inline tags are emitted as escaped text rather than passed through.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(strip_markdown_fence(text), options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Escape text for HTML element content and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fence() {
        assert_eq!(strip_markdown_fence("```markdown\n# Title\n```"), "# Title");
        assert_eq!(strip_markdown_fence("  # Plain  "), "# Plain");
        // Unterminated fence keeps the body
        assert_eq!(strip_markdown_fence("```markdown\n# Title"), "# Title");
    }

    #[test]
    fn test_renders_headings_and_tables() {
        let html = render_markdown(
            "## 🏭 Industry Comparison\n\n| Dimension | Your Score |\n|---|---|\n| Organization | 2.5 |\n",
        );
        assert!(html.contains("<h2>🏭 Industry Comparison</h2>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>Organization</td>"));
    }

    #[test]
    fn test_renders_bold_list_items() {
        let html = render_markdown("- **Score** - 2.5/5.0\n");
        assert!(html.contains("<li><strong>Score</strong> - 2.5/5.0</li>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_markdown(
            "# Sustainability Assessment Report - <iframe src=\"file:///etc/passwd\"></iframe>\n\n\
             <script>alert(1)</script>\n\nInline <img src=x onerror=alert(1)> tag\n",
        );
        assert!(!html.contains("<iframe"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;iframe src="));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("Apex Manufacturing"), "Apex Manufacturing");
    }
}
