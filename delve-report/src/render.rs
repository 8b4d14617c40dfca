//! Markdown to HTML rendering

use pulldown_cmark::{html, Options, Parser};

const STYLE: &str = r#"body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Arial, sans-serif;
    line-height: 1.6;
    max-width: 900px;
    margin: 40px auto;
    padding: 20px;
    color: #333;
}
h1, h2, h3 { color: #2c3e50; }
code {
    background-color: #f5f5f5;
    padding: 2px 4px;
    border-radius: 4px;
    font-family: 'Consolas', 'Monaco', 'Andale Mono', monospace;
}
pre {
    background-color: #f5f5f5;
    padding: 15px;
    border-radius: 8px;
    overflow-x: auto;
}
blockquote {
    border-left: 4px solid #2c3e50;
    margin: 0;
    padding-left: 20px;
    color: #666;
}
table {
    border-collapse: collapse;
    width: 100%;
    margin: 20px 0;
}
th, td {
    border: 1px solid #ddd;
    padding: 8px;
    text-align: left;
}
th { background-color: #f5f5f5; }
img { max-width: 100%; height: auto; }"#;

/// Body HTML only; raw HTML in the input is passed through unchanged
pub fn render_fragment(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, parser);
    body
}

/// Standalone styled HTML page for a report
pub fn render_document(markdown: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Research Report</title>
    <style>
{}
    </style>
</head>
<body>
{}
</body>
</html>
"#,
        STYLE,
        render_fragment(markdown)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_links() {
        let html = render_fragment("## Sources Cited\n\n1. [T1](https://a.example) - 2024\n");
        assert!(html.contains("<h2>Sources Cited</h2>"));
        assert!(html.contains(r#"<a href="https://a.example">T1</a>"#));
        assert!(html.contains("<ol>"));
    }

    #[test]
    fn tables_and_strikethrough() {
        let html = render_fragment("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn raw_html_passes_through() {
        let html = render_fragment("<div class=\"sources\">kept</div>\n");
        assert!(html.contains("<div class=\"sources\">kept</div>"));
    }

    #[test]
    fn document_is_a_styled_page() {
        let page = render_document("# Title");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("max-width: 900px"));
        assert!(page.contains("<h1>Title</h1>"));
        assert!(page.trim_end().ends_with("</html>"));
    }
}
