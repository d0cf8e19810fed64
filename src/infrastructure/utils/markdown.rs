use ammonia::{Builder, UrlRelative};
use pulldown_cmark::{html, Options, Parser};

/// Renders post content to HTML with unsafe markup stripped.
pub fn safe_markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::all());

    let mut raw_html = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut raw_html, parser);

    Builder::default()
        .link_rel(Some("nofollow noopener noreferrer"))
        .url_relative(UrlRelative::PassThrough)
        .clean(&raw_html)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_marks_links() {
        let html = safe_markdown_to_html("[site](https://example.com)\n\n<script>x()</script>");
        assert!(html.contains(r#"rel="nofollow noopener noreferrer""#));
        assert!(!html.contains("<script>"));
    }
}
