/// Markdown rendering pipeline for user content
///
/// Converts markdown to HTML (comrak, with the GFM table extension) and
/// sanitizes the result against an explicit allow-list (ammonia). Raw
/// HTML in the source is left intact by the converter and handled
/// entirely by the sanitizer: disallowed tags are stripped, keeping their
/// text content, except script/style-type elements whose content is
/// dropped. Nothing is emitted as escaped markup.
///
/// Rendering is pure and total; arbitrary input produces some HTML, and
/// callers invoke it fresh on every read so output always reflects the
/// current source.
use comrak::Options;

/// Tags allowed through sanitization on top of ammonia's baseline safe
/// set.
const ALLOWED_TAGS: [&str; 25] = [
    "p", "pre", "code", "hr", "br", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li",
    "blockquote", "strong", "em", "a", "img", "table", "thead", "tbody", "tr", "th", "td",
];

/// Attributes allowed on every tag.
const GENERIC_ATTRIBUTES: [&str; 2] = ["class", "style"];

pub struct MarkdownRenderer {
    sanitizer: ammonia::Builder<'static>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut sanitizer = ammonia::Builder::default();
        sanitizer
            .add_tags(ALLOWED_TAGS)
            .add_generic_attributes(GENERIC_ATTRIBUTES)
            // link_rel rewriting must be off before rel can be allowed
            // through as a plain attribute.
            .link_rel(None)
            .add_tag_attributes("a", ["href", "title", "rel"])
            .add_tag_attributes("img", ["src", "alt", "title"]);

        Self { sanitizer }
    }

    /// Render markdown to sanitized HTML.
    pub fn render(&self, markdown: &str) -> String {
        let mut options = Options::default();
        options.extension.table = true;
        // Raw HTML flows through the converter untouched; the sanitizer
        // below is the single place it is filtered.
        options.render.unsafe_ = true;

        let html = comrak::markdown_to_html(markdown, &options);
        self.sanitizer.clean(&html).to_string()
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello\n\nThis is **bold** text.");

        assert!(html.contains("<h1>"), "should contain h1: {}", html);
        assert!(html.contains("<strong>bold</strong>"), "{}", html);
    }

    #[test]
    fn test_render_lists_and_blockquotes() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("- one\n- two\n\n> quoted\n\n---\n");

        assert!(html.contains("<ul>"), "{}", html);
        assert!(html.contains("<li>one</li>"), "{}", html);
        assert!(html.contains("<blockquote>"), "{}", html);
        assert!(html.contains("<hr"), "{}", html);
    }

    #[test]
    fn test_render_links_and_images() {
        let renderer = MarkdownRenderer::new();
        let html =
            renderer.render("[site](https://example.com \"home\")\n\n![alt text](https://example.com/x.png)");

        assert!(html.contains("href=\"https://example.com\""), "{}", html);
        assert!(html.contains("title=\"home\""), "{}", html);
        assert!(html.contains("<img"), "{}", html);
        assert!(html.contains("src=\"https://example.com/x.png\""), "{}", html);
        assert!(html.contains("alt=\"alt text\""), "{}", html);
    }

    #[test]
    fn test_render_code_blocks() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```\nlet x = 1;\n```");

        assert!(html.contains("<pre>"), "{}", html);
        assert!(html.contains("<code>"), "{}", html);
        assert!(html.contains("let x = 1;"), "{}", html);
    }

    #[test]
    fn test_render_tables() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n");

        assert!(html.contains("<table>"), "{}", html);
        assert!(html.contains("<th>a</th>"), "{}", html);
        assert!(html.contains("<td>1</td>"), "{}", html);
    }

    #[test]
    fn test_script_is_removed_with_content() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("before\n\n<script>alert('xss')</script>\n\nafter");

        assert!(!html.contains("<script"), "{}", html);
        assert!(!html.contains("alert"), "script content must be dropped: {}", html);
        assert!(!html.contains("&lt;script"), "must strip, not escape: {}", html);
        assert!(html.contains("before"), "{}", html);
        assert!(html.contains("after"), "{}", html);
    }

    #[test]
    fn test_event_handler_attributes_are_dropped() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("<img src=\"https://example.com/a.png\" onerror=\"alert(1)\">");

        assert!(html.contains("src=\"https://example.com/a.png\""), "{}", html);
        assert!(!html.contains("onerror"), "{}", html);
    }

    #[test]
    fn test_disallowed_tag_keeps_text_content() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("<marquee>still here</marquee>");

        assert!(!html.contains("<marquee"), "{}", html);
        assert!(!html.contains("&lt;marquee"), "{}", html);
        assert!(html.contains("still here"), "{}", html);
    }

    #[test]
    fn test_class_and_style_attributes_survive() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("<p class=\"lead\" style=\"color:red\" data-x=\"1\">hi</p>");

        assert!(html.contains("class=\"lead\""), "{}", html);
        assert!(html.contains("style=\"color:red\""), "{}", html);
        assert!(!html.contains("data-x"), "{}", html);
    }

    #[test]
    fn test_anchor_rel_passes_through() {
        let renderer = MarkdownRenderer::new();
        let html =
            renderer.render("<a href=\"https://example.com\" rel=\"nofollow\" target=\"_blank\">x</a>");

        assert!(html.contains("rel=\"nofollow\""), "{}", html);
        assert!(!html.contains("target="), "{}", html);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = MarkdownRenderer::new();
        let source = "# Title\n\n- a\n- b\n\n<img src=x onerror=y>\n\n**done**";

        assert_eq!(renderer.render(source), renderer.render(source));
    }

    #[test]
    fn test_plain_text_becomes_paragraph() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("just words");

        assert_eq!(html.trim(), "<p>just words</p>");
    }

    #[test]
    fn test_empty_input() {
        let renderer = MarkdownRenderer::new();
        assert_eq!(renderer.render(""), "");
    }
}
