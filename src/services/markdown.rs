//! Content sanitization and markdown rendering.

use pulldown_cmark::{html, Parser};

/// Marker appended to a partial assistant turn when the client stopped
/// generation mid-stream.
pub const STOPPED_MARKER_HTML: &str = "\n\n<em>Generation stopped.</em>";

/// Convert markdown to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// Escape user input for storage, keeping line breaks as `<br>` markup.
pub fn sanitize_user_input(text: &str) -> String {
    html_escape::encode_text(text).replace('\n', "<br>")
}

/// Revert stored line-break markup to literal newlines for upstream replay.
pub fn restore_line_breaks(content: &str) -> String {
    content.replace("<br>", "\n")
}
