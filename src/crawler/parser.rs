//! HTML parser for extracting the human-readable text of a page
//!
//! Markup is discarded, as is the content of elements that never render as
//! text (scripts, styles and the like). What remains is joined with single
//! spaces so phrase matching never has to care about line breaks or
//! indentation in the source.

use scraper::{Html, Node};

/// Elements whose text content is not visible to a reader
const NON_VISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracts visible text from an HTML document
///
/// Whitespace runs, including those spanning element boundaries, collapse
/// to a single space, and the result has no leading or trailing whitespace.
///
/// # Example
///
/// ```
/// use tracebound::crawler::extract_visible_text;
///
/// let html = r#"<html><head><style>p { color: red }</style></head>
///     <body><p>Proof   of</p><p>work</p><script>var x = 1;</script></body></html>"#;
/// assert_eq!(extract_visible_text(html), "Proof of work");
/// ```
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut words: Vec<&str> = Vec::new();
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| NON_VISIBLE_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}
