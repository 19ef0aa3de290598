use regex::Regex;
use scraper::{Html, Node};
use std::sync::LazyLock;

/// Elements whose text never belongs to the bill body.
const STRIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "header", "footer", "meta", "link"];

static HORIZONTAL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid regex"));
static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n +\n").expect("valid regex"));

/// Returns the full text content of `html` with boilerplate elements removed.
///
/// Every text node is kept, not only those inside paragraph-like elements:
/// some bill documents carry clause text in tables and bare `div`s.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut text = String::new();
    for node in document.tree.root().descendants() {
        let Node::Text(fragment) = node.value() else {
            continue;
        };
        let stripped = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => STRIPPED_ELEMENTS.contains(&element.name()),
            _ => false,
        });
        if !stripped {
            text.push_str(fragment);
        }
    }

    normalize_whitespace(&text)
}

/// Whitespace cleanup, applied in this order.
pub fn normalize_whitespace(text: &str) -> String {
    let text = HORIZONTAL_WS.replace_all(text, " ");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    let text = BLANK_LINE.replace_all(&text, "\n\n");
    text.trim().to_string()
}
