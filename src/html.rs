//! Plain-text rendering of the HTML `setlistdata` field.

use scraper::{ElementRef, Html};

/// Field added next to `setlistdata` holding its plain-text form.
pub const CLEAN_SETLIST_FIELD: &str = "setlistdata_clean";

const BLOCK_TAGS: [&str; 4] = ["p", "div", "li", "br"];

/// Strips tags and decodes entities, one line per paragraph.
///
/// `<p><span>Set 1</span>: <a>Tweezer</a> &gt; <a>Reba</a></p>` becomes
/// `Set 1: Tweezer > Reba`. Runs of whitespace collapse to one space.
#[must_use]
pub fn clean_setlist(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut lines = Vec::new();
    let mut inline = String::new();

    for node in fragment.root_element().children() {
        if let Some(element) = ElementRef::wrap(node) {
            if BLOCK_TAGS.contains(&element.value().name()) {
                lines.push(std::mem::take(&mut inline));
                lines.push(element.text().collect());
            } else {
                inline.extend(element.text());
            }
        } else if let Some(text) = node.value().as_text() {
            inline.push_str(text);
        }
    }
    lines.push(inline);

    lines
        .iter()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
