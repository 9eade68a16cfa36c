use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use super::Builder;
use super::text::linkify_urls;
use crate::model::{Node, NodeType, UNKNOWN_TIMESTAMP};

pub const UNTITLED_PICTURE: &str = "Untitled picture";
pub const UNSUPPORTED_IMAGE_NAME: &str = "(Images are not supported) [Upvote #21](https://ideas.tana.inc/posts/21-tana-api-add-data-to-tana-and-access-it-with-api).";
pub const UNSUPPORTED_IMAGE_DESCRIPTION: &str =
    "<i>Tana TIF currently does not support importing <u>inline</u> images.</i>";
const CORRUPTED_DESCRIPTION: &str =
    "OneNote potentially corrupted on transit. Must be copied by hand to fix.";
const CAPTION_DESCRIPTION: &str = "Assumed image to text.";

static UNTITLED_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Untitled picture\.\w+").expect("static untitled pattern"));

fn alt_node(b: &mut Builder<'_>, name: &str, description: &str, created_at: i64) -> Node {
    let node = b
        .node(linkify_urls(name), NodeType::Node, created_at)
        .with_description(description);
    b.summary.add_leaf();
    node
}

/// The first and last characters agree, e.g. a quoted caption.
fn looks_like_caption(text: &str) -> bool {
    let trimmed = text.trim();
    match (trimmed.chars().next(), trimmed.chars().last()) {
        (Some(first), Some(last)) => first == last,
        _ => false,
    }
}

/// Turn an `<img>` into a placeholder node holding whatever its alt text recovered.
///
/// Inline images cannot be imported, so the picture itself is dropped. OCR'd alt text
/// is split into lines: the first line stands alone, the rest are grouped by blank lines.
/// Every node created here is counted in the summary.
pub(super) fn image_to_node(element: ElementRef<'_>, created_at: i64, b: &mut Builder<'_>) -> Node {
    let alt = element.value().attr("alt").filter(|a| !a.is_empty());
    if let Some(src) = element.value().attr("src") {
        log::debug!("<img> src={src:?}, payload found={}", b.has_image(src));
    }
    let text = match alt {
        Some(alt) => UNTITLED_FILE.replace_all(alt, "").into_owned(),
        None => " ".to_string(),
    };
    let corrupted = alt.is_some();

    let mut children = Vec::new();
    let mut lines = text.split('\n').map(|l| l.replace('\r', ""));

    if let Some(first) = lines.next()
        && !first.is_empty()
    {
        let description = if corrupted { CORRUPTED_DESCRIPTION } else { "" };
        let name = if first.starts_with(' ') { UNTITLED_PICTURE } else { first.as_str() };
        children.push(alt_node(b, name, description, created_at));
    }

    let mut group = String::new();
    for line in lines {
        if line.trim().is_empty() {
            if group.is_empty() {
                continue;
            }
            let node = if looks_like_caption(&group) {
                alt_node(b, group.trim(), CAPTION_DESCRIPTION, created_at)
            } else {
                alt_node(b, &group, "", created_at)
            };
            children.push(node);
            group.clear();
        } else {
            if !group.is_empty() {
                group.push(' ');
            }
            group.push_str(&line);
        }
    }
    if !group.is_empty() {
        children.push(alt_node(b, &group, "", UNKNOWN_TIMESTAMP));
    }

    let mut placeholder = b
        .node(UNSUPPORTED_IMAGE_NAME, NodeType::Node, UNKNOWN_TIMESTAMP)
        .with_description(UNSUPPORTED_IMAGE_DESCRIPTION);
    placeholder.children = children;
    b.summary.add_leaf();
    placeholder
}
