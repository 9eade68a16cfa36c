use scraper::{ElementRef, Node as DomNode};

use super::Builder;
use super::text::{direct_text, format_children, format_element, normalize};
use crate::error::Error;
use crate::model::{Node, NodeType};

/// A `<div>` is a pure container; direct text inside one means the page is not what we expect.
pub(super) fn check_division(element: ElementRef<'_>) -> Result<(), Error> {
    let text = direct_text(element);
    let text = text.trim();
    if text.is_empty() {
        Ok(())
    } else {
        Err(Error::UnexpectedContent(text.to_string()))
    }
}

/// Empty when the paragraph has no visible content.
pub(super) fn paragraph_text(element: ElementRef<'_>) -> String {
    normalize(&format_children(element))
}

/// Direct text of the heading. When there is none and the heading wraps a single run,
/// as in `<h1><span>Agenda</span></h1>`, that run's sole text names it instead.
pub(super) fn heading_text(element: ElementRef<'_>) -> String {
    let text = normalize(&direct_text(element));
    if !text.is_empty() {
        return text;
    }
    sole_string(element).map(normalize).unwrap_or_default()
}

/// The text at the end of a chain of only children, if there is one.
fn sole_string(element: ElementRef<'_>) -> Option<&str> {
    let mut node = *element;
    loop {
        let mut children = node.children();
        let child = children.next()?;
        if children.next().is_some() {
            return None;
        }
        match child.value() {
            DomNode::Text(text) => return Some(&**text),
            DomNode::Element(_) => node = child,
            _ => return None,
        }
    }
}

pub(super) fn anchor_text(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    let href = element.value().attr("href").unwrap_or_default();
    normalize(&format!("[{text}]({href})"))
}

pub(super) fn span_text(element: ElementRef<'_>) -> String {
    normalize(&format_element(element))
}

fn is_list(name: &str) -> bool {
    matches!(name, "ul" | "ol")
}

/// Convert an `<ul>`/`<ol>` into a forest of nodes, one per item.
///
/// A nested list directly inside a list hangs off the preceding item; a nested list
/// inside an `<li>` hangs off that item.
pub(super) fn convert_list(element: ElementRef<'_>, created_at: i64, b: &mut Builder<'_>) -> Vec<Node> {
    let mut nodes = Vec::new();
    list_children(element, &mut nodes, created_at, b);
    nodes
}

fn list_children(list: ElementRef<'_>, nodes: &mut Vec<Node>, created_at: i64, b: &mut Builder<'_>) {
    for child in list.children().filter_map(ElementRef::wrap) {
        let name = child.value().name();
        if is_list(name) {
            match nodes.last_mut() {
                Some(last) => list_children(child, &mut last.children, created_at, b),
                None => list_children(child, nodes, created_at, b),
            }
        } else {
            list_item(child, nodes, created_at, b);
        }
    }
}

fn list_item(element: ElementRef<'_>, nodes: &mut Vec<Node>, created_at: i64, b: &mut Builder<'_>) {
    match element.value().name() {
        "li" | "p" | "h1" | "h2" | "h3" | "h4" | "h5" => {
            let mut text = String::new();
            let mut nested = Vec::new();
            for child in element.children() {
                match child.value() {
                    DomNode::Text(t) => text.push_str(t),
                    DomNode::Element(e) if is_list(e.name()) => {
                        if let Some(el) = ElementRef::wrap(child) {
                            nested.push(el);
                        }
                    }
                    DomNode::Element(_) => {
                        if let Some(el) = ElementRef::wrap(child) {
                            text.push_str(&format_element(el));
                        }
                    }
                    _ => {}
                }
            }
            let name = normalize(&text);
            if name.is_empty() {
                for list in nested {
                    list_children(list, nodes, created_at, b);
                }
                return;
            }
            let mut node = b.node(name, NodeType::Node, created_at);
            b.summary.add_leaf();
            for list in nested {
                list_children(list, &mut node.children, created_at, b);
            }
            nodes.push(node);
        }
        // Wrapper divisions are transparent.
        "div" => list_children(element, nodes, created_at, b),
        name @ ("table" | "tbody" | "tr" | "td" | "th") => {
            log::warn!("Currently unsupported list sub-element <{name}>, skipped");
        }
        name => {
            log::warn!(
                "Unsupported list sub-element <{name}> ({} bytes), skipped",
                element.html().len()
            );
        }
    }
}
