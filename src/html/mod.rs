mod elements;
mod header;
mod image;
mod table;
pub mod text;

use std::collections::HashMap;

use indexmap::IndexMap;
use scraper::{ElementRef, Html};

use crate::error::Error;
use crate::ids::IdGenerator;
use crate::model::{Attribute, Node, NodeType, PageData, Summary, Supertag};

pub use header::{FALLBACK_FORMAT, PRIMARY_FORMAT, parse_header_timestamp, parse_iso_millis};
pub use image::{UNSUPPORTED_IMAGE_DESCRIPTION, UNSUPPORTED_IMAGE_NAME, UNTITLED_PICTURE};
pub use table::{DEFAULT_TABLE_TITLE, TableData, column_letters, table_to_node};

pub const FOOTER_MARKER: &str = "Created with OneNote.";
pub const FOOTER_DESCRIPTION: &str = "Imported into Tana with <b><i>onenote-to-tana</i></b>.";

/// Mints nodes and keeps the running counts for one page.
pub struct Builder<'a> {
    ids: &'a mut IdGenerator,
    edited_at: i64,
    images: Option<&'a HashMap<String, Vec<u8>>>,
    pub summary: Summary,
}

impl<'a> Builder<'a> {
    pub fn new(ids: &'a mut IdGenerator, edited_at: i64) -> Self {
        Builder {
            ids,
            edited_at,
            images: None,
            summary: Summary::default(),
        }
    }

    pub fn with_images(mut self, images: &'a HashMap<String, Vec<u8>>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn node(&mut self, name: impl Into<String>, kind: NodeType, created_at: i64) -> Node {
        Node::new(self.ids.next_id(), name, kind, created_at, self.edited_at)
    }

    fn has_image(&self, src: &str) -> bool {
        self.images.is_some_and(|images| images.contains_key(src))
    }
}

/// Insert attributes keyed by name: a repeated name takes the newer definition but keeps
/// the slot of the first one.
pub fn merge_attributes(into: &mut IndexMap<String, Attribute>, attributes: impl IntoIterator<Item = Attribute>) {
    for attribute in attributes {
        into.insert(attribute.name.clone(), attribute);
    }
}

/// Where the page header is in its three-paragraph preamble.
#[derive(Clone, Debug, PartialEq)]
enum HeaderState {
    AwaitingTitle,
    AwaitingDate { title: String },
    AwaitingTime { title: String, date: String },
    InBody,
    Done,
}

enum Traversal {
    /// The converter folded the whole subtree into its output.
    Subtree,
    /// Only the element itself was consumed; its children are visited next.
    Children,
}

/// A node under construction. `attached` are arena indices appended after `node.children`.
struct Slot {
    node: Node,
    attached: Vec<usize>,
}

/// Settings that shape a page conversion.
#[derive(Clone, Copy, Debug)]
pub struct PageSettings<'a> {
    pub utc_offset_minutes: i32,
    pub edited_at: i64,
    pub table_tag: &'a Supertag,
}

/// Result of converting one page.
#[derive(Debug)]
pub struct PageOutput {
    /// `None` when the page never got its three header paragraphs.
    pub header: Option<Node>,
    pub summary: Summary,
    pub attributes: IndexMap<String, Attribute>,
}

struct PageConverter<'a> {
    page: &'a PageData,
    settings: PageSettings<'a>,
    builder: Builder<'a>,
    attributes: IndexMap<String, Attribute>,
    state: HeaderState,
    arena: Vec<Slot>,
    current: Option<usize>,
    previous: Option<usize>,
}

/// Convert one page's HTML into its header node and subtree.
///
/// The first three `<p>` elements are the title, date and time; everything after them
/// attaches below the header. A heading becomes the new parent, and the parent it
/// replaces is remembered for exactly one level.
pub fn convert_page(page: &PageData, ids: &mut IdGenerator, settings: PageSettings<'_>) -> Result<PageOutput, Error> {
    let doc = Html::parse_document(&page.html);
    let mut converter = PageConverter {
        page,
        settings,
        builder: Builder::new(ids, settings.edited_at).with_images(&page.images),
        attributes: IndexMap::new(),
        state: HeaderState::AwaitingTitle,
        arena: Vec::new(),
        current: None,
        previous: None,
    };
    converter.visit(doc.root_element())?;
    Ok(converter.finish())
}

impl<'a> PageConverter<'a> {
    fn visit(&mut self, element: ElementRef<'_>) -> Result<(), Error> {
        if let Traversal::Children = self.convert(element)? {
            for child in element.children().filter_map(ElementRef::wrap) {
                self.visit(child)?;
            }
        }
        Ok(())
    }

    fn convert(&mut self, element: ElementRef<'_>) -> Result<Traversal, Error> {
        let tag = element.value().name().to_ascii_lowercase();
        let traversal = match tag.as_str() {
            "div" => {
                elements::check_division(element)?;
                Traversal::Children
            }
            "p" => {
                self.paragraph(element)?;
                Traversal::Subtree
            }
            "table" => {
                if let Some(parent) = self.require_parent(&tag) {
                    let created_at = self.created_at(parent);
                    let data = table::read_table(element);
                    let (node, attributes) =
                        table::table_to_node(&data, created_at, self.settings.table_tag, &mut self.builder);
                    self.builder.summary.add_leaf();
                    self.attach(parent, node);
                    merge_attributes(&mut self.attributes, attributes);
                }
                Traversal::Subtree
            }
            "img" => {
                if let Some(parent) = self.require_parent(&tag) {
                    let created_at = self.created_at(parent);
                    let node = image::image_to_node(element, created_at, &mut self.builder);
                    self.attach(parent, node);
                }
                Traversal::Subtree
            }
            "h1" | "h2" | "h3" | "h4" | "h5" => {
                self.heading(element, &tag);
                Traversal::Children
            }
            "ol" | "ul" => {
                if let Some(parent) = self.require_parent(&tag) {
                    let created_at = self.created_at(parent);
                    for node in elements::convert_list(element, created_at, &mut self.builder) {
                        self.attach(parent, node);
                    }
                }
                Traversal::Subtree
            }
            "span" => {
                self.leaf(&tag, elements::span_text(element));
                Traversal::Children
            }
            "a" => {
                self.leaf(&tag, elements::anchor_text(element));
                Traversal::Children
            }
            "br" | "nobr" | "html" | "head" | "meta" | "link" | "body" => Traversal::Children,
            "title" | "style" | "script" => Traversal::Subtree,
            _ => {
                log::warn!("Unsupported tag: <{tag}>");
                Traversal::Children
            }
        };
        Ok(traversal)
    }

    fn paragraph(&mut self, element: ElementRef<'_>) -> Result<(), Error> {
        let text = elements::paragraph_text(element);
        match std::mem::replace(&mut self.state, HeaderState::InBody) {
            HeaderState::AwaitingTitle => {
                self.state = HeaderState::AwaitingDate { title: text };
            }
            HeaderState::AwaitingDate { title } => {
                self.state = HeaderState::AwaitingTime { title, date: text };
            }
            HeaderState::AwaitingTime { title, date } => {
                self.header(title, date, text)?;
            }
            HeaderState::InBody | HeaderState::Done => {
                if text.is_empty() {
                    return Ok(());
                }
                let Some(parent) = self.require_parent("p") else {
                    return Ok(());
                };
                let created_at = self.created_at(parent);
                let mut node = self.builder.node(text, NodeType::Node, created_at);
                self.builder.summary.add_leaf();
                if node.name.contains(FOOTER_MARKER) {
                    node.description = Some(FOOTER_DESCRIPTION.to_string());
                    self.attach(0, node);
                } else {
                    node.description = Some(String::new());
                    self.attach(parent, node);
                }
            }
        }
        Ok(())
    }

    fn header(&mut self, title: String, date: String, time: String) -> Result<(), Error> {
        let created_at = header::parse_header_timestamp(&date, &time, self.settings.utc_offset_minutes)?;
        let edited_at = parse_iso_millis(&self.page.edited_at).unwrap_or(self.settings.edited_at);
        let mut node = self
            .builder
            .node(title, NodeType::Node, created_at)
            .with_description(format!("{date}, {time}"));
        node.edited_at = edited_at;
        self.builder.summary.total_nodes += 1;
        log::debug!("Page header {:?} created at {created_at}", node.name);
        self.arena.push(Slot {
            node,
            attached: Vec::new(),
        });
        self.current = Some(0);
        self.previous = Some(0);
        Ok(())
    }

    fn heading(&mut self, element: ElementRef<'_>, tag: &str) {
        let (Some(current), Some(previous)) = (self.current, self.previous) else {
            log::warn!("<{tag}> arrived before the page header, skipped");
            return;
        };
        let text = elements::heading_text(element);
        let created_at = self.created_at(current);
        let node = self.builder.node(text, NodeType::Node, created_at);
        self.builder.summary.add_leaf();
        let index = self.attach(previous, node);
        self.previous = Some(current);
        self.current = Some(index);
    }

    fn leaf(&mut self, tag: &str, text: String) {
        if text.is_empty() {
            log::debug!("Empty <{tag}> skipped");
            return;
        }
        let Some(parent) = self.require_parent(tag) else {
            return;
        };
        let created_at = self.created_at(parent);
        let node = self
            .builder
            .node(text, NodeType::Node, created_at)
            .with_description("");
        self.builder.summary.add_leaf();
        self.attach(parent, node);
    }

    fn require_parent(&self, tag: &str) -> Option<usize> {
        if self.current.is_none() {
            log::warn!("Parent node missing for <{tag}>, skipped");
        }
        self.current
    }

    fn created_at(&self, slot: usize) -> i64 {
        self.arena[slot].node.created_at
    }

    fn attach(&mut self, parent: usize, node: Node) -> usize {
        let index = self.arena.len();
        self.arena.push(Slot {
            node,
            attached: Vec::new(),
        });
        self.arena[parent].attached.push(index);
        index
    }

    fn finish(mut self) -> PageOutput {
        if !matches!(self.state, HeaderState::InBody) {
            log::warn!(
                "Page {:?} ended before its title/date/time header was complete",
                self.page.page_name
            );
        }
        self.state = HeaderState::Done;
        let header = if self.arena.is_empty() {
            None
        } else {
            let mut slots: Vec<Option<Slot>> = self.arena.into_iter().map(Some).collect();
            Some(materialize(&mut slots, 0))
        };
        PageOutput {
            header,
            summary: self.builder.summary,
            attributes: self.attributes,
        }
    }
}

fn materialize(slots: &mut [Option<Slot>], index: usize) -> Node {
    let Some(Slot { mut node, attached }) = slots[index].take() else {
        unreachable!("arena slot {index} attached twice");
    };
    for child in attached {
        let child = materialize(slots, child);
        node.children.push(child);
    }
    node
}
