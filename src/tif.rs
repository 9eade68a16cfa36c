use std::io::Write;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Error;
use crate::html::{self, PageSettings, merge_attributes};
use crate::ids::{DEFAULT_INSTANCE, IdGenerator};
use crate::model::{Attribute, Document, Node, PageData, Summary, Supertag, TIF_VERSION};

pub const DEFAULT_TABLE_TAG: &str = "Table (by onenote_to_tana)";
pub const SUBPAGE_DESCRIPTION: &str =
    "Imported into Tana with <b><i>onenote-to-tana</i></b>, including subpages below.";

/// The fixed zone page headers are written in (`Etc/GMT+1`).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -60;

#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// Offset from UTC of the page header date/time, in minutes.
    pub utc_offset_minutes: i32,
    pub instance: u16,
    pub table_tag_name: String,
    /// `editedAt` for every created node, epoch millis.
    pub edited_at: i64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            instance: DEFAULT_INSTANCE,
            table_tag_name: DEFAULT_TABLE_TAG.to_string(),
            edited_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Collects converted pages into one document.
pub struct Assembler<'a> {
    ids: &'a mut IdGenerator,
    options: ConvertOptions,
    table_tag: Supertag,
    summary: Summary,
    nodes: Vec<Node>,
    attributes: IndexMap<String, Attribute>,
    /// Index in `nodes` of the last page that was not a sub-page.
    superpage: Option<usize>,
}

impl<'a> Assembler<'a> {
    pub fn new(ids: &'a mut IdGenerator, options: ConvertOptions) -> Self {
        let table_tag = Supertag {
            uid: ids.next_id().to_string(),
            name: options.table_tag_name.clone(),
        };
        Assembler {
            ids,
            options,
            table_tag,
            summary: Summary::default(),
            nodes: Vec::new(),
            attributes: IndexMap::new(),
            superpage: None,
        }
    }

    /// Convert one page and fold it in. On error nothing from the page is kept.
    pub fn add_page(&mut self, page: &PageData) -> Result<(), Error> {
        log::info!(
            "> Page: {:?}, from {:?} notebook section {:?}",
            page.page_name,
            page.notebook_name,
            page.section_name
        );
        let settings = PageSettings {
            utc_offset_minutes: self.options.utc_offset_minutes,
            edited_at: self.options.edited_at,
            table_tag: &self.table_tag,
        };
        let output = html::convert_page(page, self.ids, settings)?;

        self.summary.merge(&output.summary);
        merge_attributes(&mut self.attributes, output.attributes.into_values());
        if let Some(header) = output.header {
            self.place_header(header, page.is_sub_page);
        }
        Ok(())
    }

    fn place_header(&mut self, header: Node, is_sub_page: bool) {
        if !is_sub_page {
            self.superpage = Some(self.nodes.len());
            self.nodes.push(header);
            self.summary.top_level_nodes += 1;
            return;
        }
        let Some(index) = self.superpage.filter(|&i| i < self.nodes.len()) else {
            log::debug!("Sub-page {:?} has no superpage, kept at top level", header.name);
            self.nodes.push(header);
            self.summary.top_level_nodes += 1;
            return;
        };
        let superpage = &mut self.nodes[index];
        match superpage.children.last_mut() {
            Some(last) => {
                last.description = Some(SUBPAGE_DESCRIPTION.to_string());
                last.children.push(header);
            }
            None => superpage.children.push(header),
        }
        self.summary.leaf_nodes += 1;
    }

    pub fn finish(self) -> Document {
        Document {
            version: TIF_VERSION.to_string(),
            summary: self.summary,
            nodes: self.nodes,
            attributes: self.attributes.into_values().collect(),
            supertags: vec![self.table_tag],
        }
    }
}

/// Convert pages in order. Pages that fail to load or convert are logged and left out.
pub fn convert_pages<I>(pages: I, ids: &mut IdGenerator, options: ConvertOptions) -> Document
where
    I: IntoIterator<Item = Result<PageData, Error>>,
{
    let mut assembler = Assembler::new(ids, options);
    for page in pages {
        let page = match page {
            Ok(page) => page,
            Err(e) => {
                log::error!("Page could not be loaded: {e}");
                continue;
            }
        };
        if let Err(e) = assembler.add_page(&page) {
            log::error!("Page {:?} skipped: {e}", page.page_name);
        }
    }
    assembler.finish()
}

/// Serialize with a three-space indent.
pub fn write_document<W: Write>(doc: &Document, writer: W) -> Result<(), Error> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    doc.serialize(&mut ser)?;
    Ok(())
}

pub fn to_json_string(doc: &Document) -> Result<String, Error> {
    let mut buf = Vec::new();
    write_document(doc, &mut buf)?;
    String::from_utf8(buf).map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

pub fn from_json_str(json: &str) -> Result<Document, Error> {
    Ok(serde_json::from_str(json)?)
}
