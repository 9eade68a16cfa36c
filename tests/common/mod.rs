#![allow(dead_code)]

use onenote_tana::{ConvertOptions, Document, IdGenerator, Node, PageData, convert_pages};

pub const EDITED_AT: i64 = 1_700_000_000_000;
pub const TITLE_DATE: &str = "Tuesday, December 26, 2023";
pub const TITLE_TIME: &str = "2:21 PM";

/// Route library log output through the test harness; visible with `--nocapture`.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn options() -> ConvertOptions {
    ConvertOptions {
        edited_at: EDITED_AT,
        ..Default::default()
    }
}

/// Page markup the way the exporter lays it out: title, date and time paragraphs first.
pub fn page_html_with_header(title: &str, date: &str, time: &str, body: &str) -> String {
    format!(
        r#"<html><head><meta charset="utf-8"><title>{title}</title></head>
<body lang="de" style="font-family:Calibri;font-size:11.0pt">
<div style="direction:ltr;border-width:100%">
<div style="direction:ltr;margin-top:0in;margin-left:0in;width:6.6in">
<div style="margin-top:0in;margin-left:0in;width:3.2in">
<p style="margin:0in;font-family:Calibri Light;font-size:20.0pt" lang="en-US">{title}</p>
</div>
<div style="margin-top:.0423in;margin-left:0in;width:1.6in">
<p style="margin:0in;font-size:10.0pt;color:#767676">{date}</p>
<p style="margin:0in;font-size:10.0pt;color:#767676">{time}</p>
</div>
<div style="margin-top:.4in;margin-left:0in;width:6.6in">
{body}
</div>
</div>
</div>
</body></html>"#
    )
}

pub fn page_html(title: &str, body: &str) -> String {
    page_html_with_header(title, TITLE_DATE, TITLE_TIME, body)
}

pub fn page(title: &str, body: &str) -> PageData {
    PageData {
        notebook_name: "Notebook".into(),
        section_name: "Section".into(),
        page_name: title.into(),
        html: page_html(title, body),
        ..Default::default()
    }
}

pub fn sub_page(title: &str, body: &str) -> PageData {
    PageData {
        is_sub_page: true,
        ..page(title, body)
    }
}

pub fn convert(pages: Vec<PageData>) -> Document {
    init_logging();
    let mut ids = IdGenerator::default();
    convert_pages(pages.into_iter().map(Ok), &mut ids, options())
}

pub fn names(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(|n| n.name.as_str()).collect()
}

/// Every node in pre-order.
pub fn walk(nodes: &[Node]) -> Vec<&Node> {
    let mut out = Vec::new();
    let mut stack: Vec<&Node> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(node.children.iter().rev());
    }
    out
}

pub fn find<'a>(doc: &'a Document, name: &str) -> &'a Node {
    walk(&doc.nodes)
        .into_iter()
        .find(|n| n.name == name)
        .unwrap_or_else(|| panic!("no node named {name:?}"))
}
