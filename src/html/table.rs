use scraper::ElementRef;

use super::Builder;
use super::text::{format_children, normalize};
use crate::model::{Attribute, Node, NodeType, Supertag};

pub const DEFAULT_TABLE_TITLE: &str = "OneNote Table";

/// A table read off the page: its title plus normalized cell text, row by row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableData {
    pub title: String,
    pub rows: Vec<Vec<String>>,
}

fn cells<'a>(parent: ElementRef<'a>, names: &'a [&'a str]) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| names.contains(&el.value().name()))
}

/// Rows live either directly under `<table>` or inside `<thead>`/`<tbody>`/`<tfoot>`.
fn rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(cells(child, &["tr"])),
            _ => {}
        }
    }
    rows
}

pub(super) fn read_table(table: ElementRef<'_>) -> TableData {
    let title = table
        .value()
        .attr("title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TABLE_TITLE)
        .to_string();
    let rows = rows(table)
        .into_iter()
        .map(|tr| {
            cells(tr, &["td", "th"])
                .map(|cell| normalize(&format_children(cell)))
                .collect()
        })
        .collect();
    TableData { title, rows }
}

/// Spreadsheet-style letters for a 1-based index: 1 → A, 26 → Z, 27 → AA.
pub fn column_letters(mut n: usize) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn header_name(cell: &str, index: usize) -> String {
    if cell.is_empty() {
        (index + 1).to_string()
    } else {
        cell.to_string()
    }
}

/// Build the node tree for one table.
///
/// Row 0 holds the column headers (its first cell is the row-label column). Every
/// later row becomes a node named after its first cell, with one field per remaining
/// column wrapping the cell value. Returns the table node and one attribute per column.
pub fn table_to_node(
    table: &TableData,
    created_at: i64,
    tag: &Supertag,
    b: &mut Builder<'_>,
) -> (Node, Vec<Attribute>) {
    let name = match table.rows.first().and_then(|r| r.first()) {
        Some(first) if !first.is_empty() => first.clone(),
        _ => table.title.clone(),
    };
    let mut table_node = b.node(name, NodeType::Node, created_at);
    table_node.supertags.push(tag.uid.clone());

    let Some((header, body)) = table.rows.split_first() else {
        return (table_node, Vec::new());
    };

    let headers: Vec<String> = header
        .iter()
        .skip(1)
        .enumerate()
        .map(|(i, cell)| header_name(cell, i))
        .collect();
    b.summary.fields += headers.len() as u32;

    for (i, row) in body.iter().enumerate() {
        let row_index = i + 1;
        let row_name = match row.first() {
            Some(first) if !first.is_empty() => first.clone(),
            _ => column_letters(row_index + 1),
        };
        let mut row_node = b.node(row_name, NodeType::Node, created_at);
        for (j, cell) in row.iter().skip(1).enumerate() {
            let field_name = headers
                .get(j)
                .cloned()
                .unwrap_or_else(|| (j + 1).to_string());
            let value = b.node(cell.clone(), NodeType::Node, created_at);
            b.summary.add_leaf();
            let mut field = b.node(field_name, NodeType::Field, created_at);
            field.children.push(value);
            b.summary.fields += 1;
            row_node.children.push(field);
        }
        table_node.children.push(row_node);
        b.summary.add_leaf();
    }

    let attributes = headers.into_iter().map(|name| Attribute::new(name, 0)).collect();
    (table_node, attributes)
}
