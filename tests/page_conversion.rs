mod common;

use common::{EDITED_AT, convert, find, names, page, page_html_with_header, walk};
use onenote_tana::html::{
    FOOTER_DESCRIPTION, FOOTER_MARKER, PageSettings, UNSUPPORTED_IMAGE_NAME, convert_page, parse_iso_millis,
};
use onenote_tana::model::UNKNOWN_TIMESTAMP;
use onenote_tana::{Error, IdGenerator, NodeType, PageData, Supertag};

fn table_tag() -> Supertag {
    Supertag {
        uid: "1".into(),
        name: "Table".into(),
    }
}

fn convert_one(page: &PageData) -> Result<onenote_tana::html::PageOutput, Error> {
    let mut ids = IdGenerator::default();
    let tag = table_tag();
    convert_page(
        page,
        &mut ids,
        PageSettings {
            utc_offset_minutes: -60,
            edited_at: EDITED_AT,
            table_tag: &tag,
        },
    )
}

#[test]
fn leading_paragraphs_become_header() {
    let doc = convert(vec![page("Groceries", "<p>Milk</p><p>  </p><p>Eggs</p>")]);

    assert_eq!(doc.nodes.len(), 1);
    let header = &doc.nodes[0];
    assert_eq!(header.name, "Groceries");
    assert_eq!(
        header.description.as_deref(),
        Some("Tuesday, December 26, 2023, 2:21 PM")
    );
    // 2:21 PM at UTC-1
    assert_eq!(header.created_at, parse_iso_millis("2023-12-26T15:21:00Z").unwrap());
    assert_eq!(names(&header.children), ["Milk", "Eggs"]);
    assert!(header.children.iter().all(|c| c.created_at == header.created_at));
    assert!(header.children.iter().all(|c| c.edited_at == EDITED_AT));

    assert_eq!(doc.summary.top_level_nodes, 1);
    assert_eq!(doc.summary.leaf_nodes, 2);
    assert_eq!(doc.summary.total_nodes, 3);
}

#[test]
fn header_edited_at_comes_from_page_metadata() {
    let mut p = page("Dated", "<p>x</p>");
    p.edited_at = "2024-01-02T03:04:05.000Z".into();
    let doc = convert(vec![p]);
    assert_eq!(doc.nodes[0].edited_at, parse_iso_millis("2024-01-02T03:04:05Z").unwrap());
    assert_eq!(doc.nodes[0].children[0].edited_at, EDITED_AT);
}

#[test]
fn inline_styles_survive_into_names() {
    let body = r#"<p><span style="font-weight:bold">bold</span><span style="font-weight:bold"> run</span> and <a href="https://tana.inc">Tana</a></p>"#;
    let doc = convert(vec![page("Styled", body)]);
    assert_eq!(
        doc.nodes[0].children[0].name,
        "<b>bold run</b> and [Tana](https://tana.inc)"
    );
}

#[test]
fn headings_remember_one_parent() {
    let body = "<h1>A</h1><p>under a</p><h2>B</h2><p>under b</p><h3>C</h3><p>under c</p>";
    let doc = convert(vec![page("Headings", body)]);
    let header = &doc.nodes[0];

    assert_eq!(names(&header.children), ["A", "B"]);
    let a = &header.children[0];
    let b = &header.children[1];
    assert_eq!(names(&a.children), ["under a", "C"]);
    assert_eq!(names(&b.children), ["under b"]);
    assert_eq!(names(&a.children[1].children), ["under c"]);
}

#[test]
fn heading_named_by_its_only_run() {
    let body = r#"<h1><span style="font-weight:bold">Agenda</span></h1><p>item</p>"#;
    let doc = convert(vec![page("Runs", body)]);
    let heading = &doc.nodes[0].children[0];
    assert_eq!(heading.name, "Agenda");
    assert_eq!(names(&heading.children), ["<b>Agenda</b>", "item"]);
}

#[test]
fn footer_attaches_to_header() {
    let body = format!("<h1>Section</h1><p>text</p><p>{FOOTER_MARKER}</p>");
    let doc = convert(vec![page("Footer", &body)]);
    let header = &doc.nodes[0];
    assert_eq!(names(&header.children), ["Section", FOOTER_MARKER]);
    assert_eq!(header.children[1].description.as_deref(), Some(FOOTER_DESCRIPTION));
    assert_eq!(names(&header.children[0].children), ["text"]);
}

#[test]
fn division_with_text_aborts_only_that_page() {
    let broken = page("Broken", "<div>stray text<p>x</p></div>");
    assert!(matches!(convert_one(&broken), Err(Error::UnexpectedContent(_))));

    let doc = convert(vec![broken, page("Fine", "<p>ok</p>")]);
    assert_eq!(names(&doc.nodes), ["Fine"]);
    assert_eq!(doc.summary.total_nodes, 2);
}

#[test]
fn german_header_uses_fallback_convention() {
    let html = page_html_with_header("Notiz", "Dienstag, 26. Dezember 2023", "14:21", "<p>x</p>");
    let doc = convert(vec![PageData {
        html,
        ..Default::default()
    }]);
    assert_eq!(doc.nodes[0].created_at, parse_iso_millis("2023-12-26T15:21:00Z").unwrap());
}

#[test]
fn unparseable_header_date_fails_the_page() {
    let html = page_html_with_header("Bad", "someday", "later", "<p>x</p>");
    let p = PageData {
        html,
        ..Default::default()
    };
    assert!(matches!(convert_one(&p), Err(Error::DateParse { .. })));
    assert!(convert(vec![p]).nodes.is_empty());
}

#[test]
fn elements_before_header_are_skipped() {
    let html = r#"<html><body><ul><li>orphan</li></ul><h1>early</h1><span>lost</span>
<p>Title</p><img alt="x"><p>Tuesday, December 26, 2023</p><p>2:21 PM</p><p>body</p></body></html>"#;
    let output = convert_one(&PageData {
        html: html.into(),
        ..Default::default()
    })
    .unwrap();
    let header = output.header.unwrap();
    assert_eq!(header.name, "Title");
    assert_eq!(names(&header.children), ["body"]);
}

#[test]
fn short_page_has_no_header() {
    let html = "<html><body><p>only</p><p>two</p></body></html>";
    let output = convert_one(&PageData {
        html: html.into(),
        ..Default::default()
    })
    .unwrap();
    assert!(output.header.is_none());
}

#[test]
fn unsupported_tags_do_not_fail() {
    let body = r#"<section><p>inside section</p></section>
<ul><li>item</li><table><tr><td>cell in list</td></tr></table></ul>"#;
    let doc = convert(vec![page("Odd", body)]);
    assert_eq!(names(&doc.nodes[0].children), ["inside section", "item"]);
}

#[test]
fn lists_nest_under_current_parent() {
    let body = "<h1>List</h1><ul><li>one</li><ul><li>one.a</li></ul><li>two</li></ul>";
    let doc = convert(vec![page("Lists", body)]);
    let list = find(&doc, "List");
    assert_eq!(names(&list.children), ["one", "two"]);
    assert_eq!(names(&list.children[0].children), ["one.a"]);
    assert_eq!(doc.summary.leaf_nodes, 4);
}

#[test]
fn tables_carry_the_shared_tag() {
    let body = r#"<table title="Scores"><tr><td></td><td>Q1</td><td></td></tr>
<tr><td>Ann</td><td>3</td><td>4</td></tr><tr><td></td><td>5</td><td>6</td></tr></table>"#;
    let doc = convert(vec![page("Tables", body)]);
    let table = &doc.nodes[0].children[0];

    assert_eq!(table.name, "Scores");
    assert_eq!(table.supertags, vec![doc.supertags[0].uid.clone()]);
    assert_eq!(names(&table.children), ["Ann", "C"]);
    let fields = &table.children[0].children;
    assert_eq!(names(fields), ["Q1", "2"]);
    assert!(fields.iter().all(|f| f.kind == NodeType::Field));
    assert_eq!(names(&fields[1].children), ["4"]);

    let attributes: Vec<&str> = doc.attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(attributes, ["Q1", "2"]);
    assert_eq!(doc.summary.fields, 2 + 4);
}

#[test]
fn images_become_unsupported_placeholders() {
    let body = r#"<p>before</p><img src="page_files/image001.png" alt="Receipt&#10;&#10;total 12.50"><p>after</p>"#;
    let doc = convert(vec![page("Images", body)]);
    let header = &doc.nodes[0];
    assert_eq!(names(&header.children), ["before", UNSUPPORTED_IMAGE_NAME, "after"]);
    let placeholder = &header.children[1];
    assert_eq!(placeholder.created_at, UNKNOWN_TIMESTAMP);
    assert_eq!(names(&placeholder.children), ["Receipt", "total 12.50"]);
    assert_eq!(placeholder.children[0].created_at, header.created_at);
    // before, after, placeholder and its two lines
    assert_eq!(doc.summary.leaf_nodes, 5);
}

#[test]
fn every_node_has_a_distinct_id() {
    let body = r#"<h1>H</h1><ul><li>a</li><li>b</li></ul>
<table><tr><td></td><td>X</td></tr><tr><td>r</td><td>1</td></tr></table><img alt="pic">"#;
    let doc = convert(vec![page("One", body), page("Two", body)]);
    let mut uids: Vec<u64> = walk(&doc.nodes).iter().map(|n| n.uid.parse().unwrap()).collect();
    let tag_uid: u64 = doc.supertags[0].uid.parse().unwrap();
    assert!(uids.iter().all(|&u| u > tag_uid));
    let count = uids.len();
    uids.sort_unstable();
    uids.dedup();
    assert_eq!(uids.len(), count);
}
