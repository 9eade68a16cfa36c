mod error;
pub mod html;
pub mod ids;
pub mod mht;
pub mod model;
pub mod source;
pub mod tif;

pub use error::Error;
pub use ids::IdGenerator;
pub use model::{Attribute, DataType, Document, Node, NodeType, PageData, Summary, Supertag};
pub use source::{PageEntry, PageFilter, read_manifest};
pub use tif::{Assembler, ConvertOptions, convert_pages, write_document};

use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Load, convert and serialize the given pages. `output` of `None` writes to stdout.
pub fn convert_entries_to_tif(
    entries: &[PageEntry],
    options: ConvertOptions,
    output: Option<&Path>,
) -> Result<Document, Error> {
    let t0 = Instant::now();

    let mut ids = IdGenerator::new(options.instance);
    let doc = convert_pages(entries.iter().map(PageEntry::load), &mut ids, options);
    let t_convert = t0.elapsed();

    let bytes = tif::to_json_string(&doc)?;
    let t_serialize = t0.elapsed();

    match output {
        Some(path) => std::fs::write(path, &bytes).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
        })?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    let t_total = t0.elapsed();

    log::info!(
        "Timing: convert={:.1}ms, serialize={:.1}ms, write={:.1}ms, total={:.1}ms ({} pages, {} nodes, {} bytes)",
        t_convert.as_secs_f64() * 1000.0,
        (t_serialize - t_convert).as_secs_f64() * 1000.0,
        (t_total - t_serialize).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        entries.len(),
        doc.node_count(),
        bytes.len(),
    );

    Ok(doc)
}

/// Convert a single page's HTML into a one-page document.
pub fn convert_html_to_tif(page: PageData, options: ConvertOptions) -> Document {
    let mut ids = IdGenerator::new(options.instance);
    convert_pages([Ok(page)], &mut ids, options)
}
