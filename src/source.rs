use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;
use crate::mht;
use crate::model::PageData;

/// One page listed in a manifest. `source` is resolved relative to the manifest.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageEntry {
    pub notebook: String,
    pub section: String,
    pub name: String,
    pub created_at: String,
    pub edited_at: String,
    pub is_sub_page: bool,
    pub source: PathBuf,
}

impl PageEntry {
    /// A page given directly as a file, named after its stem.
    pub fn from_file(path: &Path) -> Self {
        PageEntry {
            name: path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string(),
            source: path.to_path_buf(),
            ..Default::default()
        }
    }

    pub fn load(&self) -> Result<PageData, Error> {
        let bytes = std::fs::read(&self.source).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, self.source.display())))
        })?;
        let ext = self
            .source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let (html, images) = match ext.as_deref() {
            Some("mht" | "mhtml") => mht::extract(&bytes)?,
            _ => (String::from_utf8_lossy(&bytes).into_owned(), Default::default()),
        };
        Ok(PageData {
            notebook_name: self.notebook.clone(),
            section_name: self.section.clone(),
            page_name: self.name.clone(),
            created_at: self.created_at.clone(),
            edited_at: self.edited_at.clone(),
            is_sub_page: self.is_sub_page,
            html,
            images,
        })
    }
}

/// Read a JSON manifest: an array of [`PageEntry`] in conversion order.
pub fn read_manifest(path: &Path) -> Result<Vec<PageEntry>, Error> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
    })?;
    let mut entries: Vec<PageEntry> = serde_json::from_str(&text)?;
    let base = path.parent().unwrap_or(Path::new(""));
    for entry in &mut entries {
        if entry.source.is_relative() {
            entry.source = base.join(&entry.source);
        }
    }
    Ok(entries)
}

/// Narrows which pages get converted. Notebook and section match exactly; any one of
/// the page patterns matching as a substring keeps a page. Empty filters match all.
#[derive(Clone, Debug, Default)]
pub struct PageFilter {
    pub notebook: Option<String>,
    pub section: Option<String>,
    pub pages: Vec<String>,
}

impl PageFilter {
    pub fn matches(&self, entry: &PageEntry) -> bool {
        self.notebook.as_ref().is_none_or(|n| *n == entry.notebook)
            && self.section.as_ref().is_none_or(|s| *s == entry.section)
            && (self.pages.is_empty() || self.pages.iter().any(|p| entry.name.contains(p.as_str())))
    }

    pub fn apply(&self, entries: Vec<PageEntry>) -> Vec<PageEntry> {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}
