use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const TIF_VERSION: &str = "TanaIntermediateFile V0.1";

/// Timestamp stamped on nodes whose creation time cannot be known (image-derived nodes).
pub const UNKNOWN_TIMESTAMP: i64 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Node,
    Field,
    Image,
    Codeblock,
    Date,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Any,
    Url,
    Email,
    Number,
    Date,
    Checkbox,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub uid: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub refs: Vec<String>,
    pub created_at: i64,
    pub edited_at: i64,
    #[serde(rename = "type")]
    pub kind: NodeType,
    pub media_url: Option<String>,
    pub code_language: Option<String>,
    #[serde(default)]
    pub supertags: Vec<String>,
    pub todo_state: Option<String>,
}

impl Node {
    pub fn new(uid: u64, name: impl Into<String>, kind: NodeType, created_at: i64, edited_at: i64) -> Self {
        Node {
            uid: uid.to_string(),
            name: name.into(),
            description: None,
            children: Vec::new(),
            refs: Vec::new(),
            created_at,
            edited_at,
            kind,
            media_url: None,
            code_language: None,
            supertags: Vec::new(),
            todo_state: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }
}

/// A table column definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
    pub count: u32,
    pub data_type: Option<DataType>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Attribute {
            name: name.into(),
            values: Vec::new(),
            count,
            data_type: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supertag {
    pub uid: String,
    pub name: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub leaf_nodes: u32,
    pub top_level_nodes: u32,
    pub total_nodes: u32,
    pub calendar_nodes: u32,
    pub fields: u32,
    pub broken_refs: u32,
}

impl Summary {
    pub(crate) fn add_leaf(&mut self) {
        self.leaf_nodes += 1;
        self.total_nodes += 1;
    }

    pub fn merge(&mut self, other: &Summary) {
        self.leaf_nodes += other.leaf_nodes;
        self.top_level_nodes += other.top_level_nodes;
        self.total_nodes += other.total_nodes;
        self.calendar_nodes += other.calendar_nodes;
        self.fields += other.fields;
        self.broken_refs += other.broken_refs;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: String,
    pub summary: Summary,
    pub nodes: Vec<Node>,
    pub attributes: Vec<Attribute>,
    pub supertags: Vec<Supertag>,
}

impl Document {
    /// Total number of nodes across all top-level trees.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(Node::subtree_len).sum()
    }
}

/// One exported note page, as handed over by whatever fetched it.
#[derive(Clone, Debug, Default)]
pub struct PageData {
    pub notebook_name: String,
    pub section_name: String,
    pub page_name: String,
    /// Source-native timestamp, usually ISO-8601 (`2023-12-26T14:21:09.000Z`).
    pub created_at: String,
    pub edited_at: String,
    pub is_sub_page: bool,
    pub html: String,
    /// Embedded images keyed by the name the HTML refers to. Not embedded in the output.
    pub images: HashMap<String, Vec<u8>>,
}
