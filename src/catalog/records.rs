use crate::catalog::identifier::{extract_identifier, order_key, OrderKey};
use serde::{Deserialize, Serialize};

/// A raw navigational link as it appears on a catalog page
///
/// `href` is kept verbatim and may be relative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub text: String,
    pub href: String,
}

impl LinkRecord {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
        }
    }
}

/// One cataloged statute
///
/// `webpage_link` and `pdf_link` are always absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub webpage_link: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pdf_link: Option<String>,
}

impl DocumentRecord {
    /// Returns true if the record links a downloadable artifact
    pub fn has_artifact(&self) -> bool {
        self.pdf_link.is_some()
    }
}

/// One alphabetical bucket of catalog entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Storage name without extension, e.g. `Teilliste_A`
    pub name: String,

    /// Records in page order
    pub records: Vec<DocumentRecord>,
}

impl Group {
    pub fn new(name: impl Into<String>, records: Vec<DocumentRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Creates a group from a storage file name such as `Teilliste_A.json`
    pub fn from_file_name(file_name: &str, records: Vec<DocumentRecord>) -> Self {
        let name = file_name.strip_suffix(".json").unwrap_or(file_name);
        Self::new(name, records)
    }

    /// File name the group is persisted under
    pub fn file_name(&self) -> String {
        format!("{}.json", self.name)
    }

    /// The group identifier (`A`, `B`, ..., `1`, `2`, ...)
    pub fn identifier(&self) -> Option<String> {
        extract_identifier(&self.file_name())
    }

    /// Human-facing label: the identifier, or the storage name when there is none
    pub fn label(&self) -> String {
        self.identifier().unwrap_or_else(|| self.name.clone())
    }

    pub fn order_key(&self) -> OrderKey {
        order_key(&self.file_name())
    }

    /// Number of records carrying an artifact link
    pub fn artifact_count(&self) -> usize {
        self.records.iter().filter(|r| r.has_artifact()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Sorts groups in catalog order (identifier order, then storage name)
pub fn sort_groups(groups: &mut [Group]) {
    groups.sort_by(|a, b| {
        a.order_key()
            .cmp(&b.order_key())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Flattens groups into the consolidated catalog, preserving record order
pub fn flatten_catalog(groups: &[Group]) -> Vec<DocumentRecord> {
    groups
        .iter()
        .flat_map(|g| g.records.iter().cloned())
        .collect()
}
