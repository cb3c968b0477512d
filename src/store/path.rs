//! Hierarchical paths into the response store.
//!
//! Collections and documents alternate: a collection path always has an odd
//! number of segments and a document path an even number. The menu layout
//! lives at `categories/<category>/functions/<function>`.

use std::fmt;

use crate::store_errors::StoreError;

pub const CATEGORIES_COLLECTION: &str = "categories";
pub const FUNCTIONS_COLLECTION: &str = "functions";
pub const RESPONSE_FIELD: &str = "response";

/// Path to a collection of documents
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    segments: Vec<String>,
}

/// Path to a single document inside a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    parent: CollectionPath,
    id: String,
}

impl CollectionPath {
    /// A top-level collection such as `categories`
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    pub fn doc(&self, id: impl Into<String>) -> DocumentPath {
        DocumentPath {
            parent: self.clone(),
            id: id.into(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Name of the last segment, e.g. `functions`
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// The document owning this collection, `None` for a top-level collection
    pub fn owner(&self) -> Option<DocumentPath> {
        if self.segments.len() < 3 {
            return None;
        }
        let owner_id = self.segments[self.segments.len() - 2].clone();
        let parent = CollectionPath {
            segments: self.segments[..self.segments.len() - 2].to_vec(),
        };
        Some(DocumentPath {
            parent,
            id: owner_id,
        })
    }
}

impl DocumentPath {
    pub fn parent(&self) -> &CollectionPath {
        &self.parent
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// A sub-collection nested under this document
    pub fn collection(&self, name: impl Into<String>) -> CollectionPath {
        let mut segments = self.parent.segments.clone();
        segments.push(self.id.clone());
        segments.push(name.into());
        CollectionPath { segments }
    }

    /// Documents that must exist above this one, outermost first
    pub fn ancestors(&self) -> Vec<DocumentPath> {
        let mut chain = Vec::new();
        let mut current = self.parent.owner();
        while let Some(doc) = current {
            current = doc.parent.owner();
            chain.push(doc);
        }
        chain.reverse();
        chain
    }

    /// Rejects empty ids anywhere along the path
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.id.is_empty() || self.parent.segments.iter().any(|s| s.is_empty()) {
            return Err(StoreError::InvalidPath(format!(
                "empty segment in document path {self}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.parent, self.id)
    }
}

pub fn categories_path() -> CollectionPath {
    CollectionPath::root(CATEGORIES_COLLECTION)
}

pub fn functions_path(category: &str) -> CollectionPath {
    categories_path().doc(category).collection(FUNCTIONS_COLLECTION)
}

pub fn function_doc(category: &str, function: &str) -> DocumentPath {
    functions_path(category).doc(function)
}
