use serde::{Deserialize, Serialize};

/// Text of one page as produced by a document loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub number: u32,
    pub text: String,
}

/// A piece of a document that gets embedded and retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub page: Option<u32>,
    pub source: String,
}

impl Chunk {
    #[must_use]
    pub fn source_ref(&self) -> SourceRef {
        SourceRef { source: self.source.clone(), page: self.page }
    }
}

/// Where a retrieved passage came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SourceRef {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}
