//! # Citation Aggregation
//!
//! Retrievers hand back one fragment per matching page chunk, so the same
//! paper usually shows up several times. [`aggregate`] folds those fragments
//! into one [`Citation`] per document title:
//!
//! - titles keep the order in which they were first seen
//! - page numbers are sorted ascending with duplicates removed
//! - the URL is the first one seen for the title

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{ClientError, ClientResult};

/// Metadata key holding the document URL on retrieved fragments
pub const URL_METADATA_KEY: &str = "file_path";

/// One retrieved chunk of source material.
///
/// Fields are optional because retrievers do not guarantee them;
/// [`aggregate`] rejects fragments that lack any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFragment {
    pub title: Option<String>,
    pub page: Option<u32>,
    pub url: Option<String>,
}

impl SourceFragment {
    pub fn new(title: impl Into<String>, page: u32, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            page: Some(page),
            url: Some(url.into()),
        }
    }

    /// Build a fragment from a retriever's metadata map.
    ///
    /// Reads `title`, `page` and `file_path`. A value of the wrong type (a
    /// negative or fractional page, a numeric title) counts as missing.
    pub fn from_metadata(metadata: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            title: metadata
                .get("title")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            page: metadata
                .get("page")
                .and_then(|v| v.as_u64())
                .and_then(|p| u32::try_from(p).ok()),
            url: metadata
                .get(URL_METADATA_KEY)
                .and_then(|v| v.as_str())
                .map(str::to_string),
        }
    }
}

/// All cited pages of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub page_list: Vec<u32>,
    pub url: String,
}

impl Citation {
    /// Text block shown next to an answer for this source
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Page numbers joined with ", "
    pub fn page_numbers(&self) -> String {
        self.page_list
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page Number(s): {}\nURL: {}", self.page_numbers(), self.url)
    }
}

/// Group fragments into one citation per distinct title
pub fn aggregate(fragments: &[SourceFragment]) -> ClientResult<Vec<Citation>> {
    let mut citations: Vec<Citation> = Vec::new();
    let mut index_by_title: HashMap<String, usize> = HashMap::new();

    for (index, fragment) in fragments.iter().enumerate() {
        let title = fragment
            .title
            .as_ref()
            .ok_or(ClientError::MalformedFragment {
                index,
                field: "title",
            })?;
        let page = fragment.page.ok_or(ClientError::MalformedFragment {
            index,
            field: "page",
        })?;
        let url = fragment.url.as_ref().ok_or(ClientError::MalformedFragment {
            index,
            field: "url",
        })?;

        match index_by_title.get(title) {
            Some(&slot) => citations[slot].page_list.push(page),
            None => {
                index_by_title.insert(title.clone(), citations.len());
                citations.push(Citation {
                    title: title.clone(),
                    page_list: vec![page],
                    url: url.clone(),
                });
            }
        }
    }

    for citation in &mut citations {
        citation.page_list.sort_unstable();
        citation.page_list.dedup();
    }

    Ok(citations)
}

/// A generated answer together with the sources it was grounded on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcedAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
}

impl SourcedAnswer {
    pub fn from_sources(
        answer: impl Into<String>,
        fragments: &[SourceFragment],
    ) -> ClientResult<Self> {
        Ok(Self {
            answer: answer.into(),
            citations: aggregate(fragments)?,
        })
    }
}
