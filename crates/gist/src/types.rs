//! Gist resource types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A gist and its files, keyed by filename.
///
/// Only the fields needed for an edit round trip are modelled; the id is
/// read but never sent back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gist {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub files: BTreeMap<String, GistFile>,
}

/// One file inside a gist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GistFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Gist {
    /// Sets the content of `filename`, adding the file if it does not exist.
    /// Other files are left untouched.
    pub fn set_file_content(&mut self, filename: &str, content: impl Into<String>) {
        let file = self.files.entry(filename.to_string()).or_default();
        file.filename = Some(filename.to_string());
        file.content = Some(content.into());
    }

    /// Returns the content of `filename`, if present.
    pub fn file_content(&self, filename: &str) -> Option<&str> {
        self.files.get(filename).and_then(|f| f.content.as_deref())
    }
}
