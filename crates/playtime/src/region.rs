//! Marker-bounded region replacement for Markdown documents.
//!
//! A region is delimited by two literal marker comments. Patching rewrites
//! only the bytes strictly between them, so running the same patch twice
//! yields the same document.
//!
//! The read-modify-write in [`patch_file`] takes no lock. Callers must make
//! sure a single process writes a given document at a time.

use std::path::Path;

use tracing::debug;

/// Attribution line appended after the fenced block.
pub const DEFAULT_ATTRIBUTION: &str =
    "<!-- Powered by https://github.com/YouEclipse/steam-box . -->";

/// Errors produced while patching a document region.
#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("marker not found: {0}")]
    MarkerNotFound(String),

    #[error("marker appears more than once: {0}")]
    DuplicateMarker(String),

    #[error("end marker {end} precedes start marker {start}")]
    MarkersOutOfOrder { start: String, end: String },

    #[error("region content contains marker: {0}")]
    MarkerInContent(String),
}

/// Start/end marker pair delimiting a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub start: String,
    pub end: String,
}

impl Markers {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// `<!-- {name} start -->` / `<!-- {name} end -->`.
    pub fn named(name: &str) -> Self {
        Self::new(format!("<!-- {name} start -->"), format!("<!-- {name} end -->"))
    }

    /// The default `steam-box` marker pair.
    pub fn steam_box() -> Self {
        Self::named("steam-box")
    }
}

/// Content spliced between the markers.
#[derive(Debug, Clone)]
pub struct RegionBlock {
    pub title: String,
    pub lines: Vec<String>,
    pub attribution: String,
}

impl RegionBlock {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
            attribution: DEFAULT_ATTRIBUTION.to_string(),
        }
    }

    /// Renders the block as it appears between the markers.
    pub fn render(&self) -> String {
        format!(
            "\n{}\n```text\n{}\n```\n{}\n",
            self.title,
            self.lines.join("\n"),
            self.attribution
        )
    }
}

/// Heading linking to the gist that mirrors the same lines.
pub fn markdown_title(gist_id: &str, title: &str) -> String {
    format!(r#"#### <a href="https://gist.github.com/{gist_id}" target="_blank">{title}</a>"#)
}

/// Returns the offset of the only occurrence of `needle` in `haystack`.
fn find_unique(haystack: &[u8], needle: &str) -> Result<usize, RegionError> {
    let needle_bytes = needle.as_bytes();
    if needle_bytes.is_empty() {
        return Err(RegionError::MarkerNotFound(needle.to_string()));
    }

    let mut hits = haystack
        .windows(needle_bytes.len())
        .enumerate()
        .filter(|(_, window)| *window == needle_bytes)
        .map(|(offset, _)| offset);

    let first = hits
        .next()
        .ok_or_else(|| RegionError::MarkerNotFound(needle.to_string()))?;
    if hits.next().is_some() {
        return Err(RegionError::DuplicateMarker(needle.to_string()));
    }
    Ok(first)
}

/// Replaces the region between `markers` in `document` with `block`.
///
/// Everything up to and including the start marker, and everything from
/// the end marker onward, is copied unchanged.
pub fn patch_region(
    document: &[u8],
    markers: &Markers,
    block: &RegionBlock,
) -> Result<Vec<u8>, RegionError> {
    let start_at = find_unique(document, &markers.start)?;
    let end_at = find_unique(document, &markers.end)?;

    let content_from = start_at + markers.start.len();
    if end_at < content_from {
        return Err(RegionError::MarkersOutOfOrder {
            start: markers.start.clone(),
            end: markers.end.clone(),
        });
    }

    let rendered = block.render();
    for marker in [&markers.start, &markers.end] {
        if rendered.contains(marker.as_str()) {
            return Err(RegionError::MarkerInContent(marker.clone()));
        }
    }

    let mut patched = Vec::with_capacity(document.len() + rendered.len());
    patched.extend_from_slice(&document[..content_from]);
    patched.extend_from_slice(rendered.as_bytes());
    patched.extend_from_slice(&document[end_at..]);
    Ok(patched)
}

/// Patches the region of the document at `path` in place.
///
/// The file must already exist; it is never created. A failed write is
/// returned to the caller, not retried.
pub async fn patch_file(
    path: &Path,
    markers: &Markers,
    block: &RegionBlock,
) -> Result<(), RegionError> {
    let document = tokio::fs::read(path).await?;
    let patched = patch_region(&document, markers, block)?;

    if patched == document {
        debug!(path = %path.display(), "region already up to date");
        return Ok(());
    }

    tokio::fs::write(path, &patched).await?;
    debug!(path = %path.display(), bytes = patched.len(), "region patched");
    Ok(())
}
