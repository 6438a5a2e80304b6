//! Document loading: path checks, format dispatch, page segmentation.

use std::path::Path;

use tokio::fs;
use tracing::info;

use crate::types::RagError;

/// One page of source text, numbered from 1.
///
/// Plain-text exports of paginated documents conventionally separate pages
/// with form-feed characters; a document without them is a single page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentPage {
    pub number: usize,
    pub text: String,
}

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

/// Loads the document at `path` and segments it into pages.
///
/// Fails with [`RagError::NotFound`] when the path does not exist and
/// [`RagError::Load`] when the file is unsupported, unreadable, or contains
/// no text.
pub async fn load_document(path: impl AsRef<Path>) -> Result<Vec<DocumentPage>, RagError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RagError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(RagError::Load(format!(
            "unsupported document format '{extension}' (expected one of {SUPPORTED_EXTENSIONS:?})"
        )));
    }

    let raw = fs::read(path).await?;
    let text = String::from_utf8(raw)
        .map_err(|err| RagError::Load(format!("document is not valid UTF-8: {err}")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text).to_string();

    let pages: Vec<DocumentPage> = text
        .split('\u{0c}')
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .map(|(idx, page)| DocumentPage {
            number: idx + 1,
            text: page.to_string(),
        })
        .collect();

    if pages.is_empty() {
        return Err(RagError::Load("document contains no text".to_string()));
    }

    info!(path = %path.display(), pages = pages.len(), "document loaded");
    Ok(pages)
}
