//! File → data-URI encoding for complaint and profile images.
//!
//! The store treats image fields as opaque strings; producing the data URI
//! is a front-end concern, so it lives here.

use std::path::Path;

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Read an image file and encode it as a `data:<mime>;base64,...` URI.
///
/// The mime type is derived from the file extension; unknown extensions
/// are rejected rather than guessed.
pub fn data_uri_from_file(path: &Path) -> Result<String> {
    let mime = mime_for(path)?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read image file {}", path.display()))?;
    Ok(format!("data:{mime};base64,{}", BASE64.encode(bytes)))
}

fn mime_for(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        other => bail!("unsupported image extension: {other:?} (png, jpg, gif, webp)"),
    }
}

// ── tests ────────────────────────────────────────────────────────────
