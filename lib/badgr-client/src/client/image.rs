use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mime::Mime;

use super::ApiClientError;

/// Reads a PNG or SVG file and returns it as a `data:` URI.
///
/// The result is what Badgr expects in the `image` field of issuer and badge class
/// creation payloads, e.g. `data:image/png;base64,iVBORw0KGgo...`.
///
/// # Errors
///
/// Returns [`ApiClientError::Usage`] for any other file extension and
/// [`ApiClientError::Io`] if the file cannot be read.
pub fn encode_image(path: impl AsRef<Path>) -> Result<String, ApiClientError> {
    let path = path.as_ref();
    let mime = image_mime(path)?;
    let data = std::fs::read(path)?;

    Ok(format!("data:{mime};base64,{}", STANDARD.encode(data)))
}

fn image_mime(path: &Path) -> Result<Mime, ApiClientError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => Ok(mime::IMAGE_PNG),
        Some("svg") => Ok(mime::IMAGE_SVG),
        _ => Err(ApiClientError::usage(format!(
            "unsupported image '{}': expected a .png or .svg file",
            path.display()
        ))),
    }
}
