//! Cheap checks run on a picked file before any decode work.

use std::path::Path;

use image::ImageFormat;
use tracing::debug;

use crate::error::MediaError;

/// Raw bytes of a user-picked or dropped file plus whatever the picker
/// told us about it.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub bytes: Vec<u8>,
    /// MIME type reported by the file picker, if any.
    pub declared_mime: Option<String>,
    pub file_name: Option<String>,
}

impl ImageSource {
    pub fn from_bytes(bytes: Vec<u8>, declared_mime: Option<&str>) -> Self {
        Self {
            bytes,
            declared_mime: declared_mime.map(str::to_string),
            file_name: None,
        }
    }

    /// Read a file from disk. The MIME type is inferred later from the
    /// content or the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, MediaError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);

        debug!(path = %path.display(), size = bytes.len(), "Read image source");

        Ok(Self {
            bytes,
            declared_mime: None,
            file_name,
        })
    }

    /// Declared type, else sniffed from the magic bytes, else guessed from
    /// the file extension.
    pub fn mime(&self) -> String {
        if let Some(ref declared) = self.declared_mime {
            if !declared.trim().is_empty() {
                return declared.trim().to_ascii_lowercase();
            }
        }

        if let Ok(format) = image::guess_format(&self.bytes) {
            return format.to_mime_type().to_string();
        }

        self.file_name
            .as_deref()
            .and_then(|name| ImageFormat::from_path(name).ok())
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Reject non-image types and oversized files.
pub fn preflight(source: &ImageSource, max_bytes: usize) -> Result<(), MediaError> {
    let mime = source.mime();
    if !mime.starts_with("image/") {
        return Err(MediaError::UnsupportedType(mime));
    }

    if source.len() > max_bytes {
        return Err(MediaError::TooLarge {
            size: source.len(),
            max: max_bytes,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use momentz_shared::constants::MAX_UPLOAD_BYTES;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_declared_type_wins() {
        let source = ImageSource::from_bytes(PNG_MAGIC.to_vec(), Some("text/plain"));
        assert!(matches!(
            preflight(&source, MAX_UPLOAD_BYTES),
            Err(MediaError::UnsupportedType(m)) if m == "text/plain"
        ));
    }

    #[test]
    fn test_sniffed_type() {
        let source = ImageSource::from_bytes(PNG_MAGIC.to_vec(), None);
        assert_eq!(source.mime(), "image/png");
        assert!(preflight(&source, MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn test_extension_fallback() {
        let source = ImageSource {
            bytes: b"garbage".to_vec(),
            declared_mime: None,
            file_name: Some("holiday.JPG".into()),
        };
        assert_eq!(source.mime(), "image/jpeg");

        let source = ImageSource {
            bytes: b"garbage".to_vec(),
            declared_mime: None,
            file_name: Some("notes.txt".into()),
        };
        assert_eq!(source.mime(), "application/octet-stream");
    }

    #[test]
    fn test_too_large_rejected_before_decode() {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.resize(MAX_UPLOAD_BYTES + 1, 0);
        let source = ImageSource::from_bytes(bytes, Some("image/png"));
        assert!(matches!(
            preflight(&source, MAX_UPLOAD_BYTES),
            Err(MediaError::TooLarge { max, .. }) if max == MAX_UPLOAD_BYTES
        ));
    }
}
