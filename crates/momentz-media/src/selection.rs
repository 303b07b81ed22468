//! Per-view holder for the currently selected upload.

use tracing::{info, warn};

use crate::error::MediaError;
use crate::pipeline::{normalize_async, EncodedImage, NormalizeOptions};
use crate::preflight::ImageSource;

/// One image slot (the create-post form, the profile editor, ...).
///
/// A failed selection never disturbs the image that was already there.
#[derive(Debug, Clone)]
pub struct UploadSlot {
    options: NormalizeOptions,
    current: Option<EncodedImage>,
}

impl UploadSlot {
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            options,
            current: None,
        }
    }

    pub fn for_post() -> Self {
        Self::new(NormalizeOptions::POST)
    }

    pub fn for_profile() -> Self {
        Self::new(NormalizeOptions::PROFILE)
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize `source` and, on success, make it the current selection.
    pub async fn select(&mut self, source: ImageSource) -> Result<&EncodedImage, MediaError> {
        match normalize_async(source, self.options).await {
            Ok(encoded) => {
                info!(
                    width = encoded.width,
                    height = encoded.height,
                    bytes = encoded.bytes.len(),
                    "Image selected"
                );
                Ok(self.current.insert(encoded))
            }
            Err(e) => {
                warn!(error = %e, kept_previous = self.current.is_some(), "Image rejected");
                Err(e)
            }
        }
    }

    pub fn current(&self) -> Option<&EncodedImage> {
        self.current.as_ref()
    }

    /// Empty the slot once the server has accepted the image.
    pub fn clear(&mut self) {
        self.current = None;
    }
}
