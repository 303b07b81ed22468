//! # momentz-media
//!
//! Client-side image normalization: every picked photo is checked,
//! decoded, shrunk into a bounding box and re-encoded as JPEG before it is
//! embedded in a create-post or profile-update request as a `data:` URI.

pub mod error;
pub mod pipeline;
pub mod preflight;
pub mod selection;

pub use error::MediaError;
pub use pipeline::{fit_within, normalize, normalize_async, EncodedImage, NormalizeOptions};
pub use preflight::{preflight, ImageSource};
pub use selection::UploadSlot;
