//! Recipe image state and preview derivation.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use thiserror::Error;

use super::recipe::StoredImage;

/// Displayable reference used when a recipe has no image.
pub const DEFAULT_RECIPE_IMAGE: &str = "/assets/defaultFoodImage.png";

const KIB_BYTES: u64 = 1024;
const MIB_BYTES: u64 = KIB_BYTES * 1024;
const MAX_PREVIEW_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("Selected image file is empty")]
    Empty,
    #[error("Failed to decode stored image: {0}")]
    Decode(String),
}

/// Image already stored on the server, decoded to raw bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct ExistingImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ExistingImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExistingImage")
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl ExistingImage {
    /// Decode a stored image. Images without data decode to `None`.
    pub fn decode(stored: &StoredImage) -> Result<Option<Self>, ImageError> {
        let Some(data) = stored.data.as_ref().filter(|data| !data.is_empty()) else {
            return Ok(None);
        };
        let bytes = data
            .decode()
            .map_err(|error| ImageError::Decode(error.to_string()))?;
        let content_type = if stored.content_type.trim().is_empty() {
            "application/octet-stream".to_string()
        } else {
            stored.content_type.trim().to_string()
        };
        Ok(Some(Self {
            content_type,
            bytes,
        }))
    }
}

/// A file picked by the user that has not been uploaded yet.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for LocalImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl LocalImage {
    /// Build a local image, inferring the content type from the hint or the
    /// file extension. Only `image/*` content is accepted.
    pub fn new(
        file_name: impl Into<String>,
        content_type_hint: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Self, ImageError> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        let content_type = infer_image_mime_type(content_type_hint, &file_name);
        if !content_type.starts_with("image/") {
            return Err(ImageError::UnsupportedType(content_type));
        }
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

/// Image state of the recipe being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageRef {
    /// No image on the server and none selected.
    #[default]
    None,
    /// Image loaded from the server, unchanged.
    Existing(ExistingImage),
    /// Newly selected local file, uploaded on the next submit.
    PendingUpload(LocalImage),
    /// User removed the image; the next submit asks the server to delete it.
    MarkedForDeletion,
}

/// Anything the UI can render as the recipe image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Preview {
    #[default]
    None,
    Placeholder,
    DataUri {
        mime_type: String,
        data_uri: String,
    },
    Unavailable {
        mime_type: String,
        reason: String,
    },
}

impl Preview {
    /// Derive the preview for the given image state.
    #[must_use]
    pub fn for_image(image: &ImageRef) -> Self {
        match image {
            ImageRef::None => Self::Placeholder,
            ImageRef::Existing(existing) => Self::from_bytes(&existing.content_type, &existing.bytes),
            ImageRef::PendingUpload(local) => Self::from_bytes(&local.content_type, &local.bytes),
            ImageRef::MarkedForDeletion => Self::None,
        }
    }

    fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        if bytes.len() > MAX_PREVIEW_BYTES {
            return Self::Unavailable {
                mime_type: mime_type.to_string(),
                reason: format!(
                    "Image is too large for in-app preview (limit: {}).",
                    format_image_size(MAX_PREVIEW_BYTES)
                ),
            };
        }

        let encoded = BASE64_STANDARD.encode(bytes);
        Self::DataUri {
            mime_type: mime_type.to_string(),
            data_uri: format!("data:{mime_type};base64,{encoded}"),
        }
    }

    /// Image source for rendering, if there is one.
    #[must_use]
    pub fn src(&self) -> Option<&str> {
        match self {
            Self::Placeholder => Some(DEFAULT_RECIPE_IMAGE),
            Self::DataUri { data_uri, .. } => Some(data_uri),
            Self::None | Self::Unavailable { .. } => None,
        }
    }
}

pub(crate) fn infer_image_mime_type(content_type: Option<&str>, file_name: &str) -> String {
    if let Some(content_type) = content_type {
        let trimmed = content_type.trim();
        if !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("application/octet-stream") {
            return trimmed.to_ascii_lowercase();
        }
    }

    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Human-readable byte size with one decimal for KB/MB.
pub fn format_image_size(size_bytes: usize) -> String {
    let bytes = u64::try_from(size_bytes).unwrap_or(u64::MAX);

    if bytes < KIB_BYTES {
        format!("{bytes} B")
    } else if bytes < MIB_BYTES {
        format_scaled_one_decimal(bytes, KIB_BYTES, "KB")
    } else {
        format_scaled_one_decimal(bytes, MIB_BYTES, "MB")
    }
}

fn format_scaled_one_decimal(bytes: u64, unit: u64, suffix: &str) -> String {
    let mut whole = bytes / unit;
    let mut tenth = ((bytes % unit) * 10 + (unit / 2)) / unit;

    if tenth == 10 {
        whole += 1;
        tenth = 0;
    }

    format!("{whole}.{tenth} {suffix}")
}
