//! Recipe API contract, update payloads, and reply parsing.

mod http;

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::Credential;
use crate::models::{ImageRef, LocalImage, Recipe, RecipeField, RecipeForm, RecipeId};
use crate::util::compact_text;

pub use http::HttpRecipeApi;

/// Multipart field carrying a newly selected image.
pub const IMAGE_PART: &str = "image";
/// Multipart field asking the server to drop the stored image.
pub const DELETE_IMAGE_PART: &str = "deleteImage";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API configuration: {0}")]
    InvalidConfiguration(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Error string reported by the server in an `{"error": ...}` body.
    #[error("{0}")]
    Server(String),
    #[error("Request failed with HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message the server supplied for the user, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server(message) if !message.trim().is_empty() => Some(message.trim()),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Recipe endpoints consumed by the edit flow.
pub trait RecipeApi: Send + Sync {
    fn read(
        &self,
        recipe_id: &RecipeId,
        credential: &Credential,
    ) -> impl Future<Output = ApiResult<Recipe>> + Send;

    fn update(
        &self,
        recipe_id: &RecipeId,
        credential: &Credential,
        payload: UpdatePayload,
    ) -> impl Future<Output = ApiResult<Recipe>> + Send;
}

impl<T: RecipeApi> RecipeApi for Arc<T> {
    fn read(
        &self,
        recipe_id: &RecipeId,
        credential: &Credential,
    ) -> impl Future<Output = ApiResult<Recipe>> + Send {
        (**self).read(recipe_id, credential)
    }

    fn update(
        &self,
        recipe_id: &RecipeId,
        credential: &Credential,
        payload: UpdatePayload,
    ) -> impl Future<Output = ApiResult<Recipe>> + Send {
        (**self).update(recipe_id, credential, payload)
    }
}

/// What to do with the recipe image on update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageChange {
    #[default]
    Unchanged,
    Upload(LocalImage),
    Delete,
}

impl From<&ImageRef> for ImageChange {
    fn from(image: &ImageRef) -> Self {
        match image {
            ImageRef::PendingUpload(local) => Self::Upload(local.clone()),
            ImageRef::MarkedForDeletion => Self::Delete,
            ImageRef::None | ImageRef::Existing(_) => Self::Unchanged,
        }
    }
}

/// Body of an update request before it is encoded as multipart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePayload {
    pub fields: Vec<(RecipeField, String)>,
    pub image: ImageChange,
}

/// One multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadPart {
    Text {
        name: &'static str,
        value: String,
    },
    File {
        name: &'static str,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl PayloadPart {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => *name,
        }
    }
}

impl UpdatePayload {
    /// Every scalar field as text, plus the image change.
    #[must_use]
    pub fn new(form: &RecipeForm, image: &ImageRef) -> Self {
        Self {
            fields: form
                .fields()
                .map(|(field, value)| (field, value.to_string()))
                .collect(),
            image: ImageChange::from(image),
        }
    }

    /// Parts in the order they are sent.
    #[must_use]
    pub fn parts(&self) -> Vec<PayloadPart> {
        let mut parts: Vec<PayloadPart> = self
            .fields
            .iter()
            .map(|(field, value)| PayloadPart::Text {
                name: field.as_str(),
                value: value.clone(),
            })
            .collect();

        match &self.image {
            ImageChange::Unchanged => {}
            ImageChange::Upload(local) => parts.push(PayloadPart::File {
                name: IMAGE_PART,
                file_name: local.file_name.clone(),
                content_type: local.content_type.clone(),
                bytes: local.bytes.clone(),
            }),
            ImageChange::Delete => parts.push(PayloadPart::Text {
                name: DELETE_IMAGE_PART,
                value: "true".to_string(),
            }),
        }

        parts
    }
}

#[derive(Deserialize)]
struct ErrorReply {
    error: String,
}

/// Interpret an API response body.
///
/// An object with an `error` string is a server-reported failure regardless
/// of status. Other non-2xx replies become [`ApiError::Status`].
pub fn parse_reply<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<T> {
    if let Ok(reply) = serde_json::from_str::<ErrorReply>(body) {
        return Err(ApiError::Server(reply.error));
    }

    if !(200..300).contains(&status) {
        return Err(ApiError::Status {
            status,
            body: compact_text(body),
        });
    }

    serde_json::from_str::<T>(body).map_err(|error| ApiError::Decode(error.to_string()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn form() -> RecipeForm {
        RecipeForm {
            title: "Soup".to_string(),
            ingredients: "Water".to_string(),
            instructions: "Boil".to_string(),
            preptime: "5".to_string(),
            cooktime: "10".to_string(),
            servings: "2".to_string(),
        }
    }

    fn part_names(payload: &UpdatePayload) -> Vec<&'static str> {
        payload.parts().iter().map(PayloadPart::name).collect()
    }

    #[test]
    fn unchanged_image_sends_only_scalar_fields() {
        let payload = UpdatePayload::new(&form(), &ImageRef::None);
        assert_eq!(
            part_names(&payload),
            vec!["title", "ingredients", "instructions", "preptime", "cooktime", "servings"]
        );
    }

    #[test]
    fn existing_image_is_not_resent() {
        let image = ImageRef::Existing(crate::models::ExistingImage {
            content_type: "image/png".to_string(),
            bytes: vec![1],
        });
        let payload = UpdatePayload::new(&form(), &image);
        assert_eq!(payload.image, ImageChange::Unchanged);
        assert!(!part_names(&payload).contains(&IMAGE_PART));
    }

    #[test]
    fn pending_upload_adds_file_part() {
        let local = LocalImage::new("soup.png", None, vec![9, 9]).unwrap();
        let payload = UpdatePayload::new(&form(), &ImageRef::PendingUpload(local));
        let parts = payload.parts();
        assert_eq!(
            parts.last(),
            Some(&PayloadPart::File {
                name: IMAGE_PART,
                file_name: "soup.png".to_string(),
                content_type: "image/png".to_string(),
                bytes: vec![9, 9],
            })
        );
        assert!(!part_names(&payload).contains(&DELETE_IMAGE_PART));
    }

    #[test]
    fn deleted_image_adds_delete_flag() {
        let payload = UpdatePayload::new(&form(), &ImageRef::MarkedForDeletion);
        assert_eq!(
            payload.parts().last(),
            Some(&PayloadPart::Text {
                name: DELETE_IMAGE_PART,
                value: "true".to_string(),
            })
        );
        assert!(!part_names(&payload).contains(&IMAGE_PART));
    }

    #[test]
    fn parse_reply_reads_recipe() {
        let recipe: Recipe = parse_reply(200, r#"{"title":"Soup","servings":2}"#).unwrap();
        assert_eq!(recipe.title, "Soup");
        assert_eq!(recipe.servings, "2");
    }

    #[test]
    fn parse_reply_prefers_error_field_on_success_status() {
        let error = parse_reply::<Recipe>(200, r#"{"error":"Title required"}"#).unwrap_err();
        assert_eq!(error.server_message(), Some("Title required"));
    }

    #[test]
    fn parse_reply_maps_bare_failure_status() {
        let error = parse_reply::<Recipe>(404, "Not Found").unwrap_err();
        assert!(matches!(error, ApiError::Status { status: 404, .. }));
        assert_eq!(error.server_message(), None);
    }

    #[test]
    fn parse_reply_rejects_malformed_body() {
        let error = parse_reply::<Recipe>(200, "<html>").unwrap_err();
        assert!(matches!(error, ApiError::Decode(_)));
    }

    #[test]
    fn blank_server_message_is_not_user_facing() {
        assert_eq!(ApiError::Server("  ".to_string()).server_message(), None);
    }
}
