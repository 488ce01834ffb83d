//! reqwest-backed implementation of [`RecipeApi`].

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::{parse_reply, ApiError, ApiResult, PayloadPart, RecipeApi, UpdatePayload};
use crate::auth::Credential;
use crate::models::{Recipe, RecipeId};
use crate::util::normalize_base_url;

/// HTTP client for the `/api/recipes` endpoints.
#[derive(Debug, Clone)]
pub struct HttpRecipeApi {
    base_url: String,
    client: Client,
}

impl HttpRecipeApi {
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> ApiResult<Self> {
        let base_url =
            normalize_base_url(base_url.as_ref()).map_err(ApiError::InvalidConfiguration)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn recipe_url(&self, recipe_id: &RecipeId) -> String {
        format!(
            "{}/api/recipes/{}",
            self.base_url,
            urlencoding::encode(recipe_id.as_str())
        )
    }

    async fn finish(response: reqwest::Response) -> ApiResult<Recipe> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        parse_reply(status, &body)
    }
}

fn multipart_form(payload: &UpdatePayload) -> ApiResult<Form> {
    let mut form = Form::new();
    for part in payload.parts() {
        form = match part {
            PayloadPart::Text { name, value } => form.text(name, value),
            PayloadPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&content_type)?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

impl RecipeApi for HttpRecipeApi {
    async fn read(&self, recipe_id: &RecipeId, credential: &Credential) -> ApiResult<Recipe> {
        let response = self
            .client
            .get(self.recipe_url(recipe_id))
            .bearer_auth(credential.token())
            .header("Accept", "application/json")
            .send()
            .await?;
        Self::finish(response).await
    }

    async fn update(
        &self,
        recipe_id: &RecipeId,
        credential: &Credential,
        payload: UpdatePayload,
    ) -> ApiResult<Recipe> {
        let form = multipart_form(&payload)?;
        tracing::debug!(
            recipe_id = %recipe_id,
            fields = payload.fields.len(),
            image = ?payload.image,
            "Sending recipe update"
        );
        let response = self
            .client
            .put(self.recipe_url(recipe_id))
            .bearer_auth(credential.token())
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await?;
        Self::finish(response).await
    }
}
