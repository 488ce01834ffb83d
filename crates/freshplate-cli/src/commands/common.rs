use freshplate_core::api::HttpRecipeApi;
use freshplate_core::auth::{Credential, MemoryTokenStore};
use freshplate_core::config::ClientConfig;
use freshplate_core::edit::{ChannelNavigator, EditController, EditState, Notification, Severity};
use freshplate_core::models::{format_image_size, ImageRef, Preview};
use freshplate_core::RecipeId;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::CliError;

pub type HttpEditController = EditController<HttpRecipeApi, MemoryTokenStore, ChannelNavigator>;

/// Settings shared by every command that talks to the API.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: ClientConfig,
    pub credential: Option<Credential>,
}

impl AppContext {
    pub fn token_store(&self) -> MemoryTokenStore {
        self.credential
            .clone()
            .map_or_else(MemoryTokenStore::new, MemoryTokenStore::with_credential)
    }

    pub fn recipe_api(&self) -> Result<HttpRecipeApi, CliError> {
        let base_url = self.config.api_base_url()?;
        Ok(HttpRecipeApi::new(base_url, self.config.request_timeout())?)
    }

    /// Controller for one recipe, plus the routes it emits.
    pub fn edit_controller(
        &self,
        recipe_id: &str,
    ) -> Result<(HttpEditController, UnboundedReceiver<String>), CliError> {
        let (navigator, routes) = ChannelNavigator::channel();
        let controller = EditController::new(
            RecipeId::parse(Some(recipe_id)),
            self.recipe_api()?,
            self.token_store(),
            navigator,
        );
        Ok((controller, routes))
    }
}

/// Run the initial fetch, surfacing only the user-facing load message.
pub async fn load_recipe(controller: &HttpEditController) -> Result<(), CliError> {
    if controller.load().await.is_ok() {
        return Ok(());
    }
    let state = controller.state();
    Err(CliError::Load(
        state
            .load_error()
            .unwrap_or(freshplate_core::edit::LOAD_FAILED_MESSAGE)
            .to_string(),
    ))
}

#[derive(Debug, Serialize)]
pub struct RecipeView {
    pub id: String,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub preptime: String,
    pub cooktime: String,
    pub servings: String,
    pub image: String,
}

pub fn recipe_view(recipe_id: &str, state: &EditState) -> RecipeView {
    let form = &state.form;
    RecipeView {
        id: recipe_id.to_string(),
        title: form.title.clone(),
        ingredients: form.ingredients.clone(),
        instructions: form.instructions.clone(),
        preptime: form.preptime.clone(),
        cooktime: form.cooktime.clone(),
        servings: form.servings.clone(),
        image: image_label(&state.image, &state.preview),
    }
}

pub fn format_recipe_lines(state: &EditState) -> Vec<String> {
    let mut lines = state
        .form
        .fields()
        .map(|(field, value)| {
            let label = format!("{}:", field.label());
            format!("{label:<13} {value}")
        })
        .collect::<Vec<_>>();
    lines.push(format!(
        "{:<13} {}",
        "Image:",
        image_label(&state.image, &state.preview)
    ));
    lines
}

pub fn image_label(image: &ImageRef, preview: &Preview) -> String {
    match (image, preview) {
        (_, Preview::Placeholder) => "default placeholder".to_string(),
        (ImageRef::Existing(existing), Preview::DataUri { mime_type, .. }) => {
            format!("{mime_type}, {}", format_image_size(existing.bytes.len()))
        }
        (ImageRef::PendingUpload(local), Preview::DataUri { mime_type, .. }) => format!(
            "{} ({mime_type}, {}) pending upload",
            local.file_name,
            format_image_size(local.bytes.len())
        ),
        (_, Preview::Unavailable { mime_type, reason }) => format!("{mime_type}: {reason}"),
        (ImageRef::MarkedForDeletion, _) => "removed".to_string(),
        _ => "none".to_string(),
    }
}

pub fn notification_line(notification: &Notification) -> Option<String> {
    if !notification.visible || notification.message.is_empty() {
        return None;
    }
    let label = match notification.severity {
        Severity::Info => "info",
        Severity::Success => "success",
        Severity::Error => "error",
    };
    Some(format!("[{label}] {}", notification.message))
}
