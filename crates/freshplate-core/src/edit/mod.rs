//! Recipe edit flow.
//!
//! [`EditController`] owns the state of one edit screen: it fetches the recipe
//! on mount, applies field and image changes, submits the update as a
//! multipart request, and schedules navigation back to the recipe list once the
//! update succeeds. Renderers subscribe to [`EditState`] changes through
//! [`EditController::subscribe`] and call the named transition methods in
//! response to user input.

mod navigation;
mod state;


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::api::{ApiError, RecipeApi, UpdatePayload};
use crate::auth::TokenStore;
use crate::models::{
    ExistingImage, FieldError, ImageError, ImageRef, LocalImage, Preview, Recipe, RecipeField,
    RecipeForm, RecipeId, UnknownField,
};

pub use navigation::{ChannelNavigator, Navigator, NAVIGATE_AFTER_SUCCESS, RECIPE_LIST_ROUTE};
pub use state::{
    EditState, LoadFailure, Notification, Phase, Severity, Submission, LOAD_FAILED_MESSAGE,
    SUBMIT_FAILED_MESSAGE, SUBMIT_SUCCEEDED_MESSAGE,
};

#[derive(Debug, Error)]
pub enum EditError {
    #[error("No recipe ID provided")]
    MissingRecipeId,
    #[error("User not authenticated")]
    Unauthenticated,
    #[error("Recipe has not finished loading")]
    NotLoaded,
    #[error("Recipe load was already started")]
    AlreadyLoaded,
    #[error(transparent)]
    UnknownField(#[from] UnknownField),
    #[error(transparent)]
    InvalidField(#[from] FieldError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("A submission is already in progress")]
    SubmitInFlight,
    #[error("Recipe was already updated")]
    AlreadySubmitted,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl EditError {
    /// Text for the submit notification.
    ///
    /// Server-supplied messages are shown verbatim; transport and decode
    /// failures fall back to a generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(error) => error
                .server_message()
                .map_or_else(|| SUBMIT_FAILED_MESSAGE.to_string(), ToString::to_string),
            Self::Unauthenticated
            | Self::InvalidField(_)
            | Self::UnknownField(_)
            | Self::Image(_)
            | Self::MissingRecipeId => self.to_string(),
            Self::NotLoaded | Self::AlreadyLoaded | Self::SubmitInFlight | Self::AlreadySubmitted => {
                SUBMIT_FAILED_MESSAGE.to_string()
            }
        }
    }

    const fn load_failure(&self) -> LoadFailure {
        match self {
            Self::MissingRecipeId => LoadFailure::MissingRecipeId,
            Self::Unauthenticated => LoadFailure::Unauthenticated,
            _ => LoadFailure::Unavailable,
        }
    }
}

/// Controller for a single recipe edit screen.
///
/// Dropping the controller aborts a pending post-success navigation.
///
/// A successful [`Self::submit`] spawns the navigation timer with
/// `tokio::spawn`, so it must be awaited inside a tokio runtime.
pub struct EditController<A, T, N> {
    recipe_id: Option<RecipeId>,
    api: A,
    tokens: T,
    navigator: Arc<N>,
    state: watch::Sender<EditState>,
    load_started: AtomicBool,
    navigation: Mutex<Option<JoinHandle<()>>>,
}

impl<A: RecipeApi, T: TokenStore, N: Navigator> EditController<A, T, N> {
    pub fn new(recipe_id: Option<RecipeId>, api: A, tokens: T, navigator: N) -> Self {
        let (state, _) = watch::channel(EditState::default());
        Self {
            recipe_id,
            api,
            tokens,
            navigator: Arc::new(navigator),
            state,
            load_started: AtomicBool::new(false),
            navigation: Mutex::new(None),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> EditState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<EditState> {
        self.state.subscribe()
    }

    /// Fetch the recipe and populate the form. Only the first call does any work.
    pub async fn load(&self) -> Result<(), EditError> {
        if self.load_started.swap(true, Ordering::SeqCst) {
            return Err(EditError::AlreadyLoaded);
        }

        match self.fetch().await {
            Ok((form, image)) => {
                let preview = Preview::for_image(&image);
                self.state.send_modify(|state| {
                    state.phase = Phase::Loaded;
                    state.form = form;
                    state.image = image;
                    state.preview = preview;
                });
                tracing::debug!(recipe_id = ?self.recipe_id_label(), "Recipe loaded");
                Ok(())
            }
            Err(error) => {
                let failure = error.load_failure();
                tracing::error!(
                    recipe_id = ?self.recipe_id_label(),
                    "Error fetching recipe: {}",
                    error
                );
                self.state
                    .send_modify(|state| state.phase = Phase::LoadError(failure));
                Err(error)
            }
        }
    }

    async fn fetch(&self) -> Result<(RecipeForm, ImageRef), EditError> {
        let recipe_id = self.recipe_id.as_ref().ok_or(EditError::MissingRecipeId)?;
        let credential = self
            .tokens
            .is_authenticated()
            .ok_or(EditError::Unauthenticated)?;
        let recipe = self.api.read(recipe_id, &credential).await?;
        let image = image_ref_for(&recipe)?;
        Ok((recipe.form(), image))
    }

    /// Replace a single form field. Validation is deferred to submit.
    pub fn set_field(&self, field: RecipeField, value: impl Into<String>) -> Result<(), EditError> {
        let value = value.into();
        self.mutate_loaded(|state| state.form.set(field, value))
    }

    /// [`Self::set_field`] keyed by the wire name, as form inputs report it.
    pub fn set_field_by_name(&self, name: &str, value: impl Into<String>) -> Result<(), EditError> {
        let field = name.parse::<RecipeField>()?;
        self.set_field(field, value)
    }

    /// Record a newly picked file as the pending image, replacing any earlier pick.
    pub fn select_image(&self, image: LocalImage) -> Result<(), EditError> {
        let image = ImageRef::PendingUpload(image);
        let preview = Preview::for_image(&image);
        self.mutate_loaded(|state| {
            state.image = image;
            state.preview = preview;
        })
    }

    /// Drop the stored or pending image; the next submit asks the server to delete it.
    pub fn delete_image(&self) -> Result<(), EditError> {
        self.mutate_loaded(|state| {
            state.image = ImageRef::MarkedForDeletion;
            state.preview = Preview::None;
        })
    }

    pub fn dismiss_notification(&self) {
        self.state.send_if_modified(|state| {
            if state.notification.visible {
                state.notification.visible = false;
                true
            } else {
                false
            }
        });
    }

    /// Submit the form. At most one update request is in flight per controller.
    pub async fn submit(&self) -> Result<Recipe, EditError> {
        if let Err(error) = self.begin_submit() {
            tracing::warn!(recipe_id = ?self.recipe_id_label(), "Submit ignored: {}", error);
            return Err(error);
        }
        let _guard = SubmitGuard { state: &self.state };

        match self.send_update().await {
            Ok(recipe) => {
                self.state.send_modify(|state| {
                    state.submission = Submission::Succeeded;
                    state.image = consume_image(std::mem::take(&mut state.image));
                    state.preview = Preview::for_image(&state.image);
                    state.notification = Notification::success(SUBMIT_SUCCEEDED_MESSAGE);
                });
                tracing::info!(recipe_id = ?self.recipe_id_label(), "Recipe updated");
                self.schedule_navigation();
                Ok(recipe)
            }
            Err(error) => {
                tracing::error!(
                    recipe_id = ?self.recipe_id_label(),
                    "Error updating recipe: {}",
                    error
                );
                let message = error.user_message();
                self.state.send_modify(|state| {
                    state.submission = Submission::Idle;
                    state.notification = Notification::error(message);
                });
                Err(error)
            }
        }
    }

    /// Leave the screen now, discarding any scheduled navigation.
    pub fn cancel(&self) {
        self.abort_navigation();
        self.navigator.navigate(RECIPE_LIST_ROUTE);
    }

    fn begin_submit(&self) -> Result<(), EditError> {
        let mut rejection = None;
        self.state.send_if_modified(|state| {
            rejection = match (state.phase, state.submission) {
                (Phase::Loaded, Submission::Idle) => None,
                (Phase::Loaded, Submission::Submitting) => Some(EditError::SubmitInFlight),
                (Phase::Loaded, Submission::Succeeded) => Some(EditError::AlreadySubmitted),
                (Phase::Loading | Phase::LoadError(_), _) => Some(EditError::NotLoaded),
            };
            if rejection.is_none() {
                state.submission = Submission::Submitting;
                true
            } else {
                false
            }
        });
        rejection.map_or(Ok(()), Err)
    }

    async fn send_update(&self) -> Result<Recipe, EditError> {
        let credential = self
            .tokens
            .is_authenticated()
            .ok_or(EditError::Unauthenticated)?;
        let recipe_id = self.recipe_id.as_ref().ok_or(EditError::MissingRecipeId)?;
        let payload = {
            let state = self.state.borrow();
            state.form.validate()?;
            UpdatePayload::new(&state.form, &state.image)
        };
        Ok(self.api.update(recipe_id, &credential, payload).await?)
    }

    fn schedule_navigation(&self) {
        let navigator = Arc::clone(&self.navigator);
        let deadline = Instant::now() + NAVIGATE_AFTER_SUCCESS;
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            navigator.navigate(RECIPE_LIST_ROUTE);
        });
        let previous = self
            .navigation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn mutate_loaded(&self, apply: impl FnOnce(&mut EditState)) -> Result<(), EditError> {
        let mut result = Ok(());
        self.state.send_if_modified(|state| {
            if state.phase == Phase::Loaded {
                apply(state);
                true
            } else {
                result = Err(EditError::NotLoaded);
                false
            }
        });
        result
    }

    fn recipe_id_label(&self) -> Option<&str> {
        self.recipe_id.as_ref().map(RecipeId::as_str)
    }
}

impl<A, T, N> EditController<A, T, N> {
    /// Whether a post-success navigation is still waiting to fire.
    pub fn navigation_pending(&self) -> bool {
        self.navigation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Abort any scheduled navigation. Called automatically on drop.
    pub fn teardown(&self) {
        self.abort_navigation();
    }

    fn abort_navigation(&self) {
        let pending = self
            .navigation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = pending {
            handle.abort();
        }
    }
}

impl<A, T, N> Drop for EditController<A, T, N> {
    fn drop(&mut self) {
        self.abort_navigation();
    }
}

/// Clears the in-progress flag however `submit` exits, including when its
/// future is dropped mid-request.
struct SubmitGuard<'a> {
    state: &'a watch::Sender<EditState>,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|state| {
            if state.submission == Submission::Submitting {
                state.submission = Submission::Idle;
                true
            } else {
                false
            }
        });
    }
}

fn image_ref_for(recipe: &Recipe) -> Result<ImageRef, ImageError> {
    let existing = recipe
        .image
        .as_ref()
        .map(ExistingImage::decode)
        .transpose()?
        .flatten();
    Ok(existing.map_or(ImageRef::None, ImageRef::Existing))
}

/// Image state after the server accepted an update.
fn consume_image(image: ImageRef) -> ImageRef {
    match image {
        ImageRef::PendingUpload(local) => ImageRef::Existing(ExistingImage {
            content_type: local.content_type,
            bytes: local.bytes,
        }),
        ImageRef::MarkedForDeletion => ImageRef::None,
        unchanged @ (ImageRef::None | ImageRef::Existing(_)) => unchanged,
    }
}
