//! Observable state of a recipe edit screen.

use crate::models::{ImageRef, Preview, RecipeForm};

/// Shown when the recipe cannot be fetched; the raw failure is only logged.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load recipe. Please try again later.";
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to update recipe";
pub const SUBMIT_SUCCEEDED_MESSAGE: &str = "Recipe updated successfully";

/// Why the screen could not show the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailure {
    MissingRecipeId,
    Unauthenticated,
    Unavailable,
}

impl LoadFailure {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingRecipeId => "No recipe ID provided",
            Self::Unauthenticated => "Please sign in to edit this recipe.",
            Self::Unavailable => LOAD_FAILED_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Loading,
    Loaded,
    /// Terminal; the screen renders the failure instead of the form.
    LoadError(LoadFailure),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Submission {
    #[default]
    Idle,
    Submitting,
    /// Update accepted; navigation away is scheduled.
    Succeeded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    pub visible: bool,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            visible: true,
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            visible: true,
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// Everything a renderer needs to draw the edit screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditState {
    pub phase: Phase,
    pub form: RecipeForm,
    pub image: ImageRef,
    pub preview: Preview,
    pub submission: Submission,
    pub notification: Notification,
}

impl EditState {
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submission == Submission::Submitting
    }

    /// Whether the submit affordance should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Loaded && self.submission == Submission::Idle
    }

    /// Full-screen error text, if loading failed.
    #[must_use]
    pub fn load_error(&self) -> Option<&'static str> {
        match self.phase {
            Phase::LoadError(failure) => Some(failure.message()),
            Phase::Loading | Phase::Loaded => None,
        }
    }
}
