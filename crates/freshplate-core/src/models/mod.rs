//! Data models for FreshPlate

mod image;
mod recipe;

pub use image::{
    format_image_size, ExistingImage, ImageError, ImageRef, LocalImage, Preview,
    DEFAULT_RECIPE_IMAGE,
};
pub use recipe::{
    FieldError, ImageData, Recipe, RecipeField, RecipeForm, RecipeId, StoredImage, UnknownField,
};
