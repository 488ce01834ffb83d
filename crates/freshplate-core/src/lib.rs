//! freshplate-core - Core library for the FreshPlate client
//!
//! This crate contains the recipe models, the HTTP API and sign-in clients,
//! the in-memory token store, and the recipe edit-flow controller used by the
//! FreshPlate front ends.

pub mod api;
pub mod auth;
pub mod config;
pub mod edit;
pub mod error;
pub mod models;
pub mod util;

#[cfg(test)]
mod test_server;

pub use error::{Error, Result};
pub use models::{Recipe, RecipeField, RecipeId};
