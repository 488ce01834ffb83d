pub mod common;
pub mod completions;
pub mod config;
pub mod edit;
pub mod login;
pub mod show;
