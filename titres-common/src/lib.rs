//! # Titres Common Library
//!
//! Shared code for the titres ingestion tooling:
//! - Event types (TitreEvent enum) and the EventBus
//! - REST API request/response types for the titles backend
//! - Configuration loading
//! - Common error types

pub mod api;
pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
