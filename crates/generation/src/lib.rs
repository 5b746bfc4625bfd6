//! REST client for the external generation service.
//!
//! [`GenerationApi`] implements every phase collaborator trait of
//! `mangaka-pipeline` by calling the service's HTTP endpoints.

pub mod api;

pub use api::{GenerationApi, GenerationApiError};
