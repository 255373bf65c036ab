//! forge
//!
//! Abstraction for remote forges.
//!
//! # Architecture
//!
//! The `Forge` trait is the transport contract the gateway talks to. It does
//! one request per call and returns normalized pull request types; HTTP,
//! authentication headers, and payload shapes stay behind it.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait, request types, and the normalized model
//! - [`github`]: GitHub implementation over the REST API
//! - [`mock`]: In-memory implementation for deterministic testing
//! - `factory`: Forge selection and creation

mod factory;
pub mod github;
pub mod mock;
mod traits;

pub use factory::{create_forge, detect_provider, valid_forge_names, ForgeProvider};
pub use traits::*;
