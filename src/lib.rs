//! Forgegate - pull request gateway over a hosted Git forge
//!
//! Forgegate turns a small set of pull request operations (create, fetch,
//! merge, reopen, update) into calls against a forge's REST API for one
//! configured repository.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, builds a gateway)
//! - [`gateway`] - Pull request façade: create retries, loading flag, monitors
//! - [`forge`] - Abstraction for remote forges (GitHub, plus an in-memory mock)
//! - [`core`] - Repository coordinates and configuration
//!
//! # Behavior
//!
//! 1. Only `create` is retried; every other operation is a single call
//! 2. Forge errors reach the caller unchanged
//! 3. The loading flag is `true` exactly while a create is in flight
//! 4. Analytics never affects an operation's outcome

pub mod cli;
pub mod core;
pub mod forge;
pub mod gateway;
