//! Core: configuration, shared state and the HTTP server
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - services shared by every handler
//! - [`Server`] - binds and serves the router
//! - [`ServerError`] - startup errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
