//! Core library for the NexoHub console.
//!
//! - `auth`: credential validation, the login form controller and token custody
//! - `api`: HTTP client for the NexoHub authentication endpoints
//! - `config`: persisted settings and environment overrides

pub mod api;
pub mod auth;
pub mod config;

pub use api::{AuthClient, LoginError, LoginTransport};
pub use auth::{LoginController, Session, SessionToken, SubmitOutcome};
pub use config::Config;
