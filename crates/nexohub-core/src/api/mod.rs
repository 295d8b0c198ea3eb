//! REST client module for the NexoHub API.
//!
//! This module provides the `AuthClient` for the authentication endpoint and
//! the `LoginTransport` seam the login form talks through.
//!
//! Login is a JSON `POST` that answers with a bearer access token.

pub mod client;
pub mod error;

pub use client::{AuthClient, HealthStatus, LoginRequest, LoginTransport};
pub use error::LoginError;
