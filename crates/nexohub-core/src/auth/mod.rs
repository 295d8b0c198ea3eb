//! Authentication module for the login form and session custody.
//!
//! This module provides:
//! - `LoginController`: form state, validation and the submit flow
//! - `Session`: the current token, backed by a `TokenStore`
//! - `TokenStore`: file, keychain and in-memory token slots
//!
//! Tokens carry no expiry on the client; they live until signed out.

pub mod controller;
pub mod credentials;
pub mod session;
pub mod store;
pub mod validation;

pub use controller::{LoginController, LoginPhase, Route, Submission, SubmitOutcome};
pub use credentials::{can_add_email_char, can_add_password_char, Credentials};
pub use session::{Session, SessionToken};
pub use store::{open_store, FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
pub use validation::{ValidationError, ValidationState};
