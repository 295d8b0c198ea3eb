//! The login form controller.
//!
//! Holds what the user typed, derives validation on demand and runs the
//! submit flow:
//!
//! ```text
//! Idle -> Validating -> Submitting -> Succeeded | Failed
//! ```
//!
//! Submission is split in two halves so a UI loop can keep drawing while the
//! request runs elsewhere: [`LoginController::begin_submit`] validates and
//! marks the form in flight, [`LoginController::complete_submit`] applies the
//! result. [`LoginController::submit`] does both inline.
//!
//! Every accepted submission gets a generation number. A completion whose
//! generation is not the one in flight is dropped, so a late reply can never
//! overwrite newer state.

use tracing::{debug, info};

use crate::api::{LoginError, LoginRequest, LoginTransport};

use super::credentials::{can_add_email_char, can_add_password_char};
use super::{Credentials, Session, SessionToken, ValidationState};

const SUBMIT_LABEL: &str = "Sign in";
const SUBMITTING_LABEL: &str = "Signing in...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPhase {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Screens the console can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
}

/// An accepted submission, ready to be sent.
#[derive(Debug)]
pub struct Submission {
    pub generation: u64,
    pub request: LoginRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Token stored; move to the route.
    Navigate(Route),
    /// The message is now shown on the form.
    Failed(String),
    /// A request is already in flight; nothing was sent.
    Busy,
    /// Reply to a submission that is no longer current; ignored.
    Stale,
}

#[derive(Debug)]
pub struct LoginController {
    credentials: Credentials,
    phase: LoginPhase,
    in_flight: Option<u64>,
    generation: u64,
    error: Option<String>,
}

impl Default for LoginController {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginController {
    pub fn new() -> Self {
        Self::with_credentials(Credentials::default())
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials,
            phase: LoginPhase::Idle,
            in_flight: None,
            generation: 0,
            error: None,
        }
    }

    // =========================================================================
    // Form state
    // =========================================================================

    pub fn email(&self) -> &str {
        &self.credentials.email
    }

    pub fn password(&self) -> &str {
        &self.credentials.password
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.credentials.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.credentials.password = password.into();
    }

    /// Append a typed character; returns false if it was refused
    pub fn push_email_char(&mut self, c: char) -> bool {
        let accepted = can_add_email_char(self.credentials.email.chars().count(), c);
        if accepted {
            self.credentials.email.push(c);
        }
        accepted
    }

    /// Append a typed character; returns false if it was refused
    pub fn push_password_char(&mut self, c: char) -> bool {
        let accepted = can_add_password_char(self.credentials.password.chars().count(), c);
        if accepted {
            self.credentials.password.push(c);
        }
        accepted
    }

    pub fn pop_email_char(&mut self) {
        self.credentials.email.pop();
    }

    pub fn pop_password_char(&mut self) {
        self.credentials.password.pop();
    }

    pub fn validation(&self) -> ValidationState {
        self.credentials.validation()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Both checks pass and nothing is in flight.
    pub fn can_submit(&self) -> bool {
        self.validation().is_valid() && !self.is_in_flight()
    }

    pub fn phase(&self) -> LoginPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_in_flight() {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    // =========================================================================
    // Submit flow
    // =========================================================================

    /// Validate and mark the form in flight.
    ///
    /// Refused with [`SubmitOutcome::Busy`] while a request is pending, and
    /// with [`SubmitOutcome::Failed`] when a check fails. No request may be
    /// sent unless this returns `Ok`.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitOutcome> {
        if self.is_in_flight() {
            debug!("Submit ignored, request already in flight");
            return Err(SubmitOutcome::Busy);
        }

        self.error = None;
        self.phase = LoginPhase::Validating;
        if let Err(e) = self.validation().check() {
            return Err(self.fail(e.into()));
        }

        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.phase = LoginPhase::Submitting;

        Ok(Submission {
            generation: self.generation,
            request: self.credentials.to_request(),
        })
    }

    /// Apply the result of the request started by `begin_submit`.
    ///
    /// On success the token is written through `session` before navigating.
    /// The in-flight mark is released on every path.
    pub fn complete_submit(
        &mut self,
        generation: u64,
        result: Result<SessionToken, LoginError>,
        session: &mut Session,
    ) -> SubmitOutcome {
        if self.in_flight != Some(generation) {
            debug!(generation, current = ?self.in_flight, "Dropping stale login result");
            return SubmitOutcome::Stale;
        }
        self.in_flight = None;

        let stored = result.and_then(|token| {
            session
                .establish(token)
                .map_err(|e| LoginError::Storage(format!("{:#}", e)))
        });

        match stored {
            Ok(()) => {
                info!("Signed in");
                self.phase = LoginPhase::Succeeded;
                self.error = None;
                self.credentials.password.clear();
                SubmitOutcome::Navigate(Route::Home)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Run a whole submission inline.
    pub async fn submit<T>(&mut self, transport: &T, session: &mut Session) -> SubmitOutcome
    where
        T: LoginTransport + ?Sized,
    {
        let submission = match self.begin_submit() {
            Ok(submission) => submission,
            Err(outcome) => return outcome,
        };
        let result = transport.login(submission.request).await;
        self.complete_submit(submission.generation, result, session)
    }

    /// Forget the pending request. Its reply will be treated as stale.
    pub fn abandon(&mut self) {
        if self.in_flight.take().is_some() {
            debug!("Abandoned in-flight login");
            self.phase = LoginPhase::Idle;
        }
    }

    fn fail(&mut self, err: LoginError) -> SubmitOutcome {
        let message = err.user_message();
        debug!(kind = err.kind(), "Login failed");
        self.phase = LoginPhase::Failed;
        self.error = Some(message.clone());
        SubmitOutcome::Failed(message)
    }
}
