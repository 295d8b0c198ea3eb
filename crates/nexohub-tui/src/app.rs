//! Application state management for the NexoHub console.
//!
//! This module contains the `App` struct: which screen is showing, the login
//! form controller, the session, and the channel that carries login results
//! back from the background request task.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use nexohub_core::api::{AuthClient, LoginError, LoginTransport};
use nexohub_core::auth::{
    open_store, Credentials, LoginController, Route, Session, SessionToken, SubmitOutcome,
    TokenStore,
};
use nexohub_core::config::Config;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the login result channel.
/// Only one request is ever in flight, a few slots is plenty.
const CHANNEL_BUFFER_SIZE: usize = 4;

/// Prefills the email field
pub const ENV_EMAIL: &str = "NEXOHUB_EMAIL";

/// Prefills the password field
pub const ENV_PASSWORD: &str = "NEXOHUB_PASSWORD";

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    LoggingIn,
    Home,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

/// Result of a background login request, tagged with its submission.
struct LoginResult {
    generation: u64,
    result: Result<SessionToken, LoginError>,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    pub session: Session,
    pub login: LoginController,
    pub login_focus: LoginFocus,

    pub state: AppState,
    /// Where a cancelled quit prompt returns to
    resume_state: AppState,
    pub status_message: Option<String>,
    pub signed_in_at: Option<DateTime<Local>>,

    transport: Arc<dyn LoginTransport>,
    config_path: Option<PathBuf>,
    login_tx: mpsc::Sender<LoginResult>,
    login_rx: mpsc::Receiver<LoginResult>,
}

impl App {
    /// Build the app from configuration: HTTP client, token store and any
    /// credentials supplied through the environment.
    pub fn new(config: Config) -> Result<Self> {
        let store = open_store(config.token_storage, &config.data_dir()?);
        let transport: Arc<dyn LoginTransport> = Arc::new(AuthClient::from_config(&config)?);

        let email = std::env::var(ENV_EMAIL)
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let password = std::env::var(ENV_PASSWORD).unwrap_or_default();

        let mut app = Self::with_parts(config, transport, store, Credentials::new(email, password));
        app.config_path = Config::config_path().ok();
        Ok(app)
    }

    /// Assemble an app from explicit parts. Config changes are not written
    /// to disk.
    pub fn with_parts(
        config: Config,
        transport: Arc<dyn LoginTransport>,
        store: Arc<dyn TokenStore>,
        credentials: Credentials,
    ) -> Self {
        let (login_tx, login_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            config,
            session: Session::new(store),
            login: LoginController::with_credentials(credentials),
            login_focus: LoginFocus::Email,
            state: AppState::LoggingIn,
            resume_state: AppState::LoggingIn,
            status_message: None,
            signed_in_at: None,
            transport,
            config_path: None,
            login_tx,
            login_rx,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Pick the starting screen: Home if a token is stored, else the form.
    pub fn restore_session(&mut self) -> bool {
        match self.session.load() {
            Ok(true) => {
                info!("Found stored session");
                self.state = AppState::Home;
                true
            }
            Ok(false) => {
                self.start_login();
                false
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored session");
                self.start_login();
                false
            }
        }
    }

    /// Show the login form
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login.email().is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
    }

    /// Send the form in the background. Does nothing while a request is
    /// pending or the form is invalid; the controller records why.
    pub fn submit_login(&mut self) {
        let submission = match self.login.begin_submit() {
            Ok(submission) => submission,
            Err(outcome) => {
                debug!(?outcome, "Login not sent");
                return;
            }
        };

        let transport = Arc::clone(&self.transport);
        let tx = self.login_tx.clone();
        tokio::spawn(async move {
            let result = transport.login(submission.request).await;
            let message = LoginResult {
                generation: submission.generation,
                result,
            };
            if tx.send(message).await.is_err() {
                debug!("Login result dropped, app is gone");
            }
        });
    }

    /// Apply any login results that arrived since the last frame
    pub fn check_background_tasks(&mut self) {
        while let Ok(message) = self.login_rx.try_recv() {
            let outcome = self
                .login
                .complete_submit(message.generation, message.result, &mut self.session);
            self.apply_outcome(outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Navigate(Route::Home) => {
                // Don't yank an open quit prompt away
                if self.state != AppState::ConfirmingQuit {
                    self.state = AppState::Home;
                }
                self.resume_state = AppState::Home;
                self.signed_in_at = Some(Local::now());
                self.status_message = None;
                self.remember_email();
            }
            SubmitOutcome::Navigate(Route::Login) => self.start_login(),
            SubmitOutcome::Failed(_) => self.login_focus = LoginFocus::Password,
            SubmitOutcome::Busy | SubmitOutcome::Stale => {}
        }
    }

    fn remember_email(&mut self) {
        let email = self.login.email().trim().to_string();
        self.config.last_email = Some(email.clone());
        if let Some(ref path) = self.config_path {
            if let Err(e) = Config::store_last_email(path, &email) {
                warn!(error = %e, "Failed to save config");
            }
        }
    }

    /// Drop the stored token and return to the form. The email is kept.
    pub fn sign_out(&mut self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear stored token");
        }
        self.login.abandon();
        self.login.set_password("");
        self.signed_in_at = None;
        self.resume_state = AppState::LoggingIn;
        self.status_message = Some("Signed out".to_string());
        info!("Signed out");
        self.start_login();
    }

    /// Terminal prompt login (used for CLI mode)
    pub async fn login_interactive(&mut self) -> Result<()> {
        println!("\n=== NexoHub Login ===\n");

        let email = Self::prompt_email(self.login.email())?;
        let password = rpassword::prompt_password("Password: ")?;
        self.login.set_email(email);
        self.login.set_password(password);

        println!("\nSigning in...");

        let outcome = self.login.submit(&*self.transport, &mut self.session).await;
        match outcome {
            SubmitOutcome::Navigate(route) => {
                self.apply_outcome(SubmitOutcome::Navigate(route));
                println!("Login successful!\n");
                Ok(())
            }
            SubmitOutcome::Failed(message) => Err(anyhow::anyhow!(message)),
            SubmitOutcome::Busy | SubmitOutcome::Stale => {
                Err(anyhow::anyhow!("Login did not complete"))
            }
        }
    }

    fn prompt_email(default: &str) -> Result<String> {
        if default.is_empty() {
            print!("Email: ");
        } else {
            print!("Email [{}]: ", default);
        }
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(input.to_string())
        }
    }

    /// Show the quit prompt over the current screen
    pub fn request_quit(&mut self) {
        if self.state != AppState::ConfirmingQuit {
            self.resume_state = self.state;
        }
        self.state = AppState::ConfirmingQuit;
    }

    pub fn cancel_quit(&mut self) {
        self.state = self.resume_state;
    }

    /// One-line description of the current session for the status bar
    pub fn session_summary(&self) -> String {
        let Some(ref data) = self.session.data else {
            return "Not signed in".to_string();
        };

        let mut parts = vec![format!(
            "Session: {}",
            data.token_type.as_deref().unwrap_or("stored token")
        )];
        if let Some(user_id) = data.user_id {
            parts.push(format!("user #{}", user_id));
        }
        if let Some(ref role) = data.role {
            parts.push(role.replace('_', " "));
        }
        if let Some(at) = self.signed_in_at {
            parts.push(format!("since {}", at.format("%H:%M")));
        }
        parts.join(" | ")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use nexohub_core::auth::MemoryTokenStore;

    use super::*;

    struct CountingTransport {
        reply: fn() -> Result<SessionToken, LoginError>,
        calls: AtomicUsize,
    }

    impl CountingTransport {
        fn new(reply: fn() -> Result<SessionToken, LoginError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LoginTransport for CountingTransport {
        async fn login(&self, _request: nexohub_core::api::LoginRequest) -> Result<SessionToken, LoginError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)()
        }
    }

    fn app_with(
        transport: Arc<CountingTransport>,
        store: Arc<MemoryTokenStore>,
        credentials: Credentials,
    ) -> App {
        App::with_parts(Config::default(), transport, store, credentials)
    }

    /// Pump the result channel until the request settles
    async fn settle(app: &mut App) {
        for _ in 0..200 {
            app.check_background_tasks();
            if !app.login.is_in_flight() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("login never completed");
    }

    #[test]
    fn test_login_focus_cycle() {
        assert_eq!(LoginFocus::Email.next(), LoginFocus::Password);
        assert_eq!(LoginFocus::Password.next(), LoginFocus::Button);
        assert_eq!(LoginFocus::Button.next(), LoginFocus::Email);
        assert_eq!(LoginFocus::Email.prev(), LoginFocus::Button);
        assert_eq!(LoginFocus::Button.prev(), LoginFocus::Password);
    }

    #[tokio::test]
    async fn test_double_submit_sends_one_request() {
        let transport = CountingTransport::new(|| Ok(SessionToken::new("abc123")));
        let store = Arc::new(MemoryTokenStore::new());
        let mut app = app_with(
            transport.clone(),
            store.clone(),
            Credentials::new("user@example.com", "password1"),
        );

        app.submit_login();
        assert!(app.login.is_in_flight());
        app.submit_login();

        settle(&mut app).await;

        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.state, AppState::Home);
        assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));
        assert_eq!(app.config.last_email.as_deref(), Some("user@example.com"));
        assert!(app.signed_in_at.is_some());
    }

    #[tokio::test]
    async fn test_login_saves_email_without_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config::default().save_to(&path).unwrap();

        let mut config = Config::load_from(&path).unwrap();
        config.apply_env(|key| {
            (key == nexohub_core::config::ENV_API_URL).then(|| "https://staging.example".to_string())
        });

        let transport = CountingTransport::new(|| Ok(SessionToken::new("abc123")));
        let store = Arc::new(MemoryTokenStore::new());
        let mut app = App::with_parts(
            config,
            transport,
            store,
            Credentials::new("user@example.com", "password1"),
        );
        app.config_path = Some(path.clone());

        app.submit_login();
        settle(&mut app).await;
        assert_eq!(app.state, AppState::Home);

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.last_email.as_deref(), Some("user@example.com"));
        assert_eq!(saved.api_base_url, "http://localhost:8000");
        assert_eq!(app.config.api_base_url, "https://staging.example");
    }

    #[tokio::test]
    async fn test_rejected_login_stays_on_form() {
        let transport = CountingTransport::new(|| {
            Err(LoginError::RemoteRejection {
                status: 401,
                message: "Bad credentials".into(),
            })
        });
        let store = Arc::new(MemoryTokenStore::new());
        let mut app = app_with(transport, store.clone(), Credentials::new("user@example.com", "password1"));

        app.submit_login();
        settle(&mut app).await;

        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.login.error(), Some("Bad credentials"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let transport = CountingTransport::new(|| Ok(SessionToken::new("abc123")));
        let store = Arc::new(MemoryTokenStore::new());
        let mut app = app_with(transport.clone(), store, Credentials::new("user", "password1"));

        app.submit_login();
        settle(&mut app).await;

        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        assert_eq!(app.login.error(), Some("Enter a valid email address."));
    }

    #[test]
    fn test_restore_session_routes_home() {
        let transport = CountingTransport::new(|| Ok(SessionToken::new("unused")));
        let store = Arc::new(MemoryTokenStore::new());
        store.save("persisted").unwrap();

        let mut app = app_with(transport, store, Credentials::default());
        assert!(app.restore_session());
        assert_eq!(app.state, AppState::Home);
        assert_eq!(app.session_summary(), "Session: stored token");
    }

    #[test]
    fn test_restore_without_token_shows_form() {
        let transport = CountingTransport::new(|| Ok(SessionToken::new("unused")));
        let store = Arc::new(MemoryTokenStore::new());
        let mut app = app_with(transport, store, Credentials::new("user@example.com", ""));

        assert!(!app.restore_session());
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.login_focus, LoginFocus::Password);
    }

    #[test]
    fn test_sign_out_clears_token_keeps_email() {
        let transport = CountingTransport::new(|| Ok(SessionToken::new("unused")));
        let store = Arc::new(MemoryTokenStore::new());
        store.save("persisted").unwrap();
        let mut app = app_with(transport, store.clone(), Credentials::new("user@example.com", ""));
        app.restore_session();

        app.sign_out();

        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(store.load().unwrap(), None);
        assert!(!app.session.is_authenticated());
        assert_eq!(app.login.email(), "user@example.com");
        assert_eq!(app.session_summary(), "Not signed in");
    }

    #[test]
    fn test_quit_prompt_returns_to_previous_screen() {
        let transport = CountingTransport::new(|| Ok(SessionToken::new("unused")));
        let store = Arc::new(MemoryTokenStore::new());
        store.save("persisted").unwrap();
        let mut app = app_with(transport, store, Credentials::default());
        app.restore_session();

        app.request_quit();
        assert_eq!(app.state, AppState::ConfirmingQuit);
        app.request_quit();
        app.cancel_quit();
        assert_eq!(app.state, AppState::Home);
    }

    #[test]
    fn test_session_summary_with_server_fields() {
        let transport = CountingTransport::new(|| Ok(SessionToken::new("unused")));
        let store = Arc::new(MemoryTokenStore::new());
        let mut app = app_with(transport, store, Credentials::default());

        let mut token = SessionToken::new("jwt");
        token.token_type = Some("bearer".into());
        token.user_id = Some(42);
        token.role = Some("parking_admin".into());
        app.session.establish(token).unwrap();

        assert_eq!(app.session_summary(), "Session: bearer | user #42 | parking admin");
    }
}
