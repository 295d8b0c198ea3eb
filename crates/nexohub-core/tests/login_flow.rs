//! End-to-end login flow against a local HTTP responder.
//!
//! The responder answers every connection with one canned response and
//! records what it was sent.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use nexohub_core::api::{AuthClient, LoginTransport};
use nexohub_core::auth::{
    Credentials, FileTokenStore, LoginController, Route, Session, SubmitOutcome, TokenStore,
    TOKEN_KEY,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
struct Captured {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

struct Responder {
    addr: SocketAddr,
    seen: Arc<Mutex<Vec<Captured>>>,
}

impl Responder {
    async fn start(status_line: &'static str, content_type: &'static str, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                if let Ok(captured) = read_request(&mut stream).await {
                    sink.lock().unwrap().push(captured);
                }
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { addr, seen }
    }

    fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn requests(&self) -> Vec<Captured> {
        self.seen.lock().unwrap().clone()
    }
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<Captured> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n").filter(|l| !l.is_empty());
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    Ok(Captured {
        request_line,
        headers,
        body,
    })
}

fn token_session(dir: &Path) -> (Arc<FileTokenStore>, Session) {
    let store = Arc::new(FileTokenStore::new(dir.to_path_buf()));
    let session = Session::new(store.clone());
    (store, session)
}

fn filled_form() -> LoginController {
    LoginController::with_credentials(Credentials::new("  user@example.com ", "password1"))
}

#[tokio::test]
async fn test_successful_login_stores_token_and_navigates_home() {
    let server = Responder::start("200 OK", "application/json", r#"{"access_token":"abc123","token_type":"bearer"}"#).await;
    let client = AuthClient::new(server.base_url()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (store, mut session) = token_session(dir.path());
    let mut form = filled_form();

    let outcome = form.submit(&client, &mut session).await;

    assert_eq!(outcome, SubmitOutcome::Navigate(Route::Home));
    assert_eq!(std::fs::read_to_string(dir.path().join(TOKEN_KEY)).unwrap(), "abc123");
    assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));
    assert_eq!(form.error(), None);
    assert!(!form.is_in_flight());
    assert_eq!(
        session.data.as_ref().and_then(|d| d.token_type.as_deref()),
        Some("bearer")
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.request_line, "POST /api/v1/auth/login HTTP/1.1");
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("accept"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"email": "user@example.com", "password": "password1"})
    );
}

#[tokio::test]
async fn test_rejected_login_shows_server_detail() {
    let server = Responder::start("401 Unauthorized", "application/json", r#"{"detail":"Bad credentials"}"#).await;
    let client = AuthClient::new(server.base_url()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (store, mut session) = token_session(dir.path());
    let mut form = filled_form();

    let outcome = form.submit(&client, &mut session).await;

    assert_eq!(outcome, SubmitOutcome::Failed("Bad credentials".to_string()));
    assert_eq!(form.error(), Some("Bad credentials"));
    assert_eq!(store.load().unwrap(), None);
    assert!(!dir.path().join(TOKEN_KEY).exists());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_rejection_with_message_field() {
    let server = Responder::start("403 Forbidden", "application/json", r#"{"message":"Account disabled"}"#).await;
    let client = AuthClient::new(server.base_url()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (_store, mut session) = token_session(dir.path());
    let mut form = filled_form();

    form.submit(&client, &mut session).await;

    assert_eq!(form.error(), Some("Account disabled"));
}

#[tokio::test]
async fn test_non_json_error_body_uses_generic_message() {
    let server = Responder::start("502 Bad Gateway", "text/html", "<html>upstream down</html>").await;
    let client = AuthClient::new(server.base_url()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (store, mut session) = token_session(dir.path());
    let mut form = filled_form();

    form.submit(&client, &mut session).await;

    assert_eq!(form.error(), Some("Unable to sign in."));
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn test_success_without_token_is_invalid_response() {
    let server = Responder::start("200 OK", "application/json", "{}").await;
    let client = AuthClient::new(server.base_url()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (store, mut session) = token_session(dir.path());
    let mut form = filled_form();

    let outcome = form.submit(&client, &mut session).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed("Invalid response: missing access_token.".to_string())
    );
    assert_eq!(store.load().unwrap(), None);
    assert!(!form.is_in_flight());
}

#[tokio::test]
async fn test_network_failure_reports_error() {
    // Grab a free port, then close it so the connection is refused
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = AuthClient::new(format!("http://{}", addr)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (store, mut session) = token_session(dir.path());
    let mut form = filled_form();

    let outcome = form.submit(&client, &mut session).await;

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    let message = form.error().unwrap_or_default().to_lowercase();
    assert!(message.contains("refused"), "got {message:?}");
    assert_eq!(store.load().unwrap(), None);
    assert!(!form.is_in_flight());
    assert!(form.can_submit());
}

#[tokio::test]
async fn test_second_submit_while_pending_sends_one_request() {
    let server = Responder::start("200 OK", "application/json", r#"{"access_token":"abc123"}"#).await;
    let client = AuthClient::new(server.base_url()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (_store, mut session) = token_session(dir.path());
    let mut form = filled_form();

    let submission = form.begin_submit().unwrap();
    assert_eq!(form.begin_submit().unwrap_err(), SubmitOutcome::Busy);
    assert!(!form.can_submit());

    let result = client.login(submission.request).await;
    let outcome = form.complete_submit(submission.generation, result, &mut session);

    assert_eq!(outcome, SubmitOutcome::Navigate(Route::Home));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_health_probe() {
    let server = Responder::start("200 OK", "application/json", r#"{"status":"ok"}"#).await;
    let client = AuthClient::new(server.base_url()).unwrap();

    let health = client.health().await.unwrap();
    assert!(health.is_ok());
    assert_eq!(server.requests()[0].request_line, "GET /health HTTP/1.1");
}

#[tokio::test]
async fn test_health_probe_failure_status() {
    let server = Responder::start("503 Service Unavailable", "text/plain", "down").await;
    let client = AuthClient::new(server.base_url()).unwrap();

    assert!(client.health().await.is_err());
}
