//! HTTP server for the Sophia argument store.
//!
//! Wraps [`sophia_api::api_router`] with the process-level layers: request
//! tracing, a per-request timeout, optional CORS, and the optional Basic-auth
//! guard on writes.

pub mod auth;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  http::{HeaderValue, Method, StatusCode, header},
  middleware,
  response::{IntoResponse, Response},
};
use serde::Deserialize;
use sophia_core::store::ArgumentStore;
use thiserror::Error;
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  timeout::TimeoutLayer,
  trace::TraceLayer,
};

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which backend holds the arguments.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
  #[default]
  Memory,
  Sqlite,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
  #[serde(rename = "type", default)]
  pub kind: StorageKind,
  /// SQLite database file; ignored by the memory backend.
  #[serde(default = "default_store_path")]
  pub path: PathBuf,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self { kind: StorageKind::default(), path: default_store_path() }
  }
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `SOPHIA_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_request_timeout_ms")]
  pub request_timeout_ms:   u64,
  /// Origins allowed to make CORS requests. Empty disables CORS entirely.
  #[serde(default)]
  pub cors_allowed_origins: Vec<String>,
  #[serde(default)]
  pub storage:              StorageConfig,
  pub auth_username:        Option<String>,
  pub auth_password_hash:   Option<String>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8001 }

fn default_request_timeout_ms() -> u64 { 10_000 }

fn default_store_path() -> PathBuf { PathBuf::from("sophia.db") }

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("port must be non-zero")]
  ZeroPort,

  #[error("request_timeout_ms must be greater than zero")]
  ZeroTimeout,

  #[error("auth_username and auth_password_hash must be set together")]
  PartialAuth,

  #[error("invalid CORS origin {0:?}")]
  InvalidOrigin(String),
}

impl ServerConfig {
  /// Check every field, returning the first problem found.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.port == 0 {
      return Err(ConfigError::ZeroPort);
    }
    if self.request_timeout_ms == 0 {
      return Err(ConfigError::ZeroTimeout);
    }
    self.cors_origins()?;
    self.auth()?;
    Ok(())
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_millis(self.request_timeout_ms)
  }

  /// The configured credentials, or `None` when auth is disabled.
  pub fn auth(&self) -> Result<Option<AuthConfig>, ConfigError> {
    match (&self.auth_username, &self.auth_password_hash) {
      (Some(username), Some(password_hash)) => Ok(Some(AuthConfig {
        username:      username.clone(),
        password_hash: password_hash.clone(),
      })),
      (None, None) => Ok(None),
      _ => Err(ConfigError::PartialAuth),
    }
  }

  fn cors_origins(&self) -> Result<Vec<HeaderValue>, ConfigError> {
    self
      .cors_allowed_origins
      .iter()
      .map(|origin| {
        HeaderValue::from_str(origin)
          .map_err(|_| ConfigError::InvalidOrigin(origin.clone()))
      })
      .collect()
  }

  /// Log the effective settings. The password hash is never printed.
  pub fn log_values(&self) {
    tracing::info!(
      host = %self.host,
      port = self.port,
      request_timeout_ms = self.request_timeout_ms,
      cors_allowed_origins = ?self.cors_allowed_origins,
      storage = ?self.storage.kind,
      store_path = %self.storage.path.display(),
      auth = self.auth_username.is_some(),
      "server configuration"
    );
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application for `store` under `config`.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Result<Router, ConfigError>
where
  S: ArgumentStore + 'static,
{
  let mut router = sophia_api::api_router(store);

  match config.auth()? {
    Some(auth) => {
      router = router.layer(middleware::from_fn_with_state(
        Arc::new(auth),
        auth::require_auth,
      ));
    }
    None => tracing::warn!("no credentials configured; writes are unauthenticated"),
  }

  router = with_timeout(router, config.request_timeout());

  let origins = config.cors_origins()?;
  if !origins.is_empty() {
    // Methods should stay in sync with the routes in `sophia_api`.
    router = router.layer(
      CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::LOCATION]),
    );
  }

  Ok(router.layer(TraceLayer::new_for_http()))
}

/// Bound every request by `timeout`, answering 408 with a plain-text body.
fn with_timeout(router: Router, timeout: Duration) -> Router {
  router
    .layer(TimeoutLayer::new(timeout))
    .layer(middleware::map_response(describe_timeout))
}

async fn describe_timeout(res: Response) -> Response {
  if res.status() == StatusCode::REQUEST_TIMEOUT
    && !res.headers().contains_key(header::CONTENT_TYPE)
  {
    tracing::warn!("request timed out");
    return (StatusCode::REQUEST_TIMEOUT, "Request Timeout").into_response();
  }
  res
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{body::Body, http::Request};
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;
  use sophia_store_memory::MemoryStore;
  use tower::ServiceExt as _;

  const SAVE_BODY: &str = r#"{"conclusion":"Socrates is mortal","premises":["Socrates is a man","All men are mortal"]}"#;

  fn base_config() -> ServerConfig {
    ServerConfig {
      host:                 default_host(),
      port:                 default_port(),
      request_timeout_ms:   default_request_timeout_ms(),
      cors_allowed_origins: Vec::new(),
      storage:              StorageConfig::default(),
      auth_username:        None,
      auth_password_hash:   None,
    }
  }

  fn config_with_auth(password: &str) -> ServerConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    ServerConfig {
      auth_username: Some("user".to_string()),
      auth_password_hash: Some(hash),
      ..base_config()
    }
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn oneshot_raw(
    app:    &Router,
    method: &str,
    uri:    &str,
    auth:   Option<&str>,
    body:   &str,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
      builder = builder.header(header::AUTHORIZATION, auth);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    app.clone().oneshot(req).await.unwrap()
  }

  // ── Config ──────────────────────────────────────────────────────────────────

  #[test]
  fn defaults_are_valid() {
    assert_eq!(base_config().validate(), Ok(()));
    assert_eq!(base_config().storage.kind, StorageKind::Memory);
  }

  #[test]
  fn zero_timeout_is_invalid() {
    let cfg = ServerConfig { request_timeout_ms: 0, ..base_config() };
    assert_eq!(cfg.validate(), Err(ConfigError::ZeroTimeout));
  }

  #[test]
  fn zero_port_is_invalid() {
    let cfg = ServerConfig { port: 0, ..base_config() };
    assert_eq!(cfg.validate(), Err(ConfigError::ZeroPort));
  }

  #[test]
  fn half_configured_auth_is_invalid() {
    let cfg = ServerConfig {
      auth_username: Some("user".to_string()),
      ..base_config()
    };
    assert_eq!(cfg.validate(), Err(ConfigError::PartialAuth));
  }

  #[test]
  fn bad_cors_origin_is_invalid() {
    let cfg = ServerConfig {
      cors_allowed_origins: vec!["https://ok.example".into(), "bad\norigin".into()],
      ..base_config()
    };
    assert_eq!(
      cfg.validate(),
      Err(ConfigError::InvalidOrigin("bad\norigin".into()))
    );
  }

  #[test]
  fn config_deserialises_from_layered_sources() {
    let settings = config::Config::builder()
      .add_source(config::File::from_str(
        "port = 9000\n[storage]\ntype = \"sqlite\"\npath = \"/tmp/args.db\"\n",
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap();
    let cfg: ServerConfig = settings.try_deserialize().unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.storage.kind, StorageKind::Sqlite);
    assert_eq!(cfg.storage.path, PathBuf::from("/tmp/args.db"));
    assert_eq!(cfg.request_timeout_ms, 10_000);
    assert!(cfg.auth().unwrap().is_none());
  }

  // ── Auth guard ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn writes_require_credentials_when_configured() {
    let app = app(Arc::new(MemoryStore::new()), &config_with_auth("secret")).unwrap();

    let resp = oneshot_raw(&app, "POST", "/arguments", None, SAVE_BODY).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

    let wrong = auth_header("user", "wrong");
    let resp = oneshot_raw(&app, "POST", "/arguments", Some(&wrong), SAVE_BODY).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let good = auth_header("user", "secret");
    let resp = oneshot_raw(&app, "POST", "/arguments", Some(&good), SAVE_BODY).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = oneshot_raw(&app, "DELETE", "/arguments/1", None, "").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn reads_are_public_when_auth_is_configured() {
    let app = app(Arc::new(MemoryStore::new()), &config_with_auth("secret")).unwrap();
    let good = auth_header("user", "secret");
    oneshot_raw(&app, "POST", "/arguments", Some(&good), SAVE_BODY).await;

    let resp = oneshot_raw(&app, "GET", "/arguments/1", None, "").await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn writes_are_open_without_auth() {
    let app = app(Arc::new(MemoryStore::new()), &base_config()).unwrap();
    let resp = oneshot_raw(&app, "POST", "/arguments", None, SAVE_BODY).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  #[tokio::test]
  async fn timeouts_answer_plain_text_408() {
    let slow = Router::new().route(
      "/slow",
      axum::routing::get(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "done"
      }),
    );
    let app = with_timeout(slow, Duration::from_millis(10));

    let resp = oneshot_raw(&app, "GET", "/slow", None, "").await;
    assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(
      resp.headers().get(header::CONTENT_TYPE).unwrap(),
      "text/plain; charset=utf-8"
    );
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"Request Timeout");
  }

  #[tokio::test]
  async fn unrouted_requests_stay_plain_text_through_the_stack() {
    let app = app(Arc::new(MemoryStore::new()), &base_config()).unwrap();
    let resp = oneshot_raw(&app, "PUT", "/arguments/1", None, SAVE_BODY).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
      resp.headers().get(header::CONTENT_TYPE).unwrap(),
      "text/plain; charset=utf-8"
    );
  }

  #[tokio::test]
  async fn cors_exposes_location() {
    let cfg = ServerConfig {
      cors_allowed_origins: vec!["https://wikisophia.example".into()],
      ..base_config()
    };
    let app = app(Arc::new(MemoryStore::new()), &cfg).unwrap();

    let req = Request::builder()
      .method("POST")
      .uri("/arguments")
      .header(header::ORIGIN, "https://wikisophia.example")
      .body(Body::from(SAVE_BODY))
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
      resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
      "https://wikisophia.example"
    );
    let exposed = resp
      .headers()
      .get(header::ACCESS_CONTROL_EXPOSE_HEADERS)
      .unwrap()
      .to_str()
      .unwrap()
      .to_ascii_lowercase();
    assert!(exposed.contains("location"), "exposed: {exposed}");
  }
}
