//! Process-wide configuration for the quote checker.
//!
//! Everything a request handler needs to know about its environment lives in
//! [`ServerConfig`], built once at startup (from CLI flags and environment
//! variables in the binary) and shared read-only through
//! [`crate::server::AppState`]. Handlers never call `std::env::var`.

use crate::error::ServerError;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default request body cap: 10 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Default chat completions endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Configuration for the quote-checking server.
///
/// Built via [`ServerConfig::builder()`] or using [`ServerConfig::default()`].
///
/// # Example
/// ```rust
/// use quotemate::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .port(3000)
///     .api_key(Some("sk-test".to_string()))
///     .upload_dir("/tmp/quotemate")
///     .build()
///     .unwrap();
/// assert!(config.has_credential());
/// ```
#[derive(Clone)]
pub struct ServerConfig {
    /// Bind address. Default: `0.0.0.0`.
    pub host: String,

    /// Listening port. Default: 8080.
    pub port: u16,

    /// Completion-service credential. `None` when unset or blank.
    ///
    /// A missing key does not stop the server from starting; it is reported
    /// to the user on the first quote submission instead.
    pub api_key: Option<String>,

    /// Model identifier sent to the completion service. Default: `gpt-4.1-mini`.
    pub model: String,

    /// Base URL of the chat completions API. Default: `https://api.openai.com/v1`.
    pub api_base: String,

    /// Directory used to stage uploaded PDFs before extraction. Default: `uploads`.
    pub upload_dir: PathBuf,

    /// Maximum request body size in bytes. Default: 10 MiB.
    pub max_body_bytes: usize,

    /// Keep staged PDFs after extraction. Default: false.
    pub keep_uploads: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            keep_uploads: false,
        }
    }
}

// The credential must never reach a log line.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("upload_dir", &self.upload_dir)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("keep_uploads", &self.keep_uploads)
            .finish()
    }
}

impl ServerConfig {
    /// Create a new builder for `ServerConfig`.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Whether a completion-service credential is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Parse `host:port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServerError::InvalidConfig(format!("Invalid address: {e}")))
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the credential. Blank values count as missing.
    pub fn api_key(mut self, key: Option<String>) -> Self {
        self.config.api_key = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.config.api_base = api_base.into();
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    pub fn max_body_bytes(mut self, n: usize) -> Self {
        self.config.max_body_bytes = n;
        self
    }

    pub fn keep_uploads(mut self, v: bool) -> Self {
        self.config.keep_uploads = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServerConfig, ServerError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(ServerError::InvalidConfig("Model must not be empty".into()));
        }
        if !(c.api_base.starts_with("http://") || c.api_base.starts_with("https://")) {
            return Err(ServerError::InvalidConfig(format!(
                "API base must be an http(s) URL, got '{}'",
                c.api_base
            )));
        }
        if c.max_body_bytes == 0 {
            return Err(ServerError::InvalidConfig(
                "Body limit must be ≥ 1 byte".into(),
            ));
        }
        if c.upload_dir.as_os_str().is_empty() {
            return Err(ServerError::InvalidConfig(
                "Upload directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_deployment() {
        let c = ServerConfig::default();
        assert_eq!(c.port, 8080);
        assert_eq!(c.max_body_bytes, 10 * 1024 * 1024);
        assert_eq!(c.model, "gpt-4.1-mini");
        assert!(!c.has_credential());
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let c = ServerConfig::builder()
            .api_key(Some("   ".into()))
            .build()
            .unwrap();
        assert!(c.api_key.is_none());

        let c = ServerConfig::builder()
            .api_key(Some(" sk-abc \n".into()))
            .build()
            .unwrap();
        assert_eq!(c.api_key.as_deref(), Some("sk-abc"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = ServerConfig::builder()
            .api_key(Some("sk-secret".into()))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"), "got: {dbg}");
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn build_rejects_non_http_api_base() {
        let err = ServerConfig::builder()
            .api_base("api.openai.com/v1")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("API base"));

        let c = ServerConfig::builder()
            .api_base("http://127.0.0.1:9000/v1")
            .build()
            .unwrap();
        assert_eq!(c.api_base, "http://127.0.0.1:9000/v1");
    }

    #[test]
    fn build_rejects_zero_body_limit() {
        let err = ServerConfig::builder().max_body_bytes(0).build().unwrap_err();
        assert!(err.to_string().contains("Body limit"));
    }

    #[test]
    fn socket_addr_parses_host_and_port() {
        let c = ServerConfig::builder()
            .host("127.0.0.1")
            .port(3000)
            .build()
            .unwrap();
        assert_eq!(c.socket_addr().unwrap().port(), 3000);

        let bad = ServerConfig::builder().host("not a host").build().unwrap();
        assert!(bad.socket_addr().is_err());
    }
}
