//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default TCP + TLS connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default whole-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a [`LinkedDataClient`](crate::LinkedDataClient) needs at
/// construction. Nothing here changes once the client is built.
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `cert_path` | (required) | PEM bundle with the certificate chain and private key |
/// | `cert_password` | (absent) | Password for an encrypted private key |
/// | `verify_tls` | `true` | Validate the server's certificate chain and host name |
/// | `extra_roots` | (none) | Additional CA certificates (PEM files) to trust |
/// | `connect_timeout` | 10 s | TCP + TLS connect timeout |
/// | `timeout` | 30 s | Whole-request timeout, connect included |
/// | `user_agent` | `linkeddata/<version>` | `User-Agent` header value |
#[derive(Clone)]
pub struct ClientConfig {
    pub cert_path: PathBuf,
    pub cert_password: Option<String>,
    pub verify_tls: bool,
    pub extra_roots: Vec<PathBuf>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration for `cert_path` with every other field at its default.
    pub fn new(cert_path: impl Into<PathBuf>) -> Self {
        Self {
            cert_path: cert_path.into(),
            cert_password: None,
            verify_tls: true,
            extra_roots: Vec::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("linkeddata/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.cert_password = Some(password.into());
        self
    }

    /// Disabling verification accepts any server certificate, including
    /// self-signed ones and ones issued for another host.
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_extra_root(mut self, ca_path: impl Into<PathBuf>) -> Self {
        self.extra_roots.push(ca_path.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

// The password never appears in logs or panic messages.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("cert_path", &self.cert_path)
            .field(
                "cert_password",
                &self.cert_password.as_ref().map(|_| "<redacted>"),
            )
            .field("verify_tls", &self.verify_tls)
            .field("extra_roots", &self.extra_roots)
            .field("connect_timeout", &self.connect_timeout)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
