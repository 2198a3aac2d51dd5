//! The RDF transfer client.
//!
//! [`LinkedDataClient`] owns one TLS client identity and one verification
//! policy, both fixed at construction. Each operation is a single blocking
//! HTTP exchange; nothing is retried and nothing is cached between calls.
//!
//! | Operation | Method | Header | Body |
//! |-----------|--------|--------|------|
//! | [`fetch`](LinkedDataClient::fetch) | GET | `Accept: application/n-triples` | none |
//! | [`create`](LinkedDataClient::create) | POST | `Content-Type: application/n-triples` | serialized graph |
//! | [`replace`](LinkedDataClient::replace) | PUT | `Content-Type: application/n-triples` | serialized graph |
//! | [`remove`](LinkedDataClient::remove) | DELETE | none | none |

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Certificate, Method, Url};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::graph::Graph;
use crate::identity::{ClientIdentity, CredentialError};
use crate::ntriples::{self, MEDIA_TYPE};

/// The outcome of a successful write (`create`, `replace` or `remove`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// The 2xx or 3xx status the server answered with.
    pub status: u16,
    /// The `Location` header, resolved against the request URL.
    /// Servers set it on `201 Created` to name the new resource.
    pub location: Option<Url>,
}

impl Receipt {
    fn from_response(response: &Response) -> Self {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|loc| response.url().join(loc).ok());
        Self {
            status: response.status().as_u16(),
            location,
        }
    }
}

/// A client for reading and writing RDF resources on a Linked Data server
/// over mutually-authenticated HTTPS.
///
/// Safe to share between threads. Pooled connections belong to this
/// instance only, so two clients with different certificates never reuse
/// each other's TLS sessions.
///
/// `fetch` follows redirects. Writes never do: a `3xx` answer to
/// `create`, `replace` or `remove` is returned as the [`Receipt`], with its
/// `Location`, so a `303 See Other` after a POST still names the new resource.
pub struct LinkedDataClient {
    reads: Client,
    writes: Client,
    cert_path: PathBuf,
    verify_tls: bool,
}

impl LinkedDataClient {
    /// Load the identity and build the TLS transport.
    ///
    /// Certificate problems are reported here, before any network I/O.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let credential = |source: CredentialError| ClientError::Credential {
            path: config.cert_path.clone(),
            source,
        };

        let identity = ClientIdentity::load(&config.cert_path, config.cert_password.as_deref())
            .map_err(credential)?;

        let reads = transport(&config, &identity, Policy::default()).map_err(credential)?;
        let writes = transport(&config, &identity, Policy::none()).map_err(credential)?;

        if !config.verify_tls {
            warn!("TLS verification disabled; server certificates will not be checked");
        }

        info!(
            cert = %config.cert_path.display(),
            chain_len = identity.chain_len(),
            verify_tls = config.verify_tls,
            extra_roots = config.extra_roots.len(),
            "linked data client ready"
        );

        Ok(Self {
            reads,
            writes,
            cert_path: config.cert_path,
            verify_tls: config.verify_tls,
        })
    }

    /// Shorthand for [`LinkedDataClient::new`] with default timeouts.
    pub fn from_pem(
        cert_path: impl Into<PathBuf>,
        password: Option<&str>,
        verify_tls: bool,
    ) -> Result<Self, ClientError> {
        let mut config = ClientConfig::new(cert_path).with_verify_tls(verify_tls);
        if let Some(pw) = password {
            config = config.with_password(pw);
        }
        Self::new(config)
    }

    /// Whether server certificates are validated.
    pub fn verifies_tls(&self) -> bool {
        self.verify_tls
    }

    /// GET `url` and parse the response body as N-Triples.
    ///
    /// An empty 2xx body is an empty graph.
    pub fn fetch(&self, url: &str) -> Result<Graph, ClientError> {
        let request = self.reads.get(url).header(ACCEPT, MEDIA_TYPE);
        let response = self.execute(Method::GET, url, request)?;
        let body = response.bytes().map_err(|source| ClientError::Transport {
            method: Method::GET,
            url: url.to_string(),
            source,
        })?;
        let graph = ntriples::parse(&body).map_err(|source| ClientError::Parse {
            url: url.to_string(),
            source,
        })?;
        debug!(%url, triples = graph.len(), "fetched graph");
        Ok(graph)
    }

    /// POST `graph` to the container at `url`.
    ///
    /// Not idempotent: each call may create a new resource.
    pub fn create(&self, url: &str, graph: &Graph) -> Result<Receipt, ClientError> {
        self.upload(Method::POST, url, graph)
    }

    /// PUT `graph` at `url`, replacing the resource's full state.
    pub fn replace(&self, url: &str, graph: &Graph) -> Result<Receipt, ClientError> {
        self.upload(Method::PUT, url, graph)
    }

    /// DELETE the resource at `url`.
    pub fn remove(&self, url: &str) -> Result<Receipt, ClientError> {
        let request = self.writes.delete(url);
        let response = self.execute(Method::DELETE, url, request)?;
        Ok(Receipt::from_response(&response))
    }

    // The request body is derived from `graph` alone.
    fn upload(&self, method: Method, url: &str, graph: &Graph) -> Result<Receipt, ClientError> {
        let body = ntriples::serialize(graph).map_err(|source| ClientError::Parse {
            url: url.to_string(),
            source,
        })?;
        debug!(%method, %url, triples = graph.len(), bytes = body.len(), "uploading graph");
        let request = self
            .writes
            .request(method.clone(), url)
            .header(CONTENT_TYPE, MEDIA_TYPE)
            .body(body);
        let response = self.execute(method, url, request)?;
        Ok(Receipt::from_response(&response))
    }

    /// Send and reject anything outside the 2xx range. Writes also accept
    /// `3xx`, which their transport never follows.
    fn execute(
        &self,
        method: Method,
        url: &str,
        request: RequestBuilder,
    ) -> Result<Response, ClientError> {
        debug!(%method, %url, "sending request");
        let response = request.send().map_err(|source| ClientError::Transport {
            method: method.clone(),
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        debug!(%method, %url, status = status.as_u16(), "received response");
        if status.is_success() || (method != Method::GET && status.is_redirection()) {
            return Ok(response);
        }

        // The body is diagnostic only; a failure to read it does not mask the status.
        let body = response.text().unwrap_or_default();
        Err(ClientError::HttpStatus {
            method,
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

impl std::fmt::Debug for LinkedDataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedDataClient")
            .field("cert_path", &self.cert_path)
            .field("verify_tls", &self.verify_tls)
            .finish_non_exhaustive()
    }
}

fn transport(
    config: &ClientConfig,
    identity: &ClientIdentity,
    redirects: Policy,
) -> Result<Client, CredentialError> {
    let mut builder = Client::builder()
        .use_rustls_tls()
        .identity(identity.reqwest_identity())
        .connect_timeout(config.connect_timeout)
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .redirect(redirects);

    for root in &config.extra_roots {
        builder = builder.add_root_certificate(load_root(root)?);
    }
    if !config.verify_tls {
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().map_err(CredentialError::Rejected)
}

fn load_root(path: &Path) -> Result<Certificate, CredentialError> {
    let pem = fs::read(path).map_err(|source| CredentialError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Certificate::from_pem(&pem).map_err(|source| CredentialError::InvalidTrustAnchor {
        path: path.to_path_buf(),
        source,
    })
}

// --- tests -------------------------------------------------------------------
