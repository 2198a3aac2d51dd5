//! Shared helpers for the linkeddata conformance test suite.
//!
//! Provides a throwaway PKI ([`TestPki`]) and [`spawn_server`], which binds
//! an ephemeral port on `127.0.0.1` and serves a tiny Linked Data store over
//! TLS that *requires* a client certificate issued by the test CA. The
//! returned [`TestServer`] exposes the store so tests can seed resources and
//! inspect exactly what arrived on the wire.
//!
//! The server runs on its own `tokio` runtime in a background thread, so the
//! blocking client under test can be driven from an ordinary `#[test]`.

use std::collections::HashMap;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use bytes::Bytes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use rcgen::{
    BasicConstraints, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa, Issuer, KeyPair,
    KeyUsagePurpose,
};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use tokio_rustls::TlsAcceptor;
use tower::ServiceExt;
use tracing::debug;

const NTRIPLES: &str = "application/n-triples";

// ---------------------------------------------------------------------------
// PKI
// ---------------------------------------------------------------------------

/// Which certificate the test server presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerCert {
    /// Issued by the [`TestPki`] CA, valid for `127.0.0.1` and `localhost`.
    IssuedByCa,
    /// Self-signed; no trust anchor can validate it.
    SelfSigned,
}

/// A certificate authority plus helpers to issue server and client certificates.
pub struct TestPki {
    name: String,
    ca_key: KeyPair,
    ca_der: CertificateDer<'static>,
    ca_pem: String,
}

impl TestPki {
    /// Generate a fresh CA named `name`.
    pub fn generate(name: &str) -> Self {
        let ca_key = KeyPair::generate().expect("generate CA key");
        let ca = ca_params(name).self_signed(&ca_key).expect("self-sign CA");
        Self {
            name: name.to_string(),
            ca_der: ca.der().clone(),
            ca_pem: ca.pem(),
            ca_key,
        }
    }

    /// The CA certificate in PEM form, for use as an extra trust anchor.
    pub fn ca_pem(&self) -> &str {
        &self.ca_pem
    }

    /// Issue a client certificate and return the PEM bundle (certificate, then key).
    pub fn issue_client_pem(&self, common_name: &str) -> String {
        let key = KeyPair::generate().expect("generate client key");
        let mut params =
            CertificateParams::new(Vec::<String>::new()).expect("client cert params");
        params.distinguished_name.push(DnType::CommonName, common_name);
        params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ClientAuth];
        let cert = params
            .signed_by(&key, &self.issuer())
            .expect("sign client cert");
        format!("{}{}", cert.pem(), key.serialize_pem())
    }

    /// TLS configuration for the test server: presents `server_cert` and
    /// requires a client certificate chaining to this CA.
    pub fn server_config(&self, server_cert: ServerCert) -> Arc<ServerConfig> {
        let key = KeyPair::generate().expect("generate server key");
        let mut params =
            CertificateParams::new(vec!["127.0.0.1".to_string(), "localhost".to_string()])
                .expect("server cert params");
        params.distinguished_name.push(DnType::CommonName, "localhost");
        params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
        let cert = match server_cert {
            ServerCert::IssuedByCa => params.signed_by(&key, &self.issuer()),
            ServerCert::SelfSigned => params.self_signed(&key),
        }
        .expect("server cert");

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let mut roots = RootCertStore::empty();
        roots.add(self.ca_der.clone()).expect("add CA to client roots");
        let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
            .build()
            .expect("client verifier");

        let key_der = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der()));
        let mut config = ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .expect("protocol versions")
            .with_client_cert_verifier(verifier)
            .with_single_cert(vec![cert.der().clone()], key_der)
            .expect("server certificate");
        config.alpn_protocols = vec![b"http/1.1".to_vec()];
        Arc::new(config)
    }

    fn issuer(&self) -> Issuer<'static, &KeyPair> {
        Issuer::new(ca_params(&self.name), &self.ca_key)
    }
}

fn ca_params(name: &str) -> CertificateParams {
    let mut params = CertificateParams::new(Vec::<String>::new()).expect("CA params");
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign,
        KeyUsagePurpose::DigitalSignature,
    ];
    params.distinguished_name.push(DnType::CommonName, name);
    params
}

/// Write `contents` to a temporary file that lives as long as the handle.
pub fn temp_pem(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// One request as the server received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Default)]
struct StoreState {
    resources: HashMap<String, Bytes>,
    next_id: HashMap<String, usize>,
    canned: HashMap<String, (StatusCode, String)>,
    redirects: HashMap<String, (StatusCode, String)>,
    requests: Vec<RecordedRequest>,
    client_chains: Vec<usize>,
}

/// In-memory resources keyed by path, plus a log of every request.
///
/// - `POST <container>/` stores the body at `<container>/<n>` (n = 1, 2, …)
///   and answers `201 Created` with a relative `Location`.
/// - `GET` serves a stored body as N-Triples, or `404`.
/// - `PUT` stores the body (`201` when new, `204` when replaced).
/// - `DELETE` removes it (`204`, or `404` when absent).
#[derive(Default)]
pub struct Store {
    state: Mutex<StoreState>,
}

impl Store {
    pub fn put(&self, path: &str, body: impl Into<Bytes>) {
        self.lock().resources.insert(path.to_string(), body.into());
    }

    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.lock().resources.get(path).cloned()
    }

    /// Answer every request for `path` with `status` and `body`.
    pub fn respond_with(&self, path: &str, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).expect("valid status code");
        self.lock()
            .canned
            .insert(path.to_string(), (status, body.to_string()));
    }

    /// Answer every request for `path` with a `3xx` pointing at `location`.
    pub fn redirect(&self, path: &str, status: u16, location: &str) {
        let status = StatusCode::from_u16(status).expect("valid status code");
        self.lock()
            .redirects
            .insert(path.to_string(), (status, location.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.lock().requests.last().cloned()
    }

    /// Length of each client certificate chain presented in a completed handshake.
    pub fn client_chains(&self) -> Vec<usize> {
        self.lock().client_chains.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().expect("store mutex poisoned")
    }
}

async fn handle(
    State(store): State<Arc<Store>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();

    let mut state = store.lock();
    state.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        accept: header_value(&headers, ACCEPT),
        content_type: header_value(&headers, CONTENT_TYPE),
        body: body.clone(),
    });

    if let Some((status, canned)) = state.canned.get(&path) {
        return (*status, [(CONTENT_TYPE, NTRIPLES)], canned.clone()).into_response();
    }
    if let Some((status, location)) = state.redirects.get(&path) {
        return (*status, [(LOCATION, location.clone())]).into_response();
    }

    match method.as_str() {
        "GET" => match state.resources.get(&path) {
            Some(stored) => (
                StatusCode::OK,
                [(CONTENT_TYPE, NTRIPLES)],
                Body::from(stored.clone()),
            )
                .into_response(),
            None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
        },
        "POST" if path.ends_with('/') => {
            let id = state.next_id.entry(path.clone()).or_insert(0);
            *id += 1;
            let created = format!("{path}{id}");
            state.resources.insert(created.clone(), body);
            (StatusCode::CREATED, [(LOCATION, created)]).into_response()
        }
        "PUT" => match state.resources.insert(path, body) {
            Some(_) => StatusCode::NO_CONTENT.into_response(),
            None => StatusCode::CREATED.into_response(),
        },
        "DELETE" => match state.resources.remove(&path) {
            Some(_) => StatusCode::NO_CONTENT.into_response(),
            None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
        },
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A running test server.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<Store>,
}

impl TestServer {
    /// `https://127.0.0.1:<port><path>`.
    pub fn url(&self, path: &str) -> String {
        format!("https://{}{}", self.addr, path)
    }
}

/// Start a mutual-TLS Linked Data server on an ephemeral port.
///
/// The listener is bound before this returns, so the server accepts
/// connections immediately.
///
/// # Panics
///
/// Panics if the port cannot be bound or the TLS configuration is invalid.
pub fn spawn_server(pki: &TestPki, server_cert: ServerCert) -> TestServer {
    let tls = pki.server_config(server_cert);
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.set_nonblocking(true).expect("non-blocking listener");
    let addr = listener.local_addr().expect("get local addr");

    let store = Arc::new(Store::default());
    let router = Router::new()
        .fallback(handle)
        .with_state(Arc::clone(&store));
    let handshake_store = Arc::clone(&store);

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("build server runtime");
        runtime.block_on(serve(listener, tls, router, handshake_store));
    });

    TestServer { addr, store }
}

async fn serve(
    listener: std::net::TcpListener,
    tls: Arc<ServerConfig>,
    router: Router,
    store: Arc<Store>,
) {
    let listener = tokio::net::TcpListener::from_std(listener).expect("adopt listener");
    let acceptor = TlsAcceptor::from(tls);

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                debug!("accept failed: {e}");
                continue;
            }
        };
        let acceptor = acceptor.clone();
        let router = router.clone();
        let store = Arc::clone(&store);

        tokio::spawn(async move {
            let stream = match acceptor.accept(stream).await {
                Ok(s) => s,
                Err(e) => {
                    debug!(%peer, "TLS handshake failed: {e}");
                    return;
                }
            };
            let chain = stream
                .get_ref()
                .1
                .peer_certificates()
                .map_or(0, |certs| certs.len());
            store.lock().client_chains.push(chain);

            let service = service_fn(move |req: Request<Incoming>| router.clone().oneshot(req));
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!(%peer, "connection error: {e}");
            }
        });
    }
}
