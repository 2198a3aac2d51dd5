//! Errors returned by [`LinkedDataClient`](crate::LinkedDataClient).
//!
//! Every variant names the resource it concerns and keeps the underlying
//! cause reachable through [`std::error::Error::source`].

use std::fmt;
use std::path::PathBuf;

use reqwest::Method;
use thiserror::Error;

use crate::identity::CredentialError;
use crate::ntriples::ParseError;

/// The four failure classes a caller can dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad certificate bundle or password. Raised at construction.
    Credential,
    /// Connection refused, DNS, TLS handshake, timeout.
    Transport,
    /// The server answered outside the 2xx range.
    HttpStatus,
    /// The body is not valid N-Triples, or a graph could not be serialized.
    Parse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Credential => write!(f, "credential"),
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::HttpStatus => write!(f, "http status"),
            ErrorKind::Parse => write!(f, "parse"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client certificate {}: {source}", .path.display())]
    Credential {
        path: PathBuf,
        #[source]
        source: CredentialError,
    },

    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned {status}")]
    HttpStatus {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },

    #[error("{url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: ParseError,
    },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Credential { .. } => ErrorKind::Credential,
            ClientError::Transport { .. } => ErrorKind::Transport,
            ClientError::HttpStatus { .. } => ErrorKind::HttpStatus,
            ClientError::Parse { .. } => ErrorKind::Parse,
        }
    }

    /// The HTTP status for [`ClientError::HttpStatus`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for a 4xx response.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// `true` for a 5xx response.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }

    /// `true` when the failure was a timeout rather than a refusal or handshake error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport { source, .. } if source.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16) -> ClientError {
        ClientError::HttpStatus {
            method: Method::GET,
            url: "https://localhost/container/1".into(),
            status,
            body: "gone".into(),
        }
    }

    #[test]
    fn status_classes() {
        assert!(status_error(404).is_client_error());
        assert!(!status_error(404).is_server_error());
        assert!(status_error(503).is_server_error());
        assert_eq!(status_error(404).kind(), ErrorKind::HttpStatus);
        assert_eq!(status_error(404).status(), Some(404));
    }

    #[test]
    fn messages_name_the_request() {
        let msg = status_error(404).to_string();
        assert_eq!(msg, "GET https://localhost/container/1 returned 404");
    }

    #[test]
    fn credential_errors_keep_their_source() {
        use std::error::Error as _;
        let err = ClientError::Credential {
            path: "agent.pem".into(),
            source: CredentialError::NoPrivateKey,
        };
        assert_eq!(err.kind(), ErrorKind::Credential);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("agent.pem"));
        assert_eq!(err.status(), None);
    }
}
