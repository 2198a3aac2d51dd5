//! Push and fetch RDF graphs on a Linked Data server over mutually-authenticated HTTPS.
//!
//! The client authenticates with a certificate/key pair loaded from one PEM
//! file, exchanges graphs as N-Triples, and maps the four HTTP verbs onto
//! read/create/replace/remove. It is the library behind the `ldc` CLI.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | RDF terms: [`Subject`], [`Object`], [`Triple`] |
//! | [`graph`] | [`Graph`], a set of triples |
//! | [`ntriples`] | N-Triples [`parse`](ntriples::parse) and [`serialize`](ntriples::serialize) |
//! | [`identity`] | Loading the TLS client identity from a PEM bundle |
//! | [`config`] | [`ClientConfig`] construction inputs |
//! | [`client`] | [`LinkedDataClient`] and its GET/POST/PUT/DELETE operations |
//! | [`error`] | [`ClientError`] and its [`ErrorKind`] classes |
//! | [`render`] | Human-readable text rendering of graphs |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use linkeddata::{ClientConfig, LinkedDataClient};
//!
//! let client = LinkedDataClient::new(
//!     ClientConfig::new("agent.pem").with_password("changeit"),
//! )?;
//!
//! let mut graph = client.fetch("https://localhost:4443/articles/")?;
//! let receipt = client.create("https://localhost:4443/articles/", &graph)?;
//! println!("created {:?}", receipt.location);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod graph;
pub mod identity;
pub mod ntriples;
pub mod render;
pub mod types;

pub use client::{LinkedDataClient, Receipt};
pub use config::ClientConfig;
pub use error::{ClientError, ErrorKind};
pub use graph::Graph;
pub use identity::{ClientIdentity, CredentialError};
pub use ntriples::ParseError;
pub use types::{BlankNode, Literal, NamedNode, Object, Subject, Triple};
