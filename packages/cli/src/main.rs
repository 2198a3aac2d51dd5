//! `ldc`: Linked Data client command-line interface.
//!
//! Four subcommands, one per HTTP verb, all authenticated with a client
//! certificate:
//!
//! - **`get`**: fetch a resource and print it as N-Triples.
//! - **`post`**: create a resource in a container from an N-Triples file.
//! - **`put`**: replace a resource with the contents of an N-Triples file.
//! - **`delete`**: remove a resource.
//!
//! `post` and `put` read a file path or stdin (`-`).

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand};
use linkeddata::{ntriples, render, ClientConfig, ClientError, ErrorKind, Graph, LinkedDataClient, Receipt};
use tracing::debug;

/// ldc: Linked Data client
///
/// Read and write RDF resources on a Linked Data server over
/// mutually-authenticated HTTPS.
#[derive(Parser)]
#[command(name = "ldc", version, about, long_about = None)]
struct Cli {
    /// PEM file holding the client certificate and its private key.
    #[arg(long, env = "LDC_CERT", value_name = "PATH", global = true)]
    cert: Option<PathBuf>,

    /// Password for an encrypted private key.
    #[arg(long, env = "LDC_CERT_PASSWORD", value_name = "PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Accept any server certificate (self-signed, wrong host, expired).
    #[arg(
        long,
        env = "LDC_INSECURE",
        global = true,
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    insecure: bool,

    /// Additional CA certificate (PEM) to trust. Repeatable.
    #[arg(long = "ca", env = "LDC_CA", value_name = "PATH", global = true)]
    extra_roots: Vec<PathBuf>,

    /// Whole-request timeout in seconds.
    #[arg(long, env = "LDC_TIMEOUT_SECS", value_name = "SECS", default_value_t = 30, global = true)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a resource and print it.
    ///
    /// Prints N-Triples on stdout and the triple count on stderr.
    Get {
        /// Absolute URL of the resource.
        url: String,

        /// Print a grouped, human-readable summary instead of N-Triples.
        #[arg(long)]
        summary: bool,
    },

    /// Create a resource by POSTing an N-Triples document to a container.
    ///
    /// Example:
    ///   ldc --cert agent.pem post https://localhost:4443/articles/ article.nt
    Post {
        /// Absolute URL of the container.
        url: String,
        /// Path to an N-Triples file, or `-` for stdin.
        file: PathBuf,
    },

    /// Replace a resource with an N-Triples document.
    Put {
        /// Absolute URL of the resource.
        url: String,
        /// Path to an N-Triples file, or `-` for stdin.
        file: PathBuf,
    },

    /// Delete a resource.
    Delete {
        /// Absolute URL of the resource.
        url: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ldc=info,linkeddata=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let client = match build_client(&cli) {
        Ok(c) => c,
        Err(e) => report(&e),
    };

    let result = match cli.command {
        Command::Get { url, summary } => client.fetch(&url).map(|graph| {
            eprintln!("Fetched {} triples", graph.len());
            if summary {
                print!("{}", render::render_graph(&graph));
            } else {
                match ntriples::serialize(&graph) {
                    Ok(text) => print!("{text}"),
                    Err(e) => fatal(5, &format!("failed to print graph: {e}")),
                }
            }
        }),
        Command::Post { url, file } => {
            let graph = read_graph(&file);
            client.create(&url, &graph).map(print_receipt)
        }
        Command::Put { url, file } => {
            let graph = read_graph(&file);
            client.replace(&url, &graph).map(print_receipt)
        }
        Command::Delete { url } => client.remove(&url).map(print_receipt),
    };

    if let Err(e) = result {
        report(&e);
    }
}

fn build_client(cli: &Cli) -> Result<LinkedDataClient, ClientError> {
    let Some(cert) = &cli.cert else {
        fatal(2, "no client certificate given; pass --cert or set LDC_CERT");
    };
    let mut config = ClientConfig::new(cert)
        .with_verify_tls(!cli.insecure)
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(pw) = &cli.password {
        config = config.with_password(pw);
    }
    for root in &cli.extra_roots {
        config = config.with_extra_root(root);
    }
    debug!(?config, "building client");
    LinkedDataClient::new(config)
}

fn print_receipt(receipt: Receipt) {
    match receipt.location {
        Some(location) => println!("{} {}", receipt.status, location),
        None => println!("{}", receipt.status),
    }
}

/// Read and parse an N-Triples document from a file, or stdin when the path is `"-"`.
fn read_graph(path: &PathBuf) -> Graph {
    let bytes = if path.to_str() == Some("-") {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .unwrap_or_else(|e| fatal(1, &format!("failed to read stdin: {}", e)));
        buf
    } else {
        fs::read(path)
            .unwrap_or_else(|e| fatal(1, &format!("failed to read {}: {}", path.display(), e)))
    };
    ntriples::parse(&bytes)
        .unwrap_or_else(|e| fatal(5, &format!("{} is not valid N-Triples: {}", path.display(), e)))
}

/// Exit code for each failure class.
fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Credential => 2,
        ErrorKind::Transport => 3,
        ErrorKind::HttpStatus => 4,
        ErrorKind::Parse => 5,
    }
}

/// Print a one-line diagnostic naming the failure class and exit.
fn report(err: &ClientError) -> ! {
    let mut msg = err.to_string();
    let mut source = std::error::Error::source(err);
    // Transport errors hide the useful part (refused, handshake, timeout) in the chain.
    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !msg.contains(&cause_msg) {
            msg.push_str(": ");
            msg.push_str(&cause_msg);
        }
        source = cause.source();
    }
    fatal(exit_code(err.kind()), &format!("{} error: {}", err.kind(), msg))
}

/// Print an error message to stderr and exit with `code`.
fn fatal(code: i32, msg: &str) -> ! {
    eprintln!("ldc: {}", msg);
    process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let codes = [
            exit_code(ErrorKind::Credential),
            exit_code(ErrorKind::Transport),
            exit_code(ErrorKind::HttpStatus),
            exit_code(ErrorKind::Parse),
        ];
        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn parses_get_with_global_flags() {
        let cli = Cli::try_parse_from([
            "ldc",
            "get",
            "https://localhost:4443/articles/",
            "--cert",
            "agent.pem",
            "--insecure",
            "--summary",
        ])
        .unwrap();
        assert!(cli.insecure);
        assert_eq!(cli.cert, Some(PathBuf::from("agent.pem")));
        assert!(matches!(cli.command, Command::Get { summary: true, .. }));
    }

    #[test]
    fn insecure_env_accepts_numeric_and_word_values() {
        let parse = || Cli::try_parse_from(["ldc", "delete", "https://localhost/c/1"]).unwrap();
        std::env::set_var("LDC_INSECURE", "1");
        assert!(parse().insecure);
        std::env::set_var("LDC_INSECURE", "yes");
        assert!(parse().insecure);
        std::env::set_var("LDC_INSECURE", "0");
        assert!(!parse().insecure);
        std::env::remove_var("LDC_INSECURE");
        assert!(!parse().insecure);
    }

    #[test]
    fn post_requires_a_file() {
        assert!(Cli::try_parse_from(["ldc", "post", "https://localhost/c/"]).is_err());
    }
}
