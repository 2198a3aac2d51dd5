//! N-Triples reading and writing.
//!
//! The grammar work is delegated to `rio_turtle`; this module converts
//! between its borrowed model and the owned [`Graph`] types, validating every
//! IRI, blank-node label and language tag on the way in.
//!
//! Output is one statement per line, `<s> <p> <o> .` followed by `\n`, in
//! the graph's iteration order. Blank-node labels are written and read back
//! unchanged, so `parse(serialize(g)) == g` holds without relabeling.

use std::io;

use rio_api::formatter::TriplesFormatter;
use rio_api::model as rio;
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesFormatter, NTriplesParser, TurtleError};
use thiserror::Error;

use crate::graph::Graph;
use crate::types::{xsd, BlankNode, Literal, NamedNode, Object, Subject, Triple};

/// The MIME type of N-Triples documents.
pub const MEDIA_TYPE: &str = "application/n-triples";

/// Errors produced while reading or writing N-Triples.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input does not follow the N-Triples grammar.
    #[error("invalid N-Triples: {0}")]
    Syntax(#[from] TurtleError),

    /// A term was syntactically present but is not a valid RDF term.
    #[error("invalid {kind} {value:?}: {reason}")]
    InvalidTerm {
        kind: &'static str,
        value: String,
        reason: String,
    },

    /// The input uses an extension this client does not model (e.g. RDF-star).
    #[error("unsupported N-Triples construct: {0}")]
    Unsupported(&'static str),

    /// Writing the serialized form failed.
    #[error("failed to write N-Triples: {0}")]
    Write(#[from] io::Error),
}

/// Parse an N-Triples document into a [`Graph`].
///
/// Empty or whitespace-only input yields an empty graph.
pub fn parse(input: &[u8]) -> Result<Graph, ParseError> {
    let mut graph = Graph::new();
    if input.iter().all(u8::is_ascii_whitespace) {
        return Ok(graph);
    }

    let mut parser = NTriplesParser::new(input);
    parser.parse_all(&mut |t: rio::Triple<'_>| -> Result<(), ParseError> {
        graph.insert(convert_triple(t)?);
        Ok(())
    })?;
    Ok(graph)
}

/// Serialize `graph` as an N-Triples document.
///
/// The result depends only on `graph`; an empty graph yields the empty string.
pub fn serialize(graph: &Graph) -> Result<String, ParseError> {
    let mut formatter = NTriplesFormatter::new(Vec::new());
    for triple in graph {
        formatter.format(&rio::Triple {
            subject: rio_subject(&triple.subject),
            predicate: rio::NamedNode {
                iri: triple.predicate.as_str(),
            },
            object: rio_object(&triple.object),
        })?;
    }
    let bytes = formatter.finish()?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

// --- rio -> owned ------------------------------------------------------------

fn convert_triple(t: rio::Triple<'_>) -> Result<Triple, ParseError> {
    Ok(Triple {
        subject: convert_subject(t.subject)?,
        predicate: named_node(t.predicate.iri)?,
        object: convert_object(t.object)?,
    })
}

fn convert_subject(s: rio::Subject<'_>) -> Result<Subject, ParseError> {
    match s {
        rio::Subject::NamedNode(n) => Ok(Subject::Iri(named_node(n.iri)?)),
        rio::Subject::BlankNode(b) => Ok(Subject::Blank(blank_node(b.id)?)),
        rio::Subject::Triple(_) => Err(ParseError::Unsupported("quoted triple as subject")),
    }
}

fn convert_object(o: rio::Term<'_>) -> Result<Object, ParseError> {
    match o {
        rio::Term::NamedNode(n) => Ok(Object::Iri(named_node(n.iri)?)),
        rio::Term::BlankNode(b) => Ok(Object::Blank(blank_node(b.id)?)),
        rio::Term::Literal(l) => Ok(Object::Literal(literal(l)?)),
        rio::Term::Triple(_) => Err(ParseError::Unsupported("quoted triple as object")),
    }
}

fn named_node(iri: &str) -> Result<NamedNode, ParseError> {
    NamedNode::new(iri).map_err(|e| ParseError::InvalidTerm {
        kind: "IRI",
        value: iri.to_string(),
        reason: e.to_string(),
    })
}

fn blank_node(id: &str) -> Result<BlankNode, ParseError> {
    BlankNode::new(id).map_err(|e| ParseError::InvalidTerm {
        kind: "blank node label",
        value: id.to_string(),
        reason: e.to_string(),
    })
}

fn literal(l: rio::Literal<'_>) -> Result<Literal, ParseError> {
    match l {
        rio::Literal::Simple { value } => Ok(Literal::new_simple_literal(value)),
        rio::Literal::LanguageTaggedString { value, language } => {
            Literal::new_language_tagged_literal(value, language).map_err(|e| {
                ParseError::InvalidTerm {
                    kind: "language tag",
                    value: language.to_string(),
                    reason: e.to_string(),
                }
            })
        }
        rio::Literal::Typed { value, datatype } => Ok(Literal::new_typed_literal(
            value,
            named_node(datatype.iri)?,
        )),
    }
}

// --- owned -> rio ------------------------------------------------------------

fn rio_subject(s: &Subject) -> rio::Subject<'_> {
    match s {
        Subject::Iri(n) => rio::Subject::NamedNode(rio::NamedNode { iri: n.as_str() }),
        Subject::Blank(b) => rio::Subject::BlankNode(rio::BlankNode { id: b.as_str() }),
    }
}

fn rio_object(o: &Object) -> rio::Term<'_> {
    match o {
        Object::Iri(n) => rio::Term::NamedNode(rio::NamedNode { iri: n.as_str() }),
        Object::Blank(b) => rio::Term::BlankNode(rio::BlankNode { id: b.as_str() }),
        Object::Literal(l) => rio::Term::Literal(rio_literal(l)),
    }
}

// Plain literals are xsd:string and are written without a datatype suffix.
fn rio_literal(l: &Literal) -> rio::Literal<'_> {
    if let Some(language) = l.language() {
        return rio::Literal::LanguageTaggedString {
            value: l.value(),
            language,
        };
    }
    let datatype = l.datatype();
    if datatype == xsd::STRING {
        rio::Literal::Simple { value: l.value() }
    } else {
        rio::Literal::Typed {
            value: l.value(),
            datatype: rio::NamedNode {
                iri: datatype.as_str(),
            },
        }
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(format!("http://example.org/{s}")).unwrap()
    }

    fn sample_graph() -> Graph {
        let article = BlankNode::new("article1").unwrap();
        [
            Triple::new(iri("feed"), iri("item"), article.clone()),
            Triple::new(
                article.clone(),
                iri("headline"),
                Literal::new_simple_literal("Quotes \"inside\"\nand a newline"),
            ),
            Triple::new(
                article.clone(),
                iri("title"),
                Literal::new_language_tagged_literal("Actualités", "fr").unwrap(),
            ),
            Triple::new(
                article,
                iri("wordCount"),
                Literal::new_typed_literal("420", NamedNode::from(xsd::INTEGER)),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn parses_every_term_form() {
        let doc = br#"
# a comment line
<http://example.org/s> <http://example.org/p> <http://example.org/o> .
_:b1 <http://example.org/p> "plain" .
_:b1 <http://example.org/p> "bonjour"@fr .
_:b1 <http://example.org/p> "7"^^<http://www.w3.org/2001/XMLSchema#integer> .
"#;
        let g = parse(doc).unwrap();
        assert_eq!(g.len(), 4);
        assert!(g.contains(&Triple::new(
            BlankNode::new("b1").unwrap(),
            iri("p"),
            Literal::new_language_tagged_literal("bonjour", "fr").unwrap(),
        )));
        assert!(g.contains(&Triple::new(
            BlankNode::new("b1").unwrap(),
            iri("p"),
            Literal::new_typed_literal("7", NamedNode::from(xsd::INTEGER)),
        )));
    }

    #[test]
    fn duplicate_lines_collapse() {
        let doc = b"<http://example.org/s> <http://example.org/p> \"x\" .\n\
                    <http://example.org/s> <http://example.org/p> \"x\" .\n";
        assert_eq!(parse(doc).unwrap().len(), 1);
    }

    #[test]
    fn unescapes_literals() {
        let doc = r#"<http://example.org/s> <http://example.org/p> "tab\there \u00E9" ."#;
        let g = parse(doc.as_bytes()).unwrap();
        let t = g.iter().next().unwrap();
        assert_eq!(
            t.object,
            Object::Literal(Literal::new_simple_literal("tab\there é"))
        );
    }

    #[test]
    fn empty_input_is_empty_graph() {
        assert!(parse(b"").unwrap().is_empty());
        assert!(parse(b"  \n\n\t").unwrap().is_empty());
        assert!(parse(b"# nothing but a comment\n").unwrap().is_empty());
    }

    #[test]
    fn missing_terminator_is_an_error() {
        let doc = b"<http://example.org/s> <http://example.org/p> <http://example.org/o>\n";
        assert!(matches!(parse(doc), Err(ParseError::Syntax(_))));
    }

    #[test]
    fn literal_subject_is_an_error() {
        let doc = b"\"lit\" <http://example.org/p> <http://example.org/o> .\n";
        assert!(parse(doc).is_err());
    }

    #[test]
    fn html_body_is_an_error() {
        assert!(parse(b"<!DOCTYPE html><html><body>Not Found</body></html>").is_err());
    }

    #[test]
    fn serializes_one_line_per_triple() {
        let out = serialize(&sample_graph()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.ends_with(" .")));
        assert!(out.ends_with('\n'));
        assert_eq!(
            lines[0],
            "<http://example.org/feed> <http://example.org/item> _:article1 ."
        );
        assert!(lines[2].ends_with("\"Actualités\"@fr ."));
        assert!(lines[3].ends_with("\"420\"^^<http://www.w3.org/2001/XMLSchema#integer> ."));
    }

    #[test]
    fn plain_literal_has_no_datatype_suffix() {
        let g: Graph = [Triple::new(
            iri("s"),
            iri("p"),
            Literal::new_simple_literal("x"),
        )]
        .into_iter()
        .collect();
        assert_eq!(
            serialize(&g).unwrap(),
            "<http://example.org/s> <http://example.org/p> \"x\" .\n"
        );
    }

    #[test]
    fn escapes_quotes_and_newlines() {
        let out = serialize(&sample_graph()).unwrap();
        assert!(out.contains(r#""Quotes \"inside\"\nand a newline""#));
    }

    #[test]
    fn round_trip_preserves_the_triple_set() {
        let g = sample_graph();
        let text = serialize(&g).unwrap();
        assert_eq!(parse(text.as_bytes()).unwrap(), g);
    }

    #[test]
    fn empty_graph_serializes_to_empty_string() {
        assert_eq!(serialize(&Graph::new()).unwrap(), "");
    }
}
