//! RDF term and triple types.
//!
//! Subjects, predicates and objects are restricted to the positions the RDF
//! 1.1 abstract syntax allows them in: a [`Subject`] is an IRI or a blank
//! node, a predicate is always an IRI, and an [`Object`] may additionally be
//! a [`Literal`]. The leaf types are re-exported from `oxrdf`, which
//! validates IRIs, blank-node labels and language tags on construction.

use std::fmt;

pub use oxrdf::vocab::xsd;
pub use oxrdf::{BlankNode, Literal, NamedNode};

/// The subject position of a [`Triple`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    Iri(NamedNode),
    Blank(BlankNode),
}

/// The object position of a [`Triple`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Object {
    Iri(NamedNode),
    Blank(BlankNode),
    Literal(Literal),
}

/// A single `(subject, predicate, object)` statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: Subject,
    pub predicate: NamedNode,
    pub object: Object,
}

impl Triple {
    pub fn new(
        subject: impl Into<Subject>,
        predicate: NamedNode,
        object: impl Into<Object>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }
}

impl From<NamedNode> for Subject {
    fn from(node: NamedNode) -> Self {
        Subject::Iri(node)
    }
}

impl From<BlankNode> for Subject {
    fn from(node: BlankNode) -> Self {
        Subject::Blank(node)
    }
}

impl From<NamedNode> for Object {
    fn from(node: NamedNode) -> Self {
        Object::Iri(node)
    }
}

impl From<BlankNode> for Object {
    fn from(node: BlankNode) -> Self {
        Object::Blank(node)
    }
}

impl From<Literal> for Object {
    fn from(literal: Literal) -> Self {
        Object::Literal(literal)
    }
}

/// A subject can always stand in object position.
impl From<Subject> for Object {
    fn from(subject: Subject) -> Self {
        match subject {
            Subject::Iri(n) => Object::Iri(n),
            Subject::Blank(b) => Object::Blank(b),
        }
    }
}

/// Formats the term in N-Triples syntax (`<iri>` or `_:label`).
impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Iri(n) => write!(f, "{n}"),
            Subject::Blank(b) => write!(f, "{b}"),
        }
    }
}

/// Formats the term in N-Triples syntax, quoting and escaping literals.
impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Iri(n) => write!(f, "{n}"),
            Object::Blank(b) => write!(f, "{b}"),
            Object::Literal(l) => write!(f, "{l}"),
        }
    }
}

/// Formats the triple as one N-Triples statement, without the trailing newline.
impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_ntriples_syntax() {
        let t = Triple::new(
            NamedNode::new("http://example.org/s").unwrap(),
            NamedNode::new("http://example.org/p").unwrap(),
            Literal::new_language_tagged_literal("chat", "fr").unwrap(),
        );
        assert_eq!(
            t.to_string(),
            r#"<http://example.org/s> <http://example.org/p> "chat"@fr ."#
        );
    }

    #[test]
    fn subject_converts_to_object() {
        let b = BlankNode::new("b0").unwrap();
        assert_eq!(Object::from(Subject::from(b.clone())), Object::Blank(b));
    }

    #[test]
    fn invalid_iri_is_rejected() {
        assert!(NamedNode::new("not an iri").is_err());
    }
}
