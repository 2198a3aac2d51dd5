//! Human-readable text rendering of a [`Graph`].
//!
//! This is a terminal view, not a serialization: it groups statements by
//! subject and may abbreviate. Use [`ntriples::serialize`](crate::ntriples::serialize)
//! for anything a program will read back.

use crate::graph::Graph;
use crate::types::{xsd, Literal, Object};

/// Render a graph as a summary grouped by subject.
///
/// ```text
/// Graph  3 triples, 2 subjects
/// ────────────────────────────
///
/// <https://localhost:4443/articles/1/>
///   <http://schema.org/headline>  "SPARQL 1.2 draft published"@en
///   <http://schema.org/about>  _:topic
///
/// _:topic
///   <http://schema.org/name>  "SPARQL"
/// ```
pub fn render_graph(graph: &Graph) -> String {
    let total = graph.len();
    let subjects = graph.subjects();
    let header = format!(
        "Graph  {} triple{}, {} subject{}",
        total,
        plural(total),
        subjects.len(),
        plural(subjects.len())
    );
    let rule = "─".repeat(header.chars().count());

    let mut out = format!("{}\n{}\n", header, rule);

    for subject in subjects {
        out.push('\n');
        out.push_str(&subject.to_string());
        out.push('\n');
        for t in graph.outgoing(subject) {
            out.push_str(&format!("  {}  {}\n", t.predicate, render_object(&t.object)));
        }
    }

    out
}

// --- helpers -----------------------------------------------------------------

fn render_object(object: &Object) -> String {
    match object {
        Object::Literal(l) if l.value().chars().count() > 72 => {
            let mut short: String = l.value().chars().take(71).collect();
            short.push('…');
            let short = short.replace('\n', " ");
            // Same suffix as the full literal; Display handles the escaping.
            let abbreviated = match l.language() {
                Some(lang) => Literal::new_language_tagged_literal_unchecked(short, lang),
                None if l.datatype() == xsd::STRING => Literal::new_simple_literal(short),
                None => Literal::new_typed_literal(short, l.datatype()),
            };
            abbreviated.to_string()
        }
        other => other.to_string(),
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

// --- tests -------------------------------------------------------------------
