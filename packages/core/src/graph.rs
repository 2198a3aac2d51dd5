use indexmap::IndexSet;

use crate::types::{Object, Subject, Triple};

/// An in-memory RDF graph: a set of [`Triple`]s.
///
/// Inserting a triple that is already present is a no-op. Two graphs are
/// equal when they hold the same triples, regardless of the order they were
/// inserted in. Iteration follows insertion order, which is also the order
/// [`ntriples::serialize`](crate::ntriples::serialize) writes lines in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: IndexSet<Triple>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple. Returns `false` if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    /// Remove a triple. Returns `false` if it was not present.
    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.shift_remove(triple)
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Number of distinct triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Add every triple of `other` to this graph (set union).
    pub fn merge(&mut self, other: &Graph) {
        self.triples.extend(other.triples.iter().cloned());
    }

    /// Distinct subjects, in the order they were first seen.
    pub fn subjects(&self) -> Vec<&Subject> {
        let mut seen: IndexSet<&Subject> = IndexSet::new();
        for t in &self.triples {
            seen.insert(&t.subject);
        }
        seen.into_iter().collect()
    }

    /// Triples whose subject is `subject` (outgoing edges).
    pub fn outgoing(&self, subject: &Subject) -> Vec<&Triple> {
        self.triples
            .iter()
            .filter(|t| &t.subject == subject)
            .collect()
    }

    /// Triples whose object is `node` (incoming edges).
    pub fn incoming(&self, node: &Object) -> Vec<&Triple> {
        self.triples.iter().filter(|t| &t.object == node).collect()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = indexmap::set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = indexmap::set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

// --- tests -------------------------------------------------------------------
