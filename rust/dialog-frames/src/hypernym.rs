//! Hypernym search for indirect semantic matches.
//!
//! A word rarely names the exact category a field asks for: "cat" does not
//! have the narrow category `animal`, but one of its ancestors does. The
//! search walks the is-a relation upward from a candidate sense until some
//! ancestor satisfies the filter or every path has reached a root.
//!
//! The hypernym graph is a DAG with multiple inheritance, so distinct paths
//! converge on shared ancestors (`dog → canine → carnivore` and
//! `dog → domestic_animal → animal`, both ending at `organism`). Every
//! top-level search remembers the shallowest depth at which it reached each
//! sense. Without a depth bound each sense is examined at most once; with
//! one, a sense is expanded again when a shorter path reaches it, so the
//! bound never hides an ancestor that some path reaches in time.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::trace;

use crate::filter::FieldFilter;
use crate::ontology::{Ontology, Sense, SenseId};

/// Upward search over an ontology's hypernym relation.
pub struct HypernymSearch<'a> {
    ontology: &'a dyn Ontology,
    max_depth: Option<usize>,
}

impl<'a> HypernymSearch<'a> {
    pub fn new(ontology: &'a dyn Ontology) -> Self {
        HypernymSearch {
            ontology,
            max_depth: None,
        }
    }

    /// Stop descending past `depth` hypernym links from the starting sense.
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Whether `sense` or any of its ancestors satisfies `filter`.
    pub fn search(&self, sense: &Sense, filter: &FieldFilter) -> bool {
        let mut visited = HashMap::new();
        self.visit(sense, filter, 0, &mut visited)
    }

    fn visit(
        &self,
        sense: &Sense,
        filter: &FieldFilter,
        depth: usize,
        visited: &mut HashMap<SenseId, usize>,
    ) -> bool {
        match visited.entry(sense.id.clone()) {
            Entry::Occupied(seen) if self.max_depth.is_none() || *seen.get() <= depth => {
                return false;
            }
            Entry::Occupied(mut seen) => {
                seen.insert(depth);
            }
            Entry::Vacant(slot) => {
                slot.insert(depth);
            }
        }
        trace!(sense = %sense.id, depth, "hypernym search step");

        if filter.sense_match(sense) {
            return true;
        }
        if self.max_depth.is_some_and(|max| depth >= max) {
            return false;
        }

        self.ontology
            .hypernyms(sense)
            .iter()
            .any(|parent| self.visit(parent, filter, depth + 1, visited))
    }
}
