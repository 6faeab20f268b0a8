//! Kinship-term inference over single-parent lineages.
//!
//! # Responsibility
//! - Trace ancestry paths and locate the lowest common ancestor of two people.
//! - Classify the pair by generation distance and render a kinship term.
//!
//! # Invariants
//! - Every function here is pure: inputs are borrowed and never mutated.
//! - Results depend only on parent links and birth dates, never on the order
//!   of the active set.
//! - A repeated id ends an ancestry walk, so cyclic data cannot hang a query.

mod ancestry;
mod label;
mod rank;

pub use ancestry::{ancestry_path, lowest_common_ancestor, CommonAncestor};
pub use label::{
    label_by_id, relationship, relationship_label, relationship_label_with, Kinship, Vocabulary,
};
pub use rank::sibling_rank;

use crate::model::person::{Person, PersonId};
use std::collections::HashMap;

/// Id lookup over one active set.
pub(crate) struct PeopleIndex<'a> {
    people: &'a [Person],
    by_id: HashMap<&'a PersonId, &'a Person>,
}

impl<'a> PeopleIndex<'a> {
    pub(crate) fn new(people: &'a [Person]) -> Self {
        let by_id = people.iter().map(|person| (&person.id, person)).collect();
        Self { people, by_id }
    }

    pub(crate) fn get(&self, id: &PersonId) -> Option<&'a Person> {
        self.by_id.get(id).copied()
    }

    pub(crate) fn people(&self) -> &'a [Person] {
        self.people
    }
}
