use super::PeopleIndex;
use crate::model::person::{Person, PersonId};
use std::collections::{HashMap, HashSet};

/// Lowest common ancestor of two people with the generation distances to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonAncestor {
    pub id: PersonId,
    /// Parent links from the center person up to the ancestor.
    pub up: usize,
    /// Parent links from the ancestor down to the target person.
    pub down: usize,
}

/// Ordered ancestor ids, starting with `person.id` itself.
///
/// The walk stops at a missing parent, a parent outside `active`, or an id
/// that was already visited.
pub fn ancestry_path(person: &Person, active: &[Person]) -> Vec<PersonId> {
    trace_path(person, &PeopleIndex::new(active))
}

pub(crate) fn trace_path(person: &Person, index: &PeopleIndex<'_>) -> Vec<PersonId> {
    let mut path = vec![person.id.clone()];
    let mut visited: HashSet<&PersonId> = HashSet::from([&person.id]);
    let mut cursor = person;
    while let Some(parent) = cursor.parent_id.as_ref().and_then(|id| index.get(id)) {
        if !visited.insert(&parent.id) {
            log::warn!(
                "event=ancestry_cycle module=kinship status=skipped person_id={} repeated_id={}",
                person.id,
                parent.id
            );
            break;
        }
        path.push(parent.id.clone());
        cursor = parent;
    }
    path
}

/// Finds the first id on the center's path that also lies on the target's path.
pub fn lowest_common_ancestor(
    target: &Person,
    center: &Person,
    active: &[Person],
) -> Option<CommonAncestor> {
    let index = PeopleIndex::new(active);
    find_common_ancestor(target, center, &index)
}

pub(crate) fn find_common_ancestor(
    target: &Person,
    center: &Person,
    index: &PeopleIndex<'_>,
) -> Option<CommonAncestor> {
    let center_path = trace_path(center, index);
    let target_path = trace_path(target, index);
    let target_positions: HashMap<&PersonId, usize> = target_path
        .iter()
        .enumerate()
        .map(|(position, id)| (id, position))
        .collect();

    center_path
        .iter()
        .enumerate()
        .find_map(|(up, id)| {
            target_positions.get(id).map(|&down| CommonAncestor {
                id: id.clone(),
                up,
                down,
            })
        })
}
