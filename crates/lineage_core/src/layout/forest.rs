//! Forest-to-tree normalization.
//!
//! # Responsibility
//! - Turn a possibly multi-root active set into one rooted arena tree.
//! - Apply the per-parent child ordering used by the layout pass.
//!
//! # Invariants
//! - A parent id that is missing from the active set makes its child a root.
//! - The virtual root exists only inside this arena; it never reaches callers
//!   as a person.
//! - Every person must be reachable from the root, otherwise the forest is
//!   rejected as cyclic.

use super::LayoutError;
use crate::model::person::{Person, PersonId};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// One arena slot. `person == None` marks the virtual root.
#[derive(Debug)]
pub(crate) struct ForestNode<'a> {
    pub(crate) person: Option<&'a Person>,
    pub(crate) children: Vec<usize>,
}

/// Rooted view over an active set, ready for tree layout.
#[derive(Debug)]
pub struct NormalizedForest<'a> {
    pub(crate) nodes: Vec<ForestNode<'a>>,
    pub(crate) root: usize,
    root_count: usize,
}

impl<'a> NormalizedForest<'a> {
    /// Number of true roots found in the active set.
    pub fn root_count(&self) -> usize {
        self.root_count
    }

    /// Whether a virtual root was introduced to join several roots.
    pub fn has_virtual_root(&self) -> bool {
        self.root_count > 1
    }

    /// Ids of the true roots in layout order.
    pub fn root_ids(&self) -> Vec<&'a PersonId> {
        let root = &self.nodes[self.root];
        match root.person {
            Some(person) => vec![&person.id],
            None => root
                .children
                .iter()
                .filter_map(|&child| self.nodes[child].person.map(|person| &person.id))
                .collect(),
        }
    }

    /// Ordered child ids of one person.
    pub fn children_of(&self, id: &PersonId) -> Vec<&'a PersonId> {
        self.nodes
            .iter()
            .find(|node| node.person.is_some_and(|person| &person.id == id))
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|&child| self.nodes[child].person.map(|person| &person.id))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Builds a single rooted tree from the active set.
///
/// # Errors
/// - `LayoutError::EmptyForest` when `active` is empty.
/// - `LayoutError::DuplicateId` when two people share an id.
/// - `LayoutError::NoRoot` when every person has an active parent.
/// - `LayoutError::Cycle` when some people are unreachable from the roots.
pub fn normalize(active: &[Person]) -> Result<NormalizedForest<'_>, LayoutError> {
    if active.is_empty() {
        return Err(LayoutError::EmptyForest);
    }

    let mut slots: HashMap<&PersonId, usize> = HashMap::with_capacity(active.len());
    for (slot, person) in active.iter().enumerate() {
        if slots.insert(&person.id, slot).is_some() {
            return Err(LayoutError::DuplicateId(person.id.clone()));
        }
    }

    let mut nodes: Vec<ForestNode<'_>> = active
        .iter()
        .map(|person| ForestNode {
            person: Some(person),
            children: Vec::new(),
        })
        .collect();

    let mut roots = Vec::new();
    for (slot, person) in active.iter().enumerate() {
        match person.parent_id.as_ref().and_then(|id| slots.get(id)) {
            Some(&parent_slot) => nodes[parent_slot].children.push(slot),
            None => roots.push(slot),
        }
    }

    if roots.is_empty() {
        return Err(LayoutError::NoRoot {
            people: active.len(),
        });
    }

    let root_count = roots.len();
    let root = if root_count == 1 {
        roots[0]
    } else {
        nodes.push(ForestNode {
            person: None,
            children: roots,
        });
        nodes.len() - 1
    };

    for slot in 0..nodes.len() {
        let mut children = std::mem::take(&mut nodes[slot].children);
        order_children(&mut children, &nodes);
        nodes[slot].children = children;
    }

    let reachable = count_reachable(&nodes, root);
    if reachable < nodes.len() {
        return Err(LayoutError::Cycle {
            unreachable: nodes.len() - reachable,
        });
    }

    Ok(NormalizedForest {
        nodes,
        root,
        root_count,
    })
}

/// Orders one sibling group: daughters split around the sons.
///
/// Each gender partition is sorted by birth date; the result is
/// `[first half of females, all males, second half of females]`. Anyone not
/// recorded as male is placed with the females.
fn order_children(children: &mut Vec<usize>, nodes: &[ForestNode<'_>]) {
    if children.len() < 2 {
        return;
    }

    let person_at = |slot: usize| nodes[slot].person;
    let (mut males, mut females): (Vec<usize>, Vec<usize>) = children
        .iter()
        .copied()
        .partition(|&slot| person_at(slot).is_some_and(Person::is_male));

    let by_birth = |left: &usize, right: &usize| -> Ordering {
        match (person_at(*left), person_at(*right)) {
            (Some(left), Some(right)) => left.cmp_birth(right),
            _ => Ordering::Equal,
        }
    };
    males.sort_by(by_birth);
    females.sort_by(by_birth);

    let half = females.len() / 2;
    let trailing = females.split_off(half);
    children.clear();
    children.extend(females);
    children.extend(males);
    children.extend(trailing);
}

fn count_reachable(nodes: &[ForestNode<'_>], root: usize) -> usize {
    let mut seen = HashSet::from([root]);
    let mut stack = vec![root];
    while let Some(slot) = stack.pop() {
        for &child in &nodes[slot].children {
            if seen.insert(child) {
                stack.push(child);
            }
        }
    }
    seen.len()
}
