//! Buchheim–Jünger–Leipert tidy tree placement over the normalized arena.
//!
//! Coordinates come out in separation units: siblings sit one unit apart,
//! neighbouring subtrees from different parents two units apart. The root is
//! placed at x = 0 and the caller scales x and depth by the node size.

use super::forest::NormalizedForest;

/// Per-slot working state of the placement walks.
#[derive(Debug, Clone)]
struct TidyNode {
    parent: Option<usize>,
    children: Vec<usize>,
    /// Index among the parent's ordered children.
    number: usize,
    depth: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    ancestor: usize,
    /// Default ancestor carried between sibling apportion calls.
    default_ancestor: Option<usize>,
}

/// Final placement of one arena slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Placement {
    pub(crate) x: f64,
    pub(crate) depth: usize,
}

pub(crate) fn place(forest: &NormalizedForest<'_>) -> Vec<Placement> {
    let mut nodes: Vec<TidyNode> = (0..forest.nodes.len())
        .map(|slot| TidyNode {
            parent: None,
            children: forest.nodes[slot].children.clone(),
            number: 0,
            depth: 0,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            ancestor: slot,
            default_ancestor: None,
        })
        .collect();

    let pre_order = pre_order(forest.root, &mut nodes);
    for &v in pre_order.iter().rev() {
        first_walk(v, &mut nodes);
    }

    let root = forest.root;
    let root_modifier = -nodes[root].prelim;
    let mut x = vec![0.0; nodes.len()];
    for &v in &pre_order {
        let parent_modifier = match nodes[v].parent {
            Some(parent) => nodes[parent].modifier,
            None => root_modifier,
        };
        x[v] = nodes[v].prelim + parent_modifier;
        nodes[v].modifier += parent_modifier;
    }

    nodes
        .iter()
        .enumerate()
        .map(|(slot, node)| Placement {
            x: x[slot],
            depth: node.depth,
        })
        .collect()
}

/// Fills parent/number/depth links and returns slots in right-first pre-order.
///
/// Reversed, this order visits every subtree before its parent and every left
/// sibling's subtree before its right sibling, as the first walk requires.
fn pre_order(root: usize, nodes: &mut [TidyNode]) -> Vec<usize> {
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack = vec![root];
    while let Some(v) = stack.pop() {
        order.push(v);
        let children = nodes[v].children.clone();
        for (number, &child) in children.iter().enumerate() {
            nodes[child].parent = Some(v);
            nodes[child].number = number;
            nodes[child].depth = nodes[v].depth + 1;
        }
        stack.extend(children.iter());
    }
    order
}

fn first_walk(v: usize, nodes: &mut [TidyNode]) {
    let left_sibling = left_sibling(v, nodes);

    if let (Some(&first), Some(&last)) = (nodes[v].children.first(), nodes[v].children.last()) {
        execute_shifts(v, nodes);
        let midpoint = (nodes[first].prelim + nodes[last].prelim) / 2.0;
        match left_sibling {
            Some(w) => {
                nodes[v].prelim = nodes[w].prelim + separation(v, w, nodes);
                nodes[v].modifier = nodes[v].prelim - midpoint;
            }
            None => nodes[v].prelim = midpoint,
        }
    } else if let Some(w) = left_sibling {
        nodes[v].prelim = nodes[w].prelim + separation(v, w, nodes);
    }

    if let Some(parent) = nodes[v].parent {
        let default_ancestor = nodes[parent]
            .default_ancestor
            .unwrap_or(nodes[parent].children[0]);
        nodes[parent].default_ancestor = Some(apportion(v, left_sibling, default_ancestor, nodes));
    }
}

fn apportion(
    v: usize,
    left_sibling: Option<usize>,
    mut default_ancestor: usize,
    nodes: &mut [TidyNode],
) -> usize {
    let Some(w) = left_sibling else {
        return default_ancestor;
    };
    let Some(parent) = nodes[v].parent else {
        return default_ancestor;
    };

    // inner/outer contours: "i" faces the gap between w and v, "o" the outside.
    let mut vop = v;
    let mut vom = nodes[parent].children[0];
    let mut sip = nodes[v].modifier;
    let mut sop = nodes[vop].modifier;
    let mut sim = nodes[w].modifier;
    let mut som = nodes[vom].modifier;

    let mut vim_next = next_right(w, nodes);
    let mut vip_next = next_left(v, nodes);
    while let (Some(vim), Some(vip)) = (vim_next, vip_next) {
        vom = next_left(vom, nodes).unwrap_or(vom);
        vop = next_right(vop, nodes).unwrap_or(vop);
        nodes[vop].ancestor = v;

        let shift =
            nodes[vim].prelim + sim - nodes[vip].prelim - sip + separation(vim, vip, nodes);
        if shift > 0.0 {
            let from = next_ancestor(vim, v, default_ancestor, nodes);
            move_subtree(from, v, shift, nodes);
            sip += shift;
            sop += shift;
        }

        sim += nodes[vim].modifier;
        sip += nodes[vip].modifier;
        som += nodes[vom].modifier;
        sop += nodes[vop].modifier;

        vim_next = next_right(vim, nodes);
        vip_next = next_left(vip, nodes);
    }

    if let Some(vim) = vim_next {
        if next_right(vop, nodes).is_none() {
            nodes[vop].thread = Some(vim);
            nodes[vop].modifier += sim - sop;
        }
    }
    if let Some(vip) = vip_next {
        if next_left(vom, nodes).is_none() {
            nodes[vom].thread = Some(vip);
            nodes[vom].modifier += sip - som;
            default_ancestor = v;
        }
    }
    default_ancestor
}

fn execute_shifts(v: usize, nodes: &mut [TidyNode]) {
    let mut shift = 0.0;
    let mut change = 0.0;
    let children = nodes[v].children.clone();
    for &w in children.iter().rev() {
        nodes[w].prelim += shift;
        nodes[w].modifier += shift;
        change += nodes[w].change;
        shift += nodes[w].shift + change;
    }
}

fn move_subtree(wm: usize, wp: usize, shift: f64, nodes: &mut [TidyNode]) {
    let subtrees = nodes[wp].number.saturating_sub(nodes[wm].number).max(1) as f64;
    let change = shift / subtrees;
    nodes[wp].change -= change;
    nodes[wp].shift += shift;
    nodes[wm].change += change;
    nodes[wp].prelim += shift;
    nodes[wp].modifier += shift;
}

fn next_ancestor(vim: usize, v: usize, default_ancestor: usize, nodes: &[TidyNode]) -> usize {
    let candidate = nodes[vim].ancestor;
    if nodes[candidate].parent == nodes[v].parent {
        candidate
    } else {
        default_ancestor
    }
}

fn left_sibling(v: usize, nodes: &[TidyNode]) -> Option<usize> {
    let parent = nodes[v].parent?;
    let number = nodes[v].number;
    if number == 0 {
        return None;
    }
    nodes[parent].children.get(number - 1).copied()
}

fn next_left(v: usize, nodes: &[TidyNode]) -> Option<usize> {
    nodes[v].children.first().copied().or(nodes[v].thread)
}

fn next_right(v: usize, nodes: &[TidyNode]) -> Option<usize> {
    nodes[v].children.last().copied().or(nodes[v].thread)
}

/// Siblings one unit apart, cousins and beyond two.
fn separation(a: usize, b: usize, nodes: &[TidyNode]) -> f64 {
    if nodes[a].parent == nodes[b].parent {
        1.0
    } else {
        2.0
    }
}
