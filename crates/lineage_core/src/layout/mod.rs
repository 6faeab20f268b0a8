//! Hierarchical layout of the active family forest.
//!
//! # Responsibility
//! - Normalize the forest into one rooted tree (see [`forest`]).
//! - Place every person with a tidy-tree pass using a fixed node size.
//! - Derive parent-to-child connector curves for rendering.
//!
//! # Invariants
//! - Output contains exactly one node per active person and never the
//!   virtual root.
//! - Real roots report `depth = 0`, even when a virtual root was introduced.
//! - The same input always yields the same positions.

mod forest;
mod links;
mod tidy;

pub use forest::{normalize, NormalizedForest};
pub use links::{links, LinkPath, LINK_ANCHOR_OFFSET};

use crate::model::person::{generation_label, Person, PersonId};
use log::{info, warn};
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Horizontal world-unit distance between adjacent siblings.
pub const DEFAULT_NODE_DX: f64 = 280.0;
/// Vertical world-unit distance between generations.
pub const DEFAULT_NODE_DY: f64 = 400.0;

/// Fixed node spacing used by the layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub node_dx: f64,
    pub node_dy: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_dx: DEFAULT_NODE_DX,
            node_dy: DEFAULT_NODE_DY,
        }
    }
}

/// Planar point in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Positioned person produced by the layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: PersonId,
    pub x: f64,
    pub y: f64,
    /// Parent links from the person's true root.
    pub depth: usize,
    pub person: Person,
}

impl GraphNode {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn move_to(&mut self, point: Point) {
        self.x = point.x;
        self.y = point.y;
    }

    /// User-facing generation number (roots are generation 1).
    pub fn generation(&self) -> usize {
        generation_label(self.depth)
    }
}

/// Reasons a layout pass is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Nothing to lay out.
    EmptyForest,
    /// Two active people share one id.
    DuplicateId(PersonId),
    /// Every person has an active parent, so the parent links form a cycle.
    NoRoot { people: usize },
    /// Some people cannot be reached from any root.
    Cycle { unreachable: usize },
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyForest => write!(f, "no active people to lay out"),
            Self::DuplicateId(id) => write!(f, "duplicate person id in active set: {id}"),
            Self::NoRoot { people } => {
                write!(f, "no root found among {people} people; parent links form a cycle")
            }
            Self::Cycle { unreachable } => write!(
                f,
                "{unreachable} people are unreachable from any root; parent links form a cycle"
            ),
        }
    }
}

impl Error for LayoutError {}

impl LayoutError {
    fn log_status(&self) -> &'static str {
        match self {
            Self::EmptyForest => "skipped",
            Self::DuplicateId(_) | Self::NoRoot { .. } | Self::Cycle { .. } => "error",
        }
    }
}

/// Lays out the active set, one node per person, in breadth-first order.
///
/// # Errors
/// Returns the normalization failure unchanged; the caller keeps whatever it
/// displayed before.
pub fn layout(active: &[Person], config: LayoutConfig) -> Result<Vec<GraphNode>, LayoutError> {
    let started_at = Instant::now();
    let forest = match normalize(active) {
        Ok(forest) => forest,
        Err(err) => {
            warn!(
                "event=layout_pass module=layout status={} people={} duration_ms={} error={}",
                err.log_status(),
                active.len(),
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    };

    let placements = tidy::place(&forest);
    let depth_offset = usize::from(forest.has_virtual_root());

    let mut nodes = Vec::with_capacity(active.len());
    let mut queue = VecDeque::from([forest.root]);
    while let Some(slot) = queue.pop_front() {
        let arena_node = &forest.nodes[slot];
        queue.extend(arena_node.children.iter().copied());
        let Some(person) = arena_node.person else {
            continue;
        };
        let placement = placements[slot];
        nodes.push(GraphNode {
            id: person.id.clone(),
            x: placement.x * config.node_dx,
            y: placement.depth as f64 * config.node_dy,
            depth: placement.depth - depth_offset,
            person: person.clone(),
        });
    }

    info!(
        "event=layout_pass module=layout status=ok nodes={} roots={} virtual_root={} duration_ms={}",
        nodes.len(),
        forest.root_count(),
        forest.has_virtual_root(),
        started_at.elapsed().as_millis()
    );
    Ok(nodes)
}
