//! Family graph controller: owned layout, camera and gesture state.
//!
//! # Responsibility
//! - Keep the active person set, its laid-out nodes and the viewport in one
//!   owned store mutated only through the methods below.
//! - Route per-node pointer gestures and background clicks.
//!
//! # Invariants
//! - A full relayout resets every node to its algorithmic position.
//! - A failed layout pass leaves people, selection and nodes untouched.
//! - A node gesture stops propagation of its own pointer event only.
//! - Nothing is laid out until the view has a non-zero size.

use crate::interaction::{DragConfig, GestureOutcome, NodeEvent, NodeInteraction, Propagation};
use crate::kinship::{label_by_id, Vocabulary};
use crate::layout::{layout, links, GraphNode, LayoutConfig, LayoutError, LinkPath, Point};
use crate::model::person::{Person, PersonId};
use crate::viewport::{Transition, Viewport, ViewportConfig};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Rendered node width without a spouse column.
pub const NODE_WIDTH: f64 = 120.0;
/// Rendered node width when the spouse name is shown beside the person.
pub const NODE_WIDTH_WITH_SPOUSE: f64 = 200.0;
pub const NODE_HEIGHT: f64 = 220.0;

/// Interactive family diagram state.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    layout_config: LayoutConfig,
    people: Vec<Person>,
    nodes: Vec<GraphNode>,
    index: HashMap<PersonId, usize>,
    viewport: Viewport,
    width: f64,
    height: f64,
    interaction: NodeInteraction,
    selected: Option<PersonId>,
}

impl FamilyGraph {
    pub fn new(
        layout_config: LayoutConfig,
        viewport_config: ViewportConfig,
        drag_config: DragConfig,
    ) -> Self {
        Self {
            layout_config,
            viewport: Viewport::new(viewport_config),
            interaction: NodeInteraction::new(drag_config),
            ..Self::default()
        }
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// Laid-out nodes in breadth-first order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn node(&self, id: &PersonId) -> Option<&GraphNode> {
        self.index.get(id).map(|slot| &self.nodes[*slot])
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Direct camera access for pan/zoom gestures and animation ticks.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn selected(&self) -> Option<&PersonId> {
        self.selected.as_ref()
    }

    pub fn select(&mut self, id: Option<PersonId>) {
        self.selected = id;
    }

    /// Connectors between the current node positions.
    pub fn links(&self) -> Vec<LinkPath> {
        links(&self.nodes)
    }

    /// Replaces the active set and runs a full relayout with auto-fit.
    ///
    /// On error the previous people, selection and nodes stay in place.
    pub fn set_people(&mut self, active: Vec<Person>) -> Result<Option<Transition>, LayoutError> {
        let nodes = self.layout_nodes(&active)?;
        self.people = active;
        self.drop_stale_selection();
        Ok(self.commit_nodes(nodes))
    }

    /// Updates the view size; a changed size triggers a full relayout.
    pub fn set_dimensions(
        &mut self,
        width: f64,
        height: f64,
    ) -> Result<Option<Transition>, LayoutError> {
        if self.width == width && self.height == height {
            return Ok(None);
        }
        self.width = width;
        self.height = height;
        let nodes = self.layout_nodes(&self.people)?;
        Ok(self.commit_nodes(nodes))
    }

    /// Data-only update.
    ///
    /// With an identical id set the nodes keep their (possibly dragged)
    /// positions and only their person records change. Any other change falls
    /// back to a full relayout.
    pub fn refresh_people(
        &mut self,
        active: Vec<Person>,
    ) -> Result<Option<Transition>, LayoutError> {
        let current: HashSet<&PersonId> = self.nodes.iter().map(|node| &node.id).collect();
        let incoming: HashSet<&PersonId> = active.iter().map(|person| &person.id).collect();
        let same_ids =
            !self.nodes.is_empty() && current.len() == active.len() && current == incoming;
        if !same_ids {
            return self.set_people(active);
        }

        for person in &active {
            if let Some(slot) = self.index.get(&person.id) {
                self.nodes[*slot].person = person.clone();
            }
        }
        self.people = active;
        debug!(
            "event=graph_refresh module=graph status=ok nodes={}",
            self.nodes.len()
        );
        Ok(None)
    }

    /// Re-runs auto-fit over the current positions without relayout.
    pub fn recenter(&mut self) -> Option<Transition> {
        self.viewport.auto_fit(&self.nodes, self.width, self.height)
    }

    /// Topmost node whose box contains the screen point.
    pub fn node_at(&self, screen: Point) -> Option<&PersonId> {
        let world = self.viewport.transform().invert(screen);
        self.nodes
            .iter()
            .rev()
            .find(|node| {
                let half_width = node_width(&node.person) / 2.0;
                let half_height = NODE_HEIGHT / 2.0;
                (world.x - node.x).abs() <= half_width && (world.y - node.y).abs() <= half_height
            })
            .map(|node| &node.id)
    }

    /// Starts a gesture on `id`; `pointer` is in screen pixels.
    pub fn pointer_down(&mut self, id: &PersonId, pointer: Point) -> Option<NodeEvent> {
        let slot = *self.index.get(id)?;
        let scale = self.viewport.transform().k;
        let event = self
            .interaction
            .pointer_down(&self.nodes[slot], pointer, scale);
        Some(event)
    }

    pub fn pointer_move(&mut self, id: &PersonId, pointer: Point) -> Option<NodeEvent> {
        let slot = *self.index.get(id)?;
        let event = self
            .interaction
            .pointer_move(&mut self.nodes[slot], pointer);
        Some(event)
    }

    /// Ends a gesture; a click selects the node and calls `on_select`.
    pub fn pointer_up<F>(&mut self, id: &PersonId, on_select: F) -> Option<NodeEvent>
    where
        F: FnOnce(&Person),
    {
        let slot = *self.index.get(id)?;
        let event = self.interaction.pointer_up(&self.nodes[slot], on_select);
        if let GestureOutcome::Selected(selected) = &event.outcome {
            self.selected = Some(selected.clone());
        }
        Some(event)
    }

    /// Click that reached the background layer.
    ///
    /// `node_event` is what the node handlers returned for the same pointer
    /// event, if the pointer was over a node. A stopped event leaves the
    /// selection alone; anything else clears it. Returns whether the selection
    /// was cleared.
    pub fn background_click(&mut self, node_event: Option<&NodeEvent>) -> bool {
        if node_event.is_some_and(|event| event.propagation == Propagation::Stop) {
            return false;
        }
        self.selected = None;
        true
    }

    /// Kinship label of every other node as seen from `center_id`.
    ///
    /// Unrelated nodes are left out.
    pub fn labels_for(
        &self,
        center_id: &PersonId,
        vocabulary: Vocabulary,
    ) -> Vec<(PersonId, String)> {
        self.nodes
            .iter()
            .filter(|node| &node.id != center_id)
            .filter_map(|node| {
                label_by_id(&node.id, center_id, &self.people, vocabulary)
                    .map(|label| (node.id.clone(), label))
            })
            .collect()
    }

    /// `None` while the view has no size.
    fn layout_nodes(&self, people: &[Person]) -> Result<Option<Vec<GraphNode>>, LayoutError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Ok(None);
        }
        if people.is_empty() {
            return Ok(Some(Vec::new()));
        }
        layout(people, self.layout_config).map(Some)
    }

    fn commit_nodes(&mut self, nodes: Option<Vec<GraphNode>>) -> Option<Transition> {
        let nodes = nodes?;
        let empty = nodes.is_empty();
        self.install_nodes(nodes);
        if empty {
            return None;
        }
        self.recenter()
    }

    fn install_nodes(&mut self, nodes: Vec<GraphNode>) {
        self.index = nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.id.clone(), slot))
            .collect();
        self.nodes = nodes;
        self.interaction.reset();
    }

    fn drop_stale_selection(&mut self) {
        let still_active = self
            .selected
            .as_ref()
            .is_some_and(|id| self.people.iter().any(|person| &person.id == id));
        if !still_active {
            self.selected = None;
        }
    }
}

fn node_width(person: &Person) -> f64 {
    if person.spouse_name.is_some() {
        NODE_WIDTH_WITH_SPOUSE
    } else {
        NODE_WIDTH
    }
}
