//! Per-node pointer gestures: drag to reposition, click to select.
//!
//! # Responsibility
//! - Track one drag session per node, independent across nodes.
//! - Tell a click apart from a drag with a small movement threshold.
//!
//! # Invariants
//! - Every node gesture event reports `Propagation::Stop`, so background
//!   deselection never fires for that same event.
//! - Movement below the threshold never moves the node.
//! - Releasing the pointer always ends the session.
//! - The threshold is measured in screen pixels; positions are world units.

use crate::layout::{GraphNode, Point};
use crate::model::person::{Person, PersonId};
use log::{debug, info};
use std::collections::HashMap;

/// Screen-pixel movement needed before a press becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConfig {
    pub threshold: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DRAG_THRESHOLD,
        }
    }
}

/// Whether an event may continue to listeners below the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// What a single pointer event did.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Pointer went down; a session started.
    Pressed,
    /// Movement still within the click threshold.
    Suppressed,
    /// Node moved to the given world position.
    Moved(Point),
    /// Released without dragging: the node's person was selected.
    Selected(PersonId),
    /// Released after dragging: the position is kept until the next relayout.
    Committed(Point),
    /// No session was active for this node.
    Ignored,
}

/// Result of one node event.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEvent {
    pub outcome: GestureOutcome,
    pub propagation: Propagation,
}

impl NodeEvent {
    fn stopped(outcome: GestureOutcome) -> Self {
        Self {
            outcome,
            propagation: Propagation::Stop,
        }
    }
}

/// Gesture state of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging(DragSession),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pointer_start: Point,
    node_start: Point,
    /// Screen pixels per world unit when the press started.
    scale: f64,
    /// Sticky: once the threshold is crossed the gesture stays a drag.
    moved: bool,
}

impl DragSession {
    pub fn has_moved(&self) -> bool {
        self.moved
    }
}

/// Drag sessions keyed by node id.
#[derive(Debug, Clone, Default)]
pub struct NodeInteraction {
    config: DragConfig,
    sessions: HashMap<PersonId, DragSession>,
}

impl NodeInteraction {
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    pub fn state(&self, id: &PersonId) -> DragState {
        match self.sessions.get(id) {
            Some(session) => DragState::Dragging(*session),
            None => DragState::Idle,
        }
    }

    /// Drops every session, e.g. when a full relayout replaces the nodes.
    pub fn reset(&mut self) {
        self.sessions.clear();
    }

    /// `idle -> dragging`: records the pointer and node start positions.
    ///
    /// `pointer` is in screen pixels, `scale` is the current viewport scale.
    pub fn pointer_down(&mut self, node: &GraphNode, pointer: Point, scale: f64) -> NodeEvent {
        self.sessions.insert(
            node.id.clone(),
            DragSession {
                pointer_start: pointer,
                node_start: node.position(),
                scale: if scale > 0.0 { scale } else { 1.0 },
                moved: false,
            },
        );
        NodeEvent::stopped(GestureOutcome::Pressed)
    }

    /// Moves the node once the cumulative movement exceeds the threshold.
    pub fn pointer_move(&mut self, node: &mut GraphNode, pointer: Point) -> NodeEvent {
        let Some(session) = self.sessions.get_mut(&node.id) else {
            return NodeEvent::stopped(GestureOutcome::Ignored);
        };

        let dx = pointer.x - session.pointer_start.x;
        let dy = pointer.y - session.pointer_start.y;
        if dx.abs() > self.config.threshold || dy.abs() > self.config.threshold {
            session.moved = true;
        }
        if !session.moved {
            return NodeEvent::stopped(GestureOutcome::Suppressed);
        }

        let target = Point::new(
            session.node_start.x + dx / session.scale,
            session.node_start.y + dy / session.scale,
        );
        node.move_to(target);
        NodeEvent::stopped(GestureOutcome::Moved(target))
    }

    /// `dragging -> idle`: selects on a click, commits on a drag.
    pub fn pointer_up<F>(&mut self, node: &GraphNode, on_select: F) -> NodeEvent
    where
        F: FnOnce(&Person),
    {
        let Some(session) = self.sessions.remove(&node.id) else {
            return NodeEvent::stopped(GestureOutcome::Ignored);
        };

        if session.moved {
            info!(
                "event=node_drag_commit module=interaction status=ok person_id={}",
                node.id
            );
            return NodeEvent::stopped(GestureOutcome::Committed(node.position()));
        }

        debug!(
            "event=node_select module=interaction status=ok person_id={}",
            node.id
        );
        on_select(&node.person);
        NodeEvent::stopped(GestureOutcome::Selected(node.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::{DragState, GestureOutcome, NodeInteraction, Propagation};
    use crate::layout::{GraphNode, Point};
    use crate::model::person::{Gender, Person, PersonId};

    fn node(id: &str, x: f64, y: f64) -> GraphNode {
        GraphNode {
            id: PersonId::from(id),
            x,
            y,
            depth: 0,
            person: Person::with_id(PersonId::from(id), id, Gender::Male),
        }
    }

    #[test]
    fn small_jitter_is_a_click() {
        let mut interaction = NodeInteraction::default();
        let mut target = node("a", 10.0, 20.0);
        let mut selected = None;

        interaction.pointer_down(&target, Point::new(100.0, 100.0), 1.0);
        let moved = interaction.pointer_move(&mut target, Point::new(102.0, 97.0));
        assert_eq!(moved.outcome, GestureOutcome::Suppressed);
        assert_eq!(target.position(), Point::new(10.0, 20.0));

        let released = interaction.pointer_up(&target, |person| selected = Some(person.id.clone()));
        assert_eq!(released.outcome, GestureOutcome::Selected(PersonId::from("a")));
        assert_eq!(released.propagation, Propagation::Stop);
        assert_eq!(selected, Some(PersonId::from("a")));
        assert_eq!(interaction.state(&target.id), DragState::Idle);
    }

    #[test]
    fn crossing_threshold_drags_and_commits() {
        let mut interaction = NodeInteraction::default();
        let mut target = node("a", 10.0, 20.0);
        let mut selected = false;

        interaction.pointer_down(&target, Point::new(100.0, 100.0), 0.5);
        let moved = interaction.pointer_move(&mut target, Point::new(110.0, 100.0));
        assert_eq!(moved.outcome, GestureOutcome::Moved(Point::new(30.0, 20.0)));

        // Returning within the threshold still drags.
        let back = interaction.pointer_move(&mut target, Point::new(101.0, 100.0));
        assert_eq!(back.outcome, GestureOutcome::Moved(Point::new(12.0, 20.0)));

        let released = interaction.pointer_up(&target, |_| selected = true);
        assert_eq!(released.outcome, GestureOutcome::Committed(Point::new(12.0, 20.0)));
        assert!(!selected);
    }

    #[test]
    fn sessions_are_independent_per_node() {
        let mut interaction = NodeInteraction::default();
        let mut first = node("a", 0.0, 0.0);
        let mut second = node("b", 500.0, 0.0);

        interaction.pointer_down(&first, Point::new(0.0, 0.0), 1.0);
        interaction.pointer_down(&second, Point::new(500.0, 0.0), 1.0);
        interaction.pointer_move(&mut first, Point::new(50.0, 0.0));
        interaction.pointer_move(&mut second, Point::new(501.0, 0.0));

        assert_eq!(first.position(), Point::new(50.0, 0.0));
        assert_eq!(second.position(), Point::new(500.0, 0.0));

        let second_up = interaction.pointer_up(&second, |_| {});
        assert_eq!(second_up.outcome, GestureOutcome::Selected(PersonId::from("b")));
        assert!(matches!(interaction.state(&first.id), DragState::Dragging(session) if session.has_moved()));
    }

    #[test]
    fn events_without_session_are_ignored_but_stopped() {
        let mut interaction = NodeInteraction::default();
        let mut target = node("a", 0.0, 0.0);
        let moved = interaction.pointer_move(&mut target, Point::new(40.0, 40.0));
        assert_eq!(moved.outcome, GestureOutcome::Ignored);
        assert_eq!(moved.propagation, Propagation::Stop);
        assert_eq!(target.position(), Point::new(0.0, 0.0));
    }
}
