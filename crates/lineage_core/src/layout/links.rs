use super::{GraphNode, Point};
use crate::model::person::PersonId;
use std::collections::HashMap;

/// Vertical distance from a node centre to its connector anchor.
pub const LINK_ANCHOR_OFFSET: f64 = 110.0;

/// Cubic Bézier connector from a parent's bottom edge to a child's top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPath {
    pub parent_id: PersonId,
    pub child_id: PersonId,
    pub start: Point,
    pub control_start: Point,
    pub control_end: Point,
    pub end: Point,
}

impl LinkPath {
    /// SVG path data (`M .. C ..`) for the connector.
    pub fn svg_path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x,
            self.start.y,
            self.control_start.x,
            self.control_start.y,
            self.control_end.x,
            self.control_end.y,
            self.end.x,
            self.end.y
        )
    }
}

/// Connectors for every node whose parent is also in `nodes`.
///
/// Uses current node positions, so dragged nodes keep their connectors.
pub fn links(nodes: &[GraphNode]) -> Vec<LinkPath> {
    let by_id: HashMap<&PersonId, &GraphNode> = nodes.iter().map(|node| (&node.id, node)).collect();

    nodes
        .iter()
        .filter_map(|child| {
            let parent = by_id.get(child.person.parent_id.as_ref()?)?;
            let start = Point::new(parent.x, parent.y + LINK_ANCHOR_OFFSET);
            let end = Point::new(child.x, child.y - LINK_ANCHOR_OFFSET);
            let bend = (end.y - start.y) * 0.5;
            Some(LinkPath {
                parent_id: parent.id.clone(),
                child_id: child.id.clone(),
                start,
                control_start: Point::new(start.x, start.y + bend),
                control_end: Point::new(end.x, end.y - bend),
                end,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::links;
    use crate::layout::GraphNode;
    use crate::model::person::{Gender, Person, PersonId};

    fn node(id: &str, parent: Option<&str>, x: f64, y: f64) -> GraphNode {
        let mut person = Person::with_id(PersonId::from(id), id, Gender::Male);
        person.parent_id = parent.map(PersonId::from);
        GraphNode {
            id: person.id.clone(),
            x,
            y,
            depth: 0,
            person,
        }
    }

    #[test]
    fn connector_runs_between_anchor_points() {
        let nodes = vec![node("p", None, 0.0, 0.0), node("c", Some("p"), 140.0, 400.0)];
        let paths = links(&nodes);
        assert_eq!(paths.len(), 1);
        let path = &paths[0];
        assert_eq!((path.start.x, path.start.y), (0.0, 110.0));
        assert_eq!((path.end.x, path.end.y), (140.0, 290.0));
        assert_eq!(path.control_start.y, 200.0);
        assert_eq!(path.control_end.y, 200.0);
        assert_eq!(path.svg_path(), "M 0 110 C 0 200, 140 200, 140 290");
    }

    #[test]
    fn missing_parent_node_produces_no_connector() {
        let nodes = vec![node("c", Some("gone"), 0.0, 0.0)];
        assert!(links(&nodes).is_empty());
    }
}
