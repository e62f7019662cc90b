use crate::error::{Result, TracerError};
use crate::layout::{self, CycleLayering, Position};
use crate::log_buffer::LogBuffer;
use crate::step::{GraphEdge, GraphNode, Step, Visual};
use crate::value::NodeId;
use std::collections::HashMap;

type EdgeKey = (NodeId, NodeId);

#[derive(Debug, Clone)]
struct NodeOverlay {
    label: String,
    selected: bool,
    patched: bool,
    error: bool,
    color: String,
    badge: String,
    badge_color: String,
    group: Option<i64>,
    position: Position,
}

#[derive(Debug, Clone, Default)]
struct EdgeOverlay {
    selected: bool,
    patched: bool,
    error: bool,
    weight: Option<f64>,
    label: String,
    edge_class: String,
    curve_offset: f64,
}

/// Mutable graph of node and edge overlay state.
///
/// Nodes are fixed at construction and their order is the order frames list
/// them in. Edges are keyed by the exact ordered pair passed to
/// [`GraphTracer::add_edge`]; `(u, v)` and `(v, u)` are distinct edges and
/// the tracer never maps one onto the other, even for undirected graphs.
///
/// Positions start on a circle and can be replaced by a layered layout.
#[derive(Debug, Clone)]
pub struct GraphTracer {
    directed: bool,
    cycle_layering: CycleLayering,
    node_order: Vec<NodeId>,
    nodes: HashMap<NodeId, NodeOverlay>,
    edge_order: Vec<EdgeKey>,
    edges: HashMap<EdgeKey, EdgeOverlay>,
    log: LogBuffer,
}

impl GraphTracer {
    /// Creates a tracer over `node_ids`, which must be unique.
    ///
    /// `directed` is stamped on every emitted edge; it does not change
    /// layout.
    pub fn new<I, T>(node_ids: I, directed: bool) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        let node_order: Vec<NodeId> = node_ids.into_iter().map(Into::into).collect();
        let positions = layout::circular_layout(node_order.len());

        let mut nodes = HashMap::with_capacity(node_order.len());
        for (id, position) in node_order.iter().zip(positions) {
            let overlay = NodeOverlay {
                label: id.to_string(),
                selected: false,
                patched: false,
                error: false,
                color: String::new(),
                badge: String::new(),
                badge_color: String::new(),
                group: None,
                position,
            };
            if nodes.insert(id.clone(), overlay).is_some() {
                return Err(TracerError::DuplicateNode(id.clone()));
            }
        }

        Ok(GraphTracer {
            directed,
            cycle_layering: CycleLayering::default(),
            node_order,
            nodes,
            edge_order: Vec::new(),
            edges: HashMap::new(),
            log: LogBuffer::new(),
        })
    }

    /// Sets where [`GraphTracer::set_layered_layout`] puts cyclic nodes.
    pub fn with_cycle_layering(mut self, policy: CycleLayering) -> Self {
        self.cycle_layering = policy;
        self
    }

    pub fn set_cycle_layering(&mut self, policy: CycleLayering) {
        self.cycle_layering = policy;
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_order
    }

    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    pub fn has_edge(&self, source: impl Into<NodeId>, target: impl Into<NodeId>) -> bool {
        self.edges.contains_key(&(source.into(), target.into()))
    }

    fn node_mut(&mut self, id: impl Into<NodeId>) -> Result<&mut NodeOverlay> {
        let id = id.into();
        match self.nodes.get_mut(&id) {
            Some(node) => Ok(node),
            None => Err(TracerError::UnknownNode(id)),
        }
    }

    fn edge_mut(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Result<&mut EdgeOverlay> {
        let key = (source.into(), target.into());
        match self.edges.get_mut(&key) {
            Some(edge) => Ok(edge),
            None => Err(TracerError::UnknownEdge(key.0, key.1)),
        }
    }

    // --- nodes ---

    pub fn set_label(&mut self, id: impl Into<NodeId>, label: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.label = label.into();
        Ok(())
    }

    pub fn set_node_color(&mut self, id: impl Into<NodeId>, color: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.color = color.into();
        Ok(())
    }

    pub fn set_node_badge(
        &mut self,
        id: impl Into<NodeId>,
        badge: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<()> {
        let node = self.node_mut(id)?;
        node.badge = badge.into();
        node.badge_color = color.into();
        Ok(())
    }

    pub fn set_node_group(&mut self, id: impl Into<NodeId>, group: Option<i64>) -> Result<()> {
        self.node_mut(id)?.group = group;
        Ok(())
    }

    pub fn select_node(&mut self, id: impl Into<NodeId>) -> Result<()> {
        self.node_mut(id)?.selected = true;
        Ok(())
    }

    pub fn deselect_node(&mut self, id: impl Into<NodeId>) -> Result<()> {
        self.node_mut(id)?.selected = false;
        Ok(())
    }

    pub fn deselect_all_nodes(&mut self) {
        self.nodes.values_mut().for_each(|n| n.selected = false);
    }

    pub fn patch_node(&mut self, id: impl Into<NodeId>) -> Result<()> {
        self.node_mut(id)?.patched = true;
        Ok(())
    }

    pub fn depatch_node(&mut self, id: impl Into<NodeId>) -> Result<()> {
        self.node_mut(id)?.patched = false;
        Ok(())
    }

    pub fn depatch_all_nodes(&mut self) {
        self.nodes.values_mut().for_each(|n| n.patched = false);
    }

    pub fn mark_node_error(&mut self, id: impl Into<NodeId>) -> Result<()> {
        self.node_mut(id)?.error = true;
        Ok(())
    }

    pub fn clear_node_error(&mut self, id: impl Into<NodeId>) -> Result<()> {
        self.node_mut(id)?.error = false;
        Ok(())
    }

    pub fn clear_all_node_errors(&mut self) {
        self.nodes.values_mut().for_each(|n| n.error = false);
    }

    // --- edges ---

    /// Inserts the edge `(source, target)`.
    ///
    /// Repeating a pair is a no-op: the first weight and all overlay state
    /// are kept. Both endpoints must be registered nodes.
    pub fn add_edge(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        weight: Option<f64>,
    ) -> Result<()> {
        let key = (source.into(), target.into());
        for end in [&key.0, &key.1] {
            if !self.nodes.contains_key(end) {
                return Err(TracerError::UnknownNode(end.clone()));
            }
        }
        if self.edges.contains_key(&key) {
            return Ok(());
        }
        self.edges.insert(
            key.clone(),
            EdgeOverlay {
                weight,
                ..Default::default()
            },
        );
        self.edge_order.push(key);
        Ok(())
    }

    pub fn set_edge_weight(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        weight: Option<f64>,
    ) -> Result<()> {
        self.edge_mut(source, target)?.weight = weight;
        Ok(())
    }

    pub fn set_edge_label(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        label: impl Into<String>,
    ) -> Result<()> {
        self.edge_mut(source, target)?.label = label.into();
        Ok(())
    }

    pub fn set_edge_class(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        class: impl Into<String>,
    ) -> Result<()> {
        self.edge_mut(source, target)?.edge_class = class.into();
        Ok(())
    }

    pub fn set_edge_curve_offset(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        offset: f64,
    ) -> Result<()> {
        self.edge_mut(source, target)?.curve_offset = offset;
        Ok(())
    }

    pub fn select_edge(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Result<()> {
        self.edge_mut(source, target)?.selected = true;
        Ok(())
    }

    pub fn deselect_edge(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Result<()> {
        self.edge_mut(source, target)?.selected = false;
        Ok(())
    }

    pub fn deselect_all_edges(&mut self) {
        self.edges.values_mut().for_each(|e| e.selected = false);
    }

    pub fn patch_edge(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Result<()> {
        self.edge_mut(source, target)?.patched = true;
        Ok(())
    }

    pub fn depatch_edge(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Result<()> {
        self.edge_mut(source, target)?.patched = false;
        Ok(())
    }

    pub fn depatch_all_edges(&mut self) {
        self.edges.values_mut().for_each(|e| e.patched = false);
    }

    pub fn mark_edge_error(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Result<()> {
        self.edge_mut(source, target)?.error = true;
        Ok(())
    }

    pub fn clear_edge_error(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Result<()> {
        self.edge_mut(source, target)?.error = false;
        Ok(())
    }

    pub fn clear_all_edge_errors(&mut self) {
        self.edges.values_mut().for_each(|e| e.error = false);
    }

    // --- layout ---

    /// Replaces every node position with a layered (longest-path) layout of
    /// the current edges.
    pub fn set_layered_layout(&mut self) {
        let index: HashMap<&NodeId, usize> = self
            .node_order
            .iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        // add_edge only accepts registered endpoints
        let edges: Vec<(usize, usize)> = self
            .edge_order
            .iter()
            .filter_map(|(s, t)| Some((*index.get(s)?, *index.get(t)?)))
            .collect();

        let positions = layout::layered_layout(self.node_order.len(), &edges, self.cycle_layering);
        for (id, position) in self.node_order.iter().zip(positions) {
            if let Some(node) = self.nodes.get_mut(id) {
                node.position = position;
            }
        }
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.log.push(message);
    }

    pub fn snapshot(&self, line_number: u32, description: impl Into<String>) -> Step {
        let nodes: Vec<GraphNode> = self
            .node_order
            .iter()
            .filter_map(|id| {
                let n = self.nodes.get(id)?;
                Some(GraphNode {
                    id: id.clone(),
                    label: n.label.clone(),
                    selected: n.selected,
                    patched: n.patched,
                    error: n.error,
                    color: n.color.clone(),
                    x: n.position.0,
                    y: n.position.1,
                    badge: n.badge.clone(),
                    badge_color: n.badge_color.clone(),
                    group: n.group,
                })
            })
            .collect();

        let edges: Vec<GraphEdge> = self
            .edge_order
            .iter()
            .filter_map(|key| {
                let e = self.edges.get(key)?;
                Some(GraphEdge {
                    source: key.0.clone(),
                    target: key.1.clone(),
                    selected: e.selected,
                    patched: e.patched,
                    error: e.error,
                    directed: self.directed,
                    weight: e.weight,
                    label: e.label.clone(),
                    edge_class: e.edge_class.clone(),
                    curve_offset: e.curve_offset,
                })
            })
            .collect();

        Step::new(line_number, description, Visual::Graph { nodes, edges }, self.log.window())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn graph(ids: &[&str]) -> GraphTracer {
        GraphTracer::new(ids.iter().copied(), true).unwrap()
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let result = GraphTracer::new(["a", "b", "a"], false);
        assert_eq!(result.err(), Some(TracerError::DuplicateNode(NodeId::from("a"))));
    }

    #[test]
    fn test_default_circular_positions_and_labels() {
        let tracer = graph(&["a", "b", "c", "d", "e"]);
        let step = tracer.snapshot(1, "");
        let (nodes, edges) = step.graph().unwrap();
        assert!(edges.is_empty());
        for (i, node) in nodes.iter().enumerate() {
            let angle = 2.0 * PI * i as f64 / 5.0 - PI / 2.0;
            assert!((node.x - (0.5 + 0.38 * angle.cos())).abs() < 1e-9);
            assert!((node.y - (0.5 + 0.38 * angle.sin())).abs() < 1e-9);
            assert_eq!(node.label, node.id.to_string());
        }
    }

    #[test]
    fn test_duplicate_edge_keeps_first_weight() -> Result<()> {
        let mut tracer = graph(&["u", "v"]);
        tracer.add_edge("u", "v", Some(1.5))?;
        tracer.select_edge("u", "v")?;
        tracer.add_edge("u", "v", Some(9.0))?;

        let step = tracer.snapshot(1, "");
        let (_, edges) = step.graph().unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].weight, Some(1.5));
        assert!(edges[0].selected);
        Ok(())
    }

    #[test]
    fn test_reverse_pair_is_a_separate_edge() -> Result<()> {
        let mut tracer = graph(&["a", "b"]);
        tracer.add_edge("a", "b", Some(2.0))?;
        tracer.add_edge("b", "a", Some(0.5))?;
        tracer.set_edge_curve_offset("a", "b", 0.15)?;
        tracer.patch_edge("b", "a")?;

        let step = tracer.snapshot(1, "");
        let (_, edges) = step.graph().unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].source.clone(), edges[0].target.clone()), (NodeId::from("a"), NodeId::from("b")));
        assert_eq!(edges[0].curve_offset, 0.15);
        assert!(!edges[0].patched);
        assert!(edges[1].patched);
        assert_eq!(edges[1].weight, Some(0.5));
        Ok(())
    }

    #[test]
    fn test_unknown_edge_and_node_fail_fast() {
        let mut tracer = graph(&["a", "b"]);
        assert_eq!(
            tracer.select_edge("a", "b"),
            Err(TracerError::UnknownEdge(NodeId::from("a"), NodeId::from("b")))
        );
        assert_eq!(tracer.add_edge("a", "z", None), Err(TracerError::UnknownNode(NodeId::from("z"))));
        assert_eq!(tracer.select_node("q"), Err(TracerError::UnknownNode(NodeId::from("q"))));
        assert_eq!(tracer.edge_count(), 0);
    }

    #[test]
    fn test_layered_layout_on_chain() -> Result<()> {
        let mut tracer = graph(&["A", "B", "C"]);
        tracer.add_edge("A", "B", None)?;
        tracer.add_edge("B", "C", None)?;
        tracer.set_layered_layout();

        let step = tracer.snapshot(1, "");
        let (nodes, _) = step.graph().unwrap();
        assert!((nodes[0].y - 0.5 / 3.0).abs() < 1e-9);
        assert!((nodes[1].y - 1.5 / 3.0).abs() < 1e-9);
        assert!((nodes[2].y - 2.5 / 3.0).abs() < 1e-9);
        assert!(nodes[0].y < nodes[1].y && nodes[1].y < nodes[2].y);
        Ok(())
    }

    #[test]
    fn test_layered_layout_shared_cycle_layer() -> Result<()> {
        let mut tracer = graph(&["s", "x", "y"]).with_cycle_layering(CycleLayering::Shared);
        tracer.add_edge("x", "y", None)?;
        tracer.add_edge("y", "x", None)?;
        tracer.set_layered_layout();

        let step = tracer.snapshot(1, "");
        let (nodes, _) = step.graph().unwrap();
        // s alone on layer 0, x and y share layer 1
        assert!((nodes[0].x - 0.5).abs() < 1e-9);
        assert_eq!(nodes[1].y, nodes[2].y);
        assert!(nodes[0].y < nodes[1].y);
        Ok(())
    }

    #[test]
    fn test_node_overlays_in_snapshot() -> Result<()> {
        let mut tracer = GraphTracer::new([1, 2, 3], false)?;
        tracer.set_label(1, "start")?;
        tracer.set_node_color(2, "#a6e3a1")?;
        tracer.set_node_badge(2, "d=4", "#f9e2af")?;
        tracer.set_node_group(3, Some(1))?;
        tracer.select_node(1)?;
        tracer.patch_node(2)?;
        tracer.mark_node_error(3)?;
        tracer.add_edge(1, 2, None)?;
        tracer.set_edge_class(1, 2, "tree")?;
        tracer.set_edge_label(1, 2, "e0")?;
        tracer.set_edge_weight(1, 2, Some(4.0))?;

        let step = tracer.snapshot(7, "overlays");
        let (nodes, edges) = step.graph().unwrap();
        assert_eq!(nodes[0].label, "start");
        assert!(nodes[0].selected);
        assert_eq!(nodes[1].color, "#a6e3a1");
        assert_eq!(nodes[1].badge, "d=4");
        assert_eq!(nodes[1].badge_color, "#f9e2af");
        assert!(nodes[1].patched);
        assert_eq!(nodes[2].group, Some(1));
        assert!(nodes[2].error);
        assert!(!edges[0].directed);
        assert_eq!(edges[0].edge_class, "tree");
        assert_eq!(edges[0].label, "e0");
        assert_eq!(edges[0].weight, Some(4.0));

        tracer.deselect_all_nodes();
        tracer.depatch_all_nodes();
        tracer.clear_all_node_errors();
        let step = tracer.snapshot(8, "");
        let (nodes, _) = step.graph().unwrap();
        assert!(nodes.iter().all(|n| !n.selected && !n.patched && !n.error));
        Ok(())
    }

    #[test]
    fn test_edge_bulk_clears() -> Result<()> {
        let mut tracer = graph(&["a", "b", "c"]);
        tracer.add_edge("a", "b", None)?;
        tracer.add_edge("b", "c", None)?;
        for (s, t) in [("a", "b"), ("b", "c")] {
            tracer.select_edge(s, t)?;
            tracer.patch_edge(s, t)?;
            tracer.mark_edge_error(s, t)?;
        }
        tracer.deselect_edge("a", "b")?;
        tracer.depatch_edge("a", "b")?;
        tracer.clear_edge_error("a", "b")?;
        let step = tracer.snapshot(1, "");
        let (_, edges) = step.graph().unwrap();
        assert!(!edges[0].selected && !edges[0].patched && !edges[0].error);
        assert!(edges[1].selected && edges[1].patched && edges[1].error);

        tracer.deselect_all_edges();
        tracer.depatch_all_edges();
        tracer.clear_all_edge_errors();
        let step = tracer.snapshot(2, "");
        let (_, edges) = step.graph().unwrap();
        assert!(edges.iter().all(|e| !e.selected && !e.patched && !e.error));
        Ok(())
    }
}
