use crate::error::{Result, TracerError};
use crate::layout;
use crate::log_buffer::LogBuffer;
use crate::step::{Step, TrieEdge, TrieNode, Visual};
use crate::value::NodeId;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct TrieNodeOverlay {
    label: String,
    selected: bool,
    patched: bool,
    error: bool,
    is_end: bool,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
struct TrieEdgeOverlay {
    label: String,
    selected: bool,
    patched: bool,
    error: bool,
}

/// Growing rooted tree with an automatic proportional layout.
///
/// Each node is expected to have at most one parent. Extra parents are
/// accepted but the layout then places the node under whichever parent is
/// laid out last.
#[derive(Debug, Clone, Default)]
pub struct TrieTracer {
    order: Vec<NodeId>,
    nodes: HashMap<NodeId, TrieNodeOverlay>,
    edge_order: Vec<(NodeId, NodeId)>,
    edges: HashMap<(NodeId, NodeId), TrieEdgeOverlay>,
    next_id: i64,
    log: LogBuffer,
}

impl TrieTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with the next free integer id and returns that id.
    pub fn add_node(&mut self, label: impl Into<String>, is_end: bool) -> NodeId {
        let mut id = NodeId::Int(self.next_id);
        while self.nodes.contains_key(&id) {
            self.next_id += 1;
            id = NodeId::Int(self.next_id);
        }
        self.next_id += 1;
        self.insert(id.clone(), label.into(), is_end);
        id
    }

    /// Adds a node under a caller-chosen id.
    pub fn add_node_with_id(
        &mut self,
        id: impl Into<NodeId>,
        label: impl Into<String>,
        is_end: bool,
    ) -> Result<NodeId> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(TracerError::DuplicateNode(id));
        }
        self.insert(id.clone(), label.into(), is_end);
        Ok(id)
    }

    fn insert(&mut self, id: NodeId, label: String, is_end: bool) {
        self.nodes.insert(
            id.clone(),
            TrieNodeOverlay {
                label,
                selected: false,
                patched: false,
                error: false,
                is_end,
                children: Vec::new(),
            },
        );
        self.order.push(id);
    }

    /// Links `source` to child `target` over character `label`.
    ///
    /// Repeating a pair is a no-op.
    pub fn add_edge(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        label: impl Into<String>,
    ) -> Result<()> {
        let key = (source.into(), target.into());
        if !self.nodes.contains_key(&key.1) {
            return Err(TracerError::UnknownNode(key.1));
        }
        let parent = match self.nodes.get_mut(&key.0) {
            Some(parent) => parent,
            None => return Err(TracerError::UnknownNode(key.0)),
        };
        if self.edges.contains_key(&key) {
            return Ok(());
        }
        if !parent.children.contains(&key.1) {
            parent.children.push(key.1.clone());
        }
        self.edges.insert(
            key.clone(),
            TrieEdgeOverlay {
                label: label.into(),
                ..Default::default()
            },
        );
        self.edge_order.push(key);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    fn node_mut(&mut self, id: impl Into<NodeId>) -> Result<&mut TrieNodeOverlay> {
        let id = id.into();
        match self.nodes.get_mut(&id) {
            Some(node) => Ok(node),
            None => Err(TracerError::UnknownNode(id)),
        }
    }

    fn edge_mut(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Result<&mut TrieEdgeOverlay> {
        let key = (source.into(), target.into());
        match self.edges.get_mut(&key) {
            Some(edge) => Ok(edge),
            None => Err(TracerError::UnknownEdge(key.0, key.1)),
        }
    }

    /// Marks or unmarks `id` as the end of a word.
    pub fn set_end(&mut self, id: impl Into<NodeId>, is_end: bool) -> Result<()> {
        self.node_mut(id)?.is_end = is_end;
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

    pub fn log(&mut self, message: impl Into<String>) {
        self.log.push(message);
    }

    fn compute_layout(&self) -> Vec<(f64, f64)> {
        let index: HashMap<&NodeId, usize> = self.order.iter().enumerate().map(|(i, id)| (id, i)).collect();
        let targets: HashSet<&NodeId> = self.edge_order.iter().map(|(_, t)| t).collect();

        let children: Vec<Vec<usize>> = self
            .order
            .iter()
            .map(|id| {
                self.nodes
                    .get(id)
                    .map(|n| n.children.iter().filter_map(|c| index.get(c).copied()).collect())
                    .unwrap_or_default()
            })
            .collect();
        let has_parent: Vec<bool> = self.order.iter().map(|id| targets.contains(id)).collect();

        layout::tree_layout(&children, &has_parent)
            .into_iter()
            .map(|p| p.unwrap_or((0.5, 0.5)))
            .collect()
    }

    /// Lays the tree out afresh and freezes it into a frame.
    pub fn snapshot(&self, line_number: u32, description: impl Into<String>) -> Step {
        let positions = self.compute_layout();

        let nodes: Vec<TrieNode> = self
            .order
            .iter()
            .zip(positions)
            .filter_map(|(id, (x, y))| {
                let n = self.nodes.get(id)?;
                Some(TrieNode {
                    id: id.clone(),
                    label: n.label.clone(),
                    x,
                    y,
                    selected: n.selected,
                    patched: n.patched,
                    error: n.error,
                    is_end: n.is_end,
                })
            })
            .collect();

        let edges: Vec<TrieEdge> = self
            .edge_order
            .iter()
            .filter_map(|key| {
                let e = self.edges.get(key)?;
                Some(TrieEdge {
                    source: key.0.clone(),
                    target: key.1.clone(),
                    label: e.label.clone(),
                    selected: e.selected,
                    patched: e.patched,
                    error: e.error,
                })
            })
            .collect();

        Step::new(line_number, description, Visual::Trie { nodes, edges }, self.log.window())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root -> a -> (p, e) ; root -> b
    fn small_trie() -> Result<(TrieTracer, Vec<NodeId>)> {
        let mut t = TrieTracer::new();
        let root = t.add_node("root", false);
        let a = t.add_node("a", false);
        let b = t.add_node("b", true);
        let p = t.add_node("p", true);
        let e = t.add_node("e", true);
        t.add_edge(&root, &a, "a")?;
        t.add_edge(&root, &b, "b")?;
        t.add_edge(&a, &p, "p")?;
        t.add_edge(&a, &e, "e")?;
        Ok((t, vec![root, a, b, p, e]))
    }

    #[test]
    fn test_auto_ids_increase() -> Result<()> {
        let mut t = TrieTracer::new();
        assert_eq!(t.add_node("", false), NodeId::Int(0));
        t.add_node_with_id(1, "taken", false)?;
        assert_eq!(t.add_node("", false), NodeId::Int(2));
        assert_eq!(t.add_node_with_id(2, "", false), Err(TracerError::DuplicateNode(NodeId::Int(2))));
        Ok(())
    }

    #[test]
    fn test_snapshot_orders_and_layout() -> Result<()> {
        let (t, ids) = small_trie()?;
        let step = t.snapshot(4, "built");
        let (nodes, edges) = step.trie().unwrap();
        let node_ids: Vec<NodeId> = nodes.iter().map(|n| n.id.clone()).collect();
        assert_eq!(node_ids, ids);
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[0].label, "a");
        assert_eq!(edges[3].label, "e");

        // root in the middle of [0.05, 0.95), three levels
        assert!((nodes[0].x - 0.5).abs() < 1e-9);
        assert!((nodes[0].y - 0.5 / 3.0).abs() < 1e-9);
        // a owns two of three leaves: [0.05, 0.65)
        assert!((nodes[1].x - 0.35).abs() < 1e-9);
        assert!((nodes[2].x - 0.8).abs() < 1e-9);
        assert!((nodes[3].y - 2.5 / 3.0).abs() < 1e-9);
        assert!(nodes[2].is_end && !nodes[1].is_end);
        Ok(())
    }

    #[test]
    fn test_layout_follows_growth() -> Result<()> {
        let mut t = TrieTracer::new();
        let root = t.add_node("root", false);
        let step = t.snapshot(1, "");
        let (nodes, _) = step.trie().unwrap();
        assert!((nodes[0].x - 0.5).abs() < 1e-9);
        assert!((nodes[0].y - 0.5).abs() < 1e-9);

        let c = t.add_node("c", false);
        t.add_edge(&root, &c, "c")?;
        let step = t.snapshot(2, "");
        let (nodes, _) = step.trie().unwrap();
        assert!((nodes[0].y - 0.25).abs() < 1e-9);
        assert!((nodes[1].y - 0.75).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_duplicate_edge_is_noop() -> Result<()> {
        let (mut t, ids) = small_trie()?;
        t.select_edge(&ids[0], &ids[1])?;
        t.add_edge(&ids[0], &ids[1], "z")?;
        let step = t.snapshot(1, "");
        let (_, edges) = step.trie().unwrap();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[0].label, "a");
        assert!(edges[0].selected);
        Ok(())
    }

    #[test]
    fn test_empty_trie_snapshot() {
        let t = TrieTracer::new();
        let step = t.snapshot(1, "empty");
        let (nodes, edges) = step.trie().unwrap();
        assert!(nodes.is_empty() && edges.is_empty());
    }

    #[test]
    fn test_overlays_and_errors() -> Result<()> {
        let (mut t, ids) = small_trie()?;
        t.select_node(&ids[1])?;
        t.patch_node(&ids[3])?;
        t.mark_node_error(&ids[2])?;
        t.patch_edge(&ids[1], &ids[3])?;
        t.mark_edge_error(&ids[0], &ids[2])?;
        t.set_end(&ids[2], false)?;
        assert_eq!(
            t.select_edge(&ids[2], &ids[3]),
            Err(TracerError::UnknownEdge(ids[2].clone(), ids[3].clone()))
        );
        assert!(t.add_edge(&ids[0], 99, "x").is_err());

        let step = t.snapshot(1, "");
        let (nodes, edges) = step.trie().unwrap();
        assert!(nodes[1].selected && nodes[3].patched && nodes[2].error && !nodes[2].is_end);
        assert!(edges[2].patched && edges[1].error);

        t.deselect_all_nodes();
        t.depatch_all_nodes();
        t.clear_all_node_errors();
        t.depatch_all_edges();
        t.clear_all_edge_errors();
        t.deselect_all_edges();
        let step = t.snapshot(2, "");
        let (nodes, edges) = step.trie().unwrap();
        assert!(nodes.iter().all(|n| !n.selected && !n.patched && !n.error));
        assert!(edges.iter().all(|e| !e.selected && !e.patched && !e.error));
        Ok(())
    }
}
