use crate::error::{Result, TracerError};
use crate::log_buffer::LogBuffer;
use crate::step::{DsuNode, Step, Visual};
use crate::value::NodeId;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct DsuOverlay {
    label: String,
    parent: NodeId,
    rank: u32,
    selected: bool,
    patched: bool,
    error: bool,
}

impl DsuOverlay {
    fn new(id: &NodeId, label: String) -> Self {
        DsuOverlay {
            label,
            parent: id.clone(),
            rank: 0,
            selected: false,
            patched: false,
            error: false,
        }
    }
}

/// Rendering mirror of a union-find forest.
///
/// The tracer has no `find` or `union` of its own. The algorithm being
/// visualized owns the real forest and pushes every parent and rank change
/// here, including path-compression updates, so one renderer serves every
/// union-find variant.
#[derive(Debug, Clone)]
pub struct DsuTracer {
    order: Vec<NodeId>,
    nodes: HashMap<NodeId, DsuOverlay>,
    log: LogBuffer,
}

impl DsuTracer {
    /// Creates singleton sets for `node_ids`, which must be unique.
    pub fn new<I, T>(node_ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        let mut tracer = DsuTracer {
            order: Vec::new(),
            nodes: HashMap::new(),
            log: LogBuffer::new(),
        };
        for id in node_ids {
            let id = id.into();
            if tracer.nodes.contains_key(&id) {
                return Err(TracerError::DuplicateNode(id));
            }
            tracer.insert(id, None);
        }
        Ok(tracer)
    }

    fn insert(&mut self, id: NodeId, label: Option<String>) {
        let label = label.filter(|l| !l.is_empty()).unwrap_or_else(|| id.to_string());
        self.nodes.insert(id.clone(), DsuOverlay::new(&id, label));
        self.order.push(id);
    }

    fn node_mut(&mut self, id: impl Into<NodeId>) -> Result<&mut DsuOverlay> {
        let id = id.into();
        match self.nodes.get_mut(&id) {
            Some(node) => Ok(node),
            None => Err(TracerError::UnknownNode(id)),
        }
    }

    pub fn contains(&self, id: impl Into<NodeId>) -> bool {
        self.nodes.contains_key(&id.into())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registers `id` as a new singleton unless it already exists.
    ///
    /// An empty or missing label defaults to the id's text.
    pub fn make_set(&mut self, id: impl Into<NodeId>, label: Option<&str>) {
        let id = id.into();
        if !self.nodes.contains_key(&id) {
            self.insert(id, label.map(str::to_string));
        }
    }

    /// Points `id` at `parent`. Pointing a node at itself makes it a root.
    pub fn set_parent(&mut self, id: impl Into<NodeId>, parent: impl Into<NodeId>) -> Result<()> {
        let parent = parent.into();
        if !self.nodes.contains_key(&parent) {
            return Err(TracerError::UnknownNode(parent));
        }
        self.node_mut(id)?.parent = parent;
        Ok(())
    }

    pub fn set_rank(&mut self, id: impl Into<NodeId>, rank: u32) -> Result<()> {
        self.node_mut(id)?.rank = rank;
        Ok(())
    }

    pub fn set_label(&mut self, id: impl Into<NodeId>, label: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.label = label.into();
        Ok(())
    }

    pub fn select(&mut self, id: impl Into<NodeId>) -> Result<()> {
        self.node_mut(id)?.selected = true;
        Ok(())
    }

    pub fn deselect(&mut self, id: impl Into<NodeId>) -> Result<()> {
        self.node_mut(id)?.selected = false;
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        self.nodes.values_mut().for_each(|n| n.selected = false);
    }

    pub fn patch(&mut self, id: impl Into<NodeId>) -> Result<()> {
        self.node_mut(id)?.patched = true;
        Ok(())
    }

    pub fn depatch(&mut self, id: impl Into<NodeId>) -> Result<()> {
        self.node_mut(id)?.patched = false;
        Ok(())
    }

    pub fn depatch_all(&mut self) {
        self.nodes.values_mut().for_each(|n| n.patched = false);
    }

    pub fn mark_error(&mut self, id: impl Into<NodeId>) -> Result<()> {
        self.node_mut(id)?.error = true;
        Ok(())
    }

    pub fn clear_error(&mut self, id: impl Into<NodeId>) -> Result<()> {
        self.node_mut(id)?.error = false;
        Ok(())
    }

    pub fn clear_all_errors(&mut self) {
        self.nodes.values_mut().for_each(|n| n.error = false);
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.log.push(message);
    }

    pub fn snapshot(&self, line_number: u32, description: impl Into<String>) -> Step {
        let nodes: Vec<DsuNode> = self
            .order
            .iter()
            .filter_map(|id| {
                let n = self.nodes.get(id)?;
                Some(DsuNode {
                    id: id.clone(),
                    label: n.label.clone(),
                    parent_id: (n.parent != *id).then(|| n.parent.clone()),
                    rank: n.rank,
                    selected: n.selected,
                    patched: n.patched,
                    error: n.error,
                })
            })
            .collect();
        Step::new(line_number, description, Visual::Dsu(nodes), self.log.window())
    }
}
