//! Node placement in the unit square.
//!
//! All layouts work on dense node indices (the caller's canonical order) and
//! return positions with `x, y ∈ [0, 1]`, `y` growing downwards. Three
//! strategies are provided:
//! - circular: the default for graphs, nodes clockwise from 12 o'clock
//! - layered: longest-path layering for DAGs, one row per layer
//! - proportional tree: each subtree gets horizontal space proportional to
//!   its leaf count, one row per depth level

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::f64::consts::PI;

pub type Position = (f64, f64);

/// Radius of the default circular layout, centered at (0.5, 0.5).
pub const CIRCLE_RADIUS: f64 = 0.38;

/// Left edge of the first root band in a tree layout.
pub const TREE_LEFT_MARGIN: f64 = 0.05;

/// Total width shared by all root bands in a tree layout.
pub const TREE_BAND_WIDTH: f64 = 0.9;

/// Where the layered layout puts nodes that layering never reached.
///
/// Such nodes sit on (or behind) a cycle, so they have no longest-path layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleLayering {
    /// Each leftover node gets its own trailing layer, in canonical order.
    #[default]
    PerNode,
    /// All leftover nodes share one trailing layer.
    Shared,
}

impl CycleLayering {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleLayering::PerNode => "per_node",
            CycleLayering::Shared => "shared",
        }
    }
}

impl std::str::FromStr for CycleLayering {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "per_node" => Ok(CycleLayering::PerNode),
            "shared" => Ok(CycleLayering::Shared),
            other => anyhow::bail!("Unknown cycle layering '{}' (expected per_node or shared)", other),
        }
    }
}

/// Places `n` nodes on a circle: node `i` at angle `2πi/n − π/2`.
pub fn circular_layout(n: usize) -> Vec<Position> {
    (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64 - PI / 2.0;
            (0.5 + CIRCLE_RADIUS * angle.cos(), 0.5 + CIRCLE_RADIUS * angle.sin())
        })
        .collect()
}

/// Assigns a layer to every node by longest-path layering.
///
/// Sources (in-degree 0) start at layer 0 and are relaxed breadth-first:
/// `layer(v) = max(layer(v), layer(u) + 1)` for each edge `u → v`. A node is
/// enqueued once all its in-edges have been relaxed. Nodes never touched by
/// relaxation are placed after the deepest layer according to `policy`.
/// When relaxation reaches no node at all (every node sits on a cycle), the
/// first trailing layer is layer 0, so the top row is never left empty.
///
/// `edges` holds `(source, target)` index pairs in insertion order.
pub fn assign_layers(n: usize, edges: &[(usize, usize)], policy: CycleLayering) -> Vec<usize> {
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    for &(s, t) in edges {
        adj[s].push(t);
        in_degree[t] += 1;
    }

    let mut layer: Vec<Option<usize>> = vec![None; n];
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| in_degree[v] == 0).collect();
    for &v in &queue {
        layer[v] = Some(0);
    }

    while let Some(u) = queue.pop_front() {
        let next = layer[u].unwrap_or(0) + 1;
        for &v in &adj[u] {
            layer[v] = Some(layer[v].map_or(next, |l| l.max(next)));
            in_degree[v] -= 1;
            if in_degree[v] == 0 {
                queue.push_back(v);
            }
        }
    }

    let leftovers: Vec<usize> = (0..n).filter(|&v| layer[v].is_none()).collect();
    if !leftovers.is_empty() {
        tracing::warn!(
            count = leftovers.len(),
            ?policy,
            "layered layout found nodes on cycles, placing them in trailing layers"
        );
        let first_free = layer.iter().flatten().max().map_or(0, |m| m + 1);
        for (offset, v) in leftovers.into_iter().enumerate() {
            layer[v] = Some(match policy {
                CycleLayering::PerNode => first_free + offset,
                CycleLayering::Shared => first_free,
            });
        }
    }

    layer.into_iter().map(|l| l.unwrap_or(0)).collect()
}

/// Computes layered positions: `y = (layer + 0.5) / total_layers`, and nodes
/// of one layer spread evenly over `x ∈ (0, 1)` in canonical order.
pub fn layered_layout(n: usize, edges: &[(usize, usize)], policy: CycleLayering) -> Vec<Position> {
    let layers = assign_layers(n, edges, policy);
    let total_layers = layers.iter().max().map_or(1, |m| m + 1);

    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); total_layers];
    for (v, &l) in layers.iter().enumerate() {
        buckets[l].push(v);
    }

    let mut positions = vec![(0.5, 0.5); n];
    for (l, bucket) in buckets.iter().enumerate() {
        let y = (l as f64 + 0.5) / total_layers as f64;
        for (i, &v) in bucket.iter().enumerate() {
            let x = (i + 1) as f64 / (bucket.len() + 1) as f64;
            positions[v] = (x, y);
        }
    }

    tracing::debug!(nodes = n, layers = total_layers, "computed layered layout");
    positions
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    Fresh,
    Open,
    Done,
}

/// Depth (levels, a leaf is 1) and leaf count of every subtree, gathered in a
/// single post-order pass. A child that is still open on the stack closes a
/// cycle and is ignored.
struct SubtreeMetrics {
    depth: Vec<usize>,
    leaves: Vec<usize>,
    state: Vec<Visit>,
}

impl SubtreeMetrics {
    fn new(n: usize) -> Self {
        SubtreeMetrics {
            depth: vec![0; n],
            leaves: vec![0; n],
            state: vec![Visit::Fresh; n],
        }
    }

    fn measure(&mut self, v: usize, children: &[Vec<usize>]) {
        self.state[v] = Visit::Open;
        let mut max_child_depth = 0;
        let mut leaf_sum = 0;
        let mut has_children = false;
        for &c in &children[v] {
            match self.state[c] {
                Visit::Open => continue,
                Visit::Fresh => self.measure(c, children),
                Visit::Done => {}
            }
            has_children = true;
            max_child_depth = max_child_depth.max(self.depth[c]);
            leaf_sum += self.leaves[c];
        }
        self.depth[v] = 1 + max_child_depth;
        self.leaves[v] = if has_children { leaf_sum } else { 1 };
        self.state[v] = Visit::Done;
    }
}

struct TreePlacer<'a> {
    children: &'a [Vec<usize>],
    leaves: &'a [usize],
    max_depth: usize,
    positions: Vec<Option<Position>>,
    on_path: Vec<bool>,
}

impl TreePlacer<'_> {
    fn place(&mut self, v: usize, x_min: f64, x_max: f64, level: usize) {
        let y = (level as f64 + 0.5) / self.max_depth.max(1) as f64;
        self.positions[v] = Some(((x_min + x_max) / 2.0, y));

        self.on_path[v] = true;
        let kids: Vec<usize> = self.children[v]
            .iter()
            .copied()
            .filter(|&c| !self.on_path[c])
            .collect();
        let total: usize = kids.iter().map(|&c| self.leaves[c]).sum();
        let width = x_max - x_min;
        let mut cx = x_min;
        for &c in &kids {
            let cw = if total > 0 {
                self.leaves[c] as f64 / total as f64 * width
            } else {
                width / kids.len() as f64
            };
            self.place(c, cx, cx + cw, level + 1);
            cx += cw;
        }
        self.on_path[v] = false;
    }
}

/// Lays out a forest by proportional band splitting.
///
/// Roots are nodes without a parent, in canonical order; when every node has
/// a parent the first node is used. Roots share `[0.05, 0.95)` in proportion
/// to their leaf counts, and each node sits at the middle of its band with
/// its band split among its children the same way. Row `level` is drawn at
/// `y = (level + 0.5) / max_depth`.
///
/// Returns `None` for nodes no root reaches.
pub fn tree_layout(children: &[Vec<usize>], has_parent: &[bool]) -> Vec<Option<Position>> {
    let n = children.len();
    if n == 0 {
        return Vec::new();
    }

    let mut roots: Vec<usize> = (0..n).filter(|&v| !has_parent[v]).collect();
    if roots.is_empty() {
        tracing::warn!("tree layout found no root, falling back to the first node");
        roots.push(0);
    }

    let mut metrics = SubtreeMetrics::new(n);
    for &r in &roots {
        if metrics.state[r] == Visit::Fresh {
            metrics.measure(r, children);
        }
    }
    let max_depth = roots.iter().map(|&r| metrics.depth[r]).max().unwrap_or(1);
    let total_leaves: usize = roots.iter().map(|&r| metrics.leaves[r]).sum();

    let mut placer = TreePlacer {
        children,
        leaves: &metrics.leaves,
        max_depth,
        positions: vec![None; n],
        on_path: vec![false; n],
    };
    let mut rx = TREE_LEFT_MARGIN;
    for &r in &roots {
        let rw = if total_leaves > 0 {
            metrics.leaves[r] as f64 / total_leaves as f64 * TREE_BAND_WIDTH
        } else {
            TREE_BAND_WIDTH
        };
        placer.place(r, rx, rx + rw, 0);
        rx += rw;
    }

    tracing::debug!(nodes = n, roots = roots.len(), max_depth, "computed tree layout");
    placer.positions
}
