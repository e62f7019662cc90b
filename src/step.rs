//! Frame data model.
//!
//! A [`Step`] is one immutable frame of an algorithm's timeline: the source
//! line it corresponds to, a description, exactly one primary visual, the
//! recent log window and any auxiliary panels. Records own all their data, so
//! a frame never shares storage with the tracer that produced it.
//!
//! Frames encode to JSON in two modes. Full mode writes every field of every
//! record; compact mode drops fields sitting at their defaults (see
//! [`Step::to_json`]). [`Step::from_json`] reads either mode back.

use crate::value::{NodeId, Value};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as Json};

/// Direction of an arrow drawn inside a board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowDir {
    Up,
    Down,
    Left,
    Right,
}

impl ArrowDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrowDir::Up => "up",
            ArrowDir::Down => "down",
            ArrowDir::Left => "left",
            ArrowDir::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(ArrowDir::Up),
            "down" => Some(ArrowDir::Down),
            "left" => Some(ArrowDir::Left),
            "right" => Some(ArrowDir::Right),
            _ => None,
        }
    }
}

// Full mode writes "" for a missing arrow, so accept it on the way back in.
fn deserialize_arrow<'de, D>(deserializer: D) -> std::result::Result<Option<ArrowDir>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    if s.is_empty() {
        return Ok(None);
    }
    ArrowDir::parse(&s)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown arrow direction '{}'", s)))
}

fn default_true() -> bool {
    true
}

/// Builds one JSON record, dropping default-valued fields in compact mode.
struct Fields {
    map: Map<String, Json>,
    compact: bool,
}

impl Fields {
    fn new(compact: bool) -> Self {
        Fields {
            map: Map::new(),
            compact,
        }
    }

    /// Always written.
    fn put(mut self, key: &str, value: impl Into<Json>) -> Self {
        self.map.insert(key.to_string(), value.into());
        self
    }

    fn flag(self, key: &str, on: bool) -> Self {
        if self.compact && !on {
            self
        } else {
            self.put(key, on)
        }
    }

    fn text(self, key: &str, s: &str) -> Self {
        if self.compact && s.is_empty() {
            self
        } else {
            self.put(key, s)
        }
    }

    fn optional(self, key: &str, value: Option<Json>) -> Self {
        match value {
            Some(v) => self.put(key, v),
            None if self.compact => self,
            None => self.put(key, Json::Null),
        }
    }

    fn list<T>(self, key: &str, items: &[T], encode: impl Fn(&T) -> Json) -> Self {
        let encoded: Vec<Json> = items.iter().map(encode).collect();
        self.put(key, Json::Array(encoded))
    }

    fn finish(self) -> Json {
        Json::Object(self.map)
    }
}

/// Render state of one board cell.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct CellState {
    pub value: Value,
    pub selected: bool,
    pub patched: bool,
    pub error: bool,
    pub overlay_text: String,
    pub overlay_color: String,
    #[serde(deserialize_with = "deserialize_arrow")]
    pub arrow_dir: Option<ArrowDir>,
    pub on_path: bool,
}

impl CellState {
    pub fn to_json(&self, compact: bool) -> Json {
        Fields::new(compact)
            .put("value", self.value.to_json())
            .flag("selected", self.selected)
            .flag("patched", self.patched)
            .flag("error", self.error)
            .text("overlay_text", &self.overlay_text)
            .text("overlay_color", &self.overlay_color)
            .text("arrow_dir", self.arrow_dir.map(|a| a.as_str()).unwrap_or(""))
            .flag("on_path", self.on_path)
            .finish()
    }
}

/// Render state of one array slot.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ArrayCell {
    pub value: Value,
    pub selected: bool,
    pub patched: bool,
    pub error: bool,
}

impl ArrayCell {
    pub fn to_json(&self, compact: bool) -> Json {
        Fields::new(compact)
            .put("value", self.value.to_json())
            .flag("selected", self.selected)
            .flag("patched", self.patched)
            .flag("error", self.error)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct GraphNode {
    pub id: NodeId,
    pub label: String,
    pub selected: bool,
    pub patched: bool,
    pub error: bool,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub badge: String,
    pub badge_color: String,
    pub group: Option<i64>,
}

impl GraphNode {
    pub fn to_json(&self, compact: bool) -> Json {
        Fields::new(compact)
            .put("id", self.id.to_json())
            .text("label", &self.label)
            .put("x", self.x)
            .put("y", self.y)
            .flag("selected", self.selected)
            .flag("patched", self.patched)
            .flag("error", self.error)
            .text("color", &self.color)
            .text("badge", &self.badge)
            .text("badge_color", &self.badge_color)
            .optional("group", self.group.map(Json::from))
            .finish()
    }
}

/// An edge keyed by its ordered `(source, target)` pair.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub selected: bool,
    pub patched: bool,
    pub error: bool,
    #[serde(default = "default_true")]
    pub directed: bool,
    pub weight: Option<f64>,
    pub label: String,
    /// Semantic tag such as "tree", "back" or "relaxed"; styling only.
    pub edge_class: String,
    /// Bend applied when drawing, to separate `(u, v)` from `(v, u)`.
    pub curve_offset: f64,
}

impl Default for GraphEdge {
    fn default() -> Self {
        GraphEdge {
            source: NodeId::default(),
            target: NodeId::default(),
            selected: false,
            patched: false,
            error: false,
            directed: true,
            weight: None,
            label: String::new(),
            edge_class: String::new(),
            curve_offset: 0.0,
        }
    }
}

impl GraphEdge {
    pub fn to_json(&self, compact: bool) -> Json {
        let mut fields = Fields::new(compact)
            .put("source", self.source.to_json())
            .put("target", self.target.to_json())
            .flag("selected", self.selected)
            .flag("patched", self.patched)
            .flag("error", self.error);
        if !compact || !self.directed {
            fields = fields.put("directed", self.directed);
        }
        fields = fields
            .optional("weight", self.weight.map(Json::from))
            .text("label", &self.label)
            .text("edge_class", &self.edge_class);
        if !compact || self.curve_offset != 0.0 {
            fields = fields.put("curve_offset", self.curve_offset);
        }
        fields.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DsuNode {
    pub id: NodeId,
    pub label: String,
    /// `None` exactly when the node is its own parent.
    pub parent_id: Option<NodeId>,
    pub rank: u32,
    pub selected: bool,
    pub patched: bool,
    pub error: bool,
}

impl DsuNode {
    pub fn to_json(&self, compact: bool) -> Json {
        let mut fields = Fields::new(compact)
            .put("id", self.id.to_json())
            .text("label", &self.label)
            .optional("parent_id", self.parent_id.as_ref().map(NodeId::to_json));
        if !compact || self.rank != 0 {
            fields = fields.put("rank", self.rank);
        }
        fields
            .flag("selected", self.selected)
            .flag("patched", self.patched)
            .flag("error", self.error)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TrieNode {
    pub id: NodeId,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub selected: bool,
    pub patched: bool,
    pub error: bool,
    pub is_end: bool,
}

impl TrieNode {
    pub fn to_json(&self, compact: bool) -> Json {
        Fields::new(compact)
            .put("id", self.id.to_json())
            .put("x", self.x)
            .put("y", self.y)
            .text("label", &self.label)
            .flag("selected", self.selected)
            .flag("patched", self.patched)
            .flag("error", self.error)
            .flag("is_end", self.is_end)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TrieEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub label: String,
    pub selected: bool,
    pub patched: bool,
    pub error: bool,
}

impl TrieEdge {
    pub fn to_json(&self, compact: bool) -> Json {
        Fields::new(compact)
            .put("source", self.source.to_json())
            .put("target", self.target.to_json())
            .text("label", &self.label)
            .flag("selected", self.selected)
            .flag("patched", self.patched)
            .flag("error", self.error)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuxPanelItem {
    pub label: String,
    pub value: Value,
    pub selected: bool,
    pub patched: bool,
    pub error: bool,
}

impl Default for AuxPanelItem {
    fn default() -> Self {
        AuxPanelItem {
            label: String::new(),
            value: Value::Text(String::new()),
            selected: false,
            patched: false,
            error: false,
        }
    }
}

impl AuxPanelItem {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        AuxPanelItem {
            label: label.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn to_json(&self, compact: bool) -> Json {
        Fields::new(compact)
            .put("label", self.label.as_str())
            .put("value", self.value.to_json())
            .flag("selected", self.selected)
            .flag("patched", self.patched)
            .flag("error", self.error)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AuxPanel {
    pub title: String,
    pub items: Vec<AuxPanelItem>,
}

impl AuxPanel {
    pub fn to_json(&self, compact: bool) -> Json {
        Fields::new(compact)
            .put("title", self.title.as_str())
            .list("items", &self.items, |item| item.to_json(compact))
            .finish()
    }
}

/// The primary visual of a frame. Exactly one per [`Step`].
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    Board(Vec<Vec<CellState>>),
    Array(Vec<ArrayCell>),
    Graph {
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
    },
    Dsu(Vec<DsuNode>),
    Trie {
        nodes: Vec<TrieNode>,
        edges: Vec<TrieEdge>,
    },
}

impl Visual {
    /// Renderer name the client uses for this visual.
    pub fn kind(&self) -> &'static str {
        match self {
            Visual::Board(_) => "board",
            Visual::Array(_) => "array",
            Visual::Graph { .. } => "graph",
            Visual::Dsu(_) => "dsu",
            Visual::Trie { .. } => "trie",
        }
    }
}

/// One immutable timeline frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// 1-based line of the displayed source this frame corresponds to.
    pub line_number: u32,
    pub description: String,
    pub visual: Visual,
    pub log_messages: Vec<String>,
    pub aux_panels: Vec<AuxPanel>,
}

impl Step {
    pub fn new(
        line_number: u32,
        description: impl Into<String>,
        visual: Visual,
        log_messages: Vec<String>,
    ) -> Self {
        Step {
            line_number,
            description: description.into(),
            visual,
            log_messages,
            aux_panels: Vec::new(),
        }
    }

    /// Returns a copy of this frame carrying `panels` instead of its own.
    pub fn with_aux_panels(&self, panels: Vec<AuxPanel>) -> Step {
        Step {
            aux_panels: panels,
            ..self.clone()
        }
    }

    pub fn board(&self) -> Option<&[Vec<CellState>]> {
        match &self.visual {
            Visual::Board(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn array(&self) -> Option<&[ArrayCell]> {
        match &self.visual {
            Visual::Array(cells) => Some(cells),
            _ => None,
        }
    }

    pub fn graph(&self) -> Option<(&[GraphNode], &[GraphEdge])> {
        match &self.visual {
            Visual::Graph { nodes, edges } => Some((nodes, edges)),
            _ => None,
        }
    }

    pub fn dsu_nodes(&self) -> Option<&[DsuNode]> {
        match &self.visual {
            Visual::Dsu(nodes) => Some(nodes),
            _ => None,
        }
    }

    pub fn trie(&self) -> Option<(&[TrieNode], &[TrieEdge])> {
        match &self.visual {
            Visual::Trie { nodes, edges } => Some((nodes, edges)),
            _ => None,
        }
    }

    /// Encodes the frame for the playback client.
    ///
    /// With `compact == false` every field of every record is written, and
    /// absent optionals appear as `null`. With `compact == true`:
    /// - booleans are dropped when false, except `directed` which is dropped
    ///   when true
    /// - strings are dropped when empty (an aux item's `label` is kept)
    /// - `weight`, `group` and `parent_id` are dropped when absent,
    ///   `curve_offset` and DSU `rank` when zero
    /// - empty `log_messages`, `aux_panels`, `graph_edges` and `trie_edges`
    ///   are dropped
    ///
    /// Ids, values, positions and `line_number` are always present.
    pub fn to_json(&self, compact: bool) -> Json {
        let mut fields = Fields::new(compact)
            .put("line_number", self.line_number)
            .text("description", &self.description);
        if !compact || !self.log_messages.is_empty() {
            fields = fields.list("log_messages", &self.log_messages, |m| Json::from(m.as_str()));
        }

        fields = match &self.visual {
            Visual::Board(rows) => fields.list("board", rows, |row| {
                Json::Array(row.iter().map(|c| c.to_json(compact)).collect())
            }),
            Visual::Array(cells) => fields.list("array", cells, |c| c.to_json(compact)),
            Visual::Graph { nodes, edges } => {
                let fields = fields.list("graph_nodes", nodes, |n| n.to_json(compact));
                if !compact || !edges.is_empty() {
                    fields.list("graph_edges", edges, |e| e.to_json(compact))
                } else {
                    fields
                }
            }
            Visual::Dsu(nodes) => fields.list("dsu_nodes", nodes, |n| n.to_json(compact)),
            Visual::Trie { nodes, edges } => {
                let fields = fields.list("trie_nodes", nodes, |n| n.to_json(compact));
                if !compact || !edges.is_empty() {
                    fields.list("trie_edges", edges, |e| e.to_json(compact))
                } else {
                    fields
                }
            }
        };

        if !compact || !self.aux_panels.is_empty() {
            fields = fields.list("aux_panels", &self.aux_panels, |p| p.to_json(compact));
        }
        fields.finish()
    }

    /// Decodes a frame written by [`Step::to_json`] in either mode.
    pub fn from_json(value: &Json) -> Result<Step> {
        let wire = WireStep::deserialize(value).context("Failed to decode step")?;
        wire.into_step()
    }
}

/// Flat wire shape of a step; every visual is optional here.
#[derive(Deserialize)]
struct WireStep {
    line_number: u32,
    #[serde(default)]
    description: String,
    #[serde(default)]
    log_messages: Vec<String>,
    #[serde(default)]
    aux_panels: Vec<AuxPanel>,
    board: Option<Vec<Vec<CellState>>>,
    array: Option<Vec<ArrayCell>>,
    graph_nodes: Option<Vec<GraphNode>>,
    graph_edges: Option<Vec<GraphEdge>>,
    dsu_nodes: Option<Vec<DsuNode>>,
    trie_nodes: Option<Vec<TrieNode>>,
    trie_edges: Option<Vec<TrieEdge>>,
}

impl WireStep {
    fn into_step(self) -> Result<Step> {
        let mut visuals = Vec::new();
        if let Some(rows) = self.board {
            visuals.push(Visual::Board(rows));
        }
        if let Some(cells) = self.array {
            visuals.push(Visual::Array(cells));
        }
        if let Some(nodes) = self.graph_nodes {
            visuals.push(Visual::Graph {
                nodes,
                edges: self.graph_edges.unwrap_or_default(),
            });
        } else if self.graph_edges.is_some() {
            return Err(anyhow!("Step {} has graph_edges without graph_nodes", self.line_number));
        }
        if let Some(nodes) = self.dsu_nodes {
            visuals.push(Visual::Dsu(nodes));
        }
        if let Some(nodes) = self.trie_nodes {
            visuals.push(Visual::Trie {
                nodes,
                edges: self.trie_edges.unwrap_or_default(),
            });
        } else if self.trie_edges.is_some() {
            return Err(anyhow!("Step {} has trie_edges without trie_nodes", self.line_number));
        }

        if visuals.len() != 1 {
            return Err(anyhow!(
                "Step {} must carry exactly one primary visual (found {})",
                self.line_number,
                visuals.len()
            ));
        }
        let visual = visuals.remove(0);

        Ok(Step {
            line_number: self.line_number,
            description: self.description,
            visual,
            log_messages: self.log_messages,
            aux_panels: self.aux_panels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_graph_step() -> Step {
        let nodes = vec![
            GraphNode {
                id: NodeId::from("a"),
                label: "a".to_string(),
                x: 0.5,
                y: 0.12,
                selected: true,
                ..Default::default()
            },
            GraphNode {
                id: NodeId::from("b"),
                label: "b".to_string(),
                x: 0.5,
                y: 0.88,
                group: Some(2),
                ..Default::default()
            },
        ];
        let edges = vec![GraphEdge {
            source: NodeId::from("a"),
            target: NodeId::from("b"),
            weight: Some(2.0),
            ..Default::default()
        }];
        Step::new(3, "relax a->b", Visual::Graph { nodes, edges }, vec!["visit a".to_string()])
    }

    #[test]
    fn test_default_cell_full_and_compact() {
        let cell = CellState::default();
        assert_eq!(
            cell.to_json(false),
            json!({
                "value": 0,
                "selected": false,
                "patched": false,
                "error": false,
                "overlay_text": "",
                "overlay_color": "",
                "arrow_dir": "",
                "on_path": false
            })
        );
        assert_eq!(cell.to_json(true), json!({"value": 0}));
    }

    #[test]
    fn test_compact_cell_keeps_set_fields() {
        let cell = CellState {
            value: Value::from("1"),
            selected: true,
            overlay_text: "3".to_string(),
            arrow_dir: Some(ArrowDir::Left),
            on_path: true,
            ..Default::default()
        };
        assert_eq!(
            cell.to_json(true),
            json!({"value": "1", "selected": true, "overlay_text": "3", "arrow_dir": "left", "on_path": true})
        );
    }

    #[test]
    fn test_edge_directed_and_optionals() {
        let edge = GraphEdge {
            source: NodeId::from(1),
            target: NodeId::from(2),
            ..Default::default()
        };
        assert_eq!(edge.to_json(true), json!({"source": 1, "target": 2}));
        let full = edge.to_json(false);
        assert_eq!(full["directed"], json!(true));
        assert_eq!(full["weight"], Json::Null);
        assert_eq!(full["curve_offset"], json!(0.0));

        let undirected = GraphEdge {
            directed: false,
            curve_offset: 0.15,
            edge_class: "back".to_string(),
            ..edge
        };
        assert_eq!(
            undirected.to_json(true),
            json!({"source": 1, "target": 2, "directed": false, "edge_class": "back", "curve_offset": 0.15})
        );
    }

    #[test]
    fn test_dsu_node_compact_rules() {
        let root = DsuNode {
            id: NodeId::from(0),
            label: "a".to_string(),
            ..Default::default()
        };
        assert_eq!(root.to_json(true), json!({"id": 0, "label": "a"}));
        assert_eq!(root.to_json(false)["parent_id"], Json::Null);
        assert_eq!(root.to_json(false)["rank"], json!(0));

        let child = DsuNode {
            parent_id: Some(NodeId::from(0)),
            rank: 1,
            ..root
        };
        assert_eq!(child.to_json(true), json!({"id": 0, "label": "a", "parent_id": 0, "rank": 1}));
    }

    #[test]
    fn test_graph_node_compact_and_full() {
        let node = GraphNode {
            id: NodeId::from("a"),
            x: 0.25,
            y: 0.75,
            ..Default::default()
        };
        assert_eq!(node.to_json(true), json!({"id": "a", "x": 0.25, "y": 0.75}));
        assert_eq!(
            node.to_json(false),
            json!({
                "id": "a",
                "label": "",
                "x": 0.25,
                "y": 0.75,
                "selected": false,
                "patched": false,
                "error": false,
                "color": "",
                "badge": "",
                "badge_color": "",
                "group": null
            })
        );

        let decorated = GraphNode {
            label: "A(3)".to_string(),
            color: "#a6e3a1".to_string(),
            badge: "t1".to_string(),
            badge_color: "#f9e2af".to_string(),
            group: Some(1),
            patched: true,
            ..node
        };
        assert_eq!(
            decorated.to_json(true),
            json!({
                "id": "a",
                "label": "A(3)",
                "x": 0.25,
                "y": 0.75,
                "patched": true,
                "color": "#a6e3a1",
                "badge": "t1",
                "badge_color": "#f9e2af",
                "group": 1
            })
        );
    }

    #[test]
    fn test_array_cell_compact_and_full() {
        let cell = ArrayCell {
            value: Value::from(4),
            ..Default::default()
        };
        assert_eq!(cell.to_json(true), json!({"value": 4}));
        assert_eq!(
            cell.to_json(false),
            json!({"value": 4, "selected": false, "patched": false, "error": false})
        );
        let marked = ArrayCell {
            selected: true,
            error: true,
            ..cell
        };
        assert_eq!(marked.to_json(true), json!({"value": 4, "selected": true, "error": true}));
    }

    #[test]
    fn test_trie_records_compact_and_full() {
        let node = TrieNode {
            id: NodeId::from(1),
            label: "c".to_string(),
            x: 0.5,
            y: 0.5,
            is_end: true,
            ..Default::default()
        };
        assert_eq!(node.to_json(true), json!({"id": 1, "x": 0.5, "y": 0.5, "label": "c", "is_end": true}));
        assert_eq!(
            node.to_json(false),
            json!({
                "id": 1,
                "x": 0.5,
                "y": 0.5,
                "label": "c",
                "selected": false,
                "patched": false,
                "error": false,
                "is_end": true
            })
        );

        let edge = TrieEdge {
            source: NodeId::from(0),
            target: NodeId::from(1),
            label: "c".to_string(),
            ..Default::default()
        };
        assert_eq!(edge.to_json(true), json!({"source": 0, "target": 1, "label": "c"}));
        let unlabeled = TrieEdge {
            label: String::new(),
            ..edge.clone()
        };
        assert_eq!(unlabeled.to_json(true), json!({"source": 0, "target": 1}));
        assert_eq!(
            unlabeled.to_json(false),
            json!({"source": 0, "target": 1, "label": "", "selected": false, "patched": false, "error": false})
        );
    }

    #[test]
    fn test_aux_item_keeps_empty_label() {
        let item = AuxPanelItem::new("", 2);
        assert_eq!(item.to_json(true), json!({"label": "", "value": 2}));
        assert_eq!(
            item.to_json(false),
            json!({"label": "", "value": 2, "selected": false, "patched": false, "error": false})
        );
        let panel = AuxPanel {
            title: "Heap".to_string(),
            items: vec![item],
        };
        assert_eq!(panel.to_json(true), json!({"title": "Heap", "items": [{"label": "", "value": 2}]}));
    }

    #[test]
    fn test_infinite_values_read_back() -> Result<()> {
        let cells = vec![
            ArrayCell {
                value: Value::from(2),
                ..Default::default()
            },
            ArrayCell {
                value: Value::from(f64::INFINITY),
                ..Default::default()
            },
        ];
        let mut step = Step::new(1, "inf", Visual::Array(cells), Vec::new());
        step.aux_panels = vec![AuxPanel {
            title: "Dist".to_string(),
            items: vec![AuxPanelItem::new("b", f64::INFINITY)],
        }];

        for compact in [true, false] {
            let json = step.to_json(compact);
            assert_eq!(json["array"][1]["value"], Json::Null);
            let decoded = Step::from_json(&json)?;
            let array = decoded.array().unwrap();
            assert_eq!(array[0].value, Value::from(2));
            assert!(matches!(array[1].value, Value::Float(x) if x.is_nan()));
            let item = &decoded.aux_panels[0].items[0];
            assert_eq!(item.label, "b");
            assert!(matches!(item.value, Value::Float(x) if x.is_nan()));
        }
        Ok(())
    }

    #[test]
    fn test_step_compact_drops_empty_collections() {
        let step = Step::new(
            1,
            "",
            Visual::Trie {
                nodes: vec![TrieNode::default()],
                edges: Vec::new(),
            },
            Vec::new(),
        );
        let compact = step.to_json(true);
        assert_eq!(compact, json!({"line_number": 1, "trie_nodes": [{"id": 0, "x": 0.0, "y": 0.0}]}));

        let full = step.to_json(false);
        assert_eq!(full["description"], json!(""));
        assert_eq!(full["log_messages"], json!([]));
        assert_eq!(full["trie_edges"], json!([]));
        assert_eq!(full["aux_panels"], json!([]));
    }

    #[test]
    fn test_from_json_reads_both_modes() -> Result<()> {
        let mut step = sample_graph_step();
        step.aux_panels = vec![AuxPanel {
            title: "Queue".to_string(),
            items: vec![AuxPanelItem::new("a", 1)],
        }];

        assert_eq!(Step::from_json(&step.to_json(true))?, step);
        assert_eq!(Step::from_json(&step.to_json(false))?, step);
        Ok(())
    }

    #[test]
    fn test_from_json_rejects_missing_or_double_visual() {
        assert!(Step::from_json(&json!({"line_number": 1})).is_err());
        assert!(Step::from_json(&json!({
            "line_number": 1,
            "array": [],
            "dsu_nodes": []
        }))
        .is_err());
    }

    #[test]
    fn test_with_aux_panels_leaves_original_untouched() {
        let step = sample_graph_step();
        let combined = step.with_aux_panels(vec![AuxPanel::default()]);
        assert!(step.aux_panels.is_empty());
        assert_eq!(combined.aux_panels.len(), 1);
        assert_eq!(combined.visual, step.visual);
    }
}
