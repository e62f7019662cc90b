use crate::problem::{Params, Problem, RendererType};
use crate::step::Step;
use crate::theme::Palette;
use crate::tracer::TrieTracer;
use crate::value::NodeId;
use anyhow::{bail, Result};
use std::collections::{BTreeMap, HashMap};

const SOURCE: &str = "\
class TrieNode:
    def __init__(self):
        self.children = {}
        self.is_end = False

class Trie:
    def __init__(self):
        self.root = TrieNode()

    def insert(self, word):
        node = self.root
        for ch in word:
            if ch not in node.children:
                node.children[ch] = TrieNode()
            node = node.children[ch]
        node.is_end = True

    def search(self, word):
        node = self.root
        for ch in word:
            if ch not in node.children:
                return False
            node = node.children[ch]
        return node.is_end

    def startsWith(self, prefix):
        node = self.root
        for ch in prefix:
            if ch not in node.children:
                return False
            node = node.children[ch]
        return True";

struct Preset {
    insert: Vec<String>,
    search: Vec<String>,
    prefix: Vec<String>,
}

fn words(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// The trie being built, mirrored into the tracer as it grows.
struct Trie {
    tracer: TrieTracer,
    root: NodeId,
    children: HashMap<NodeId, BTreeMap<char, NodeId>>,
    is_end: HashMap<NodeId, bool>,
    steps: Vec<Step>,
}

impl Trie {
    fn new() -> Self {
        let mut tracer = TrieTracer::new();
        let root = tracer.add_node("root", false);
        Trie {
            tracer,
            root: root.clone(),
            children: HashMap::from([(root, BTreeMap::new())]),
            is_end: HashMap::new(),
            steps: Vec::new(),
        }
    }

    fn snap(&mut self, line: u32, description: String) {
        self.steps.push(self.tracer.snapshot(line, description));
    }

    fn child(&self, node: &NodeId, ch: char) -> Option<NodeId> {
        self.children.get(node).and_then(|c| c.get(&ch)).cloned()
    }

    /// Nodes and edges along the longest existing prefix of `word`.
    fn path(&self, word: &str) -> (Vec<NodeId>, Vec<(NodeId, NodeId)>) {
        let mut nodes = vec![self.root.clone()];
        let mut edges = Vec::new();
        let mut current = self.root.clone();
        for ch in word.chars() {
            match self.child(&current, ch) {
                Some(next) => {
                    edges.push((current, next.clone()));
                    nodes.push(next.clone());
                    current = next;
                }
                None => break,
            }
        }
        (nodes, edges)
    }

    fn reset_marks(&mut self) {
        self.tracer.deselect_all_nodes();
        self.tracer.deselect_all_edges();
        self.tracer.clear_all_node_errors();
    }

    /// Patches the path of `word`, records a frame, then removes the patches.
    fn flash_path(&mut self, word: &str, line: u32, description: String) -> Result<()> {
        let (nodes, edges) = self.path(word);
        self.tracer.deselect_all_nodes();
        self.tracer.deselect_all_edges();
        for n in &nodes {
            self.tracer.patch_node(n)?;
        }
        for (s, t) in &edges {
            self.tracer.patch_edge(s, t)?;
        }
        self.snap(line, description);
        for n in &nodes {
            self.tracer.depatch_node(n)?;
        }
        for (s, t) in &edges {
            self.tracer.depatch_edge(s, t)?;
        }
        Ok(())
    }

    fn insert(&mut self, word: &str) -> Result<()> {
        self.reset_marks();
        self.tracer.log(format!("insert(\"{}\")", word));
        self.snap(10, format!("insert(\"{}\")", word));

        let mut current = self.root.clone();
        self.tracer.select_node(&current)?;
        self.snap(11, "Start at root".to_string());

        for ch in word.chars() {
            let (next, line, description) = match self.child(&current, ch) {
                Some(next) => {
                    self.tracer.log(format!("  '{}' exists, traverse to node {}", ch, next));
                    (next, 15, format!("'{}' already exists, traverse", ch))
                }
                None => {
                    let next = self.tracer.add_node(ch.to_string(), false);
                    self.tracer.add_edge(&current, &next, ch.to_string())?;
                    self.children.entry(current.clone()).or_default().insert(ch, next.clone());
                    self.children.insert(next.clone(), BTreeMap::new());
                    self.tracer.log(format!("  '{}' not found, create node {}", ch, next));
                    (next, 14, format!("Create new node for '{}'", ch))
                }
            };
            self.tracer.select_edge(&current, &next)?;
            self.tracer.select_node(&next)?;
            self.snap(line, description);
            self.tracer.deselect_node(&current)?;
            self.tracer.deselect_edge(&current, &next)?;
            current = next;
        }

        self.tracer.set_end(&current, true)?;
        self.is_end.insert(current.clone(), true);
        self.tracer.log(format!("  Mark node {} as end of \"{}\"", current, word));
        self.snap(16, format!("Mark end of word \"{}\"", word));

        self.tracer.log(format!("  \"{}\" inserted successfully", word));
        self.flash_path(word, 16, format!("\"{}\" inserted", word))
    }

    /// Walks `word` from the root, one frame per step. Returns the last
    /// node reached, or `None` when a character is missing.
    fn walk(&mut self, word: &str, follow_line: u32, missing_line: u32) -> Result<Option<NodeId>> {
        let mut current = self.root.clone();
        self.tracer.select_node(&current)?;
        for ch in word.chars() {
            match self.child(&current, ch) {
                Some(next) => {
                    self.tracer.select_edge(&current, &next)?;
                    self.tracer.select_node(&next)?;
                    self.tracer.log(format!("  '{}' found, move to node {}", ch, next));
                    self.snap(follow_line, format!("Follow '{}' to node {}", ch, next));
                    current = next;
                }
                None => {
                    self.tracer.mark_node_error(&current)?;
                    self.tracer.log(format!("  '{}' NOT found from node {}", ch, current));
                    self.snap(missing_line, format!("'{}' not found", ch));
                    return Ok(None);
                }
            }
        }
        Ok(Some(current))
    }

    fn search(&mut self, word: &str) -> Result<bool> {
        self.reset_marks();
        self.tracer.log(format!("search(\"{}\")", word));
        self.snap(18, format!("search(\"{}\")", word));

        let found = match self.walk(word, 23, 22)? {
            Some(last) if self.is_end.get(&last).copied().unwrap_or(false) => {
                self.tracer.log(format!("  \"{}\" found! (is_end = True)", word));
                self.flash_path(word, 24, format!("\"{}\" found!", word))?;
                true
            }
            Some(last) => {
                self.tracer.mark_node_error(&last)?;
                self.tracer.log(format!("  \"{}\" not found (is_end = False)", word));
                self.snap(24, format!("\"{}\" not found (not a complete word)", word));
                false
            }
            None => {
                self.tracer.log(format!("  \"{}\" not found (missing character)", word));
                self.snap(22, format!("\"{}\" not found", word));
                false
            }
        };
        self.tracer.clear_all_node_errors();
        Ok(found)
    }

    fn starts_with(&mut self, prefix: &str) -> Result<bool> {
        self.reset_marks();
        self.tracer.log(format!("startsWith(\"{}\")", prefix));
        self.snap(26, format!("startsWith(\"{}\")", prefix));

        let found = self.walk(prefix, 31, 30)?.is_some();
        if found {
            self.tracer.log(format!("  startsWith(\"{}\") = True", prefix));
            self.flash_path(prefix, 32, format!("Prefix \"{}\" exists!", prefix))?;
        } else {
            self.tracer.log(format!("  startsWith(\"{}\") = False", prefix));
            self.snap(30, format!("Prefix \"{}\" not found", prefix));
        }
        self.tracer.clear_all_node_errors();
        Ok(found)
    }
}

pub struct ImplementTrie;

impl ImplementTrie {
    fn preset(params: &Params) -> Result<Preset> {
        let preset = match params.int("preset", 1)? {
            2 => Preset {
                insert: words("car,card,care,cat,dog"),
                search: words("car,ca,dog,do"),
                prefix: words("ca,d,x"),
            },
            _ => Preset {
                insert: words("apple,app,ape,bat,bar,ball"),
                search: words("apple,app,apex,bat,ban"),
                prefix: words("ap,ba,c"),
            },
        };
        let custom = words(&params.text("insert", ""));
        let preset = if custom.is_empty() {
            preset
        } else {
            Preset {
                search: words(&params.text("search", "")),
                prefix: words(&params.text("prefix", "")),
                insert: custom,
            }
        };
        if preset.insert.iter().any(|w| !w.chars().all(|c| c.is_ascii_lowercase())) {
            bail!("Words must consist of lowercase letters only");
        }
        Ok(preset)
    }
}

impl Problem for ImplementTrie {
    fn name(&self) -> &'static str {
        "Implement Trie"
    }

    fn topic(&self) -> &'static str {
        "Trie"
    }

    fn subtopic(&self) -> &'static str {
        "Basic Operations"
    }

    fn description(&self) -> &'static str {
        "LeetCode #208: Implement a trie with insert, search, and startsWith operations."
    }

    fn long_description(&self) -> &'static str {
        "A trie (prefix tree) stores a set of strings so that keys and prefixes can be \
         looked up one character at a time. Implement `insert(word)`, `search(word)` and \
         `startsWith(prefix)`.\n\n\
         Pass comma-separated `insert`, `search` and `prefix` lists to try your own words."
    }

    fn source_code(&self) -> &'static str {
        SOURCE
    }

    fn renderer_type(&self) -> RendererType {
        RendererType::Trie
    }

    fn default_params(&self) -> Params {
        Params::new().with("preset", 1)
    }

    fn generate_steps(&self, params: &Params, _palette: &Palette) -> Result<Vec<Step>> {
        let preset = Self::preset(params)?;
        let mut trie = Trie::new();

        trie.tracer.log("Initialize empty Trie with root node");
        trie.snap(8, "Create empty Trie".to_string());

        trie.tracer.log("--- Phase 1: Insert words ---");
        trie.snap(8, "Phase 1: Insert words into Trie".to_string());
        for word in &preset.insert {
            trie.insert(word)?;
        }

        trie.reset_marks();
        trie.tracer.log("--- Phase 2: Search words ---");
        trie.snap(18, "Phase 2: Search for words".to_string());
        for word in &preset.search {
            let found = trie.search(word)?;
            tracing::debug!(word = word.as_str(), found, "trie search");
        }

        trie.reset_marks();
        trie.tracer.log("--- Phase 3: Check prefixes ---");
        trie.snap(26, "Phase 3: startsWith checks".to_string());
        for prefix in &preset.prefix {
            let found = trie.starts_with(prefix)?;
            tracing::debug!(prefix = prefix.as_str(), found, "trie prefix check");
        }

        trie.reset_marks();
        trie.tracer.log("All operations complete");
        trie.snap(32, "All operations complete".to_string());
        Ok(trie.steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::PaletteManager;

    fn run(params: Params) -> Result<Vec<Step>> {
        let palette = PaletteManager::new().current_palette().clone();
        ImplementTrie.generate_steps(&ImplementTrie.default_params().merged(&params), &palette)
    }

    #[test]
    fn test_default_preset_builds_shared_prefixes() -> Result<()> {
        let steps = run(Params::new())?;
        let (nodes, edges) = steps.last().unwrap().trie().unwrap();
        // root + a,p,p,l,e + e (ape) + b,a,t + r + l,l (ball)
        assert_eq!(nodes.len(), 13);
        assert_eq!(edges.len(), 12);
        assert_eq!(nodes[0].label, "root");
        assert!(nodes[0].y < nodes[1].y);
        let ends: Vec<&str> = nodes.iter().filter(|n| n.is_end).map(|n| n.label.as_str()).collect();
        assert_eq!(ends, vec!["p", "e", "e", "t", "r", "l"]);
        assert!(nodes.iter().all(|n| !n.selected && !n.patched && !n.error));
        Ok(())
    }

    #[test]
    fn test_search_results() -> Result<()> {
        let mut trie = Trie::new();
        for w in ["apple", "app"] {
            trie.insert(w)?;
        }
        assert!(trie.search("apple")?);
        assert!(trie.search("app")?);
        assert!(!trie.search("ap")?);
        assert!(!trie.search("b")?);
        assert!(trie.starts_with("ap")?);
        assert!(!trie.starts_with("apx")?);
        Ok(())
    }

    #[test]
    fn test_missing_character_frame_marks_error() -> Result<()> {
        let steps = run(Params::new().with("insert", "ab").with("search", "ac").with("prefix", ""))?;
        let missing = steps.iter().find(|s| s.description == "'c' not found").unwrap();
        let (nodes, _) = missing.trie().unwrap();
        assert!(nodes[1].error && nodes[1].label == "a");
        Ok(())
    }

    #[test]
    fn test_rejects_non_letters() {
        assert!(run(Params::new().with("insert", "ok,Nope")).is_err());
    }
}
