use crate::problem::{Params, Problem, RendererType};
use crate::step::Step;
use crate::theme::Palette;
use crate::tracer::DsuTracer;
use anyhow::{bail, Result};
use std::collections::BTreeSet;

const SOURCE: &str = "\
def equationsPossible(equations):
    parent = list(range(26))
    rank = [0] * 26

    def find(x):
        if parent[x] != x:
            parent[x] = find(parent[x])
        return parent[x]

    def union(x, y):
        rx, ry = find(x), find(y)
        if rx == ry:
            return
        if rank[rx] < rank[ry]:
            rx, ry = ry, rx
        parent[ry] = rx
        if rank[rx] == rank[ry]:
            rank[rx] += 1

    for eq in equations:
        if eq[1] == '=':
            x = ord(eq[0]) - ord('a')
            y = ord(eq[3]) - ord('a')
            union(x, y)

    for eq in equations:
        if eq[1] == '!':
            x = ord(eq[0]) - ord('a')
            y = ord(eq[3]) - ord('a')
            if find(x) == find(y):
                return False

    return True";

#[derive(Debug, Clone, PartialEq)]
struct Equation {
    x: String,
    y: String,
    equal: bool,
}

impl Equation {
    fn parse(text: &str) -> Result<Self> {
        let chars: Vec<char> = text.trim().chars().collect();
        let valid = chars.len() == 4
            && chars[0].is_ascii_lowercase()
            && chars[3].is_ascii_lowercase()
            && matches!((chars[1], chars[2]), ('=', '=') | ('!', '='));
        if !valid {
            bail!("Invalid equation '{}', expected e.g. a==b or a!=b", text);
        }
        Ok(Equation {
            x: chars[0].to_string(),
            y: chars[3].to_string(),
            equal: chars[1] == '=',
        })
    }

    fn op(&self) -> &'static str {
        if self.equal {
            "=="
        } else {
            "!="
        }
    }
}

/// Union by rank with path compression over variable indices.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    /// Links the two sets and returns `(child_root, new_root)`.
    fn union(&mut self, x: usize, y: usize) -> Option<(usize, usize)> {
        let (mut rx, mut ry) = (self.find(x), self.find(y));
        if rx == ry {
            return None;
        }
        if self.rank[rx] < self.rank[ry] {
            std::mem::swap(&mut rx, &mut ry);
        }
        self.parent[ry] = rx;
        if self.rank[rx] == self.rank[ry] {
            self.rank[rx] += 1;
        }
        Some((ry, rx))
    }
}

pub struct EqualityEquations;

impl EqualityEquations {
    fn equations(params: &Params) -> Result<Vec<Equation>> {
        let custom = params.text("equations", "");
        let list: Vec<String> = if !custom.trim().is_empty() {
            custom.split(',').map(str::to_string).collect()
        } else {
            let preset: &[&str] = match params.int("preset", 1)? {
                2 => &["a==b", "b!=c", "c==d", "d!=a"],
                _ => &["a==b", "b==c", "c==d", "e==f", "f==g", "g==h", "a!=d", "e!=h"],
            };
            preset.iter().map(|s| s.to_string()).collect()
        };
        list.iter().map(|s| Equation::parse(s)).collect()
    }
}

/// Pushes the whole forest to the tracer after `find` compressed paths.
fn sync(dsu: &mut DsuTracer, uf: &mut UnionFind, vars: &[String]) -> Result<()> {
    for (i, var) in vars.iter().enumerate() {
        let root = uf.find(i);
        dsu.set_parent(var.as_str(), vars[root].as_str())?;
        dsu.set_rank(var.as_str(), uf.rank[i])?;
    }
    Ok(())
}

fn members_of(uf: &mut UnionFind, root: usize) -> Vec<usize> {
    (0..uf.parent.len()).filter(|&i| uf.find(i) == root).collect()
}

impl Problem for EqualityEquations {
    fn name(&self) -> &'static str {
        "Satisfiability of Equality Equations"
    }

    fn topic(&self) -> &'static str {
        "Union-Find"
    }

    fn subtopic(&self) -> &'static str {
        "Constraint Checking"
    }

    fn description(&self) -> &'static str {
        "LeetCode #990: Decide whether all ==/!= equations over variables can hold at once."
    }

    fn long_description(&self) -> &'static str {
        "Given equations of the form `x==y` or `x!=y` over single-letter variables, return \
         `true` if integers can be assigned to the variables so that every equation holds.\n\n\
         Pass `equations=a==b,b!=a` to try your own list."
    }

    fn theory(&self) -> &'static str {
        "Approach: union every pair joined by `==`, then check that no `!=` pair ended up \
         in the same set.\n\n\
         Time Complexity: O(N * alpha(26)). Space Complexity: O(1), 26 variables at most."
    }

    fn source_code(&self) -> &'static str {
        SOURCE
    }

    fn renderer_type(&self) -> RendererType {
        RendererType::Dsu
    }

    fn default_params(&self) -> Params {
        Params::new().with("preset", 1)
    }

    fn generate_steps(&self, params: &Params, _palette: &Palette) -> Result<Vec<Step>> {
        let equations = Self::equations(params)?;
        let vars: Vec<String> = equations
            .iter()
            .flat_map(|eq| [eq.x.clone(), eq.y.clone()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index = |v: &str| vars.iter().position(|w| w == v).unwrap_or(0);

        let mut dsu = DsuTracer::new(Vec::<String>::new())?;
        for var in &vars {
            dsu.make_set(var.as_str(), None);
        }
        let mut uf = UnionFind::new(vars.len());
        let mut steps = Vec::new();

        let eq_str = equations
            .iter()
            .map(|eq| format!("{}{}{}", eq.x, eq.op(), eq.y))
            .collect::<Vec<_>>()
            .join(", ");
        dsu.log(format!("Equations: {}", eq_str));
        dsu.log(format!("Variables: {}", vars.join(", ")));
        steps.push(dsu.snapshot(1, format!("{} equations, {} variables", equations.len(), vars.len())));

        dsu.log("Phase 1: Process == equations");
        steps.push(dsu.snapshot(20, "Phase 1: equality constraints"));

        for eq in equations.iter().filter(|eq| eq.equal) {
            let (x, y) = (index(&eq.x), index(&eq.y));
            dsu.deselect_all();
            dsu.select(eq.x.as_str())?;
            dsu.select(eq.y.as_str())?;
            dsu.log(format!("Process: {}=={}", eq.x, eq.y));
            steps.push(dsu.snapshot(21, format!("{}=={}", eq.x, eq.y)));

            match uf.union(x, y) {
                Some((child, root)) => {
                    dsu.set_parent(vars[child].as_str(), vars[root].as_str())?;
                    sync(&mut dsu, &mut uf, &vars)?;
                    dsu.depatch_all();
                    for i in members_of(&mut uf, root) {
                        dsu.patch(vars[i].as_str())?;
                    }
                    dsu.log(format!("  Union {} and {}", eq.x, eq.y));
                    steps.push(dsu.snapshot(16, format!("Union {} and {}", eq.x, eq.y)));
                }
                None => {
                    dsu.log("  Already equal");
                    steps.push(dsu.snapshot(13, "Already in same set"));
                }
            }
            dsu.deselect_all();
        }

        dsu.deselect_all();
        dsu.depatch_all();
        dsu.log("Phase 2: Check != equations");
        steps.push(dsu.snapshot(26, "Phase 2: inequality constraints"));

        let mut satisfiable = true;
        for eq in equations.iter().filter(|eq| !eq.equal) {
            let (x, y) = (index(&eq.x), index(&eq.y));
            dsu.deselect_all();
            dsu.clear_all_errors();
            dsu.select(eq.x.as_str())?;
            dsu.select(eq.y.as_str())?;
            dsu.log(format!("Check: {}!={}", eq.x, eq.y));
            steps.push(dsu.snapshot(30, format!("Check {}!={}", eq.x, eq.y)));

            let root = uf.find(x);
            if root == uf.find(y) {
                sync(&mut dsu, &mut uf, &vars)?;
                for i in members_of(&mut uf, root) {
                    dsu.mark_error(vars[i].as_str())?;
                }
                dsu.log(format!("  CONTRADICTION! {} and {} are equal", eq.x, eq.y));
                steps.push(dsu.snapshot(
                    31,
                    format!("Contradiction: {}=={} but {}!={}", eq.x, eq.y, eq.x, eq.y),
                ));
                satisfiable = false;
                break;
            }

            dsu.log(format!("  OK: {} and {} in different sets", eq.x, eq.y));
            dsu.patch(eq.x.as_str())?;
            dsu.patch(eq.y.as_str())?;
            steps.push(dsu.snapshot(27, format!("OK: {} != {}", eq.x, eq.y)));
            dsu.deselect_all();
        }

        dsu.deselect_all();
        if satisfiable {
            dsu.clear_all_errors();
            for var in &vars {
                dsu.patch(var.as_str())?;
            }
        }
        dsu.log(format!(
            "Result: {}",
            if satisfiable { "Satisfiable" } else { "Not satisfiable" }
        ));
        let line = if satisfiable { 33 } else { 31 };
        steps.push(dsu.snapshot(line, format!("Result: {}", satisfiable)));
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::PaletteManager;
    use crate::value::NodeId;

    fn run(params: Params) -> Result<Vec<Step>> {
        let palette = PaletteManager::new().current_palette().clone();
        EqualityEquations.generate_steps(&EqualityEquations.default_params().merged(&params), &palette)
    }

    #[test]
    fn test_parse_equation() -> Result<()> {
        let eq = Equation::parse(" a!=b ")?;
        assert_eq!(eq, Equation { x: "a".into(), y: "b".into(), equal: false });
        assert!(Equation::parse("a=b").is_err());
        assert!(Equation::parse("A==b").is_err());
        assert!(Equation::parse("a<=b").is_err());
        Ok(())
    }

    #[test]
    fn test_union_find_by_rank() {
        let mut uf = UnionFind::new(4);
        assert_eq!(uf.union(0, 1), Some((1, 0)));
        assert_eq!(uf.union(2, 3), Some((3, 2)));
        assert_eq!(uf.union(3, 1), Some((0, 2)));
        assert_eq!(uf.union(0, 2), None);
        assert_eq!(uf.rank[2], 2);
        assert_eq!(uf.find(1), 2);
        assert_eq!(uf.parent[1], 2);
    }

    #[test]
    fn test_default_preset_finds_contradiction() -> Result<()> {
        let steps = run(Params::new())?;
        let last = steps.last().unwrap();
        assert_eq!(last.description, "Result: false");

        let contradiction = &steps[steps.len() - 2];
        let nodes = contradiction.dsu_nodes().unwrap();
        let errors: Vec<String> = nodes.iter().filter(|n| n.error).map(|n| n.label.clone()).collect();
        assert_eq!(errors, vec!["a", "b", "c", "d"]);
        Ok(())
    }

    #[test]
    fn test_forest_mirrors_unions() -> Result<()> {
        let steps = run(Params::new().with("equations", "a==b,c==d,b==d,a!=e"))?;
        let last = steps.last().unwrap();
        assert_eq!(last.description, "Result: true");

        let nodes = last.dsu_nodes().unwrap();
        let ids: Vec<NodeId> = nodes.iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids, ["a", "b", "c", "d", "e"].map(NodeId::from).to_vec());
        // a is the root of {a, b, c, d}; e stays alone
        assert_eq!(nodes[0].parent_id, None);
        assert_eq!(nodes[0].rank, 2);
        for n in &nodes[1..4] {
            assert_eq!(n.parent_id, Some(NodeId::from("a")));
        }
        assert_eq!(nodes[4].parent_id, None);
        assert!(nodes.iter().all(|n| n.patched && !n.error));
        Ok(())
    }

    #[test]
    fn test_bad_equation_fails() {
        assert!(run(Params::new().with("equations", "a==b,oops")).is_err());
    }
}
