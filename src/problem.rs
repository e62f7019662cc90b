//! Driver contract, parameters and the problem registry.
//!
//! A driver runs one algorithm against a tracer and returns its timeline.
//! Line numbers in the returned steps refer to 1-based lines of the
//! driver's [`Problem::source_code`].

use crate::step::{Step, Visual};
use crate::theme::Palette;
use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use std::fmt;

/// Which client renderer draws a problem's frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererType {
    Board,
    Array,
    Graph,
    Dsu,
    Trie,
}

impl RendererType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RendererType::Board => "board",
            RendererType::Array => "array",
            RendererType::Graph => "graph",
            RendererType::Dsu => "dsu",
            RendererType::Trie => "trie",
        }
    }

    /// True when `visual` is what this renderer draws.
    pub fn accepts(&self, visual: &Visual) -> bool {
        self.as_str() == visual.kind()
    }
}

impl fmt::Display for RendererType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// String-keyed driver parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Json>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Json>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Json>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Json> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses `key=value`. Values that read as integers become numbers,
    /// everything else stays a string.
    pub fn parse_assignment(assignment: &str) -> Result<(String, Json)> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected key=value, got '{}'", assignment))?;
        let key = key.trim();
        if key.is_empty() {
            bail!("Empty parameter name in '{}'", assignment);
        }
        Ok((key.to_string(), coerce(value)))
    }

    /// Returns `overrides` layered on top of `self`.
    pub fn merged(&self, overrides: &Params) -> Params {
        let mut merged = self.clone();
        for (key, value) in &overrides.0 {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Integer parameter, or `default` when absent. Integer strings and
    /// floats are accepted the way the web runner accepts them.
    pub fn int(&self, key: &str, default: i64) -> Result<i64> {
        match self.0.get(key) {
            None | Some(Json::Null) => Ok(default),
            Some(value) => as_int(value).ok_or_else(|| anyhow!("Parameter '{}' must be an integer, got {}", key, value)),
        }
    }

    pub fn text(&self, key: &str, default: &str) -> String {
        match self.0.get(key) {
            Some(Json::String(s)) => s.clone(),
            Some(Json::Null) | None => default.to_string(),
            Some(other) => other.to_string(),
        }
    }

    pub fn to_json(&self) -> Json {
        Json::Object(self.0.clone())
    }
}

fn coerce(raw: &str) -> Json {
    match raw.trim().parse::<i64>() {
        Ok(n) => Json::from(n),
        Err(_) => Json::from(raw),
    }
}

fn as_int(value: &Json) -> Option<i64> {
    match value {
        Json::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Json::String(s) => s.trim().parse().ok(),
        Json::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// A visualizable algorithm.
pub trait Problem: Send + Sync {
    /// Display name, unique across the registry.
    fn name(&self) -> &'static str;
    /// Top-level category, e.g. "Graph / DFS".
    fn topic(&self) -> &'static str;
    fn subtopic(&self) -> &'static str;
    /// One-line summary.
    fn description(&self) -> &'static str;
    /// Full problem statement.
    fn long_description(&self) -> &'static str {
        ""
    }
    /// Approach, complexity and key insights.
    fn theory(&self) -> &'static str {
        ""
    }
    fn source_code(&self) -> &'static str;
    fn renderer_type(&self) -> RendererType;
    fn default_params(&self) -> Params {
        Params::new()
    }
    /// Runs the algorithm and returns its timeline.
    fn generate_steps(&self, params: &Params, palette: &Palette) -> Result<Vec<Step>>;

    fn info(&self) -> ProblemInfo {
        ProblemInfo {
            name: self.name().to_string(),
            topic: self.topic().to_string(),
            subtopic: self.subtopic().to_string(),
            description: self.description().to_string(),
            long_description: self.long_description().to_string(),
            renderer_type: self.renderer_type(),
            default_params: self.default_params(),
        }
    }
}

/// Listing entry for one problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemInfo {
    pub name: String,
    pub topic: String,
    pub subtopic: String,
    pub description: String,
    pub long_description: String,
    pub renderer_type: RendererType,
    pub default_params: Params,
}

/// Everything a playback client needs for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub source_code: String,
    pub renderer_type: RendererType,
    pub params: Params,
    pub steps: Vec<Step>,
}

impl RunOutput {
    pub fn to_json(&self, compact: bool) -> Json {
        serde_json::json!({
            "source_code": self.source_code,
            "renderer_type": self.renderer_type,
            "steps": self.steps.iter().map(|s| s.to_json(compact)).collect::<Vec<_>>(),
        })
    }
}

/// Runs `problem` with `params` layered over its defaults.
///
/// Every produced step must carry the visual the problem's renderer draws.
pub fn run_problem(problem: &dyn Problem, params: &Params, palette: &Palette) -> Result<RunOutput> {
    let params = problem.default_params().merged(params);
    let renderer_type = problem.renderer_type();

    tracing::info!(problem = problem.name(), params = %params.to_json(), "generating steps");
    let steps = problem
        .generate_steps(&params, palette)
        .with_context(|| format!("Problem '{}' failed", problem.name()))?;

    if let Some((i, step)) = steps.iter().enumerate().find(|(_, s)| !renderer_type.accepts(&s.visual)) {
        bail!(
            "Problem '{}' produced a {} frame at step {} but renders as {}",
            problem.name(),
            step.visual.kind(),
            i + 1,
            renderer_type
        );
    }
    tracing::debug!(problem = problem.name(), steps = steps.len(), "generated steps");

    Ok(RunOutput {
        source_code: problem.source_code().to_string(),
        renderer_type,
        params,
        steps,
    })
}

/// All built-in problems, keyed by name.
pub struct ProblemRegistry {
    problems: BTreeMap<&'static str, Box<dyn Problem>>,
}

static REGISTRY: Lazy<ProblemRegistry> = Lazy::new(|| {
    let mut registry = ProblemRegistry::empty();
    for problem in crate::problems::builtin() {
        registry.register(problem);
    }
    registry
});

impl ProblemRegistry {
    pub fn empty() -> Self {
        ProblemRegistry {
            problems: BTreeMap::new(),
        }
    }

    /// The shared registry of built-in problems.
    pub fn global() -> &'static ProblemRegistry {
        &REGISTRY
    }

    /// Adds a problem. A later problem with the same name replaces the earlier one.
    pub fn register(&mut self, problem: Box<dyn Problem>) {
        if self.problems.insert(problem.name(), problem).is_some() {
            tracing::warn!("problem registered twice, keeping the last one");
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Problem> {
        self.problems.get(name).map(|p| p.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.problems.keys().copied().collect()
    }

    /// Listing sorted by name.
    pub fn list(&self) -> Vec<ProblemInfo> {
        self.problems.values().map(|p| p.info()).collect()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}
