/// Core workflow type definitions
///
/// Workflows are stored and exchanged as JSON in the node-graph editor's format
/// (camelCase keys, node kind under `type`), so serde attributes here define the wire shape.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Node id where every run begins.
pub const START_NODE_ID: &str = "start";
/// Sentinel target id that ends a run; it needs no node entry.
pub const END_NODE_ID: &str = "end";

/// A complete workflow definition containing nodes and their connections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique workflow identifier
    pub id: String,
    /// Human-readable workflow name
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// A single node in the workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node identifier within the workflow (e.g. "form", "weather-api")
    pub id: String,
    /// Node kind as authored in the editor (e.g. "form", "integration", "condition")
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
}

/// Canvas coordinates; carried through untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Display data and the open configuration bag of a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Kind-specific configuration plus `inputVariables` / `outputVariables`
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl NodeData {
    /// Field names the node requires from the context (`metadata.inputVariables`).
    pub fn input_variables(&self) -> Vec<String> {
        string_list(self.metadata.get("inputVariables"))
    }

    /// Field names the node publishes (`metadata.outputVariables`), in declared order.
    pub fn output_variables(&self) -> Vec<String> {
        string_list(self.metadata.get("outputVariables"))
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value.and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        None => Vec::new(),
    }
}

/// Branch selector carried on an edge's source handle.
///
/// `None` is what non-branching nodes emit; it is indexed under the `false` outcome.
/// Older editor exports store the handle as a string (`"true"`), so both forms load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "Option<bool>")]
pub enum BranchSelector {
    #[default]
    None,
    True,
    False,
}

impl BranchSelector {
    /// Outcome value this edge answers to.
    pub fn outcome(self) -> bool {
        matches!(self, Self::True)
    }
}

impl From<Option<bool>> for BranchSelector {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::True,
            Some(false) => Self::False,
            None => Self::None,
        }
    }
}

impl BranchSelector {
    /// Parse a textual handle; anything that is not a boolean spelling means no selector.
    fn parse(handle: &str) -> Self {
        match handle {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Self::True,
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Self::False,
            _ => Self::None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHandle {
    Flag(bool),
    Text(String),
}

impl<'de> Deserialize<'de> for BranchSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<RawHandle>::deserialize(deserializer)? {
            Some(RawHandle::Flag(flag)) => Some(flag).into(),
            Some(RawHandle::Text(text)) => Self::parse(text.trim()),
            None => Self::None,
        })
    }
}

impl From<BranchSelector> for Option<bool> {
    fn from(value: BranchSelector) -> Self {
        match value {
            BranchSelector::True => Some(true),
            BranchSelector::False => Some(false),
            BranchSelector::None => None,
        }
    }
}

/// Directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub animated: bool,
    #[serde(default)]
    pub source_handle: BranchSelector,
    #[serde(default)]
    pub style: Map<String, Value>,
    #[serde(default)]
    pub label: String,
}

impl Edge {
    /// Plain edge without a branch selector.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("{source}-{target}"),
            source,
            target,
            kind: String::new(),
            animated: false,
            source_handle: BranchSelector::None,
            style: Map::new(),
            label: String::new(),
        }
    }

    /// Edge taken only when the source node's outcome equals `outcome`.
    pub fn branch(source: impl Into<String>, target: impl Into<String>, outcome: bool) -> Self {
        Self {
            source_handle: Some(outcome).into(),
            ..Self::new(source, target)
        }
    }
}

/// Key/value data threaded through a run.
///
/// Merging never aliases: each merge returns a fresh snapshot and leaves the
/// receiver untouched, so a node can never observe another step's in-place edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExecutionContext {
    values: Map<String, Value>,
}

impl ExecutionContext {
    /// Seed a context from caller-supplied form data.
    pub fn from_form(form_data: Map<String, Value>) -> Self {
        Self { values: form_data }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// New snapshot with `other` laid over this one (right-biased overwrite).
    pub fn merged(&self, other: &Map<String, Value>) -> Self {
        let mut values = self.values.clone();
        for (key, value) in other {
            values.insert(key.clone(), value.clone());
        }
        Self { values }
    }
}
