use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A connection node after normalization: an arbitrary JSON object that is
/// guaranteed to carry a string `id`.
pub type Node = Map<String, Value>;

const ID: &str = "id";
/// Nested identifier (`{"_id": {"$oid": "..."}}`) emitted by older backends.
const LEGACY_ID: &str = "_id";

/// Paging metadata. Missing or `null` fields decode to `""` / `false`, so an
/// absent `hasNextPage` reads as "no more pages".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_previous_page: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_next_page: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_cursor: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_cursor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(default)]
    pub node: Value,
}

impl Edge {
    pub fn new(node: Value) -> Self {
        Self { cursor: None, node }
    }
}

/// The `{ edges, pageInfo }` envelope returned for every paginated collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorConnection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub edges: Vec<Edge>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_info: PageInfo,
}

impl CursorConnection {
    /// Connection with no edges and every page info field empty/false.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_next_page(&self) -> bool {
        self.page_info.has_next_page
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Give a node exactly one canonical string `id`.
///
/// A non-empty direct `id` wins; otherwise the legacy `_id` (either
/// `{"$oid": ".."}` or a bare string) is promoted. The legacy field is always
/// removed. Applying this to an already normalized node changes nothing.
pub fn normalize_node(mut node: Node) -> Node {
    let legacy = node.remove(LEGACY_ID);

    let id = match node.get(ID) {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => legacy.as_ref().and_then(legacy_id).unwrap_or_default(),
    };

    node.insert(ID.to_string(), Value::String(id));
    node
}

fn legacy_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Object(obj) => obj.get("$oid").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Flatten a connection into its normalized nodes, in server order.
/// An absent connection is treated as empty.
pub fn edges_to_items(connection: Option<&CursorConnection>) -> Vec<Node> {
    let Some(connection) = connection else {
        return Vec::new();
    };

    connection
        .edges
        .iter()
        .map(|edge| match &edge.node {
            Value::Object(node) => normalize_node(node.clone()),
            _ => normalize_node(Node::new()),
        })
        .collect()
}
