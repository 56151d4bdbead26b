use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::connection::Node;

/// Decode a normalized connection node into a list item.
///
/// Decoding never fails: a node that does not fit the item shape degrades to
/// a default item that only carries the node's `id`.
pub trait FromNode: DeserializeOwned + Default {
    fn set_id(&mut self, id: String);

    fn from_node(node: Node) -> Self {
        let id = node
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match serde_json::from_value::<Self>(Value::Object(node)) {
            Ok(item) => item,
            Err(err) => {
                tracing::warn!(%id, error = %err, "node does not match the expected item shape");
                let mut item = Self::default();
                item.set_id(id);
                item
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Language {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct License {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "count")]
    pub fork_count: u64,
    #[serde(default)]
    pub license_info: Option<License>,
    #[serde(default)]
    pub primary_language: Option<Language>,
    #[serde(default)]
    pub url: Option<String>,
}

impl FromNode for Repository {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// A user as it appears in follower, following, people and organization lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl FromNode for Person {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// What a tab lists, which also decides its loading skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Repository,
    Person,
}

/// One row of a profile list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Repository(Repository),
    Person(Person),
}

impl Entry {
    pub fn from_node(kind: ItemKind, node: Node) -> Self {
        match kind {
            ItemKind::Repository => Entry::Repository(Repository::from_node(node)),
            ItemKind::Person => Entry::Person(Person::from_node(node)),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entry::Repository(repo) => &repo.id,
            Entry::Person(person) => &person.id,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Entry::Repository(repo) => repo.url.as_deref(),
            Entry::Person(person) => person.url.as_deref(),
        }
    }
}

/// Fork counts have been seen serialized as floats (`12.0`).
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|n| n.is_finite() && *n > 0.0).map_or(0, |n| n as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(value: Value) -> Node {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn repository_from_full_node() {
        let repo = Repository::from_node(node(json!({
            "id": "ba86",
            "name": "learning-graphql",
            "description": "repository description",
            "forkCount": 123.0,
            "licenseInfo": { "name": "MIT" },
            "primaryLanguage": { "color": "#f1e05a", "name": "JavaScript" },
            "url": "https://github.com/belchior/learning-graphql",
            "owner": { "_id": { "$oid": "48ce" } }
        })));

        assert_eq!(repo.id, "ba86");
        assert_eq!(repo.name, "learning-graphql");
        assert_eq!(repo.fork_count, 123);
        assert_eq!(repo.license_info.map(|l| l.name).as_deref(), Some("MIT"));
        assert_eq!(
            repo.primary_language.map(|l| l.name).as_deref(),
            Some("JavaScript")
        );
    }

    #[test]
    fn person_with_sparse_fields() {
        let person = Person::from_node(node(json!({ "id": "1", "login": "belchior", "bio": null })));
        assert_eq!(person.login, "belchior");
        assert_eq!(person.bio, None);
        assert_eq!(person.name, None);
    }

    #[test]
    fn mismatched_node_keeps_its_id() {
        let person = Person::from_node(node(json!({ "id": "7", "login": 42 })));
        assert_eq!(
            person,
            Person {
                id: "7".to_string(),
                ..Person::default()
            }
        );
    }

    #[test]
    fn entry_dispatches_on_kind() {
        let entry = Entry::from_node(
            ItemKind::Person,
            node(json!({ "id": "9", "login": "tc39", "url": "https://github.com/tc39" })),
        );
        assert!(matches!(entry, Entry::Person(_)));
        assert_eq!(entry.id(), "9");
        assert_eq!(entry.url(), Some("https://github.com/tc39"));
    }

    #[test]
    fn negative_fork_count_is_zero() {
        let repo = Repository::from_node(node(json!({ "id": "r", "forkCount": -3 })));
        assert_eq!(repo.fork_count, 0);
    }
}
