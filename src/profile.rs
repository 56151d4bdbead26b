use serde::Deserialize;
use serde_json::Value;

use crate::connection::{normalize_node, CursorConnection};
use crate::error::Result;

const TYPENAME: &str = "__typename";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    /// Filled in by a separate `/user/{login}/organizations` request.
    #[serde(skip)]
    pub organizations: Option<CursorConnection>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default)]
    pub id: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
}

/// A profile page subject, keyed on the backend's `__typename` discriminator.
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    User(User),
    Organization(Organization),
    NotFound,
}

impl Profile {
    /// Anything without a known discriminator (including the backend's 404
    /// error body) is `NotFound`. A known discriminator with a body that does
    /// not fit is an error.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Ok(Profile::NotFound);
        };

        let typename = map
            .get(TYPENAME)
            .and_then(Value::as_str)
            .map(str::to_string);
        let body = Value::Object(normalize_node(map));

        match typename.as_deref() {
            Some("User") => Ok(Profile::User(serde_json::from_value(body)?)),
            Some("Organization") => Ok(Profile::Organization(serde_json::from_value(body)?)),
            other => {
                tracing::debug!(typename = ?other, "unknown profile type");
                Ok(Profile::NotFound)
            }
        }
    }

    pub fn login(&self) -> Option<&str> {
        match self {
            Profile::User(user) => Some(&user.login),
            Profile::Organization(org) => Some(&org.login),
            Profile::NotFound => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Profile::User(user) => user.url.as_deref(),
            Profile::Organization(org) => org.url.as_deref(),
            Profile::NotFound => None,
        }
    }
}
