// Bugzilla API response types.
// Typed views over product and bug payloads; unknown bug fields stay as JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Product milestone (target release).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub sort_key: i64,
    #[serde(default)]
    pub is_active: bool,
}

/// Product component as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
}

/// Component name and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub name: String,
    pub description: String,
}

/// Active milestones and components of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// URL the product data was served from.
    pub url: String,
    pub milestones: Vec<Milestone>,
    pub components: Vec<ComponentSummary>,
}

/// Raw product entry inside a `/rest/product` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawProduct {
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub components: Vec<Component>,
}

/// Response wrapper for product lookups.
#[derive(Debug, Deserialize)]
pub(crate) struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<RawProduct>,
}

/// A bug. Only `id` is typed; everything else depends on `include_fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    pub id: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Bug {
    /// Look up a field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// History events, once attached.
    pub fn history(&self) -> Option<&Vec<Value>> {
        self.fields.get("history").and_then(Value::as_array)
    }
}

/// Response wrapper for bug queries and bug history.
#[derive(Debug, Deserialize)]
pub(crate) struct BugsResponse {
    #[serde(default)]
    pub bugs: Vec<Bug>,
}

/// Bugs keyed by id, deduplicated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BugSet {
    /// URL the bugs were served from.
    pub url: String,
    pub bugs: BTreeMap<u64, Bug>,
}

impl BugSet {
    pub fn len(&self) -> usize {
        self.bugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bugs.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Bug> {
        self.bugs.get(&id)
    }

    pub fn ids(&self) -> Vec<u64> {
        self.bugs.keys().copied().collect()
    }
}

/// Bugs whose `key` field is the string `value`.
pub fn bugs_by_key<'a>(bugs: &'a BTreeMap<u64, Bug>, key: &str, value: &str) -> Vec<&'a Bug> {
    bugs.values()
        .filter(|bug| bug.field(key).and_then(Value::as_str) == Some(value))
        .collect()
}
