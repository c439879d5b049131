// Bugzilla API endpoint functions.
// Typed product and bug lookups layered on the cached fetcher.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{BugzillaError, Result};

use super::client::{HttpTransport, Transport};
use super::fetcher::{CachedFetcher, CachedResponse};
use super::query::{ParamValue, QueryParams};
use super::types::{Bug, BugSet, BugsResponse, ComponentSummary, Product, ProductsResponse};

/// Bug query endpoint.
pub const BUG_PATH: &str = "/rest/bug";

/// Classifications searched when the caller does not pick any.
pub const DEFAULT_CLASSIFICATIONS: [&str; 5] = [
    "Client Software",
    "Developer Infrastructure",
    "Components",
    "Server Software",
    "Other",
];

/// Fields returned by `search_bugs` unless overridden.
pub const DEFAULT_INCLUDE_FIELDS: [&str; 6] =
    ["id", "summary", "status", "priority", "severity", "component"];

/// Bugzilla client with cached responses.
pub struct BugzillaClient<T = HttpTransport> {
    fetcher: CachedFetcher<T>,
}

impl BugzillaClient<HttpTransport> {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_fetcher(CachedFetcher::new(config)?))
    }

    /// Create a client configured from `BUGZILLA_HOST` / `BUGZILLA_CACHE_FILE`.
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env())
    }
}

impl<T: Transport> BugzillaClient<T> {
    pub fn with_fetcher(fetcher: CachedFetcher<T>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &CachedFetcher<T> {
        &self.fetcher
    }

    /// Get active milestones and components of a product.
    pub async fn get_product(&self, name: &str, params: QueryParams) -> Result<Product> {
        let response = self
            .fetcher
            .fetch(&format!("/rest/product/{}", name), &params)
            .await?;
        let wrapper: ProductsResponse = decode(&response)?;

        let product = wrapper.products.into_iter().next().ok_or_else(|| {
            BugzillaError::UnexpectedResponse {
                url: response.resolved_url.clone(),
                reason: format!("no product named {}", name),
            }
        })?;

        Ok(Product {
            url: response.resolved_url,
            milestones: product
                .milestones
                .into_iter()
                .filter(|m| m.is_active)
                .collect(),
            components: product
                .components
                .into_iter()
                .filter(|c| c.is_active)
                .map(|c| ComponentSummary {
                    name: c.name,
                    description: c.description,
                })
                .collect(),
        })
    }

    /// Search bugs. Caller params override the default Firefox search.
    pub async fn search_bugs(&self, params: QueryParams) -> Result<BugSet> {
        let defaults = QueryParams::new()
            .with("classification", DEFAULT_CLASSIFICATIONS.to_vec())
            .with("include_fields", DEFAULT_INCLUDE_FIELDS.join(","))
            .with("product", "Firefox")
            .with("resolution", "---");

        let mut params = defaults.merge(params);
        if let Some(ParamValue::Multi(fields)) = params.get("include_fields") {
            let joined = fields.join(",");
            params.insert("include_fields", joined);
        }

        self.query_bugs(BUG_PATH, &params).await
    }

    /// Fetch one or more bugs by id.
    pub async fn get_bug_by_id(&self, ids: &[u64], params: QueryParams) -> Result<BugSet> {
        let params = params.with("id", ParamValue::from(ids).joined());
        self.query_bugs(BUG_PATH, &params).await
    }

    /// Fetch change history for one or more bugs.
    pub async fn get_bug_history(&self, ids: &[u64], params: QueryParams) -> Result<BugSet> {
        let first = ids
            .first()
            .ok_or_else(|| BugzillaError::Other("bug history needs at least one id".to_string()))?;
        let params = params.with("ids", ids);
        self.query_bugs(&format!("/rest/bug/{}/history", first), &params)
            .await
    }

    /// Attach each bug's `history` array.
    pub async fn add_history(&self, bugs: &mut BTreeMap<u64, Bug>) -> Result<()> {
        if bugs.is_empty() {
            return Ok(());
        }

        let ids: Vec<u64> = bugs.keys().copied().collect();
        let history = self.get_bug_history(&ids, QueryParams::new()).await?;

        for (id, bug) in bugs.iter_mut() {
            let events = history
                .get(*id)
                .and_then(|h| h.field("history"))
                .cloned()
                .ok_or_else(|| BugzillaError::UnexpectedResponse {
                    url: history.url.clone(),
                    reason: format!("no history for bug {}", id),
                })?;
            bug.fields.insert("history".to_string(), events);
        }

        Ok(())
    }

    /// Run a bug query and index the results by id.
    pub async fn query_bugs(&self, path: &str, params: &QueryParams) -> Result<BugSet> {
        let response = self.fetcher.fetch(path, params).await?;
        let wrapper: BugsResponse = decode(&response)?;

        Ok(BugSet {
            url: response.resolved_url,
            bugs: wrapper.bugs.into_iter().map(|bug| (bug.id, bug)).collect(),
        })
    }
}

/// Decode a cached payload into an endpoint's response shape.
fn decode<R: DeserializeOwned>(response: &CachedResponse) -> Result<R> {
    serde_json::from_value(response.data.clone()).map_err(|err| BugzillaError::UnexpectedResponse {
        url: response.resolved_url.clone(),
        reason: err.to_string(),
    })
}
