// Bugzilla API module.
// Cached fetcher, HTTP transport, query canonicalization, and typed endpoints.

pub mod client;
pub mod endpoints;
pub mod fetcher;
pub mod query;
pub mod types;

pub use client::{FetchedResponse, HttpTransport, Transport};
pub use endpoints::BugzillaClient;
pub use fetcher::{CachedFetcher, CachedResponse};
pub use query::{ParamValue, QueryParams, canonicalize};
pub use types::*;
