//! Entity fetch collaborators.

pub mod http;

pub use http::HttpFetcher;

use std::future::Future;

use crate::error::Result;

/// Returns relation-protocol text scoped to one entity.
///
/// No caching is expected here; the session decides when a fetch is needed.
pub trait Fetcher {
    fn fetch_entity(&self, id: &str) -> impl Future<Output = Result<String>>;
}
