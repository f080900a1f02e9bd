//! Fetching dataset files.
//!
//! The catalog crate never does I/O itself. Hosts hand it a [`DataFetcher`]
//! (HTTP in the browser build, a map of files in tests) and the catalog client
//! resolves dataset file names against its base path before calling it.

use std::future::Future;
use std::pin::Pin;

use crate::models::types::Result;

/// Boxed future of a fetch, borrowing the fetcher and the location
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;

/// Source of raw dataset bytes
///
/// `location` is a full URL or a path relative to the app root, exactly as
/// built by the catalog client. Failures are reported as
/// [`TransitError::Network`](crate::TransitError::Network).
pub trait DataFetcher: Send + Sync {
    fn fetch<'a>(&'a self, location: &'a str) -> FetchFuture<'a>;
}
