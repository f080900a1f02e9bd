//! Network seam for loading the dataset.

pub mod traits;

pub use traits::{DataFetcher, FetchFuture};
