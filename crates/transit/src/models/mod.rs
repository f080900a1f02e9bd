//! Catalog data models, types, and traits.

#[cfg(feature = "serde")]
pub mod records;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use traits::CatalogProvider;
pub use types::{FrequencyProfile, HourlyFrequency, RouteMeta, Stop, TransitError, Result};
