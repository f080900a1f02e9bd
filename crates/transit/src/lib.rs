//! # sitp-transit
//!
//! Read-only catalog of the static transit dataset behind the route viewer.
//!
//! ## Features
//!
//! - **Static catalog**: routes, stops and frequency profiles loaded once and never mutated
//! - **Case-insensitive stop codes**: the external-facing stop identifier used by deep links
//! - **Pluggable networking**: implement [`DataFetcher`] to fetch dataset files
//! - **GTFS compiler** (feature `compiler`): turn a GTFS feed into the dataset files
//!
//! ## Example
//!
//! ```
//! use sitp_transit::prelude::*;
//! use geo::Point;
//!
//! let route = RouteMeta::new("r1", "1", "Portal Norte - Centro", "E41A1C", "FFFFFF");
//!
//! let stop = Stop {
//!     id: StopIdentifier::new("s1"),
//!     code: "123A".into(),
//!     name: "Calle 100".into(),
//!     location: Point::new(-74.05, 4.68),
//!     route_ids: [RouteIdentifier::new("r1")].into_iter().collect(),
//! };
//!
//! let catalog = StaticCatalog::from_data(vec![route], vec![stop], Default::default());
//!
//! // Stop codes are matched case-insensitively
//! let found = catalog.stop_by_code("123a").unwrap();
//! assert_eq!(found.name.as_ref(), "Calle 100");
//! assert_eq!(catalog.routes_serving(&found).len(), 1);
//! ```

pub mod identifiers;
pub mod models;
pub mod network;
pub mod provider;

#[cfg(feature = "compiler")]
pub mod compiler;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::{traits::*, types::*};
    pub use crate::network::traits::*;
    pub use crate::provider::static_provider::StaticCatalog;
}

pub use prelude::*;
