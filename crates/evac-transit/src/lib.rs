//! `evac-transit` — turns an external transit feed into shuttle routes.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`polyline`] | `decode_polyline`: 5-digit signed-delta polyline codec      |
//! | [`feed`]     | payload parsing, `FeedSource` trait, `FeedData`, stop lookup |
//! | [`route`]    | `RouteBuilder`, `ShuttleRoute`, `TransitStop`                |
//! | [`error`]    | `TransitError`, `TransitResult<T>`                           |
//!
//! # Failure model
//!
//! Nothing here can stop a run.  Fetch, parse, and shape failures are
//! logged and degrade to "no data"; a route builder given no usable
//! geometry produces a synthetic loop over the drive network instead.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                    |
//! |---------|-----------------------------------------------------------|
//! | `http`  | Enables `HttpFeedSource` (blocking `reqwest` client).     |
//! | `serde` | Derives `Serialize`/`Deserialize` on route types.         |

pub mod error;
pub mod feed;
pub mod polyline;
pub mod route;

#[cfg(test)]
mod tests;

pub use error::{TransitError, TransitResult};
#[cfg(feature = "http")]
pub use feed::HttpFeedSource;
pub use feed::{
    FeedData, FeedSource, FeedStop, StaticFeedSource, extract_routes, extract_stops,
    fetch_shuttle_stops, parse_payload,
};
pub use polyline::decode_polyline;
pub use route::{RouteBuilder, RouteOrigin, ShuttleRoute, TransitStop};
