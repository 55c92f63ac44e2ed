//! Topic harvest
//!
//! # Overview
//!
//! Library collecting metadata of every GitHub repository tagged with a topic.
//! Given a topic (`hack-for-la` by default), library searches the most recently updated tagged repositories.
//! Then, for each repository, it fetches the repository languages, its contributors, its issue comments and optionally its issues.
//! Paginated resources are fetched concurrently, page count being read from the `Link` header of the first page.
//! Raw API objects are reduced to a fixed set of fields before being stored.
//! Every fetch is settled into a `FetchSlot` either with data or with an error, so a single failing request does not stop the harvest.
//! Harvested repositories are returned in search order and handed to a `Sink` once every category has completed.

#[cfg(feature = "api")]
pub mod api;
pub mod error;
pub mod model;
pub mod projection;
pub mod sink;

#[cfg(feature = "aggregator")]
mod aggregator;

#[cfg(feature = "aggregator")]
pub use aggregator::{Categories, HarvestConfig, Harvester};
pub use model::{Category, FetchSlot, RepositoryRecord, SlotState};
pub use sink::{JsonFileSink, Sink};
