//! Pipeline stages for a single jobwatch run.
//!
//! Control flow: fetch → extract → {category filter, recency filter} →
//! dedup → dispatch. Every stage is pure with respect to its input
//! except the deduplication store, which carries state across runs.

pub mod category;
pub mod dedup;
pub mod dispatch;
pub mod extract;
pub mod fetch;
pub mod recency;
pub mod run;

pub use dedup::DeduplicationStore;
pub use dispatch::{DispatchReport, Dispatcher};
pub use extract::SelectorSet;
pub use fetch::FetchError;
pub use recency::RecencyResolver;
pub use run::{filter_document, run_once};
