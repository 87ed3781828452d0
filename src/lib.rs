//! # findref - terminal reference lookup
//!
//! findref scrapes vendor documentation (AWS SDK methods, CDK constructs,
//! Terraform resources) into one local search index per dataset and answers
//! keystroke-level queries with the matching documentation URL.
//!
//! ## Architecture
//!
//! - [`query`] - Query routing: dataset selection vs. in-dataset search,
//!   and the index lifecycle (build, refresh, search)
//! - [`dataset`] - The shipped datasets and their registry
//! - [`index`] - On-disk search index with atomic generation swaps
//! - [`item`] - The uniform display row
//! - [`tui`] - Interactive terminal UI
//! - [`output`] - Plain and JSON output for one-shot queries
//! - [`utils`] - Config, logging, tokenizing
//!
//! ## Quick Start
//!
//! ```no_run
//! use findref::dataset::DatasetRegistry;
//! use findref::query::Router;
//! use findref::utils::AppConfig;
//!
//! let config = AppConfig::load().unwrap();
//! let router = Router::new(DatasetRegistry::builtin(&config).unwrap(), config.search_limit);
//!
//! // Builds the index on first use, then searches it
//! for item in router.route_blocking("tf aws s3 bucket").unwrap() {
//!     println!("{} -> {:?}", item.title, item.arg);
//! }
//! ```
//!
//! A query whose first token is an exact dataset id followed by a separator
//! searches that dataset; anything else ranks the datasets. Ending an
//! in-dataset query with `!~` rebuilds that dataset's index first.

pub mod dataset;
pub mod error;
pub mod index;
pub mod item;
pub mod output;
pub mod query;
#[cfg(feature = "interactive")]
pub mod tui;
pub mod utils;

#[cfg(test)]
mod testing;

pub use error::Error;
pub use item::{Item, ItemKind};
