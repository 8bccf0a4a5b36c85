//! Core types shared across the gex workspace
//!
//! The gex service answers read-only gene-expression queries: given a
//! dataset, an expression type and a list of gene or probe identifiers,
//! return the per-sample expression vector for each matched probe. This
//! crate holds the entity model, the error taxonomy and the configuration
//! used by the storage and query crates.

pub mod cancel;
pub mod config;
pub mod error;
pub mod types;

pub use cancel::CancelToken;
pub use config::GexConfig;
pub use error::{GexError, GexResult};

// Re-export the entity model
pub use types::{
    BasicDataset, Dataset, Entity, GexGene, NamedValue, Probe, ProbeValues, Sample, SearchResults,
    DEFAULT_NUM_SAMPLES,
};

/// Version information for the gex project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
