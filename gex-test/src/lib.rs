//! Test utilities for the gex workspace
//!
//! Provides a schema-complete catalog fixture on a temporary directory plus
//! helpers for writing packed expression blocks, so integration tests can
//! exercise the real store against real files instead of mocks.

pub mod blocks;
pub mod catalog;

pub use blocks::write_block;
pub use catalog::CatalogFixture;

// Re-export test dependencies for convenience
pub use anyhow::{Context, Result};
pub use tempfile;

/// Initialize test logging (call once per test)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
