//! Entity model for the expression catalog

pub mod dataset;
pub mod entity;
pub mod gene;
pub mod results;

pub use dataset::{BasicDataset, Dataset, NamedValue, Sample, DEFAULT_NUM_SAMPLES};
pub use entity::Entity;
pub use gene::{GexGene, Probe};
pub use results::{ProbeValues, SearchResults};

// Technology names as stored in the catalog
pub const RNA_SEQ_TECHNOLOGY: &str = "RNA-seq";
pub const MICROARRAY_TECHNOLOGY: &str = "Microarray";

// Quantification method names
pub const EXPR_TYPE_COUNTS: &str = "Counts";
pub const EXPR_TYPE_TPM: &str = "TPM";
pub const EXPR_TYPE_VST: &str = "VST";
pub const EXPR_TYPE_RMA: &str = "RMA";
