//! Read-only gene-expression query engine
//!
//! Answers queries of the form: for dataset D, expression type T and an
//! ordered list of gene or probe identifiers, return the per-sample
//! expression vector of every matched probe. The catalog (datasets,
//! samples, genes, probes, block manifest) lives in SQLite; the vectors
//! themselves live in flat binary files addressed by `(file, offset,
//! length)`.
//!
//! [`GexDb`] is the surface the HTTP layer consumes. It owns the catalog
//! store, normalises request input and routes to the resolver, assembler
//! and retrieval modules; it runs no SQL of its own.

pub mod datasets;
pub mod expression;
pub mod probes;

use gex_store::{CatalogStore, SqlArgs};

// Re-export the model so the HTTP layer only needs this crate
pub use gex_core::types;
pub use gex_core::{
    BasicDataset, CancelToken, Dataset, Entity, GexConfig, GexError, GexGene, GexResult,
    NamedValue, Probe, ProbeValues, Sample, SearchResults,
};

const GENOMES_SQL: &str = "SELECT
    genomes.id,
    genomes.public_id,
    genomes.name
    FROM genomes
    ORDER BY genomes.name";

const GENOME_SQL: &str = "SELECT
    genomes.id,
    genomes.public_id,
    genomes.name
    FROM genomes
    WHERE lower(genomes.name) = :name";

const TECHNOLOGIES_SQL: &str = "SELECT
    technologies.id,
    technologies.public_id,
    technologies.name
    FROM technologies
    ORDER BY technologies.name";

const TECHNOLOGY_SQL: &str = "SELECT
    technologies.id,
    technologies.public_id,
    technologies.name
    FROM technologies
    WHERE lower(technologies.name) = :name";

const EXPR_TYPE_SQL: &str = "SELECT
    expression_types.id,
    expression_types.public_id,
    expression_types.name
    FROM expression_types
    WHERE expression_types.public_id = :id OR lower(expression_types.name) = :name";

/// The query engine. One instance per process, shared across request
/// handlers; every operation is read-only and safe to call concurrently.
pub struct GexDb {
    store: CatalogStore,
    config: GexConfig,
}

impl GexDb {
    /// Open the engine over `config.data_dir`, which must hold the
    /// catalog (`gex.db`) and the expression data files it references.
    pub fn open(config: GexConfig) -> GexResult<GexDb> {
        let store = CatalogStore::open(&config.data_dir)?;

        Ok(GexDb { store, config })
    }

    pub fn config(&self) -> &GexConfig {
        &self.config
    }

    pub fn genomes(&self) -> GexResult<Vec<Entity>> {
        self.store
            .query_rows(GENOMES_SQL, &SqlArgs::new(), entity_from_row)
    }

    pub fn technologies(&self) -> GexResult<Vec<Entity>> {
        self.store
            .query_rows(TECHNOLOGIES_SQL, &SqlArgs::new(), entity_from_row)
    }

    /// Look up a genome by name, case-insensitively.
    pub fn genome(&self, name: &str) -> GexResult<Entity> {
        let mut args = SqlArgs::new();
        args.push("name", name.trim().to_lowercase());

        self.store
            .query_row_opt(GENOME_SQL, &args, entity_from_row)?
            .ok_or_else(|| GexError::NotFound(format!("genome {name}")))
    }

    /// Look up a technology by name, case-insensitively.
    pub fn technology(&self, name: &str) -> GexResult<Entity> {
        let mut args = SqlArgs::new();
        args.push("name", name.trim().to_lowercase());

        self.store
            .query_row_opt(TECHNOLOGY_SQL, &args, entity_from_row)?
            .ok_or_else(|| GexError::NotFound(format!("technology {name}")))
    }

    /// Resolve an expression type from either its public id or its name
    /// (`TPM`, `Counts`, …).
    pub fn expr_type(&self, id_or_name: &str) -> GexResult<Entity> {
        let token = id_or_name.trim();

        let mut args = SqlArgs::new();
        args.push("id", token.to_string());
        args.push("name", token.to_lowercase());

        self.store
            .query_row_opt(EXPR_TYPE_SQL, &args, entity_from_row)?
            .ok_or_else(|| GexError::NotFound(format!("expression type {id_or_name}")))
    }

    /// Datasets visible to the caller for a (genome, technology) pair,
    /// with full sample trees and available expression types.
    pub fn datasets(
        &self,
        genome: &str,
        technology: &str,
        is_admin: bool,
        permissions: &[String],
        cancel: &CancelToken,
    ) -> GexResult<Vec<Dataset>> {
        datasets::datasets(
            &self.store,
            &genome.trim().to_lowercase(),
            &technology.trim().to_lowercase(),
            is_admin,
            permissions,
            cancel,
        )
    }

    /// Distinct expression types available across `dataset_ids`.
    pub fn expr_types(
        &self,
        dataset_ids: &[String],
        is_admin: bool,
        permissions: &[String],
    ) -> GexResult<Vec<Entity>> {
        let dataset_ids = truncate(dataset_ids, self.config.max_datasets);

        datasets::expr_types(&self.store, dataset_ids, is_admin, permissions)
    }

    /// Resolve user identifier tokens to probes on one (genome,
    /// technology) pair, preserving input order and de-duplicating.
    pub fn find_probes(
        &self,
        genome: &str,
        technology: &str,
        tokens: &[String],
        cancel: &CancelToken,
    ) -> GexResult<Vec<Probe>> {
        let genome = self.genome(genome)?;
        let technology = self.technology(technology)?;

        let tokens = normalize_tokens(tokens, self.config.max_probes)?;

        probes::find_probes(&self.store, &genome, &technology, &tokens, cancel)
    }

    /// Expression vectors of `probes` in one dataset for one expression
    /// type.
    pub fn expression(
        &self,
        dataset_id: &str,
        expr_type: &Entity,
        probes: &[Probe],
        is_admin: bool,
        permissions: &[String],
        cancel: &CancelToken,
    ) -> GexResult<SearchResults> {
        let probes = truncate(probes, self.config.max_probes);

        expression::expression(
            &self.store,
            dataset_id,
            expr_type,
            probes,
            is_admin,
            permissions,
            cancel,
        )
    }

    /// Expression across several datasets; datasets the caller cannot see
    /// are skipped, everything else propagates.
    pub fn expressions(
        &self,
        dataset_ids: &[String],
        expr_type: &Entity,
        probes: &[Probe],
        is_admin: bool,
        permissions: &[String],
        cancel: &CancelToken,
    ) -> GexResult<Vec<SearchResults>> {
        let dataset_ids = truncate(dataset_ids, self.config.max_datasets);
        let probes = truncate(probes, self.config.max_probes);

        expression::expressions(
            &self.store,
            dataset_ids,
            expr_type,
            probes,
            is_admin,
            permissions,
            cancel,
        )
    }
}

pub(crate) fn entity_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entity> {
    Ok(Entity {
        id: row.get(0)?,
        public_id: row.get(1)?,
        name: row.get(2)?,
    })
}

fn truncate<T>(items: &[T], max: usize) -> &[T] {
    if items.len() > max {
        &items[..max]
    } else {
        items
    }
}

/// Canonicalise user tokens: trim, case-fold, drop empties and cap the
/// list length. Wildcard characters are rejected outright; `_` is allowed
/// because probeset names legitimately contain it.
fn normalize_tokens(tokens: &[String], max: usize) -> GexResult<Vec<String>> {
    let mut out = Vec::with_capacity(tokens.len().min(max));

    for token in tokens {
        let token = token.trim().to_lowercase();

        if token.is_empty() {
            continue;
        }

        if token.contains('*') || token.contains('%') {
            return Err(GexError::InvalidInput(format!("wildcard in token {token}")));
        }

        out.push(token);

        if out.len() == max {
            break;
        }
    }

    Ok(out)
}
