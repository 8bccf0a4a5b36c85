//! Dataset listing
//!
//! One permission-filtered query flat-joins datasets, samples and sample
//! metadata for a (genome, technology) pair; the rows arrive pre-grouped
//! and a single streaming pass folds them into the nested tree. The
//! assembler never re-sorts: sample metadata keeps `sample_metadata.id`
//! order because curated group orderings such as N/GC/M are not
//! alphabetical. A second, much smaller query per dataset attaches the
//! expression types stored for it.

use tracing::debug;

use gex_core::{CancelToken, Dataset, Entity, GexResult, NamedValue, Sample, DEFAULT_NUM_SAMPLES};
use gex_store::{in_clause, permission_clause, CatalogStore, SqlArgs, DATASETS_MARKER};

use crate::entity_from_row;

const DATASETS_SQL: &str = "SELECT
    datasets.id,
    datasets.public_id,
    datasets.name,
    datasets.platform,
    datasets.institution,
    genomes.id,
    genomes.public_id,
    genomes.name,
    technologies.id,
    technologies.public_id,
    technologies.name,
    samples.id,
    samples.public_id,
    samples.name,
    metadata.name,
    sample_metadata.value,
    metadata.color
    FROM datasets
    JOIN genomes ON genomes.id = datasets.genome_id
    JOIN technologies ON technologies.id = datasets.technology_id
    JOIN samples ON samples.dataset_id = datasets.id
    LEFT JOIN sample_metadata ON sample_metadata.sample_id = samples.id
    LEFT JOIN metadata ON metadata.id = sample_metadata.metadata_id
    WHERE lower(genomes.name) = :genome AND
    lower(technologies.name) = :technology AND
    <<PERMISSIONS>>
    ORDER BY datasets.name, samples.name, sample_metadata.id";

const DATASET_EXPR_TYPES_SQL: &str = "SELECT DISTINCT
    expression_types.id,
    expression_types.public_id,
    expression_types.name
    FROM expression_types
    JOIN expression ON expression.expression_type_id = expression_types.id
    JOIN datasets ON datasets.id = expression.dataset_id
    WHERE expression.dataset_id = :dataset AND
    <<PERMISSIONS>>
    ORDER BY expression_types.id";

const EXPR_TYPES_SQL: &str = "SELECT DISTINCT
    expression_types.id,
    expression_types.public_id,
    expression_types.name
    FROM expression_types
    JOIN expression ON expression.expression_type_id = expression_types.id
    JOIN datasets ON datasets.id = expression.dataset_id
    WHERE datasets.public_id IN (<<DATASETS>>) AND
    <<PERMISSIONS>>
    ORDER BY expression_types.name";

/// List the datasets visible to the caller for a (genome, technology)
/// pair, each with its full sample/metadata tree and expression types.
///
/// `genome` and `technology` are matched case-folded; the facade passes
/// them already lower-cased.
pub fn datasets(
    store: &CatalogStore,
    genome: &str,
    technology: &str,
    is_admin: bool,
    permissions: &[String],
    cancel: &CancelToken,
) -> GexResult<Vec<Dataset>> {
    let mut args = SqlArgs::new();
    args.push("genome", genome.to_string());
    args.push("technology", technology.to_string());

    let sql = permission_clause(DATASETS_SQL, is_admin, permissions, &mut args);

    let mut datasets = store.with_connection(|conn| {
        let mut stmt = conn.prepare(&sql)?;
        let params = args.params();
        let mut rows = stmt.query(params.as_slice())?;

        let mut out: Vec<Dataset> = Vec::new();
        let mut current: Option<Dataset> = None;

        while let Some(row) = rows.next()? {
            cancel.check()?;

            let dataset_id: i64 = row.get(0)?;
            let sample_id: i64 = row.get(11)?;

            if current.as_ref().map_or(true, |d| d.id != dataset_id) {
                if let Some(done) = current.take() {
                    out.push(done);
                }

                current = Some(Dataset {
                    id: dataset_id,
                    public_id: row.get(1)?,
                    name: row.get(2)?,
                    platform: row.get(3)?,
                    institution: row.get(4)?,
                    genome: Entity {
                        id: row.get(5)?,
                        public_id: row.get(6)?,
                        name: row.get(7)?,
                    },
                    technology: Entity {
                        id: row.get(8)?,
                        public_id: row.get(9)?,
                        name: row.get(10)?,
                    },
                    // the largest known dataset is around 500 samples
                    samples: Vec::with_capacity(DEFAULT_NUM_SAMPLES),
                    expr_types: Vec::new(),
                });
            }

            if let Some(dataset) = current.as_mut() {
                if dataset.samples.last().map_or(true, |s| s.id != sample_id) {
                    dataset.samples.push(Sample {
                        id: sample_id,
                        public_id: row.get(12)?,
                        name: row.get(13)?,
                        metadata: Vec::new(),
                    });
                }

                // samples without metadata still appear, with empty items
                let meta_name: Option<String> = row.get(14)?;

                if let (Some(sample), Some(name)) = (dataset.samples.last_mut(), meta_name) {
                    sample.metadata.push(NamedValue {
                        name,
                        value: row.get(15)?,
                        color: row.get(16)?,
                    });
                }
            }
        }

        if let Some(done) = current.take() {
            out.push(done);
        }

        Ok(out)
    })?;

    for dataset in &mut datasets {
        cancel.check()?;

        let mut args = SqlArgs::new();
        args.push("dataset", dataset.id);

        let sql = permission_clause(DATASET_EXPR_TYPES_SQL, is_admin, permissions, &mut args);

        dataset.expr_types = store.query_rows(&sql, &args, entity_from_row)?;
    }

    debug!(
        "assembled {} datasets for {}/{}",
        datasets.len(),
        genome,
        technology
    );

    Ok(datasets)
}

/// Distinct expression types stored across the given datasets, filtered by
/// the caller's permissions and sorted by name.
pub fn expr_types(
    store: &CatalogStore,
    dataset_ids: &[String],
    is_admin: bool,
    permissions: &[String],
) -> GexResult<Vec<Entity>> {
    let mut args = SqlArgs::new();

    let sql = in_clause(
        EXPR_TYPES_SQL,
        DATASETS_MARKER,
        "dataset",
        dataset_ids,
        &mut args,
    );
    let sql = permission_clause(&sql, is_admin, permissions, &mut args);

    store.query_rows(&sql, &args, entity_from_row)
}
