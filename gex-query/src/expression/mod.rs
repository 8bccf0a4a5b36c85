//! Expression retrieval
//!
//! For each requested probe the catalog yields a `(file, offset, length)`
//! locator; the block at that location is read, its leading probe key is
//! checked against the probe the catalog claimed it belongs to, and the
//! decoded vector joins the results. A key mismatch means the catalog and
//! the data files have drifted and the whole request fails; no partial
//! vector reaches the caller.

use tracing::debug;

use gex_core::{
    BasicDataset, CancelToken, Entity, GexError, GexResult, Probe, ProbeValues, SearchResults,
};
use gex_store::{permission_clause, read_block, CatalogStore, SqlArgs};

const BASIC_DATASET_SQL: &str = "SELECT
    datasets.id,
    datasets.public_id,
    datasets.name,
    datasets.platform,
    datasets.institution
    FROM datasets
    WHERE datasets.public_id = :dataset AND
    <<PERMISSIONS>>";

const SAMPLE_COUNT_SQL: &str =
    "SELECT COUNT(samples.id) FROM samples WHERE samples.dataset_id = :dataset";

const LOCATOR_SQL: &str = "SELECT
    files.url,
    expression.offset,
    expression.length
    FROM expression
    JOIN files ON files.id = expression.file_id
    JOIN datasets ON datasets.id = expression.dataset_id
    WHERE expression.dataset_id = :dataset AND
    expression.probe_id = :probe AND
    expression.expression_type_id = :type AND
    <<PERMISSIONS>>";

struct Locator {
    file_url: String,
    offset: i64,
    length: i64,
}

/// Look up a dataset header by public id under the caller's permissions.
///
/// A dataset the caller may not see resolves exactly like one that does
/// not exist.
pub fn basic_dataset(
    store: &CatalogStore,
    dataset_id: &str,
    is_admin: bool,
    permissions: &[String],
) -> GexResult<BasicDataset> {
    let mut args = SqlArgs::new();
    args.push("dataset", dataset_id.to_string());

    let sql = permission_clause(BASIC_DATASET_SQL, is_admin, permissions, &mut args);

    store
        .query_row_opt(&sql, &args, |row| {
            Ok(BasicDataset {
                id: row.get(0)?,
                public_id: row.get(1)?,
                name: row.get(2)?,
                platform: row.get(3)?,
                institution: row.get(4)?,
            })
        })?
        .ok_or_else(|| GexError::NotFound(format!("dataset {dataset_id}")))
}

/// Retrieve the expression vectors of `probes` for one dataset and
/// expression type. Probes keep their input order; `values[i]` belongs to
/// sample `i` of the dataset.
pub fn expression(
    store: &CatalogStore,
    dataset_id: &str,
    expr_type: &Entity,
    probes: &[Probe],
    is_admin: bool,
    permissions: &[String],
    cancel: &CancelToken,
) -> GexResult<SearchResults> {
    let dataset = basic_dataset(store, dataset_id, is_admin, permissions)?;

    expression_for(store, dataset, expr_type, probes, is_admin, permissions, cancel)
}

fn expression_for(
    store: &CatalogStore,
    dataset: BasicDataset,
    expr_type: &Entity,
    probes: &[Probe],
    is_admin: bool,
    permissions: &[String],
    cancel: &CancelToken,
) -> GexResult<SearchResults> {
    let sample_count = sample_count(store, &dataset)?;

    let mut results = SearchResults {
        dataset,
        expr_type: expr_type.clone(),
        probes: Vec::with_capacity(probes.len()),
    };

    for probe in probes {
        cancel.check()?;

        let locator = locator(
            store,
            &results.dataset,
            probe,
            expr_type,
            is_admin,
            permissions,
        )?;

        // every vector in a dataset spans exactly its samples
        if locator.length != sample_count {
            return Err(GexError::Integrity(format!(
                "expression for probe {} holds {} values for {} samples",
                probe.public_id, locator.length, sample_count
            )));
        }

        let offset = u64::try_from(locator.offset).map_err(|_| {
            GexError::Integrity(format!(
                "negative block offset for probe {}",
                probe.public_id
            ))
        })?;
        let length = usize::try_from(locator.length).map_err(|_| {
            GexError::Integrity(format!(
                "negative block length for probe {}",
                probe.public_id
            ))
        })?;

        let path = store.dir().join(&locator.file_url);
        let (stored_key, values) = read_block(&path, offset, length)?;

        // the block header is the drift detector: the file must agree with
        // the catalog row that pointed at it
        if i64::from(stored_key) != probe.id {
            return Err(GexError::Integrity(format!(
                "block for probe {} carries key {}",
                probe.public_id, stored_key
            )));
        }

        debug!("read {} values for probe {}", values.len(), probe.public_id);

        results.probes.push(ProbeValues {
            probe: probe.clone(),
            values,
        });
    }

    Ok(results)
}

/// Multi-dataset convenience wrapper. Datasets that resolve as missing,
/// which is also how denial presents, are skipped; any error below the
/// dataset level aborts the whole request.
pub fn expressions(
    store: &CatalogStore,
    dataset_ids: &[String],
    expr_type: &Entity,
    probes: &[Probe],
    is_admin: bool,
    permissions: &[String],
    cancel: &CancelToken,
) -> GexResult<Vec<SearchResults>> {
    let mut out = Vec::with_capacity(dataset_ids.len());

    for dataset_id in dataset_ids {
        cancel.check()?;

        let dataset = match basic_dataset(store, dataset_id, is_admin, permissions) {
            Ok(dataset) => dataset,
            Err(err) if err.is_not_found() => {
                debug!("skipping dataset {dataset_id}");
                continue;
            }
            Err(err) => return Err(err),
        };

        out.push(expression_for(
            store,
            dataset,
            expr_type,
            probes,
            is_admin,
            permissions,
            cancel,
        )?);
    }

    Ok(out)
}

fn sample_count(store: &CatalogStore, dataset: &BasicDataset) -> GexResult<i64> {
    let mut args = SqlArgs::new();
    args.push("dataset", dataset.id);

    let count = store
        .query_row_opt(SAMPLE_COUNT_SQL, &args, |row| row.get(0))?
        .unwrap_or(0);

    Ok(count)
}

fn locator(
    store: &CatalogStore,
    dataset: &BasicDataset,
    probe: &Probe,
    expr_type: &Entity,
    is_admin: bool,
    permissions: &[String],
) -> GexResult<Locator> {
    let mut args = SqlArgs::new();
    args.push("dataset", dataset.id);
    args.push("probe", probe.id);
    args.push("type", expr_type.id);

    let sql = permission_clause(LOCATOR_SQL, is_admin, permissions, &mut args);

    store
        .query_row_opt(&sql, &args, |row| {
            Ok(Locator {
                file_url: row.get(0)?,
                offset: row.get(1)?,
                length: row.get(2)?,
            })
        })?
        .ok_or_else(|| {
            GexError::NotFound(format!(
                "no {} expression for probe {} in dataset {}",
                expr_type.name, probe.public_id, dataset.public_id
            ))
        })
}
