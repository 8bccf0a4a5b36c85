//! Identifier resolution
//!
//! A request supplies an ordered list of user tokens: probe ids or names,
//! gene ids, symbols, Ensembl or RefSeq accessions, freely mixed. The
//! tokens go into a connection-local TEMP table together with their input
//! position, and one query joins probes and genes against that table,
//! restricted to a single (genome, technology) pair. Compared to a flat
//! `IN (?, ?, …)` this keeps the statement size constant regardless of the
//! token count, collapses duplicate tokens in the table itself, and lets
//! the result carry the input ordering without a client-side reorder pass.

use rusqlite::Connection;
use tracing::debug;

use gex_core::{CancelToken, Entity, GexGene, GexResult, Probe};
use gex_store::{query_rows, CatalogStore, SqlArgs};

const CREATE_IDS_SQL: &str = "CREATE TEMP TABLE IF NOT EXISTS ids (
    id TEXT NOT NULL UNIQUE,
    ord INTEGER NOT NULL
)";

const CLEAR_IDS_SQL: &str = "DELETE FROM ids";

// duplicate tokens keep the ord of their first occurrence
const INSERT_ID_SQL: &str =
    "INSERT INTO ids (id, ord) VALUES (:id, :ord) ON CONFLICT (id) DO NOTHING";

// One pass over the token table. A probe can be reached through several
// tokens; grouping keeps its earliest input position and the outer
// ordering restores the caller's sequence.
const FIND_PROBES_SQL: &str = "SELECT
    probes.id,
    probes.public_id,
    probes.name,
    genes.id,
    genes.public_id,
    genes.gene_id,
    genes.gene_symbol,
    genes.ensembl,
    genes.refseq,
    genes.ncbi,
    MIN(ids.ord) AS ord
    FROM ids, probes
    JOIN genes ON genes.id = probes.gene_id
    WHERE probes.genome_id = :genome AND
    probes.technology_id = :technology AND
    (probes.public_id = ids.id OR
    lower(probes.name) LIKE ids.id OR
    genes.public_id = ids.id OR
    lower(genes.gene_symbol) LIKE ids.id OR
    lower(genes.ensembl) = ids.id OR
    lower(genes.refseq) = ids.id)
    GROUP BY probes.id
    ORDER BY ord, probes.id";

/// Resolve `tokens` to probes on one (genome, technology) pair.
///
/// Probes come back de-duplicated and ordered by the first token that
/// matched them. Tokens are expected to be canonicalised already: the
/// facade trims, case-folds and rejects wildcard characters before calling
/// in. A token that matches nothing simply contributes no rows.
pub fn find_probes(
    store: &CatalogStore,
    genome: &Entity,
    technology: &Entity,
    tokens: &[String],
    cancel: &CancelToken,
) -> GexResult<Vec<Probe>> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    // The TEMP table is connection-local: the insert transaction and the
    // follow-up select must run on the same physical connection, which the
    // scope below pins for its whole duration.
    store.with_connection(|conn| {
        load_tokens(conn, tokens, cancel)?;

        cancel.check()?;

        let mut args = SqlArgs::new();
        args.push("genome", genome.id);
        args.push("technology", technology.id);

        let probes = query_rows(conn, FIND_PROBES_SQL, &args, |row| {
            Ok(Probe {
                id: row.get(0)?,
                public_id: row.get(1)?,
                name: row.get(2)?,
                gene: GexGene {
                    id: row.get(3)?,
                    public_id: row.get(4)?,
                    gene_id: row.get(5)?,
                    gene_symbol: row.get(6)?,
                    ensembl: row.get(7)?,
                    refseq: row.get(8)?,
                    ncbi: row.get(9)?,
                },
            })
        })?;

        debug!(
            "resolved {} tokens to {} probes on {}/{}",
            tokens.len(),
            probes.len(),
            genome.name,
            technology.name
        );

        Ok(probes)
    })
}

fn load_tokens(conn: &mut Connection, tokens: &[String], cancel: &CancelToken) -> GexResult<()> {
    let tx = conn.transaction()?;

    tx.execute(CREATE_IDS_SQL, [])?;
    // clear residue from any previous request on this connection
    tx.execute(CLEAR_IDS_SQL, [])?;

    {
        let mut stmt = tx.prepare(INSERT_ID_SQL)?;

        for (i, token) in tokens.iter().enumerate() {
            cancel.check()?;

            stmt.execute(rusqlite::named_params! {
                ":id": token,
                ":ord": (i + 1) as i64,
            })?;
        }
    }

    tx.commit()?;

    Ok(())
}
