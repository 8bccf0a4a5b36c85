//! Catalog fixture
//!
//! Builds a real `gex.db` on a temporary directory with the full catalog
//! schema and typed seeding helpers. The fixture keeps its own read-write
//! connection; the code under test opens the same file read-only.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rusqlite::Connection;
use tempfile::TempDir;

use gex_core::{BasicDataset, Entity, GexGene, NamedValue, Probe, Sample};

use crate::blocks::write_block;

const SCHEMA: &str = "
CREATE TABLE genomes (
    id INTEGER PRIMARY KEY,
    public_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL
);
CREATE TABLE technologies (
    id INTEGER PRIMARY KEY,
    public_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL
);
CREATE TABLE datasets (
    id INTEGER PRIMARY KEY,
    public_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    platform TEXT NOT NULL,
    institution TEXT NOT NULL,
    genome_id INTEGER NOT NULL REFERENCES genomes(id),
    technology_id INTEGER NOT NULL REFERENCES technologies(id)
);
CREATE TABLE samples (
    id INTEGER PRIMARY KEY,
    public_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    dataset_id INTEGER NOT NULL REFERENCES datasets(id)
);
CREATE TABLE metadata (
    id INTEGER PRIMARY KEY,
    public_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    color TEXT
);
CREATE TABLE sample_metadata (
    id INTEGER PRIMARY KEY,
    sample_id INTEGER NOT NULL REFERENCES samples(id),
    metadata_id INTEGER NOT NULL REFERENCES metadata(id),
    value TEXT NOT NULL
);
CREATE TABLE genes (
    id INTEGER PRIMARY KEY,
    public_id TEXT NOT NULL UNIQUE,
    gene_id TEXT NOT NULL,
    gene_symbol TEXT NOT NULL,
    ensembl TEXT,
    refseq TEXT,
    ncbi TEXT
);
CREATE TABLE probes (
    id INTEGER PRIMARY KEY,
    public_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    genome_id INTEGER NOT NULL REFERENCES genomes(id),
    technology_id INTEGER NOT NULL REFERENCES technologies(id),
    gene_id INTEGER NOT NULL REFERENCES genes(id)
);
CREATE TABLE expression_types (
    id INTEGER PRIMARY KEY,
    public_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL
);
CREATE TABLE files (
    id INTEGER PRIMARY KEY,
    url TEXT NOT NULL UNIQUE
);
CREATE TABLE expression (
    id INTEGER PRIMARY KEY,
    dataset_id INTEGER NOT NULL REFERENCES datasets(id),
    probe_id INTEGER NOT NULL REFERENCES probes(id),
    expression_type_id INTEGER NOT NULL REFERENCES expression_types(id),
    file_id INTEGER NOT NULL REFERENCES files(id),
    offset INTEGER NOT NULL,
    length INTEGER NOT NULL
);
CREATE TABLE permissions (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE dataset_permissions (
    dataset_id INTEGER NOT NULL REFERENCES datasets(id),
    permission_id INTEGER NOT NULL REFERENCES permissions(id)
);
";

/// A seeded catalog on disk. Dropping the fixture removes the directory.
pub struct CatalogFixture {
    dir: TempDir,
    conn: Connection,
    next_id: Cell<u32>,
}

impl CatalogFixture {
    pub fn new() -> Result<CatalogFixture> {
        let dir = TempDir::new()?;
        let conn = Connection::open(dir.path().join("gex.db"))?;
        conn.execute_batch(SCHEMA)?;

        Ok(CatalogFixture {
            dir,
            conn,
            next_id: Cell::new(0),
        })
    }

    /// Data directory holding `gex.db` and the expression files.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Direct access for tests that need bespoke rows.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn public_id(&self, prefix: &str) -> String {
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        format!("{prefix}-{n:04}")
    }

    pub fn add_genome(&self, name: &str) -> Result<Entity> {
        self.add_entity("genomes", "gnm", name)
    }

    pub fn add_technology(&self, name: &str) -> Result<Entity> {
        self.add_entity("technologies", "tec", name)
    }

    pub fn add_expr_type(&self, name: &str) -> Result<Entity> {
        self.add_entity("expression_types", "exp", name)
    }

    fn add_entity(&self, table: &str, prefix: &str, name: &str) -> Result<Entity> {
        let public_id = self.public_id(prefix);
        self.conn.execute(
            &format!("INSERT INTO {table} (public_id, name) VALUES (?1, ?2)"),
            (&public_id, name),
        )?;

        Ok(Entity::new(self.conn.last_insert_rowid(), public_id, name))
    }

    pub fn add_dataset(
        &self,
        name: &str,
        platform: &str,
        institution: &str,
        genome: &Entity,
        technology: &Entity,
    ) -> Result<BasicDataset> {
        let public_id = self.public_id("dst");
        self.conn.execute(
            "INSERT INTO datasets (public_id, name, platform, institution, genome_id, technology_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (&public_id, name, platform, institution, genome.id, technology.id),
        )?;

        Ok(BasicDataset {
            id: self.conn.last_insert_rowid(),
            public_id,
            name: name.to_string(),
            platform: platform.to_string(),
            institution: institution.to_string(),
        })
    }

    /// Attach a permission tag to a dataset, creating the tag on first use.
    pub fn grant(&self, dataset: &BasicDataset, permission: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO permissions (name) VALUES (?1)",
            (permission,),
        )?;
        let permission_id: i64 = self.conn.query_row(
            "SELECT id FROM permissions WHERE name = ?1",
            (permission,),
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT INTO dataset_permissions (dataset_id, permission_id) VALUES (?1, ?2)",
            (dataset.id, permission_id),
        )?;

        Ok(())
    }

    /// Add a sample with ordered `(name, value)` metadata items.
    pub fn add_sample(
        &self,
        dataset: &BasicDataset,
        name: &str,
        metadata: &[(&str, &str)],
    ) -> Result<Sample> {
        let public_id = self.public_id("smp");
        self.conn.execute(
            "INSERT INTO samples (public_id, name, dataset_id) VALUES (?1, ?2, ?3)",
            (&public_id, name, dataset.id),
        )?;
        let sample_id = self.conn.last_insert_rowid();

        let mut items = Vec::with_capacity(metadata.len());

        for (meta_name, value) in metadata {
            let metadata_id = self.metadata_key(meta_name, None)?;
            self.conn.execute(
                "INSERT INTO sample_metadata (sample_id, metadata_id, value) VALUES (?1, ?2, ?3)",
                (sample_id, metadata_id, value),
            )?;
            items.push(NamedValue {
                name: meta_name.to_string(),
                value: value.to_string(),
                color: None,
            });
        }

        Ok(Sample {
            id: sample_id,
            public_id,
            name: name.to_string(),
            metadata: items,
        })
    }

    /// Find-or-create a metadata definition row.
    pub fn metadata_key(&self, name: &str, color: Option<&str>) -> Result<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row("SELECT id FROM metadata WHERE name = ?1", (name,), |row| {
                row.get(0)
            })
            .map(Some)
            .or_else(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let public_id = self.public_id("met");
        self.conn.execute(
            "INSERT INTO metadata (public_id, name, color) VALUES (?1, ?2, ?3)",
            (&public_id, name, color),
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn add_gene(
        &self,
        gene_id: &str,
        gene_symbol: &str,
        ensembl: Option<&str>,
        refseq: Option<&str>,
        ncbi: Option<&str>,
    ) -> Result<GexGene> {
        let public_id = self.public_id("gen");
        self.conn.execute(
            "INSERT INTO genes (public_id, gene_id, gene_symbol, ensembl, refseq, ncbi)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (&public_id, gene_id, gene_symbol, ensembl, refseq, ncbi),
        )?;

        Ok(GexGene {
            id: self.conn.last_insert_rowid(),
            public_id,
            gene_id: gene_id.to_string(),
            gene_symbol: gene_symbol.to_string(),
            ensembl: ensembl.map(str::to_string),
            refseq: refseq.map(str::to_string),
            ncbi: ncbi.map(str::to_string),
        })
    }

    pub fn add_probe(
        &self,
        name: &str,
        genome: &Entity,
        technology: &Entity,
        gene: &GexGene,
    ) -> Result<Probe> {
        let public_id = self.public_id("prb");
        self.conn.execute(
            "INSERT INTO probes (public_id, name, genome_id, technology_id, gene_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (&public_id, name, genome.id, technology.id, gene.id),
        )?;

        Ok(Probe {
            id: self.conn.last_insert_rowid(),
            public_id,
            name: name.to_string(),
            gene: gene.clone(),
        })
    }

    /// Store an expression vector for `(dataset, probe, expr_type)`: the
    /// block is appended to `file_url` under the data directory and the
    /// manifest row records its location. The block header uses the
    /// probe's own key.
    pub fn add_expression(
        &self,
        dataset: &BasicDataset,
        probe: &Probe,
        expr_type: &Entity,
        file_url: &str,
        values: &[f32],
    ) -> Result<()> {
        self.add_expression_with_key(dataset, probe, expr_type, file_url, probe.id as u32, values)
    }

    /// Like [`add_expression`] but with an explicit stored header key, for
    /// drift scenarios where the file disagrees with the catalog.
    pub fn add_expression_with_key(
        &self,
        dataset: &BasicDataset,
        probe: &Probe,
        expr_type: &Entity,
        file_url: &str,
        stored_key: u32,
        values: &[f32],
    ) -> Result<()> {
        let path: PathBuf = self.dir.path().join(file_url);
        let (offset, length) = write_block(&path, stored_key, values)?;

        self.conn.execute(
            "INSERT OR IGNORE INTO files (url) VALUES (?1)",
            (file_url,),
        )?;
        let file_id: i64 =
            self.conn
                .query_row("SELECT id FROM files WHERE url = ?1", (file_url,), |row| {
                    row.get(0)
                })?;

        self.conn.execute(
            "INSERT INTO expression (dataset_id, probe_id, expression_type_id, file_id, offset, length)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (dataset.id, probe.id, expr_type.id, file_id, offset as i64, length as i64),
        )?;

        Ok(())
    }
}
