/// Integration tests for dataset listing and assembly
use gex_core::{CancelToken, GexConfig, GexError};
use gex_query::GexDb;
use gex_test::CatalogFixture;
use pretty_assertions::assert_eq;

mod helpers {
    use super::*;

    pub fn open(fixture: &CatalogFixture) -> GexDb {
        GexDb::open(GexConfig::new(fixture.dir())).unwrap()
    }

    pub fn admin_datasets(
        db: &GexDb,
        genome: &str,
        technology: &str,
    ) -> Vec<gex_core::Dataset> {
        db.datasets(genome, technology, true, &[], &CancelToken::new())
            .unwrap()
    }
}

#[test]
fn test_genome_and_technology_listings_are_name_ordered() {
    let fixture = CatalogFixture::new().unwrap();
    fixture.add_genome("mm10").unwrap();
    fixture.add_genome("hg38").unwrap();
    fixture.add_technology("RNA-seq").unwrap();
    fixture.add_technology("Microarray").unwrap();

    let db = helpers::open(&fixture);

    let genomes: Vec<String> = db.genomes().unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(genomes, vec!["hg38".to_string(), "mm10".to_string()]);

    let technologies: Vec<String> = db
        .technologies()
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(
        technologies,
        vec!["Microarray".to_string(), "RNA-seq".to_string()]
    );
}

#[test]
fn test_flat_rows_fold_into_a_nested_tree() {
    let fixture = CatalogFixture::new().unwrap();
    let hg38 = fixture.add_genome("hg38").unwrap();
    let rnaseq = fixture.add_technology("RNA-seq").unwrap();

    let d3 = fixture
        .add_dataset("D3", "NovaSeq", "EDB", &hg38, &rnaseq)
        .unwrap();
    fixture
        .add_sample(&d3, "s1", &[("tissue", "LN"), ("stage", "I")])
        .unwrap();
    fixture
        .add_sample(&d3, "s2", &[("tissue", "LN"), ("stage", "I")])
        .unwrap();

    let db = helpers::open(&fixture);
    let datasets = helpers::admin_datasets(&db, "hg38", "RNA-seq");

    assert_eq!(datasets.len(), 1);
    let dataset = &datasets[0];
    assert_eq!(dataset.name, "D3");
    assert_eq!(dataset.genome.name, "hg38");
    assert_eq!(dataset.technology.name, "RNA-seq");
    assert_eq!(dataset.samples.len(), 2);

    for sample in &dataset.samples {
        let items: Vec<(String, String)> = sample
            .metadata
            .iter()
            .map(|m| (m.name.clone(), m.value.clone()))
            .collect();
        assert_eq!(
            items,
            vec![
                ("tissue".to_string(), "LN".to_string()),
                ("stage".to_string(), "I".to_string()),
            ]
        );
    }
}

#[test]
fn test_metadata_keeps_insertion_order_not_name_order() {
    let fixture = CatalogFixture::new().unwrap();
    let hg38 = fixture.add_genome("hg38").unwrap();
    let rnaseq = fixture.add_technology("RNA-seq").unwrap();

    let dataset = fixture
        .add_dataset("Cohort", "NovaSeq", "EDB", &hg38, &rnaseq)
        .unwrap();
    // curated group order: N before GC before M, nothing alphabetical
    fixture
        .add_sample(
            &dataset,
            "s1",
            &[("subtype", "N"), ("group", "GC"), ("class", "M")],
        )
        .unwrap();

    let db = helpers::open(&fixture);
    let datasets = helpers::admin_datasets(&db, "hg38", "RNA-seq");

    let names: Vec<&str> = datasets[0].samples[0]
        .metadata
        .iter()
        .map(|m| m.name.as_str())
        .collect();

    assert_eq!(names, vec!["subtype", "group", "class"]);
}

#[test]
fn test_samples_without_metadata_still_appear() {
    let fixture = CatalogFixture::new().unwrap();
    let hg38 = fixture.add_genome("hg38").unwrap();
    let rnaseq = fixture.add_technology("RNA-seq").unwrap();

    let dataset = fixture
        .add_dataset("Bare", "NovaSeq", "EDB", &hg38, &rnaseq)
        .unwrap();
    fixture.add_sample(&dataset, "s1", &[]).unwrap();

    let db = helpers::open(&fixture);
    let datasets = helpers::admin_datasets(&db, "hg38", "RNA-seq");

    assert_eq!(datasets[0].samples.len(), 1);
    assert!(datasets[0].samples[0].metadata.is_empty());
}

#[test]
fn test_datasets_and_samples_are_name_ordered() {
    let fixture = CatalogFixture::new().unwrap();
    let hg38 = fixture.add_genome("hg38").unwrap();
    let rnaseq = fixture.add_technology("RNA-seq").unwrap();

    let b = fixture
        .add_dataset("B Cohort", "NovaSeq", "EDB", &hg38, &rnaseq)
        .unwrap();
    let a = fixture
        .add_dataset("A Cohort", "NovaSeq", "EDB", &hg38, &rnaseq)
        .unwrap();
    fixture.add_sample(&b, "s2", &[("tissue", "LN")]).unwrap();
    fixture.add_sample(&b, "s1", &[("tissue", "LN")]).unwrap();
    fixture.add_sample(&a, "s1", &[("tissue", "LN")]).unwrap();

    let db = helpers::open(&fixture);
    let datasets = helpers::admin_datasets(&db, "hg38", "RNA-seq");

    let names: Vec<&str> = datasets.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["A Cohort", "B Cohort"]);

    let sample_names: Vec<&str> = datasets[1].samples.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(sample_names, vec!["s1", "s2"]);
}

#[test]
fn test_genome_and_technology_match_case_folded() {
    let fixture = CatalogFixture::new().unwrap();
    let hg38 = fixture.add_genome("hg38").unwrap();
    let rnaseq = fixture.add_technology("RNA-seq").unwrap();

    let dataset = fixture
        .add_dataset("Cohort", "NovaSeq", "EDB", &hg38, &rnaseq)
        .unwrap();
    fixture.add_sample(&dataset, "s1", &[("tissue", "LN")]).unwrap();

    let db = helpers::open(&fixture);
    let datasets = helpers::admin_datasets(&db, "HG38", "rna-SEQ");

    assert_eq!(datasets.len(), 1);
}

#[test]
fn test_no_permissions_means_no_datasets() {
    let fixture = CatalogFixture::new().unwrap();
    let hg38 = fixture.add_genome("hg38").unwrap();
    let rnaseq = fixture.add_technology("RNA-seq").unwrap();

    let dataset = fixture
        .add_dataset("Gated", "NovaSeq", "EDB", &hg38, &rnaseq)
        .unwrap();
    fixture.add_sample(&dataset, "s1", &[("tissue", "LN")]).unwrap();
    fixture.grant(&dataset, "dept-x").unwrap();

    let db = helpers::open(&fixture);
    let cancel = CancelToken::new();

    // secure default: nothing matches an empty grant list
    let none = db.datasets("hg38", "RNA-seq", false, &[], &cancel).unwrap();
    assert!(none.is_empty());

    let wrong = db
        .datasets("hg38", "RNA-seq", false, &["dept-y".to_string()], &cancel)
        .unwrap();
    assert!(wrong.is_empty());

    let granted = db
        .datasets("hg38", "RNA-seq", false, &["dept-x".to_string()], &cancel)
        .unwrap();
    assert_eq!(granted.len(), 1);
}

#[test]
fn test_admin_sees_datasets_with_no_grants_at_all() {
    let fixture = CatalogFixture::new().unwrap();
    let hg38 = fixture.add_genome("hg38").unwrap();
    let rnaseq = fixture.add_technology("RNA-seq").unwrap();

    let dataset = fixture
        .add_dataset("Ungated", "NovaSeq", "EDB", &hg38, &rnaseq)
        .unwrap();
    fixture.add_sample(&dataset, "s1", &[("tissue", "LN")]).unwrap();

    let db = helpers::open(&fixture);
    let cancel = CancelToken::new();

    let admin = db.datasets("hg38", "RNA-seq", true, &[], &cancel).unwrap();
    assert_eq!(admin.len(), 1);

    let user = db
        .datasets("hg38", "RNA-seq", false, &["dept-x".to_string()], &cancel)
        .unwrap();
    assert!(user.is_empty());
}

#[test]
fn test_expression_types_attach_per_dataset() {
    let fixture = CatalogFixture::new().unwrap();
    let hg38 = fixture.add_genome("hg38").unwrap();
    let rnaseq = fixture.add_technology("RNA-seq").unwrap();
    let counts = fixture.add_expr_type("Counts").unwrap();
    let tpm = fixture.add_expr_type("TPM").unwrap();

    let dataset = fixture
        .add_dataset("Cohort", "NovaSeq", "EDB", &hg38, &rnaseq)
        .unwrap();
    fixture.add_sample(&dataset, "s1", &[("tissue", "LN")]).unwrap();

    let gene = fixture
        .add_gene("HGNC:11998", "TP53", None, None, None)
        .unwrap();
    let probe = fixture.add_probe("TP53", &hg38, &rnaseq, &gene).unwrap();
    fixture
        .add_expression(&dataset, &probe, &counts, "f1.bin", &[3.0])
        .unwrap();
    fixture
        .add_expression(&dataset, &probe, &tpm, "f1.bin", &[1.5])
        .unwrap();

    let db = helpers::open(&fixture);
    let datasets = helpers::admin_datasets(&db, "hg38", "RNA-seq");

    let names: Vec<&str> = datasets[0].expr_types.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Counts", "TPM"]);
}

#[test]
fn test_expr_types_across_datasets_are_merged_and_name_sorted() {
    let fixture = CatalogFixture::new().unwrap();
    let hg38 = fixture.add_genome("hg38").unwrap();
    let rnaseq = fixture.add_technology("RNA-seq").unwrap();
    let array = fixture.add_technology("Microarray").unwrap();
    let tpm = fixture.add_expr_type("TPM").unwrap();
    let counts = fixture.add_expr_type("Counts").unwrap();
    let rma = fixture.add_expr_type("RMA").unwrap();

    let d1 = fixture
        .add_dataset("Seq", "NovaSeq", "EDB", &hg38, &rnaseq)
        .unwrap();
    let d2 = fixture
        .add_dataset("Chips", "U133", "EDB", &hg38, &array)
        .unwrap();
    fixture.grant(&d1, "dept-x").unwrap();
    fixture.grant(&d2, "dept-z").unwrap();

    let gene = fixture
        .add_gene("HGNC:11998", "TP53", None, None, None)
        .unwrap();
    let seq_probe = fixture.add_probe("TP53", &hg38, &rnaseq, &gene).unwrap();
    let chip_probe = fixture
        .add_probe("211300_s_at", &hg38, &array, &gene)
        .unwrap();
    fixture
        .add_expression(&d1, &seq_probe, &tpm, "f1.bin", &[1.0])
        .unwrap();
    fixture
        .add_expression(&d1, &seq_probe, &counts, "f1.bin", &[2.0])
        .unwrap();
    fixture
        .add_expression(&d2, &chip_probe, &rma, "f2.bin", &[3.0])
        .unwrap();

    let db = helpers::open(&fixture);
    let ids = vec![d1.public_id.clone(), d2.public_id.clone()];

    let all = db.expr_types(&ids, true, &[]).unwrap();
    let names: Vec<&str> = all.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Counts", "RMA", "TPM"]);

    // the caller only cleared for dept-x never learns about D2's types
    let partial = db
        .expr_types(&ids, false, &["dept-x".to_string()])
        .unwrap();
    let names: Vec<&str> = partial.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Counts", "TPM"]);
}

#[test]
fn test_cancelled_listing_aborts() {
    let fixture = CatalogFixture::new().unwrap();
    let hg38 = fixture.add_genome("hg38").unwrap();
    let rnaseq = fixture.add_technology("RNA-seq").unwrap();

    let dataset = fixture
        .add_dataset("Cohort", "NovaSeq", "EDB", &hg38, &rnaseq)
        .unwrap();
    fixture.add_sample(&dataset, "s1", &[("tissue", "LN")]).unwrap();

    let db = helpers::open(&fixture);

    let cancel = CancelToken::new();
    cancel.cancel();

    let result = db.datasets("hg38", "RNA-seq", true, &[], &cancel);
    assert!(matches!(result, Err(GexError::Cancelled)));
}
