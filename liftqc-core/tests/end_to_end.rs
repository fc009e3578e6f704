use liftqc_core::report::{
    coverage_report_path, write_coverage_report, write_sequence_stats_report, write_signature_report,
    write_summary_report,
};
use liftqc_core::sanity::{check_genome_file, check_provenance_file, LIFTOFF_MARKER};
use liftqc_core::stats::{coverage_records, summary_counts, valid_feature_types};
use liftqc_core::{
    classify_genes, frame, FeatureDb, FeatureStore, MergeStrategy, SequenceDenylist, SequenceLengthIndex,
    SequenceStats,
};
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

const LIFTOFF_GFF: &str = "\
##gff-version 3
# Liftoff v1.6.3
# liftoff -g ref.gff3 target.fa ref.fa
extracting features
lifting features

chr1\tLiftoff\tprotein_coding_gene\t50\t200\t.\t+\t.\tID=GENE1;description=some description;sequence_ID=97.5;coverage=88.2
chr1\tLiftoff\tgene\t50\t200\t.\t+\t.\tID=G1
chr1\tLiftoff\tmRNA\t50\t200\t.\t+\t.\tID=tx1;Parent=G1
chr1\tLiftoff\ttranscript\t50\t200\t.\t+\t.\tID=tx2;Parent=G1
chr1\tLiftoff\texon\t50\t200\t.\t+\t.\tParent=tx1,tx2
chr1\tLiftoff\tCDS\t100\t200\t.\t+\t.\tID=cds1;Parent=tx1
chr1\tLiftoff\tCDS\t50\t100\t.\t-\t.\tID=cds2;Parent=tx1
chr1\tLiftoff\tCDS\t60\t98\t.\t-\t.\tID=cds3;Parent=tx1
chr1\tLiftoff\tgene\t400\t600\t.\t-\t.\tID=G2
chr1\tLiftoff\ttranscript\t400\t600\t.\t-\t.\tID=tx3;Parent=G2
chr1\tLiftoff\texon\t400\t600\t.\t-\t.\tParent=tx3
chr2_lifting_tmp\tLiftoff\texon\t1\t10\t.\t+\t.\tID=X1
";

fn write_temp(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("create temp file");
    write!(f, "{}", contents).unwrap();
    f
}

fn genome() -> NamedTempFile {
    let mut fasta = String::from(">chr1 test chromosome\n");
    for _ in 0..10 {
        fasta.push_str(&"ACGTACGTAC".repeat(10));
        fasta.push('\n');
    }
    fasta.push_str(">chr2_lifting_tmp\nACGTACGTAC\n");
    write_temp(&fasta)
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read report")
}

#[test]
fn frame_repair_end_to_end() {
    let gff = write_temp(LIFTOFF_GFF);
    let fasta = genome();

    assert_eq!(check_genome_file(fasta.path()).unwrap(), None);
    assert_eq!(check_provenance_file(gff.path(), LIFTOFF_MARKER).unwrap(), None);

    let lengths = SequenceLengthIndex::from_path(fasta.path()).expect("index genome");
    assert_eq!(lengths.get("chr1"), Some(1000));

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("liftoff_new.gff");
    let stats = frame::repair_file(gff.path(), &lengths, &out).expect("repair");
    assert_eq!(stats.forward_cds, 1);
    assert_eq!(stats.reverse_cds, 2);
    assert_eq!(stats.comments, 3);
    assert_eq!(stats.blank, 1);

    let repaired = read(&out);
    let in_lines: Vec<&str> = LIFTOFF_GFF.lines().collect();
    let out_lines: Vec<&str> = repaired.lines().collect();
    assert_eq!(in_lines.len(), out_lines.len());

    for (before, after) in in_lines.iter().zip(&out_lines) {
        let fields: Vec<&str> = after.split('\t').collect();
        if fields.len() == 9 && fields[2] == "CDS" {
            continue;
        }
        assert_eq!(before, after);
    }
    assert!(repaired.contains("chr1\tLiftoff\tCDS\t100\t200\t.\t+\t1\tID=cds1;Parent=tx1\n"));
    assert!(repaired.contains("chr1\tLiftoff\tCDS\t50\t100\t.\t-\t0\tID=cds2;Parent=tx1\n"));
    assert!(repaired.contains("chr1\tLiftoff\tCDS\t60\t98\t.\t-\t2\tID=cds3;Parent=tx1\n"));
}

#[test]
fn gene_children_end_to_end() {
    let gff = write_temp(LIFTOFF_GFF);
    let db = FeatureDb::from_path(gff.path(), MergeStrategy::CreateUnique).expect("load store");

    let signatures = classify_genes(&db);
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("genes_with_transcripts.tab");
    let rows = write_signature_report(&out, &signatures, &["CDS:exon:mRNA:transcript", "exon:transcript"]).unwrap();

    assert_eq!(rows, 2);
    assert_eq!(
        read(&out),
        "child_feature\tGeneID\nCDS:exon:mRNA:transcript\tG1\nexon:transcript\tG2\n"
    );
}

#[test]
fn mapping_stats_end_to_end() {
    let gff = write_temp(LIFTOFF_GFF);
    let db = FeatureDb::from_path(gff.path(), MergeStrategy::Error).expect("load store");
    let dir = TempDir::new().unwrap();

    for gene_type in ["ncRNA_gene", "protein_coding_gene", "pseudogene"] {
        let records = coverage_records(&db, gene_type).expect("coverage attributes");
        write_coverage_report(&coverage_report_path(dir.path(), gene_type), &records).unwrap();
    }
    let coverage = read(&dir.path().join("protein_coding_gene.mapping_stats.tab"));
    assert_eq!(
        coverage,
        "gene_id\tdescription\tsequence_id\tcoverage\tis_partial\tlow_identity\n\
         GENE1\tsome description\t97.5\t88.2\t0\t0\n"
    );
    assert_eq!(
        read(&dir.path().join("pseudogene.mapping_stats.tab")).lines().count(),
        1
    );

    let types = valid_feature_types(&db);
    let stats = SequenceStats::collect(&db, &types, &SequenceDenylist::default());
    let seqstats = dir.path().join("seqstats.tab");
    write_sequence_stats_report(&seqstats, &types, &stats).unwrap();

    let seqstats = read(&seqstats);
    assert!(!seqstats.to_lowercase().contains("lifting"));
    let mut lines = seqstats.lines();
    assert_eq!(lines.next(), Some("Feature\tchr1"));
    assert_eq!(lines.next(), Some("CDS\t3"));
    assert_eq!(lines.next(), Some("exon\t2"));

    let summary = dir.path().join("summarystats.tab");
    write_summary_report(&summary, &summary_counts(&db, &types)).unwrap();
    let summary = read(&summary);
    assert!(summary.starts_with("feature_type\tcount\nCDS\t3\nexon\t3\ngene\t2\n"));
    assert!(!summary.contains("\n.\t"));
    assert_eq!(summary.lines().count(), types.len() + 1);
    assert_eq!(
        db.seqids(),
        vec!["chr1", "chr2_lifting_tmp", "extracting features", "lifting features"]
    );
}
