//! End-to-end test: annotation records in, count table out, with the
//! sequential driver, the parallel driver and an external-style map/reduce
//! over per-record emissions all agreeing.

use std::sync::Arc;

use featurecount::annotation::AnnotationLoader;
use featurecount::config::{Config, OverlapMode, StrandMode};
use featurecount::counter::AlignmentClassifier;
use featurecount::index::GenomicIntervalIndex;
use featurecount::shard::{count_fragments, count_fragments_parallel};
use featurecount::table::CountTable;
use featurecount::types::{
    AlignmentRecord, AnnotationRecord, CigarElement, CigarOp, Fragment, Strand,
};

fn annotation(
    chrom: &str,
    feature_type: &str,
    start: i64,
    end: i64,
    strand: Strand,
    gene: &str,
) -> AnnotationRecord {
    AnnotationRecord {
        chrom: chrom.to_string(),
        feature_type: feature_type.to_string(),
        start,
        end,
        strand,
        feature_id: gene.to_string(),
    }
}

/// A small two-chromosome annotation: three genes, multi-exon, mixed strands,
/// with non-exon records sprinkled in (they must be ignored).
fn load_annotation(config: &Config) -> GenomicIntervalIndex {
    let records = vec![
        annotation("chr1", "gene", 100, 1000, Strand::Forward, "geneA"),
        annotation("chr1", "exon", 100, 300, Strand::Forward, "geneA"),
        annotation("chr1", "exon", 600, 1000, Strand::Forward, "geneA"),
        annotation("chr1", "exon", 2000, 2500, Strand::Reverse, "geneB"),
        annotation("chr1", "CDS", 2100, 2400, Strand::Reverse, "geneB"),
        annotation("chr2", "exon", 50, 500, Strand::Forward, "geneC"),
    ];

    let mut loader = AnnotationLoader::new(config);
    for record in &records {
        loader.load(record).expect("annotation should load");
    }
    assert_eq!(loader.loaded(), 4);
    assert_eq!(loader.skipped(), 2);
    loader.finish()
}

fn single(chrom: &str, position: i64, len: i64, reverse: bool) -> Fragment {
    Fragment::Single(AlignmentRecord {
        read_name: format!("{}:{}", chrom, position),
        reference_name: chrom.to_string(),
        position,
        cigar: vec![CigarElement::new(len, CigarOp::Match)],
        paired: false,
        first_of_pair: false,
        reverse_strand: reverse,
        mate_reverse_strand: false,
        secondary: false,
        unmapped: false,
        mapping_quality: Some(50),
        nh: Some(1),
    })
}

fn read_stream() -> Vec<Fragment> {
    let mut fragments = Vec::new();
    for i in 0..50 {
        // geneA, exon 1.
        fragments.push(single("chr1", 120 + i, 40, false));
        // geneA spliced over the intron: 20M 300N 20M from 281 lands in exon 2.
        let mut spliced = single("chr1", 281, 0, false);
        if let Fragment::Single(r) = &mut spliced {
            r.cigar = vec![
                CigarElement::new(20, CigarOp::Match),
                CigarElement::new(300, CigarOp::Skip),
                CigarElement::new(20, CigarOp::Match),
            ];
        }
        fragments.push(spliced);
        // geneB on the reverse strand.
        fragments.push(single("chr1", 2100, 50, true));
        // geneC on the second chromosome.
        fragments.push(single("chr2", 100, 50, false));
        // Intergenic.
        fragments.push(single("chr1", 1500, 50, false));
        // Wrong strand for geneB: no feature under stranded counting.
        fragments.push(single("chr1", 2100, 50, false));
    }
    fragments
}

#[test]
fn end_to_end_counts_per_gene() {
    let config = Config::default();
    let index = load_annotation(&config);
    let table = count_fragments(read_stream(), &index, &config);

    assert_eq!(table.count("geneA"), 100);
    assert_eq!(table.count("geneB"), 50);
    assert_eq!(table.count("geneC"), 50);
    assert_eq!(table.no_feature, 100);
    assert_eq!(table.total, 300);
    assert!(table.is_conserved());

    // Table order follows annotation load order.
    let names: Vec<&str> = table.iter().map(|(id, _)| id).collect();
    assert_eq!(names, vec!["geneA", "geneB", "geneC"]);
}

#[test]
fn end_to_end_unstranded_rescues_wrong_strand_reads() {
    let mut config = Config::default();
    config.strand_mode = StrandMode::No;
    let index = load_annotation(&config);
    let table = count_fragments(read_stream(), &index, &config);

    // The wrong-strand geneB reads now count.
    assert_eq!(table.count("geneB"), 100);
    assert_eq!(table.no_feature, 50);
    assert!(table.is_conserved());
}

#[test]
fn end_to_end_parallel_agrees_with_sequential() {
    for overlap in [
        OverlapMode::Union,
        OverlapMode::IntersectionStrict,
        OverlapMode::IntersectionNonempty,
    ] {
        let mut config = Config::default();
        config.overlap_mode = overlap;
        let index = Arc::new(load_annotation(&config));
        let config = Arc::new(config);

        let sequential = count_fragments(read_stream(), &index, &config);
        for threads in [2, 4] {
            let parallel = count_fragments_parallel(
                read_stream(),
                Arc::clone(&index),
                Arc::clone(&config),
                threads,
                13,
            )
            .expect("parallel run should succeed");
            assert_eq!(sequential, parallel, "{:?} x{}", overlap, threads);
        }
    }
}

#[test]
fn end_to_end_emission_reduce_agrees_with_aggregator() {
    // External map/reduce path: classify each fragment, emit (featureId, 1),
    // sum in a reducer table. Per-feature counts must match the in-process
    // aggregator exactly.
    let config = Config::default();
    let index = load_annotation(&config);
    let classifier = AlignmentClassifier::new(&index, &config);

    let mut reduced = CountTable::new();
    for fragment in read_stream() {
        if let Some(verdict) = classifier.classify(&fragment) {
            if verdict.emitted_feature().is_some() {
                reduced.accumulate(&verdict);
            }
        }
    }
    reduced.finalize(index.feature_names());

    let aggregated = count_fragments(read_stream(), &index, &config);
    for (feature, count) in aggregated.iter() {
        assert_eq!(reduced.count(feature), count, "feature {}", feature);
    }
}
