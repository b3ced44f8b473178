//! Counting drivers: a sequential per-shard loop and a thread-parallel
//! pipeline built from bounded channels and a rayon pool.
//!
//! The index is immutable after build, so shards share it behind an `Arc`
//! with no locking. Each worker accumulates a shard-local table; tables are
//! merged by per-key summation, so the combined result is independent of how
//! fragments were distributed across workers.

use anyhow::{anyhow, bail, Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::counter::classify::AlignmentClassifier;
use crate::index::GenomicIntervalIndex;
use crate::table::CountTable;
use crate::types::Fragment;

/// Count a stream of fragments on the calling thread.
///
/// Returns a finalized table: every known feature appears, untouched ones at
/// zero, in annotation load order.
pub fn count_fragments<I>(
    fragments: I,
    index: &GenomicIntervalIndex,
    config: &Config,
) -> CountTable
where
    I: IntoIterator<Item = Fragment>,
{
    let classifier = AlignmentClassifier::new(index, config);
    let mut table = CountTable::new();
    for fragment in fragments {
        if let Some(verdict) = classifier.classify(&fragment) {
            table.accumulate(&verdict);
        }
    }
    table.finalize(index.feature_names());
    table
}

/// Count a stream of fragments across a pool of worker shards.
///
/// Fragments are batched and fanned out over a bounded channel; each worker
/// classifies against the shared index into its own table, and the partial
/// tables are merged and finalized here. `num_threads == 0` auto-detects.
/// The result is identical to [`count_fragments`] on the same input.
pub fn count_fragments_parallel<I>(
    fragments: I,
    index: Arc<GenomicIntervalIndex>,
    config: Arc<Config>,
    num_threads: usize,
    batch_size: usize,
) -> Result<CountTable>
where
    I: IntoIterator<Item = Fragment>,
{
    if batch_size == 0 {
        bail!("batch size must be greater than 0");
    }
    let num_threads = if num_threads == 0 {
        num_cpus::get()
    } else {
        num_threads
    };
    if num_threads == 1 {
        return Ok(count_fragments(fragments, &index, &config));
    }

    let (work_tx, work_rx): (Sender<Vec<Fragment>>, Receiver<Vec<Fragment>>) =
        bounded(num_threads * 2);
    // One partial table per worker, sent once at shutdown.
    let (result_tx, result_rx): (Sender<CountTable>, Receiver<CountTable>) =
        bounded(num_threads);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("Failed to create thread pool")?;

    let workers_handle = thread::spawn({
        let work_rx = work_rx.clone();
        let result_tx = result_tx.clone();
        let index = Arc::clone(&index);
        let config = Arc::clone(&config);
        move || {
            pool.scope(|s| {
                for _ in 0..num_threads {
                    let work_rx = work_rx.clone();
                    let result_tx = result_tx.clone();
                    let index = Arc::clone(&index);
                    let config = Arc::clone(&config);
                    s.spawn(move |_| {
                        worker_loop(work_rx, result_tx, index, config);
                    });
                }
            });
        }
    });

    // Producer: batch the input stream into work items.
    let mut batch = Vec::with_capacity(batch_size);
    for fragment in fragments {
        batch.push(fragment);
        if batch.len() == batch_size {
            let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
            if work_tx.send(full).is_err() {
                break;
            }
        }
    }
    if !batch.is_empty() {
        let _ = work_tx.send(batch);
    }

    // Close the work channel so workers drain and exit.
    drop(work_tx);

    workers_handle
        .join()
        .map_err(|_| anyhow!("Worker thread panicked"))?;

    // Close the result channel so the merge loop terminates.
    drop(result_tx);

    let mut merged = CountTable::new();
    for partial in result_rx {
        merged.merge(partial);
    }
    merged.finalize(index.feature_names());
    Ok(merged)
}

/// Worker loop: classify batches into a shard-local table, send it once.
fn worker_loop(
    work_rx: Receiver<Vec<Fragment>>,
    result_tx: Sender<CountTable>,
    index: Arc<GenomicIntervalIndex>,
    config: Arc<Config>,
) {
    let classifier = AlignmentClassifier::new(&index, &config);
    let mut table = CountTable::new();
    while let Ok(batch) = work_rx.recv() {
        for fragment in batch {
            if let Some(verdict) = classifier.classify(&fragment) {
                table.accumulate(&verdict);
            }
        }
    }
    let _ = result_tx.send(table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IntervalIndexBuilder;
    use crate::types::{AlignmentRecord, CigarElement, CigarOp, GenomicInterval, Strand};

    fn mapped(position: i64, len: i64) -> Fragment {
        Fragment::Single(AlignmentRecord {
            read_name: format!("r{}", position),
            reference_name: "chr1".to_string(),
            position,
            cigar: vec![CigarElement::new(len, CigarOp::Match)],
            paired: false,
            first_of_pair: false,
            reverse_strand: false,
            mate_reverse_strand: false,
            secondary: false,
            unmapped: false,
            mapping_quality: Some(60),
            nh: Some(1),
        })
    }

    fn test_index() -> GenomicIntervalIndex {
        let mut builder = IntervalIndexBuilder::new();
        builder.insert(
            GenomicInterval::new("chr1".to_string(), 1, 20, Strand::Forward),
            "a",
        );
        builder.insert(
            GenomicInterval::new("chr1".to_string(), 25, 45, Strand::Forward),
            "b",
        );
        builder.build()
    }

    fn test_fragments() -> Vec<Fragment> {
        let mut fragments = Vec::new();
        for _ in 0..40 {
            fragments.push(mapped(5, 11)); // inside a
            fragments.push(mapped(30, 11)); // inside b
            fragments.push(mapped(15, 16)); // spans both: ambiguous
        }
        fragments
    }

    #[test]
    fn test_sequential_counts() {
        let index = test_index();
        let config = Config::default();
        let table = count_fragments(test_fragments(), &index, &config);

        assert_eq!(table.count("a"), 40);
        assert_eq!(table.count("b"), 40);
        assert_eq!(table.ambiguous, 40);
        assert_eq!(table.total, 120);
        assert!(table.is_conserved());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let index = Arc::new(test_index());
        let config = Arc::new(Config::default());

        let sequential = count_fragments(test_fragments(), &index, &config);
        let parallel = count_fragments_parallel(
            test_fragments(),
            Arc::clone(&index),
            Arc::clone(&config),
            4,
            7,
        )
        .unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_parallel_rejects_zero_batch_size() {
        let index = Arc::new(test_index());
        let config = Arc::new(Config::default());
        assert!(count_fragments_parallel(Vec::new(), index, config, 2, 0).is_err());
    }

    #[test]
    fn test_parallel_empty_stream_zero_fills() {
        let index = Arc::new(test_index());
        let config = Arc::new(Config::default());
        let table = count_fragments_parallel(Vec::new(), index, config, 2, 10).unwrap();

        let entries: Vec<(&str, u64)> = table.iter().collect();
        assert_eq!(entries, vec![("a", 0), ("b", 0)]);
        assert_eq!(table.total, 0);
    }
}
