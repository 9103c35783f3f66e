//! Prefetching batch loader
//!
//! Batches for an epoch are planned up front (shuffled per epoch from a
//! fixed seed), then assembled by `workers` background threads. Worker `w`
//! builds batches `w, w + workers, ...` into its own bounded channel and the
//! consumer reads the channels round-robin, so batch order does not depend
//! on thread scheduling.

use super::Dataset;
use crate::train::HierarchicalBatch;
use crate::{Error, Result};
use crossbeam_channel::{bounded, Receiver};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Batch loader over a shared dataset
#[derive(Debug, Clone)]
pub struct PrefetchLoader {
    dataset: Arc<Dataset>,
    batch_size: usize,
    workers: usize,
    prefetch: usize,
    shuffle: bool,
    seed: u64,
}

impl PrefetchLoader {
    /// Sequential loader without background workers
    pub fn new(dataset: Arc<Dataset>, batch_size: usize) -> Self {
        Self { dataset, batch_size: batch_size.max(1), workers: 0, prefetch: 2, shuffle: false, seed: 0 }
    }

    /// Number of background threads (0 assembles batches on the caller's thread)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Batches each worker may hold ahead of the consumer
    pub fn with_prefetch(mut self, prefetch: usize) -> Self {
        self.prefetch = prefetch.max(1);
        self
    }

    /// Reshuffle every epoch from `seed`
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Batches per epoch
    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    /// Sample indices of every batch in the given epoch
    pub fn plan(&self, epoch: usize) -> Vec<Vec<usize>> {
        let mut indices: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed ^ epoch as u64);
            indices.shuffle(&mut rng);
        }
        indices.chunks(self.batch_size).map(<[usize]>::to_vec).collect()
    }

    /// Start streaming the batches of one epoch
    pub fn epoch(&self, epoch: usize) -> EpochBatches {
        let plan = Arc::new(self.plan(epoch));
        let total = plan.len();

        if self.workers == 0 {
            return EpochBatches {
                source: Source::Inline { dataset: Arc::clone(&self.dataset), plan },
                next: 0,
                total,
            };
        }

        let workers = self.workers.min(total.max(1));
        let mut receivers = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for w in 0..workers {
            let (tx, rx) = bounded::<HierarchicalBatch>(self.prefetch);
            let dataset = Arc::clone(&self.dataset);
            let plan = Arc::clone(&plan);
            let handle = std::thread::spawn(move || {
                for indices in plan.iter().skip(w).step_by(workers) {
                    let batch = HierarchicalBatch::gather(&dataset, indices);
                    if tx.send(batch).is_err() {
                        break; // consumer dropped
                    }
                }
            });
            receivers.push(rx);
            handles.push(handle);
        }

        log::debug!("epoch {epoch}: streaming {total} batches with {workers} workers");
        EpochBatches { source: Source::Workers { receivers, handles }, next: 0, total }
    }
}

enum Source {
    Inline { dataset: Arc<Dataset>, plan: Arc<Vec<Vec<usize>>> },
    Workers { receivers: Vec<Receiver<HierarchicalBatch>>, handles: Vec<JoinHandle<()>> },
}

/// Batches of one epoch, in plan order
pub struct EpochBatches {
    source: Source,
    next: usize,
    total: usize,
}

impl EpochBatches {
    /// Batches not yet yielded
    pub fn remaining(&self) -> usize {
        self.total - self.next
    }
}

impl Iterator for EpochBatches {
    type Item = Result<HierarchicalBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let b = self.next;
        self.next += 1;

        let item = match &self.source {
            Source::Inline { dataset, plan } => Ok(HierarchicalBatch::gather(dataset, &plan[b])),
            Source::Workers { receivers, .. } => {
                let w = b % receivers.len();
                receivers[w]
                    .recv()
                    .map_err(|_| Error::Loader(format!("worker {w} stopped before batch {b}")))
            }
        };
        if item.is_err() {
            self.next = self.total;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl Drop for EpochBatches {
    fn drop(&mut self) {
        if let Source::Workers { receivers, handles } = &mut self.source {
            // Disconnect first so blocked senders return
            receivers.clear();
            for h in handles.drain(..) {
                let _ = h.join();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sample;
    use crate::taxonomy::LabelVector;

    fn dataset(n: usize) -> Arc<Dataset> {
        let samples = (0..n)
            .map(|i| Sample::new(format!("s{i}"), vec![i as f32], LabelVector::new([0; 7])))
            .collect();
        Arc::new(Dataset::from_samples(samples).unwrap())
    }

    fn ids(batches: EpochBatches) -> Vec<Vec<String>> {
        batches.map(|b| b.unwrap().ids).collect()
    }

    #[test]
    fn test_sequential_order() {
        let loader = PrefetchLoader::new(dataset(5), 2);
        assert_eq!(loader.num_batches(), 3);
        let got = ids(loader.epoch(0));
        assert_eq!(got, vec![vec!["s0", "s1"], vec!["s2", "s3"], vec!["s4"]]);
    }

    #[test]
    fn test_workers_match_inline() {
        let inline = PrefetchLoader::new(dataset(23), 4).with_shuffle(7);
        let threaded = inline.clone().with_workers(3).with_prefetch(1);
        for epoch in 0..3 {
            assert_eq!(ids(inline.epoch(epoch)), ids(threaded.epoch(epoch)));
        }
    }

    #[test]
    fn test_shuffle_is_deterministic_and_varies_by_epoch() {
        let loader = PrefetchLoader::new(dataset(32), 32).with_shuffle(42);
        assert_eq!(loader.plan(1), loader.plan(1));
        assert_ne!(loader.plan(1), loader.plan(2));

        let mut all: Vec<usize> = loader.plan(1).concat();
        all.sort_unstable();
        assert_eq!(all, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn test_early_drop_joins_workers() {
        let loader = PrefetchLoader::new(dataset(100), 1).with_workers(4).with_prefetch(1);
        let mut batches = loader.epoch(0);
        assert!(batches.next().is_some());
        drop(batches);
    }

    #[test]
    fn test_empty_dataset() {
        let loader = PrefetchLoader::new(dataset(0), 4).with_workers(2);
        assert_eq!(loader.num_batches(), 0);
        assert_eq!(loader.epoch(0).count(), 0);
    }
}
