//! Prefetching loader: ordering, coverage and determinism

mod common;

use linaje::data::PrefetchLoader;
use std::collections::BTreeSet;

fn ids(loader: &PrefetchLoader, epoch: usize) -> Vec<Vec<String>> {
    loader.epoch(epoch).map(|b| b.unwrap().ids).collect()
}

#[test]
fn every_sample_once_per_epoch() {
    let ds = common::dataset(&common::tree(), "s", 5);
    let loader = PrefetchLoader::new(ds.clone(), 3).with_shuffle(1).with_workers(2);
    for epoch in 0..3 {
        let batches = ids(&loader, epoch);
        assert_eq!(batches.len(), loader.num_batches());
        assert!(batches[..batches.len() - 1].iter().all(|b| b.len() == 3));
        let seen: BTreeSet<String> = batches.into_iter().flatten().collect();
        assert_eq!(seen.len(), ds.len());
    }
}

#[test]
fn worker_count_does_not_change_order() {
    let ds = common::dataset(&common::tree(), "s", 5);
    let inline = PrefetchLoader::new(ds.clone(), 3).with_shuffle(42);
    for workers in [1, 2, 4, 16] {
        let threaded = PrefetchLoader::new(ds.clone(), 3).with_shuffle(42).with_workers(workers).with_prefetch(1);
        for epoch in 0..2 {
            assert_eq!(ids(&inline, epoch), ids(&threaded, epoch), "workers={workers} epoch={epoch}");
        }
    }
}

#[test]
fn shuffle_is_seeded_per_epoch() {
    let ds = common::dataset(&common::tree(), "s", 5);
    let a = PrefetchLoader::new(ds.clone(), 4).with_shuffle(7);
    let b = PrefetchLoader::new(ds.clone(), 4).with_shuffle(7);
    assert_eq!(ids(&a, 3), ids(&b, 3));
    assert_ne!(ids(&a, 0), ids(&a, 1));
}

#[test]
fn validation_order_is_stable() {
    let ds = common::dataset(&common::tree(), "v", 2);
    let loader = PrefetchLoader::new(ds.clone(), 5).with_workers(3);
    let flat: Vec<String> = ids(&loader, 0).into_iter().flatten().collect();
    let expected: Vec<String> = ds.samples().iter().map(|s| s.id().to_string()).collect();
    assert_eq!(flat, expected);
}

#[test]
fn dropping_an_epoch_early_joins_workers() {
    let ds = common::dataset(&common::tree(), "s", 10);
    let loader = PrefetchLoader::new(ds, 2).with_workers(4).with_prefetch(1);
    let mut epoch = loader.epoch(0);
    assert!(epoch.next().is_some());
    drop(epoch);
    // A fresh epoch still streams everything
    assert_eq!(ids(&loader, 1).len(), loader.num_batches());
}
