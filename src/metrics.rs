//! Benchmark metrics
//!
//! Emitted through the `metrics` facade; nothing is recorded unless the host
//! process installs a recorder.

/// Record a successfully benchmarked (dataset, model) pair
pub fn record_pair_benchmarked(dataset: &str) {
    metrics::counter!("scandeval_pairs_benchmarked_total",
        "dataset" => dataset.to_string()
    )
    .increment(1);
}

/// Record a pair skipped because the model is incompatible with the dataset
pub fn record_pair_skipped(dataset: &str) {
    metrics::counter!("scandeval_pairs_skipped_total",
        "dataset" => dataset.to_string()
    )
    .increment(1);
}

/// Record a full model catalog rebuild
pub fn record_catalog_rebuild() {
    metrics::counter!("scandeval_catalog_rebuilds_total").increment(1);
}

/// Update the number of cells in the results store
pub fn update_results_count(count: usize) {
    metrics::gauge!("scandeval_results_cells").set(count as f64);
}
