use crate::projector::project_record;
use estatex_core::PropertyDataset;
use rand::Rng;
use serde_json::Value;

pub const SHOWCASE_SIZE: usize = 3;

/// `count` distinct rows chosen uniformly at random, projected for output.
pub fn random_properties<R: Rng + ?Sized>(
    dataset: &PropertyDataset,
    rng: &mut R,
    count: usize,
) -> Vec<Value> {
    let amount = count.min(dataset.len());
    rand::seq::index::sample(rng, dataset.len(), amount)
        .into_iter()
        .filter_map(|idx| dataset.get(idx))
        .map(project_record)
        .collect()
}
