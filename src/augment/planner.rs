//! Augmentation Planner
//!
//! Picks which catalog entries to apply to one source file: uniform
//! sampling without replacement, in random order.

use rand::seq::index;
use rand::RngCore;

use crate::augment::catalog::{Catalog, TransformSpec};

/// Select `min(requested, catalog.len())` distinct entries
///
/// The returned order is the order the transforms are applied in.
pub fn select<'a>(
    catalog: &'a Catalog,
    requested: usize,
    rng: &mut dyn RngCore,
) -> Vec<&'a TransformSpec> {
    let amount = requested.min(catalog.len());
    if amount == 0 {
        return Vec::new();
    }

    index::sample(rng, catalog.len(), amount)
        .into_iter()
        .filter_map(|i| catalog.get(i))
        .collect()
}
