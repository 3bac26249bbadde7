//! Weighted random choice among selectable instances.

use rand::Rng;

use crate::Instance;

/// Pick one instance with probability proportional to its weight.
/// Returns `None` when no instance has a positive finite weight.
pub fn choose_weighted<'a, R: Rng>(instances: &'a [Instance], rng: &mut R) -> Option<&'a Instance> {
    let usable = |w: f64| w > 0.0 && w.is_finite();
    let max = instances
        .iter()
        .map(|i| i.weight)
        .filter(|&w| usable(w))
        .fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return None;
    }
    // Scaled by the largest weight so the sum stays finite (at most instances.len()).
    let mut cumulative = Vec::with_capacity(instances.len());
    let mut total = 0.0;
    for inst in instances {
        if usable(inst.weight) {
            total += inst.weight / max;
        }
        cumulative.push(total);
    }
    let draw = rng.gen_range(0.0..total);
    let idx = cumulative.partition_point(|&c| c <= draw);
    instances.get(idx.min(instances.len() - 1))
}
