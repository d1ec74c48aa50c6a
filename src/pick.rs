use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::Rng;

/// Draw one item with probability proportional to its weight (floored at 1).
/// An empty pool yields `None`.
pub fn weighted_pick<R, F>(pool: &[usize], weight: F, rng: &mut R) -> Option<usize>
where
    R: Rng + ?Sized,
    F: Fn(usize) -> u32,
{
    let total: u64 = pool.iter().map(|&ix| u64::from(weight(ix).max(1))).sum();
    if total == 0 {
        return None;
    }
    let mut r = rng.gen_range(0..total);
    for &ix in pool {
        let w = u64::from(weight(ix).max(1));
        if r < w {
            return Some(ix);
        }
        r -= w;
    }
    pool.last().copied()
}

pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

/// Sort descending by `priority + uniform(0, jitter)`, so strong items lead
/// but ties and near-ties vary between calls.
pub fn jittered_order<R, F>(items: &[usize], priority: F, jitter: f64, rng: &mut R) -> Vec<usize>
where
    R: Rng + ?Sized,
    F: Fn(usize) -> f64,
{
    let mut keyed: Vec<(usize, f64)> = items
        .iter()
        .map(|&ix| (ix, priority(ix) + rng.gen::<f64>() * jitter))
        .collect();
    keyed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    keyed.into_iter().map(|(ix, _)| ix).collect()
}
