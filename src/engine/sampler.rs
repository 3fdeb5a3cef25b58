//! Diversity-aware sampling of the accepted pool.
//!
//! When the run accepts more names than requested, the requested count is
//! split across templates proportionally to each template's share of the
//! *accepted* pool (not of its theoretical combination space), so a template
//! with a small root set is not drowned out by one spanning millions of
//! combinations. Remainders go largest-fractional-part first; draws inside a
//! template are uniform without replacement.

use rand::rngs::StdRng;
use rand::seq::index;

/// The accepted names contributed by one template.
#[derive(Debug, Clone)]
pub struct TemplatePool {
    /// Source string of the contributing template.
    pub template: String,
    /// Accepted, deduplicated names in acceptance order.
    pub names: Vec<String>,
}

/// Result of a sampling pass.
#[derive(Debug)]
pub struct SampleOutcome {
    /// The delivered names.
    pub names: Vec<String>,
    /// True when fewer names were available than requested.
    pub shortfall: bool,
}

/// Sample `requested` names from the per-template pools.
///
/// If the pools together hold at most `requested` names, everything is
/// returned unchanged and `shortfall` reports whether the run under-
/// delivered; under-yield is an expected outcome of a sparse root set, not
/// an error.
pub fn sample_proportional(
    pools: &[TemplatePool],
    requested: usize,
    rng: &mut StdRng,
) -> SampleOutcome {
    let total: usize = pools.iter().map(|p| p.names.len()).sum();

    if total <= requested {
        let names = pools.iter().flat_map(|p| p.names.iter().cloned()).collect();
        return SampleOutcome {
            names,
            shortfall: total < requested,
        };
    }

    let quotas = allocate(pools, requested, total);

    let mut names = Vec::with_capacity(requested);
    for (pool, quota) in pools.iter().zip(quotas) {
        if quota == 0 {
            continue;
        }
        for picked in index::sample(rng, pool.names.len(), quota) {
            names.push(pool.names[picked].clone());
        }
    }

    SampleOutcome {
        names,
        shortfall: false,
    }
}

/// Largest-remainder allocation of `requested` across the pools.
///
/// Exact integer arithmetic: pool `i` gets `floor(requested * len_i / total)`
/// plus at most one leftover slot, leftovers handed out by descending
/// remainder (ties broken by pool order for determinism).
fn allocate(pools: &[TemplatePool], requested: usize, total: usize) -> Vec<usize> {
    let mut quotas = Vec::with_capacity(pools.len());
    let mut remainders = Vec::with_capacity(pools.len());
    let mut assigned = 0usize;

    for (position, pool) in pools.iter().enumerate() {
        let share = pool.names.len() as u128 * requested as u128;
        let base = (share / total as u128) as usize;
        let remainder = share % total as u128;
        quotas.push(base);
        remainders.push((remainder, position));
        assigned += base;
    }

    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, position) in remainders.iter().take(requested - assigned) {
        quotas[position] += 1;
    }

    quotas
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn pool(template: &str, count: usize) -> TemplatePool {
        TemplatePool {
            template: template.to_string(),
            names: (0..count).map(|i| format!("{template}{i}")).collect(),
        }
    }

    #[test]
    fn test_pass_through_when_under_requested() {
        let pools = vec![pool("a", 2), pool("b", 1)];
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = sample_proportional(&pools, 10, &mut rng);
        assert_eq!(outcome.names, vec!["a0", "a1", "b0"]);
        assert!(outcome.shortfall);
    }

    #[test]
    fn test_exact_fit_is_not_a_shortfall() {
        let pools = vec![pool("a", 3)];
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = sample_proportional(&pools, 3, &mut rng);
        assert_eq!(outcome.names.len(), 3);
        assert!(!outcome.shortfall);
    }

    #[test]
    fn test_proportional_split_80_20() {
        let pools = vec![pool("big", 800), pool("small", 200)];
        let mut rng = StdRng::seed_from_u64(5);
        let outcome = sample_proportional(&pools, 50, &mut rng);

        assert_eq!(outcome.names.len(), 50);
        let from_big = outcome.names.iter().filter(|n| n.starts_with("big")).count();
        let from_small = outcome.names.len() - from_big;
        assert_eq!(from_big, 40);
        assert_eq!(from_small, 10);
    }

    #[test]
    fn test_largest_remainder_gets_the_leftover() {
        let pools = vec![pool("a", 3), pool("b", 2)];
        let mut rng = StdRng::seed_from_u64(3);
        // Shares of 4 over (3, 2): a = 2.4 -> 2, b = 1.6 -> 1, leftover to b.
        let outcome = sample_proportional(&pools, 4, &mut rng);
        let from_a = outcome.names.iter().filter(|n| n.starts_with('a')).count();
        let from_b = outcome.names.len() - from_a;
        assert_eq!((from_a, from_b), (2, 2));
    }

    #[test]
    fn test_draws_are_without_replacement() {
        let pools = vec![pool("a", 100)];
        let mut rng = StdRng::seed_from_u64(11);
        let outcome = sample_proportional(&pools, 60, &mut rng);
        let distinct: std::collections::HashSet<&String> = outcome.names.iter().collect();
        assert_eq!(distinct.len(), 60);
    }

    #[test]
    fn test_sampling_is_reproducible_for_a_seed() {
        let pools = vec![pool("a", 50), pool("b", 50)];
        let mut one = StdRng::seed_from_u64(21);
        let mut two = StdRng::seed_from_u64(21);
        assert_eq!(
            sample_proportional(&pools, 30, &mut one).names,
            sample_proportional(&pools, 30, &mut two).names
        );
    }
}
