//! A/B/C tier selection over the global ranking.
//!
//! The ranked pool is scanned once, best first. A listing joins tier A while
//! the A-list is below capacity and its keyword is below the per-keyword cap.
//! Everything else lands in B when its composite score reaches the B
//! threshold, otherwise in C. With `spillover` enabled, A slots the cap left
//! empty are filled from the remaining global order, ignoring the cap.

use std::collections::BTreeMap;
use tracing::debug;

use crate::analyzers::rank::RankedPool;
use crate::analyzers::types::{ScoredListing, SelectionResult, SelectionStats, Tier};
use crate::analyzers::utility::percentile;
use crate::config::{BThreshold, TierConfig};

/// Resolves the configured threshold into a composite score for this pool.
/// An empty pool resolves to 0.0.
pub fn resolve_b_threshold(listings: &[ScoredListing], threshold: BThreshold) -> f64 {
    let scores: Vec<f64> = listings.iter().map(|l| l.composite_score).collect();

    match threshold {
        BThreshold::Percentile(p) => percentile(&scores, p),
        BThreshold::Relative(f) => f * scores.iter().copied().fold(0.0, f64::max),
    }
}

/// Tier of a listing that has (or has not) won an A slot.
///
/// | Condition                   | Tier |
/// |-----------------------------|------|
/// | selected for A              | A    |
/// | score >= b_threshold        | B    |
/// | otherwise                   | C    |
pub fn tier_for(selected_for_a: bool, composite_score: f64, b_threshold: f64) -> Tier {
    match composite_score {
        _ if selected_for_a => Tier::A,
        s if s >= b_threshold => Tier::B,
        _ => Tier::C,
    }
}

/// Partitions a ranked pool into tiers. Each listing's `tier` is set exactly
/// once and every list keeps global rank order.
pub fn select_tiers(pool: RankedPool, config: &TierConfig) -> SelectionResult {
    for (keyword, positions) in &pool.by_keyword {
        if positions.len() < config.per_keyword_cap {
            debug!(
                keyword = %keyword,
                candidates = positions.len(),
                per_keyword_cap = config.per_keyword_cap,
                "Keyword pool smaller than per-keyword cap"
            );
        }
    }

    let listings = pool.listings;
    let b_threshold = resolve_b_threshold(&listings, config.b_threshold);

    let mut in_a = vec![false; listings.len()];
    let mut a_by_keyword: BTreeMap<String, usize> = BTreeMap::new();
    let mut a_count = 0;

    for (pos, l) in listings.iter().enumerate() {
        if a_count >= config.a_capacity {
            break;
        }
        let taken = a_by_keyword.entry(l.listing.keyword.clone()).or_default();
        if *taken < config.per_keyword_cap {
            *taken += 1;
            in_a[pos] = true;
            a_count += 1;
        }
    }
    a_by_keyword.retain(|_, n| *n > 0);

    let mut spillover_filled = 0;
    if config.spillover {
        for (pos, l) in listings.iter().enumerate() {
            if a_count >= config.a_capacity {
                break;
            }
            if !in_a[pos] {
                in_a[pos] = true;
                a_count += 1;
                spillover_filled += 1;
                *a_by_keyword.entry(l.listing.keyword.clone()).or_default() += 1;
            }
        }
    }

    if a_count < config.a_capacity {
        debug!(
            a_count,
            a_capacity = config.a_capacity,
            spillover = config.spillover,
            "A-list below capacity"
        );
    }

    let mut result = SelectionResult::default();
    for (mut l, selected) in listings.into_iter().zip(in_a) {
        let tier = tier_for(selected, l.composite_score, b_threshold);
        l.tier = Some(tier);
        match tier {
            Tier::A => result.a_list.push(l),
            Tier::B => result.b_list.push(l),
            Tier::C => result.c_list.push(l),
        }
    }

    result.stats = SelectionStats {
        total: result.len(),
        a_count: result.a_list.len(),
        b_count: result.b_list.len(),
        c_count: result.c_list.len(),
        a_by_keyword,
        b_threshold,
        spillover_filled,
    };
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::rank::rank_pool;
    use crate::analyzers::types::NormalizedListing;

    fn scored(index: usize, keyword: &str, composite: f64) -> ScoredListing {
        ScoredListing {
            listing: NormalizedListing {
                source_index: index,
                keyword: keyword.into(),
                title: String::new(),
                shop: String::new(),
                age_days: 1,
                daily_views: 0.0,
                total_views: 0.0,
                hearts: 0.0,
                price: 0.0,
                est_sales: 0.0,
                est_revenue: 0.0,
                defaulted: vec![],
            },
            composite_score: composite,
            trending_score: 0.0,
            evergreen_score: 0.0,
            opportunity_score: 0.0,
            rank: 0,
            tier: None,
        }
    }

    fn config(a_capacity: usize, per_keyword_cap: usize, spillover: bool) -> TierConfig {
        TierConfig {
            a_capacity,
            per_keyword_cap,
            b_threshold: BThreshold::Relative(0.0),
            spillover,
        }
    }

    #[test]
    fn test_tier_for_boundaries() {
        assert_eq!(tier_for(true, 0.0, 1.0), Tier::A);
        assert_eq!(tier_for(false, 1.0, 1.0), Tier::B);
        assert_eq!(tier_for(false, 1.5, 1.0), Tier::B);
        assert_eq!(tier_for(false, 0.99, 1.0), Tier::C);
    }

    #[test]
    fn test_resolve_threshold() {
        let pool = vec![scored(0, "a", 1.0), scored(1, "a", 2.0), scored(2, "a", 4.0)];

        assert_eq!(resolve_b_threshold(&pool, BThreshold::Percentile(0.5)), 2.0);
        assert_eq!(resolve_b_threshold(&pool, BThreshold::Relative(0.5)), 2.0);
        assert_eq!(resolve_b_threshold(&[], BThreshold::Percentile(0.9)), 0.0);
    }

    #[test]
    fn test_per_keyword_cap_limits_a() {
        // Keyword "a" holds the top five scores.
        let mut input: Vec<ScoredListing> =
            (0..10).map(|i| scored(i, "a", 100.0 - i as f64)).collect();
        input.extend((10..20).map(|i| scored(i, "b", 50.0 - i as f64)));

        let result = select_tiers(rank_pool(input), &config(5, 3, false));

        assert_eq!(result.a_list.len(), 5);
        assert_eq!(result.stats.a_by_keyword.get("a"), Some(&3));
        assert_eq!(result.stats.a_by_keyword.get("b"), Some(&2));
        let a_indices: Vec<usize> = result.a_list.iter().map(|l| l.listing.source_index).collect();
        assert_eq!(a_indices, vec![0, 1, 2, 10, 11]);
    }

    #[test]
    fn test_no_spillover_leaves_capacity_unused() {
        let input: Vec<ScoredListing> = (0..6).map(|i| scored(i, "only", 10.0 - i as f64)).collect();

        let result = select_tiers(rank_pool(input), &config(5, 2, false));

        assert_eq!(result.stats.a_count, 2);
        assert_eq!(result.stats.spillover_filled, 0);
        assert_eq!(result.stats.b_count, 4);
    }

    #[test]
    fn test_spillover_fills_capacity_in_rank_order() {
        let input: Vec<ScoredListing> = (0..6).map(|i| scored(i, "only", 10.0 - i as f64)).collect();

        let result = select_tiers(rank_pool(input), &config(5, 2, true));

        assert_eq!(result.stats.a_count, 5);
        assert_eq!(result.stats.spillover_filled, 3);
        assert_eq!(result.stats.a_by_keyword.get("only"), Some(&5));
        let a_indices: Vec<usize> = result.a_list.iter().map(|l| l.listing.source_index).collect();
        assert_eq!(a_indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_b_and_c_split_on_threshold() {
        let input = vec![
            scored(0, "a", 10.0),
            scored(1, "a", 6.0),
            scored(2, "a", 5.0),
            scored(3, "a", 1.0),
        ];
        let cfg = TierConfig {
            a_capacity: 1,
            per_keyword_cap: 1,
            b_threshold: BThreshold::Relative(0.5),
            spillover: false,
        };

        let result = select_tiers(rank_pool(input), &cfg);

        assert_eq!(result.stats.b_threshold, 5.0);
        assert_eq!(result.a_list[0].listing.source_index, 0);
        assert_eq!(
            result.b_list.iter().map(|l| l.listing.source_index).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(result.c_list[0].listing.source_index, 3);
        assert!(result.iter().all(|l| l.tier.is_some()));
    }

    #[test]
    fn test_empty_pool_yields_empty_selection() {
        let result = select_tiers(RankedPool::default(), &TierConfig::default());

        assert!(result.is_empty());
        assert_eq!(result.stats, SelectionStats::default());
    }
}
