//! Global and per-keyword ranking by composite score.
//!
//! Order: composite score descending. After an exact sort, listings are cut
//! into tie runs: a run starts at its highest score (the head) and holds every
//! following listing within [`SCORE_EPSILON`] of the head, so no two members
//! of a run differ by more than epsilon. Each run is ordered by estimated
//! revenue descending, then by pooled insertion order.
//!
//! Per-keyword rankings are the global order restricted to one keyword.

use std::collections::BTreeMap;

use crate::analyzers::types::ScoredListing;

pub const SCORE_EPSILON: f64 = 1e-9;

/// Ranked listings plus a per-keyword index into them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedPool {
    /// All listings in global rank order, `rank` set 1-based.
    pub listings: Vec<ScoredListing>,
    /// Keyword → positions in `listings`, ascending.
    pub by_keyword: BTreeMap<String, Vec<usize>>,
}

impl RankedPool {
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.by_keyword.keys().map(String::as_str)
    }

    /// Listings sharing `keyword`, best first.
    pub fn keyword_group(&self, keyword: &str) -> Vec<&ScoredListing> {
        self.by_keyword
            .get(keyword)
            .into_iter()
            .flatten()
            .map(|&pos| &self.listings[pos])
            .collect()
    }
}

/// Sorts `indices` (into `listings`) by the ranking rule.
pub fn rank_order(listings: &[ScoredListing], mut indices: Vec<usize>) -> Vec<usize> {
    indices.sort_by(|&a, &b| {
        let (la, lb) = (&listings[a], &listings[b]);
        lb.composite_score
            .total_cmp(&la.composite_score)
            .then_with(|| la.listing.source_index.cmp(&lb.listing.source_index))
    });

    let mut start = 0;
    for i in 1..=indices.len() {
        let run_ends = i == indices.len()
            || listings[indices[start]].composite_score - listings[indices[i]].composite_score
                > SCORE_EPSILON;
        if !run_ends {
            continue;
        }

        indices[start..i].sort_by(|&a, &b| {
            let (la, lb) = (&listings[a].listing, &listings[b].listing);
            lb.est_revenue
                .total_cmp(&la.est_revenue)
                .then_with(|| la.source_index.cmp(&lb.source_index))
        });
        start = i;
    }

    indices
}

/// Ranks the pooled listings of every keyword source.
pub fn rank_pool(scored: Vec<ScoredListing>) -> RankedPool {
    let order = rank_order(&scored, (0..scored.len()).collect());

    let mut slots: Vec<Option<ScoredListing>> = scored.into_iter().map(Some).collect();
    let listings: Vec<ScoredListing> = order
        .iter()
        .filter_map(|&i| slots[i].take())
        .enumerate()
        .map(|(pos, mut l)| {
            l.rank = pos + 1;
            l
        })
        .collect();

    let mut by_keyword: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (pos, l) in listings.iter().enumerate() {
        by_keyword.entry(l.listing.keyword.clone()).or_default().push(pos);
    }

    RankedPool {
        listings,
        by_keyword,
    }
}
