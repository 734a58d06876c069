//! Age buckets and the trending/evergreen shortlists.
//!
//! Buckets are fixed and contiguous over whole days: 0–30, 31–90, 91–180 and
//! 181+. The trending list only considers listings younger than 60 days and
//! the evergreen list only listings older than 90 days; listings aged 60–90
//! days appear in neither.

use crate::analyzers::types::{AgeBucket, AgeBucketReport, ScoredListing};
use crate::analyzers::utility::mean;

pub const TRENDING_MAX_AGE_EXCLUSIVE: u32 = 60;
pub const EVERGREEN_MIN_AGE_EXCLUSIVE: u32 = 90;

const BUCKETS: [(&str, u32, Option<u32>); 4] = [
    ("0-30 days", 0, Some(30)),
    ("31-90 days", 31, Some(90)),
    ("91-180 days", 91, Some(180)),
    ("180+ days", 181, None),
];

/// Empty buckets in ascending age order.
pub fn empty_buckets() -> Vec<AgeBucket> {
    BUCKETS
        .iter()
        .map(|&(label, min_days, max_days)| AgeBucket {
            label: label.to_string(),
            min_days,
            max_days,
            count: 0,
            avg_daily_views: 0.0,
            avg_revenue: 0.0,
        })
        .collect()
}

fn top_by(
    listings: &[ScoredListing],
    keep: impl Fn(&ScoredListing) -> bool,
    score: impl Fn(&ScoredListing) -> f64,
    n: usize,
) -> Vec<ScoredListing> {
    let mut picked: Vec<&ScoredListing> = listings.iter().filter(|l| keep(l)).collect();
    picked.sort_by(|a, b| {
        score(b)
            .total_cmp(&score(a))
            .then_with(|| a.listing.source_index.cmp(&b.listing.source_index))
    });
    picked.into_iter().take(n).cloned().collect()
}

/// Buckets the pool by age and builds top-`n` trending and evergreen lists.
pub fn analyze_ages(listings: &[ScoredListing], n: usize) -> AgeBucketReport {
    let mut buckets = empty_buckets();

    for bucket in &mut buckets {
        let members: Vec<&ScoredListing> = listings
            .iter()
            .filter(|l| bucket.contains(l.listing.age_days))
            .collect();
        let views: Vec<f64> = members.iter().map(|l| l.listing.daily_views).collect();
        let revenue: Vec<f64> = members.iter().map(|l| l.listing.est_revenue).collect();

        bucket.count = members.len();
        bucket.avg_daily_views = mean(&views);
        bucket.avg_revenue = mean(&revenue);
    }

    let trending = top_by(
        listings,
        |l| l.listing.age_days < TRENDING_MAX_AGE_EXCLUSIVE,
        |l| l.trending_score,
        n,
    );
    let evergreen = top_by(
        listings,
        |l| l.listing.age_days > EVERGREEN_MIN_AGE_EXCLUSIVE,
        |l| l.evergreen_score,
        n,
    );

    AgeBucketReport {
        buckets,
        trending,
        evergreen,
    }
}
