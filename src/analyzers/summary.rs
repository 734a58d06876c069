use std::collections::BTreeMap;

use crate::analyzers::types::{KeywordSummary, MarketSummary, ScoredListing};
use crate::analyzers::utility::{mean, stddev};

/// Aggregates pool-wide and per-keyword market figures.
pub fn summarize(listings: &[ScoredListing]) -> MarketSummary {
    let prices: Vec<f64> = listings.iter().map(|l| l.listing.price).collect();
    let daily_views: Vec<f64> = listings.iter().map(|l| l.listing.daily_views).collect();
    let avg_price = mean(&prices);

    let mut groups: BTreeMap<&str, Vec<&ScoredListing>> = BTreeMap::new();
    for l in listings {
        groups.entry(l.listing.keyword.as_str()).or_default().push(l);
    }

    let by_keyword = groups
        .into_iter()
        .map(|(keyword, members)| {
            let prices: Vec<f64> = members.iter().map(|l| l.listing.price).collect();
            let composites: Vec<f64> = members.iter().map(|l| l.composite_score).collect();

            KeywordSummary {
                keyword: keyword.to_string(),
                listings: members.len(),
                avg_price: mean(&prices),
                total_revenue: members.iter().map(|l| l.listing.est_revenue).sum(),
                avg_composite: mean(&composites),
            }
        })
        .collect::<Vec<_>>();

    MarketSummary {
        listings: listings.len(),
        keywords: by_keyword.len(),
        avg_price,
        price_stddev: stddev(&prices, avg_price),
        avg_daily_views: mean(&daily_views),
        total_est_sales: listings.iter().map(|l| l.listing.est_sales).sum(),
        total_est_revenue: listings.iter().map(|l| l.listing.est_revenue).sum(),
        by_keyword,
    }
}
