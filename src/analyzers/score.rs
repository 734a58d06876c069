//! Composite and archetype scoring.
//!
//! Scoring is two-pass: [`PoolExtents::collect`] records the range of every
//! weighted metric across the pool, then each listing is scored against those
//! ranges. The composite is `Σ weight * min_max(metric)`, so its upper bound
//! is the sum of the weights.
//!
//! | Component        | Raw metric                     |
//! |------------------|--------------------------------|
//! | `views`          | total views                    |
//! | `sales_velocity` | est. sales / max(age, 1)       |
//! | `revenue`        | est. revenue                   |
//! | `hearts`         | hearts                         |
//! | `recency`        | 1 / max(age, 1)                |

use crate::analyzers::types::{NormalizedListing, ScoredListing};
use crate::analyzers::utility::Extent;
use crate::config::{OpportunityConfig, WeightConfig};

fn age_floor(age_days: u32, floor: u32) -> f64 {
    age_days.max(floor) as f64
}

fn sales_velocity(l: &NormalizedListing) -> f64 {
    l.est_sales / age_floor(l.age_days, 1)
}

fn recency(l: &NormalizedListing) -> f64 {
    1.0 / age_floor(l.age_days, 1)
}

/// Favors high daily views on young listings.
/// Strictly decreasing in age (from age 1) for positive daily views.
pub fn trending_score(daily_views: f64, age_days: u32) -> f64 {
    daily_views * (1.0 + 100.0 / age_floor(age_days, 1))
}

/// Favors sustained daily views on old listings.
/// Non-decreasing in age; ages below 10 score as 10.
pub fn evergreen_score(daily_views: f64, age_days: u32) -> f64 {
    daily_views * age_floor(age_days, 10).log10()
}

/// Per-metric extents gathered in the first scoring pass.
/// `None` means the pool was empty.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoolExtents {
    pub views: Option<Extent>,
    pub sales_velocity: Option<Extent>,
    pub revenue: Option<Extent>,
    pub hearts: Option<Extent>,
    pub recency: Option<Extent>,
}

impl PoolExtents {
    pub fn collect(listings: &[NormalizedListing]) -> Self {
        Self {
            views: Extent::of(listings.iter().map(|l| l.total_views)),
            sales_velocity: Extent::of(listings.iter().map(sales_velocity)),
            revenue: Extent::of(listings.iter().map(|l| l.est_revenue)),
            hearts: Extent::of(listings.iter().map(|l| l.hearts)),
            recency: Extent::of(listings.iter().map(recency)),
        }
    }
}

fn scale(extent: Option<Extent>, v: f64) -> f64 {
    extent.map_or(0.0, |e| e.scale(v))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeScorer {
    weights: WeightConfig,
    opportunity: OpportunityConfig,
}

impl CompositeScorer {
    pub fn new(weights: WeightConfig, opportunity: OpportunityConfig) -> Self {
        Self {
            weights,
            opportunity,
        }
    }

    /// Scores every listing of the pool. Ranks and tiers are left unset.
    pub fn score_pool(&self, listings: Vec<NormalizedListing>) -> Vec<ScoredListing> {
        let extents = PoolExtents::collect(&listings);

        listings
            .into_iter()
            .map(|l| self.score_one(l, &extents))
            .collect()
    }

    /// Scores a single listing against extents collected from its pool.
    pub fn score_one(&self, listing: NormalizedListing, extents: &PoolExtents) -> ScoredListing {
        let w = &self.weights;
        let hearts_norm = scale(extents.hearts, listing.hearts);

        let composite = w.views * scale(extents.views, listing.total_views)
            + w.sales_velocity * scale(extents.sales_velocity, sales_velocity(&listing))
            + w.revenue * scale(extents.revenue, listing.est_revenue)
            + w.hearts * hearts_norm
            + w.recency * scale(extents.recency, recency(&listing));

        let total = w.total();
        let unit_composite = if total > 0.0 { composite / total } else { 0.0 };
        let opportunity = (unit_composite
            * (1.0 - self.opportunity.competition_weight * hearts_norm))
            .clamp(0.0, 1.0);

        ScoredListing {
            composite_score: composite,
            trending_score: trending_score(listing.daily_views, listing.age_days),
            evergreen_score: evergreen_score(listing.daily_views, listing.age_days),
            opportunity_score: opportunity,
            rank: 0,
            tier: None,
            listing,
        }
    }
}
