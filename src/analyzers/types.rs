//! Data types used by the ranking pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A raw cell value: CSV cells arrive as text, JSON sources may carry numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

/// One listing row as ingested, keyed by the source file's header names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Explicit keyword tag; takes precedence over any keyword column and the
    /// keyword of the source the record came from.
    pub keyword: Option<String>,
    pub fields: BTreeMap<String, RawValue>,
}

impl ListingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, value: impl Into<RawValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keyword = Some(keyword.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields.get(name)
    }
}

/// All records ingested from one keyword search export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordSource {
    pub keyword: String,
    pub records: Vec<ListingRecord>,
}

impl KeywordSource {
    pub fn new(keyword: &str, records: Vec<ListingRecord>) -> Self {
        Self {
            keyword: keyword.to_string(),
            records,
        }
    }
}

/// Numeric listing fields recognised by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Age,
    TotalViews,
    DailyViews,
    Hearts,
    Price,
    EstSales,
    EstRevenue,
}

/// Cleaned numeric view of a [`ListingRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedListing {
    /// Position of the source record in the pooled input (insertion order).
    pub source_index: usize,
    pub keyword: String,
    pub title: String,
    pub shop: String,
    pub age_days: u32,
    pub daily_views: f64,
    pub total_views: f64,
    pub hearts: f64,
    pub price: f64,
    pub est_sales: f64,
    pub est_revenue: f64,
    /// Metrics that were missing or unparseable and took a default value.
    pub defaulted: Vec<Metric>,
}

impl NormalizedListing {
    pub fn is_defaulted(&self, metric: Metric) -> bool {
        self.defaulted.contains(&metric)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tier {
    A,
    B,
    C,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
        };
        f.write_str(s)
    }
}

/// A normalized listing with its scores, global rank and tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredListing {
    #[serde(flatten)]
    pub listing: NormalizedListing,
    pub composite_score: f64,
    pub trending_score: f64,
    pub evergreen_score: f64,
    pub opportunity_score: f64,
    /// 1-based position in the global ranking; 0 until ranked.
    pub rank: usize,
    /// `None` until the tier selector runs.
    pub tier: Option<Tier>,
}

/// Counts per tier and the keyword make-up of tier A.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionStats {
    pub total: usize,
    pub a_count: usize,
    pub b_count: usize,
    pub c_count: usize,
    pub a_by_keyword: BTreeMap<String, usize>,
    /// Resolved composite score a listing needed for tier B.
    pub b_threshold: f64,
    /// A slots filled past the per-keyword cap (only when spillover is on).
    pub spillover_filled: usize,
}

/// Tier lists, each in global rank order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionResult {
    pub a_list: Vec<ScoredListing>,
    pub b_list: Vec<ScoredListing>,
    pub c_list: Vec<ScoredListing>,
    pub stats: SelectionStats,
}

impl SelectionResult {
    pub fn len(&self) -> usize {
        self.a_list.len() + self.b_list.len() + self.c_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tier(&self, tier: Tier) -> &[ScoredListing] {
        match tier {
            Tier::A => &self.a_list,
            Tier::B => &self.b_list,
            Tier::C => &self.c_list,
        }
    }

    /// Every listing, tier A first, then B, then C.
    pub fn iter(&self) -> impl Iterator<Item = &ScoredListing> {
        self.a_list
            .iter()
            .chain(self.b_list.iter())
            .chain(self.c_list.iter())
    }
}

/// Listings whose age falls in `min_days..=max_days` (`None` = unbounded).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeBucket {
    pub label: String,
    pub min_days: u32,
    pub max_days: Option<u32>,
    pub count: usize,
    pub avg_daily_views: f64,
    pub avg_revenue: f64,
}

impl AgeBucket {
    pub fn contains(&self, age_days: u32) -> bool {
        age_days >= self.min_days && self.max_days.is_none_or(|max| age_days <= max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgeBucketReport {
    pub buckets: Vec<AgeBucket>,
    pub trending: Vec<ScoredListing>,
    pub evergreen: Vec<ScoredListing>,
}

/// Per-keyword market figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeywordSummary {
    pub keyword: String,
    pub listings: usize,
    pub avg_price: f64,
    pub total_revenue: f64,
    pub avg_composite: f64,
}

/// Pool-wide market figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketSummary {
    pub listings: usize,
    pub keywords: usize,
    pub avg_price: f64,
    pub price_stddev: f64,
    pub avg_daily_views: f64,
    pub total_est_sales: f64,
    pub total_est_revenue: f64,
    pub by_keyword: Vec<KeywordSummary>,
}

/// Bookkeeping for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    pub sources: usize,
    pub records: usize,
    /// Metric values that were missing or unparseable and defaulted.
    pub defaulted_fields: usize,
}

/// Complete output of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub selection: SelectionResult,
    pub age_report: AgeBucketReport,
    pub summary: MarketSummary,
    pub stats: PipelineStats,
}
