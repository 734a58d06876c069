//! Output formatting and persistence for analysis reports.
//!
//! Supports pretty-printing, JSON serialization, and CSV export of tiered
//! listings.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::types::{AnalysisReport, Metric, ScoredListing, SelectionResult, Tier};

/// Fixed column set of the listing export.
pub const EXPORT_HEADERS: [&str; 16] = [
    "Tier",
    "Rank",
    "Keyword",
    "Listing Title",
    "Shop Name",
    "Listing Age (Days)",
    "Daily Views",
    "Total Views",
    "Hearts",
    "Price",
    "Est. Sales",
    "Est. Revenue",
    "Composite Score",
    "Trending Score",
    "Evergreen Score",
    "Opportunity Score",
];

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &AnalysisReport) {
    debug!("{:#?}", report);
}

/// Logs a short digest of the report: tiers, age buckets and the shortlists.
pub fn log_digest(report: &AnalysisReport) {
    let stats = &report.selection.stats;
    info!(
        total = stats.total,
        a = stats.a_count,
        b = stats.b_count,
        c = stats.c_count,
        spillover_filled = stats.spillover_filled,
        "Tier selection"
    );
    for (keyword, count) in &stats.a_by_keyword {
        info!(keyword = %keyword, count, "Tier A keyword share");
    }

    for bucket in &report.age_report.buckets {
        info!(
            bucket = %bucket.label,
            count = bucket.count,
            avg_daily_views = bucket.avg_daily_views,
            "Age bucket"
        );
    }
    for l in &report.age_report.trending {
        info!(title = %l.listing.title, score = l.trending_score, "Trending");
    }
    for l in &report.age_report.evergreen {
        info!(title = %l.listing.title, score = l.evergreen_score, "Evergreen");
    }

    let summary = &report.summary;
    info!(
        listings = summary.listings,
        keywords = summary.keywords,
        avg_price = summary.avg_price,
        total_est_revenue = summary.total_est_revenue,
        "Market summary"
    );
}

/// Writes the full report as pretty-printed JSON to `path`.
pub fn write_json(path: &str, report: &AnalysisReport) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create '{path}'"))?;
    serde_json::to_writer_pretty(file, report)?;
    info!(path, "Wrote JSON report");
    Ok(())
}

fn metric_cell(l: &ScoredListing, metric: Metric, value: f64) -> String {
    if l.listing.is_defaulted(metric) {
        String::new()
    } else {
        value.to_string()
    }
}

fn score_cell(value: f64) -> String {
    format!("{value:.4}")
}

fn export_row(l: &ScoredListing) -> Vec<String> {
    let n = &l.listing;
    vec![
        l.tier.map(|t| t.to_string()).unwrap_or_default(),
        l.rank.to_string(),
        n.keyword.clone(),
        n.title.clone(),
        n.shop.clone(),
        metric_cell(l, Metric::Age, n.age_days as f64),
        metric_cell(l, Metric::DailyViews, n.daily_views),
        metric_cell(l, Metric::TotalViews, n.total_views),
        metric_cell(l, Metric::Hearts, n.hearts),
        metric_cell(l, Metric::Price, n.price),
        metric_cell(l, Metric::EstSales, n.est_sales),
        metric_cell(l, Metric::EstRevenue, n.est_revenue),
        score_cell(l.composite_score),
        score_cell(l.trending_score),
        score_cell(l.evergreen_score),
        score_cell(l.opportunity_score),
    ]
}

/// Writes tiered listings as CSV, tier A first. `tier` restricts the export
/// to one tier. Missing or defaulted metrics are written as empty cells.
pub fn write_selection_csv<W: Write>(
    writer: W,
    selection: &SelectionResult,
    tier: Option<Tier>,
) -> Result<usize> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(EXPORT_HEADERS)?;

    let mut rows = 0;
    for l in selection.iter().filter(|l| tier.is_none() || l.tier == tier) {
        writer.write_record(export_row(l))?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}

/// Exports tiered listings to a CSV file at `path`, replacing it.
pub fn export_csv(path: &str, selection: &SelectionResult, tier: Option<Tier>) -> Result<()> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("failed to create '{path}'"))?;
    let rows = write_selection_csv(file, selection, tier)?;
    info!(path, rows, "Exported listings CSV");
    Ok(())
}
