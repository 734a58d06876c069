use chrono::Utc;
use tracing::{info, warn};

use crate::analyzers::age::analyze_ages;
use crate::analyzers::normalize::{AliasTable, Normalizer};
use crate::analyzers::rank::rank_pool;
use crate::analyzers::score::CompositeScorer;
use crate::analyzers::summary::summarize;
use crate::analyzers::tier::select_tiers;
use crate::analyzers::types::{
    AnalysisReport, KeywordSource, NormalizedListing, PipelineStats, ScoredListing,
};
use crate::config::AnalysisConfig;
use crate::error::ConfigError;

/// Runs normalize → score → rank → tier → bucket over pooled keyword sources.
///
/// The configuration is validated once, when the pipeline is built; a run
/// never fails and never shares state with earlier runs.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: AnalysisConfig,
    normalizer: Normalizer,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            normalizer: Normalizer::default(),
        })
    }

    /// Replaces the default header alias table.
    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.normalizer = Normalizer::new(aliases);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Normalizes every record of every source, indexed in pooled order.
    pub fn normalize(&self, sources: &[KeywordSource]) -> Vec<NormalizedListing> {
        sources
            .iter()
            .flat_map(|source| {
                source
                    .records
                    .iter()
                    .map(move |record| (source.keyword.as_str(), record))
            })
            .enumerate()
            .map(|(index, (keyword, record))| self.normalizer.normalize(index, record, keyword))
            .collect()
    }

    #[tracing::instrument(skip_all, fields(sources = sources.len()))]
    pub fn run(&self, sources: &[KeywordSource]) -> AnalysisReport {
        let normalized = self.normalize(sources);
        let stats = PipelineStats {
            sources: sources.len(),
            records: normalized.len(),
            defaulted_fields: normalized.iter().map(|l| l.defaulted.len()).sum(),
        };
        info!(
            records = stats.records,
            defaulted_fields = stats.defaulted_fields,
            "Normalized listings"
        );
        if normalized.is_empty() {
            warn!("Listing pool is empty");
        }

        let scorer = CompositeScorer::new(self.config.weights, self.config.opportunity);
        let scored = scorer.score_pool(normalized);

        let ranked = rank_pool(scored);
        info!(
            listings = ranked.len(),
            keywords = ranked.by_keyword.len(),
            "Ranked listings"
        );

        let selection = select_tiers(ranked, &self.config.tiers);
        info!(
            a = selection.stats.a_count,
            b = selection.stats.b_count,
            c = selection.stats.c_count,
            b_threshold = selection.stats.b_threshold,
            "Selected tiers"
        );

        let pooled: Vec<ScoredListing> = selection.iter().cloned().collect();
        let age_report = analyze_ages(&pooled, self.config.top_n);
        let summary = summarize(&pooled);
        info!(
            trending = age_report.trending.len(),
            evergreen = age_report.evergreen.len(),
            "Bucketed listings by age"
        );

        AnalysisReport {
            generated_at: Utc::now(),
            selection,
            age_report,
            summary,
            stats,
        }
    }
}
