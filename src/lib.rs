pub mod analyzers;
pub mod config;
pub mod error;
pub mod ingest;
pub mod output;

pub use analyzers::analyzer::Pipeline;
pub use config::AnalysisConfig;
pub use error::ConfigError;
