//! CSV ingestion: one export file per keyword source.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::analyzers::types::{KeywordSource, ListingRecord, RawValue};

/// Splits a `KEYWORD=PATH` argument. Without a prefix the keyword is the
/// file stem. Text before `=` that contains a path separator belongs to the
/// path.
pub fn parse_source_arg(arg: &str) -> (String, String) {
    if let Some((keyword, path)) = arg.split_once('=') {
        let is_keyword = !keyword.trim().is_empty() && !keyword.contains(['/', '\\']);
        if is_keyword && !path.is_empty() {
            return (keyword.trim().to_string(), path.to_string());
        }
    }

    let keyword = Path::new(arg)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(arg)
        .to_string();
    (keyword, arg.to_string())
}

/// Reads listing rows from CSV. Headers are trimmed (a UTF-8 BOM is
/// dropped), ragged rows are accepted and empty cells are omitted.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ListingRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let mut record = ListingRecord::new();

        for (name, cell) in headers.iter().zip(row.iter()) {
            if name.is_empty() || cell.trim().is_empty() {
                continue;
            }
            record
                .fields
                .insert(name.clone(), RawValue::Text(cell.to_string()));
        }

        if record.fields.is_empty() {
            debug!("Skipping empty CSV row");
            continue;
        }
        records.push(record);
    }

    Ok(records)
}

/// Loads one CSV export as a keyword source.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_source(keyword: &str, path: &Path) -> Result<KeywordSource> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open '{}'", path.display()))?;
    let records =
        read_records(file).with_context(|| format!("failed to parse CSV '{}'", path.display()))?;

    if records.is_empty() {
        warn!("Source has no listing rows");
    }
    info!(records = records.len(), "Loaded keyword source");

    Ok(KeywordSource::new(keyword, records))
}

/// Loads every `KEYWORD=PATH` (or bare path) argument, in order.
pub fn load_sources(args: &[String]) -> Result<Vec<KeywordSource>> {
    args.iter()
        .map(|arg| {
            let (keyword, path) = parse_source_arg(arg);
            load_source(&keyword, Path::new(&path))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_arg() {
        assert_eq!(
            parse_source_arg("mugs=data/export.csv"),
            ("mugs".to_string(), "data/export.csv".to_string())
        );
        assert_eq!(
            parse_source_arg("data/ceramic vases.csv"),
            ("ceramic vases".to_string(), "data/ceramic vases.csv".to_string())
        );
        assert_eq!(
            parse_source_arg("=x.csv"),
            ("=x".to_string(), "=x.csv".to_string())
        );
    }

    #[test]
    fn test_parse_source_arg_path_with_equals() {
        assert_eq!(
            parse_source_arg("data/a=b.csv"),
            ("a=b".to_string(), "data/a=b.csv".to_string())
        );
        assert_eq!(
            parse_source_arg("ceramic mugs=exports/run=2/mugs.csv"),
            ("ceramic mugs".to_string(), "exports/run=2/mugs.csv".to_string())
        );
    }

    #[test]
    fn test_read_records_trims_headers_and_skips_blanks() {
        let csv = "\u{feff}Listing Title , Price,Hearts\nMug,\"$1,200.00\",\nVase,$5,3\n,,\n";

        let records = read_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Listing Title"), Some(&RawValue::from("Mug")));
        assert_eq!(records[0].get("Price"), Some(&RawValue::from("$1,200.00")));
        assert_eq!(records[0].get("Hearts"), None);
        assert_eq!(records[1].get("Hearts"), Some(&RawValue::from("3")));
    }

    #[test]
    fn test_read_records_accepts_ragged_rows() {
        let csv = "Title,Price,Hearts\nShort,2\nLong,3,4,extra\n";

        let records = read_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields.len(), 2);
        assert_eq!(records[1].fields.len(), 3);
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(load_source("x", Path::new("/nonexistent/listings.csv")).is_err());
    }
}
