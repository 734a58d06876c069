//! Turns loosely-typed listing records into clean numeric metrics.
//!
//! Field names differ between export tools, so every field is looked up
//! through an [`AliasTable`]: an ordered list of accepted header names per
//! field. The first name present wins; exact matches are tried before
//! case-insensitive ones. Absent or unparseable metrics default to 0 (age
//! defaults to 1) and are recorded in [`NormalizedListing::defaulted`].

use std::collections::BTreeMap;
use tracing::debug;

use crate::analyzers::types::{ListingRecord, Metric, NormalizedListing, RawValue};

/// Keyword assigned when neither the record nor its source names one.
pub const UNTAGGED_KEYWORD: &str = "untagged";

/// Age used when a record has no usable age.
pub const DEFAULT_AGE_DAYS: u32 = 1;

/// Every field the normalizer reads from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Shop,
    Keyword,
    Metric(Metric),
}

const METRICS: [Metric; 7] = [
    Metric::Age,
    Metric::TotalViews,
    Metric::DailyViews,
    Metric::Hearts,
    Metric::Price,
    Metric::EstSales,
    Metric::EstRevenue,
];

/// Ordered header names accepted for each [`Field`], canonical name first.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasTable {
    aliases: BTreeMap<Field, Vec<String>>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let mut aliases = BTreeMap::new();

        for (field, names) in [
            (Field::Title, &["Listing Title", "Title", "Listing", "title"][..]),
            (Field::Shop, &["Shop Name", "Shop", "Seller", "shop_name"][..]),
            (Field::Keyword, &["Keyword", "Search Term", "Query", "keyword"][..]),
            (
                Field::Metric(Metric::Age),
                &["Listing Age (Days)", "Age (Days)", "Listing Age", "Age", "age_days"][..],
            ),
            (
                Field::Metric(Metric::TotalViews),
                &["Total Views", "Views", "total_views"][..],
            ),
            (
                Field::Metric(Metric::DailyViews),
                &["Daily Views", "Views Per Day", "Avg. Daily Views", "daily_views"][..],
            ),
            (
                Field::Metric(Metric::Hearts),
                &["Hearts", "Favorites", "Favourites", "hearts"][..],
            ),
            (
                Field::Metric(Metric::Price),
                &["Price", "Listing Price", "price"][..],
            ),
            (
                Field::Metric(Metric::EstSales),
                &["Est. Sales", "Estimated Sales", "Sales", "est_sales"][..],
            ),
            (
                Field::Metric(Metric::EstRevenue),
                &["Est. Revenue", "Estimated Revenue", "Revenue", "est_revenue"][..],
            ),
        ] {
            aliases.insert(field, names.iter().map(|n| n.to_string()).collect());
        }

        Self { aliases }
    }
}

impl AliasTable {
    /// Accepted names for `field`, highest priority first.
    pub fn names(&self, field: Field) -> &[String] {
        self.aliases.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Appends `name` as the lowest-priority alias for `field`.
    pub fn with_alias(mut self, field: Field, name: &str) -> Self {
        let names = self.aliases.entry(field).or_default();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        self
    }

    /// Finds the value for `field`, skipping blank cells.
    pub fn lookup<'r>(&self, record: &'r ListingRecord, field: Field) -> Option<&'r RawValue> {
        let names = self.names(field);

        let exact = names
            .iter()
            .filter_map(|name| record.get(name))
            .find(|v| !is_blank(v));
        if exact.is_some() {
            return exact;
        }

        names.iter().find_map(|name| {
            record
                .fields
                .iter()
                .filter(|(key, _)| key.trim().eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
                .find(|v| !is_blank(v))
        })
    }
}

fn is_blank(value: &RawValue) -> bool {
    matches!(value, RawValue::Text(s) if s.trim().is_empty())
}

const CURRENCY_SYMBOLS: [char; 8] = ['$', '€', '£', '¥', '₹', '₩', '₽', '¢'];
const CURRENCY_CODES: [&str; 8] = ["USD", "EUR", "GBP", "CAD", "AUD", "JPY", "INR", "CHF"];

fn strip_currency_code(s: &str) -> &str {
    let s = s.trim();
    CURRENCY_CODES
        .iter()
        .find_map(|&code| s.strip_prefix(code).or_else(|| s.strip_suffix(code)))
        .unwrap_or(s)
}

/// Parses a numeric cell. Whitespace, thousands separators and currency
/// symbols or codes are removed; whatever remains must be a plain float
/// (exponents allowed), so unit suffixes such as `2.5K` fail. Non-finite
/// results are rejected.
pub fn parse_number(value: &RawValue) -> Option<f64> {
    let parsed = match value {
        RawValue::Number(v) => *v,
        RawValue::Text(s) => {
            let cleaned: String = strip_currency_code(s)
                .chars()
                .filter(|c| !c.is_whitespace() && *c != ',' && !CURRENCY_SYMBOLS.contains(c))
                .collect();
            cleaned.parse::<f64>().ok()?
        }
    };

    parsed.is_finite().then_some(parsed)
}

fn text(value: &RawValue) -> String {
    match value {
        RawValue::Text(s) => s.trim().to_string(),
        RawValue::Number(v) => v.to_string(),
    }
}

/// Stateless record normalizer driven by an [`AliasTable`].
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    aliases: AliasTable,
}

impl Normalizer {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Normalizes one record. `source_keyword` is the keyword of the source
    /// the record was ingested from; `source_index` its pooled position.
    pub fn normalize(
        &self,
        source_index: usize,
        record: &ListingRecord,
        source_keyword: &str,
    ) -> NormalizedListing {
        let mut values: BTreeMap<Metric, f64> = BTreeMap::new();
        let mut defaulted = Vec::new();

        for metric in METRICS {
            let parsed = self
                .aliases
                .lookup(record, Field::Metric(metric))
                .and_then(parse_number)
                .filter(|v| *v >= 0.0);

            match parsed {
                Some(v) => {
                    values.insert(metric, v);
                }
                None => {
                    defaulted.push(metric);
                }
            }
        }

        if !defaulted.is_empty() {
            debug!(source_index, ?defaulted, "Defaulted missing or unparseable metrics");
        }

        let age_days = values
            .get(&Metric::Age)
            .map(|v| v.floor().min(u32::MAX as f64) as u32)
            .unwrap_or(DEFAULT_AGE_DAYS);
        let metric = |m: Metric| values.get(&m).copied().unwrap_or(0.0);

        NormalizedListing {
            source_index,
            keyword: self.keyword(record, source_keyword),
            title: self
                .aliases
                .lookup(record, Field::Title)
                .map(text)
                .unwrap_or_default(),
            shop: self
                .aliases
                .lookup(record, Field::Shop)
                .map(text)
                .unwrap_or_default(),
            age_days,
            daily_views: metric(Metric::DailyViews),
            total_views: metric(Metric::TotalViews),
            hearts: metric(Metric::Hearts),
            price: metric(Metric::Price),
            est_sales: metric(Metric::EstSales),
            est_revenue: metric(Metric::EstRevenue),
            defaulted,
        }
    }

    fn keyword(&self, record: &ListingRecord, source_keyword: &str) -> String {
        let tagged = record
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| self.aliases.lookup(record, Field::Keyword).map(text));

        match tagged {
            Some(k) => k,
            None if !source_keyword.trim().is_empty() => source_keyword.trim().to_string(),
            None => UNTAGGED_KEYWORD.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> ListingRecord {
        ListingRecord::new()
            .with_field("Listing Title", "Handmade Mug")
            .with_field("Shop Name", "ClayCo")
            .with_field("Listing Age (Days)", "45")
            .with_field("Total Views", "1,250")
            .with_field("Daily Views", "27.5")
            .with_field("Hearts", "310")
            .with_field("Price", "$24.99")
            .with_field("Est. Sales", "40")
            .with_field("Est. Revenue", "$999.60")
    }

    #[test]
    fn test_parse_number_strips_decoration() {
        assert_eq!(parse_number(&"$1,234.50".into()), Some(1234.5));
        assert_eq!(parse_number(&"€ 12".into()), Some(12.0));
        assert_eq!(parse_number(&"USD 3.00".into()), Some(3.0));
        assert_eq!(parse_number(&RawValue::Number(7.0)), Some(7.0));
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert_eq!(parse_number(&"N/A".into()), None);
        assert_eq!(parse_number(&"".into()), None);
        assert_eq!(parse_number(&"1.2.3".into()), None);
        assert_eq!(parse_number(&RawValue::Number(f64::NAN)), None);
        assert_eq!(parse_number(&RawValue::Number(f64::INFINITY)), None);
        assert_eq!(parse_number(&"inf".into()), None);
    }

    #[test]
    fn test_parse_number_keeps_exponents() {
        assert_eq!(parse_number(&"1.2E+05".into()), Some(120_000.0));
        assert_eq!(parse_number(&"1e3".into()), Some(1000.0));
        assert_eq!(parse_number(&"12 EUR".into()), Some(12.0));
    }

    #[test]
    fn test_parse_number_rejects_unit_suffixes() {
        assert_eq!(parse_number(&"2.5K".into()), None);
        assert_eq!(parse_number(&"300 views".into()), None);

        let record = ListingRecord::new().with_field("Total Views", "2.5K");
        let n = Normalizer::default().normalize(0, &record, "x");
        assert_eq!(n.total_views, 0.0);
        assert!(n.is_defaulted(Metric::TotalViews));
    }

    #[test]
    fn test_normalize_full_record() {
        let n = Normalizer::default().normalize(3, &full_record(), "mugs");

        assert_eq!(n.source_index, 3);
        assert_eq!(n.keyword, "mugs");
        assert_eq!(n.title, "Handmade Mug");
        assert_eq!(n.shop, "ClayCo");
        assert_eq!(n.age_days, 45);
        assert_eq!(n.total_views, 1250.0);
        assert_eq!(n.daily_views, 27.5);
        assert_eq!(n.hearts, 310.0);
        assert_eq!(n.price, 24.99);
        assert_eq!(n.est_sales, 40.0);
        assert_eq!(n.est_revenue, 999.6);
        assert!(n.defaulted.is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let record = ListingRecord::new().with_field("Listing Title", "Bare");
        let n = Normalizer::default().normalize(0, &record, "");

        assert_eq!(n.age_days, DEFAULT_AGE_DAYS);
        assert_eq!(n.daily_views, 0.0);
        assert_eq!(n.est_revenue, 0.0);
        assert_eq!(n.keyword, UNTAGGED_KEYWORD);
        assert_eq!(n.defaulted.len(), 7);
        assert!(n.is_defaulted(Metric::Age));
    }

    #[test]
    fn test_unparseable_and_negative_values_default() {
        let record = ListingRecord::new()
            .with_field("Listing Age (Days)", "unknown")
            .with_field("Price", "-5")
            .with_field("Hearts", "12");
        let n = Normalizer::default().normalize(0, &record, "x");

        assert_eq!(n.age_days, 1);
        assert_eq!(n.price, 0.0);
        assert_eq!(n.hearts, 12.0);
        assert!(n.is_defaulted(Metric::Age));
        assert!(n.is_defaulted(Metric::Price));
        assert!(!n.is_defaulted(Metric::Hearts));
    }

    #[test]
    fn test_alias_priority_and_case_insensitive_fallback() {
        let record = ListingRecord::new()
            .with_field("Views", "10")
            .with_field("Total Views", "20")
            .with_field("  daily VIEWS ", "3");
        let n = Normalizer::default().normalize(0, &record, "x");

        assert_eq!(n.total_views, 20.0);
        assert_eq!(n.daily_views, 3.0);
    }

    #[test]
    fn test_blank_canonical_falls_through_to_alias() {
        let record = ListingRecord::new()
            .with_field("Est. Revenue", "  ")
            .with_field("Revenue", "150");
        let n = Normalizer::default().normalize(0, &record, "x");

        assert_eq!(n.est_revenue, 150.0);
    }

    #[test]
    fn test_fractional_age_floors() {
        let record = ListingRecord::new().with_field("Age", RawValue::Number(12.9));
        let n = Normalizer::default().normalize(0, &record, "x");

        assert_eq!(n.age_days, 12);
    }

    #[test]
    fn test_keyword_precedence() {
        let normalizer = Normalizer::default();

        let column = ListingRecord::new().with_field("Keyword", "vases");
        assert_eq!(normalizer.normalize(0, &column, "mugs").keyword, "vases");

        let tagged = column.clone().with_keyword("plates");
        assert_eq!(normalizer.normalize(0, &tagged, "mugs").keyword, "plates");

        let plain = ListingRecord::new();
        assert_eq!(normalizer.normalize(0, &plain, " mugs ").keyword, "mugs");
    }

    #[test]
    fn test_custom_alias() {
        let aliases = AliasTable::default().with_alias(Field::Metric(Metric::Hearts), "Likes");
        let record = ListingRecord::new().with_field("Likes", "99");
        let n = Normalizer::new(aliases).normalize(0, &record, "x");

        assert_eq!(n.hearts, 99.0);
    }
}
