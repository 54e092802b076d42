//! Filter conversion to Qdrant `Filter`.
//!
//! Keyword equality for device/country/version, integer any-of for rating and
//! an inclusive range on `date_ts`. All clauses go under `must`.

use qdrant_client::qdrant::{Condition, Filter, Range};
use tracing::debug;

use crate::record::{FilterSpec, TimestampRange};

/// Normalizes raw filter hints into a [`FilterSpec`].
///
/// Strings are trimmed and lower-cased (empty ones ignored), ratings outside
/// `1..=5` are dropped, and the range exists when either bound is set.
/// Returns `None` when nothing survives.
pub fn build_filter(
    device: &str,
    ratings: &[i64],
    country: &str,
    version: &str,
    start_ts: Option<i64>,
    end_ts: Option<i64>,
) -> Option<FilterSpec> {
    let clean = |s: &str| Some(s.trim().to_lowercase()).filter(|v| !v.is_empty());

    let mut valid: Vec<i64> = Vec::new();
    for r in ratings.iter().copied().filter(|r| (1..=5).contains(r)) {
        if !valid.contains(&r) {
            valid.push(r);
        }
    }

    let spec = FilterSpec {
        device: clean(device),
        ratings: valid,
        country: clean(country),
        version: clean(version),
        date_range: (start_ts.is_some() || end_ts.is_some()).then_some(TimestampRange {
            gte: start_ts,
            lte: end_ts,
        }),
    };
    (!spec.is_empty()).then_some(spec)
}

/// Converts [`FilterSpec`] to a Qdrant [`Filter`].
pub fn to_qdrant_filter(f: &FilterSpec) -> Filter {
    let mut must: Vec<Condition> = Vec::new();

    if !f.ratings.is_empty() {
        must.push(Condition::matches("rating", f.ratings.clone()));
    }
    for (key, value) in [
        ("device", &f.device),
        ("country", &f.country),
        ("version", &f.version),
    ] {
        if let Some(v) = value {
            must.push(Condition::matches(key, v.clone()));
        }
    }
    if let Some(range) = &f.date_range {
        must.push(Condition::range(
            "date_ts",
            Range {
                gte: range.gte.map(|v| v as f64),
                lte: range.lte.map(|v| v as f64),
                ..Default::default()
            },
        ));
    }

    debug!(clauses = must.len(), "filters::to_qdrant_filter");
    Filter::must(must)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_hints_build_nothing() {
        assert!(build_filter("", &[], " ", "", None, None).is_none());
        assert!(build_filter("", &[0, 9, -1], "", "", None, None).is_none());
    }

    #[test]
    fn hints_are_normalized() {
        let f = build_filter(" iOS ", &[5, 7, 5], "India", "V3", None, Some(10)).unwrap();
        assert_eq!(f.device.as_deref(), Some("ios"));
        assert_eq!(f.ratings, vec![5]);
        assert_eq!(f.country.as_deref(), Some("india"));
        assert_eq!(f.version.as_deref(), Some("v3"));
        assert_eq!(f.date_range, Some(TimestampRange { gte: None, lte: Some(10) }));
    }

    use qdrant_client::qdrant::FieldCondition;
    use qdrant_client::qdrant::condition::ConditionOneOf;
    use qdrant_client::qdrant::r#match::MatchValue;

    fn field(c: &Condition) -> &FieldCondition {
        match &c.condition_one_of {
            Some(ConditionOneOf::Field(fc)) => fc,
            other => panic!("expected a field condition, got {other:?}"),
        }
    }

    fn match_value(fc: &FieldCondition) -> Option<&MatchValue> {
        fc.r#match.as_ref().and_then(|m| m.match_value.as_ref())
    }

    #[test]
    fn qdrant_filter_has_one_must_clause_per_field() {
        let f = build_filter("ios", &[4, 5], "", "", Some(1), Some(2)).unwrap();
        let q = to_qdrant_filter(&f);
        assert_eq!(q.must.len(), 3);
        assert!(q.should.is_empty());
        assert!(q.must_not.is_empty());
    }

    #[test]
    fn qdrant_clauses_carry_keys_and_values() {
        let f = build_filter("iOS", &[4, 5], "", "", Some(1), Some(2)).unwrap();
        let q = to_qdrant_filter(&f);

        let rating = field(&q.must[0]);
        assert_eq!(rating.key, "rating");
        match match_value(rating) {
            Some(MatchValue::Integers(ints)) => assert_eq!(ints.integers, vec![4, 5]),
            other => panic!("rating should be an any-of, got {other:?}"),
        }

        let device = field(&q.must[1]);
        assert_eq!(device.key, "device");
        assert_eq!(match_value(device), Some(&MatchValue::Keyword("ios".into())));

        let date = field(&q.must[2]);
        assert_eq!(date.key, "date_ts");
        let range = date.range.as_ref().unwrap();
        assert_eq!(range.gte, Some(1.0));
        assert_eq!(range.lte, Some(2.0));
        assert_eq!(range.gt, None);
        assert_eq!(range.lt, None);
    }

    #[test]
    fn country_and_version_are_keyword_matches() {
        let f = build_filter("", &[], "India", "V2", None, None).unwrap();
        let q = to_qdrant_filter(&f);
        let pairs: Vec<(&str, Option<&MatchValue>)> = q
            .must
            .iter()
            .map(|c| {
                let fc = field(c);
                (fc.key.as_str(), match_value(fc))
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("country", Some(&MatchValue::Keyword("india".into()))),
                ("version", Some(&MatchValue::Keyword("v2".into()))),
            ]
        );
    }
}
