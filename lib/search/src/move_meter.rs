//! City comparison ("move meter").
//!
//! Five metrics per city, each normalized to 0-100 against the min/max of the
//! whole table. Lower-is-better metrics are inverted so that a higher score is
//! always better for the mover.

use crate::projector::extra_value;
use estatex_core::price::parse_finite;
use estatex_core::{normalize_key, round2, CsvTable, Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

pub const CITY_COLUMN: &str = "City";

pub const MSG_MISSING_CITIES: &str = "Please provide from_city and to_city";
pub const MSG_CITY_NOT_FOUND: &str = "One or both cities not found";

#[derive(Debug, Clone, Copy)]
pub struct MetricSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub higher_better: bool,
}

pub const METRICS: [MetricSpec; 5] = [
    MetricSpec {
        key: "Housing_Cost_per_sqft",
        label: "Housing Affordability",
        higher_better: false,
    },
    MetricSpec {
        key: "Job_Market_Score",
        label: "Job Market",
        higher_better: true,
    },
    MetricSpec {
        key: "Cost_of_Living_Index",
        label: "Cost of Living",
        higher_better: false,
    },
    MetricSpec {
        key: "Amenities_Score",
        label: "Amenities",
        higher_better: true,
    },
    MetricSpec {
        key: "Lifestyle_Score",
        label: "Lifestyle",
        higher_better: true,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    From,
    To,
    Tie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricComparison {
    pub key: &'static str,
    pub label: &'static str,
    pub from_value: Value,
    pub to_value: Value,
    pub from_score: Option<f64>,
    pub to_score: Option<f64>,
    pub higher_better: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub from_overall: f64,
    pub to_overall: f64,
    pub winner: Winner,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityComparison {
    pub from_city: Map<String, Value>,
    pub to_city: Map<String, Value>,
    pub metrics: Vec<MetricComparison>,
    pub summary: Option<Summary>,
}

#[derive(Debug, Clone)]
pub struct MoveMeter {
    table: CsvTable,
    city_column: usize,
    /// Column index and (min, max) per entry of [`METRICS`]
    ranges: Vec<Option<(usize, f64, f64)>>,
}

impl MoveMeter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(CsvTable::from_path(path)?)
    }

    pub fn new(table: CsvTable) -> Result<Self> {
        let city_column = table.column_index(CITY_COLUMN).ok_or_else(|| {
            Error::Artifact(format!("city data is missing column '{}'", CITY_COLUMN))
        })?;

        let ranges = METRICS
            .iter()
            .map(|metric| {
                let col = table.column_index(metric.key)?;
                let (min, max) = table
                    .rows
                    .iter()
                    .filter_map(|row| parse_finite(&row[col]))
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(v), hi.max(v))
                    });
                (min <= max).then_some((col, min, max))
            })
            .collect();

        debug!(cities = table.rows.len(), "Loaded city metrics");
        Ok(Self {
            table,
            city_column,
            ranges,
        })
    }

    pub fn len(&self) -> usize {
        self.table.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.rows.is_empty()
    }

    fn find(&self, city: &str) -> Option<&[String]> {
        let key = normalize_key(city);
        self.table
            .rows
            .iter()
            .find(|row| normalize_key(&row[self.city_column]) == key)
            .map(Vec::as_slice)
    }

    fn row_object(&self, row: &[String]) -> Map<String, Value> {
        self.table
            .headers
            .iter()
            .zip(row)
            .map(|(h, v)| (h.clone(), extra_value(v)))
            .collect()
    }

    /// 0-100 score for metric `i`, or `None` when it cannot be computed.
    fn score(&self, i: usize, row: &[String]) -> Option<f64> {
        let (col, min, max) = self.ranges[i]?;
        if min == max {
            return None;
        }
        let value = parse_finite(&row[col])?;
        let pct = if METRICS[i].higher_better {
            (value - min) / (max - min)
        } else {
            (max - value) / (max - min)
        };
        Some(round2(pct.clamp(0.0, 1.0) * 100.0))
    }

    pub fn compare(&self, from_city: Option<&str>, to_city: Option<&str>) -> Result<CityComparison> {
        fn present(c: Option<&str>) -> Option<&str> {
            c.filter(|c| !c.trim().is_empty())
        }
        let (Some(from_city), Some(to_city)) = (present(from_city), present(to_city)) else {
            return Err(Error::validation(MSG_MISSING_CITIES));
        };
        let (Some(from), Some(to)) = (self.find(from_city), self.find(to_city)) else {
            return Err(Error::not_found(MSG_CITY_NOT_FOUND));
        };

        let mut from_scores = Vec::new();
        let mut to_scores = Vec::new();
        let metrics = METRICS
            .iter()
            .enumerate()
            .map(|(i, metric)| {
                let cell = |row: &[String]| {
                    self.table
                        .column_index(metric.key)
                        .map(|col| extra_value(&row[col]))
                        .unwrap_or(Value::Null)
                };
                let from_score = self.score(i, from);
                let to_score = self.score(i, to);
                from_scores.extend(from_score);
                to_scores.extend(to_score);
                MetricComparison {
                    key: metric.key,
                    label: metric.label,
                    from_value: cell(from),
                    to_value: cell(to),
                    from_score,
                    to_score,
                    higher_better: metric.higher_better,
                }
            })
            .collect();

        let summary = match (average(&from_scores), average(&to_scores)) {
            (Some(from_overall), Some(to_overall)) => Some(Summary {
                from_overall,
                to_overall,
                winner: if from_overall > to_overall {
                    Winner::From
                } else if to_overall > from_overall {
                    Winner::To
                } else {
                    Winner::Tie
                },
            }),
            _ => None,
        };

        Ok(CityComparison {
            from_city: self.row_object(from),
            to_city: self.row_object(to),
            metrics,
            summary,
        })
    }
}

fn average(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        None
    } else {
        Some(round2(scores.iter().sum::<f64>() / scores.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CSV: &str = "\
City,Housing_Cost_per_sqft,Job_Market_Score,Cost_of_Living_Index,Amenities_Score,Lifestyle_Score
Pune,8000,80,60,70,75
Mumbai,20000,90,85,90,85
Nagpur,4000,50,40,n/a,60
";

    fn meter() -> MoveMeter {
        MoveMeter::new(CsvTable::from_reader(CSV.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn test_same_city_is_tie() {
        let cmp = meter().compare(Some("Pune"), Some("pune")).unwrap();
        let summary = cmp.summary.unwrap();
        assert_eq!(summary.winner, Winner::Tie);
        assert_eq!(summary.from_overall, summary.to_overall);
    }

    #[test]
    fn test_direction_and_scale() {
        let cmp = meter().compare(Some("Nagpur"), Some("Mumbai")).unwrap();
        let housing = &cmp.metrics[0];
        // cheapest housing scores 100, dearest scores 0
        assert_eq!(housing.from_score, Some(100.0));
        assert_eq!(housing.to_score, Some(0.0));
        assert_eq!(housing.from_value, json!(4000));

        let jobs = &cmp.metrics[1];
        assert_eq!(jobs.from_score, Some(0.0));
        assert_eq!(jobs.to_score, Some(100.0));
    }

    #[test]
    fn test_non_numeric_scores_null_and_is_skipped_in_average() {
        let cmp = meter().compare(Some("Nagpur"), Some("Pune")).unwrap();
        let amenities = &cmp.metrics[3];
        assert_eq!(amenities.from_score, None);
        assert_eq!(amenities.from_value, json!("n/a"));
        // Nagpur: housing 100, jobs 0, living 100, lifestyle 0 -> 50
        assert_eq!(cmp.summary.unwrap().from_overall, 50.0);
    }

    #[test]
    fn test_partial_scores() {
        let cmp = meter().compare(Some("Pune"), Some("Mumbai")).unwrap();
        // Pune housing: (20000 - 8000) / 16000
        assert_eq!(cmp.metrics[0].from_score, Some(75.0));
        // Pune (75 + 75 + 55.56 + 0 + 60) / 5 against Mumbai (0 + 100 + 0 + 100 + 100) / 5
        let summary = cmp.summary.unwrap();
        assert_eq!(summary.from_overall, 53.11);
        assert_eq!(summary.to_overall, 60.0);
        assert_eq!(summary.winner, Winner::To);
    }

    #[test]
    fn test_missing_and_unknown_cities() {
        let m = meter();
        assert!(matches!(m.compare(None, Some("Pune")), Err(Error::Validation(_))));
        assert!(matches!(m.compare(Some(" "), Some("Pune")), Err(Error::Validation(_))));
        assert!(matches!(m.compare(Some("Pune"), Some("")), Err(Error::Validation(_))));
        assert!(m.compare(Some(" Pune "), Some("Mumbai")).is_ok());
        assert!(matches!(m.compare(Some("Pune"), Some("Delhi")), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_constant_column_scores_null() {
        let csv = "City,Job_Market_Score\nA,5\nB,5\n";
        let m = MoveMeter::new(CsvTable::from_reader(csv.as_bytes()).unwrap()).unwrap();
        let cmp = m.compare(Some("A"), Some("B")).unwrap();
        assert_eq!(cmp.metrics[1].from_score, None);
        assert!(cmp.summary.is_none());
    }

    #[test]
    fn test_city_rows_are_returned_whole() {
        let cmp = meter().compare(Some("Pune"), Some("Mumbai")).unwrap();
        assert_eq!(cmp.from_city["City"], json!("Pune"));
        assert_eq!(cmp.to_city["Lifestyle_Score"], json!(85));
    }
}
