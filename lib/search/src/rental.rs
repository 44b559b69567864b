//! Rental recommender: plain k-NN over the rental dataset.

use crate::neighbor::STAGE_KNN;
use crate::projector::extra_value;
use estatex_core::query::{parse_amenities, value_text};
use estatex_core::{coerce_f64, CsvTable, Error, Result, Vector};
use estatex_model::{ModelResult, NeighborIndex, RentalPipeline, Transform};
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const RENTAL_TOP_N: usize = 10;

const CATEGORICAL_KEYS: [&str; 3] = ["City", "Location", "Property Type"];
const NUMERIC_KEYS: [&str; 3] = ["Bedrooms", "Area (sqft)", "Price (INR)"];

#[derive(Debug, Clone)]
pub struct RentalRecommender {
    table: CsvTable,
    pipeline: RentalPipeline,
}

impl RentalRecommender {
    pub fn new(table: CsvTable, pipeline: RentalPipeline) -> Self {
        if table.rows.len() != pipeline.index.len() {
            warn!(
                rows = table.rows.len(),
                index = pipeline.index.len(),
                "Rental dataset and k-NN index sizes differ"
            );
        }
        Self { table, pipeline }
    }

    pub fn len(&self) -> usize {
        self.table.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.rows.is_empty()
    }

    /// `[one-hot(City, Location, Property Type), amenities, scaled(Bedrooms, Area, Price)]`
    fn encode(&self, categorical: &[String], amenities: &[String], numeric: &[f64]) -> ModelResult<Vector> {
        let cat = self.pipeline.encoder.transform(categorical)?;
        let amen = self.pipeline.amenities.transform(amenities)?;
        let num = self.pipeline.scaler.transform(numeric)?;
        Ok(Vector::concat(&[&cat, &amen, &num]))
    }

    /// Up to ten nearest rentals, each with a `similarity_score` in `(0, 1]`.
    pub fn recommend(&self, raw: &Value) -> Result<Vec<Value>> {
        let categorical: Vec<String> = CATEGORICAL_KEYS
            .iter()
            .map(|key| raw.get(*key).map(value_text).unwrap_or_default())
            .collect();

        let mut numeric = Vec::with_capacity(NUMERIC_KEYS.len());
        for key in NUMERIC_KEYS {
            let value = match raw.get(key) {
                None | Some(Value::Null) => 0.0,
                Some(v) => coerce_f64(v)
                    .ok_or_else(|| Error::validation(format!("Invalid numeric value for {}", key)))?,
            };
            numeric.push(value);
        }

        let amenities = parse_amenities(raw.get("amenities"));

        let features = self
            .encode(&categorical, &amenities, &numeric)
            .map_err(|e| Error::inference(STAGE_KNN, e))?;
        let k = RENTAL_TOP_N.min(self.table.rows.len());
        let neighbors = self
            .pipeline
            .index
            .kneighbors(features.as_slice(), k)
            .map_err(|e| Error::inference(STAGE_KNN, e))?;

        let results: Vec<Value> = neighbors
            .iter()
            .filter_map(|n| {
                let row = self.table.rows.get(n.index)?;
                let mut out: Map<String, Value> = self
                    .table
                    .headers
                    .iter()
                    .zip(row)
                    .map(|(h, v)| (h.clone(), extra_value(v)))
                    .collect();
                out.insert("similarity_score".into(), Value::from(1.0 / (1.0 + n.distance)));
                Some(Value::Object(out))
            })
            .collect();

        debug!(results = results.len(), "Rental recommendation");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estatex_model::{HandleUnknown, KnnIndex, MultiLabelBinarizer, OneHotEncoder, StandardScaler};
    use serde_json::json;

    const CSV: &str = "\
City,Location,Property Type,Bedrooms,Area (sqft),Price (INR),Amenities
Pune,Baner,Apartment,2,900,25000,Gym
Pune,Wakad,Apartment,1,600,15000,
Mumbai,Bandra,Villa,4,2500,250000,\"Pool,Gym\"
";

    fn recommender() -> RentalRecommender {
        let encoder = OneHotEncoder::new(
            vec![vec!["Mumbai".into(), "Pune".into()], vec![], vec![]],
            HandleUnknown::Ignore,
        );
        let amenities = MultiLabelBinarizer::new(vec!["Gym".into(), "Pool".into()]);
        let scaler = StandardScaler::new(vec![0.0; 3], vec![1.0, 1000.0, 100_000.0]).unwrap();
        // [Mumbai, Pune, Gym, Pool, bedrooms, area, price]
        let index = KnnIndex::new(vec![
            vec![0.0, 1.0, 1.0, 0.0, 2.0, 0.9, 0.25],
            vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.6, 0.15],
            vec![1.0, 0.0, 1.0, 1.0, 4.0, 2.5, 2.5],
        ])
        .unwrap();
        let pipeline = RentalPipeline {
            encoder,
            amenities,
            scaler,
            index,
        };
        RentalRecommender::new(CsvTable::from_reader(CSV.as_bytes()).unwrap(), pipeline)
    }

    #[test]
    fn test_nearest_first_with_similarity() {
        let out = recommender()
            .recommend(&json!({
                "City": "Pune",
                "Bedrooms": 2,
                "Area (sqft)": "900",
                "Price (INR)": 25000,
                "amenities": "Gym"
            }))
            .unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0]["Location"], json!("Baner"));
        assert_eq!(out[0]["similarity_score"], json!(1.0));
        assert_eq!(out[0]["Bedrooms"], json!(2));
        assert_eq!(out[1]["Amenities"], Value::Null);
        let s1 = out[1]["similarity_score"].as_f64().unwrap();
        assert!(s1 > 0.0 && s1 < 1.0);
    }

    #[test]
    fn test_missing_numeric_defaults_to_zero() {
        let out = recommender().recommend(&json!({ "City": "Pune" })).unwrap();
        assert_eq!(out[0]["Location"], json!("Wakad"));
    }

    #[test]
    fn test_non_numeric_is_validation_error() {
        let err = recommender()
            .recommend(&json!({ "Bedrooms": "many" }))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
