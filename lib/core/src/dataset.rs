//! CSV-backed tables loaded once at startup.

use crate::filter::RowFilter;
use crate::{Error, PropertyRecord, Result};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const COL_CITY: &str = "city";
const COL_LOCATION: &str = "location";
const COL_PROPERTY_TYPE: &str = "property_type";
const COL_BEDROOMS: &str = "bedrooms";
const COL_AREA: &str = "area_sqft";
const COL_PRICE: &str = "price";
const COL_AMENITIES: &str = "amenities";
const COL_IMAGE: &str = "image";

const REQUIRED_COLUMNS: &[&str] = &[
    COL_CITY,
    COL_LOCATION,
    COL_PROPERTY_TYPE,
    COL_BEDROOMS,
    COL_AREA,
    COL_PRICE,
];

/// A raw CSV table: header row plus string cells.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Rows keyed by header name.
    pub fn row_maps(&self) -> Vec<BTreeMap<String, String>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

/// Immutable reference dataset of property rows.
#[derive(Debug, Clone, Default)]
pub struct PropertyDataset {
    records: Vec<PropertyRecord>,
}

impl PropertyDataset {
    pub fn new(records: Vec<PropertyRecord>) -> Self {
        Self { records }
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = CsvTable::from_path(path)?;
        Self::from_table(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_table(CsvTable::from_reader(reader)?)
    }

    pub fn from_table(table: CsvTable) -> Result<Self> {
        for column in REQUIRED_COLUMNS {
            if table.column_index(column).is_none() {
                return Err(Error::Artifact(format!(
                    "dataset is missing column '{}'",
                    column
                )));
            }
        }

        let records: Vec<PropertyRecord> = table
            .row_maps()
            .into_iter()
            .map(record_from_row)
            .collect();
        debug!(rows = records.len(), "Loaded property dataset");
        Ok(Self { records })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&PropertyRecord> {
        self.records.get(idx)
    }

    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    /// Row indices matching `filter`, in dataset order.
    pub fn filter_indices(&self, filter: &dyn RowFilter) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| filter.matches(record))
            .map(|(idx, _)| idx)
            .collect()
    }
}

fn record_from_row(mut row: BTreeMap<String, String>) -> PropertyRecord {
    let mut take = |key: &str| row.remove(key).unwrap_or_default();
    let city = take(COL_CITY);
    let location = take(COL_LOCATION);
    let property_type = take(COL_PROPERTY_TYPE);
    let bedrooms = take(COL_BEDROOMS);
    let area_sqft = take(COL_AREA);
    let price = take(COL_PRICE);
    let amenities = take(COL_AMENITIES);
    let image = row.remove(COL_IMAGE);

    PropertyRecord {
        city,
        location,
        property_type,
        bedrooms,
        area_sqft,
        price,
        amenities,
        image,
        extra: row,
    }
}
