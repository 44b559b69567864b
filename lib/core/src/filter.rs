// Row predicates over the property dataset
use crate::record::normalize_key;
use crate::PropertyRecord;

/// Lower bound of the budget window, as a fraction of the budget.
pub const BUDGET_FLOOR_RATIO: f64 = 0.90;
/// Upper bound of the budget window, as a fraction of the budget.
pub const BUDGET_CEILING_RATIO: f64 = 1.02;

pub trait RowFilter {
    fn matches(&self, record: &PropertyRecord) -> bool;
}

/// Inclusive price window around a budget: `[budget×0.90, budget×1.02]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetWindow {
    pub min: f64,
    pub max: f64,
}

impl BudgetWindow {
    pub fn around(budget: f64) -> Self {
        Self {
            min: budget * BUDGET_FLOOR_RATIO,
            max: budget * BUDGET_CEILING_RATIO,
        }
    }

    #[inline]
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Text conditions hold already-normalized keys (see [`normalize_key`]).
#[derive(Debug, Clone)]
pub enum RowCondition {
    CityIs(String),
    LocationIs(String),
    PropertyTypeIs(String),
    BedroomsEq(f64),
    /// Parsed price must exist and fall inside the window
    PriceWithin(BudgetWindow),
    And(Vec<RowCondition>),
}

impl RowCondition {
    pub fn city(value: &str) -> Self {
        RowCondition::CityIs(normalize_key(value))
    }

    pub fn location(value: &str) -> Self {
        RowCondition::LocationIs(normalize_key(value))
    }

    pub fn property_type(value: &str) -> Self {
        RowCondition::PropertyTypeIs(normalize_key(value))
    }
}

pub struct RecordFilter {
    condition: RowCondition,
}

impl RecordFilter {
    pub fn new(condition: RowCondition) -> Self {
        Self { condition }
    }

    fn key_equals(field: &str, key: &str) -> bool {
        normalize_key(field) == key
    }

    fn matches_condition(condition: &RowCondition, record: &PropertyRecord) -> bool {
        match condition {
            RowCondition::CityIs(key) => Self::key_equals(&record.city, key),
            RowCondition::LocationIs(key) => Self::key_equals(&record.location, key),
            RowCondition::PropertyTypeIs(key) => Self::key_equals(&record.property_type, key),
            RowCondition::BedroomsEq(value) => record
                .bedrooms_value()
                .map(|b| b == *value)
                .unwrap_or(false),
            RowCondition::PriceWithin(window) => record
                .price_value()
                .map(|p| window.contains(p))
                .unwrap_or(false),
            RowCondition::And(conditions) => conditions
                .iter()
                .all(|c| Self::matches_condition(c, record)),
        }
    }
}

impl RowFilter for RecordFilter {
    fn matches(&self, record: &PropertyRecord) -> bool {
        Self::matches_condition(&self.condition, record)
    }
}
