//! Everything a request handler reads, loaded once at startup.

use crate::engine::SearchEngine;
use crate::move_meter::MoveMeter;
use crate::rental::RentalRecommender;
use crate::showcase::{random_properties, SHOWCASE_SIZE};
use crate::valuation::Valuator;
use crate::{NeighborRetriever, PriceEstimator};
use estatex_core::{CsvTable, Error, PropertyDataset, Result};
use estatex_model::ModelBundle;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Residential dataset the search runs over
    pub data_file: PathBuf,
    pub model_dir: PathBuf,
    pub rental_data_file: Option<PathBuf>,
    pub city_data_file: Option<PathBuf>,
}

/// Immutable application state shared by every worker.
#[derive(Debug, Clone)]
pub struct AppContext {
    search: SearchEngine,
    valuation: Valuator,
    rental: Option<RentalRecommender>,
    move_meter: Option<MoveMeter>,
}

impl AppContext {
    pub fn new(dataset: PropertyDataset, models: ModelBundle) -> Self {
        let search = SearchEngine::new(
            Arc::new(dataset),
            PriceEstimator::new(models.regression),
            NeighborRetriever::new(models.neighbors),
        );
        Self {
            search,
            valuation: Valuator::new(models.valuation),
            rental: None,
            move_meter: None,
        }
    }

    pub fn with_rental(mut self, rental: RentalRecommender) -> Self {
        self.rental = Some(rental);
        self
    }

    pub fn with_move_meter(mut self, move_meter: MoveMeter) -> Self {
        self.move_meter = Some(move_meter);
        self
    }

    /// Load the dataset and every artifact. Missing core artifacts are fatal.
    pub fn load(config: &ContextConfig) -> Result<Self> {
        let dataset = PropertyDataset::from_csv_path(&config.data_file)?;
        let mut models = ModelBundle::load(&config.model_dir)?;
        let rental_pipeline = models.rental.take();

        info!(
            rows = dataset.len(),
            path = %config.data_file.display(),
            "Property dataset loaded"
        );

        let mut context = Self::new(dataset, models);

        match (rental_pipeline, &config.rental_data_file) {
            (Some(pipeline), Some(path)) => {
                let table = CsvTable::from_path(path)?;
                info!(rows = table.rows.len(), "Rental dataset loaded");
                context = context.with_rental(RentalRecommender::new(table, pipeline));
            }
            (Some(_), None) => warn!("Rental artifacts present but no rental dataset configured"),
            (None, Some(path)) => warn!(path = %path.display(), "Rental dataset configured but no rental artifacts found"),
            (None, None) => {}
        }

        if let Some(path) = &config.city_data_file {
            let move_meter = MoveMeter::from_path(path)?;
            info!(cities = move_meter.len(), "City metrics loaded");
            context = context.with_move_meter(move_meter);
        }

        Ok(context)
    }

    pub fn search(&self) -> &SearchEngine {
        &self.search
    }

    pub fn dataset(&self) -> &PropertyDataset {
        self.search.dataset()
    }

    pub fn valuation(&self) -> &Valuator {
        &self.valuation
    }

    pub fn rental(&self) -> Result<&RentalRecommender> {
        self.rental
            .as_ref()
            .ok_or_else(|| Error::Artifact("rental recommender is not loaded".to_string()))
    }

    pub fn move_meter(&self) -> Result<&MoveMeter> {
        self.move_meter
            .as_ref()
            .ok_or_else(|| Error::Artifact("city metrics are not loaded".to_string()))
    }

    pub fn random_properties(&self) -> Vec<Value> {
        random_properties(self.dataset(), &mut rand::rng(), SHOWCASE_SIZE)
    }
}
