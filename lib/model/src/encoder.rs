//! Categorical encoders.
//!
//! Both encoders are fit-free: the vocabularies come from artifacts written
//! by the training job and never change at runtime.

use crate::error::{ModelError, ModelResult};
use crate::Transform;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// What to do with a category missing from the fitted vocabulary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    /// Encode the column as an all-zero block
    #[default]
    Ignore,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoderParams {
    /// Fitted vocabulary per input column, in output order
    pub categories: Vec<Vec<String>>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

/// One-hot encoder over a fixed number of categorical columns.
///
/// Matching is exact (case-sensitive), as fitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "OneHotEncoderParams", into = "OneHotEncoderParams")]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
    handle_unknown: HandleUnknown,
    lookup: Vec<AHashMap<String, usize>>,
    offsets: Vec<usize>,
    width: usize,
}

impl OneHotEncoder {
    pub fn new(categories: Vec<Vec<String>>, handle_unknown: HandleUnknown) -> Self {
        let lookup = categories
            .iter()
            .map(|column| {
                column
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (c.clone(), i))
                    .collect()
            })
            .collect();

        let mut offsets = Vec::with_capacity(categories.len());
        let mut width = 0;
        for column in &categories {
            offsets.push(width);
            width += column.len();
        }

        Self {
            categories,
            handle_unknown,
            lookup,
            offsets,
            width,
        }
    }

    pub fn n_columns(&self) -> usize {
        self.categories.len()
    }

    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }
}

impl From<OneHotEncoderParams> for OneHotEncoder {
    fn from(params: OneHotEncoderParams) -> Self {
        Self::new(params.categories, params.handle_unknown)
    }
}

impl From<OneHotEncoder> for OneHotEncoderParams {
    fn from(encoder: OneHotEncoder) -> Self {
        Self {
            categories: encoder.categories,
            handle_unknown: encoder.handle_unknown,
        }
    }
}

impl Transform for OneHotEncoder {
    type Input = [String];

    fn output_dim(&self) -> usize {
        self.width
    }

    fn transform(&self, row: &[String]) -> ModelResult<Vec<f64>> {
        if row.len() != self.n_columns() {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_columns(),
                actual: row.len(),
            });
        }

        let mut out = vec![0.0; self.width];
        for (column, value) in row.iter().enumerate() {
            match self.lookup[column].get(value.as_str()) {
                Some(&pos) => out[self.offsets[column] + pos] = 1.0,
                None if self.handle_unknown == HandleUnknown::Ignore => {}
                None => {
                    return Err(ModelError::UnknownCategory {
                        column,
                        value: value.clone(),
                    })
                }
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiLabelParams {
    pub classes: Vec<String>,
}

/// Multi-label binarizer for amenity sets. Unknown labels are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "MultiLabelParams", into = "MultiLabelParams")]
pub struct MultiLabelBinarizer {
    classes: Vec<String>,
    lookup: AHashMap<String, usize>,
}

impl MultiLabelBinarizer {
    pub fn new(classes: Vec<String>) -> Self {
        let lookup = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self { classes, lookup }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl From<MultiLabelParams> for MultiLabelBinarizer {
    fn from(params: MultiLabelParams) -> Self {
        Self::new(params.classes)
    }
}

impl From<MultiLabelBinarizer> for MultiLabelParams {
    fn from(binarizer: MultiLabelBinarizer) -> Self {
        Self {
            classes: binarizer.classes,
        }
    }
}

impl Transform for MultiLabelBinarizer {
    type Input = [String];

    fn output_dim(&self) -> usize {
        self.classes.len()
    }

    fn transform(&self, labels: &[String]) -> ModelResult<Vec<f64>> {
        let mut out = vec![0.0; self.classes.len()];
        for label in labels {
            if let Some(&pos) = self.lookup.get(label.as_str()) {
                out[pos] = 1.0;
            }
        }
        Ok(out)
    }
}
