//Copyright 2024 Felix Engl
//
//Licensed under the Apache License, Version 2.0 (the "License");
//you may not use this file except in compliance with the License.
//You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
//Unless required by applicable law or agreed to in writing, software
//distributed under the License is distributed on an "AS IS" BASIS,
//WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//See the License for the specific language governing permissions and
//limitations under the License.

use serde::{Deserialize, Serialize};
use text_processing::configs::VectorizerConfig;
use crate::error::TrainingError;

/// Where the columns of the dataset are and how the file is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "_default_text_column")]
    pub text_column: String,
    /// The column with the labels, 1 for cyberbullying and 0 otherwise
    #[serde(default = "_default_label_column")]
    pub label_column: String,
    /// The label of the encoding, see https://encoding.spec.whatwg.org/#names-and-labels
    #[serde(default = "_default_encoding")]
    pub encoding: String,
    #[serde(default = "_default_delimiter")]
    pub delimiter: char,
}

fn _default_text_column() -> String {
    "Text".to_string()
}
fn _default_label_column() -> String {
    "CB_Label".to_string()
}
fn _default_encoding() -> String {
    "windows-1252".to_string()
}
const fn _default_delimiter() -> char {
    ','
}

impl DatasetConfig {
    pub fn encoding(&self) -> Result<&'static encoding_rs::Encoding, TrainingError> {
        encoding_rs::Encoding::for_label(self.encoding.trim().as_bytes())
            .ok_or_else(|| TrainingError::UnknownEncoding(self.encoding.clone()))
    }

    pub fn delimiter(&self) -> Result<u8, TrainingError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(TrainingError::InvalidDelimiter(self.delimiter))
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            text_column: _default_text_column(),
            label_column: _default_label_column(),
            encoding: _default_encoding(),
            delimiter: _default_delimiter(),
        }
    }
}

/// The split into training and held-out data
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// The share of documents held out from training
    #[serde(default = "_default_test_size")]
    pub test_size: f64,
    /// The seed of the shuffle
    #[serde(default = "_default_seed")]
    pub seed: u64,
}

const fn _default_test_size() -> f64 {
    0.2
}
const fn _default_seed() -> u64 {
    42
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: _default_test_size(),
            seed: _default_seed(),
        }
    }
}

/// How the misclassification cost is weighted per class.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Every class has the weight 1
    Uniform,
    /// The weight is inverse to the frequency of the class: n_samples / (2 * n_class)
    #[default]
    Balanced,
}

impl ClassWeight {
    /// The weights for the (positive, negative) class.
    pub fn weights(&self, positive: usize, negative: usize) -> (f64, f64) {
        match self {
            ClassWeight::Uniform => (1.0, 1.0),
            ClassWeight::Balanced => {
                let total = (positive + negative) as f64;
                (
                    total / (2.0 * positive.max(1) as f64),
                    total / (2.0 * negative.max(1) as f64)
                )
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmParameterConfig {
    /// The regularisation cost C
    #[serde(default = "_default_cost")]
    pub cost: f64,
    /// The tolerance of the stopping criterion
    #[serde(default = "_default_eps")]
    pub eps: f64,
    #[serde(default)]
    pub class_weight: ClassWeight,
}

const fn _default_cost() -> f64 {
    1.0
}
const fn _default_eps() -> f64 {
    1e-3
}

impl Default for SvmParameterConfig {
    fn default() -> Self {
        Self {
            cost: _default_cost(),
            eps: _default_eps(),
            class_weight: ClassWeight::default(),
        }
    }
}

/// Everything needed to train a [crate::classifier::DocumentClassifier]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub vectorizer: VectorizerConfig,
    #[serde(default)]
    pub svm: SvmParameterConfig,
}
