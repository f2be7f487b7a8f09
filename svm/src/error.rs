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

use thiserror::Error;
use text_processing::error::VectorizerError;
use crate::classifier::Label;

/// The dataset does not have the expected shape.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum DataFormatError {
    #[error("The dataset has no column named \"{column}\".")]
    MissingColumn {
        column: String
    },
    #[error("The label {value:?} in line {line} is neither 0 nor 1.")]
    InvalidLabel {
        line: u64,
        value: String
    },
}

/// An error from creating a svm classifier
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("\"{0}\" is not a known text encoding.")]
    UnknownEncoding(String),
    #[error("The dataset contains bytes that are not valid {encoding}.")]
    Decoding {
        encoding: &'static str
    },
    #[error("The delimiter {0:?} is not a single byte character.")]
    InvalidDelimiter(char),
    #[error(transparent)]
    CSV(#[from] csv::Error),
    #[error(transparent)]
    DataFormat(#[from] DataFormatError),
    #[error("The test size {0} is not within (0, 1).")]
    InvalidTestSize(f64),
    #[error("Splitting {documents} documents with a test size of {test_size} leaves one partition empty.")]
    Split {
        documents: usize,
        test_size: f64
    },
    #[error(transparent)]
    Vectorizer(#[from] VectorizerError),
    #[error("The training partition only contains documents labeled as \"{0}\".")]
    SingleClass(Label),
    #[error("The cost {0} is not a positive number.")]
    InvalidCost(f64),
    #[error("The tolerance {0} is not a positive number.")]
    InvalidTolerance(f64),
}

impl TrainingError {
    /// Returns the data format error, if this is one.
    pub fn as_data_format_error(&self) -> Option<&DataFormatError> {
        match self {
            TrainingError::DataFormat(err) => Some(err),
            _ => None
        }
    }
}

/// An error while classifying a text.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum PredictionError {
    #[error("No model was trained yet.")]
    NotTrained,
    #[error("The text is empty.")]
    EmptyInput,
}
