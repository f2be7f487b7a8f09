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

use std::sync::{Arc, PoisonError, RwLock};
use camino::Utf8PathBuf;
use thiserror::Error;
use svm::classifier::{Label, TrainingSummary};
use svm::config::ClassifierConfig;
use svm::dataset::DatasetRow;
use svm::error::{PredictionError, TrainingError};
use svm::TrainedState;

/// Where the training data comes from.
#[derive(Debug, Clone)]
pub enum TrainingSource {
    /// A csv file
    Path(Utf8PathBuf),
    /// Already parsed rows
    Rows(Vec<DatasetRow>),
}

#[derive(Debug, Clone)]
pub enum Request {
    Train {
        source: TrainingSource
    },
    Predict {
        text: String
    },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Response {
    Trained(TrainingSummary),
    Prediction(Label),
}

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error(transparent)]
    Training(#[from] TrainingError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// Owns the trained model and answers requests.
///
/// Training replaces the model as a whole. A failed training keeps the previous model.
#[derive(Debug)]
pub struct Detector {
    config: ClassifierConfig,
    state: RwLock<Option<Arc<TrainedState>>>,
}

impl Detector {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            state: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// The current model, if any.
    pub fn state(&self) -> Option<Arc<TrainedState>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn train(&self, source: TrainingSource) -> Result<TrainingSummary, TrainingError> {
        let trained = match source {
            TrainingSource::Path(path) => svm::train_from_path(path, &self.config),
            TrainingSource::Rows(rows) => svm::train(rows, &self.config),
        };
        let trained = match trained {
            Ok(trained) => trained,
            Err(err) => {
                log::error!("The training failed, keeping the previous model: {err}");
                return Err(err);
            }
        };
        let summary = *trained.summary();
        let replaced = self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::new(trained));
        if replaced.is_some() {
            log::info!("Replaced the previous model.");
        }
        Ok(summary)
    }

    pub fn predict(&self, text: &str) -> Result<Label, PredictionError> {
        let state = self.state().ok_or(PredictionError::NotTrained)?;
        let label = svm::predict(&state, text)?;
        log::debug!("Classified a text with {} characters as {label:?}.", text.len());
        Ok(label)
    }

    pub fn handle(&self, request: Request) -> Result<Response, DetectorError> {
        match request {
            Request::Train { source } => Ok(Response::Trained(self.train(source)?)),
            Request::Predict { text } => Ok(Response::Prediction(self.predict(&text)?)),
        }
    }
}
