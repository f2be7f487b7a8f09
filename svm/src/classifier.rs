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

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use text_processing::tf_idf::{IdfAlgorithm, TfAlgorithm};
use text_processing::tokenizer::Tokenizer;
use text_processing::vectorizer::DocumentVectorizer;
use crate::config::SvmParameterConfig;
use crate::error::{PredictionError, TrainingError};
use crate::solver::{solve, LinearSvcParameters};

/// The verdict for a text.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Label {
    Bullying,
    NotBullying,
}

impl Label {
    pub fn is_bullying(&self) -> bool {
        matches!(self, Label::Bullying)
    }

    /// The label as written in the dataset.
    pub fn as_numeric(&self) -> u8 {
        match self {
            Label::Bullying => 1,
            Label::NotBullying => 0,
        }
    }
}

impl From<bool> for Label {
    fn from(value: bool) -> Self {
        if value { Label::Bullying } else { Label::NotBullying }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Bullying => write!(f, "Cyberbullying Detected!"),
            Label::NotBullying => write!(f, "No Cyberbullying Detected."),
        }
    }
}

/// What a finished training run looked like.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub training_documents: usize,
    pub held_out_documents: usize,
    pub bullying_documents: usize,
    pub vocabulary_size: usize,
}

impl Display for TrainingSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "trained on {} documents ({} bullying), {} held out, {} terms in the vocabulary",
            self.training_documents,
            self.bullying_documents,
            self.held_out_documents,
            self.vocabulary_size
        )
    }
}

/// A struct implementing this is used as train data.
pub trait TrainDataEntry {
    /// True if the entry is cyberbullying
    fn get_label(&self) -> bool;

    /// The text of the entry
    fn get_text(&self) -> &str;
}

impl<Text> TrainDataEntry for (Text, bool) where Text: AsRef<str> {
    fn get_label(&self) -> bool {
        self.1
    }

    fn get_text(&self) -> &str {
        self.0.as_ref()
    }
}

impl<T> TrainDataEntry for &T where T: TrainDataEntry {
    fn get_label(&self) -> bool {
        (*self).get_label()
    }

    fn get_text(&self) -> &str {
        (*self).get_text()
    }
}

/// Counts the (bullying, not bullying) labels, fails if one of them is missing.
pub fn count_classes(labels: impl IntoIterator<Item=bool>) -> Result<(usize, usize), TrainingError> {
    let (bullying, not_bullying) = labels.into_iter().fold((0, 0), |(bullying, not_bullying), label| {
        if label { (bullying + 1, not_bullying) } else { (bullying, not_bullying + 1) }
    });
    match (bullying, not_bullying) {
        (0, _) => Err(TrainingError::SingleClass(Label::NotBullying)),
        (_, 0) => Err(TrainingError::SingleClass(Label::Bullying)),
        counts => Ok(counts)
    }
}

/// A trained linear svm together with the vectorizer it was trained with.
///
/// The decision function is `w·x - rho`, a text is bullying if it is not negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "TF: Serialize + Clone, IDF: Serialize + Clone",
    deserialize = "TF: DeserializeOwned, IDF: DeserializeOwned"
))]
pub struct DocumentClassifier<TF, IDF> {
    vectorizer: DocumentVectorizer<String, TF, IDF>,
    tokenizer: Tokenizer,
    weights: Vec<f64>,
    rho: f64,
    summary: TrainingSummary,
}

impl<TF, IDF> DocumentClassifier<TF, IDF> {
    pub fn new(
        vectorizer: DocumentVectorizer<String, TF, IDF>,
        tokenizer: Tokenizer,
        weights: Vec<f64>,
        rho: f64,
        summary: TrainingSummary
    ) -> Self {
        Self { vectorizer, tokenizer, weights, rho, summary }
    }

    pub fn vectorizer(&self) -> &DocumentVectorizer<String, TF, IDF> {
        &self.vectorizer
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// The weight of every term in the vocabulary.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn rho(&self) -> f64 {
        self.rho
    }

    pub fn summary(&self) -> &TrainingSummary {
        &self.summary
    }

    pub fn tokenize(&self, doc: &str) -> Vec<String> {
        self.tokenizer.tokenize(doc)
    }
}

impl<TF, IDF> DocumentClassifier<TF, IDF>
where
    TF: TfAlgorithm,
    IDF: IdfAlgorithm
{
    /// Trains the svm on [data], the vectorizer has to be fitted on the same data.
    pub fn train<I: IntoIterator<Item=T>, T: TrainDataEntry>(
        vectorizer: DocumentVectorizer<String, TF, IDF>,
        tokenizer: Tokenizer,
        data: I,
        parameters: &SvmParameterConfig,
        held_out_documents: usize,
    ) -> Result<DocumentClassifier<TF, IDF>, TrainingError> {
        let mut labels = Vec::new();
        let mut features = Vec::new();

        for value in data {
            labels.push(value.get_label());
            features.push(
                vectorizer.vectorize_document(tokenizer.tokenize(value.get_text()), true)
            );
        }

        let (bullying_documents, not_bullying_documents) = count_classes(labels.iter().copied())?;

        log::info!(
            "Train SVM with {} elements ({} bullying) and {} features.",
            labels.len(),
            bullying_documents,
            vectorizer.dimension()
        );

        let (positive_weight, negative_weight) = parameters.class_weight.weights(bullying_documents, not_bullying_documents);
        let svc = solve(
            &features,
            &labels,
            vectorizer.dimension(),
            &LinearSvcParameters {
                positive_cost: parameters.cost * positive_weight,
                negative_cost: parameters.cost * negative_weight,
                eps: parameters.eps,
            }
        )?;
        log::debug!(
            "The decision boundary has a bias of {} and {} support vectors.",
            svc.rho,
            svc.support_vectors
        );

        let summary = TrainingSummary {
            training_documents: features.len(),
            held_out_documents,
            bullying_documents,
            vocabulary_size: vectorizer.dimension(),
        };

        Ok(DocumentClassifier::new(vectorizer, tokenizer, svc.weights, svc.rho, summary))
    }
}

impl<TF, IDF> DocumentClassifier<TF, IDF> where TF: TfAlgorithm {
    /// The signed distance of [doc] to the decision boundary, scaled by |w|.
    pub fn decision_score(&self, doc: &str) -> Result<f64, PredictionError> {
        if doc.trim().is_empty() {
            return Err(PredictionError::EmptyInput);
        }
        let vector = self.vectorizer.vectorize_document(self.tokenizer.tokenize(doc), true);
        Ok(vector.dot(&self.weights) - self.rho)
    }

    pub fn predict(&self, doc: &str) -> Result<Label, PredictionError> {
        Ok(Label::from(self.decision_score(doc)? >= 0.0))
    }
}
