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
use crate::configs::DocumentFrequency;
use crate::tf_idf::IdfError;
use crate::tokenizer::NgramRange;

/// An error while fitting a vectorizer
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VectorizerError {
    #[error(transparent)]
    Idf(#[from] IdfError),
    #[error("The n-gram range {0} is invalid, it has to satisfy 1 <= min <= max.")]
    InvalidNgramRange(NgramRange),
    #[error("The document frequency limit {0:?} is invalid.")]
    InvalidDocumentFrequency(DocumentFrequency),
    #[error("max_df ({max_df} documents) corresponds to fewer documents than min_df ({min_df} documents).")]
    MaxDfBelowMinDf {
        max_df: f64,
        min_df: f64,
    },
    #[error("Empty vocabulary, the documents do not contain any words.")]
    EmptyVocabulary,
    #[error("After pruning no terms remain. Try a lower min_df or a higher max_df.")]
    NoTermsAfterPruning,
}
