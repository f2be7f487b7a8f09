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

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Deref;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use crate::configs::DocumentFrequencyLimits;
use crate::corpus::CorpusStatisticsCollector;
use crate::error::VectorizerError;
use crate::tf_idf::{IdfAlgorithm, TfAlgorithm, TfIdf};
use crate::tokenizer::Tokenizer;


/// An entry in a sparse tf-idf-vector, the index of the term in the vocabulary and its weight.
#[derive(Debug, Copy, Clone, Deserialize, Serialize)]
pub struct TfIdfVectorEntry(pub usize, pub f64);

impl Eq for TfIdfVectorEntry {}

impl PartialEq for TfIdfVectorEntry {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && float_cmp::approx_eq!(f64, self.1, other.1)
    }
}

/// A sparse document vector, ordered by the index of the terms.
/// Terms with a weight of zero are not stored.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[repr(transparent)]
pub struct VectorizedDocument(Vec<TfIdfVectorEntry>);

impl VectorizedDocument {
    /// The euclidean norm of the vector.
    pub fn norm(&self) -> f64 {
        self.iter().map(|value| value.1 * value.1).sum::<f64>().sqrt()
    }

    /// Scales the vector to unit length. The zero vector stays unchanged.
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for value in &mut self.0 {
                value.1 /= norm;
            }
        }
    }

    /// The dot product with a dense vector. Indices outside of [dense] count as zero.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.iter()
            .filter_map(|TfIdfVectorEntry(idx, value)| dense.get(*idx).map(|weight| weight * value))
            .sum()
    }

    /// Writes the values into [row], a dense row of the vocabulary size.
    pub fn write_dense(&self, row: &mut [f64]) {
        for TfIdfVectorEntry(idx, value) in self.iter() {
            if let Some(target) = row.get_mut(*idx) {
                *target = *value;
            }
        }
    }
}

impl From<Vec<TfIdfVectorEntry>> for VectorizedDocument {
    fn from(mut value: Vec<TfIdfVectorEntry>) -> Self {
        value.sort_by_key(|value| value.0);
        Self(value)
    }
}

impl Deref for VectorizedDocument {
    type Target = [TfIdfVectorEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<TfIdfVectorEntry> for VectorizedDocument {
    fn from_iter<T: IntoIterator<Item=TfIdfVectorEntry>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Vectorizes documents over a frozen vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "W: Serialize + Hash + Eq + Clone, Tf: Serialize + Clone, Idf: Serialize + Clone",
    deserialize = "W: DeserializeOwned + Hash + Eq + Clone, Tf: DeserializeOwned, Idf: DeserializeOwned"
))]
#[serde(from = "DocumentVectorizerSer<W, Tf, Idf>", into = "DocumentVectorizerSer<W, Tf, Idf>")]
pub struct DocumentVectorizer<W, Tf, Idf> {
    vocabulary: Vec<(W, f64)>,
    index: HashMap<W, usize>,
    tf_idf: TfIdf<Tf, Idf>
}

/// The serialized form, the index is rebuilt on load.
#[derive(Serialize, Deserialize)]
#[serde(bound(
    serialize = "W: Serialize, Tf: Serialize, Idf: Serialize",
    deserialize = "W: DeserializeOwned, Tf: DeserializeOwned, Idf: DeserializeOwned"
))]
struct DocumentVectorizerSer<W, Tf, Idf> {
    vocabulary: Vec<(W, f64)>,
    tf_idf: TfIdf<Tf, Idf>
}

impl<W, Tf, Idf> From<DocumentVectorizerSer<W, Tf, Idf>> for DocumentVectorizer<W, Tf, Idf> where W: Hash + Eq + Clone {
    fn from(value: DocumentVectorizerSer<W, Tf, Idf>) -> Self {
        Self::from_vocabulary(value.vocabulary, value.tf_idf)
    }
}

impl<W, Tf, Idf> From<DocumentVectorizer<W, Tf, Idf>> for DocumentVectorizerSer<W, Tf, Idf> {
    fn from(value: DocumentVectorizer<W, Tf, Idf>) -> Self {
        Self {
            vocabulary: value.vocabulary,
            tf_idf: value.tf_idf
        }
    }
}

impl<W, Tf, Idf> DocumentVectorizer<W, Tf, Idf> {
    pub fn tf_idf(&self) -> &TfIdf<Tf, Idf> {
        &self.tf_idf
    }

    /// The number of terms in the vocabulary.
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    /// The terms of the vocabulary, by index.
    pub fn vocabulary(&self) -> impl Iterator<Item=&W> {
        self.vocabulary.iter().map(|(word, _)| word)
    }
}

impl<W, Tf, Idf> DocumentVectorizer<W, Tf, Idf> where W: Hash + Eq + Clone {
    /// Creates a vectorizer from an ordered vocabulary with the idf of each term.
    pub fn from_vocabulary(mut vocabulary: Vec<(W, f64)>, tf_idf: TfIdf<Tf, Idf>) -> Self {
        vocabulary.shrink_to_fit();
        let index = vocabulary
            .iter()
            .enumerate()
            .map(|(idx, (word, _))| (word.clone(), idx))
            .collect();
        Self {
            vocabulary,
            index,
            tf_idf
        }
    }
}

impl<W, Tf, Idf> DocumentVectorizer<W, Tf, Idf> where W: Hash + Eq {
    pub fn index_of<Q>(&self, word: &Q) -> Option<usize> where W: Borrow<Q>, Q: Hash + Eq + ?Sized {
        self.index.get(word).copied()
    }

    /// Vectorizes [doc] with [tf]. Words outside of the vocabulary are ignored.
    pub fn vectorize_document_with<TfAlt: TfAlgorithm, D: IntoIterator<Item=W>>(&self, tf: &TfAlt, doc: D, normalize: bool) -> VectorizedDocument {
        let mut result: VectorizedDocument = tf
            .calculate_tf(doc)
            .into_iter()
            .filter_map(|(word, tf)| {
                let idx = *self.index.get(&word)?;
                let value = tf * self.vocabulary[idx].1;
                (value != 0.0).then_some(TfIdfVectorEntry(idx, value))
            })
            .collect();
        if normalize {
            result.l2_normalize();
        }
        result
    }
}

impl<W, Tf, Idf> DocumentVectorizer<W, Tf, Idf> where W: Hash + Eq, Tf: TfAlgorithm {
    #[inline]
    pub fn vectorize_document<D: IntoIterator<Item=W>>(&self, doc: D, normalize: bool) -> VectorizedDocument {
        self.vectorize_document_with(&self.tf_idf.tf, doc, normalize)
    }
}

/// Fits a vectorizer on the documents in [train_data].
pub fn create_vectorizer<I, T, Tf, Idf>(
    train_data: I,
    tokenizer: &Tokenizer,
    tf_idf: TfIdf<Tf, Idf>,
    limits: &DocumentFrequencyLimits
) -> Result<DocumentVectorizer<String, Tf, Idf>, VectorizerError>
where
    I: IntoIterator<Item=T>,
    T: AsRef<str>,
    Idf: IdfAlgorithm,
    VectorizerError: From<Idf::Error>
{
    tokenizer.ngram_range().validate()?;
    let mut corpus_statistics = CorpusStatisticsCollector::default();
    for document in train_data {
        corpus_statistics.add(tokenizer.tokenize(document.as_ref()));
    }
    corpus_statistics.provide_vectorizer(tf_idf, limits)
}
