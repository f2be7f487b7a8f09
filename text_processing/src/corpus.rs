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

use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::hash::Hash;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use crate::configs::DocumentFrequencyLimits;
use crate::error::VectorizerError;
use crate::tf_idf::{IdfAlgorithm, TfIdf};
use crate::vectorizer::DocumentVectorizer;

/// The statistics over the documents in a corpus
pub trait CorpusDocumentStatistics {
    /// A word in a corpus
    type Word;
    /// The number of documents in the corpus
    fn document_count(&self) -> u64;
    /// The number of words in the corpus
    #[allow(dead_code)] fn word_count(&self) -> u64;
    /// The number of unique words in the corpus
    fn unique_word_count(&self) -> usize;
    /// The number of documents containing [word]
    fn document_frequency(&self, word: &Self::Word) -> Option<u64>;

    /// Returns an iterator over the words and their document frequencies
    fn iter(&self) -> impl Iterator<Item=(&Self::Word, &u64)>;
}

/// Collects the document frequencies in a corpus
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(bound(serialize = "W: Serialize + Hash + Eq", deserialize = "W: DeserializeOwned + Hash + Eq"))]
pub struct CorpusStatisticsCollector<W> {
    document_count: u64,
    word_count: u64,
    document_frequencies: HashMap<W, u64>
}

impl<W> CorpusStatisticsCollector<W> where W: Hash + Eq {
    pub fn add<D: IntoIterator<Item=W>>(&mut self, doc: D) {
        self.document_count = self.document_count.saturating_add(1);
        let mut seen = HashSet::new();
        for value in doc {
            self.word_count = self.word_count.saturating_add(1);
            seen.insert(value);
        }
        for value in seen {
            self.document_frequencies
                .entry(value)
                .and_modify(|value| *value = value.saturating_add(1))
                .or_insert(1);
        }
    }
}

impl<W> CorpusStatisticsCollector<W> where W: Hash + Eq + Ord + Clone {
    /// Creates a vectorizer over all words within [limits].
    /// The vocabulary is ordered lexicographically.
    pub fn provide_vectorizer<Tf, Idf: IdfAlgorithm>(
        &self,
        tf_idf: TfIdf<Tf, Idf>,
        limits: &DocumentFrequencyLimits
    ) -> Result<DocumentVectorizer<W, Tf, Idf>, VectorizerError> where VectorizerError: From<Idf::Error> {
        if self.document_frequencies.is_empty() {
            return Err(VectorizerError::EmptyVocabulary);
        }
        let (min_df, max_df) = limits.resolve(self.document_count)?;
        let vocabulary = self.document_frequencies
            .iter()
            .filter(|(_, frequency)| {
                let frequency = **frequency as f64;
                min_df <= frequency && frequency <= max_df
            })
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(word, frequency)| {
                tf_idf.idf
                    .calculate_idf_with_document_frequency(self, *frequency)
                    .map(|idf| (word.clone(), idf))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if vocabulary.is_empty() {
            return Err(VectorizerError::NoTermsAfterPruning);
        }

        log::debug!(
            "Pruned the vocabulary from {} to {} terms.",
            self.document_frequencies.len(),
            vocabulary.len()
        );

        Ok(DocumentVectorizer::from_vocabulary(vocabulary, tf_idf))
    }
}

impl<W> Display for CorpusStatisticsCollector<W> where W: Hash + Eq + ToString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Document Count: {}\n", self.document_count)?;
        write!(f, "Word Count: {}\n", self.word_count)?;
        write!(f, "Unique Word Count: {}\n", self.unique_word_count())?;
        write!(f, "Words:")?;
        for (word, count) in &self.document_frequencies {
            write!(f, "\n  {}: {count}", word.to_string())?;
        }
        Ok(())
    }
}

impl<W> CorpusDocumentStatistics for CorpusStatisticsCollector<W> where W: Hash + Eq {
    type Word = W;

    #[inline]
    fn document_count(&self) -> u64 {
        self.document_count
    }

    #[inline]
    fn word_count(&self) -> u64 {
        self.word_count
    }

    #[inline]
    fn unique_word_count(&self) -> usize {
        self.document_frequencies.len()
    }

    fn document_frequency(&self, word: &W) -> Option<u64> {
        self.document_frequencies.get(word).copied()
    }

    fn iter(&self) -> impl Iterator<Item=(&Self::Word, &u64)> {
        self.document_frequencies.iter()
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;
    use crate::configs::{DocumentFrequency, DocumentFrequencyLimits};
    use crate::corpus::{CorpusDocumentStatistics, CorpusStatisticsCollector};
    use crate::error::VectorizerError;
    use crate::tf_idf::defaults::RAW_INVERSE_SMOOTH;

    #[test]
    fn counts_documents_not_occurrences() {
        let mut statistics = CorpusStatisticsCollector::default();
        statistics.add(vec!["nice", "nice", "work"]);
        statistics.add(vec!["nice", "day"]);
        assert_eq!(2, statistics.document_count());
        assert_eq!(5, statistics.word_count());
        assert_eq!(3, statistics.unique_word_count());
        assert_eq!(Some(2), statistics.document_frequency(&"nice"));
        assert_eq!(Some(1), statistics.document_frequency(&"work"));
        assert_eq!(None, statistics.document_frequency(&"idiot"));
    }

    #[test]
    fn prunes_rare_and_common_terms() {
        let mut statistics = CorpusStatisticsCollector::default();
        for i in 0..10 {
            let mut doc = vec!["everywhere".to_string()];
            if i < 6 {
                doc.push("often".to_string());
            }
            if i < 2 {
                doc.push("rare".to_string());
            }
            statistics.add(doc);
        }
        let limits = DocumentFrequencyLimits {
            max_df: DocumentFrequency::Relative(0.9),
            min_df: DocumentFrequency::Absolute(3),
        };
        let vectorizer = statistics.provide_vectorizer(RAW_INVERSE_SMOOTH, &limits).unwrap();
        assert_eq!(vec!["often"], vectorizer.vocabulary().collect_vec());
    }

    #[test]
    fn vocabulary_is_sorted() {
        let mut statistics = CorpusStatisticsCollector::default();
        statistics.add(vec!["zeta", "alpha", "mid"]);
        let vectorizer = statistics.provide_vectorizer(RAW_INVERSE_SMOOTH, &DocumentFrequencyLimits::NONE).unwrap();
        assert_eq!(vec!["alpha", "mid", "zeta"], vectorizer.vocabulary().copied().collect_vec());
        assert_eq!(Some(1), vectorizer.index_of(&"mid"));
    }

    #[test]
    fn empty_corpus_has_no_vocabulary() {
        let mut statistics = CorpusStatisticsCollector::<String>::default();
        statistics.add(Vec::new());
        let err = statistics.provide_vectorizer(RAW_INVERSE_SMOOTH, &DocumentFrequencyLimits::NONE).unwrap_err();
        assert_eq!(VectorizerError::EmptyVocabulary, err);
    }

    #[test]
    fn pruning_everything_fails() {
        let mut statistics = CorpusStatisticsCollector::default();
        for _ in 0..10 {
            statistics.add(vec!["same"]);
        }
        let err = statistics.provide_vectorizer(RAW_INVERSE_SMOOTH, &DocumentFrequencyLimits::default()).unwrap_err();
        assert_eq!(VectorizerError::NoTermsAfterPruning, err);
    }
}
