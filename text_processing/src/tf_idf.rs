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

use std::collections::HashMap;
use std::error::Error;
use std::hash::Hash;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use thiserror::Error;
use crate::corpus::CorpusDocumentStatistics;

pub mod defaults {
    use crate::tf_idf::{Idf, Tf, TfIdf};
    pub const RAW_INVERSE: TfIdf<Tf, Idf> = TfIdf::new(Tf::RawCount, Idf::InverseDocumentFrequency);
    pub const RAW_INVERSE_SMOOTH: TfIdf<Tf, Idf> = TfIdf::new(Tf::RawCount, Idf::InverseDocumentFrequencySmooth);
    pub const SUBLINEAR_INVERSE_SMOOTH: TfIdf<Tf, Idf> = TfIdf::new(Tf::Sublinear, Idf::InverseDocumentFrequencySmooth);
}

/// A combination of Tf and Idf
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "Tf: Serialize, Idf: Serialize",
    deserialize = "Tf: DeserializeOwned, Idf: DeserializeOwned"
))]
pub struct TfIdf<Tf, Idf> {
    pub tf: Tf,
    pub idf: Idf
}

impl<Tf, Idf> TfIdf<Tf, Idf> where Tf: TfAlgorithm {
    delegate::delegate! {
        to self.tf {
            pub fn calculate_tf<W, D: IntoIterator<Item=W>>(&self, doc: D) -> HashMap<W, f64> where W: Hash + Eq;
        }
    }
}

impl<Tf, Idf> TfIdf<Tf, Idf> where Idf: IdfAlgorithm {
    delegate::delegate! {
        to self.idf {
            pub fn calculate_idf<W, S: CorpusDocumentStatistics<Word=W>>(&self, statistics: &S, word: &W) -> Result<Option<f64>, Idf::Error>;
            pub fn calculate_idf_with_document_frequency<S: CorpusDocumentStatistics>(&self, statistics: &S, document_frequency: u64) -> Result<f64, Idf::Error>;
        }
    }
}

impl<Tf, Idf> TfIdf<Tf, Idf> {
    pub const fn new(tf: Tf, idf: Idf) -> Self {
        Self { tf, idf }
    }
}

impl<Tf, Idf> Copy for TfIdf<Tf, Idf> where Tf: Copy, Idf: Copy {}


/// Trait for IDF Algorithms
pub trait IdfAlgorithm {
    type Error: Error;

    /// Calculates the IDF value for a single word based on the provided statistics.
    /// Returns None if the word is unknown to the statistics.
    #[inline]
    fn calculate_idf<W, S: CorpusDocumentStatistics<Word=W>>(&self, statistics: &S, word: &W) -> Result<Option<f64>, Self::Error> {
        statistics
            .document_frequency(word)
            .map(|value| self.calculate_idf_with_document_frequency(statistics, value))
            .transpose()
    }

    /// Calculates the IDF value for a word contained in [document_frequency] documents.
    fn calculate_idf_with_document_frequency<S: CorpusDocumentStatistics>(&self, statistics: &S, document_frequency: u64) -> Result<f64, Self::Error>;
}


/// Default IDF Algorithms, all with natural logarithm.
/// The `+ 1` keeps terms present in every document from being ignored completely.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Idf {
    /// Always 1
    Unary,
    /// ln(n / df) + 1
    InverseDocumentFrequency,
    /// ln((1 + n) / (1 + df)) + 1, as if an extra document contained every term once
    InverseDocumentFrequencySmooth,
}

#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum IdfError {
    #[error("The CorpusDocumentStatistics is seen as empty but this should not be possible.")]
    StatisticsEmptyError,
    #[error("A document frequency of {document_frequency} is not possible in a corpus of {document_count} documents.")]
    ImpossibleDocumentFrequency {
        document_frequency: u64,
        document_count: u64,
    },
}

impl IdfAlgorithm for Idf {
    type Error = IdfError;

    fn calculate_idf_with_document_frequency<S: CorpusDocumentStatistics>(&self, statistics: &S, document_frequency: u64) -> Result<f64, IdfError> {
        let document_count = statistics.document_count();
        if document_count == 0 {
            return Err(IdfError::StatisticsEmptyError);
        }
        if document_frequency > document_count {
            return Err(IdfError::ImpossibleDocumentFrequency { document_frequency, document_count });
        }
        match self {
            Idf::Unary => {
                Ok(1.0)
            }
            Idf::InverseDocumentFrequency => {
                if document_frequency == 0 {
                    return Err(IdfError::ImpossibleDocumentFrequency { document_frequency, document_count });
                }
                Ok((document_count as f64 / document_frequency as f64).ln() + 1.0)
            }
            Idf::InverseDocumentFrequencySmooth => {
                Ok(((document_count as f64 + 1.0) / (document_frequency as f64 + 1.0)).ln() + 1.0)
            }
        }
    }
}


/// Trait for TF Algorithm
pub trait TfAlgorithm {
    /// Calculates the TF value for every word in [doc].
    fn calculate_tf<W, D: IntoIterator<Item=W>>(&self, doc: D) -> HashMap<W, f64> where W: Hash + Eq;
}

/// Default TF Algorithms
/// From https://en.wikipedia.org/wiki/Tf%E2%80%93idf
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Tf {
    Binary,
    RawCount,
    /// 1 + ln(count)
    Sublinear,
}

impl Tf {
    /// The implementation for Tf::RawCount, used in multiple impls.
    fn raw_count<W, D: IntoIterator<Item=W>>(doc: D) -> HashMap<W, f64> where W: Hash + Eq {
        let mut result = HashMap::new();
        for word in doc {
            *result.entry(word).or_insert(0.0) += 1.0;
        }
        result
    }
}

impl TfAlgorithm for Tf {
    fn calculate_tf<W, D: IntoIterator<Item=W>>(&self, doc: D) -> HashMap<W, f64> where W: Hash + Eq {
        match self {
            Tf::Binary => {
                let mut result = HashMap::new();
                for word in doc.into_iter() {
                    result.insert(word, 1.0);
                }
                result
            }
            Tf::RawCount => {
                Self::raw_count(doc)
            }
            Tf::Sublinear => {
                let mut result = Self::raw_count(doc);
                for value in result.values_mut() {
                    *value = 1.0 + value.ln();
                }
                result
            }
        }
    }
}


#[cfg(test)]
mod test {
    use float_cmp::approx_eq;
    use crate::corpus::CorpusStatisticsCollector;
    use crate::tf_idf::{defaults, Idf, IdfAlgorithm, IdfError, Tf, TfAlgorithm};

    fn three_documents() -> CorpusStatisticsCollector<&'static str> {
        let mut statistics = CorpusStatisticsCollector::default();
        statistics.add("it is going to rain today".split(' '));
        statistics.add("today i am not going outside".split(' '));
        statistics.add("i am going to watch the season premiere".split(' '));
        statistics
    }

    #[test]
    fn raw_count_counts() {
        let tf = Tf::RawCount.calculate_tf("nice nice work".split(' '));
        assert_eq!(Some(&2.0), tf.get("nice"));
        assert_eq!(Some(&1.0), tf.get("work"));
    }

    #[test]
    fn binary_and_sublinear() {
        let binary = Tf::Binary.calculate_tf("a a a b".split(' '));
        assert_eq!(Some(&1.0), binary.get("a"));
        let sublinear = Tf::Sublinear.calculate_tf("a a a b".split(' '));
        assert!(approx_eq!(f64, 1.0 + 3f64.ln(), sublinear["a"], ulps = 2));
        assert!(approx_eq!(f64, 1.0, sublinear["b"], ulps = 2));
    }

    #[test]
    fn smooth_idf_values() {
        let statistics = three_documents();
        // "going" is in every document
        let going = Idf::InverseDocumentFrequencySmooth.calculate_idf(&statistics, &"going").unwrap().unwrap();
        assert!(approx_eq!(f64, 1.0, going, ulps = 2), "{going}");
        let rain = Idf::InverseDocumentFrequencySmooth.calculate_idf(&statistics, &"rain").unwrap().unwrap();
        assert!(approx_eq!(f64, 2f64.ln() + 1.0, rain, ulps = 2), "{rain}");
        let today = defaults::RAW_INVERSE_SMOOTH.calculate_idf(&statistics, &"today").unwrap().unwrap();
        assert!(approx_eq!(f64, (4.0f64 / 3.0).ln() + 1.0, today, ulps = 2), "{today}");
    }

    #[test]
    fn plain_idf_values() {
        let statistics = three_documents();
        let rain = defaults::RAW_INVERSE.calculate_idf(&statistics, &"rain").unwrap().unwrap();
        assert!(approx_eq!(f64, 3f64.ln() + 1.0, rain, ulps = 2), "{rain}");
        assert_eq!(None, Idf::InverseDocumentFrequency.calculate_idf(&statistics, &"snow").unwrap());
    }

    #[test]
    fn empty_statistics_fail() {
        let statistics = CorpusStatisticsCollector::<&str>::default();
        assert_eq!(
            Err(IdfError::StatisticsEmptyError),
            Idf::Unary.calculate_idf_with_document_frequency(&statistics, 1)
        );
    }
}
