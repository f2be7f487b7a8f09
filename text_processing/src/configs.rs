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
use crate::error::VectorizerError;
use crate::tf_idf::{Idf, Tf, TfIdf};
use crate::tokenizer::{NgramRange, Tokenizer};

/// A document frequency limit, either as a number of documents or as share of the corpus.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFrequency {
    Absolute(u64),
    Relative(f64),
}

impl DocumentFrequency {
    /// Resolves the limit to a number of documents in a corpus with [document_count] documents.
    pub fn resolve(&self, document_count: u64) -> Result<f64, VectorizerError> {
        match *self {
            DocumentFrequency::Absolute(value) => Ok(value as f64),
            DocumentFrequency::Relative(value) => {
                if (0.0..=1.0).contains(&value) {
                    Ok(value * document_count as f64)
                } else {
                    Err(VectorizerError::InvalidDocumentFrequency(*self))
                }
            }
        }
    }
}

/// The limits for the document frequency of a term kept in the vocabulary.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFrequencyLimits {
    /// Terms appearing in more documents are dropped.
    #[serde(default = "_default_max_df")]
    pub max_df: DocumentFrequency,
    /// Terms appearing in fewer documents are dropped.
    #[serde(default = "_default_min_df")]
    pub min_df: DocumentFrequency,
}

const fn _default_max_df() -> DocumentFrequency {
    DocumentFrequency::Relative(0.9)
}

const fn _default_min_df() -> DocumentFrequency {
    DocumentFrequency::Absolute(5)
}

impl DocumentFrequencyLimits {
    /// Keeps every term.
    pub const NONE: DocumentFrequencyLimits = DocumentFrequencyLimits {
        max_df: DocumentFrequency::Relative(1.0),
        min_df: DocumentFrequency::Absolute(1),
    };

    /// Resolves the limits to the inclusive range of document counts a kept term can have.
    pub fn resolve(&self, document_count: u64) -> Result<(f64, f64), VectorizerError> {
        let max_df = self.max_df.resolve(document_count)?;
        let min_df = self.min_df.resolve(document_count)?;
        if max_df < min_df {
            return Err(VectorizerError::MaxDfBelowMinDf { max_df, min_df });
        }
        Ok((min_df, max_df))
    }
}

impl Default for DocumentFrequencyLimits {
    fn default() -> Self {
        Self {
            max_df: _default_max_df(),
            min_df: _default_min_df(),
        }
    }
}

/// The config of the tf-idf vectorizer used by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    #[serde(default)]
    pub ngram_range: NgramRange,
    #[serde(flatten)]
    pub limits: DocumentFrequencyLimits,
    #[serde(default = "_default_tf")]
    pub tf: Tf,
    #[serde(default = "_default_idf")]
    pub idf: Idf,
}

const fn _default_tf() -> Tf {
    Tf::RawCount
}

const fn _default_idf() -> Idf {
    Idf::InverseDocumentFrequencySmooth
}

impl VectorizerConfig {
    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new(self.ngram_range)
    }

    pub fn tf_idf(&self) -> TfIdf<Tf, Idf> {
        TfIdf::new(self.tf, self.idf)
    }
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            ngram_range: NgramRange::default(),
            limits: DocumentFrequencyLimits::default(),
            tf: _default_tf(),
            idf: _default_idf(),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::configs::{DocumentFrequency, DocumentFrequencyLimits, VectorizerConfig};
    use crate::error::VectorizerError;
    use crate::tokenizer::NgramRange;

    #[test]
    fn defaults_match_the_detector() {
        let cfg = VectorizerConfig::default();
        assert_eq!(NgramRange::new(1, 2).unwrap(), cfg.ngram_range);
        assert_eq!(DocumentFrequency::Relative(0.9), cfg.limits.max_df);
        assert_eq!(DocumentFrequency::Absolute(5), cfg.limits.min_df);
    }

    #[test]
    fn resolves_limits() {
        let (min, max) = DocumentFrequencyLimits::default().resolve(100).unwrap();
        assert_eq!(5.0, min);
        assert!(float_cmp::approx_eq!(f64, 90.0, max, epsilon = 1e-9));
    }

    #[test]
    fn rejects_crossed_limits() {
        let err = DocumentFrequencyLimits::default().resolve(4).unwrap_err();
        assert!(matches!(err, VectorizerError::MaxDfBelowMinDf { .. }), "{err}");
    }

    #[test]
    fn rejects_relative_values_out_of_range() {
        let limits = DocumentFrequencyLimits {
            max_df: DocumentFrequency::Relative(1.5),
            min_df: DocumentFrequency::Absolute(1),
        };
        assert_eq!(
            Err(VectorizerError::InvalidDocumentFrequency(DocumentFrequency::Relative(1.5))),
            limits.resolve(10)
        );
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: VectorizerConfig = serde_json::from_str(r#"{"min_df": {"absolute": 2}}"#).unwrap();
        assert_eq!(DocumentFrequency::Absolute(2), cfg.limits.min_df);
        assert_eq!(DocumentFrequency::Relative(0.9), cfg.limits.max_df);
        assert_eq!(NgramRange::UNIGRAMS_AND_BIGRAMS, cfg.ngram_range);
    }

    #[test]
    fn text_is_always_normalized() {
        let cfg: VectorizerConfig = serde_json::from_str(r#"{"normalize_text": false}"#).unwrap();
        assert_eq!(
            vec!["hello", "there", "hello there"],
            cfg.tokenizer().tokenize("HELLO, there!!")
        );
    }
}
