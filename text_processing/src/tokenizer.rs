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
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use crate::error::VectorizerError;
use crate::normalizer::normalize;

/// The inclusive range of n-gram sizes produced by a [Tokenizer].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NgramRange {
    pub min: usize,
    pub max: usize,
}

impl NgramRange {
    pub const UNIGRAMS: NgramRange = NgramRange { min: 1, max: 1 };
    pub const UNIGRAMS_AND_BIGRAMS: NgramRange = NgramRange { min: 1, max: 2 };

    pub fn new(min: usize, max: usize) -> Result<Self, VectorizerError> {
        let new = Self { min, max };
        new.validate()?;
        Ok(new)
    }

    pub fn validate(&self) -> Result<(), VectorizerError> {
        if self.min == 0 || self.min > self.max {
            Err(VectorizerError::InvalidNgramRange(*self))
        } else {
            Ok(())
        }
    }
}

impl Default for NgramRange {
    fn default() -> Self {
        Self::UNIGRAMS_AND_BIGRAMS
    }
}

impl Display for NgramRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.min, self.max)
    }
}

/// A primitive n-gram tokenizer.
///
/// Every text is normalized first. Words are maximal runs of alphanumeric
/// characters (or `_`) with at least two characters. Single character words are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tokenizer {
    ngram_range: NgramRange,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(NgramRange::default())
    }
}

impl Tokenizer {
    pub fn new(ngram_range: NgramRange) -> Self {
        Self {
            ngram_range,
        }
    }

    pub fn ngram_range(&self) -> NgramRange {
        self.ngram_range
    }

    /// Splits a normalized text into its words.
    pub fn words(&self, text: &str) -> Vec<String> {
        split_words(&normalize(text)).map(str::to_string).collect_vec()
    }

    /// Preprocesses a text into its n-grams.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let words = self.words(text);
        let NgramRange { min, max } = self.ngram_range;
        let mut result = Vec::new();
        for n in min..=max {
            if n > words.len() {
                break;
            }
            if n == 1 {
                result.extend(words.iter().cloned());
            } else {
                result.extend(words.windows(n).map(|window| window.iter().join(" ")));
            }
        }
        result
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Splits [text] into its words with at least two characters.
fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_word_char(c))
        .filter(|value| value.chars().nth(1).is_some())
}
