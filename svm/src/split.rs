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

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use crate::config::SplitConfig;
use crate::error::TrainingError;

/// The documents used for training and the documents held out of it.
#[derive(Debug, Clone)]
pub struct TrainTestSplit<T> {
    pub train: Vec<T>,
    pub held_out: Vec<T>,
}

/// Shuffles [data] with the configured seed and holds out ceil(n * test_size) documents.
/// The same data and config always result in the same split.
pub fn train_test_split<T>(data: Vec<T>, cfg: &SplitConfig) -> Result<TrainTestSplit<T>, TrainingError> {
    if !(cfg.test_size > 0.0 && cfg.test_size < 1.0) {
        return Err(TrainingError::InvalidTestSize(cfg.test_size));
    }
    let documents = data.len();
    let held_out_size = (documents as f64 * cfg.test_size).ceil() as usize;
    if held_out_size == 0 || held_out_size >= documents {
        return Err(TrainingError::Split { documents, test_size: cfg.test_size });
    }

    let mut permutation = (0..documents).collect::<Vec<_>>();
    permutation.shuffle(&mut StdRng::seed_from_u64(cfg.seed));
    let mut is_held_out = vec![false; documents];
    for &idx in &permutation[..held_out_size] {
        is_held_out[idx] = true;
    }

    let mut train = Vec::with_capacity(documents - held_out_size);
    let mut held_out = Vec::with_capacity(held_out_size);
    for (value, held) in data.into_iter().zip(is_held_out) {
        if held {
            held_out.push(value);
        } else {
            train.push(value);
        }
    }
    log::debug!("Split {documents} documents into {} for training and {} held out.", train.len(), held_out.len());
    Ok(TrainTestSplit { train, held_out })
}

#[cfg(test)]
mod test {
    use itertools::Itertools;
    use crate::config::SplitConfig;
    use crate::error::TrainingError;
    use crate::split::train_test_split;

    #[test]
    fn holds_out_the_ceiling() {
        let split = train_test_split((0..11).collect_vec(), &SplitConfig::default()).unwrap();
        assert_eq!(3, split.held_out.len());
        assert_eq!(8, split.train.len());
        let mut all = split.train.iter().chain(split.held_out.iter()).copied().collect_vec();
        all.sort();
        assert_eq!((0..11).collect_vec(), all);
    }

    #[test]
    fn same_seed_same_split() {
        let a = train_test_split((0..100).collect_vec(), &SplitConfig::default()).unwrap();
        let b = train_test_split((0..100).collect_vec(), &SplitConfig::default()).unwrap();
        assert_eq!(a.held_out, b.held_out);
        let c = train_test_split((0..100).collect_vec(), &SplitConfig { seed: 7, ..SplitConfig::default() }).unwrap();
        assert_ne!(a.held_out, c.held_out);
    }

    #[test]
    fn tiny_datasets_cannot_be_split() {
        assert!(matches!(
            train_test_split(vec![1], &SplitConfig::default()),
            Err(TrainingError::Split { documents: 1, .. })
        ));
        assert!(matches!(
            train_test_split(Vec::<u8>::new(), &SplitConfig::default()),
            Err(TrainingError::Split { documents: 0, .. })
        ));
        assert!(train_test_split(vec![1, 2], &SplitConfig::default()).is_ok());
    }

    #[test]
    fn rejects_invalid_test_size() {
        assert!(matches!(
            train_test_split(vec![1, 2, 3], &SplitConfig { test_size: 1.0, seed: 1 }),
            Err(TrainingError::InvalidTestSize(_))
        ));
    }
}
