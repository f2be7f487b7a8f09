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

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod solver;
pub mod split;

use camino::Utf8Path;
use itertools::Itertools;
use text_processing::tf_idf::{Idf, Tf};
use text_processing::vectorizer::create_vectorizer;
use crate::classifier::{count_classes, DocumentClassifier, Label, TrainDataEntry};
use crate::config::ClassifierConfig;
use crate::dataset::read_dataset;
use crate::error::{PredictionError, TrainingError};
use crate::split::train_test_split;

/// The classifier as configured by a [ClassifierConfig].
pub type TrainedState = DocumentClassifier<Tf, Idf>;

/// Splits [rows], fits the vectorizer on the training part and trains the svm on it.
pub fn train<I, T>(rows: I, cfg: &ClassifierConfig) -> Result<TrainedState, TrainingError>
where
    I: IntoIterator<Item=T>,
    T: TrainDataEntry
{
    let rows = rows.into_iter().collect_vec();
    log::info!("Train the cyberbullying detector with {} documents.", rows.len());
    let split = train_test_split(rows, &cfg.split)?;
    count_classes(split.train.iter().map(|value| value.get_label()))?;

    let tokenizer = cfg.vectorizer.tokenizer();
    let vectorizer = create_vectorizer(
        split.train.iter().map(|value| value.get_text()),
        &tokenizer,
        cfg.vectorizer.tf_idf(),
        &cfg.vectorizer.limits
    )?;
    log::info!("The vocabulary has {} terms.", vectorizer.dimension());

    let trained = DocumentClassifier::train(
        vectorizer,
        tokenizer,
        &split.train,
        &cfg.svm,
        split.held_out.len()
    )?;
    log::info!("Finished training: {}", trained.summary());
    Ok(trained)
}

/// Reads the dataset at [path] and trains on it.
pub fn train_from_path(path: impl AsRef<Utf8Path>, cfg: &ClassifierConfig) -> Result<TrainedState, TrainingError> {
    let rows = read_dataset(path, &cfg.dataset)?;
    train(rows, cfg)
}

/// Classifies [text] with [state].
pub fn predict(state: &TrainedState, text: &str) -> Result<Label, PredictionError> {
    state.predict(text)
}


#[cfg(test)]
mod test {
    use std::io::Write;
    use camino_tempfile::NamedUtf8TempFile;
    use text_processing::configs::DocumentFrequency;
    use text_processing::error::VectorizerError;
    use crate::classifier::Label;
    use crate::config::ClassifierConfig;
    use crate::dataset::DatasetRow;
    use crate::error::{PredictionError, TrainingError};
    use crate::{predict, train, train_from_path};

    const SCENARIO: [(&str, bool); 6] = [
        ("you are stupid", true),
        ("have a nice day", false),
        ("idiot", true),
        ("great job", false),
        ("you are dumb", true),
        ("nice work", false),
    ];

    /// Every scenario row repeated, so the terms survive min_df after the split.
    fn scenario_rows(copies: usize) -> Vec<DatasetRow> {
        (0..copies)
            .flat_map(|_| SCENARIO.iter().map(|(text, label)| DatasetRow::new(*text, *label)))
            .collect()
    }

    #[test]
    fn detects_insults() {
        let state = train(scenario_rows(20), &ClassifierConfig::default()).unwrap();
        assert_eq!(Ok(Label::Bullying), predict(&state, "you are an idiot"));
        assert_eq!(Ok(Label::NotBullying), predict(&state, "nice work today"));
        assert_eq!(24, state.summary().held_out_documents);
        assert_eq!(96, state.summary().training_documents);
    }

    #[test]
    fn unknown_words_still_get_a_label() {
        let state = train(scenario_rows(20), &ClassifierConfig::default()).unwrap();
        assert!(predict(&state, "zzzqqqxxx").is_ok());
        assert_eq!(Err(PredictionError::EmptyInput), predict(&state, "   "));
    }

    #[test]
    fn training_is_deterministic() {
        let a = train(scenario_rows(20), &ClassifierConfig::default()).unwrap();
        let b = train(scenario_rows(20), &ClassifierConfig::default()).unwrap();
        assert_eq!(a.summary(), b.summary());
        assert_eq!(a.weights(), b.weights());
        for text in ["you idiot", "great work", "hello there", "you are an idiot"] {
            assert_eq!(predict(&a, text), predict(&b, text));
        }
    }

    #[test]
    fn tiny_dataset_cannot_satisfy_the_document_frequency_limits() {
        // 4 training documents, max_df resolves to 3.6 which is below min_df
        let err = train(scenario_rows(1), &ClassifierConfig::default()).unwrap_err();
        assert!(matches!(err, TrainingError::Vectorizer(VectorizerError::MaxDfBelowMinDf { .. })), "{err}");
    }

    #[test]
    fn rare_terms_are_pruned_away() {
        let mut cfg = ClassifierConfig::default();
        cfg.vectorizer.limits.max_df = DocumentFrequency::Relative(1.0);
        // Digits are removed by the normalizer, so every document gets its own letters
        let rows = (0..20u8)
            .map(|idx| DatasetRow::new(format!("term{}{}", (b'a' + idx) as char, (b'a' + idx) as char), idx % 2 == 0))
            .collect::<Vec<_>>();
        let err = train(rows, &cfg).unwrap_err();
        assert!(matches!(err, TrainingError::Vectorizer(VectorizerError::NoTermsAfterPruning)), "{err}");
    }

    #[test]
    fn single_class_is_rejected() {
        let rows = (0..20).map(|idx| DatasetRow::new(format!("you are an idiot {}", "x".repeat(idx + 2)), true)).collect::<Vec<_>>();
        let err = train(rows, &ClassifierConfig::default()).unwrap_err();
        assert!(matches!(err, TrainingError::SingleClass(Label::Bullying)), "{err}");
    }

    #[test]
    fn trains_from_a_legacy_csv() {
        let mut file = NamedUtf8TempFile::new().unwrap();
        writeln!(file, "Text,CB_Label").unwrap();
        for row in scenario_rows(20) {
            writeln!(file, "\"{}\",{}", row.text, if row.label { 1 } else { 0 }).unwrap();
        }
        // A windows-1252 apostrophe
        file.write_all(b"you\x92re an idiot,1\n").unwrap();
        file.flush().unwrap();
        let state = train_from_path(file.path(), &ClassifierConfig::default()).unwrap();
        assert_eq!(121, state.summary().training_documents + state.summary().held_out_documents);
        assert_eq!(Ok(Label::Bullying), predict(&state, "idiot"));
    }

    #[test]
    fn missing_column_fails_the_training() {
        let mut file = NamedUtf8TempFile::new().unwrap();
        writeln!(file, "Message,CB_Label\nhello,0").unwrap();
        file.flush().unwrap();
        let err = train_from_path(file.path(), &ClassifierConfig::default()).unwrap_err();
        assert!(matches!(err, TrainingError::DataFormat(_)), "{err}");
    }
}
