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

use std::io::{BufRead, ErrorKind, Write};
use camino::Utf8PathBuf;
use svm::error::PredictionError;
use crate::args::Instruction;
use crate::config::Configs;
use crate::detector::{Detector, DetectorError, Request, Response, TrainingSource};

/// Counts of a detection run.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DetectionStatistics {
    pub bullying: usize,
    pub not_bullying: usize,
    pub skipped: usize,
}

fn train(detector: &Detector, data: Utf8PathBuf) -> Result<(), DetectorError> {
    if let Response::Trained(summary) = detector.handle(Request::Train { source: TrainingSource::Path(data) })? {
        log::info!("The detector is ready: {summary}");
    }
    Ok(())
}

/// Classifies every text as soon as it is read and writes one verdict per line to [out].
///
/// Empty texts and lines that are not valid utf-8 are skipped, other read errors stop the run.
pub fn detect_all<I, T, W>(detector: &Detector, texts: I, out: &mut W) -> Result<DetectionStatistics, DetectorError>
where
    I: IntoIterator<Item=std::io::Result<T>>,
    T: Into<String>,
    W: Write
{
    let mut statistics = DetectionStatistics::default();
    for text in texts {
        let text = match text {
            Ok(text) => text.into(),
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                log::warn!("Skipped an unreadable line: {err}");
                statistics.skipped += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        match detector.handle(Request::Predict { text: text.clone() }) {
            Ok(Response::Prediction(label)) => {
                if label.is_bullying() {
                    statistics.bullying += 1;
                } else {
                    statistics.not_bullying += 1;
                }
                writeln!(out, "{label}\t{text}")?;
                out.flush()?;
            }
            Ok(Response::Trained(_)) => {}
            Err(DetectorError::Prediction(PredictionError::EmptyInput)) => {
                log::warn!("Skipped an empty text.");
                statistics.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(statistics)
}

/// Executes the [instruction], the logging has to be configured before.
pub fn execute(instruction: Instruction, configs: &Configs) -> Result<(), DetectorError> {
    let detector = Detector::new(configs.classifier());
    log::debug!("Training with {:?}", detector.config());
    match instruction {
        Instruction::Train { data } => {
            train(&detector, data)?;
            if let Some(state) = detector.state() {
                println!("{}", state.summary());
            }
        }
        Instruction::Detect { data, texts } => {
            train(&detector, data)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let statistics = if texts.is_empty() {
                detect_all(&detector, std::io::stdin().lock().lines(), &mut out)?
            } else {
                detect_all(&detector, texts.into_iter().map(Ok), &mut out)?
            };
            log::info!(
                "Classified {} texts as bullying and {} as not bullying, skipped {}.",
                statistics.bullying,
                statistics.not_bullying,
                statistics.skipped
            );
        }
    }
    Ok(())
}
