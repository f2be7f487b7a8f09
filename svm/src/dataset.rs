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

use std::io;
use camino::Utf8Path;
use csv::{Reader, StringRecordsIntoIter};
use serde::{Deserialize, Serialize};
use crate::classifier::TrainDataEntry;
use crate::config::DatasetConfig;
use crate::error::{DataFormatError, TrainingError};

/// A labeled document of the training data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub text: String,
    /// True if the text is cyberbullying
    pub label: bool,
}

impl DatasetRow {
    pub fn new(text: impl Into<String>, label: bool) -> Self {
        Self { text: text.into(), label }
    }
}

impl TrainDataEntry for DatasetRow {
    fn get_label(&self) -> bool {
        self.label
    }

    fn get_text(&self) -> &str {
        &self.text
    }
}

/// Parses a label cell. Accepts 0 and 1, also when written as float.
pub fn parse_label(value: &str, line: u64) -> Result<bool, DataFormatError> {
    let trimmed = value.trim();
    match trimmed {
        "0" => return Ok(false),
        "1" => return Ok(true),
        _ => {}
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed == 0.0 => Ok(false),
        Ok(parsed) if parsed == 1.0 => Ok(true),
        _ => Err(DataFormatError::InvalidLabel { line, value: value.to_string() })
    }
}

/// Decodes [bytes] with the configured encoding. A byte order mark overrides the configuration.
pub fn decode_dataset(bytes: &[u8], cfg: &DatasetConfig) -> Result<String, TrainingError> {
    let encoding = cfg.encoding()?;
    let (decoded, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(TrainingError::Decoding { encoding: used.name() });
    }
    if used != encoding {
        log::debug!("Found a byte order mark, decoding the dataset as {} instead of {}.", used.name(), encoding.name());
    }
    Ok(decoded.into_owned())
}

/// Iterates over the rows of a csv, fails at the first malformed row.
pub struct DatasetRecords<R> {
    text_column: usize,
    label_column: usize,
    string_records_iter: StringRecordsIntoIter<R>,
}

impl<R> DatasetRecords<R> where R: io::Read {
    /// Looks up the configured columns in the header of [reader].
    pub fn new(mut reader: Reader<R>, cfg: &DatasetConfig) -> Result<Self, TrainingError> {
        let header = reader.headers()?;
        let find_column = |name: &str| {
            header
                .iter()
                .position(|value| value.trim() == name)
                .ok_or_else(|| DataFormatError::MissingColumn { column: name.to_string() })
        };
        let text_column = find_column(&cfg.text_column)?;
        let label_column = find_column(&cfg.label_column)?;
        Ok(
            Self {
                text_column,
                label_column,
                string_records_iter: reader.into_records()
            }
        )
    }
}

impl<R> Iterator for DatasetRecords<R> where R: io::Read {
    type Item = Result<DatasetRow, TrainingError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.string_records_iter.next()? {
            Ok(record) => record,
            Err(err) => return Some(Err(err.into()))
        };
        let line = record.position().map_or(0, |position| position.line());
        let label = match parse_label(record.get(self.label_column).unwrap_or_default(), line) {
            Ok(label) => label,
            Err(err) => return Some(Err(err.into()))
        };
        let text = record.get(self.text_column).unwrap_or_default();
        Some(Ok(DatasetRow::new(text, label)))
    }
}

/// Reads all rows of a decoded csv.
pub fn read_dataset_from_str(content: &str, cfg: &DatasetConfig) -> Result<Vec<DatasetRow>, TrainingError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(cfg.delimiter()?)
        .from_reader(content.as_bytes());
    DatasetRecords::new(reader, cfg)?.collect()
}

/// Reads all rows of the csv at [path].
pub fn read_dataset(path: impl AsRef<Utf8Path>, cfg: &DatasetConfig) -> Result<Vec<DatasetRow>, TrainingError> {
    let path = path.as_ref();
    log::info!("Read dataset from {path}");
    let bytes = std::fs::read(path)?;
    let content = decode_dataset(&bytes, cfg)?;
    let rows = read_dataset_from_str(&content, cfg)?;
    log::info!("Read {} documents from {path}", rows.len());
    Ok(rows)
}


#[cfg(test)]
mod test {
    use camino_tempfile::NamedUtf8TempFile;
    use std::io::Write;
    use crate::config::DatasetConfig;
    use crate::dataset::{parse_label, read_dataset, read_dataset_from_str, DatasetRow};
    use crate::error::{DataFormatError, TrainingError};

    #[test]
    fn reads_rows_with_extra_columns() {
        let rows = read_dataset_from_str(
            "Id,Text,CB_Label\n1,you are an idiot,1\n2,\"have a nice day, friend\",0\n3,,0\n",
            &DatasetConfig::default()
        ).unwrap();
        assert_eq!(
            vec![
                DatasetRow::new("you are an idiot", true),
                DatasetRow::new("have a nice day, friend", false),
                DatasetRow::new("", false),
            ],
            rows
        );
    }

    #[test]
    fn missing_label_column_is_reported() {
        let err = read_dataset_from_str("Text,Label\nhello,1\n", &DatasetConfig::default()).unwrap_err();
        assert_eq!(
            Some(&DataFormatError::MissingColumn { column: "CB_Label".to_string() }),
            err.as_data_format_error()
        );
    }

    #[test]
    fn invalid_label_is_reported_with_the_line() {
        let err = read_dataset_from_str("Text,CB_Label\nhello,1\nworld,2\n", &DatasetConfig::default()).unwrap_err();
        assert_eq!(
            Some(&DataFormatError::InvalidLabel { line: 3, value: "2".to_string() }),
            err.as_data_format_error()
        );
    }

    #[test]
    fn labels() {
        assert_eq!(Ok(true), parse_label("1", 1));
        assert_eq!(Ok(false), parse_label(" 0 ", 1));
        assert_eq!(Ok(true), parse_label("1.0", 1));
        assert!(parse_label("yes", 1).is_err());
        assert!(parse_label("", 1).is_err());
        assert!(parse_label("-1", 4).is_err());
        assert!(parse_label("2", 4).is_err());
    }

    #[test]
    fn custom_columns_and_delimiter() {
        let cfg = DatasetConfig {
            text_column: "message".to_string(),
            label_column: "bullying".to_string(),
            delimiter: ';',
            ..DatasetConfig::default()
        };
        let rows = read_dataset_from_str("bullying;message\n1;you loser\n", &cfg).unwrap();
        assert_eq!(vec![DatasetRow::new("you loser", true)], rows);
    }

    #[test]
    fn decodes_windows_1252() {
        let mut file = NamedUtf8TempFile::new().unwrap();
        // 0xE9 is é and 0x92 is ’ in windows-1252, both are invalid utf-8 here
        file.write_all(b"Text,CB_Label\ncaf\xE9 isn\x92t nice,0\n").unwrap();
        file.flush().unwrap();
        let rows = read_dataset(file.path(), &DatasetConfig::default()).unwrap();
        assert_eq!(vec![DatasetRow::new("café isn’t nice", false)], rows);
    }

    #[test]
    fn strict_utf8_rejects_legacy_bytes() {
        let mut file = NamedUtf8TempFile::new().unwrap();
        file.write_all(b"Text,CB_Label\ncaf\xE9,0\n").unwrap();
        file.flush().unwrap();
        let cfg = DatasetConfig { encoding: "utf-8".to_string(), ..DatasetConfig::default() };
        assert!(matches!(read_dataset(file.path(), &cfg), Err(TrainingError::Decoding { .. })));
    }

    #[test]
    fn byte_order_mark_wins() {
        let mut file = NamedUtf8TempFile::new().unwrap();
        file.write_all("\u{FEFF}Text,CB_Label\nStraße,0\n".as_bytes()).unwrap();
        file.flush().unwrap();
        let rows = read_dataset(file.path(), &DatasetConfig::default()).unwrap();
        assert_eq!(vec![DatasetRow::new("Straße", false)], rows);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_dataset("/definitely/not/here.csv", &DatasetConfig::default()).unwrap_err();
        assert!(matches!(err, TrainingError::IO(_)));
    }
}
