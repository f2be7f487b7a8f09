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

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;
use thiserror::Error;
use crate::config::Configs;

const PATTERN: &str = "{l}@Thread{I} - {d} - {m}{n}";

/// The crates logging with the configured level, everything else logs warnings only.
const LOGGED_CRATES: [&str; 3] = ["cbdetect", "svm", "text_processing"];

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("The logging config is invalid: {0}")]
    Config(String),
    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}

/// Creates the log4rs config for [configs].
pub fn create_logging_config(configs: &Configs) -> Result<Config, LoggingError> {
    let config = Config::builder();

    let config = if configs.system.log_to_file {
        let file_logger = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build(configs.system.log_file.as_std_path())?;
        config.appender(Appender::builder().build("out", Box::new(file_logger)))
    } else {
        // stdout is reserved for the verdicts
        let console_logger = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build();
        config.appender(Appender::builder().build("out", Box::new(console_logger)))
    };

    let config = LOGGED_CRATES.iter().fold(config, |config, name| {
        config.logger(Logger::builder().build(*name, configs.system.log_level))
    });

    config
        .build(Root::builder().appender("out").build(LevelFilter::Warn))
        .map_err(|err| LoggingError::Config(err.to_string()))
}

/// Configure the logging
pub fn configure_logging(configs: &Configs) -> Result<(), LoggingError> {
    let config = create_logging_config(configs)?;
    log4rs::init_config(config)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use camino_tempfile::tempdir;
    use crate::config::Configs;
    use crate::logging::create_logging_config;

    #[test]
    fn console_config_has_a_logger_per_crate() {
        let config = create_logging_config(&Configs::default()).unwrap();
        assert_eq!(3, config.loggers().len());
        assert!(config.loggers().iter().all(|logger| logger.level() == log::LevelFilter::Info));
    }

    #[test]
    fn file_config_creates_the_log_file() {
        let dir = tempdir().unwrap();
        let mut configs = Configs::default();
        configs.system.log_to_file = true;
        configs.system.log_file = dir.path().join("out.log");
        configs.system.log_level = log::LevelFilter::Debug;
        let config = create_logging_config(&configs).unwrap();
        assert!(configs.system.log_file.exists());
        assert!(config.loggers().iter().all(|logger| logger.level() == log::LevelFilter::Debug));
    }
}
