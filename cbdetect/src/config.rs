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

use camino::{Utf8Path, Utf8PathBuf};
use config::Config;
use serde::{Deserialize, Serialize};
use svm::config::{ClassifierConfig, DatasetConfig, SplitConfig, SvmParameterConfig};
use text_processing::configs::VectorizerConfig;

/// The name of the config files, without extension.
pub const CONFIG_NAME: &str = "cbdetect";

/// The prefix of environment variables overriding the config, e.g. `CBDETECT.SPLIT.SEED`.
pub const ENV_PREFIX: &str = "CBDETECT";

/// Config of the running application
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct SystemConfig {
    #[serde(default = "_default_log_level")]
    pub log_level: log::LevelFilter,
    /// If set the log is written to [SystemConfig::log_file] instead of the console
    #[serde(default)]
    pub log_to_file: bool,
    #[serde(default = "_default_log_file")]
    pub log_file: Utf8PathBuf,
}

const fn _default_log_level() -> log::LevelFilter {
    log::LevelFilter::Info
}

fn _default_log_file() -> Utf8PathBuf {
    Utf8PathBuf::from("cbdetect.log")
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: _default_log_level(),
            log_to_file: false,
            log_file: _default_log_file(),
        }
    }
}

/// A collection of all configs used by the detector.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename(serialize = "Config"))]
pub struct Configs {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub vectorizer: VectorizerConfig,
    #[serde(default)]
    pub svm: SvmParameterConfig,
}

impl Configs {
    /// Everything needed for training.
    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            dataset: self.dataset.clone(),
            split: self.split,
            vectorizer: self.vectorizer.clone(),
            svm: self.svm,
        }
    }

    /// Loads `./cbdetect.*` and `<folder>/cbdetect.*`, overridden by the environment.
    pub fn load_from<P: AsRef<Utf8Path>>(folder: P) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(config::File::with_name(CONFIG_NAME).required(false))
            .add_source(config::File::with_name(
                folder.as_ref().join(CONFIG_NAME).as_str(),
            ))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("."))
            .build()?
            .try_deserialize()
    }

    /// Loads `./cbdetect.*` if it exists, overridden by the environment.
    pub fn discover() -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(config::File::with_name(CONFIG_NAME).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("."))
            .build()?
            .try_deserialize()
    }

    /// Like [Configs::discover] but falls back to the defaults.
    pub fn discover_or_default() -> Self {
        match Self::discover() {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Failed to load the config, falling back to the defaults: {err}");
                Default::default()
            }
        }
    }
}
