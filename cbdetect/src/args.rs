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

use std::fs::File;
use std::io::{BufWriter, Write};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use thiserror::Error;
use crate::config::{Configs, CONFIG_NAME};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Detects cyberbullying in short texts
pub struct CbDetectArgs {
    /// The folder containing the config.
    #[arg(short, long, global = true)]
    pub config: Option<String>,
    /// Overrides the log level from the config.
    #[arg(long, global = true)]
    pub log_level: Option<log::LevelFilter>,
    /// Log to file
    #[arg(long, global = true)]
    pub log_to_file: bool,

    /// The mode of cbdetect
    #[command(subcommand)]
    pub mode: RunMode,
}

#[derive(Subcommand, Debug)]
pub enum RunMode {
    /// Trains on the dataset and classifies the texts, one text per line from stdin if none are given.
    Detect {
        /// The labeled csv to train on
        #[arg(short, long)]
        data: String,
        /// The texts to classify
        texts: Vec<String>,
    },
    /// Trains on the dataset and reports the result.
    Train {
        /// The labeled csv to train on
        #[arg(short, long)]
        data: String,
    },
    /// Writes a config with all default values.
    GenerateExampleConfig {
        /// The folder for the config
        #[arg(short, long, default_value = ".")]
        out: String,
    },
}

/// What to do after the configs are loaded.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Instruction {
    Detect {
        data: Utf8PathBuf,
        texts: Vec<String>,
    },
    Train {
        data: Utf8PathBuf,
    },
}

#[derive(Debug)]
pub enum ConsumedArgs {
    RunConfig(Instruction, Configs),
    Nothing,
}

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn load_configs(args: &CbDetectArgs) -> Result<Configs, ArgsError> {
    let mut configs = match &args.config {
        None => Configs::discover_or_default(),
        Some(path) => Configs::load_from(path)?,
    };
    if let Some(log_level) = args.log_level {
        configs.system.log_level = log_level;
    }
    if args.log_to_file {
        configs.system.log_to_file = true;
    }
    Ok(configs)
}

/// Writes the default config as `cbdetect.json` into [folder].
pub fn export_example_config(folder: impl AsRef<Utf8Path>) -> Result<Utf8PathBuf, ArgsError> {
    let folder = folder.as_ref();
    std::fs::create_dir_all(folder)?;
    let path = folder.join(CONFIG_NAME).with_extension("json");
    let mut writer = BufWriter::new(
        File::options().write(true).create(true).truncate(true).open(&path)?
    );
    serde_json::to_writer_pretty(&mut writer, &Configs::default())?;
    writer.flush()?;
    Ok(path)
}

/// Consumes the args and returns everything necessary to execute cbdetect
pub fn consume_args(args: CbDetectArgs) -> Result<ConsumedArgs, ArgsError> {
    let instruction = match &args.mode {
        RunMode::Detect { data, texts } => Instruction::Detect {
            data: Utf8PathBuf::from(data),
            texts: texts.clone(),
        },
        RunMode::Train { data } => Instruction::Train {
            data: Utf8PathBuf::from(data)
        },
        RunMode::GenerateExampleConfig { out } => {
            let path = export_example_config(out)?;
            println!("Wrote the example config to {path}.");
            return Ok(ConsumedArgs::Nothing);
        }
    };
    Ok(ConsumedArgs::RunConfig(instruction, load_configs(&args)?))
}
