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

use std::process::ExitCode;
use clap::Parser;
use crate::args::{consume_args, CbDetectArgs, ConsumedArgs};

mod application;
mod args;
mod config;
mod detector;
mod logging;

fn main() -> ExitCode {
    exec_args(CbDetectArgs::parse())
}

fn exec_args(args: CbDetectArgs) -> ExitCode {
    match consume_args(args) {
        Ok(ConsumedArgs::RunConfig(instruction, configs)) => {
            if let Err(err) = logging::configure_logging(&configs) {
                eprintln!("Failed to configure the logging: {err}");
                return ExitCode::FAILURE;
            }
            match application::execute(instruction, &configs) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    log::error!("{err}");
                    ExitCode::FAILURE
                }
            }
        }
        Ok(ConsumedArgs::Nothing) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
