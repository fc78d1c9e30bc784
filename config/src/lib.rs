// Copyright 2017 The Grin Developers
// Copyright 2026 Alpha Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-network consensus parameter selection, on-disk node configuration
//! and CLI argument parsing for the alpha node.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]

pub mod cli;
pub mod comments;
pub mod config;
pub mod types;

pub use cli::Cli;
pub use config::CONFIG_FILE_NAME;
pub use types::{default_data_dir, ChainType, ConfigError, GlobalConfig, NodeConfig, P2pConfig, RpcConfig};
