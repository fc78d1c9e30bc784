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

//! Command line argument parsing, layered on top of the on-disk config:
//! flags override whatever `GlobalConfig` loaded from TOML.

use std::path::PathBuf;

use clap::Parser;

use crate::types::{ChainType, NodeConfig};

#[derive(Parser, Debug)]
#[clap(name = "alpha-node", about = "A headers-only Alpha node")]
pub struct Cli {
	/// Network to connect to.
	#[clap(long, value_name = "CHAIN", possible_values = &["main", "test", "regtest"])]
	pub chain: Option<String>,

	/// Directory to store node state in.
	#[clap(long, value_name = "DIR")]
	pub data_dir: Option<PathBuf>,

	/// Address to listen for inbound peer connections on.
	#[clap(long, value_name = "ADDR")]
	pub listen: Option<String>,

	/// Address to bind the JSON-RPC server to.
	#[clap(long, value_name = "ADDR")]
	pub rpc_listen: Option<String>,

	/// Disable the JSON-RPC server.
	#[clap(long)]
	pub no_rpc: bool,

	/// Explicit path to a TOML config file, overriding the default
	/// `<data_dir>/alpha-node.toml` location.
	#[clap(long, value_name = "FILE")]
	pub config_file: Option<PathBuf>,
}

impl Cli {
	/// Applies any flags present on the command line over `config`,
	/// mutating it in place. Flags always win over the file on disk.
	pub fn apply(&self, config: &mut NodeConfig) -> Result<(), crate::types::ConfigError> {
		if let Some(ref chain) = self.chain {
			config.chain_type = chain.parse::<ChainType>()?;
		}
		if let Some(ref dir) = self.data_dir {
			config.data_dir = dir.clone();
		}
		if let Some(ref listen) = self.listen {
			config.p2p.listen_addr = listen.clone();
		}
		if let Some(ref rpc_listen) = self.rpc_listen {
			config.rpc.listen_addr = rpc_listen.clone();
		}
		if self.no_rpc {
			config.rpc.enabled = false;
		}
		Ok(())
	}
}
